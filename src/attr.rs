//! Attributes, kept as opaque blobs keyed by a Utf8 name constant.
//!
//! The attribute ecosystem (StackMapTable, LineNumberTable, …) sits above
//! this crate; round-tripping an attribute only needs its name and payload.

use std::io::{Read, Write};

use crate::cp::ConstantPool;
use crate::error::eof_to_truncated;
use crate::rw::ReadWrite;
use crate::Result;

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Attribute {
    /// The name of this attribute, such as `Code` or `SourceFile`.
    pub name: String,
    /// The raw payload, excluding the name index and length prefix.
    pub data: Vec<u8>,
}

impl Attribute {
    pub fn new<S: Into<String>, B: Into<Vec<u8>>>(name: S, data: B) -> Attribute {
        Attribute {
            name: name.into(),
            data: data.into(),
        }
    }

    pub fn read_from<R: Read>(pool: &ConstantPool, reader: &mut R) -> Result<Attribute> {
        let name = pool.get_utf8(u16::read_from(reader)?)?.to_owned();
        let length = u32::read_from(reader)?;
        let mut data = vec![0; length as usize];
        reader.read_exact(&mut data).map_err(eof_to_truncated)?;
        Ok(Attribute { name, data })
    }

    pub fn write_to<W: Write>(&self, pool: &mut ConstantPool, writer: &mut W) -> Result<()> {
        pool.add_utf8(self.name.clone()).write_to(writer)?;
        (self.data.len() as u32).write_to(writer)?;
        writer.write_all(&self.data)?;
        Ok(())
    }
}
