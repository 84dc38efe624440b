//! The generic read and write trait and its implementations for the
//! primitive wire types of the class file format.

use std::io::{Read, Write};

use crate::error::eof_to_truncated;
use crate::mod_utf8::{modified_utf8_to_string, string_to_modified_utf8};
use crate::total_floats::{TotalF32, TotalF64};
use crate::Result;

/// The generic read and write trait. This indicates a structure can be read
/// without additional contextual information.
///
/// All integer and float types implement `ReadWrite` big-endian, as the JVM
/// specification requires.
pub trait ReadWrite
where
    Self: Sized,
{
    fn read_from<T: Read>(reader: &mut T) -> Result<Self>;
    fn write_to<T: Write>(&self, writer: &mut T) -> Result<()>;
}

macro_rules! impl_readwrite_nums {
    ($(($i:ty, $s:literal)),*) => {
        $(
            impl ReadWrite for $i {
                fn read_from<T: Read>(reader: &mut T) -> Result<Self> {
                    let mut bytes = [0u8; $s];
                    reader.read_exact(&mut bytes).map_err(eof_to_truncated)?;
                    Ok(<$i>::from_be_bytes(bytes))
                }
                fn write_to<T: Write>(&self, writer: &mut T) -> Result<()> {
                    writer.write_all(&self.to_be_bytes())?;
                    Ok(())
                }
            }
        )*
    };
}

impl_readwrite_nums! { (u8, 1), (i8, 1), (u16, 2), (i16, 2), (u32, 4), (i32, 4), (u64, 8), (i64, 8), (f32, 4), (f64, 8) }

macro_rules! impl_readwrite_total_floats {
    ($($name:ident),*) => {
        $(
            impl ReadWrite for $name {
                fn read_from<T: Read>(reader: &mut T) -> Result<Self> {
                    ReadWrite::read_from(reader).map($name)
                }
                fn write_to<T: Write>(&self, writer: &mut T) -> Result<()> {
                    ReadWrite::write_to(&self.0, writer)
                }
            }
        )*
    };
}

impl_readwrite_total_floats!(TotalF32, TotalF64);

/// Length-prefixed modified UTF-8, the encoding of every string in a class file.
impl ReadWrite for String {
    fn read_from<T: Read>(reader: &mut T) -> Result<Self> {
        let length = u16::read_from(reader)?;
        let mut buf = vec![0; length as usize];
        reader.read_exact(&mut buf).map_err(eof_to_truncated)?;
        Ok(modified_utf8_to_string(&buf))
    }

    fn write_to<T: Write>(&self, writer: &mut T) -> Result<()> {
        let string = string_to_modified_utf8(self);
        (string.len() as u16).write_to(writer)?;
        writer.write_all(&string)?;
        Ok(())
    }
}
