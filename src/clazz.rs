//! The class file skeleton: version, access flags, this/super class,
//! interfaces, members and attributes, with the constant pool they all
//! point into.

use std::io::{Read, Write};

use log::debug;

use crate::attr::Attribute;
use crate::constant::Constant;
use crate::cp::ConstantPool;
use crate::error::Error;
use crate::flags::ClassFlags;
use crate::member::{read_attributes, write_attributes, Field, Method};
use crate::rw::ReadWrite;
use crate::version::JavaVersion;
use crate::Result;

pub const JVM_MAGIC: u32 = 0xCAFE_BABE;

pub const OBJECT: &str = "java/lang/Object";

#[derive(Debug, Clone)]
pub struct ClassFile {
    pub version: JavaVersion,
    pub access: ClassFlags,
    /// The internal name of this class.
    pub name: String,
    /// The name of the super class. `None` only for `java/lang/Object`,
    /// which has no super class.
    pub super_name: Option<String>,
    pub interfaces: Vec<String>,
    pub fields: Vec<Field>,
    pub methods: Vec<Method>,
    pub attributes: Vec<Attribute>,
    /// The pool backing this class. Kept after decoding so an unmutated
    /// class re-serializes byte-identically.
    pub pool: ConstantPool,
}

impl ClassFile {
    /// Creates an empty public class extending `java/lang/Object`, at class
    /// file version 52.0.
    pub fn new<S: Into<String>>(name: S) -> ClassFile {
        ClassFile {
            version: JavaVersion::JAVA_8,
            access: ClassFlags::PUBLIC | ClassFlags::SUPER,
            name: name.into(),
            super_name: Some(OBJECT.to_owned()),
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            attributes: Vec::new(),
            pool: ConstantPool::new(),
        }
    }

    pub fn read_from<R: Read>(reader: &mut R) -> Result<ClassFile> {
        match u32::read_from(reader)? {
            JVM_MAGIC => {}
            n => return Err(Error::Unrecognized("class header", n.to_string())),
        }
        let version = JavaVersion::read_from(reader)?;
        let pool = ConstantPool::read(version, reader)?;
        let access = ClassFlags::read_from(reader)?;

        let name = class_name_at(&pool, u16::read_from(reader)?)?;
        let super_name = match u16::read_from(reader)? {
            0 => None,
            index => Some(class_name_at(&pool, index)?),
        };
        let interface_count = u16::read_from(reader)?;
        let mut interfaces = Vec::with_capacity(interface_count as usize);
        for _ in 0..interface_count {
            interfaces.push(class_name_at(&pool, u16::read_from(reader)?)?);
        }

        let field_count = u16::read_from(reader)?;
        let mut fields = Vec::with_capacity(field_count as usize);
        for _ in 0..field_count {
            fields.push(Field::read_from(&pool, reader)?);
        }
        let method_count = u16::read_from(reader)?;
        let mut methods = Vec::with_capacity(method_count as usize);
        for _ in 0..method_count {
            methods.push(Method::read_from(&pool, reader)?);
        }
        let attributes = read_attributes(&pool, reader)?;

        debug!(
            "read class {} ({} pool entries, {} fields, {} methods)",
            name,
            pool.len(),
            fields.len(),
            methods.len()
        );
        Ok(ClassFile {
            version,
            access,
            name,
            super_name,
            interfaces,
            fields,
            methods,
            attributes,
            pool,
        })
    }

    /// Serializes this class. The body is rendered into a scratch buffer
    /// first so every constant it references lands in the pool, then the
    /// pool and the body are written in wire order.
    pub fn write_to<W: Write>(&mut self, writer: &mut W) -> Result<()> {
        JVM_MAGIC.write_to(writer)?;
        self.version.write_to(writer)?;

        let pool = &mut self.pool;
        let mut body = Vec::new();
        self.access.write_to(&mut body)?;
        pool.add_class(self.name.clone()).write_to(&mut body)?;
        match &self.super_name {
            Some(name) => pool.add_class(name.clone()),
            None => 0,
        }
        .write_to(&mut body)?;
        (self.interfaces.len() as u16).write_to(&mut body)?;
        for interface in &self.interfaces {
            pool.add_class(interface.clone()).write_to(&mut body)?;
        }
        (self.fields.len() as u16).write_to(&mut body)?;
        for field in &self.fields {
            field.write_to(pool, &mut body)?;
        }
        (self.methods.len() as u16).write_to(&mut body)?;
        for method in &self.methods {
            method.write_to(pool, &mut body)?;
        }
        write_attributes(&self.attributes, pool, &mut body)?;

        pool.write_to(writer)?;
        writer.write_all(&body)?;
        Ok(())
    }
}

/// A class metadata index must point at a `Class` constant; anything else
/// is a fatal decoding error.
fn class_name_at(pool: &ConstantPool, index: u16) -> Result<String> {
    match pool.get(index) {
        Some(Constant::Class(name)) => Ok(name.clone()),
        Some(c) => Err(Error::KindMismatch {
            expected: "Class",
            actual: c.kind(),
            at: index,
        }),
        None => Err(Error::Unrecognized(
            "constant pool index",
            index.to_string(),
        )),
    }
}
