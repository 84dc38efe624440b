//! Members of a java class: fields and methods.

use std::fmt::{Display, Formatter};
use std::io::{Read, Write};

use crate::attr::Attribute;
use crate::cp::ConstantPool;
use crate::flags::{FieldFlags, MethodFlags};
use crate::rw::ReadWrite;
use crate::ty::{parse_field_descriptor, parse_method_descriptor, Type};
use crate::Result;

/// A reference to a member, the form instructions use to name a field or a
/// method: owner class, member name, and descriptor.
#[derive(Debug, Clone, Eq, Hash, PartialEq)]
pub struct MemberRef {
    /// The internal name of the class holding this member.
    pub owner: String,
    /// The name of this member.
    pub name: String,
    /// The descriptor of this member, field or method.
    pub descriptor: Type,
}

impl MemberRef {
    pub fn new<O: Into<String>, N: Into<String>>(owner: O, name: N, descriptor: Type) -> MemberRef {
        MemberRef {
            owner: owner.into(),
            name: name.into(),
            descriptor,
        }
    }
}

impl Display for MemberRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}:{}", self.owner, self.name, self.descriptor)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub access: FieldFlags,
    pub name: String,
    pub descriptor: Type,
    pub attributes: Vec<Attribute>,
}

impl Field {
    pub fn new<N: Into<String>>(name: N, descriptor: Type) -> Field {
        Field {
            access: FieldFlags::empty(),
            name: name.into(),
            descriptor,
            attributes: Vec::new(),
        }
    }

    /// The reference tuple for this field as a member of `owner`.
    pub fn member_ref(&self, owner: &str) -> MemberRef {
        MemberRef::new(owner, self.name.clone(), self.descriptor.clone())
    }

    pub fn read_from<R: Read>(pool: &ConstantPool, reader: &mut R) -> Result<Field> {
        let access = FieldFlags::read_from(reader)?;
        let name = pool.get_utf8(u16::read_from(reader)?)?.to_owned();
        let descriptor = parse_field_descriptor(pool.get_utf8(u16::read_from(reader)?)?)?;
        let attributes = read_attributes(pool, reader)?;
        Ok(Field {
            access,
            name,
            descriptor,
            attributes,
        })
    }

    pub fn write_to<W: Write>(&self, pool: &mut ConstantPool, writer: &mut W) -> Result<()> {
        self.access.write_to(writer)?;
        pool.add_utf8(self.name.clone()).write_to(writer)?;
        pool.add_utf8(self.descriptor.to_string()).write_to(writer)?;
        write_attributes(&self.attributes, pool, writer)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub access: MethodFlags,
    pub name: String,
    /// Always a `Type::Method` descriptor.
    pub descriptor: Type,
    pub attributes: Vec<Attribute>,
}

impl Method {
    pub fn new<N: Into<String>, P: Into<Vec<Type>>>(
        name: N,
        parameters: P,
        ret: Option<Type>,
    ) -> Method {
        Method {
            access: MethodFlags::empty(),
            name: name.into(),
            descriptor: Type::method(parameters, ret),
            attributes: Vec::new(),
        }
    }

    /// The argument types of this method.
    pub fn parameters(&self) -> &[Type] {
        match &self.descriptor {
            Type::Method { parameters, .. } => parameters,
            _ => &[],
        }
    }

    /// The return type of this method, `None` meaning `void`.
    pub fn return_type(&self) -> Option<&Type> {
        match &self.descriptor {
            Type::Method { ret, .. } => ret.as_deref(),
            _ => None,
        }
    }

    /// The reference tuple for this method as a member of `owner`.
    pub fn member_ref(&self, owner: &str) -> MemberRef {
        MemberRef::new(owner, self.name.clone(), self.descriptor.clone())
    }

    pub fn read_from<R: Read>(pool: &ConstantPool, reader: &mut R) -> Result<Method> {
        let access = MethodFlags::read_from(reader)?;
        let name = pool.get_utf8(u16::read_from(reader)?)?.to_owned();
        let (parameters, ret) =
            parse_method_descriptor(pool.get_utf8(u16::read_from(reader)?)?)?;
        let attributes = read_attributes(pool, reader)?;
        Ok(Method {
            access,
            name,
            descriptor: Type::method(parameters, ret),
            attributes,
        })
    }

    pub fn write_to<W: Write>(&self, pool: &mut ConstantPool, writer: &mut W) -> Result<()> {
        self.access.write_to(writer)?;
        pool.add_utf8(self.name.clone()).write_to(writer)?;
        pool.add_utf8(self.descriptor.to_string()).write_to(writer)?;
        write_attributes(&self.attributes, pool, writer)
    }
}

pub(crate) fn read_attributes<R: Read>(
    pool: &ConstantPool,
    reader: &mut R,
) -> Result<Vec<Attribute>> {
    let count = u16::read_from(reader)?;
    let mut attributes = Vec::with_capacity(count as usize);
    for _ in 0..count {
        attributes.push(Attribute::read_from(pool, reader)?);
    }
    Ok(attributes)
}

pub(crate) fn write_attributes<W: Write>(
    attributes: &[Attribute],
    pool: &mut ConstantPool,
    writer: &mut W,
) -> Result<()> {
    (attributes.len() as u16).write_to(writer)?;
    for attribute in attributes {
        attribute.write_to(pool, writer)?;
    }
    Ok(())
}
