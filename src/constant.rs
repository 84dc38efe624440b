//! The typed constant taxonomy: every entry that can appear in a constant
//! pool, its tag, width and minimum class file version, and the three
//! operations each entry supports — decoding from bytes, promoting deferred
//! index tuples to resolved values, and encoding back to bytes.

use std::convert::TryFrom;
use std::fmt::{Display, Formatter};
use std::io::{Read, Write};

use indexmap::IndexMap;

use crate::cp::ConstantPool;
use crate::error::{eof_to_truncated, Error};
use crate::member::MemberRef;
use crate::rw::ReadWrite;
use crate::total_floats::{TotalF32, TotalF64};
use crate::ty::{parse_descriptor, Type};
use crate::version::JavaVersion;
use crate::Result;

/// The closed set of constant variants. This is the compile-time table from
/// tag byte to variant; tags 2, 13 and 14 are reserved and absent.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ConstantKind {
    /// The transient placeholder for an unbound pool slot. It has no wire
    /// tag and is never serialized.
    Index,
    Utf8,
    Integer,
    Float,
    Long,
    Double,
    Class,
    String,
    FieldRef,
    MethodRef,
    InterfaceMethodRef,
    NameAndType,
    MethodHandle,
    MethodType,
    Dynamic,
    InvokeDynamic,
    Module,
    Package,
}

impl ConstantKind {
    pub fn from_tag(tag: u8) -> Option<ConstantKind> {
        Some(match tag {
            1 => ConstantKind::Utf8,
            3 => ConstantKind::Integer,
            4 => ConstantKind::Float,
            5 => ConstantKind::Long,
            6 => ConstantKind::Double,
            7 => ConstantKind::Class,
            8 => ConstantKind::String,
            9 => ConstantKind::FieldRef,
            10 => ConstantKind::MethodRef,
            11 => ConstantKind::InterfaceMethodRef,
            12 => ConstantKind::NameAndType,
            15 => ConstantKind::MethodHandle,
            16 => ConstantKind::MethodType,
            17 => ConstantKind::Dynamic,
            18 => ConstantKind::InvokeDynamic,
            19 => ConstantKind::Module,
            20 => ConstantKind::Package,
            _ => return None,
        })
    }

    /// The wire tag. `Index` has no tag and returns 0, which never matches
    /// [`from_tag`](ConstantKind::from_tag).
    pub fn tag(self) -> u8 {
        match self {
            ConstantKind::Index => 0,
            ConstantKind::Utf8 => 1,
            ConstantKind::Integer => 3,
            ConstantKind::Float => 4,
            ConstantKind::Long => 5,
            ConstantKind::Double => 6,
            ConstantKind::Class => 7,
            ConstantKind::String => 8,
            ConstantKind::FieldRef => 9,
            ConstantKind::MethodRef => 10,
            ConstantKind::InterfaceMethodRef => 11,
            ConstantKind::NameAndType => 12,
            ConstantKind::MethodHandle => 15,
            ConstantKind::MethodType => 16,
            ConstantKind::Dynamic => 17,
            ConstantKind::InvokeDynamic => 18,
            ConstantKind::Module => 19,
            ConstantKind::Package => 20,
        }
    }

    /// Wide constants occupy two consecutive pool slots.
    pub fn wide(self) -> bool {
        matches!(self, ConstantKind::Long | ConstantKind::Double)
    }

    /// The class file version that introduced this constant.
    pub fn since(self) -> JavaVersion {
        match self {
            ConstantKind::MethodHandle | ConstantKind::MethodType | ConstantKind::InvokeDynamic => {
                JavaVersion::JAVA_7
            }
            ConstantKind::Module | ConstantKind::Package => JavaVersion::JAVA_9,
            ConstantKind::Dynamic => JavaVersion::JAVA_11,
            _ => JavaVersion::JAVA_1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ConstantKind::Index => "Index",
            ConstantKind::Utf8 => "Utf8",
            ConstantKind::Integer => "Integer",
            ConstantKind::Float => "Float",
            ConstantKind::Long => "Long",
            ConstantKind::Double => "Double",
            ConstantKind::Class => "Class",
            ConstantKind::String => "String",
            ConstantKind::FieldRef => "FieldRef",
            ConstantKind::MethodRef => "MethodRef",
            ConstantKind::InterfaceMethodRef => "InterfaceMethodRef",
            ConstantKind::NameAndType => "NameAndType",
            ConstantKind::MethodHandle => "MethodHandle",
            ConstantKind::MethodType => "MethodType",
            ConstantKind::Dynamic => "Dynamic",
            ConstantKind::InvokeDynamic => "InvokeDynamic",
            ConstantKind::Module => "Module",
            ConstantKind::Package => "Package",
        }
    }
}

impl Display for ConstantKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A name paired with a field or method descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NameAndType {
    pub name: String,
    pub descriptor: Type,
}

impl NameAndType {
    pub fn new<N: Into<String>>(name: N, descriptor: Type) -> NameAndType {
        NameAndType {
            name: name.into(),
            descriptor,
        }
    }
}

/// The 1..=9 classifier of a method handle's target.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ReferenceKind {
    GetField = 1,
    GetStatic = 2,
    PutField = 3,
    PutStatic = 4,
    InvokeVirtual = 5,
    InvokeStatic = 6,
    InvokeSpecial = 7,
    NewInvokeSpecial = 8,
    InvokeInterface = 9,
}

impl TryFrom<u8> for ReferenceKind {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Ok(match value {
            1 => ReferenceKind::GetField,
            2 => ReferenceKind::GetStatic,
            3 => ReferenceKind::PutField,
            4 => ReferenceKind::PutStatic,
            5 => ReferenceKind::InvokeVirtual,
            6 => ReferenceKind::InvokeStatic,
            7 => ReferenceKind::InvokeSpecial,
            8 => ReferenceKind::NewInvokeSpecial,
            9 => ReferenceKind::InvokeInterface,
            n => return Err(Error::Unrecognized("reference kind", n.to_string())),
        })
    }
}

/// A method handle constant.
///
/// The JVM specification constrains the referent variant per kind (1–4 want
/// a field ref, 5–8 a method ref, 9 an interface method ref), but this
/// layer deliberately accepts any of the three and leaves kind checking to
/// a validator above it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodHandle {
    pub kind: ReferenceKind,
    /// One of `FieldRef`, `MethodRef` or `InterfaceMethodRef`.
    pub reference: Box<Constant>,
}

/// A dynamically computed constant or call site.
///
/// The bootstrap method is kept as a raw index into the class file's
/// `BootstrapMethods` attribute, which this crate treats as an opaque blob.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DynamicConst {
    pub bootstrap_index: u16,
    pub name_and_type: NameAndType,
}

/// A resolved constant pool entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Constant {
    /// A pool position that has not been bound to a constant. It exists only
    /// transiently in lookup results and is never written.
    Index(u16),
    Utf8(String),
    Integer(i32),
    Float(TotalF32),
    Long(i64),
    Double(TotalF64),
    /// A class or interface, by internal name such as `java/lang/Object`.
    /// Array classes use descriptor syntax, `[I` or `[Ljava/lang/String;`.
    Class(String),
    String(String),
    FieldRef(MemberRef),
    MethodRef(MemberRef),
    InterfaceMethodRef(MemberRef),
    NameAndType(NameAndType),
    MethodHandle(MethodHandle),
    /// A method descriptor. The payload is always `Type::Method`.
    MethodType(Type),
    Dynamic(DynamicConst),
    InvokeDynamic(DynamicConst),
    Module(String),
    Package(String),
}

impl Constant {
    pub fn kind(&self) -> ConstantKind {
        match self {
            Constant::Index(_) => ConstantKind::Index,
            Constant::Utf8(_) => ConstantKind::Utf8,
            Constant::Integer(_) => ConstantKind::Integer,
            Constant::Float(_) => ConstantKind::Float,
            Constant::Long(_) => ConstantKind::Long,
            Constant::Double(_) => ConstantKind::Double,
            Constant::Class(_) => ConstantKind::Class,
            Constant::String(_) => ConstantKind::String,
            Constant::FieldRef(_) => ConstantKind::FieldRef,
            Constant::MethodRef(_) => ConstantKind::MethodRef,
            Constant::InterfaceMethodRef(_) => ConstantKind::InterfaceMethodRef,
            Constant::NameAndType(_) => ConstantKind::NameAndType,
            Constant::MethodHandle(_) => ConstantKind::MethodHandle,
            Constant::MethodType(_) => ConstantKind::MethodType,
            Constant::Dynamic(_) => ConstantKind::Dynamic,
            Constant::InvokeDynamic(_) => ConstantKind::InvokeDynamic,
            Constant::Module(_) => ConstantKind::Module,
            Constant::Package(_) => ConstantKind::Package,
        }
    }

    #[inline]
    pub fn is_wide(&self) -> bool {
        self.kind().wide()
    }

    /// The reference type a `Class` constant denotes: array names parse as
    /// field descriptors, anything else is a plain reference.
    pub fn class_type(&self) -> Option<Type> {
        match self {
            Constant::Class(name) if name.starts_with('[') => {
                crate::ty::parse_field_descriptor(name).ok()
            }
            Constant::Class(name) => Some(Type::Ref(name.clone())),
            _ => None,
        }
    }

    /// Serializes this constant, requesting pool indices for its referents.
    pub(crate) fn write_to<W: Write>(
        &self,
        pool: &mut ConstantPool,
        writer: &mut W,
    ) -> Result<()> {
        if let Constant::Index(_) = self {
            return Err(Error::Unrecognized(
                "constant",
                "unbound index placeholder".to_owned(),
            ));
        }
        self.kind().tag().write_to(writer)?;
        match self {
            Constant::Index(_) => unreachable!(),
            Constant::Utf8(s) => s.write_to(writer),
            Constant::Integer(i) => i.write_to(writer),
            Constant::Float(f) => f.write_to(writer),
            Constant::Long(l) => l.write_to(writer),
            Constant::Double(d) => d.write_to(writer),
            Constant::Class(name) | Constant::Module(name) | Constant::Package(name) => {
                pool.add_utf8(name.clone()).write_to(writer)
            }
            Constant::String(s) => pool.add_utf8(s.clone()).write_to(writer),
            Constant::FieldRef(m) | Constant::MethodRef(m) | Constant::InterfaceMethodRef(m) => {
                pool.add(Constant::Class(m.owner.clone())).write_to(writer)?;
                pool.add(Constant::NameAndType(NameAndType {
                    name: m.name.clone(),
                    descriptor: m.descriptor.clone(),
                }))
                .write_to(writer)
            }
            Constant::NameAndType(nt) => {
                pool.add_utf8(nt.name.clone()).write_to(writer)?;
                pool.add_utf8(nt.descriptor.to_string()).write_to(writer)
            }
            Constant::MethodHandle(h) => {
                (h.kind as u8).write_to(writer)?;
                pool.add((*h.reference).clone()).write_to(writer)
            }
            Constant::MethodType(t) => pool.add_utf8(t.to_string()).write_to(writer),
            Constant::Dynamic(d) | Constant::InvokeDynamic(d) => {
                d.bootstrap_index.write_to(writer)?;
                pool.add(Constant::NameAndType(d.name_and_type.clone()))
                    .write_to(writer)
            }
        }
    }
}

impl From<&str> for Constant {
    fn from(s: &str) -> Constant {
        Constant::Utf8(s.to_owned())
    }
}

impl From<String> for Constant {
    fn from(s: String) -> Constant {
        Constant::Utf8(s)
    }
}

impl From<i32> for Constant {
    fn from(i: i32) -> Constant {
        Constant::Integer(i)
    }
}

impl From<i64> for Constant {
    fn from(l: i64) -> Constant {
        Constant::Long(l)
    }
}

impl From<f32> for Constant {
    fn from(f: f32) -> Constant {
        Constant::Float(TotalF32(f))
    }
}

impl From<f64> for Constant {
    fn from(d: f64) -> Constant {
        Constant::Double(TotalF64(d))
    }
}

impl Display for Constant {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Constant::Index(i) => write!(f, "#{}", i),
            Constant::Utf8(s) | Constant::String(s) => write!(f, "{:?}", s),
            Constant::Integer(i) => i.fmt(f),
            Constant::Float(v) => v.fmt(f),
            Constant::Long(l) => l.fmt(f),
            Constant::Double(v) => v.fmt(f),
            Constant::Class(n) | Constant::Module(n) | Constant::Package(n) => f.write_str(n),
            Constant::FieldRef(m) | Constant::MethodRef(m) | Constant::InterfaceMethodRef(m) => {
                m.fmt(f)
            }
            Constant::NameAndType(nt) => write!(f, "{}:{}", nt.name, nt.descriptor),
            Constant::MethodHandle(h) => write!(f, "{:?} {}", h.kind, h.reference),
            Constant::MethodType(t) => t.fmt(f),
            Constant::Dynamic(d) | Constant::InvokeDynamic(d) => {
                write!(f, "#{}:{}:{}", d.bootstrap_index, d.name_and_type.name, d.name_and_type.descriptor)
            }
        }
    }
}

/// A reference-bearing entry whose referents are still raw pool indices.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum RawEntry {
    Class(u16),
    String(u16),
    FieldRef(u16, u16),
    MethodRef(u16, u16),
    InterfaceMethodRef(u16, u16),
    NameAndType(u16, u16),
    MethodHandle(u8, u16),
    MethodType(u16),
    Dynamic(u16, u16),
    InvokeDynamic(u16, u16),
    Module(u16),
    Package(u16),
}

/// The outcome of decoding one pool entry: primitive-valued constants
/// resolve immediately, reference-bearing ones defer to the fix-up loop.
pub(crate) enum Entry {
    Resolved(Constant),
    Deferred(RawEntry),
}

impl Entry {
    pub(crate) fn wide(&self) -> bool {
        match self {
            Entry::Resolved(c) => c.is_wide(),
            Entry::Deferred(_) => false,
        }
    }
}

/// Decodes a single tagged entry. Fails with `UnknownConstantTag` on a tag
/// outside the table and with `VersionTooLow` when the declared file version
/// predates the constant.
pub(crate) fn read_entry<R: Read>(version: JavaVersion, reader: &mut R) -> Result<Entry> {
    let tag = u8::read_from(reader)?;
    let kind = ConstantKind::from_tag(tag).ok_or(Error::UnknownConstantTag(tag))?;
    if !version.supports(kind.since()) {
        return Err(Error::VersionTooLow {
            kind,
            since: kind.since(),
            actual: version,
        });
    }
    Ok(match kind {
        ConstantKind::Utf8 => {
            let length = u16::read_from(reader)?;
            let mut buf = vec![0; length as usize];
            reader.read_exact(&mut buf).map_err(eof_to_truncated)?;
            Entry::Resolved(Constant::Utf8(crate::mod_utf8::modified_utf8_to_string(&buf)))
        }
        ConstantKind::Integer => Entry::Resolved(Constant::Integer(i32::read_from(reader)?)),
        ConstantKind::Float => Entry::Resolved(Constant::Float(TotalF32::read_from(reader)?)),
        ConstantKind::Long => Entry::Resolved(Constant::Long(i64::read_from(reader)?)),
        ConstantKind::Double => Entry::Resolved(Constant::Double(TotalF64::read_from(reader)?)),
        ConstantKind::Class => Entry::Deferred(RawEntry::Class(u16::read_from(reader)?)),
        ConstantKind::String => Entry::Deferred(RawEntry::String(u16::read_from(reader)?)),
        ConstantKind::FieldRef => Entry::Deferred(RawEntry::FieldRef(
            u16::read_from(reader)?,
            u16::read_from(reader)?,
        )),
        ConstantKind::MethodRef => Entry::Deferred(RawEntry::MethodRef(
            u16::read_from(reader)?,
            u16::read_from(reader)?,
        )),
        ConstantKind::InterfaceMethodRef => Entry::Deferred(RawEntry::InterfaceMethodRef(
            u16::read_from(reader)?,
            u16::read_from(reader)?,
        )),
        ConstantKind::NameAndType => Entry::Deferred(RawEntry::NameAndType(
            u16::read_from(reader)?,
            u16::read_from(reader)?,
        )),
        ConstantKind::MethodHandle => Entry::Deferred(RawEntry::MethodHandle(
            u8::read_from(reader)?,
            u16::read_from(reader)?,
        )),
        ConstantKind::MethodType => Entry::Deferred(RawEntry::MethodType(u16::read_from(reader)?)),
        ConstantKind::Dynamic => Entry::Deferred(RawEntry::Dynamic(
            u16::read_from(reader)?,
            u16::read_from(reader)?,
        )),
        ConstantKind::InvokeDynamic => Entry::Deferred(RawEntry::InvokeDynamic(
            u16::read_from(reader)?,
            u16::read_from(reader)?,
        )),
        ConstantKind::Module => Entry::Deferred(RawEntry::Module(u16::read_from(reader)?)),
        ConstantKind::Package => Entry::Deferred(RawEntry::Package(u16::read_from(reader)?)),
        ConstantKind::Index => unreachable!("Index has no wire tag"),
    })
}

type Lookups = IndexMap<u16, Constant>;

fn expect_utf8(lookups: &Lookups, at: u16) -> Result<Option<&str>> {
    match lookups.get(&at) {
        None => Ok(None),
        Some(Constant::Utf8(s)) => Ok(Some(s)),
        Some(c) => Err(Error::KindMismatch {
            expected: "Utf8",
            actual: c.kind(),
            at,
        }),
    }
}

fn expect_class(lookups: &Lookups, at: u16) -> Result<Option<&str>> {
    match lookups.get(&at) {
        None => Ok(None),
        Some(Constant::Class(n)) => Ok(Some(n)),
        Some(c) => Err(Error::KindMismatch {
            expected: "Class",
            actual: c.kind(),
            at,
        }),
    }
}

fn expect_name_and_type(lookups: &Lookups, at: u16) -> Result<Option<&NameAndType>> {
    match lookups.get(&at) {
        None => Ok(None),
        Some(Constant::NameAndType(nt)) => Ok(Some(nt)),
        Some(c) => Err(Error::KindMismatch {
            expected: "NameAndType",
            actual: c.kind(),
            at,
        }),
    }
}

fn member_of(lookups: &Lookups, owner_at: u16, nt_at: u16) -> Result<Option<MemberRef>> {
    let owner = expect_class(lookups, owner_at)?;
    let nt = expect_name_and_type(lookups, nt_at)?;
    Ok(owner.zip(nt).map(|(owner, nt)| MemberRef {
        owner: owner.to_owned(),
        name: nt.name.clone(),
        descriptor: nt.descriptor.clone(),
    }))
}

impl RawEntry {
    /// Attempts to promote this deferred entry against a partially populated
    /// pool. `Ok(None)` means a referent is not present yet; a referent of
    /// the wrong variant is a structural error of the input, not a pending
    /// state, and fails with `KindMismatch`.
    pub(crate) fn dereference(&self, lookups: &Lookups) -> Result<Option<Constant>> {
        Ok(match *self {
            RawEntry::Class(n) => expect_utf8(lookups, n)?
                .map(|n| Constant::Class(n.to_owned())),
            RawEntry::String(s) => expect_utf8(lookups, s)?
                .map(|s| Constant::String(s.to_owned())),
            RawEntry::Module(n) => expect_utf8(lookups, n)?
                .map(|n| Constant::Module(n.to_owned())),
            RawEntry::Package(n) => expect_utf8(lookups, n)?
                .map(|n| Constant::Package(n.to_owned())),
            RawEntry::FieldRef(o, nt) => member_of(lookups, o, nt)?.map(Constant::FieldRef),
            RawEntry::MethodRef(o, nt) => member_of(lookups, o, nt)?.map(Constant::MethodRef),
            RawEntry::InterfaceMethodRef(o, nt) => {
                member_of(lookups, o, nt)?.map(Constant::InterfaceMethodRef)
            }
            RawEntry::NameAndType(n, d) => {
                let name = expect_utf8(lookups, n)?;
                let descriptor = expect_utf8(lookups, d)?;
                match name.zip(descriptor) {
                    Some((name, descriptor)) => Some(Constant::NameAndType(NameAndType {
                        name: name.to_owned(),
                        descriptor: parse_descriptor(descriptor)?,
                    })),
                    None => None,
                }
            }
            RawEntry::MethodType(d) => match expect_utf8(lookups, d)? {
                Some(descriptor) => {
                    let ty = parse_descriptor(descriptor)?;
                    if !ty.is_method() {
                        return Err(Error::InvalidDescriptor(descriptor.to_owned()));
                    }
                    Some(Constant::MethodType(ty))
                }
                None => None,
            },
            RawEntry::MethodHandle(kind, r) => {
                let kind = ReferenceKind::try_from(kind)?;
                match lookups.get(&r) {
                    None => None,
                    Some(c) => match c {
                        Constant::FieldRef(_)
                        | Constant::MethodRef(_)
                        | Constant::InterfaceMethodRef(_) => {
                            Some(Constant::MethodHandle(MethodHandle {
                                kind,
                                reference: Box::new(c.clone()),
                            }))
                        }
                        _ => {
                            return Err(Error::KindMismatch {
                                expected: "FieldRef, MethodRef or InterfaceMethodRef",
                                actual: c.kind(),
                                at: r,
                            })
                        }
                    },
                }
            }
            RawEntry::Dynamic(bsm, nt) => {
                expect_name_and_type(lookups, nt)?.map(|nt| {
                    Constant::Dynamic(DynamicConst {
                        bootstrap_index: bsm,
                        name_and_type: nt.clone(),
                    })
                })
            }
            RawEntry::InvokeDynamic(bsm, nt) => {
                expect_name_and_type(lookups, nt)?.map(|nt| {
                    Constant::InvokeDynamic(DynamicConst {
                        bootstrap_index: bsm,
                        name_and_type: nt.clone(),
                    })
                })
            }
        })
    }
}
