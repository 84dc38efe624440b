//! Access flag bitsets for classes, fields and methods.

use std::io::{Read, Write};

use crate::rw::ReadWrite;
use crate::Result;

bitflags! {
    pub struct ClassFlags: u16 {
        const PUBLIC     = 0x0001;
        const FINAL      = 0x0010;
        const SUPER      = 0x0020;
        const INTERFACE  = 0x0200;
        const ABSTRACT   = 0x0400;
        const SYNTHETIC  = 0x1000;
        const ANNOTATION = 0x2000;
        const ENUM       = 0x4000;
        const MODULE     = 0x8000;
    }
}

bitflags! {
    pub struct FieldFlags: u16 {
        const PUBLIC    = 0x0001;
        const PRIVATE   = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC    = 0x0008;
        const FINAL     = 0x0010;
        const VOLATILE  = 0x0040;
        const TRANSIENT = 0x0080;
        const SYNTHETIC = 0x1000;
        const ENUM      = 0x4000;
    }
}

bitflags! {
    pub struct MethodFlags: u16 {
        const PUBLIC       = 0x0001;
        const PRIVATE      = 0x0002;
        const PROTECTED    = 0x0004;
        const STATIC       = 0x0008;
        const FINAL        = 0x0010;
        const SYNCHRONIZED = 0x0020;
        const BRIDGE       = 0x0040;
        const VARARGS      = 0x0080;
        const NATIVE       = 0x0100;
        const ABSTRACT     = 0x0400;
        const STRICT       = 0x0800;
        const SYNTHETIC    = 0x1000;
    }
}

macro_rules! impl_readwrite_flags {
    ($($name:ident),*) => {
        $(
            impl ReadWrite for $name {
                fn read_from<T: Read>(reader: &mut T) -> Result<Self> {
                    // Unknown bits are dropped rather than rejected; newer
                    // JVM releases may define flags this crate predates.
                    Ok($name::from_bits_truncate(u16::read_from(reader)?))
                }

                fn write_to<T: Write>(&self, writer: &mut T) -> Result<()> {
                    self.bits().write_to(writer)
                }
            }
        )*
    };
}

impl_readwrite_flags!(ClassFlags, FieldFlags, MethodFlags);
