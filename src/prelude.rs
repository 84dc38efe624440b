//! Re-exports

pub use std::io::{Read, Write};

pub use crate::attr::Attribute;
pub use crate::clazz::ClassFile;
pub use crate::constant::{
    Constant, ConstantKind, DynamicConst, MethodHandle, NameAndType, ReferenceKind,
};
pub use crate::cp::ConstantPool;
pub use crate::error::{Error, Result};
pub use crate::flags::{ClassFlags, FieldFlags, MethodFlags};
pub use crate::graph::{Block, BlockId, BlockKind, Edge, EdgeKind, InsnGraph};
pub use crate::insn::{
    GetOrPut, Instruction, InvokeKind, JumpCondition, LocalType, MemberType,
};
pub use crate::member::{Field, MemberRef, Method};
pub use crate::rw::ReadWrite;
pub use crate::total_floats::{TotalF32, TotalF64};
pub use crate::ty::{parse_field_descriptor, parse_method_descriptor, Type};
pub use crate::version::JavaVersion;
