//! Arabica is a lightweight and fast library for reading, manipulating and
//! writing Java classes.
//!
//! The heart of the crate is the constant pool: an indexed, bidirectional
//! table of typed constants that the rest of the class file points into.
//! Decoding resolves the pool's cross-references in an order-independent
//! way, so forward references are fine; encoding deduplicates, so an equal
//! constant is only ever stored once. A class read and written without
//! edits round-trips byte-for-byte.
//!
//! [`ClassFile`] owns the pool and the metadata around it; [`InsnGraph`]
//! models a method body as blocks of instructions joined by typed edges.
//!
//! [`ClassFile`]: crate::clazz::ClassFile
//! [`InsnGraph`]: crate::graph::InsnGraph

#[macro_use]
extern crate bitflags;

pub mod attr;
pub mod clazz;
pub mod constant;
pub mod cp;
pub mod error;
pub mod flags;
pub mod graph;
pub mod insn;
pub mod member;
pub mod mod_utf8;
pub mod prelude;
pub mod rw;
pub mod total_floats;
pub mod ty;
pub mod version;

pub use crate::error::{Error, Result};
pub use crate::rw::ReadWrite;

#[cfg(test)]
mod tests;
