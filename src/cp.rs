//! The constant pool: an indexed, bidirectional container of constants.
//!
//! Indices are 1-based; index 0 is reserved and never holds a constant.
//! Long and double constants occupy two consecutive slots and the second
//! slot is never assigned. The pool is bidirectional so that adding an
//! already-present constant returns its existing index instead of growing
//! the table.

use std::collections::VecDeque;
use std::io::{Read, Write};

use indexmap::IndexMap;
use log::{debug, trace};

use crate::constant::{read_entry, Constant, Entry, RawEntry};
use crate::error::Error;
use crate::rw::ReadWrite;
use crate::version::JavaVersion;
use crate::Result;

#[derive(Debug, Clone)]
pub struct ConstantPool {
    forward: IndexMap<u16, Constant>,
    backward: IndexMap<Constant, u16>,
    next_index: u16,
}

impl Default for ConstantPool {
    fn default() -> Self {
        ConstantPool::new()
    }
}

impl ConstantPool {
    pub fn new() -> ConstantPool {
        ConstantPool {
            forward: IndexMap::new(),
            backward: IndexMap::new(),
            next_index: 1,
        }
    }

    /// Decodes a pool from the stream.
    ///
    /// Primitive-valued constants resolve in the first pass. Reference-bearing
    /// constants are queued as raw index tuples and promoted by a fix-up loop
    /// that runs until the queue drains; forward references simply wait a
    /// cycle until their referents appear. The constant grammar is acyclic so
    /// every pass over a well-formed queue resolves at least one entry; a pass
    /// that resolves nothing means the input references are cyclic or dangling
    /// and decoding fails with `UnresolvableReferences`.
    pub fn read<R: Read>(version: JavaVersion, reader: &mut R) -> Result<ConstantPool> {
        let count = u16::read_from(reader)?;
        let mut pool = ConstantPool::new();
        let mut queue: VecDeque<(u16, RawEntry)> = VecDeque::new();

        // u32 so a wide constant in the last slot of a full pool cannot
        // overflow the walk.
        let mut offset: u32 = 1;
        while offset < count as u32 {
            let entry = read_entry(version, reader)?;
            let stride = if entry.wide() { 2 } else { 1 };
            match entry {
                Entry::Resolved(constant) => pool.install(offset as u16, constant),
                Entry::Deferred(raw) => queue.push_back((offset as u16, raw)),
            }
            offset += stride;
        }
        pool.next_index = offset.min(u16::MAX as u32) as u16;

        if !queue.is_empty() {
            debug!("resolving {} deferred constant pool entries", queue.len());
        }
        let mut remaining = queue.len();
        let mut progressed = false;
        while let Some((index, raw)) = queue.pop_front() {
            match raw.dereference(&pool.forward)? {
                Some(constant) => {
                    pool.install(index, constant);
                    progressed = true;
                }
                None => queue.push_back((index, raw)),
            }
            remaining -= 1;
            if remaining == 0 {
                if queue.is_empty() {
                    break;
                }
                if !progressed {
                    return Err(Error::UnresolvableReferences(queue.len()));
                }
                trace!("fix-up pass done, {} entries left", queue.len());
                remaining = queue.len();
                progressed = false;
            }
        }

        Ok(pool)
    }

    /// Encodes the pool: the entry count followed by each occupied slot in
    /// index order. Reference-bearing constants may append their referents
    /// while the walk is in progress; the walk re-reads `next_index` every
    /// step so appended entries are serialized too, and the count is written
    /// only once the walk has settled.
    pub fn write_to<W: Write>(&mut self, writer: &mut W) -> Result<()> {
        let mut buf = Vec::new();
        let mut offset: u16 = 1;
        while offset < self.next_index {
            let slot = self.forward.get(&offset).cloned();
            offset += match slot {
                Some(constant) => {
                    constant.write_to(self, &mut buf)?;
                    if constant.is_wide() {
                        2
                    } else {
                        1
                    }
                }
                // The unassigned second slot of a wide constant.
                None => 1,
            };
        }
        self.next_index.write_to(writer)?;
        writer.write_all(&buf)?;
        Ok(())
    }

    fn install(&mut self, index: u16, constant: Constant) {
        // First index wins in the backward map, so files that contain
        // duplicate values keep their original layout on rewrite.
        self.backward
            .entry(constant.clone())
            .or_insert(index);
        self.forward.insert(index, constant);
    }

    /// The constant at `index`, if the slot is occupied.
    pub fn get(&self, index: u16) -> Option<&Constant> {
        self.forward.get(&index)
    }

    /// The constant at `index`, or the transient [`Constant::Index`]
    /// placeholder when the slot is empty.
    pub fn get_or_index(&self, index: u16) -> Constant {
        self.forward
            .get(&index)
            .cloned()
            .unwrap_or(Constant::Index(index))
    }

    /// The string payload of the Utf8 constant at `index`.
    pub fn get_utf8(&self, index: u16) -> Result<&str> {
        match self.forward.get(&index) {
            Some(Constant::Utf8(s)) => Ok(s),
            Some(c) => Err(Error::KindMismatch {
                expected: "Utf8",
                actual: c.kind(),
                at: index,
            }),
            None => Err(Error::Unrecognized(
                "constant pool index",
                index.to_string(),
            )),
        }
    }

    /// Inserts a constant, returning its index. An equal constant already in
    /// the pool yields the existing index; an [`Constant::Index`] argument
    /// returns its position without touching the pool — the discipline used
    /// by write paths that already know the index of a constant they do not
    /// own. Strings coerce to Utf8 constants via `Into`.
    pub fn add<C: Into<Constant>>(&mut self, constant: C) -> u16 {
        let constant = constant.into();
        if let Constant::Index(n) = constant {
            return n;
        }
        if let Some(&index) = self.backward.get(&constant) {
            return index;
        }
        let index = self.next_index;
        self.next_index += if constant.is_wide() { 2 } else { 1 };
        self.forward.insert(index, constant.clone());
        self.backward.insert(constant, index);
        index
    }

    pub fn add_utf8<S: Into<String>>(&mut self, s: S) -> u16 {
        self.add(Constant::Utf8(s.into()))
    }

    pub fn add_class<S: Into<String>>(&mut self, name: S) -> u16 {
        self.add(Constant::Class(name.into()))
    }

    pub fn add_string<S: Into<String>>(&mut self, s: S) -> u16 {
        self.add(Constant::String(s.into()))
    }

    /// Binds `constant` to a previously unresolved slot. Rebinding an
    /// occupied slot is not permitted and fails with `SlotOccupied`;
    /// index 0 and slots past the end of the pool are rejected as well.
    pub fn set(&mut self, index: u16, constant: Constant) -> Result<()> {
        if index == 0 || index >= self.next_index {
            return Err(Error::Unrecognized(
                "constant pool index",
                index.to_string(),
            ));
        }
        if self.forward.contains_key(&index) {
            return Err(Error::SlotOccupied(index));
        }
        self.install(index, constant);
        Ok(())
    }

    /// Membership by value.
    pub fn contains(&self, constant: &Constant) -> bool {
        match constant {
            Constant::Index(n) => self.forward.contains_key(n),
            c => self.backward.contains_key(c),
        }
    }

    /// Membership by index.
    pub fn is_occupied(&self, index: u16) -> bool {
        self.forward.contains_key(&index)
    }

    /// The number of logical entries. Wide constants count once even though
    /// they occupy two slots.
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Occupied slots in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = (u16, &Constant)> {
        (1..self.next_index).filter_map(move |i| self.forward.get(&i).map(|c| (i, c)))
    }

    pub fn clear(&mut self) {
        self.forward.clear();
        self.backward.clear();
        self.next_index = 1;
    }
}
