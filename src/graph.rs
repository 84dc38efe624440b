//! The per-method control flow graph: labeled blocks of straight-line
//! instructions joined by typed edges.
//!
//! A graph has one entry block, at most one return block and at most one
//! rethrow block; the latter two are terminal markers and stay empty.
//! Control-flow instructions are installed through the graph primitives
//! ([`InsnGraph::jump`], [`InsnGraph::branch`], [`InsnGraph::switch`],
//! [`InsnGraph::return_`], [`InsnGraph::throw_`]), which append the
//! instruction and its edges in lock-step; handing such an instruction to
//! the plain block API is an error.
//!
//! Blocks have two comparison disciplines: identity is the [`BlockId`] a
//! graph hands out, equality is structural over label and instruction
//! sequence. Diffing uses the latter, graph membership the former.

use std::fmt::{Display, Formatter};

use indexmap::IndexMap;

use crate::error::Error;
use crate::insn::{Instruction, JumpCondition, LocalType};
use crate::Result;

/// The identity of a block within its graph.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct BlockId(u32);

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum BlockKind {
    Entry,
    Normal,
    /// The terminal marker every return instruction leads to. Holds no
    /// instructions.
    Return,
    /// The terminal marker for exceptions that leave the method. Holds no
    /// instructions.
    Rethrow,
}

#[derive(Debug, Clone)]
pub struct Block {
    /// Informational only; identity is the block's [`BlockId`].
    pub label: u32,
    kind: BlockKind,
    instructions: Vec<Instruction>,
    /// Hints the layout pass that this block should be merged into its
    /// single predecessor.
    pub inline: bool,
}

/// Structural equality: label and instruction sequence. The block kind and
/// the `inline` hint take no part in comparisons.
impl PartialEq for Block {
    fn eq(&self, other: &Self) -> bool {
        self.label == other.label && self.instructions == other.instructions
    }
}

impl Block {
    fn new(label: u32, kind: BlockKind) -> Block {
        Block {
            label,
            kind,
            instructions: Vec::new(),
            inline: false,
        }
    }

    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn last(&self) -> Option<&Instruction> {
        self.instructions.last()
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, BlockKind::Return | BlockKind::Rethrow)
    }

    fn accepts(&self, insn: &Instruction) -> Result<()> {
        if self.is_terminal() {
            return Err(Error::IllegalInstruction(
                "return and rethrow blocks hold no instructions",
            ));
        }
        if insn.is_terminator() {
            return Err(Error::IllegalInstruction(
                "control-flow instructions must be installed through the graph",
            ));
        }
        Ok(())
    }

    /// Appends an instruction. Control-flow-terminating instructions are
    /// rejected with `IllegalInstruction` and the block is left unchanged;
    /// use the graph primitives, which install the matching edges too.
    pub fn append(&mut self, insn: Instruction) -> Result<()> {
        self.accepts(&insn)?;
        self.instructions.push(insn);
        Ok(())
    }

    /// Inserts an instruction at `index`, with the same checks as
    /// [`append`](Block::append).
    pub fn insert(&mut self, index: usize, insn: Instruction) -> Result<()> {
        self.accepts(&insn)?;
        if index > self.instructions.len() {
            return Err(Error::IllegalInstruction("insertion index out of bounds"));
        }
        self.instructions.insert(index, insn);
        Ok(())
    }

    /// Appends without the control-flow check. Reserved for paths that
    /// reconstruct instructions and edges in lock-step, such as
    /// deserialization.
    pub fn append_unchecked(&mut self, insn: Instruction) {
        self.instructions.push(insn);
    }

    /// Inserts without the control-flow check; see
    /// [`append_unchecked`](Block::append_unchecked). Indices clamp to the
    /// end of the block.
    pub fn insert_unchecked(&mut self, index: usize, insn: Instruction) {
        let index = index.min(self.instructions.len());
        self.instructions.insert(index, insn);
    }

    /// A deep copy with an optional relabel. The copy belongs to no graph
    /// until it is adopted by one.
    pub fn duplicate(&self, label: Option<u32>) -> Block {
        Block {
            label: label.unwrap_or(self.label),
            kind: self.kind,
            instructions: self.instructions.clone(),
            inline: self.inline,
        }
    }
}

impl Display for Block {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            BlockKind::Entry => write!(f, "entry block {}", self.label),
            BlockKind::Normal => write!(f, "block {}", self.label),
            BlockKind::Return => write!(f, "return block {}", self.label),
            BlockKind::Rethrow => write!(f, "rethrow block {}", self.label),
        }
    }
}

/// The kind of a directed edge between two blocks.
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeKind {
    /// Flow runs off the end of the source into the target.
    Fallthrough,
    /// Taken branch of a conditional jump.
    ConditionalTrue,
    /// Untaken branch of a conditional jump.
    ConditionalFalse,
    /// An unconditional jump.
    Jump,
    /// One case of a switch; `None` is the default case.
    Switch(Option<i32>),
    /// An exception handler covering the source block. Orthogonal to
    /// control flow: a block may have any number of these however it
    /// terminates.
    Exception {
        /// Handler order; lower values are tried first.
        priority: u16,
        /// The internal name of the caught class, `None` for a catch-all.
        class: Option<String>,
    },
}

impl EdgeKind {
    pub fn is_exception(&self) -> bool {
        matches!(self, EdgeKind::Exception { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub from: BlockId,
    pub to: BlockId,
    pub kind: EdgeKind,
}

impl Display for Edge {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            EdgeKind::Fallthrough => write!(f, "fallthrough {:?} -> {:?}", self.from, self.to),
            EdgeKind::ConditionalTrue => write!(f, "true {:?} -> {:?}", self.from, self.to),
            EdgeKind::ConditionalFalse => write!(f, "false {:?} -> {:?}", self.from, self.to),
            EdgeKind::Jump => write!(f, "jump {:?} -> {:?}", self.from, self.to),
            EdgeKind::Switch(Some(v)) => {
                write!(f, "switch value {} {:?} -> {:?}", v, self.from, self.to)
            }
            EdgeKind::Switch(None) => write!(f, "switch default {:?} -> {:?}", self.from, self.to),
            EdgeKind::Exception { priority, class } => write!(
                f,
                "catch {} priority {} {:?} -> {:?}",
                class.as_deref().unwrap_or("java/lang/Throwable"),
                priority,
                self.from,
                self.to
            ),
        }
    }
}

/// The control flow graph of one method body.
#[derive(Debug, Clone)]
pub struct InsnGraph {
    blocks: IndexMap<BlockId, Block>,
    edges: Vec<Edge>,
    entry: BlockId,
    ret: Option<BlockId>,
    rethrow: Option<BlockId>,
    next_id: u32,
}

impl InsnGraph {
    /// Creates a graph holding a single empty entry block.
    pub fn new() -> InsnGraph {
        let entry = BlockId(0);
        let mut blocks = IndexMap::new();
        blocks.insert(entry, Block::new(0, BlockKind::Entry));
        InsnGraph {
            blocks,
            edges: Vec::new(),
            entry,
            ret: None,
            rethrow: None,
            next_id: 1,
        }
    }

    pub fn entry(&self) -> BlockId {
        self.entry
    }

    /// The unique return block, created on first use.
    pub fn return_block(&mut self) -> BlockId {
        match self.ret {
            Some(id) => id,
            None => {
                let id = self.fresh(BlockKind::Return);
                self.ret = Some(id);
                id
            }
        }
    }

    /// The unique rethrow block, created on first use.
    pub fn rethrow_block(&mut self) -> BlockId {
        match self.rethrow {
            Some(id) => id,
            None => {
                let id = self.fresh(BlockKind::Rethrow);
                self.rethrow = Some(id);
                id
            }
        }
    }

    /// Adds a new empty block.
    pub fn block(&mut self) -> BlockId {
        self.fresh(BlockKind::Normal)
    }

    /// Adopts a detached block, such as one produced by
    /// [`Block::duplicate`], under a fresh identity.
    pub fn adopt(&mut self, block: Block) -> BlockId {
        let id = BlockId(self.next_id);
        self.next_id += 1;
        self.blocks.insert(id, block);
        id
    }

    fn fresh(&mut self, kind: BlockKind) -> BlockId {
        let id = BlockId(self.next_id);
        self.blocks.insert(id, Block::new(self.next_id, kind));
        self.next_id += 1;
        id
    }

    pub fn get(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(&id)
    }

    pub fn get_mut(&mut self, id: BlockId) -> Option<&mut Block> {
        self.blocks.get_mut(&id)
    }

    fn block_mut(&mut self, id: BlockId) -> Result<&mut Block> {
        self.blocks
            .get_mut(&id)
            .ok_or_else(|| Error::Unrecognized("block", format!("{:?}", id)))
    }

    /// Appends a non-terminating instruction to a block.
    pub fn append(&mut self, id: BlockId, insn: Instruction) -> Result<()> {
        self.block_mut(id)?.append(insn)
    }

    /// A block is open while it has no outgoing control edge and no
    /// terminating instruction.
    fn ensure_open(&self, id: BlockId) -> Result<()> {
        let block = self
            .blocks
            .get(&id)
            .ok_or_else(|| Error::Unrecognized("block", format!("{:?}", id)))?;
        if block.is_terminal() {
            return Err(Error::IllegalInstruction(
                "return and rethrow blocks cannot be extended",
            ));
        }
        if block.last().map_or(false, Instruction::is_terminator) {
            return Err(Error::IllegalInstruction("block is already terminated"));
        }
        if self
            .edges
            .iter()
            .any(|e| e.from == id && !e.kind.is_exception())
        {
            return Err(Error::IllegalInstruction("block already has control edges"));
        }
        Ok(())
    }

    /// Installs an unconditional jump from `from` to `to`.
    pub fn jump(&mut self, from: BlockId, to: BlockId) -> Result<()> {
        self.ensure_open(from)?;
        self.block_mut(from)?
            .append_unchecked(Instruction::Jump(JumpCondition::Always));
        self.edges.push(Edge {
            from,
            to,
            kind: EdgeKind::Jump,
        });
        Ok(())
    }

    /// Installs a conditional jump: `condition` holding continues at
    /// `if_true`, otherwise at `if_false`.
    pub fn branch(
        &mut self,
        from: BlockId,
        condition: JumpCondition,
        if_true: BlockId,
        if_false: BlockId,
    ) -> Result<()> {
        if condition == JumpCondition::Always {
            return Err(Error::IllegalInstruction(
                "unconditional jumps have a single target",
            ));
        }
        self.ensure_open(from)?;
        self.block_mut(from)?
            .append_unchecked(Instruction::Jump(condition));
        self.edges.push(Edge {
            from,
            to: if_true,
            kind: EdgeKind::ConditionalTrue,
        });
        self.edges.push(Edge {
            from,
            to: if_false,
            kind: EdgeKind::ConditionalFalse,
        });
        Ok(())
    }

    /// Installs a switch with its default and case targets.
    pub fn switch<C>(&mut self, from: BlockId, default: BlockId, cases: C) -> Result<()>
    where
        C: IntoIterator<Item = (i32, BlockId)>,
    {
        self.ensure_open(from)?;
        self.block_mut(from)?.append_unchecked(Instruction::Switch);
        self.edges.push(Edge {
            from,
            to: default,
            kind: EdgeKind::Switch(None),
        });
        for (value, to) in cases {
            self.edges.push(Edge {
                from,
                to,
                kind: EdgeKind::Switch(Some(value)),
            });
        }
        Ok(())
    }

    /// Installs a return of `value` (or `void`), leading into the graph's
    /// return block.
    pub fn return_(&mut self, from: BlockId, value: Option<LocalType>) -> Result<()> {
        self.ensure_open(from)?;
        let ret = self.return_block();
        self.block_mut(from)?
            .append_unchecked(Instruction::Return(value));
        self.edges.push(Edge {
            from,
            to: ret,
            kind: EdgeKind::Fallthrough,
        });
        Ok(())
    }

    /// Installs an `athrow`, leading into the graph's rethrow block.
    pub fn throw_(&mut self, from: BlockId) -> Result<()> {
        self.ensure_open(from)?;
        let rethrow = self.rethrow_block();
        self.block_mut(from)?.append_unchecked(Instruction::Throw);
        self.edges.push(Edge {
            from,
            to: rethrow,
            kind: EdgeKind::Fallthrough,
        });
        Ok(())
    }

    /// Installs a fallthrough edge; flow runs off the end of `from` into
    /// `to` without an instruction.
    pub fn fallthrough(&mut self, from: BlockId, to: BlockId) -> Result<()> {
        self.ensure_open(from)?;
        self.edges.push(Edge {
            from,
            to,
            kind: EdgeKind::Fallthrough,
        });
        Ok(())
    }

    /// Covers `from` with the exception handler `handler`, catching `class`
    /// (`None` for a catch-all). Handlers are tried in the order they are
    /// added.
    pub fn catch(&mut self, from: BlockId, handler: BlockId, class: Option<String>) -> Result<()> {
        if !self.blocks.contains_key(&from) || !self.blocks.contains_key(&handler) {
            return Err(Error::Unrecognized("block", format!("{:?}", from)));
        }
        let priority = self
            .edges
            .iter()
            .filter(|e| e.from == from && e.kind.is_exception())
            .count() as u16;
        self.edges.push(Edge {
            from,
            to: handler,
            kind: EdgeKind::Exception { priority, class },
        });
        Ok(())
    }

    pub fn blocks(&self) -> impl Iterator<Item = (BlockId, &Block)> {
        self.blocks.iter().map(|(&id, b)| (id, b))
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edges_from(&self, id: BlockId) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |e| e.from == id)
    }

    pub fn edges_into(&self, id: BlockId) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |e| e.to == id)
    }

    pub fn successors(&self, id: BlockId) -> impl Iterator<Item = BlockId> + '_ {
        self.edges_from(id).map(|e| e.to)
    }

    pub fn predecessors(&self, id: BlockId) -> impl Iterator<Item = BlockId> + '_ {
        self.edges_into(id).map(|e| e.from)
    }

    /// The number of blocks, the entry block included.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Validates the edge invariants and reports the first violation:
    /// a jump has exactly one jump edge and no fallthrough, a conditional
    /// jump has exactly a true and a false edge, a switch has a default, a
    /// return or throw has a single edge into its marker block, a block
    /// without a terminator has at most one fallthrough, and the marker
    /// blocks are empty with no outgoing control edges.
    pub fn check(&self) -> Result<()> {
        for (id, block) in self.blocks() {
            let control: Vec<&EdgeKind> = self
                .edges_from(id)
                .filter(|e| !e.kind.is_exception())
                .map(|e| &e.kind)
                .collect();
            if block.is_terminal() {
                if !block.instructions.is_empty() {
                    return Err(Error::IllegalInstruction(
                        "return and rethrow blocks hold no instructions",
                    ));
                }
                if !control.is_empty() {
                    return Err(Error::IllegalInstruction(
                        "return and rethrow blocks are terminal",
                    ));
                }
                continue;
            }
            match block.last() {
                Some(Instruction::Jump(JumpCondition::Always)) => {
                    if control.len() != 1 || control[0] != &EdgeKind::Jump {
                        return Err(Error::IllegalInstruction(
                            "a jump needs exactly one jump edge",
                        ));
                    }
                }
                Some(Instruction::Jump(_)) => {
                    let trues = control
                        .iter()
                        .filter(|k| ***k == EdgeKind::ConditionalTrue)
                        .count();
                    let falses = control
                        .iter()
                        .filter(|k| ***k == EdgeKind::ConditionalFalse)
                        .count();
                    if control.len() != 2 || trues != 1 || falses != 1 {
                        return Err(Error::IllegalInstruction(
                            "a conditional jump needs a true and a false edge",
                        ));
                    }
                }
                Some(Instruction::Switch) => {
                    let all_switch = control.iter().all(|k| matches!(**k, EdgeKind::Switch(_)));
                    let has_default = control.iter().any(|k| **k == EdgeKind::Switch(None));
                    if !all_switch || !has_default {
                        return Err(Error::IllegalInstruction(
                            "a switch needs a default edge and only switch edges",
                        ));
                    }
                }
                Some(Instruction::Return(_)) => {
                    let target = self
                        .edges_from(id)
                        .find(|e| !e.kind.is_exception())
                        .map(|e| e.to);
                    if control.len() != 1 || target.is_none() || target != self.ret {
                        return Err(Error::IllegalInstruction(
                            "a return needs a single edge into the return block",
                        ));
                    }
                }
                Some(Instruction::Throw) => {
                    let target = self
                        .edges_from(id)
                        .find(|e| !e.kind.is_exception())
                        .map(|e| e.to);
                    if control.len() != 1 || target.is_none() || target != self.rethrow {
                        return Err(Error::IllegalInstruction(
                            "a throw needs a single edge into the rethrow block",
                        ));
                    }
                }
                _ => {
                    if control.len() > 1
                        || control.first().map_or(false, |k| **k != EdgeKind::Fallthrough)
                    {
                        return Err(Error::IllegalInstruction(
                            "a block without a terminator can only fall through",
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}

impl Default for InsnGraph {
    fn default() -> Self {
        InsnGraph::new()
    }
}
