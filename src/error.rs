use thiserror::Error;

use crate::constant::ConstantKind;
use crate::version::JavaVersion;

/// The crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    IO(#[from] std::io::Error),
    /// The stream ended in the middle of a read.
    #[error("stream ended unexpectedly")]
    Truncated,
    #[error("unknown constant tag: {0}")]
    UnknownConstantTag(u8),
    /// A constant appeared in a class file older than the version that introduced it.
    #[error("{kind} requires class file version {since}, file declares {actual}")]
    VersionTooLow {
        kind: ConstantKind,
        since: JavaVersion,
        actual: JavaVersion,
    },
    /// A cross-constant reference resolved to the wrong variant.
    #[error("expected {expected} at pool index {at}, found {actual}")]
    KindMismatch {
        expected: &'static str,
        actual: ConstantKind,
        at: u16,
    },
    /// The constant pool fix-up loop completed a full pass without resolving anything.
    #[error("{0} constant pool entries have unresolvable references")]
    UnresolvableReferences(usize),
    #[error("constant pool slot {0} is already occupied")]
    SlotOccupied(u16),
    /// A control-flow instruction was handed to an API that may not install edges.
    #[error("illegal instruction: {0}")]
    IllegalInstruction(&'static str),
    #[error("invalid descriptor: {0}")]
    InvalidDescriptor(String),
    #[error("unrecognized {0}: {1}")]
    Unrecognized(&'static str, String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// `read_exact` reports a short read as `UnexpectedEof`; the wire-level
/// meaning here is a truncated class file.
pub(crate) fn eof_to_truncated(e: std::io::Error) -> Error {
    if e.kind() == std::io::ErrorKind::UnexpectedEof {
        Error::Truncated
    } else {
        Error::IO(e)
    }
}
