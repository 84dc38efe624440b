//! Float wrappers with a total order and a bitwise hash, so constants
//! holding floats can live in hash maps and be compared structurally.

use std::hash::{Hash, Hasher};
use std::{cmp, fmt};

#[derive(Clone, Copy)]
pub struct TotalF32(pub f32);

#[derive(Clone, Copy)]
pub struct TotalF64(pub f64);

macro_rules! impl_total_float {
    ($name:ident, $inner:ty) => {
        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.0.total_cmp(&other.0).is_eq()
            }
        }

        impl Eq for $name {}

        impl PartialOrd for $name {
            fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $name {
            fn cmp(&self, other: &Self) -> cmp::Ordering {
                self.0.total_cmp(&other.0)
            }
        }

        impl Hash for $name {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.0.to_bits().hash(state)
            }
        }

        impl From<$inner> for $name {
            fn from(x: $inner) -> Self {
                Self(x)
            }
        }

        impl From<$name> for $inner {
            fn from(x: $name) -> Self {
                x.0
            }
        }

        impl PartialEq<$inner> for $name {
            fn eq(&self, other: &$inner) -> bool {
                self.0.total_cmp(other).is_eq()
            }
        }
    };
}

impl_total_float!(TotalF32, f32);
impl_total_float!(TotalF64, f64);
