use std::fmt::{Display, Formatter};
use std::io::{Read, Write};

use crate::rw::ReadWrite;
use crate::Result;

/// A class file version pair. Ordering compares the major version first, so
/// feature gating reads as `actual >= since`.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct JavaVersion {
    pub major: u16,
    pub minor: u16,
}

impl JavaVersion {
    /// Class file version 45.0, the first released format.
    pub const JAVA_1: JavaVersion = JavaVersion::new(45, 0);
    /// Class file version 51.0, which introduced `invokedynamic` constants.
    pub const JAVA_7: JavaVersion = JavaVersion::new(51, 0);
    pub const JAVA_8: JavaVersion = JavaVersion::new(52, 0);
    /// Class file version 53.0, which introduced module and package constants.
    pub const JAVA_9: JavaVersion = JavaVersion::new(53, 0);
    /// Class file version 55.0, which introduced dynamic computed constants.
    pub const JAVA_11: JavaVersion = JavaVersion::new(55, 0);

    pub const fn new(major: u16, minor: u16) -> JavaVersion {
        JavaVersion { major, minor }
    }

    /// Whether a feature introduced in `since` may appear in a file of this version.
    #[inline]
    pub fn supports(&self, since: JavaVersion) -> bool {
        *self >= since
    }
}

/// The wire order is minor then major.
impl ReadWrite for JavaVersion {
    fn read_from<T: Read>(reader: &mut T) -> Result<Self> {
        let minor = u16::read_from(reader)?;
        let major = u16::read_from(reader)?;
        Ok(JavaVersion { major, minor })
    }

    fn write_to<T: Write>(&self, writer: &mut T) -> Result<()> {
        self.minor.write_to(writer)?;
        self.major.write_to(writer)
    }
}

impl Display for JavaVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}
