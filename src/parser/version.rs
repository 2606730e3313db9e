use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::parser::LineError;

/// Oldest Lynis release whose report layout is understood.
pub const MIN_LYNIS_VERSION: LynisVersion = LynisVersion::new(3, 0, 7);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LynisVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl LynisVersion {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl fmt::Display for LynisVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for LynisVersion {
    type Err = LineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('.').collect();
        let [major, minor, patch] = parts.as_slice() else {
            return Err(LineError::VersionFormat);
        };
        let num = |p: &str| p.parse::<u64>().map_err(|_| LineError::VersionNotNumber);
        Ok(Self::new(num(*major)?, num(*minor)?, num(*patch)?))
    }
}

/// Accepts `candidate` when it is at least `minimum`, comparing major, minor
/// and patch in turn.
pub fn check_version(candidate: &str, minimum: LynisVersion) -> Result<LynisVersion, LineError> {
    let version: LynisVersion = candidate.parse()?;
    match version.cmp(&minimum) {
        Ordering::Less => Err(LineError::VersionIncompatible),
        Ordering::Equal | Ordering::Greater => Ok(version),
    }
}
