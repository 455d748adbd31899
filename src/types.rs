//! Shared identifier types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// BLAKE3 digest bytes.
pub type Hash = [u8; 32];

/// Slash-separated location of a group or testcase, relative to the plan root.
///
/// The root group has the empty path. Paths never carry leading, trailing or
/// repeated separators, so two paths naming the same node compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CasePath(String);

impl CasePath {
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Parse a user-written reference such as `secret/group/01` or `/sample/1`.
    pub fn parse(text: &str) -> Self {
        let segments: Vec<&str> = text.split('/').filter(|s| !s.is_empty()).collect();
        Self(segments.join("/"))
    }

    pub fn join(&self, name: &str) -> Self {
        if self.0.is_empty() {
            Self(name.to_string())
        } else {
            Self(format!("{}/{}", self.0, name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    pub fn first_segment(&self) -> Option<&str> {
        self.segments().next()
    }

    /// Last segment, or the empty string for the root.
    pub fn name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or("")
    }

    pub fn parent(&self) -> Option<CasePath> {
        if self.is_root() {
            return None;
        }
        match self.0.rfind('/') {
            Some(index) => Some(Self(self.0[..index].to_string())),
            None => Some(Self::root()),
        }
    }
}

impl fmt::Display for CasePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            write!(f, "<root>")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Seed resolved for a generated testcase. Always below 2^31 so generators can
/// read it into a signed 32-bit integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Seed(u32);

impl Seed {
    pub const MODULUS: u64 = 1 << 31;

    pub fn new(value: u32) -> Self {
        Self((u64::from(value) % Self::MODULUS) as u32)
    }

    pub fn value(self) -> u32 {
        self.0
    }

    /// Decimal rendering, zero-padded to `width` when given.
    pub fn render(self, width: Option<usize>) -> String {
        match width {
            Some(width) => format!("{:0width$}", self.0, width = width),
            None => self.0.to_string(),
        }
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
