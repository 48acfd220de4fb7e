//! # Unique Input Identifiers
//!
//! Every input instance in a file is tagged by a qid: a 10-digit,
//! zero-padded decimal number drawn at random when the instance is created.

use std::fmt;
use std::str::FromStr;

use rand::Rng;

use crate::constants::{QID_DIGITS, QID_MAX};
use crate::error::{Error, Result};

/// Unique identifier of one persisted input instance
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Qid(String);

impl Qid {
    /// Draw a fresh qid from the thread-local RNG
    pub fn generate() -> Self {
        Self::generate_with(&mut rand::thread_rng())
    }

    /// Draw a fresh qid from the given RNG
    pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let value: u64 = rng.gen_range(0..QID_MAX);
        Qid(format!("{:0width$}", value, width = QID_DIGITS))
    }

    /// Validate an externally supplied identifier
    pub fn parse(s: &str) -> Result<Self> {
        if s.len() == QID_DIGITS && s.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Qid(s.to_owned()))
        } else {
            Err(Error::InvalidQid(s.to_owned()))
        }
    }

    /// Pull the qid out of an instance name such as `opt-0123456789`
    pub fn from_instance_name(name: &str) -> Option<Self> {
        let (_, tail) = name.rsplit_once('-')?;
        Qid::parse(tail).ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Qid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Qid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Qid::parse(s)
    }
}

impl AsRef<str> for Qid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
