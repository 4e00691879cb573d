//! Shared type definitions and newtypes

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Message shown when the play form rejects its input
pub const INVALID_NUMBER_MESSAGE: &str = "Please enter a valid number between 1 and 9999";

/// A number the user is allowed to play (1..=9999)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct PlayNumber(u16);

impl PlayNumber {
    pub const MIN: i64 = 1;
    pub const MAX: i64 = 9999;

    /// Create a play number, rejecting anything outside 1..=9999
    pub fn new(value: i64) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(PlayNumber(value as u16))
        } else {
            Err(Error::ValidationError(INVALID_NUMBER_MESSAGE.to_string()))
        }
    }

    /// Parse raw form input. Surrounding whitespace is ignored; anything
    /// that is not a plain integer is rejected.
    pub fn parse(input: &str) -> Result<Self> {
        let value: i64 = input
            .trim()
            .parse()
            .map_err(|_| Error::ValidationError(INVALID_NUMBER_MESSAGE.to_string()))?;
        Self::new(value)
    }

    pub fn get(&self) -> u16 {
        self.0
    }
}

impl TryFrom<i64> for PlayNumber {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        PlayNumber::new(value)
    }
}

impl From<PlayNumber> for i64 {
    fn from(n: PlayNumber) -> Self {
        i64::from(n.0)
    }
}

impl fmt::Display for PlayNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Prize amount in dollars
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prize(pub f64);

impl Prize {
    pub fn new(amount: f64) -> Self {
        Prize(amount)
    }

    pub fn as_f64(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for Prize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}
