//! Media Sequence Number Handling
//!
//! The media transport carries 16-bit sequence numbers that wrap modulo
//! 65536. This module provides a wrapped sequence number type that handles
//! arithmetic and comparisons with proper wraparound semantics, so a
//! long-running session survives the wrap boundary.

use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// Maximum sequence number value (16-bit)
pub const MAX_SEQ_NUMBER: u16 = u16::MAX;

/// Sequence number with 16-bit wraparound semantics
///
/// Comparisons account for wraparound: a number that recently wrapped past
/// zero is considered ahead of one just below the wrap boundary, as long as
/// the two are within half the sequence space of each other.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct SeqNumber(u16);

impl SeqNumber {
    /// Create a new sequence number
    #[inline]
    pub fn new(value: u16) -> Self {
        SeqNumber(value)
    }

    /// Get the raw sequence number value
    #[inline]
    pub fn as_raw(self) -> u16 {
        self.0
    }

    /// Increment the sequence number by 1 (wrapping)
    #[inline]
    pub fn increment(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }

    /// Get the next sequence number
    #[inline]
    pub fn next(self) -> Self {
        SeqNumber(self.0.wrapping_add(1))
    }

    /// Calculate the distance from this sequence number to another
    ///
    /// Returns a signed distance that accounts for wraparound. Positive
    /// values mean `other` is ahead of `self`, negative means behind.
    #[inline]
    pub fn distance_to(self, other: SeqNumber) -> i32 {
        other.0.wrapping_sub(self.0) as i16 as i32
    }

    /// Check if this sequence number is before another (wraparound-aware)
    #[inline]
    pub fn precedes(self, other: SeqNumber) -> bool {
        self.distance_to(other) > 0
    }

    /// Check if this sequence number is after another (wraparound-aware)
    #[inline]
    pub fn follows(self, other: SeqNumber) -> bool {
        self.distance_to(other) < 0
    }
}

impl fmt::Debug for SeqNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SeqNumber({})", self.0)
    }
}

impl fmt::Display for SeqNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u16> for SeqNumber {
    fn from(value: u16) -> Self {
        SeqNumber(value)
    }
}

impl From<SeqNumber> for u16 {
    fn from(seq: SeqNumber) -> u16 {
        seq.0
    }
}

impl Add<u16> for SeqNumber {
    type Output = SeqNumber;

    fn add(self, rhs: u16) -> SeqNumber {
        SeqNumber(self.0.wrapping_add(rhs))
    }
}

impl AddAssign<u16> for SeqNumber {
    fn add_assign(&mut self, rhs: u16) {
        self.0 = self.0.wrapping_add(rhs);
    }
}

impl Sub<u16> for SeqNumber {
    type Output = SeqNumber;

    fn sub(self, rhs: u16) -> SeqNumber {
        SeqNumber(self.0.wrapping_sub(rhs))
    }
}

impl SubAssign<u16> for SeqNumber {
    fn sub_assign(&mut self, rhs: u16) {
        self.0 = self.0.wrapping_sub(rhs);
    }
}

impl Sub for SeqNumber {
    type Output = i32;

    /// Calculate the signed distance between two sequence numbers
    fn sub(self, rhs: SeqNumber) -> i32 {
        rhs.distance_to(self)
    }
}
