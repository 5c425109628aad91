use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Rules of Conway's Game of Life.
pub const B3S23: RuleSet = RuleSet::new(0b1000, 0b1100);

/// # Representation
/// Life rules are represented as
/// ```notrust
/// |------birth------|
/// 0000_0000_0000_0000_0000_0000_0000_0000
///                     |----survival-----|
/// ```
///
/// # Examples
/// ```notrust
/// b3s23:                0000_0000_0000_1000_0000_0000_0000_1100
///
/// b0s0:                 0000_0000_0000_0000_0000_0000_0000_0000
/// b012345678s012345678: 0000_0001_1111_1111_0000_0001_1111_1111
/// ```
///
/// See: https://conwaylife.com/wiki/Rulestring
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RuleSet {
    rule: u32,
}

impl Default for RuleSet {
    fn default() -> Self {
        B3S23
    }
}

impl RuleSet {
    /// Create a new `RuleSet` for the given births and survivals. For both `b` and
    /// `s`, numbers are set on a bit basis. For instance if bit `i` in `b` is on, it
    /// means `i` is included in the set of births. Any bit past the 8th is ignored.
    pub const fn new(b: u16, s: u16) -> Self {
        let b = b & 0x1FF;
        let s = s & 0x1FF;

        Self {
            rule: (b as u32) << 16 | s as u32,
        }
    }

    pub fn births(&self) -> u16 {
        ((self.rule & 0x1FF0000) >> 0x10) as u16
    }

    pub fn survivals(&self) -> u16 {
        (self.rule & 0x1FF) as u16
    }

    /// The state a cell takes in the next generation, given its current state and the number of
    /// live cells in its Moore neighborhood.
    pub fn next_state(&self, alive: bool, neighbors: u8) -> bool {
        debug_assert!(neighbors <= 8, "a cell has at most 8 neighbors");

        let bit = 1u16 << neighbors;

        if alive {
            self.survivals() & bit != 0
        } else {
            self.births() & bit != 0
        }
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = |set: u16| -> String {
            (0..=8u8)
                .filter(|&n| set & (1 << n) != 0)
                .map(|n| char::from(b'0' + n))
                .collect()
        };

        write!(f, "B{}/S{}", digits(self.births()), digits(self.survivals()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleSetError {
    #[error("Invalid rule string \"{0}\", expected something like b3/s23")]
    InvalidString(String),
}

impl FromStr for RuleSet {
    type Err = RuleSetError;

    /// Accepts `b3/s23`, `b3s23` and the nameless `3/23`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        enum State {
            Birth,
            Survival,
        }

        let invalid = || RuleSetError::InvalidString(s.to_string());

        if s.trim().is_empty() {
            return Err(invalid());
        }

        let mut state = State::Birth;
        let (mut b, mut s_bits) = (0u16, 0u16);

        for c in s.trim().chars() {
            match c {
                'b' | 'B' => {
                    state = State::Birth;
                }
                's' | 'S' | '/' => {
                    state = State::Survival;
                }
                n => {
                    let n = n.to_digit(10).ok_or_else(invalid)?;

                    if n > 8 {
                        return Err(invalid());
                    }

                    match state {
                        State::Birth => b |= 1 << n,
                        State::Survival => s_bits |= 1 << n,
                    }
                }
            }
        }

        Ok(RuleSet::new(b, s_bits))
    }
}
