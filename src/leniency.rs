#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{fmt, str::FromStr};

use crate::error::GradeError;

/// How forgiving the grader should be, on a 1 (very strict) to 10 (very
/// lenient) scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Leniency(u8);

impl Leniency {
    /// Strictest value on the scale.
    pub const MIN: u8 = 1;
    /// Most lenient value on the scale.
    pub const MAX: u8 = 10;

    /// Creates a leniency value, rejecting anything off the 1-10 scale.
    pub fn new(value: u8) -> Result<Self, GradeError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(GradeError::LeniencyOutOfRange(value.to_string()))
        }
    }

    /// Maps a ratio in `0.0..=1.0` onto the scale, so `0.5` lands on the
    /// balanced midpoint `5`.
    pub fn from_ratio(ratio: f64) -> Result<Self, GradeError> {
        if !(0.0..=1.0).contains(&ratio) {
            return Err(GradeError::LeniencyOutOfRange(ratio.to_string()));
        }
        let scaled = (ratio * f64::from(Self::MAX)).round() as u8;
        Ok(Self(scaled.max(Self::MIN)))
    }

    /// The raw scale value.
    pub fn value(self) -> u8 {
        self.0
    }

    /// The band this value falls into.
    pub fn band(self) -> LeniencyBand {
        match self.0 {
            0..=2 => LeniencyBand::VeryStrict,
            3..=4 => LeniencyBand::Strict,
            5..=6 => LeniencyBand::Balanced,
            7..=8 => LeniencyBand::Lenient,
            _ => LeniencyBand::VeryLenient,
        }
    }
}

impl Default for Leniency {
    fn default() -> Self {
        Self(5)
    }
}

impl TryFrom<u8> for Leniency {
    type Error = GradeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Leniency> for u8 {
    fn from(value: Leniency) -> Self {
        value.0
    }
}

impl fmt::Display for Leniency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Leniency {
    type Err = GradeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        s.parse::<u8>()
            .map_err(|_| GradeError::LeniencyOutOfRange(s.to_string()))
            .and_then(Self::new)
    }
}

/// Coarse grading approach derived from a [`Leniency`] value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeniencyBand {
    /// 1-2
    VeryStrict,
    /// 3-4
    Strict,
    /// 5-6
    Balanced,
    /// 7-8
    Lenient,
    /// 9-10
    VeryLenient,
}

impl LeniencyBand {
    /// Short name of the band.
    pub fn label(self) -> &'static str {
        match self {
            LeniencyBand::VeryStrict => "Very Strict",
            LeniencyBand::Strict => "Strict",
            LeniencyBand::Balanced => "Balanced",
            LeniencyBand::Lenient => "Lenient",
            LeniencyBand::VeryLenient => "Very Lenient",
        }
    }

    /// One-line explanation shown next to the leniency control.
    pub fn summary(self) -> &'static str {
        match self {
            LeniencyBand::VeryStrict => {
                "Will deeply analyze the essay, focus on weaknesses, and be extremely critical."
            }
            LeniencyBand::Strict => "Will maintain high standards with limited top grades.",
            LeniencyBand::Balanced => "Will evaluate objectively using the full scoring range.",
            LeniencyBand::Lenient => {
                "Will add 5-15% to scores and focus more on strengths than weaknesses."
            }
            LeniencyBand::VeryLenient => {
                "Will add 15-25% to scores, primarily focus on positives, and rarely give low \
                 grades."
            }
        }
    }

    /// Grading approach block written into the prompt.
    pub fn instructions(self) -> &'static str {
        match self {
            LeniencyBand::VeryStrict => include_str!("prompts/leniency/very_strict.md"),
            LeniencyBand::Strict => include_str!("prompts/leniency/strict.md"),
            LeniencyBand::Balanced => include_str!("prompts/leniency/balanced.md"),
            LeniencyBand::Lenient => include_str!("prompts/leniency/lenient.md"),
            LeniencyBand::VeryLenient => include_str!("prompts/leniency/very_lenient.md"),
        }
    }
}
