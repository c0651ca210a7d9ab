use rand::Rng;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OneTimeCodeError {
    #[error("Code must be exactly six digits")]
    NotSixDigits,
    #[error("Code is outside the six-digit range")]
    OutOfRange,
}

/// A single-use 6-digit numeric code.
///
/// Codes live in the integer domain: two codes are equal when their numbers
/// are equal, regardless of how the submitted string was formatted. The
/// range starts at 100000, so a code never renders with a leading zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OneTimeCode(u32);

impl OneTimeCode {
    pub const MIN: u32 = 100_000;
    pub const MAX: u32 = 999_999;

    /// Draw a uniformly distributed code from the given random source.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(rng.random_range(Self::MIN..=Self::MAX))
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for OneTimeCode {
    type Error = OneTimeCodeError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(OneTimeCodeError::OutOfRange);
        }
        Ok(Self(value))
    }
}

impl std::str::FromStr for OneTimeCode {
    type Err = OneTimeCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() != 6 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(OneTimeCodeError::NotSixDigits);
        }
        let value: u32 = s.parse().map_err(|_| OneTimeCodeError::NotSixDigits)?;
        Self::try_from(value)
    }
}

impl std::fmt::Display for OneTimeCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:06}", self.0)
    }
}
