//! Row-count bounds: the retention cap and the per-request read limit.

use std::num::NonZeroU32;
use std::str::FromStr;

/// Default number of retained readings: 28 hours of 5-minute samples.
pub const DEFAULT_MAX_ROWS: u32 = 336;

/// Maximum number of readings kept in the store.
///
/// # Examples
/// ```
/// use glucose_relay::domain::RetentionCap;
///
/// assert_eq!(RetentionCap::default().get(), 336);
/// assert!(RetentionCap::new(0).is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionCap(NonZeroU32);

impl RetentionCap {
    /// Build a cap; zero is not a valid cap.
    #[must_use]
    pub fn new(rows: u32) -> Option<Self> {
        NonZeroU32::new(rows).map(Self)
    }

    /// Number of rows retained.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }
}

impl Default for RetentionCap {
    fn default() -> Self {
        Self(NonZeroU32::new(DEFAULT_MAX_ROWS).unwrap_or(NonZeroU32::MIN))
    }
}

/// Errors raised when parsing a `count` parameter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReadingLimitError {
    /// Not a base-10 unsigned integer that fits in `u32`.
    #[error("count must be a positive integer, got {value:?}")]
    NotAnInteger {
        /// The rejected input.
        value: String,
    },
    /// Zero readings is not a meaningful request.
    #[error("count must be greater than zero")]
    Zero,
}

/// Validated upper bound on the number of readings a query returns.
///
/// # Examples
/// ```
/// use glucose_relay::domain::ReadingLimit;
///
/// let limit: ReadingLimit = "12".parse().expect("valid count");
/// assert_eq!(limit.get(), 12);
/// assert!("12; DROP TABLE entries".parse::<ReadingLimit>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadingLimit(NonZeroU32);

impl ReadingLimit {
    /// Build a limit; zero is rejected.
    pub fn new(count: u32) -> Result<Self, ReadingLimitError> {
        NonZeroU32::new(count).map(Self).ok_or(ReadingLimitError::Zero)
    }

    /// Maximum number of readings to return.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }
}

impl FromStr for ReadingLimit {
    type Err = ReadingLimitError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let not_an_integer = || ReadingLimitError::NotAnInteger {
            value: value.to_owned(),
        };
        // `u32::from_str` accepts a leading `+`; the wire format does not.
        if value.is_empty() || !value.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(not_an_integer());
        }
        let count = value.parse::<u32>().map_err(|_| not_an_integer())?;
        Self::new(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1", 1)]
    #[case("2", 2)]
    #[case("336", 336)]
    #[case("007", 7)]
    fn valid_counts_parse(#[case] raw: &str, #[case] expected: u32) {
        let limit: ReadingLimit = raw.parse().expect("valid count");
        assert_eq!(limit.get(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("-1")]
    #[case("+5")]
    #[case("1.5")]
    #[case("abc")]
    #[case(" 5")]
    #[case("5 OR 1=1")]
    #[case("99999999999")]
    fn malformed_counts_are_rejected(#[case] raw: &str) {
        let err = raw.parse::<ReadingLimit>().expect_err("invalid count");
        assert!(matches!(err, ReadingLimitError::NotAnInteger { .. }));
    }

    #[rstest]
    fn zero_count_is_rejected() {
        assert_eq!("0".parse::<ReadingLimit>(), Err(ReadingLimitError::Zero));
    }

    #[rstest]
    fn retention_cap_rejects_zero() {
        assert!(RetentionCap::new(0).is_none());
        assert_eq!(RetentionCap::new(5).map(RetentionCap::get), Some(5));
    }
}
