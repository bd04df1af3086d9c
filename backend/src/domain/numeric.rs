//! Numeric reading attributes with SQLite `NUMERIC` affinity semantics.
//!
//! Readings arrive as arbitrary JSON numbers and are stored in `NUMERIC`
//! columns. SQLite keeps an integral real as an integer, so a reading posted
//! as `120.0` is served back as `120`. [`Numeric`] mirrors that behaviour on
//! the wire so responses look the same whichever way the value was stored.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Largest magnitude an `f64` holds without losing integer precision.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Errors raised when building a [`Numeric`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum NumericError {
    /// NaN and infinities cannot be stored or serialised as JSON.
    #[error("numeric value must be finite")]
    NotFinite,
}

/// Finite numeric attribute of a reading.
///
/// # Examples
/// ```
/// use glucose_relay::domain::Numeric;
///
/// let sgv = Numeric::new(120.0).expect("finite");
/// assert_eq!(serde_json::to_string(&sgv).expect("serialise"), "120");
///
/// let filtered = Numeric::new(171.5).expect("finite");
/// assert_eq!(serde_json::to_string(&filtered).expect("serialise"), "171.5");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Numeric(f64);

impl Numeric {
    /// Wrap a finite value.
    pub fn new(value: f64) -> Result<Self, NumericError> {
        if value.is_finite() {
            Ok(Self(value))
        } else {
            Err(NumericError::NotFinite)
        }
    }

    /// Raw value as stored.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// Integer form when the value is integral and exactly representable.
    #[must_use]
    pub fn as_integer(self) -> Option<i64> {
        let integral = self.0.trunc() == self.0;
        if integral && self.0.abs() <= MAX_EXACT_INTEGER {
            #[expect(
                clippy::cast_possible_truncation,
                reason = "value is integral and within the exact f64 integer range"
            )]
            let int = self.0 as i64;
            Some(int)
        } else {
            None
        }
    }
}

impl From<i32> for Numeric {
    fn from(value: i32) -> Self {
        Self(f64::from(value))
    }
}

impl TryFrom<f64> for Numeric {
    type Error = NumericError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl Serialize for Numeric {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.as_integer() {
            Some(int) => serializer.serialize_i64(int),
            None => serializer.serialize_f64(self.0),
        }
    }
}

impl<'de> Deserialize<'de> for Numeric {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = f64::deserialize(deserializer)?;
        Self::new(value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::{Value, json};

    #[rstest]
    #[case(120.0, json!(120))]
    #[case(-3.0, json!(-3))]
    #[case(1_700_000_000_000.0, json!(1_700_000_000_000_i64))]
    #[case(171.25, json!(171.25))]
    fn serialises_with_numeric_affinity(#[case] raw: f64, #[case] expected: Value) {
        let numeric = Numeric::new(raw).expect("finite value");
        assert_eq!(serde_json::to_value(numeric).expect("serialise"), expected);
    }

    #[rstest]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    #[case(f64::NEG_INFINITY)]
    fn rejects_non_finite_values(#[case] raw: f64) {
        assert_eq!(Numeric::new(raw), Err(NumericError::NotFinite));
    }

    #[rstest]
    fn huge_integral_values_stay_floating_point() {
        let numeric = Numeric::new(1e300).expect("finite value");
        assert_eq!(numeric.as_integer(), None);
    }

    #[rstest]
    #[case(json!(120), 120.0)]
    #[case(json!(99.5), 99.5)]
    fn deserialises_any_json_number(#[case] raw: Value, #[case] expected: f64) {
        let numeric: Numeric = serde_json::from_value(raw).expect("deserialise");
        assert_eq!(numeric.value(), expected);
    }

    #[rstest]
    fn rejects_strings() {
        let result = serde_json::from_value::<Numeric>(json!("120"));
        assert!(result.is_err());
    }
}
