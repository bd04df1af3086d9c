//! CGM reading entity and per-record validation.
//!
//! A [`Reading`] only exists once a candidate record has passed
//! [`Reading::from_candidate`]. Validation is per record: a defect in one
//! candidate never affects its neighbours in the same batch.

use serde::Deserialize;
use serde_json::Value;

use super::Numeric;

/// Reason a candidate record was not turned into a [`Reading`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordDefect {
    /// The candidate was not a JSON object.
    #[error("reading must be a JSON object")]
    NotAnObject,
    /// A required key was absent or `null`.
    #[error("missing required field: {field}")]
    MissingField {
        /// Wire name of the missing key.
        field: &'static str,
    },
    /// A key was present with the wrong JSON type.
    #[error("malformed reading: {message}")]
    Malformed {
        /// What was wrong with the value.
        message: String,
    },
}

/// One CGM sample.
///
/// ## Invariants
/// - All six required attributes are present.
/// - Numeric attributes are finite.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    /// Uploading device identifier.
    pub device: String,
    /// Epoch timestamp in milliseconds; orders the history.
    pub date: Numeric,
    /// Human-readable rendering of `date`.
    pub date_string: String,
    /// Sensor glucose value.
    pub sgv: Numeric,
    /// Trend arrow, e.g. `Flat` or `FortyFiveUp`.
    pub direction: String,
    /// Record kind, usually `sgv`.
    pub kind: String,
    /// Filtered raw sensor signal.
    pub filtered: Option<Numeric>,
    /// Unfiltered raw sensor signal.
    pub unfiltered: Option<Numeric>,
    /// Received signal strength.
    pub rssi: Option<Numeric>,
    /// Sensor noise level.
    pub noise: Option<Numeric>,
}

/// Loose shape of an incoming record before required-field checks.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReadingPayload {
    device: Option<String>,
    date: Option<Numeric>,
    date_string: Option<String>,
    sgv: Option<Numeric>,
    direction: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    filtered: Option<Numeric>,
    unfiltered: Option<Numeric>,
    rssi: Option<Numeric>,
    noise: Option<Numeric>,
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T, RecordDefect> {
    value.ok_or(RecordDefect::MissingField { field })
}

impl TryFrom<ReadingPayload> for Reading {
    type Error = RecordDefect;

    fn try_from(payload: ReadingPayload) -> Result<Self, Self::Error> {
        Ok(Self {
            device: required(payload.device, "device")?,
            date: required(payload.date, "date")?,
            date_string: required(payload.date_string, "dateString")?,
            sgv: required(payload.sgv, "sgv")?,
            direction: required(payload.direction, "direction")?,
            kind: required(payload.kind, "type")?,
            filtered: payload.filtered,
            unfiltered: payload.unfiltered,
            rssi: payload.rssi,
            noise: payload.noise,
        })
    }
}

impl Reading {
    /// Validate one candidate record from an ingestion batch.
    ///
    /// Unknown keys are ignored. Optional numeric keys may be absent or
    /// `null`.
    ///
    /// # Examples
    /// ```
    /// use glucose_relay::domain::{Reading, RecordDefect};
    /// use serde_json::json;
    ///
    /// let ok = Reading::from_candidate(&json!({
    ///     "device": "xDrip-DexcomG5", "date": 1700000000000_i64,
    ///     "dateString": "Tue Nov 14 22:13:20 GMT 2023", "sgv": 120,
    ///     "direction": "Flat", "type": "sgv"
    /// }));
    /// assert!(ok.is_ok());
    ///
    /// let missing = Reading::from_candidate(&json!({ "sgv": 120 }));
    /// assert_eq!(missing, Err(RecordDefect::MissingField { field: "device" }));
    /// ```
    pub fn from_candidate(candidate: &Value) -> Result<Self, RecordDefect> {
        if !candidate.is_object() {
            return Err(RecordDefect::NotAnObject);
        }
        let payload = ReadingPayload::deserialize(candidate).map_err(|err| RecordDefect::Malformed {
            message: err.to_string(),
        })?;
        Self::try_from(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use serde_json::json;

    #[fixture]
    fn complete() -> Value {
        json!({
            "device": "xDrip-DexcomG5",
            "date": 1_700_000_000_000_i64,
            "dateString": "Tue Nov 14 22:13:20 GMT 2023",
            "sgv": 120,
            "direction": "Flat",
            "type": "sgv",
            "filtered": 171_234.0,
            "unfiltered": 170_000,
            "rssi": 100,
            "noise": 1
        })
    }

    #[rstest]
    fn complete_record_is_accepted(complete: Value) {
        let reading = Reading::from_candidate(&complete).expect("valid reading");
        assert_eq!(reading.device, "xDrip-DexcomG5");
        assert_eq!(reading.sgv, Numeric::from(120));
        assert_eq!(reading.kind, "sgv");
        assert_eq!(reading.noise, Some(Numeric::from(1)));
    }

    #[rstest]
    fn optional_fields_default_to_none(mut complete: Value) {
        let object = complete.as_object_mut().expect("object");
        for key in ["filtered", "unfiltered", "rssi"] {
            object.remove(key);
        }
        object.insert("noise".to_owned(), Value::Null);

        let reading = Reading::from_candidate(&complete).expect("valid reading");
        assert_eq!(reading.filtered, None);
        assert_eq!(reading.unfiltered, None);
        assert_eq!(reading.rssi, None);
        assert_eq!(reading.noise, None);
    }

    #[rstest]
    #[case("device")]
    #[case("date")]
    #[case("dateString")]
    #[case("sgv")]
    #[case("direction")]
    #[case("type")]
    fn each_required_field_is_enforced(mut complete: Value, #[case] field: &'static str) {
        complete.as_object_mut().expect("object").remove(field);

        let defect = Reading::from_candidate(&complete).expect_err("missing field");
        assert_eq!(defect, RecordDefect::MissingField { field });
    }

    #[rstest]
    fn null_required_field_counts_as_missing(mut complete: Value) {
        complete["device"] = Value::Null;

        let defect = Reading::from_candidate(&complete).expect_err("null device");
        assert_eq!(defect, RecordDefect::MissingField { field: "device" });
    }

    #[rstest]
    fn wrongly_typed_field_is_malformed(mut complete: Value) {
        complete["sgv"] = json!("high");

        let defect = Reading::from_candidate(&complete).expect_err("string sgv");
        assert!(matches!(defect, RecordDefect::Malformed { .. }));
    }

    #[rstest]
    #[case(json!([1, 2]))]
    #[case(json!("reading"))]
    #[case(Value::Null)]
    fn non_objects_are_rejected(#[case] candidate: Value) {
        assert_eq!(
            Reading::from_candidate(&candidate),
            Err(RecordDefect::NotAnObject)
        );
    }

    #[rstest]
    fn unknown_keys_are_ignored(mut complete: Value) {
        complete["_id"] = json!("abc");
        complete["sysTime"] = json!("2023-11-14T22:13:20Z");

        assert!(Reading::from_candidate(&complete).is_ok());
    }
}
