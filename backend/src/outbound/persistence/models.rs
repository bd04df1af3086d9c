//! Internal Diesel row structs for the reading store.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use diesel::prelude::*;

use crate::domain::{Numeric, Reading, RecordDefect};

use super::schema::entries;

/// Row struct for reading from the entries table.
///
/// Required attributes are optional here because older stores do not
/// enforce them; `Reading::try_from` rejects rows that lack one.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = entries)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct ReadingRow {
    pub device: Option<String>,
    pub date: Option<f64>,
    pub date_string: Option<String>,
    pub sgv: Option<f64>,
    pub direction: Option<String>,
    pub kind: Option<String>,
    pub filtered: Option<f64>,
    pub unfiltered: Option<f64>,
    pub rssi: Option<f64>,
    pub noise: Option<f64>,
}

fn stored<T>(value: Option<T>, field: &'static str) -> Result<T, RecordDefect> {
    value.ok_or(RecordDefect::MissingField { field })
}

fn stored_numeric(value: f64) -> Result<Numeric, RecordDefect> {
    Numeric::new(value).map_err(|err| RecordDefect::Malformed {
        message: err.to_string(),
    })
}

impl TryFrom<ReadingRow> for Reading {
    type Error = RecordDefect;

    fn try_from(row: ReadingRow) -> Result<Self, Self::Error> {
        let optional = |value: Option<f64>| value.map(stored_numeric).transpose();
        Ok(Self {
            device: stored(row.device, "device")?,
            date: stored_numeric(stored(row.date, "date")?)?,
            date_string: stored(row.date_string, "dateString")?,
            sgv: stored_numeric(stored(row.sgv, "sgv")?)?,
            direction: stored(row.direction, "direction")?,
            kind: stored(row.kind, "type")?,
            filtered: optional(row.filtered)?,
            unfiltered: optional(row.unfiltered)?,
            rssi: optional(row.rssi)?,
            noise: optional(row.noise)?,
        })
    }
}

/// Insertable struct for appending a reading.
///
/// Absent optional values are bound as explicit `NULL`s.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = entries)]
#[diesel(treat_none_as_default_value = false)]
pub(crate) struct NewReadingRow<'a> {
    pub device: &'a str,
    pub date: f64,
    pub date_string: &'a str,
    pub sgv: f64,
    pub direction: &'a str,
    pub kind: &'a str,
    pub filtered: Option<f64>,
    pub unfiltered: Option<f64>,
    pub rssi: Option<f64>,
    pub noise: Option<f64>,
}

impl<'a> From<&'a Reading> for NewReadingRow<'a> {
    fn from(reading: &'a Reading) -> Self {
        Self {
            device: &reading.device,
            date: reading.date.value(),
            date_string: &reading.date_string,
            sgv: reading.sgv.value(),
            direction: &reading.direction,
            kind: &reading.kind,
            filtered: reading.filtered.map(Numeric::value),
            unfiltered: reading.unfiltered.map(Numeric::value),
            rssi: reading.rssi.map(Numeric::value),
            noise: reading.noise.map(Numeric::value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn row() -> ReadingRow {
        ReadingRow {
            device: Some("xDrip-DexcomG5".to_owned()),
            date: Some(1_700_000_000_000.0),
            date_string: Some("Tue Nov 14 22:13:20 GMT 2023".to_owned()),
            sgv: Some(120.0),
            direction: Some("Flat".to_owned()),
            kind: Some("sgv".to_owned()),
            filtered: None,
            unfiltered: None,
            rssi: Some(-60.0),
            noise: None,
        }
    }

    #[rstest]
    fn complete_row_decodes(row: ReadingRow) {
        let reading = Reading::try_from(row).expect("complete row");
        assert_eq!(reading.sgv.as_integer(), Some(120));
        assert_eq!(reading.rssi.and_then(Numeric::as_integer), Some(-60));
    }

    #[rstest]
    fn null_required_column_is_rejected(mut row: ReadingRow) {
        row.sgv = None;
        let defect = Reading::try_from(row).expect_err("null sgv");
        assert_eq!(defect, RecordDefect::MissingField { field: "sgv" });
    }

    #[rstest]
    fn non_finite_value_is_rejected(mut row: ReadingRow) {
        row.filtered = Some(f64::INFINITY);
        let defect = Reading::try_from(row).expect_err("infinite filtered");
        assert!(matches!(defect, RecordDefect::Malformed { .. }));
    }
}
