//! Diesel table definitions for the SQLite reading store.
//!
//! The `entries` table has no declared key; Diesel addresses rows through
//! SQLite's implicit `rowid`, which increases with insertion order and drives
//! the retention trim.
//!
//! Every data column is declared nullable. Stores created by earlier relay
//! versions carry the same columns without `NOT NULL` constraints, and the
//! migration keeps such a table as it is, so rows read back may lack values
//! the current migration would refuse.

diesel::table! {
    /// CGM readings in insertion order.
    ///
    /// Numeric columns carry `NUMERIC` affinity, so integral values are
    /// stored as integers and read back as whole doubles.
    entries (rowid) {
        /// Implicit SQLite row identifier.
        rowid -> BigInt,
        /// Sensor or uploader identifier.
        device -> Nullable<Text>,
        /// Sample time in epoch milliseconds.
        date -> Nullable<Double>,
        /// Human-readable rendering of `date`.
        #[sql_name = "dateString"]
        date_string -> Nullable<Text>,
        /// Sensor glucose value.
        sgv -> Nullable<Double>,
        /// Trend arrow label.
        direction -> Nullable<Text>,
        /// Record type label, usually `sgv`.
        #[sql_name = "type"]
        kind -> Nullable<Text>,
        filtered -> Nullable<Double>,
        unfiltered -> Nullable<Double>,
        rssi -> Nullable<Double>,
        noise -> Nullable<Double>,
    }
}
