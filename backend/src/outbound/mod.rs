//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: the SQLite reading store via Diesel ORM
//!
//! Adapters are thin translators between domain types and storage rows. They
//! contain no business logic.

pub mod persistence;
