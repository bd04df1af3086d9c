//! Domain primitives, services and ports.
//!
//! Purpose: define the reading entity, the retention and authentication
//! rules, and the services that apply them. Nothing here knows about HTTP or
//! SQLite; adapters live under `inbound` and `outbound`.
//!
//! Public surface:
//! - DomainError / ErrorCode: transport-agnostic failure payload.
//! - Reading / RecordDefect / Numeric: the stored sample and its validation.
//! - RetentionCap / ReadingLimit: row-count bounds.
//! - SharedSecrets / Authenticator: the write-path gate.
//! - EntriesService: implementation of the entries ports.

pub mod entries_service;
pub mod error;
pub mod numeric;
pub mod ports;
pub mod reading;
pub mod retention;
pub mod secrets;

pub use self::entries_service::EntriesService;
pub use self::error::{DomainError, ErrorCode, DomainErrorValidationError};
pub use self::numeric::{Numeric, NumericError};
pub use self::reading::{Reading, RecordDefect};
pub use self::retention::{DEFAULT_MAX_ROWS, ReadingLimit, ReadingLimitError, RetentionCap};
pub use self::secrets::{
    APPLICATION_SECRET_ENV, AuthFailure, Authenticator, PRIMARY_SECRET_ENV, SecretsError,
    SharedSecrets,
};

/// HTTP header carrying the request trace identifier.
pub const TRACE_ID_HEADER: &str = "trace-id";
