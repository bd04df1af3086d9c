//! Request middleware.
//!
//! Purpose: request lifecycle concerns that sit outside the handlers, such
//! as trace identifiers and access logging.

pub mod trace;

pub use trace::Trace;
