//! `brickerp-core`: shared building blocks for the local client utilities.
//!
//! This crate has **no storage or network concerns**: identifiers, the clock
//! abstraction, and the domain error type.

pub mod clock;
pub mod error;
pub mod id;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::DomainError;
pub use id::OperationId;
