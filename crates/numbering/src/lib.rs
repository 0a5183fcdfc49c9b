//! `brickerp-numbering`
//!
//! **Responsibility:** sequential, human-readable document numbers.
//!
//! Each document kind has its own counter in the local store. A number reads
//! `{prefix}{YY}{MM}{NNNN}`, e.g. `VT25070043` for the 43rd sale, issued in
//! July 2025.

pub mod error;
pub mod generator;
pub mod kind;
pub mod number;

pub use error::NumberingError;
pub use generator::NumberGenerator;
pub use kind::DocumentKind;
pub use number::DocumentNumber;
