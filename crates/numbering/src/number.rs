//! Formatted document numbers.

use core::str::FromStr;

use brickerp_core::DomainError;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::kind::DocumentKind;

/// Minimum width of the sequence part; larger values widen the number.
const SEQUENCE_WIDTH: usize = 4;

/// A document number: `{prefix}{YY}{MM}{NNNN}`.
///
/// Year and month are those of the day the number was issued, not of the
/// counter's creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentNumber {
    pub kind: DocumentKind,
    /// Two-digit year (0..=99).
    pub year: u32,
    pub month: u32,
    pub sequence: u64,
}

impl DocumentNumber {
    pub fn new(kind: DocumentKind, issued_on: NaiveDate, sequence: u64) -> Self {
        Self {
            kind,
            year: issued_on.year().rem_euclid(100) as u32,
            month: issued_on.month(),
            sequence,
        }
    }
}

impl core::fmt::Display for DocumentNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{}{:02}{:02}{:0width$}",
            self.kind.prefix(),
            self.year,
            self.month,
            self.sequence,
            width = SEQUENCE_WIDTH
        )
    }
}

impl FromStr for DocumentNumber {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |why: &str| DomainError::validation(format!("document number '{s}': {why}"));

        if !s.is_ascii() || s.len() < 2 + 4 + SEQUENCE_WIDTH {
            return Err(invalid("too short"));
        }

        let (prefix, rest) = s.split_at(2);
        let kind = DocumentKind::from_prefix(prefix).ok_or_else(|| invalid("unknown prefix"))?;

        if !rest.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("expected digits after the prefix"));
        }

        let (year, rest) = rest.split_at(2);
        let (month, sequence) = rest.split_at(2);

        let year: u32 = year.parse().map_err(|_| invalid("bad year"))?;
        let month: u32 = month.parse().map_err(|_| invalid("bad month"))?;
        if !(1..=12).contains(&month) {
            return Err(invalid("month out of range"));
        }
        let sequence: u64 = sequence.parse().map_err(|_| invalid("bad sequence"))?;

        Ok(Self {
            kind,
            year,
            month,
            sequence,
        })
    }
}
