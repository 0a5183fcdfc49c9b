use core::str::FromStr;

use brickerp_core::DomainError;
use serde::{Deserialize, Serialize};

/// Business document category with its own numbering sequence.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    ProductionOrder,
    Delivery,
    Sale,
    Quote,
    Invoice,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 5] = [
        DocumentKind::ProductionOrder,
        DocumentKind::Delivery,
        DocumentKind::Sale,
        DocumentKind::Quote,
        DocumentKind::Invoice,
    ];

    /// Two-letter prefix printed at the start of every number of this kind.
    pub fn prefix(&self) -> &'static str {
        match self {
            DocumentKind::ProductionOrder => "OP",
            DocumentKind::Delivery => "LV",
            DocumentKind::Sale => "VT",
            DocumentKind::Quote => "DV",
            DocumentKind::Invoice => "FC",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::ProductionOrder => "production_order",
            DocumentKind::Delivery => "delivery",
            DocumentKind::Sale => "sale",
            DocumentKind::Quote => "quote",
            DocumentKind::Invoice => "invoice",
        }
    }

    pub fn from_prefix(prefix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.prefix() == prefix)
    }
}

impl core::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentKind {
    type Err = DomainError;

    /// Accepts `production_order` as well as `production-order`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == normalized)
            .ok_or_else(|| DomainError::validation(format!("unknown document kind '{s}'")))
    }
}
