use serde::{Deserialize, Serialize};

use crate::chain::PilTerms;

/// Reserved license terms id meaning "non-commercial, default". Its fields
/// are still read on-chain like any other id; only the label differs.
pub const NON_COMMERCIAL_TERMS_ID: u64 = 1;

/// Presentational classification of a license. Purely a label; it never
/// alters the underlying term fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LicenseLabel {
    #[serde(rename = "Non-commercial")]
    NonCommercial,
    #[serde(rename = "Commercial")]
    Commercial,
}

impl LicenseLabel {
    pub fn for_terms_id(terms_id: u64) -> Self {
        if terms_id == NON_COMMERCIAL_TERMS_ID {
            Self::NonCommercial
        } else {
            Self::Commercial
        }
    }
}

/// One displayable `(label, value)` row of a license term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermAttribute {
    pub trait_type: String,
    pub value: String,
}

/// A license terms attachment resolved to its full on-chain struct plus
/// the normalized display rows, in attachment-index order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct License {
    /// The numeric terms id as a string, matching how callers key it.
    pub id: String,
    pub label: LicenseLabel,
    pub terms: PilTerms,
    pub license_terms: Vec<TermAttribute>,
}
