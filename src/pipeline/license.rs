// Copyright (c) Story Indexer Team
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;

use once_cell::sync::Lazy;
use tracing::debug;

use crate::address::Address;
use crate::chain::{LicenseRegistry, PilLicenseTemplate, PilTerms};
use crate::error::Result;
use crate::models::{License, LicenseLabel, TermAttribute};

/// Known currency tokens, by checksummed address. Addresses outside the
/// table pass through as raw address strings.
static CURRENCY_SYMBOLS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("0xC0F6E387aC0B324Ec18EAcf22EE7271207dCE3d5", "SUSD"),
        ("0x1514000000000000000000000000000000000000", "WIP"),
    ])
});

pub fn currency_symbol(currency: Address) -> String {
    let checksummed = currency.checksummed();
    match CURRENCY_SYMBOLS.get(checksummed.as_str()) {
        Some(symbol) => (*symbol).to_string(),
        None => checksummed,
    }
}

/// `commercialRevShare` is stored in parts-per-million of a percent scale.
/// Exact multiples render without a fractional part (`5000000` -> `"5"`);
/// anything else keeps up to six fractional digits, trailing zeros
/// trimmed.
pub fn rev_share_percent(raw: u32) -> String {
    const SCALE: u32 = 1_000_000;
    let whole = raw / SCALE;
    let rem = raw % SCALE;
    if rem == 0 {
        return whole.to_string();
    }
    let frac = format!("{rem:06}");
    format!("{whole}.{}", frac.trim_end_matches('0'))
}

/// Resolves every license terms attachment of an IP asset into its full
/// on-chain struct plus display rows: attachment count, then the
/// `(template, termsId)` pair per index, then the term struct per id.
/// Either all attachments resolve or the whole aggregation fails; partial
/// lists never reach callers.
pub struct LicenseAggregator {
    registry: LicenseRegistry,
    template: PilLicenseTemplate,
}

impl LicenseAggregator {
    pub fn new(registry: LicenseRegistry, template: PilLicenseTemplate) -> Self {
        Self { registry, template }
    }

    /// Attached license terms in attachment-index order (index 0 first).
    pub async fn list_license_terms(&self, ip_id: Address) -> Result<Vec<License>> {
        let ip_key = ip_id.checksummed();
        let count = self
            .registry
            .attached_terms_count(ip_id)
            .await
            .map_err(|e| e.into_license_fetch(&ip_key))?;
        debug!(%ip_id, count, "resolving attached license terms");

        let mut licenses = Vec::with_capacity(count as usize);
        for index in 0..count {
            let (_template, terms_id) = self
                .registry
                .attached_terms_at(ip_id, index)
                .await
                .map_err(|e| e.into_license_fetch(&ip_key))?;
            let terms = self
                .template
                .get_license_terms(terms_id)
                .await
                .map_err(|e| e.into_license_fetch(&ip_key))?;
            licenses.push(License {
                id: terms_id.to_string(),
                label: LicenseLabel::for_terms_id(terms_id),
                license_terms: display_rows(&terms),
                terms,
            });
        }
        Ok(licenses)
    }
}

/// Flatten a term struct into the `(label, value)` rows the views render.
pub fn display_rows(terms: &PilTerms) -> Vec<TermAttribute> {
    let row = |trait_type: &str, value: String| TermAttribute {
        trait_type: trait_type.to_string(),
        value,
    };
    vec![
        row("Commercial Use", terms.commercial_use.to_string()),
        row("Transferable", terms.transferable.to_string()),
        row("Derivatives Allowed", terms.derivatives_allowed.to_string()),
        row("Derivatives Attribution", terms.derivatives_attribution.to_string()),
        row("Derivatives Approval", terms.derivatives_approval.to_string()),
        row("Derivatives Reciprocal", terms.derivatives_reciprocal.to_string()),
        row("Commercial Attribution", terms.commercial_attribution.to_string()),
        row("Minting Fee (currency)", terms.default_minting_fee.to_string()),
        row("Commercial Rev Share (%)", rev_share_percent(terms.commercial_rev_share)),
        row("Commercial Rev Ceiling (currency)", terms.commercial_rev_ceiling.to_string()),
        row("Derivative Rev Ceiling (currency)", terms.derivative_rev_ceiling.to_string()),
        row("Currency", currency_symbol(terms.currency)),
        row("Royalty Policy", terms.royalty_policy.checksummed()),
    ]
}
