// Copyright (c) Story Indexer Team
// SPDX-License-Identifier: Apache-2.0

use once_cell::sync::Lazy;
use prometheus::{IntCounterVec, Opts, Registry, TextEncoder};

pub static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

pub static CONTRACT_CALLS: Lazy<IntCounterVec> = Lazy::new(|| {
    register_counter_vec(
        "contract_calls_total",
        "Read-only contract calls issued, by function",
        &["function"],
    )
});

pub static CONTRACT_CALL_FAILURES: Lazy<IntCounterVec> = Lazy::new(|| {
    register_counter_vec(
        "contract_call_failures_total",
        "Failed contract calls, by function",
        &["function"],
    )
});

pub static METADATA_FETCHES: Lazy<IntCounterVec> = Lazy::new(|| {
    register_counter_vec(
        "metadata_fetches_total",
        "Off-chain metadata fetches, by outcome",
        &["outcome"],
    )
});

fn register_counter_vec(name: &str, help: &str, labels: &[&str]) -> IntCounterVec {
    let counter = IntCounterVec::new(Opts::new(name, help), labels)
        .expect("valid metric definition");
    REGISTRY
        .register(Box::new(counter.clone()))
        .expect("metric registered once");
    counter
}

/// Render all registered metrics in the Prometheus text format.
pub fn gather() -> String {
    TextEncoder::new()
        .encode_to_string(&REGISTRY.gather())
        .unwrap_or_default()
}
