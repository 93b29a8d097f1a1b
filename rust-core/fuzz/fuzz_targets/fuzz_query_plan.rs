// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Fuzz target for query plans and shape classification.
// Run with: cargo +nightly fuzz run fuzz_query_plan
//
// Arbitrary JSON is compiled as a query plan under both configurations and
// classified as a shape list. Bad input must come back as an error.

#![no_main]

use libfuzzer_sys::fuzz_target;
use structq_builder::{classify, coerce_value, QueryBuilder, QueryPlan};

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    if input.len() > 4096 {
        return;
    }

    if let Ok(plan) = QueryPlan::from_json(input) {
        if let Ok(node) = plan.clone().compile_with(&QueryBuilder::strict()) {
            let _ = node.to_json();
        }
        let _ = plan.compile();
    }

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(input) {
        let classified = classify(coerce_value(value));
        let _ = classified.classified_len();
    }
});
