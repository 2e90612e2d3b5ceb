//! Fuzz target for date detection and type inference.
//!
//! Date parsing and the type heuristics run regexes over arbitrary cell
//! text and must not panic on pathological input.

#![no_main]

use bagel::inference::{DateDetector, TypeInference};
use bagel::input::TableColumn;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10_000 {
        return;
    }

    if let Ok(content) = std::str::from_utf8(data) {
        let _ = DateDetector::new().parse(content);

        let values: Vec<Option<String>> = content
            .split('\n')
            .map(|v| if v.is_empty() { None } else { Some(v.to_string()) })
            .collect();
        let column = TableColumn::new("col1", values);
        let _ = TypeInference::new().infer(&column);
    }
});
