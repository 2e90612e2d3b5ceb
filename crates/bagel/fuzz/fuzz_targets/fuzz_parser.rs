//! Fuzz target for the participants table parser.
//!
//! The parser must never panic on malformed input, whatever the row shape
//! or encoding.

#![no_main]

use bagel::input::Parser;
use bagel::{DataDictionary, DatasetRowBuilder};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 100_000 {
        return;
    }

    if let Ok(table) = Parser::new().parse_bytes(data) {
        let _ = DatasetRowBuilder::new().build("fuzz", &table, &DataDictionary::new());
    }
});
