#![no_main]

use libfuzzer_sys::fuzz_target;
use oxidize_dvi::fonts::FontPool;
use oxidize_dvi::parser::{locate_postamble, DviDocument, ParseOptions};
use std::sync::Arc;

fuzz_target!(|data: &[u8]| {
    let _ = locate_postamble(data);

    for options in [ParseOptions::lenient(), ParseOptions::strict()] {
        let doc = DviDocument::from_bytes(data.to_vec(), Arc::new(FontPool::new()), options);
        if doc.is_valid() {
            // Every indexed page must be readable
            for page in 0..doc.page_count() {
                let _ = doc.page(page);
            }
        } else {
            assert_eq!(doc.page_count(), 0);
        }
    }
});
