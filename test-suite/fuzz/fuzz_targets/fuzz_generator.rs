#![no_main]

use libfuzzer_sys::fuzz_target;
use oxidize_dvi::fonts::FontPool;
use oxidize_dvi::parser::{DviDocument, ParseOptions};
use oxidize_dvi_test_suite::generators::test_dvi_builder::{Marker, TestDviBuilder, TestFontDef};
use std::sync::Arc;

fuzz_target!(|data: &[u8]| {
    if data.len() < 8 {
        return;
    }

    // Use fuzzer input to shape the file
    let pages = usize::from(data[0] % 32);
    let body = usize::from(data[1]);
    let mut builder = TestDviBuilder::new()
        .with_pages(pages, body)
        .with_padding(4 + usize::from(data[2] % 16))
        .with_magnification(u32::from(data[3]) * 10 + 1);

    for (i, chunk) in data[8..].chunks(4).take(16).enumerate() {
        let number = chunk.iter().fold(0u32, |acc, b| acc << 8 | u32::from(*b));
        builder = builder.with_font(TestFontDef::new(number, &format!("f{i}")));
    }

    // Then damage it
    match data[4] % 6 {
        0 => {}
        1 => builder = builder.with_back_link(usize::from(data[5]) % (pages + 1), u32::from(data[6]) << 8),
        2 => builder = builder.with_broken_marker(Marker::Bop(usize::from(data[5]) % (pages + 1)), data[6]),
        3 => builder = builder.with_total_pages(u16::from(data[5])),
        4 => builder = builder.with_postamble_pointer(u32::from(data[6])),
        _ => builder = builder.truncated_to(usize::from(data[5]) * usize::from(data[6])),
    }

    let doc = DviDocument::from_bytes(builder.build(), Arc::new(FontPool::new()), ParseOptions::lenient());
    for page in 0..doc.page_count() {
        assert!(doc.page_range(page).is_some());
    }
});
