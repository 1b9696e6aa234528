//! Invalid DVI Generators
//!
//! Generates deliberately broken DVI files for error handling tests.

use super::test_dvi_builder::{Marker, TestDviBuilder, TestFontDef, EOP, NOP, PADDING};
use anyhow::Result;
use oxidize_dvi::ErrorKind;
use std::fs;
use std::path::Path;

/// A broken file and the failure class loading it must report
#[derive(Debug, Clone)]
pub struct InvalidDvi {
    pub name: &'static str,
    pub description: &'static str,
    pub data: Vec<u8>,
    pub expected: ErrorKind,
    /// Only rejected under `ParseOptions::strict()`
    pub strict_only: bool,
}

fn invalid(
    name: &'static str,
    description: &'static str,
    data: Vec<u8>,
    expected: ErrorKind,
) -> InvalidDvi {
    InvalidDvi {
        name,
        description,
        data,
        expected,
        strict_only: false,
    }
}

/// Every broken file
pub fn all() -> Vec<InvalidDvi> {
    let three_pages = TestDviBuilder::new().with_pages(3, 2);
    let truncated = {
        let built = three_pages.build_with_offsets();
        let mut data = built.data;
        data.truncate(built.postamble_offset + 10);
        data
    };

    let mut files = vec![
        invalid(
            "empty",
            "Zero-length file",
            Vec::new(),
            ErrorKind::TruncatedOrCorrupted,
        ),
        invalid(
            "missing_preamble",
            "First byte is not PRE",
            TestDviBuilder::minimal()
                .with_broken_marker(Marker::Pre, NOP)
                .build(),
            ErrorKind::FormatMismatch,
        ),
        invalid(
            "foreign_version",
            "Preamble id 3 instead of 2",
            TestDviBuilder::minimal()
                .with_broken_marker(Marker::PreambleId, 3)
                .build(),
            ErrorKind::UnsupportedVersion,
        ),
        invalid(
            "zero_denominator",
            "Preamble declares a zero denominator",
            TestDviBuilder::minimal().with_units(25_400_000, 0).build(),
            ErrorKind::TruncatedOrCorrupted,
        ),
        invalid(
            "all_padding",
            "Nothing but trailer bytes after the preamble",
            {
                let mut data = TestDviBuilder::new().build();
                data.truncate(42);
                data.extend_from_slice(&[PADDING; 64]);
                data
            },
            ErrorKind::TruncatedOrCorrupted,
        ),
        invalid(
            "postamble_pointer_out_of_range",
            "Trailer points past the end of the file",
            TestDviBuilder::minimal()
                .with_postamble_pointer(0xFFFF_FF00)
                .build(),
            ErrorKind::TruncatedOrCorrupted,
        ),
        invalid(
            "missing_post",
            "Trailer pointer does not reach a POST command",
            TestDviBuilder::minimal()
                .with_broken_marker(Marker::Post, EOP)
                .build(),
            ErrorKind::FormatMismatch,
        ),
        invalid(
            "missing_post_post",
            "Postamble ends in something other than POST_POST",
            TestDviBuilder::minimal()
                .with_font(TestFontDef::new(1, "cmr10"))
                .with_broken_marker(Marker::PostPost, NOP)
                .build(),
            ErrorKind::FormatMismatch,
        ),
        invalid(
            "truncated_postamble",
            "File cut off inside the postamble",
            truncated,
            ErrorKind::TruncatedOrCorrupted,
        ),
        invalid(
            "duplicate_font",
            "Font number 5 is defined twice",
            TestDviBuilder::minimal()
                .with_font(TestFontDef::new(5, "cmr10"))
                .with_font(TestFontDef::new(5, "cmr12"))
                .build(),
            ErrorKind::FormatMismatch,
        ),
        invalid(
            "zero_design_size",
            "Font with a design size of 0",
            TestDviBuilder::minimal()
                .with_font(TestFontDef {
                    design_size: 0,
                    ..TestFontDef::new(0, "cmr10")
                })
                .build(),
            ErrorKind::TruncatedOrCorrupted,
        ),
        invalid(
            "missing_bop",
            "Second page does not begin with BOP",
            three_pages
                .clone()
                .with_broken_marker(Marker::Bop(1), NOP)
                .build(),
            ErrorKind::FormatMismatch,
        ),
        invalid(
            "page_count_too_large",
            "Postamble announces more pages than the chain holds",
            TestDviBuilder::new().with_pages(2, 0).with_total_pages(5).build(),
            ErrorKind::FormatMismatch,
        ),
    ];

    files.push(InvalidDvi {
        strict_only: true,
        ..invalid(
            "back_link_outside_file",
            "Second page links back past the end of the file",
            three_pages.with_back_link(1, 0x00FF_FFFF).build(),
            ErrorKind::TruncatedOrCorrupted,
        )
    });

    files
}

/// Write every broken file plus a JSON description next to it
pub fn generate_all<P: AsRef<Path>>(output_dir: P) -> Result<()> {
    let output_dir = output_dir.as_ref();
    fs::create_dir_all(output_dir)?;

    for file in all() {
        fs::write(output_dir.join(format!("{}.dvi", file.name)), &file.data)?;
        let metadata = serde_json::json!({
            "name": file.name,
            "description": file.description,
            "expected_error": format!("{:?}", file.expected),
            "strict_only": file.strict_only,
        });
        fs::write(
            output_dir.join(format!("{}.json", file.name)),
            serde_json::to_string_pretty(&metadata)?,
        )?;
    }

    Ok(())
}
