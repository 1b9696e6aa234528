//! Minimal DVI Generators
//!
//! Small valid DVI files covering the layouts the loader has to accept.

use super::test_dvi_builder::{TestDviBuilder, TestFontDef, NOP};
use anyhow::Result;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// A valid generated file and what loading it must produce
#[derive(Debug, Clone, Serialize)]
pub struct ValidDvi {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(skip)]
    pub data: Vec<u8>,
    pub page_count: usize,
    pub font_numbers: Vec<u32>,
}

fn valid(
    name: &'static str,
    description: &'static str,
    builder: TestDviBuilder,
    page_count: usize,
    font_numbers: Vec<u32>,
) -> ValidDvi {
    ValidDvi {
        name,
        description,
        data: builder.build(),
        page_count,
        font_numbers,
    }
}

/// Every minimal file
pub fn all() -> Vec<ValidDvi> {
    let mut with_bodies = TestDviBuilder::new();
    with_bodies
        .add_page_with_body(1, vec![NOP; 12])
        .add_page_with_body(-1, Vec::new())
        .add_page_with_body(2, vec![NOP; 300]);

    vec![
        valid(
            "minimal_single_page",
            "One empty page, no fonts, four padding bytes",
            TestDviBuilder::minimal().with_comment(b""),
            1,
            vec![],
        ),
        valid(
            "minimal_no_pages",
            "A postamble without any page",
            TestDviBuilder::new(),
            0,
            vec![],
        ),
        valid(
            "minimal_multipage",
            "Ten pages of NOP commands",
            TestDviBuilder::new().with_pages(10, 5),
            10,
            vec![],
        ),
        valid(
            "minimal_page_bodies",
            "Pages of different sizes and a roman-numbered page",
            with_bodies,
            3,
            vec![],
        ),
        valid(
            "minimal_fonts",
            "Fonts defined with one, two, three and four byte numbers",
            TestDviBuilder::minimal()
                .with_font(TestFontDef::new(0, "cmr10"))
                .with_font(TestFontDef::new(300, "cmbx10").at(12))
                .with_font(TestFontDef::new(70_000, "cmti10"))
                .with_font(TestFontDef::new(0x0100_0000, "cmtt10").at(8)),
            1,
            vec![0, 300, 70_000, 0x0100_0000],
        ),
        valid(
            "minimal_magnified",
            "Magstep 2 (1440) with a font",
            TestDviBuilder::minimal()
                .with_magnification(1440)
                .with_font(TestFontDef::new(3, "cmss10")),
            1,
            vec![3],
        ),
        valid(
            "minimal_long_padding",
            "Trailer padded with 103 bytes",
            TestDviBuilder::new().with_pages(2, 1).with_padding(103),
            2,
            vec![],
        ),
    ]
}

/// Write every minimal file plus a JSON description next to it
pub fn generate_all<P: AsRef<Path>>(output_dir: P) -> Result<()> {
    let output_dir = output_dir.as_ref();
    fs::create_dir_all(output_dir)?;

    for file in all() {
        fs::write(output_dir.join(format!("{}.dvi", file.name)), &file.data)?;
        let metadata = serde_json::to_string_pretty(&file)?;
        fs::write(output_dir.join(format!("{}.json", file.name)), metadata)?;
    }

    Ok(())
}
