//! Integration tests for the DVI parser

use oxidize_dvi::fonts::{FontPool, FontResourceManager, MetafontMode};
use oxidize_dvi::parser::{locate_postamble, DviDocument, ParseError, ParseOptions};
use pretty_assertions::assert_eq;
use std::sync::Arc;

const PRE: u8 = 247;
const POST: u8 = 248;
const POST_POST: u8 = 249;
const BOP: u8 = 139;
const EOP: u8 = 140;
const FNT_DEF1: u8 = 243;
const PADDING: u8 = 223;

fn manager() -> Arc<dyn FontResourceManager> {
    Arc::new(FontPool::new())
}

/// The smallest useful file: empty comment, one page, no fonts.
/// Returns the data and the offset of the page's BOP.
fn minimal_file() -> (Vec<u8>, usize) {
    let mut data = vec![PRE, 2];
    data.extend_from_slice(&25_400_000u32.to_be_bytes());
    data.extend_from_slice(&473_628_672u32.to_be_bytes());
    data.extend_from_slice(&1000u32.to_be_bytes());
    data.push(0);

    let bop = data.len();
    data.push(BOP);
    data.extend_from_slice(&[0u8; 40]);
    data.extend_from_slice(&(-1i32).to_be_bytes());
    data.push(EOP);

    let post = data.len();
    data.push(POST);
    data.extend_from_slice(&(bop as u32).to_be_bytes());
    data.extend_from_slice(&[0u8; 22]);
    data.extend_from_slice(&1u16.to_be_bytes());
    data.push(POST_POST);
    data.extend_from_slice(&(post as u32).to_be_bytes());
    data.push(2);
    data.extend_from_slice(&[PADDING; 4]);
    (data, bop)
}

#[test]
fn test_minimal_file_scenario() {
    let (data, bop) = minimal_file();
    let doc = DviDocument::from_bytes(data, manager(), ParseOptions::default());

    assert_eq!(doc.error_message(), None);
    assert_eq!(doc.page_count(), 1);
    assert_eq!(doc.page_content_offset(0), Some(bop));
    assert_eq!(doc.generator(), "");
    assert!(doc.fonts().is_empty());
}

#[test]
fn test_minimal_file_strict() {
    let (data, bop) = minimal_file();
    let doc = DviDocument::from_bytes(data, manager(), ParseOptions::strict());
    assert!(doc.is_valid(), "{:?}", doc.error_message());
    assert_eq!(doc.page_content_offset(0), Some(bop));
}

#[test]
fn test_locate_postamble_in_minimal_file() {
    let (data, _) = minimal_file();
    let post = locate_postamble(&data).unwrap();
    assert_eq!(data[post], POST);
}

#[test]
fn test_font_definition_registered_with_pool() {
    let (mut data, bop) = minimal_file();
    // Rebuild the postamble with one font definition
    let post = locate_postamble(&data).unwrap();
    data.truncate(post);
    data.push(POST);
    data.extend_from_slice(&(bop as u32).to_be_bytes());
    data.extend_from_slice(&[0u8; 22]);
    data.extend_from_slice(&1u16.to_be_bytes());
    data.push(FNT_DEF1);
    data.push(17);
    data.extend_from_slice(&0xCAFE_F00Du32.to_be_bytes());
    data.extend_from_slice(&(12 * 65_536u32).to_be_bytes());
    data.extend_from_slice(&(10 * 65_536u32).to_be_bytes());
    data.push(0);
    data.push(5);
    data.extend_from_slice(b"cmr10");
    data.push(POST_POST);
    data.extend_from_slice(&(post as u32).to_be_bytes());
    data.push(2);
    data.extend_from_slice(&[PADDING; 5]);

    let pool = FontPool::new().with_mode(MetafontMode::Cx);
    let doc = DviDocument::from_bytes(data, Arc::new(pool.clone()), ParseOptions::default());

    assert!(doc.is_valid(), "{:?}", doc.error_message());
    let font = doc.font_handle(17).unwrap();
    assert_eq!(font.name, "cmr10");
    assert_eq!(font.checksum, 0xCAFE_F00D);
    // 12pt font from a 10pt design at 300 dpi
    assert!((font.effective_size - 360.0).abs() < 1e-9);
    assert_eq!(pool.len(), 1);
    assert_eq!(pool.users("cmr10", font.effective_size), 1);
}

#[test]
fn test_open_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("minimal.dvi");
    let (data, bop) = minimal_file();
    std::fs::write(&path, &data).unwrap();

    let doc = DviDocument::open(&path, manager(), ParseOptions::default());
    assert!(doc.is_valid());
    assert_eq!(doc.path(), Some(path.as_path()));
    assert_eq!(doc.len(), data.len());
    assert_eq!(doc.page_content_offset(0), Some(bop));
    assert_eq!(doc.page(0).unwrap()[0], BOP);
}

#[test]
fn test_load_reports_io_failure() {
    let dir = tempfile::tempdir().unwrap();
    let result = DviDocument::load(dir.path().join("missing.dvi"), manager(), ParseOptions::default());
    assert!(matches!(result, Err(ParseError::Io(_))));
}

#[test]
fn test_load_reports_empty_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.dvi");
    std::fs::write(&path, b"").unwrap();

    let result = DviDocument::load(&path, manager(), ParseOptions::default());
    assert!(matches!(result, Err(ParseError::EmptyFile)));
}

#[test]
fn test_conversion_factor_follows_render_resolution() {
    let (data, _) = minimal_file();
    let low = DviDocument::from_bytes(
        data.clone(),
        Arc::new(FontPool::new().with_render_resolution(300.0)),
        ParseOptions::default(),
    );
    let high = DviDocument::from_bytes(
        data,
        Arc::new(FontPool::new().with_render_resolution(1200.0)),
        ParseOptions::default(),
    );

    let ratio = high.dimension_conversion_factor() / low.dimension_conversion_factor();
    assert!((ratio - 4.0).abs() < 1e-12);
}
