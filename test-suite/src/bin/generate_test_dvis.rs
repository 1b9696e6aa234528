//! Generate Test DVIs
//!
//! This binary writes all generated DVI files into the fixtures directory.

use anyhow::Result;
use oxidize_dvi_test_suite::generators::{invalid_dvis, minimal_dvis};
use oxidize_dvi_test_suite::utils::fixtures_dir;

fn main() -> Result<()> {
    println!("Generating test DVIs for oxidizeDvi test suite...");

    let valid_dir = fixtures_dir().join("valid/minimal");
    println!("Generating minimal DVIs in {}...", valid_dir.display());
    minimal_dvis::generate_all(&valid_dir)?;

    let invalid_dir = fixtures_dir().join("invalid");
    println!("Generating broken DVIs in {}...", invalid_dir.display());
    invalid_dvis::generate_all(&invalid_dir)?;

    println!("Test DVI generation complete!");
    Ok(())
}
