//! Test Suite for oxidizeDvi
//!
//! Synthetic DVI files, valid and deliberately broken, plus helpers for
//! loading them the way a viewer would.

pub mod generators;

pub use generators::{BuiltDvi, Marker, TestDviBuilder, TestFontDef};

/// Common test utilities
pub mod utils {
    use oxidize_dvi::fonts::{FontPool, FontResourceManager};
    use oxidize_dvi::parser::{DviDocument, ParseOptions};
    use std::path::PathBuf;
    use std::sync::Arc;

    /// Get the path to the test fixtures directory
    pub fn fixtures_dir() -> PathBuf {
        let manifest_dir = env!("CARGO_MANIFEST_DIR");
        PathBuf::from(manifest_dir).join("fixtures")
    }

    /// Create a temporary directory for test outputs
    pub fn create_test_output_dir() -> anyhow::Result<tempfile::TempDir> {
        Ok(tempfile::tempdir()?)
    }

    /// Load `data` against a private font pool
    pub fn load(data: Vec<u8>, options: ParseOptions) -> DviDocument {
        load_with(data, &FontPool::new(), options)
    }

    /// Load `data` against a shared font pool
    pub fn load_with(data: Vec<u8>, pool: &FontPool, options: ParseOptions) -> DviDocument {
        let manager: Arc<dyn FontResourceManager> = Arc::new(pool.clone());
        DviDocument::from_bytes(data, manager, options)
    }
}
