//! # oxidize-dvi
//!
//! A pure Rust loader for TeX DVI files (format id 2).
//!
//! ## Features
//!
//! - **Preamble**: DVI unit, magnification and generator comment
//! - **Postamble**: located by scanning back over the trailing padding
//! - **Fonts**: every font definition is registered with a shared, reference-counted font pool
//! - **Page Index**: random page access rebuilt from the backward BOP chain
//! - **Bounds Safety**: every read is checked; truncated or corrupted files end in an error, never a panic
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use oxidize_dvi::fonts::{FontPool, MetafontMode};
//! use oxidize_dvi::parser::{DviDocument, ParseOptions};
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = FontPool::new().with_mode(MetafontMode::LjFour);
//! let doc = DviDocument::open("thesis.dvi", Arc::new(pool), ParseOptions::default());
//!
//! if let Some(message) = doc.error_message() {
//!     eprintln!("cannot display thesis.dvi: {message}");
//!     return Ok(());
//! }
//!
//! println!("{} page(s) written by {}", doc.page_count(), doc.generator());
//! for (number, font) in doc.fonts() {
//!     println!("font {number}: {} at {:.1} dots", font.name, font.effective_size);
//! }
//!
//! let first_page = doc.page(0)?;
//! println!("page 1 has {} bytes of content", first_page.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Sharing fonts between documents
//!
//! ```rust
//! use oxidize_dvi::fonts::{FontPool, FontResourceManager};
//! use oxidize_dvi::parser::{DviDocument, ParseOptions};
//! use std::sync::Arc;
//!
//! let pool = FontPool::new();
//! let manager: Arc<dyn FontResourceManager> = Arc::new(pool.clone());
//!
//! // Not a DVI file: the document records why and stays empty
//! let doc = DviDocument::from_bytes(b"%PDF-1.7".to_vec(), manager, ParseOptions::strict());
//! assert!(!doc.is_valid());
//! assert_eq!(doc.page_count(), 0);
//! assert!(pool.is_empty());
//! ```

pub mod error;
pub mod fonts;
pub mod parser;

pub use error::{DviError, Result};
pub use fonts::{FontHandle, FontPool, FontRequest, FontResourceManager, MetafontMode, TexFont};
pub use parser::{
    DviDocument, ErrorKind, FontDefinition, PageIndex, ParseError, ParseOptions, Postamble,
    Preamble,
};

/// Current version of oxidize-dvi
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
