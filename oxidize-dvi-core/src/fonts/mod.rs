//! Font registration for DVI documents
//!
//! A DVI file only names its fonts. The loader hands every definition to a
//! [`FontResourceManager`], which owns the font data, shares it between open
//! documents and decides when unused fonts can go.

pub mod font_pool;
pub mod metafont;

pub use font_pool::FontPool;
pub use metafont::MetafontMode;

use std::sync::Arc;

/// Everything the loader knows about a font it wants registered
#[derive(Debug, Clone, PartialEq)]
pub struct FontRequest {
    /// Area and name from the font definition
    pub name: String,
    pub checksum: u32,
    /// Scaled size in DVI units
    pub scale: u32,
    /// Design size in DVI units
    pub design_size: u32,
    /// Size to render at, in device dots (scale/design * mag * mode dpi)
    pub effective_size: f64,
    /// DVI-unit to device-unit factor of the requesting document
    pub conversion_factor: f64,
}

/// A registered font
#[derive(Debug, Clone, PartialEq)]
pub struct TexFont {
    pub name: String,
    pub checksum: u32,
    pub scale: u32,
    pub design_size: u32,
    pub effective_size: f64,
    pub conversion_factor: f64,
}

impl From<FontRequest> for TexFont {
    fn from(request: FontRequest) -> Self {
        Self {
            name: request.name,
            checksum: request.checksum,
            scale: request.scale,
            design_size: request.design_size,
            effective_size: request.effective_size,
            conversion_factor: request.conversion_factor,
        }
    }
}

/// Shared handle to a registered font
pub type FontHandle = Arc<TexFont>;

/// Font registry the DVI loader reports to.
///
/// Implementations synchronise internally; the loader calls them in
/// sequence from a single thread.
pub trait FontResourceManager: Send + Sync {
    /// Register a font and return the handle documents keep for it
    fn register(&self, request: FontRequest) -> FontHandle;

    /// All fonts of one document are registered; fonts nobody uses may go
    fn registration_complete(&self);

    /// A document that registered `fonts` was closed
    fn file_closed(&self, fonts: &[FontHandle]);

    /// Output resolution (dpi) for dimension conversion
    fn render_resolution(&self) -> f64;

    /// Resolution (dpi) of the current Metafont mode, used for font sizes
    fn mode_resolution(&self) -> f64;
}
