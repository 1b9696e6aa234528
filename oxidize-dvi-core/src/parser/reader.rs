//! High-level DVI Reader API
//!
//! [`DviDocument`] owns the file bytes, runs the parsing passes once on
//! construction and then answers page and font lookups.

use super::cursor::ByteCursor;
use super::opcodes::BOP_LEN;
use super::page_index::PageIndex;
use super::postamble::{locate_postamble, Postamble};
use super::preamble::Preamble;
use super::{ParseError, ParseOptions, ParseResult};
use crate::error::{DviError, Result};
use crate::fonts::{FontHandle, FontRequest, FontResourceManager};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// State that only exists once every pass succeeded
#[derive(Debug)]
struct Loaded {
    preamble: Preamble,
    postamble: Postamble,
    page_index: PageIndex,
    conversion_factor: f64,
}

/// A loaded DVI file
///
/// Construction never fails outright. A file that cannot be used keeps its
/// [`ParseError`]; every accessor then returns an empty value (0, `None`,
/// `""`), so callers check [`DviDocument::is_valid`] before reading pages.
pub struct DviDocument {
    data: Vec<u8>,
    path: Option<PathBuf>,
    fonts: Arc<dyn FontResourceManager>,
    options: ParseOptions,
    /// TeX font number to registered handle
    font_table: HashMap<u32, FontHandle>,
    loaded: Option<Loaded>,
    error: Option<ParseError>,
}

impl DviDocument {
    /// Read and parse the file at `path`
    pub fn open<P: AsRef<Path>>(
        path: P,
        fonts: Arc<dyn FontResourceManager>,
        options: ParseOptions,
    ) -> Self {
        let path = path.as_ref();
        tracing::debug!("opening DVI file {}", path.display());

        let mut document = match read_file(path) {
            Ok(data) => Self::from_bytes(data, fonts, options),
            Err(err) => Self::failed(fonts, options, err),
        };
        document.path = Some(path.to_path_buf());
        document
    }

    /// Parse a DVI file already in memory
    pub fn from_bytes(
        data: Vec<u8>,
        fonts: Arc<dyn FontResourceManager>,
        options: ParseOptions,
    ) -> Self {
        let mut document = Self {
            data,
            path: None,
            fonts,
            options,
            font_table: HashMap::new(),
            loaded: None,
            error: None,
        };
        match document.parse() {
            Ok(loaded) => document.loaded = Some(loaded),
            Err(err) => {
                tracing::warn!("DVI file is unusable: {err}");
                document.error = Some(err);
            }
        }
        document
    }

    /// Open `path` and turn a recorded failure into `Err`
    pub fn load<P: AsRef<Path>>(
        path: P,
        fonts: Arc<dyn FontResourceManager>,
        options: ParseOptions,
    ) -> ParseResult<Self> {
        Self::open(path, fonts, options).into_result()
    }

    /// `Ok(self)` when parsing succeeded, the recorded error otherwise
    pub fn into_result(mut self) -> ParseResult<Self> {
        match self.error.take() {
            Some(err) => Err(err),
            None => Ok(self),
        }
    }

    fn failed(fonts: Arc<dyn FontResourceManager>, options: ParseOptions, err: ParseError) -> Self {
        tracing::warn!("DVI file could not be read: {err}");
        Self {
            data: Vec::new(),
            path: None,
            fonts,
            options,
            font_table: HashMap::new(),
            loaded: None,
            error: Some(err),
        }
    }

    fn parse(&mut self) -> ParseResult<Loaded> {
        if self.data.is_empty() {
            return Err(ParseError::EmptyFile);
        }

        let preamble = Preamble::parse(&mut ByteCursor::new(&self.data))?;
        let conversion_factor = preamble.conversion_factor(self.fonts.render_resolution());
        tracing::debug!(
            "preamble: num={} den={} mag={} generator=\"{}\"",
            preamble.numerator,
            preamble.denominator,
            preamble.magnification,
            preamble.generator
        );

        let offset = locate_postamble(&self.data)?;
        tracing::debug!("postamble at offset {offset}");

        let postamble = Postamble::parse(&mut ByteCursor::at(&self.data, offset)?)?;
        self.register_fonts(&postamble, preamble.magnification, conversion_factor)?;

        let page_index = PageIndex::build(&self.data, &postamble, &self.options)?;
        tracing::debug!(
            "indexed {} page(s), {} font(s)",
            page_index.page_count(),
            self.font_table.len()
        );

        Ok(Loaded {
            preamble,
            postamble,
            page_index,
            conversion_factor,
        })
    }

    fn register_fonts(
        &mut self,
        postamble: &Postamble,
        magnification: u32,
        conversion_factor: f64,
    ) -> ParseResult<()> {
        // Reject duplicates before anything reaches the manager
        let mut seen = HashSet::new();
        seen.try_reserve(postamble.fonts.len())?;
        for def in &postamble.fonts {
            if !seen.insert(def.tex_number) {
                return Err(ParseError::DuplicateFont(def.tex_number));
            }
        }

        self.font_table.try_reserve(postamble.fonts.len())?;
        let mode_resolution = self.fonts.mode_resolution();
        for def in &postamble.fonts {
            let handle = self.fonts.register(FontRequest {
                name: def.name.clone(),
                checksum: def.checksum,
                scale: def.scale,
                design_size: def.design_size,
                effective_size: def.effective_size(magnification, mode_resolution),
                conversion_factor,
            });
            self.font_table.insert(def.tex_number, handle);
        }
        self.fonts.registration_complete();
        Ok(())
    }

    /// Whether all passes succeeded
    pub fn is_valid(&self) -> bool {
        self.loaded.is_some()
    }

    /// The failure that made the file unusable
    pub fn error(&self) -> Option<&ParseError> {
        self.error.as_ref()
    }

    /// Human-readable form of [`DviDocument::error`]
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }

    pub fn page_count(&self) -> usize {
        self.loaded
            .as_ref()
            .map_or(0, |loaded| loaded.page_index.page_count())
    }

    /// Offset of the BOP of page `page` (0-based)
    pub fn page_content_offset(&self, page: usize) -> Option<usize> {
        self.loaded.as_ref()?.page_index.page_offset(page)
    }

    /// Bytes of page `page`, from its BOP to the next page or the postamble
    pub fn page_range(&self, page: usize) -> Option<Range<usize>> {
        self.loaded.as_ref()?.page_index.page_range(page)
    }

    /// Content of page `page`
    pub fn page(&self, page: usize) -> Result<&[u8]> {
        if let Some(err) = &self.error {
            return Err(DviError::DocumentUnusable(err.to_string()));
        }
        let range = self
            .page_range(page)
            .ok_or(DviError::InvalidPageNumber(page))?;
        self.data
            .get(range)
            .ok_or(DviError::InvalidPageNumber(page))
    }

    /// Commands of page `page` between its BOP header and the next page
    pub fn page_body(&self, page: usize) -> Result<&[u8]> {
        let content = self.page(page)?;
        Ok(content.get(BOP_LEN..).unwrap_or_default())
    }

    /// Handle registered for TeX font number `number`
    pub fn font_handle(&self, number: u32) -> Option<&FontHandle> {
        self.loaded.as_ref()?;
        self.font_table.get(&number)
    }

    /// All fonts of the document, ordered by TeX font number
    pub fn fonts(&self) -> Vec<(u32, &FontHandle)> {
        if self.loaded.is_none() {
            return Vec::new();
        }
        let mut fonts: Vec<_> = self
            .font_table
            .iter()
            .map(|(number, handle)| (*number, handle))
            .collect();
        fonts.sort_by_key(|(number, _)| *number);
        fonts
    }

    /// Factor from DVI units to device units, 0.0 when the file failed
    pub fn dimension_conversion_factor(&self) -> f64 {
        self.loaded
            .as_ref()
            .map_or(0.0, |loaded| loaded.conversion_factor)
    }

    /// Comment left by the program that wrote the file
    pub fn generator(&self) -> &str {
        self.loaded
            .as_ref()
            .map_or("", |loaded| loaded.preamble.generator.as_str())
    }

    pub fn numerator(&self) -> u32 {
        self.preamble().map_or(0, |pre| pre.numerator)
    }

    pub fn denominator(&self) -> u32 {
        self.preamble().map_or(0, |pre| pre.denominator)
    }

    pub fn magnification(&self) -> u32 {
        self.preamble().map_or(0, |pre| pre.magnification)
    }

    pub fn preamble(&self) -> Option<&Preamble> {
        self.loaded.as_ref().map(|loaded| &loaded.preamble)
    }

    pub fn postamble(&self) -> Option<&Postamble> {
        self.loaded.as_ref().map(|loaded| &loaded.postamble)
    }

    pub fn page_index(&self) -> Option<&PageIndex> {
        self.loaded.as_ref().map(|loaded| &loaded.page_index)
    }

    /// Raw file bytes (empty when the file could not be read)
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// File size in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Path the document was opened from
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }
}

impl fmt::Debug for DviDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DviDocument")
            .field("path", &self.path)
            .field("len", &self.data.len())
            .field("pages", &self.page_count())
            .field("fonts", &self.font_table.len())
            .field("error", &self.error)
            .finish()
    }
}

impl Drop for DviDocument {
    fn drop(&mut self) {
        let handles: Vec<FontHandle> = self.font_table.drain().map(|(_, font)| font).collect();
        self.fonts.file_closed(&handles);
    }
}

/// Read the whole file, reporting allocation failure instead of aborting
fn read_file(path: &Path) -> ParseResult<Vec<u8>> {
    let mut file = File::open(path)?;
    let size = file.metadata()?.len();
    let size = usize::try_from(size)
        .map_err(|_| ParseError::OutOfMemory(format!("file of {size} bytes")))?;

    let mut data = Vec::new();
    data.try_reserve_exact(size)?;
    file.read_to_end(&mut data)?;
    Ok(data)
}
