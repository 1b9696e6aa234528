//! Test DVI Builder
//!
//! A builder for creating test DVI files with specific characteristics,
//! including deliberate structural damage.

use std::collections::HashMap;

pub const PRE: u8 = 247;
pub const POST: u8 = 248;
pub const POST_POST: u8 = 249;
pub const BOP: u8 = 139;
pub const EOP: u8 = 140;
pub const NOP: u8 = 138;
pub const FNT_DEF1: u8 = 243;
pub const PADDING: u8 = 223;

/// Numerator and denominator TeX writes: DVI units are scaled points
pub const TEX_NUMERATOR: u32 = 25_400_000;
pub const TEX_DENOMINATOR: u32 = 473_628_672;

/// Structural markers that can be overwritten
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Pre,
    /// Id byte of the preamble
    PreambleId,
    Post,
    PostPost,
    /// BOP of the given 0-based page
    Bop(usize),
}

/// A font definition to place in the postamble
#[derive(Debug, Clone)]
pub struct TestFontDef {
    pub number: u32,
    pub area: String,
    pub name: String,
    pub checksum: u32,
    pub scale: u32,
    pub design_size: u32,
}

impl TestFontDef {
    /// A font at its design size of 10pt
    pub fn new(number: u32, name: &str) -> Self {
        Self {
            number,
            area: String::new(),
            name: name.to_string(),
            checksum: 0,
            scale: 10 * 65_536,
            design_size: 10 * 65_536,
        }
    }

    /// Scale the font to `points`
    pub fn at(mut self, points: u32) -> Self {
        self.scale = points * 65_536;
        self
    }

    /// Narrowest FNT_DEF command that holds the font number
    fn width(&self) -> u8 {
        match self.number {
            0..=0xFF => 1,
            0x100..=0xFFFF => 2,
            0x1_0000..=0xFF_FFFF => 3,
            _ => 4,
        }
    }
}

#[derive(Debug, Clone)]
struct TestPage {
    counters: [i32; 10],
    body: Vec<u8>,
}

/// A generated file with the offsets it was laid out with
#[derive(Debug, Clone)]
pub struct BuiltDvi {
    pub data: Vec<u8>,
    pub page_offsets: Vec<usize>,
    pub postamble_offset: usize,
}

/// Builder for creating test DVI files
#[derive(Debug, Clone)]
pub struct TestDviBuilder {
    id: u8,
    numerator: u32,
    denominator: u32,
    magnification: u32,
    comment: Vec<u8>,
    pages: Vec<TestPage>,
    fonts: Vec<TestFontDef>,
    padding: usize,
    back_links: HashMap<usize, u32>,
    broken_markers: Vec<(Marker, u8)>,
    total_pages: Option<u16>,
    postamble_pointer: Option<u32>,
    truncate_to: Option<usize>,
}

impl Default for TestDviBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestDviBuilder {
    /// An empty TeX document with four padding bytes
    pub fn new() -> Self {
        Self {
            id: 2,
            numerator: TEX_NUMERATOR,
            denominator: TEX_DENOMINATOR,
            magnification: 1000,
            comment: b" TeX output 2025.01.01:0000".to_vec(),
            pages: Vec::new(),
            fonts: Vec::new(),
            padding: 4,
            back_links: HashMap::new(),
            broken_markers: Vec::new(),
            total_pages: None,
            postamble_pointer: None,
            truncate_to: None,
        }
    }

    /// One empty page, no fonts
    pub fn minimal() -> Self {
        let mut builder = Self::new();
        builder.add_page();
        builder
    }

    pub fn with_units(mut self, numerator: u32, denominator: u32) -> Self {
        self.numerator = numerator;
        self.denominator = denominator;
        self
    }

    /// Magnification times 1000
    pub fn with_magnification(mut self, magnification: u32) -> Self {
        self.magnification = magnification;
        self
    }

    pub fn with_comment(mut self, comment: &[u8]) -> Self {
        self.comment = comment.to_vec();
        self
    }

    /// Number of trailing PADDING bytes
    pub fn with_padding(mut self, padding: usize) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_font(mut self, font: TestFontDef) -> Self {
        self.fonts.push(font);
        self
    }

    /// Add an empty page numbered after the pages before it
    pub fn add_page(&mut self) -> &mut Self {
        let number = self.pages.len() as i32 + 1;
        self.add_page_with_body(number, Vec::new())
    }

    /// Add a page with `\count0 = number` and raw command bytes
    pub fn add_page_with_body(&mut self, number: i32, body: Vec<u8>) -> &mut Self {
        let mut counters = [0; 10];
        counters[0] = number;
        self.pages.push(TestPage { counters, body });
        self
    }

    /// Add `count` pages, each holding `body_len` NOP commands
    pub fn with_pages(mut self, count: usize, body_len: usize) -> Self {
        for _ in 0..count {
            let number = self.pages.len() as i32 + 1;
            self.add_page_with_body(number, vec![NOP; body_len]);
        }
        self
    }

    /// Write `target` as the back-pointer of page `page` (0-based)
    pub fn with_back_link(mut self, page: usize, target: u32) -> Self {
        self.back_links.insert(page, target);
        self
    }

    /// Overwrite a structural marker with `value`
    pub fn with_broken_marker(mut self, marker: Marker, value: u8) -> Self {
        self.broken_markers.push((marker, value));
        self
    }

    /// Announce a page count other than the real one
    pub fn with_total_pages(mut self, total: u16) -> Self {
        self.total_pages = Some(total);
        self
    }

    /// Make the trailer point somewhere other than the postamble
    pub fn with_postamble_pointer(mut self, pointer: u32) -> Self {
        self.postamble_pointer = Some(pointer);
        self
    }

    /// Cut the finished file after `len` bytes
    pub fn truncated_to(mut self, len: usize) -> Self {
        self.truncate_to = Some(len);
        self
    }

    /// Generate the file bytes
    pub fn build(&self) -> Vec<u8> {
        self.build_with_offsets().data
    }

    /// Generate the file bytes and report where pages and postamble went
    pub fn build_with_offsets(&self) -> BuiltDvi {
        let mut data = vec![PRE, self.id];
        data.extend_from_slice(&self.numerator.to_be_bytes());
        data.extend_from_slice(&self.denominator.to_be_bytes());
        data.extend_from_slice(&self.magnification.to_be_bytes());
        data.push(self.comment.len() as u8);
        data.extend_from_slice(&self.comment);

        let mut page_offsets = Vec::with_capacity(self.pages.len());
        let mut previous = u32::MAX;
        for (index, page) in self.pages.iter().enumerate() {
            let offset = data.len();
            data.push(BOP);
            for counter in page.counters {
                data.extend_from_slice(&counter.to_be_bytes());
            }
            let back = self.back_links.get(&index).copied().unwrap_or(previous);
            data.extend_from_slice(&back.to_be_bytes());
            data.extend_from_slice(&page.body);
            data.push(EOP);
            previous = offset as u32;
            page_offsets.push(offset);
        }

        let postamble_offset = data.len();
        data.push(POST);
        data.extend_from_slice(&previous.to_be_bytes());
        data.extend_from_slice(&self.numerator.to_be_bytes());
        data.extend_from_slice(&self.denominator.to_be_bytes());
        data.extend_from_slice(&self.magnification.to_be_bytes());
        // tallest and widest page of a letter-sized document
        data.extend_from_slice(&43_725_786u32.to_be_bytes());
        data.extend_from_slice(&30_785_863u32.to_be_bytes());
        data.extend_from_slice(&4u16.to_be_bytes());
        let total = self.total_pages.unwrap_or(self.pages.len() as u16);
        data.extend_from_slice(&total.to_be_bytes());

        for font in &self.fonts {
            let width = font.width();
            data.push(FNT_DEF1 + width - 1);
            data.extend_from_slice(&font.number.to_be_bytes()[4 - usize::from(width)..]);
            data.extend_from_slice(&font.checksum.to_be_bytes());
            data.extend_from_slice(&font.scale.to_be_bytes());
            data.extend_from_slice(&font.design_size.to_be_bytes());
            data.push(font.area.len() as u8);
            data.push(font.name.len() as u8);
            data.extend_from_slice(font.area.as_bytes());
            data.extend_from_slice(font.name.as_bytes());
        }

        let post_post = data.len();
        data.push(POST_POST);
        let pointer = self
            .postamble_pointer
            .unwrap_or(postamble_offset as u32);
        data.extend_from_slice(&pointer.to_be_bytes());
        data.push(self.id);
        data.extend(std::iter::repeat(PADDING).take(self.padding));

        for (marker, value) in &self.broken_markers {
            let at = match marker {
                Marker::Pre => Some(0),
                Marker::PreambleId => Some(1),
                Marker::Post => Some(postamble_offset),
                Marker::PostPost => Some(post_post),
                Marker::Bop(page) => page_offsets.get(*page).copied(),
            };
            if let Some(at) = at {
                data[at] = *value;
            }
        }

        if let Some(len) = self.truncate_to {
            data.truncate(len);
        }

        BuiltDvi {
            data,
            page_offsets,
            postamble_offset,
        }
    }
}
