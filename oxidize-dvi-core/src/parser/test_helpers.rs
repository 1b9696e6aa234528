//! Helper functions for creating valid test DVI files with correct offsets

use super::opcodes::*;

/// Standard TeX unit: num/den for scaled points
pub const TEX_NUMERATOR: u32 = 25_400_000;
pub const TEX_DENOMINATOR: u32 = 473_628_672;

/// A generated DVI buffer plus the offsets it was built with
pub struct DviFixture {
    pub data: Vec<u8>,
    pub page_offsets: Vec<usize>,
    pub postamble_offset: usize,
}

/// One font definition in the postamble
pub struct TestFont<'a> {
    pub number: u32,
    pub area: &'a str,
    pub name: &'a str,
    pub scale: u32,
    pub design: u32,
}

impl<'a> TestFont<'a> {
    pub fn new(number: u32, name: &'a str) -> Self {
        Self {
            number,
            area: "",
            name,
            scale: 655_360,
            design: 655_360,
        }
    }
}

pub fn push_u16(buf: &mut Vec<u8>, value: u16) {
    buf.extend_from_slice(&value.to_be_bytes());
}

pub fn push_u32(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_be_bytes());
}

/// PRE, id 2, TeX units, magnification and a comment
pub fn preamble(magnification: u32, comment: &[u8]) -> Vec<u8> {
    let mut buf = vec![PRE, DVI_ID];
    push_u32(&mut buf, TEX_NUMERATOR);
    push_u32(&mut buf, TEX_DENOMINATOR);
    push_u32(&mut buf, magnification);
    buf.push(comment.len() as u8);
    buf.extend_from_slice(comment);
    buf
}

/// Append one font definition using the narrowest FNT_DEF command
pub fn push_font_def(buf: &mut Vec<u8>, font: &TestFont<'_>) {
    let width = match font.number {
        0..=0xFF => 1,
        0x100..=0xFFFF => 2,
        0x1_0000..=0xFF_FFFF => 3,
        _ => 4,
    };
    buf.push(FNT_DEF1 + width - 1);
    buf.extend_from_slice(&font.number.to_be_bytes()[4 - width as usize..]);
    push_u32(buf, 0x1234_5678);
    push_u32(buf, font.scale);
    push_u32(buf, font.design);
    buf.push(font.area.len() as u8);
    buf.push(font.name.len() as u8);
    buf.extend_from_slice(font.area.as_bytes());
    buf.extend_from_slice(font.name.as_bytes());
}

/// Build a complete file with `pages` empty pages, the given fonts and
/// `padding` trailing PADDING bytes.
pub fn build_dvi(pages: usize, fonts: &[TestFont<'_>], padding: usize) -> DviFixture {
    let mut data = preamble(1000, b" TeX output 2024.01.01:1200");
    let mut page_offsets = Vec::with_capacity(pages);
    let mut previous: i32 = -1;

    for page in 0..pages {
        let offset = data.len();
        data.push(BOP);
        push_u32(&mut data, page as u32 + 1);
        data.extend_from_slice(&[0u8; BOP_COUNTERS_LEN - 4]);
        data.extend_from_slice(&previous.to_be_bytes());
        data.push(EOP);
        previous = offset as i32;
        page_offsets.push(offset);
    }

    let postamble_offset = data.len();
    data.push(POST);
    data.extend_from_slice(&previous.to_be_bytes());
    push_u32(&mut data, TEX_NUMERATOR);
    push_u32(&mut data, TEX_DENOMINATOR);
    push_u32(&mut data, 1000);
    push_u32(&mut data, 43_725_786);
    push_u32(&mut data, 30_785_863);
    push_u16(&mut data, 2);
    push_u16(&mut data, pages as u16);
    for font in fonts {
        push_font_def(&mut data, font);
    }
    data.push(POST_POST);
    push_u32(&mut data, postamble_offset as u32);
    data.push(DVI_ID);
    data.extend(std::iter::repeat(PADDING).take(padding));

    DviFixture {
        data,
        page_offsets,
        postamble_offset,
    }
}

/// One page, no fonts, four padding bytes
pub fn minimal_dvi() -> DviFixture {
    build_dvi(1, &[], 4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_dvi_structure() {
        let dvi = minimal_dvi();
        assert_eq!(dvi.data[0], PRE);
        assert_eq!(dvi.data[dvi.page_offsets[0]], BOP);
        assert_eq!(dvi.data[dvi.postamble_offset], POST);
        assert!(dvi.data.ends_with(&[DVI_ID, PADDING, PADDING, PADDING, PADDING]));
    }

    #[test]
    fn test_font_def_widths() {
        let mut buf = Vec::new();
        push_font_def(&mut buf, &TestFont::new(7, "cmr10"));
        assert_eq!(buf[0], FNT_DEF1);
        assert_eq!(buf[1], 7);

        buf.clear();
        push_font_def(&mut buf, &TestFont::new(0x1_0000, "cmr10"));
        assert_eq!(buf[0], FNT_DEF3);
        assert_eq!(&buf[1..4], &[0x01, 0x00, 0x00]);
    }
}
