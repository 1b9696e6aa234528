//! DVI Postamble Parser
//!
//! The postamble sits at the end of the file and is reached through the
//! pointer that precedes the trailing PADDING run:
//!
//! ```text
//! POST p[4] num[4] den[4] mag[4] l[4] u[4] s[2] t[2]
//!      { FNT_DEFk ... }*
//! POST_POST q[4] id[1] 223 223 223 223 ...
//! ```

use super::cursor::ByteCursor;
use super::opcodes::{font_def_width, DVI_ID, MIN_PADDING, PADDING, POST, POST_POST};
use super::{ParseError, ParseResult};

/// Find the offset of the POST command by scanning back over the padding.
pub fn locate_postamble(data: &[u8]) -> ParseResult<usize> {
    let Some(mut pos) = data.len().checked_sub(1) else {
        return Err(ParseError::PostambleNotFound);
    };
    while data[pos] == PADDING && pos > 0 {
        pos -= 1;
    }
    if pos == 0 {
        return Err(ParseError::PostambleNotFound);
    }

    // A shorter run means the file lost its tail
    let padding = data.len() - 1 - pos;
    if padding < MIN_PADDING {
        return Err(ParseError::Corrupted(format!(
            "file ends after {padding} padding byte(s), at least {MIN_PADDING} expected"
        )));
    }
    if data[pos] != DVI_ID {
        return Err(ParseError::Corrupted(format!(
            "postamble id byte is {:#04x}, expected {DVI_ID}",
            data[pos]
        )));
    }

    // `pos` is on the id byte; the four bytes before it point at POST
    let mut cursor = ByteCursor::at(data, pos)?;
    cursor.step_back(4)?;
    let offset = cursor.read_u32()? as usize;
    if offset >= data.len() {
        return Err(ParseError::Corrupted(format!(
            "postamble pointer {offset} lies beyond the end of the file ({} bytes)",
            data.len()
        )));
    }
    Ok(offset)
}

/// A font definition (`fnt_def1`..`fnt_def4`) from the postamble
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FontDefinition {
    /// Font number used by `fnt` commands inside this file
    pub tex_number: u32,
    /// TFM checksum
    pub checksum: u32,
    /// Scaled size in DVI units
    pub scale: u32,
    /// Design size in DVI units
    pub design_size: u32,
    /// Area and name bytes, concatenated
    pub name: String,
}

impl FontDefinition {
    /// Parse the body of a font definition whose font number is `width` bytes
    pub fn parse(cursor: &mut ByteCursor<'_>, width: u8) -> ParseResult<Self> {
        let tex_number = cursor.read_uint(width)?;
        let checksum = cursor.read_u32()?;
        let scale = cursor.read_u32()?;
        let design_size = cursor.read_u32()?;
        if design_size == 0 {
            return Err(ParseError::Corrupted(format!(
                "font {tex_number} has a zero design size"
            )));
        }

        // The area and name lengths are summed and read as one string. A
        // non-empty area therefore ends up glued to the front of the name;
        // existing font lookups depend on that, so it is kept as is.
        let len = u16::from(cursor.read_u8()?) + u16::from(cursor.read_u8()?);
        let raw = cursor.read_bytes(len as usize)?;
        let name = String::from_utf8_lossy(raw).into_owned();

        Ok(Self {
            tex_number,
            checksum,
            scale,
            design_size,
            name,
        })
    }

    /// Size at which the font has to be rendered:
    /// `scale / design * magnification / 1000 * mode_resolution`
    pub fn effective_size(&self, magnification: u32, mode_resolution: f64) -> f64 {
        0.001 * f64::from(self.scale) / f64::from(self.design_size)
            * f64::from(magnification)
            * mode_resolution
    }
}

/// Global document data stored in the postamble
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Postamble {
    /// Offset of the POST command
    pub offset: usize,
    /// Offset of the BOP of the final page (-1 as u32 when there are none)
    pub last_page_offset: u32,
    /// Numerator of the DVI unit, repeated from the preamble
    pub numerator: u32,
    /// Denominator of the DVI unit, repeated from the preamble
    pub denominator: u32,
    /// Magnification times 1000, repeated from the preamble
    pub magnification: u32,
    /// Height plus depth of the tallest page
    pub max_height: u32,
    /// Width of the widest page
    pub max_width: u32,
    /// Maximum stack depth needed to interpret the pages
    pub max_stack_depth: u16,
    /// Number of BOP commands in the file
    pub total_pages: u16,
    /// Font definitions, in file order
    pub fonts: Vec<FontDefinition>,
}

impl Postamble {
    /// Parse the postamble starting at the cursor position
    pub fn parse(cursor: &mut ByteCursor<'_>) -> ParseResult<Self> {
        let offset = cursor.position();

        let found = cursor.read_u8()?;
        if found != POST {
            return Err(ParseError::MissingPost { found });
        }

        let last_page_offset = cursor.read_u32()?;
        let numerator = cursor.read_u32()?;
        let denominator = cursor.read_u32()?;
        let magnification = cursor.read_u32()?;
        let max_height = cursor.read_u32()?;
        let max_width = cursor.read_u32()?;
        let max_stack_depth = cursor.read_u16()?;
        let total_pages = cursor.read_u16()?;

        let mut fonts = Vec::new();
        loop {
            let at = cursor.position();
            let op = cursor.read_u8()?;
            match font_def_width(op) {
                Some(width) => {
                    let font = FontDefinition::parse(cursor, width)?;
                    tracing::trace!(
                        "postamble defines font {} \"{}\" scale={} design={}",
                        font.tex_number,
                        font.name,
                        font.scale,
                        font.design_size
                    );
                    fonts.push(font);
                }
                None if op == POST_POST => break,
                None => {
                    return Err(ParseError::UnexpectedPostambleCommand { offset: at, found: op })
                }
            }
        }

        Ok(Self {
            offset,
            last_page_offset,
            numerator,
            denominator,
            magnification,
            max_height,
            max_width,
            max_stack_depth,
            total_pages,
            fonts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::opcodes::{FNT_DEF1, FNT_DEF2, FNT_DEF4};
    use crate::parser::test_helpers::{build_dvi, minimal_dvi, push_font_def, TestFont};

    fn parse_at(data: &[u8], offset: usize) -> ParseResult<Postamble> {
        Postamble::parse(&mut ByteCursor::at(data, offset)?)
    }

    #[test]
    fn test_locate_postamble_minimal() {
        let dvi = minimal_dvi();
        assert_eq!(locate_postamble(&dvi.data).unwrap(), dvi.postamble_offset);
    }

    #[test]
    fn test_locate_postamble_long_padding() {
        for padding in [4, 5, 7, 16, 100, 257] {
            let dvi = build_dvi(2, &[], padding);
            assert_eq!(
                locate_postamble(&dvi.data).unwrap(),
                dvi.postamble_offset,
                "padding {padding}"
            );
        }
    }

    #[test]
    fn test_locate_postamble_all_padding() {
        let data = vec![PADDING; 64];
        assert!(matches!(
            locate_postamble(&data),
            Err(ParseError::PostambleNotFound)
        ));
    }

    #[test]
    fn test_locate_postamble_empty() {
        assert!(matches!(
            locate_postamble(&[]),
            Err(ParseError::PostambleNotFound)
        ));
    }

    #[test]
    fn test_locate_postamble_too_short_for_pointer() {
        let data = [0x01, 0x02, PADDING, PADDING];
        assert!(locate_postamble(&data).is_err());
    }

    #[test]
    fn test_locate_postamble_short_padding() {
        for padding in 0..4 {
            let dvi = build_dvi(1, &[], padding);
            assert!(
                matches!(locate_postamble(&dvi.data), Err(ParseError::Corrupted(_))),
                "padding {padding}"
            );
        }
    }

    #[test]
    fn test_locate_postamble_every_cut_tail_rejected() {
        let dvi = minimal_dvi();
        for cut in 1..=4 {
            let data = &dvi.data[..dvi.data.len() - cut];
            assert!(locate_postamble(data).is_err(), "cut {cut}");
        }
    }

    #[test]
    fn test_locate_postamble_wrong_id_byte() {
        let mut dvi = build_dvi(1, &[], 4);
        let id = dvi.data.len() - 5;
        assert_eq!(dvi.data[id], DVI_ID);
        dvi.data[id] = 3;
        let err = locate_postamble(&dvi.data).unwrap_err();
        assert!(err.to_string().contains("id byte"), "{err}");
    }

    #[test]
    fn test_locate_postamble_pointer_out_of_range() {
        let mut data = vec![0u8; 8];
        data.extend_from_slice(&1000u32.to_be_bytes());
        data.push(2);
        data.extend_from_slice(&[PADDING; 4]);
        assert!(matches!(
            locate_postamble(&data),
            Err(ParseError::Corrupted(_))
        ));
    }

    #[test]
    fn test_parse_postamble_fields() {
        let dvi = build_dvi(3, &[], 4);
        let post = parse_at(&dvi.data, dvi.postamble_offset).unwrap();

        assert_eq!(post.offset, dvi.postamble_offset);
        assert_eq!(post.last_page_offset as usize, dvi.page_offsets[2]);
        assert_eq!(post.total_pages, 3);
        assert_eq!(post.magnification, 1000);
        assert_eq!(post.max_stack_depth, 2);
        assert!(post.fonts.is_empty());
    }

    #[test]
    fn test_parse_postamble_fonts() {
        let fonts = [
            TestFont::new(0, "cmr10"),
            TestFont::new(300, "cmbx12"),
            TestFont {
                area: "/usr/fonts/",
                ..TestFont::new(70_000, "cmti10")
            },
        ];
        let dvi = build_dvi(1, &fonts, 4);
        let post = parse_at(&dvi.data, dvi.postamble_offset).unwrap();

        assert_eq!(post.fonts.len(), 3);
        assert_eq!(post.fonts[0].tex_number, 0);
        assert_eq!(post.fonts[0].name, "cmr10");
        assert_eq!(post.fonts[1].tex_number, 300);
        assert_eq!(post.fonts[1].name, "cmbx12");
        assert_eq!(post.fonts[2].tex_number, 70_000);
        // area and name are read as one string
        assert_eq!(post.fonts[2].name, "/usr/fonts/cmti10");
        assert_eq!(post.fonts[2].checksum, 0x1234_5678);
    }

    #[test]
    fn test_parse_four_byte_font_number() {
        let mut buf = Vec::new();
        push_font_def(&mut buf, &TestFont::new(0x0102_0304, "cmss10"));
        assert_eq!(buf[0], FNT_DEF4);

        let mut cursor = ByteCursor::at(&buf, 1).unwrap();
        let font = FontDefinition::parse(&mut cursor, 4).unwrap();
        assert_eq!(font.tex_number, 0x0102_0304);
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn test_missing_post() {
        let dvi = minimal_dvi();
        let result = parse_at(&dvi.data, dvi.postamble_offset - 1);
        assert!(matches!(result, Err(ParseError::MissingPost { .. })));
    }

    #[test]
    fn test_unexpected_postamble_command() {
        let mut dvi = build_dvi(1, &[TestFont::new(1, "cmr10")], 4);
        let post_post = dvi.data.len() - 4 - 1 - 4 - 1;
        assert_eq!(dvi.data[post_post], POST_POST);
        dvi.data[post_post] = 0x8A;

        match parse_at(&dvi.data, dvi.postamble_offset) {
            Err(ParseError::UnexpectedPostambleCommand { offset, found }) => {
                assert_eq!(offset, post_post);
                assert_eq!(found, 0x8A);
            }
            other => panic!("expected unexpected command, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_design_size() {
        let mut buf = Vec::new();
        let font = TestFont {
            design: 0,
            ..TestFont::new(5, "cmr10")
        };
        push_font_def(&mut buf, &font);
        assert_eq!(buf[0], FNT_DEF1);
        let mut cursor = ByteCursor::at(&buf, 1).unwrap();
        assert!(matches!(
            FontDefinition::parse(&mut cursor, 1),
            Err(ParseError::Corrupted(_))
        ));
    }

    #[test]
    fn test_effective_size() {
        let font = FontDefinition {
            tex_number: 0,
            checksum: 0,
            scale: 2 * 655_360,
            design_size: 655_360,
            name: "cmr10".to_string(),
        };
        // Twice the design size at magstep 0 and 600 dpi
        assert!((font.effective_size(1000, 600.0) - 1200.0).abs() < 1e-9);
        assert!((font.effective_size(2000, 300.0) - 1200.0).abs() < 1e-9);
    }

    #[test]
    fn test_truncated_font_name() {
        let mut buf = Vec::new();
        push_font_def(&mut buf, &TestFont::new(2, "cmr10"));
        buf.truncate(buf.len() - 2);
        assert_eq!(buf[0], FNT_DEF1);
        let mut cursor = ByteCursor::at(&buf, 1).unwrap();
        assert!(matches!(
            FontDefinition::parse(&mut cursor, 1),
            Err(ParseError::Truncated { needed: 2, .. })
        ));
    }

    #[test]
    fn test_two_byte_font_number_opcode() {
        let mut buf = Vec::new();
        push_font_def(&mut buf, &TestFont::new(0x1234, "x"));
        assert_eq!(buf[0], FNT_DEF2);
    }
}
