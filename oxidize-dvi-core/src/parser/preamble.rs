//! DVI Preamble Parser
//!
//! `PRE id[1] num[4] den[4] mag[4] k[1] x[k]`

use super::cursor::ByteCursor;
use super::opcodes::{DVI_ID, PRE};
use super::{ParseError, ParseResult};

/// Upper bound on the stored generator comment
pub const MAX_GENERATOR_LEN: usize = 299;

/// Scaling parameters and generator comment from the preamble
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Preamble {
    /// Numerator of the DVI unit (25400000 for TeX)
    pub numerator: u32,
    /// Denominator of the DVI unit (473628672 for TeX)
    pub denominator: u32,
    /// Magnification times 1000
    pub magnification: u32,
    /// Producer comment, e.g. " TeX output 2024.01.01:1200"
    pub generator: String,
}

impl Preamble {
    /// Parse the preamble at the cursor position and leave the cursor after it
    pub fn parse(cursor: &mut ByteCursor<'_>) -> ParseResult<Self> {
        if cursor.read_u8()? != PRE {
            return Err(ParseError::MissingPreamble);
        }

        let id = cursor.read_u8()?;
        if id != DVI_ID {
            return Err(ParseError::UnsupportedVersion(id));
        }

        let numerator = cursor.read_u32()?;
        let denominator = cursor.read_u32()?;
        let magnification = cursor.read_u32()?;
        if denominator == 0 {
            return Err(ParseError::Corrupted(
                "preamble declares a zero denominator".to_string(),
            ));
        }

        let len = cursor.read_u8()? as usize;
        let raw = cursor.read_bytes(len)?;
        let raw = &raw[..raw.len().min(MAX_GENERATOR_LEN)];
        // Stop at an embedded NUL like the C string it used to be
        let raw = raw.split(|&b| b == 0).next().unwrap_or_default();
        let generator = String::from_utf8_lossy(raw).into_owned();

        Ok(Self {
            numerator,
            denominator,
            magnification,
            generator,
        })
    }

    /// Factor converting DVI units into device units at `render_resolution`
    /// dots per inch, carrying 16 fractional bits.
    pub fn conversion_factor(&self, render_resolution: f64) -> f64 {
        let unit = (f64::from(self.numerator) * f64::from(self.magnification))
            / (f64::from(self.denominator) * 1000.0);
        unit * (render_resolution * 65536.0) / 254_000.0
    }
}
