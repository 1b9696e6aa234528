//! DVI command bytes used by the loader

/// Beginning of page. Followed by ten 4-byte counters and a 4-byte pointer
/// to the previous BOP (-1 on the first page).
pub const BOP: u8 = 139;
/// End of page
pub const EOP: u8 = 140;

/// Font definition with a 1-byte font number
pub const FNT_DEF1: u8 = 243;
/// Font definition with a 2-byte font number
pub const FNT_DEF2: u8 = 244;
/// Font definition with a 3-byte font number
pub const FNT_DEF3: u8 = 245;
/// Font definition with a 4-byte font number
pub const FNT_DEF4: u8 = 246;

/// Preamble: id byte, num[4], den[4], mag[4], k[1], comment[k]
pub const PRE: u8 = 247;
/// Postamble: p[4], num[4], den[4], mag[4], l[4], u[4], s[2], t[2], font defs
pub const POST: u8 = 248;
/// End of postamble: q[4] (pointer to POST), id byte, padding
pub const POST_POST: u8 = 249;

/// Trailing padding byte
pub const PADDING: u8 = 223;

/// Fewest PADDING bytes a complete file ends with
pub const MIN_PADDING: usize = 4;

/// Id byte of standard DVI output
pub const DVI_ID: u8 = 2;

/// Bytes taken by the ten `\count` registers after BOP
pub const BOP_COUNTERS_LEN: usize = 10 * 4;

/// Bytes of a complete BOP command
pub const BOP_LEN: usize = 1 + BOP_COUNTERS_LEN + 4;

/// Postamble bytes between the last-page pointer and the page count:
/// num, den, mag, max height, max width (4 bytes each) and max stack depth (2)
pub const POSTAMBLE_SKIPPED_LEN: usize = 4 + 4 + 4 + 4 + 4 + 2;

/// Whether `op` is one of FNT_DEF1..FNT_DEF4
pub fn is_font_def(op: u8) -> bool {
    (FNT_DEF1..=FNT_DEF4).contains(&op)
}

/// Width in bytes of the font number that follows a FNT_DEF command
pub fn font_def_width(op: u8) -> Option<u8> {
    is_font_def(op).then(|| op - FNT_DEF1 + 1)
}
