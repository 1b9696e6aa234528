//! Bounds-checked big-endian reader over an in-memory DVI buffer

use super::{ParseError, ParseResult};

/// Read position over an immutable byte slice.
///
/// Every read checks the remaining length first and fails with
/// [`ParseError::Truncated`] instead of touching memory past the end.
#[derive(Debug, Clone, Copy)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    /// Create a cursor at the start of `data`
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Create a cursor at `offset`
    pub fn at(data: &'a [u8], offset: usize) -> ParseResult<Self> {
        let mut cursor = Self::new(data);
        cursor.seek(offset)?;
        Ok(cursor)
    }

    /// Current offset from the start of the buffer
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Move to an absolute offset. `offset == len()` is allowed (end of data).
    pub fn seek(&mut self, offset: usize) -> ParseResult<()> {
        if offset > self.data.len() {
            return Err(ParseError::Truncated {
                offset,
                needed: offset - self.data.len(),
            });
        }
        self.pos = offset;
        Ok(())
    }

    /// Move backwards by `n` bytes
    pub fn step_back(&mut self, n: usize) -> ParseResult<()> {
        self.pos = self.pos.checked_sub(n).ok_or_else(|| {
            ParseError::Corrupted(format!(
                "cannot step back {n} bytes from offset {}",
                self.pos
            ))
        })?;
        Ok(())
    }

    /// Total buffer length
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes left after the current position
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Byte at the current position, without advancing
    pub fn peek_u8(&self) -> ParseResult<u8> {
        self.data
            .get(self.pos)
            .copied()
            .ok_or(ParseError::Truncated {
                offset: self.pos,
                needed: 1,
            })
    }

    /// Read `n` raw bytes
    pub fn read_bytes(&mut self, n: usize) -> ParseResult<&'a [u8]> {
        let available = self.remaining();
        if n > available {
            return Err(ParseError::Truncated {
                offset: self.pos,
                needed: n - available,
            });
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    /// Skip `n` bytes
    pub fn skip(&mut self, n: usize) -> ParseResult<()> {
        self.read_bytes(n).map(|_| ())
    }

    pub fn read_u8(&mut self) -> ParseResult<u8> {
        let byte = self.peek_u8()?;
        self.pos += 1;
        Ok(byte)
    }

    pub fn read_u16(&mut self) -> ParseResult<u16> {
        // width 2 always fits
        self.read_uint(2).map(|v| v as u16)
    }

    pub fn read_u24(&mut self) -> ParseResult<u32> {
        self.read_uint(3)
    }

    pub fn read_u32(&mut self) -> ParseResult<u32> {
        let b = self.read_bytes(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Signed 32-bit value, used for BOP back-pointers (-1 on the first page)
    pub fn read_i32(&mut self) -> ParseResult<i32> {
        let b = self.read_bytes(4)?;
        Ok(i32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Unsigned big-endian integer of `width` bytes (1..=4)
    pub fn read_uint(&mut self, width: u8) -> ParseResult<u32> {
        if !(1..=4).contains(&width) {
            return Err(ParseError::InvalidWidth(width));
        }
        let bytes = self.read_bytes(width as usize)?;
        Ok(bytes
            .iter()
            .fold(0u32, |acc, &b| (acc << 8) | u32::from(b)))
    }
}
