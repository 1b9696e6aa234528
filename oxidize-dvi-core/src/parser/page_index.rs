//! Page index reconstruction
//!
//! Every BOP stores the offset of the previous BOP, and the postamble stores
//! the offset of the last one. Walking that chain backwards fills a table
//! that maps page numbers to content offsets.

use super::cursor::ByteCursor;
use super::opcodes::{BOP, BOP_COUNTERS_LEN};
use super::postamble::Postamble;
use super::{ParseError, ParseOptions, ParseResult};
use std::ops::Range;

/// Offsets of every page's BOP, plus the postamble offset as end sentinel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageIndex {
    /// `offsets[i]` is the BOP of page `i`; the final slot is the postamble
    offsets: Vec<usize>,
}

impl PageIndex {
    /// Follow the BOP back-links starting from the postamble's last page
    pub fn build(data: &[u8], postamble: &Postamble, options: &ParseOptions) -> ParseResult<Self> {
        let total = usize::from(postamble.total_pages);

        let mut offsets = Vec::new();
        offsets.try_reserve_exact(total + 1)?;
        offsets.resize(total + 1, 0);
        offsets[total] = postamble.offset;

        if total == 0 {
            return Ok(Self { offsets });
        }

        let last = postamble.last_page_offset as usize;
        if last >= postamble.offset {
            return Err(ParseError::Corrupted(format!(
                "last page offset {last} does not precede the postamble at {}",
                postamble.offset
            )));
        }
        offsets[total - 1] = last;

        for i in (1..total).rev() {
            let back = read_back_link(data, offsets[i], i + 1)?;
            let target = back as usize;
            let in_file = target < data.len();
            // strict mode also requires the chain to move towards the start
            let backwards = target < offsets[i];

            offsets[i - 1] = if in_file && (options.lenient_back_links || backwards) {
                target
            } else if options.lenient_back_links {
                tracing::warn!(
                    "page {} links back to offset {back}, outside the file; using 0",
                    i + 1
                );
                0
            } else {
                return Err(ParseError::InvalidBackLink {
                    page: i + 1,
                    target: u64::from(back),
                });
            };
        }

        if !options.lenient_back_links {
            // The loop never dereferences the first page
            read_back_link(data, offsets[0], 1)?;
        }

        Ok(Self { offsets })
    }

    /// Number of pages
    pub fn page_count(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    /// Offset of the BOP that starts page `page` (0-based)
    pub fn page_offset(&self, page: usize) -> Option<usize> {
        if page < self.page_count() {
            self.offsets.get(page).copied()
        } else {
            None
        }
    }

    /// Byte range of page `page`: from its BOP up to the next page or the
    /// postamble
    pub fn page_range(&self, page: usize) -> Option<Range<usize>> {
        let start = self.page_offset(page)?;
        let end = *self.offsets.get(page + 1)?;
        Some(start..end.max(start))
    }

    /// Offset of the postamble (the end sentinel)
    pub fn postamble_offset(&self) -> usize {
        self.offsets.last().copied().unwrap_or(0)
    }

    /// All slots, sentinel included
    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    /// Page start offsets in page order
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.offsets[..self.page_count()].iter().copied()
    }
}

/// Check the BOP at `offset` and return the back-pointer it carries
fn read_back_link(data: &[u8], offset: usize, page: usize) -> ParseResult<u32> {
    let mut cursor = ByteCursor::at(data, offset)?;
    if cursor.read_u8()? != BOP {
        return Err(ParseError::MissingBop { page });
    }
    cursor.skip(BOP_COUNTERS_LEN)?;
    cursor.read_u32()
}
