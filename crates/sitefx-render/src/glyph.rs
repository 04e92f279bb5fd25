#![forbid(unsafe_code)]

//! Procedural glyph masks for headless rendering.
//!
//! Browser hosts draw rain glyphs with the platform font. Headless surfaces
//! have no font, so each glyph is a 5×7 cell mask derived from its codepoint
//! with a xorshift mix. The masks are stable across runs and distinct enough
//! for the rain to read as "characters" in a dump; they are not legible text.

/// Mask columns.
pub const GLYPH_COLS: u32 = 5;
/// Mask rows.
pub const GLYPH_ROWS: u32 = 7;
/// Advance width as a fraction of the font size (monospace).
pub const ADVANCE_RATIO: f32 = 0.6;

/// A 5×7 bit mask, row-major from the top-left, bit 0 first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlyphMask(u64);

impl GlyphMask {
    const FULL: u64 = (1 << (GLYPH_COLS * GLYPH_ROWS)) - 1;

    /// The empty mask.
    pub const EMPTY: Self = Self(0);

    /// Mask for `ch`. Whitespace is empty; everything else has at least one
    /// cell lit in every row.
    pub fn for_char(ch: char) -> Self {
        if ch.is_whitespace() {
            return Self::EMPTY;
        }
        let mut state = (ch as u32).wrapping_mul(0x9E37_79B9) | 1;
        let mut bits = 0u64;
        for row in 0..GLYPH_ROWS {
            state = xorshift32(state);
            let mut row_bits = u64::from(state & 0x1F);
            if row_bits == 0 {
                row_bits = 1 << (state % GLYPH_COLS);
            }
            bits |= row_bits << (row * GLYPH_COLS);
        }
        Self(bits & Self::FULL)
    }

    /// Whether the cell at `(col, row)` is lit.
    pub fn is_set(self, col: u32, row: u32) -> bool {
        if col >= GLYPH_COLS || row >= GLYPH_ROWS {
            return false;
        }
        self.0 & (1 << (row * GLYPH_COLS + col)) != 0
    }

    /// Number of lit cells.
    pub fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// Iterate lit cells as `(col, row)`.
    pub fn cells(self) -> impl Iterator<Item = (u32, u32)> {
        (0..GLYPH_ROWS)
            .flat_map(|row| (0..GLYPH_COLS).map(move |col| (col, row)))
            .filter(move |&(col, row)| self.is_set(col, row))
    }
}

#[inline]
fn xorshift32(mut x: u32) -> u32 {
    x ^= x << 13;
    x ^= x >> 17;
    x ^= x << 5;
    x
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_are_deterministic() {
        assert_eq!(GlyphMask::for_char('A'), GlyphMask::for_char('A'));
    }

    #[test]
    fn whitespace_is_empty() {
        assert_eq!(GlyphMask::for_char(' '), GlyphMask::EMPTY);
        assert_eq!(GlyphMask::EMPTY.count(), 0);
    }

    #[test]
    fn every_row_has_a_cell() {
        for ch in "ABCDEFGHIJKLMNOPQRSTUVWXYZ1234567890@#$%^&*()<>?:\";{}[]|".chars() {
            let mask = GlyphMask::for_char(ch);
            for row in 0..GLYPH_ROWS {
                assert!(
                    (0..GLYPH_COLS).any(|col| mask.is_set(col, row)),
                    "glyph {ch:?} row {row} empty"
                );
            }
        }
    }

    #[test]
    fn out_of_range_cells_unset() {
        let mask = GlyphMask::for_char('X');
        assert!(!mask.is_set(GLYPH_COLS, 0));
        assert!(!mask.is_set(0, GLYPH_ROWS));
    }

    #[test]
    fn cells_matches_count() {
        let mask = GlyphMask::for_char('Q');
        assert_eq!(mask.cells().count() as u32, mask.count());
    }
}
