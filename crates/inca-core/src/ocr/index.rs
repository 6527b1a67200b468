//! Positional text index over OCR words.
//!
//! Every word gets a geometric center and a byte span in the full text, so a
//! regex hit in the text can be mapped back to a place on the page.

use super::WordToken;

/// A point in page pixel coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Offset (dx, dy) of `self` relative to `origin`.
    pub fn offset_from(&self, origin: Point) -> (f32, f32) {
        (self.x - origin.x, self.y - origin.y)
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: Point) -> f32 {
        let (dx, dy) = self.offset_from(other);
        (dx * dx + dy * dy).sqrt()
    }

    /// Mean of a set of points; origin when empty.
    pub fn mean(points: impl IntoIterator<Item = Point>) -> Point {
        let mut n = 0usize;
        let (mut sx, mut sy) = (0.0f32, 0.0f32);
        for p in points {
            n += 1;
            sx += p.x;
            sy += p.y;
        }
        if n == 0 {
            return Point::default();
        }
        Point::new(sx / n as f32, sy / n as f32)
    }
}

/// A word with its position in both text and page space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexedWord<'a> {
    /// Word text, borrowed from the OCR result.
    pub text: &'a str,
    /// Position in reading order.
    pub sequence_index: usize,
    /// Center of the bounding polygon.
    pub center: Point,
    /// Byte offset of the first character in the full text.
    pub char_start: usize,
    /// Byte offset one past the last character.
    pub char_end: usize,
    /// Recognition confidence; 1.0 when the backend reported none.
    pub confidence: f32,
}

impl IndexedWord<'_> {
    /// Whether `offset` falls inside this word's span.
    pub fn contains_offset(&self, offset: usize) -> bool {
        self.char_start <= offset && offset < self.char_end
    }

    /// Distance in bytes from `offset` to this word's span (0 when inside).
    fn offset_gap(&self, offset: usize) -> usize {
        if offset < self.char_start {
            self.char_start - offset
        } else if offset >= self.char_end {
            offset + 1 - self.char_end
        } else {
            0
        }
    }
}

/// Words of one document, addressable by sequence, text offset and geometry.
#[derive(Debug, Clone, Default)]
pub struct PositionalIndex<'a> {
    words: Vec<IndexedWord<'a>>,
}

impl<'a> PositionalIndex<'a> {
    /// Build the index from words in OCR reading order.
    ///
    /// Spans are assigned as if the words were joined by single spaces.
    /// Empty words still take their separator but are left out.
    pub fn build(words: &'a [WordToken]) -> Self {
        let mut indexed = Vec::with_capacity(words.len());
        let mut cursor = 0usize;

        for word in words {
            let char_start = cursor;
            let char_end = char_start + word.text.len();
            cursor = char_end + 1;
            if word.text.is_empty() {
                continue;
            }

            indexed.push(IndexedWord {
                text: &word.text,
                sequence_index: indexed.len(),
                center: word.center(),
                char_start,
                char_end,
                confidence: word.confidence.unwrap_or(1.0),
            });
        }

        Self { words: indexed }
    }

    /// All words in reading order.
    pub fn words(&self) -> &[IndexedWord<'a>] {
        &self.words
    }

    pub fn get(&self, sequence_index: usize) -> Option<&IndexedWord<'a>> {
        self.words.get(sequence_index)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, IndexedWord<'a>> {
        self.words.iter()
    }

    /// The word whose span contains `offset`, if any.
    pub fn word_at_offset(&self, offset: usize) -> Option<&IndexedWord<'a>> {
        // Spans are strictly increasing, so the candidate is the last word
        // starting at or before the offset.
        let pos = self.words.partition_point(|w| w.char_start <= offset);
        let word = self.words.get(pos.checked_sub(1)?)?;
        word.contains_offset(offset).then_some(word)
    }

    /// The word closest to `offset` by text distance; earlier word on ties.
    pub fn nearest_to_offset(&self, offset: usize) -> Option<&IndexedWord<'a>> {
        self.words.iter().min_by_key(|w| w.offset_gap(offset))
    }

    /// Exact containment first, nearest word otherwise.
    pub fn locate(&self, offset: usize) -> Option<&IndexedWord<'a>> {
        self.word_at_offset(offset)
            .or_else(|| self.nearest_to_offset(offset))
    }

    /// Words whose span starts at or after `offset` and no later than `offset + window`.
    pub fn words_after_offset(&self, offset: usize, window: usize) -> &[IndexedWord<'a>] {
        let start = self.words.partition_point(|w| w.char_start < offset);
        let end = self.words.partition_point(|w| w.char_start <= offset + window);
        &self.words[start..end.max(start)]
    }
}

impl<'a, 'i> IntoIterator for &'i PositionalIndex<'a> {
    type Item = &'i IndexedWord<'a>;
    type IntoIter = std::slice::Iter<'i, IndexedWord<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.words.iter()
    }
}
