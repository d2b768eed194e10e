//! Byte/character offset conversion.
//!
//! Annotation records store mention offsets as **character** indices (that is
//! what the annotation front end and the upstream tokenizer count), while Rust
//! string slicing works on **bytes**. The two only agree for ASCII text:
//!
//! ```text
//! Text:   "Le café coûte €5"
//! bytes:   L e _ c a f [é=2] _ c o [û=2] t e _ [€=3] 5
//! chars:   0 1 2 3 4 5  6    7 8 9  10  11 12 13 14  15
//! ```
//!
//! Every conversion in the crate goes through [`SpanConverter`], which
//! precomputes both tables once per document.

/// Build a table where `map[byte_idx]` is the character index of that byte.
///
/// Bytes inside a multi-byte character map to the character's index; the
/// final slot (`text.len()`) maps to the character count.
#[must_use]
pub fn build_byte_to_char_map(text: &str) -> Vec<usize> {
    let mut map = vec![0usize; text.len() + 1];

    for (char_idx, (byte_idx, ch)) in text.char_indices().enumerate() {
        for i in 0..ch.len_utf8() {
            map[byte_idx + i] = char_idx;
        }
    }
    map[text.len()] = text.chars().count();

    map
}

/// Build a table where `map[char_idx]` is the byte index of that character.
#[must_use]
pub fn build_char_to_byte_map(text: &str) -> Vec<usize> {
    let char_count = text.chars().count();
    let mut map = vec![0usize; char_count + 1];

    for (char_idx, (byte_idx, _)) in text.char_indices().enumerate() {
        map[char_idx] = byte_idx;
    }
    map[char_count] = text.len();

    map
}

/// Precomputed byte/char conversion for one document.
///
/// ASCII text skips the tables entirely since the mapping is the identity.
#[derive(Debug, Clone)]
pub struct SpanConverter {
    byte_to_char: Vec<usize>,
    char_to_byte: Vec<usize>,
    is_ascii: bool,
    char_len: usize,
}

impl SpanConverter {
    /// Create a converter for the given text.
    #[must_use]
    pub fn new(text: &str) -> Self {
        if text.is_ascii() {
            Self {
                byte_to_char: Vec::new(),
                char_to_byte: Vec::new(),
                is_ascii: true,
                char_len: text.len(),
            }
        } else {
            let char_to_byte = build_char_to_byte_map(text);
            Self {
                byte_to_char: build_byte_to_char_map(text),
                char_len: char_to_byte.len() - 1,
                char_to_byte,
                is_ascii: false,
            }
        }
    }

    /// Convert a byte offset to a char offset (clamped to the text end).
    #[must_use]
    pub fn byte_to_char(&self, byte_idx: usize) -> usize {
        if self.is_ascii {
            byte_idx.min(self.char_len)
        } else {
            self.byte_to_char
                .get(byte_idx)
                .copied()
                .unwrap_or(self.char_len)
        }
    }

    /// Convert a char offset to a byte offset (clamped to the text end).
    #[must_use]
    pub fn char_to_byte(&self, char_idx: usize) -> usize {
        if self.is_ascii {
            char_idx.min(self.char_len)
        } else {
            let last = self.char_to_byte.last().copied().unwrap_or(0);
            self.char_to_byte.get(char_idx).copied().unwrap_or(last)
        }
    }

    /// Number of characters in the text.
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.char_len
    }

    /// Slice `text` by character offsets.
    ///
    /// Returns `None` when the span runs past the end of the text.
    #[must_use]
    pub fn slice_chars<'a>(&self, text: &'a str, char_start: usize, char_end: usize) -> Option<&'a str> {
        if char_start > char_end || char_end > self.char_len {
            return None;
        }
        text.get(self.char_to_byte(char_start)..self.char_to_byte(char_end))
    }

    /// Check if this text is ASCII.
    #[must_use]
    pub const fn is_ascii(&self) -> bool {
        self.is_ascii
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_is_identity() {
        let conv = SpanConverter::new("Hello World");
        assert!(conv.is_ascii());
        assert_eq!(conv.byte_to_char(5), 5);
        assert_eq!(conv.char_to_byte(5), 5);
        assert_eq!(conv.char_len(), 11);
        assert_eq!(conv.byte_to_char(99), 11);
    }

    #[test]
    fn euro_symbol() {
        // "Price " = 6 bytes, € = 3 bytes, "50" = 2 bytes: 11 bytes, 9 chars
        let text = "Price €50";
        let conv = SpanConverter::new(text);

        assert!(!conv.is_ascii());
        assert_eq!(conv.char_len(), 9);
        assert_eq!(conv.byte_to_char(6), 6);
        assert_eq!(conv.byte_to_char(9), 7);
        assert_eq!(conv.byte_to_char(11), 9);
        assert_eq!(conv.char_to_byte(7), 9);
        assert_eq!(conv.slice_chars(text, 6, 9), Some("€50"));
    }

    #[test]
    fn bytes_inside_a_character_map_to_it() {
        let map = build_byte_to_char_map("aé");
        assert_eq!(map, vec![0, 1, 1, 2]);
        assert_eq!(build_char_to_byte_map("aé"), vec![0, 1, 3]);
    }

    #[test]
    fn slice_out_of_range_is_none() {
        let text = "café";
        let conv = SpanConverter::new(text);
        assert_eq!(conv.slice_chars(text, 0, 4), Some("café"));
        assert_eq!(conv.slice_chars(text, 2, 5), None);
        assert_eq!(conv.slice_chars(text, 3, 2), None);
    }

    #[test]
    fn empty_text() {
        let conv = SpanConverter::new("");
        assert_eq!(conv.char_len(), 0);
        assert_eq!(conv.slice_chars("", 0, 0), Some(""));
    }
}
