//! Sentence and token segmentation.
//!
//! Alignment needs each document as sentences of tokens with character
//! offsets. Any segmenter can plug in through [`Tokenizer`]; the crate ships
//! [`RuleTokenizer`], a deterministic punctuation/whitespace splitter.

use crate::offset::SpanConverter;

/// A token with character offsets into its document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Surface text.
    pub text: String,
    /// Start character offset (inclusive).
    pub start: usize,
    /// End character offset (exclusive).
    pub end: usize,
    /// Index of the sentence holding this token.
    pub sentence: usize,
}

impl Token {
    /// Length in characters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// True for zero-length tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// True if the token carries no visible text.
    #[must_use]
    pub fn is_space(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// A sentence's character extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sentence {
    /// Start character offset (inclusive).
    pub start: usize,
    /// End character offset (exclusive).
    pub end: usize,
}

/// Segmented document: sentences plus tokens in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentTokens {
    /// Sentence extents in order.
    pub sentences: Vec<Sentence>,
    /// Tokens in order, each pointing at its sentence.
    pub tokens: Vec<Token>,
}

impl DocumentTokens {
    /// Index of the token covering `char_offset`, if any.
    ///
    /// Offsets in the gap between two tokens (whitespace) return `None`.
    #[must_use]
    pub fn token_at(&self, char_offset: usize) -> Option<usize> {
        let idx = self
            .tokens
            .partition_point(|t| t.start <= char_offset)
            .checked_sub(1)?;
        (char_offset < self.tokens[idx].end).then_some(idx)
    }

    /// Indices of tokens lying entirely inside `[start, end)`.
    #[must_use]
    pub fn tokens_in(&self, start: usize, end: usize) -> Vec<usize> {
        let first = self.tokens.partition_point(|t| t.start < start);
        self.tokens[first..]
            .iter()
            .enumerate()
            .take_while(|(_, t)| t.start < end)
            .filter(|(_, t)| t.end <= end)
            .map(|(i, _)| first + i)
            .collect()
    }

    /// Number of tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// True if the document produced no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Turns raw document text into sentences and tokens.
///
/// Implementations must be deterministic: identical text always yields
/// identical segmentation, since exports are compared across runs.
pub trait Tokenizer: Send + Sync {
    /// Segment `text`. Offsets are character offsets.
    fn tokenize(&self, text: &str) -> DocumentTokens;
}

/// Rule-based segmenter.
///
/// Words are runs of alphanumerics with inner apostrophes and hyphens; every
/// other visible character is a token of its own. A sentence ends after
/// `.`, `!` or `?` when whitespace (or a closing quote) follows and the next
/// visible character is uppercase, a quote, or the end of text.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleTokenizer;

impl RuleTokenizer {
    /// Create the tokenizer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn is_word_char(c: char) -> bool {
        c.is_alphanumeric() || c == '\'' || c == '-'
    }

    /// Character offsets where sentences end.
    fn sentence_ends(chars: &[char]) -> Vec<usize> {
        let mut ends = Vec::new();
        for (i, &c) in chars.iter().enumerate() {
            if !matches!(c, '.' | '!' | '?') {
                continue;
            }
            let next = chars.get(i + 1);
            let after = chars[i + 1..].iter().find(|ch| !ch.is_whitespace() && **ch != '"');
            let closes = next.map_or(true, |&nc| nc.is_whitespace() || nc == '"' || nc == '\'');
            let opens = after.map_or(true, |&ac| ac.is_uppercase() || ac.is_numeric());
            if closes && opens {
                ends.push(i + 1);
            }
        }
        ends
    }
}

impl Tokenizer for RuleTokenizer {
    fn tokenize(&self, text: &str) -> DocumentTokens {
        let conv = SpanConverter::new(text);
        let chars: Vec<char> = text.chars().collect();
        let ends = Self::sentence_ends(&chars);

        let mut raw: Vec<(usize, usize)> = Vec::new();
        let mut word_start: Option<usize> = None;
        for (byte_idx, c) in text.char_indices() {
            let i = conv.byte_to_char(byte_idx);
            if Self::is_word_char(c) {
                if word_start.is_none() {
                    word_start = Some(i);
                }
                continue;
            }
            if let Some(s) = word_start.take() {
                raw.push((s, i));
            }
            if !c.is_whitespace() {
                raw.push((i, i + 1));
            }
        }
        if let Some(s) = word_start {
            raw.push((s, chars.len()));
        }

        let mut sentences = Vec::new();
        let mut tokens = Vec::new();
        let mut sentence_start: Option<usize> = None;
        let mut end_iter = ends.iter().peekable();

        for (start, end) in raw {
            while let Some(&&boundary) = end_iter.peek() {
                if start < boundary {
                    break;
                }
                end_iter.next();
                if let Some(s) = sentence_start.take() {
                    let last_end = tokens.last().map_or(boundary, |t: &Token| t.end);
                    sentences.push(Sentence { start: s, end: last_end });
                }
            }
            if sentence_start.is_none() {
                sentence_start = Some(start);
            }
            tokens.push(Token {
                text: chars[start..end].iter().collect(),
                start,
                end,
                sentence: sentences.len(),
            });
        }
        if let (Some(s), Some(last)) = (sentence_start, tokens.last()) {
            sentences.push(Sentence { start: s, end: last.end });
        }

        DocumentTokens { sentences, tokens }
    }
}
