//! Tokenizers: map text to matchable units with exact byte offsets.
//!
//! Units cover the input without overlap; the matcher recovers surface
//! spans purely from `(start, end)`, so replacement reconstructs original
//! spacing and punctuation byte-for-byte.

/// One matchable unit with its span in the original string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The unit's surface text.
    pub text: String,
    /// Byte offset of the first byte.
    pub start: usize,
    /// Byte offset one past the last byte.
    pub end: usize,
}

/// Maps a text segment to a sequence of matchable units.
pub trait Tokenizer: Send + Sync {
    /// Splits `text` into covering, non-overlapping units.
    fn tokenize(&self, text: &str) -> Vec<Token>;
}

/// Returns true for CJK unified ideographs (the range the Mandarin matcher
/// treats as per-character units).
pub fn is_hanzi(ch: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&ch)
}

/// Returns true for hiragana or katakana.
pub fn is_kana(ch: char) -> bool {
    ('\u{3040}'..='\u{309f}').contains(&ch) || ('\u{30a0}'..='\u{30ff}').contains(&ch)
}

/// Character-granularity tokenizer for Chinese and Japanese.
///
/// Every code point of the target scripts becomes its own unit; maximal
/// runs of non-target characters collapse into a single opaque unit that
/// keeps its surface span (so an embedded `asupirin` or `1kg` is one unit,
/// not eight).
pub struct CharTokenizer {
    is_target: fn(char) -> bool,
}

impl CharTokenizer {
    /// Tokenizer for Mandarin text: hanzi are units, everything else is
    /// grouped into opaque runs.
    pub fn mandarin() -> Self {
        Self { is_target: is_hanzi }
    }

    /// Tokenizer for Japanese text: kana and hanzi are units.
    pub fn japanese() -> Self {
        fn target(ch: char) -> bool {
            is_kana(ch) || is_hanzi(ch)
        }
        Self { is_target: target }
    }
}

impl Tokenizer for CharTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut run_start: Option<usize> = None;

        for (idx, ch) in text.char_indices() {
            if (self.is_target)(ch) {
                if let Some(start) = run_start.take() {
                    tokens.push(Token {
                        text: text[start..idx].to_string(),
                        start,
                        end: idx,
                    });
                }
                tokens.push(Token {
                    text: ch.to_string(),
                    start: idx,
                    end: idx + ch.len_utf8(),
                });
            } else if run_start.is_none() {
                run_start = Some(idx);
            }
        }

        if let Some(start) = run_start {
            tokens.push(Token {
                text: text[start..].to_string(),
                start,
                end: text.len(),
            });
        }

        tokens
    }
}

/// Word-granularity tokenizer for English.
///
/// Splits on whitespace and punctuation; alphanumeric runs (including
/// apostrophes and hyphens inside words) become units, separators are
/// dropped but spans stay exact.
pub struct WordTokenizer;

impl WordTokenizer {
    fn is_word_char(ch: char) -> bool {
        ch.is_alphanumeric() || ch == '\'' || ch == '-'
    }
}

impl Tokenizer for WordTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut word_start: Option<usize> = None;

        for (idx, ch) in text.char_indices() {
            if Self::is_word_char(ch) {
                if word_start.is_none() {
                    word_start = Some(idx);
                }
            } else if let Some(start) = word_start.take() {
                tokens.push(Token {
                    text: text[start..idx].to_string(),
                    start,
                    end: idx,
                });
            }
        }

        if let Some(start) = word_start {
            tokens.push(Token {
                text: text[start..].to_string(),
                start,
                end: text.len(),
            });
        }

        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_mandarin_char_units() {
        let tokens = CharTokenizer::mandarin().tokenize("我在北車");
        assert_eq!(texts(&tokens), vec!["我", "在", "北", "車"]);
        assert_eq!(tokens[0].start, 0);
        assert_eq!(tokens[3].end, "我在北車".len());
    }

    #[test]
    fn test_mandarin_ascii_run_is_opaque() {
        let tokens = CharTokenizer::mandarin().tokenize("這個 1kg設備");
        assert_eq!(texts(&tokens), vec!["這", "個", " 1kg", "設", "備"]);
    }

    #[test]
    fn test_japanese_mixed_script() {
        let tokens = CharTokenizer::japanese().tokenize("頭が痛いのでasupirinを飲み");
        let t: Vec<&str> = texts(&tokens);
        assert!(t.contains(&"asupirin"));
        assert!(t.contains(&"頭"));
        assert!(t.contains(&"を"));
    }

    #[test]
    fn test_spans_cover_without_overlap() {
        let text = "我在北車買了 1kg,好嗎";
        let tokens = CharTokenizer::mandarin().tokenize(text);
        let mut pos = 0;
        for token in &tokens {
            assert_eq!(token.start, pos);
            assert_eq!(&text[token.start..token.end], token.text);
            pos = token.end;
        }
        assert_eq!(pos, text.len());
    }

    #[test]
    fn test_word_tokenizer_offsets() {
        let text = "I use Pyton to write ten so floor code";
        let tokens = WordTokenizer.tokenize(text);
        assert_eq!(
            texts(&tokens),
            vec!["I", "use", "Pyton", "to", "write", "ten", "so", "floor", "code"]
        );
        for token in &tokens {
            assert_eq!(&text[token.start..token.end], token.text);
        }
    }

    #[test]
    fn test_word_tokenizer_punctuation() {
        let tokens = WordTokenizer.tokenize("hello, world! it's vue-js");
        assert_eq!(texts(&tokens), vec!["hello", "world", "it's", "vue-js"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(CharTokenizer::mandarin().tokenize("").is_empty());
        assert!(WordTokenizer.tokenize("").is_empty());
    }
}
