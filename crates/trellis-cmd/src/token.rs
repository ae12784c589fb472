//! Tokenizer and token stream.
//!
//! A statement is split on runs of spaces and tabs into words, then each
//! word is classified: words beginning with `-` are flags, a flag
//! immediately followed by a non-flag word collapses into a key/value pair,
//! and everything else is a positional token. A word of the form `$name` is
//! replaced by the decimal value of `name` from the identifier table before
//! classification.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::fmt;

/// One word of a statement.
///
/// Equality compares the underlying string; [`Token::as_i64`] gives typed
/// access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse as a signed 64-bit integer.
    ///
    /// Supports an optional leading `-` and an optional `0x` hex prefix.
    /// Any trailing non-numeric character is a hard parse failure.
    pub fn as_i64(&self) -> Option<i64> {
        let (neg, rest) = match self.0.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, self.0.as_str()),
        };
        let (radix, digits) = match rest.strip_prefix("0x") {
            Some(digits) => (16, digits),
            None => (10, rest),
        };
        if digits.is_empty() {
            return None;
        }
        let magnitude = u64::from_str_radix(digits, radix).ok()?;
        if neg {
            Some((magnitude as i64).wrapping_neg())
        } else {
            Some(magnitude as i64)
        }
    }

    /// Parse as an unsigned 64-bit integer. A leading `-` fails.
    pub fn as_u64(&self) -> Option<u64> {
        if self.0.starts_with('-') {
            return None;
        }
        let digits = self.0.strip_prefix("0x");
        match digits {
            Some(digits) if !digits.is_empty() => u64::from_str_radix(digits, 16).ok(),
            Some(_) => None,
            None => self.0.parse().ok(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for Token {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Token {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl From<&str> for Token {
    fn from(text: &str) -> Self {
        Self(text.to_string())
    }
}

/// Structured views over a tokenized statement.
///
/// Four parallel views are built while words are consumed: the full `raw`
/// sequence as typed, the `positional` tokens, the boolean `flags`, and the
/// `-name value` `pairs`. `raw` and `positional` stay aligned at the front:
/// popping a positional token also removes its entry from `raw`.
#[derive(Debug, Clone, Default)]
pub struct TokenStream {
    raw: VecDeque<Token>,
    positional: VecDeque<Token>,
    flags: BTreeSet<String>,
    pairs: BTreeMap<String, Token>,
    stage: Option<String>,
}

impl TokenStream {
    /// Consume one word. An empty word flushes any staged flag.
    fn push(&mut self, word: String) {
        if word.is_empty() {
            if let Some(name) = self.stage.take() {
                self.flags.insert(name);
            }
            return;
        }
        self.raw.push_back(Token::new(word.clone()));
        if word.starts_with('-') {
            // the previously staged flag never got a value
            if let Some(prev) = self.stage.replace(word) {
                self.flags.insert(prev);
            }
        } else if let Some(name) = self.stage.take() {
            self.pairs.insert(name, Token::new(word));
        } else {
            self.positional.push_back(Token::new(word));
        }
    }

    /// Number of positional tokens remaining.
    pub fn len(&self) -> usize {
        self.positional.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty()
    }

    /// Front positional token, if any.
    pub fn front(&self) -> Option<&Token> {
        self.positional.front()
    }

    /// Pop the front positional token, consuming its entry from `raw` as
    /// well so the two views stay aligned at the front.
    ///
    /// Any flag words (and their pair values) sitting ahead of the
    /// positional in `raw` are consumed with it; they remain visible
    /// through the `flags`/`pairs` views.
    pub fn pop(&mut self) -> Option<Token> {
        let token = self.positional.pop_front()?;
        while self
            .raw
            .front()
            .is_some_and(|front| front.as_str().starts_with('-'))
        {
            if let Some(key) = self.raw.pop_front()
                && self.pairs.contains_key(key.as_str())
            {
                let _ = self.raw.pop_front();
            }
        }
        // the remaining front is the positional itself
        let _ = self.raw.pop_front();
        Some(token)
    }

    /// Pop the front positional token as text.
    pub fn pop_str(&mut self) -> Option<String> {
        self.pop().map(|t| t.0)
    }

    /// Pop the front positional token as a signed integer. The token is
    /// left in place if it does not parse.
    pub fn pop_i64(&mut self) -> Option<i64> {
        let value = self.front()?.as_i64()?;
        self.pop();
        Some(value)
    }

    /// Whether `-name` was given with no value.
    pub fn has_flag(&self, name: &str) -> bool {
        self.flags.contains(name)
    }

    /// The value paired with `-name`, if any.
    pub fn pair(&self, name: &str) -> Option<&Token> {
        self.pairs.get(name)
    }

    /// Whether any remaining positional token equals `word`.
    pub fn contains(&self, word: &str) -> bool {
        self.positional.iter().any(|t| t == word)
    }

    pub fn positional(&self) -> &VecDeque<Token> {
        &self.positional
    }

    pub fn flags(&self) -> &BTreeSet<String> {
        &self.flags
    }

    pub fn pairs(&self) -> &BTreeMap<String, Token> {
        &self.pairs
    }

    /// Full ordered word sequence as typed, minus entries consumed by
    /// popping.
    pub fn raw(&self) -> &VecDeque<Token> {
        &self.raw
    }
}

/// Tokenize `input` into a [`TokenStream`].
///
/// Words of the form `$name` found in `idents` are replaced by the decimal
/// form of the stored value before classification; unknown names pass
/// through unchanged.
pub fn tokenize(input: &str, idents: &HashMap<String, u64>) -> TokenStream {
    let mut stream = TokenStream::default();
    for word in input.split([' ', '\t']) {
        if word.is_empty() {
            continue;
        }
        let word = match word.strip_prefix('$') {
            Some(name) => match idents.get(name) {
                Some(value) => value.to_string(),
                None => word.to_string(),
            },
            None => word.to_string(),
        };
        stream.push(word);
    }
    // trailing flush commits a staged flag that never saw a value
    stream.push(String::new());
    stream
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_idents() -> HashMap<String, u64> {
        HashMap::new()
    }

    #[test]
    fn flags_pairs_and_positionals() {
        let stream = tokenize("-v foo bar -x", &no_idents());
        assert!(stream.has_flag("-x"));
        assert!(!stream.has_flag("-v"));
        assert_eq!(stream.pair("-v"), Some(&Token::from("foo")));
        assert_eq!(stream.len(), 1);
        assert_eq!(stream.front(), Some(&Token::from("bar")));
    }

    #[test]
    fn empty_input_has_no_positionals() {
        let stream = tokenize("", &no_idents());
        assert!(stream.is_empty());
        assert!(stream.raw().is_empty());
    }

    #[test]
    fn whitespace_runs_are_collapsed() {
        let stream = tokenize("  alpha \t beta\t\tgamma  ", &no_idents());
        let words: Vec<&str> = stream.positional().iter().map(Token::as_str).collect();
        assert_eq!(words, vec!["alpha", "beta", "gamma"]);
        assert_eq!(stream.raw().len(), 3);
    }

    #[test]
    fn adjacent_flags_both_commit() {
        let stream = tokenize("-a -b value", &no_idents());
        assert!(stream.has_flag("-a"));
        assert_eq!(stream.pair("-b"), Some(&Token::from("value")));
        assert!(stream.is_empty());
    }

    #[test]
    fn trailing_flag_commits_on_flush() {
        let stream = tokenize("stop -force", &no_idents());
        assert!(stream.has_flag("-force"));
        assert_eq!(stream.len(), 1);
    }

    #[test]
    fn raw_preserves_order_and_length() {
        let stream = tokenize("-v foo bar -x", &no_idents());
        let raw: Vec<&str> = stream.raw().iter().map(Token::as_str).collect();
        assert_eq!(raw, vec!["-v", "foo", "bar", "-x"]);
        assert!(stream.raw().len() >= stream.len() + stream.pairs().len());
    }

    #[test]
    fn pop_keeps_raw_aligned() {
        let mut stream = tokenize("start web now", &no_idents());
        assert_eq!(stream.pop(), Some(Token::from("start")));
        assert_eq!(stream.raw().front(), Some(&Token::from("web")));
        assert_eq!(stream.front(), Some(&Token::from("web")));
    }

    #[test]
    fn pop_consumes_leading_pair_words_in_raw() {
        let mut stream = tokenize("-v quiet stop", &no_idents());
        assert_eq!(stream.pop(), Some(Token::from("stop")));
        // the leading pair words are consumed along with the positional
        assert!(stream.raw().is_empty());
        assert_eq!(stream.pair("-v"), Some(&Token::from("quiet")));
    }

    #[test]
    fn pop_removes_the_positional_not_an_equal_pair_value() {
        // pair value and positional are textually equal; popping must
        // consume by position, leaving the trailing flag in raw
        let mut stream = tokenize("-name stop stop -force", &no_idents());
        assert_eq!(stream.pop(), Some(Token::from("stop")));
        let raw: Vec<&str> = stream.raw().iter().map(Token::as_str).collect();
        assert_eq!(raw, vec!["-force"]);
        assert_eq!(stream.pair("-name"), Some(&Token::from("stop")));
        assert!(stream.is_empty());
    }

    #[test]
    fn identifier_substitution() {
        let mut idents = HashMap::new();
        idents.insert("foo".to_string(), 42u64);
        let stream = tokenize("$foo", &idents);
        assert_eq!(stream.front(), Some(&Token::from("42")));
    }

    #[test]
    fn unknown_identifier_passes_through() {
        let stream = tokenize("$missing", &no_idents());
        assert_eq!(stream.front(), Some(&Token::from("$missing")));
    }

    #[test]
    fn substitution_happens_before_classification() {
        let mut idents = HashMap::new();
        idents.insert("port".to_string(), 8080u64);
        let stream = tokenize("-p $port", &idents);
        assert_eq!(stream.pair("-p"), Some(&Token::from("8080")));
    }

    #[test]
    fn token_parses_signed_decimal() {
        assert_eq!(Token::from("-5").as_i64(), Some(-5));
        assert_eq!(Token::from("17").as_i64(), Some(17));
    }

    #[test]
    fn token_parses_hex() {
        assert_eq!(Token::from("0x1F").as_i64(), Some(31));
        assert_eq!(Token::from("-0x10").as_i64(), Some(-16));
        assert_eq!(Token::from("0x1f").as_u64(), Some(31));
    }

    #[test]
    fn token_rejects_trailing_garbage() {
        assert_eq!(Token::from("12abc").as_i64(), None);
        assert_eq!(Token::from("0x").as_i64(), None);
        assert_eq!(Token::from("12 ").as_i64(), None);
        assert_eq!(Token::from("-").as_i64(), None);
        assert_eq!(Token::from("word").as_i64(), None);
    }

    #[test]
    fn u64_rejects_negative() {
        assert_eq!(Token::from("-5").as_u64(), None);
    }

    #[test]
    fn token_equality_is_textual() {
        assert_eq!(Token::from("42"), Token::new("42"));
        assert_eq!(Token::from("42"), *"42");
        assert_ne!(Token::from("42"), Token::from("0x2A"));
    }

    #[test]
    fn pop_i64_leaves_unparseable_token() {
        let mut stream = tokenize("nope 7", &no_idents());
        assert_eq!(stream.pop_i64(), None);
        assert_eq!(stream.len(), 2);
        stream.pop();
        assert_eq!(stream.pop_i64(), Some(7));
        assert!(stream.is_empty());
    }
}
