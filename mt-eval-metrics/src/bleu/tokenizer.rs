use mt_eval_core::EvalError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifiers accepted for the `tokenize` configuration value.
pub const TOKENIZERS: [&str; 5] = ["none", "13a", "intl", "char", "zh"];

/// Preprocessing applied to hypothesis and reference strings before
/// n-gram extraction.
///
/// `None` is the default: batch inputs arrive pre-tokenized from the
/// evaluation pipeline, so the scorer splits on whitespace as-is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tokenizer {
    #[default]
    None,
    #[serde(rename = "13a")]
    Tok13a,
    Intl,
    Char,
    Zh,
}

impl Tokenizer {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tokenizer::None => "none",
            Tokenizer::Tok13a => "13a",
            Tokenizer::Intl => "intl",
            Tokenizer::Char => "char",
            Tokenizer::Zh => "zh",
        }
    }

    /// The full registry, in the order reported by configuration errors.
    pub fn all() -> &'static [&'static str] {
        &TOKENIZERS
    }

    pub fn tokenize(&self, line: &str) -> String {
        match self {
            Tokenizer::None => line.to_string(),
            Tokenizer::Tok13a => tokenize_13a(line),
            Tokenizer::Intl => tokenize_intl(line),
            Tokenizer::Char => tokenize_char(line),
            Tokenizer::Zh => tokenize_zh(line),
        }
    }
}

impl FromStr for Tokenizer {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Tokenizer::None),
            "13a" => Ok(Tokenizer::Tok13a),
            "intl" => Ok(Tokenizer::Intl),
            "char" => Ok(Tokenizer::Char),
            "zh" => Ok(Tokenizer::Zh),
            other => Err(EvalError::configuration("tokenizer", other, &TOKENIZERS)),
        }
    }
}

impl fmt::Display for Tokenizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// mteval-v13a punctuation class: {-~ [-` space-& (-+ :-@ and the slash.
static RE_13A_PUNCT: Lazy<Regex> = Lazy::new(|| Regex::new(r"([\{-\~\[-` -\&\(-\+\:-\@/])").unwrap());
static RE_PERIOD_COMMA_BEFORE: Lazy<Regex> = Lazy::new(|| Regex::new(r"([^0-9])([\.,])").unwrap());
static RE_PERIOD_COMMA_AFTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"([\.,])([^0-9])").unwrap());
static RE_DASH_AFTER_DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"([0-9])(-)").unwrap());

static RE_INTL_PUNCT_BEFORE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\P{N})(\p{P})").unwrap());
static RE_INTL_PUNCT_AFTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\p{P})(\P{N})").unwrap());
static RE_INTL_SYMBOL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\p{S})").unwrap());

fn normalize_whitespace(line: &str) -> String {
    line.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Language-independent punctuation splitting shared by `13a` and `zh`.
fn tokenize_regex(line: &str) -> String {
    let line = RE_13A_PUNCT.replace_all(line, " $1 ");
    let line = RE_PERIOD_COMMA_BEFORE.replace_all(&line, "$1 $2 ");
    let line = RE_PERIOD_COMMA_AFTER.replace_all(&line, " $1 $2");
    let line = RE_DASH_AFTER_DIGIT.replace_all(&line, "$1 $2 ");
    normalize_whitespace(&line)
}

/// mteval-v13a compatible tokenization: normalizes skipped-segment markers
/// and XML entities, then splits punctuation out of words. Period and comma
/// stay attached inside numbers.
fn tokenize_13a(line: &str) -> String {
    let mut norm = line
        .replace("<skipped>", "")
        .replace("-\n", "")
        .replace('\n', " ");

    if norm.contains('&') {
        norm = norm
            .replace("&quot;", "\"")
            .replace("&amp;", "&")
            .replace("&lt;", "<")
            .replace("&gt;", ">");
    }

    tokenize_regex(&format!(" {} ", norm))
}

/// mteval-v14 international tokenization: splits on Unicode punctuation next
/// to non-digits and on Unicode symbols, leaving digit-internal punctuation
/// alone.
fn tokenize_intl(line: &str) -> String {
    let line = RE_INTL_PUNCT_BEFORE.replace_all(line, "$1 $2 ");
    let line = RE_INTL_PUNCT_AFTER.replace_all(&line, " $1 $2");
    let line = RE_INTL_SYMBOL.replace_all(&line, " $1 ");
    normalize_whitespace(&line)
}

/// Every character becomes its own token.
fn tokenize_char(line: &str) -> String {
    let mut out = String::with_capacity(line.len() * 2);
    for word in line.split_whitespace() {
        for ch in word.chars() {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push(ch);
        }
    }
    out
}

fn is_cjk_char(ch: char) -> bool {
    matches!(u32::from(ch),
        0x3400..=0x4DBF         // CJK extension A
        | 0x4E00..=0x9FFF       // CJK unified ideographs
        | 0xF900..=0xFAFF       // CJK compatibility ideographs
        | 0x3000..=0x303F       // CJK symbols and punctuation
        | 0xFF00..=0xFFEF       // halfwidth and fullwidth forms
        | 0x20000..=0x2A6DF     // CJK extension B
        | 0x2A700..=0x2EBEF     // CJK extensions C-F
        | 0x2F800..=0x2FA1F)    // CJK compatibility supplement
}

/// Chinese tokenization: each CJK codepoint becomes a token, then the
/// remaining (latin, digit, punctuation) spans go through the v13a
/// punctuation splitting.
fn tokenize_zh(line: &str) -> String {
    let mut spaced = String::with_capacity(line.len() * 2);
    for ch in line.trim().chars() {
        if is_cjk_char(ch) {
            spaced.push(' ');
            spaced.push(ch);
            spaced.push(' ');
        } else {
            spaced.push(ch);
        }
    }
    tokenize_regex(&spaced)
}
