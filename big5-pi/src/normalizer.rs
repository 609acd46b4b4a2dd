//! Text normalization
//!
//! Turns a raw comment into a canonical lowercase ASCII token stream:
//! lowercase, strip URLs / mentions / hashtags / digit runs, drop non-ASCII,
//! punctuation to spaces, collapse whitespace, trim.
//!
//! A single cleanup pass is not idempotent on its own (dropping a digit or a
//! non-ASCII character can splice together a new `http...` token), so the pass
//! is repeated until the text stops changing. After the first pass every
//! further pass can only delete characters, which bounds the loop.

use once_cell::sync::Lazy;
use regex::Regex;

static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"http\S+|www\S+|https\S+").expect("valid URL pattern"));
static MENTION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"@\w+").expect("valid mention pattern"));
static HASHTAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"#\w+").expect("valid hashtag pattern"));
static DIGITS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("valid digit pattern"));
static PUNCT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[[:punct:]]").expect("valid punctuation pattern"));
static WHITESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// Normalize a raw comment. Total and idempotent.
pub fn normalize(raw: &str) -> String {
    let mut current = cleanup_pass(raw);
    loop {
        let next = cleanup_pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn cleanup_pass(text: &str) -> String {
    let text = text.to_lowercase();
    let text = URL_RE.replace_all(&text, "");
    let text = MENTION_RE.replace_all(&text, "");
    let text = HASHTAG_RE.replace_all(&text, "");
    let text = DIGITS_RE.replace_all(&text, "");
    let text: String = text.chars().filter(char::is_ascii).collect();
    let text = PUNCT_RE.replace_all(&text, " ");
    let text = WHITESPACE_RE.replace_all(&text, " ");
    text.trim().to_string()
}
