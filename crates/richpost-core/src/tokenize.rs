//! Splits plain text into literal and URL runs and finds user mentions.

use once_cell::sync::Lazy;
use regex::Regex;

/// Absolute `http`/`https` URL as written in posts. The word boundary after
/// the top-level domain is the ASCII one.
pub const URL_PATTERN: &str = r"https?://(?:www\.)?[-a-zA-Z0-9@:%._+~#=]{1,256}\.[a-zA-Z0-9()]{1,6}(?-u:\b)[-a-zA-Z0-9()@:%_+.~#?&/=]*";

static URL_SCAN: Lazy<Regex> = Lazy::new(|| compile(URL_PATTERN));
static URL_EXACT: Lazy<Regex> = Lazy::new(|| compile(&format!("^(?:{})$", URL_PATTERN)));
static MENTION: Lazy<Regex> = Lazy::new(|| compile(r"(?:@|/u/)[-a-zA-Z0-9_а-яА-Я]+"));

/// Compiles a built-in pattern. These are constants, so failing is a bug.
pub(crate) fn compile(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(regex) => regex,
        Err(err) => panic!("built-in pattern {:?} is invalid: {}", pattern, err),
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Token<'a> {
    Text(&'a str),
    Url(&'a str),
}

impl<'a> Token<'a> {
    pub fn as_str(&self) -> &'a str {
        match self {
            Token::Text(text) | Token::Url(text) => text,
        }
    }
}

/// Tokenizes a text run.
///
/// Tokens alternate text/URL, always start and end with a (possibly empty)
/// text token, and concatenate back to `text`.
pub fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut last = 0;
    for found in URL_SCAN.find_iter(text) {
        tokens.push(Token::Text(&text[last..found.start()]));
        tokens.push(Token::Url(found.as_str()));
        last = found.end();
    }
    tokens.push(Token::Text(&text[last..]));
    tokens
}

/// True when `candidate` is entirely one URL.
pub fn is_url(candidate: &str) -> bool {
    URL_EXACT.is_match(candidate)
}

/// Collects `@name` and `/u/name` mentions, prefix included.
///
/// A mention must not directly follow an ASCII word character, so e-mail
/// addresses do not count.
pub fn mentions(text: &str) -> Vec<String> {
    MENTION
        .find_iter(text)
        .filter(|found| {
            !text[..found.start()]
                .bytes()
                .next_back()
                .is_some_and(is_ascii_word)
        })
        .map(|found| found.as_str().to_string())
        .collect()
}

fn is_ascii_word(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}
