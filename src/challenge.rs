//! `WWW-Authenticate` challenge parsing (RFC 7235 §4.1)
//!
//! A single header value may carry several challenges, and parameter values
//! may be quoted strings containing commas, `=` and escaped quotes, so the
//! value is walked with a small state machine rather than split on commas:
//!
//! ```text
//! Scheme ──token──> Key ──token "="──> Value ──token──────────> Key
//!   ^                │                   └──'"'──> QuotedValue ──> Key
//!   └──"," + token───┘   (a token after "," that is not followed by "="
//!                         starts a new challenge)
//! ```
//!
//! Token68 credentials (`Basic dXNlcjpwYXNz==`) are skipped.

use std::collections::HashMap;

use reqwest::header::{HeaderMap, WWW_AUTHENTICATE};

/// Name of the RFC 9728 challenge parameter carrying the metadata URL.
pub const RESOURCE_METADATA_PARAM: &str = "resource_metadata";

/// One authentication challenge: a scheme and its parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Challenge {
    /// Authentication scheme as written in the header (e.g. `Bearer`).
    pub scheme: String,
    /// Parameters keyed by lowercased name; the first occurrence wins.
    pub params: HashMap<String, String>,
}

impl Challenge {
    fn new(scheme: &str) -> Self {
        Self {
            scheme: scheme.to_string(),
            params: HashMap::new(),
        }
    }

    /// Returns true if this challenge uses `scheme` (case-insensitive).
    pub fn is_scheme(&self, scheme: &str) -> bool {
        self.scheme.eq_ignore_ascii_case(scheme)
    }

    /// Looks up a parameter by name (case-insensitive).
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

#[derive(Debug)]
enum State {
    Scheme,
    Key,
    Value(String),
    QuotedValue(String),
}

struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(' ' | '\t')) {
            self.bump();
        }
    }

    fn skip_separators(&mut self) {
        while matches!(self.peek(), Some(' ' | '\t' | ',')) {
            self.bump();
        }
    }

    fn token(&mut self) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(is_tchar) {
            self.bump();
        }
        &self.input[start..self.pos]
    }

    /// Skips a token68 credential or any other unparseable run up to the
    /// next comma.
    fn skip_to_comma(&mut self) {
        while self.peek().is_some_and(|c| c != ',') {
            self.bump();
        }
    }

    /// True if the input at the cursor is `token BWS "=" BWS` followed by
    /// the start of a value. A token followed by `=`, `,` or the end after
    /// the equals sign is token68 padding, not a parameter.
    fn at_param(&self) -> bool {
        let mut probe = Cursor {
            input: self.input,
            pos: self.pos,
        };
        if probe.token().is_empty() {
            return false;
        }
        probe.skip_whitespace();
        if probe.bump() != Some('=') {
            return false;
        }
        probe.skip_whitespace();
        !matches!(probe.peek(), None | Some('=' | ','))
    }
}

/// RFC 7230 `tchar`.
fn is_tchar(c: char) -> bool {
    c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(c)
}

/// Parses one `WWW-Authenticate` header value into its challenges.
///
/// Parsing is lenient: malformed segments are skipped rather than rejected,
/// since a resource server's header is untrusted input and discovery only
/// needs the parameters it can read.
///
/// # Examples
///
/// ```
/// use prm_discovery::challenge::parse_www_authenticate;
///
/// let challenges = parse_www_authenticate(
///     r#"Basic realm="a, b", Bearer resource_metadata="https://rs.example.com/prm""#,
/// );
/// assert_eq!(challenges.len(), 2);
/// assert_eq!(challenges[0].param("realm"), Some("a, b"));
/// assert!(challenges[1].is_scheme("bearer"));
/// ```
pub fn parse_www_authenticate(value: &str) -> Vec<Challenge> {
    let mut cursor = Cursor {
        input: value,
        pos: 0,
    };
    let mut challenges = Vec::new();
    let mut current: Option<Challenge> = None;
    let mut state = State::Scheme;

    loop {
        state = match state {
            State::Scheme => {
                cursor.skip_separators();
                if cursor.peek().is_none() {
                    break;
                }
                let scheme = cursor.token();
                if scheme.is_empty() {
                    cursor.skip_to_comma();
                    State::Scheme
                } else {
                    if let Some(done) = current.replace(Challenge::new(scheme)) {
                        challenges.push(done);
                    }
                    State::Key
                }
            }
            State::Key => {
                cursor.skip_whitespace();
                match cursor.peek() {
                    None => break,
                    Some(',') => {
                        cursor.skip_separators();
                        if cursor.at_param() {
                            State::Key
                        } else {
                            State::Scheme
                        }
                    }
                    Some(_) if cursor.at_param() => {
                        let key = cursor.token().to_ascii_lowercase();
                        cursor.skip_whitespace();
                        cursor.bump();
                        cursor.skip_whitespace();
                        State::Value(key)
                    }
                    Some(_) => {
                        cursor.skip_to_comma();
                        State::Key
                    }
                }
            }
            State::Value(key) => {
                if cursor.peek() == Some('"') {
                    cursor.bump();
                    State::QuotedValue(key)
                } else {
                    let start = cursor.pos;
                    while cursor.peek().is_some_and(|c| c != ',' && c != ' ' && c != '\t') {
                        cursor.bump();
                    }
                    let value = &cursor.input[start..cursor.pos];
                    insert_param(&mut current, key, value.to_string());
                    State::Key
                }
            }
            State::QuotedValue(key) => {
                let mut value = String::new();
                while let Some(ch) = cursor.bump() {
                    match ch {
                        '"' => break,
                        '\\' => {
                            if let Some(escaped) = cursor.bump() {
                                value.push(escaped);
                            }
                        }
                        other => value.push(other),
                    }
                }
                insert_param(&mut current, key, value);
                State::Key
            }
        };
    }

    if let Some(done) = current {
        challenges.push(done);
    }

    challenges
}

fn insert_param(current: &mut Option<Challenge>, key: String, value: String) {
    if let Some(challenge) = current.as_mut() {
        challenge.params.entry(key).or_insert(value);
    }
}

/// Extracts the `resource_metadata` URL from the first `Bearer` challenge
/// that carries one, scanning every `WWW-Authenticate` value in order.
///
/// Values that are not valid visible ASCII are skipped. Returns `None` when
/// the header is absent, empty, or offers no such challenge.
///
/// # Examples
///
/// ```
/// use prm_discovery::challenge::resource_metadata_url;
/// use reqwest::header::{HeaderMap, HeaderValue, WWW_AUTHENTICATE};
///
/// let mut headers = HeaderMap::new();
/// headers.insert(
///     WWW_AUTHENTICATE,
///     HeaderValue::from_static(r#"Bearer resource_metadata="https://rs.example.com/prm""#),
/// );
/// assert_eq!(
///     resource_metadata_url(&headers).as_deref(),
///     Some("https://rs.example.com/prm")
/// );
/// assert!(resource_metadata_url(&HeaderMap::new()).is_none());
/// ```
pub fn resource_metadata_url(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(WWW_AUTHENTICATE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(parse_www_authenticate)
        .filter(|challenge| challenge.is_scheme("Bearer"))
        .find_map(|challenge| {
            challenge
                .param(RESOURCE_METADATA_PARAM)
                .map(str::to_string)
        })
}
