//! Globsmith compiles shell-style glob expressions into regular expressions and matches paths
//! against them.
//!
//! Expressions support wildcards (`*`, `**`, and `?`), character classes (`[a-z]`, `[!a]`, and
//! POSIX classes like `[[:digit:]]`), brace alternatives and ranges (`{a,b}` and `{1..9}`),
//! extended globs (`!(...)`, `?(...)`, `+(...)`, `*(...)`, and `@(...)`), and leading negation
//! (`!`). The compiler is a pipeline: a [scanner][`scan`] classifies an expression, a
//! [parser][`parse`] emits regular expression source, an assembler anchors that source and hands
//! it to a regular expression engine, and a [`Matcher`] composes the results.
//!
//! # Examples
//!
//! ```rust
//! use globsmith::Options;
//!
//! let options = Options::default();
//! assert!(globsmith::is_match("src/lib/app.js", "src/**/*.js", &options).unwrap());
//! assert!(!globsmith::is_match("lib/app.js", "src/**/*.js", &options).unwrap());
//! ```
//!
//! Matchers are built once and evaluated many times.
//!
//! ```rust
//! use globsmith::Options;
//!
//! let is_source = globsmith::create_matcher(["*.rs", "!(*.md)"], &Options::default())
//!     .unwrap()
//!     .into_predicate();
//! assert!(is_source("main.rs"));
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

mod capture;
mod compile;
mod encode;
mod matcher;
mod options;
pub mod range;
mod scan;
mod token;

#[cfg(feature = "miette")]
use miette::{Diagnostic, LabeledSpan, SourceCode};
#[cfg(feature = "miette")]
use std::fmt::Display;
use std::fmt::{self, Formatter};
use thiserror::Error;

pub use crate::capture::MatchedText;
pub use crate::compile::{regex_source, CompiledPattern};
pub use crate::matcher::{MatchResult, Matcher};
pub use crate::options::{ExpandRangeFn, FormatFn, Options, ResultFn, MAX_LENGTH};
pub use crate::scan::ScanResult;
pub use crate::token::{ExtglobKind, ParseState, Token, TokenKind};

/// A group delimiter that is missing from a glob expression.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Delimiter {
    /// A closing delimiter has no matching opening delimiter.
    Opening(char),
    /// An opening delimiter is never closed.
    Closing(char),
}

impl Delimiter {
    pub fn as_char(&self) -> char {
        match *self {
            Delimiter::Opening(c) | Delimiter::Closing(c) => c,
        }
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            Delimiter::Opening(c) => write!(f, "opening `{}`", c),
            Delimiter::Closing(c) => write!(f, "closing `{}`", c),
        }
    }
}

/// Describes an unbalanced bracket, brace, or parenthesis in a glob expression.
///
/// Only emitted when [`Options::strict_brackets`] is set. Otherwise, unbalanced delimiters are
/// interpreted literally.
#[derive(Clone, Debug, Error)]
#[error("malformed glob expression: missing {delimiter}")]
pub struct GroupError {
    expression: String,
    delimiter: Delimiter,
    offset: usize,
}

impl GroupError {
    pub(crate) fn new(expression: String, delimiter: Delimiter, offset: usize) -> Self {
        GroupError {
            expression,
            delimiter,
            offset,
        }
    }

    /// Gets the glob expression that failed to parse.
    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn delimiter(&self) -> Delimiter {
        self.delimiter
    }

    /// Gets the byte offset in the expression where the missing delimiter was detected.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

#[cfg(feature = "miette")]
#[cfg_attr(docsrs, doc(cfg(feature = "miette")))]
impl Diagnostic for GroupError {
    fn code<'a>(&'a self) -> Option<Box<dyn 'a + Display>> {
        Some(Box::new(String::from("globsmith::pattern::group")))
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        Some(&self.expression)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan>>> {
        Some(Box::new(Some(LabeledSpan::at_offset(
            self.offset,
            format!("expected {}", self.delimiter),
        ))
        .into_iter()))
    }
}

#[derive(Debug, Error)]
#[non_exhaustive]
#[cfg_attr(feature = "miette", derive(Diagnostic))]
pub enum GlobError {
    /// No pattern was given or the pattern is empty.
    #[error("invalid glob expression: expected a non-empty pattern")]
    #[cfg_attr(feature = "miette", diagnostic(code(globsmith::pattern::empty)))]
    InvalidPattern,
    #[error("glob expression of {len} bytes exceeds maximum length of {max} bytes")]
    #[cfg_attr(feature = "miette", diagnostic(code(globsmith::pattern::length)))]
    PatternTooLong { len: usize, max: usize },
    #[error(transparent)]
    #[cfg_attr(feature = "miette", diagnostic(transparent))]
    MalformedGroup(GroupError),
    /// The assembled source was rejected by the regular expression engines.
    ///
    /// Only emitted when [`Options::debug`] is set.
    #[error("failed to compile regular expression `{expression}`: {error}")]
    #[cfg_attr(feature = "miette", diagnostic(code(globsmith::pattern::regex)))]
    InvalidRegexSource {
        expression: String,
        error: Box<fancy_regex::Error>,
    },
}

impl From<GroupError> for GlobError {
    fn from(error: GroupError) -> Self {
        GlobError::MalformedGroup(error)
    }
}

/// Types that can be interpreted as one or more glob expressions.
pub trait IntoPatterns {
    fn into_patterns(self) -> Vec<String>;
}

impl IntoPatterns for &'_ str {
    fn into_patterns(self) -> Vec<String> {
        vec![self.to_owned()]
    }
}

impl IntoPatterns for String {
    fn into_patterns(self) -> Vec<String> {
        vec![self]
    }
}

impl IntoPatterns for &'_ String {
    fn into_patterns(self) -> Vec<String> {
        vec![self.clone()]
    }
}

impl<T> IntoPatterns for Vec<T>
where
    T: AsRef<str>,
{
    fn into_patterns(self) -> Vec<String> {
        self.iter().map(|pattern| pattern.as_ref().to_owned()).collect()
    }
}

impl<T> IntoPatterns for &'_ [T]
where
    T: AsRef<str>,
{
    fn into_patterns(self) -> Vec<String> {
        self.iter().map(|pattern| pattern.as_ref().to_owned()).collect()
    }
}

impl<T, const N: usize> IntoPatterns for [T; N]
where
    T: AsRef<str>,
{
    fn into_patterns(self) -> Vec<String> {
        self.iter().map(|pattern| pattern.as_ref().to_owned()).collect()
    }
}

/// Classifies a glob expression and splits it into a literal base path and a glob.
///
/// # Examples
///
/// ```rust
/// use globsmith::Options;
///
/// let scan = globsmith::scan("foo/bar/*.js", &Options::default());
/// assert_eq!(scan.base, "foo/bar");
/// assert_eq!(scan.glob, "*.js");
/// assert!(scan.is_glob);
/// ```
pub fn scan<'t>(expression: &'t str, options: &Options) -> ScanResult<'t> {
    scan::scan(expression, options)
}

/// Parses a glob expression into regular expression source.
///
/// # Errors
///
/// Returns an error if the expression is empty or too long or if [`Options::strict_brackets`]
/// is set and a group is unbalanced.
pub fn parse(expression: &str, options: &Options) -> Result<ParseState, GlobError> {
    token::parse(expression, options)
}

/// Parses each of the given glob expressions.
///
/// # Errors
///
/// Returns an error if there are no expressions or if any expression fails to parse.
pub fn parse_all(
    patterns: impl IntoPatterns,
    options: &Options,
) -> Result<Vec<ParseState>, GlobError> {
    let patterns = patterns.into_patterns();
    if patterns.is_empty() {
        return Err(GlobError::InvalidPattern);
    }
    patterns
        .iter()
        .map(|expression| token::parse(expression, options))
        .collect()
}

/// Compiles a parsed glob expression.
///
/// # Errors
///
/// Returns an error if [`Options::debug`] is set and the regular expression engines reject the
/// assembled source.
pub fn compile_regex(state: &ParseState, options: &Options) -> Result<CompiledPattern, GlobError> {
    compile::compile(state, options)
}

/// Parses and compiles a glob expression.
///
/// # Examples
///
/// ```rust
/// use globsmith::Options;
///
/// let pattern = globsmith::make_regex("*.{js,ts}", &Options::default()).unwrap();
/// assert!(pattern.is_match("index.ts"));
/// assert!(!pattern.is_match(".eslintrc.js"));
/// ```
pub fn make_regex(expression: &str, options: &Options) -> Result<CompiledPattern, GlobError> {
    let state = token::parse(expression, options)?;
    compile::compile(&state, options)
}

/// Parses a glob expression and assembles its anchored regular expression source.
pub fn generate_regex_source(expression: &str, options: &Options) -> Result<String, GlobError> {
    token::parse(expression, options).map(|state| compile::regex_source(&state, options))
}

pub fn create_matcher(patterns: impl IntoPatterns, options: &Options) -> Result<Matcher, GlobError> {
    Matcher::new(patterns, options)
}

/// Returns `true` if any of the given glob expressions matches the input.
///
/// Prefer [`create_matcher`] when matching many inputs, as this function compiles its patterns
/// on every call.
pub fn is_match(
    input: &str,
    patterns: impl IntoPatterns,
    options: &Options,
) -> Result<bool, GlobError> {
    Matcher::new(patterns, options).map(|matcher| matcher.is_match(input))
}

/// Matches the final segment of the input against a glob expression without separators.
///
/// This is [`is_match`] with [`Options::base_name`] set.
pub fn match_base(input: &str, expression: &str, options: &Options) -> Result<bool, GlobError> {
    let options = Options {
        base_name: true,
        ..options.clone()
    };
    is_match(input, expression, &options)
}
