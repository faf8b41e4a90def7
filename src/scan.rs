//! Structural classification of glob expressions.
//!
//! Scanning is a single linear pass that finds the first glob-significant construct and splits an
//! expression into a literal base path and a glob. It never resolves groups beyond finding the
//! closing delimiter of the first construct that it opens.

use std::borrow::Cow;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::encode;
use crate::options::Options;

/// The classification of a glob expression.
///
/// Flags such as `is_brace` describe the **first** glob construct of the expression unless
/// [`Options::scan_to_end`] is set. For example, `*.{js,ts}` is not classified as a brace
/// expression, because a `*` precedes the braces.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(rename_all = "camelCase"))]
pub struct ScanResult<'t> {
    /// The scanned expression.
    pub input: &'t str,
    /// Leading negation and `./` text that is not part of the base path.
    pub prefix: &'t str,
    /// The longest literal path prefix, never ending mid-segment.
    pub base: Cow<'t, str>,
    /// The remainder of the expression following `base`.
    pub glob: Cow<'t, str>,
    /// Byte offset of the first glob-significant character, or the input length if there is
    /// none.
    pub start: usize,
    pub is_glob: bool,
    pub is_brace: bool,
    pub is_bracket: bool,
    pub is_extglob: bool,
    pub is_globstar: bool,
    pub negated: bool,
    pub negated_extglob: bool,
    /// Path segments following the prefix, if requested via [`Options::parts`].
    pub parts: Option<Vec<Cow<'t, str>>>,
}

#[derive(Clone, Copy, Debug, Default)]
struct Flags {
    is_glob: bool,
    is_brace: bool,
    is_bracket: bool,
    is_extglob: bool,
    is_globstar: bool,
}

struct Scanner<'t, 'o> {
    bytes: &'t [u8],
    options: &'o Options,
    index: usize,
    flags: Flags,
    first: Option<usize>,
    has_backslashes: bool,
}

impl<'t, 'o> Scanner<'t, 'o> {
    fn is_separator_at(&self, index: usize) -> bool {
        match self.bytes.get(index) {
            Some(b'/') => true,
            Some(b'\\') => self.options.windows && !self.is_escape_at(index),
            _ => false,
        }
    }

    // In Windows mode a backslash only escapes glob metacharacters; otherwise it separates.
    fn is_escape_at(&self, index: usize) -> bool {
        if !self.options.windows {
            return true;
        }
        self.bytes
            .get(index + 1)
            .is_some_and(|next| encode::is_glob_meta(char::from(*next)))
    }

    fn mark(&mut self, index: usize) {
        self.first.get_or_insert(index);
        self.flags.is_glob = true;
    }

    fn is_first(&self) -> bool {
        self.first.is_none()
    }

    // Finds the closing brace of the group opened at `open` and whether the group has a comma or
    // `..` at any depth.
    fn close_brace(&mut self, open: usize) -> (Option<usize>, bool) {
        let mut depth = 0usize;
        let mut is_valid = false;
        let mut index = open;
        while index < self.bytes.len() {
            match self.bytes[index] {
                b'\\' => {
                    self.has_backslashes = true;
                    index += 1;
                },
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        return (Some(index), is_valid);
                    }
                },
                b',' => is_valid = true,
                b'.' if self.bytes.get(index + 1) == Some(&b'.') => {
                    is_valid = true;
                    index += 1;
                },
                _ => {},
            }
            index += 1;
        }
        (None, is_valid)
    }

    // Finds the closing bracket of the class opened at `open`. A `]` immediately following `[`,
    // `[!`, or `[^` is part of the class.
    fn close_bracket(&mut self, open: usize) -> Option<usize> {
        let mut index = open + 1;
        if matches!(self.bytes.get(index), Some(b'!' | b'^')) {
            index += 1;
        }
        if self.bytes.get(index) == Some(&b']') {
            index += 1;
        }
        while index < self.bytes.len() {
            match self.bytes[index] {
                b'\\' => {
                    self.has_backslashes = true;
                    index += 1;
                },
                b']' => return Some(index),
                _ => {},
            }
            index += 1;
        }
        None
    }

    fn close_paren(&mut self, open: usize) -> Option<usize> {
        let mut depth = 0usize;
        let mut index = open;
        while index < self.bytes.len() {
            match self.bytes[index] {
                b'\\' => {
                    self.has_backslashes = true;
                    index += 1;
                },
                b'(' => depth += 1,
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(index);
                    }
                },
                _ => {},
            }
            index += 1;
        }
        None
    }

    fn is_segment_start(&self, index: usize, start: usize) -> bool {
        index == start || self.is_separator_at(index - 1)
    }

    fn is_segment_end(&self, index: usize) -> bool {
        index >= self.bytes.len() || self.is_separator_at(index)
    }
}

/// Scans a glob expression.
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
pub fn scan<'t>(input: &'t str, options: &Options) -> ScanResult<'t> {
    let mut scanner = Scanner {
        bytes: input.as_bytes(),
        options,
        index: 0,
        flags: Flags::default(),
        first: None,
        has_backslashes: false,
    };
    let mut start = 0usize;
    // Byte offset following the last separator that precedes the first glob construct.
    let mut last_separator = 0usize;
    let mut negated = false;
    let mut negated_extglob = false;

    while scanner.index < scanner.bytes.len() {
        if !options.scan_to_end && !scanner.is_first() {
            break;
        }
        let index = scanner.index;
        let byte = scanner.bytes[index];
        scanner.index += 1;

        if byte == b'\\' && scanner.is_escape_at(index) {
            scanner.has_backslashes = true;
            scanner.index += 1;
            continue;
        }
        if scanner.is_separator_at(index) {
            if scanner.is_first() {
                if index == start + 1 && scanner.bytes[start] == b'.' {
                    start += 2;
                }
                else {
                    last_separator = index + 1;
                }
            }
            continue;
        }
        let next = scanner.bytes.get(index + 1).copied();
        if !options.no_extglob
            && matches!(byte, b'!' | b'@' | b'*' | b'+' | b'?')
            && next == Some(b'(')
        {
            if byte == b'!' && index == start {
                negated_extglob = true;
            }
            scanner.flags.is_extglob = true;
            scanner.mark(index);
            if let Some(close) = scanner.close_paren(index + 1) {
                scanner.index = close + 1;
            }
            continue;
        }
        match byte {
            b'*' => {
                let is_first = scanner.is_first();
                let is_standalone = next == Some(b'*')
                    && scanner.is_segment_start(index, start)
                    && scanner.is_segment_end(index + 2);
                if is_standalone && (is_first || options.scan_to_end) {
                    scanner.flags.is_globstar = true;
                }
                scanner.mark(index);
                while scanner.bytes.get(scanner.index) == Some(&b'*') {
                    scanner.index += 1;
                }
            },
            b'?' => scanner.mark(index),
            b'[' if !options.no_bracket => {
                if let Some(close) = scanner.close_bracket(index) {
                    if scanner.is_first() || options.scan_to_end {
                        scanner.flags.is_bracket = true;
                    }
                    scanner.mark(index);
                    scanner.index = close + 1;
                }
            },
            b'{' if !options.no_brace => {
                let (close, is_valid) = scanner.close_brace(index);
                if is_valid {
                    if scanner.is_first() || options.scan_to_end {
                        scanner.flags.is_brace = true;
                    }
                    scanner.mark(index);
                }
                if let Some(close) = close {
                    scanner.index = close + 1;
                }
            },
            b'!' if !options.no_negate && index == start && scanner.is_first() => {
                negated = true;
                start += 1;
            },
            _ => {},
        }
    }

    let rest = &input[start..];
    let prefix = &input[..start];
    let (base, glob): (&str, &str) = if scanner.flags.is_glob {
        let split = last_separator.saturating_sub(start);
        if split > 0 {
            (&rest[..split], &rest[split..])
        }
        else {
            ("", rest)
        }
    }
    else {
        (rest, "")
    };
    let base = if !base.is_empty() && base != "/" && base.len() != rest.len() {
        match base.as_bytes()[base.len() - 1] {
            b'/' => &base[..base.len() - 1],
            b'\\' if options.windows => &base[..base.len() - 1],
            _ => base,
        }
    }
    else {
        base
    };
    let (base, glob) = if options.unescape && scanner.has_backslashes {
        (remove_backslashes(base), remove_backslashes(glob))
    }
    else {
        (Cow::Borrowed(base), Cow::Borrowed(glob))
    };
    let parts = options.parts.then(|| split_parts(rest, options));

    ScanResult {
        input,
        prefix,
        base,
        glob,
        start: scanner.first.unwrap_or(input.len()),
        is_glob: scanner.flags.is_glob,
        is_brace: scanner.flags.is_brace,
        is_bracket: scanner.flags.is_bracket,
        is_extglob: scanner.flags.is_extglob,
        is_globstar: scanner.flags.is_globstar,
        negated,
        negated_extglob,
        parts,
    }
}

fn remove_backslashes(text: &str) -> Cow<'_, str> {
    if !text.contains('\\') {
        return Cow::Borrowed(text);
    }
    let mut output = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                output.push(next);
            }
        }
        else {
            output.push(c);
        }
    }
    Cow::Owned(output)
}

// Splits text into segments at unescaped separators, discarding a leading empty segment from a
// rooted path and a trailing empty segment from a terminating separator.
fn split_parts<'t>(text: &'t str, options: &Options) -> Vec<Cow<'t, str>> {
    let bytes = text.as_bytes();
    let mut parts = Vec::new();
    let mut from = 0usize;
    let mut index = 0usize;
    while index < bytes.len() {
        let byte = bytes[index];
        let is_escape = byte == b'\\'
            && (!options.windows
                || bytes
                    .get(index + 1)
                    .is_some_and(|next| encode::is_glob_meta(char::from(*next))));
        if is_escape {
            index += 2;
            continue;
        }
        if byte == b'/' || (byte == b'\\' && options.windows) {
            parts.push(Cow::Borrowed(&text[from..index]));
            from = index + 1;
        }
        index += 1;
    }
    parts.push(Cow::Borrowed(&text[from.min(text.len())..]));
    if parts.len() > 1 && parts.first().map_or(false, |part| part.is_empty()) {
        parts.remove(0);
    }
    if parts.len() > 1 && parts.last().map_or(false, |part| part.is_empty()) {
        parts.pop();
    }
    parts
}
