//! Regular expression fragments and escaping.
//!
//! Every fragment is written for both separator conventions: POSIX paths use `/` only and
//! Windows paths accept `/` and `\`.

use const_format::formatcp;

const POSIX_SEPARATOR: &str = "/";
const POSIX_SEPARATOR_CLASS: &str = "/";
const WINDOWS_SEPARATOR: &str = "[\\\\/]";
const WINDOWS_SEPARATOR_CLASS: &str = "\\\\/";

macro_rules! sepexpr {
    ($fmt:expr, $separator:expr) => {
        formatcp!($fmt, $separator)
    };
}

macro_rules! glob_chars {
    ($separator:expr, $class:expr) => {
        GlobChars {
            dot_literal: "\\.",
            plus_literal: "\\+",
            slash_literal: $separator,
            slash_class: $class,
            one_char: "(?=.)",
            qmark: sepexpr!("[^{0}]", $class),
            dots_slash: sepexpr!("\\.{{1,2}}(?:{0}|$)", $separator),
            no_dot: "(?!\\.)",
            no_dot_slash: sepexpr!("(?!\\.{{0,1}}(?:{0}|$))", $separator),
            no_dots_slash: sepexpr!("(?!\\.{{1,2}}(?:{0}|$))", $separator),
            qmark_no_dot: sepexpr!("[^.{0}]", $class),
            star: sepexpr!("[^{0}]*?", $class),
            start_anchor: sepexpr!("(?:^|{0})", $separator),
        }
    };
}

/// Regular expression fragments for one separator convention.
#[derive(Clone, Copy, Debug)]
pub struct GlobChars {
    pub dot_literal: &'static str,
    pub plus_literal: &'static str,
    pub slash_literal: &'static str,
    /// Separators as they appear within a character class body.
    pub slash_class: &'static str,
    pub one_char: &'static str,
    pub qmark: &'static str,
    pub dots_slash: &'static str,
    pub no_dot: &'static str,
    pub no_dot_slash: &'static str,
    pub no_dots_slash: &'static str,
    pub qmark_no_dot: &'static str,
    pub star: &'static str,
    pub start_anchor: &'static str,
}

pub const POSIX_CHARS: GlobChars = glob_chars!(POSIX_SEPARATOR, POSIX_SEPARATOR_CLASS);
pub const WINDOWS_CHARS: GlobChars = glob_chars!(WINDOWS_SEPARATOR, WINDOWS_SEPARATOR_CLASS);

impl GlobChars {
    pub fn for_platform(windows: bool) -> &'static GlobChars {
        if windows {
            &WINDOWS_CHARS
        }
        else {
            &POSIX_CHARS
        }
    }

    /// Gets the expression for any run of characters that never begins a `.` or `..` segment.
    pub fn globstar(&self, dot: bool, capture: bool) -> String {
        format!(
            "({}(?:(?!{}{}).)*?)",
            if capture { "" } else { "?:" },
            self.start_anchor,
            if dot { self.dots_slash } else { self.dot_literal },
        )
    }
}

/// Gets the body of a bracket class for a POSIX class name such as `alpha`.
pub fn posix_class(name: &str) -> Option<&'static str> {
    Some(match name {
        "alnum" => "a-zA-Z0-9",
        "alpha" => "a-zA-Z",
        "ascii" => "\\x00-\\x7F",
        "blank" => " \\t",
        "cntrl" => "\\x00-\\x1F\\x7F",
        "digit" => "0-9",
        "graph" => "\\x21-\\x7E",
        "lower" => "a-z",
        "print" => "\\x20-\\x7E",
        "punct" => "!-/:-@\\[-`{-~",
        "space" => " \\t\\r\\n\\x0B\\f",
        "upper" => "A-Z",
        "word" => "A-Za-z0-9_",
        "xdigit" => "A-Fa-f0-9",
        _ => return None,
    })
}

/// Characters that carry meaning outside of a character class.
pub fn is_meta(c: char) -> bool {
    matches!(
        c,
        '\\' | '.' | '+' | '*' | '?' | '(' | ')' | '|' | '[' | ']' | '{' | '}' | '^' | '$'
    )
}

/// Characters that carry meaning within a character class.
pub fn is_class_meta(c: char) -> bool {
    matches!(c, '\\' | '[' | ']' | '^' | '-' | '&' | '~')
}

/// Characters after `\` that the host engines interpret as classes, assertions or control
/// characters rather than literals.
pub fn is_regex_escape(c: char) -> bool {
    matches!(
        c,
        'b' | 'B' | 'd' | 'D' | 'w' | 'W' | 's' | 'S' | 'n' | 'r' | 't' | 'f' | '1'..='9'
    )
}

pub fn push_escaped(output: &mut String, c: char) {
    if is_meta(c) {
        output.push('\\');
    }
    output.push(c);
}

pub fn push_class_escaped(output: &mut String, c: char) {
    if is_class_meta(c) {
        output.push('\\');
    }
    output.push(c);
}

pub fn escape(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    for c in text.chars() {
        push_escaped(&mut output, c);
    }
    output
}

/// Returns `true` if the text contains characters with regex meaning, including `-`.
pub fn has_regex_chars(text: &str) -> bool {
    text.chars().any(|c| c == '-' || is_meta(c))
}

/// Resolves Windows separators in a pattern: `\` is a separator unless it escapes a glob
/// metacharacter.
pub fn normalize_windows_pattern(expression: &str) -> String {
    let mut output = String::with_capacity(expression.len());
    let mut chars = expression.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            output.push(c);
            continue;
        }
        match chars.peek().copied() {
            Some(next) if is_glob_meta(next) => {
                output.push('\\');
                output.push(next);
                chars.next();
            },
            _ => output.push('/'),
        }
    }
    output
}

pub fn to_posix_slashes(path: &str) -> String {
    path.replace('\\', "/")
}

/// Characters that a Windows `\\` escapes rather than separates.
pub fn is_glob_meta(c: char) -> bool {
    matches!(
        c,
        '*' | '?' | '[' | ']' | '{' | '}' | '(' | ')' | '!' | '@' | '+' | '|' | ',' | '^' | '$'
            | '"'
    )
}
