mod fast;
mod parse;

pub use crate::token::parse::parse;

/// The kind of an extended glob group, named for its opening operator.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ExtglobKind {
    /// `!(...)`
    Negate,
    /// `?(...)`
    ZeroOrOne,
    /// `+(...)`
    OneOrMore,
    /// `*(...)`
    ZeroOrMore,
    /// `@(...)`
    ExactlyOne,
}

impl ExtglobKind {
    pub(crate) fn open(&self) -> &'static str {
        match self {
            ExtglobKind::Negate => "(?:(?!(?:",
            _ => "(?:",
        }
    }

    pub(crate) fn close(&self, star: &str) -> String {
        match self {
            ExtglobKind::Negate => format!(")){})", star),
            ExtglobKind::ZeroOrOne => ")?".into(),
            ExtglobKind::OneOrMore => ")+".into(),
            ExtglobKind::ZeroOrMore => ")*".into(),
            ExtglobKind::ExactlyOne => ")".into(),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TokenKind {
    /// Beginning of the expression.
    Bos,
    Text,
    Slash,
    Dot,
    /// `..` within a brace range.
    Dots,
    Star,
    Globstar,
    Qmark,
    Plus,
    Bracket,
    Brace,
    Comma,
    Paren,
    /// The operator that opens an extended glob group.
    Extglob(ExtglobKind),
    /// An optional trailing separator.
    MaybeSlash,
}

/// A lexical unit of a parsed glob expression and the regular expression source it emits.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Token {
    pub(crate) kind: TokenKind,
    pub(crate) value: String,
    pub(crate) output: Option<String>,
    pub(crate) prev: Option<usize>,
    pub(crate) is_extglob: bool,
    pub(crate) is_star_run: bool,
    pub(crate) is_posix: bool,
}

impl Token {
    pub(crate) fn new(kind: TokenKind, value: impl Into<String>) -> Self {
        Token {
            kind,
            value: value.into(),
            output: None,
            prev: None,
            is_extglob: false,
            is_star_run: false,
            is_posix: false,
        }
    }

    pub(crate) fn with_output(kind: TokenKind, value: impl Into<String>, output: impl Into<String>) -> Self {
        Token {
            output: Some(output.into()),
            ..Token::new(kind, value)
        }
    }

    pub(crate) fn extglob(mut self) -> Self {
        self.is_extglob = true;
        self
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// Gets the expression text of the token.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Gets the regular expression source emitted for the token.
    pub fn output(&self) -> &str {
        self.output.as_deref().unwrap_or(&self.value)
    }
}

/// The result of parsing a glob expression.
///
/// A `ParseState` holds the regular expression source for the expression (without anchors) and
/// structural metadata. It can be assembled into a [`CompiledPattern`] any number of times.
///
/// [`CompiledPattern`]: crate::CompiledPattern
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParseState {
    pub(crate) input: String,
    pub(crate) output: String,
    pub(crate) prefix: &'static str,
    pub(crate) negated: bool,
    pub(crate) negated_extglob: bool,
    pub(crate) globstar: bool,
    pub(crate) fast_path: bool,
    pub(crate) tokens: Vec<Token>,
}

impl ParseState {
    /// Gets the parsed expression.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Gets the regular expression source emitted for the expression.
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Gets the `./` prefix that was removed from the expression, if any.
    pub fn prefix(&self) -> &str {
        self.prefix
    }

    /// Returns `true` if the expression is negated by leading `!`s.
    pub fn is_negated(&self) -> bool {
        self.negated
    }

    /// Returns `true` if the expression begins with a negated extended glob `!(...)`.
    pub fn is_negated_extglob(&self) -> bool {
        self.negated_extglob
    }

    /// Returns `true` if the expression has a globstar `**`.
    pub fn has_globstar(&self) -> bool {
        self.globstar
    }

    /// Returns `true` if the source was emitted by a fast path rather than the tokenizer.
    pub fn is_fast_path(&self) -> bool {
        self.fast_path
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Counts the capturing groups in the emitted source.
    pub fn capture_groups(&self) -> usize {
        count_capture_groups(&self.output)
    }
}

pub(crate) fn count_capture_groups(source: &str) -> usize {
    let mut count = 0;
    let mut is_class = false;
    let mut chars = source.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            },
            '[' if !is_class => is_class = true,
            ']' if is_class => is_class = false,
            '(' if !is_class => {
                if chars.peek() != Some(&'?') {
                    count += 1;
                }
                else {
                    // Named groups capture; other `(?` constructs do not.
                    let mut lookahead = chars.clone();
                    lookahead.next();
                    match (lookahead.next(), lookahead.next()) {
                        (Some('P'), Some('<')) => count += 1,
                        (Some('<'), Some(next)) if next != '=' && next != '!' => count += 1,
                        _ => {},
                    }
                }
            },
            _ => {},
        }
    }
    count
}
