use tracing::{debug, warn};

use crate::capture::MatchedText;
use crate::options::Options;
use crate::token::ParseState;
use crate::GlobError;

#[derive(Clone, Debug)]
enum Program {
    Standard(regex::Regex),
    /// Sources with lookaround or backreferences.
    Extended(fancy_regex::Regex),
    /// Installed when the host engines reject a source.
    Never,
}

impl Program {
    fn compile(source: &str) -> Result<Self, fancy_regex::Error> {
        match regex::Regex::new(source) {
            Ok(regex) => Ok(Program::Standard(regex)),
            Err(_) => fancy_regex::Regex::new(source).map(Program::Extended),
        }
    }

    fn is_match(&self, text: &str) -> bool {
        match self {
            Program::Standard(regex) => regex.is_match(text),
            Program::Extended(regex) => regex.is_match(text).unwrap_or_else(|error| {
                warn!(%error, text, "failed to match text; treating as a non-match");
                false
            }),
            Program::Never => false,
        }
    }

    fn captures<'t>(&self, text: &'t str) -> Option<MatchedText<'t>> {
        match self {
            Program::Standard(regex) => regex
                .captures(text)
                .map(|captures| MatchedText::from_standard(text, &captures)),
            Program::Extended(regex) => match regex.captures(text) {
                Ok(captures) => {
                    captures.map(|captures| MatchedText::from_extended(text, &captures))
                },
                Err(error) => {
                    warn!(%error, text, "failed to match text; treating as a non-match");
                    None
                },
            },
            Program::Never => None,
        }
    }
}

/// A glob expression compiled into a regular expression.
///
/// A `CompiledPattern` is immutable and can be shared across threads.
#[derive(Clone, Debug)]
pub struct CompiledPattern {
    state: ParseState,
    source: String,
    program: Program,
    contains: bool,
}

impl CompiledPattern {
    pub fn is_match(&self, text: &str) -> bool {
        self.program.is_match(text)
    }

    /// Matches text and gets the captured groups if the text matches.
    ///
    /// Wildcards and groups only capture if the pattern is compiled with [`Options::capture`].
    pub fn captures<'t>(&self, text: &'t str) -> Option<MatchedText<'t>> {
        self.program.captures(text)
    }

    /// Gets the assembled regular expression source.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn state(&self) -> &ParseState {
        &self.state
    }

    pub fn is_negated(&self) -> bool {
        self.state.is_negated()
    }

    pub fn is_contains(&self) -> bool {
        self.contains
    }

    /// Returns `true` if the host engines rejected the source and the pattern never matches.
    pub fn is_never(&self) -> bool {
        matches!(self.program, Program::Never)
    }
}

/// Wraps parser output with anchors, negation, and case folding.
pub fn regex_source(state: &ParseState, options: &Options) -> String {
    let (prepend, append) = if options.contains {
        ("", "")
    }
    else {
        ("^", "$")
    };
    let mut source = format!("{}(?:{}){}", prepend, state.output(), append);
    if state.is_negated() && !options.no_negate {
        source = format!("^(?!{}).*$", source);
    }
    if options.no_case {
        source.insert_str(0, "(?i)");
    }
    source
}

/// Compiles parser output into a [`CompiledPattern`].
///
/// # Errors
///
/// Returns [`GlobError::InvalidRegexSource`] if [`Options::debug`] is set and the host engines
/// reject the source. Otherwise, a rejected source produces a pattern that never matches.
pub fn compile(state: &ParseState, options: &Options) -> Result<CompiledPattern, GlobError> {
    let source = regex_source(state, options);
    debug!(expression = state.input(), source = source.as_str(), "assembled regex source");
    let program = match Program::compile(&source) {
        Ok(program) => program,
        Err(error) if options.debug => {
            return Err(GlobError::InvalidRegexSource {
                expression: source,
                error: Box::new(error),
            });
        },
        Err(error) => {
            warn!(
                %error,
                expression = state.input(),
                "regex source rejected; pattern never matches",
            );
            Program::Never
        },
    };
    Ok(CompiledPattern {
        state: state.clone(),
        source,
        program,
        contains: options.contains,
    })
}
