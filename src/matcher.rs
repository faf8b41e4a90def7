//! Composition of compiled patterns into a predicate.
//!
//! A [`Matcher`] evaluates one or more patterns as a logical OR, vetoes matches with an optional
//! ignore list, and reports outcomes to the observer callbacks in [`Options`]. Trivially shaped
//! patterns are matched with string operations rather than a compiled program; see
//! [`Options::fast_paths`].

use std::borrow::Cow;
use std::fmt::{self, Debug, Formatter};
use tracing::trace;

use crate::compile::{self, CompiledPattern};
use crate::encode;
use crate::options::Options;
use crate::token;
use crate::GlobError;

/// The outcome of evaluating one pattern against an input.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MatchResult<'m> {
    /// The glob expression.
    pub glob: &'m str,
    /// The input as given to the matcher.
    pub input: &'m str,
    /// The input after formatting.
    pub output: &'m str,
    pub is_match: bool,
}

type Recognize = fn(&str, &Options) -> bool;
type Evaluate = fn(&str, &str, &Options) -> bool;

/// A pattern shape that is matched without a compiled program.
struct FastPath {
    name: &'static str,
    recognize: Recognize,
    evaluate: Evaluate,
}

impl Debug for FastPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FastPath").field(&self.name).finish()
    }
}

// Ordered: the first recognized shape is used.
static FAST_PATHS: [FastPath; 4] = [
    FastPath {
        name: "literal",
        recognize: is_literal,
        evaluate: match_literal,
    },
    FastPath {
        name: "star",
        recognize: is_star,
        evaluate: match_star,
    },
    FastPath {
        name: "globstar",
        recognize: is_globstar,
        evaluate: match_globstar,
    },
    FastPath {
        name: "literal-globstar",
        recognize: is_literal_globstar,
        evaluate: match_literal_globstar,
    },
];

fn is_fast_path_enabled(options: &Options) -> bool {
    options.fast_paths
        && !(options.windows
            || options.no_case
            || options.contains
            || options.capture
            || options.bash)
}

fn is_literal(glob: &str, _: &Options) -> bool {
    !glob.starts_with('!')
        && !glob.starts_with("./")
        && !glob.contains(|c| {
            matches!(
                c,
                '*' | '?' | '[' | ']' | '{' | '}' | '(' | ')' | '|' | '\\' | '"' | '\0'
            )
        })
}

fn match_literal(glob: &str, input: &str, _: &Options) -> bool {
    glob == input
}

fn is_star(glob: &str, _: &Options) -> bool {
    glob == "*"
}

fn match_star(_: &str, input: &str, options: &Options) -> bool {
    if input.is_empty() || is_excluded_by_dot(input, options.dot) {
        return false;
    }
    let body = if options.strict_slashes {
        input
    }
    else {
        input.strip_suffix('/').unwrap_or(input)
    };
    !body.contains('/')
}

fn is_globstar(glob: &str, options: &Options) -> bool {
    glob == "**" && !options.no_globstar
}

fn match_globstar(_: &str, input: &str, options: &Options) -> bool {
    is_globstar_text(input, options.dot)
}

fn is_literal_globstar(glob: &str, options: &Options) -> bool {
    !options.no_globstar
        && !glob.starts_with("./")
        && glob
            .strip_suffix("/**")
            .is_some_and(|prefix| !prefix.is_empty() && is_literal(prefix, options))
}

fn match_literal_globstar(glob: &str, input: &str, options: &Options) -> bool {
    let prefix = &glob[..glob.len() - 3];
    if input == prefix {
        return !options.strict_slashes;
    }
    input
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('/'))
        .is_some_and(|rest| is_globstar_text(rest, options.dot))
}

// Returns `true` if a wildcard at the start of `text` is forbidden from matching it.
fn is_excluded_by_dot(text: &str, dot: bool) -> bool {
    if dot {
        matches!(text, "." | "..") || text.starts_with("./") || text.starts_with("../")
    }
    else {
        text.starts_with('.')
    }
}

// Returns `true` if a globstar matches the entirety of `text`.
fn is_globstar_text(text: &str, dot: bool) -> bool {
    if dot {
        !text.split('/').any(|segment| matches!(segment, "." | ".."))
    }
    else {
        !text.starts_with('.') && !text.contains("/.")
    }
}

#[derive(Clone, Debug)]
enum Strategy {
    Fast {
        glob: String,
        path: &'static FastPath,
    },
    Compiled(CompiledPattern),
}

#[derive(Clone, Debug)]
struct Pattern {
    strategy: Strategy,
    has_separator: bool,
}

impl Pattern {
    fn new(glob: &str, options: &Options) -> Result<Self, GlobError> {
        let max = options.max_length();
        if glob.len() > max {
            return Err(GlobError::PatternTooLong {
                len: glob.len(),
                max,
            });
        }
        if glob.is_empty() {
            return Err(GlobError::InvalidPattern);
        }
        let has_separator = glob.contains('/') || (options.windows && glob.contains('\\'));
        let fast = is_fast_path_enabled(options)
            .then(|| FAST_PATHS.iter().find(|path| (path.recognize)(glob, options)))
            .flatten();
        let strategy = match fast {
            Some(path) => {
                trace!(glob, fast_path = path.name, "matching pattern without a program");
                Strategy::Fast {
                    glob: glob.to_owned(),
                    path,
                }
            },
            None => {
                let state = token::parse(glob, options)?;
                Strategy::Compiled(compile::compile(&state, options)?)
            },
        };
        Ok(Pattern {
            strategy,
            has_separator,
        })
    }

    fn glob(&self) -> &str {
        match self.strategy {
            Strategy::Fast { ref glob, .. } => glob,
            Strategy::Compiled(ref pattern) => pattern.state().input(),
        }
    }

    fn is_match(&self, text: &str, options: &Options) -> bool {
        match self.strategy {
            Strategy::Fast { ref glob, path } => (path.evaluate)(glob, text, options),
            Strategy::Compiled(ref pattern) => pattern.is_match(text),
        }
    }
}

/// A predicate over paths composed of glob patterns.
///
/// # Examples
///
/// ```rust
/// use globsmith::{Matcher, Options};
///
/// let options = Options {
///     ignore: vec!["**/*.test.js".into()],
///     ..Options::default()
/// };
/// let matcher = Matcher::new(["src/**/*.js", "lib/*.js"], &options).unwrap();
///
/// assert!(matcher.is_match("src/app/main.js"));
/// assert!(matcher.is_match("lib/util.js"));
/// assert!(!matcher.is_match("src/app/main.test.js"));
/// ```
#[derive(Clone, Debug)]
pub struct Matcher {
    options: Options,
    patterns: Vec<Pattern>,
    ignore: Option<Box<Matcher>>,
}

impl Matcher {
    /// Compiles patterns into a matcher.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no patterns or if any pattern or ignore pattern fails to
    /// compile.
    pub fn new(patterns: impl crate::IntoPatterns, options: &Options) -> Result<Self, GlobError> {
        let globs = patterns.into_patterns();
        if globs.is_empty() {
            return Err(GlobError::InvalidPattern);
        }
        let patterns = globs
            .iter()
            .map(|glob| Pattern::new(glob, options))
            .collect::<Result<Vec<_>, _>>()?;
        let ignore = if options.ignore.is_empty() {
            None
        }
        else {
            let ignore = options.ignore.clone();
            Some(Box::new(Matcher::new(ignore, &options.ignore_options())?))
        };
        Ok(Matcher {
            options: options.clone(),
            patterns,
            ignore,
        })
    }

    /// Returns `true` if any pattern matches the input and no ignore pattern matches it.
    pub fn is_match(&self, input: &str) -> bool {
        if input.is_empty() {
            if let (Some(on_result), Some(pattern)) =
                (&self.options.on_result, self.patterns.first())
            {
                on_result(&MatchResult {
                    glob: pattern.glob(),
                    input,
                    output: input,
                    is_match: false,
                });
            }
            return false;
        }
        let output = self.format(input);
        for pattern in &self.patterns {
            let text = if self.options.base_name && !pattern.has_separator {
                base_name(&output)
            }
            else {
                output.as_ref()
            };
            let is_match = pattern.is_match(text, &self.options);
            let mut result = MatchResult {
                glob: pattern.glob(),
                input,
                output: output.as_ref(),
                is_match,
            };
            if let Some(ref on_result) = self.options.on_result {
                on_result(&result);
            }
            if !is_match {
                continue;
            }
            if self.is_ignored(input) {
                result.is_match = false;
                if let Some(ref on_ignore) = self.options.on_ignore {
                    on_ignore(&result);
                }
                return false;
            }
            if let Some(ref on_match) = self.options.on_match {
                on_match(&result);
            }
            return true;
        }
        false
    }

    pub fn into_predicate(self) -> impl Fn(&str) -> bool {
        move |input| self.is_match(input)
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Gets the compiled patterns. Patterns matched without a program are not included.
    pub fn compiled(&self) -> impl '_ + Iterator<Item = &CompiledPattern> {
        self.patterns.iter().filter_map(|pattern| match pattern.strategy {
            Strategy::Compiled(ref pattern) => Some(pattern),
            Strategy::Fast { .. } => None,
        })
    }

    fn is_ignored(&self, input: &str) -> bool {
        self.ignore
            .as_ref()
            .is_some_and(|ignore| ignore.is_match(input))
    }

    fn format<'i>(&self, input: &'i str) -> Cow<'i, str> {
        match self.options.format {
            Some(ref format) => format(input).into(),
            None if self.options.windows => encode::to_posix_slashes(input).into(),
            None => input.into(),
        }
    }
}

fn base_name(path: &str) -> &str {
    let path = path.strip_suffix('/').unwrap_or(path);
    path.rsplit('/').next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use expect_macro::expect;
    use rstest::rstest;
    use std::sync::{Arc, Mutex};

    use crate::matcher::{MatchResult, Matcher};
    use crate::options::Options;
    use crate::GlobError;

    const INPUTS: &[&str] = &[
        "a",
        "a/",
        "/",
        ".",
        "..",
        ".a",
        "a/b",
        "a/b/",
        "a/.b",
        "a/./b",
        "a/../b",
        "a/b/c.js",
        "ab",
        "./a",
        "../a",
        "a.b",
        "a//b",
    ];

    #[rstest]
    #[case::literal("a")]
    #[case::literal_path("a/b")]
    #[case::literal_dots("a.b")]
    #[case::dot(".")]
    #[case::star("*")]
    #[case::globstar("**")]
    #[case::literal_globstar("a/**")]
    #[case::dot_literal_globstar("../**")]
    fn fast_paths_agree_with_compiled_patterns(
        #[case] glob: &str,
        #[values(false, true)] dot: bool,
        #[values(false, true)] strict_slashes: bool,
    ) {
        let fast = Options {
            dot,
            strict_slashes,
            ..Options::default()
        };
        let compiled = Options {
            fast_paths: false,
            ..fast.clone()
        };
        let fast = expect!(Matcher::new(glob, &fast));
        let compiled = expect!(Matcher::new(glob, &compiled));
        assert_eq!(fast.compiled().count(), 0);
        assert_eq!(compiled.compiled().count(), 1);
        for input in INPUTS {
            assert_eq!(
                fast.is_match(input),
                compiled.is_match(input),
                "glob `{}` against `{}` (dot: {}, strict slashes: {})",
                glob,
                input,
                dot,
                strict_slashes,
            );
        }
    }

    #[rstest]
    #[case::negation("!a")]
    #[case::prefixed("./a")]
    #[case::prefixed_globstar("./**")]
    #[case::wildcard_globstar("*/**")]
    #[case::class("[a]")]
    fn fast_paths_not_recognized(#[case] glob: &str) {
        let matcher = expect!(Matcher::new(glob, &Options::default()));
        assert_eq!(matcher.compiled().count(), 1);
    }

    #[test]
    fn fast_paths_disabled_by_no_globstar() {
        let options = Options {
            no_globstar: true,
            ..Options::default()
        };
        let matcher = expect!(Matcher::new("a/**", &options));
        assert_eq!(matcher.compiled().count(), 1);
        assert!(matcher.is_match("a/b"));
        assert!(!matcher.is_match("a/b/c"));
    }

    #[test]
    fn matcher_is_match_any_pattern() {
        let matcher = expect!(Matcher::new(["*.js", "*.rs"], &Options::default()));
        assert!(matcher.is_match("main.rs"));
        assert!(matcher.is_match("app.js"));
        assert!(!matcher.is_match("README.md"));
        assert!(!matcher.is_match(""));
    }

    #[test]
    fn matcher_without_patterns_is_error() {
        let patterns: Vec<String> = Vec::new();
        assert!(matches!(
            Matcher::new(patterns, &Options::default()),
            Err(GlobError::InvalidPattern),
        ));
    }

    #[test]
    fn matcher_ignore_vetoes_match() {
        let options = Options {
            ignore: vec!["**/vendor/**".into()],
            ..Options::default()
        };
        let matcher = expect!(Matcher::new("**/*.js", &options));
        assert!(matcher.is_match("src/app.js"));
        assert!(!matcher.is_match("src/vendor/lib.js"));
    }

    #[test]
    fn matcher_base_name() {
        let options = Options {
            base_name: true,
            ..Options::default()
        };
        let matcher = expect!(Matcher::new(["*.js", "src/*.rs"], &options));
        assert!(matcher.is_match("a/b/c.js"));
        assert!(matcher.is_match("src/lib.rs"));
        assert!(!matcher.is_match("a/src/lib.rs"));
    }

    #[test]
    fn matcher_windows_separators() {
        let options = Options {
            windows: true,
            ..Options::default()
        };
        let matcher = expect!(Matcher::new("src/**/*.js", &options));
        assert!(matcher.is_match("src\\lib\\app.js"));
        assert!(matcher.is_match("src/lib/app.js"));
    }

    #[test]
    fn matcher_format_input() {
        let options = Options {
            format: Some(Arc::new(|input: &str| {
                input.strip_prefix("./").unwrap_or(input).to_owned()
            })),
            ..Options::default()
        };
        let matcher = expect!(Matcher::new("a/*.js", &options));
        assert!(matcher.is_match("./a/b.js"));
    }

    #[test]
    fn matcher_callbacks() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let options = {
            let (result, matched, ignored) = (events.clone(), events.clone(), events.clone());
            Options {
                ignore: vec!["b.js".into()],
                on_result: Some(Arc::new(move |outcome: &MatchResult<'_>| {
                    result.lock().unwrap().push(format!("result:{}", outcome.is_match));
                })),
                on_match: Some(Arc::new(move |outcome: &MatchResult<'_>| {
                    matched.lock().unwrap().push(format!("match:{}", outcome.input));
                })),
                on_ignore: Some(Arc::new(move |outcome: &MatchResult<'_>| {
                    ignored.lock().unwrap().push(format!("ignore:{}", outcome.input));
                })),
                ..Options::default()
            }
        };
        let matcher = expect!(Matcher::new(["*.rs", "*.js"], &options));

        assert!(matcher.is_match("a.js"));
        assert!(!matcher.is_match("b.js"));
        assert_eq!(
            *events.lock().unwrap(),
            [
                "result:false",
                "result:true",
                "match:a.js",
                "result:false",
                "result:true",
                "ignore:b.js",
            ],
        );
    }

    #[test]
    fn matcher_empty_input_reports_result() {
        let count = Arc::new(Mutex::new(0usize));
        let options = {
            let count = count.clone();
            Options {
                on_result: Some(Arc::new(move |outcome: &MatchResult<'_>| {
                    assert!(!outcome.is_match || !outcome.input.is_empty());
                    *count.lock().unwrap() += 1;
                })),
                ..Options::default()
            }
        };
        let matcher = expect!(Matcher::new("*", &options));

        assert!(!matcher.is_match(""));
        assert_eq!(*count.lock().unwrap(), 1);
        assert!(matcher.is_match("a"));
        assert_eq!(*count.lock().unwrap(), 2);
    }

    #[test]
    fn matcher_into_predicate() {
        let is_match = expect!(Matcher::new("*.md", &Options::default())).into_predicate();
        let documents: Vec<_> = ["a.md", "b.rs", "c.md"]
            .into_iter()
            .filter(|input| is_match(*input))
            .collect();
        assert_eq!(documents, ["a.md", "c.md"]);
    }
}
