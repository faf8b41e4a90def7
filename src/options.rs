use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::matcher::MatchResult;
use crate::range::RangeArgs;

/// Upper bound on the length of a glob expression, in bytes.
///
/// [`Options::max_length`] can only lower this bound.
pub const MAX_LENGTH: usize = 1024 * 64;

/// Rewrites a candidate path before it is matched.
pub type FormatFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Expands a brace range such as `{1..10}` into regular expression source.
pub type ExpandRangeFn = Arc<dyn Fn(&RangeArgs<'_>, &Options) -> String + Send + Sync>;

/// Observes the outcome of a match. Observers never influence the result.
pub type ResultFn = Arc<dyn Fn(&MatchResult<'_>) + Send + Sync>;

/// Configuration shared by every stage of the compiler.
///
/// `Options` is an immutable snapshot: stages only read it. Hooks are plain function values and
/// are cloned by reference.
///
/// # Examples
///
/// ```rust
/// use globsmith::Options;
///
/// let options = Options {
///     dot: true,
///     no_case: true,
///     ..Options::default()
/// };
/// assert!(globsmith::is_match(".Config", "*.config", &options).unwrap());
/// ```
#[derive(Clone)]
#[cfg_attr(
    feature = "serde",
    derive(Deserialize, Serialize),
    serde(default, rename_all = "camelCase")
)]
pub struct Options {
    /// Wildcards match segments that begin with `.`.
    pub dot: bool,
    /// Follows bash rules: a single `*` also crosses path separators.
    pub bash: bool,
    /// Translates POSIX bracket classes such as `[[:alpha:]]`.
    pub posix: bool,
    /// Accepts `\` as a path separator in both patterns and candidate paths.
    pub windows: bool,
    /// Treats `**` like `*`.
    pub no_globstar: bool,
    /// Disables extended glob groups such as `+(a|b)`.
    pub no_extglob: bool,
    /// Disables brace expansion.
    pub no_brace: bool,
    /// Disables bracket expressions.
    pub no_bracket: bool,
    /// Disables leading `!` negation.
    pub no_negate: bool,
    /// Matches case-insensitively.
    pub no_case: bool,
    /// Rejects a trailing separator on candidates that would otherwise match.
    pub strict_slashes: bool,
    /// Fails with [`GlobError::MalformedGroup`] when a group is never closed.
    ///
    /// [`GlobError::MalformedGroup`]: crate::GlobError::MalformedGroup
    pub strict_brackets: bool,
    /// Matches anywhere within the candidate rather than the whole candidate.
    pub contains: bool,
    /// Matches patterns without separators against the final path segment.
    pub base_name: bool,
    /// Emits capturing groups for wildcards and groups.
    pub capture: bool,
    /// Maximum pattern length in bytes; clamped to [`MAX_LENGTH`].
    pub max_length: usize,
    /// How to treat bracket bodies with no regex meaning such as `[abc]`.
    ///
    /// `None` matches either the class or the literal text, `Some(true)` only the literal text
    /// and `Some(false)` only the class.
    pub literal_brackets: Option<bool>,
    /// Allows trivially shaped patterns to bypass full compilation.
    pub fast_paths: bool,
    /// Drops backslashes rather than treating them as escapes.
    pub unescape: bool,
    /// Retains double quotes in the output.
    pub keep_quotes: bool,
    /// Propagates host engine errors instead of installing a never-matching program.
    pub debug: bool,
    /// Keeps scanning after the first glob token.
    pub scan_to_end: bool,
    /// Splits scanned patterns into path segments.
    pub parts: bool,
    /// Patterns that veto an otherwise successful match.
    pub ignore: Vec<String>,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub format: Option<FormatFn>,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub expand_range: Option<ExpandRangeFn>,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub on_match: Option<ResultFn>,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub on_ignore: Option<ResultFn>,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub on_result: Option<ResultFn>,
}

impl Options {
    /// Gets the effective maximum pattern length.
    pub fn max_length(&self) -> usize {
        self.max_length.min(MAX_LENGTH)
    }

    /// Derives the options used to compile ignore patterns.
    ///
    /// Callbacks and the ignore list are cleared so that evaluating an ignore pattern never
    /// recurses into another ignore evaluation.
    pub fn ignore_options(&self) -> Self {
        Options {
            ignore: Vec::new(),
            on_match: None,
            on_ignore: None,
            on_result: None,
            ..self.clone()
        }
    }
}

impl Default for Options {
    fn default() -> Self {
        Options {
            dot: false,
            bash: false,
            posix: false,
            windows: false,
            no_globstar: false,
            no_extglob: false,
            no_brace: false,
            no_bracket: false,
            no_negate: false,
            no_case: false,
            strict_slashes: false,
            strict_brackets: false,
            contains: false,
            base_name: false,
            capture: false,
            max_length: MAX_LENGTH,
            literal_brackets: None,
            fast_paths: true,
            unescape: false,
            keep_quotes: false,
            debug: false,
            scan_to_end: false,
            parts: false,
            ignore: Vec::new(),
            format: None,
            expand_range: None,
            on_match: None,
            on_ignore: None,
            on_result: None,
        }
    }
}

impl Debug for Options {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        fn hook<T>(hook: &Option<T>) -> &'static str {
            if hook.is_some() {
                "Some(..)"
            }
            else {
                "None"
            }
        }

        f.debug_struct("Options")
            .field("dot", &self.dot)
            .field("bash", &self.bash)
            .field("posix", &self.posix)
            .field("windows", &self.windows)
            .field("no_globstar", &self.no_globstar)
            .field("no_extglob", &self.no_extglob)
            .field("no_brace", &self.no_brace)
            .field("no_bracket", &self.no_bracket)
            .field("no_negate", &self.no_negate)
            .field("no_case", &self.no_case)
            .field("strict_slashes", &self.strict_slashes)
            .field("strict_brackets", &self.strict_brackets)
            .field("contains", &self.contains)
            .field("base_name", &self.base_name)
            .field("capture", &self.capture)
            .field("max_length", &self.max_length)
            .field("literal_brackets", &self.literal_brackets)
            .field("fast_paths", &self.fast_paths)
            .field("unescape", &self.unescape)
            .field("keep_quotes", &self.keep_quotes)
            .field("debug", &self.debug)
            .field("scan_to_end", &self.scan_to_end)
            .field("parts", &self.parts)
            .field("ignore", &self.ignore)
            .field("format", &hook(&self.format))
            .field("expand_range", &hook(&self.expand_range))
            .field("on_match", &hook(&self.on_match))
            .field("on_ignore", &hook(&self.on_ignore))
            .field("on_result", &hook(&self.on_result))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::matcher::MatchResult;
    use crate::options::{Options, MAX_LENGTH};

    #[test]
    fn max_length_is_clamped() {
        let options = Options {
            max_length: usize::MAX,
            ..Options::default()
        };
        assert_eq!(options.max_length(), MAX_LENGTH);

        let options = Options {
            max_length: 8,
            ..Options::default()
        };
        assert_eq!(options.max_length(), 8);
    }

    #[test]
    fn ignore_options_clear_callbacks_and_ignore_list() {
        let options = Options {
            dot: true,
            ignore: vec!["*.tmp".into()],
            on_match: Some(Arc::new(|_: &MatchResult<'_>| {})),
            on_result: Some(Arc::new(|_: &MatchResult<'_>| {})),
            format: Some(Arc::new(|input: &str| input.to_owned())),
            ..Options::default()
        };
        let derived = options.ignore_options();

        assert!(derived.dot);
        assert!(derived.ignore.is_empty());
        assert!(derived.on_match.is_none());
        assert!(derived.on_result.is_none());
        assert!(derived.format.is_some());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialize_options_with_defaults() {
        let options: Options = serde_json::from_str(r#"{ "dot": true, "noCase": true }"#).unwrap();

        assert!(options.dot);
        assert!(options.no_case);
        assert!(options.fast_paths);
        assert_eq!(options.max_length, MAX_LENGTH);
    }
}
