use expect_macro::expect;
use rstest::rstest;

use globsmith::{GlobError, Options};

fn is_match(input: &str, expression: &str) -> bool {
    expect!(globsmith::is_match(input, expression, &Options::default()))
}

fn is_match_with(input: &str, expression: &str, options: &Options) -> bool {
    expect!(globsmith::is_match(input, expression, options))
}

#[rstest]
#[case::nested("src/lib/app.js", true)]
#[case::shallow("src/app.js", true)]
#[case::deep("src/a/b/c/app.js", true)]
#[case::other_root("lib/app.js", false)]
#[case::other_extension("src/lib/app.rs", false)]
#[case::hidden_directory("src/.cache/app.js", false)]
fn match_globstar_tree(#[case] input: &str, #[case] expected: bool) {
    assert_eq!(is_match(input, "src/**/*.js"), expected);
}

#[test]
fn match_is_anchored() {
    assert!(!is_match("barfoo", "foo"));
    assert!(!is_match("foobar", "foo"));
    assert!(!is_match("a/b.js", "*.js"));
    assert!(is_match("foo", "foo"));
}

#[test]
fn match_contains_is_unanchored() {
    let options = Options {
        contains: true,
        ..Options::default()
    };
    assert!(is_match_with("barfoo", "foo", &options));
    assert!(is_match_with("a/b.js/c", "*.js", &options));
}

#[test]
fn match_leading_negation_toggles() {
    assert!(!is_match("a", "!a"));
    assert!(is_match("b", "!a"));
    assert!(is_match("a", "!!a"));
    assert!(!is_match("b", "!!a"));
    assert!(!is_match("a", "!!!a"));
}

#[test]
fn match_negation_disabled_is_literal() {
    let options = Options {
        no_negate: true,
        ..Options::default()
    };
    assert!(is_match_with("!a", "!a", &options));
    assert!(!is_match_with("b", "!a", &options));
}

#[test]
fn match_globstar_crosses_separators() {
    assert!(is_match("a/b/c", "a/**"));
    assert!(!is_match("a/b/c", "a/*"));
    assert!(is_match("a/b", "a/*"));
    assert!(is_match("a", "a/**"));
}

#[test]
fn match_no_globstar_degrades_to_star() {
    let options = Options {
        no_globstar: true,
        ..Options::default()
    };
    assert!(is_match_with("a/b", "a/**", &options));
    assert!(!is_match_with("a/b/c", "a/**", &options));
}

#[rstest]
#[case::star(".a", "*")]
#[case::star_segment("a/.b", "a/*")]
#[case::globstar(".git/config", "**")]
#[case::globstar_segment("a/.git/config", "a/**/config")]
#[case::qmark(".a", "?a")]
#[case::extension(".eslintrc.js", "*.js")]
fn match_dot_exclusion(#[case] input: &str, #[case] expression: &str) {
    assert!(!is_match(input, expression));
    let options = Options {
        dot: true,
        ..Options::default()
    };
    assert!(is_match_with(input, expression, &options));
}

#[test]
fn match_literal_leading_dot() {
    assert!(is_match(".eslintrc", ".*"));
    assert!(is_match("a/.b", "a/.*"));
}

#[test]
fn match_dot_segments_never_match_wildcards() {
    let options = Options {
        dot: true,
        ..Options::default()
    };
    assert!(!is_match_with("a/../b", "a/**/b", &options));
    assert!(!is_match_with("..", "*", &options));
}

#[test]
fn match_single_brace_is_literal() {
    assert!(is_match("{a}", "{a}"));
    assert!(!is_match("a", "{a}"));
}

#[rstest]
#[case::alternative("index.ts", "*.{js,ts}", true)]
#[case::alternative_rejects("index.rs", "*.{js,ts}", false)]
#[case::nested("a/c/d", "a/{b,c/{d,e}}", true)]
#[case::range("file2.txt", "file{1..3}.txt", true)]
#[case::range_rejects("file4.txt", "file{1..3}.txt", false)]
#[case::alpha_range("b", "{a..c}", true)]
fn match_braces(#[case] input: &str, #[case] expression: &str, #[case] expected: bool) {
    assert_eq!(is_match(input, expression), expected);
}

#[rstest]
#[case::negate("a.js", "!(*.txt)", true)]
#[case::negate_rejects("a.txt", "!(*.txt)", false)]
#[case::exactly_one("a", "@(a|b)", true)]
#[case::exactly_one_rejects("c", "@(a|b)", false)]
#[case::one_or_more("aaa", "+(a)", true)]
#[case::one_or_more_rejects("b", "+(a)", false)]
#[case::zero_or_more("abab", "*(a|b)", true)]
#[case::zero_or_one("a.js", "?(a).js", true)]
fn match_extglobs(#[case] input: &str, #[case] expression: &str, #[case] expected: bool) {
    assert_eq!(is_match(input, expression), expected);
}

#[rstest]
fn match_constructs_exclude_dot_segments(
    #[values(
        "!(a)", "?(a)*", "*(b)*", "@(b|*)", "+(*)", "[!a]", "[!a]*", "*", "?", "??"
    )]
    expression: &str,
    #[values(false, true)] dot: bool,
    #[values(false, true)] bash: bool,
) {
    let options = Options {
        dot,
        bash,
        ..Options::default()
    };
    let nested = format!("x/{}/y", expression);
    for segment in [".", ".."] {
        assert!(
            !is_match_with(segment, expression, &options),
            "`{}` matches `{}` (dot: {}, bash: {})",
            expression,
            segment,
            dot,
            bash,
        );
        let input = format!("x/{}/y", segment);
        assert!(
            !is_match_with(&input, &nested, &options),
            "`{}` matches `{}` (dot: {}, bash: {})",
            nested,
            input,
            dot,
            bash,
        );
    }
    if !dot {
        assert!(!is_match_with(".x", expression, &options));
    }
}

#[rstest]
#[case::pipe("a|b", "a|b", true)]
#[case::pipe_is_not_alternation("a", "a|b", false)]
#[case::pipe_in_extglob("b", "@(a|b)", true)]
#[case::plus_after_class("a+", "[ab]+", true)]
#[case::plus_is_not_quantifier("aa", "[ab]+", false)]
#[case::plus_after_brace("a+", "{a,b}+", true)]
#[case::plus_after_extglob("a+", "@(a)+", true)]
fn match_regex_operators_are_literal(
    #[case] input: &str,
    #[case] expression: &str,
    #[case] expected: bool,
) {
    assert_eq!(is_match(input, expression), expected);
}

#[rstest]
#[case::qmark("a.js", "?.js", true)]
#[case::qmark_rejects("ab.js", "?.js", false)]
#[case::qmark_separator("a/b", "a?b", false)]
#[case::class("b.c", "[a-c].c", true)]
#[case::class_rejects("d.c", "[a-c].c", false)]
#[case::negated_class("d.c", "[!a-c].c", true)]
#[case::negated_class_rejects("a.c", "[!a-c].c", false)]
#[case::unclosed_bracket("a[b", "a[b", true)]
#[case::unclosed_paren("a(b", "a(b", true)]
#[case::escaped_star("*", "\\*", true)]
#[case::escaped_star_rejects("a", "\\*", false)]
#[case::quoted_star("*", "\"*\"", true)]
#[case::quoted_star_rejects("a", "\"*\"", false)]
fn match_characters(#[case] input: &str, #[case] expression: &str, #[case] expected: bool) {
    assert_eq!(is_match(input, expression), expected);
}

#[test]
fn match_posix_classes() {
    let options = Options {
        posix: true,
        ..Options::default()
    };
    assert!(is_match_with("7", "[[:digit:]]", &options));
    assert!(!is_match_with("a", "[[:digit:]]", &options));
    assert!(is_match_with("a1", "[[:alpha:]][[:digit:]]", &options));
}

#[test]
fn match_no_case() {
    let options = Options {
        no_case: true,
        ..Options::default()
    };
    assert!(is_match_with("README.MD", "*.md", &options));
    assert!(!is_match("README.MD", "*.md"));
}

#[test]
fn match_bash_star_crosses_separators() {
    let options = Options {
        bash: true,
        ..Options::default()
    };
    assert!(is_match_with("a/b/c", "a*", &options));
    assert!(!is_match("a/b/c", "a*"));
}

#[test]
fn match_windows_separators() {
    let options = Options {
        windows: true,
        ..Options::default()
    };
    assert!(is_match_with("a\\b\\c.js", "a/**/*.js", &options));
    assert!(is_match_with("a/b/c.js", "a/**/*.js", &options));
    assert!(!is_match("a\\b\\c.js", "a/**/*.js"));
}

#[test]
fn match_base_name() {
    let options = Options::default();
    assert!(expect!(globsmith::match_base("a/b/c.md", "*.md", &options)));
    assert!(!expect!(globsmith::match_base("a/b/c.md", "b/*.md", &options)));
    assert!(!is_match("a/b/c.md", "*.md"));
}

#[test]
fn match_any_of_many_patterns() {
    let options = Options::default();
    assert!(expect!(globsmith::is_match("a.rs", ["*.js", "*.rs"], &options)));
    assert!(!expect!(globsmith::is_match("a.md", vec!["*.js", "*.rs"], &options)));
}

#[test]
fn match_ignore() {
    let options = Options {
        ignore: vec!["**/node_modules/**".into(), "*.min.js".into()],
        ..Options::default()
    };
    let matcher = expect!(globsmith::create_matcher("**/*.js", &options));
    assert!(matcher.is_match("src/app.js"));
    assert!(!matcher.is_match("src/node_modules/lib/index.js"));
    assert!(!matcher.is_match("app.min.js"));
}

#[test]
fn match_empty_input_is_false() {
    assert!(!is_match("", "*"));
    assert!(!is_match("", "**"));
}

#[test]
fn match_too_long_pattern_fails() {
    let expression = "a".repeat(65537);
    assert!(matches!(
        globsmith::is_match("a", expression.as_str(), &Options::default()),
        Err(GlobError::PatternTooLong {
            len: 65537,
            max: 65536
        }),
    ));

    let options = Options {
        max_length: 4,
        ..Options::default()
    };
    assert!(matches!(
        globsmith::is_match("a", "*****", &options),
        Err(GlobError::PatternTooLong { len: 5, max: 4 }),
    ));
}

#[test]
fn match_empty_pattern_fails() {
    let options = Options::default();
    assert!(matches!(
        globsmith::is_match("a", "", &options),
        Err(GlobError::InvalidPattern),
    ));
    let patterns: Vec<String> = Vec::new();
    assert!(matches!(
        globsmith::is_match("a", patterns, &options),
        Err(GlobError::InvalidPattern),
    ));
}

#[test]
fn match_strict_brackets_fails() {
    let options = Options {
        strict_brackets: true,
        ..Options::default()
    };
    assert!(matches!(
        globsmith::is_match("a", "a[b", &options),
        Err(GlobError::MalformedGroup(_)),
    ));
}

#[rstest]
fn match_fast_paths_agree_with_compiler(
    #[values(
        "a", "a/b", "a.b", "..", "?", "*", "**", "a/**", "../**", ".*", "*.*", "*.js", "*/*",
        "**/*", "**/*.js", "**/.*", "a/*"
    )]
    expression: &str,
    #[values(false, true)] dot: bool,
    #[values(false, true)] strict_slashes: bool,
    #[values(false, true)] bash: bool,
) {
    const INPUTS: &[&str] = &[
        "a", "a/", "a/b", "a/b/c", ".a", "a/.b", "a.js", "a/b.js", ".js", ".", "..", "a/../b",
        "a.", "a.js/", "/a", "/..",
    ];

    let fast = Options {
        dot,
        strict_slashes,
        bash,
        ..Options::default()
    };
    let compiled = Options {
        fast_paths: false,
        ..fast.clone()
    };
    let fast = expect!(globsmith::create_matcher(expression, &fast));
    let compiled = expect!(globsmith::create_matcher(expression, &compiled));
    for input in INPUTS {
        assert_eq!(
            fast.is_match(input),
            compiled.is_match(input),
            "expression `{}` against `{}` (dot: {}, strict slashes: {}, bash: {})",
            expression,
            input,
            dot,
            strict_slashes,
            bash,
        );
    }
}
