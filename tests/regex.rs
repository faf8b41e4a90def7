use expect_macro::expect;
use rstest::rstest;

use globsmith::{Options, TokenKind};

#[rstest]
#[case::literal("foo", "^(?:foo)$")]
#[case::negated("!foo", "^(?!^(?:foo)$).*$")]
#[case::single_brace("{a}", "^(?:\\{a\\})$")]
#[case::extension("*.js", "^(?:(?!\\.)(?=.)[^/]*?\\.js)$")]
fn generate_regex_source_eq(#[case] expression: &str, #[case] expected: &str) {
    assert_eq!(
        expect!(globsmith::generate_regex_source(expression, &Options::default())),
        expected,
    );
}

#[test]
fn regex_source_from_parse_state() {
    let options = Options {
        no_case: true,
        ..Options::default()
    };
    let state = expect!(globsmith::parse("foo", &options));
    assert_eq!(globsmith::regex_source(&state, &options), "(?i)^(?:foo)$");
}

#[test]
fn compile_regex_from_parse_state() {
    let options = Options::default();
    let state = expect!(globsmith::parse("src/**/*.js", &options));
    assert!(state.has_globstar());
    assert!(!state.is_fast_path());

    let pattern = expect!(globsmith::compile_regex(&state, &options));
    assert!(pattern.is_match("src/a/b.js"));
    assert!(!pattern.is_match("src/a/b.ts"));
    assert_eq!(pattern.state().input(), "src/**/*.js");
}

#[test]
fn make_regex_is_deterministic() {
    let options = Options::default();
    let first = expect!(globsmith::make_regex("a/{b,c}/**/*.{rs,toml}", &options));
    let second = expect!(globsmith::make_regex("a/{b,c}/**/*.{rs,toml}", &options));
    assert_eq!(first.source(), second.source());
    assert!(first.is_match("a/c/d/Cargo.toml"));
}

#[test]
fn make_regex_captures() {
    let options = Options {
        capture: true,
        ..Options::default()
    };
    let pattern = expect!(globsmith::make_regex("src/*/{lib,main}.rs", &options));
    let text = expect!(pattern.captures("src/cli/main.rs"), "pattern does not match");
    assert_eq!(text.matched(), "src/cli/main.rs");
    assert_eq!(text.groups().collect::<Vec<_>>(), [Some("cli"), Some("main")]);
    assert_eq!(pattern.state().capture_groups(), 2);
}

#[test]
fn parse_all_expressions() {
    let states = expect!(globsmith::parse_all(
        ["*.js", "!a/**"],
        &Options::default()
    ));
    assert_eq!(states.len(), 2);
    assert!(states[0].is_fast_path());
    assert!(states[1].is_negated());
}

#[test]
fn parse_tokens() {
    let options = Options {
        fast_paths: false,
        ..Options::default()
    };
    let state = expect!(globsmith::parse("a/*", &options));
    let kinds: Vec<_> = state.tokens().iter().map(|token| token.kind()).collect();
    assert_eq!(
        kinds,
        [
            TokenKind::Bos,
            TokenKind::Text,
            TokenKind::Slash,
            TokenKind::Star,
            TokenKind::MaybeSlash,
        ],
    );
}

#[test]
fn scan_splits_base_and_glob() {
    let scan = globsmith::scan("foo/bar/*.js", &Options::default());
    assert_eq!(scan.base, "foo/bar");
    assert_eq!(scan.glob, "*.js");
    assert!(scan.is_glob);
    assert!(!scan.negated);

    let scan = globsmith::scan("foo/bar/baz.js", &Options::default());
    assert_eq!(scan.base, "foo/bar/baz.js");
    assert!(!scan.is_glob);
}

#[test]
fn custom_range_expansion() {
    use std::sync::Arc;

    let options = Options {
        expand_range: Some(Arc::new(|args: &globsmith::range::RangeArgs<'_>, _: &Options| {
            let range = globsmith::range::to_regex_range(
                args.start.parse().unwrap_or(0),
                args.end.parse().unwrap_or(0),
            );
            format!("(?:{})", range)
        })),
        ..Options::default()
    };
    let pattern = expect!(globsmith::make_regex("log.{1..20000}", &options));
    assert!(pattern.is_match("log.12345"));
    assert!(!pattern.is_match("log.20001"));
    assert!(!pattern.is_match("log.0"));
}

#[cfg(feature = "miette")]
#[test]
fn group_error_diagnostic() {
    use miette::Diagnostic as _;

    let options = Options {
        strict_brackets: true,
        ..Options::default()
    };
    let error = globsmith::parse("a/(b", &options).unwrap_err();
    let code = error.code().map(|code| code.to_string());
    assert_eq!(code.as_deref(), Some("globsmith::pattern::group"));
    assert_eq!(error.labels().into_iter().flatten().count(), 1);
}
