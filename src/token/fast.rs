//! Fast paths that emit regular expression source without tokenizing.
//!
//! Each fast path emits the same source as the parser for the expressions that it recognizes.

use itertools::Itertools as _;

use crate::encode::{self, GlobChars};
use crate::options::Options;
use crate::token::parse;
use crate::token::ParseState;

/// Emits source for common expressions that begin with `*` or `.`, such as `*.js` or `**/*`.
pub fn shape(expression: &str, options: &Options) -> Option<ParseState> {
    if !expression.starts_with(['*', '.']) || (options.windows && expression.contains('\\')) {
        return None;
    }
    let replaced = parse::replace(expression);
    let (prefix, body) = match replaced.strip_prefix("./") {
        Some(body) => ("./", body),
        None => ("", replaced),
    };
    let output = create(body, options)?;
    Some(ParseState {
        input: expression.to_owned(),
        output,
        prefix,
        negated: false,
        negated_extglob: false,
        globstar: body.contains("**") && !options.no_globstar,
        fast_path: true,
        tokens: Vec::new(),
    })
}

fn create(body: &str, options: &Options) -> Option<String> {
    let chars = GlobChars::for_platform(options.windows);
    let mut extensions = Vec::<&str>::new();
    let mut shape = body;
    loop {
        if let Some(mut output) = shape_source(shape, options) {
            if extensions.is_empty() {
                // Only a trailing star admits a trailing separator.
                if shape != "**" && !options.strict_slashes {
                    output.push_str(chars.slash_literal);
                    output.push('?');
                }
                return Some(output);
            }
            // `**.ext` is not a globstar.
            if shape == "**" {
                return None;
            }
            for extension in extensions.iter().rev() {
                output.push_str(chars.dot_literal);
                output.push_str(extension);
            }
            return Some(output);
        }
        let (rest, extension) = shape.rsplit_once('.')?;
        if extension.is_empty()
            || !extension
                .bytes()
                .all(|byte| byte.is_ascii_alphanumeric() || byte == b'_')
        {
            return None;
        }
        extensions.push(extension);
        shape = rest;
    }
}

// Emits the same source as the parser for each shape.
fn shape_source(shape: &str, options: &Options) -> Option<String> {
    if options.no_globstar && shape.contains("**") {
        return None;
    }
    let chars = GlobChars::for_platform(options.windows);
    let (dot, slash, one_char) = (chars.dot_literal, chars.slash_literal, chars.one_char);
    let no_dot_slash = chars.no_dot_slash;
    let nodot = if options.dot {
        chars.no_dots_slash
    }
    else {
        chars.no_dot
    };
    let star = match (options.bash, options.capture) {
        (true, true) => "(.*?)".to_owned(),
        (true, false) => ".*?".to_owned(),
        (false, true) => format!("({})", chars.star),
        (false, false) => chars.star.to_owned(),
    };
    let globstar = chars.globstar(options.dot, options.capture);
    let leading = format!("{nodot}(?:^|{slash}|{globstar}{slash})");
    Some(match shape {
        "*" => format!("{nodot}{one_char}{star}"),
        ".*" => format!("{dot}{no_dot_slash}{one_char}{star}"),
        "*.*" => format!("{nodot}{one_char}{star}{dot}{star}"),
        "*/*" => format!("{nodot}{one_char}{star}{slash}{nodot}{one_char}{star}"),
        "**" => format!("{nodot}{globstar}"),
        "**/*" => format!("{leading}{nodot}{one_char}{star}"),
        "**/*.*" => format!("{leading}{nodot}{one_char}{star}{dot}{star}"),
        "**/.*" => format!("{leading}{dot}{no_dot_slash}{one_char}{star}"),
        _ => return None,
    })
}

/// Translates an expression without separators or groups character by character.
pub fn literal(input: &[char], options: &Options, star: &str) -> Option<String> {
    let is_literal = !options.bash
        && !matches!(input, ['*' | '!', ..] | ['.', '*', ..])
        && !input.iter().any(|c| {
            matches!(
                c,
                '/' | '\\' | '(' | ')' | '[' | ']' | '{' | '}' | '"' | '|' | '\0'
            )
        });
    if !is_literal {
        return None;
    }
    let chars = GlobChars::for_platform(options.windows);
    let mut output = String::with_capacity(input.len());
    let mut position = 0;
    for (count, c) in input.iter().copied().dedup_with_count() {
        match c {
            '?' => {
                for index in position..(position + count) {
                    match (index, options.dot) {
                        (0, false) => output.push_str(chars.qmark_no_dot),
                        (0, true) => {
                            output.push_str(chars.no_dots_slash);
                            output.push_str(chars.qmark);
                        },
                        _ => output.push_str(chars.qmark),
                    }
                }
            },
            '.' => {
                for _ in 0..count {
                    output.push_str(chars.dot_literal);
                }
            },
            '*' => output.push_str(star),
            c => {
                for _ in 0..count {
                    encode::push_escaped(&mut output, c);
                }
            },
        }
        position += count;
    }
    if input.last() == Some(&'*') && !options.strict_slashes {
        output.push_str(chars.slash_literal);
        output.push('?');
    }
    Some(output)
}
