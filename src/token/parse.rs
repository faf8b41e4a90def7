use tracing::trace;

use crate::encode::{self, GlobChars};
use crate::options::Options;
use crate::range::{self, RangeArgs};
use crate::token::{fast, ExtglobKind, ParseState, Token, TokenKind};
use crate::{Delimiter, GlobError, GroupError};

// Whole expressions that are equivalent to a simpler expression.
const REPLACEMENTS: [(&str, &str); 3] = [("***", "*"), ("**/**", "**"), ("**/**/**", "**")];

/// Parses a glob expression into regular expression source.
///
/// The length of the expression is checked against [`Options::max_length`] before any character
/// is examined.
///
/// # Errors
///
/// Returns an error if the expression is empty, too long, or if [`Options::strict_brackets`] is
/// set and a group is never closed (or closed without being opened).
pub fn parse(expression: &str, options: &Options) -> Result<ParseState, GlobError> {
    let max = options.max_length();
    if expression.len() > max {
        return Err(GlobError::PatternTooLong {
            len: expression.len(),
            max,
        });
    }
    if expression.is_empty() {
        return Err(GlobError::InvalidPattern);
    }
    if options.fast_paths {
        if let Some(state) = fast::shape(expression, options) {
            trace!(expression, output = state.output.as_str(), "shape fast path");
            return Ok(state);
        }
    }
    Parser::new(expression, options).parse()
}

pub(super) fn replace(expression: &str) -> &str {
    REPLACEMENTS
        .iter()
        .find(|(pattern, _)| *pattern == expression)
        .map_or(expression, |(_, replacement)| *replacement)
}

#[derive(Debug)]
enum Group {
    Paren { token: usize },
    Extglob(ExtglobFrame),
    Brace(BraceFrame),
}

#[derive(Debug)]
struct ExtglobFrame {
    kind: ExtglobKind,
    // Kind of the token preceding the operator.
    prev: TokenKind,
    operator: usize,
    inner: String,
}

#[derive(Debug)]
struct BraceFrame {
    output_index: usize,
    tokens_index: usize,
    comma: bool,
    dots: bool,
    commas: Vec<usize>,
}

struct Parser<'o> {
    options: &'o Options,
    chars: &'static GlobChars,
    expression: String,
    input: Vec<char>,
    prefix: &'static str,
    // Index of the next character to read.
    pos: usize,
    start: usize,
    output: String,
    tokens: Vec<Token>,
    groups: Vec<Group>,
    brackets: usize,
    quoted: bool,
    backtrack: bool,
    negated: bool,
    negated_extglob: bool,
    globstar: bool,
    // Closing token of an optional extended glob at the start of a segment.
    optional_extglob: Option<usize>,
    star: String,
    has_backreference: bool,
}

impl<'o> Parser<'o> {
    fn new(expression: &str, options: &'o Options) -> Self {
        let chars = GlobChars::for_platform(options.windows);
        let replaced = replace(expression);
        let normalized = if options.windows {
            encode::normalize_windows_pattern(replaced)
        }
        else {
            replaced.to_owned()
        };
        let (prefix, body) = match normalized.strip_prefix("./") {
            Some(body) => ("./", body),
            None => ("", normalized.as_str()),
        };
        let mut star = if options.bash {
            chars.globstar(options.dot, options.capture)
        }
        else {
            chars.star.to_owned()
        };
        if options.capture {
            star = format!("({})", star);
        }
        let input: Vec<char> = body.chars().collect();
        let has_backreference = input
            .windows(2)
            .any(|pair| pair[0] == '\\' && matches!(pair[1], '1'..='9'));
        Parser {
            options,
            chars,
            expression: expression.to_owned(),
            input,
            prefix,
            pos: 0,
            start: 0,
            output: String::new(),
            tokens: vec![Token::with_output(TokenKind::Bos, "", "")],
            groups: Vec::new(),
            brackets: 0,
            quoted: false,
            backtrack: false,
            negated: false,
            negated_extglob: false,
            globstar: false,
            optional_extglob: None,
            star,
            has_backreference,
        }
    }

    fn parse(mut self) -> Result<ParseState, GlobError> {
        if self.options.fast_paths {
            if let Some(output) = fast::literal(&self.input, self.options, &self.star) {
                trace!(
                    expression = self.expression.as_str(),
                    output = output.as_str(),
                    "literal fast path",
                );
                self.output = output;
                return Ok(self.into_state(true));
            }
        }
        while let Some(c) = self.advance() {
            self.step(c)?;
        }
        self.finish()
    }

    fn step(&mut self, c: char) -> Result<(), GlobError> {
        if c == '\0' {
            return Ok(());
        }
        if c == '\\' {
            self.parse_escape();
            return Ok(());
        }
        if self.brackets > 0 && (c != ']' || matches!(self.prev().value.as_str(), "[" | "[^")) {
            self.parse_class_char(c);
            return Ok(());
        }
        if self.quoted && c != '"' {
            self.push(Token::with_output(
                TokenKind::Text,
                c.to_string(),
                encode::escape(&c.to_string()),
            ));
            return Ok(());
        }
        match c {
            '"' => {
                self.quoted = !self.quoted;
                if self.options.keep_quotes {
                    self.push(Token::new(TokenKind::Text, "\""));
                }
            },
            '(' => {
                let output = if self.options.capture
                    || self.has_backreference
                    || self.peek(1) == Some('?')
                {
                    "("
                }
                else {
                    "(?:"
                };
                self.groups.push(Group::Paren {
                    token: self.tokens.len(),
                });
                self.push(Token::with_output(TokenKind::Paren, "(", output));
            },
            ')' => self.close_paren()?,
            '[' => self.open_bracket()?,
            ']' => self.close_bracket()?,
            '{' if !self.options.no_brace => self.open_brace(),
            '}' => self.close_brace(),
            '|' => {
                // Alternation only within a paren or extended glob group.
                let output = if self.parens() > 0 { "|" } else { "\\|" };
                self.push(Token::with_output(TokenKind::Text, "|", output));
            },
            ',' => {
                let comma = self.tokens.len();
                let output = match self.groups.last_mut() {
                    Some(Group::Brace(frame)) => {
                        frame.comma = true;
                        frame.commas.push(comma);
                        "|"
                    },
                    _ => ",",
                };
                self.push(Token::with_output(TokenKind::Comma, ",", output));
            },
            '/' => {
                // Leading `./` segments are not part of the expression.
                if self.prev().kind == TokenKind::Dot && self.index() == self.start + 1 {
                    self.start = self.index() + 1;
                    self.output.clear();
                    self.tokens.pop();
                    return Ok(());
                }
                let slash = self.chars.slash_literal;
                self.push(Token::with_output(TokenKind::Slash, "/", slash));
            },
            '.' => self.parse_dot(),
            '?' => self.parse_qmark(),
            '!' => self.parse_bang(),
            '+' => self.parse_plus(),
            '@' => {
                if self.is_extglob_open() {
                    self.open_extglob(ExtglobKind::ExactlyOne, '@');
                }
                else {
                    self.push(Token::new(TokenKind::Text, "@"));
                }
            },
            '*' => self.parse_star(),
            _ => self.parse_text(c),
        }
        Ok(())
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.input.get(self.pos).copied();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    // Gets the character `n` positions after the current character.
    fn peek(&self, n: usize) -> Option<char> {
        self.input.get(self.pos + n - 1).copied()
    }

    fn index(&self) -> usize {
        self.pos.saturating_sub(1)
    }

    fn remaining(&self) -> &[char] {
        &self.input[self.pos..]
    }

    fn is_eos(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn prev(&self) -> &Token {
        &self.tokens[self.tokens.len() - 1]
    }

    fn prev_mut(&mut self) -> &mut Token {
        let last = self.tokens.len() - 1;
        &mut self.tokens[last]
    }

    fn braces(&self) -> usize {
        self.groups
            .iter()
            .filter(|group| matches!(group, Group::Brace(_)))
            .count()
    }

    fn parens(&self) -> usize {
        self.groups.len() - self.braces()
    }

    fn extglob_mut(&mut self) -> Option<&mut ExtglobFrame> {
        self.groups.iter_mut().rev().find_map(|group| match group {
            Group::Extglob(frame) => Some(frame),
            _ => None,
        })
    }

    fn has_extglob(&self) -> bool {
        self.groups
            .iter()
            .any(|group| matches!(group, Group::Extglob(_)))
    }

    // Truncates the output by `len` bytes, never splitting a character.
    fn truncate_output(&mut self, len: usize) {
        let mut at = self.output.len().saturating_sub(len);
        while !self.output.is_char_boundary(at) {
            at -= 1;
        }
        self.output.truncate(at);
    }

    fn push(&mut self, mut token: Token) {
        let prev = self.tokens.len() - 1;
        if self.tokens[prev].kind == TokenKind::Globstar {
            let is_brace = self.braces() > 0
                && matches!(token.kind, TokenKind::Comma | TokenKind::Brace);
            let is_extglob =
                token.is_extglob || (self.has_extglob() && token.kind == TokenKind::Paren);
            if !matches!(token.kind, TokenKind::Slash | TokenKind::Paren)
                && !is_brace
                && !is_extglob
            {
                // A globstar followed by anything but a separator is only a star.
                let len = self.tokens[prev].output().len();
                self.truncate_output(len);
                let star = self.star.clone();
                self.output.push_str(&star);
                let globstar = &mut self.tokens[prev];
                globstar.kind = TokenKind::Star;
                globstar.value = "*".into();
                globstar.output = Some(star);
            }
        }
        if token.kind != TokenKind::Paren {
            let value = token.value.clone();
            if let Some(extglob) = self.extglob_mut() {
                extglob.inner.push_str(&value);
            }
        }
        self.output.push_str(token.output());
        let prev = &mut self.tokens[prev];
        if prev.kind == TokenKind::Text && token.kind == TokenKind::Text {
            let output = format!("{}{}", prev.output(), token.output());
            prev.value.push_str(&token.value);
            prev.output = Some(output);
            return;
        }
        token.prev = Some(self.tokens.len() - 1);
        self.tokens.push(token);
    }

    fn into_state(self, fast_path: bool) -> ParseState {
        ParseState {
            input: self.expression,
            output: self.output,
            prefix: self.prefix,
            negated: self.negated,
            negated_extglob: self.negated_extglob,
            globstar: self.globstar,
            fast_path,
            tokens: self.tokens,
        }
    }

    fn group_error(&self, delimiter: Delimiter, index: usize) -> GlobError {
        let offset = self.prefix.len()
            + self.input[..index.min(self.input.len())]
                .iter()
                .map(|c| c.len_utf8())
                .sum::<usize>();
        GlobError::MalformedGroup(GroupError::new(
            self.expression.clone(),
            delimiter,
            offset,
        ))
    }
}

impl<'o> Parser<'o> {
    fn parse_escape(&mut self) {
        let next = match self.peek(1) {
            Some('/') if !self.options.bash => return,
            Some('.' | ';') => return,
            Some(next) => next,
            None => {
                self.push(Token::with_output(TokenKind::Text, "\\", "\\\\"));
                return;
            },
        };
        self.advance();
        let value = format!("\\{}", next);
        if self.brackets > 0 {
            let mut body = String::new();
            if !self.options.unescape
                && (encode::is_class_meta(next) || "dDwWsSnrtf".contains(next))
            {
                body.push('\\');
                body.push(next);
            }
            else {
                encode::push_class_escaped(&mut body, next);
            }
            self.append_class(&body);
            return;
        }
        let mut output = String::new();
        if self.options.unescape || !encode::is_regex_escape(next) {
            encode::push_escaped(&mut output, next);
        }
        else {
            output.push('\\');
            output.push(next);
        }
        self.push(Token::with_output(TokenKind::Text, value, output));
    }

    fn append_class(&mut self, body: &str) {
        self.prev_mut().value.push_str(body);
        self.output.push_str(body);
    }

    fn parse_class_char(&mut self, c: char) {
        if c == ':' && self.options.posix && self.parse_posix_class() {
            return;
        }
        let prev = self.prev().value.as_str();
        let body = match c {
            '[' if self.options.posix && self.peek(1) == Some(':') => "[".to_owned(),
            '[' => "\\[".to_owned(),
            '-' if self.peek(1) == Some(']') => "\\-".to_owned(),
            '-' => "-".to_owned(),
            ']' => "\\]".to_owned(),
            '!' if prev == "[" => "^".to_owned(),
            _ => {
                let mut body = String::new();
                encode::push_class_escaped(&mut body, c);
                if c == '^' && prev == "[" {
                    body = "^".to_owned();
                }
                body
            },
        };
        self.append_class(&body);
    }

    // Translates `[:name:]` within a bracket. Returns `false` if the text is not a POSIX class.
    fn parse_posix_class(&mut self) -> bool {
        let is_first = self.tokens.len() == 2;
        let prev = self.prev_mut();
        let (is_open, is_named) = {
            let inner = &prev.value[1..];
            (inner.contains('['), inner.contains(':'))
        };
        if !is_open {
            return false;
        }
        prev.is_posix = true;
        if !is_named {
            return false;
        }
        let Some(index) = prev.value.rfind('[')
        else {
            return false;
        };
        let Some(class) = prev
            .value
            .get(index + 2..)
            .and_then(encode::posix_class)
        else {
            return false;
        };
        prev.value = format!("{}{}", &prev.value[..index], class);
        self.backtrack = true;
        if self.peek(1) == Some(']') {
            self.advance();
        }
        let one_char = self.chars.one_char;
        let bos = &mut self.tokens[0];
        if is_first && bos.output().is_empty() {
            bos.output = Some(one_char.into());
        }
        true
    }

    fn open_bracket(&mut self) -> Result<(), GlobError> {
        if self.options.no_bracket || !self.remaining().contains(&']') {
            if !self.options.no_bracket && self.options.strict_brackets {
                return Err(self.group_error(Delimiter::Closing(']'), self.input.len()));
            }
            self.push(Token::new(TokenKind::Bracket, "\\["));
        }
        else {
            self.brackets += 1;
            self.push(Token::new(TokenKind::Bracket, "["));
        }
        Ok(())
    }

    fn close_bracket(&mut self) -> Result<(), GlobError> {
        if self.options.no_bracket {
            self.push(Token::with_output(TokenKind::Text, "]", "\\]"));
            return Ok(());
        }
        if self.brackets == 0 {
            if self.options.strict_brackets {
                return Err(self.group_error(Delimiter::Opening('['), self.index()));
            }
            self.push(Token::with_output(TokenKind::Text, "]", "\\]"));
            return Ok(());
        }
        self.brackets -= 1;
        let (body, is_posix) = {
            let prev = self.prev();
            (prev.value[1..].to_owned(), prev.is_posix)
        };
        let close = if !is_posix && body.starts_with('^') && !body.contains('/') {
            format!("{}]", self.chars.slash_class)
        }
        else {
            "]".to_owned()
        };
        self.append_class(&close);
        let is_segment_start = self.prev().prev.is_some_and(|index| {
            matches!(self.tokens[index].kind, TokenKind::Bos | TokenKind::Slash)
        });
        if body.starts_with('^') && is_segment_start {
            // A negated class matches `.` unless guarded.
            let guard = self.dot_guard();
            let bracket = self.prev_mut();
            bracket.value = format!("{}{}", guard, bracket.value);
            self.backtrack = true;
            return Ok(());
        }
        if self.options.literal_brackets == Some(false) || is_posix || encode::has_regex_chars(&body)
        {
            return Ok(());
        }
        // A bracket body without regex meaning may also be literal text such as `[abc]`.
        let class = self.prev().value.clone();
        let escaped = encode::escape(&class);
        self.truncate_output(class.len());
        let value = if self.options.literal_brackets == Some(true) {
            escaped
        }
        else {
            let group = if self.options.capture { "(" } else { "(?:" };
            format!("{}{}|{})", group, escaped, class)
        };
        self.output.push_str(&value);
        self.prev_mut().value = value;
        Ok(())
    }

    fn open_brace(&mut self) {
        let output = if self.options.capture { "(" } else { "(?:" };
        self.groups.push(Group::Brace(BraceFrame {
            output_index: self.output.len(),
            tokens_index: self.tokens.len(),
            comma: false,
            dots: false,
            commas: Vec::new(),
        }));
        self.push(Token::with_output(TokenKind::Brace, "{", output));
    }

    fn close_brace(&mut self) {
        let position = self
            .groups
            .iter()
            .rposition(|group| matches!(group, Group::Brace(_)));
        let Some(Group::Brace(frame)) = position.map(|position| self.groups.remove(position))
        else {
            self.push(Token::with_output(TokenKind::Text, "}", "\\}"));
            return;
        };
        if frame.dots && !frame.comma {
            if let Some(expansion) = self.expand_range(&frame) {
                self.tokens.truncate(frame.tokens_index);
                self.backtrack = true;
                self.push(Token::with_output(TokenKind::Brace, "}", expansion));
                return;
            }
        }
        if frame.comma {
            self.push(Token::with_output(TokenKind::Brace, "}", ")"));
            return;
        }
        // A group without alternatives or a valid range is literal text such as `{a}`.
        let mut at = frame.output_index.min(self.output.len());
        while !self.output.is_char_boundary(at) {
            at -= 1;
        }
        self.output.truncate(at);
        if let Some(open) = self.tokens.get_mut(frame.tokens_index) {
            open.value = "\\{".into();
            open.output = Some("\\{".into());
        }
        let literal: String = self
            .tokens
            .iter()
            .skip(frame.tokens_index)
            .map(Token::output)
            .collect();
        self.output.push_str(&literal);
        self.push(Token::with_output(TokenKind::Brace, "\\}", "\\}"));
    }

    fn expand_range(&self, frame: &BraceFrame) -> Option<String> {
        let mut operands = Vec::new();
        let mut is_operand = true;
        for token in self.tokens.iter().skip(frame.tokens_index + 1) {
            match token.kind {
                TokenKind::Dots if !is_operand => is_operand = true,
                TokenKind::Text if is_operand => {
                    operands.push(token.value.as_str());
                    is_operand = false;
                },
                _ => return None,
            }
        }
        if is_operand {
            return None;
        }
        RangeArgs::from_operands(&operands).map(|args| range::expand_with(&args, self.options))
    }

    fn close_paren(&mut self) -> Result<(), GlobError> {
        let position = self
            .groups
            .iter()
            .rposition(|group| !matches!(group, Group::Brace(_)));
        match position.map(|position| self.groups.remove(position)) {
            Some(Group::Extglob(frame)) => self.close_extglob(frame)?,
            Some(_) => self.push(Token::new(TokenKind::Paren, ")")),
            None => {
                if self.options.strict_brackets {
                    return Err(self.group_error(Delimiter::Opening('('), self.index()));
                }
                self.push(Token::with_output(TokenKind::Paren, ")", "\\)"));
            },
        }
        Ok(())
    }

    fn is_extglob_open(&self) -> bool {
        !self.options.no_extglob && self.peek(1) == Some('(') && self.peek(2) != Some('?')
    }

    fn open_extglob(&mut self, kind: ExtglobKind, operator: char) {
        let prev = self.prev().kind;
        let output = if self.output.is_empty() {
            self.chars.one_char
        }
        else {
            ""
        };
        let open = format!(
            "{}{}",
            if self.options.capture { "(" } else { "" },
            kind.open(),
        );
        let index = self.tokens.len();
        self.push(Token::with_output(
            TokenKind::Extglob(kind),
            operator.to_string(),
            output,
        ));
        self.advance();
        self.push(Token::with_output(TokenKind::Paren, "(", open).extglob());
        self.groups.push(Group::Extglob(ExtglobFrame {
            kind,
            prev,
            operator: index,
            inner: String::new(),
        }));
    }

    fn close_extglob(&mut self, frame: ExtglobFrame) -> Result<(), GlobError> {
        let mut output = frame.kind.close(self.chars.star);
        if frame.kind == ExtglobKind::Negate {
            let mut star = self.star.clone();
            if frame.inner.len() > 1 && frame.inner.contains('/') {
                star = self.chars.globstar(self.options.dot, self.options.capture);
            }
            let rest: String = self.remaining().iter().collect();
            if star != self.star || rest.is_empty() || rest.chars().all(|c| c == ')') {
                output = format!(")$)){}", star);
            }
            if frame.inner.contains('*') && is_extension(&rest) {
                let options = Options {
                    fast_paths: false,
                    ..self.options.clone()
                };
                let extension = parse(&rest, &options)?.output;
                output = format!("){}){})", extension, star);
            }
            if frame.prev == TokenKind::Bos {
                self.negated_extglob = true;
            }
        }
        if self.options.capture {
            output.push(')');
        }
        let is_segment_start = matches!(frame.prev, TokenKind::Bos | TokenKind::Slash);
        // Alternatives that begin with `.` match leading dots explicitly.
        let is_explicit_dot = frame.kind != ExtglobKind::Negate
            && frame.inner.split('|').any(|alternative| alternative.starts_with('.'));
        if is_segment_start && !is_explicit_dot {
            let guard = self.dot_guard();
            if let Some(operator) = self.tokens.get_mut(frame.operator) {
                operator.output = Some(format!("{}{}", guard, operator.output()));
                self.backtrack = true;
            }
        }
        self.push(Token::with_output(TokenKind::Paren, ")", output).extglob());
        if is_segment_start
            && matches!(frame.kind, ExtglobKind::ZeroOrOne | ExtglobKind::ZeroOrMore)
        {
            self.optional_extglob = Some(self.tokens.len() - 1);
        }
        Ok(())
    }

    fn parse_dot(&mut self) {
        if self.braces() > 0 && self.prev().kind == TokenKind::Dot {
            let dots = self.prev_mut();
            dots.kind = TokenKind::Dots;
            dots.value = "..".into();
            dots.output = Some("\\.\\.".into());
            self.output.push_str("\\.");
            if let Some(Group::Brace(frame)) = self
                .groups
                .iter_mut()
                .rev()
                .find(|group| matches!(group, Group::Brace(_)))
            {
                frame.dots = true;
            }
            return;
        }
        let dot = self.chars.dot_literal;
        let kind = if self.groups.is_empty()
            && !matches!(self.prev().kind, TokenKind::Bos | TokenKind::Slash)
        {
            TokenKind::Text
        }
        else {
            TokenKind::Dot
        };
        self.push(Token::with_output(kind, ".", dot));
    }

    fn parse_qmark(&mut self) {
        let is_group = self.prev().value == "(";
        if !is_group && self.is_extglob_open() {
            self.open_extglob(ExtglobKind::ZeroOrOne, '?');
            return;
        }
        if self.prev().kind == TokenKind::Paren {
            let next = self.peek(1);
            let is_escaped = (is_group && !matches!(next, Some('!' | '=' | '<' | ':')))
                || (next == Some('<') && !is_lookbehind_or_name(self.remaining()));
            let output = if is_escaped { "\\?" } else { "?" };
            self.push(Token::with_output(TokenKind::Text, "?", output));
            return;
        }
        let is_segment_start = matches!(self.prev().kind, TokenKind::Slash | TokenKind::Bos);
        let output = match (is_segment_start, self.options.dot) {
            (true, false) => self.chars.qmark_no_dot.to_owned(),
            (true, true) => format!("{}{}", self.chars.no_dots_slash, self.chars.qmark),
            _ => self.chars.qmark.to_owned(),
        };
        self.push(Token::with_output(TokenKind::Qmark, "?", output));
    }

    fn parse_bang(&mut self) {
        if !self.options.no_extglob
            && self.peek(1) == Some('(')
            && (self.peek(2) != Some('?') || !matches!(self.peek(3), Some('!' | '=' | '<' | ':')))
        {
            self.open_extglob(ExtglobKind::Negate, '!');
            return;
        }
        if !self.options.no_negate && self.index() == 0 {
            self.negate();
            return;
        }
        self.parse_text('!');
    }

    // Consumes a leading run of `!`. Each `!` toggles negation.
    fn negate(&mut self) {
        let mut count = 1;
        while self.peek(1) == Some('!')
            && (self.peek(2) != Some('(') || self.peek(3) == Some('?'))
        {
            self.advance();
            count += 1;
        }
        self.start = count;
        self.negated = count % 2 == 1;
    }

    fn parse_plus(&mut self) {
        if self.is_extglob_open() {
            self.open_extglob(ExtglobKind::OneOrMore, '+');
            return;
        }
        let plus = self.chars.plus_literal;
        self.push(Token::with_output(TokenKind::Plus, "+", plus));
    }

    fn parse_text(&mut self, c: char) {
        let mut value = c.to_string();
        let mut output = String::new();
        if matches!(c, '$' | '^' | '{') {
            output.push('\\');
        }
        output.push(c);
        while let Some(next) = self.peek(1).filter(|next| !is_special(*next)) {
            self.advance();
            value.push(next);
            output.push(next);
        }
        self.push(Token::with_output(TokenKind::Text, value, output));
    }
}

// Characters that end a run of literal text.
fn is_special(c: char) -> bool {
    matches!(
        c,
        '@' | '!'
            | '['
            | ']'
            | '.'
            | ','
            | '$'
            | '*'
            | '+'
            | '?'
            | '^'
            | '{'
            | '}'
            | '('
            | ')'
            | '|'
            | '\\'
            | '/'
            | '"'
            | '\0'
    )
}

// Recognizes `.ext` with no separators or further dots.
fn is_extension(text: &str) -> bool {
    text.strip_prefix('.').is_some_and(|extension| {
        !extension.is_empty() && !extension.contains(['\\', '/', '.'])
    })
}

// Recognizes `<!`, `<=`, or `<name>` following a group opening.
fn is_lookbehind_or_name(rest: &[char]) -> bool {
    match rest {
        ['<', '!' | '=', ..] => true,
        ['<', rest @ ..] => {
            let name = rest
                .iter()
                .take_while(|c| c.is_alphanumeric() || **c == '_')
                .count();
            name > 0 && rest.get(name) == Some(&'>')
        },
        _ => false,
    }
}

impl<'o> Parser<'o> {
    fn globstar_source(&self) -> String {
        self.chars.globstar(self.options.dot, self.options.capture)
    }

    fn parse_star(&mut self) {
        let prev = self.tokens.len() - 1;
        if self.tokens[prev].kind == TokenKind::Globstar || self.tokens[prev].is_star_run {
            let star = self.star.clone();
            let token = &mut self.tokens[prev];
            token.kind = TokenKind::Star;
            token.is_star_run = true;
            token.value.push('*');
            token.output = Some(star);
            self.backtrack = true;
            self.globstar = true;
            return;
        }
        if !self.options.no_extglob
            && self.peek(1) == Some('(')
            && self.peek(2).is_some_and(|c| c != '?')
        {
            self.open_extglob(ExtglobKind::ZeroOrMore, '*');
            return;
        }
        if self.tokens[prev].kind == TokenKind::Star {
            self.parse_globstar(prev);
            return;
        }
        let kind = self.tokens[prev].kind;
        let guard = if self.index() == self.start
            || matches!(kind, TokenKind::Slash | TokenKind::Dot)
        {
            // A star at the start of a segment never matches `.` or `..` (nor any leading dot
            // unless `dot` is set).
            let mut guard = String::from(if kind == TokenKind::Dot {
                self.chars.no_dot_slash
            }
            else {
                self.dot_guard()
            });
            if self.peek(1) != Some('*') {
                guard.push_str(self.chars.one_char);
            }
            Some(guard)
        }
        else if self.optional_extglob == Some(prev) {
            // An optional extended glob may match nothing, leaving this star at the start of
            // the segment.
            Some(self.dot_guard().to_owned())
        }
        else {
            None
        };
        if let Some(guard) = guard {
            self.output.push_str(&guard);
            let token = &mut self.tokens[prev];
            token.output = Some(format!("{}{}", token.output(), guard));
        }
        let star = if self.options.bash {
            if self.options.capture { "(.*?)".to_owned() } else { ".*?".to_owned() }
        }
        else {
            self.star.clone()
        };
        self.push(Token::with_output(TokenKind::Star, "*", star));
    }

    // Rejects a leading `.` at the start of a segment, or only `.` and `..` segments if `dot` is
    // set.
    fn dot_guard(&self) -> &'static str {
        if self.options.dot {
            self.chars.no_dots_slash
        }
        else {
            self.chars.no_dot
        }
    }

    // Parses the second star of `**`. `prev` is the index of the first star.
    fn parse_globstar(&mut self, prev: usize) {
        if self.options.no_globstar {
            return;
        }
        let prior = self.tokens[prev].prev.unwrap_or(0);
        let prior_kind = self.tokens[prior].kind;
        let before_kind = self.tokens[prior].prev.map(|before| self.tokens[before].kind);
        let is_start = matches!(prior_kind, TokenKind::Slash | TokenKind::Bos);
        let is_after_star = matches!(before_kind, Some(TokenKind::Star | TokenKind::Globstar));
        let is_after_bos = before_kind == Some(TokenKind::Bos);
        let next = self.peek(1);
        if self.options.bash && (!is_start || next.is_some_and(|c| c != '/')) {
            self.push(Token::with_output(TokenKind::Star, "*", ""));
            return;
        }
        let is_brace = self.braces() > 0 && matches!(prior_kind, TokenKind::Comma | TokenKind::Brace);
        let is_extglob = self.has_extglob() && prior_kind == TokenKind::Paren;
        if !is_start && prior_kind != TokenKind::Paren && !is_brace && !is_extglob {
            self.push(Token::with_output(TokenKind::Star, "*", ""));
            return;
        }
        // Consecutive `/**` segments are redundant.
        while self.remaining().starts_with(&['/', '*', '*'])
            && self.input.get(self.pos + 3).map_or(true, |c| *c == '/')
        {
            self.pos += 3;
        }
        let globstar = self.globstar_source();
        let slash = self.chars.slash_literal;
        let rest = self.remaining().first().copied();
        self.globstar = true;
        if prior_kind == TokenKind::Bos && self.is_eos() {
            self.output = format!("{}{}", self.tokens[0].output(), globstar);
            self.promote_globstar(prev, globstar);
        }
        else if prior_kind == TokenKind::Slash && !is_after_bos && !is_after_star && self.is_eos()
        {
            let len = self.tokens[prior].output().len() + self.tokens[prev].output().len();
            self.truncate_output(len);
            let open = format!("(?:{}", self.tokens[prior].output());
            let output = format!(
                "{}{}",
                globstar,
                if self.options.strict_slashes { ")" } else { "|$)" },
            );
            self.output.push_str(&open);
            self.output.push_str(&output);
            self.tokens[prior].output = Some(open);
            self.promote_globstar(prev, output);
        }
        else if prior_kind == TokenKind::Slash && !is_after_bos && rest == Some('/') {
            let end = if self.remaining().len() > 1 { "|$" } else { "" };
            let len = self.tokens[prior].output().len() + self.tokens[prev].output().len();
            self.truncate_output(len);
            let open = format!("(?:{}", self.tokens[prior].output());
            let output = format!("{0}{1}|{1}{2})", globstar, slash, end);
            self.output.push_str(&open);
            self.output.push_str(&output);
            self.tokens[prior].output = Some(open);
            self.promote_globstar(prev, output);
            self.advance();
            self.push(Token::with_output(TokenKind::Slash, "/", ""));
        }
        else if prior_kind == TokenKind::Bos && rest == Some('/') {
            let output = format!("(?:^|{0}|{1}{0})", slash, globstar);
            self.output = format!("{}{}", self.tokens[0].output(), output);
            self.promote_globstar(prev, output);
            self.advance();
            self.push(Token::with_output(TokenKind::Slash, "/", ""));
        }
        else {
            let len = self.tokens[prev].output().len();
            self.truncate_output(len);
            self.output.push_str(&globstar);
            self.promote_globstar(prev, globstar);
        }
    }

    fn promote_globstar(&mut self, index: usize, output: String) {
        let token = &mut self.tokens[index];
        token.kind = TokenKind::Globstar;
        token.value.push('*');
        token.output = Some(output);
    }

    fn finish(mut self) -> Result<ParseState, GlobError> {
        let end = self.input.len();
        if self.brackets > 0 {
            if self.options.strict_brackets {
                return Err(self.group_error(Delimiter::Closing(']'), end));
            }
            if let Some(bracket) = self
                .tokens
                .iter_mut()
                .rev()
                .find(|token| token.kind == TokenKind::Bracket)
            {
                bracket.value = encode::escape(&bracket.value);
            }
            self.brackets = 0;
            self.backtrack = true;
        }
        while let Some(group) = self.groups.pop() {
            if self.options.strict_brackets {
                let delimiter = match group {
                    Group::Brace(_) => Delimiter::Closing('}'),
                    _ => Delimiter::Closing(')'),
                };
                return Err(self.group_error(delimiter, end));
            }
            // Unclosed groups are literal text.
            match group {
                Group::Paren { token } => {
                    if let Some(token) = self.tokens.get_mut(token) {
                        token.output = Some("\\(".into());
                    }
                },
                Group::Extglob(frame) => {
                    if let Some(operator) = self.tokens.get_mut(frame.operator) {
                        operator.output = Some(encode::escape(&operator.value));
                    }
                    if let Some(paren) = self.tokens.get_mut(frame.operator + 1) {
                        paren.output = Some("\\(".into());
                    }
                },
                Group::Brace(frame) => {
                    if let Some(brace) = self.tokens.get_mut(frame.tokens_index) {
                        brace.output = Some("\\{".into());
                    }
                    for comma in frame.commas {
                        if let Some(comma) = self.tokens.get_mut(comma) {
                            comma.output = Some(",".into());
                        }
                    }
                },
            }
            self.backtrack = true;
        }
        if !self.options.strict_slashes
            && matches!(self.prev().kind, TokenKind::Star | TokenKind::Bracket)
        {
            let output = format!("{}?", self.chars.slash_literal);
            self.push(Token::with_output(TokenKind::MaybeSlash, "", output));
        }
        if self.backtrack {
            trace!(
                expression = self.expression.as_str(),
                "rebuilding output from tokens",
            );
            self.output = self.tokens.iter().map(Token::output).collect();
        }
        Ok(self.into_state(false))
    }
}
