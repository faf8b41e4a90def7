//! Brace range expansion.
//!
//! A brace range such as `{1..10}` or `{a..e..2}` is expanded into regular expression source
//! that the parser inserts verbatim. The default expansion enumerates every value as an
//! alternation; ranges over integers that are too large to enumerate are encoded as a compact
//! numeric range expression instead (see [`to_regex_range`]).

use itertools::Itertools as _;
use std::cmp;

use crate::encode;
use crate::options::Options;

/// The largest number of values that are enumerated by [`expand`].
pub const RANGE_LIMIT: u64 = 1000;

/// The operands of a brace range `{start..end..step}`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RangeArgs<'t> {
    pub start: &'t str,
    pub end: &'t str,
    pub step: Option<&'t str>,
}

impl<'t> RangeArgs<'t> {
    /// Recognizes range operands split from the body of a brace group.
    ///
    /// Operands must either both be integers or both be single characters. The optional step must
    /// be an integer.
    pub fn from_operands(operands: &[&'t str]) -> Option<Self> {
        let (start, end, step) = match *operands {
            [start, end] => (start, end, None),
            [start, end, step] => (start, end, Some(step)),
            _ => return None,
        };
        if let Some(step) = step {
            parse_integer(step)?;
        }
        let args = RangeArgs { start, end, step };
        args.kind().map(|_| args)
    }

    fn kind(&self) -> Option<RangeKind> {
        match (parse_integer(self.start), parse_integer(self.end)) {
            (Some(start), Some(end)) => Some(RangeKind::Integer { start, end }),
            _ => {
                let start = single_char(self.start)?;
                let end = single_char(self.end)?;
                Some(RangeKind::Character { start, end })
            },
        }
    }

    fn step(&self) -> u64 {
        self.step
            .and_then(parse_integer)
            .map(i64::unsigned_abs)
            .filter(|step| *step != 0)
            .unwrap_or(1)
    }

    /// Gets the width of zero-padded integer operands such as `01..10`.
    fn padding(&self) -> Option<usize> {
        fn is_padded(operand: &str) -> bool {
            let digits = operand.trim_start_matches('-');
            digits.len() > 1 && digits.starts_with('0')
        }

        (is_padded(self.start) || is_padded(self.end))
            .then(|| cmp::max(self.start.len(), self.end.len()))
    }
}

#[derive(Clone, Copy, Debug)]
enum RangeKind {
    Integer { start: i64, end: i64 },
    Character { start: char, end: char },
}

/// Expands a brace range using the hook in `options` or the default expansion.
pub fn expand_with(args: &RangeArgs<'_>, options: &Options) -> String {
    match options.expand_range {
        Some(ref expand_range) => expand_range(args, options),
        None => expand(args, options),
    }
}

/// The default range expansion.
///
/// Every value in the range is enumerated as an alternative. Unit-step character ranges are
/// encoded as a character class. Integer ranges with more than [`RANGE_LIMIT`] values are encoded
/// with [`to_regex_range`] when they have a unit step and no padding and are otherwise emitted as
/// the literal text of the range.
pub fn expand(args: &RangeArgs<'_>, options: &Options) -> String {
    let group = if options.capture { "(" } else { "(?:" };
    let Some(kind) = args.kind()
    else {
        return literal(args);
    };
    let step = args.step();
    match kind {
        RangeKind::Integer { start, end } => {
            let count = start.abs_diff(end) / step + 1;
            if count > RANGE_LIMIT {
                return if step == 1 && args.padding().is_none() {
                    let (min, max) = (cmp::min(start, end), cmp::max(start, end));
                    format!("{}{})", group, to_regex_range(min, max))
                }
                else {
                    literal(args)
                };
            }
            let padding = args.padding();
            let values = stepped(start, end, step).map(|value| pad(value, padding));
            format!("{}{})", group, values.format("|"))
        },
        RangeKind::Character { start, end } => {
            let (low, high) = (cmp::min(start, end), cmp::max(start, end));
            if step == 1 {
                let mut class = String::from("[");
                encode::push_class_escaped(&mut class, low);
                if low != high {
                    class.push('-');
                    encode::push_class_escaped(&mut class, high);
                }
                class.push(']');
                return format!("{}{})", group, class);
            }
            let values = stepped(start as i64, end as i64, step)
                .filter_map(|code| u32::try_from(code).ok().and_then(char::from_u32))
                .map(|c| encode::escape(&c.to_string()));
            format!("{}{})", group, values.format("|"))
        },
    }
}

/// Encodes an inclusive integer range as a compact regular expression without enumerating its
/// values.
///
/// The output has no enclosing group and uses only digits, classes, and counted repetition.
///
/// # Examples
///
/// ```rust
/// use globsmith::range;
///
/// assert_eq!(range::to_regex_range(1, 99), "[1-9]|[1-9][0-9]");
/// ```
pub fn to_regex_range(min: i64, max: i64) -> String {
    let (min, max) = (cmp::min(min, max), cmp::max(min, max));
    if min >= 0 {
        positive_range(min.unsigned_abs(), max.unsigned_abs())
    }
    else if max < 0 {
        format!(
            "-(?:{})",
            positive_range(max.unsigned_abs(), min.unsigned_abs()),
        )
    }
    else {
        format!(
            "-(?:{})|{}",
            positive_range(1, min.unsigned_abs()),
            positive_range(0, max.unsigned_abs()),
        )
    }
}

fn positive_range(min: u64, max: u64) -> String {
    let mut start = min;
    split_to_ranges(min, max)
        .into_iter()
        .map(|stop| {
            let pattern = range_to_pattern(start, stop);
            start = stop + 1;
            pattern
        })
        .join("|")
}

// Splits `min..=max` into subranges in which every value has the same number of digits and
// each digit position is either fixed, a class, or unconstrained.
fn split_to_ranges(min: u64, max: u64) -> Vec<u64> {
    fn fill_nines(n: u64, len: u32) -> u64 {
        match 10u64.checked_pow(len) {
            Some(power) => (n / power) * power + (power - 1),
            None => u64::MAX,
        }
    }

    fn fill_zeros(n: u64, len: u32) -> u64 {
        match 10u64.checked_pow(len) {
            Some(power) => n - (n % power),
            None => 0,
        }
    }

    let mut stops = vec![max];
    let mut nines = 1;
    let mut stop = fill_nines(min, nines);
    while min <= stop && stop <= max {
        stops.push(stop);
        nines += 1;
        if nines > 20 {
            break;
        }
        stop = fill_nines(min, nines);
    }
    let mut zeros = 1;
    stop = fill_zeros(max.saturating_add(1), zeros).saturating_sub(1);
    while min < stop && stop <= max {
        stops.push(stop);
        zeros += 1;
        if zeros > 20 {
            break;
        }
        stop = fill_zeros(max.saturating_add(1), zeros).saturating_sub(1);
    }
    stops.sort_unstable();
    stops.dedup();
    stops
}

fn range_to_pattern(start: u64, stop: u64) -> String {
    if start == stop {
        return start.to_string();
    }
    let (start, stop) = (start.to_string(), stop.to_string());
    let mut pattern = String::new();
    let mut unconstrained = 0usize;
    for (a, b) in start.chars().zip(stop.chars()) {
        if a == b {
            pattern.push(a);
        }
        else if a != '0' || b != '9' {
            pattern.push('[');
            pattern.push(a);
            if (b as u32) - (a as u32) > 1 {
                pattern.push('-');
            }
            pattern.push(b);
            pattern.push(']');
        }
        else {
            unconstrained += 1;
        }
    }
    match unconstrained {
        0 => {},
        1 => pattern.push_str("[0-9]"),
        n => {
            pattern.push_str("[0-9]");
            pattern.push_str(&format!("{{{}}}", n));
        },
    }
    pattern
}

fn stepped(start: i64, end: i64, step: u64) -> impl Iterator<Item = i64> {
    let count = start.abs_diff(end) / step + 1;
    let step = i64::try_from(step).unwrap_or(i64::MAX);
    let direction = if start <= end { step } else { -step };
    (0..count).scan(start, move |value, _| {
        let current = *value;
        *value = value.saturating_add(direction);
        Some(current)
    })
}

fn pad(value: i64, padding: Option<usize>) -> String {
    match padding {
        Some(width) if value < 0 => format!("-{:0>width$}", value.unsigned_abs(), width = width - 1),
        Some(width) => format!("{:0>width$}", value, width = width),
        None => value.to_string(),
    }
}

fn literal(args: &RangeArgs<'_>) -> String {
    let mut text = encode::escape(args.start);
    text.push_str("\\.\\.");
    text.push_str(&encode::escape(args.end));
    if let Some(step) = args.step {
        text.push_str("\\.\\.");
        text.push_str(&encode::escape(step));
    }
    text
}

fn parse_integer(text: &str) -> Option<i64> {
    let digits = text.strip_prefix('-').unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

fn single_char(text: &str) -> Option<char> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use regex::Regex;
    use rstest::rstest;

    use crate::options::Options;
    use crate::range::{self, RangeArgs};

    fn args<'t>(operands: &[&'t str]) -> RangeArgs<'t> {
        RangeArgs::from_operands(operands).expect("invalid range operands")
    }

    #[rstest]
    #[case::ascending(&["1", "3"], "(?:1|2|3)")]
    #[case::descending(&["3", "1"], "(?:3|2|1)")]
    #[case::stepped(&["1", "10", "3"], "(?:1|4|7|10)")]
    #[case::negative(&["-2", "1"], "(?:-2|-1|0|1)")]
    #[case::padded(&["01", "03"], "(?:01|02|03)")]
    #[case::characters(&["a", "e"], "(?:[a-e])")]
    #[case::stepped_characters(&["a", "e", "2"], "(?:a|c|e)")]
    fn expand_range_eq(#[case] operands: &[&str], #[case] expected: &str) {
        assert_eq!(range::expand(&args(operands), &Options::default()), expected);
    }

    #[rstest]
    #[case::empty(&[])]
    #[case::single(&["a"])]
    #[case::words(&["ab", "cd"])]
    #[case::mixed(&["a", "10"])]
    #[case::step(&["1", "5", "x"])]
    #[case::too_many(&["1", "2", "3", "4"])]
    fn reject_range_operands(#[case] operands: &[&str]) {
        assert!(RangeArgs::from_operands(operands).is_none());
    }

    #[test]
    fn expand_large_range_compactly() {
        let source = range::expand(&args(&["0", "100000"]), &Options::default());
        let regex = Regex::new(&format!("^{}$", source)).unwrap();

        assert!(regex.is_match("0"));
        assert!(regex.is_match("4711"));
        assert!(regex.is_match("100000"));
        assert!(!regex.is_match("100001"));
    }

    #[rstest]
    #[case(1, 99)]
    #[case(5, 5)]
    #[case(17, 1234)]
    #[case(-25, 13)]
    #[case(-300, -12)]
    fn to_regex_range_matches_exactly_the_range(#[case] min: i64, #[case] max: i64) {
        let regex = Regex::new(&format!("^(?:{})$", range::to_regex_range(min, max))).unwrap();
        for value in (min - 20)..=(max + 20) {
            assert_eq!(
                regex.is_match(&value.to_string()),
                (min..=max).contains(&value),
                "value `{}` in range `{}..{}`",
                value,
                min,
                max,
            );
        }
    }
}
