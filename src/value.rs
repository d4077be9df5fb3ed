//! Template argument values and invariant formatting
//!
//! [`Value`] is what a message template substitutes into its placeholders.
//! Format specifiers written after `:` in a placeholder are interpreted here,
//! independently of any locale: numbers use `.` as decimal separator and `,`
//! as group separator, and month/day names are English.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike, Utc};
use std::fmt;

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// A value substituted into a message template.
///
/// Primitive values, strings and `chrono` dates convert with `From`. Any other
/// type can be passed through [`Value::display`] or [`Value::debug`]; those
/// ignore format specifiers.
///
/// # Example
///
/// ```
/// use logbridge::Value;
///
/// assert_eq!(Value::from(1234.5).format_with(Some("N1")), "1,234.5");
/// assert_eq!(Value::from(42).format_with(Some("D5")), "00042");
/// assert_eq!(Value::from("text").format_with(Some("ignored")), "text");
/// ```
#[derive(Clone, Copy)]
pub enum Value<'a> {
    /// Borrowed string
    Str(&'a str),
    /// Boolean
    Bool(bool),
    /// Single character
    Char(char),
    /// Signed integer
    I64(i64),
    /// Unsigned integer
    U64(u64),
    /// Floating point number
    F64(f64),
    /// Calendar date
    Date(NaiveDate),
    /// Date and time without offset
    DateTime(NaiveDateTime),
    /// Anything implementing `Display`
    Display(&'a dyn fmt::Display),
    /// Anything implementing `Debug`
    Debug(&'a dyn fmt::Debug),
}

impl<'a> Value<'a> {
    /// Wrap a `Display` value
    pub fn display(value: &'a dyn fmt::Display) -> Self {
        Value::Display(value)
    }

    /// Wrap a `Debug` value
    pub fn debug(value: &'a dyn fmt::Debug) -> Self {
        Value::Debug(value)
    }

    /// Render the value, honoring an optional format specifier.
    ///
    /// Unknown specifiers fall back to the default rendering.
    pub fn format_with(&self, format: Option<&str>) -> String {
        let Some(spec) = format.filter(|s| !s.is_empty()) else {
            return self.to_string();
        };

        let formatted = match *self {
            Value::I64(v) => format_number(Number::Int(i128::from(v)), spec),
            Value::U64(v) => format_number(Number::Int(i128::from(v)), spec),
            Value::F64(v) => format_number(Number::Float(v), spec),
            Value::Date(d) => d.and_hms_opt(0, 0, 0).map(|dt| format_date_time(dt, spec)),
            Value::DateTime(dt) => Some(format_date_time(dt, spec)),
            _ => None,
        };

        formatted.unwrap_or_else(|| self.to_string())
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(v) => f.write_str(v),
            Value::Bool(v) => fmt::Display::fmt(v, f),
            Value::Char(v) => fmt::Display::fmt(v, f),
            Value::I64(v) => fmt::Display::fmt(v, f),
            Value::U64(v) => fmt::Display::fmt(v, f),
            Value::F64(v) => fmt::Display::fmt(v, f),
            Value::Date(v) => fmt::Display::fmt(v, f),
            Value::DateTime(v) => fmt::Display::fmt(v, f),
            Value::Display(v) => fmt::Display::fmt(*v, f),
            Value::Debug(v) => fmt::Debug::fmt(*v, f),
        }
    }
}

impl fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(v) => f.debug_tuple("Str").field(v).finish(),
            Value::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            Value::Char(v) => f.debug_tuple("Char").field(v).finish(),
            Value::I64(v) => f.debug_tuple("I64").field(v).finish(),
            Value::U64(v) => f.debug_tuple("U64").field(v).finish(),
            Value::F64(v) => f.debug_tuple("F64").field(v).finish(),
            Value::Date(v) => f.debug_tuple("Date").field(v).finish(),
            Value::DateTime(v) => f.debug_tuple("DateTime").field(v).finish(),
            Value::Display(v) => write!(f, "Display({})", v),
            Value::Debug(v) => write!(f, "Debug({:?})", v),
        }
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl<'a> From<&'a str> for Value<'a> {
    fn from(v: &'a str) -> Self {
        Value::Str(v)
    }
}

impl<'a> From<&'a String> for Value<'a> {
    fn from(v: &'a String) -> Self {
        Value::Str(v.as_str())
    }
}

impl<'a> From<&'a &'a str> for Value<'a> {
    fn from(v: &'a &'a str) -> Self {
        Value::Str(v)
    }
}

macro_rules! value_from {
    ($variant:ident, $target:ty, [$($source:ty),*]) => {
        $(
            impl From<$source> for Value<'_> {
                fn from(v: $source) -> Self {
                    Value::$variant(v as $target)
                }
            }

            impl From<&$source> for Value<'_> {
                fn from(v: &$source) -> Self {
                    Value::$variant(*v as $target)
                }
            }
        )*
    };
}

value_from!(I64, i64, [i8, i16, i32, i64, isize]);
value_from!(U64, u64, [u8, u16, u32, u64, usize]);
value_from!(F64, f64, [f32, f64]);

impl From<bool> for Value<'_> {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<char> for Value<'_> {
    fn from(v: char) -> Self {
        Value::Char(v)
    }
}

impl From<NaiveDate> for Value<'_> {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<NaiveDateTime> for Value<'_> {
    fn from(v: NaiveDateTime) -> Self {
        Value::DateTime(v)
    }
}

impl From<DateTime<Utc>> for Value<'_> {
    fn from(v: DateTime<Utc>) -> Self {
        Value::DateTime(v.naive_utc())
    }
}

// ============================================================================
// Numbers
// ============================================================================

#[derive(Debug, Clone, Copy)]
enum Number {
    Int(i128),
    Float(f64),
}

impl Number {
    fn as_f64(self) -> f64 {
        match self {
            Number::Int(v) => v as f64,
            Number::Float(v) => v,
        }
    }
}

/// Largest precision a standard numeric specifier accepts, and the most digit
/// placeholders a custom pattern may carry on either side of the point
pub const MAX_PRECISION: usize = 99;

fn format_number(number: Number, spec: &str) -> Option<String> {
    if let Some((kind, precision)) = parse_standard_spec(spec) {
        return format_standard(number, kind, precision);
    }
    if spec.chars().all(|c| matches!(c, '0' | '#' | ',' | '.')) {
        return format_custom(number, spec);
    }
    None
}

/// Left-pad the digits of `text` with zeros to `width`, keeping a leading sign
fn zero_pad(text: &str, width: usize) -> String {
    let (sign, digits) = text
        .strip_prefix('-')
        .map_or(("", text), |rest| ("-", rest));
    let zeros = width.saturating_sub(digits.len());
    let mut out = String::with_capacity(sign.len() + zeros + digits.len());
    out.push_str(sign);
    out.extend(std::iter::repeat('0').take(zeros));
    out.push_str(digits);
    out
}

/// `X12` -> (`'X'`, `Some(12)`)
fn parse_standard_spec(spec: &str) -> Option<(char, Option<usize>)> {
    let mut chars = spec.chars();
    let kind = chars.next().filter(char::is_ascii_alphabetic)?;
    let rest = chars.as_str();
    if rest.is_empty() {
        return Some((kind, None));
    }
    if !rest.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    // Out-of-range precisions make the specifier unknown
    rest.parse()
        .ok()
        .filter(|p| *p <= MAX_PRECISION)
        .map(|p| (kind, Some(p)))
}

fn format_standard(number: Number, kind: char, precision: Option<usize>) -> Option<String> {
    match (kind, number) {
        ('D' | 'd', Number::Int(v)) => {
            Some(zero_pad(&v.to_string(), precision.unwrap_or(0)))
        }
        ('X' | 'x', Number::Int(v)) => {
            // Negative values render as two's complement of a 64-bit integer
            let bits = if v < 0 { u128::from(v as i64 as u64) } else { v as u128 };
            let hex = zero_pad(&format!("{:x}", bits), precision.unwrap_or(0));
            Some(if kind == 'X' { hex.to_uppercase() } else { hex })
        }
        ('F' | 'f', n) => Some(fixed(n, precision.unwrap_or(2))),
        ('N' | 'n', n) => Some(group_fixed(&fixed(n, precision.unwrap_or(2)))),
        ('P' | 'p', n) => Some(format!(
            "{} %",
            fixed(Number::Float(n.as_f64() * 100.0), precision.unwrap_or(2))
        )),
        ('E' | 'e', n) => Some(exponential(n.as_f64(), precision.unwrap_or(6), kind)),
        ('G' | 'g', Number::Int(v)) => Some(v.to_string()),
        ('G' | 'g', Number::Float(v)) => Some(v.to_string()),
        _ => None,
    }
}

fn fixed(number: Number, precision: usize) -> String {
    match number {
        Number::Int(v) if precision == 0 => v.to_string(),
        Number::Int(v) => format!("{}.{}", v, "0".repeat(precision)),
        Number::Float(v) => format!("{:.*}", precision, v),
    }
}

/// Insert `,` between groups of three integer digits.
fn group_fixed(text: &str) -> String {
    let (sign, unsigned) = text
        .strip_prefix('-')
        .map_or(("", text), |rest| ("-", rest));
    let (int_part, frac_part) = unsigned
        .split_once('.')
        .map_or((unsigned, None), |(i, f)| (i, Some(f)));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}

/// `1234.5` with `E3` -> `1.235E+003`
fn exponential(value: f64, precision: usize, kind: char) -> String {
    let rendered = format!("{:.*e}", precision, value);
    let Some((mantissa, exponent)) = rendered.split_once('e') else {
        return rendered;
    };
    let (exp_sign, exp_digits) = exponent
        .strip_prefix('-')
        .map_or(('+', exponent), |digits| ('-', digits));
    let marker = if kind == 'E' { 'E' } else { 'e' };
    format!("{}{}{}{:0>3}", mantissa, marker, exp_sign, exp_digits)
}

/// Custom numeric patterns built from `0`, `#`, `,` and `.`.
///
/// Integers are laid out from their exact digits; floats are rounded to the
/// pattern's decimal places first.
fn format_custom(number: Number, pattern: &str) -> Option<String> {
    let (int_pattern, frac_pattern) = pattern
        .split_once('.')
        .map_or((pattern, ""), |(i, f)| (i, f));

    let max_decimals = frac_pattern.chars().filter(|c| matches!(c, '0' | '#')).count();
    let min_decimals = frac_pattern.chars().filter(|c| *c == '0').count();
    let min_int_digits = int_pattern.chars().filter(|c| *c == '0').count();
    let grouping = int_pattern.contains(',');
    if max_decimals > MAX_PRECISION || min_int_digits > MAX_PRECISION {
        return None;
    }

    let (negative, int_digits, mut frac) = match number {
        Number::Int(v) => (v < 0, v.unsigned_abs().to_string(), "0".repeat(min_decimals)),
        Number::Float(v) => {
            let rounded = format!("{:.*}", max_decimals, v.abs());
            let (int_digits, frac_digits) = rounded
                .split_once('.')
                .map_or((rounded.as_str(), ""), |(i, f)| (i, f));
            (v < 0.0, int_digits.to_string(), frac_digits.to_string())
        }
    };

    while frac.len() > min_decimals && frac.ends_with('0') {
        frac.pop();
    }

    let mut int_text = if min_int_digits == 0 && int_digits == "0" {
        String::new()
    } else {
        zero_pad(&int_digits, min_int_digits)
    };
    if grouping && !int_text.is_empty() {
        int_text = group_fixed(&int_text);
    }

    let is_zero = int_text.trim_start_matches('0').is_empty() && frac.trim_matches('0').is_empty();
    let sign = if negative && !is_zero { "-" } else { "" };

    Some(if frac.is_empty() {
        format!("{}{}", sign, int_text)
    } else {
        format!("{}{}.{}", sign, int_text, frac)
    })
}

// ============================================================================
// Dates
// ============================================================================

fn expand_standard_date_spec(spec: &str) -> Option<&'static str> {
    let pattern = match spec {
        "d" => "MM/dd/yyyy",
        "D" => "dddd, dd MMMM yyyy",
        "f" => "dddd, dd MMMM yyyy HH:mm",
        "F" => "dddd, dd MMMM yyyy HH:mm:ss",
        "g" => "MM/dd/yyyy HH:mm",
        "G" => "MM/dd/yyyy HH:mm:ss",
        "M" | "m" => "MMMM dd",
        "o" | "O" => "yyyy'-'MM'-'dd'T'HH':'mm':'ss'.'fffffff",
        "s" => "yyyy'-'MM'-'dd'T'HH':'mm':'ss",
        "t" => "HH:mm",
        "T" => "HH:mm:ss",
        "u" => "yyyy'-'MM'-'dd HH':'mm':'ss'Z'",
        "Y" | "y" => "yyyy MMMM",
        _ => return None,
    };
    Some(pattern)
}

fn format_date_time(dt: NaiveDateTime, spec: &str) -> String {
    let pattern = expand_standard_date_spec(spec).unwrap_or(spec);
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() + 8);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let run = chars[i..].iter().take_while(|&&x| x == c).count();

        match c {
            'y' => {
                let year = dt.year();
                match run {
                    1 => out.push_str(&(year % 100).to_string()),
                    2 => out.push_str(&format!("{:02}", year % 100)),
                    n => out.push_str(&zero_pad(&year.to_string(), n)),
                }
            }
            'M' => {
                let month = dt.month() as usize;
                match run {
                    1 => out.push_str(&month.to_string()),
                    2 => out.push_str(&format!("{:02}", month)),
                    3 => out.push_str(&MONTHS[month - 1][..3]),
                    _ => out.push_str(MONTHS[month - 1]),
                }
            }
            'd' => {
                let weekday = dt.weekday().num_days_from_monday() as usize;
                match run {
                    1 => out.push_str(&dt.day().to_string()),
                    2 => out.push_str(&format!("{:02}", dt.day())),
                    3 => out.push_str(&WEEKDAYS[weekday][..3]),
                    _ => out.push_str(WEEKDAYS[weekday]),
                }
            }
            'H' => push_padded(&mut out, dt.hour(), run),
            'h' => {
                let hour = match dt.hour() % 12 {
                    0 => 12,
                    h => h,
                };
                push_padded(&mut out, hour, run);
            }
            'm' => push_padded(&mut out, dt.minute(), run),
            's' => push_padded(&mut out, dt.second(), run),
            'f' | 'F' => {
                let digits = run.min(9);
                let nanos = dt.nanosecond() % 1_000_000_000;
                let scaled = nanos / 10u32.pow(9 - digits as u32);
                let mut fraction = format!("{:0width$}", scaled, width = digits);
                if c == 'F' {
                    fraction = fraction.trim_end_matches('0').to_string();
                }
                out.push_str(&fraction);
            }
            't' => {
                let designator = if dt.hour() < 12 { "AM" } else { "PM" };
                out.push_str(if run == 1 { &designator[..1] } else { designator });
            }
            '\'' | '"' => {
                let close = chars[i + 1..].iter().position(|&x| x == c);
                let end = close.map_or(chars.len(), |p| i + 1 + p);
                out.extend(&chars[i + 1..end]);
                i = (end + 1).min(chars.len());
                continue;
            }
            '\\' => {
                if let Some(next) = chars.get(i + 1) {
                    out.push(*next);
                }
                i += 2;
                continue;
            }
            '%' => {
                i += 1;
                continue;
            }
            _ => {
                out.push(c);
                i += 1;
                continue;
            }
        }

        i += run;
    }

    out
}

fn push_padded(out: &mut String, value: u32, run: usize) {
    if run == 1 {
        out.push_str(&value.to_string());
    } else {
        out.push_str(&format!("{:02}", value));
    }
}

// ============================================================================
// Tests
// ============================================================================
