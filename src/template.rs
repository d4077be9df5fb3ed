//! Structured message templates
//!
//! Templates look like `"User {user} logged in from {address,15:G}"`. Every
//! distinct placeholder name is assigned a positional argument slot in order of
//! first occurrence, so the same name always resolves to the same argument.
//!
//! Placeholder grammar: `{` `@`? name (`,` alignment)? (`:` format)? `}`.
//! A name made only of ASCII digits is an explicit position. `{{` and `}}` are
//! literal braces; a brace that does not form a valid placeholder is kept as
//! text. So is a placeholder whose alignment exceeds [`MAX_ALIGNMENT`].

use crate::error::FormatMismatch;
use crate::value::Value;

/// Widest accepted alignment; a wider one leaves the placeholder as text
pub const MAX_ALIGNMENT: u32 = 999_999;

/// One placeholder occurrence in a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    /// Name as written, without the destructure marker
    pub name: String,
    /// Field width; negative left-aligns
    pub alignment: Option<i32>,
    /// Format specifier handed to [`Value::format_with`]
    pub format: Option<String>,
    /// Whether the name was prefixed with `@`
    pub destructure: bool,
}

impl Placeholder {
    /// Whether the name is an explicit argument position.
    pub fn is_positional(&self) -> bool {
        self.name.bytes().all(|b| b.is_ascii_digit())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Hole { placeholder: usize, slot: usize },
}

/// A template decomposed into text runs and argument slots.
///
/// # Example
///
/// ```
/// use logbridge::{ParsedTemplate, Value};
///
/// let parsed = ParsedTemplate::parse("{user} did {action} as {user}");
/// assert_eq!(parsed.names(), ["user", "action"]);
/// assert_eq!(parsed.positional(), "{0} did {1} as {0}");
///
/// let text = parsed.render(&[Value::from("ann"), Value::from("login")]).unwrap();
/// assert_eq!(text, "ann did login as ann");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTemplate {
    template: String,
    segments: Vec<Segment>,
    placeholders: Vec<Placeholder>,
    names: Vec<String>,
    required: usize,
}

impl ParsedTemplate {
    /// Parse a template. Parsing never fails; malformed braces stay literal.
    pub fn parse(template: &str) -> Self {
        let mut segments = Vec::new();
        let mut placeholders: Vec<Placeholder> = Vec::new();
        let mut names: Vec<String> = Vec::new();
        let mut max_position: Option<usize> = None;
        let mut text = String::new();
        let mut rest = template;

        while let Some(c) = rest.chars().next() {
            if rest.starts_with("{{") {
                text.push('{');
                rest = &rest[2..];
                continue;
            }
            if rest.starts_with("}}") {
                text.push('}');
                rest = &rest[2..];
                continue;
            }
            if c == '{' {
                if let Some((placeholder, consumed)) = parse_placeholder(rest) {
                    let slot = if placeholder.is_positional() {
                        // Digit runs that overflow are treated as text
                        match placeholder.name.parse::<usize>() {
                            Ok(position) => {
                                max_position = Some(max_position.map_or(position, |m| m.max(position)));
                                position
                            }
                            Err(_) => {
                                text.push_str(&rest[..consumed]);
                                rest = &rest[consumed..];
                                continue;
                            }
                        }
                    } else if let Some(index) = names.iter().position(|n| *n == placeholder.name) {
                        index
                    } else {
                        names.push(placeholder.name.clone());
                        names.len() - 1
                    };

                    if !text.is_empty() {
                        segments.push(Segment::Text(std::mem::take(&mut text)));
                    }
                    segments.push(Segment::Hole {
                        placeholder: placeholders.len(),
                        slot,
                    });
                    placeholders.push(placeholder);
                    rest = &rest[consumed..];
                    continue;
                }
            }
            text.push(c);
            rest = &rest[c.len_utf8()..];
        }

        if !text.is_empty() {
            segments.push(Segment::Text(text));
        }

        let required = names.len().max(max_position.map_or(0, |p| p + 1));

        Self {
            template: template.to_string(),
            segments,
            placeholders,
            names,
            required,
        }
    }

    /// The raw template.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Distinct named placeholders in first-occurrence order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Every placeholder occurrence in template order.
    pub fn placeholders(&self) -> &[Placeholder] {
        &self.placeholders
    }

    /// Number of arguments a render needs.
    pub fn required_args(&self) -> usize {
        self.required
    }

    /// Whether the template contains any placeholder.
    pub fn has_placeholders(&self) -> bool {
        !self.placeholders.is_empty()
    }

    /// The template rewritten with positional slots, e.g. `{0:yyyy}`.
    pub fn positional(&self) -> String {
        let mut out = String::with_capacity(self.template.len());
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => {
                    out.push_str(&text.replace('{', "{{").replace('}', "}}"));
                }
                Segment::Hole { placeholder, slot } => {
                    let placeholder = &self.placeholders[*placeholder];
                    out.push('{');
                    out.push_str(&slot.to_string());
                    if let Some(alignment) = placeholder.alignment {
                        out.push(',');
                        out.push_str(&alignment.to_string());
                    }
                    if let Some(format) = &placeholder.format {
                        out.push(':');
                        out.push_str(format);
                    }
                    out.push('}');
                }
            }
        }
        out
    }

    /// Substitute arguments. Extra arguments are ignored.
    pub fn render(&self, args: &[Value<'_>]) -> Result<String, FormatMismatch> {
        if args.len() < self.required {
            return Err(FormatMismatch {
                template: self.template.clone(),
                expected: self.required,
                supplied: args.len(),
            });
        }

        let mut out = String::with_capacity(self.template.len() + args.len() * 8);
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Hole { placeholder, slot } => {
                    let placeholder = &self.placeholders[*placeholder];
                    let value = args[*slot].format_with(placeholder.format.as_deref());
                    push_aligned(&mut out, &value, placeholder.alignment);
                }
            }
        }
        Ok(out)
    }
}

/// Parse `{...}` at the start of `input`; returns the placeholder and the
/// number of bytes consumed.
fn parse_placeholder(input: &str) -> Option<(Placeholder, usize)> {
    let body_end = input[1..].find(['{', '}'])? + 1;
    if !input[body_end..].starts_with('}') {
        return None;
    }
    let body = &input[1..body_end];

    let (destructure, body) = match body.strip_prefix('@') {
        Some(stripped) => (true, stripped),
        None => (false, body),
    };

    let name_end = body.find([',', ':']).unwrap_or(body.len());
    let name = &body[..name_end];
    if name.is_empty() || name.chars().any(char::is_whitespace) {
        return None;
    }

    let mut tail = &body[name_end..];
    let mut alignment = None;
    if let Some(after_comma) = tail.strip_prefix(',') {
        let align_end = after_comma.find(':').unwrap_or(after_comma.len());
        let width = after_comma[..align_end].trim().parse::<i32>().ok()?;
        if width.unsigned_abs() > MAX_ALIGNMENT {
            return None;
        }
        alignment = Some(width);
        tail = &after_comma[align_end..];
    }

    let format = tail
        .strip_prefix(':')
        .filter(|f| !f.is_empty())
        .map(str::to_string);

    Some((
        Placeholder {
            name: name.to_string(),
            alignment,
            format,
            destructure,
        },
        body_end + 1,
    ))
}

fn push_aligned(out: &mut String, value: &str, alignment: Option<i32>) {
    let Some(alignment) = alignment else {
        out.push_str(value);
        return;
    };
    let width = alignment.unsigned_abs() as usize;
    let padding = std::iter::repeat(' ').take(width.saturating_sub(value.chars().count()));
    if alignment < 0 {
        out.push_str(value);
        out.extend(padding);
    } else {
        out.extend(padding);
        out.push_str(value);
    }
}

// ============================================================================
// Formatting entry points
// ============================================================================

/// Parse now, substitute later.
///
/// The returned closure performs the substitution each time it is called.
/// Repeated names reuse the same argument.
///
/// # Example
///
/// ```
/// use logbridge::{format_deferred, Value};
///
/// let args = [Value::from(3), Value::from("disk")];
/// let produce = format_deferred("{count} errors on {device}", &args);
/// assert_eq!(produce().unwrap(), "3 errors on disk");
/// ```
pub fn format_deferred<'a>(
    template: &str,
    args: &'a [Value<'a>],
) -> impl Fn() -> Result<String, FormatMismatch> + 'a {
    let parsed = ParsedTemplate::parse(template);
    move || parsed.render(args)
}

/// Substitute immediately; also returns the distinct names in first-occurrence
/// order so callers can zip them with the arguments.
pub fn format_eager(
    template: &str,
    args: &[Value<'_>],
) -> Result<(String, Vec<String>), FormatMismatch> {
    let parsed = ParsedTemplate::parse(template);
    let text = parsed.render(args)?;
    Ok((text, parsed.names))
}

/// Render a materialised message with its arguments. Messages without
/// arguments are returned verbatim.
pub(crate) fn render_structured(
    message: String,
    args: &[Value<'_>],
) -> Result<(String, Vec<String>), FormatMismatch> {
    if args.is_empty() {
        return Ok((message, Vec::new()));
    }
    format_eager(&message, args)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_named_placeholders_in_first_occurrence_order() {
        let parsed = ParsedTemplate::parse("{b} then {a} then {b}");
        assert_eq!(parsed.names(), ["b", "a"]);
        assert_eq!(parsed.required_args(), 2);
        assert_eq!(parsed.positional(), "{0} then {1} then {0}");
    }

    #[test]
    fn test_repeated_name_reuses_argument() {
        let args = [Value::from("x"), Value::from("y")];
        let text = ParsedTemplate::parse("{a}-{b}-{a}").render(&args).unwrap();
        assert_eq!(text, "x-y-x");
    }

    #[test]
    fn test_date_format_specifiers() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let args = [Value::from(date), Value::from("x")];
        let produce = format_deferred("{date:yyyy-MM-dd} {arg1} {date:yyyy}", &args);
        assert_eq!(produce().unwrap(), "2024-03-01 x 2024");
    }

    #[test]
    fn test_mixed_names_and_positions() {
        let args = [Value::from("arg0"), Value::from("arg1"), Value::from("arg2")];
        let (text, names) = format_eager("{1argument} {argument2} {2}", &args).unwrap();
        assert_eq!(text, "arg0 arg1 arg2");
        assert_eq!(names, ["1argument", "argument2"]);
    }

    #[test]
    fn test_positional_only() {
        let parsed = ParsedTemplate::parse("{0} and {3}");
        assert!(parsed.names().is_empty());
        assert_eq!(parsed.required_args(), 4);
    }

    #[test]
    fn test_escaped_braces_are_literal() {
        let args = [Value::from(5)];
        let text = ParsedTemplate::parse("{{literal}} {n} }}{{").render(&args).unwrap();
        assert_eq!(text, "{literal} 5 }{");

        let parsed = ParsedTemplate::parse("{{x}}");
        assert!(!parsed.has_placeholders());
        assert_eq!(parsed.positional(), "{{x}}");
    }

    #[test]
    fn test_malformed_braces_kept_as_text() {
        let parsed = ParsedTemplate::parse("open { close } empty {} space {a b} nested {a{b}");
        assert_eq!(parsed.names(), ["b"]);
        let text = parsed.render(&[Value::from(1)]).unwrap();
        assert_eq!(text, "open { close } empty {} space {a b} nested {a1");
    }

    #[test]
    fn test_destructure_marker() {
        let parsed = ParsedTemplate::parse("{@order} placed");
        assert_eq!(parsed.names(), ["order"]);
        assert!(parsed.placeholders()[0].destructure);
    }

    #[test]
    fn test_alignment() {
        let args = [Value::from("ab"), Value::from(7)];
        let text = ParsedTemplate::parse("[{left,-5}] [{right,4:D2}]").render(&args).unwrap();
        assert_eq!(text, "[ab   ] [  07]");
    }

    #[test]
    fn test_invalid_alignment_is_text() {
        let parsed = ParsedTemplate::parse("{a,x}");
        assert!(!parsed.has_placeholders());
    }

    #[test]
    fn test_wide_alignment_pads_without_limit() {
        let args = [Value::from(1)];
        let text = format_deferred("{a,70000}", &args)().unwrap();
        assert_eq!(text.len(), 70000);
        assert!(text.ends_with(" 1"));

        let text = format_deferred("{a,-70000}|", &args)().unwrap();
        assert_eq!(text.len(), 70001);
        assert!(text.starts_with("1 "));
    }

    #[test]
    fn test_alignment_beyond_maximum_is_text() {
        let args = [Value::from(1)];
        let (text, names) = format_eager("{a,1000000} {b}", &args).unwrap();
        assert_eq!(text, "{a,1000000} 1");
        assert_eq!(names, ["b"]);

        let parsed = ParsedTemplate::parse("{a,-999999}");
        assert_eq!(parsed.placeholders()[0].alignment, Some(-999_999));
    }

    #[test]
    fn test_alignment_counts_characters() {
        let args = [Value::from("é")];
        let text = ParsedTemplate::parse("[{a,3}]").render(&args).unwrap();
        assert_eq!(text, "[  é]");
    }

    #[test]
    fn test_format_keeps_colons() {
        let parsed = ParsedTemplate::parse("{at:HH:mm}");
        assert_eq!(parsed.placeholders()[0].format.as_deref(), Some("HH:mm"));
    }

    #[test]
    fn test_too_few_arguments_is_mismatch() {
        let args = [Value::from(1)];
        let err = format_eager("{a} {b}", &args).unwrap_err();
        assert_eq!(err.expected, 2);
        assert_eq!(err.supplied, 1);
        assert_eq!(err.template, "{a} {b}");

        let produce = format_deferred("{a} {b}", &args);
        assert!(produce().is_err());
    }

    #[test]
    fn test_extra_arguments_ignored() {
        let args = [Value::from(1), Value::from(2)];
        let (text, names) = format_eager("only {one}", &args).unwrap();
        assert_eq!(text, "only 1");
        assert_eq!(names, ["one"]);
    }

    #[test]
    fn test_render_structured_without_args_is_verbatim() {
        let (text, names) = render_structured("json {\"k\": 1}".to_string(), &[]).unwrap();
        assert_eq!(text, "json {\"k\": 1}");
        assert!(names.is_empty());
    }

    #[test]
    fn test_unicode_text_survives() {
        let args = [Value::from("wörld")];
        let text = ParsedTemplate::parse("héllo {who} ✓").render(&args).unwrap();
        assert_eq!(text, "héllo wörld ✓");
    }
}
