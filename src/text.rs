use crate::numbers::{DecimalPattern, Locale};
use chrono::format::{self, ParseErrorKind, Parsed, StrftimeItems};
use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::error::Error as StdError;
use std::io::{self, Cursor, Error, ErrorKind};

/// Date pattern used by [`string_to_date`]
pub const DEFAULT_DATE_FORMAT: &str = "dd.MM.yyyy";

/// Joins integers with commas, e.g. `1,2,3`
pub fn join_ints(values: &[i64]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Replaces `${key}` placeholders with values from `placeholders`
///
/// Keys missing from the map stay in the text untouched.
///
/// # Example
/// ```
/// use std::collections::HashMap;
/// use awtools::text::replace_placeholder;
///
/// let mut values = HashMap::new();
/// values.insert("name".to_string(), "Andre".to_string());
/// assert_eq!(replace_placeholder("Hi ${name}, ${day}?", &values), "Hi Andre, ${day}?");
/// ```
pub fn replace_placeholder(text: &str, placeholders: &HashMap<String, String>) -> String {
    let mut result = text.to_string();
    for key in placeholder_keys(text) {
        if let Some(value) = placeholders.get(key) {
            result = result.replace(&format!("${{{}}}", key), value);
        }
    }
    result
}

/// Every substring between `${` and the following `}`
fn placeholder_keys(text: &str) -> Vec<&str> {
    let mut keys = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find("${") {
        let after_open = &rest[start + 2..];
        match after_open.find('}') {
            Some(end) => {
                keys.push(&after_open[..end]);
                rest = &after_open[end + 1..];
            }
            None => break,
        }
    }
    keys
}

/// Formats `value` using a decimal pattern such as `#,##0.00`
///
/// # Errors
/// `InvalidInput` for a malformed pattern.
pub fn format_double(value: f64, pattern: &str, locale: &Locale) -> io::Result<String> {
    Ok(DecimalPattern::parse(pattern)?.format(value, locale))
}

/// Parses a `dd.MM.yyyy` date; the time is midnight
pub fn string_to_date(text: &str) -> io::Result<NaiveDateTime> {
    string_to_date_with(text, DEFAULT_DATE_FORMAT)
}

/// Parses `text` with a date pattern like `dd.MM.yyyy HH:mm:ss`
///
/// Time fields missing from the pattern default to midnight. Anything
/// following the matched date is ignored.
///
/// # Errors
/// - `InvalidInput` for empty text or an unsupported pattern letter
/// - `InvalidData` when the text does not match the pattern
pub fn string_to_date_with(text: &str, pattern: &str) -> io::Result<NaiveDateTime> {
    if text.is_empty() {
        return Err(Error::new(ErrorKind::InvalidInput, "date string is empty"));
    }
    let chrono_format = to_chrono_format(pattern)?;

    let mut parsed = Parsed::new();
    // Text after a complete date is ignored
    format::parse_and_remainder(&mut parsed, text, StrftimeItems::new(&chrono_format))
        .map_err(|e| unparseable_date(text, pattern, e))?;

    let date = parsed
        .to_naive_date()
        .map_err(|e| unparseable_date(text, pattern, e))?;
    match parsed.to_naive_time() {
        Ok(time) => Ok(date.and_time(time)),
        Err(e) if e.kind() == ParseErrorKind::NotEnough => date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| Error::new(ErrorKind::InvalidData, "midnight out of range")),
        Err(e) => Err(unparseable_date(text, pattern, e)),
    }
}

fn unparseable_date(text: &str, pattern: &str, err: format::ParseError) -> Error {
    Error::new(
        ErrorKind::InvalidData,
        format!("Unparseable date: \"{}\" (pattern {}): {}", text, pattern, err),
    )
}

/// Translates a date pattern (`yyyy`, `MM`, `dd`, `HH`, ...) to a chrono
/// format string
fn to_chrono_format(pattern: &str) -> io::Result<String> {
    let mut out = String::new();
    let chars: Vec<char> = pattern.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '\'' {
            // '' is a literal quote, 'text' is literal text
            if chars.get(i + 1) == Some(&'\'') {
                out.push('\'');
                i += 2;
                continue;
            }
            i += 1;
            while i < chars.len() {
                if chars[i] == '\'' {
                    if chars.get(i + 1) == Some(&'\'') {
                        out.push('\'');
                        i += 2;
                        continue;
                    }
                    break;
                }
                push_literal(&mut out, chars[i]);
                i += 1;
            }
            i += 1;
            continue;
        }

        if !c.is_ascii_alphabetic() {
            push_literal(&mut out, c);
            i += 1;
            continue;
        }

        let mut count = 1;
        while chars.get(i + count) == Some(&c) {
            count += 1;
        }
        let spec = match (c, count) {
            ('y', 2) => "%y",
            ('y', _) => "%Y",
            ('M', 1..=2) => "%m",
            ('M', 3) => "%b",
            ('M', _) => "%B",
            ('d', _) => "%d",
            ('H', _) => "%H",
            ('h', _) => "%I",
            ('a', _) => "%p",
            ('m', _) => "%M",
            ('s', _) => "%S",
            ('S', _) => "%3f",
            ('E', 1..=3) => "%a",
            ('E', _) => "%A",
            ('Z', _) => "%z",
            _ => {
                return Err(Error::new(
                    ErrorKind::InvalidInput,
                    format!("Illegal pattern character '{}' in '{}'", c, pattern),
                ))
            }
        };
        out.push_str(spec);
        i += count;
    }

    Ok(out)
}

fn push_literal(out: &mut String, c: char) {
    if c == '%' {
        out.push_str("%%");
    } else {
        out.push(c);
    }
}

/// Renders an error and every `source()` below it, one per line
pub fn error_chain_to_string(err: &dyn StdError) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str("\nCaused by: ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}

/// Wraps a string in a reader
pub fn string_to_reader(s: &str) -> Cursor<Vec<u8>> {
    Cursor::new(s.as_bytes().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::fmt;
    use std::io::Read;

    #[test]
    fn test_string_to_date() {
        let expected = NaiveDate::from_ymd_opt(1971, 3, 24)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(
            string_to_date_with("24.3.1971 00:00:00", "dd.MM.yyyy HH:mm:ss").unwrap(),
            expected
        );

        let expected = NaiveDate::from_ymd_opt(1971, 3, 24)
            .unwrap()
            .and_hms_opt(15, 30, 0)
            .unwrap();
        assert_eq!(
            string_to_date_with("24.3.1971 15:30:00", "dd.MM.yyyy HH:mm:ss").unwrap(),
            expected
        );
    }

    #[test]
    fn test_string_to_date_default_format() {
        let expected = NaiveDate::from_ymd_opt(2002, 12, 24)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(string_to_date("24.12.2002").unwrap(), expected);
    }

    #[test]
    fn test_string_to_date_ignores_trailing_text() {
        let expected = NaiveDate::from_ymd_opt(2002, 12, 24)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(string_to_date("24.12.2002 extra").unwrap(), expected);
        assert_eq!(
            string_to_date_with("24.12.2002 10:15 Uhr", "dd.MM.yyyy HH:mm").unwrap(),
            expected.date().and_hms_opt(10, 15, 0).unwrap()
        );
    }

    #[test]
    fn test_string_to_date_errors() {
        assert_eq!(string_to_date("").unwrap_err().kind(), ErrorKind::InvalidInput);
        assert_eq!(string_to_date("not a date").unwrap_err().kind(), ErrorKind::InvalidData);
        assert_eq!(
            string_to_date_with("24.12.2002", "dd.QQ.yyyy").unwrap_err().kind(),
            ErrorKind::InvalidInput
        );
    }

    #[test]
    fn test_to_chrono_format() {
        assert_eq!(to_chrono_format("dd.MM.yyyy HH:mm:ss").unwrap(), "%d.%m.%Y %H:%M:%S");
        assert_eq!(to_chrono_format("yyyy-MM-dd'T'HH:mm").unwrap(), "%Y-%m-%dT%H:%M");
        assert_eq!(to_chrono_format("dd MMM yy").unwrap(), "%d %b %y");
        assert_eq!(to_chrono_format("HH 'o''clock' 100%").unwrap(), "%H o'clock 100%%");
    }

    #[test]
    fn test_format_double() {
        let values = [100.01, 100.001, 89.3, 5555.5555, 12.1, 13.12, 5.5];
        let expected = ["100,01", "100,00", "89,30", "5.555,56", "12,10", "13,12", "5,50"];
        for (value, expected) in values.iter().zip(expected.iter()) {
            assert_eq!(&format_double(*value, "###,##0.00", &Locale::GERMAN).unwrap(), expected);
        }
        assert!(format_double(1.0, "", &Locale::GERMAN).is_err());
    }

    #[test]
    fn test_replace_placeholder() {
        let text = "Hallo ${name}! Wie war der ${heute}?";
        let mut placeholders = HashMap::new();
        placeholders.insert("name".to_string(), "Andre".to_string());
        assert_eq!(
            replace_placeholder(text, &placeholders),
            "Hallo Andre! Wie war der ${heute}?"
        );

        placeholders.insert("heute".to_string(), "Sonntag".to_string());
        assert_eq!(
            replace_placeholder(text, &placeholders),
            "Hallo Andre! Wie war der Sonntag?"
        );

        let plain = "Ganz normaler String";
        assert_eq!(replace_placeholder(plain, &placeholders), plain);
    }

    #[test]
    fn test_replace_placeholder_unclosed() {
        let mut placeholders = HashMap::new();
        placeholders.insert("a".to_string(), "x".to_string());
        assert_eq!(replace_placeholder("${a} ${a", &placeholders), "x ${a");
    }

    #[test]
    fn test_join_ints() {
        assert_eq!(join_ints(&[1, 2, 3, 4, 5, 6]), "1,2,3,4,5,6");
        assert_eq!(join_ints(&[]), "");
        assert_eq!(join_ints(&[1]), "1");
    }

    #[derive(Debug)]
    struct Outer(io::Error);

    impl fmt::Display for Outer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "loading failed")
        }
    }

    impl StdError for Outer {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn test_error_chain_to_string() {
        let err = Outer(io::Error::new(ErrorKind::NotFound, "settings.json missing"));
        assert_eq!(
            error_chain_to_string(&err),
            "loading failed\nCaused by: settings.json missing"
        );
    }

    #[test]
    fn test_string_to_reader() {
        let mut reader = string_to_reader("abc");
        let mut out = String::new();
        reader.read_to_string(&mut out).unwrap();
        assert_eq!(out, "abc");
    }
}
