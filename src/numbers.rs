//! Locale-aware number formatting and lenient number parsing
//!
//! Patterns follow the familiar decimal-format notation: `#` optional
//! digit, `0` required digit, `,` grouping, `.` decimal point, literal
//! text around the number, and an optional negative sub-pattern after `;`.

use crate::config::Settings;
use std::io::{self, Error, ErrorKind};

/// Default pattern used by [`NumberUtils`]
pub const DEFAULT_DECIMAL_FORMAT: &str = "###,###.##";

/// Pattern for amounts, always two fraction digits
pub const DEFAULT_ZERO_FORMAT: &str = "##,##0.00";

/// Separator symbols of a locale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Locale {
    pub decimal_separator: char,
    pub grouping_separator: char,
    pub minus_sign: char,
}

impl Locale {
    pub const ENGLISH: Locale = Locale {
        decimal_separator: '.',
        grouping_separator: ',',
        minus_sign: '-',
    };
    pub const US: Locale = Locale::ENGLISH;
    pub const GERMAN: Locale = Locale {
        decimal_separator: ',',
        grouping_separator: '.',
        minus_sign: '-',
    };
    pub const GERMANY: Locale = Locale::GERMAN;
    pub const ITALIAN: Locale = Locale::GERMAN;
    pub const FRENCH: Locale = Locale {
        decimal_separator: ',',
        grouping_separator: '\u{a0}',
        minus_sign: '-',
    };

    /// Looks up a locale by tag such as `de`, `de_DE` or `en-US`
    ///
    /// Only the language part decides. Unknown languages yield None.
    pub fn from_tag(tag: &str) -> Option<Locale> {
        let language = tag
            .split(|c: char| c == '_' || c == '-')
            .next()
            .unwrap_or("")
            .to_ascii_lowercase();
        match language.as_str() {
            "en" => Some(Locale::ENGLISH),
            "de" => Some(Locale::GERMAN),
            "it" => Some(Locale::ITALIAN),
            "fr" => Some(Locale::FRENCH),
            _ => None,
        }
    }
}

impl Default for Locale {
    fn default() -> Self {
        Locale::ENGLISH
    }
}

/// A compiled decimal pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecimalPattern {
    positive_prefix: String,
    positive_suffix: String,
    negative_prefix: Option<String>,
    negative_suffix: Option<String>,
    min_integer_digits: usize,
    grouping_size: Option<usize>,
    min_fraction_digits: usize,
    max_fraction_digits: usize,
}

fn is_pattern_char(c: char) -> bool {
    matches!(c, '#' | '0' | ',' | '.')
}

/// Splits a sub-pattern into prefix, number part and suffix
fn split_affixes(pattern: &str) -> (String, &str, String) {
    let start = pattern.find(is_pattern_char);
    let end = pattern.rfind(is_pattern_char);
    match (start, end) {
        (Some(start), Some(end)) => (
            pattern[..start].to_string(),
            &pattern[start..=end],
            pattern[end + 1..].to_string(),
        ),
        _ => (pattern.to_string(), "", String::new()),
    }
}

impl DecimalPattern {
    /// Compiles `pattern`
    ///
    /// # Errors
    /// `InvalidInput` when the pattern has no digit placeholder or more
    /// than one decimal point.
    pub fn parse(pattern: &str) -> io::Result<DecimalPattern> {
        let mut sub_patterns = pattern.splitn(2, ';');
        let positive = sub_patterns.next().unwrap_or("");
        let negative = sub_patterns.next();

        let (positive_prefix, number, positive_suffix) = split_affixes(positive);
        if !number.contains(|c: char| c == '#' || c == '0') {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!("pattern '{}' has no digit placeholder", pattern),
            ));
        }

        let mut parts = number.split('.');
        let integer_part = parts.next().unwrap_or("");
        let fraction_part = parts.next().unwrap_or("");
        if parts.next().is_some() {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!("pattern '{}' has more than one decimal point", pattern),
            ));
        }

        let min_integer_digits = integer_part.chars().filter(|&c| c == '0').count();
        let grouping_size = integer_part
            .rfind(',')
            .map(|idx| integer_part[idx + 1..].chars().filter(|&c| c == '#' || c == '0').count())
            .filter(|&size| size > 0);
        let min_fraction_digits = fraction_part.chars().filter(|&c| c == '0').count();
        let max_fraction_digits = fraction_part
            .chars()
            .filter(|&c| c == '0' || c == '#')
            .count();

        let (negative_prefix, negative_suffix) = match negative {
            Some(negative) => {
                let (prefix, _, suffix) = split_affixes(negative);
                (Some(prefix), Some(suffix))
            }
            None => (None, None),
        };

        Ok(DecimalPattern {
            positive_prefix,
            positive_suffix,
            negative_prefix,
            negative_suffix,
            min_integer_digits,
            grouping_size,
            min_fraction_digits,
            max_fraction_digits,
        })
    }

    fn negative_prefix(&self, locale: &Locale) -> String {
        match &self.negative_prefix {
            Some(prefix) => prefix.clone(),
            None => format!("{}{}", locale.minus_sign, self.positive_prefix),
        }
    }

    fn negative_suffix(&self) -> &str {
        self.negative_suffix
            .as_deref()
            .unwrap_or(&self.positive_suffix)
    }

    /// Formats `value` with the symbols of `locale`
    ///
    /// Rounds half-even to the maximum number of fraction digits. A
    /// negative value that rounds to zero prints as `-0`.
    pub fn format(&self, value: f64, locale: &Locale) -> String {
        if value.is_nan() {
            return "NaN".to_string();
        }

        let digits = if value.is_infinite() {
            "\u{221e}".to_string()
        } else {
            self.format_digits(value.abs(), locale)
        };

        // Negative values keep their sign even when they round to zero
        if value.is_sign_negative() {
            format!("{}{}{}", self.negative_prefix(locale), digits, self.negative_suffix())
        } else {
            format!("{}{}{}", self.positive_prefix, digits, self.positive_suffix)
        }
    }

    fn format_digits(&self, value: f64, locale: &Locale) -> String {
        let rounded = format!("{:.*}", self.max_fraction_digits, value);
        let (integer, fraction) = match rounded.split_once('.') {
            Some((integer, fraction)) => (integer, fraction),
            None => (rounded.as_str(), ""),
        };

        let mut fraction = fraction.to_string();
        while fraction.len() > self.min_fraction_digits && fraction.ends_with('0') {
            fraction.pop();
        }

        let mut integer = integer.trim_start_matches('0').to_string();
        while integer.len() < self.min_integer_digits {
            integer.insert(0, '0');
        }
        if integer.is_empty() && fraction.is_empty() {
            integer.push('0');
        }

        let mut out = String::new();
        if let Some(size) = self.grouping_size {
            let len = integer.len();
            for (idx, c) in integer.chars().enumerate() {
                if idx > 0 && (len - idx) % size == 0 {
                    out.push(locale.grouping_separator);
                }
                out.push(c);
            }
        } else {
            out.push_str(&integer);
        }

        if !fraction.is_empty() {
            out.push(locale.decimal_separator);
            out.push_str(&fraction);
        }
        out
    }

    /// Parses the leading number of `text`
    ///
    /// Grouping separators are skipped, parsing stops at the first
    /// character that cannot belong to the number, so `5a` reads as 5.
    ///
    /// # Errors
    /// `InvalidInput` when `text` does not start with a number.
    pub fn parse_number(&self, text: &str, locale: &Locale) -> io::Result<f64> {
        let negative_prefix = self.negative_prefix(locale);
        let (negative, rest) = if !negative_prefix.is_empty() && text.starts_with(&negative_prefix) {
            (true, &text[negative_prefix.len()..])
        } else if text.starts_with(&self.positive_prefix) {
            (false, &text[self.positive_prefix.len()..])
        } else {
            return Err(unparseable(text));
        };

        let mut number = String::new();
        let mut seen_digit = false;
        let mut seen_decimal = false;
        for c in rest.chars() {
            if c.is_ascii_digit() {
                number.push(c);
                seen_digit = true;
            } else if c == locale.decimal_separator && !seen_decimal {
                number.push('.');
                seen_decimal = true;
            } else if c == locale.grouping_separator && !seen_decimal {
                continue;
            } else {
                break;
            }
        }

        if !seen_digit {
            return Err(unparseable(text));
        }

        let value: f64 = number.parse().map_err(|_| unparseable(text))?;
        Ok(if negative { -value } else { value })
    }
}

fn unparseable(text: &str) -> Error {
    Error::new(
        ErrorKind::InvalidInput,
        format!("Unparseable number: \"{}\"", text),
    )
}

/// Formats and parses numbers with a configurable locale and pattern
#[derive(Debug, Clone)]
pub struct NumberUtils {
    locale: Locale,
    pattern: String,
    compiled: DecimalPattern,
}

impl Default for NumberUtils {
    fn default() -> Self {
        NumberUtils {
            locale: Locale::default(),
            pattern: DEFAULT_DECIMAL_FORMAT.to_string(),
            compiled: default_pattern(),
        }
    }
}

fn default_pattern() -> DecimalPattern {
    DecimalPattern {
        positive_prefix: String::new(),
        positive_suffix: String::new(),
        negative_prefix: None,
        negative_suffix: None,
        min_integer_digits: 0,
        grouping_size: Some(3),
        min_fraction_digits: 0,
        max_fraction_digits: 2,
    }
}

impl NumberUtils {
    pub fn new() -> Self {
        Self::default()
    }

    /// Utils using the configured locale and number pattern
    pub fn from_settings(settings: &Settings) -> io::Result<Self> {
        let mut utils = NumberUtils::new();
        utils.set_pattern_and_locale(Some(settings.locale()), Some(&settings.number_pattern))?;
        Ok(utils)
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn set_pattern(&mut self, pattern: &str) -> io::Result<()> {
        self.set_pattern_and_locale(Some(self.locale), Some(pattern))
    }

    pub fn set_locale(&mut self, locale: Locale) {
        self.locale = locale;
    }

    /// Sets locale and pattern; None restores the respective default
    ///
    /// # Errors
    /// `InvalidInput` for a malformed pattern; nothing is changed then.
    pub fn set_pattern_and_locale(&mut self, locale: Option<Locale>, pattern: Option<&str>) -> io::Result<()> {
        let pattern = pattern.unwrap_or(DEFAULT_DECIMAL_FORMAT);
        let compiled = DecimalPattern::parse(pattern)?;

        self.locale = locale.unwrap_or_default();
        self.pattern = pattern.to_string();
        self.compiled = compiled;
        Ok(())
    }

    /// Formats a value; None formats as the empty string
    pub fn format(&self, value: Option<f64>) -> String {
        match value {
            Some(value) => self.compiled.format(value, &self.locale),
            None => String::new(),
        }
    }

    pub fn format_long(&self, value: i64) -> String {
        self.format(Some(value as f64))
    }

    pub fn format_double(&self, value: f64) -> String {
        self.format(Some(value))
    }

    pub fn parse_number(&self, value: &str) -> io::Result<f64> {
        self.compiled.parse_number(value, &self.locale)
    }

    /// Same as [`NumberUtils::parse_number`]
    pub fn to_number(&self, value: &str) -> io::Result<f64> {
        self.parse_number(value)
    }

    pub fn to_int(&self, value: &str) -> io::Result<i32> {
        Ok(self.to_number(value)? as i32)
    }

    pub fn to_short(&self, value: &str) -> io::Result<i16> {
        Ok(self.to_number(value)? as i16)
    }

    pub fn to_long(&self, value: &str) -> io::Result<i64> {
        Ok(self.to_number(value)? as i64)
    }

    pub fn to_double(&self, value: &str) -> io::Result<f64> {
        self.to_number(value)
    }

    pub fn to_float(&self, value: &str) -> io::Result<f32> {
        Ok(self.to_number(value)? as f32)
    }
}
