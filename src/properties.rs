use crate::logging::Logger;
use crate::resources::ResourceLoader;
use std::collections::HashMap;

const LOG: Logger = Logger::new(module_path!());

/// Loads a property file through `loader`
///
/// The file is decoded as ISO-8859-1, non-ASCII characters beyond that
/// need `\uXXXX` escapes. A file that is missing or unreadable yields an
/// empty map; the failure is only logged.
pub fn load(loader: &ResourceLoader, file_name: &str) -> HashMap<String, String> {
    match loader.read_bytes(file_name) {
        Ok(bytes) => parse_properties(&decode_latin1(&bytes)),
        Err(e) => {
            let _ = LOG.debug(&format!(
                "Property file '{}' could not be read: {}",
                file_name, e
            ));
            HashMap::new()
        }
    }
}

/// Every byte is the code point of the same value
fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Parses `.properties` text
///
/// Supports `#` and `!` comments, `=`, `:` or whitespace between key and
/// value, backslash line continuations and `\t \n \r \f \uXXXX` escapes.
/// Later keys override earlier ones.
pub fn parse_properties(contents: &str) -> HashMap<String, String> {
    let mut properties = HashMap::new();

    let mut lines = contents.lines();
    while let Some(line) = lines.next() {
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
            continue;
        }

        let mut logical = String::new();
        let mut current = trimmed.to_string();
        while ends_with_continuation(&current) {
            current.pop();
            logical.push_str(&current);
            current = match lines.next() {
                Some(next) => next.trim_start().to_string(),
                None => String::new(),
            };
        }
        logical.push_str(&current);

        let (key, value) = split_key_value(&logical);
        properties.insert(unescape(key), unescape(value));
    }

    properties
}

/// An odd number of trailing backslashes continues the line
fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

fn split_key_value(line: &str) -> (&str, &str) {
    let mut escaped = false;
    for (idx, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => return (&line[..idx], line[idx + 1..].trim_start()),
            c if c.is_whitespace() => {
                let rest = line[idx..].trim_start();
                let rest = match rest.strip_prefix(|c: char| c == '=' || c == ':') {
                    Some(stripped) => stripped.trim_start(),
                    None => rest,
                };
                return (&line[..idx], rest);
            }
            _ => {}
        }
    }
    (line, "")
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{c}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push_str("\\u");
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}
