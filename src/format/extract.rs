//! Key extraction from the working buffer
//!
//! After the inner serializer has run, the formatter pulls built-in keys
//! (`level`, `source`) back out of the buffer, optionally removing them so
//! that whatever remains is the residue appended to the line.

use super::serializer::Encoding;

impl Encoding {
    /// Read `key` from `buffer`; see [`text_key_value`] and [`json_key_value`].
    pub fn key_value(&self, buffer: &mut String, key: &str, remove: bool) -> String {
        match self {
            Encoding::Text => text_key_value(buffer, key, remove),
            Encoding::Json => json_key_value(buffer, key, remove),
        }
    }
}

/// One `key=value` pair of a logfmt line, borrowed from the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Pair<'a> {
    key: &'a str,
    /// Raw value text, still quoted if it was quoted.
    raw: &'a str,
    /// The whole token as written.
    token: &'a str,
}

/// Split a logfmt line into pairs, honouring quoted values.
fn tokenize(line: &str) -> Vec<Pair<'_>> {
    let bytes = line.as_bytes();
    let mut pairs = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= bytes.len() {
            break;
        }
        let start = i;
        while i < bytes.len() && bytes[i] != b'=' && !bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        let key = &line[start..i];
        if i >= bytes.len() || bytes[i] != b'=' {
            pairs.push(Pair {
                key,
                raw: "",
                token: key,
            });
            continue;
        }
        i += 1;
        let value_start = i;
        if i < bytes.len() && bytes[i] == b'"' {
            i += 1;
            while i < bytes.len() && bytes[i] != b'"' {
                if bytes[i] == b'\\' {
                    i += 1;
                }
                i += 1;
            }
            i = (i + 1).min(bytes.len());
        } else {
            while i < bytes.len() && !bytes[i].is_ascii_whitespace() {
                i += 1;
            }
        }
        pairs.push(Pair {
            key,
            raw: &line[value_start..i],
            token: &line[start..i],
        });
    }
    pairs
}

/// Extract `key` from a logfmt buffer.
///
/// Quoted values are unquoted. When `remove` is set and the key is found,
/// the buffer is rebuilt from the remaining pairs joined by single spaces.
/// A missing key yields an empty string and leaves the buffer untouched.
pub fn text_key_value(buffer: &mut String, key: &str, remove: bool) -> String {
    let pairs = tokenize(buffer);
    let Some(index) = pairs.iter().position(|pair| pair.key == key && pair.token.len() > key.len()) else {
        return String::new();
    };
    let value = unquote(pairs[index].raw);
    if remove {
        let rebuilt = pairs
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, pair)| pair.token)
            .collect::<Vec<_>>()
            .join(" ");
        *buffer = rebuilt;
    }
    value
}

/// Extract `key` from a JSON object buffer.
///
/// String values come back raw; any other value as its JSON text. When the
/// key is found the object is re-serialized into the buffer, without the key
/// if `remove` is set. An unparsable buffer yields an empty string and is
/// left untouched.
pub fn json_key_value(buffer: &mut String, key: &str, remove: bool) -> String {
    let Ok(mut object) = serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(buffer)
    else {
        return String::new();
    };
    let value = if remove {
        object.remove(key)
    } else {
        object.get(key).cloned()
    };
    let Some(value) = value else {
        return String::new();
    };
    if let Ok(serialized) = serde_json::to_string(&object) {
        *buffer = serialized;
    }
    match value {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    }
}

/// Reverse the quoting applied by the inner serializer.
pub fn unquote(raw: &str) -> String {
    let Some(inner) = raw
        .strip_prefix('"')
        .map(|rest| rest.strip_suffix('"').unwrap_or(rest))
    else {
        return raw.to_string();
    };

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('u') => {
                let code: String = chars
                    .by_ref()
                    .skip_while(|c| *c == '{')
                    .take_while(|c| *c != '}')
                    .collect();
                if let Some(decoded) = u32::from_str_radix(&code, 16).ok().and_then(char::from_u32) {
                    out.push(decoded);
                }
            }
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
