//! Canonical JSON encoding used for structured subfeed names and blobs.
//!
//! Canonical rules:
//! - object keys sorted by code point, recursively
//! - `,` and `:` separators, no whitespace
//! - every non-ASCII character escaped as `\uXXXX` (UTF-16 code units,
//!   lowercase hex), so the encoding is pure ASCII
//! - floats in shortest round-trip form, positional when the decimal
//!   exponent is in `-4..16` and `1e+20` / `1.5e-05` style otherwise
//!
//! These match the encoding the daemon and other clients use when they hash
//! the same values, so hashes agree across implementations.

use std::fmt::Write;

use serde::Serialize;
use serde_json::Value;

use crate::hasher::HasherError;

/// Encode a JSON value canonically.
pub fn to_canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value);
    out
}

/// Encode any serializable value canonically.
///
/// Non-finite floats are rejected rather than silently becoming `null`.
pub fn to_canonical_json_of<T: Serialize + ?Sized>(value: &T) -> Result<String, HasherError> {
    let value = serde_json::to_value(value).map_err(|e| HasherError::Serialization(e.to_string()))?;
    Ok(to_canonical_json(&value))
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() => write_float(out, f),
            _ => {
                let _ = write!(out, "{n}");
            }
        },
        Value::String(s) => write_string(out, s),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(out, item);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_string(out, key);
                out.push(':');
                write_value(out, item);
            }
            out.push('}');
        }
    }
}

fn write_float(out: &mut String, f: f64) {
    // `{:e}` yields the shortest digits that round-trip, e.g. `-1.5e-5`.
    let sci = format!("{f:e}");
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    let (sign, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", mantissa),
    };
    out.push_str(sign);
    if f == 0.0 {
        out.push_str("0.0");
        return;
    }
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    // Position of the decimal point relative to the first digit.
    let point = exp + 1;
    if !(-3..=16).contains(&point) {
        out.push_str(&digits[..1]);
        if digits.len() > 1 {
            out.push('.');
            out.push_str(&digits[1..]);
        }
        let exp_sign = if exp < 0 { '-' } else { '+' };
        let _ = write!(out, "e{exp_sign}{:02}", exp.unsigned_abs());
    } else if point <= 0 {
        out.push_str("0.");
        for _ in 0..-point {
            out.push('0');
        }
        out.push_str(&digits);
    } else {
        let point = point as usize;
        if digits.len() <= point {
            out.push_str(&digits);
            for _ in digits.len()..point {
                out.push('0');
            }
            out.push_str(".0");
        } else {
            out.push_str(&digits[..point]);
            out.push('.');
            out.push_str(&digits[point..]);
        }
    }
}

fn write_string(out: &mut String, s: &str) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            c if (c as u32) < 0x20 || !c.is_ascii() => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    let _ = write!(out, "\\u{unit:04x}");
                }
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn sorts_keys_recursively() {
        let value = json!({
            "b": 1,
            "a": {"d": 4, "c": 3},
            "aa": [{"z": 1, "y": 2}]
        });
        assert_eq!(
            to_canonical_json(&value),
            r#"{"a":{"c":3,"d":4},"aa":[{"y":2,"z":1}],"b":1}"#
        );
    }

    #[test]
    fn floats_use_shortest_form() {
        let cases = [
            (json!(1e20), "1e+20"),
            (json!(1e16), "1e+16"),
            (json!(1e15), "1000000000000000.0"),
            (json!(1.5e-5), "1.5e-05"),
            (json!(0.0001), "0.0001"),
            (json!(123.456), "123.456"),
            (json!(2.0), "2.0"),
            (json!(-0.5), "-0.5"),
            (json!(-0.0), "-0.0"),
            (json!(1.25e300), "1.25e+300"),
        ];
        for (value, expected) in cases {
            assert_eq!(to_canonical_json(&value), expected, "{value:?}");
        }
    }

    #[test]
    fn integers_are_unchanged() {
        assert_eq!(to_canonical_json(&json!([1, -2, 100000000000000000u64])), "[1,-2,100000000000000000]");
    }

    #[test]
    fn escapes_non_ascii() {
        assert_eq!(to_canonical_json(&json!("é")), r#""\u00e9""#);
        // Astral characters become a surrogate pair.
        assert_eq!(to_canonical_json(&json!("😀")), r#""\ud83d\ude00""#);
    }

    #[test]
    fn escapes_control_characters() {
        assert_eq!(to_canonical_json(&json!("a\nb\u{1}")), r#""a\nb\u0001""#);
        assert_eq!(to_canonical_json(&json!("q\"\\")), r#""q\"\\""#);
    }

    #[test]
    fn scalars() {
        assert_eq!(to_canonical_json(&json!(null)), "null");
        assert_eq!(to_canonical_json(&json!(true)), "true");
        assert_eq!(to_canonical_json(&json!(-3)), "-3");
        assert_eq!(to_canonical_json(&json!(1.5)), "1.5");
        assert_eq!(to_canonical_json(&json!([])), "[]");
        assert_eq!(to_canonical_json(&json!({})), "{}");
    }

    #[test]
    fn hashmap_order_does_not_matter() {
        let mut a = HashMap::new();
        a.insert("b".to_string(), 2u32);
        a.insert("a".to_string(), 1u32);
        let mut b = HashMap::new();
        b.insert("a".to_string(), 1u32);
        b.insert("b".to_string(), 2u32);
        assert_eq!(
            to_canonical_json_of(&a).unwrap(),
            to_canonical_json_of(&b).unwrap()
        );
    }
}
