//! Small text and loose-value helpers for user supplied payloads.

use serde_json::Value;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Lowercases and drops combining marks after canonical decomposition, so
/// "Llegó Tarde" compares equal to "llego tarde" whether the accent arrives
/// precomposed or as a separate combining character.
pub fn fold_accents(s: &str) -> String {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Trimmed, folded key used to match status words.
pub fn normalize_word(s: &str) -> String {
    fold_accents(s.trim())
}

/// Cuts at a character boundary.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

/// Booleans that may arrive as strings or numbers.
///
/// Unknown words yield `None` so callers can fall back to truthiness.
pub fn parse_loose_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Null => None,
        Value::Number(n) => match n.as_f64() {
            Some(x) if x == 1.0 => Some(true),
            Some(x) if x == 0.0 => Some(false),
            _ => None,
        },
        Value::String(s) => parse_bool_word(s),
        _ => None,
    }
}

pub fn parse_bool_word(s: &str) -> Option<bool> {
    match normalize_word(s).as_str() {
        "true" | "1" | "si" | "yes" | "y" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Non-empty strings and collections, non-zero numbers and `true`.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|x| x != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Strings carrying JSON (`{...}`, `[...]`, `"..."`) are decoded; anything
/// else, including malformed JSON, is returned untouched.
pub fn decode_embedded_json(value: Value) -> Value {
    let Value::String(s) = &value else {
        return value;
    };
    let trimmed = s.trim();
    if !(trimmed.starts_with('{') || trimmed.starts_with('[') || trimmed.starts_with('"')) {
        return value;
    }
    serde_json::from_str(trimmed).unwrap_or(value)
}

/// Form fields may repeat: `["1A"]` stands for `"1A"`.
pub fn first_scalar(value: &Value) -> Option<&Value> {
    match value {
        Value::Array(items) => items.first(),
        Value::Null => None,
        other => Some(other),
    }
}

/// Scalar rendered as trimmed text; empty strings become `None`.
pub fn scalar_text(value: &Value) -> Option<String> {
    let text = match first_scalar(value)? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fold_accents() {
        assert_eq!(fold_accents("Llegó Tarde"), "llego tarde");
        assert_eq!(fold_accents("ASISTIÓ"), "asistio");
        assert_eq!(fold_accents("Sí"), "si");
        assert_eq!(fold_accents("Año"), "ano");
    }

    #[test]
    fn test_fold_accents_decomposed_input() {
        assert_eq!(fold_accents("falto\u{301}"), "falto");
        assert_eq!(fold_accents("Llego\u{301} tarde"), "llego tarde");
        assert_eq!(parse_bool_word("Si\u{301}"), Some(true));
    }

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("áéíóú", 3), "áéí");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("", 0), "");
    }

    #[test]
    fn test_parse_loose_bool() {
        assert_eq!(parse_loose_bool(&json!(true)), Some(true));
        assert_eq!(parse_loose_bool(&json!("Sí")), Some(true));
        assert_eq!(parse_loose_bool(&json!("off")), Some(false));
        assert_eq!(parse_loose_bool(&json!(0)), Some(false));
        assert_eq!(parse_loose_bool(&json!(2)), None);
        assert_eq!(parse_loose_bool(&json!("tarde")), None);
        assert_eq!(parse_loose_bool(&Value::Null), None);
    }

    #[test]
    fn test_truthiness() {
        assert!(is_truthy(&json!("x")));
        assert!(is_truthy(&json!([0])));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!({})));
    }

    #[test]
    fn test_decode_embedded_json() {
        assert_eq!(decode_embedded_json(json!("{\"a\":1}")), json!({"a": 1}));
        assert_eq!(decode_embedded_json(json!(" [1,2] ")), json!([1, 2]));
        assert_eq!(decode_embedded_json(json!("{broken")), json!("{broken"));
        assert_eq!(decode_embedded_json(json!("plain")), json!("plain"));
    }

    #[test]
    fn test_scalar_text() {
        assert_eq!(scalar_text(&json!(["1A"])), Some("1A".to_string()));
        assert_eq!(scalar_text(&json!("  ")), None);
        assert_eq!(scalar_text(&json!(7)), Some("7".to_string()));
        assert_eq!(scalar_text(&json!([])), None);
    }
}
