use serde::Serialize;
use ts_rs::TS;

/// Fixed course catalog: (code, label).
pub const COURSE_CATALOG: [(&str, &str); 12] = [
    ("1A", "1°A"),
    ("1B", "1°B"),
    ("2A", "2°A"),
    ("2B", "2°B"),
    ("3A", "3°A"),
    ("3B", "3°B"),
    ("4ECO", "4° Economía"),
    ("4NAT", "4° Naturales"),
    ("5ECO", "5° Economía"),
    ("5NAT", "5° Naturales"),
    ("6ECO", "6° Economía"),
    ("6NAT", "6° Naturales"),
];

#[derive(Debug, Clone, Serialize, PartialEq, Eq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct Course {
    #[serde(rename = "id")]
    pub code: String,
    #[serde(rename = "nombre")]
    pub label: String,
}

/// Canonical code for a user supplied course, or `None` when it is not in the
/// catalog. Whitespace is ignored and matching is case-insensitive.
pub fn normalize_course(raw: &str) -> Option<&'static str> {
    let compact: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase();
    if compact.is_empty() {
        return None;
    }
    COURSE_CATALOG
        .iter()
        .find(|(code, _)| *code == compact)
        .map(|(code, _)| *code)
}

pub fn course_label(code: &str) -> &str {
    COURSE_CATALOG
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, label)| *label)
        .unwrap_or(code)
}

impl Course {
    pub fn from_code(code: &str) -> Self {
        Self {
            code: code.to_string(),
            label: course_label(code).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_course() {
        assert_eq!(normalize_course("1a"), Some("1A"));
        assert_eq!(normalize_course(" 5 nat "), Some("5NAT"));
        assert_eq!(normalize_course("7A"), None);
        assert_eq!(normalize_course(""), None);
    }

    #[test]
    fn test_course_label_falls_back_to_code() {
        assert_eq!(course_label("4ECO"), "4° Economía");
        assert_eq!(course_label("ZZ"), "ZZ");
        assert_eq!(Course::from_code("1A").label, course_label("1A"));
    }
}
