use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

static GRADE_VALUE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(10|[1-9]|TEA|TEP|TED|NO ENTREGADO)$").expect("Invalid grade value regex")
});

static ENROLLMENT_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.-]{1,32}$").expect("Invalid enrollment code regex"));

/// Accepts "1".."10" and the qualitative marks, case-insensitively.
/// Returns the canonical spelling.
pub fn validate_grade_value(raw: &str) -> Result<String, &'static str> {
    let value = raw.trim().to_uppercase();
    let value = value.split_whitespace().collect::<Vec<_>>().join(" ");
    if GRADE_VALUE_RE.is_match(&value) {
        Ok(value)
    } else {
        Err("Calificación inválida: use 1 a 10, TEA, TEP, TED o NO ENTREGADO")
    }
}

pub fn validate_term(term: i64) -> Result<i16, &'static str> {
    match term {
        1 | 2 => Ok(term as i16),
        _ => Err("Cuatrimestre inválido: debe ser 1 o 2"),
    }
}

pub fn validate_enrollment_code(code: &str) -> Result<(), &'static str> {
    if ENROLLMENT_CODE_RE.is_match(code.trim()) {
        Ok(())
    } else {
        Err("Legajo inválido")
    }
}

/// ISO calendar date (`YYYY-MM-DD`); a trailing time part is ignored.
pub fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let date_part = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_values() {
        assert_eq!(validate_grade_value("10").unwrap(), "10");
        assert_eq!(validate_grade_value(" tea ").unwrap(), "TEA");
        assert_eq!(validate_grade_value("no  entregado").unwrap(), "NO ENTREGADO");
        assert!(validate_grade_value("0").is_err());
        assert!(validate_grade_value("11").is_err());
        assert!(validate_grade_value("7.5").is_err());
    }

    #[test]
    fn test_terms() {
        assert_eq!(validate_term(1), Ok(1));
        assert!(validate_term(3).is_err());
    }

    #[test]
    fn test_enrollment_codes() {
        assert!(validate_enrollment_code("A-001").is_ok());
        assert!(validate_enrollment_code("con espacio").is_err());
        assert!(validate_enrollment_code("").is_err());
    }

    #[test]
    fn test_parse_iso_date() {
        assert_eq!(
            parse_iso_date("2025-03-10"),
            NaiveDate::from_ymd_opt(2025, 3, 10)
        );
        assert_eq!(
            parse_iso_date("2025-03-10T08:00:00"),
            NaiveDate::from_ymd_opt(2025, 3, 10)
        );
        assert_eq!(parse_iso_date("10/03/2025"), None);
        assert_eq!(parse_iso_date("2025-02-30"), None);
    }
}
