//! Crate-wide error type.
//!
//! Variants are generated by a macro so every error carries a stable code and
//! a human readable type name.

use std::fmt;

/// Generates the `BoletinError` enum together with:
/// - `code()` returning the stable error code
/// - `error_type()` returning the type name
/// - `message()` returning the detail
/// - one snake_case constructor per variant
macro_rules! define_boletin_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone)]
        pub enum BoletinError {
            $($variant(String),)*
        }

        impl BoletinError {
            pub fn code(&self) -> &'static str {
                match self {
                    $(BoletinError::$variant(_) => $code,)*
                }
            }

            pub fn error_type(&self) -> &'static str {
                match self {
                    $(BoletinError::$variant(_) => $type_name,)*
                }
            }

            pub fn message(&self) -> &str {
                match self {
                    $(BoletinError::$variant(msg) => msg,)*
                }
            }
        }

        paste::paste! {
            impl BoletinError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        BoletinError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_boletin_errors! {
    CacheConnection("E001", "Cache Connection Error"),
    DatabaseConfig("E003", "Database Configuration Error"),
    DatabaseConnection("E004", "Database Connection Error"),
    DatabaseOperation("E005", "Database Operation Error"),
    Io("E006", "IO Error"),
    Validation("E007", "Validation Error"),
    Serialization("E009", "Serialization Error"),
    Conflict("E010", "Unique Constraint Conflict"),
    DateParse("E011", "Date Parse Error"),
}

impl BoletinError {
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for BoletinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for BoletinError {}

impl From<sea_orm::DbErr> for BoletinError {
    fn from(err: sea_orm::DbErr) -> Self {
        BoletinError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for BoletinError {
    fn from(err: std::io::Error) -> Self {
        BoletinError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for BoletinError {
    fn from(err: serde_json::Error) -> Self {
        BoletinError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for BoletinError {
    fn from(err: chrono::ParseError) -> Self {
        BoletinError::DateParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BoletinError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(BoletinError::cache_connection("test").code(), "E001");
        assert_eq!(BoletinError::database_config("test").code(), "E003");
        assert_eq!(BoletinError::validation("test").code(), "E007");
        assert_eq!(BoletinError::date_parse("test").code(), "E011");
    }

    #[test]
    fn test_error_types() {
        assert_eq!(
            BoletinError::cache_connection("test").error_type(),
            "Cache Connection Error"
        );
        assert_eq!(
            BoletinError::validation("test").error_type(),
            "Validation Error"
        );
    }

    #[test]
    fn test_error_message() {
        let err = BoletinError::validation("Invalid input");
        assert_eq!(err.message(), "Invalid input");
    }

    #[test]
    fn test_constructor_names_follow_variants() {
        assert_eq!(BoletinError::io("disk").code(), "E006");
        assert_eq!(BoletinError::conflict("dup").code(), "E010");
        assert_eq!(BoletinError::serialization("x").error_type(), "Serialization Error");
    }

    #[test]
    fn test_date_parse_conversion() {
        let err: BoletinError = chrono::NaiveDate::parse_from_str("2025-13-40", "%Y-%m-%d")
            .unwrap_err()
            .into();
        assert_eq!(err.code(), "E011");
    }

    #[test]
    fn test_format_simple() {
        let err = BoletinError::validation("Invalid URL");
        let formatted = err.format_simple();
        assert!(formatted.contains("Validation Error"));
        assert!(formatted.contains("Invalid URL"));
    }
}
