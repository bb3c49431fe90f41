use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Account role. `Admin` is the superuser.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub enum UserRole {
    Student,
    Parent,
    Teacher,
    Preceptor,
    Admin,
}

impl UserRole {
    pub const STUDENT: &'static str = "student";
    pub const PARENT: &'static str = "parent";
    pub const TEACHER: &'static str = "teacher";
    pub const PRECEPTOR: &'static str = "preceptor";
    pub const ADMIN: &'static str = "admin";

    pub fn admin_roles() -> &'static [&'static UserRole] {
        &[&Self::Admin]
    }
    /// Roles allowed to record attendance.
    pub fn staff_roles() -> &'static [&'static UserRole] {
        &[&Self::Teacher, &Self::Preceptor, &Self::Admin]
    }
    /// Roles allowed to justify absences and edit attendance notes.
    pub fn preceptor_roles() -> &'static [&'static UserRole] {
        &[&Self::Preceptor, &Self::Admin]
    }
    pub fn all_roles() -> &'static [&'static UserRole] {
        &[
            &Self::Student,
            &Self::Parent,
            &Self::Teacher,
            &Self::Preceptor,
            &Self::Admin,
        ]
    }

    /// Accepts the English tags and the Spanish group names used by older
    /// clients (`Profesores`, `Preceptores`, ...).
    pub fn parse_loose(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "student" | "alumno" | "alumnos" => Some(Self::Student),
            "parent" | "padre" | "padres" => Some(Self::Parent),
            "teacher" | "profesor" | "profesores" => Some(Self::Teacher),
            "preceptor" | "preceptores" => Some(Self::Preceptor),
            "admin" | "directivo" | "directivos" => Some(Self::Admin),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for UserRole {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<UserRole>().map_err(|_| {
            serde::de::Error::custom(format!(
                "Rol inválido: '{s}'. Roles admitidos: student, parent, teacher, preceptor, admin"
            ))
        })
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self {
            UserRole::Student => UserRole::STUDENT,
            UserRole::Parent => UserRole::PARENT,
            UserRole::Teacher => UserRole::TEACHER,
            UserRole::Preceptor => UserRole::PRECEPTOR,
            UserRole::Admin => UserRole::ADMIN,
        };
        write!(f, "{tag}")
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            UserRole::STUDENT => Ok(UserRole::Student),
            UserRole::PARENT => Ok(UserRole::Parent),
            UserRole::TEACHER => Ok(UserRole::Teacher),
            UserRole::PRECEPTOR => Ok(UserRole::Preceptor),
            UserRole::ADMIN => Ok(UserRole::Admin),
            _ => Err(format!("Invalid user role: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub enum UserStatus {
    Active,
    Suspended,
    Banned,
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserStatus::Active => write!(f, "active"),
            UserStatus::Suspended => write!(f, "suspended"),
            UserStatus::Banned => write!(f, "banned"),
        }
    }
}

impl std::str::FromStr for UserStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(UserStatus::Active),
            "suspended" => Ok(UserStatus::Suspended),
            "banned" => Ok(UserStatus::Banned),
            _ => Err(format!("Invalid user status: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub role: UserRole,
    /// Back-office account; treated like a superuser for course scoping.
    pub is_staff: bool,
    pub status: UserStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl User {
    pub fn is_superuser(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Superusers and staff accounts bypass course scoping.
    pub fn is_privileged(&self) -> bool {
        self.is_superuser() || self.is_staff
    }

    /// Name shown in notification texts ("Registrado por ...").
    pub fn label(&self) -> String {
        match self.display_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => self.username.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip_through_str() {
        for role in UserRole::all_roles() {
            let parsed: UserRole = role.to_string().parse().unwrap();
            assert_eq!(&parsed, *role);
        }
    }

    #[test]
    fn test_parse_loose_accepts_group_names() {
        assert_eq!(UserRole::parse_loose("Preceptores"), Some(UserRole::Preceptor));
        assert_eq!(UserRole::parse_loose(" profesores "), Some(UserRole::Teacher));
        assert_eq!(UserRole::parse_loose("Directivos"), Some(UserRole::Admin));
        assert_eq!(UserRole::parse_loose("visitante"), None);
    }

    #[test]
    fn test_role_deserialize_rejects_unknown() {
        let err = serde_json::from_str::<UserRole>("\"janitor\"").unwrap_err();
        assert!(err.to_string().contains("Rol inválido"));
    }
}
