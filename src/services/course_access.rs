//! Which courses a user may act on.
//!
//! Teachers and preceptors are asymmetric: a teacher without
//! assignments is unrestricted, a preceptor without assignments gets
//! nothing.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::errors::Result;
use crate::models::course_assignments::entities::{AssignmentKind, CourseAssignment};
use crate::models::courses::entities::{COURSE_CATALOG, normalize_course};
use crate::models::users::entities::{User, UserRole};
use crate::storage::Storage;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CourseScope {
    All,
    /// Catalog codes; may be empty.
    Only(BTreeSet<&'static str>),
}

impl CourseScope {
    pub fn allows(&self, course: &str) -> bool {
        match self {
            CourseScope::All => normalize_course(course).is_some(),
            CourseScope::Only(courses) => {
                normalize_course(course).is_some_and(|code| courses.contains(code))
            }
        }
    }

    /// Allowed codes in catalog order.
    pub fn courses(&self) -> Vec<&'static str> {
        COURSE_CATALOG
            .iter()
            .map(|(code, _)| *code)
            .filter(|code| match self {
                CourseScope::All => true,
                CourseScope::Only(courses) => courses.contains(code),
            })
            .collect()
    }

    pub fn is_unrestricted(&self) -> bool {
        matches!(self, CourseScope::All)
    }
}

/// Pure resolution from the user and their assignment rows.
pub fn resolve_scope(user: &User, assignments: &[CourseAssignment]) -> CourseScope {
    if user.is_privileged() {
        return CourseScope::All;
    }

    let assigned = |kind: AssignmentKind| -> BTreeSet<&'static str> {
        assignments
            .iter()
            .filter(|a| a.user_id == user.id && a.kind == kind)
            .filter_map(|a| normalize_course(&a.course))
            .collect()
    };

    match user.role {
        UserRole::Teacher => {
            let courses = assigned(AssignmentKind::Teacher);
            if courses.is_empty() {
                CourseScope::All
            } else {
                CourseScope::Only(courses)
            }
        }
        UserRole::Preceptor => CourseScope::Only(assigned(AssignmentKind::Preceptor)),
        _ => CourseScope::Only(BTreeSet::new()),
    }
}

pub async fn allowed_courses(storage: &Arc<dyn Storage>, user: &User) -> Result<CourseScope> {
    if user.is_privileged() {
        return Ok(CourseScope::All);
    }
    if !matches!(user.role, UserRole::Teacher | UserRole::Preceptor) {
        return Ok(CourseScope::Only(BTreeSet::new()));
    }
    let assignments = storage.list_course_assignments(Some(user.id), None).await?;
    Ok(resolve_scope(user, &assignments))
}

pub async fn can_access(storage: &Arc<dyn Storage>, user: &User, course: &str) -> Result<bool> {
    Ok(allowed_courses(storage, user).await?.allows(course))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserStatus;

    fn user(id: i64, role: UserRole, is_staff: bool) -> User {
        User {
            id,
            username: format!("user{id}"),
            email: None,
            display_name: None,
            role,
            is_staff,
            status: UserStatus::Active,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    fn assignment(user_id: i64, course: &str, kind: AssignmentKind) -> CourseAssignment {
        CourseAssignment {
            id: 0,
            user_id,
            course: course.to_string(),
            kind,
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_teacher_without_assignments_sees_everything() {
        let scope = resolve_scope(&user(1, UserRole::Teacher, false), &[]);
        assert_eq!(scope, CourseScope::All);
        assert!(scope.allows("3B"));
        assert!(!scope.allows("9Z"));
    }

    #[test]
    fn test_preceptor_without_assignments_sees_nothing() {
        let scope = resolve_scope(&user(1, UserRole::Preceptor, false), &[]);
        assert!(!scope.allows("3B"));
        assert!(scope.courses().is_empty());
    }

    #[test]
    fn test_assignments_restrict_by_kind() {
        let rows = vec![
            assignment(1, "1a", AssignmentKind::Teacher),
            assignment(1, "2B", AssignmentKind::Preceptor),
            assignment(2, "3A", AssignmentKind::Teacher),
        ];
        let teacher = resolve_scope(&user(1, UserRole::Teacher, false), &rows);
        assert_eq!(teacher.courses(), vec!["1A"]);

        let preceptor = resolve_scope(&user(1, UserRole::Preceptor, false), &rows);
        assert_eq!(preceptor.courses(), vec!["2B"]);
    }

    #[test]
    fn test_privileged_and_other_roles() {
        assert!(resolve_scope(&user(1, UserRole::Admin, false), &[]).is_unrestricted());
        assert!(resolve_scope(&user(1, UserRole::Parent, true), &[]).is_unrestricted());
        let parent = resolve_scope(&user(1, UserRole::Parent, false), &[]);
        assert!(!parent.allows("1A"));
    }
}
