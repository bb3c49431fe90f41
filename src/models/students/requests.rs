use serde::{Deserialize, Deserializer};
use ts_rs::TS;

/// Enrollment payload used by imports, seeding and tests.
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/student.ts")]
pub struct CreateStudentRequest {
    pub enrollment_code: String,
    pub first_name: String,
    pub last_name: String,
    pub course: String,
    #[serde(default)]
    pub parent_user_id: Option<i64>,
    #[serde(default)]
    pub user_id: Option<i64>,
}

/// Vinculation of a student with its parent and self accounts.
///
/// Each field is independent: absent leaves the link untouched, `null`
/// clears it, a number sets it.
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/student.ts")]
pub struct LinkStudentAccountsRequest {
    #[serde(default, rename = "padre_id", deserialize_with = "deserialize_present")]
    pub parent_user_id: Option<Option<i64>>,
    #[serde(default, rename = "usuario_id", deserialize_with = "deserialize_present")]
    pub user_id: Option<Option<i64>>,
}

impl LinkStudentAccountsRequest {
    pub fn is_empty(&self) -> bool {
        self.parent_user_id.is_none() && self.user_id.is_none()
    }
}

fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<Option<i64>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<i64>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_request_distinguishes_missing_and_null() {
        let req: LinkStudentAccountsRequest =
            serde_json::from_str(r#"{"padre_id": null}"#).unwrap();
        assert_eq!(req.parent_user_id, Some(None));
        assert_eq!(req.user_id, None);
        assert!(!req.is_empty());

        let req: LinkStudentAccountsRequest = serde_json::from_str(r#"{"usuario_id": 7}"#).unwrap();
        assert_eq!(req.user_id, Some(Some(7)));
        assert!(LinkStudentAccountsRequest::default().is_empty());
    }
}
