pub mod link;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::errors::Result;
use crate::models::students::entities::Student;
use crate::models::students::requests::LinkStudentAccountsRequest;
use crate::services::attendance::normalize::{StudentKey, split_keys};
use crate::storage::Storage;

pub struct StudentService {
    storage: Option<Arc<dyn Storage>>,
}

impl StudentService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    pub async fn link_accounts(
        &self,
        request: &HttpRequest,
        student_id: i64,
        req: LinkStudentAccountsRequest,
    ) -> ActixResult<HttpResponse> {
        link::link_accounts(self, request, student_id, req).await
    }
}

/// Students referenced by keys, fetched with one query per key kind.
pub(crate) async fn lookup_students<'k, I>(
    storage: &Arc<dyn Storage>,
    keys: I,
) -> Result<Vec<Student>>
where
    I: IntoIterator<Item = &'k StudentKey>,
{
    let (ids, codes) = split_keys(keys);
    let mut students = if ids.is_empty() {
        Vec::new()
    } else {
        storage.get_students_by_ids(&ids).await?
    };
    if !codes.is_empty() {
        for student in storage.find_students_by_codes(&codes).await? {
            if !students.iter().any(|s| s.id == student.id) {
                students.push(student);
            }
        }
    }
    Ok(students)
}
