pub mod create;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::sanctions::requests::CreateSanctionRequest;
use crate::storage::Storage;

pub struct SanctionService {
    storage: Option<Arc<dyn Storage>>,
}

impl SanctionService {
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

    pub async fn create_sanction(
        &self,
        request: &HttpRequest,
        req: CreateSanctionRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_sanction(self, request, req).await
    }
}
