// surveyforge-service/src/utils/mod.rs
use crate::config::StoreKind;
use crate::models::ServiceError;
use log::info;
use std::sync::Arc;

pub mod survey_storage;

pub use survey_storage::{InMemorySurveyRepository, JsonFileSurveyRepository, SurveyRepository};

// Open the store selected in the service configuration
pub fn open_repository(store: &StoreKind) -> Result<Arc<dyn SurveyRepository>, ServiceError> {
    match store {
        StoreKind::Memory => {
            info!("Keeping surveys in memory; they are lost on restart");
            Ok(Arc::new(InMemorySurveyRepository::new()))
        }
        StoreKind::JsonFile(path) => Ok(Arc::new(JsonFileSurveyRepository::open(path)?)),
    }
}
