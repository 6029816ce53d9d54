// surveyforge-service/src/utils/survey_storage.rs
use crate::models::{CreateSurveyRequest, Pagination, ServiceError, StatusMatch, Survey, SurveyPage, SurveyPatch};
use chrono::Utc;
use log::{debug, error, info};
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

// Storage capability the routes are written against.
// Each call is one atomic read-modify-write; records keep insertion order.
pub trait SurveyRepository: Send + Sync {
    fn list(&self, status: &StatusMatch, page: u32, limit: u32) -> Result<SurveyPage, ServiceError>;
    fn get(&self, id: &str) -> Result<Option<Survey>, ServiceError>;
    fn create(&self, request: CreateSurveyRequest) -> Result<Survey, ServiceError>;
    fn update(&self, id: &str, patch: &SurveyPatch) -> Result<Option<Survey>, ServiceError>;
    fn delete(&self, id: &str) -> Result<bool, ServiceError>;
}

// Filter by exact status, then cut out one 1-indexed page
pub fn paginate(surveys: &[Survey], status: &StatusMatch, page: u32, limit: u32) -> SurveyPage {
    let filtered: Vec<&Survey> = surveys
        .iter()
        .filter(|survey| status.matches(survey.status))
        .collect();

    let start = (page.saturating_sub(1) as usize).saturating_mul(limit as usize);
    let data = filtered
        .iter()
        .skip(start)
        .take(limit as usize)
        .map(|survey| (*survey).clone())
        .collect();

    SurveyPage {
        data,
        pagination: Pagination::new(page, limit, filtered.len()),
    }
}

fn lock_surveys(surveys: &Mutex<Vec<Survey>>) -> Result<MutexGuard<'_, Vec<Survey>>, ServiceError> {
    surveys.lock().map_err(|e| {
        error!("Survey store lock poisoned: {:?}", e);
        ServiceError::InternalServerError
    })
}

fn update_in(surveys: &mut [Survey], id: &str, patch: &SurveyPatch) -> Option<Survey> {
    let survey = surveys.iter_mut().find(|survey| survey.id == id)?;
    survey.apply(patch);
    Some(survey.clone())
}

fn delete_in(surveys: &mut Vec<Survey>, id: &str) -> bool {
    match surveys.iter().position(|survey| survey.id == id) {
        Some(index) => {
            surveys.remove(index);
            true
        }
        None => false,
    }
}

// Process-lifetime store; contents vanish on restart
#[derive(Default)]
pub struct InMemorySurveyRepository {
    surveys: Mutex<Vec<Survey>>,
}

impl InMemorySurveyRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_surveys(surveys: Vec<Survey>) -> Self {
        Self {
            surveys: Mutex::new(surveys),
        }
    }
}

impl SurveyRepository for InMemorySurveyRepository {
    fn list(&self, status: &StatusMatch, page: u32, limit: u32) -> Result<SurveyPage, ServiceError> {
        let surveys = lock_surveys(&self.surveys)?;
        Ok(paginate(&surveys, status, page, limit))
    }

    fn get(&self, id: &str) -> Result<Option<Survey>, ServiceError> {
        let surveys = lock_surveys(&self.surveys)?;
        Ok(surveys.iter().find(|survey| survey.id == id).cloned())
    }

    fn create(&self, request: CreateSurveyRequest) -> Result<Survey, ServiceError> {
        let survey = Survey::new(request, Utc::now());
        lock_surveys(&self.surveys)?.push(survey.clone());
        Ok(survey)
    }

    fn update(&self, id: &str, patch: &SurveyPatch) -> Result<Option<Survey>, ServiceError> {
        let mut surveys = lock_surveys(&self.surveys)?;
        Ok(update_in(&mut surveys, id, patch))
    }

    fn delete(&self, id: &str) -> Result<bool, ServiceError> {
        let mut surveys = lock_surveys(&self.surveys)?;
        Ok(delete_in(&mut surveys, id))
    }
}

// Store backed by a single JSON array on disk.
// A mutation is only kept in memory once the rewritten file is in place.
pub struct JsonFileSurveyRepository {
    path: PathBuf,
    surveys: Mutex<Vec<Survey>>,
}

impl JsonFileSurveyRepository {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ServiceError> {
        let path = path.into();

        let surveys = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| {
                error!("Failed to read survey file {}: {:?}", path.display(), e);
                ServiceError::InternalServerError
            })?;
            if content.trim().is_empty() {
                Vec::new()
            } else {
                serde_json::from_str(&content).map_err(|e| {
                    error!("Failed to parse survey file {}: {:?}", path.display(), e);
                    ServiceError::InternalServerError
                })?
            }
        } else {
            if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(|e| {
                    error!("Failed to create survey directory: {:?}", e);
                    ServiceError::InternalServerError
                })?;
            }
            Vec::new()
        };

        info!("Opened survey file {} with {} surveys", path.display(), surveys.len());

        Ok(Self {
            path,
            surveys: Mutex::new(surveys),
        })
    }

    fn persist(&self, surveys: &[Survey]) -> Result<(), ServiceError> {
        let json = serde_json::to_string_pretty(surveys).map_err(|e| {
            error!("Failed to serialize surveys: {:?}", e);
            ServiceError::InternalServerError
        })?;

        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, json).map_err(|e| {
            error!("Failed to write survey file: {:?}", e);
            ServiceError::InternalServerError
        })?;
        fs::rename(&staging, &self.path).map_err(|e| {
            error!("Failed to replace survey file: {:?}", e);
            ServiceError::InternalServerError
        })?;

        debug!("Saved {} surveys to {}", surveys.len(), self.path.display());
        Ok(())
    }

    // Missing ids never touch the file
    fn contains(&self, id: &str) -> Result<bool, ServiceError> {
        let surveys = lock_surveys(&self.surveys)?;
        Ok(surveys.iter().any(|survey| survey.id == id))
    }

    fn mutate<T>(&self, change: impl FnOnce(&mut Vec<Survey>) -> T) -> Result<T, ServiceError> {
        let mut surveys = lock_surveys(&self.surveys)?;
        let mut next = surveys.clone();
        let outcome = change(&mut next);
        self.persist(&next)?;
        *surveys = next;
        Ok(outcome)
    }
}

impl SurveyRepository for JsonFileSurveyRepository {
    fn list(&self, status: &StatusMatch, page: u32, limit: u32) -> Result<SurveyPage, ServiceError> {
        let surveys = lock_surveys(&self.surveys)?;
        Ok(paginate(&surveys, status, page, limit))
    }

    fn get(&self, id: &str) -> Result<Option<Survey>, ServiceError> {
        let surveys = lock_surveys(&self.surveys)?;
        Ok(surveys.iter().find(|survey| survey.id == id).cloned())
    }

    fn create(&self, request: CreateSurveyRequest) -> Result<Survey, ServiceError> {
        let survey = Survey::new(request, Utc::now());
        let stored = survey.clone();
        self.mutate(move |surveys| surveys.push(stored))?;
        Ok(survey)
    }

    fn update(&self, id: &str, patch: &SurveyPatch) -> Result<Option<Survey>, ServiceError> {
        if !self.contains(id)? {
            return Ok(None);
        }
        self.mutate(|surveys| update_in(surveys, id, patch))
    }

    fn delete(&self, id: &str) -> Result<bool, ServiceError> {
        if !self.contains(id)? {
            return Ok(false);
        }
        self.mutate(|surveys| delete_in(surveys, id))
    }
}
