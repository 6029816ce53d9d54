//! Offline data source over a fixed sample dataset.
//!
//! Mutations are applied to the in-process copy so a demo session stays
//! self-consistent until the process exits.

use super::{ClientError, DataSource};
use crate::models::{
    ApprovalResponse, ApproveRequest, CreateSurveyRequest, ServiceError, StatusMatch, Survey, SurveyPatch, SurveyStatus,
    UpdateSurveyRequest, User,
};
use crate::utils::survey_storage::paginate;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use log::{debug, error};
use std::sync::{Mutex, MutexGuard};

pub const DEMO_USER_EMAIL: &str = "demo@surveyforge.com";
pub const DEMO_USER_NAME: &str = "Demo User";

pub struct DemoDataSource {
    surveys: Mutex<Vec<Survey>>,
}

impl Default for DemoDataSource {
    fn default() -> Self {
        Self::new()
    }
}

fn demo_survey(
    id: &str,
    title: &str,
    description: &str,
    status: SurveyStatus,
    created_days_ago: i64,
    approval: Option<(i64, &str)>,
    response_count: u64,
    now: DateTime<Utc>,
) -> Survey {
    Survey {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        status,
        created_at: now - Duration::days(created_days_ago),
        approved_at: approval.map(|(days_ago, _)| now - Duration::days(days_ago)),
        response_count,
        approver: approval.map(|(_, approver)| approver.to_string()),
        form_url: None,
        questions: Vec::new(),
        candidate_emails: Vec::new(),
    }
}

// The sample surveys, dated relative to `now`
pub fn demo_surveys(now: DateTime<Utc>) -> Vec<Survey> {
    vec![
        demo_survey(
            "1",
            "Customer Satisfaction Survey 2024",
            "Annual customer feedback survey to measure satisfaction and identify improvement areas",
            SurveyStatus::Approved,
            15,
            Some((10, "admin@example.com")),
            342,
            now,
        ),
        demo_survey(
            "2",
            "Product Feedback Form",
            "Collect detailed feedback on our latest product features and user experience",
            SurveyStatus::PendingApproval,
            5,
            None,
            0,
            now,
        ),
        demo_survey(
            "3",
            "Employee Engagement Survey",
            "Internal survey to measure employee satisfaction and workplace culture",
            SurveyStatus::Draft,
            2,
            None,
            0,
            now,
        ),
        demo_survey(
            "4",
            "Market Research Study",
            "Research survey for understanding market trends and customer preferences",
            SurveyStatus::Approved,
            30,
            Some((28, "reviewer@example.com")),
            1250,
            now,
        ),
        demo_survey(
            "5",
            "Service Quality Assessment",
            "Evaluate the quality and efficiency of our customer service department",
            SurveyStatus::Archived,
            60,
            None,
            856,
            now,
        ),
    ]
}

impl DemoDataSource {
    pub fn new() -> Self {
        Self::with_surveys(demo_surveys(Utc::now()))
    }

    pub fn with_surveys(surveys: Vec<Survey>) -> Self {
        Self {
            surveys: Mutex::new(surveys),
        }
    }

    fn surveys(&self) -> Result<MutexGuard<'_, Vec<Survey>>, ClientError> {
        self.surveys.lock().map_err(|e| {
            error!("Demo dataset lock poisoned: {:?}", e);
            ClientError::Status(500, "demo dataset unavailable".to_string())
        })
    }

    fn apply(&self, id: &str, patch: &SurveyPatch) -> Result<Survey, ClientError> {
        let mut surveys = self.surveys()?;
        let survey = surveys
            .iter_mut()
            .find(|survey| survey.id == id)
            .ok_or(ClientError::NotFound)?;
        survey.apply(patch);
        Ok(survey.clone())
    }
}

fn demo_user(email: &str, name: &str) -> User {
    User {
        id: format!("demo-{}", email),
        email: email.to_string(),
        name: name.to_string(),
        picture: None,
    }
}

#[async_trait]
impl DataSource for DemoDataSource {
    fn name(&self) -> &'static str {
        "demo"
    }

    async fn login(&self, _google_token: &str) -> Result<User, ClientError> {
        debug!("Demo login");
        Ok(demo_user("user@example.com", "User"))
    }

    async fn logout(&self) -> Result<(), ClientError> {
        debug!("Demo logout");
        Ok(())
    }

    async fn get_user(&self) -> Result<Option<User>, ClientError> {
        Ok(Some(demo_user(DEMO_USER_EMAIL, DEMO_USER_NAME)))
    }

    async fn get_all(&self, page: u32, limit: u32) -> Result<Vec<Survey>, ClientError> {
        let surveys = self.surveys()?;
        Ok(paginate(&surveys, &StatusMatch::Any, page.max(1), limit).data)
    }

    async fn get_by_id(&self, id: &str) -> Result<Survey, ClientError> {
        self.surveys()?
            .iter()
            .find(|survey| survey.id == id)
            .cloned()
            .ok_or(ClientError::NotFound)
    }

    async fn create(&self, request: &CreateSurveyRequest) -> Result<Survey, ClientError> {
        debug!("Creating survey in demo mode: {}", request.title);
        let survey = Survey::new(request.clone(), Utc::now());
        self.surveys()?.push(survey.clone());
        Ok(survey)
    }

    async fn update(&self, id: &str, request: &UpdateSurveyRequest) -> Result<Survey, ClientError> {
        let patch = request.clone().into_patch().map_err(|e| match e {
            ServiceError::BadRequest(message) => ClientError::Status(400, message),
            other => ClientError::Status(500, other.to_string()),
        })?;
        self.apply(id, &patch)
    }

    async fn delete(&self, id: &str) -> Result<(), ClientError> {
        let mut surveys = self.surveys()?;
        let index = surveys
            .iter()
            .position(|survey| survey.id == id)
            .ok_or(ClientError::NotFound)?;
        surveys.remove(index);
        Ok(())
    }

    async fn approve(&self, id: &str, request: &ApproveRequest) -> Result<ApprovalResponse, ClientError> {
        let approved_at = Utc::now();
        let approver = request.approver_or_default();
        let survey = self.apply(id, &SurveyPatch::approval(approver.clone(), approved_at))?;
        Ok(ApprovalResponse {
            id: survey.id,
            status: SurveyStatus::Approved,
            approved_at,
            approver,
            notes: request.notes_or_default(),
        })
    }
}
