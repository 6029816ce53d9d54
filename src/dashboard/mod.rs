//! Dashboard view state.
//!
//! The dashboard always pulls one large page from its data source and then
//! filters, sorts and paginates locally on every read. Actions never update
//! the local copy optimistically: they call the data source and re-fetch.

use crate::client::{AuthContext, ClientError, DataSource};
use crate::models::{Survey, SurveyStatus};
use derive_more::Display;
use log::{debug, error, info, warn};
use std::cmp::Ordering;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

pub mod forms;
pub mod render;

pub use forms::{ApproveForm, CreateSurveyForm, Question, QuestionKind, ValidationError};

// Size of the single page requested from the data source
pub const FETCH_LIMIT: u32 = 1000;
pub const DEFAULT_ITEMS_PER_PAGE: usize = 10;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    #[display(fmt = "all")]
    All,
    #[display(fmt = "{}", _0)]
    Only(SurveyStatus),
}

impl StatusFilter {
    pub fn matches(&self, survey: &Survey) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(status) => survey.status == *status,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatusFilter::All => "All Surveys",
            StatusFilter::Only(status) => status.label(),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(StatusFilter::All),
            other => other.parse().map(StatusFilter::Only),
        }
    }
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    #[display(fmt = "recent")]
    Recent,
    #[display(fmt = "name")]
    Name,
    #[display(fmt = "responses")]
    Responses,
}

impl SortKey {
    pub fn label(&self) -> &'static str {
        match self {
            SortKey::Recent => "Most Recent",
            SortKey::Name => "Alphabetical",
            SortKey::Responses => "Most Responses",
        }
    }

    pub fn compare(&self, a: &Survey, b: &Survey) -> Ordering {
        match self {
            SortKey::Recent => b.created_at.cmp(&a.created_at),
            SortKey::Name => a
                .title
                .to_lowercase()
                .cmp(&b.title.to_lowercase())
                .then_with(|| a.title.cmp(&b.title)),
            SortKey::Responses => b.response_count.cmp(&a.response_count),
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "recent" => Ok(SortKey::Recent),
            "name" => Ok(SortKey::Name),
            "responses" => Ok(SortKey::Responses),
            other => Err(format!("Unknown sort key: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Landing,
    Dashboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub kind: ToastKind,
    pub title: String,
    pub description: String,
}

impl Toast {
    fn success(description: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Success,
            title: "Success".to_string(),
            description: description.into(),
        }
    }

    fn error(description: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Error,
            title: "Error".to_string(),
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stats {
    pub total: usize,
    pub draft: usize,
    pub pending: usize,
    pub approved: usize,
}

pub struct Dashboard {
    source: Arc<dyn DataSource>,
    auth: AuthContext,
    surveys: Vec<Survey>,
    filter: StatusFilter,
    sort: SortKey,
    current_page: usize,
    items_per_page: usize,
    is_loading: bool,
    error: Option<String>,
    toasts: Vec<Toast>,
    view: View,
}

impl Dashboard {
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        Self {
            source,
            auth: AuthContext::new(),
            surveys: Vec::new(),
            filter: StatusFilter::All,
            sort: SortKey::Recent,
            current_page: 1,
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
            is_loading: false,
            error: None,
            toasts: Vec::new(),
            view: View::Landing,
        }
    }

    // Check for an existing session; signed-in users land on the dashboard
    pub async fn start(&mut self, auth_timeout: Duration) {
        if self.auth.check(self.source.as_ref(), auth_timeout).await {
            self.view = View::Dashboard;
            self.fetch_surveys().await;
        }
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    pub fn auth(&self) -> &AuthContext {
        &self.auth
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn surveys(&self) -> &[Survey] {
        &self.surveys
    }

    pub fn filter(&self) -> StatusFilter {
        self.filter
    }

    pub fn sort(&self) -> SortKey {
        self.sort
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn items_per_page(&self) -> usize {
        self.items_per_page
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }

    pub fn take_toasts(&mut self) -> Vec<Toast> {
        std::mem::take(&mut self.toasts)
    }

    // Demo sign-in without a backend session
    pub async fn login_local(&mut self, email: &str, name: &str, picture: Option<&str>) {
        self.auth.login(email, name, picture);
        self.view = View::Dashboard;
        self.fetch_surveys().await;
    }

    pub async fn login_with_google(&mut self, token: &str) -> Result<(), ClientError> {
        let user = self.source.login(token).await?;
        self.auth.set_user(Some(user));
        self.view = View::Dashboard;
        self.fetch_surveys().await;
        Ok(())
    }

    pub async fn logout(&mut self) {
        if let Err(e) = self.source.logout().await {
            warn!("Backend logout failed: {}", e);
        }
        self.auth.logout();
        self.leave_to_landing();
    }

    fn leave_to_landing(&mut self) {
        self.view = View::Landing;
        self.surveys.clear();
        self.current_page = 1;
    }

    // A 401 from any call ends the session
    fn handle_unauthorized(&mut self) {
        info!("Session rejected by backend, returning to landing view");
        self.auth.logout();
        self.leave_to_landing();
    }

    pub async fn fetch_surveys(&mut self) {
        self.is_loading = true;
        self.error = None;

        match self.source.get_all(1, FETCH_LIMIT).await {
            Ok(surveys) => {
                debug!("Loaded {} surveys from {}", surveys.len(), self.source.name());
                self.surveys = surveys;
            }
            Err(ClientError::Unauthorized) => self.handle_unauthorized(),
            Err(e) => {
                error!("Failed to fetch surveys: {}", e);
                self.error = Some(format!("Could not load surveys: {}", e));
                self.surveys.clear();
            }
        }

        self.clamp_page();
        self.is_loading = false;
    }

    pub fn stats(&self) -> Stats {
        let count = |status: SurveyStatus| self.surveys.iter().filter(|s| s.status == status).count();
        Stats {
            total: self.surveys.len(),
            draft: count(SurveyStatus::Draft),
            pending: count(SurveyStatus::PendingApproval),
            approved: count(SurveyStatus::Approved),
        }
    }

    // Filtered and sorted view over every fetched survey
    pub fn filtered_sorted(&self) -> Vec<&Survey> {
        let mut surveys: Vec<&Survey> = self.surveys.iter().filter(|s| self.filter.matches(s)).collect();
        surveys.sort_by(|a, b| self.sort.compare(a, b));
        surveys
    }

    // The current page of the filtered and sorted view
    pub fn visible(&self) -> Vec<&Survey> {
        let start = (self.current_page - 1) * self.items_per_page;
        self.filtered_sorted()
            .into_iter()
            .skip(start)
            .take(self.items_per_page)
            .collect()
    }

    pub fn total_pages(&self) -> usize {
        self.filtered_sorted().len().div_ceil(self.items_per_page)
    }

    // 1-based (first, last, total) for the "Showing a to b of n" line
    pub fn showing_range(&self) -> Option<(usize, usize, usize)> {
        let total = self.filtered_sorted().len();
        let start = (self.current_page - 1) * self.items_per_page;
        if start >= total {
            return None;
        }
        Some((start + 1, (start + self.items_per_page).min(total), total))
    }

    pub fn set_filter(&mut self, filter: StatusFilter) {
        self.filter = filter;
        self.current_page = 1;
    }

    pub fn set_sort(&mut self, sort: SortKey) {
        self.sort = sort;
        self.current_page = 1;
    }

    pub fn set_items_per_page(&mut self, items_per_page: usize) {
        self.items_per_page = items_per_page.max(1);
        self.current_page = 1;
    }

    pub fn go_to_page(&mut self, page: usize) {
        self.current_page = page;
        self.clamp_page();
    }

    fn clamp_page(&mut self) {
        let last = self.total_pages().max(1);
        self.current_page = self.current_page.clamp(1, last);
    }

    pub async fn survey_details(&mut self, id: &str) -> Result<Survey, ClientError> {
        let result = self.source.get_by_id(id).await;
        if let Err(ClientError::Unauthorized) = result {
            self.handle_unauthorized();
        }
        result
    }

    // Record the outcome of an action, then refresh from the source
    async fn finish_action(&mut self, outcome: Result<String, (ClientError, String)>) {
        match outcome {
            Ok(message) => self.toasts.push(Toast::success(message)),
            Err((ClientError::Unauthorized, _)) => {
                self.handle_unauthorized();
                return;
            }
            Err((e, message)) => {
                error!("Dashboard action failed: {}", e);
                self.toasts.push(Toast::error(message));
            }
        }
        self.fetch_surveys().await;
    }

    // Validation failures are returned and nothing is sent
    pub async fn create_survey(&mut self, form: &CreateSurveyForm) -> Result<(), ValidationError> {
        let request = form.validate()?;
        let outcome = match self.source.create(&request).await {
            Ok(survey) => {
                info!("Created survey {}", survey.id);
                Ok("Survey created! Awaiting review.".to_string())
            }
            Err(e) => Err((e, "Failed to create survey. Please try again.".to_string())),
        };
        self.finish_action(outcome).await;
        Ok(())
    }

    pub async fn approve_survey(&mut self, id: &str, form: &ApproveForm) -> Result<(), ValidationError> {
        let request = form.validate()?;
        let recipient = request.approver_or_default();
        let outcome = match self.source.approve(id, &request).await {
            Ok(approval) => {
                info!("Approved survey {} for {}", approval.id, approval.approver);
                Ok(format!("Survey approved for {}.", recipient))
            }
            Err(ClientError::Status(code, message)) if !message.is_empty() => {
                Err((ClientError::Status(code, message.clone()), message))
            }
            Err(e) => Err((e, "Failed to approve survey. Please try again.".to_string())),
        };
        self.finish_action(outcome).await;
        Ok(())
    }

    pub async fn delete_survey(&mut self, id: &str) {
        let outcome = match self.source.delete(id).await {
            Ok(()) => Ok("Survey deleted successfully.".to_string()),
            Err(e) => Err((e, "Failed to delete survey. Please try again.".to_string())),
        };
        self.finish_action(outcome).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::DemoDataSource;
    use crate::models::SurveyPatch;
    use chrono::{Duration as ChronoDuration, Utc};

    fn survey(id: &str, title: &str, status: SurveyStatus, days_ago: i64, responses: u64) -> Survey {
        let mut survey = Survey::new(
            crate::models::CreateSurveyRequest {
                title: title.to_string(),
                ..Default::default()
            },
            Utc::now() - ChronoDuration::days(days_ago),
        );
        survey.id = id.to_string();
        survey.response_count = responses;
        if status == SurveyStatus::Approved {
            survey.apply(&SurveyPatch::approval("a@x.com".to_string(), Utc::now()));
        } else {
            survey.status = status;
        }
        survey
    }

    async fn dashboard_with(surveys: Vec<Survey>) -> Dashboard {
        let mut dashboard = Dashboard::new(Arc::new(DemoDataSource::with_surveys(surveys)));
        dashboard.login_local("ada@example.com", "Ada", None).await;
        dashboard
    }

    fn ids(surveys: Vec<&Survey>) -> Vec<String> {
        surveys.into_iter().map(|s| s.id.clone()).collect()
    }

    #[tokio::test]
    async fn start_with_session_opens_the_dashboard() {
        let mut dashboard = Dashboard::new(Arc::new(DemoDataSource::new()));
        assert_eq!(dashboard.view(), View::Landing);
        dashboard.start(Duration::from_secs(5)).await;
        assert_eq!(dashboard.view(), View::Dashboard);
        assert_eq!(dashboard.surveys().len(), 5);
        assert_eq!(
            dashboard.stats(),
            Stats { total: 5, draft: 1, pending: 1, approved: 2 }
        );
    }

    #[tokio::test]
    async fn sorts_by_each_key() {
        let mut dashboard = dashboard_with(vec![
            survey("a", "beta", SurveyStatus::Draft, 3, 5),
            survey("b", "Alpha", SurveyStatus::Draft, 1, 50),
            survey("c", "gamma", SurveyStatus::Draft, 2, 0),
        ])
        .await;

        assert_eq!(ids(dashboard.visible()), vec!["b", "c", "a"]);
        dashboard.set_sort(SortKey::Name);
        assert_eq!(ids(dashboard.visible()), vec!["b", "a", "c"]);
        dashboard.set_sort(SortKey::Responses);
        assert_eq!(ids(dashboard.visible()), vec!["b", "a", "c"]);
    }

    #[tokio::test]
    async fn filter_and_local_pagination() {
        let surveys = (0..23)
            .map(|i| {
                let status = if i % 2 == 0 { SurveyStatus::Draft } else { SurveyStatus::Archived };
                survey(&i.to_string(), &format!("S{}", i), status, i, 0)
            })
            .collect();
        let mut dashboard = dashboard_with(surveys).await;

        assert_eq!(dashboard.total_pages(), 3);
        dashboard.go_to_page(3);
        assert_eq!(dashboard.visible().len(), 3);
        assert_eq!(dashboard.showing_range(), Some((21, 23, 23)));

        dashboard.set_filter(StatusFilter::Only(SurveyStatus::Draft));
        assert_eq!(dashboard.current_page(), 1);
        assert_eq!(dashboard.filtered_sorted().len(), 12);
        assert!(dashboard.visible().iter().all(|s| s.status == SurveyStatus::Draft));

        dashboard.go_to_page(99);
        assert_eq!(dashboard.current_page(), 2);
        dashboard.go_to_page(0);
        assert_eq!(dashboard.current_page(), 1);
    }

    #[tokio::test]
    async fn invalid_create_form_sends_nothing() {
        let mut dashboard = dashboard_with(Vec::new()).await;
        let result = dashboard.create_survey(&CreateSurveyForm::default()).await;
        assert_eq!(result, Err(ValidationError::MissingTitle));
        assert!(dashboard.surveys().is_empty());
        assert!(dashboard.toasts().is_empty());
    }

    #[tokio::test]
    async fn create_approve_delete_refresh_the_list() {
        let mut dashboard = dashboard_with(Vec::new()).await;

        dashboard
            .create_survey(&CreateSurveyForm {
                title: "Exit interview".to_string(),
                description: String::new(),
                candidate_emails: "leaver@example.com".to_string(),
                questions: "Why?".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(dashboard.surveys().len(), 1);
        let id = dashboard.surveys()[0].id.clone();

        dashboard
            .approve_survey(
                &id,
                &ApproveForm {
                    recipient_email: "hr@example.com".to_string(),
                    custom_message: String::new(),
                },
            )
            .await
            .unwrap();
        assert_eq!(dashboard.surveys()[0].status, SurveyStatus::Approved);
        assert_eq!(dashboard.surveys()[0].approver.as_deref(), Some("hr@example.com"));

        dashboard.delete_survey(&id).await;
        assert!(dashboard.surveys().is_empty());

        let toasts = dashboard.take_toasts();
        assert_eq!(toasts.len(), 3);
        assert!(toasts.iter().all(|t| t.kind == ToastKind::Success));
        assert_eq!(toasts[1].description, "Survey approved for hr@example.com.");
    }

    #[tokio::test]
    async fn failed_delete_shows_an_error_toast() {
        let mut dashboard = dashboard_with(Vec::new()).await;
        dashboard.delete_survey("missing").await;
        let toasts = dashboard.take_toasts();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].kind, ToastKind::Error);
        assert_eq!(dashboard.view(), View::Dashboard);
    }

    #[tokio::test]
    async fn logout_returns_to_landing() {
        let mut dashboard = dashboard_with(vec![survey("a", "A", SurveyStatus::Draft, 0, 0)]).await;
        dashboard.logout().await;
        assert_eq!(dashboard.view(), View::Landing);
        assert!(!dashboard.auth().is_authenticated());
        assert!(dashboard.surveys().is_empty());
    }

    #[tokio::test]
    async fn google_login_on_demo_signs_in_the_demo_user() {
        let mut dashboard = Dashboard::new(Arc::new(DemoDataSource::new()));
        dashboard.login_with_google("any-token").await.unwrap();

        assert_eq!(dashboard.view(), View::Dashboard);
        let user = dashboard.auth().user().unwrap();
        assert_eq!(user.email, "user@example.com");
        assert_eq!(user.name, "User");
        assert_eq!(dashboard.surveys().len(), 5);
    }

    #[test]
    fn filter_and_sort_parse() {
        assert_eq!("all".parse::<StatusFilter>(), Ok(StatusFilter::All));
        assert_eq!(
            "pending-approval".parse::<StatusFilter>(),
            Ok(StatusFilter::Only(SurveyStatus::PendingApproval))
        );
        assert_eq!(StatusFilter::Only(SurveyStatus::Draft).to_string(), "draft");
        assert_eq!("responses".parse::<SortKey>(), Ok(SortKey::Responses));
        assert!("oldest".parse::<SortKey>().is_err());
    }
}
