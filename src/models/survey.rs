// surveyforge-service/src/models/survey.rs
use crate::models::ServiceError;
use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const DEFAULT_APPROVER: &str = "System Admin";

// Lifecycle status of a survey
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SurveyStatus {
    #[display(fmt = "draft")]
    Draft,
    #[display(fmt = "pending-approval")]
    PendingApproval,
    #[display(fmt = "approved")]
    Approved,
    #[display(fmt = "archived")]
    Archived,
}

impl SurveyStatus {
    pub const ALL: [SurveyStatus; 4] = [
        SurveyStatus::Draft,
        SurveyStatus::PendingApproval,
        SurveyStatus::Approved,
        SurveyStatus::Archived,
    ];

    // Human label used by the dashboard
    pub fn label(&self) -> &'static str {
        match self {
            SurveyStatus::Draft => "Draft",
            SurveyStatus::PendingApproval => "Pending Review",
            SurveyStatus::Approved => "Approved",
            SurveyStatus::Archived => "Archived",
        }
    }
}

impl FromStr for SurveyStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SurveyStatus::ALL
            .into_iter()
            .find(|status| status.to_string() == s)
            .ok_or_else(|| format!("Unknown survey status: {}", s))
    }
}

// Survey record as stored and returned by the API
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Survey {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: SurveyStatus,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "timestamp_option")]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub response_count: u64,
    #[serde(default)]
    pub approver: Option<String>,
    #[serde(rename = "form_url", default, skip_serializing_if = "Option::is_none")]
    pub form_url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub questions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub candidate_emails: Vec<String>,
}

impl Survey {
    // Create a fresh draft from a create request
    pub fn new(request: CreateSurveyRequest, created_at: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: request.title,
            description: request.description,
            status: SurveyStatus::Draft,
            created_at,
            approved_at: None,
            response_count: 0,
            approver: None,
            form_url: request.form_url,
            questions: request.questions,
            candidate_emails: request.candidate_emails,
        }
    }

    // Shallow-merge a patch onto this survey.
    // approver/approvedAt are only ever set by an approval and are dropped
    // whenever the survey ends up outside the approved state.
    pub fn apply(&mut self, patch: &SurveyPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(response_count) = patch.response_count {
            self.response_count = response_count;
        }
        if let Some(form_url) = &patch.form_url {
            self.form_url = Some(form_url.clone());
        }
        if let Some(questions) = &patch.questions {
            self.questions = questions.clone();
        }

        match &patch.approval {
            Some(approval) => {
                self.status = SurveyStatus::Approved;
                self.approver = Some(approval.approver.clone());
                self.approved_at = Some(approval.approved_at);
            }
            None if self.status != SurveyStatus::Approved => {
                self.approver = None;
                self.approved_at = None;
            }
            None => {}
        }
    }

    // approvedAt and approver are set exactly when the survey is approved
    pub fn is_consistent(&self) -> bool {
        let approved = self.status == SurveyStatus::Approved;
        approved == self.approved_at.is_some() && approved == self.approver.is_some()
    }
}

// Approval stamp carried by a patch
#[derive(Debug, Clone, PartialEq)]
pub struct Approval {
    pub approver: String,
    pub approved_at: DateTime<Utc>,
}

// Internal partial update applied atomically by the store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurveyPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<SurveyStatus>,
    pub response_count: Option<u64>,
    pub form_url: Option<String>,
    pub questions: Option<Vec<String>>,
    pub approval: Option<Approval>,
}

impl SurveyPatch {
    pub fn approval(approver: String, approved_at: DateTime<Utc>) -> Self {
        Self {
            approval: Some(Approval {
                approver,
                approved_at,
            }),
            ..Default::default()
        }
    }
}

// Request body for POST /surveys
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateSurveyRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub questions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub candidate_emails: Vec<String>,
    #[serde(rename = "form_url", default, skip_serializing_if = "Option::is_none")]
    pub form_url: Option<String>,
}

// Request body for PATCH /surveys/{id}
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSurveyRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SurveyStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_count: Option<u64>,
    #[serde(rename = "form_url", default, skip_serializing_if = "Option::is_none")]
    pub form_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub questions: Option<Vec<String>>,
}

impl UpdateSurveyRequest {
    // Approval carries an approver and a date, so it has its own endpoint
    pub fn into_patch(self) -> Result<SurveyPatch, ServiceError> {
        if self.status == Some(SurveyStatus::Approved) {
            return Err(ServiceError::BadRequest(
                "Use POST /surveys/{id}/approve to approve a survey".to_string(),
            ));
        }

        Ok(SurveyPatch {
            title: self.title,
            description: self.description,
            status: self.status,
            response_count: self.response_count,
            form_url: self.form_url,
            questions: self.questions,
            approval: None,
        })
    }
}

// Request body for POST /surveys/{id}/approve.
// The dashboard historically sent recipient_email/custom_message; when both
// spellings are present, approver/notes win.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ApproveRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approver: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_message: Option<String>,
}

impl ApproveRequest {
    pub fn approver_or_default(&self) -> String {
        [&self.approver, &self.recipient_email]
            .into_iter()
            .filter_map(|approver| approver.as_deref().map(str::trim))
            .find(|approver| !approver.is_empty())
            .unwrap_or(DEFAULT_APPROVER)
            .to_string()
    }

    pub fn notes_or_default(&self) -> String {
        self.notes
            .as_ref()
            .or(self.custom_message.as_ref())
            .cloned()
            .unwrap_or_default()
    }
}

// Response body for POST /surveys/{id}/approve
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalResponse {
    pub id: String,
    pub status: SurveyStatus,
    #[serde(with = "timestamp")]
    pub approved_at: DateTime<Utc>,
    pub approver: String,
    #[serde(default)]
    pub notes: String,
}

// Raw query string of GET /surveys
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ListQuery {
    pub status: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

// Exact-match status filter of GET /surveys.
// A status string that names no known state matches nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusMatch {
    Any,
    Exactly(SurveyStatus),
    Unknown(String),
}

impl StatusMatch {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            None | Some("") | Some("all") => StatusMatch::Any,
            Some(raw) => raw
                .parse::<SurveyStatus>()
                .map(StatusMatch::Exactly)
                .unwrap_or_else(|_| StatusMatch::Unknown(raw.to_string())),
        }
    }

    pub fn matches(&self, status: SurveyStatus) -> bool {
        match self {
            StatusMatch::Any => true,
            StatusMatch::Exactly(wanted) => *wanted == status,
            StatusMatch::Unknown(_) => false,
        }
    }
}

// Validated list parameters
#[derive(Debug, Clone, PartialEq)]
pub struct ListParams {
    pub status: StatusMatch,
    pub page: u32,
    pub limit: u32,
}

impl ListQuery {
    pub fn validate(&self) -> Result<ListParams, ServiceError> {
        let page = self.page.unwrap_or(DEFAULT_PAGE);
        if page == 0 {
            return Err(ServiceError::BadRequest("page must be at least 1".to_string()));
        }

        let limit = self.limit.unwrap_or(DEFAULT_LIMIT);
        if limit == 0 {
            return Err(ServiceError::BadRequest("limit must be at least 1".to_string()));
        }

        Ok(ListParams {
            status: StatusMatch::parse(self.status.as_deref()),
            page,
            limit,
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: usize,
    pub pages: usize,
}

impl Pagination {
    pub fn new(page: u32, limit: u32, total: usize) -> Self {
        Self {
            page,
            limit,
            total,
            pages: total.div_ceil(limit.max(1) as usize),
        }
    }
}

// Response body for GET /surveys
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SurveyPage {
    pub data: Vec<Survey>,
    pub pagination: Pagination,
}

// Timestamps are written as RFC 3339; bare dates (YYYY-MM-DD) are accepted on read
pub(crate) mod timestamp {
    use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
            return Some(at.with_timezone(&Utc));
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|at| at.and_utc())
    }

    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&at.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid timestamp: {}", raw)))
    }
}

pub(crate) mod timestamp_option {
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        at: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match at {
            Some(at) => super::timestamp::serialize(at, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) => super::timestamp::parse(&raw)
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("invalid timestamp: {}", raw))),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn draft() -> Survey {
        Survey::new(
            CreateSurveyRequest {
                title: "T".to_string(),
                description: "D".to_string(),
                ..Default::default()
            },
            Utc::now(),
        )
    }

    #[test]
    fn new_survey_is_an_empty_draft() {
        let survey = draft();
        assert_eq!(survey.status, SurveyStatus::Draft);
        assert_eq!(survey.response_count, 0);
        assert!(survey.approver.is_none());
        assert!(survey.approved_at.is_none());
        assert!(!survey.id.is_empty());
        assert!(survey.is_consistent());
    }

    #[test]
    fn status_strings_match_the_wire_format() {
        assert_eq!(SurveyStatus::PendingApproval.to_string(), "pending-approval");
        assert_eq!(
            serde_json::to_value(SurveyStatus::PendingApproval).unwrap(),
            serde_json::json!("pending-approval")
        );
        assert_eq!("archived".parse::<SurveyStatus>(), Ok(SurveyStatus::Archived));
        assert!("published".parse::<SurveyStatus>().is_err());
    }

    #[test]
    fn patch_only_touches_provided_fields() {
        let mut survey = draft();
        survey.apply(&SurveyPatch {
            title: Some("Renamed".to_string()),
            ..Default::default()
        });
        assert_eq!(survey.title, "Renamed");
        assert_eq!(survey.description, "D");
        assert_eq!(survey.status, SurveyStatus::Draft);
    }

    #[test]
    fn leaving_approved_clears_the_approval_stamp() {
        let mut survey = draft();
        survey.apply(&SurveyPatch::approval("admin@x.com".to_string(), Utc::now()));
        assert_eq!(survey.status, SurveyStatus::Approved);
        assert!(survey.is_consistent());

        survey.apply(&SurveyPatch {
            status: Some(SurveyStatus::Archived),
            ..Default::default()
        });
        assert_eq!(survey.status, SurveyStatus::Archived);
        assert!(survey.approver.is_none());
        assert!(survey.is_consistent());
    }

    #[test]
    fn update_request_cannot_approve() {
        let request = UpdateSurveyRequest {
            status: Some(SurveyStatus::Approved),
            ..Default::default()
        };
        assert!(matches!(request.into_patch(), Err(ServiceError::BadRequest(_))));
    }

    #[test]
    fn approve_request_accepts_dashboard_field_names() {
        let request: ApproveRequest = serde_json::from_value(serde_json::json!({
            "recipient_email": "admin@x.com",
            "custom_message": "ship it"
        }))
        .unwrap();
        assert_eq!(request.approver_or_default(), "admin@x.com");
        assert_eq!(request.notes_or_default(), "ship it");

        let empty = ApproveRequest {
            approver: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(empty.approver_or_default(), DEFAULT_APPROVER);
        assert_eq!(empty.notes_or_default(), "");
    }

    #[test]
    fn approve_request_prefers_approver_when_both_names_are_sent() {
        let request: ApproveRequest = serde_json::from_value(serde_json::json!({
            "approver": "lead@x.com",
            "recipient_email": "other@x.com",
            "notes": "primary",
            "custom_message": "secondary"
        }))
        .unwrap();
        assert_eq!(request.approver_or_default(), "lead@x.com");
        assert_eq!(request.notes_or_default(), "primary");
    }

    #[test]
    fn list_query_defaults_and_bounds() {
        let params = ListQuery::default().validate().unwrap();
        assert_eq!(params, ListParams { status: StatusMatch::Any, page: 1, limit: 10 });

        let all = ListQuery {
            status: Some("all".to_string()),
            ..Default::default()
        };
        assert_eq!(all.validate().unwrap().status, StatusMatch::Any);

        let zero_page = ListQuery {
            page: Some(0),
            ..Default::default()
        };
        assert!(zero_page.validate().is_err());

        let zero_limit = ListQuery {
            limit: Some(0),
            ..Default::default()
        };
        assert!(zero_limit.validate().is_err());

        let large = ListQuery {
            limit: Some(5000),
            ..Default::default()
        };
        assert_eq!(large.validate().unwrap().limit, 5000);
    }

    #[test]
    fn unknown_status_matches_nothing() {
        let query = ListQuery {
            status: Some("published".to_string()),
            ..Default::default()
        };
        let status = query.validate().unwrap().status;
        assert_eq!(status, StatusMatch::Unknown("published".to_string()));
        assert!(SurveyStatus::ALL.iter().all(|known| !status.matches(*known)));

        let approved = StatusMatch::parse(Some("approved"));
        assert!(approved.matches(SurveyStatus::Approved));
        assert!(!approved.matches(SurveyStatus::Draft));
    }

    #[test]
    fn pages_round_up() {
        assert_eq!(Pagination::new(1, 10, 0).pages, 0);
        assert_eq!(Pagination::new(1, 10, 10).pages, 1);
        assert_eq!(Pagination::new(1, 10, 11).pages, 2);
    }

    #[test]
    fn bare_dates_are_read_as_midnight_utc() {
        let json = serde_json::json!({
            "id": "1",
            "title": "Legacy",
            "description": "",
            "status": "draft",
            "createdAt": "2024-03-01",
            "approvedAt": null,
            "responseCount": 0,
            "approver": null
        });
        let survey: Survey = serde_json::from_value(json).unwrap();
        assert_eq!(survey.created_at, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
    }
}
