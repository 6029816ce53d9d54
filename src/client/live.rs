//! Reqwest-backed data source talking to the survey service and the auth
//! backend. Owns transport details only: URLs, cookies, status mapping and
//! JSON decoding.

use super::{ClientError, DataSource};
use crate::models::{
    ApprovalResponse, ApproveRequest, CreateSurveyRequest, GoogleLoginRequest, Survey, UpdateSurveyRequest, User,
};
use async_trait::async_trait;
use log::debug;
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

pub struct LiveDataSource {
    client: Client,
    base_url: Url,
}

// GET /surveys bodies seen in the wild
#[derive(Deserialize)]
#[serde(untagged)]
enum SurveyListBody {
    Page { data: Vec<Survey> },
    Wrapped { surveys: Vec<Survey> },
    Bare(Vec<Survey>),
}

impl SurveyListBody {
    fn into_surveys(self) -> Vec<Survey> {
        match self {
            SurveyListBody::Page { data } => data,
            SurveyListBody::Wrapped { surveys } => surveys,
            SurveyListBody::Bare(surveys) => surveys,
        }
    }
}

// The auth backend answers either with a user or with `{"user": null, ...}`
#[derive(Deserialize)]
#[serde(untagged)]
enum UserBody {
    Bare(User),
    Wrapped { user: Option<User> },
}

impl UserBody {
    fn into_user(self) -> Option<User> {
        match self {
            UserBody::Bare(user) => Some(user),
            UserBody::Wrapped { user } => user,
        }
    }
}

impl LiveDataSource {
    /// Build a source for `base_url` with a cookie store, so the auth
    /// backend's session cookie is sent on every later call.
    ///
    /// # Errors
    ///
    /// Returns an error when the URL is malformed or the reqwest client
    /// cannot be constructed.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ClientError::Network(format!("invalid base URL {}: {}", base_url, e)))?;
        let client = Client::builder().cookie_store(true).build().map_err(map_transport_error)?;
        Ok(Self { client, base_url })
    }

    /// One `GET /` bounded by `timeout`; succeeds when the backend answers 2xx.
    pub async fn probe(&self, timeout: Duration) -> Result<(), ClientError> {
        let url = self.url(&[])?;
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(map_transport_error)?;
        check_status(response).await.map(|_| ())
    }

    fn url(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ClientError::Network(format!("base URL cannot hold a path: {}", self.base_url)))?;
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }
}

fn map_transport_error(error: reqwest::Error) -> ClientError {
    ClientError::Network(error.to_string())
}

// Pull a readable message out of an error body
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            ["error", "detail", "message"]
                .iter()
                .find_map(|key| value.get(*key).and_then(|v| v.as_str()).map(str::to_string))
        })
        .unwrap_or_else(|| body.trim().to_string())
}

async fn check_status(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    debug!("Backend answered {}: {}", status, body);

    Err(match status {
        StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
        StatusCode::NOT_FOUND => ClientError::NotFound,
        _ => ClientError::Status(status.as_u16(), error_message(&body)),
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let response = check_status(response).await?;
    let body = response.bytes().await.map_err(map_transport_error)?;
    serde_json::from_slice(&body).map_err(|e| ClientError::Decode(e.to_string()))
}

#[async_trait]
impl DataSource for LiveDataSource {
    fn name(&self) -> &'static str {
        "live"
    }

    async fn login(&self, google_token: &str) -> Result<User, ClientError> {
        let response = self
            .client
            .post(self.url(&["auth", "google"])?)
            .json(&GoogleLoginRequest {
                token: google_token.to_string(),
            })
            .send()
            .await
            .map_err(map_transport_error)?;
        let body: UserBody = decode(response).await?;
        body.into_user().ok_or(ClientError::Unauthorized)
    }

    async fn logout(&self) -> Result<(), ClientError> {
        let response = self
            .client
            .post(self.url(&["auth", "logout"])?)
            .send()
            .await
            .map_err(map_transport_error)?;
        check_status(response).await.map(|_| ())
    }

    async fn get_user(&self) -> Result<Option<User>, ClientError> {
        let response = self
            .client
            .get(self.url(&["auth", "user"])?)
            .send()
            .await
            .map_err(map_transport_error)?;
        let body: UserBody = decode(response).await?;
        Ok(body.into_user())
    }

    async fn get_all(&self, page: u32, limit: u32) -> Result<Vec<Survey>, ClientError> {
        let response = self
            .client
            .get(self.url(&["surveys"])?)
            .query(&[("page", page), ("limit", limit)])
            .send()
            .await
            .map_err(map_transport_error)?;
        let body: SurveyListBody = decode(response).await?;
        Ok(body.into_surveys())
    }

    async fn get_by_id(&self, id: &str) -> Result<Survey, ClientError> {
        let response = self
            .client
            .get(self.url(&["surveys", id])?)
            .send()
            .await
            .map_err(map_transport_error)?;
        decode(response).await
    }

    async fn create(&self, request: &CreateSurveyRequest) -> Result<Survey, ClientError> {
        let response = self
            .client
            .post(self.url(&["surveys"])?)
            .json(request)
            .send()
            .await
            .map_err(map_transport_error)?;
        decode(response).await
    }

    async fn update(&self, id: &str, request: &UpdateSurveyRequest) -> Result<Survey, ClientError> {
        let response = self
            .client
            .patch(self.url(&["surveys", id])?)
            .json(request)
            .send()
            .await
            .map_err(map_transport_error)?;
        decode(response).await
    }

    async fn delete(&self, id: &str) -> Result<(), ClientError> {
        let response = self
            .client
            .delete(self.url(&["surveys", id])?)
            .send()
            .await
            .map_err(map_transport_error)?;
        check_status(response).await.map(|_| ())
    }

    async fn approve(&self, id: &str, request: &ApproveRequest) -> Result<ApprovalResponse, ClientError> {
        let response = self
            .client
            .post(self.url(&["surveys", id, "approve"])?)
            .json(request)
            .send()
            .await
            .map_err(map_transport_error)?;
        decode(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_keep_a_base_path_and_escape_ids() {
        let source = LiveDataSource::new("http://localhost:8000/api/").unwrap();
        let url = source.url(&["surveys", "a b/c", "approve"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/surveys/a%20b%2Fc/approve");
    }

    #[test]
    fn error_messages_prefer_json_fields() {
        assert_eq!(error_message(r#"{"error":"Survey not found"}"#), "Survey not found");
        assert_eq!(error_message(r#"{"detail":"Invalid Google token"}"#), "Invalid Google token");
        assert_eq!(error_message(" plain text "), "plain text");
    }

    #[test]
    fn user_bodies_in_both_shapes() {
        let bare: UserBody = serde_json::from_str(r#"{"email":"a@x.com","name":"A"}"#).unwrap();
        assert_eq!(bare.into_user().map(|u| u.email), Some("a@x.com".to_string()));

        let empty: UserBody = serde_json::from_str(r#"{"user":null,"message":"No active session"}"#).unwrap();
        assert_eq!(empty.into_user(), None);

        let wrapped: UserBody =
            serde_json::from_str(r#"{"message":"Login successful","user":{"email":"b@x.com","name":"B"}}"#).unwrap();
        assert_eq!(wrapped.into_user().map(|u| u.name), Some("B".to_string()));
    }

    #[test]
    fn list_bodies_in_all_shapes() {
        let page: SurveyListBody = serde_json::from_str(
            r#"{"data":[],"pagination":{"page":1,"limit":10,"total":0,"pages":0}}"#,
        )
        .unwrap();
        assert!(page.into_surveys().is_empty());

        let bare: SurveyListBody = serde_json::from_str("[]").unwrap();
        assert!(bare.into_surveys().is_empty());

        let wrapped: SurveyListBody = serde_json::from_str(r#"{"surveys":[]}"#).unwrap();
        assert!(wrapped.into_surveys().is_empty());
    }
}
