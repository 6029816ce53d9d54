// src/client/auth.rs
use super::DataSource;
use crate::models::User;
use chrono::Utc;
use log::{debug, info};
use std::time::Duration;

// Session-wide sign-in state shared by every dashboard view
#[derive(Debug, Clone)]
pub struct AuthContext {
    user: Option<User>,
    is_loading: bool,
}

impl Default for AuthContext {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthContext {
    // Starts loading until the first check completes
    pub fn new() -> Self {
        Self {
            user: None,
            is_loading: true,
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    // One best-effort lookup of the backend session, never retried.
    // Errors and timeouts simply leave the session signed out.
    pub async fn check(&mut self, source: &dyn DataSource, timeout: Duration) -> bool {
        self.user = match tokio::time::timeout(timeout, source.get_user()).await {
            Ok(Ok(user)) => user,
            Ok(Err(e)) => {
                debug!("Auth check skipped: {}", e);
                None
            }
            Err(_) => {
                debug!("Auth check timed out after {:?}", timeout);
                None
            }
        };
        self.is_loading = false;
        self.is_authenticated()
    }

    // Local sign-in; no server session is created
    pub fn login(&mut self, email: &str, name: &str, picture: Option<&str>) -> &User {
        let user = User {
            id: format!("user-{}", Utc::now().timestamp_millis()),
            email: email.to_string(),
            name: name.to_string(),
            picture: picture.map(str::to_string),
        };
        info!("Signed in locally as {}", user.email);
        self.is_loading = false;
        self.user.insert(user)
    }

    // Clears the local user only
    pub fn logout(&mut self) {
        if let Some(user) = self.user.take() {
            info!("Signed out {}", user.email);
        }
    }

    pub fn set_user(&mut self, user: Option<User>) {
        self.user = user;
        self.is_loading = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ClientError, DemoDataSource};
    use crate::models::{ApprovalResponse, ApproveRequest, CreateSurveyRequest, Survey, UpdateSurveyRequest};
    use async_trait::async_trait;

    // Backend that never answers the session lookup in time
    struct StalledSource;

    #[async_trait]
    impl DataSource for StalledSource {
        fn name(&self) -> &'static str {
            "stalled"
        }
        async fn login(&self, _google_token: &str) -> Result<User, ClientError> {
            Err(ClientError::Unauthorized)
        }
        async fn logout(&self) -> Result<(), ClientError> {
            Ok(())
        }
        async fn get_user(&self) -> Result<Option<User>, ClientError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(None)
        }
        async fn get_all(&self, _page: u32, _limit: u32) -> Result<Vec<Survey>, ClientError> {
            Ok(Vec::new())
        }
        async fn get_by_id(&self, _id: &str) -> Result<Survey, ClientError> {
            Err(ClientError::NotFound)
        }
        async fn create(&self, _request: &CreateSurveyRequest) -> Result<Survey, ClientError> {
            Err(ClientError::Network("stalled".to_string()))
        }
        async fn update(&self, _id: &str, _request: &UpdateSurveyRequest) -> Result<Survey, ClientError> {
            Err(ClientError::NotFound)
        }
        async fn delete(&self, _id: &str) -> Result<(), ClientError> {
            Err(ClientError::NotFound)
        }
        async fn approve(&self, _id: &str, _request: &ApproveRequest) -> Result<ApprovalResponse, ClientError> {
            Err(ClientError::NotFound)
        }
    }

    #[test]
    fn starts_loading_and_signed_out() {
        let auth = AuthContext::new();
        assert!(auth.is_loading());
        assert!(!auth.is_authenticated());
    }

    #[tokio::test]
    async fn check_times_out_as_signed_out() {
        let mut auth = AuthContext::new();
        let authenticated = auth.check(&StalledSource, Duration::from_millis(50)).await;
        assert!(!authenticated);
        assert!(!auth.is_loading());
        assert!(auth.user().is_none());
    }

    #[tokio::test]
    async fn check_picks_up_the_session_user() {
        let mut auth = AuthContext::new();
        assert!(auth.check(&DemoDataSource::new(), Duration::from_secs(5)).await);
        assert_eq!(auth.user().map(|u| u.name.as_str()), Some("Demo User"));
    }

    #[test]
    fn local_login_and_logout() {
        let mut auth = AuthContext::new();
        let user = auth.login("ada@example.com", "Ada", Some("https://img/ada.png")).clone();
        assert!(user.id.starts_with("user-"));
        assert_eq!(user.picture.as_deref(), Some("https://img/ada.png"));
        assert!(auth.is_authenticated());

        auth.logout();
        assert!(!auth.is_authenticated());
    }
}
