use serde::{Deserialize, Serialize};

// Signed-in user as reported by the auth backend or created by a demo login
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct User {
    #[serde(default)]
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
}

// Body for POST /auth/google
#[derive(Serialize, Deserialize, Debug)]
pub struct GoogleLoginRequest {
    pub token: String,
}
