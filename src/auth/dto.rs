use serde::{Deserialize, Serialize};

use crate::validation::{is_valid_email, FieldErrors, Validate};

/// Request body for signup.
#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl Validate for SignupRequest {
    fn validate(&self, errors: &mut FieldErrors) {
        errors.require_not_blank("name", &self.name, "name is required");
        errors.require_not_blank("email", &self.email, "email is required");
        if !is_valid_email(self.email.trim()) {
            errors.add("email", "email is not valid");
        }
        errors.require_not_blank("password", &self.password, "password is required");
    }
}

/// Request body for login.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(&self, errors: &mut FieldErrors) {
        errors.require_not_blank("email", &self.email, "email is required");
        errors.require_not_blank("password", &self.password, "password is required");
    }
}

/// Response returned after a successful login.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub access_token: String,
}
