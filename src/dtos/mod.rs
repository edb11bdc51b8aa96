pub mod onboarding_dtos;
// alias so handlers can write `crate::dtos::onboarding`
pub use onboarding_dtos as onboarding;

use serde::Serialize;

/// Envelope shared by every JSON response: `{status, message, data}`
#[derive(Serialize, Debug)]
pub struct ApiResponse<T: Serialize> {
    pub status: String,
    pub message: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            data: None,
        }
    }
}
