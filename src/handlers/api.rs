use serde::Serialize;

/// Success envelope shared by every JSON endpoint.
#[derive(Serialize, Debug, Clone)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn data(data: T) -> Self {
        ApiResponse { success: true, message: None, data: Some(data) }
    }

    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        ApiResponse { success: true, message: Some(message.into()), data: Some(data) }
    }
}

impl ApiResponse<()> {
    /// Envelope with a message and no payload (deletes, reorders).
    pub fn message(message: impl Into<String>) -> Self {
        ApiResponse { success: true, message: Some(message.into()), data: None }
    }
}

/// API error response.
#[derive(Serialize, Debug)]
pub struct ApiErrorResponse {
    pub error: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl ApiErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        ApiErrorResponse { error: true, message: message.into(), details: None }
    }

    pub fn with_details(message: impl Into<String>, details: Vec<String>) -> Self {
        ApiErrorResponse { error: true, message: message.into(), details: Some(details) }
    }
}
