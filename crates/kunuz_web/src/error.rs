use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<kunuz_core::Error> for ApiError {
    fn from(err: kunuz_core::Error) -> Self {
        if err.is_client_error() {
            ApiError::BadRequest(err.to_string())
        } else {
            ApiError::Internal(err.to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_errors_map_to_status() {
        let bad = ApiError::from(kunuz_core::Error::Config("bad date".to_string()));
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);

        let unknown = ApiError::from(kunuz_core::Error::UnknownCategory("foo".to_string()));
        assert_eq!(unknown.status(), StatusCode::BAD_REQUEST);

        let browser = ApiError::from(kunuz_core::Error::Browser("no chrome".to_string()));
        assert_eq!(browser.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(browser.to_string().contains("no chrome"));
    }
}
