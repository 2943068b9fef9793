//! Custom JSON extractor that returns errors as JSON

use axum::{
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json as AxumJson,
};
use serde::de::DeserializeOwned;

use super::error::ErrorBody;

/// JSON extractor whose rejections use the `{"error": ...}` body
#[derive(Debug, Clone, Copy, Default)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    /// Consume the extractor and return the inner value
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> std::ops::Deref for Json<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> std::ops::DerefMut for Json<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

/// Body rejection, always reported as a bad request
#[derive(Debug)]
pub struct JsonRejection {
    message: String,
}

impl IntoResponse for JsonRejection {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
        };

        (StatusCode::BAD_REQUEST, AxumJson(body)).into_response()
    }
}

impl<S, T> FromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = JsonRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match AxumJson::<T>::from_request(req, state).await {
            Ok(AxumJson(value)) => Ok(Json(value)),
            Err(rejection) => Err(JsonRejection {
                message: format_rejection_message(&rejection),
            }),
        }
    }
}

/// Format the rejection message to be more user-friendly
fn format_rejection_message(rejection: &axum::extract::rejection::JsonRejection) -> String {
    use axum::extract::rejection::JsonRejection::*;

    match rejection {
        JsonDataError(err) => format!("Invalid JSON data: {}", err.body_text()),
        JsonSyntaxError(err) => {
            format!("Invalid JSON syntax: {}", err.body_text())
        }
        MissingJsonContentType(_) => {
            "Missing Content-Type header. Expected 'application/json'.".to_string()
        }
        BytesRejection(err) => {
            format!("Failed to read request body: {}", err.body_text())
        }
        _ => "Invalid JSON request".to_string(),
    }
}

impl<T> IntoResponse for Json<T>
where
    T: serde::Serialize,
{
    fn into_response(self) -> Response {
        AxumJson(self.0).into_response()
    }
}

impl<T> From<T> for Json<T> {
    fn from(value: T) -> Self {
        Json(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::header;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct LoginBody {
        email: String,
    }

    fn request(content_type: Option<&str>, body: &str) -> Request {
        let mut builder = Request::builder().method("POST").uri("/");
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn rejection_body(rejection: JsonRejection) -> (StatusCode, ErrorBody) {
        let response = rejection.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_extracts_valid_body() {
        let Json(body) = Json::<LoginBody>::from_request(
            request(Some("application/json"), r#"{"email":"a@x.com"}"#),
            &(),
        )
        .await
        .unwrap();

        assert_eq!(body.email, "a@x.com");
    }

    #[tokio::test]
    async fn test_missing_field_is_bad_request() {
        let rejection =
            Json::<LoginBody>::from_request(request(Some("application/json"), "{}"), &())
                .await
                .unwrap_err();

        let (status, body) = rejection_body(rejection).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.error.starts_with("Invalid JSON data"));
    }

    #[tokio::test]
    async fn test_syntax_and_content_type_errors() {
        let syntax = Json::<LoginBody>::from_request(request(Some("application/json"), "{"), &())
            .await
            .unwrap_err();
        let (status, body) = rejection_body(syntax).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.error.starts_with("Invalid JSON syntax"));

        let untyped = Json::<LoginBody>::from_request(request(None, "{}"), &())
            .await
            .unwrap_err();
        let (status, body) = rejection_body(untyped).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.error.contains("Content-Type"));
    }

    #[test]
    fn test_json_deref() {
        let json = Json("hello".to_string());
        assert_eq!(*json, "hello");
        assert_eq!(json.into_inner(), "hello");
    }
}
