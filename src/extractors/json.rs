use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::{ApiError, ValidationDetail};

/// JSON extractor that deserializes and validates the request payload.
///
/// Shape failures are reported as a structured per-field detail list with
/// HTTP 422, distinct from the domain-error taxonomy.
pub struct Json<T>(pub T);

impl<S, T> FromRequest<S> for Json<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        let bytes = axum::body::to_bytes(req.into_body(), usize::MAX)
            .await
            .map_err(|e| ApiError::Internal(format!("Failed to read body: {}", e)))?;

        let value: T = serde_json::from_slice(&bytes).map_err(|e| {
            ApiError::Validation(vec![ValidationDetail {
                kind: "json_invalid".to_string(),
                field: "body".to_string(),
                message: e.to_string(),
                input: serde_json::Value::Null,
            }])
        })?;

        value.validate().map_err(|errors| {
            let details = errors
                .field_errors()
                .into_iter()
                .flat_map(|(field, errs)| {
                    errs.iter().map(move |err| ValidationDetail {
                        kind: err.code.to_string(),
                        field: field.to_string(),
                        message: err
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| format!("invalid value for '{}'", field)),
                        input: err
                            .params
                            .get("value")
                            .cloned()
                            .unwrap_or(serde_json::Value::Null),
                    })
                })
                .collect();
            ApiError::Validation(details)
        })?;

        Ok(Json(value))
    }
}

impl<T: serde::Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        let bytes = serde_json::to_vec(&self.0).unwrap_or_default();
        (
            StatusCode::OK,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            bytes,
        )
            .into_response()
    }
}
