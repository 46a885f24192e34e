use anyhow::anyhow;
use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use cohort_core::AppError;

fn format_errors(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                error
                    .message
                    .as_ref()
                    .map(|msg| msg.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field))
            })
        })
        .collect();

    for (field, nested) in errors.errors() {
        if let validator::ValidationErrorsKind::Struct(inner) = nested {
            messages.push(format!("{}: {}", field, format_errors(inner)));
        }
    }

    messages.sort();
    messages.join(", ")
}

/// Strips serde_json's "Failed to deserialize..." prefix and position suffix.
fn data_error_message(body: &str) -> String {
    let detail = body.split_once(": ").map(|(_, rest)| rest).unwrap_or(body);
    let detail = detail
        .rsplit_once(" at line ")
        .map(|(msg, _)| msg)
        .unwrap_or(detail);
    detail.to_string()
}

/// `Json<T>` that also runs `validator` rules.
///
/// Malformed bodies are rejected with 400, failed validation with 422.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                let error_msg = rejection.body_text();

                if error_msg.contains("missing field") {
                    let field = error_msg
                        .split("missing field `")
                        .nth(1)
                        .and_then(|s| s.split('`').next())
                        .unwrap_or("unknown");
                    return AppError::bad_request(anyhow!("{} is required", field));
                }

                if error_msg.contains("invalid type") {
                    return AppError::bad_request(anyhow!("Invalid field type in request"));
                }

                match rejection {
                    JsonRejection::MissingJsonContentType(_) => AppError::bad_request(anyhow!(
                        "Missing 'Content-Type: application/json' header"
                    )),
                    JsonRejection::JsonDataError(_) => {
                        AppError::bad_request(anyhow!("{}", data_error_message(&error_msg)))
                    }
                    _ => AppError::bad_request(anyhow!("Invalid request body")),
                }
            })?;

        value
            .validate()
            .map_err(|errors| AppError::unprocessable(anyhow!("{}", format_errors(&errors))))?;

        Ok(ValidatedJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::StatusCode;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct Payload {
        #[validate(length(min = 2, message = "name is too short"))]
        name: String,
        code: cohort_models::CourseCode,
    }

    fn json_request(body: &str) -> Request {
        Request::builder()
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_payload_passes() {
        let ValidatedJson(payload) =
            ValidatedJson::<Payload>::from_request(json_request(r#"{"name":"G1","code":"C1"}"#), &())
                .await
                .unwrap();
        assert_eq!(payload.name, "G1");
        assert_eq!(payload.code.as_str(), "C1");
    }

    #[tokio::test]
    async fn test_validation_failure_is_unprocessable() {
        let err = ValidatedJson::<Payload>::from_request(
            json_request(r#"{"name":"G","code":"C1"}"#),
            &(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.error.to_string(), "name is too short");
    }

    #[tokio::test]
    async fn test_missing_field_is_bad_request() {
        let err = ValidatedJson::<Payload>::from_request(json_request(r#"{"name":"G1"}"#), &())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.error.to_string(), "code is required");
    }

    #[tokio::test]
    async fn test_invalid_value_reports_reason() {
        let err = ValidatedJson::<Payload>::from_request(
            json_request(r#"{"name":"G1","code":"NOT A CODE"}"#),
            &(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.error.to_string().contains("Invalid course code"));
    }

    #[test]
    fn test_data_error_message_trims_noise() {
        let body = "Failed to deserialize the JSON body into the target type: code: Invalid course code: 'X' at line 1 column 9";
        assert_eq!(
            data_error_message(body),
            "code: Invalid course code: 'X'"
        );
    }
}
