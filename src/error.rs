use axum::{
    Json,
    extract::{FromRequest, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use snafu::Snafu;
use std::num::ParseIntError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ApiError {
    #[snafu(display("Error opening database"))]
    OpenDatabase { source: sqlx::Error },
    #[snafu(display("Error making SQL query"))]
    MakeQuery { source: sqlx::Error },
    #[snafu(display("Error migrating DB schema"))]
    MigrateError { source: sqlx::migrate::MigrateError },
    #[snafu(display("Unable to retrieve env var `{}`", name))]
    BadEnvVar {
        source: dotenvy::Error,
        name: &'static str,
    },
    #[snafu(display("Unable to parse IP port"))]
    ParsePort { source: ParseIntError },
    #[snafu(display("Unknown student store kind {:?}, expected `memory` or `postgres`", original))]
    UnknownStoreKind { original: String },
    #[snafu(display("Unable to find student with ID: {}", id))]
    MissingStudent { id: String },
    #[snafu(display("Unable to update student with ID {}, no such student exists", id))]
    CannotUpdateMissingStudent { id: String },
    #[snafu(display("A student with ID {} already exists", id))]
    DuplicateStudent { id: String },
    #[snafu(display("Invalid JSON request body: {}", source.body_text()))]
    JsonBody { source: JsonRejection },
    #[snafu(display("Error with multipart form input"))]
    Multipart {
        source: axum::extract::multipart::MultipartError,
    },
    #[snafu(display("Error with CSVs"))]
    Csv { source: csv::Error },
    #[snafu(display("Error writing CSV output"))]
    CsvWrite { source: std::io::Error },
}

impl From<JsonRejection> for ApiError {
    fn from(source: JsonRejection) -> Self {
        Self::JsonBody { source }
    }
}

/// `axum::Json`, but rejections come back as [`ApiError`] bodies.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for ApiError {
    #[allow(clippy::match_same_arms)]
    fn into_response(self) -> Response {
        const ISE: StatusCode = StatusCode::INTERNAL_SERVER_ERROR; //internal server error
        const NF: StatusCode = StatusCode::NOT_FOUND; //not found
        const BI: StatusCode = StatusCode::BAD_REQUEST; //bad input

        let status_code = match &self {
            Self::OpenDatabase { .. } | Self::MakeQuery { .. } | Self::MigrateError { .. } => ISE,
            Self::BadEnvVar { .. } | Self::ParsePort { .. } | Self::UnknownStoreKind { .. } => ISE,
            Self::MissingStudent { .. } => NF,
            Self::CannotUpdateMissingStudent { .. } => BI,
            Self::DuplicateStudent { .. } => StatusCode::CONFLICT,
            Self::JsonBody { source } => source.status(),
            Self::Multipart { source } => source.status(),
            Self::Csv { .. } | Self::CsvWrite { .. } => ISE,
        };

        error!(?self, "Error!");
        (
            status_code,
            Json(ErrorBody {
                message: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn missing_student_is_not_found_with_message() {
        let response = ApiError::MissingStudent { id: "100".into() }.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_of(response).await;
        assert_eq!(body["message"], "Unable to find student with ID: 100");
    }

    #[tokio::test]
    async fn updating_missing_student_is_bad_request() {
        let response = ApiError::CannotUpdateMissingStudent { id: "7".into() }.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_of(response).await;
        assert!(body["message"].as_str().unwrap().contains('7'));
    }

    #[tokio::test]
    async fn duplicate_student_is_conflict() {
        let response = ApiError::DuplicateStudent { id: "1".into() }.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn failing_to_write_csv_is_a_server_error() {
        let source = csv::Reader::from_reader("a,b\n1\n".as_bytes())
            .records()
            .find_map(Result::err)
            .unwrap();
        let response = ApiError::Csv { source }.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn query_errors_are_server_errors() {
        let response = ApiError::MakeQuery {
            source: sqlx::Error::RowNotFound,
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
