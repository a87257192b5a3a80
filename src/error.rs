use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// User-friendly error presentation for API clients.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorPresentation {
    pub title: String,
    pub message: String,
    pub action: Option<String>,
}

/// JSON body returned for every failed request.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    title: String,
    action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    missing_columns: Option<Vec<String>>,
}

/// Application-wide error type.
#[derive(Debug, Error)]
pub enum AppError {
    // ── Request ───────────────────────────────────────────────────────────────
    #[error("No files were uploaded")]
    NoFiles,

    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    #[error("Upload exceeds the size limit")]
    UploadTooLarge,

    // ── Ingestion ─────────────────────────────────────────────────────────────
    #[error("File {filename} is empty")]
    EmptyFile { filename: String },

    #[error("File {filename} is not valid UTF-8")]
    NotUtf8 { filename: String },

    #[error("Error reading file {filename}: {message}")]
    CsvInvalid { filename: String, message: String },

    #[error("Missing columns in {filename}: {missing:?}")]
    MissingColumns {
        filename: String,
        missing: Vec<String>,
    },

    // ── Partitioning ──────────────────────────────────────────────────────────
    #[error("Invalid Last Weight Zscore {value:?} in {filename} at line {line}")]
    InvalidScore {
        filename: String,
        line: u64,
        value: String,
    },

    // ── Rendering / Delivery ──────────────────────────────────────────────────
    #[error("Failed to build workbook for {filename}: {message}")]
    Render { filename: String, message: String },

    #[error("Delivery failed: {0}")]
    Delivery(String),

    // ── Startup ───────────────────────────────────────────────────────────────
    #[error("Invalid configuration: {0}")]
    Config(String),

    // ── Generic fallback ──────────────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error. Caller mistakes are 4xx, everything the
    /// caller cannot fix by resubmitting different input is 5xx.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NoFiles
            | AppError::InvalidUpload(_)
            | AppError::EmptyFile { .. }
            | AppError::NotUtf8 { .. }
            | AppError::CsvInvalid { .. }
            | AppError::MissingColumns { .. }
            | AppError::InvalidScore { .. } => StatusCode::BAD_REQUEST,
            AppError::UploadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Render { .. }
            | AppError::Delivery(_)
            | AppError::Config(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converts the error into a presentation suitable for API clients.
    /// Server-side details (paths, I/O messages) never leave the process.
    pub fn to_presentation(&self) -> ErrorPresentation {
        match self {
            AppError::NoFiles => ErrorPresentation {
                title: "No Files".into(),
                message: "The request did not contain any files.".into(),
                action: Some("Attach one or more CSV files under the \"files\" field".into()),
            },

            AppError::InvalidUpload(msg) => ErrorPresentation {
                title: "Invalid Upload".into(),
                message: format!("The upload could not be read: {}", msg),
                action: Some("Resubmit the files as multipart/form-data".into()),
            },

            AppError::UploadTooLarge => ErrorPresentation {
                title: "Upload Too Large".into(),
                message: "The uploaded files exceed the size this service accepts.".into(),
                action: Some("Split the export into smaller files".into()),
            },

            AppError::EmptyFile { filename } => ErrorPresentation {
                title: "Empty File".into(),
                message: format!("{} contains no data.", filename),
                action: Some("Upload a CSV export with a header row".into()),
            },

            AppError::NotUtf8 { filename } => ErrorPresentation {
                title: "Invalid File Encoding".into(),
                message: format!(
                    "{} must be UTF-8 encoded. Please re-save the file with UTF-8 encoding.",
                    filename
                ),
                action: Some("Convert file to UTF-8".into()),
            },

            AppError::CsvInvalid { filename, message } => ErrorPresentation {
                title: "Invalid CSV".into(),
                message: format!("{} has a formatting problem: {}", filename, message),
                action: Some("Fix the CSV file and try again".into()),
            },

            AppError::MissingColumns { filename, missing } => ErrorPresentation {
                title: "Missing Columns".into(),
                message: format!("{} is missing required columns: {}", filename, missing.join(", ")),
                action: Some("Export the report with all required columns".into()),
            },

            AppError::InvalidScore {
                filename,
                line,
                value,
            } => ErrorPresentation {
                title: "Invalid Z-score".into(),
                message: format!(
                    "{} has a non-numeric Last Weight Zscore {:?} on line {}.",
                    filename, value, line
                ),
                action: Some("Correct or clear the value and try again".into()),
            },

            AppError::Render { filename, .. } => ErrorPresentation {
                title: "Workbook Error".into(),
                message: format!("The workbook for {} could not be generated.", filename),
                action: Some("Try again".into()),
            },

            AppError::Delivery(_) => ErrorPresentation {
                title: "Delivery Failed".into(),
                message: "The processed files could not be saved.".into(),
                action: Some("Try again".into()),
            },

            AppError::Config(msg) => ErrorPresentation {
                title: "Configuration Error".into(),
                message: msg.clone(),
                action: Some("Fix the environment and restart the service".into()),
            },

            AppError::Internal(_) => ErrorPresentation {
                title: "Unexpected Error".into(),
                message: "Something went wrong. Please try again.".into(),
                action: Some("Try again".into()),
            },
        }
    }
}

impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_presentation().serialize(serializer)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("[HTTP] {} failed: {}", status, self);
        } else {
            tracing::warn!("[HTTP] {} rejected: {}", status, self);
        }

        let presentation = self.to_presentation();
        let missing_columns = match &self {
            AppError::MissingColumns { missing, .. } => Some(missing.clone()),
            _ => None,
        };
        let body = ErrorBody {
            error: presentation.message,
            title: presentation.title,
            action: presentation.action,
            missing_columns,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_variants() -> Vec<AppError> {
        vec![
            AppError::NoFiles,
            AppError::InvalidUpload("boundary missing".into()),
            AppError::UploadTooLarge,
            AppError::EmptyFile { filename: "a.csv".into() },
            AppError::NotUtf8 { filename: "a.csv".into() },
            AppError::CsvInvalid {
                filename: "a.csv".into(),
                message: "no header row".into(),
            },
            AppError::MissingColumns {
                filename: "a.csv".into(),
                missing: vec!["Child DOB".into()],
            },
            AppError::InvalidScore {
                filename: "a.csv".into(),
                line: 4,
                value: "n/a".into(),
            },
            AppError::Render {
                filename: "a.csv".into(),
                message: "sheet name".into(),
            },
            AppError::Delivery("/srv/processed: disk full".into()),
            AppError::Config("bad bind address".into()),
            AppError::Internal("join error".into()),
        ]
    }

    #[test]
    fn all_variants_have_nonempty_title_and_message() {
        for variant in all_variants() {
            let presentation = variant.to_presentation();
            assert!(!presentation.title.trim().is_empty(), "Empty title for {:?}", variant);
            assert!(!presentation.message.trim().is_empty(), "Empty message for {:?}", variant);
        }
    }

    #[test]
    fn caller_errors_are_bad_request() {
        let caller = [
            AppError::NoFiles,
            AppError::NotUtf8 { filename: "a.csv".into() },
            AppError::MissingColumns {
                filename: "a.csv".into(),
                missing: vec![],
            },
            AppError::InvalidScore {
                filename: "a.csv".into(),
                line: 2,
                value: "x".into(),
            },
        ];
        for variant in caller {
            assert_eq!(variant.status_code(), StatusCode::BAD_REQUEST, "{:?}", variant);
        }
    }

    #[test]
    fn processing_errors_are_server_errors() {
        let server = [
            AppError::Render {
                filename: "a.csv".into(),
                message: "x".into(),
            },
            AppError::Delivery("x".into()),
            AppError::Internal("x".into()),
        ];
        for variant in server {
            assert_eq!(
                variant.status_code(),
                StatusCode::INTERNAL_SERVER_ERROR,
                "{:?}",
                variant
            );
        }
    }

    #[test]
    fn messages_name_the_offending_file() {
        for variant in all_variants() {
            let presentation = variant.to_presentation();
            if variant.to_string().contains("a.csv") {
                assert!(
                    presentation.message.contains("a.csv"),
                    "Presentation for {:?} should name the file",
                    variant
                );
            }
        }
    }

    #[test]
    fn server_paths_do_not_leak() {
        let presentation = AppError::Delivery("/srv/processed: disk full".into()).to_presentation();
        assert!(!presentation.message.contains("/srv/processed"));
    }

    #[test]
    fn serialization_produces_presentation_fields() {
        for variant in all_variants() {
            let json = serde_json::to_value(&variant).expect("serialize");
            assert!(json.get("title").is_some(), "{:?} missing title", variant);
            assert!(json.get("message").is_some(), "{:?} missing message", variant);
            assert!(json.get("action").is_some(), "{:?} missing action", variant);
        }
    }

    #[tokio::test]
    async fn missing_columns_response_lists_fields() {
        let response = AppError::MissingColumns {
            filename: "cases.csv".into(),
            missing: vec!["Child DOB".into()],
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(json["missing_columns"], serde_json::json!(["Child DOB"]));
        assert!(json["error"].as_str().unwrap_or_default().contains("cases.csv"));
    }
}
