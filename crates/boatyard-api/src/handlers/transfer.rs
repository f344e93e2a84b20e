//! Transfer HTTP handlers: export, validate, preview, import.
//!
//! Bodies are taken as raw bytes and decoded here. Malformed options or
//! bundles are answered with 400 and the validator's message.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::info;

use boatyard_core::transfer::{export_data_at, export_filename, preview_import_with};
use boatyard_core::{
    import_data, validate_export_data, Bundle, Error, ExportOptions, ImportOptions, ImportResult,
    PreviewResult, TransferContext,
};

use crate::{ApiError, AppState};

/// Header naming the person or system running a transfer.
pub const OPERATOR_HEADER: &str = "x-operator";

/// Operator recorded when the header is absent or unusable.
pub const DEFAULT_OPERATOR: &str = "system";

fn operator(headers: &HeaderMap) -> String {
    headers
        .get(OPERATOR_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_OPERATOR)
        .to_string()
}

fn is_blank(body: &[u8]) -> bool {
    body.iter().all(u8::is_ascii_whitespace)
}

fn parse_bundle(body: &[u8]) -> Result<Bundle, ApiError> {
    let value: JsonValue = serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("Export data is not valid JSON: {}", e)))?;
    Ok(Bundle::from_value(value)?)
}

/// Export the selected collections as a downloadable bundle.
///
/// POST /api/v1/transfer/export
pub async fn export_bundle(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let options: ExportOptions = if is_blank(&body) {
        ExportOptions::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::BadRequest(format!("Invalid export options: {}", e)))?
    };

    let context = TransferContext::new(operator(&headers));
    let exported_at = Utc::now();
    let bundle = export_data_at(state.store.as_ref(), &options, &context, exported_at).await?;
    let document = bundle.to_json_pretty()?;

    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        export_filename(exported_at)
    ))
    .map_err(|e| ApiError::Internal(Error::Internal(e.to_string())))?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/json")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        document,
    )
        .into_response())
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ValidationResponse {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Structural check of an arbitrary document. Always 200.
///
/// POST /api/v1/transfer/validate
pub async fn validate_bundle(body: Bytes) -> Json<ValidationResponse> {
    let outcome = serde_json::from_slice::<JsonValue>(&body)
        .map_err(|e| format!("Export data is not valid JSON: {}", e))
        .and_then(|value| validate_export_data(&value));

    Json(match outcome {
        Ok(()) => ValidationResponse {
            valid: true,
            error: None,
        },
        Err(error) => ValidationResponse {
            valid: false,
            error: Some(error),
        },
    })
}

/// Dry-run a bundle against the store.
///
/// POST /api/v1/transfer/preview
pub async fn preview_bundle(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<PreviewResult>, ApiError> {
    let bundle = parse_bundle(&body)?;
    let preview =
        preview_import_with(state.store.as_ref(), &bundle, &ImportOptions::default()).await?;
    Ok(Json(preview))
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImportRequest {
    pub bundle: JsonValue,
    #[serde(default)]
    pub options: ImportOptions,
}

/// Import a bundle.
///
/// POST /api/v1/transfer/import
pub async fn import_bundle(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ImportResult>, ApiError> {
    let request: ImportRequest = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid import request: {}", e)))?;
    let bundle = Bundle::from_value(request.bundle)?;
    let context = TransferContext::new(operator(&headers));

    let result = import_data(state.store.as_ref(), &bundle, &request.options, &context).await?;

    info!(
        subsystem = "api",
        component = "transfer",
        operator = %context.operator,
        success = result.success,
        error_count = result.errors.len(),
        "Import request served"
    );
    Ok(Json(result))
}
