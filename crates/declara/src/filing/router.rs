use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use chrono::Local;
use serde::Serialize;
use serde_json::json;

use super::domain::{DeclarationRow, ExcessWithdrawal, FilingRequest};
use super::service::{DeclarationError, DeclarationService};
use super::totals::DeclarationTotals;

/// Router builder exposing HTTP endpoints for declaration generation.
pub fn declaration_router(service: Arc<DeclarationService>) -> Router {
    Router::new()
        .route("/api/v1/declarations/preview", post(preview_handler))
        .route("/api/v1/declarations/render", post(render_handler))
        .with_state(service)
}

/// JSON projection of a computed filing for review before download.
#[derive(Debug, Serialize)]
pub struct DeclarationPreview {
    pub fiscal_year: String,
    pub row_count: usize,
    pub excess_row_count: usize,
    pub rows: Vec<DeclarationRow>,
    pub excess_withdrawals: Vec<ExcessWithdrawal>,
    pub totals: DeclarationTotals,
}

pub(crate) async fn preview_handler(
    State(service): State<Arc<DeclarationService>>,
    axum::Json(request): axum::Json<FilingRequest>,
) -> Response {
    match service.generate(request) {
        Ok(filing) => {
            let preview = DeclarationPreview {
                fiscal_year: filing.fiscal_year_label.clone(),
                row_count: filing.totals.row_count,
                excess_row_count: filing.totals.excess_row_count,
                rows: filing.rows,
                excess_withdrawals: filing.excess_withdrawals,
                totals: filing.totals,
            };
            (StatusCode::OK, axum::Json(preview)).into_response()
        }
        Err(error) => declaration_error_response(error),
    }
}

pub(crate) async fn render_handler(
    State(service): State<Arc<DeclarationService>>,
    axum::Json(request): axum::Json<FilingRequest>,
) -> Response {
    match service.generate(request) {
        Ok(filing) => {
            let generated_on = Local::now().date_naive();
            let file_name = filing.file_name("DIVDECL", generated_on, "txt");
            let disposition = format!("attachment; filename=\"{file_name}\"");
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                filing.render(),
            )
                .into_response()
        }
        Err(error) => declaration_error_response(error),
    }
}

fn declaration_error_response(error: DeclarationError) -> Response {
    let status = match &error {
        DeclarationError::InvalidDeclarant { .. } | DeclarationError::Credit(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
    };

    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
