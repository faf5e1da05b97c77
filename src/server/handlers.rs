//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use serde_json::Value;
use tracing::debug;
use tracing::error;

use crate::astro::dasha;
use crate::astro::dasha::DashaRequest;
use crate::astro::report;
use crate::astro::vastu;
use crate::astro::vastu::VastuRequest;
use crate::astro::InputError;
use crate::server::AppState;

#[derive(Debug)]
pub enum ApiError {
    InvalidInput(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::InvalidInput(m) => (StatusCode::UNPROCESSABLE_ENTITY, "invalid_input", m),
            ApiError::Internal(m) => (StatusCode::INTERNAL_SERVER_ERROR, "internal", m),
        };

        (status, Json(json!({ "error": code, "message": message }))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rej: JsonRejection) -> Self {
        ApiError::InvalidInput(rej.body_text())
    }
}

impl From<InputError> for ApiError {
    fn from(e: InputError) -> Self {
        ApiError::InvalidInput(e.to_string())
    }
}

pub async fn root() -> Json<Value> {
    Json(json!({
        "service": "AstroVastu Pro API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "endpoints": ["/analyze_vastu", "/compute_dasha", "/reports", "/health"],
    }))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn analyze_vastu(payload: Result<Json<VastuRequest>, JsonRejection>) -> Result<Json<vastu::VastuAnalysis>, ApiError> {
    let Json(request) = payload?;
    debug!("Analysing floor plan: {:?}", request);
    Ok(Json(vastu::analyze(&request)))
}

pub async fn compute_dasha(payload: Result<Json<DashaRequest>, JsonRejection>) -> Result<Json<dasha::DashaTimeline>, ApiError> {
    let Json(request) = payload?;
    debug!("Computing dasha timeline: {:?}", request);
    dasha::compute(&request).map(Json).map_err(ApiError::from)
}

#[derive(Deserialize, Debug)]
pub struct ReportRequest {
    #[serde(default)]
    prefix: String,

    #[serde(default)]
    title: Option<String>,

    /// Free text interpretation, shown in the HTML report
    #[serde(default)]
    interpretation: Option<String>,

    report: Value,
}

pub async fn save_report(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ReportRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(request) = payload?;
    let now = chrono::Utc::now();
    let internal = |e: anyhow::Error| {
        error!("Saving report failed: {:?}", e);
        ApiError::Internal(format!("{:#}", e))
    };

    let html = report::render_html(
        &request.report,
        request.title.as_deref(),
        request.interpretation.as_deref(),
        now,
    )
    .map_err(internal)?;

    let saved = state
        .reports
        .save(&request.prefix, &request.report, &html, now)
        .await
        .map_err(internal)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "path": saved.json().display().to_string(),
            "html": saved.html().display().to_string(),
        })),
    ))
}
