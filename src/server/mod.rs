//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

//! The HTTP surface of the service

use std::sync::Arc;

use anyhow::Context;
use anyhow::Result;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tokio::net::TcpListener;
use tokio::signal::unix::signal;
use tokio::signal::unix::SignalKind;
use tracing::info;

use crate::runtime::reports::ReportsDir;

mod handlers;

/// Shared, read-only state of the request handlers
#[derive(Debug)]
pub struct AppState {
    reports: ReportsDir,
}

impl AppState {
    pub fn new(reports: ReportsDir) -> Self {
        AppState { reports }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/analyze_vastu", post(handlers::analyze_vastu))
        .route("/compute_dasha", post(handlers::compute_dasha))
        .route("/reports", post(handlers::save_report))
        .with_state(state)
}

/// Serve on `listener` until the process receives SIGTERM or SIGINT
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> Result<()> {
    let addr = listener.local_addr().context("Getting local address of listener")?;
    info!("Listening on http://{}", addr);

    let mut terminate = signal(SignalKind::terminate()).context("Installing SIGTERM handler")?;
    let mut interrupt = signal(SignalKind::interrupt()).context("Installing SIGINT handler")?;

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move {
            tokio::select! {
                _ = terminate.recv() => info!("Received SIGTERM, shutting down"),
                _ = interrupt.recv() => info!("Received SIGINT, shutting down"),
            }
        })
        .await
        .context("Serving HTTP")
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn spawn_server(reports: &std::path::Path) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(AppState::new(ReportsDir::ensure(reports).unwrap()));

        tokio::spawn(async move {
            axum::serve(listener, router(state)).await.unwrap();
        });

        format!("http://{addr}")
    }

    /// `PORT` unset: the fallback port comes from the runtime configuration, the listener from
    /// the preflight module, and SIGTERM ends the server cleanly
    #[tokio::test]
    async fn test_serve_from_runtime_config_until_terminated() {
        use std::collections::HashMap;

        use nix::sys::signal::kill;
        use nix::sys::signal::Signal;
        use nix::unistd::Pid;

        use crate::config::RuntimeConfig;
        use crate::runtime::identity::RuntimeIdentity;
        use crate::runtime::preflight;
        use crate::runtime::preflight::Preflight;

        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(root.path().join("app")).unwrap();
        std::fs::write(root.path().join("app").join("astro_service_with_dasha.py"), "app = None\n").unwrap();

        let free_port = TcpListener::bind("127.0.0.1:0").await.unwrap().local_addr().unwrap().port();
        let env = HashMap::from([
            ("ASTROVASTU_HOST", String::from("127.0.0.1")),
            ("ASTROVASTU_APP_ROOT", root.path().display().to_string()),
            ("ASTROVASTU_FALLBACK_PORT", free_port.to_string()),
        ]);
        let config = RuntimeConfig::from_lookup(|k| env.get(k).cloned()).unwrap();
        assert_eq!(config.port(), free_port);

        let pf = Preflight::run_as(&config, RuntimeIdentity::new(1000, Some(String::from("appuser")))).unwrap();
        let listener = preflight::bind_listener(&config).await.unwrap();
        let state = Arc::new(AppState::new(pf.reports().clone()));
        let server = tokio::spawn(serve(listener, state));

        let resp = reqwest::get(format!("http://127.0.0.1:{free_port}/health")).await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);

        kill(Pid::this(), Signal::SIGTERM).unwrap();
        let result = tokio::time::timeout(std::time::Duration::from_secs(10), server)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let base = spawn_server(dir.path()).await;

        let resp = reqwest::get(format!("{base}/health")).await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body, serde_json::json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn test_root_lists_endpoints() {
        let dir = tempfile::tempdir().unwrap();
        let base = spawn_server(dir.path()).await;

        let body: serde_json::Value = reqwest::get(format!("{base}/")).await.unwrap().json().await.unwrap();
        assert_eq!(body["status"], "running");
        assert!(body["endpoints"].as_array().unwrap().iter().any(|e| e == "/compute_dasha"));
    }

    #[tokio::test]
    async fn test_analyze_vastu() {
        let dir = tempfile::tempdir().unwrap();
        let base = spawn_server(dir.path()).await;

        let resp = reqwest::Client::new()
            .post(format!("{base}/analyze_vastu"))
            .json(&serde_json::json!({
                "plot_facing": "North",
                "main_entrance": "NE",
                "rooms": [{"name": "kitchen", "sector": "SE"}]
            }))
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["entrance"], "NE");
        assert_eq!(body["recommended_activations"][0]["priority"], 0);
    }

    #[tokio::test]
    async fn test_compute_dasha() {
        let dir = tempfile::tempdir().unwrap();
        let base = spawn_server(dir.path()).await;

        let resp = reqwest::Client::new()
            .post(format!("{base}/compute_dasha"))
            .json(&serde_json::json!({"moon_longitude": 20.0, "birth_utc": "1990-01-01T00:00:00Z"}))
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["nakshatra_index"], 1);
        assert_eq!(body["mahadasha_sequence"][0]["planet"], "Venus");
        assert_eq!(body["mahadasha_sequence"][0]["antardashas"].as_array().unwrap().len(), 9);
    }

    #[tokio::test]
    async fn test_invalid_input_is_json_422() {
        let dir = tempfile::tempdir().unwrap();
        let base = spawn_server(dir.path()).await;
        let client = reqwest::Client::new();

        let resp = client
            .post(format!("{base}/compute_dasha"))
            .json(&serde_json::json!({"moon_longitude": 20.0, "birth_utc": "yesterday"}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::UNPROCESSABLE_ENTITY);
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["error"], "invalid_input");

        let resp = client
            .post(format!("{base}/analyze_vastu"))
            .header("content-type", "application/json")
            .body("{not json")
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::UNPROCESSABLE_ENTITY);
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["error"], "invalid_input");
    }

    #[tokio::test]
    async fn test_save_report() {
        let dir = tempfile::tempdir().unwrap();
        let base = spawn_server(dir.path()).await;

        let resp = reqwest::Client::new()
            .post(format!("{base}/reports"))
            .json(&serde_json::json!({"prefix": "../chart", "report": {"name": "test"}}))
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), reqwest::StatusCode::CREATED);
        let body: serde_json::Value = resp.json().await.unwrap();
        let path = std::path::PathBuf::from(body["path"].as_str().unwrap());
        assert_eq!(path.parent().unwrap(), dir.path());
        assert!(path.file_name().unwrap().to_str().unwrap().starts_with("chart_"));
        assert!(path.is_file());

        let html = std::path::PathBuf::from(body["html"].as_str().unwrap());
        assert_eq!(html, path.with_extension("html"));
        assert!(std::fs::read_to_string(html).unwrap().contains("<title>Astro Vastu Pro Report</title>"));
    }

    #[tokio::test]
    async fn test_reports_in_quick_succession() {
        let dir = tempfile::tempdir().unwrap();
        let base = spawn_server(dir.path()).await;
        let client = reqwest::Client::new();

        let mut paths = Vec::new();
        for _ in 0..3 {
            let resp = client
                .post(format!("{base}/reports"))
                .json(&serde_json::json!({
                    "prefix": "client",
                    "title": "Vastu <Summary>",
                    "report": {"person": {"name": "Ravi Kumar"}}
                }))
                .send()
                .await
                .unwrap();
            assert_eq!(resp.status(), reqwest::StatusCode::CREATED);

            let body: serde_json::Value = resp.json().await.unwrap();
            paths.push(body["html"].as_str().unwrap().to_string());
        }

        paths.sort();
        paths.dedup();
        assert_eq!(paths.len(), 3);

        let html = std::fs::read_to_string(&paths[0]).unwrap();
        assert!(html.contains("<title>Vastu &lt;Summary&gt;</title>"));
        assert!(html.contains("Client: Ravi Kumar"));
    }
}
