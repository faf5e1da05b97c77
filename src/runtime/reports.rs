//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;

use anyhow::anyhow;
use anyhow::Context;
use anyhow::Result;
use chrono::DateTime;
use chrono::Utc;
use getset::Getters;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use tracing::info;
use tracing::trace;

use crate::error::StartupError;

/// How many reports may share one prefix and timestamp
const MAX_NAME_SUFFIX: usize = 1000;

/// The writable directory report artifacts are stored in
#[derive(Clone, Debug)]
pub struct ReportsDir {
    path: PathBuf,
}

impl ReportsDir {
    /// Create the directory if it is absent and verify that we can write to it
    pub fn ensure(path: &Path) -> Result<Self, StartupError> {
        let not_writable = || StartupError::ReportsNotWritable {
            path: path.to_path_buf(),
        };

        if !path.is_dir() {
            info!("Creating reports directory {}", path.display());
            std::fs::create_dir_all(path).map_err(|e| {
                debug!("Creating {} failed: {}", path.display(), e);
                not_writable()
            })?;
        }

        let probe = path.join(format!(".astrovastu-write-probe-{}", std::process::id()));
        std::fs::write(&probe, b"")
            .and_then(|_| std::fs::remove_file(&probe))
            .map_err(|e| {
                debug!("Write probe {} failed: {}", probe.display(), e);
                not_writable()
            })?;

        Ok(ReportsDir {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Store a report as JSON plus its HTML rendering, returns the paths written
    ///
    /// Both files share the name `<prefix>_<timestamp>`. If that name is taken, a numeric suffix
    /// is appended, `<prefix>_<timestamp>_1` and so on. Nothing is written outside of the reports
    /// directory.
    pub async fn save(&self, name_prefix: &str, report: &serde_json::Value, html: &str, now: DateTime<Utc>) -> Result<SavedReport> {
        let stem = format!("{}_{}", safe_prefix(name_prefix), now.format("%Y%m%dT%H%M%SZ"));
        let content = serde_json::to_vec_pretty(report).context("Serializing report")?;

        let (json, stem) = self.create_unique(&stem, "json", &content).await?;

        let html_path = self.path.join(format!("{stem}.html"));
        write_new(&html_path, html.as_bytes())
            .await
            .with_context(|| anyhow!("Writing report to {}", html_path.display()))?;

        info!("Report written to {} and {}", json.display(), html_path.display());
        Ok(SavedReport {
            json,
            html: html_path,
        })
    }

    /// Create `<stem>.<ext>`, or the first free `<stem>_<n>.<ext>`
    async fn create_unique(&self, stem: &str, ext: &str, content: &[u8]) -> Result<(PathBuf, String)> {
        for n in 0..MAX_NAME_SUFFIX {
            let candidate = match n {
                0 => stem.to_string(),
                n => format!("{stem}_{n}"),
            };
            let path = self.path.join(format!("{candidate}.{ext}"));

            match write_new(&path, content).await {
                Ok(()) => return Ok((path, candidate)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    trace!("{} exists, trying next name", path.display());
                }
                Err(e) => {
                    return Err(e).with_context(|| anyhow!("Writing report to {}", path.display()));
                }
            }
        }

        Err(anyhow!("No free report name for '{}' in {}", stem, self.path.display()))
    }
}

/// The files one saved report consists of
#[derive(Debug, Getters)]
pub struct SavedReport {
    #[getset(get = "pub")]
    json: PathBuf,

    #[getset(get = "pub")]
    html: PathBuf,
}

/// Write to a file that must not exist yet
async fn write_new(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;

    file.write_all(content).await?;
    file.flush().await
}

/// Keep alphanumerics, '-' and '_', fall back to "report"
pub fn safe_prefix(prefix: &str) -> String {
    let safe = prefix
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
        .collect::<String>();

    if safe.is_empty() {
        String::from("report")
    } else {
        safe
    }
}
