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
use std::path::PathBuf;

use anyhow::anyhow;
use anyhow::Context;
use anyhow::Result;
use getset::Getters;
use tokio::net::TcpListener;
use tracing::debug;
use tracing::info;

use crate::config::RuntimeConfig;
use crate::error::StartupError;
use crate::runtime::identity::RuntimeIdentity;
use crate::runtime::reports::ReportsDir;

/// The outcome of all startup checks that passed
#[derive(Debug, Getters)]
pub struct Preflight {
    #[getset(get = "pub")]
    identity: RuntimeIdentity,

    #[getset(get = "pub")]
    reports: ReportsDir,

    /// The application root, made absolute
    #[getset(get = "pub")]
    app_root: PathBuf,

    /// The file that implements the entrypoint module
    #[getset(get = "pub")]
    module_file: PathBuf,
}

impl Preflight {
    /// Run all checks for the identity of the current process
    pub fn run(config: &RuntimeConfig) -> Result<Self> {
        Self::run_as(config, RuntimeIdentity::current())
    }

    /// Run all checks, the first failing one is fatal
    pub fn run_as(config: &RuntimeConfig, identity: RuntimeIdentity) -> Result<Self> {
        debug!("Running preflight as {}", identity);
        identity
            .ensure_unprivileged()
            .context("Checking runtime identity")?;

        let reports = ReportsDir::ensure(config.reports_dir())
            .context("Checking reports directory")?;

        let app_root = std::fs::canonicalize(config.app_root())
            .map_err(|e| {
                debug!("Canonicalizing {} failed: {}", config.app_root().display(), e);
                StartupError::UnresolvableEntrypoint {
                    module: config.entrypoint().to_string(),
                    root: config.app_root().clone(),
                }
            })
            .context("Checking application root")?;

        let module_file = config
            .entrypoint()
            .resolve(&app_root)
            .context("Checking entrypoint module")?;

        info!(
            "Preflight passed: identity = {}, reports = {}, entrypoint = {} ({})",
            identity,
            reports.path().display(),
            config.entrypoint(),
            module_file.display()
        );

        Ok(Preflight {
            identity,
            reports,
            app_root,
            module_file,
        })
    }
}

/// Bind the one listening socket of this process
pub async fn bind_listener(config: &RuntimeConfig) -> Result<TcpListener> {
    match TcpListener::bind(config.bind_addr()).await {
        Ok(listener) => {
            debug!("Bound {}", config.bind_addr());
            Ok(listener)
        }
        Err(e) if e.kind() == ErrorKind::AddrInUse => Err(StartupError::PortInUse {
            host: config.host().clone(),
            port: config.port(),
        })
        .context("Binding listener"),
        Err(e) => Err(e).with_context(|| anyhow!("Binding listener to {}", config.bind_addr())),
    }
}

/// Verify that the port can be bound, without keeping it
pub async fn probe_port(config: &RuntimeConfig) -> Result<()> {
    bind_listener(config).await.map(drop)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::runtime::entrypoint::ModuleSpec;

    fn app_tree(root: &Path) {
        std::fs::create_dir_all(root.join("app")).unwrap();
        std::fs::write(root.join("app").join("astro_service_with_dasha.py"), "app = None\n").unwrap();
    }

    fn config(root: &Path, port: u16) -> RuntimeConfig {
        RuntimeConfig::builder()
            .port(port)
            .host(String::from("127.0.0.1"))
            .app_root(root.to_path_buf())
            .reports_dir(root.join("reports"))
            .entrypoint(ModuleSpec::parse("app.astro_service_with_dasha:app").unwrap())
            .build()
    }

    fn unprivileged() -> RuntimeIdentity {
        RuntimeIdentity::new(1000, Some(String::from("appuser")))
    }

    #[test]
    fn test_preflight_passes_and_creates_reports() {
        let root = tempfile::tempdir().unwrap();
        app_tree(root.path());

        let pf = Preflight::run_as(&config(root.path(), 8000), unprivileged()).unwrap();
        assert!(root.path().join("reports").is_dir());
        assert!(pf.module_file().ends_with("app/astro_service_with_dasha.py"));
        assert!(pf.app_root().is_absolute());
    }

    #[test]
    fn test_preflight_refuses_root() {
        let root = tempfile::tempdir().unwrap();
        app_tree(root.path());

        let err = Preflight::run_as(&config(root.path(), 8000), RuntimeIdentity::new(0, None)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StartupError>(),
            Some(StartupError::PrivilegedIdentity { uid: 0 })
        ));
        // nothing was touched before the identity check failed
        assert!(!root.path().join("reports").exists());
    }

    #[test]
    fn test_preflight_missing_module() {
        let root = tempfile::tempdir().unwrap();

        let err = Preflight::run_as(&config(root.path(), 8000), unprivileged()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StartupError>(),
            Some(StartupError::UnresolvableEntrypoint { .. })
        ));
    }

    #[tokio::test]
    async fn test_port_in_use() {
        let root = tempfile::tempdir().unwrap();
        let held = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = held.local_addr().unwrap().port();

        let err = probe_port(&config(root.path(), port)).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StartupError>(),
            Some(StartupError::PortInUse { .. })
        ));

        drop(held);
        assert!(probe_port(&config(root.path(), port)).await.is_ok());
    }
}
