//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

use getset::{CopyGetters, Getters};
use serde::Deserialize;

use crate::config::util::*;
use crate::error::BuildError;
use crate::runtime::entrypoint::ModuleSpec;

/// Configuration of the process entrypoint
///
/// There is exactly one canonical module path. The application root is made importable through
/// `PYTHONPATH`, an explicit application directory flag is never passed to the server.
#[derive(Clone, Debug, Getters, CopyGetters, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntrypointConfig {
    /// The ASGI server executable
    #[serde(default = "default_server")]
    #[getset(get = "pub")]
    server: String,

    /// `dotted.module:attribute`
    #[serde(default = "default_module")]
    #[getset(get = "pub")]
    module: String,

    /// The environment variable the port is read from at start time
    #[serde(default = "default_port_env")]
    #[getset(get = "pub")]
    port_env: String,

    #[serde(default = "default_fallback_port")]
    #[getset(get_copy = "pub")]
    fallback_port: u16,

    #[serde(default = "default_workers")]
    #[getset(get_copy = "pub")]
    workers: u16,

    /// Additional arguments appended to the server command
    #[serde(default)]
    #[getset(get = "pub")]
    server_args: Vec<String>,
}

impl EntrypointConfig {
    pub fn module_spec(&self) -> Result<ModuleSpec, BuildError> {
        ModuleSpec::parse(&self.module)
    }

    pub(in crate::config) fn check(&self) -> Result<(), BuildError> {
        let _ = self.module_spec()?;

        let invalid = |reason: String| BuildError::InvalidEntrypoint {
            entrypoint: self.module.clone(),
            reason,
        };

        if self.server.trim().is_empty() || self.server.contains(char::is_whitespace) {
            return Err(invalid(format!("server must be a single executable name, got '{}'", self.server)));
        }

        if self.workers != crate::consts::WORKERS {
            return Err(invalid(format!("exactly {} worker is supported, got {}", crate::consts::WORKERS, self.workers)));
        }

        if self.fallback_port == 0 {
            return Err(invalid(String::from("fallback port must not be 0")));
        }

        if !self.port_env.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') || self.port_env.is_empty() {
            return Err(invalid(format!("not a valid environment variable name: '{}'", self.port_env)));
        }

        // the application root is importable via PYTHONPATH, mixing in the other convention
        // makes the module path ambiguous
        if self.server_args.iter().any(|a| a == "--app-dir" || a.starts_with("--app-dir=")) {
            return Err(invalid(String::from("'--app-dir' conflicts with the PYTHONPATH convention")));
        }

        for reserved in ["--host", "--port", "--workers"] {
            if self.server_args.iter().any(|a| a == reserved || a.starts_with(&format!("{reserved}="))) {
                return Err(invalid(format!("'{reserved}' is set by the launch command and must not be overridden")));
            }
        }

        Ok(())
    }
}

impl Default for EntrypointConfig {
    fn default() -> Self {
        EntrypointConfig {
            server: default_server(),
            module: default_module(),
            port_env: default_port_env(),
            fallback_port: default_fallback_port(),
            workers: default_workers(),
            server_args: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_args(args: &[&str]) -> EntrypointConfig {
        EntrypointConfig {
            server_args: args.iter().map(|s| s.to_string()).collect(),
            ..EntrypointConfig::default()
        }
    }

    #[test]
    fn test_default_is_valid() {
        assert!(EntrypointConfig::default().check().is_ok());
    }

    #[test]
    fn test_app_dir_is_refused() {
        assert!(with_args(&["--app-dir", "app"]).check().is_err());
        assert!(with_args(&["--app-dir=app"]).check().is_err());
    }

    #[test]
    fn test_reserved_args_are_refused() {
        assert!(with_args(&["--port", "9000"]).check().is_err());
        assert!(with_args(&["--workers=4"]).check().is_err());
        assert!(with_args(&["--proxy-headers"]).check().is_ok());
    }

    #[test]
    fn test_more_than_one_worker_is_refused() {
        let cfg = EntrypointConfig {
            workers: 4,
            ..EntrypointConfig::default()
        };
        assert!(cfg.check().is_err());
    }

    #[test]
    fn test_bad_module_is_refused() {
        let cfg = EntrypointConfig {
            module: String::from("astro_service_with_dasha"),
            ..EntrypointConfig::default()
        };
        assert!(cfg.check().is_err());
    }
}
