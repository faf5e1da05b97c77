//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use getset::{CopyGetters, Getters};
use tracing::debug;
use typed_builder::TypedBuilder;

use crate::consts::*;
use crate::error::StartupError;
use crate::runtime::entrypoint::ModuleSpec;

/// Process-wide configuration, read once from the environment at start time
///
/// Nothing else in the crate reads these environment variables. The struct is immutable and
/// passed by reference to everything that needs it.
#[derive(Clone, Debug, Getters, CopyGetters, TypedBuilder)]
pub struct RuntimeConfig {
    #[getset(get_copy = "pub")]
    port: u16,

    #[builder(default = String::from(DEFAULT_HOST))]
    #[getset(get = "pub")]
    host: String,

    #[getset(get = "pub")]
    app_root: PathBuf,

    #[getset(get = "pub")]
    reports_dir: PathBuf,

    #[getset(get = "pub")]
    entrypoint: ModuleSpec,

    #[builder(default = PathBuf::from("/home").join(DEFAULT_IDENTITY_NAME))]
    #[getset(get = "pub")]
    identity_home: PathBuf,

    /// The executable search path the process was started with
    #[builder(default)]
    #[getset(get = "pub")]
    search_path: Option<String>,
}

impl RuntimeConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from a key lookup, applying the documented fallbacks
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
        where F: Fn(&str) -> Option<String>
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        // the image names the port variable and its fallback, see the environment build step
        let port_env = get(ENV_PORT_ENV).unwrap_or_else(|| String::from(PORT_ENV));
        let fallback_port = match get(ENV_FALLBACK_PORT) {
            None => DEFAULT_PORT,
            Some(value) => parse_port(ENV_FALLBACK_PORT, value)?,
        };
        let port = match get(&port_env) {
            None => fallback_port,
            Some(value) => parse_port(&port_env, value)?,
        };

        let app_root = get(ENV_APP_ROOT)
            .map(|v| absolute_path(ENV_APP_ROOT, v))
            .transpose()?
            .unwrap_or_else(|| PathBuf::from(DEFAULT_APP_ROOT));

        let reports_dir = get(ENV_REPORTS_DIR)
            .map(|v| absolute_path(ENV_REPORTS_DIR, v))
            .transpose()?
            .unwrap_or_else(|| app_root.join(REPORTS_DIR_NAME));

        let entrypoint = get(ENV_ENTRYPOINT).unwrap_or_else(|| String::from(DEFAULT_ENTRYPOINT));
        let entrypoint = ModuleSpec::parse(&entrypoint)
            .with_context(|| anyhow::anyhow!("Parsing ${}", ENV_ENTRYPOINT))?;

        let host = get(ENV_HOST).unwrap_or_else(|| String::from(DEFAULT_HOST));
        let identity_home = get(ENV_IDENTITY_HOME)
            .map(|v| absolute_path(ENV_IDENTITY_HOME, v))
            .transpose()?
            .unwrap_or_else(|| PathBuf::from("/home").join(DEFAULT_IDENTITY_NAME));
        let search_path = get("PATH");

        let config = RuntimeConfig {
            port,
            host,
            app_root,
            reports_dir,
            entrypoint,
            identity_home,
            search_path,
        };
        debug!("Runtime configuration: {:?}", config);
        Ok(config)
    }

    /// Output is never buffered, logs reach the platform immediately
    pub fn unbuffered(&self) -> bool {
        true
    }

    pub fn local_bin(&self) -> PathBuf {
        self.identity_home.join(".local").join("bin")
    }

    /// The search path for child processes, with the identity's local binary directory first
    pub fn child_search_path(&self) -> String {
        match self.search_path.as_ref() {
            Some(inherited) => format!("{}:{}", self.local_bin().display(), inherited),
            None => self.local_bin().display().to_string(),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_port(env: &str, value: String) -> Result<u16, StartupError> {
    value
        .trim()
        .parse::<u16>()
        .ok()
        .filter(|p| *p != 0)
        .ok_or(StartupError::InvalidPort {
            env: env.to_string(),
            value,
        })
}

/// Relative paths would depend on the working directory the process is started in
fn absolute_path(env: &str, value: String) -> Result<PathBuf, StartupError> {
    let path = PathBuf::from(&value);
    if path.is_absolute() {
        Ok(path)
    } else {
        Err(StartupError::RelativePath {
            env: env.to_string(),
            value,
        })
    }
}
