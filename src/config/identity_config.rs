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

use getset::Getters;
use serde::Deserialize;

use crate::config::util::*;

/// The unprivileged account the service runs as
#[derive(Debug, Getters, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdentityConfig {
    #[serde(default = "default_identity_name")]
    #[getset(get = "pub")]
    name: String,

    /// Home directory, `/home/<name>` if not set
    home: Option<PathBuf>,

    #[serde(default = "default_identity_shell")]
    #[getset(get = "pub")]
    shell: PathBuf,
}

impl IdentityConfig {
    pub fn home(&self) -> PathBuf {
        self.home
            .clone()
            .unwrap_or_else(|| PathBuf::from("/home").join(&self.name))
    }

    /// The directory per-user installs put their executables in
    pub fn local_bin(&self) -> PathBuf {
        self.home().join(".local").join("bin")
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        IdentityConfig {
            name: default_identity_name(),
            home: None,
            shell: default_identity_shell(),
        }
    }
}
