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

use getset::{CopyGetters, Getters};
use serde::Deserialize;

use crate::config::util::*;
use crate::util::docker::ImageName;

/// Where the dependency installation writes to
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
pub enum InstallScope {
    /// Install as the runtime identity, into its home directory
    #[serde(rename = "user")]
    User,

    /// Install as root, into the interpreter's site directory
    #[serde(rename = "system")]
    System,
}

impl Default for InstallScope {
    fn default() -> Self {
        InstallScope::User
    }
}

/// The configuration of the image layout
#[derive(Debug, Getters, CopyGetters, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImageConfig {
    /// The base image. Must be pinned to a runtime version, "latest" is refused.
    #[getset(get = "pub")]
    base: ImageName,

    /// Absolute path of the application root inside the image
    #[serde(default = "default_app_root")]
    #[getset(get = "pub")]
    app_root: PathBuf,

    /// Reports directory, relative to the application root
    #[serde(default = "default_reports_dir")]
    #[getset(get = "pub")]
    reports_dir: PathBuf,

    /// The dependency manifest, relative to the build context
    #[serde(default = "default_manifest")]
    #[getset(get = "pub")]
    manifest: PathBuf,

    /// Native packages installed before any dependency
    #[serde(default = "default_system_packages")]
    #[getset(get = "pub")]
    system_packages: Vec<String>,

    #[serde(default)]
    #[getset(get_copy = "pub")]
    install_scope: InstallScope,
}
