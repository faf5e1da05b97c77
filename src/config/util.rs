//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

//! This module contains default functions that are called by serde when deserializing the
//! configuration and having to use default values.

use std::path::PathBuf;

/// The default value for whether every requirement must carry a version constraint
pub fn default_strict_pins() -> bool {
    true
}

pub fn default_app_root() -> PathBuf {
    PathBuf::from(crate::consts::DEFAULT_APP_ROOT)
}

pub fn default_reports_dir() -> PathBuf {
    PathBuf::from(crate::consts::REPORTS_DIR_NAME)
}

pub fn default_manifest() -> PathBuf {
    PathBuf::from("requirements.txt")
}

/// The native libraries the optional dependency extensions compile and link against
pub fn default_system_packages() -> Vec<String> {
    vec![
        String::from("build-essential"),
        String::from("libpq-dev"),
        String::from("libffi-dev"),
        String::from("curl"),
        String::from("git"),
    ]
}

pub fn default_identity_name() -> String {
    String::from(crate::consts::DEFAULT_IDENTITY_NAME)
}

pub fn default_identity_shell() -> PathBuf {
    PathBuf::from(crate::consts::DEFAULT_IDENTITY_SHELL)
}

pub fn default_server() -> String {
    String::from(crate::consts::DEFAULT_SERVER)
}

pub fn default_module() -> String {
    String::from(crate::consts::DEFAULT_ENTRYPOINT)
}

pub fn default_port_env() -> String {
    String::from(crate::consts::PORT_ENV)
}

pub fn default_fallback_port() -> u16 {
    crate::consts::DEFAULT_PORT
}

pub fn default_workers() -> u16 {
    crate::consts::WORKERS
}
