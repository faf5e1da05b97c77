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

use thiserror::Error as ThisError;

/// Errors that abort image construction
///
/// None of these is recovered from, there is no partial image.
#[derive(ThisError, Debug)]
pub enum BuildError {
    #[error("Dependency manifest not found: {}", path.display())]
    MissingManifest { path: PathBuf },

    #[error("Malformed requirement in {} line {line}: '{content}'", path.display())]
    MalformedRequirement {
        path: PathBuf,
        line: usize,
        content: String,
    },

    #[error("Requirement '{name}' is listed more than once (lines {first} and {second})")]
    DuplicateRequirement {
        name: String,
        first: usize,
        second: usize,
    },

    #[error("Requirement '{name}' has no version constraint")]
    UnpinnedRequirement { name: String },

    #[error("Base image '{image}' is not pinned to a version (untagged or 'latest')")]
    UnpinnedBaseImage { image: String },

    #[error("Build step '{step}' is out of order: expected step {expected}, found {found}")]
    StepOrder {
        step: String,
        expected: usize,
        found: usize,
    },

    #[error("Invalid entrypoint '{entrypoint}': {reason}")]
    InvalidEntrypoint { entrypoint: String, reason: String },
}

/// Errors that terminate the process before a request is served
#[derive(ThisError, Debug)]
pub enum StartupError {
    #[error("Invalid port in ${env}: '{value}'")]
    InvalidPort { env: String, value: String },

    #[error("${env} must be an absolute path, got '{value}'")]
    RelativePath { env: String, value: String },

    #[error("Refusing to run as privileged identity (uid {uid})")]
    PrivilegedIdentity { uid: u32 },

    #[error("Reports directory is not writable: {}", path.display())]
    ReportsNotWritable { path: PathBuf },

    #[error("Entrypoint module '{module}' cannot be resolved under {}", root.display())]
    UnresolvableEntrypoint { module: String, root: PathBuf },

    #[error("Port {port} on {host} is already in use")]
    PortInUse { host: String, port: u16 },
}
