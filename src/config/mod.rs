//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

//! The configuration handling code
//!
//! The recipe configuration (build time) is loaded from a file through the `config` crate and
//! validated. The runtime configuration (start time) is read from the environment only.

mod configuration;
pub use configuration::*;

mod entrypoint_config;
pub use entrypoint_config::*;

mod identity_config;
pub use identity_config::*;

mod image_config;
pub use image_config::*;

mod not_validated;
pub use not_validated::*;

mod runtime_config;
pub use runtime_config::*;

mod util;
