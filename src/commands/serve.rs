//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

//! Implementation of the 'serve' subcommand

use std::sync::Arc;

use anyhow::Result;

use crate::config::RuntimeConfig;
use crate::runtime::preflight;
use crate::runtime::preflight::Preflight;
use crate::server::AppState;

/// Implementation of the "serve" subcommand
pub async fn serve() -> Result<()> {
    let config = RuntimeConfig::from_env()?;
    let pf = Preflight::run(&config)?;
    let listener = preflight::bind_listener(&config).await?;

    let state = Arc::new(AppState::new(pf.reports().clone()));
    crate::server::serve(listener, state).await
}
