//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

use anyhow::anyhow;
use anyhow::Result;

use crate::util::EnvironmentVariableName;

/// Parse a `KEY=VALUE` pair, as passed with `--env` on the commandline
///
/// Only the first '=' separates key and value, so values may contain '='.
pub fn parse_to_env(s: &str) -> Result<(EnvironmentVariableName, String)> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| anyhow!("Environment variable has no value: {}", s))?;

    if key.is_empty() {
        return Err(anyhow!("Environment variable has no key: {}", s));
    }

    Ok((EnvironmentVariableName::from(key), String::from(value)))
}
