//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

use std::path::Path;

const CONFIG: &str = include_str!("../astrovastu.toml");

pub const REQUIREMENTS: &str = "\
fastapi==0.110.0
uvicorn[standard]==0.29.0
pyswisseph==2.10.3.2
python-dateutil==2.9.0
";

/// Write the sample configuration, with `overrides` applied, and a manifest into `path`
pub fn setup_cwd<P: AsRef<Path>>(
    path: P,
    overrides: &[(&str, &str, toml::Value)],
    requirements: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut toml: toml::Value = toml::from_str(CONFIG)?;

    for (table, key, value) in overrides {
        let table = if table.is_empty() {
            &mut toml
        } else {
            toml.get_mut(*table)
                .ok_or_else(|| format!("{} missing in configuration", table))?
        };

        let table = table
            .as_table_mut()
            .ok_or_else(|| String::from("not a table"))?;
        table.insert(key.to_string(), value.clone());
    }

    std::fs::write(
        path.as_ref().join("astrovastu.toml"),
        toml::to_string_pretty(&toml)?,
    )?;

    if let Some(requirements) = requirements {
        std::fs::write(path.as_ref().join("requirements.txt"), requirements)?;
    }

    Ok(())
}
