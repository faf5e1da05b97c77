//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

use serde::Serialize;

/// One step of the image build, in the order they have to run
#[derive(parse_display::Display, parse_display::FromStr, Serialize, Clone, Copy, Debug, Hash, Eq, PartialEq)]
#[display(style = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum BuildStep {
    BaseImage,
    SystemPackages,
    RuntimeIdentity,
    Dependencies,
    Source,
    Ownership,
    Environment,
    DropPrivileges,
    Launch,
}

impl BuildStep {
    pub const ALL: [BuildStep; 9] = [
        BuildStep::BaseImage,
        BuildStep::SystemPackages,
        BuildStep::RuntimeIdentity,
        BuildStep::Dependencies,
        BuildStep::Source,
        BuildStep::Ownership,
        BuildStep::Environment,
        BuildStep::DropPrivileges,
        BuildStep::Launch,
    ];

    /// Position of the step in the build, starting at 1
    pub fn ordinal(self) -> usize {
        match self {
            BuildStep::BaseImage => 1,
            BuildStep::SystemPackages => 2,
            BuildStep::RuntimeIdentity => 3,
            BuildStep::Dependencies => 4,
            BuildStep::Source => 5,
            BuildStep::Ownership => 6,
            BuildStep::Environment => 7,
            BuildStep::DropPrivileges => 8,
            BuildStep::Launch => 9,
        }
    }

    /// The Dockerfile fragment of this step, a handlebars template over `RecipeContext`
    pub(in crate::recipe) fn template(self) -> &'static str {
        match self {
            BuildStep::BaseImage => "FROM {{base}}",

            BuildStep::SystemPackages => indoc::indoc!(r#"
                {{#if system_packages}}
                RUN apt-get update \
                 && apt-get install -y --no-install-recommends {{system_packages}} \
                 && rm -rf /var/lib/apt/lists/*
                {{else}}
                # no system packages
                {{/if}}
            "#),

            BuildStep::RuntimeIdentity => {
                "RUN useradd --create-home --home-dir {{identity.home}} --shell {{identity.shell}} {{identity.name}}"
            }

            BuildStep::Dependencies => indoc::indoc!(r#"
                WORKDIR {{app_root}}
                COPY --chown={{identity.name}}:{{identity.name}} {{manifest}} {{manifest_target}}
                {{#if user_scope}}
                USER {{identity.name}}
                RUN pip install --no-cache-dir --user -r {{manifest_target}}
                USER root
                {{else}}
                RUN pip install --no-cache-dir -r {{manifest_target}}
                {{/if}}
            "#),

            BuildStep::Source => "COPY . {{app_root}}",

            BuildStep::Ownership => {
                "RUN mkdir -p {{reports_path}} && chown -R {{identity.name}}:{{identity.name}} {{app_root}}"
            }

            // the ASTROVASTU_* values are read back by `launch` and `serve`
            BuildStep::Environment => indoc::indoc!(r#"
                ENV PYTHONPATH={{app_root}} \
                    PATH={{identity.local_bin}}:$PATH \
                    PYTHONUNBUFFERED=1 \
                    ASTROVASTU_APP_ROOT={{app_root}} \
                    ASTROVASTU_REPORTS_DIR={{reports_path}} \
                    ASTROVASTU_ENTRYPOINT={{entrypoint}} \
                    ASTROVASTU_IDENTITY_HOME={{identity.home}} \
                    ASTROVASTU_PORT_ENV={{port_env}} \
                    ASTROVASTU_FALLBACK_PORT={{port}}
            "#),

            BuildStep::DropPrivileges => "USER {{identity.name}}",

            BuildStep::Launch => indoc::indoc!(r#"
                EXPOSE {{port}}
                CMD {{cmd}}
            "#),
        }
    }
}
