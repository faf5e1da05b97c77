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
use anyhow::Context;
use anyhow::Result;
use handlebars::Handlebars;
use serde::Serialize;
use tracing::trace;

use crate::recipe::Recipe;

#[derive(parse_display::Display, Serialize, Clone, Debug, Eq, PartialEq)]
#[serde(transparent)]
#[display("{0}")]
pub struct Dockerfile(String);

impl AsRef<str> for Dockerfile {
    fn as_ref(&self) -> &str {
        self.0.as_ref()
    }
}

impl Dockerfile {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[cfg(test)]
    pub fn lines_numbered(&self) -> impl Iterator<Item = (usize, &str)> {
        self.0.lines().enumerate().map(|(n, l)| (n + 1, l))
    }

    /// Whether the instruction that starts a line appears in the rendered file
    #[cfg(test)]
    pub fn has_instruction(&self, instruction: &str) -> bool {
        self.0.lines().any(|l| l.starts_with(instruction))
    }
}

pub struct DockerfileBuilder<'a> {
    recipe: &'a Recipe,
}

impl<'a> DockerfileBuilder<'a> {
    pub fn new(recipe: &'a Recipe) -> Self {
        DockerfileBuilder { recipe }
    }

    pub fn build(self) -> Result<Dockerfile> {
        let mut hb = Handlebars::new();
        hb.register_escape_fn(handlebars::no_escape);
        hb.set_strict_mode(true);

        let steps = self.recipe.steps();
        for step in steps {
            hb.register_template_string(&step.to_string(), step.template())
                .with_context(|| anyhow!("Registering template for step {}", step))?;
        }

        let mut dockerfile = format!(
            "# Generated by astrovastu {}, do not edit\n",
            env!("CARGO_PKG_VERSION")
        );

        for step in steps {
            let rendered = hb
                .render(&step.to_string(), self.recipe.context())
                .with_context(|| anyhow!("Rendering step {}", step))?;
            trace!("Rendered step {}: {}", step, rendered);

            dockerfile.push_str(&format!("\n# step {}/{}: {}\n", step.ordinal(), steps.len(), step));

            // block helpers leave empty lines behind
            for line in rendered.lines().filter(|l| !l.trim().is_empty()) {
                dockerfile.push_str(line.trim_end());
                dockerfile.push('\n');
            }
        }

        Ok(Dockerfile(dockerfile))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Configuration;

    fn render(toml: &str) -> Dockerfile {
        let config = Configuration::from_toml(toml).unwrap();
        let recipe = Recipe::from_config(&config).unwrap();
        DockerfileBuilder::new(&recipe).build().unwrap()
    }

    const MINIMAL: &str = indoc::indoc!(r#"
        compatibility = ">=0.2"

        [image]
        base = "python:3.11-slim"
    "#);

    #[test]
    fn test_render_is_deterministic() {
        assert_eq!(render(MINIMAL), render(MINIMAL));
    }

    #[test]
    fn test_render_minimal() {
        let df = render(MINIMAL);
        let text = df.as_ref();

        assert!(text.contains("# step 1/9: base-image\nFROM python:3.11-slim\n"));
        assert!(text.contains("apt-get install -y --no-install-recommends build-essential libpq-dev libffi-dev curl git"));
        assert!(text.contains("rm -rf /var/lib/apt/lists/*"));
        assert!(text.contains("RUN useradd --create-home --home-dir /home/appuser --shell /bin/bash appuser"));
        assert!(text.contains("COPY --chown=appuser:appuser requirements.txt /app/requirements.txt"));
        assert!(text.contains("RUN pip install --no-cache-dir --user -r /app/requirements.txt"));
        assert!(text.contains("RUN mkdir -p /app/reports && chown -R appuser:appuser /app"));
        assert!(text.contains("ENV PYTHONPATH=/app"));
        assert!(text.contains("PATH=/home/appuser/.local/bin:$PATH"));
        assert!(text.contains("PYTHONUNBUFFERED=1"));
        assert!(text.contains("EXPOSE 8000"));
        assert!(text.ends_with(
            "CMD [\"sh\",\"-c\",\"uvicorn app.astro_service_with_dasha:app --host 0.0.0.0 --port ${PORT:-8000} --workers 1\"]\n"
        ));
    }

    #[test]
    fn test_steps_appear_in_order() {
        let df = render(MINIMAL);
        let headers = df
            .lines_numbered()
            .filter(|(_, l)| l.starts_with("# step "))
            .map(|(n, _)| n)
            .collect::<Vec<_>>();

        assert_eq!(headers.len(), 9);
        assert!(headers.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_last_user_switch_precedes_cmd_and_is_not_root() {
        let df = render(MINIMAL);
        let lines = df.as_ref().lines().collect::<Vec<_>>();

        let last_user = lines.iter().rposition(|l| l.starts_with("USER ")).unwrap();
        let cmd = lines.iter().position(|l| l.starts_with("CMD ")).unwrap();
        assert!(last_user < cmd);
        assert_eq!(lines[last_user], "USER appuser");
    }

    #[test]
    fn test_reports_created_before_ownership_change() {
        let df = render(MINIMAL);
        let text = df.as_ref();
        let mkdir = text.find("mkdir -p /app/reports").unwrap();
        let chown = text.find("chown -R appuser:appuser /app").unwrap();
        let copy = text.find("COPY . /app").unwrap();
        assert!(copy < mkdir);
        assert!(mkdir < chown);
    }

    #[test]
    fn test_no_app_dir_flag() {
        assert!(!render(MINIMAL).as_ref().contains("--app-dir"));
    }

    #[test]
    fn test_system_scope_installs_as_root() {
        let df = render(indoc::indoc!(r#"
            compatibility = ">=0.2"

            [image]
            base = "python:3.11-slim@sha256:0123456789abcdef"
            install_scope = "system"

            [identity]
            name = "astro"

            [entrypoint]
            fallback_port = 9000
        "#));
        let text = df.as_ref();

        assert!(text.contains("RUN pip install --no-cache-dir -r /app/requirements.txt"));
        assert!(!text.contains("--user"));
        assert!(text.contains("--shell /bin/bash astro"));
        assert!(text.contains("EXPOSE 9000"));
        assert!(text.contains("${PORT:-9000}"));
    }

    /// Collect the variables of all ENV instructions, following line continuations
    fn image_environment(df: &Dockerfile) -> std::collections::HashMap<String, String> {
        let mut env = std::collections::HashMap::new();
        let mut continued = false;

        for line in df.as_str().lines().map(str::trim) {
            let body = match line.strip_prefix("ENV ") {
                Some(rest) => rest,
                None if continued => line,
                None => continue,
            };
            continued = body.ends_with('\\');

            for pair in body.trim_end_matches('\\').split_whitespace() {
                if let Some((k, v)) = pair.split_once('=') {
                    env.insert(k.to_string(), v.to_string());
                }
            }
        }

        env
    }

    #[test]
    fn test_runtime_config_agrees_with_image() {
        use std::path::PathBuf;

        use crate::config::RuntimeConfig;

        let df = render(indoc::indoc!(r#"
            compatibility = ">=0.2"

            [image]
            base = "python:3.11-slim"
            app_root = "/srv/astro"
            reports_dir = "out"

            [identity]
            name = "astro"

            [entrypoint]
            port_env = "APP_PORT"
            fallback_port = 9000
        "#));
        assert!(df.as_str().contains("--port ${APP_PORT:-9000}"));

        let env = image_environment(&df);
        let rt = RuntimeConfig::from_lookup(|k| env.get(k).cloned()).unwrap();
        assert_eq!(rt.port(), 9000);
        assert_eq!(rt.app_root(), &PathBuf::from("/srv/astro"));
        assert_eq!(rt.reports_dir(), &PathBuf::from("/srv/astro/out"));
        assert_eq!(rt.local_bin(), PathBuf::from("/home/astro/.local/bin"));
        assert_eq!(rt.entrypoint().to_string(), "app.astro_service_with_dasha:app");
        assert_eq!(env.get("PATH").map(String::as_str), Some("/home/astro/.local/bin:$PATH"));

        // the platform sets the variable the image named
        let rt = RuntimeConfig::from_lookup(|k| match k {
            "APP_PORT" => Some(String::from("9191")),
            "PORT" => Some(String::from("1234")),
            _ => env.get(k).cloned(),
        })
        .unwrap();
        assert_eq!(rt.port(), 9191);
    }

    #[test]
    fn test_no_system_packages() {
        use crate::recipe::BuildStep;
        use crate::recipe::IdentityContext;
        use crate::recipe::RecipeContext;

        let context = RecipeContext {
            base: String::from("python:3.11-slim"),
            system_packages: String::new(),
            identity: IdentityContext {
                name: String::from("appuser"),
                home: String::from("/home/appuser"),
                shell: String::from("/bin/bash"),
                local_bin: String::from("/home/appuser/.local/bin"),
            },
            app_root: String::from("/app"),
            reports_path: String::from("/app/reports"),
            manifest: String::from("requirements.txt"),
            manifest_target: String::from("/app/requirements.txt"),
            user_scope: true,
            entrypoint: String::from("app.astro_service_with_dasha:app"),
            port_env: String::from("PORT"),
            port: 8000,
            cmd: String::from("[\"true\"]"),
        };
        let recipe = Recipe::new(BuildStep::ALL.to_vec(), context).unwrap();
        let df = DockerfileBuilder::new(&recipe).build().unwrap();

        assert!(df.as_ref().contains("# step 2/9: system-packages\n# no system packages\n"));
        assert!(!df.has_instruction("RUN apt-get"));
        assert!(df.has_instruction("CMD [\"true\"]"));
    }
}
