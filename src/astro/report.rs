//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

//! Printable HTML rendering of a normalized report payload
//!
//! The payload is the JSON the client stores, with the optional top level sections `person`,
//! `chart`, `divisional`, `vastu` and `numerology`. Missing or oddly typed values render as "-".

use anyhow::anyhow;
use anyhow::Context;
use anyhow::Result;
use chrono::DateTime;
use chrono::SecondsFormat;
use chrono::Utc;
use handlebars::Handlebars;
use serde::Serialize;
use serde_json::Value;
use tracing::trace;

pub const DEFAULT_TITLE: &str = "Astro Vastu Pro Report";

const TEMPLATE_NAME: &str = "report";

/// How many activations the report lists
const TOP_ACTIVATIONS: usize = 6;

/// Length limit of a summary taken from the interpretation
const SUMMARY_CHARS: usize = 240;

const DIVISIONAL_SHOWN: [&str; 2] = ["D9", "D10"];

const TEMPLATE: &str = indoc::indoc!(r#"
    <!doctype html>
    <html>
    <head>
      <meta charset="utf-8"/>
      <title>{{title}}</title>
      <style>
        body { font-family: Arial, Helvetica, sans-serif; color: #222; line-height: 1.4; padding: 24px; }
        .brand { font-size: 20px; font-weight: 700; color: #1f4e79; }
        .meta, .small { font-size: 12px; color: #666; }
        .section { margin-top: 18px; padding: 12px; border-radius: 8px; background: #fbfbfb; }
        .section h2 { margin: 0 0 8px 0; font-size: 16px; color: #0b3355; }
        .kv .k { display: inline-block; width: 160px; font-weight: 600; }
        .remedy { margin: 6px 0; padding: 8px; border-left: 4px solid #e7e7e7; background: #fff; }
        @media print { body { padding: 8px } }
      </style>
    </head>
    <body>
      <div class="header">
        <div class="brand">Astro Vastu Pro - Personalized Report</div>
        <div class="meta">
          Generated: {{generated}}<br/>
          Client: {{person.name}} &bull; DOB: {{person.date}} &bull; TOB: {{person.time}}
        </div>
      </div>

      <div class="section">
        <h2>Executive Summary</h2>
        <p class="small">{{summary}}</p>
      </div>

      <div class="section">
        <h2>Astrology Snapshot</h2>
        <div class="kv"><span class="k">Ascendant</span><span class="v">{{ascendant}}</span></div>
        {{#if planets}}
        <h3>Planets</h3>
        {{#each planets}}
        <div class="kv"><span class="k">{{name}}</span><span class="v">{{value}}&deg;</span></div>
        {{/each}}
        {{/if}}
        {{#if divisional}}
        <h3>Divisional Charts</h3>
        {{#each divisional}}
        <div class="kv"><span class="k">{{name}}</span><span class="v">
          {{#each planets}}
          <div>{{name}}: {{value}}</div>
          {{/each}}
        </span></div>
        {{/each}}
        {{/if}}
      </div>

      <div class="section">
        <h2>Vastu Highlights</h2>
        {{#if plot_facing}}
        <div class="kv"><span class="k">Plot Facing</span><span class="v">{{plot_facing}}</span></div>
        {{/if}}
        {{#if weak_sectors}}
        <div class="kv"><span class="k">Weak Sectors</span><span class="v">{{weak_sectors}}</span></div>
        {{/if}}
        {{#if activations}}
        <h3>Top Activations</h3>
        {{#each activations}}
        <div class="remedy"><strong>{{sector}}:</strong> {{action}} <div class="small">({{why}})</div></div>
        {{/each}}
        {{else}}
        <div class="small">No Vastu data provided.</div>
        {{/if}}
      </div>

      <div class="section">
        <h2>Numerology</h2>
        {{#if numerology}}
        <div class="kv"><span class="k">Life Path</span><span class="v">{{numerology.life_path}}</span></div>
        <div class="kv"><span class="k">Name Vibration</span><span class="v">{{numerology.name_vibration}}</span></div>
        <div class="kv"><span class="k">Personal Year</span><span class="v">{{numerology.personal_year}}</span></div>
        {{else}}
        <div class="small">No numerology data.</div>
        {{/if}}
      </div>

      <div class="section">
        <h2>Interpretation</h2>
        <pre style="white-space: pre-wrap; font-family: inherit;">{{interpretation}}</pre>
      </div>

      <div class="small">This report is for guidance only. Not a substitute for professional services.</div>
    </body>
    </html>
"#);

#[derive(Serialize, Debug)]
struct Person {
    name: String,
    date: String,
    time: String,
}

#[derive(Serialize, Debug)]
struct Entry {
    name: String,
    value: String,
}

#[derive(Serialize, Debug)]
struct Divisional {
    name: String,
    planets: Vec<Entry>,
}

#[derive(Serialize, Debug)]
struct Activation {
    sector: String,
    action: String,
    why: String,
}

#[derive(Serialize, Debug)]
struct Numerology {
    life_path: String,
    name_vibration: String,
    personal_year: String,
}

/// What the template sees, every field is always present
#[derive(Serialize, Debug)]
struct ReportContext {
    title: String,
    generated: String,
    person: Person,
    summary: String,
    ascendant: String,
    planets: Vec<Entry>,
    divisional: Vec<Divisional>,
    plot_facing: Option<String>,
    weak_sectors: String,
    activations: Vec<Activation>,
    numerology: Option<Numerology>,
    interpretation: String,
}

/// Render `report` into a self-contained HTML document
///
/// All values are HTML-escaped. `interpretation` is free text, its first paragraph becomes the
/// summary if present.
pub fn render_html(report: &Value, title: Option<&str>, interpretation: Option<&str>, now: DateTime<Utc>) -> Result<String> {
    let context = ReportContext::new(report, title, interpretation, now);
    trace!("Report context: {:?}", context);

    let mut hb = Handlebars::new();
    hb.set_strict_mode(true);
    hb.register_template_string(TEMPLATE_NAME, TEMPLATE)
        .context("Registering report template")?;

    hb.render(TEMPLATE_NAME, &context)
        .with_context(|| anyhow!("Rendering report '{}'", context.title))
}

impl ReportContext {
    fn new(report: &Value, title: Option<&str>, interpretation: Option<&str>, now: DateTime<Utc>) -> Self {
        let person = &report["person"];
        let chart = &report["chart"];
        let vastu = &report["vastu"];
        let numerology = Some(&report["numerology"]).filter(|n| n.as_object().map(|o| !o.is_empty()).unwrap_or(false));
        let interpretation = interpretation.map(str::trim).filter(|t| !t.is_empty());

        let summary = match interpretation {
            Some(interpretation) => interpretation
                .split("\n\n")
                .next()
                .unwrap_or_default()
                .chars()
                .take(SUMMARY_CHARS)
                .collect(),
            None => {
                let mut parts = Vec::new();
                if let Some(lp) = numerology.and_then(|n| text(&n["life_path"])) {
                    parts.push(format!("Life Path {lp}"));
                }
                if let Some(asc) = chart["ascendant"].as_f64() {
                    parts.push(format!("Ascendant {asc:.1}\u{b0}"));
                }

                if parts.is_empty() {
                    String::from("Personalized guidance based on chart, vastu, and numerology.")
                } else {
                    parts.join(" \u{2022} ")
                }
            }
        };

        let planets = chart["planets"]
            .as_object()
            .map(|planets| {
                planets
                    .iter()
                    .map(|(name, info)| Entry {
                        name: name.clone(),
                        value: or_dash(text(&info["longitude"])),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let divisional = DIVISIONAL_SHOWN
            .iter()
            .filter_map(|name| {
                let chart = report["divisional"][*name].as_object()?;
                let planets = chart
                    .iter()
                    .map(|(planet, p)| Entry {
                        name: planet.clone(),
                        value: format!(
                            "{} {}\u{b0}",
                            or_dash(text(&p["sign"])),
                            p["deg_in_sign"].as_f64().map(|d| format!("{d:.2}")).unwrap_or_else(|| String::from("-"))
                        ),
                    })
                    .collect();

                Some(Divisional {
                    name: name.to_string(),
                    planets,
                })
            })
            .collect();

        let weak_sectors = vastu["weak_sectors"]
            .as_array()
            .map(|sectors| sectors.iter().filter_map(text).collect::<Vec<_>>().join(", "))
            .unwrap_or_default();

        let activations = vastu["recommended_activations"]
            .as_array()
            .map(|recs| {
                recs.iter()
                    .take(TOP_ACTIVATIONS)
                    .map(|r| Activation {
                        sector: or_dash(text(&r["sector"])),
                        action: or_dash(text(&r["action"])),
                        why: or_dash(text(&r["why"])),
                    })
                    .collect()
            })
            .unwrap_or_default();

        ReportContext {
            title: title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or(DEFAULT_TITLE)
                .to_string(),
            generated: now.to_rfc3339_opts(SecondsFormat::Secs, true),
            person: Person {
                name: text(&person["name"]).unwrap_or_else(|| String::from("Unknown")),
                date: or_dash(text(&person["date"])),
                time: or_dash(text(&person["time"])),
            },
            summary,
            ascendant: or_dash(text(&chart["ascendant"])),
            planets,
            divisional,
            plot_facing: text(&vastu["plot_facing"]),
            weak_sectors,
            activations,
            numerology: numerology.map(|n| Numerology {
                life_path: or_dash(text(&n["life_path"])),
                name_vibration: or_dash(text(&n["name_vibration"])),
                personal_year: or_dash(text(&n["personal_year"])),
            }),
            interpretation: interpretation.unwrap_or("No interpretation available.").to_string(),
        }
    }
}

/// Strings and numbers, anything else is treated as missing
fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn or_dash(value: Option<String>) -> String {
    value.unwrap_or_else(|| String::from("-"))
}
