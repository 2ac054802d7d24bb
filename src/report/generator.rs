//! Text and JSON rendering of a conditions snapshot.

use crate::config::{Config, TideLink};
use crate::models::{format_clock_time, Coordinate, FetchState, Snapshot};
use anyhow::Result;
use serde::Serialize;

/// What the renderers need besides the snapshot itself.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub location_name: String,
    pub coordinate: Coordinate,
    pub timezone: String,
    /// Empty when links are disabled.
    pub tide_links: Vec<TideLink>,
}

impl From<&Config> for ReportOptions {
    fn from(config: &Config) -> Self {
        Self {
            location_name: config.location.name.clone(),
            coordinate: config.location.coordinate(),
            timezone: config.location.timezone.clone(),
            tide_links: if config.report.show_links {
                config.report.tide_links.clone()
            } else {
                Vec::new()
            },
        }
    }
}

fn or_unknown(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{:.1} {}", v, unit),
        None => "unknown".to_string(),
    }
}

/// Generate the plain-text report.
pub fn render_text(snapshot: &Snapshot, options: &ReportOptions) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "🏝️  {} ({})\n",
        options.location_name, options.coordinate
    ));
    output.push_str(&format!(
        "   Updated: {} ({})\n\n",
        snapshot.observed_at.format("%Y-%m-%d %H:%M"),
        options.timezone
    ));

    match &snapshot.fetch_state {
        FetchState::Loading => output.push_str("   ⏳ Loading conditions...\n\n"),
        FetchState::Failed(reason) => output.push_str(&format!("   ❌ {}\n\n", reason)),
        FetchState::Ready => {
            let weather = &snapshot.weather;
            let sun = |t: Option<chrono::NaiveDateTime>| {
                t.as_ref()
                    .map(format_clock_time)
                    .unwrap_or_else(|| "unknown".to_string())
            };

            output.push_str(&format!(
                "   🌡️  Temperature: {}\n",
                or_unknown(weather.temperature_c, "°C")
            ));
            output.push_str(&format!(
                "   💨 Wind:        {}\n",
                or_unknown(weather.wind_speed_kmh, "km/h")
            ));
            output.push_str(&format!(
                "   🌊 Waves:       {}\n",
                or_unknown(snapshot.marine.wave_height_m, "m")
            ));
            output.push_str(&format!("   🌅 Sunrise:     {}\n", sun(weather.sunrise)));
            output.push_str(&format!("   🌇 Sunset:      {}\n", sun(weather.sunset)));
        }
    }

    output.push_str(&format!(
        "   {} Moon:        {}\n",
        snapshot.moon_phase.glyph(),
        snapshot.moon_phase
    ));

    if snapshot.fetch_state.is_ready() && !snapshot.source_errors.is_empty() {
        output.push('\n');
        for error in &snapshot.source_errors {
            output.push_str(&format!("   ⚠️  {}\n", error));
        }
    }

    if !options.tide_links.is_empty() {
        output.push_str("\n🔗 Tide tables:\n");
        for link in &options.tide_links {
            output.push_str(&format!("   - {}: {}\n", link.label, link.url));
        }
    }

    output
}

#[derive(Serialize)]
struct JsonLocation<'a> {
    name: &'a str,
    #[serde(flatten)]
    coordinate: Coordinate,
    timezone: &'a str,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    location: JsonLocation<'a>,
    #[serde(flatten)]
    snapshot: &'a Snapshot,
    moon_glyph: &'static str,
    #[serde(skip_serializing_if = "no_links")]
    tide_links: &'a [TideLink],
}

fn no_links(links: &&[TideLink]) -> bool {
    links.is_empty()
}

/// Generate a JSON report.
pub fn render_json(snapshot: &Snapshot, options: &ReportOptions) -> Result<String> {
    let report = JsonReport {
        location: JsonLocation {
            name: &options.location_name,
            coordinate: options.coordinate,
            timezone: &options.timezone,
        },
        snapshot,
        moon_glyph: snapshot.moon_phase.glyph(),
        tide_links: &options.tide_links,
    };
    serde_json::to_string_pretty(&report).map_err(Into::into)
}
