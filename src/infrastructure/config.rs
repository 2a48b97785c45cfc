use crate::domain::chart::{AxisMode, EmptyPolicy, SeriesStyle};
use serde::Deserialize;

const BUILTIN_CHARTS: &str = include_str!("../../config/charts.toml");

/// Reference start time (10:00) that rebased time axes are aligned to.
pub const DEFAULT_TIMESTAMP_OFFSET_MS: i64 = 36_000_000;

#[derive(Debug, Deserialize, Clone)]
pub struct ReportSettings {
    pub payload_path: String,
    #[serde(default)]
    pub series_filter: String,
    #[serde(default = "default_timestamp_offset")]
    pub timestamp_offset_ms: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChartTable {
    #[serde(default)]
    pub charts: Vec<ChartConfig>,
}

/// One row of the chart table: everything that differs between metrics.
#[derive(Debug, Deserialize, Clone)]
pub struct ChartConfig {
    pub id: String,
    #[serde(default)]
    pub x_label: String,
    pub y_label: String,
    #[serde(default = "default_x_mode")]
    pub x_mode: AxisMode,
    pub tick_decimals: Option<u32>,
    pub tooltip: String,
    #[serde(default = "default_style")]
    pub style: SeriesStyle,
    pub bar_width: Option<f64>,
    #[serde(default = "default_legend_columns")]
    pub legend_columns: u32,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default = "default_empty_policy")]
    pub empty_policy: EmptyPolicy,
    #[serde(default = "default_true")]
    pub apply_filter: bool,
    #[serde(default)]
    pub force_overall: bool,
    #[serde(default)]
    pub fix_timestamps: bool,
    #[serde(default = "default_true")]
    pub overview: bool,
    #[serde(default)]
    pub default_render: bool,
    #[serde(default)]
    pub elements: ElementOverrides,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ElementOverrides {
    pub plot: Option<String>,
    pub overview: Option<String>,
    pub legend: Option<String>,
    pub choices: Option<String>,
    pub body: Option<String>,
}

/// Page element ids a chart renders into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementIds {
    pub plot: String,
    pub overview: String,
    pub legend: String,
    pub choices: String,
    pub body: String,
}

fn default_timestamp_offset() -> i64 {
    DEFAULT_TIMESTAMP_OFFSET_MS
}

fn default_x_mode() -> AxisMode {
    AxisMode::Linear
}

fn default_style() -> SeriesStyle {
    SeriesStyle::LinesWithPoints
}

fn default_legend_columns() -> u32 {
    2
}

fn default_empty_policy() -> EmptyPolicy {
    EmptyPolicy::Plot
}

fn default_true() -> bool {
    true
}

impl ChartConfig {
    /// Element ids derived from the chart id (`flot<Id>`, `overview<Id>`,
    /// `legend<Id>`, `choices<Id>`, `body<Id>`) unless overridden.
    pub fn elements(&self) -> ElementIds {
        let pick = |value: &Option<String>, prefix: &str| {
            value
                .clone()
                .unwrap_or_else(|| format!("{}{}", prefix, self.id))
        };
        ElementIds {
            plot: pick(&self.elements.plot, "flot"),
            overview: pick(&self.elements.overview, "overview"),
            legend: pick(&self.elements.legend, "legend"),
            choices: pick(&self.elements.choices, "choices"),
            body: pick(&self.elements.body, "body"),
        }
    }

    /// Ids that must exist on the page before this chart can render.
    pub fn required_elements(&self) -> Vec<String> {
        let ids = self.elements();
        let mut required = vec![ids.body, ids.plot, ids.legend, ids.choices];
        if self.overview {
            required.push(ids.overview);
        }
        required
    }
}

impl ChartTable {
    pub fn get(&self, metric: &str) -> Option<&ChartConfig> {
        self.charts.iter().find(|c| c.id == metric)
    }

    pub fn find_by_choices(&self, choices_id: &str) -> Option<&ChartConfig> {
        self.charts.iter().find(|c| c.elements().choices == choices_id)
    }

    pub fn default_renders(&self) -> impl Iterator<Item = &ChartConfig> {
        self.charts.iter().filter(|c| c.default_render)
    }

    /// Every element id referenced by the table.
    pub fn element_ids(&self) -> Vec<String> {
        self.charts
            .iter()
            .flat_map(|c| c.required_elements())
            .collect()
    }
}

/// The sixteen report charts compiled into the binary.
pub fn builtin_chart_table() -> anyhow::Result<ChartTable> {
    Ok(toml::from_str(BUILTIN_CHARTS)?)
}

/// Built-in chart table, replaced wholesale by `config/charts.toml` when present.
pub fn load_chart_table() -> anyhow::Result<ChartTable> {
    let settings = config::Config::builder()
        .add_source(config::File::from_str(BUILTIN_CHARTS, config::FileFormat::Toml))
        .add_source(config::File::with_name("config/charts").required(false))
        .build()?;

    Ok(settings.try_deserialize()?)
}

pub fn load_report_settings() -> anyhow::Result<ReportSettings> {
    let settings = config::Config::builder()
        .set_default("payload_path", "data/report.json")?
        .set_default("series_filter", "")?
        .set_default("timestamp_offset_ms", DEFAULT_TIMESTAMP_OFFSET_MS)?
        .add_source(config::File::with_name("config/report").required(false))
        .add_source(config::Environment::with_prefix("REPORT"))
        .build()?;

    Ok(settings.try_deserialize()?)
}
