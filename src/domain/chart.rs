// Chart domain models - plot documents, legend state and view ranges
use super::series::{Point, SeriesOrigin, TaggedSeries, Tick};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisMode {
    Linear,
    Time,
    Categories,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesStyle {
    Lines,
    LinesWithPoints,
    FilledLines,
    StackedArea,
    Points,
    Bars,
}

/// What a chart shows when no series survive filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyPolicy {
    Placeholder,
    Plot,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisOptions {
    pub label: Option<String>,
    pub mode: AxisMode,
    pub time_format: Option<String>,
    pub tick_decimals: Option<u32>,
    pub ticks: Vec<Tick>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl AxisOptions {
    pub fn linear(label: Option<String>) -> Self {
        Self {
            label,
            mode: AxisMode::Linear,
            time_format: None,
            tick_decimals: None,
            ticks: Vec::new(),
            min: None,
            max: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendOptions {
    pub container: String,
    pub columns: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartOptions {
    pub title: String,
    pub x_axis: AxisOptions,
    pub y_axis: AxisOptions,
    pub style: SeriesStyle,
    pub bar_width: Option<f64>,
    pub granularity: f64,
    pub legend: Option<LegendOptions>,
    pub tooltip: Option<String>,
    pub colors: Vec<String>,
    pub selection: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotSeries {
    pub label: String,
    pub color: Option<String>,
    pub origin: SeriesOrigin,
    pub data: Vec<Point>,
}

impl From<TaggedSeries> for PlotSeries {
    fn from(tagged: TaggedSeries) -> Self {
        Self {
            label: tagged.series.label,
            color: tagged.series.color,
            origin: tagged.origin,
            data: tagged.series.data,
        }
    }
}

/// Everything handed to a plotting surface in one draw call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plot {
    pub series: Vec<PlotSeries>,
    pub options: ChartOptions,
}

impl Plot {
    pub fn labels(&self) -> Vec<&str> {
        self.series.iter().map(|s| s.label.as_str()).collect()
    }
}

/// A pan/zoom selection made on the overview surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewRange {
    pub x_from: f64,
    pub x_to: f64,
    pub y_from: Option<f64>,
    pub y_to: Option<f64>,
}

impl ViewRange {
    pub fn x(x_from: f64, x_to: f64) -> Self {
        Self {
            x_from,
            x_to,
            y_from: None,
            y_to: None,
        }
    }

    pub fn xy(x_from: f64, x_to: f64, y_from: f64, y_to: f64) -> Self {
        Self {
            x_from,
            x_to,
            y_from: Some(y_from),
            y_to: Some(y_to),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub label: String,
    pub color: Option<String>,
    pub checked: bool,
}

impl LegendEntry {
    pub fn new(label: String, color: Option<String>) -> Self {
        Self {
            label,
            color,
            checked: true,
        }
    }

    /// Unchecked entries are greyed out in the legend.
    pub fn disabled(&self) -> bool {
        !self.checked
    }
}
