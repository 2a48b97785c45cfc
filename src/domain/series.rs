// Series and metric payload domain models
use serde::{Deserialize, Deserializer, Serialize};

/// A single `(x, y)` sample, serialised as a two-element array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point> for [f64; 2] {
    fn from(point: Point) -> Self {
        [point.x, point.y]
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    pub label: String,
    #[serde(default)]
    pub is_controller: bool,
    #[serde(default)]
    pub is_overall: bool,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub data: Vec<Point>,
}

impl Series {
    pub fn new(label: impl Into<String>, data: Vec<Point>) -> Self {
        Self {
            label: label.into(),
            is_controller: false,
            is_overall: false,
            color: None,
            data,
        }
    }

    pub fn from_pairs(label: impl Into<String>, pairs: &[(f64, f64)]) -> Self {
        Self::new(label, pairs.iter().map(|&(x, y)| Point::new(x, y)).collect())
    }

    pub fn controller(mut self) -> Self {
        self.is_controller = true;
        self
    }

    pub fn overall(mut self) -> Self {
        self.is_overall = true;
        self
    }

    /// Controller and overall series both carry aggregated data.
    pub fn is_aggregate(&self) -> bool {
        self.is_controller || self.is_overall
    }

    pub fn origin(&self) -> SeriesOrigin {
        if self.is_controller {
            SeriesOrigin::Controller
        } else {
            SeriesOrigin::Leaf
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesOrigin {
    Controller,
    Leaf,
}

/// A series that survived filtering, tagged with where its data came from.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedSeries {
    pub series: Series,
    pub origin: SeriesOrigin,
}

impl From<Series> for TaggedSeries {
    fn from(series: Series) -> Self {
        let origin = series.origin();
        Self { series, origin }
    }
}

/// Category label on a discrete x axis, e.g. `[0, "Requests in error"]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick(pub f64, pub String);

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricPayload {
    #[serde(default)]
    pub min_x: f64,
    #[serde(default)]
    pub max_x: f64,
    #[serde(default)]
    pub min_y: f64,
    #[serde(default)]
    pub max_y: f64,
    /// Time-bucket width in ms, 0 when the metric is not time-bucketed.
    #[serde(default)]
    pub granularity: f64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub supports_controllers_discrimination: bool,
    #[serde(default)]
    pub series: Vec<Series>,
    #[serde(default)]
    pub ticks: Vec<Tick>,
}

impl MetricPayload {
    /// Builds a payload whose bounds are computed from the given series.
    pub fn from_series(title: impl Into<String>, series: Vec<Series>) -> Self {
        let mut bounds: Option<(f64, f64, f64, f64)> = None;
        for p in series.iter().flat_map(|s| s.data.iter()) {
            bounds = Some(match bounds {
                None => (p.x, p.x, p.y, p.y),
                Some((min_x, max_x, min_y, max_y)) => {
                    (min_x.min(p.x), max_x.max(p.x), min_y.min(p.y), max_y.max(p.y))
                }
            });
        }
        let (min_x, max_x, min_y, max_y) = bounds.unwrap_or_default();

        Self {
            min_x,
            max_x,
            min_y,
            max_y,
            granularity: 0.0,
            title: title.into(),
            supports_controllers_discrimination: false,
            series,
            ticks: Vec::new(),
        }
    }

    pub fn with_granularity(mut self, granularity: f64) -> Self {
        self.granularity = granularity;
        self
    }

    pub fn with_controllers_discrimination(mut self) -> Self {
        self.supports_controllers_discrimination = true;
        self
    }

    pub fn with_ticks(mut self, ticks: Vec<Tick>) -> Self {
        self.ticks = ticks;
        self
    }
}

/// Payloads arrive either bare or wrapped in a `{"result": ...}` envelope.
///
/// An object with a `result` key is always read as the envelope, so a broken
/// inner payload is an error rather than an empty bare payload.
#[derive(Debug)]
pub enum PayloadDocument {
    Wrapped(MetricPayload),
    Bare(MetricPayload),
}

impl PayloadDocument {
    pub fn into_payload(self) -> MetricPayload {
        match self {
            PayloadDocument::Wrapped(payload) | PayloadDocument::Bare(payload) => payload,
        }
    }
}

impl<'de> Deserialize<'de> for PayloadDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut value = serde_json::Value::deserialize(deserializer)?;
        match value.as_object_mut().and_then(|object| object.remove("result")) {
            Some(result) => MetricPayload::deserialize(result)
                .map(PayloadDocument::Wrapped)
                .map_err(serde::de::Error::custom),
            None => MetricPayload::deserialize(value)
                .map(PayloadDocument::Bare)
                .map_err(serde::de::Error::custom),
        }
    }
}
