// Render request and outcome models
use thiserror::Error;

/// One render of one chart, carrying its own snapshot of the series filter.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    pub metric: String,
    pub filter: String,
    pub fix_timestamps: bool,
}

impl RenderRequest {
    pub fn new(metric: impl Into<String>, filter: impl Into<String>) -> Self {
        Self {
            metric: metric.into(),
            filter: filter.into(),
            fix_timestamps: false,
        }
    }

    pub fn with_fixed_timestamps(mut self, fix_timestamps: bool) -> Self {
        self.fix_timestamps = fix_timestamps;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// Nothing matched the filter; the placeholder text was written instead.
    NoMatchingSeries { placeholder: String },
    AlreadyRendered,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    #[error("unknown element #{0}")]
    UnknownElement(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    #[error("element #{element_id} required by chart {metric} is missing")]
    MissingElement { metric: String, element_id: String },

    #[error("malformed payload for chart {metric}: {reason}")]
    MalformedPayload { metric: String, reason: String },

    #[error("no chart is configured for metric {0}")]
    UnknownMetric(String),

    #[error("no payload was supplied for metric {0}")]
    MissingPayload(String),

    #[error("no chart owns legend container #{0}")]
    UnknownLegend(String),

    #[error("series {label} is not in the legend of chart {metric}")]
    UnknownSeries { metric: String, label: String },

    #[error("chart {0} has not been rendered yet")]
    NotRendered(String),

    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderOutcome {
    Rendered { series: usize, created: bool },
    Skipped(SkipReason),
    Failed(RenderError),
}

impl RenderOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, RenderOutcome::Failed(_))
    }

    pub fn into_result(self) -> Result<RenderOutcome, RenderError> {
        match self {
            RenderOutcome::Failed(e) => Err(e),
            other => Ok(other),
        }
    }
}

impl From<Result<RenderOutcome, RenderError>> for RenderOutcome {
    fn from(result: Result<RenderOutcome, RenderError>) -> Self {
        result.unwrap_or_else(RenderOutcome::Failed)
    }
}
