// Report service - Chart bindings and the page-level operations on them
use crate::application::chart_adapter::{ChartAdapter, ChartBinding};
use crate::application::labels::{format_tooltip, time_format};
use crate::application::plot_surface::PlotSurface;
use crate::domain::chart::{AxisMode, AxisOptions, LegendEntry, ViewRange};
use crate::domain::render::{RenderError, RenderOutcome, RenderRequest, SkipReason};
use crate::domain::series::MetricPayload;
use crate::infrastructure::config::ChartTable;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

pub struct ReportService<S: PlotSurface> {
    charts: ChartTable,
    payloads: HashMap<String, Arc<MetricPayload>>,
    bindings: BTreeMap<String, ChartBinding>,
    adapter: ChartAdapter,
    surface: S,
    filter: String,
}

impl<S: PlotSurface> ReportService<S> {
    pub fn new(
        charts: ChartTable,
        payloads: HashMap<String, MetricPayload>,
        surface: S,
        timestamp_offset_ms: i64,
    ) -> Self {
        Self {
            charts,
            payloads: payloads
                .into_iter()
                .map(|(metric, payload)| (metric, Arc::new(payload)))
                .collect(),
            bindings: BTreeMap::new(),
            adapter: ChartAdapter::new(timestamp_offset_ms),
            surface,
            filter: String::new(),
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
    }

    /// A render request for `metric` carrying a snapshot of the current filter.
    pub fn request(&self, metric: &str) -> RenderRequest {
        RenderRequest::new(metric, self.filter.clone())
    }

    pub fn is_rendered(&self, metric: &str) -> bool {
        self.bindings.get(metric).is_some_and(|b| b.is_rendered())
    }

    pub fn legend(&self, metric: &str) -> Option<&[LegendEntry]> {
        self.bindings.get(metric).map(|b| b.legend())
    }

    pub fn render(&mut self, request: &RenderRequest) -> RenderOutcome {
        let binding = match ensure_binding(
            &self.charts,
            &self.payloads,
            &mut self.bindings,
            &request.metric,
        ) {
            Ok(binding) => binding,
            Err(e) => return RenderOutcome::Failed(e),
        };
        self.adapter.render(binding, request, &mut self.surface)
    }

    /// Renders the charts shown on page load. A failing chart is logged and
    /// does not stop the others.
    pub fn initialize_page(&mut self) -> Vec<(String, RenderOutcome)> {
        let metrics: Vec<String> = self
            .charts
            .default_renders()
            .map(|c| c.id.clone())
            .collect();

        let mut outcomes = Vec::with_capacity(metrics.len());
        for metric in metrics {
            let request = self.request(&metric).with_fixed_timestamps(true);
            let outcome = self.render(&request);
            if let RenderOutcome::Failed(e) = &outcome {
                tracing::warn!("Initial render of {} failed: {}", metric, e);
            }
            outcomes.push((metric, outcome));
        }

        tracing::info!(
            "Page initialized: {} of {} charts rendered",
            outcomes
                .iter()
                .filter(|(_, o)| matches!(o, RenderOutcome::Rendered { .. }))
                .count(),
            outcomes.len()
        );
        outcomes
    }

    /// Lazily renders a chart when its collapsed panel is opened.
    pub fn expand_panel(&mut self, metric: &str) -> RenderOutcome {
        if self.is_rendered(metric) {
            return RenderOutcome::Skipped(SkipReason::AlreadyRendered);
        }
        let request = self.request(metric).with_fixed_timestamps(true);
        self.render(&request)
    }

    /// Checks or unchecks every series in a legend and rebuilds the chart.
    pub fn toggle_all(&mut self, choices_id: &str, checked: bool) -> RenderOutcome {
        self.toggle(choices_id, |binding| {
            binding.set_all_checked(checked);
            Ok(())
        })
    }

    pub fn toggle_series(&mut self, choices_id: &str, label: &str, checked: bool) -> RenderOutcome {
        self.toggle(choices_id, |binding| binding.set_checked(label, checked))
    }

    fn toggle<F>(&mut self, choices_id: &str, apply: F) -> RenderOutcome
    where
        F: FnOnce(&mut ChartBinding) -> Result<(), RenderError>,
    {
        let metric = match self.charts.find_by_choices(choices_id) {
            Some(config) => config.id.clone(),
            None => {
                return RenderOutcome::Failed(RenderError::UnknownLegend(choices_id.to_string()));
            }
        };

        match self.bindings.get_mut(&metric) {
            Some(binding) if binding.is_rendered() => {
                if let Err(e) = apply(binding) {
                    return RenderOutcome::Failed(e);
                }
            }
            _ => return RenderOutcome::Failed(RenderError::NotRendered(metric)),
        }

        tracing::debug!("Legend {} changed, rebuilding {}", choices_id, metric);
        let request = self.request(&metric);
        self.render(&request)
    }

    /// Mirrors an overview selection onto the main chart.
    pub fn select_range(&mut self, metric: &str, range: ViewRange) -> RenderOutcome {
        self.set_view(metric, Some(range))
    }

    pub fn reset_zoom(&mut self, metric: &str) -> RenderOutcome {
        self.set_view(metric, None)
    }

    fn set_view(&mut self, metric: &str, view: Option<ViewRange>) -> RenderOutcome {
        match self.bindings.get_mut(metric) {
            Some(binding) if binding.is_rendered() => binding.set_view(view),
            _ => return RenderOutcome::Failed(RenderError::NotRendered(metric.to_string())),
        }
        let request = self.request(metric);
        self.render(&request)
    }

    /// Tooltip for a plotted point, as shown when hovering it.
    pub fn hover(&self, metric: &str, label: &str, index: usize) -> Option<String> {
        let binding = self.bindings.get(metric)?;
        let series = binding.plotted().iter().find(|s| s.label == label)?;
        let point = *series.data.get(index)?;

        let config = binding.config();
        let granularity = self.payloads.get(metric).map_or(0.0, |p| p.granularity);
        let x_axis = AxisOptions {
            mode: config.x_mode,
            time_format: (config.x_mode == AxisMode::Time)
                .then(|| time_format(granularity).to_string()),
            ..AxisOptions::linear(None)
        };

        Some(format_tooltip(&config.tooltip, label, point, &x_axis, granularity))
    }
}

fn ensure_binding<'a>(
    charts: &ChartTable,
    payloads: &HashMap<String, Arc<MetricPayload>>,
    bindings: &'a mut BTreeMap<String, ChartBinding>,
    metric: &str,
) -> Result<&'a mut ChartBinding, RenderError> {
    if !bindings.contains_key(metric) {
        let config = charts
            .get(metric)
            .ok_or_else(|| RenderError::UnknownMetric(metric.to_string()))?;
        let payload = payloads
            .get(metric)
            .ok_or_else(|| RenderError::MissingPayload(metric.to_string()))?;
        tracing::debug!("Creating binding for chart {}", metric);
        bindings.insert(
            metric.to_string(),
            ChartBinding::new(config.clone(), payload.clone()),
        );
    }
    bindings
        .get_mut(metric)
        .ok_or_else(|| RenderError::UnknownMetric(metric.to_string()))
}
