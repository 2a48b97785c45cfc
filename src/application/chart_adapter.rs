// Chart adapter - One generic adapter driven by the chart table
use crate::application::labels::{elapsed_time_label, placeholder_text, time_format};
use crate::application::plot_surface::PlotSurface;
use crate::application::series_filter::{FilterResult, filter_series};
use crate::application::timestamps::{TimestampState, fix_timestamps};
use crate::domain::chart::{
    AxisMode, AxisOptions, ChartOptions, EmptyPolicy, LegendEntry, LegendOptions, Plot,
    PlotSeries, SeriesStyle, ViewRange,
};
use crate::domain::render::{RenderError, RenderOutcome, RenderRequest, SkipReason};
use crate::domain::series::{MetricPayload, Series, TaggedSeries};
use crate::infrastructure::config::{ChartConfig, ElementIds};
use std::sync::Arc;

/// Runtime state of one chart on the page.
///
/// The payload is shared and never mutated; timestamp correction is applied
/// to `series`, a working copy.
#[derive(Debug, Clone)]
pub struct ChartBinding {
    config: ChartConfig,
    payload: Arc<MetricPayload>,
    series: Vec<Series>,
    timestamps: TimestampState,
    legend: Vec<LegendEntry>,
    view: Option<ViewRange>,
    plotted: Vec<PlotSeries>,
    rendered: bool,
}

impl ChartBinding {
    pub fn new(config: ChartConfig, payload: Arc<MetricPayload>) -> Self {
        let series = payload.series.clone();
        Self {
            config,
            payload,
            series,
            timestamps: TimestampState::Raw,
            legend: Vec::new(),
            view: None,
            plotted: Vec::new(),
            rendered: false,
        }
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    pub fn series(&self) -> &[Series] {
        &self.series
    }

    pub fn legend(&self) -> &[LegendEntry] {
        &self.legend
    }

    pub fn plotted(&self) -> &[PlotSeries] {
        &self.plotted
    }

    pub fn is_rendered(&self) -> bool {
        self.rendered
    }

    pub fn timestamps(&self) -> TimestampState {
        self.timestamps
    }

    pub fn set_view(&mut self, view: Option<ViewRange>) {
        self.view = view;
    }

    /// Rebase the working copy once per offset. A different offset starts
    /// again from the pristine payload.
    pub fn normalize_timestamps(&mut self, offset_ms: i64) -> bool {
        match self.timestamps {
            TimestampState::Normalized { offset_ms: done } if done == offset_ms => return false,
            TimestampState::Normalized { .. } => self.series = self.payload.series.clone(),
            TimestampState::Raw => {}
        }
        fix_timestamps(&mut self.series, offset_ms);
        self.timestamps = TimestampState::Normalized { offset_ms };
        true
    }

    pub fn set_all_checked(&mut self, checked: bool) {
        for entry in &mut self.legend {
            entry.checked = checked;
        }
    }

    pub fn set_checked(&mut self, label: &str, checked: bool) -> Result<(), RenderError> {
        let entry = self
            .legend
            .iter_mut()
            .find(|e| e.label == label)
            .ok_or_else(|| RenderError::UnknownSeries {
                metric: self.config.id.clone(),
                label: label.to_string(),
            })?;
        entry.checked = checked;
        Ok(())
    }

    fn is_checked(&self, label: &str) -> bool {
        self.legend
            .iter()
            .find(|e| e.label == label)
            .is_none_or(|e| e.checked)
    }

    /// New labels join the legend checked; known labels keep their state.
    fn sync_legend(&mut self, matched: &[TaggedSeries]) {
        for tagged in matched {
            if !self.legend.iter().any(|e| e.label == tagged.series.label) {
                self.legend.push(LegendEntry::new(
                    tagged.series.label.clone(),
                    tagged.series.color.clone(),
                ));
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChartAdapter {
    timestamp_offset_ms: i64,
}

impl ChartAdapter {
    pub fn new(timestamp_offset_ms: i64) -> Self {
        Self {
            timestamp_offset_ms,
        }
    }

    pub fn render<S: PlotSurface + ?Sized>(
        &self,
        binding: &mut ChartBinding,
        request: &RenderRequest,
        surface: &mut S,
    ) -> RenderOutcome {
        self.try_render(binding, request, surface).into()
    }

    fn try_render<S: PlotSurface + ?Sized>(
        &self,
        binding: &mut ChartBinding,
        request: &RenderRequest,
        surface: &mut S,
    ) -> Result<RenderOutcome, RenderError> {
        let config = binding.config.clone();
        let elements = config.elements();

        for element_id in config.required_elements() {
            if !surface.has_element(&element_id) {
                return Err(RenderError::MissingElement {
                    metric: config.id.clone(),
                    element_id,
                });
            }
        }

        if request.fix_timestamps && config.fix_timestamps {
            binding.normalize_timestamps(self.timestamp_offset_ms);
        }

        let filtered = filter_series(
            &binding.series,
            binding.payload.supports_controllers_discrimination,
            &request.filter,
            config.apply_filter,
            config.force_overall,
        );

        if filtered.is_empty() && config.empty_policy == EmptyPolicy::Placeholder {
            let placeholder = placeholder_text(&request.filter);
            surface.write_text(&elements.body, &placeholder)?;
            tracing::debug!(
                "Chart {} has no series matching filter {:?}",
                config.id,
                request.filter
            );
            return Ok(RenderOutcome::Skipped(SkipReason::NoMatchingSeries {
                placeholder,
            }));
        }

        let matched = FilterResult::into_series(filtered);
        validate(&config.id, &matched)?;

        let created = !binding.rendered;
        binding.sync_legend(&matched);

        let visible: Vec<PlotSeries> = matched
            .into_iter()
            .filter(|t| binding.is_checked(&t.series.label))
            .map(PlotSeries::from)
            .collect();

        let options = build_options(&config, &binding.payload, &elements, binding.view);
        let main = Plot {
            series: visible,
            options,
        };
        surface.plot(&elements.plot, &main)?;

        if config.overview {
            let overview = Plot {
                series: main.series.clone(),
                options: overview_options(&main.options),
            };
            surface.plot(&elements.overview, &overview)?;
        }

        let count = main.series.len();
        binding.plotted = main.series;
        binding.rendered = true;

        tracing::debug!(
            "Rendered chart {} with {} series (created: {})",
            config.id,
            count,
            created
        );

        Ok(RenderOutcome::Rendered {
            series: count,
            created,
        })
    }
}

fn validate(metric: &str, matched: &[TaggedSeries]) -> Result<(), RenderError> {
    for tagged in matched {
        if let Some(point) = tagged.series.data.iter().find(|p| !p.is_finite()) {
            return Err(RenderError::MalformedPayload {
                metric: metric.to_string(),
                reason: format!(
                    "series {} has a non-finite point ({}, {})",
                    tagged.series.label, point.x, point.y
                ),
            });
        }
    }
    Ok(())
}

fn build_options(
    config: &ChartConfig,
    payload: &MetricPayload,
    elements: &ElementIds,
    view: Option<ViewRange>,
) -> ChartOptions {
    let granularity = payload.granularity;

    let mut x_axis = match config.x_mode {
        AxisMode::Time => AxisOptions {
            mode: AxisMode::Time,
            time_format: Some(time_format(granularity).to_string()),
            ..AxisOptions::linear(Some(elapsed_time_label(granularity)))
        },
        AxisMode::Categories => AxisOptions {
            mode: AxisMode::Categories,
            ticks: payload.ticks.clone(),
            min: Some(-0.5),
            max: Some(payload.ticks.len() as f64 - 0.5),
            ..AxisOptions::linear(non_empty(&config.x_label))
        },
        AxisMode::Linear => AxisOptions::linear(non_empty(&config.x_label)),
    };
    x_axis.tick_decimals = config.tick_decimals;

    let mut y_axis = AxisOptions::linear(non_empty(&config.y_label));

    if let Some(view) = view {
        x_axis.min = Some(view.x_from);
        x_axis.max = Some(view.x_to);
        if let (Some(from), Some(to)) = (view.y_from, view.y_to) {
            y_axis.min = Some(from);
            y_axis.max = Some(to);
        }
    }

    let bar_width = match config.style {
        SeriesStyle::Bars => Some(config.bar_width.unwrap_or(granularity)),
        _ => None,
    };

    ChartOptions {
        title: payload.title.clone(),
        x_axis,
        y_axis,
        style: config.style,
        bar_width,
        granularity,
        legend: Some(LegendOptions {
            container: elements.legend.clone(),
            columns: config.legend_columns,
        }),
        tooltip: Some(config.tooltip.clone()),
        colors: config.colors.clone(),
        selection: config.overview,
    }
}

/// Small mirror of the main chart used to pick a pan/zoom range.
fn overview_options(main: &ChartOptions) -> ChartOptions {
    let strip = |axis: &AxisOptions| AxisOptions {
        label: None,
        min: None,
        max: None,
        ..axis.clone()
    };
    ChartOptions {
        x_axis: strip(&main.x_axis),
        y_axis: strip(&main.y_axis),
        legend: None,
        tooltip: None,
        selection: true,
        ..main.clone()
    }
}

fn non_empty(label: &str) -> Option<String> {
    if label.is_empty() {
        None
    } else {
        Some(label.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::series::{Point, Tick};
    use crate::infrastructure::config::builtin_chart_table;
    use crate::infrastructure::recording_surface::{RecordingSurface, SurfaceContent};

    fn config(metric: &str) -> ChartConfig {
        builtin_chart_table().unwrap().get(metric).unwrap().clone()
    }

    fn surface_for(config: &ChartConfig) -> RecordingSurface {
        RecordingSurface::with_elements(config.required_elements())
    }

    fn plot<'a>(surface: &'a RecordingSurface, id: &str) -> &'a Plot {
        match surface.content(id) {
            Some(SurfaceContent::Plot(plot)) => plot,
            other => panic!("expected a plot in #{}, got {:?}", id, other),
        }
    }

    #[test]
    fn test_single_series_plotted_unchanged() {
        let config = config("ResponseTimePercentiles");
        let payload = MetricPayload::from_series(
            "Response Time Percentiles",
            vec![Series::from_pairs("A", &[(0.0, 1.0), (1.0, 2.0)])],
        );
        let mut binding = ChartBinding::new(config.clone(), Arc::new(payload));
        let mut surface = surface_for(&config);

        let outcome = ChartAdapter::new(0).render(
            &mut binding,
            &RenderRequest::new("ResponseTimePercentiles", ""),
            &mut surface,
        );

        assert_eq!(outcome, RenderOutcome::Rendered { series: 1, created: true });
        let main = plot(&surface, "flotResponseTimesPercentiles");
        assert_eq!(main.labels(), vec!["A"]);
        assert_eq!(main.series[0].data, vec![Point::new(0.0, 1.0), Point::new(1.0, 2.0)]);
        assert_eq!(main.options.x_axis.label.as_deref(), Some("Percentiles"));
        assert_eq!(main.options.x_axis.tick_decimals, Some(1));

        let overview = plot(&surface, "overviewResponseTimesPercentiles");
        assert_eq!(overview.series, main.series);
        assert!(overview.options.legend.is_none());
        assert!(overview.options.x_axis.label.is_none());
    }

    #[test]
    fn test_placeholder_when_empty() {
        let config = config("ResponseTimesOverTime");
        let payload = MetricPayload::from_series(
            "Response Time Over Time",
            vec![Series::from_pairs("Login", &[(0.0, 1.0)])],
        );
        let mut binding = ChartBinding::new(config.clone(), Arc::new(payload));
        let mut surface = surface_for(&config);

        let outcome = ChartAdapter::new(0).render(
            &mut binding,
            &RenderRequest::new("ResponseTimesOverTime", "Checkout"),
            &mut surface,
        );

        assert_eq!(
            outcome,
            RenderOutcome::Skipped(SkipReason::NoMatchingSeries {
                placeholder: "No graph series with filter=Checkout".to_string()
            })
        );
        assert_eq!(surface.plot_calls(), 0);
        assert_eq!(
            surface.content("bodyResponseTimeOverTime"),
            Some(&SurfaceContent::Text("No graph series with filter=Checkout".to_string()))
        );
        assert!(!binding.is_rendered());
    }

    #[test]
    fn test_empty_plot_policy_still_plots() {
        let config = config("HitsPerSecond");
        let payload = MetricPayload::from_series(
            "Hits Per Second",
            vec![Series::from_pairs("hitsPerSecond", &[(0.0, 1.0)])],
        );
        let mut binding = ChartBinding::new(config.clone(), Arc::new(payload));
        let mut surface = surface_for(&config);

        let outcome = ChartAdapter::new(0).render(
            &mut binding,
            &RenderRequest::new("HitsPerSecond", "nothing"),
            &mut surface,
        );

        assert_eq!(outcome, RenderOutcome::Rendered { series: 0, created: true });
        assert_eq!(surface.plot_calls(), 2);
    }

    #[test]
    fn test_missing_element_fails_fast() {
        let config = config("HitsPerSecond");
        let payload = MetricPayload::from_series("Hits", vec![Series::from_pairs("a", &[])]);
        let mut binding = ChartBinding::new(config, Arc::new(payload));
        let mut surface = RecordingSurface::with_elements(["bodyHitsPerSecond"]);

        let outcome = ChartAdapter::new(0).render(
            &mut binding,
            &RenderRequest::new("HitsPerSecond", ""),
            &mut surface,
        );

        assert!(matches!(
            outcome,
            RenderOutcome::Failed(RenderError::MissingElement { ref element_id, .. })
                if element_id == "flotHitsPerSecond"
        ));
        assert_eq!(surface.plot_calls(), 0);
    }

    #[test]
    fn test_non_finite_point_is_malformed() {
        let config = config("BytesThroughputOverTime");
        let payload = MetricPayload::from_series(
            "Bytes",
            vec![Series::from_pairs("Bytes sent per second", &[(0.0, f64::NAN)])],
        );
        let mut binding = ChartBinding::new(config.clone(), Arc::new(payload));
        let mut surface = surface_for(&config);

        let outcome = ChartAdapter::new(0).render(
            &mut binding,
            &RenderRequest::new("BytesThroughputOverTime", ""),
            &mut surface,
        );

        assert!(matches!(
            outcome,
            RenderOutcome::Failed(RenderError::MalformedPayload { .. })
        ));
        assert_eq!(surface.plot_calls(), 0);
    }

    #[test]
    fn test_time_axis_and_timestamp_fix() {
        let config = config("HitsPerSecond");
        let payload = MetricPayload::from_series(
            "Hits Per Second",
            vec![Series::from_pairs(
                "hitsPerSecond",
                &[(1.74790848E12, 3.0), (1.74790854E12, 5.0)],
            )],
        )
        .with_granularity(60000.0);
        let payload = Arc::new(payload);
        let mut binding = ChartBinding::new(config.clone(), payload.clone());
        let mut surface = surface_for(&config);
        let adapter = ChartAdapter::new(1000);
        let request = RenderRequest::new("HitsPerSecond", "").with_fixed_timestamps(true);

        adapter.render(&mut binding, &request, &mut surface);
        adapter.render(&mut binding, &request, &mut surface);

        let main = plot(&surface, "flotHitsPerSecond");
        let xs: Vec<f64> = main.series[0].data.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![1000.0, 61000.0]);
        assert_eq!(main.options.x_axis.mode, AxisMode::Time);
        assert_eq!(main.options.x_axis.time_format.as_deref(), Some("%H:%M"));
        assert_eq!(
            main.options.x_axis.label.as_deref(),
            Some("Elapsed Time (granularity: 1 min)")
        );
        // payload stays pristine
        assert_eq!(payload.series[0].data[0].x, 1.74790848E12);
        assert_eq!(binding.timestamps(), TimestampState::Normalized { offset_ms: 1000 });
    }

    #[test]
    fn test_relative_time_payload_is_not_shifted() {
        let config = config("HitsPerSecond");
        let payload = MetricPayload::from_series(
            "Hits Per Second",
            vec![Series::from_pairs("hitsPerSecond", &[(0.0, 3.0), (60000.0, 5.0)])],
        )
        .with_granularity(60000.0);
        let mut binding = ChartBinding::new(config.clone(), Arc::new(payload));
        let mut surface = surface_for(&config);
        let request = RenderRequest::new("HitsPerSecond", "").with_fixed_timestamps(true);

        ChartAdapter::new(36_000_000).render(&mut binding, &request, &mut surface);

        let xs: Vec<f64> = plot(&surface, "flotHitsPerSecond").series[0]
            .data
            .iter()
            .map(|p| p.x)
            .collect();
        assert_eq!(xs, vec![0.0, 60000.0]);
    }

    #[test]
    fn test_new_offset_rederives_from_payload() {
        let config = config("HitsPerSecond");
        let payload = MetricPayload::from_series(
            "Hits",
            vec![Series::from_pairs("hits", &[(1.74790848E12, 3.0)])],
        );
        let mut binding = ChartBinding::new(config, Arc::new(payload));

        assert!(binding.normalize_timestamps(0));
        assert!(!binding.normalize_timestamps(0));
        assert!(binding.normalize_timestamps(500));
        assert_eq!(binding.series()[0].data[0].x, 500.0);
    }

    #[test]
    fn test_bars_and_categories() {
        let config = config("SyntheticResponseTimeDistribution");
        let payload = MetricPayload::from_series(
            "Synthetic Response Times Distribution",
            vec![
                Series::from_pairs("Requests having response time <= 500ms", &[(0.0, 4808.0)]),
                Series::from_pairs("Requests in error", &[(1.0, 12.0)]),
            ],
        )
        .with_ticks(vec![
            Tick(0.0, "<= 500ms".to_string()),
            Tick(1.0, "> 500ms".to_string()),
        ]);
        let mut binding = ChartBinding::new(config.clone(), Arc::new(payload));
        let mut surface = surface_for(&config);

        let outcome = ChartAdapter::new(0).render(
            &mut binding,
            &RenderRequest::new("SyntheticResponseTimeDistribution", "<= 500ms"),
            &mut surface,
        );

        assert_eq!(outcome, RenderOutcome::Rendered { series: 1, created: true });
        let main = plot(&surface, "flotSyntheticResponseTimeDistribution");
        assert_eq!(main.labels(), vec!["Requests having response time <= 500ms"]);
        assert_eq!(main.options.bar_width, Some(0.25));
        assert_eq!(main.options.x_axis.ticks.len(), 2);
        assert_eq!((main.options.x_axis.min, main.options.x_axis.max), (Some(-0.5), Some(1.5)));
        assert_eq!(surface.plot_calls(), 1);
    }

    #[test]
    fn test_distribution_bar_width_is_granularity() {
        let config = config("ResponseTimeDistribution");
        let payload = MetricPayload::from_series(
            "Response Time Distribution",
            vec![Series::from_pairs("Home", &[(0.0, 4807.0), (600.0, 1.0)])],
        )
        .with_granularity(100.0);
        let mut binding = ChartBinding::new(config.clone(), Arc::new(payload));
        let mut surface = surface_for(&config);

        ChartAdapter::new(0).render(
            &mut binding,
            &RenderRequest::new("ResponseTimeDistribution", ""),
            &mut surface,
        );

        let main = plot(&surface, "flotResponseTimeDistribution");
        assert_eq!(main.options.bar_width, Some(100.0));
        assert_eq!(main.options.style, SeriesStyle::Bars);
    }

    #[test]
    fn test_view_range_applies_to_main_only() {
        let config = config("TimeVsThreads");
        let payload = MetricPayload::from_series(
            "Time VS Threads",
            vec![Series::from_pairs("Login", &[(1.0, 10.0), (20.0, 30.0)])],
        );
        let mut binding = ChartBinding::new(config.clone(), Arc::new(payload));
        let mut surface = surface_for(&config);
        binding.set_view(Some(ViewRange::xy(2.0, 8.0, 0.0, 50.0)));

        ChartAdapter::new(0).render(
            &mut binding,
            &RenderRequest::new("TimeVsThreads", ""),
            &mut surface,
        );

        let main = plot(&surface, "flotTimesVsThreads");
        assert_eq!((main.options.x_axis.min, main.options.x_axis.max), (Some(2.0), Some(8.0)));
        assert_eq!((main.options.y_axis.min, main.options.y_axis.max), (Some(0.0), Some(50.0)));

        let overview = plot(&surface, "overviewTimesVsThreads");
        assert_eq!(overview.options.x_axis.min, None);
        assert!(overview.options.selection);
    }

    #[test]
    fn test_legend_keeps_state_and_adds_new_labels() {
        let config = config("TransactionsPerSecond");
        let payload = MetricPayload::from_series(
            "Transactions Per Second",
            vec![
                Series::from_pairs("Login-success", &[(0.0, 1.0)]),
                Series::from_pairs("Checkout-success", &[(0.0, 2.0)]),
            ],
        );
        let mut binding = ChartBinding::new(config.clone(), Arc::new(payload));
        let mut surface = surface_for(&config);
        let adapter = ChartAdapter::new(0);

        adapter.render(
            &mut binding,
            &RenderRequest::new("TransactionsPerSecond", "Login"),
            &mut surface,
        );
        assert_eq!(binding.legend().len(), 1);
        binding.set_checked("Login-success", false).unwrap();

        let outcome = adapter.render(
            &mut binding,
            &RenderRequest::new("TransactionsPerSecond", ""),
            &mut surface,
        );

        assert_eq!(outcome, RenderOutcome::Rendered { series: 1, created: false });
        let labels: Vec<(&str, bool)> = binding
            .legend()
            .iter()
            .map(|e| (e.label.as_str(), e.disabled()))
            .collect();
        assert_eq!(labels, vec![("Login-success", true), ("Checkout-success", false)]);
        assert_eq!(
            plot(&surface, "flotTransactionsPerSecond").labels(),
            vec!["Checkout-success"]
        );
    }
}
