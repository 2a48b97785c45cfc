// Page event dispatch - maps user interaction onto report service calls
use crate::application::plot_surface::PlotSurface;
use crate::application::report_service::ReportService;
use crate::domain::chart::ViewRange;
use crate::domain::render::RenderOutcome;

#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    Load,
    ExpandPanel { metric: String },
    ToggleAll { choices: String, checked: bool },
    ToggleSeries { choices: String, label: String, checked: bool },
    FilterChanged { metric: String, filter: String },
    SelectRange { metric: String, range: ViewRange },
    ResetZoom { metric: String },
}

/// Handle one event to completion. Returns the outcome of every render it
/// triggered, keyed by metric id (legend id for toggles).
pub fn dispatch<S: PlotSurface>(
    service: &mut ReportService<S>,
    event: PageEvent,
) -> Vec<(String, RenderOutcome)> {
    tracing::debug!("Dispatching {:?}", event);

    match event {
        PageEvent::Load => service.initialize_page(),
        PageEvent::ExpandPanel { metric } => {
            let outcome = service.expand_panel(&metric);
            vec![(metric, outcome)]
        }
        PageEvent::ToggleAll { choices, checked } => {
            let outcome = service.toggle_all(&choices, checked);
            vec![(choices, outcome)]
        }
        PageEvent::ToggleSeries {
            choices,
            label,
            checked,
        } => {
            let outcome = service.toggle_series(&choices, &label, checked);
            vec![(choices, outcome)]
        }
        PageEvent::FilterChanged { metric, filter } => {
            service.set_filter(filter);
            let request = service.request(&metric);
            let outcome = service.render(&request);
            vec![(metric, outcome)]
        }
        PageEvent::SelectRange { metric, range } => {
            let outcome = service.select_range(&metric, range);
            vec![(metric, outcome)]
        }
        PageEvent::ResetZoom { metric } => {
            let outcome = service.reset_zoom(&metric);
            vec![(metric, outcome)]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::builtin_chart_table;
    use crate::infrastructure::payload_loader::load_payloads;
    use crate::infrastructure::recording_surface::{RecordingSurface, SurfaceContent};

    fn sample_service() -> ReportService<RecordingSurface> {
        let charts = builtin_chart_table().unwrap();
        let payloads =
            load_payloads(concat!(env!("CARGO_MANIFEST_DIR"), "/data/report.json")).unwrap();
        let surface = RecordingSurface::with_elements(charts.element_ids());
        ReportService::new(charts, payloads, surface, 0)
    }

    #[test]
    fn test_load_renders_default_charts() {
        let mut service = sample_service();

        let outcomes = dispatch(&mut service, PageEvent::Load);

        let metrics: Vec<&str> = outcomes.iter().map(|(m, _)| m.as_str()).collect();
        assert_eq!(
            metrics,
            vec!["HitsPerSecond", "ResponseTimesOverTime", "ResponseTimePercentiles"]
        );
        assert!(outcomes.iter().all(|(_, o)| !o.is_failed()));
        assert!(!service.is_rendered("CodesPerSecond"));
    }

    #[test]
    fn test_every_sample_chart_renders() {
        let mut service = sample_service();
        let metrics: Vec<String> = builtin_chart_table()
            .unwrap()
            .charts
            .into_iter()
            .map(|c| c.id)
            .collect();

        for metric in metrics {
            let outcome = dispatch(&mut service, PageEvent::ExpandPanel { metric: metric.clone() });
            assert!(
                matches!(outcome[0].1, RenderOutcome::Rendered { .. }),
                "{} -> {:?}",
                metric,
                outcome
            );
        }
    }

    #[test]
    fn test_filter_changed_rerenders_one_chart() {
        let mut service = sample_service();
        dispatch(&mut service, PageEvent::Load);

        let outcomes = dispatch(
            &mut service,
            PageEvent::FilterChanged {
                metric: "ResponseTimesOverTime".to_string(),
                filter: "NoSuchRequest".to_string(),
            },
        );

        assert_eq!(outcomes.len(), 1);
        assert!(matches!(outcomes[0].1, RenderOutcome::Skipped(_)));
        assert_eq!(
            service.surface().content("bodyResponseTimeOverTime"),
            Some(&SurfaceContent::Text(
                "No graph series with filter=NoSuchRequest".to_string()
            ))
        );
        assert_eq!(service.filter(), "NoSuchRequest");
    }

    #[test]
    fn test_toggle_and_zoom_events() {
        let mut service = sample_service();
        dispatch(
            &mut service,
            PageEvent::ExpandPanel {
                metric: "BytesThroughputOverTime".to_string(),
            },
        );

        let outcomes = dispatch(
            &mut service,
            PageEvent::ToggleSeries {
                choices: "choicesBytesThroughputOverTime".to_string(),
                label: "Bytes sent per second".to_string(),
                checked: false,
            },
        );
        assert_eq!(outcomes[0].1, RenderOutcome::Rendered { series: 1, created: false });

        let outcomes = dispatch(
            &mut service,
            PageEvent::SelectRange {
                metric: "BytesThroughputOverTime".to_string(),
                range: ViewRange::x(0.0, 60_000.0),
            },
        );
        assert_eq!(outcomes[0].1, RenderOutcome::Rendered { series: 1, created: false });

        let outcomes = dispatch(
            &mut service,
            PageEvent::ToggleAll {
                choices: "choicesBytesThroughputOverTime".to_string(),
                checked: true,
            },
        );
        assert_eq!(outcomes[0].1, RenderOutcome::Rendered { series: 2, created: false });

        let outcomes = dispatch(
            &mut service,
            PageEvent::ResetZoom { metric: "BytesThroughputOverTime".to_string() },
        );
        assert!(!outcomes[0].1.is_failed());
    }
}
