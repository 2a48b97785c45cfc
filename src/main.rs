// Main entry point - Wires configuration, payloads and the page together
use perf_report_charts::application::report_service::ReportService;
use perf_report_charts::infrastructure::config::{load_chart_table, load_report_settings};
use perf_report_charts::infrastructure::payload_loader::load_payloads;
use perf_report_charts::infrastructure::recording_surface::RecordingSurface;
use perf_report_charts::presentation::page_events::{PageEvent, dispatch};

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let settings = load_report_settings()?;
    let charts = load_chart_table()?;
    let payloads = load_payloads(&settings.payload_path)?;

    tracing::info!(
        "Loaded {} charts and {} payloads from {}",
        charts.charts.len(),
        payloads.len(),
        settings.payload_path
    );

    // The recorded page has every element the chart table refers to
    let surface = RecordingSurface::with_elements(charts.element_ids());

    let mut service = ReportService::new(charts, payloads, surface, settings.timestamp_offset_ms);
    service.set_filter(settings.series_filter);

    for (metric, outcome) in dispatch(&mut service, PageEvent::Load) {
        tracing::info!("{}: {:?}", metric, outcome);
    }

    println!("{}", serde_json::to_string_pretty(&service.surface().to_json()?)?);

    Ok(())
}
