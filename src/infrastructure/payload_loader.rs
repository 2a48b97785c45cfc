// Loads the pre-computed metric payloads produced by the load generator
use crate::domain::series::{MetricPayload, PayloadDocument};
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;

/// Parse a JSON object mapping metric id to payload.
pub fn parse_payloads(json: &str) -> Result<HashMap<String, MetricPayload>> {
    let documents: HashMap<String, PayloadDocument> =
        serde_json::from_str(json).context("Failed to parse metric payloads")?;

    Ok(documents
        .into_iter()
        .map(|(metric, doc)| (metric, doc.into_payload()))
        .collect())
}

pub fn load_payloads(path: impl AsRef<Path>) -> Result<HashMap<String, MetricPayload>> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read payloads from {}", path.display()))?;

    let payloads = parse_payloads(&json)?;
    tracing::debug!("Loaded {} metric payloads from {}", payloads.len(), path.display());
    Ok(payloads)
}
