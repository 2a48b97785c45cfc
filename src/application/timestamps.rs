// Timestamp normalizer - Rebases absolute epoch x-values onto a shared zero
use crate::domain::series::Series;

/// x-values at or above this are epoch milliseconds (early 1973), not
/// elapsed-time values.
pub const EPOCH_THRESHOLD_MS: f64 = 1e11;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimestampState {
    #[default]
    Raw,
    Normalized {
        offset_ms: i64,
    },
}

fn is_absolute(x: f64) -> bool {
    x.abs() >= EPOCH_THRESHOLD_MS
}

/// Shifts every absolute x-value so the earliest one across all `series`
/// becomes `offset_ms`. Returns whether anything moved.
///
/// Shifted values land below the threshold, so a second call is a no-op.
pub fn fix_timestamps(series: &mut [Series], offset_ms: i64) -> bool {
    let baseline = series
        .iter()
        .flat_map(|s| s.data.iter())
        .map(|p| p.x)
        .filter(|&x| is_absolute(x))
        .fold(None, |acc: Option<f64>, x| Some(acc.map_or(x, |m| m.min(x))));

    let Some(baseline) = baseline else {
        return false;
    };

    let offset = offset_ms as f64;
    for point in series.iter_mut().flat_map(|s| s.data.iter_mut()) {
        if is_absolute(point.x) {
            point.x = point.x - baseline + offset;
        }
    }

    tracing::debug!(baseline, offset_ms, "normalized absolute timestamps");
    true
}
