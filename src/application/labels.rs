// Axis labels, time formats and tooltip text
use crate::domain::chart::{AxisMode, AxisOptions};
use crate::domain::series::Point;
use chrono::DateTime;

const SECOND_MS: u64 = 1_000;
const MINUTE_MS: u64 = 60 * SECOND_MS;
const HOUR_MS: u64 = 60 * MINUTE_MS;
const DAY_MS: u64 = 24 * HOUR_MS;

/// Human readable duration for a granularity, e.g. "1 min" or "100 ms".
pub fn format_duration(ms: f64) -> String {
    let ms = ms.max(0.0).round() as u64;
    let plural = |n: u64, unit: &str| {
        if n == 1 {
            format!("{} {}", n, unit)
        } else {
            format!("{} {}s", n, unit)
        }
    };

    if ms >= DAY_MS && ms % DAY_MS == 0 {
        plural(ms / DAY_MS, "day")
    } else if ms >= HOUR_MS && ms % HOUR_MS == 0 {
        plural(ms / HOUR_MS, "hour")
    } else if ms >= MINUTE_MS && ms % MINUTE_MS == 0 {
        format!("{} min", ms / MINUTE_MS)
    } else if ms >= SECOND_MS && ms % SECOND_MS == 0 {
        format!("{} sec", ms / SECOND_MS)
    } else {
        format!("{} ms", ms)
    }
}

pub fn elapsed_time_label(granularity: f64) -> String {
    format!("Elapsed Time (granularity: {})", format_duration(granularity))
}

/// strftime pattern for time-mode x axes.
pub fn time_format(granularity: f64) -> &'static str {
    if granularity >= DAY_MS as f64 {
        "%m/%d %H:%M"
    } else if granularity >= MINUTE_MS as f64 {
        "%H:%M"
    } else {
        "%H:%M:%S"
    }
}

pub fn placeholder_text(filter: &str) -> String {
    format!("No graph series with filter={}", filter)
}

fn format_number(value: f64, precision: Option<usize>) -> String {
    match precision {
        Some(p) => format!("{:.*}", p, value),
        None if value.fract() == 0.0 && value.abs() < 1e15 => format!("{}", value as i64),
        None => value.to_string(),
    }
}

fn format_x(x: f64, precision: Option<usize>, x_axis: &AxisOptions) -> String {
    if x_axis.mode == AxisMode::Time {
        let pattern = x_axis.time_format.as_deref().unwrap_or("%H:%M:%S");
        if let Some(at) = DateTime::from_timestamp_millis(x as i64) {
            return at.format(pattern).to_string();
        }
    }
    format_number(x, precision)
}

/// Expands a tooltip template for one hovered point.
///
/// `%s` label, `%x`/`%y` coordinates with optional `.N` precision, `%g` the
/// upper bound of the hovered bucket (`x + granularity`), `%%` a literal `%`.
pub fn format_tooltip(
    template: &str,
    label: &str,
    point: Point,
    x_axis: &AxisOptions,
    granularity: f64,
) -> String {
    let mut out = String::with_capacity(template.len() + label.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.peek().copied() {
            Some('s') => {
                chars.next();
                out.push_str(label);
            }
            Some(axis @ ('x' | 'y')) => {
                chars.next();
                let precision = read_precision(&mut chars);
                if axis == 'x' {
                    out.push_str(&format_x(point.x, precision, x_axis));
                } else {
                    out.push_str(&format_number(point.y, precision));
                }
            }
            Some('g') => {
                chars.next();
                out.push_str(&format_number(point.x + granularity, None));
            }
            Some('%') => {
                chars.next();
                out.push('%');
            }
            _ => out.push('%'),
        }
    }

    out
}

fn read_precision(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<usize> {
    let mut lookahead = chars.clone();
    if lookahead.next() != Some('.') {
        return None;
    }
    let digits: String = lookahead.take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    chars.next();
    for _ in 0..digits.len() {
        chars.next();
    }
    digits.parse().ok()
}
