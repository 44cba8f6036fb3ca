use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::metrics::stats::{cache_speedup_pct, LatencyStats};
use crate::metrics::{Operation, SampleStore};

pub const CHART_FILE: &str = "performance_analysis.png";

const MISS_COLOR: RGBColor = RGBColor(0xf0, 0x80, 0x80);
const HIT_COLOR: RGBColor = RGBColor(0x90, 0xee, 0x90);

type ChartResult = Result<(), Box<dyn std::error::Error>>;

// ─── Entry point ─────────────────────────────────────────────────

/// Render the six-panel performance chart into `output_dir`.
/// Returns the written path, or `None` for an empty store (nothing is
/// touched on disk in that case).
pub fn render_charts(store: &SampleStore, output_dir: &Path) -> anyhow::Result<Option<PathBuf>> {
    if store.is_empty() {
        return Ok(None);
    }

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("creating output directory {}", output_dir.display()))?;
    let path = output_dir.join(CHART_FILE);

    draw(store, &path).map_err(|e| anyhow!("chart rendering failed: {e}"))?;
    Ok(Some(path))
}

fn draw(store: &SampleStore, path: &Path) -> ChartResult {
    let root = BitMapBackend::new(path, (1800, 1400)).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled("Proxy Server Performance Analysis", ("sans-serif", 32))?;

    let areas = root.split_evenly((3, 2));
    cache_impact_panel(&areas[0], store)?;
    distribution_panel(&areas[1], store)?;
    cache_hit_panel(&areas[2], store)?;
    status_code_panel(&areas[3], store)?;
    timeline_panel(&areas[4], store)?;
    error_rate_panel(&areas[5], store)?;

    root.present()?;
    Ok(())
}

// ─── Panels ──────────────────────────────────────────────────────

/// Mean response time of the first (uncached) fetch vs. the cached
/// ones, with ±1 std-dev whiskers and the speedup in the caption.
fn cache_impact_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    store: &SampleStore,
) -> ChartResult
where
    DB::ErrorType: 'static,
{
    let nocache_times = store.times_for(Operation::LargeRequestNoCache);
    let cached_times = store.times_for(Operation::LargeRequestCached);
    let nocache = LatencyStats::from_times(&nocache_times);
    let cached = LatencyStats::from_times(&cached_times);

    if nocache.is_none() && cached.is_none() {
        return no_data(area, "Cache Performance Impact");
    }

    let caption = match cache_speedup_pct(&nocache_times, &cached_times) {
        Some(pct) => format!("Cache Performance Impact (speedup {pct:.1}%)"),
        None => "Cache Performance Impact (speedup: no data)".to_string(),
    };

    let labels = ["first (no cache)".to_string(), "cached".to_string()];
    let groups = [nocache, cached];
    let y_max = groups
        .iter()
        .flatten()
        .map(|s| s.mean + s.stddev)
        .fold(0.0f64, f64::max)
        .max(1e-6)
        * 1.25;

    let mut chart = ChartBuilder::on(area)
        .caption(caption, ("sans-serif", 20))
        .margin(12)
        .x_label_area_size(32)
        .y_label_area_size(60)
        .build_cartesian_2d((0i32..2i32).into_segmented(), 0f64..y_max)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(labels.len())
        .x_label_formatter(&|v| segment_label(v, &labels))
        .y_desc("response time (s)")
        .label_style(("sans-serif", 12))
        .draw()?;

    for (i, stats) in groups.iter().enumerate() {
        let Some(s) = stats else { continue };
        let color = if i == 0 { MISS_COLOR } else { HIT_COLOR };
        let x = i as i32;
        chart.draw_series(std::iter::once(Rectangle::new(
            [(SegmentValue::Exact(x), 0.0), (SegmentValue::Exact(x + 1), s.mean)],
            color.filled(),
        )))?;
        if s.stddev > 0.0 {
            chart.draw_series(std::iter::once(ErrorBar::new_vertical(
                SegmentValue::CenterOf(x),
                (s.mean - s.stddev).max(0.0),
                s.mean,
                s.mean + s.stddev,
                BLACK.stroke_width(2),
                12,
            )))?;
        }
    }
    Ok(())
}

/// Box plot of response times per operation, large-object fetches
/// excluded (they live in the cache panel).
fn distribution_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    store: &SampleStore,
) -> ChartResult
where
    DB::ErrorType: 'static,
{
    let groups: Vec<(String, Vec<f64>)> = store
        .by_operation()
        .into_iter()
        .filter(|(op, _)| !op.is_large_request())
        .map(|(op, g)| {
            let times = g.iter().map(|s| s.response_time.as_secs_f64()).collect();
            (op.label().to_string(), times)
        })
        .collect();

    if groups.is_empty() {
        return no_data(area, "Response Time Distribution");
    }

    let labels: Vec<String> = groups.iter().map(|(l, _)| l.clone()).collect();
    let y_max = groups
        .iter()
        .flat_map(|(_, times)| times.iter().copied())
        .fold(0.0f64, f64::max)
        .max(1e-6) as f32
        * 1.25;

    let mut chart = ChartBuilder::on(area)
        .caption("Response Time Distribution", ("sans-serif", 20))
        .margin(12)
        .x_label_area_size(32)
        .y_label_area_size(60)
        .build_cartesian_2d((0i32..labels.len() as i32).into_segmented(), 0f32..y_max)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(labels.len())
        .x_label_formatter(&|v| segment_label(v, &labels))
        .y_desc("response time (s)")
        .label_style(("sans-serif", 12))
        .draw()?;

    chart.draw_series(groups.iter().enumerate().map(|(i, (_, times))| {
        Boxplot::new_vertical(SegmentValue::CenterOf(i as i32), &Quartiles::new(times))
            .width(24)
            .whisker_width(0.6)
            .style(BLUE)
    }))?;
    Ok(())
}

/// Counts of samples by `cache_hit` flag.
fn cache_hit_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    store: &SampleStore,
) -> ChartResult
where
    DB::ErrorType: 'static,
{
    let (misses, hits) = store.cache_hit_counts();
    let total = misses + hits;
    let caption = format!(
        "Cache Hit Rate ({:.1}% of samples)",
        hits as f64 / total as f64 * 100.0
    );
    bar_panel(
        area,
        &caption,
        &["miss".to_string(), "hit".to_string()],
        &[misses as f64, hits as f64],
        "samples",
        BLUE,
    )
}

/// Counts of samples by HTTP status; failed requests grouped as "none".
fn status_code_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    store: &SampleStore,
) -> ChartResult
where
    DB::ErrorType: 'static,
{
    let counts = store.status_code_counts();
    let labels: Vec<String> = counts
        .keys()
        .map(|status| match status {
            Some(code) => code.to_string(),
            None => "none".to_string(),
        })
        .collect();
    let values: Vec<f64> = counts.values().map(|&c| c as f64).collect();

    bar_panel(
        area,
        "Status Code Distribution",
        &labels,
        &values,
        "samples",
        RGBColor(0x64, 0x95, 0xed),
    )
}

/// Every sample's response time, in recording order across the run.
fn timeline_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    store: &SampleStore,
) -> ChartResult
where
    DB::ErrorType: 'static,
{
    let samples = store.samples();
    let first_ts = samples[0].timestamp;
    let points: Vec<(f64, f64)> = samples
        .iter()
        .map(|s| {
            let offset = (s.timestamp - first_ts).num_milliseconds().max(0) as f64 / 1000.0;
            (offset, s.response_time.as_secs_f64())
        })
        .collect();

    let span = points.last().map(|(x, _)| *x).unwrap_or(0.0).max(1e-3);
    let y_max = points
        .iter()
        .map(|(_, y)| *y)
        .fold(0.0f64, f64::max)
        .max(1e-6)
        * 1.25;

    let mut chart = ChartBuilder::on(area)
        .caption("Request Response Times Over Time", ("sans-serif", 20))
        .margin(12)
        .x_label_area_size(36)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..span, 0f64..y_max)?;
    chart
        .configure_mesh()
        .x_desc("seconds since run start")
        .y_desc("response time (s)")
        .label_style(("sans-serif", 12))
        .draw()?;

    chart.draw_series(LineSeries::new(points.iter().copied(), &BLUE))?;
    chart.draw_series(
        points
            .iter()
            .map(|(x, y)| Circle::new((*x, *y), 3, BLUE.filled())),
    )?;
    Ok(())
}

/// Error rate per operation label (status >= 400 over total).
fn error_rate_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    store: &SampleStore,
) -> ChartResult
where
    DB::ErrorType: 'static,
{
    let rates = store.error_rates();
    let labels: Vec<String> = rates.keys().map(|op| op.label().to_string()).collect();
    let values: Vec<f64> = rates.values().copied().collect();

    bar_panel(
        area,
        "Error Rate by Operation",
        &labels,
        &values,
        "error rate (%)",
        RED,
    )
}

// ─── Shared drawing helpers ──────────────────────────────────────

fn bar_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    caption: &str,
    labels: &[String],
    values: &[f64],
    y_desc: &str,
    color: RGBColor,
) -> ChartResult
where
    DB::ErrorType: 'static,
{
    if values.is_empty() {
        return no_data(area, caption);
    }

    let y_max = values.iter().copied().fold(0.0f64, f64::max).max(1.0) * 1.25;
    let mut chart = ChartBuilder::on(area)
        .caption(caption, ("sans-serif", 20))
        .margin(12)
        .x_label_area_size(32)
        .y_label_area_size(60)
        .build_cartesian_2d((0i32..labels.len() as i32).into_segmented(), 0f64..y_max)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(labels.len())
        .x_label_formatter(&|v| segment_label(v, labels))
        .y_desc(y_desc)
        .label_style(("sans-serif", 12))
        .draw()?;

    chart.draw_series(values.iter().enumerate().map(|(i, v)| {
        Rectangle::new(
            [
                (SegmentValue::Exact(i as i32), 0.0),
                (SegmentValue::Exact(i as i32 + 1), *v),
            ],
            color.mix(0.6).filled(),
        )
    }))?;
    Ok(())
}

fn segment_label(value: &SegmentValue<i32>, labels: &[String]) -> String {
    match value {
        SegmentValue::CenterOf(i) if (*i as usize) < labels.len() => labels[*i as usize].clone(),
        _ => String::new(),
    }
}

fn no_data<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, caption: &str) -> ChartResult
where
    DB::ErrorType: 'static,
{
    area.draw(&Text::new(
        format!("{caption}: no data"),
        (30, 30),
        ("sans-serif", 18).into_font(),
    ))?;
    Ok(())
}

// ─── Tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_store_writes_nothing() {
        let store = SampleStore::new();
        let dir = std::env::temp_dir().join(format!("pcb-charts-{}", std::process::id()));

        let written = render_charts(&store, &dir).unwrap();
        assert!(written.is_none());
        assert!(!dir.join(CHART_FILE).exists());
    }
}
