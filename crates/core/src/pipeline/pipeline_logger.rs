use std::collections::BTreeMap;
use std::time::Instant;

/// Cross-cutting logger for batch counting events.
///
/// Keeps use cases independent of where progress and statistics end up
/// (log output, a JSON report, nothing at all).
pub trait PipelineLogger: Send {
    /// Report image-level progress.
    fn progress(&mut self, current: usize, total: usize);

    /// Record how long a named stage took for one image.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Record a per-image value (e.g. raw detections, individuals).
    fn metric(&mut self, name: &str, value: f64);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Emit an end-of-batch summary. Default: no-op.
    fn summary(&self) {}
}

/// Discards all events.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn progress(&mut self, _current: usize, _total: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// Running aggregate of one timing or metric series.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SeriesStats {
    pub count: usize,
    pub sum: f64,
    pub min: f64,
    pub max: f64,
}

impl SeriesStats {
    fn new(value: f64) -> Self {
        Self {
            count: 1,
            sum: value,
            min: value,
            max: value,
        }
    }

    fn push(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

/// Logs progress through the `log` facade and aggregates timings and
/// metrics into an end-of-batch summary.
///
/// Progress lines are emitted every `throttle_images` images and on the last.
pub struct SummaryPipelineLogger {
    throttle_images: usize,
    timings: BTreeMap<String, SeriesStats>,
    metrics: BTreeMap<String, SeriesStats>,
    start_time: Instant,
    images_seen: usize,
}

impl SummaryPipelineLogger {
    pub fn new(throttle_images: usize) -> Self {
        Self {
            throttle_images: throttle_images.max(1),
            timings: BTreeMap::new(),
            metrics: BTreeMap::new(),
            start_time: Instant::now(),
            images_seen: 0,
        }
    }

    pub fn timing_stats(&self, stage: &str) -> Option<&SeriesStats> {
        self.timings.get(stage)
    }

    pub fn metric_stats(&self, name: &str) -> Option<&SeriesStats> {
        self.metrics.get(name)
    }

    /// Formatted summary, or `None` if nothing was recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() && self.metrics.is_empty() {
            return None;
        }

        let elapsed_s = self.start_time.elapsed().as_secs_f64();
        let mut lines = vec![format!(
            "Batch summary ({} images, {elapsed_s:.1}s total):",
            self.images_seen
        )];

        for (stage, stats) in &self.timings {
            lines.push(format!(
                "  {stage:12}: avg {:6.2}ms  max {:7.2}ms  total {:8.1}ms",
                stats.mean(),
                stats.max,
                stats.sum
            ));
        }
        for (name, stats) in &self.metrics {
            lines.push(format!(
                "  {name}: avg {:.1}  min {}  max {}  total {}",
                stats.mean(),
                stats.min,
                stats.max,
                stats.sum
            ));
        }

        Some(lines.join("\n"))
    }
}

impl Default for SummaryPipelineLogger {
    fn default() -> Self {
        Self::new(10)
    }
}

impl PipelineLogger for SummaryPipelineLogger {
    fn progress(&mut self, current: usize, total: usize) {
        self.images_seen = current;
        if total > 0 && (current % self.throttle_images == 0 || current == total) {
            log::info!("Counted {current}/{total} images");
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        record(&mut self.timings, stage, duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        record(&mut self.metrics, name, value);
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}

fn record(series: &mut BTreeMap<String, SeriesStats>, key: &str, value: f64) {
    match series.get_mut(key) {
        Some(stats) => stats.push(value),
        None => {
            series.insert(key.to_string(), SeriesStats::new(value));
        }
    }
}
