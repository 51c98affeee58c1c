use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::pipeline::batch_executor::{count_image, BatchExecutor, BatchProgressFn, ImageCount};
use crate::pipeline::count_individuals_use_case::CountConfig;
use crate::shared::detection::ImageDetections;

const DEFAULT_CHANNEL_CAPACITY: usize = 8;

type Job = (usize, ImageDetections);

/// Counts images on a pool of worker threads.
///
/// Layout: `feeder → workers [dedupe/cluster] → main [progress/reorder]`
///
/// Images share nothing, so each worker runs its own use case. The main
/// thread slots results back into input order as they arrive.
pub struct ThreadedBatchExecutor {
    workers: usize,
    channel_capacity: usize,
}

impl ThreadedBatchExecutor {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }
}

impl Default for ThreadedBatchExecutor {
    fn default() -> Self {
        let workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self::new(workers)
    }
}

impl BatchExecutor for ThreadedBatchExecutor {
    fn execute(
        &self,
        images: Vec<ImageDetections>,
        config: CountConfig,
        on_progress: &mut BatchProgressFn<'_>,
    ) -> Result<Vec<ImageCount>, Box<dyn std::error::Error>> {
        let total = images.len();
        if total == 0 {
            return Ok(Vec::new());
        }

        let cap = self.channel_capacity;
        let cancelled = Arc::new(AtomicBool::new(false));

        let (job_tx, job_rx) = crossbeam_channel::bounded::<Job>(cap);
        let (result_tx, result_rx) = crossbeam_channel::bounded::<(usize, ImageCount)>(cap);

        let feeder_handle = spawn_feeder(images, job_tx, cancelled.clone());
        let worker_handles: Vec<JoinHandle<()>> = (0..self.workers.min(total))
            .map(|_| spawn_worker(job_rx.clone(), result_tx.clone(), config, cancelled.clone()))
            .collect();
        drop(job_rx);
        drop(result_tx);

        let mut slots: Vec<Option<ImageCount>> = vec![None; total];
        let mut first_error: Option<Box<dyn std::error::Error>> = None;
        let mut done = 0;

        for (index, count) in result_rx.iter() {
            slots[index] = Some(count);
            done += 1;
            if !on_progress(done, total) {
                cancelled.store(true, Ordering::Relaxed);
                first_error = Some("Cancelled".into());
                break;
            }
        }
        drop(result_rx);

        if feeder_handle.join().is_err() && first_error.is_none() {
            first_error = Some("Feeder thread panicked".into());
        }
        for handle in worker_handles {
            if handle.join().is_err() && first_error.is_none() {
                first_error = Some("Worker thread panicked".into());
            }
        }

        if let Some(e) = first_error {
            return Err(e);
        }
        slots
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| "Batch ended before every image was counted".into())
    }
}

fn spawn_feeder(
    images: Vec<ImageDetections>,
    job_tx: crossbeam_channel::Sender<Job>,
    cancelled: Arc<AtomicBool>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        for job in images.into_iter().enumerate() {
            if cancelled.load(Ordering::Relaxed) {
                break;
            }
            if job_tx.send(job).is_err() {
                break;
            }
        }
    })
}

fn spawn_worker(
    job_rx: crossbeam_channel::Receiver<Job>,
    result_tx: crossbeam_channel::Sender<(usize, ImageCount)>,
    config: CountConfig,
    cancelled: Arc<AtomicBool>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        for (index, image) in job_rx {
            if cancelled.load(Ordering::Relaxed) {
                break;
            }
            log::info!("Processing: {}", image.name);
            let count = count_image(&image, config);
            if result_tx.send((index, count)).is_err() {
                break;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::infrastructure::sequential_batch_executor::SequentialBatchExecutor;
    use crate::shared::bounding_box::BoundingBox;
    use crate::shared::detection::Detection;

    /// `people` well-separated identities, each seen twice in distinct boxes.
    fn image(name: String, people: usize) -> ImageDetections {
        let detections = (0..people * 2)
            .map(|i| {
                let person = (i % people.max(1)) as f32;
                Detection::new(
                    BoundingBox::new(i as f64 * 100.0, 0.0, 50.0, 50.0),
                    vec![person * 10.0, 0.05 * (i / people.max(1)) as f32],
                )
            })
            .collect();
        ImageDetections::new(name, detections)
    }

    fn batch(n: usize) -> Vec<ImageDetections> {
        (0..n).map(|i| image(format!("img_{i:03}"), i % 5)).collect()
    }

    #[test]
    fn test_matches_sequential_results() {
        let images = batch(40);
        let threaded = ThreadedBatchExecutor::new(4)
            .execute(images.clone(), CountConfig::default(), &mut |_, _| true)
            .unwrap();
        let sequential = SequentialBatchExecutor
            .execute(images, CountConfig::default(), &mut |_, _| true)
            .unwrap();

        assert_eq!(threaded.len(), sequential.len());
        for (t, s) in threaded.iter().zip(sequential.iter()) {
            assert_eq!(t.name, s.name);
            assert_eq!(t.outcome, s.outcome);
        }
    }

    #[test]
    fn test_results_in_input_order() {
        let results = ThreadedBatchExecutor::new(3)
            .execute(batch(20), CountConfig::default(), &mut |_, _| true)
            .unwrap();
        for (i, r) in results.iter().enumerate() {
            assert_eq!(r.name, format!("img_{i:03}"));
            assert_eq!(r.individuals(), i % 5);
        }
    }

    #[test]
    fn test_progress_counts_every_image() {
        let mut last = (0, 0);
        ThreadedBatchExecutor::new(2)
            .execute(batch(12), CountConfig::default(), &mut |current, total| {
                assert!(current > last.0);
                last = (current, total);
                true
            })
            .unwrap();
        assert_eq!(last, (12, 12));
    }

    #[test]
    fn test_cancel_returns_error() {
        let result = ThreadedBatchExecutor::new(2).execute(
            batch(30),
            CountConfig::default(),
            &mut |current, _| current < 3,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_failed_image_does_not_stop_batch() {
        let mut images = batch(4);
        images[1] = ImageDetections::new(
            "broken",
            vec![
                Detection::new(BoundingBox::new(0.0, 0.0, 10.0, 10.0), vec![0.0, 0.0]),
                Detection::new(BoundingBox::new(50.0, 0.0, 10.0, 10.0), vec![0.0]),
            ],
        );
        let results = ThreadedBatchExecutor::new(2)
            .execute(images, CountConfig::default(), &mut |_, _| true)
            .unwrap();
        assert_eq!(results.len(), 4);
        assert!(results[1].is_failed());
        assert_eq!(results[3].individuals(), 3);
    }

    #[test]
    fn test_empty_batch() {
        let results = ThreadedBatchExecutor::default()
            .execute(Vec::new(), CountConfig::default(), &mut |_, _| true)
            .unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_zero_workers_clamped() {
        assert_eq!(ThreadedBatchExecutor::new(0).workers(), 1);
    }
}
