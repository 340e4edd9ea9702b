//! Row-partitioned parallel renderer.
//!
//! Implements the render loop with:
//! - A fixed set of scoped worker threads, one static row band each
//! - Per-row seeded sampling, so output does not depend on the thread count
//! - A progress monitor ticking on the calling thread

use crate::{
    integrator::ray_color, sampling::row_rng, Camera, CameraConfig, Color, ConfigError,
    Framebuffer, Hittable, ProgressCounters, ProgressMonitor,
};
use std::ops::Range;
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Default delay between progress monitor readings.
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_millis(50);

/// Errors that abort a render.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("invalid camera configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("{count} render worker(s) panicked")]
    WorkerPanicked { count: usize },
}

/// Result type for render operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Split `[0, image_height)` into `thread_count` contiguous bands.
///
/// Every band has `image_height / thread_count` rows except the last, which
/// also takes the remainder. A thread count of zero is treated as one.
pub fn row_ranges(image_height: u32, thread_count: usize) -> Vec<Range<u32>> {
    let workers = u32::try_from(thread_count.max(1)).unwrap_or(u32::MAX);
    let band = image_height / workers;

    (0..workers)
        .map(|i| {
            let start = i * band;
            let end = if i + 1 == workers { image_height } else { start + band };
            start..end
        })
        .collect()
}

/// Drives a full render: camera setup, workers, progress and accumulation.
pub struct Renderer {
    config: CameraConfig,
    counters: ProgressCounters,
    progress_interval: Duration,
}

impl Renderer {
    /// Create a renderer for `config`. Nothing is validated until [`render`](Self::render).
    pub fn new(config: CameraConfig) -> Self {
        Self {
            counters: ProgressCounters::new(config.worker_count()),
            config,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }

    /// Set the delay between progress readings.
    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    /// Settings used by the next render; the camera frame is rebuilt each call.
    pub fn config_mut(&mut self) -> &mut CameraConfig {
        &mut self.config
    }

    /// Per-worker row counters of the most recent render.
    pub fn counters(&self) -> &ProgressCounters {
        &self.counters
    }

    /// Render `world`, returning the accumulated sample sums.
    ///
    /// Blocks until every worker has finished. A panic in any worker fails
    /// the whole render; no partial image is returned.
    pub fn render(&mut self, world: &dyn Hittable) -> RenderResult<Framebuffer> {
        let camera = Camera::new(&self.config)?;

        if self.config.threads == 0 {
            log::warn!("Thread count 0 requested, using 1");
        }
        let workers = self.config.worker_count();
        let width = self.config.image_width;
        let height = self.config.image_height;
        let ranges = row_ranges(height, workers);
        log::debug!("Row bands: {:?}", ranges);

        let seed = self.config.seed.unwrap_or_else(rand::random);
        let pass = SamplePass {
            camera: &camera,
            world,
            samples_per_pixel: self.config.samples_per_pixel,
            max_depth: self.config.max_depth,
            seed,
        };

        self.counters.prepare(workers);
        let counters = &self.counters;
        let interval = self.progress_interval;

        let mut framebuffer = Framebuffer::new(width, height, self.config.samples_per_pixel);

        log::info!(
            "Rendering {}x{} @ {} spp, depth {}, {} thread(s), seed {}",
            width,
            height,
            self.config.samples_per_pixel,
            self.config.max_depth,
            workers,
            seed
        );
        let start = Instant::now();

        let panicked = thread::scope(|scope| {
            let mut remaining = framebuffer.pixels_mut();
            let mut handles = Vec::with_capacity(ranges.len());

            for (worker, rows) in ranges.iter().cloned().enumerate() {
                let (band, rest) =
                    std::mem::take(&mut remaining).split_at_mut(rows.len() * width as usize);
                remaining = rest;

                let pass = &pass;
                handles.push(scope.spawn(move || {
                    pass.render_rows(rows, band, |_| counters.row_done(worker));
                }));
            }

            let mut monitor = ProgressMonitor::new(counters, height);
            loop {
                if let Some(percent) = monitor.poll() {
                    log::info!("Rendering: {}%", percent);
                }
                if monitor.is_complete() || handles.iter().all(|h| h.is_finished()) {
                    break;
                }
                thread::sleep(interval);
            }

            let panicked = handles
                .into_iter()
                .map(|handle| handle.join())
                .filter(Result::is_err)
                .count();

            // Workers may finish between the last tick and the join
            if let Some(percent) = monitor.poll() {
                log::info!("Rendering: {}%", percent);
            }

            panicked
        });

        if panicked > 0 {
            log::error!("{} render worker(s) panicked", panicked);
            return Err(RenderError::WorkerPanicked { count: panicked });
        }

        log::info!("Rendered in {:.2?}", start.elapsed());
        Ok(framebuffer)
    }
}

/// Read-only state shared by every worker of one render.
struct SamplePass<'a> {
    camera: &'a Camera,
    world: &'a dyn Hittable,
    samples_per_pixel: u32,
    max_depth: u32,
    seed: u64,
}

impl SamplePass<'_> {
    /// Accumulate samples for `rows` into `band`, which holds exactly those rows.
    fn render_rows(&self, rows: Range<u32>, band: &mut [Color], mut on_row: impl FnMut(u32)) {
        let width = self.camera.image_width() as usize;

        for (row, line) in rows.zip(band.chunks_mut(width)) {
            let mut rng = row_rng(self.seed, row);

            for (column, pixel) in line.iter_mut().enumerate() {
                for _ in 0..self.samples_per_pixel {
                    let ray = self.camera.get_ray(column as u32, row, &mut rng);
                    *pixel += ray_color(&ray, self.max_depth, self.world, &mut rng);
                }
            }

            on_row(row);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HitRecord, HittableList, Interval, Lambertian, Metal, Ray, Sphere, Vec3};

    fn small_scene() -> HittableList {
        let mut world = HittableList::new();
        world.add(Box::new(Sphere::new(
            Vec3::new(0.0, -100.5, -1.0),
            100.0,
            Lambertian::new(Color::new(0.8, 0.8, 0.0)),
        )));
        world.add(Box::new(Sphere::new(
            Vec3::new(0.0, 0.0, -1.2),
            0.5,
            Lambertian::new(Color::new(0.1, 0.2, 0.5)),
        )));
        world.add(Box::new(Sphere::new(
            Vec3::new(1.0, 0.0, -1.0),
            0.5,
            Metal::new(Color::new(0.8, 0.6, 0.2), 0.3),
        )));
        world
    }

    fn small_config() -> CameraConfig {
        CameraConfig::default()
            .with_resolution(16, 10)
            .with_quality(4, 8)
            .with_position(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
            .with_lens(90.0, 2.0, 1.0)
            .with_seed(1234)
    }

    #[test]
    fn test_row_ranges_with_remainder() {
        let ranges = row_ranges(100, 3);
        assert_eq!(ranges, vec![0..33, 33..66, 66..100]);

        let total: usize = ranges.iter().map(|r| r.len()).sum();
        assert_eq!(total, 100);
        for pair in ranges.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
    }

    #[test]
    fn test_row_ranges_zero_threads_matches_one() {
        assert_eq!(row_ranges(50, 0), row_ranges(50, 1));
        assert_eq!(row_ranges(50, 1), vec![0..50]);
    }

    #[test]
    fn test_row_ranges_more_threads_than_rows() {
        let ranges = row_ranges(2, 4);
        assert_eq!(ranges, vec![0..0, 0..0, 0..0, 0..2]);
    }

    #[test]
    fn test_thread_count_does_not_change_output() {
        let world = small_scene();

        let single = Renderer::new(small_config().with_threads(1))
            .render(&world)
            .unwrap();
        let many = Renderer::new(small_config().with_threads(3))
            .render(&world)
            .unwrap();
        let zero = Renderer::new(small_config().with_threads(0))
            .render(&world)
            .unwrap();

        assert_eq!(single, many);
        assert_eq!(single, zero);
    }

    #[test]
    fn test_more_threads_than_rows() {
        let world = small_scene();
        let config = small_config().with_resolution(8, 2);

        // Four empty bands and one band holding both rows
        let image = Renderer::new(config.clone().with_threads(5))
            .render(&world)
            .unwrap();
        let reference = Renderer::new(config.with_threads(1)).render(&world).unwrap();
        assert_eq!(image, reference);
        assert_eq!(image.pixels().len(), 16);
    }

    #[test]
    fn test_empty_scene_fills_every_cell() {
        let world = HittableList::new();
        let config = small_config().with_threads(4);

        let image = Renderer::new(config).render(&world).unwrap();
        assert_eq!(image.pixels().len(), 16 * 10);
        for sum in image.pixels() {
            // Each of 4 samples is a sky color between white and blue
            let avg = *sum / 4.0;
            assert!(avg.z > 0.999 && avg.z < 1.001);
            assert!(avg.x >= 0.5 - 1e-4 && avg.x <= 1.0 + 1e-4);
        }
    }

    #[test]
    fn test_counters_reset_after_render() {
        let world = HittableList::new();
        let mut renderer = Renderer::new(small_config().with_threads(2));

        renderer.render(&world).unwrap();
        assert_eq!(renderer.counters().len(), 2);
        assert_eq!(renderer.counters().total(), 0);

        // Reconfigure between renders; the frame is rebuilt
        renderer.config_mut().image_width = 4;
        renderer.config_mut().threads = 3;
        let image = renderer.render(&world).unwrap();
        assert_eq!(image.width(), 4);
        assert_eq!(renderer.counters().len(), 3);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let world = HittableList::new();
        let mut renderer = Renderer::new(small_config().with_quality(0, 8));

        assert!(matches!(
            renderer.render(&world),
            Err(RenderError::Config(ConfigError::ZeroSamples))
        ));
    }

    struct Exploding;

    impl Hittable for Exploding {
        fn hit(&self, ray: &Ray, _ray_t: Interval) -> Option<HitRecord<'_>> {
            // Only the bottom of the image triggers the failure
            if ray.direction().y < -0.5 {
                panic!("intersection failure");
            }
            None
        }
    }

    #[test]
    fn test_worker_panic_fails_render() {
        let config = small_config().with_threads(2).with_lens(90.0, 0.0, 1.0);
        let result = Renderer::new(config).render(&Exploding);

        assert!(matches!(result, Err(RenderError::WorkerPanicked { count: 1 })));
    }
}
