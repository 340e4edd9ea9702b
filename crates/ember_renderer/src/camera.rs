//! Camera configuration, frame setup and primary ray generation.

use crate::sampling::{gen_f32, random_in_unit_disk};
use ember_math::{Ray, Vec3};
use rand::RngCore;
use thiserror::Error;

/// Errors raised when a camera configuration cannot produce a valid frame.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("image dimensions must be non-zero, got {width}x{height}")]
    ZeroDimensions { width: u32, height: u32 },

    #[error("samples per pixel must be non-zero")]
    ZeroSamples,

    #[error("max depth must be non-zero")]
    ZeroDepth,

    #[error("degenerate camera basis: look_from {look_from}, look_at {look_at}, vup {vup}")]
    DegenerateBasis {
        look_from: Vec3,
        look_at: Vec3,
        vup: Vec3,
    },

    #[error("vertical field of view must be in (0, 180) degrees, got {0}")]
    InvalidFieldOfView(f32),

    #[error("focus distance must be finite and positive, got {0}")]
    InvalidFocusDistance(f32),

    #[error("defocus angle must be finite, got {0}")]
    InvalidDefocusAngle(f32),
}

/// Result type for camera configuration.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// User-facing camera and render settings.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraConfig {
    // Image settings
    pub image_width: u32,
    pub image_height: u32,
    pub samples_per_pixel: u32,
    pub max_depth: u32,

    // Camera positioning
    pub look_from: Vec3,
    pub look_at: Vec3,
    pub vup: Vec3,

    // Lens settings
    /// Vertical field of view in degrees
    pub vfov: f32,
    /// Variation angle of rays through each pixel, in degrees
    pub defocus_angle: f32,
    /// Distance from camera to plane of perfect focus
    pub focus_dist: f32,

    /// Worker threads; 0 behaves as 1
    pub threads: usize,
    /// Sampling seed. `None` draws a fresh seed per render.
    pub seed: Option<u64>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            image_width: 1366,
            image_height: 720,
            samples_per_pixel: 10,
            max_depth: 10,
            look_from: Vec3::new(0.0, 0.0, -1.0),
            look_at: Vec3::ZERO,
            vup: Vec3::Y,
            vfov: 90.0,
            defocus_angle: 0.0,
            focus_dist: 1.0,
            threads: 1,
            seed: None,
        }
    }
}

impl CameraConfig {
    /// Set image resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.image_width = width;
        self.image_height = height;
        self
    }

    /// Set quality settings.
    pub fn with_quality(mut self, samples: u32, max_depth: u32) -> Self {
        self.samples_per_pixel = samples;
        self.max_depth = max_depth;
        self
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self
    }

    /// Set lens settings.
    pub fn with_lens(mut self, vfov: f32, defocus_angle: f32, focus_dist: f32) -> Self {
        self.vfov = vfov;
        self.defocus_angle = defocus_angle;
        self.focus_dist = focus_dist;
        self
    }

    /// Set the worker thread count.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Fix the sampling seed, making renders reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Thread count with the minimum of one applied.
    pub fn worker_count(&self) -> usize {
        self.threads.max(1)
    }

    /// Check the settings that would otherwise turn into NaN pixels.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.image_width == 0 || self.image_height == 0 {
            return Err(ConfigError::ZeroDimensions {
                width: self.image_width,
                height: self.image_height,
            });
        }
        if self.samples_per_pixel == 0 {
            return Err(ConfigError::ZeroSamples);
        }
        if self.max_depth == 0 {
            return Err(ConfigError::ZeroDepth);
        }
        if !(self.vfov > 0.0 && self.vfov < 180.0) {
            return Err(ConfigError::InvalidFieldOfView(self.vfov));
        }
        if !(self.focus_dist.is_finite() && self.focus_dist > 0.0) {
            return Err(ConfigError::InvalidFocusDistance(self.focus_dist));
        }
        if !self.defocus_angle.is_finite() {
            return Err(ConfigError::InvalidDefocusAngle(self.defocus_angle));
        }

        let view = self.look_from - self.look_at;
        let side = self.vup.cross(view);
        // Compares sin² of the angle between vup and the view axis against epsilon
        let threshold = f32::EPSILON * view.length_squared() * self.vup.length_squared();
        if view.length_squared() == 0.0 || side.length_squared() <= threshold {
            return Err(self.degenerate_basis());
        }

        Ok(())
    }

    fn degenerate_basis(&self) -> ConfigError {
        ConfigError::DegenerateBasis {
            look_from: self.look_from,
            look_at: self.look_at,
            vup: self.vup,
        }
    }
}

/// Derived camera frame, computed once per render from a [`CameraConfig`].
#[derive(Debug, Clone)]
pub struct Camera {
    image_width: u32,
    image_height: u32,
    defocus_angle: f32,

    center: Vec3,
    pixel00_loc: Vec3,
    pixel_delta_u: Vec3,
    pixel_delta_v: Vec3,
    u: Vec3,
    v: Vec3,
    w: Vec3,
    defocus_disk_u: Vec3,
    defocus_disk_v: Vec3,
}

impl Camera {
    /// Validate `config` and compute the camera frame.
    pub fn new(config: &CameraConfig) -> ConfigResult<Self> {
        config.validate()?;

        let center = config.look_from;

        // Calculate viewport dimensions
        let theta = config.vfov.to_radians();
        let h = (theta / 2.0).tan();
        let viewport_height = 2.0 * h * config.focus_dist;
        let viewport_width =
            viewport_height * (config.image_width as f32 / config.image_height as f32);

        // Calculate camera basis vectors
        let w = (config.look_from - config.look_at).normalize();
        let u = config.vup.cross(w).normalize();
        let v = w.cross(u);
        if !(w.is_finite() && u.is_finite() && v.is_finite()) {
            return Err(config.degenerate_basis());
        }

        // Calculate viewport vectors
        let viewport_u = viewport_width * u;
        let viewport_v = -viewport_height * v;

        // Calculate pixel delta vectors
        let pixel_delta_u = viewport_u / config.image_width as f32;
        let pixel_delta_v = viewport_v / config.image_height as f32;

        // Calculate upper left pixel location
        let viewport_upper_left =
            center - config.focus_dist * w - viewport_u / 2.0 - viewport_v / 2.0;
        let pixel00_loc = viewport_upper_left + 0.5 * (pixel_delta_u + pixel_delta_v);

        // Calculate defocus disk basis vectors
        let defocus_radius = config.focus_dist * (config.defocus_angle / 2.0).to_radians().tan();

        let camera = Self {
            image_width: config.image_width,
            image_height: config.image_height,
            defocus_angle: config.defocus_angle,
            center,
            pixel00_loc,
            pixel_delta_u,
            pixel_delta_v,
            u,
            v,
            w,
            defocus_disk_u: u * defocus_radius,
            defocus_disk_v: v * defocus_radius,
        };

        log::debug!(
            "Camera frame: center={} pixel00={} du={} dv={} defocus_radius={}",
            camera.center,
            camera.pixel00_loc,
            camera.pixel_delta_u,
            camera.pixel_delta_v,
            defocus_radius
        );

        Ok(camera)
    }

    /// Image width in pixels.
    pub fn image_width(&self) -> u32 {
        self.image_width
    }

    /// Image height in pixels.
    pub fn image_height(&self) -> u32 {
        self.image_height
    }

    /// Camera center (ray origin for the pinhole model).
    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Orthonormal frame `(u, v, w)`: right, up, backwards.
    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        (self.u, self.v, self.w)
    }

    /// Center of the top-left pixel.
    pub fn pixel00_loc(&self) -> Vec3 {
        self.pixel00_loc
    }

    /// Per-pixel steps across and down the viewport.
    pub fn pixel_deltas(&self) -> (Vec3, Vec3) {
        (self.pixel_delta_u, self.pixel_delta_v)
    }

    /// Generate a ray for pixel (i, j) with random sampling.
    pub fn get_ray(&self, i: u32, j: u32, rng: &mut dyn RngCore) -> Ray {
        // Box-filter jitter within the pixel footprint
        let pixel_sample = self.pixel00_loc
            + ((i as f32) + gen_f32(rng)) * self.pixel_delta_u
            + ((j as f32) + gen_f32(rng)) * self.pixel_delta_v;

        let ray_origin = if self.defocus_angle <= 0.0 {
            self.center
        } else {
            self.defocus_disk_sample(rng)
        };

        Ray::new(ray_origin, pixel_sample - ray_origin)
    }

    /// Sample a point on the defocus disk.
    fn defocus_disk_sample(&self, rng: &mut dyn RngCore) -> Vec3 {
        let p = random_in_unit_disk(rng);
        self.center + p.x * self.defocus_disk_u + p.y * self.defocus_disk_v
    }
}
