//! Ember Renderer - CPU Path Tracing
//!
//! A Monte Carlo path tracer: jittered camera rays, a depth-bounded
//! light-transport integrator, a static row-partitioned thread pool and a
//! gamma-correcting image encoder (PPM, BMP, PNG).

mod sampling;
mod hittable;
mod material;
mod sphere;
mod camera;
mod integrator;
mod framebuffer;
mod progress;
mod renderer;
mod output;

pub use sampling::{gen_f32, random_in_unit_disk, random_unit_vector, row_rng};
pub use hittable::{HitRecord, Hittable, HittableList};
pub use material::{Color, Dielectric, Lambertian, Material, Metal, ScatterResult};
pub use sphere::Sphere;
pub use camera::{Camera, CameraConfig, ConfigError, ConfigResult};
pub use integrator::{ray_color, sky_gradient, SKY_BLUE, T_MIN};
pub use framebuffer::{linear_to_gamma, Framebuffer};
pub use progress::{ProgressCounters, ProgressMonitor};
pub use renderer::{row_ranges, RenderError, RenderResult, Renderer, DEFAULT_PROGRESS_INTERVAL};
pub use output::{write_bmp, write_image, write_ppm, ImageFormat, OutputError, OutputResult};

/// Re-export Vec3 and common math types from ember_math
pub use ember_math::{Interval, Ray, Vec3};
