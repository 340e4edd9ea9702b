//! Light transport: the radiance carried back along a camera ray.

use crate::{Color, Hittable};
use ember_math::{Interval, Ray};
use rand::RngCore;

/// Lower bound of the hit interval, rejecting self-intersections at the
/// surface a scattered ray starts from.
pub const T_MIN: f32 = 0.001;

/// Zenith color of the background gradient.
pub const SKY_BLUE: Color = Color::new(0.5, 0.7, 1.0);

/// Compute the color seen by a ray.
///
/// Follows the ray through at most `depth` surface interactions. Each
/// scatter multiplies the pending attenuation; absorption or running out of
/// depth yields black, escaping the scene yields the sky gradient. The loop
/// keeps stack usage independent of `depth`.
pub fn ray_color(ray: &Ray, depth: u32, world: &dyn Hittable, rng: &mut dyn RngCore) -> Color {
    let mut ray = *ray;
    let mut attenuation = Color::ONE;

    for _ in 0..depth {
        let Some(rec) = world.hit(&ray, Interval::new(T_MIN, f32::INFINITY)) else {
            return attenuation * sky_gradient(&ray);
        };

        match rec.material.scatter(&ray, &rec, rng) {
            Some(result) => {
                attenuation *= result.attenuation;
                ray = result.scattered;
            }
            // Ray was absorbed
            None => return Color::ZERO,
        }
    }

    // Exceeded max depth: no light
    Color::ZERO
}

/// Compute sky gradient background.
pub fn sky_gradient(ray: &Ray) -> Color {
    let unit_direction = ray.direction().normalize();
    let a = 0.5 * (unit_direction.y + 1.0);
    Color::ONE * (1.0 - a) + SKY_BLUE * a
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HitRecord, HittableList, Lambertian, Material, Metal, ScatterResult, Sphere, Vec3};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Scene that every ray hits, with a fixed material.
    struct Everywhere<M: Material>(M);

    impl<M: Material> Hittable for Everywhere<M> {
        fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
            let t = ray_t.min + 1.0;
            Some(HitRecord::new(ray, t, -ray.direction().normalize(), &self.0))
        }
    }

    /// Scatters straight up with a fixed attenuation.
    struct Upward(Color);

    impl Material for Upward {
        fn scatter(&self, _ray_in: &Ray, rec: &HitRecord, _rng: &mut dyn RngCore) -> Option<ScatterResult> {
            Some(ScatterResult {
                attenuation: self.0,
                scattered: Ray::new(rec.p, Vec3::Y),
            })
        }
    }

    /// Absorbs everything.
    struct Absorber;

    impl Material for Absorber {
        fn scatter(&self, _ray_in: &Ray, _rec: &HitRecord, _rng: &mut dyn RngCore) -> Option<ScatterResult> {
            None
        }
    }

    #[test]
    fn test_zero_depth_is_black() {
        let mut rng = StdRng::seed_from_u64(0);
        let empty = HittableList::new();
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.3, 0.4, -1.0));

        assert_eq!(ray_color(&ray, 0, &empty, &mut rng), Color::ZERO);

        let walls = Everywhere(Upward(Color::ONE));
        assert_eq!(ray_color(&ray, 0, &walls, &mut rng), Color::ZERO);
    }

    #[test]
    fn test_empty_scene_horizon_is_midpoint() {
        let mut rng = StdRng::seed_from_u64(0);
        let empty = HittableList::new();
        let ray = Ray::new(Vec3::ZERO, Vec3::new(1.0, 0.0, -3.0));

        let expected = Color::ONE * 0.5 + SKY_BLUE * 0.5;
        assert_eq!(ray_color(&ray, 10, &empty, &mut rng), expected);
        assert!((expected - Color::new(0.75, 0.85, 1.0)).length() < 1e-6);
    }

    #[test]
    fn test_sky_gradient_extremes() {
        let up = sky_gradient(&Ray::new(Vec3::ZERO, Vec3::new(0.0, 2.0, 0.0)));
        let down = sky_gradient(&Ray::new(Vec3::ZERO, Vec3::new(0.0, -2.0, 0.0)));

        assert!((up - SKY_BLUE).length() < 1e-6);
        assert!((down - Color::ONE).length() < 1e-6);
    }

    #[test]
    fn test_absorption_is_black() {
        let mut rng = StdRng::seed_from_u64(0);
        let world = Everywhere(Absorber);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));

        assert_eq!(ray_color(&ray, 5, &world, &mut rng), Color::ZERO);
    }

    #[test]
    fn test_depth_exhaustion_is_black() {
        let mut rng = StdRng::seed_from_u64(0);
        // Every bounce hits another surface, so the ray never escapes
        let world = Everywhere(Upward(Color::splat(0.9)));
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));

        assert_eq!(ray_color(&ray, 50, &world, &mut rng), Color::ZERO);
    }

    #[test]
    fn test_attenuation_multiplies_background() {
        let mut rng = StdRng::seed_from_u64(0);
        // Mirror floor below the camera, tinted red; reflected ray escapes upward
        let mut world = HittableList::new();
        world.add(Box::new(Sphere::new(
            Vec3::new(0.0, -1000.5, 0.0),
            1000.0,
            Metal::new(Color::new(0.8, 0.4, 0.2), 0.0),
        )));
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, -1.0, 0.0));

        let color = ray_color(&ray, 10, &world, &mut rng);
        let expected = Color::new(0.8, 0.4, 0.2) * SKY_BLUE;
        assert!((color - expected).length() < 1e-4);

        // One bounce allowed: the reflected ray has no depth left
        assert_eq!(ray_color(&ray, 1, &world, &mut rng), Color::ZERO);
    }

    #[test]
    fn test_diffuse_scene_is_bounded() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut world = HittableList::new();
        world.add(Box::new(Sphere::new(
            Vec3::new(0.0, 0.0, -1.0),
            0.5,
            Lambertian::new(Color::splat(0.5)),
        )));
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));

        for _ in 0..100 {
            let c = ray_color(&ray, 20, &world, &mut rng);
            assert!(c.min_element() >= 0.0);
            // A 0.5-albedo hit can return at most half the brightest sky
            assert!(c.max_element() <= 0.5 + 1e-6);
        }
    }
}
