//! Sphere primitive for ray tracing.

use crate::{
    hittable::{HitRecord, Hittable},
    Material,
};
use ember_math::{Interval, Ray, Vec3};

/// A sphere primitive.
pub struct Sphere<M: Material> {
    center: Vec3,
    radius: f32,
    material: M,
}

impl<M: Material> Sphere<M> {
    /// Create a new sphere. Negative radii are clamped to zero.
    pub fn new(center: Vec3, radius: f32, material: M) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
            material,
        }
    }

    /// Center of the sphere.
    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Radius of the sphere.
    pub fn radius(&self) -> f32 {
        self.radius
    }
}

impl<M: Material> Hittable for Sphere<M> {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let oc = self.center - ray.origin();
        let a = ray.direction().length_squared();
        let h = ray.direction().dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();

        // Find the nearest root in the acceptable range
        let mut root = (h - sqrtd) / a;
        if !ray_t.surrounds(root) {
            root = (h + sqrtd) / a;
            if !ray_t.surrounds(root) {
                return None;
            }
        }

        let outward_normal = (ray.at(root) - self.center) / self.radius;
        Some(HitRecord::new(ray, root, outward_normal, &self.material))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Lambertian;

    fn unit_sphere() -> Sphere<Lambertian> {
        Sphere::new(
            Vec3::new(0.0, 0.0, -1.0),
            0.5,
            Lambertian::new(Vec3::new(0.5, 0.5, 0.5)),
        )
    }

    #[test]
    fn test_sphere_hit() {
        let sphere = unit_sphere();
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let interval = Interval::new(0.001, f32::INFINITY);

        let rec = sphere.hit(&ray, interval).expect("ray should hit");
        assert!((rec.t - 0.5).abs() < 0.001); // Should hit at t=0.5
        assert!(rec.front_face);
        assert!((rec.p - Vec3::new(0.0, 0.0, -0.5)).length() < 0.001);
    }

    #[test]
    fn test_sphere_miss() {
        let sphere = unit_sphere();

        // Ray pointing away from sphere
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0));
        let interval = Interval::new(0.001, f32::INFINITY);

        assert!(sphere.hit(&ray, interval).is_none());
    }

    #[test]
    fn test_sphere_hit_from_inside() {
        let sphere = unit_sphere();
        let ray = Ray::new(Vec3::new(0.0, 0.0, -1.0), Vec3::new(0.0, 0.0, -1.0));

        let rec = sphere
            .hit(&ray, Interval::new(0.001, f32::INFINITY))
            .expect("ray leaves the sphere");
        assert!((rec.t - 0.5).abs() < 0.001);
        assert!(!rec.front_face);
        assert!((rec.normal - Vec3::Z).length() < 0.001);
    }

    #[test]
    fn test_sphere_respects_interval() {
        let sphere = unit_sphere();
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));

        // Both roots (0.5 and 1.5) lie beyond max
        assert!(sphere.hit(&ray, Interval::new(0.001, 0.4)).is_none());
    }
}
