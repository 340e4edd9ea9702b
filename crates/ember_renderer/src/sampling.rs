//! Random sampling helpers shared by the camera and materials.
//!
//! Everything takes `&mut dyn RngCore` so callers decide where randomness
//! comes from: each image row owns a seeded generator, tests use `StdRng`.

use ember_math::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// Uniform f32 in [0, 1).
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen::<f32>()
}

/// Sample a random point in the unit disk (z = 0) by rejection.
pub fn random_in_unit_disk(rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let p = Vec3::new(gen_f32(rng) * 2.0 - 1.0, gen_f32(rng) * 2.0 - 1.0, 0.0);
        if p.length_squared() < 1.0 {
            return p;
        }
    }
}

/// Generate a random unit vector on the unit sphere.
pub fn random_unit_vector(rng: &mut dyn RngCore) -> Vec3 {
    // Rejection sampling in the unit ball, then project onto the sphere
    loop {
        let v = Vec3::new(
            gen_f32(rng) * 2.0 - 1.0,
            gen_f32(rng) * 2.0 - 1.0,
            gen_f32(rng) * 2.0 - 1.0,
        );
        let len_sq = v.length_squared();
        if len_sq > 1e-6 && len_sq <= 1.0 {
            return v / len_sq.sqrt();
        }
    }
}

/// Generator for one image row of a render.
///
/// Rows never share a generator, so the samples drawn for a row depend only
/// on `(seed, row)` and not on which worker renders it.
pub fn row_rng(seed: u64, row: u32) -> StdRng {
    StdRng::seed_from_u64(seed ^ (row as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_disk_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let p = random_in_unit_disk(&mut rng);
            assert!(p.length_squared() < 1.0);
            assert_eq!(p.z, 0.0);
        }
    }

    #[test]
    fn test_unit_vector_length() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let v = random_unit_vector(&mut rng);
            assert!((v.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_row_rng_reproducible() {
        let a: Vec<f32> = {
            let mut rng = row_rng(42, 17);
            (0..8).map(|_| gen_f32(&mut rng)).collect()
        };
        let b: Vec<f32> = {
            let mut rng = row_rng(42, 17);
            (0..8).map(|_| gen_f32(&mut rng)).collect()
        };
        let other_row: Vec<f32> = {
            let mut rng = row_rng(42, 18);
            (0..8).map(|_| gen_f32(&mut rng)).collect()
        };

        assert_eq!(a, b);
        assert_ne!(a, other_row);
        assert!(a.iter().all(|x| (0.0..1.0).contains(x)));
    }
}
