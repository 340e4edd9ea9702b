/// A closed range of real values, used for ray parameters and channel clamping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: f32,
    pub max: f32,
}

impl Interval {
    /// Create a new interval given min and max values.
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Returns true if x is strictly within the interval (min, max) (exclusive).
    pub fn surrounds(&self, x: f32) -> bool {
        self.min < x && x < self.max
    }

    /// Clamps x to be within the interval [min, max].
    ///
    /// NaN is passed through unchanged.
    pub fn clamp(&self, x: f32) -> f32 {
        x.clamp(self.min, self.max)
    }

    /// Returns a copy of this interval with `max` replaced.
    ///
    /// Used to shrink the search range as closer hits are found.
    pub fn with_max(&self, max: f32) -> Interval {
        Interval::new(self.min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_surrounds() {
        let interval = Interval::new(0.001, f32::INFINITY);

        // Exclusive bounds - the self-intersection epsilon is rejected
        assert!(!interval.surrounds(0.001));
        assert!(!interval.surrounds(0.0));
        assert!(interval.surrounds(0.0011));
        assert!(interval.surrounds(1e30));
        assert!(!interval.surrounds(f32::INFINITY));
    }

    #[test]
    fn test_interval_clamp() {
        let intensity = Interval::new(0.0, 0.999);

        assert_eq!(intensity.clamp(-5.0), 0.0);
        assert_eq!(intensity.clamp(0.5), 0.5);
        assert_eq!(intensity.clamp(1.0), 0.999);
        assert!(intensity.clamp(f32::NAN).is_nan());
    }

    #[test]
    fn test_interval_with_max() {
        let interval = Interval::new(0.001, f32::INFINITY).with_max(4.0);
        assert_eq!(interval, Interval::new(0.001, 4.0));
    }
}
