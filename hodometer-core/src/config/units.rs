//! Distance units

/// Metres in a statute mile
pub const METERS_PER_MILE: f32 = 1_609.344;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DistanceUnit {
    #[default]
    Miles,
    Kilometers,
}

impl DistanceUnit {
    pub fn from_metric(metric: bool) -> Self {
        if metric {
            DistanceUnit::Kilometers
        } else {
            DistanceUnit::Miles
        }
    }

    pub fn is_metric(self) -> bool {
        self == DistanceUnit::Kilometers
    }

    /// Distance covered by one rotation of a wheel with this circumference
    pub fn per_rotation(self, circumference_cm: f32) -> f32 {
        let meters = circumference_cm / 100.0;
        match self {
            DistanceUnit::Miles => meters / METERS_PER_MILE,
            DistanceUnit::Kilometers => meters / 1_000.0,
        }
    }

    pub fn distance(self, rotations: u32, circumference_cm: f32) -> f32 {
        rotations as f32 * self.per_rotation(circumference_cm)
    }

    /// Rotations needed to cover `distance`
    ///
    /// Negative or NaN distances give 0; oversized ones saturate.
    pub fn rotations_for(self, distance: f32, circumference_cm: f32) -> u32 {
        let per_rotation = self.per_rotation(circumference_cm);
        if per_rotation <= 0.0 {
            return 0;
        }
        (distance / per_rotation) as u32
    }

    /// Convert rotations per hour into mph or km/h
    pub fn speed(self, rotations_per_hour: f32, circumference_cm: f32) -> f32 {
        rotations_per_hour * self.per_rotation(circumference_cm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHEEL_CM: f32 = 34.56;

    #[test]
    fn test_mile_is_about_4657_rotations() {
        let rotations = DistanceUnit::Miles.rotations_for(1.0, WHEEL_CM);
        assert!((4_655..=4_658).contains(&rotations));
    }

    #[test]
    fn test_kilometre_rotations() {
        let rotations = DistanceUnit::Kilometers.rotations_for(3.456, WHEEL_CM);
        assert!((9_999..=10_000).contains(&rotations));
    }

    #[test]
    fn test_negative_distance_is_zero() {
        assert_eq!(DistanceUnit::Miles.rotations_for(-5.0, WHEEL_CM), 0);
        assert_eq!(DistanceUnit::Miles.rotations_for(f32::NAN, WHEEL_CM), 0);
    }

    #[test]
    fn test_speed() {
        // 10 000 rotations an hour is 3.456 km/h
        let kmh = DistanceUnit::Kilometers.speed(10_000.0, WHEEL_CM);
        assert!((kmh - 3.456).abs() < 1e-3);
    }

    #[test]
    fn test_from_metric() {
        assert_eq!(DistanceUnit::from_metric(true), DistanceUnit::Kilometers);
        assert!(!DistanceUnit::from_metric(false).is_metric());
    }
}
