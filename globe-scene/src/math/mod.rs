use std::f64::consts::{PI, TAU};

mod cartesian3;
pub use cartesian3::*;

pub const EPSILON1: f64 = 0.1;
pub const EPSILON2: f64 = 0.01;
pub const EPSILON3: f64 = 0.001;
pub const EPSILON4: f64 = 0.0001;
pub const EPSILON5: f64 = 0.00001;
pub const EPSILON6: f64 = 0.000001;
pub const EPSILON7: f64 = 0.0000001;
pub const EPSILON8: f64 = 0.00000001;
pub const EPSILON9: f64 = 0.000000001;
pub const EPSILON10: f64 = 0.0000000001;
pub const EPSILON11: f64 = 0.00000000001;
pub const EPSILON12: f64 = 0.000000000001;
pub const EPSILON13: f64 = 0.0000000000001;
pub const EPSILON14: f64 = 0.00000000000001;
pub const EPSILON15: f64 = 0.000000000000001;
pub const EPSILON20: f64 = 0.00000000000000000001;

pub fn equals_epsilon(
    left: f64,
    right: f64,
    relative_epsilon: Option<f64>,
    absolute_epsilon: Option<f64>,
) -> bool {
    let relative_epsilon = relative_epsilon.unwrap_or(0.0);
    let absolute_epsilon = absolute_epsilon.unwrap_or(relative_epsilon);
    let diff = (left - right).abs();
    return diff <= absolute_epsilon || diff <= relative_epsilon * left.abs().max(right.abs());
}

pub fn negative_pi_to_pi(angle: f64) -> f64 {
    if angle >= -PI && angle <= PI {
        return angle;
    }
    return zero_to_two_pi(angle + PI) - PI;
}

pub fn zero_to_two_pi(angle: f64) -> f64 {
    if angle >= 0. && angle <= TAU {
        return angle;
    }
    let mode = angle.rem_euclid(TAU);
    if mode.abs() < EPSILON14 && angle.abs() > EPSILON14 {
        return TAU;
    }
    return mode;
}

/// Wraps `angle` into `[center - PI, center + PI)`.
pub fn normalize_around(angle: f64, center: f64) -> f64 {
    let start = center - PI;
    if angle >= start && angle < center + PI {
        return angle;
    }
    return (angle - start).rem_euclid(TAU) + start;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equals_epsilon_uses_absolute_then_relative() {
        assert!(equals_epsilon(1.0, 1.0 + EPSILON8, Some(EPSILON7), None));
        assert!(!equals_epsilon(1.0, 1.1, Some(EPSILON7), None));
        assert!(equals_epsilon(1.0e10, 1.0e10 + 1.0, Some(EPSILON7), Some(0.0)));
    }
    #[test]
    fn negative_pi_to_pi_wraps() {
        assert!(equals_epsilon(negative_pi_to_pi(PI + 0.5), -PI + 0.5, Some(EPSILON14), None));
        assert!(equals_epsilon(negative_pi_to_pi(-PI - 0.5), PI - 0.5, Some(EPSILON14), None));
        assert_eq!(negative_pi_to_pi(1.0), 1.0);
    }
    #[test]
    fn zero_to_two_pi_keeps_full_turn() {
        assert_eq!(zero_to_two_pi(TAU), TAU);
        assert!(equals_epsilon(zero_to_two_pi(-1.0), TAU - 1.0, Some(EPSILON14), None));
        assert_eq!(zero_to_two_pi(2.0 * TAU), TAU);
    }
    #[test]
    fn normalize_around_center() {
        let a = normalize_around(3.0 * PI / 2.0, 0.0);
        assert!(equals_epsilon(a, -PI / 2.0, Some(EPSILON14), None));
        let b = normalize_around(-PI / 2.0, PI);
        assert!(equals_epsilon(b, 3.0 * PI / 2.0, Some(EPSILON14), None));
        assert_eq!(normalize_around(0.25, 0.0), 0.25);
        // angles already in range come back bit for bit
        assert_eq!(normalize_around(0.05, 0.0), 0.05);
        assert_eq!(normalize_around(-0.02, 0.0), -0.02);
        assert_eq!(normalize_around(-0.02, 0.3), -0.02);
    }
}
