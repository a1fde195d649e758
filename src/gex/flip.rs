//! Stage 3: Zero-Gamma Crossing
//!
//! Finds the spot level where the aggregate exposure curve changes sign.

fn sign(x: f64) -> i8 {
    if x > 0.0 {
        1
    } else if x < 0.0 {
        -1
    } else {
        0
    }
}

/// Linear interpolation of the zero between `(neg_level, neg_gamma)` and
/// `(pos_level, pos_gamma)`, the samples before and after the sign change
fn interpolate_zero(neg_level: f64, neg_gamma: f64, pos_level: f64, pos_gamma: f64) -> f64 {
    pos_level - (pos_level - neg_level) * pos_gamma / (pos_gamma - neg_gamma)
}

/// Every interpolated sign change, in ascending level order.
///
/// `levels` and `gamma` are paired element-wise; extra elements in the
/// longer slice are ignored.
pub fn zero_gamma_crossings(levels: &[f64], gamma: &[f64]) -> Vec<f64> {
    let n = levels.len().min(gamma.len());
    (0..n.saturating_sub(1))
        .filter(|&i| sign(gamma[i]) != sign(gamma[i + 1]))
        .map(|i| interpolate_zero(levels[i], gamma[i], levels[i + 1], gamma[i + 1]))
        .collect()
}

/// Gamma flip: the first crossing, or `None` when the sampled curve is
/// one-signed throughout.
///
/// Curves with several sign changes report only the lowest one.
pub fn zero_gamma_level(levels: &[f64], gamma: &[f64]) -> Option<f64> {
    let n = levels.len().min(gamma.len());
    (0..n.saturating_sub(1))
        .find(|&i| sign(gamma[i]) != sign(gamma[i + 1]))
        .map(|i| interpolate_zero(levels[i], gamma[i], levels[i + 1], gamma[i + 1]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolated_flip() {
        let levels = [100.0, 110.0, 120.0, 130.0];
        let gamma = [-3.0, -1.0, 2.0, 5.0];
        let flip = zero_gamma_level(&levels, &gamma).unwrap();
        assert!((flip - 113.333_333).abs() < 1e-4);
        assert_eq!(format!("{:.2}", flip), "113.33");
    }

    #[test]
    fn test_no_crossing() {
        assert_eq!(zero_gamma_level(&[1.0, 2.0, 3.0], &[1.0, 2.0, 0.5]), None);
        assert_eq!(zero_gamma_level(&[1.0, 2.0], &[-1.0, -2.0]), None);
        assert_eq!(zero_gamma_level(&[], &[]), None);
        assert_eq!(zero_gamma_level(&[1.0], &[-1.0]), None);
    }

    #[test]
    fn test_positive_to_negative() {
        // Same formula applies when the curve falls through zero
        let flip = zero_gamma_level(&[10.0, 20.0], &[4.0, -1.0]).unwrap();
        assert!((flip - 18.0).abs() < 1e-12);
    }

    #[test]
    fn test_first_crossing_only() {
        let levels = [1.0, 2.0, 3.0, 4.0, 5.0];
        let gamma = [-1.0, 1.0, 1.0, -1.0, -1.0];
        assert_eq!(zero_gamma_level(&levels, &gamma), Some(1.5));
        assert_eq!(zero_gamma_crossings(&levels, &gamma), vec![1.5, 3.5]);
    }

    #[test]
    fn test_exact_zero_sample() {
        // A sample sitting on zero is its own sign class
        let flip = zero_gamma_level(&[100.0, 110.0], &[0.0, 2.0]).unwrap();
        assert!((flip - 100.0).abs() < 1e-12);
    }
}
