//! Vector helpers shared by the native scorers and the skill-script builtins.

use glam::DVec3;
use layout_types::Axis;

/// Unit vector in the direction of `v`; the zero vector stays zero.
pub fn normalize(v: DVec3) -> DVec3 {
    let norm = v.length();
    if norm > 0.0 { v / norm } else { DVec3::ZERO }
}

/// Forward-facing direction for a (pitch, yaw, roll) orientation in degrees.
/// Roll does not move the forward axis.
pub fn forward_vector(orientation: DVec3) -> DVec3 {
    let pitch = orientation.x.to_radians();
    let yaw = orientation.y.to_radians();
    DVec3::new(
        yaw.cos() * pitch.cos(),
        yaw.sin() * pitch.cos(),
        pitch.sin(),
    )
}

pub fn population_variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n
}

pub fn mean_or(values: &[f64], fallback: f64) -> f64 {
    if values.is_empty() {
        fallback
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// `points[i + 1] - points[i]` for each neighbouring pair.
pub fn consecutive_steps(points: &[DVec3]) -> Vec<DVec3> {
    points.windows(2).map(|w| w[1] - w[0]).collect()
}

pub fn consecutive_dots(vectors: &[DVec3]) -> Vec<f64> {
    vectors.windows(2).map(|w| w[0].dot(w[1])).collect()
}

/// Maps a cosine in [-1, 1] onto [0, 1].
pub fn remap_unit(cos: f64) -> f64 {
    (cos + 1.0) / 2.0
}

/// For every point, reflect it through the plane normal to `axis` that
/// passes through the points' mean coordinate on that axis, and return the
/// distance from the reflection to the nearest original point.
pub fn mirror_residuals(points: &[DVec3], axis: Axis) -> Vec<f64> {
    if points.is_empty() {
        return Vec::new();
    }
    let coords = points.iter().map(|p| axis.component(*p)).collect::<Vec<_>>();
    let center = mean_or(&coords, 0.0);
    points
        .iter()
        .map(|p| {
            let mut mirrored = *p;
            mirrored[axis.index()] = 2.0 * center - mirrored[axis.index()];
            points
                .iter()
                .map(|q| mirrored.distance(*q))
                .fold(f64::INFINITY, f64::min)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use glam::DVec3;
    use layout_types::Axis;

    use super::*;

    #[test]
    fn zero_vector_normalizes_to_zero() {
        assert_eq!(normalize(DVec3::ZERO), DVec3::ZERO);
        let unit = normalize(DVec3::new(3.0, 0.0, 4.0));
        assert!((unit.length() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn forward_vector_follows_yaw() {
        let f0 = forward_vector(DVec3::ZERO);
        assert!((f0 - DVec3::X).length() < 1e-12);
        let f90 = forward_vector(DVec3::new(0.0, 90.0, 0.0));
        assert!((f90 - DVec3::Y).length() < 1e-12);
        let up = forward_vector(DVec3::new(90.0, 0.0, 0.0));
        assert!((up - DVec3::Z).length() < 1e-12);
    }

    #[test]
    fn variance_matches_population_formula() {
        assert_eq!(population_variance(&[]), 0.0);
        assert_eq!(population_variance(&[4.0]), 0.0);
        assert!((population_variance(&[1.0, 3.0]) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn mirrored_pair_has_no_residual() {
        let points = [DVec3::new(-2.0, 1.0, 0.0), DVec3::new(2.0, 1.0, 0.0)];
        let residuals = mirror_residuals(&points, Axis::X);
        assert!(residuals.iter().all(|r| r.abs() < 1e-12));

        let lopsided = [DVec3::new(-2.0, 1.0, 0.0), DVec3::new(2.0, 3.0, 0.0)];
        let residuals = mirror_residuals(&lopsided, Axis::X);
        assert!(residuals.iter().all(|r| (*r - 2.0).abs() < 1e-12));
    }
}
