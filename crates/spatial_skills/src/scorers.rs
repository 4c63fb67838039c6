//! Native implementations of the built-in relation scorers.
//!
//! Scores are expected to land in [0, 1] but nothing clamps them: degenerate
//! arguments such as `max_dist < min_dist` are passed straight through.

use layout_types::{Axis, Layout};

use crate::geometry::{
    consecutive_dots, consecutive_steps, forward_vector, mean_or, mirror_residuals, normalize,
    population_variance, remap_unit,
};

pub const DEFAULT_MIN_DIST: f64 = 1.0;
pub const DEFAULT_MAX_DIST: f64 = 5.0;

pub fn proximity(a: &Layout, b: &Layout, min_dist: f64, max_dist: f64) -> f64 {
    let distance = a.location.distance(b.location);
    if distance <= min_dist {
        return 1.0;
    }
    if distance >= max_dist {
        return 0.0;
    }
    1.0 - (distance - min_dist) / (max_dist - min_dist)
}

pub fn alignment(assets: &[&Layout], axis: &str) -> f64 {
    let Some(axis) = Axis::parse(axis) else {
        return 0.0;
    };
    if assets.is_empty() {
        return 0.0;
    }
    let coords = assets
        .iter()
        .map(|a| axis.component(a.location))
        .collect::<Vec<_>>();
    1.0 / (1.0 + population_variance(&coords))
}

pub fn parallelism(assets: &[&Layout]) -> f64 {
    if assets.len() < 2 {
        return 1.0;
    }

    let locations = assets.iter().map(|a| a.location).collect::<Vec<_>>();
    let headings = consecutive_steps(&locations)
        .into_iter()
        .map(normalize)
        .collect::<Vec<_>>();
    let position = consecutive_dots(&headings)
        .into_iter()
        .map(remap_unit)
        .collect::<Vec<_>>();

    let forwards = assets
        .iter()
        .map(|a| forward_vector(a.orientation))
        .collect::<Vec<_>>();
    let facing = consecutive_dots(&forwards)
        .into_iter()
        .map(remap_unit)
        .collect::<Vec<_>>();

    (mean_or(&position, 1.0) + mean_or(&facing, 1.0)) / 2.0
}

pub fn perpendicularity(a: &Layout, b: &Layout) -> f64 {
    let fa = normalize(forward_vector(a.orientation));
    let fb = normalize(forward_vector(b.orientation));
    1.0 - fa.dot(fb).abs()
}

pub fn symmetry(assets: &[&Layout], axis: &str) -> f64 {
    let Some(axis) = Axis::parse(axis) else {
        return 0.0;
    };
    if assets.is_empty() {
        return 0.0;
    }
    let locations = assets.iter().map(|a| a.location).collect::<Vec<_>>();
    let residuals = mirror_residuals(&locations, axis);
    1.0 / (1.0 + mean_or(&residuals, 0.0))
}
