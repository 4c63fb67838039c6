use std::collections::BTreeMap;

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Pose of a single scene asset: location, orientation in degrees
/// (pitch, yaw, roll) and per-axis scale.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub location: DVec3,
    pub orientation: DVec3,
    pub scale: DVec3,
}

impl Layout {
    pub fn new(location: DVec3, orientation: DVec3, scale: DVec3) -> Self {
        Self {
            location,
            orientation,
            scale,
        }
    }

    pub fn at(location: DVec3) -> Self {
        Self {
            location,
            ..Self::default()
        }
    }

    pub fn with_orientation(mut self, orientation: DVec3) -> Self {
        self.orientation = orientation;
        self
    }

    /// Independent duplicate. `Layout` is plain data, so this is a bit copy;
    /// kept as a named operation for call sites that branch candidates.
    pub fn copy(&self) -> Self {
        *self
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            location: DVec3::ZERO,
            orientation: DVec3::ZERO,
            scale: DVec3::ONE,
        }
    }
}

/// Asset name to pose. Ordered so that seeded searches visit assets in a
/// stable order.
pub type LayoutAssignment = BTreeMap<String, Layout>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "x" => Some(Self::X),
            "y" => Some(Self::Y),
            "z" => Some(Self::Z),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }

    pub fn component(self, v: DVec3) -> f64 {
        v[self.index()]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::DVec3;

    use super::{Axis, Layout};

    #[test]
    fn copy_does_not_alias() {
        let original = Layout::at(DVec3::new(1.0, 2.0, 3.0));
        let mut branch = original.copy();
        branch.location.x += 5.0;
        branch.orientation.y = 90.0;
        assert_eq!(original.location, DVec3::new(1.0, 2.0, 3.0));
        assert_eq!(original.orientation, DVec3::ZERO);
    }

    #[test]
    fn default_pose_has_unit_scale() {
        let layout = Layout::default();
        assert_eq!(layout.scale, DVec3::ONE);
        assert_eq!(layout.location, DVec3::ZERO);
    }

    #[test]
    fn axis_parse_accepts_case_and_whitespace() {
        assert_eq!(Axis::parse("x"), Some(Axis::X));
        assert_eq!(Axis::parse(" Y "), Some(Axis::Y));
        assert_eq!(Axis::parse("w"), None);
        assert_eq!(Axis::parse(""), None);
        assert_eq!(Axis::Z.component(DVec3::new(1.0, 2.0, 3.0)), 3.0);
    }
}
