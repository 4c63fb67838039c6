use layout_types::{DVec3, Layout, LayoutAssignment};
use rand::Rng;

/// Half-width of the square initial assets are scattered over.
pub const SEED_EXTENT: f64 = 10.0;

/// Scatter assets over the ground plane: x and y uniform in
/// [-SEED_EXTENT, SEED_EXTENT], z = 0, no rotation, unit scale.
pub fn seed_layouts<R, I, S>(names: I, rng: &mut R) -> LayoutAssignment
where
    R: Rng + ?Sized,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    names
        .into_iter()
        .map(|name| {
            let x = rng.gen_range(-SEED_EXTENT..=SEED_EXTENT);
            let y = rng.gen_range(-SEED_EXTENT..=SEED_EXTENT);
            (name.into(), Layout::at(DVec3::new(x, y, 0.0)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use layout_types::DVec3;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::{SEED_EXTENT, seed_layouts};

    #[test]
    fn seeds_lie_on_the_ground_plane() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let layouts = seed_layouts(["sofa", "table", "lamp"], &mut rng);
        assert_eq!(layouts.len(), 3);
        for layout in layouts.values() {
            assert_eq!(layout.location.z, 0.0);
            assert!(layout.location.x.abs() <= SEED_EXTENT);
            assert!(layout.location.y.abs() <= SEED_EXTENT);
            assert_eq!(layout.orientation, DVec3::ZERO);
            assert_eq!(layout.scale, DVec3::ONE);
        }
    }

    #[test]
    fn same_seed_same_scatter() {
        let a = seed_layouts(["a", "b"], &mut ChaCha8Rng::seed_from_u64(3));
        let b = seed_layouts(["a", "b"], &mut ChaCha8Rng::seed_from_u64(3));
        assert_eq!(a, b);
    }
}
