use crate::domain::handle::BodyHandle;
use crate::spatial::BodyStore;
use crate::systems::collision::{collide_within, Manifold};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Run the exact test on every candidate pair, keeping contacts up to
/// `margin` apart.
///
/// Output order follows `pairs` in both builds, so the solver sees the same
/// sequence whether or not the pairs were tested in parallel.
pub(super) fn narrow_phase(
    bodies: &BodyStore,
    pairs: &[(BodyHandle, BodyHandle)],
    margin: f32,
) -> Vec<Manifold> {
    #[cfg(feature = "parallel")]
    {
        pairs.par_iter().filter_map(|&(a, b)| collide_pair(bodies, a, b, margin)).collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        pairs.iter().filter_map(|&(a, b)| collide_pair(bodies, a, b, margin)).collect()
    }
}

#[inline]
fn collide_pair(bodies: &BodyStore, a: BodyHandle, b: BodyHandle, margin: f32) -> Option<Manifold> {
    let body_a = bodies.get(a)?;
    let body_b = bodies.get(b)?;
    collide_within(a, body_a, b, body_b, margin)
}
