//! Body Store - arena of rigid bodies addressed by `BodyHandle`.

use crate::domain::handle::BodyHandle;
use crate::rigid_body::{Body, BodyDescriptor};

use super::arena::Arena;

#[derive(Clone, Debug, Default)]
pub struct BodyStore {
    bodies: Arena<BodyHandle, Body>,
}

impl BodyStore {
    pub fn new() -> Self {
        Self { bodies: Arena::new() }
    }

    pub fn create(&mut self, desc: &BodyDescriptor) -> BodyHandle {
        self.bodies.insert(Body::new(desc))
    }

    /// Destroy a body. Stale handles are ignored.
    pub fn destroy(&mut self, handle: BodyHandle) -> bool {
        self.bodies.remove(handle).is_some()
    }

    pub fn is_alive(&self, handle: BodyHandle) -> bool {
        self.bodies.contains(handle)
    }

    pub fn get(&self, handle: BodyHandle) -> Option<&Body> {
        self.bodies.get(handle)
    }

    pub fn get_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        self.bodies.get_mut(handle)
    }

    pub fn pair_mut(&mut self, a: BodyHandle, b: BodyHandle) -> Option<(&mut Body, &mut Body)> {
        self.bodies.get2_mut(a, b)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn clear(&mut self) {
        self.bodies.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (BodyHandle, &Body)> + '_ {
        self.bodies.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (BodyHandle, &mut Body)> + '_ {
        self.bodies.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::collider::Collider;
    use crate::rigid_body::Vec2;

    #[test]
    fn destroy_invalidates_and_reuse_never_aliases() {
        let mut store = BodyStore::new();
        let desc = BodyDescriptor::dynamic(Collider::circle(0.5), Vec2::zero());
        let a = store.create(&desc);
        assert!(store.is_alive(a));

        assert!(store.destroy(a));
        assert!(!store.is_alive(a));
        assert!(store.get(a).is_none());
        assert!(!store.destroy(a));

        let b = store.create(&desc);
        assert!(store.is_alive(b));
        assert!(!store.is_alive(a));
        assert_ne!(a, b);
    }
}
