//! Generation-checked handles into the body and joint arenas.
//!
//! A handle is `(index, generation)`. It stays valid only while the slot at
//! `index` still carries the same generation; destroying the slot bumps the
//! generation, so stale handles never alias a later occupant.

/// Common shape of every arena handle.
pub trait ArenaHandle: Copy {
    fn from_parts(index: u32, generation: u32) -> Self;
    fn index(&self) -> u32;
    fn generation(&self) -> u32;
}

macro_rules! arena_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name {
            index: u32,
            generation: u32,
        }

        impl $name {
            /// Pack into a single integer (used by the JS facade).
            pub fn to_bits(self) -> u64 {
                ((self.generation as u64) << 32) | self.index as u64
            }

            pub fn from_bits(bits: u64) -> Self {
                Self {
                    index: bits as u32,
                    generation: (bits >> 32) as u32,
                }
            }
        }

        impl ArenaHandle for $name {
            fn from_parts(index: u32, generation: u32) -> Self {
                Self { index, generation }
            }

            fn index(&self) -> u32 {
                self.index
            }

            fn generation(&self) -> u32 {
                self.generation
            }
        }
    };
}

arena_handle!(
    /// Handle to a rigid body
    BodyHandle
);

arena_handle!(
    /// Handle to a joint
    JointHandle
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_round_trip() {
        let h = BodyHandle::from_parts(42, 7);
        assert_eq!(BodyHandle::from_bits(h.to_bits()), h);
        assert_eq!(h.index(), 42);
        assert_eq!(h.generation(), 7);
    }
}
