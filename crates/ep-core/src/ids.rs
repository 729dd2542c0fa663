//! Index newtypes for agents, places and shards.
//!
//! Each wraps the narrowest integer that fits its range: agents are local to a
//! place (`u32`), places are global (`u32`), and shards are few (`u16`).
//! Conversions from `usize` are checked so an oversized population fails at
//! build time instead of wrapping.

use std::fmt;

macro_rules! index_newtype {
    ($(#[$attr:meta])* $name:ident($inner:ty), $label:literal) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name(pub $inner);

        impl $name {
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, " {}"), self.0)
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;

            fn try_from(n: usize) -> Result<Self, Self::Error> {
                <$inner>::try_from(n).map(Self)
            }
        }
    };
}

index_newtype! {
    /// Index of an agent inside one place's `AgentGroup`.  Agent IDs are
    /// local: the same value names different people in different places.
    AgentId(u32), "agent"
}

index_newtype! {
    /// Global index of a geographic place.  Also the second component of the
    /// event ordering key.
    PlaceId(u32), "place"
}

index_newtype! {
    /// Index of a worker shard.
    ShardId(u16), "shard"
}
