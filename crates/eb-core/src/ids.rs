//! Strongly typed identifier wrappers.
//!
//! Graph IDs (`NodeId`, `EdgeId`) are 0-based positions into the CSR arrays.
//! `StationId` follows the operator's numbering instead: it is 1-based and
//! dense, so it carries a separate [`StationId::slot`] helper for indexing
//! into per-station `Vec`s.

use std::fmt;

/// Generate a typed graph ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID", equal to `u32::MAX`.
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl Default for $name {
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Index of a road-network node.
    pub struct NodeId(u32);
}

typed_id! {
    /// Index of a directed road-network edge.
    pub struct EdgeId(u32);
}

// ── StationId ─────────────────────────────────────────────────────────────────

/// Operator-assigned station number, `1..=N`.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StationId(pub u32);

impl StationId {
    /// Build the id stored at 0-based position `slot` of a dense table.
    #[inline(always)]
    pub fn from_slot(slot: usize) -> StationId {
        StationId(slot as u32 + 1)
    }

    /// 0-based position of this station in dense per-station arrays.
    ///
    /// # Panics
    /// Panics in debug mode for `StationId(0)`, which is never valid.
    #[inline(always)]
    pub fn slot(self) -> usize {
        debug_assert!(self.0 > 0, "station ids are 1-based");
        (self.0 - 1) as usize
    }

    /// `true` if the id lies in `1..=count`.
    #[inline]
    pub fn is_within(self, count: usize) -> bool {
        self.0 >= 1 && (self.0 as usize) <= count
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
