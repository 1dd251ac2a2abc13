//! Raw state capture and restore.
//!
//! A snapshot records the base capacity, the length and the elements in
//! logical order. Restoring replays `push` for each element, so the tier
//! layout is rebuilt by the normal growth path instead of being stored.

use allocator_api2::alloc::{Allocator, Global};
use serde::de::Error as _;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{TieredVec, TieredVecError};

/// The raw state of a `TieredVec`.
///
/// `TieredVec` serializes with this same shape, so a serialized container
/// and a serialized snapshot are interchangeable.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Snapshot<T> {
    /// Capacity of the first tier.
    pub base_capacity: usize,
    /// Number of elements; must equal `elements.len()`.
    pub len: usize,
    /// Elements in logical order.
    pub elements: Vec<T>,
}

impl<T, A: Allocator> TieredVec<T, A> {
    /// Captures the raw state, cloning every element.
    ///
    /// # Example
    ///
    /// ```
    /// use tiered_vec::TieredVec;
    ///
    /// let mut vec = TieredVec::new(3).unwrap();
    /// vec.extend([1, 2, 3, 4]);
    /// let snapshot = vec.snapshot();
    /// assert_eq!(snapshot.base_capacity, 3);
    /// assert_eq!(snapshot.elements, vec![1, 2, 3, 4]);
    ///
    /// let restored = TieredVec::from_snapshot(snapshot).unwrap();
    /// assert_eq!(restored, vec);
    /// ```
    pub fn snapshot(&self) -> Snapshot<T>
    where
        T: Clone,
    {
        Snapshot {
            base_capacity: self.base_capacity,
            len: self.len,
            elements: self.iter().cloned().collect(),
        }
    }

    /// Captures the raw state, moving every element out.
    pub fn into_snapshot(self) -> Snapshot<T> {
        let base_capacity = self.base_capacity;
        let len = self.len;
        Snapshot {
            base_capacity,
            len,
            elements: self.into_iter().collect(),
        }
    }

    /// Rebuilds a container in `alloc` from a snapshot.
    ///
    /// Fails with `InvalidBaseCapacity` for a zero base capacity and with
    /// `SnapshotLengthMismatch` when `len` disagrees with the element list.
    pub fn from_snapshot_in(snapshot: Snapshot<T>, alloc: A) -> Result<Self, TieredVecError> {
        let Snapshot {
            base_capacity,
            len,
            elements,
        } = snapshot;

        let mut vec = Self::new_in(base_capacity, alloc)?;
        if len != elements.len() {
            return Err(TieredVecError::SnapshotLengthMismatch {
                declared: len,
                actual: elements.len(),
            });
        }
        for element in elements {
            vec.try_push(element)?;
        }

        log::debug!(
            "restored {} elements into {} tiers (base capacity {})",
            vec.len,
            vec.tiers.len(),
            vec.base_capacity
        );
        Ok(vec)
    }
}

impl<T> TieredVec<T> {
    /// Rebuilds a container from a snapshot.
    pub fn from_snapshot(snapshot: Snapshot<T>) -> Result<Self, TieredVecError> {
        Self::from_snapshot_in(snapshot, Global)
    }
}

impl<T> TryFrom<Snapshot<T>> for TieredVec<T> {
    type Error = TieredVecError;

    fn try_from(snapshot: Snapshot<T>) -> Result<Self, Self::Error> {
        Self::from_snapshot(snapshot)
    }
}

/// Serializes the elements of a container as a sequence without cloning.
struct Elements<'a, T, A: Allocator>(&'a TieredVec<T, A>);

impl<T: Serialize, A: Allocator> Serialize for Elements<'_, T, A> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter())
    }
}

impl<T: Serialize, A: Allocator> Serialize for TieredVec<T, A> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("TieredVec", 3)?;
        state.serialize_field("base_capacity", &self.base_capacity)?;
        state.serialize_field("len", &self.len)?;
        state.serialize_field("elements", &Elements(self))?;
        state.end()
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for TieredVec<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let snapshot = Snapshot::<T>::deserialize(deserializer)?;
        Self::from_snapshot(snapshot).map_err(D::Error::custom)
    }
}
