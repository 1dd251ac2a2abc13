//! Owning iterator for `TieredVec`.

use allocator_api2::alloc::{Allocator, Global};

use crate::node::Node;
use crate::TieredVec;

/// An owning iterator over elements of a `TieredVec`.
///
/// This struct is created by the `into_iter` method on `TieredVec`
/// (provided by the [`IntoIterator`] trait). Each node is freed as its
/// element is yielded; whatever is left is dropped with the iterator.
pub struct IntoIter<T, A: Allocator = Global> {
    pub(crate) vec: TieredVec<T, A>,
    /// First tier that may still hold elements
    pub(crate) tier: usize,
}

impl<T, A: Allocator> IntoIter<T, A> {
    /// Creates a new owning iterator from a `TieredVec`.
    #[inline]
    pub fn new(vec: TieredVec<T, A>) -> Self {
        Self { vec, tier: 0 }
    }
}

impl<T, A: Allocator> Iterator for IntoIter<T, A> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let tier = self.vec.tiers.get_mut(self.tier)?;
            if let Some(node) = tier.pop_front() {
                self.vec.len -= 1;
                // SAFETY: `node` was just detached from its tier
                return Some(unsafe { Node::free_in(node, &self.vec.alloc) });
            }
            self.tier += 1;
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.vec.len, Some(self.vec.len))
    }

    #[inline]
    fn count(self) -> usize {
        self.vec.len
    }
}

impl<T, A: Allocator> DoubleEndedIterator for IntoIter<T, A> {
    /// Walks the last non-empty tier to detach its tail.
    fn next_back(&mut self) -> Option<Self::Item> {
        let tier = self
            .vec
            .tiers
            .get_mut(self.tier..)?
            .iter_mut()
            .rev()
            .find(|tier| !tier.is_empty())?;
        let node = tier.pop_back()?;
        self.vec.len -= 1;
        // SAFETY: `node` was just detached from its tier
        Some(unsafe { Node::free_in(node, &self.vec.alloc) })
    }
}

impl<T, A: Allocator> ExactSizeIterator for IntoIter<T, A> {}

impl<T, A: Allocator> std::iter::FusedIterator for IntoIter<T, A> {}

impl<T, A: Allocator> std::fmt::Debug for IntoIter<T, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntoIter")
            .field("remaining", &self.vec.len)
            .finish()
    }
}
