//! Iterator implementations for `TieredVec`.

use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;

use crate::node::{Link, Node};
use crate::tier::Tier;

/// An iterator over references to elements of a `TieredVec`, in index order.
pub struct Iter<'a, T> {
    /// Tiers not yet entered
    tiers: std::slice::Iter<'a, Tier<T>>,
    /// Next node within the current tier
    node: Link<T>,
    /// Elements left to yield
    remaining: usize,
    _marker: PhantomData<&'a T>,
}

impl<'a, T> Iter<'a, T> {
    pub(crate) fn new(tiers: &'a [Tier<T>], len: usize) -> Self {
        Self {
            tiers: tiers.iter(),
            node: None,
            remaining: len,
            _marker: PhantomData,
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(node) = self.node {
                // SAFETY: the container is borrowed for 'a, so the node stays live
                unsafe {
                    self.node = Node::next(node);
                    self.remaining -= 1;
                    return Some(Node::value(node));
                }
            }
            self.node = self.tiers.next()?.head();
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            tiers: self.tiers.clone(),
            node: self.node,
            remaining: self.remaining,
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter")
            .field("remaining", &self.remaining)
            .finish()
    }
}

// Safety: Iter only yields shared references
unsafe impl<T: Sync> Sync for Iter<'_, T> {}
unsafe impl<T: Sync> Send for Iter<'_, T> {}

/// An iterator over mutable references to elements of a `TieredVec`.
pub struct IterMut<'a, T> {
    tiers: std::slice::Iter<'a, Tier<T>>,
    node: Link<T>,
    remaining: usize,
    _marker: PhantomData<&'a mut T>,
}

impl<'a, T> IterMut<'a, T> {
    /// The caller must hold the container mutably for `'a`.
    pub(crate) fn new(tiers: &'a [Tier<T>], len: usize) -> Self {
        Self {
            tiers: tiers.iter(),
            node: None,
            remaining: len,
            _marker: PhantomData,
        }
    }
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(node) = self.node {
                // SAFETY: the container is exclusively borrowed for 'a and each
                // node is yielded once
                unsafe {
                    self.node = Node::next(node);
                    self.remaining -= 1;
                    return Some(Node::value_mut(node));
                }
            }
            self.node = self.tiers.next()?.head();
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {}

impl<T> FusedIterator for IterMut<'_, T> {}

impl<T> fmt::Debug for IterMut<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IterMut")
            .field("remaining", &self.remaining)
            .finish()
    }
}

// Safety: IterMut yields exclusive references
unsafe impl<T: Send> Send for IterMut<'_, T> {}
unsafe impl<T: Sync> Sync for IterMut<'_, T> {}

/// An iterator over the tiers of a `TieredVec`.
///
/// Each item walks one tier's elements in order. Every tier but the last
/// is full.
pub struct Tiers<'a, T> {
    tiers: std::slice::Iter<'a, Tier<T>>,
}

impl<'a, T> Tiers<'a, T> {
    pub(crate) fn new(tiers: &'a [Tier<T>]) -> Self {
        Self {
            tiers: tiers.iter(),
        }
    }
}

impl<'a, T> Iterator for Tiers<'a, T> {
    type Item = TierIter<'a, T>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.tiers.next().map(TierIter::new)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.tiers.size_hint()
    }
}

impl<T> DoubleEndedIterator for Tiers<'_, T> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.tiers.next_back().map(TierIter::new)
    }
}

impl<T> ExactSizeIterator for Tiers<'_, T> {}

impl<T> FusedIterator for Tiers<'_, T> {}

impl<T> Clone for Tiers<'_, T> {
    fn clone(&self) -> Self {
        Self {
            tiers: self.tiers.clone(),
        }
    }
}

impl<T> fmt::Debug for Tiers<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tiers")
            .field("remaining", &self.tiers.len())
            .finish()
    }
}

/// An iterator over the elements of one tier.
pub struct TierIter<'a, T> {
    node: Link<T>,
    remaining: usize,
    _marker: PhantomData<&'a T>,
}

impl<'a, T> TierIter<'a, T> {
    fn new(tier: &'a Tier<T>) -> Self {
        Self {
            node: tier.head(),
            remaining: tier.len(),
            _marker: PhantomData,
        }
    }
}

impl<'a, T> Iterator for TierIter<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let node = self.node?;
        // SAFETY: the container is borrowed for 'a, so the node stays live
        unsafe {
            self.node = Node::next(node);
            self.remaining -= 1;
            Some(Node::value(node))
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for TierIter<'_, T> {}

impl<T> FusedIterator for TierIter<'_, T> {}

impl<T> Clone for TierIter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            node: self.node,
            remaining: self.remaining,
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for TierIter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TierIter")
            .field("remaining", &self.remaining)
            .finish()
    }
}

// Safety: TierIter only yields shared references
unsafe impl<T: Sync> Sync for TierIter<'_, T> {}
unsafe impl<T: Sync> Send for TierIter<'_, T> {}
