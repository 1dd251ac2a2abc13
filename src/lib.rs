//! A random-access vector built from geometrically growing linked tiers.
//!
//! Elements live in a series of singly-linked sublists ("tiers"). Tier `i`
//! holds at most `base_capacity * 2^i` elements and every tier except the
//! last is always full, so the tier holding any index follows from a closed
//! form instead of a search. Nodes are only relinked, never moved, so the
//! address of an element is stable for as long as it stays in the vector.
//!
//! # Example
//!
//! ```
//! use tiered_vec::TieredVec;
//!
//! let mut vec = TieredVec::new(2).unwrap();
//! for i in 1..=7 {
//!     vec.push(i);
//! }
//!
//! // Tiers of capacity 2, 4 and 8
//! assert_eq!(vec.to_string(), "[1, 2\n3, 4, 5, 6\n7]");
//! assert_eq!(vec.get(4), Ok(&5));
//!
//! // Removing shifts one element down from every later tier; the
//! // emptied last tier is dropped
//! assert_eq!(vec.remove(0), Ok(1));
//! assert_eq!(vec.to_string(), "[2, 3\n4, 5, 6, 7]");
//! assert_eq!(vec.tier_count(), 2);
//! ```

mod error;
mod into_iter;
mod iter;
mod node;
mod snapshot;
mod sort;
mod tier;
mod vector2d;

use allocator_api2::alloc::{Allocator, Global};
pub use error::TieredVecError;
pub use into_iter::IntoIter;
pub use iter::{Iter, IterMut, TierIter, Tiers};
pub use snapshot::Snapshot;
pub use vector2d::{ParseVector2DError, Vector2D};

use node::{Link, Node};
use std::alloc::Layout;
use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;
use std::num::NonZeroUsize;
use std::ops::{Index, IndexMut};
use std::ptr::NonNull;
use tier::{location, tier_capacity, tier_start, Tier};

/// Base capacity used by [`TieredVec::default`].
pub const DEFAULT_BASE_CAPACITY: usize = 2;

/// A vector of singly-linked tiers with geometrically growing capacities.
///
/// # Memory Layout
///
/// Tier `i` holds up to `base_capacity * 2^i` elements, so tiers `0..=n`
/// hold `base_capacity * (2^(n+1) - 1)` together. Every tier but the last
/// is full; the last holds at least one element unless the vector is empty,
/// in which case there is exactly one empty tier.
///
/// Each element sits in its own heap node allocated through `A`. Lookups
/// walk at most one tier; inserts and removes shift one node across each
/// later tier boundary to keep the tiers full.
pub struct TieredVec<T, A: Allocator = Global> {
    /// One sublist per active tier; never empty
    tiers: Vec<Tier<T>>,
    /// Capacity of tier 0
    base_capacity: usize,
    /// Number of elements across all tiers
    len: usize,
    alloc: A,
    /// Marker for drop check
    _marker: PhantomData<T>,
}

impl<T> TieredVec<T> {
    /// Creates an empty vector whose first tier holds `base_capacity`
    /// elements.
    ///
    /// Fails with [`TieredVecError::InvalidBaseCapacity`] if `base_capacity`
    /// is zero.
    ///
    /// # Example
    ///
    /// ```
    /// use tiered_vec::{TieredVec, TieredVecError};
    ///
    /// let vec: TieredVec<f64> = TieredVec::new(4).unwrap();
    /// assert!(vec.is_empty());
    /// assert_eq!(vec.base_capacity(), 4);
    ///
    /// assert_eq!(
    ///     TieredVec::<f64>::new(0).unwrap_err(),
    ///     TieredVecError::InvalidBaseCapacity
    /// );
    /// ```
    #[inline]
    pub fn new(base_capacity: usize) -> Result<Self, TieredVecError> {
        Self::new_in(base_capacity, Global)
    }

    /// Creates an empty vector with a base capacity that cannot be zero.
    #[inline]
    pub fn with_base_capacity(base_capacity: NonZeroUsize) -> Self {
        Self::from_parts(base_capacity.get(), Global)
    }
}

// Core implementation
impl<T, A: Allocator> TieredVec<T, A> {
    /// Creates an empty vector that allocates its nodes in `alloc`.
    pub fn new_in(base_capacity: usize, alloc: A) -> Result<Self, TieredVecError> {
        if base_capacity == 0 {
            return Err(TieredVecError::InvalidBaseCapacity);
        }
        Ok(Self::from_parts(base_capacity, alloc))
    }

    fn from_parts(base_capacity: usize, alloc: A) -> Self {
        Self {
            tiers: vec![Tier::new()],
            base_capacity,
            len: 0,
            alloc,
            _marker: PhantomData,
        }
    }

    /// Returns the number of elements in the vector.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the vector contains no elements.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the capacity of the first tier.
    #[inline]
    pub const fn base_capacity(&self) -> usize {
        self.base_capacity
    }

    /// Returns the number of active tiers (at least one).
    #[inline]
    pub fn tier_count(&self) -> usize {
        self.tiers.len()
    }

    /// Returns the number of elements the active tiers can hold before
    /// another tier is needed.
    #[inline]
    pub fn capacity(&self) -> usize {
        tier_start(self.base_capacity, self.tiers.len())
    }

    /// Returns a reference to the underlying allocator.
    #[inline]
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Resolves a valid index to `(tier, offset)`.
    #[inline]
    fn locate(&self, index: usize) -> Result<(usize, usize), TieredVecError> {
        if index >= self.len {
            return Err(TieredVecError::out_of_range(index, self.len));
        }
        Ok(location(self.base_capacity, index))
    }

    fn node_at(&self, index: usize) -> Result<NonNull<Node<T>>, TieredVecError> {
        let (tier, offset) = self.locate(index)?;
        self.tiers[tier]
            .node_at(offset)
            .ok_or_else(|| TieredVecError::out_of_range(index, self.len))
    }

    #[inline]
    fn last_tier(&self) -> usize {
        self.tiers.len() - 1
    }

    /// Returns a reference to the element at `index`.
    ///
    /// Walks at most one tier.
    ///
    /// # Example
    ///
    /// ```
    /// use tiered_vec::{TieredVec, TieredVecError};
    ///
    /// let vec: TieredVec<i32> = (10..15).collect();
    /// assert_eq!(vec.get(3), Ok(&13));
    /// assert_eq!(vec.get(5), Err(TieredVecError::OutOfRange { index: 5, len: 5 }));
    /// ```
    #[inline]
    pub fn get(&self, index: usize) -> Result<&T, TieredVecError> {
        let node = self.node_at(index)?;
        // SAFETY: the node belongs to `self`, which is borrowed for the result
        Ok(unsafe { Node::value(node) })
    }

    /// Returns a mutable reference to the element at `index`.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Result<&mut T, TieredVecError> {
        let node = self.node_at(index)?;
        // SAFETY: `self` is exclusively borrowed for the result
        Ok(unsafe { Node::value_mut(node) })
    }

    /// Returns a reference to the first element, or `None` if empty.
    #[inline]
    pub fn first(&self) -> Option<&T> {
        // SAFETY: the head belongs to `self`
        self.tiers[0].head().map(|node| unsafe { Node::value(node) })
    }

    /// Returns a reference to the last element, or `None` if empty.
    #[inline]
    pub fn last(&self) -> Option<&T> {
        // SAFETY: the tail belongs to `self`
        self.tiers[self.last_tier()]
            .tail()
            .map(|node| unsafe { Node::value(node) })
    }

    /// Returns `true` if the vector contains an element equal to `x`.
    pub fn contains(&self, x: &T) -> bool
    where
        T: PartialEq,
    {
        self.iter().any(|item| item == x)
    }

    /// Appends an element to the back of the vector.
    ///
    /// # Panics
    ///
    /// Panics if allocation fails. Use [`try_push`](Self::try_push) to
    /// handle that case.
    ///
    /// # Example
    ///
    /// ```
    /// use tiered_vec::TieredVec;
    /// let mut vec = TieredVec::new(1).unwrap();
    /// vec.push(1);
    /// vec.push(2);
    /// assert_eq!(vec.len(), 2);
    /// assert_eq!(vec.tier_count(), 2);
    /// ```
    #[inline]
    pub fn push(&mut self, value: T) {
        if let Err(err) = self.try_push(value) {
            panic!("{err}");
        }
    }

    /// Appends an element, reporting allocation failure instead of
    /// panicking.
    ///
    /// When every tier is full a new tier is opened for the element. On
    /// error the vector is unchanged and `value` is dropped.
    pub fn try_push(&mut self, value: T) -> Result<(), TieredVecError> {
        let node = Node::alloc_in(value, &self.alloc).inspect_err(log_alloc_failure)?;
        if self.len == self.capacity() {
            if let Err(err) = self.grow_tiers() {
                log_alloc_failure(&err);
                // SAFETY: `node` was never linked
                drop(unsafe { Node::free_in(node, &self.alloc) });
                return Err(err);
            }
        }

        let last = self.last_tier();
        // SAFETY: `node` is detached and the last tier has room
        unsafe { self.tiers[last].push_back(node) };
        self.len += 1;
        Ok(())
    }

    /// Removes the last element and returns it, or `None` if empty.
    ///
    /// Walks the last tier to find the new tail.
    pub fn pop(&mut self) -> Option<T> {
        let index = self.len.checked_sub(1)?;
        self.remove(index).ok()
    }

    /// Inserts an element at position `index`, shifting all elements after
    /// it to the right.
    ///
    /// Inserting at `len` is the same as [`try_push`](Self::try_push).
    /// Otherwise the element is linked into its tier and the overflow of
    /// each tier moves to the head of the next one. If every tier was
    /// already full a new tier is opened first to take the final overflow.
    ///
    /// # Example
    ///
    /// ```
    /// use tiered_vec::TieredVec;
    ///
    /// let mut vec: TieredVec<i32> = (1..=6).collect();
    /// assert_eq!(vec.tier_count(), 2);
    /// vec.insert(0, 0).unwrap();
    /// assert_eq!(vec.to_string(), "[0, 1\n2, 3, 4, 5\n6]");
    /// assert!(vec.insert(9, 9).is_err());
    /// ```
    pub fn insert(&mut self, index: usize, element: T) -> Result<(), TieredVecError> {
        if index > self.len {
            return Err(TieredVecError::out_of_range(index, self.len));
        }
        if index == self.len {
            return self.try_push(element);
        }

        let node = Node::alloc_in(element, &self.alloc).inspect_err(log_alloc_failure)?;
        if self.len == self.capacity() {
            if let Err(err) = self.grow_tiers() {
                log_alloc_failure(&err);
                // SAFETY: `node` was never linked
                drop(unsafe { Node::free_in(node, &self.alloc) });
                return Err(err);
            }
        }

        let (tier, offset) = location(self.base_capacity, index);
        // SAFETY: `node` is detached and `offset` is within the tier
        unsafe { self.tiers[tier].insert_at(offset, node) };
        self.shift_right(tier);
        self.len += 1;
        Ok(())
    }

    /// Removes and returns the element at position `index`, shifting all
    /// elements after it to the left.
    ///
    /// The head of each later tier moves to the tail of the tier before it.
    /// If that empties the last tier, the tier is dropped.
    pub fn remove(&mut self, index: usize) -> Result<T, TieredVecError> {
        let (tier, offset) = self.locate(index)?;
        let node = self.tiers[tier]
            .remove_at(offset)
            .ok_or_else(|| TieredVecError::out_of_range(index, self.len))?;
        self.shift_left(tier);
        self.len -= 1;
        self.shrink_tiers();

        // SAFETY: `node` was detached and is reachable from no tier
        Ok(unsafe { Node::free_in(node, &self.alloc) })
    }

    /// Clears the vector, removing all elements.
    ///
    /// The vector keeps its base capacity and returns to a single empty tier.
    pub fn clear(&mut self) {
        let chain = self.take_all();
        self.free_chain(chain.into_chain());
    }

    /// Moves the tail of each tier from `from` up into the head of the next.
    fn shift_right(&mut self, from: usize) {
        for tier in from..self.last_tier() {
            let (lower, upper) = self.tiers.split_at_mut(tier + 1);
            if let Some(node) = lower[tier].pop_back() {
                // SAFETY: `node` was just detached
                unsafe { upper[0].push_front(node) };
            }
        }
    }

    /// Moves the head of each tier after `from` down into the tail of the
    /// one before it.
    fn shift_left(&mut self, from: usize) {
        for tier in from..self.last_tier() {
            let (lower, upper) = self.tiers.split_at_mut(tier + 1);
            if let Some(node) = upper[0].pop_front() {
                // SAFETY: `node` was just detached
                unsafe { lower[tier].push_back(node) };
            }
        }
    }

    /// Opens a new empty tier.
    fn grow_tiers(&mut self) -> Result<(), TieredVecError> {
        let wanted = self.tiers.len() + 1;
        if self.tiers.try_reserve(1).is_err() {
            return Err(match Layout::array::<Tier<T>>(wanted) {
                Ok(layout) => TieredVecError::alloc_error(layout),
                Err(_) => TieredVecError::CapacityOverflow,
            });
        }
        self.tiers.push(Tier::new());
        log::trace!("opened tier {} (len {})", wanted - 1, self.len);
        Ok(())
    }

    /// Drops the last tier if it is empty and not the only one.
    fn shrink_tiers(&mut self) {
        if self.tiers.len() > 1 && self.tiers[self.last_tier()].is_empty() {
            self.tiers.pop();
            log::trace!("closed tier {} (len {})", self.tiers.len(), self.len);
        }
    }

    /// Detaches every node into one chain and leaves a valid empty vector.
    ///
    /// The tier table keeps its allocation.
    fn take_all(&mut self) -> Tier<T> {
        let mut chain = Tier::new();
        for tier in &mut self.tiers {
            chain.append(tier);
        }
        self.tiers.truncate(1);
        self.len = 0;
        chain
    }

    /// Frees every node of a detached chain, dropping the elements.
    fn free_chain(&self, mut chain: Link<T>) {
        while let Some(node) = chain {
            // SAFETY: the chain is reachable from no tier; each node is
            // freed exactly once
            unsafe {
                chain = Node::next(node);
                drop(Node::free_in(node, &self.alloc));
            }
        }
    }

    /// Returns an iterator over references to the elements.
    #[inline]
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(&self.tiers, self.len)
    }

    /// Returns an iterator over mutable references to the elements.
    #[inline]
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut::new(&self.tiers, self.len)
    }

    /// Returns an iterator over the tiers, each yielding its elements.
    ///
    /// # Example
    ///
    /// ```
    /// use tiered_vec::TieredVec;
    ///
    /// let vec: TieredVec<i32> = (0..9).collect();
    /// let lens: Vec<usize> = vec.tiers().map(|tier| tier.len()).collect();
    /// assert_eq!(lens, vec![2, 4, 3]);
    /// ```
    #[inline]
    pub fn tiers(&self) -> Tiers<'_, T> {
        Tiers::new(&self.tiers)
    }
}

// Sorting
impl<T, A: Allocator> TieredVec<T, A> {
    /// Sorts the vector in ascending order.
    ///
    /// This sort is stable and runs in O(n log n). Nodes are relinked in
    /// place; nothing is allocated.
    ///
    /// Floats and [`Vector2D`] have no `Ord`; sort them with
    /// `sort_by(f64::total_cmp)` or `sort_by(Vector2D::cmp_magnitude)`.
    pub fn sort(&mut self)
    where
        T: Ord,
    {
        self.sort_by(T::cmp);
    }

    /// Sorts the vector with a comparator function.
    ///
    /// The tiers are flattened into one chain, merge sorted, and split back
    /// into the same number of tiers.
    ///
    /// If `compare` panics the vector is left empty and the elements in
    /// flight are leaked.
    ///
    /// # Example
    ///
    /// ```
    /// use tiered_vec::TieredVec;
    ///
    /// let mut vec: TieredVec<f64> = [2.5, -1.0, 0.5].into_iter().collect();
    /// vec.sort_by(f64::total_cmp);
    /// assert_eq!(vec.to_string(), "[-1, 0.5\n2.5]");
    /// ```
    pub fn sort_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        if self.len < 2 {
            return;
        }
        log::debug!(
            "sorting {} elements across {} tiers",
            self.len,
            self.tiers.len()
        );

        let len = self.len;
        let tier_count = self.tiers.len();
        let chain = self.take_all();
        // SAFETY: `chain` holds every node and is reachable from no tier
        let sorted = unsafe { sort::merge_sort(chain.into_chain(), &mut compare) };

        self.tiers.resize_with(tier_count, Tier::new);
        self.retier(sorted, len);
        self.len = len;
    }

    /// Sorts the vector with a key extraction function.
    pub fn sort_by_key<K, F>(&mut self, mut f: F)
    where
        F: FnMut(&T) -> K,
        K: Ord,
    {
        self.sort_by(|a, b| f(a).cmp(&f(b)));
    }

    /// Returns `true` if the elements are in ascending order.
    pub fn is_sorted(&self) -> bool
    where
        T: PartialOrd,
    {
        self.iter().zip(self.iter().skip(1)).all(|(a, b)| a <= b)
    }

    /// Splits a detached chain of `len` nodes into the (empty) tiers, filling
    /// each to capacity in order.
    fn retier(&mut self, mut chain: Link<T>, len: usize) {
        let base_capacity = self.base_capacity;
        let mut remaining = len;
        for (n, tier) in self.tiers.iter_mut().enumerate() {
            let count = tier_capacity(base_capacity, n).min(remaining);
            // SAFETY: `tier` is empty and `chain` is detached
            chain = unsafe { tier.take_from_chain(chain, count) };
            remaining -= count;
        }
        debug_assert!(chain.is_none());
        debug_assert_eq!(remaining, 0);
    }
}

fn log_alloc_failure(err: &TieredVecError) {
    log::warn!("tiered vec allocation failed: {err}");
}

// Trait implementations
impl<T, A: Allocator> Drop for TieredVec<T, A> {
    fn drop(&mut self) {
        let chain = self.take_all();
        self.free_chain(chain.into_chain());
    }
}

impl<T: Clone, A: Allocator + Clone> Clone for TieredVec<T, A> {
    fn clone(&self) -> Self {
        let mut vec = Self::from_parts(self.base_capacity, self.alloc.clone());
        vec.extend(self.iter().cloned());
        vec
    }
}

impl<T: PartialEq, A: Allocator> PartialEq for TieredVec<T, A> {
    /// Compares elements only; two vectors with different base capacities
    /// are equal if they hold the same sequence.
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T: Eq, A: Allocator> Eq for TieredVec<T, A> {}

impl<T: std::hash::Hash, A: Allocator> std::hash::Hash for TieredVec<T, A> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.len.hash(state);
        for item in self.iter() {
            item.hash(state);
        }
    }
}

impl<T: fmt::Debug, A: Allocator> fmt::Debug for TieredVec<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Renders `[` + tiers separated by newlines + `]`, with the elements of a
/// tier separated by `", "`.
impl<T: fmt::Display, A: Allocator> fmt::Display for TieredVec<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (n, tier) in self.tiers().enumerate() {
            if n > 0 {
                f.write_str("\n")?;
            }
            for (i, item) in tier.enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{item}")?;
            }
        }
        f.write_str("]")
    }
}

impl<T> Default for TieredVec<T> {
    fn default() -> Self {
        Self::from_parts(DEFAULT_BASE_CAPACITY, Global)
    }
}

impl<T, A: Allocator> Index<usize> for TieredVec<T, A> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        match self.get(index) {
            Ok(item) => item,
            Err(err) => panic!("{err}"),
        }
    }
}

impl<T, A: Allocator> IndexMut<usize> for TieredVec<T, A> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        match self.get_mut(index) {
            Ok(item) => item,
            Err(err) => panic!("{err}"),
        }
    }
}

impl<T, A: Allocator> Extend<T> for TieredVec<T, A> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.push(item);
        }
    }
}

impl<'a, T: Clone + 'a, A: Allocator> Extend<&'a T> for TieredVec<T, A> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        for item in iter {
            self.push(item.clone());
        }
    }
}

impl<T> FromIterator<T> for TieredVec<T> {
    /// Collects into a vector with [`DEFAULT_BASE_CAPACITY`].
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut vec = Self::default();
        vec.extend(iter);
        vec
    }
}

impl<T, A: Allocator> IntoIterator for TieredVec<T, A> {
    type Item = T;
    type IntoIter = IntoIter<T, A>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self)
    }
}

impl<'a, T, A: Allocator> IntoIterator for &'a TieredVec<T, A> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, A: Allocator> IntoIterator for &'a mut TieredVec<T, A> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

// Safety implementations
unsafe impl<T: Send, A: Allocator + Send> Send for TieredVec<T, A> {}
unsafe impl<T: Sync, A: Allocator + Sync> Sync for TieredVec<T, A> {}
