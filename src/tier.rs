//! Tier bookkeeping and the geometric capacity arithmetic.
//!
//! A tier is one singly-linked sublist. Tier `n` holds at most
//! `base * 2^n` elements, so tiers `0..=n` together hold
//! `base * (2^(n+1) - 1)`. Every index lookup in the crate goes through
//! [`location`]; nothing else derives tier offsets.

use std::marker::PhantomData;
use std::ptr::NonNull;

use crate::node::{Link, Node};

/// Capacity of tier `tier`: `base * 2^tier`, saturating.
#[inline]
pub(crate) const fn tier_capacity(base: usize, tier: usize) -> usize {
    if tier >= usize::BITS as usize {
        return usize::MAX;
    }
    base.saturating_mul(1 << tier)
}

/// First logical index stored in tier `tier`: `base * (2^tier - 1)`.
///
/// Equivalently, the combined capacity of tiers `0..tier`.
#[inline]
pub(crate) const fn tier_start(base: usize, tier: usize) -> usize {
    if tier >= usize::BITS as usize {
        return usize::MAX;
    }
    base.saturating_mul((1 << tier) - 1)
}

/// Smallest tier `n` with `base * (2^(n+1) - 1) > index`.
#[inline]
pub(crate) const fn tier_of(base: usize, index: usize) -> usize {
    (index / base).saturating_add(1).ilog2() as usize
}

/// Calculates which tier and offset a logical index falls into.
/// Returns (tier_index, offset_within_tier).
#[inline]
pub(crate) const fn location(base: usize, index: usize) -> (usize, usize) {
    let tier = tier_of(base, index);
    (tier, index - tier_start(base, tier))
}

/// One sublist: head, cached tail, and length.
///
/// A `Tier` only tracks links. Freeing nodes is the owning container's job,
/// so dropping a `Tier` never touches its nodes.
pub(crate) struct Tier<T> {
    head: Link<T>,
    tail: Link<T>,
    len: usize,
    _marker: PhantomData<T>,
}

impl<T> Tier<T> {
    #[inline]
    pub(crate) const fn new() -> Self {
        Self {
            head: None,
            tail: None,
            len: 0,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub(crate) const fn head(&self) -> Link<T> {
        self.head
    }

    #[inline]
    pub(crate) const fn tail(&self) -> Link<T> {
        self.tail
    }

    /// Returns the node `offset` links past the head.
    pub(crate) fn node_at(&self, offset: usize) -> Link<T> {
        if offset >= self.len {
            return None;
        }
        if offset == self.len - 1 {
            return self.tail;
        }
        let mut current = self.head;
        for _ in 0..offset {
            // SAFETY: every node reachable from `head` belongs to this tier
            current = current.and_then(|node| unsafe { Node::next(node) });
        }
        current
    }

    /// Links `node` in as the new head.
    ///
    /// # Safety
    ///
    /// `node` must be live and reachable from no tier.
    pub(crate) unsafe fn push_front(&mut self, node: NonNull<Node<T>>) {
        Node::set_next(node, self.head);
        if self.tail.is_none() {
            self.tail = Some(node);
        }
        self.head = Some(node);
        self.len += 1;
    }

    /// Links `node` in as the new tail.
    ///
    /// # Safety
    ///
    /// `node` must be live and reachable from no tier.
    pub(crate) unsafe fn push_back(&mut self, node: NonNull<Node<T>>) {
        Node::set_next(node, None);
        match self.tail {
            Some(tail) => Node::set_next(tail, Some(node)),
            None => self.head = Some(node),
        }
        self.tail = Some(node);
        self.len += 1;
    }

    /// Links `node` in so that it ends up `offset` links past the head.
    ///
    /// # Safety
    ///
    /// `node` must be live and reachable from no tier, and `offset <= len`.
    pub(crate) unsafe fn insert_at(&mut self, offset: usize, node: NonNull<Node<T>>) {
        debug_assert!(offset <= self.len);
        if offset == 0 {
            self.push_front(node);
            return;
        }
        if offset == self.len {
            self.push_back(node);
            return;
        }
        let Some(prev) = self.node_at(offset - 1) else {
            unreachable!("tier of length {} has no node at {}", self.len, offset - 1);
        };
        Node::set_next(node, Node::next(prev));
        Node::set_next(prev, Some(node));
        self.len += 1;
    }

    /// Detaches the head.
    pub(crate) fn pop_front(&mut self) -> Link<T> {
        let node = self.head?;
        // SAFETY: `node` is this tier's head
        unsafe {
            self.head = Node::next(node);
            Node::set_next(node, None);
        }
        if self.head.is_none() {
            self.tail = None;
        }
        self.len -= 1;
        Some(node)
    }

    /// Detaches the tail. Walks to the tail's predecessor.
    pub(crate) fn pop_back(&mut self) -> Link<T> {
        if self.len < 2 {
            return self.pop_front();
        }
        let prev = self.node_at(self.len - 2)?;
        let node = self.tail;
        // SAFETY: `prev` belongs to this tier and precedes the tail
        unsafe { Node::set_next(prev, None) };
        self.tail = Some(prev);
        self.len -= 1;
        node
    }

    /// Detaches the node `offset` links past the head.
    pub(crate) fn remove_at(&mut self, offset: usize) -> Link<T> {
        if offset == 0 {
            return self.pop_front();
        }
        let prev = self.node_at(offset - 1)?;
        // SAFETY: `prev` and its successor belong to this tier
        let node = unsafe {
            let node = Node::next(prev)?;
            Node::set_next(prev, Node::next(node));
            Node::set_next(node, None);
            node
        };
        if self.tail == Some(node) {
            self.tail = Some(prev);
        }
        self.len -= 1;
        Some(node)
    }

    /// Moves all of `other`'s nodes onto the end of `self`, leaving `other`
    /// empty.
    pub(crate) fn append(&mut self, other: &mut Self) {
        let Some(other_head) = other.head else {
            return;
        };
        match self.tail {
            // SAFETY: `tail` belongs to this tier; `other_head` leaves `other`
            Some(tail) => unsafe { Node::set_next(tail, Some(other_head)) },
            None => self.head = Some(other_head),
        }
        self.tail = other.tail;
        self.len += other.len;
        *other = Self::new();
    }

    /// Fills this empty tier with the first `count` nodes of `chain` and
    /// returns the rest of the chain.
    ///
    /// # Safety
    ///
    /// `self` must be empty and `chain` must be a nil-terminated chain of live
    /// nodes reachable from no tier.
    pub(crate) unsafe fn take_from_chain(&mut self, chain: Link<T>, count: usize) -> Link<T> {
        debug_assert!(self.is_empty());
        if count == 0 {
            return chain;
        }
        let head = chain?;
        let mut tail = head;
        let mut taken = 1;
        while taken < count {
            match Node::next(tail) {
                Some(next) => {
                    tail = next;
                    taken += 1;
                }
                None => break,
            }
        }
        let rest = Node::next(tail);
        Node::set_next(tail, None);

        self.head = Some(head);
        self.tail = Some(tail);
        self.len = taken;
        rest
    }

    /// Gives up the whole sublist as a bare chain.
    #[inline]
    pub(crate) fn into_chain(self) -> Link<T> {
        self.head
    }
}

// Safety: a Tier owns the nodes it links, and T determines thread safety
unsafe impl<T: Send> Send for Tier<T> {}
unsafe impl<T: Sync> Sync for Tier<T> {}
