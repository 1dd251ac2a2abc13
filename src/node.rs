//! Singly-linked cells for `TieredVec`.
//!
//! Nodes are allocated one at a time through the container's allocator and
//! are only ever relinked, never moved or copied, until they are freed.

use std::alloc::Layout;
use std::ptr::NonNull;

use allocator_api2::alloc::Allocator;

use crate::TieredVecError;

/// Link to the next node in a sublist, or `None` at the tail.
pub(crate) type Link<T> = Option<NonNull<Node<T>>>;

/// One element and the link to its successor.
pub(crate) struct Node<T> {
    pub(crate) value: T,
    pub(crate) next: Link<T>,
}

impl<T> Node<T> {
    const LAYOUT: Layout = Layout::new::<Node<T>>();

    /// Allocates a detached node holding `value`.
    ///
    /// On failure `value` is dropped and nothing is allocated.
    pub(crate) fn alloc_in<A: Allocator>(
        value: T,
        alloc: &A,
    ) -> Result<NonNull<Self>, TieredVecError> {
        let ptr = alloc
            .allocate(Self::LAYOUT)
            .map_err(|_| TieredVecError::alloc_error(Self::LAYOUT))?
            .cast::<Self>();

        // SAFETY: `ptr` was just allocated with the layout of `Node<T>`
        unsafe { ptr.as_ptr().write(Node { value, next: None }) };
        Ok(ptr)
    }

    /// Frees `node` and moves its value out.
    ///
    /// # Safety
    ///
    /// `node` must have been allocated by `alloc_in` with an equivalent
    /// allocator, must be unreachable from every tier, and must not be used
    /// again.
    pub(crate) unsafe fn free_in<A: Allocator>(node: NonNull<Self>, alloc: &A) -> T {
        let Node { value, .. } = node.as_ptr().read();
        alloc.deallocate(node.cast(), Self::LAYOUT);
        value
    }

    /// # Safety
    ///
    /// `node` must point to a live node.
    #[inline]
    pub(crate) unsafe fn next(node: NonNull<Self>) -> Link<T> {
        (*node.as_ptr()).next
    }

    /// # Safety
    ///
    /// `node` must point to a live node that no reference currently borrows.
    #[inline]
    pub(crate) unsafe fn set_next(node: NonNull<Self>, next: Link<T>) {
        (*node.as_ptr()).next = next;
    }

    /// # Safety
    ///
    /// `node` must stay live and unmutated for `'a`.
    #[inline]
    pub(crate) unsafe fn value<'a>(node: NonNull<Self>) -> &'a T {
        &(*node.as_ptr()).value
    }

    /// # Safety
    ///
    /// `node` must stay live for `'a` and no other reference to its value may
    /// exist during `'a`.
    #[inline]
    pub(crate) unsafe fn value_mut<'a>(node: NonNull<Self>) -> &'a mut T {
        &mut (*node.as_ptr()).value
    }
}
