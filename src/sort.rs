//! Merge sort over singly-linked node chains.
//!
//! `TieredVec` flattens its tiers into one chain, sorts the chain here and
//! re-splits it into tiers. Sorting only relinks nodes: nothing is allocated,
//! freed or moved, and the recursion is O(log n) deep because each level
//! halves the chain.

use std::cmp::Ordering;
use std::ptr::NonNull;

use crate::node::{Link, Node};

/// Sorts the chain starting at `head` and returns the new head.
///
/// Stable: equal elements keep their relative order.
///
/// # Safety
///
/// `head` must start a nil-terminated chain of live nodes that no tier and
/// no reference currently uses.
pub(crate) unsafe fn merge_sort<T, F>(head: Link<T>, compare: &mut F) -> Link<T>
where
    F: FnMut(&T, &T) -> Ordering,
{
    let head = head?;
    if Node::next(head).is_none() {
        return Some(head);
    }

    let middle = middle(head);
    let right = Node::next(middle);
    Node::set_next(middle, None);

    let left = merge_sort(Some(head), compare);
    let right = merge_sort(right, compare);
    merge(left, right, compare)
}

/// Finds the last node of the left half with slow/fast pointers.
///
/// For a chain of `n >= 2` nodes the left half gets `ceil(n / 2)` of them.
unsafe fn middle<T>(head: NonNull<Node<T>>) -> NonNull<Node<T>> {
    let mut slow = head;
    let mut fast = head;
    while let Some(next) = Node::next(fast) {
        let Some(after) = Node::next(next) else {
            break;
        };
        match Node::next(slow) {
            Some(node) => slow = node,
            None => break,
        }
        fast = after;
    }
    slow
}

/// Merges two sorted chains. A node from `right` goes first only when it is
/// strictly less than the head of `left`.
unsafe fn merge<T, F>(mut left: Link<T>, mut right: Link<T>, compare: &mut F) -> Link<T>
where
    F: FnMut(&T, &T) -> Ordering,
{
    let mut head: Link<T> = None;
    let mut tail: Link<T> = None;

    loop {
        let node = match (left, right) {
            (Some(l), Some(r)) => {
                if compare(Node::value(r), Node::value(l)) == Ordering::Less {
                    right = Node::next(r);
                    r
                } else {
                    left = Node::next(l);
                    l
                }
            }
            (rest, None) | (None, rest) => {
                link(&mut head, tail, rest);
                return head;
            }
        };
        link(&mut head, tail, Some(node));
        tail = Some(node);
    }
}

#[inline]
unsafe fn link<T>(head: &mut Link<T>, tail: Link<T>, node: Link<T>) {
    match tail {
        Some(tail) => Node::set_next(tail, node),
        None => *head = node,
    }
}
