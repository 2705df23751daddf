//! This crate provides a queue of strings with owned nodes, implemented as a
//! cyclic doubly-linked list around a ghost (sentinel) node.
//!
//! The [`Queue`] allows inserting and removing strings at both ends in
//! constant time. On top of that it offers in-place algorithms that relink
//! nodes instead of copying strings: reversal, pairwise swapping, reversal in
//! groups of *k*, stable merge sort, removal of the middle element or of
//! duplicated runs, monotonic filtering, and the merge of many sorted queues.
//!
//! Here is a quick example showing how the queue works.
//!
//! ```
//! use cyclic_queue::Queue;
//! use std::iter::FromIterator;
//!
//! let mut queue = Queue::new();
//! queue.insert_tail("b").unwrap();
//! queue.insert_head("a").unwrap();
//! queue.insert_tail("c").unwrap();
//! assert_eq!(queue.size(), 3);
//!
//! let mut buf = [0_u8; 8];
//! let element = queue.remove_head(Some(&mut buf)).unwrap();
//! assert_eq!(element.value(), "a");
//! assert_eq!(&buf[..2], b"a\0");
//!
//! queue.reverse();
//! assert_eq!(queue, Queue::from_iter(["c", "b"]));
//! ```
//!
//! # Memory Layout
//!
//! The memory layout of the queue is like the following graph:
//! ```text
//!          ┌─────────────────────────────────────────────────────────────────────┐
//!          ↓                                                     (Ghost) Node N  │
//!    ╔═══════════╗           ╔═══════════╗                        ┌───────────┐  │
//!    ║   next    ║ ────────→ ║   next    ║ ────────→ ┄┄ ────────→ │   next    │ ─┘
//!    ╟───────────╢           ╟───────────╢     Node 2, 3, ...     ├───────────┤
//! ┌─ ║   prev    ║ ←──────── ║   prev    ║ ←──────── ┄┄ ←──────── │   prev    │
//! │  ╟───────────╢           ╟───────────╢                        ├───────────┤
//! │  ║  String   ║           ║  String   ║                        ┊No payload ┊
//! │  ╚═══════════╝           ╚═══════════╝                        └╌╌╌╌╌╌╌╌╌╌╌┘
//! │      Node 0                  Node 1                               ↑   ↑
//! └───────────────────────────────────────────────────────────────────┘   │
//! ╔═══════════╗                                                           │
//! ║   ghost   ║ ──────────────────────────────────────────────────────────┘
//! ╚═══════════╝
//!     Queue
//! ```
//! The `Queue` contains a single pointer `ghost` to the ghost node. There is
//! no length field, so [`Queue::size`] walks the ring.
//!
//! Each element node is allocated on heap, which contains:
//! - the `next` pointer that points to the next element (or the ghost node if it
//!   is the last element in the queue);
//! - the `prev` pointer that points to the previous element (or the ghost node if
//!   it is the first element in the queue);
//! - the element, a heap copy of the string that was inserted.
//!
//! Note that the ghost node has *NO* payload.
//!
//! Initially, there is a ghost node in an empty queue, of which the `next` and
//! `prev` pointer point to itself. As elements are inserted, `ghost.next` points
//! to the head and `ghost.prev` points to the tail of the queue.
//!
//! # Ownership
//!
//! Inserting copies the string. Removing unlinks the node and hands its string
//! over as an [`Element`], which the caller owns and releases by dropping it.
//! Every other algorithm either moves existing nodes around or releases them.
//!
//! # Sorting and Merging
//!
//! [`Queue::sort`] is a stable merge sort over byte-wise string order. The
//! [`SortStrategy`] picks between a recursive top-down and an iterative
//! bottom-up variant. [`merge_many`] splices a chain of sorted queues, each
//! wrapped in a [`MergeContext`], into the first one.
//!
//! ```
//! use cyclic_queue::{merge_many, MergeContext, Queue, SortStrategy};
//! use std::iter::FromIterator;
//!
//! let mut queue = Queue::from_iter(["pear", "apple", "fig"]);
//! queue.sort_with(false, "bottom-up".parse::<SortStrategy>().unwrap());
//! assert_eq!(queue.to_string(), "[apple fig pear]");
//!
//! let mut other = Queue::from_iter(["banana", "kiwi"]);
//! let mut chain = [MergeContext::new(0, &mut queue), MergeContext::new(1, &mut other)];
//! assert_eq!(merge_many(&mut chain, false), 5);
//! assert_eq!(queue.to_string(), "[apple banana fig kiwi pear]");
//! ```

#[doc(inline)]
pub use error::{QueueError, Result};
#[doc(inline)]
pub use queue::element::Element;
#[doc(inline)]
pub use queue::iterator::{IntoIter, Iter};
#[doc(inline)]
pub use queue::{merge_many, merge_many_with, MergeContext, Queue, SortStrategy};

pub mod error;
pub mod queue;
