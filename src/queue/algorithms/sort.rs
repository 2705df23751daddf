use crate::error::QueueError;
use crate::queue::{connect, element_of, next_of, set_next, Link, Queue};
use std::fmt;
use std::str::FromStr;
use tracing::trace;

/// The merge sort variant used by [`Queue::sort_with`].
///
/// Both strategies are stable, compare strings byte-wise, run in
/// *O*(*n* * log(*n*)) time and relink the existing nodes instead of
/// allocating new ones.
///
/// # Examples
///
/// ```
/// use cyclic_queue::SortStrategy;
///
/// assert_eq!("bottom-up".parse::<SortStrategy>(), Ok(SortStrategy::BottomUp));
/// assert_eq!(SortStrategy::default().to_string(), "top-down");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortStrategy {
    /// Recursive: split at the midpoint found by a slow/fast walk, sort both
    /// halves, merge. *O*(log(*n*)) stack.
    TopDown,
    /// Iterative: merge runs of width 1, 2, 4, ... until one run is left.
    /// *O*(1) memory.
    BottomUp,
}

impl Default for SortStrategy {
    fn default() -> Self {
        SortStrategy::TopDown
    }
}

impl fmt::Display for SortStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortStrategy::TopDown => f.write_str("top-down"),
            SortStrategy::BottomUp => f.write_str("bottom-up"),
        }
    }
}

impl FromStr for SortStrategy {
    type Err = QueueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "top-down" | "recursive" => Ok(SortStrategy::TopDown),
            "bottom-up" | "iterative" => Ok(SortStrategy::BottomUp),
            _ => Err(QueueError::UnknownStrategy(s.to_owned())),
        }
    }
}

impl Queue {
    /// Sort the queue by byte-wise string comparison, ascending or, if
    /// `descending` is set, descending.
    ///
    /// This sort is stable (i.e., does not reorder equal elements).
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(*n* * log(*n*)) time and
    /// *O*(log(*n*)) memory.
    ///
    /// # Current Implementation
    ///
    /// The current algorithm is a top-down merge sort over the `next` links
    /// only; the `prev` links are restored in a single pass at the end.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::Queue;
    /// use std::iter::FromIterator;
    ///
    /// let mut queue = Queue::from_iter(["b", "a", "c"]);
    ///
    /// queue.sort(false);
    /// assert_eq!(Vec::from_iter(queue.iter()), vec!["a", "b", "c"]);
    ///
    /// queue.sort(true);
    /// assert_eq!(Vec::from_iter(queue.iter()), vec!["c", "b", "a"]);
    /// ```
    pub fn sort(&mut self, descending: bool) {
        self.sort_with(descending, SortStrategy::default());
    }

    /// Sort the queue like [`Queue::sort`] with the given strategy.
    pub fn sort_with(&mut self, descending: bool, strategy: SortStrategy) {
        if self.has_at_most_one() {
            return;
        }
        trace!(%strategy, descending, "sort");
        if descending {
            merge_sort(self, strategy, |a, b| a > b);
        } else {
            merge_sort(self, strategy, |a, b| a < b);
        }
    }
}

/// Sort a queue of at least two elements.
///
/// The ring is viewed as a singly-linked chain through `next`, terminated by
/// the ghost node. The chain is sorted by relinking `next` pointers only, and
/// the `prev` pointers are rebuilt once the chain is final.
fn merge_sort<F>(queue: &mut Queue, strategy: SortStrategy, mut less: F)
where
    F: FnMut(&str, &str) -> bool,
{
    let (head, end) = (queue.front_node(), queue.ghost_node());
    // SAFETY: `head..end` is the whole, non-empty chain of element nodes; the
    // sorting routines only touch the `next` pointers of element nodes, and
    // `relink_ring` restores every link around the ghost node.
    unsafe {
        let head = match strategy {
            SortStrategy::TopDown => sort_top_down(head, end, &mut less),
            SortStrategy::BottomUp => sort_bottom_up(head, end, &mut less),
        };
        relink_ring(end, head);
    }
}

unsafe fn sort_top_down<F>(head: Link, end: Link, less: &mut F) -> Link
where
    F: FnMut(&str, &str) -> bool,
{
    if head == end || next_of(head) == end {
        return head;
    }
    let mid = split_at_mid(head, end);
    let left = sort_top_down(head, end, less);
    let right = sort_top_down(mid, end, less);
    merge_runs(left, right, end, less).0
}

/// Cut the chain `head..end` (of at least two nodes) after its first half,
/// found by a slow/fast walk, and return the front of the second half.
unsafe fn split_at_mid(head: Link, end: Link) -> Link {
    let (mut slow, mut fast) = (head, next_of(head));
    while fast != end && next_of(fast) != end {
        slow = next_of(slow);
        fast = next_of(next_of(fast));
    }
    let mid = next_of(slow);
    set_next(slow, end);
    mid
}

unsafe fn sort_bottom_up<F>(mut head: Link, end: Link, less: &mut F) -> Link
where
    F: FnMut(&str, &str) -> bool,
{
    let mut width = 1;
    loop {
        let (mut merged_head, mut merged_tail) = (end, end);
        let mut rest = head;
        let mut merges = 0;
        while rest != end {
            let left = rest;
            let right = cut_after(left, width, end);
            rest = cut_after(right, width, end);
            let (run_head, run_tail) = merge_runs(left, right, end, less);
            if merged_tail == end {
                merged_head = run_head;
            } else {
                set_next(merged_tail, run_head);
            }
            merged_tail = run_tail;
            merges += 1;
        }
        head = merged_head;
        if merges <= 1 {
            return head;
        }
        width *= 2;
    }
}

/// Cut the chain after its first `len` nodes and return the rest, or `end`
/// if the chain is not longer than `len`.
unsafe fn cut_after(start: Link, len: usize, end: Link) -> Link {
    if start == end {
        return end;
    }
    let mut last = start;
    for _ in 1..len {
        let next = next_of(last);
        if next == end {
            return end;
        }
        last = next;
    }
    let rest = next_of(last);
    set_next(last, end);
    rest
}

/// Merge two sorted chains terminated by `end` into one, returning its
/// front and back nodes. Either chain may be empty, but not both.
unsafe fn merge_runs<F>(mut left: Link, mut right: Link, end: Link, less: &mut F) -> (Link, Link)
where
    F: FnMut(&str, &str) -> bool,
{
    let (mut head, mut tail) = (end, end);
    let mut push = |node: Link| {
        if tail == end {
            head = node;
        } else {
            set_next(tail, node);
        }
        tail = node;
    };
    while left != end && right != end {
        // Ties are taken from the left run, which keeps the sort stable.
        if less(element_of(right), element_of(left)) {
            let node = right;
            right = next_of(right);
            push(node);
        } else {
            let node = left;
            left = next_of(left);
            push(node);
        }
    }
    let mut rest = if left != end { left } else { right };
    while rest != end {
        let node = rest;
        rest = next_of(rest);
        push(node);
    }
    set_next(tail, end);
    (head, tail)
}

/// Rebuild the ring around the ghost node `ghost` from the chain starting at
/// `head`, restoring every `prev` pointer.
unsafe fn relink_ring(ghost: Link, head: Link) {
    let mut prev = ghost;
    let mut node = head;
    while node != ghost {
        connect(prev, node);
        prev = node;
        node = next_of(node);
    }
    connect(prev, ghost);
}
