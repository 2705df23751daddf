use crate::queue::{Queue, SortStrategy};
use std::fmt;
use tracing::debug;

/// A queue taking part in [`merge_many`], tagged with the identity of the
/// queue it wraps.
///
/// A chain of contexts is a slice of them, walked in order. The context does
/// not belong to the queue it wraps and only lives for the duration of the
/// merge.
pub struct MergeContext<'a> {
    id: usize,
    queue: &'a mut Queue,
}

impl<'a> MergeContext<'a> {
    /// Wrap `queue` under the identity `id`. Contexts of distinct queues in
    /// the same chain must carry distinct ids.
    pub fn new(id: usize, queue: &'a mut Queue) -> Self {
        Self { id, queue }
    }

    /// Returns the identity tag of the context.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Provides the wrapped queue.
    pub fn queue(&self) -> &Queue {
        self.queue
    }
}

impl fmt::Debug for MergeContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MergeContext")
            .field("id", &self.id)
            .field("queue", &self.queue)
            .finish()
    }
}

/// Merge the queues of a chain of contexts, each already sorted in the
/// direction given by `descending`, into the queue of the first context.
///
/// Every other queue is spliced onto the tail of the first one (nodes are
/// moved, not copied) and the result is sorted once. The walk stops early if
/// a context carrying the identity of the first one shows up again. Returns
/// the number of elements of the merged queue, or `0` for an empty chain.
///
/// # Complexity
///
/// This operation should compute in *O*(*n* * log(*n*)) time, where *n* is
/// the total number of elements.
///
/// # Examples
///
/// ```
/// use cyclic_queue::{merge_many, MergeContext, Queue};
/// use std::iter::FromIterator;
///
/// let mut q1 = Queue::from_iter(["b", "d"]);
/// let mut q2 = Queue::from_iter(["a", "c"]);
///
/// let mut chain = [MergeContext::new(1, &mut q1), MergeContext::new(2, &mut q2)];
/// assert_eq!(merge_many(&mut chain, false), 4);
///
/// assert_eq!(Vec::from_iter(q1.iter()), vec!["a", "b", "c", "d"]);
/// assert!(q2.is_empty());
/// ```
pub fn merge_many(chain: &mut [MergeContext<'_>], descending: bool) -> usize {
    merge_many_with(chain, descending, SortStrategy::default())
}

/// Like [`merge_many`], sorting the concatenated queue with `strategy`.
pub fn merge_many_with(
    chain: &mut [MergeContext<'_>],
    descending: bool,
    strategy: SortStrategy,
) -> usize {
    let (first, rest) = match chain.split_first_mut() {
        Some(split) => split,
        None => return 0,
    };
    if rest.is_empty() {
        return first.queue.size();
    }
    let mut spliced = 0;
    for context in rest.iter_mut() {
        if context.id == first.id {
            debug!(id = first.id, "merge chain revisits its first queue");
            break;
        }
        first.queue.append(context.queue);
        spliced += 1;
    }
    first.queue.sort_with(descending, strategy);
    let total = first.queue.size();
    debug!(id = first.id, spliced, total, descending, "merge_many");
    total
}
