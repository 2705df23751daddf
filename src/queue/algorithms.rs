use crate::queue::{element_of, move_node, next_of, prev_of, swap_links, Queue};
use std::fmt;
use std::hash::{Hash, Hasher};
use tracing::{debug, trace};

pub(crate) mod merge;
pub(crate) mod sort;

impl PartialEq for Queue {
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other.iter())
    }
}

impl Eq for Queue {}

impl Clone for Queue {
    fn clone(&self) -> Self {
        self.iter().collect()
    }
}

impl Hash for Queue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut len = 0_usize;
        for elt in self {
            elt.hash(state);
            len += 1;
        }
        len.hash(state);
    }
}

/// Formats the queue as `[a b c]`.
impl fmt::Display for Queue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, elt) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str(elt)?;
        }
        f.write_str("]")
    }
}

impl Queue {
    /// Returns `true` if the `Queue` contains an element equal to the given value.
    pub fn contains(&self, x: &str) -> bool {
        self.iter().any(|e| e == x)
    }

    /// Reverse the queue in place by flipping the links of every node.
    ///
    /// No node is allocated, released or compared.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(*n*) time and *O*(1) memory.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::Queue;
    /// use std::iter::FromIterator;
    ///
    /// let mut queue = Queue::from_iter(["a", "b", "c"]);
    /// queue.reverse();
    /// assert_eq!(Vec::from_iter(queue.iter()), vec!["c", "b", "a"]);
    /// ```
    pub fn reverse(&mut self) {
        if self.has_at_most_one() {
            return;
        }
        trace!("reverse");
        let ghost = self.ghost_node();
        let mut node = ghost;
        loop {
            // SAFETY: `node` walks the ring through the old `next` pointers,
            // which are the `prev` pointers once its links are swapped.
            unsafe {
                swap_links(node);
                node = prev_of(node);
            }
            if node == ghost {
                break;
            }
        }
    }

    /// Exchange the positions of the elements `(1, 2), (3, 4), ...`. An
    /// unmatched last element stays in place.
    ///
    /// Nodes are moved, never their strings, so elements keep their identity.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::Queue;
    /// use std::iter::FromIterator;
    ///
    /// let mut queue = Queue::from_iter(["1", "2", "3", "4", "5"]);
    /// queue.swap_pairs();
    /// assert_eq!(Vec::from_iter(queue.iter()), vec!["2", "1", "4", "3", "5"]);
    /// ```
    pub fn swap_pairs(&mut self) {
        if self.has_at_most_one() {
            return;
        }
        trace!("swap_pairs");
        let ghost = self.ghost_node();
        let mut first = self.front_node();
        // SAFETY: `first` and `second` are element nodes of this queue, and
        // `second` directly follows `first`.
        unsafe {
            while first != ghost {
                let second = next_of(first);
                if second == ghost {
                    break;
                }
                move_node(second, first);
                first = next_of(first);
            }
        }
    }

    /// Reverse every consecutive block of exactly `k` elements, counting from
    /// the head. A trailing block shorter than `k` is left untouched, and
    /// `k <= 1` is a no-op.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(*n*) time and *O*(1) memory.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::Queue;
    /// use std::iter::FromIterator;
    ///
    /// let mut queue = Queue::from_iter(["1", "2", "3", "4", "5"]);
    /// queue.reverse_k(3);
    /// assert_eq!(Vec::from_iter(queue.iter()), vec!["3", "2", "1", "4", "5"]);
    /// ```
    pub fn reverse_k(&mut self, k: usize) {
        if k <= 1 || self.has_at_most_one() {
            return;
        }
        trace!(k, "reverse_k");
        let ghost = self.ghost_node();
        let mut block_front = self.front_node();
        // SAFETY: all nodes visited are nodes of this queue; `block_end` is
        // reached from `block_front` without crossing the ghost node, so the
        // moved nodes never include the insertion point.
        unsafe {
            loop {
                let mut block_end = block_front;
                let mut len = 0;
                while len < k && block_end != ghost {
                    block_end = next_of(block_end);
                    len += 1;
                }
                if len < k {
                    break;
                }
                // Move each node after `block_front` to the front of the block.
                // `block_front` ends up as the last node of the block.
                let anchor = prev_of(block_front);
                let mut moving = next_of(block_front);
                while moving != block_end {
                    let next = next_of(moving);
                    move_node(moving, next_of(anchor));
                    moving = next;
                }
                block_front = block_end;
            }
        }
    }

    /// Remove and release the middle element, the one at index `⌊n / 2⌋`,
    /// found with a slow/fast pointer walk.
    ///
    /// Returns `false` if the queue is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::Queue;
    /// use std::iter::FromIterator;
    ///
    /// let mut queue = Queue::from_iter(["a", "b", "c", "d"]);
    /// assert!(queue.delete_mid());
    /// assert_eq!(Vec::from_iter(queue.iter()), vec!["a", "b", "d"]);
    /// ```
    pub fn delete_mid(&mut self) -> bool {
        if self.is_empty() {
            return false;
        }
        let ghost = self.ghost_node();
        let (mut slow, mut fast) = (self.front_node(), self.front_node());
        // SAFETY: `fast` only advances twice when neither step reaches the
        // ghost node, so `slow` is always an element node.
        unsafe {
            while fast != ghost && next_of(fast) != ghost {
                slow = next_of(slow);
                fast = next_of(next_of(fast));
            }
            drop(self.detach_node(slow));
        }
        true
    }

    /// Remove and release every element whose value occurs more than once,
    /// keeping only the values that appear exactly once.
    ///
    /// The queue must already be sorted (in either direction): duplicates are
    /// detected among neighbors only. On an unsorted queue, only runs of
    /// adjacent equal values are removed.
    ///
    /// Returns `false` if the queue holds fewer than two elements.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::Queue;
    /// use std::iter::FromIterator;
    ///
    /// let mut queue = Queue::from_iter(["a", "a", "b", "c", "c", "c"]);
    /// assert!(queue.delete_dup());
    /// assert_eq!(Vec::from_iter(queue.iter()), vec!["b"]);
    /// ```
    pub fn delete_dup(&mut self) -> bool {
        if self.has_at_most_one() {
            return false;
        }
        let ghost = self.ghost_node();
        let mut removed = 0;
        let mut run_front = self.front_node();
        // SAFETY: `run_front..run_end` is a non-empty run of element nodes; the
        // node after the run is read before the run is released.
        unsafe {
            while run_front != ghost {
                let value = element_of(run_front);
                let mut run_back = run_front;
                let mut run_end = next_of(run_front);
                while run_end != ghost && element_of(run_end) == value {
                    run_back = run_end;
                    run_end = next_of(run_end);
                }
                if run_back != run_front {
                    removed += self.detach_nodes(run_front, run_back).release();
                }
                run_front = run_end;
            }
        }
        debug!(removed, "delete_dup");
        true
    }

    /// Remove every element that has a strictly smaller element somewhere to
    /// its right. The survivors, read from the head, are non-decreasing.
    ///
    /// Returns the resulting size, or `0` if the queue held fewer than two
    /// elements (in which case it is left untouched).
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::Queue;
    /// use std::iter::FromIterator;
    ///
    /// let mut queue = Queue::from_iter(["2", "1", "5", "3", "4"]);
    /// assert_eq!(queue.ascend(), 3);
    /// assert_eq!(Vec::from_iter(queue.iter()), vec!["1", "3", "4"]);
    /// ```
    pub fn ascend(&mut self) -> usize {
        self.retain_monotonic("ascend", |value, suffix_min| value > suffix_min)
    }

    /// Remove every element that has a strictly greater element somewhere to
    /// its right. The survivors, read from the head, are non-increasing.
    ///
    /// Returns like [`Queue::ascend`].
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::Queue;
    /// use std::iter::FromIterator;
    ///
    /// let mut queue = Queue::from_iter(["5", "2", "9", "3", "8"]);
    /// assert_eq!(queue.descend(), 2);
    /// assert_eq!(Vec::from_iter(queue.iter()), vec!["9", "8"]);
    /// ```
    pub fn descend(&mut self) -> usize {
        self.retain_monotonic("descend", |value, suffix_max| value < suffix_max)
    }

    /// Scan from the tail towards the head, keeping the extreme value of the
    /// suffix seen so far, and release every node `dominated` by it.
    ///
    /// The previous node is captured before the current one is unlinked, so
    /// removal never disturbs the scan.
    fn retain_monotonic<F>(&mut self, op: &'static str, dominated: F) -> usize
    where
        F: Fn(&str, &str) -> bool,
    {
        if self.has_at_most_one() {
            return 0;
        }
        let ghost = self.ghost_node();
        let mut suffix_extreme = self.back_node();
        let (mut kept, mut removed) = (1, 0);
        // SAFETY: `node` walks the element nodes backwards from the one before
        // the last; `prev` is captured before `node` is released, and
        // `suffix_extreme` is always a node that was kept.
        unsafe {
            let mut node = prev_of(suffix_extreme);
            while node != ghost {
                let prev = prev_of(node);
                if dominated(element_of(node), element_of(suffix_extreme)) {
                    drop(self.detach_node(node));
                    removed += 1;
                } else {
                    suffix_extreme = node;
                    kept += 1;
                }
                node = prev;
            }
        }
        debug!(op, kept, removed, "monotonic filter");
        kept
    }
}

#[cfg(test)]
mod tests {
    use crate::Queue;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};
    use std::iter::FromIterator;

    fn queue_eq(queue: &Queue, expected: &[&str]) {
        assert_eq!(Vec::from_iter(queue.iter()), expected);
        assert_eq!(queue.check_links(), Ok(expected.len()));
    }

    #[test]
    fn test_reverse() {
        fn test_case(input: &[&str]) {
            let mut queue = Queue::from_iter(input);
            queue.reverse();
            let expected = Vec::from_iter(input.iter().rev().copied());
            queue_eq(&queue, &expected);
            queue.reverse();
            queue_eq(&queue, input);
        }
        test_case(&[]);
        test_case(&["a"]);
        test_case(&["a", "b"]);
        test_case(&["a", "b", "c"]);
        test_case(&["a", "b", "c", "d", "e", "f"]);
    }

    #[test]
    fn test_swap_pairs() {
        fn test_case(input: &[&str], expected: &[&str]) {
            let mut queue = Queue::from_iter(input);
            queue.swap_pairs();
            queue_eq(&queue, expected);
        }
        test_case(&[], &[]);
        test_case(&["1"], &["1"]);
        test_case(&["1", "2"], &["2", "1"]);
        test_case(&["1", "2", "3"], &["2", "1", "3"]);
        test_case(&["1", "2", "3", "4"], &["2", "1", "4", "3"]);
    }

    #[test]
    fn test_swap_pairs_moves_nodes() {
        let mut queue = Queue::from_iter(["1", "2"]);
        let (first, second) = {
            let mut iter = queue.iter();
            (iter.next().unwrap().as_ptr(), iter.next().unwrap().as_ptr())
        };
        queue.swap_pairs();
        assert_eq!(queue.remove_head(None).unwrap().value().as_ptr(), second);
        assert_eq!(queue.remove_head(None).unwrap().value().as_ptr(), first);
    }

    #[test]
    fn test_reverse_k() {
        fn test_case(input: &[&str], k: usize, expected: &[&str]) {
            let mut queue = Queue::from_iter(input);
            queue.reverse_k(k);
            queue_eq(&queue, expected);
        }
        let input = ["1", "2", "3", "4", "5"];
        test_case(&input, 0, &input);
        test_case(&input, 1, &input);
        test_case(&input, 2, &["2", "1", "4", "3", "5"]);
        test_case(&input, 3, &["3", "2", "1", "4", "5"]);
        test_case(&input, 5, &["5", "4", "3", "2", "1"]);
        test_case(&input, 6, &input);
        test_case(&input[..4], 2, &["2", "1", "4", "3"]);
        test_case(&["1"], 2, &["1"]);
        test_case(&[], 2, &[]);
    }

    #[test]
    fn test_delete_mid() {
        fn test_case(input: &[&str], expected: &[&str]) {
            let mut queue = Queue::from_iter(input);
            assert!(queue.delete_mid());
            queue_eq(&queue, expected);
        }
        test_case(&["0"], &[]);
        test_case(&["0", "1"], &["0"]);
        test_case(&["0", "1", "2"], &["0", "2"]);
        test_case(&["0", "1", "2", "3"], &["0", "1", "3"]);
        test_case(&["0", "1", "2", "3", "4"], &["0", "1", "3", "4"]);
        test_case(&["0", "1", "2", "3", "4", "5"], &["0", "1", "2", "4", "5"]);

        assert!(!Queue::new().delete_mid());
    }

    #[test]
    fn test_delete_dup() {
        fn test_case(input: &[&str], expected: &[&str]) {
            let mut queue = Queue::from_iter(input);
            assert!(queue.delete_dup());
            queue_eq(&queue, expected);
        }
        test_case(&["a", "a", "b", "c", "c", "c"], &["b"]);
        test_case(&["a", "b", "c"], &["a", "b", "c"]);
        test_case(&["a", "a"], &[]);
        test_case(&["a", "b", "b"], &["a"]);
        test_case(&["c", "c", "b", "a", "a"], &["b"]);
        // Unsorted input only loses adjacent runs.
        test_case(&["a", "b", "b", "a"], &["a", "a"]);

        assert!(!Queue::new().delete_dup());
        let mut single = Queue::from_iter(["a"]);
        assert!(!single.delete_dup());
        queue_eq(&single, &["a"]);
    }

    #[test]
    fn test_ascend_and_descend() {
        let mut queue = Queue::from_iter(["2", "1", "5", "3", "4"]);
        assert_eq!(queue.ascend(), 3);
        queue_eq(&queue, &["1", "3", "4"]);

        let mut queue = Queue::from_iter(["1", "1", "0", "0"]);
        assert_eq!(queue.ascend(), 2);
        queue_eq(&queue, &["0", "0"]);

        let mut queue = Queue::from_iter(["5", "2", "9", "3", "8"]);
        assert_eq!(queue.descend(), 2);
        queue_eq(&queue, &["9", "8"]);

        // Ordering is byte-wise: "13" < "8".
        let mut queue = Queue::from_iter(["13", "8"]);
        assert_eq!(queue.descend(), 1);
        queue_eq(&queue, &["8"]);

        let mut queue = Queue::from_iter(["b", "b", "a", "c"]);
        assert_eq!(queue.descend(), 1);
        queue_eq(&queue, &["c"]);

        let mut single = Queue::from_iter(["a"]);
        assert_eq!(single.ascend(), 0);
        assert_eq!(single.descend(), 0);
        queue_eq(&single, &["a"]);
        assert_eq!(Queue::new().ascend(), 0);
    }

    #[test]
    fn test_value_traits() {
        fn hash_of(queue: &Queue) -> u64 {
            let mut hasher = DefaultHasher::new();
            queue.hash(&mut hasher);
            hasher.finish()
        }
        let queue = Queue::from_iter(["a", "b", "c"]);
        let cloned = queue.clone();
        assert_eq!(queue, cloned);
        assert_eq!(hash_of(&queue), hash_of(&cloned));
        assert_ne!(queue, Queue::from_iter(["a", "b"]));
        assert_ne!(
            queue.front().unwrap().as_ptr(),
            cloned.front().unwrap().as_ptr()
        );
        assert!(queue.contains("b"));
        assert!(!queue.contains("d"));
        assert_eq!(queue.to_string(), "[a b c]");
        assert_eq!(Queue::new().to_string(), "[]");
    }
}
