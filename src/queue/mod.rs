use std::alloc::{self, Layout};
use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;
use std::ptr::NonNull;

use tracing::warn;

use crate::error::{QueueError, Result};
use crate::queue::element::Element;
use crate::queue::iterator::Iter;

pub mod element;
pub mod iterator;

mod algorithms;

pub use self::algorithms::merge::{merge_many, merge_many_with, MergeContext};
pub use self::algorithms::sort::SortStrategy;

/// The `Queue` is a queue of strings backed by a cyclic doubly-linked list
/// with owned nodes. Inserting and removing at either end take constant time.
///
/// The `Queue` contains only a pointer `ghost` to the ghost (sentinel) node.
/// There is no length field: [`Queue::size`] walks the ring.
///
/// # Naming Conventions
///
/// - `front..=back`: a closed range of queue nodes, both inclusive;
/// - `start..end`: a half-open range of queue nodes, left inclusive and right
///   exclusive (probably the ghost node).
pub struct Queue {
    ghost: NonNull<Node<Erased>>,
    _marker: PhantomData<Box<Node<String>>>,
}

/// A node of the ring. Elements are `Node<String>`; the ghost node is a
/// `Node<Erased>` whose missing payload is never read.
#[repr(C)]
pub(crate) struct Node<T> {
    pub(crate) next: NonNull<Node<T>>,
    pub(crate) prev: NonNull<Node<T>>,
    pub(crate) element: T,
}

#[derive(Default)]
struct Erased;

/// A pointer to any node of a queue, the ghost node included.
pub(crate) type Link = NonNull<Node<String>>;

/// Nodes fragment detached from a queue, used in splicing and bulk removal.
///
/// When detached from a queue, reading of `front.prev` and `back.next`
/// is invalid.
pub(crate) struct DetachedNodes {
    pub(crate) front: Link,
    pub(crate) back: Link,
    _marker: PhantomData<Box<Node<String>>>,
}

// Link accessors. They go through raw places instead of `&Node<String>`,
// since the ghost node is smaller than an element node.

#[inline]
pub(crate) unsafe fn next_of(node: Link) -> Link {
    (*node.as_ptr()).next
}

#[inline]
pub(crate) unsafe fn prev_of(node: Link) -> Link {
    (*node.as_ptr()).prev
}

#[inline]
pub(crate) unsafe fn set_next(node: Link, next: Link) {
    (*node.as_ptr()).next = next;
}

/// Returns the element of a non-ghost node.
#[inline]
pub(crate) unsafe fn element_of<'a>(node: Link) -> &'a str {
    &(*node.as_ptr()).element
}

#[inline]
pub(crate) unsafe fn connect(prev: Link, next: Link) {
    (*prev.as_ptr()).next = next;
    (*next.as_ptr()).prev = prev;
}

/// Exchange the `next` and `prev` pointers of a node.
#[inline]
pub(crate) unsafe fn swap_links(node: Link) {
    let node = node.as_ptr();
    let next = (*node).next;
    (*node).next = (*node).prev;
    (*node).prev = next;
}

/// Move the node `from` to the position before `to`.
pub(crate) unsafe fn move_node(from: Link, to: Link) {
    move_nodes(from, from, to);
}

/// Move the range `from_front..=from_back` to the position before `to`.
///
/// `to` must not lie inside the moved range.
pub(crate) unsafe fn move_nodes(from_front: Link, from_back: Link, to: Link) {
    connect(prev_of(from_front), next_of(from_back));
    connect(prev_of(to), from_front);
    connect(from_back, to);
}

// private methods
impl Queue {
    pub(crate) fn ghost_node(&self) -> Link {
        self.ghost.cast()
    }
    pub(crate) fn front_node(&self) -> Link {
        // SAFETY: `ghost.next` is always valid (either `ghost` itself, or the first element
        // in the queue).
        unsafe { next_of(self.ghost_node()) }
    }
    pub(crate) fn back_node(&self) -> Link {
        // SAFETY: `ghost.prev` is always valid (either `ghost` itself, or the last element
        // in the queue).
        unsafe { prev_of(self.ghost_node()) }
    }

    /// Returns `true` if the queue holds zero or one element, the case where
    /// every reordering algorithm is a no-op.
    pub(crate) fn has_at_most_one(&self) -> bool {
        self.front_node() == self.back_node()
    }

    /// Detach a single node `node` from the queue, and return it as a box.
    ///
    /// It is unsafe because it does not check whether `node` belongs to the queue.
    ///
    /// If the `node` does not belong to the queue, or is the ghost node, this
    /// function call will make the queue ill-formed.
    pub(crate) unsafe fn detach_node(&mut self, node: Link) -> Box<Node<String>> {
        connect(prev_of(node), next_of(node));
        Box::from_raw(node.as_ptr())
    }

    /// Attach a single node `node` to the queue, between `prev` and `next`.
    ///
    /// It is unsafe because it does not check whether `prev` and `next` belongs
    /// to the queue, or whether the `prev` and `next` is adjacent (only in
    /// `#[cfg(debug_assertions)]`).
    pub(crate) unsafe fn attach_node(&mut self, prev: Link, next: Link, node: Link) {
        #[cfg(debug_assertions)]
        assert_adjacent(prev, next);
        connect(prev, node);
        connect(node, next);
        #[cfg(debug_assertions)]
        {
            assert_adjacent(prev, node);
            assert_adjacent(node, next);
        }
    }

    /// Detach a range of nodes `front..=back` from the queue, and return the detached
    /// nodes.
    ///
    /// It is unsafe because it does not check whether `front..=back` is a valid range
    /// (i.e. `front` must **NOT** be at the right of `back`), or whether it belongs
    /// to the queue.
    pub(crate) unsafe fn detach_nodes(&mut self, front: Link, back: Link) -> DetachedNodes {
        connect(prev_of(front), next_of(back));
        DetachedNodes::new(front, back)
    }

    /// Attach a range of detached nodes to the queue, between `prev` and `next`.
    ///
    /// It is unsafe because it does not check whether `prev` and `next` belongs
    /// to the queue, or whether the `prev` and `next` is adjacent (only in
    /// `#[cfg(debug_assertions)]`).
    pub(crate) unsafe fn attach_nodes(&mut self, prev: Link, next: Link, detached: DetachedNodes) {
        #[cfg(debug_assertions)]
        assert_adjacent(prev, next);
        connect(prev, detached.front);
        connect(detached.back, next);
        #[cfg(debug_assertions)]
        {
            assert_adjacent(prev, detached.front);
            assert_adjacent(detached.back, next);
        }
    }

    /// Detach all nodes from the queue, and return the detached nodes, or return
    /// `None` if the queue is empty.
    ///
    /// It is safe because `self.front_node()..=self.back_node()` is a valid range.
    pub(crate) fn detach_all_nodes(&mut self) -> Option<DetachedNodes> {
        if self.is_empty() {
            return None;
        }
        unsafe { Some(self.detach_nodes(self.front_node(), self.back_node())) }
    }
}

impl Queue {
    /// Create an empty `Queue`, whose ghost node points to itself.
    ///
    /// # Panics
    ///
    /// Aborts through [`std::alloc::handle_alloc_error`] if the ghost node
    /// cannot be allocated. See [`Queue::try_new`] for a fallible version.
    ///
    /// # Examples
    /// ```
    /// use cyclic_queue::Queue;
    /// let queue = Queue::new();
    /// assert_eq!(queue.size(), 0);
    /// ```
    #[inline]
    pub fn new() -> Self {
        match Self::try_new() {
            Ok(queue) => queue,
            Err(_) => alloc::handle_alloc_error(Layout::new::<Node<Erased>>()),
        }
    }

    /// Create an empty `Queue`, or return [`QueueError::AllocFailed`] if
    /// the ghost node cannot be allocated.
    pub fn try_new() -> Result<Self> {
        let ghost = new_ghost()?;
        let _marker = PhantomData;
        Ok(Self { ghost, _marker })
    }

    /// Returns `true` if the `Queue` is empty.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.front_node() == self.ghost_node()
    }

    /// Returns the number of elements, counted by walking the ring from the
    /// ghost node back to itself.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(*n*) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::Queue;
    ///
    /// let mut queue = Queue::new();
    /// assert_eq!(queue.size(), 0);
    ///
    /// queue.insert_tail("a").unwrap();
    /// queue.insert_head("b").unwrap();
    /// assert_eq!(queue.size(), 2);
    /// ```
    pub fn size(&self) -> usize {
        self.iter().count()
    }

    /// Removes and releases all elements from the `Queue`.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(*n*) time.
    #[inline]
    pub fn clear(&mut self) {
        if let Some(detached) = self.detach_all_nodes() {
            detached.release();
        }
    }

    /// Provides the first element, or `None` if the queue is empty.
    #[inline]
    pub fn front(&self) -> Option<&str> {
        self.iter().next()
    }

    /// Provides the last element, or `None` if the queue is empty.
    #[inline]
    pub fn back(&self) -> Option<&str> {
        self.iter().next_back()
    }

    /// Copies `s` onto the heap and links it first in the queue.
    ///
    /// If either the string or the node cannot be allocated, the queue is left
    /// untouched and [`QueueError::AllocFailed`] is returned.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time (plus the string copy).
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::Queue;
    ///
    /// let mut queue = Queue::new();
    ///
    /// queue.insert_head("b").unwrap();
    /// queue.insert_head("a").unwrap();
    /// assert_eq!(queue.front(), Some("a"));
    /// ```
    pub fn insert_head(&mut self, s: &str) -> Result<()> {
        let node = new_element_node(s)?;
        // SAFETY: the ghost node and the front node are adjacent nodes of this queue.
        unsafe { self.attach_node(self.ghost_node(), self.front_node(), node) };
        Ok(())
    }

    /// Copies `s` onto the heap and links it last in the queue.
    ///
    /// Fails like [`Queue::insert_head`].
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::Queue;
    ///
    /// let mut queue = Queue::new();
    ///
    /// queue.insert_tail("a").unwrap();
    /// queue.insert_tail("b").unwrap();
    /// assert_eq!(queue.back(), Some("b"));
    /// ```
    pub fn insert_tail(&mut self, s: &str) -> Result<()> {
        let node = new_element_node(s)?;
        // SAFETY: the back node and the ghost node are adjacent nodes of this queue.
        unsafe { self.attach_node(self.back_node(), self.ghost_node(), node) };
        Ok(())
    }

    /// Unlinks the first element and hands it to the caller, or returns `None`
    /// if the queue is empty.
    ///
    /// If `buf` is given, at most `buf.len() - 1` bytes of the element are copied
    /// into it followed by a NUL byte; longer strings are truncated silently.
    /// See [`Element::copy_to`].
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::Queue;
    ///
    /// let mut queue = Queue::new();
    /// queue.insert_tail("hello").unwrap();
    ///
    /// let mut buf = [0xff_u8; 4];
    /// let element = queue.remove_head(Some(&mut buf)).unwrap();
    /// assert_eq!(element.value(), "hello");
    /// assert_eq!(&buf, b"hel\0");
    /// assert!(queue.remove_head(None).is_none());
    /// ```
    pub fn remove_head(&mut self, buf: Option<&mut [u8]>) -> Option<Element> {
        if self.is_empty() {
            return None;
        }
        // SAFETY: the queue is not empty, so the front node is an element node.
        let node = unsafe { self.detach_node(self.front_node()) };
        Some(hand_out(node, buf))
    }

    /// Unlinks the last element and hands it to the caller, or returns `None`
    /// if the queue is empty. `buf` is filled like in [`Queue::remove_head`].
    pub fn remove_tail(&mut self, buf: Option<&mut [u8]>) -> Option<Element> {
        if self.is_empty() {
            return None;
        }
        // SAFETY: the queue is not empty, so the back node is an element node.
        let node = unsafe { self.detach_node(self.back_node()) };
        Some(hand_out(node, buf))
    }

    /// Provides a forward iterator.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::Queue;
    /// use std::iter::FromIterator;
    ///
    /// let queue = Queue::from_iter(["a", "b", "c"]);
    ///
    /// let mut iter = queue.iter();
    /// assert_eq!(iter.next(), Some("a"));
    /// assert_eq!(iter.next_back(), Some("c"));
    /// assert_eq!(iter.next(), Some("b"));
    /// assert_eq!(iter.next(), None);
    /// ```
    #[inline]
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(self)
    }

    /// Moves all elements from `other` to the end of the queue.
    ///
    /// This reuses all the nodes from `other` and moves them into `self`. After
    /// this operation, `other` becomes empty.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time and *O*(1) memory.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::Queue;
    /// use std::iter::FromIterator;
    ///
    /// let mut queue1 = Queue::from_iter(["a"]);
    /// let mut queue2 = Queue::from_iter(["b", "c"]);
    ///
    /// queue1.append(&mut queue2);
    ///
    /// assert_eq!(Vec::from_iter(queue1.iter()), vec!["a", "b", "c"]);
    /// assert!(queue2.is_empty());
    /// ```
    pub fn append(&mut self, other: &mut Self) {
        if let Some(detached) = other.detach_all_nodes() {
            // `self.back_node()` and `self.ghost_node()` are valid
            // nodes in the queue and they are adjacent, so it is safe.
            unsafe { self.attach_nodes(self.back_node(), self.ghost_node(), detached) }
        }
    }

    /// Walks the whole ring and checks that `n.next.prev == n` holds for every
    /// node, the ghost node included. Returns the number of elements.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::BrokenLink`] with the position of the first node
    /// whose `prev` pointer does not point back.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::Queue;
    /// use std::iter::FromIterator;
    ///
    /// let queue = Queue::from_iter(["a", "b", "c"]);
    /// assert_eq!(queue.check_links(), Ok(3));
    /// ```
    pub fn check_links(&self) -> Result<usize> {
        let ghost = self.ghost_node();
        let mut node = ghost;
        let mut position = 0;
        loop {
            // SAFETY: every node reached so far had a consistent back link, so
            // `node` is a live node of this queue.
            let next = unsafe { next_of(node) };
            if unsafe { prev_of(next) } != node {
                return Err(QueueError::BrokenLink { position });
            }
            if next == ghost {
                return Ok(position);
            }
            node = next;
            position += 1;
        }
    }
}

impl Debug for Queue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl Default for Queue {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Node<T> {
    /// Allocate a detached node with given element. Its `next` and `prev`
    /// pointers are dangling until the node is attached.
    pub(crate) fn try_new_detached(element: T) -> Result<NonNull<Node<T>>> {
        let layout = Layout::new::<Node<T>>();
        // SAFETY: `Node<T>` holds two pointers, so `layout` is never zero-sized.
        let ptr = unsafe { alloc::alloc(layout) }.cast::<Node<T>>();
        let node = NonNull::new(ptr).ok_or_else(|| QueueError::alloc_failed(layout))?;
        let dangling = NonNull::dangling();
        // SAFETY: `node` is freshly allocated with the layout of `Node<T>`, and
        // may later be released by `Box::from_raw`.
        unsafe {
            node.as_ptr().write(Node {
                next: dangling,
                prev: dangling,
                element,
            })
        };
        Ok(node)
    }

    pub(crate) fn into_element(self: Box<Self>) -> T {
        self.element
    }
}

impl DetachedNodes {
    /// If is unsafe because it must be guaranteed that `front..=back` is
    /// a valid range.
    unsafe fn new(front: Link, back: Link) -> Self {
        let _marker = PhantomData;
        Self {
            front,
            back,
            _marker,
        }
    }

    /// Release every node of the detached range, returning how many were
    /// released.
    pub(crate) fn release(self) -> usize {
        let mut released = 0;
        let mut node = self.front;
        loop {
            // SAFETY: `front..=back` is a valid range of element nodes, and
            // `next` is read before the node is freed.
            let next = unsafe { next_of(node) };
            drop(unsafe { Box::from_raw(node.as_ptr()) });
            released += 1;
            if node == self.back {
                return released;
            }
            node = next;
        }
    }
}

fn new_ghost() -> Result<NonNull<Node<Erased>>> {
    let ghost = Node::try_new_detached(Erased::default())?;
    // SAFETY: `ghost` is freshly allocated and owned by nobody else yet.
    // `ghost.element` is never read, so it is erased out.
    unsafe {
        (*ghost.as_ptr()).next = ghost;
        (*ghost.as_ptr()).prev = ghost;
    }
    Ok(ghost)
}

/// Duplicate `s` and wrap it in a detached node. Nothing is leaked if either
/// allocation fails.
fn new_element_node(s: &str) -> Result<Link> {
    let mut value = String::new();
    if value.try_reserve_exact(s.len()).is_err() {
        warn!(bytes = s.len(), "failed to duplicate queue element");
        let layout = Layout::array::<u8>(s.len()).unwrap_or_else(|_| Layout::new::<u8>());
        return Err(QueueError::alloc_failed(layout));
    }
    value.push_str(s);
    Node::try_new_detached(value).map_err(|err| {
        warn!(%err, "failed to allocate queue node");
        err
    })
}

fn hand_out(node: Box<Node<String>>, buf: Option<&mut [u8]>) -> Element {
    let element = Element::new(node.into_element());
    if let Some(buf) = buf {
        element.copy_to(buf);
    }
    element
}

#[cfg(debug_assertions)]
fn assert_adjacent(prev: Link, next: Link) {
    // SAFETY: callers pass nodes of a live queue, whose links are readable
    // even when the two nodes turn out not to be adjacent.
    unsafe {
        assert_eq!(next_of(prev), next);
        assert_eq!(prev_of(next), prev);
    }
}

impl Drop for Queue {
    fn drop(&mut self) {
        self.clear();
        // SAFETY: the ghost node was allocated by `new_ghost` with the layout of
        // `Node<Erased>`, and no element node points to it any more.
        drop(unsafe { Box::from_raw(self.ghost.as_ptr()) });
    }
}

unsafe impl Send for Queue {}

unsafe impl Sync for Queue {}

#[cfg(test)]
mod tests {
    use crate::error::QueueError;
    use crate::queue::{prev_of, Queue};
    use std::iter::FromIterator;

    fn contents(queue: &Queue) -> Vec<&str> {
        Vec::from_iter(queue.iter())
    }

    #[test]
    fn queue_create() {
        let mut queue = Queue::new();
        assert!(queue.is_empty());
        assert_eq!(queue.check_links(), Ok(0));
        queue.insert_tail("a").unwrap();
        assert!(!queue.is_empty());
        assert_eq!(queue.remove_tail(None).unwrap().value(), "a");
        assert!(queue.is_empty());
        assert_eq!(queue.check_links(), Ok(0));
    }

    #[test]
    fn queue_insert_and_remove() {
        let mut queue = Queue::new();
        assert_eq!(queue.front(), None);
        assert_eq!(queue.back(), None);
        assert!(queue.remove_head(None).is_none());
        assert!(queue.remove_tail(None).is_none());

        queue.insert_head("1").unwrap();
        queue.insert_head("2").unwrap();
        queue.insert_tail("3").unwrap();
        assert_eq!(contents(&queue), vec!["2", "1", "3"]);
        assert_eq!(queue.front(), Some("2"));
        assert_eq!(queue.back(), Some("3"));
        assert_eq!(queue.size(), 3);
        assert_eq!(queue.check_links(), Ok(3));

        assert_eq!(queue.remove_head(None).unwrap().value(), "2");
        assert_eq!(queue.remove_tail(None).unwrap().value(), "3");
        assert_eq!(queue.remove_tail(None).unwrap().value(), "1");
        assert!(queue.is_empty());
    }

    #[test]
    fn queue_remove_into_buffer() {
        let mut queue = Queue::from_iter(["short", "a much longer string"]);

        let mut buf = [0xff_u8; 8];
        let element = queue.remove_head(Some(&mut buf)).unwrap();
        assert_eq!(element.value(), "short");
        assert_eq!(&buf[..6], b"short\0");

        let element = queue.remove_tail(Some(&mut buf)).unwrap();
        assert_eq!(element.value(), "a much longer string");
        assert_eq!(&buf, b"a much \0");

        let mut empty: [u8; 0] = [];
        assert!(queue.remove_head(Some(&mut empty)).is_none());
    }

    #[test]
    fn queue_insert_copies_string() {
        let source = String::from("owned");
        let mut queue = Queue::new();
        queue.insert_tail(&source).unwrap();
        drop(source);
        assert_eq!(queue.front(), Some("owned"));
    }

    #[test]
    fn queue_append() {
        let mut queue = Queue::from_iter(["a", "b"]);
        let mut other = Queue::from_iter(["c"]);
        queue.append(&mut other);
        assert_eq!(contents(&queue), vec!["a", "b", "c"]);
        assert!(other.is_empty());
        assert_eq!(other.check_links(), Ok(0));

        let mut empty = Queue::new();
        queue.append(&mut empty);
        assert_eq!(queue.check_links(), Ok(3));

        empty.append(&mut queue);
        assert_eq!(contents(&empty), vec!["a", "b", "c"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn queue_clear() {
        let mut queue = Queue::from_iter(["a", "b", "c"]);
        queue.clear();
        assert!(queue.is_empty());
        assert_eq!(queue.size(), 0);
        queue.insert_tail("d").unwrap();
        assert_eq!(contents(&queue), vec!["d"]);
    }

    #[test]
    fn queue_check_links_detects_corruption() {
        let queue = Queue::from_iter(["a", "b", "c"]);
        let second = unsafe { crate::queue::next_of(queue.front_node()) };
        let saved = unsafe { prev_of(second) };
        unsafe { (*second.as_ptr()).prev = second };
        assert_eq!(
            queue.check_links(),
            Err(QueueError::BrokenLink { position: 1 })
        );
        unsafe { (*second.as_ptr()).prev = saved };
        assert_eq!(queue.check_links(), Ok(3));
    }
}
