use std::fmt;

/// An element unlinked from a [`Queue`], owned by the caller from then on.
///
/// Relinking algorithms move nodes rather than copying strings, so the heap
/// buffer behind [`Element::value`] is the very one that was allocated when
/// the element was inserted.
///
/// [`Queue`]: crate::Queue
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Element {
    value: String,
}

impl Element {
    pub(crate) fn new(value: String) -> Self {
        Self { value }
    }

    /// Provides the string value of the element.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Consumes the element, returning its string without copying it.
    pub fn into_value(self) -> String {
        self.value
    }

    /// Copy the element into `buf` as a NUL-terminated byte string.
    ///
    /// At most `buf.len() - 1` bytes are copied and a NUL byte always follows
    /// them; a longer element is truncated silently, possibly inside a
    /// multi-byte character. Nothing is written into an empty buffer.
    ///
    /// Returns the number of bytes copied, not counting the NUL byte.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::Queue;
    ///
    /// let mut queue = Queue::new();
    /// queue.insert_tail("queue").unwrap();
    /// let element = queue.remove_head(None).unwrap();
    ///
    /// let mut buf = [0xff_u8; 8];
    /// assert_eq!(element.copy_to(&mut buf), 5);
    /// assert_eq!(&buf[..6], b"queue\0");
    ///
    /// let mut small = [0xff_u8; 3];
    /// assert_eq!(element.copy_to(&mut small), 2);
    /// assert_eq!(&small, b"qu\0");
    /// ```
    pub fn copy_to(&self, buf: &mut [u8]) -> usize {
        let capacity = match buf.len().checked_sub(1) {
            Some(capacity) => capacity,
            None => return 0,
        };
        let copied = self.value.len().min(capacity);
        buf[..copied].copy_from_slice(&self.value.as_bytes()[..copied]);
        buf[copied] = 0;
        copied
    }
}

impl AsRef<str> for Element {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

impl From<Element> for String {
    fn from(element: Element) -> Self {
        element.value
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.value, f)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}
