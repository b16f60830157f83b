//! Bounded match buffer.
//!
//! Holds the bytes read from the source that have not been consumed by a
//! match yet, in stream order and without gaps. The buffer never grows past
//! its capacity: when it is full and nothing matched, the oldest half is
//! evicted and the most recent `capacity / 2` bytes are kept as look-back
//! context for patterns straddling the eviction point.

use std::fmt;

/// A fixed-capacity byte region plus the count of valid bytes at its front.
///
/// The backing storage is allocated on first use, so constructing a session
/// that is never driven costs nothing.
#[derive(Clone)]
pub struct MatchBuffer {
    /// Backing storage; empty until first use, then exactly `capacity` long.
    data: Vec<u8>,
    /// Maximum number of valid bytes.
    capacity: usize,
    /// Number of valid bytes at the front of `data`.
    len: usize,
    /// Total bytes dropped by evictions.
    bytes_evicted: u64,
}

impl MatchBuffer {
    /// Create a buffer holding at most `capacity` bytes.
    ///
    /// No memory is allocated until the first read.
    #[must_use]
    pub const fn new(capacity: usize) -> Self {
        Self {
            data: Vec::new(),
            capacity,
            len: 0,
            bytes_evicted: 0,
        }
    }

    /// Maximum number of bytes the buffer retains.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of bytes currently awaiting a match.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Check if no bytes are buffered.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Check if the buffer has no room left for another read.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.len == self.capacity
    }

    /// Total number of bytes dropped by evictions so far.
    #[must_use]
    pub const fn bytes_evicted(&self) -> u64 {
        self.bytes_evicted
    }

    /// The valid bytes, oldest first.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.len]
    }

    /// The unused tail of the buffer, where the next read lands.
    ///
    /// Empty when the buffer is full; call [`evict`](Self::evict) first.
    pub fn spare_mut(&mut self) -> &mut [u8] {
        if self.data.len() != self.capacity {
            self.data.resize(self.capacity, 0);
        }
        &mut self.data[self.len..]
    }

    /// Mark `n` bytes written into [`spare_mut`](Self::spare_mut) as valid.
    pub fn commit(&mut self, n: usize) {
        assert!(
            n <= self.capacity - self.len,
            "committed {n} bytes with only {} spare",
            self.capacity - self.len
        );
        self.len += n;
    }

    /// Append bytes, evicting the oldest half whenever the buffer fills up.
    ///
    /// This is the same sequence of commits and evictions a reader delivering
    /// `bytes` in arbitrary chunks would produce, without pattern checks in
    /// between.
    pub fn extend_from_slice(&mut self, mut bytes: &[u8]) {
        while !bytes.is_empty() {
            if self.is_full() {
                self.evict();
            }
            let spare = self.spare_mut();
            let n = spare.len().min(bytes.len());
            spare[..n].copy_from_slice(&bytes[..n]);
            self.commit(n);
            bytes = &bytes[n..];
        }
    }

    /// Drop the oldest bytes, keeping the most recent `capacity / 2`.
    ///
    /// Returns the number of bytes dropped.
    pub fn evict(&mut self) -> usize {
        let keep = (self.capacity / 2).min(self.len);
        let dropped = self.len - keep;
        self.data.copy_within(self.len - keep..self.len, 0);
        self.len = keep;
        self.bytes_evicted += dropped as u64;
        tracing::trace!(dropped, kept = keep, "match buffer full, evicted oldest bytes");
        dropped
    }

    /// Consume everything up to `end`, shifting the remainder to the front.
    pub fn consume(&mut self, end: usize) {
        assert!(end <= self.len, "consume past end: {end} > {}", self.len);
        self.data.copy_within(end..self.len, 0);
        self.len -= end;
    }

    /// Remove and return all valid bytes.
    pub fn take(&mut self) -> Vec<u8> {
        let bytes = self.as_slice().to_vec();
        self.len = 0;
        bytes
    }

    /// Discard all valid bytes.
    pub fn clear(&mut self) {
        self.len = 0;
    }
}

impl fmt::Debug for MatchBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchBuffer")
            .field("len", &self.len)
            .field("capacity", &self.capacity)
            .field("allocated", &!self.data.is_empty())
            .field("bytes_evicted", &self.bytes_evicted)
            .finish()
    }
}
