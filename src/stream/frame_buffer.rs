//! Bounded circular sample store for one channel.
//!
//! A `FrameBuffer` retains a sliding window of the most recent samples in a
//! fixed backing arena, evicting the oldest on overflow. All public accessors
//! work in *logical* indices (0 = oldest retained sample); the physical
//! wraparound offset is never exposed.

use std::ops::Range;

use crate::error::{Result, SerialVisError};

/// Sliding window over the most recent samples of a channel.
///
/// Backing storage is a fixed `Vec` of `capacity` slots plus a head offset
/// and a logical size. Appending is amortized O(1) per value; once full, each
/// appended value evicts the oldest one, so the buffer always retains exactly
/// the most recent `min(capacity, total ever appended)` values.
pub struct FrameBuffer {
    data: Vec<f64>,
    /// Physical index of the oldest retained sample.
    head: usize,
    /// Number of retained samples, ≤ capacity.
    size: usize,
}

impl FrameBuffer {
    /// Create an empty buffer retaining at most `capacity` samples.
    ///
    /// `capacity` must be nonzero; allocation failure is returned, not
    /// panicked.
    pub fn new(capacity: usize) -> Result<Self> {
        assert!(capacity > 0, "frame buffer capacity must be nonzero");

        let mut data = Vec::new();
        data.try_reserve_exact(capacity)
            .map_err(|_| SerialVisError::Allocation { requested: capacity })?;
        data.resize(capacity, 0.0);

        Ok(Self {
            data,
            head: 0,
            size: 0,
        })
    }

    /// Maximum number of retained samples.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Number of currently retained samples.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether no samples are retained.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Whether the window is full (further appends evict).
    #[inline]
    pub fn is_full(&self) -> bool {
        self.size == self.capacity()
    }

    #[inline]
    fn physical(&self, logical: usize) -> usize {
        let cap = self.capacity();
        let p = self.head + logical;
        if p >= cap {
            p - cap
        } else {
            p
        }
    }

    /// Append samples in order, evicting the oldest as needed.
    pub fn append(&mut self, samples: &[f64]) {
        let cap = self.capacity();

        if samples.len() >= cap {
            // Only the tail of the input survives; start over unwrapped.
            self.data.copy_from_slice(&samples[samples.len() - cap..]);
            self.head = 0;
            self.size = cap;
            return;
        }

        let n = samples.len();
        let write = self.physical(self.size);
        let first = n.min(cap - write);
        self.data[write..write + first].copy_from_slice(&samples[..first]);
        if first < n {
            self.data[..n - first].copy_from_slice(&samples[first..]);
        }

        let overflow = (self.size + n).saturating_sub(cap);
        self.head = (self.head + overflow) % cap;
        self.size = (self.size + n).min(cap);
    }

    /// The `i`-th oldest retained sample.
    ///
    /// Out-of-range indices are a recoverable error: renderers may query a
    /// stale index while the window is being restructured.
    #[inline]
    pub fn sample(&self, i: usize) -> Result<f64> {
        if i >= self.size {
            return Err(SerialVisError::SampleOutOfRange {
                index: i,
                size: self.size,
            });
        }
        Ok(self.data[self.physical(i)])
    }

    /// Change the window capacity in place.
    ///
    /// Shrinking retains only the most recent `new_capacity` samples;
    /// growing retains everything and leaves the new slots empty. On
    /// allocation failure the buffer is left unmodified.
    pub fn resize(&mut self, new_capacity: usize) -> Result<()> {
        *self = self.resized(new_capacity)?;
        Ok(())
    }

    /// Build a copy of this buffer with a different capacity, leaving `self`
    /// untouched. Used by [`Stream`](crate::stream::Stream) to resize all
    /// channels atomically.
    pub fn resized(&self, new_capacity: usize) -> Result<FrameBuffer> {
        let mut out = FrameBuffer::new(new_capacity)?;

        let keep = self.size.min(new_capacity);
        let skip = self.size - keep;
        let (a, b) = self.as_slices();
        for (j, &v) in a.iter().chain(b.iter()).skip(skip).enumerate() {
            out.data[j] = v;
        }
        out.size = keep;
        Ok(out)
    }

    /// The retained window as two contiguous slices, oldest first.
    ///
    /// The second slice is empty unless the window currently wraps the end
    /// of the arena. Bulk consumers (renderers, exporters) use this to avoid
    /// per-index translation.
    pub fn as_slices(&self) -> (&[f64], &[f64]) {
        let cap = self.capacity();
        let first = self.size.min(cap - self.head);
        (
            &self.data[self.head..self.head + first],
            &self.data[..self.size - first],
        )
    }

    /// Iterate over retained samples, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        let (a, b) = self.as_slices();
        a.iter().chain(b.iter()).copied()
    }

    /// Minimum and maximum retained values, or `None` when empty.
    ///
    /// Linear over the retained window; intended for occasional axis
    /// auto-scaling, not the per-frame hot path.
    pub fn value_bounds(&self) -> Option<(f64, f64)> {
        if self.is_empty() {
            return None;
        }
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for v in self.iter() {
            min = min.min(v);
            max = max.max(v);
        }
        Some((min, max))
    }

    /// Logical index range of the samples whose coordinate falls in
    /// `[lo, hi]`.
    ///
    /// `coord` maps a logical index to an externally supplied coordinate
    /// (sample time, explicit X value, or the index itself) and must be
    /// non-decreasing in the index; the result is unspecified otherwise.
    /// Binary search, so a zoomed-in renderer never rescans the whole
    /// window. Returns the minimal `[start, end)` with every in-range sample
    /// included; empty when nothing falls in the interval.
    pub fn window_indices(&self, lo: f64, hi: f64, coord: impl Fn(usize) -> f64) -> Range<usize> {
        // first index with coord(i) >= lo
        let start = lower_bound(self.size, |i| coord(i) < lo);
        // first index with coord(i) > hi
        let end = lower_bound(self.size, |i| coord(i) <= hi);
        start..end.max(start)
    }
}

impl std::fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameBuffer")
            .field("capacity", &self.capacity())
            .field("size", &self.size)
            .finish()
    }
}

/// First index in `0..size` for which `pred` is false, assuming `pred` is
/// monotone (true then false over the range).
fn lower_bound(size: usize, pred: impl Fn(usize) -> bool) -> usize {
    let (mut lo, mut hi) = (0, size);
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if pred(mid) {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    lo
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn contents(buf: &FrameBuffer) -> Vec<f64> {
        buf.iter().collect()
    }

    #[test]
    fn test_empty_buffer() {
        let buf = FrameBuffer::new(4).unwrap();
        assert_eq!(buf.size(), 0);
        assert!(buf.is_empty());
        assert!(!buf.is_full());
        assert!(buf.sample(0).is_err());
        assert_eq!(buf.value_bounds(), None);
    }

    #[test]
    fn test_append_until_full_then_evict() {
        let mut buf = FrameBuffer::new(3).unwrap();

        buf.append(&[1.0]);
        buf.append(&[2.0]);
        assert_eq!(contents(&buf), vec![1.0, 2.0]);
        assert!(!buf.is_full());

        buf.append(&[3.0]);
        assert!(buf.is_full());
        assert_eq!(contents(&buf), vec![1.0, 2.0, 3.0]);

        // full state self-loops: each append evicts the oldest
        buf.append(&[4.0]);
        assert_eq!(contents(&buf), vec![2.0, 3.0, 4.0]);
        buf.append(&[5.0, 6.0]);
        assert_eq!(contents(&buf), vec![4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_append_longer_than_capacity() {
        let mut buf = FrameBuffer::new(3).unwrap();
        buf.append(&[9.0]);
        buf.append(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(contents(&buf), vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_logical_indexing_after_wrap() {
        let mut buf = FrameBuffer::new(5).unwrap();
        for v in 0..12 {
            buf.append(&[v as f64]);
        }
        assert_eq!(buf.size(), 5);
        // sample(0) is the value appended capacity calls ago
        assert_eq!(buf.sample(0).unwrap(), 7.0);
        assert_eq!(buf.sample(4).unwrap(), 11.0);
        assert!(buf.sample(5).is_err());
    }

    #[test]
    fn test_as_slices_roundtrip() {
        let mut buf = FrameBuffer::new(4).unwrap();
        for v in 0..7 {
            buf.append(&[v as f64]);
        }
        let (a, b) = buf.as_slices();
        assert_eq!(a.len() + b.len(), 4);
        let joined: Vec<f64> = a.iter().chain(b.iter()).copied().collect();
        assert_eq!(joined, vec![3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_shrink_keeps_most_recent() {
        let mut buf = FrameBuffer::new(5).unwrap();
        buf.append(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        buf.append(&[6.0]); // wrap

        buf.resize(3).unwrap();
        assert_eq!(buf.capacity(), 3);
        assert_eq!(contents(&buf), vec![4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_grow_keeps_everything() {
        let mut buf = FrameBuffer::new(3).unwrap();
        buf.append(&[1.0, 2.0, 3.0, 4.0]);

        buf.resize(6).unwrap();
        assert_eq!(buf.capacity(), 6);
        assert_eq!(contents(&buf), vec![2.0, 3.0, 4.0]);

        // new slots are usable immediately
        buf.append(&[5.0, 6.0, 7.0]);
        assert_eq!(contents(&buf), vec![2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
    }

    #[test]
    fn test_resize_preserves_most_recent_sample() {
        let mut buf = FrameBuffer::new(4).unwrap();
        buf.append(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let last = buf.sample(buf.size() - 1).unwrap();

        buf.resize(2).unwrap();
        assert_eq!(buf.size(), 2);
        assert_eq!(buf.sample(buf.size() - 1).unwrap(), last);

        buf.resize(8).unwrap();
        assert_eq!(buf.size(), 2);
        assert_eq!(buf.sample(buf.size() - 1).unwrap(), last);
    }

    #[test]
    fn test_value_bounds() {
        let mut buf = FrameBuffer::new(3).unwrap();
        buf.append(&[5.0, -2.0, 7.0, 1.0]); // 5.0 evicted
        assert_eq!(buf.value_bounds(), Some((-2.0, 7.0)));
    }

    #[test]
    fn test_window_indices_basic() {
        let mut buf = FrameBuffer::new(10).unwrap();
        buf.append(&[0.0; 10]);

        // coordinate = logical index
        let r = buf.window_indices(2.0, 5.0, |i| i as f64);
        assert_eq!(r, 2..6); // 2,3,4,5 inclusive

        let r = buf.window_indices(-3.0, 100.0, |i| i as f64);
        assert_eq!(r, 0..10);

        let r = buf.window_indices(20.0, 30.0, |i| i as f64);
        assert!(r.is_empty());
    }

    #[test]
    fn test_window_indices_boundaries() {
        let mut buf = FrameBuffer::new(5).unwrap();
        buf.append(&[0.0; 5]);
        let coord = |i: usize| 10.0 * i as f64; // 0, 10, 20, 30, 40

        // boundary-inclusive on both ends
        let r = buf.window_indices(10.0, 30.0, coord);
        assert_eq!(r, 1..4);

        // between coordinates
        let r = buf.window_indices(5.0, 35.0, coord);
        assert_eq!(r, 1..4);
    }

    #[test]
    fn test_window_indices_empty_buffer() {
        let buf = FrameBuffer::new(5).unwrap();
        assert!(buf.window_indices(0.0, 1.0, |i| i as f64).is_empty());
    }

    /// Linear-scan reference for the binary search.
    fn window_indices_linear(size: usize, lo: f64, hi: f64, coord: impl Fn(usize) -> f64) -> Range<usize> {
        let mut start = size;
        let mut end = 0;
        for i in 0..size {
            let c = coord(i);
            if c >= lo && c <= hi {
                start = start.min(i);
                end = i + 1;
            }
        }
        if start >= end {
            // no hits: collapse to the insertion point
            let ins = (0..size).find(|&i| coord(i) >= lo).unwrap_or(size);
            return ins..ins;
        }
        start..end
    }

    proptest! {
        #[test]
        fn prop_window_matches_linear_scan(
            size in 0usize..200,
            step in 0.5f64..3.0,
            offset in -50.0f64..50.0,
            lo in -100.0f64..300.0,
            width in 0.0f64..200.0,
        ) {
            let mut buf = FrameBuffer::new(256).unwrap();
            buf.append(&vec![0.0; size]);

            let coord = |i: usize| offset + step * i as f64; // strictly increasing
            let hi = lo + width;

            let fast = buf.window_indices(lo, hi, coord);
            let slow = window_indices_linear(size, lo, hi, coord);
            prop_assert_eq!(fast, slow);
        }

        #[test]
        fn prop_retains_most_recent(values in proptest::collection::vec(-1e6f64..1e6, 1..300), cap in 1usize..40) {
            let mut buf = FrameBuffer::new(cap).unwrap();
            for &v in &values {
                buf.append(&[v]);
            }

            let expect_len = values.len().min(cap);
            prop_assert_eq!(buf.size(), expect_len);
            let tail = &values[values.len() - expect_len..];
            let got: Vec<f64> = buf.iter().collect();
            prop_assert_eq!(got, tail.to_vec());
        }
    }
}
