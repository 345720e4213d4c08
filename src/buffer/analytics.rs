//! Windowed queries over a [`CircularBuffer`].
//!
//! All results are ordered oldest to newest, matching
//! [`CircularBuffer::iter`].

use crate::buffer::circular::CircularBuffer;

/// Items that carry a millisecond timestamp.
pub trait Timestamped {
    fn timestamp(&self) -> u64;
}

impl<T: Timestamped + ?Sized> Timestamped for &T {
    fn timestamp(&self) -> u64 {
        (**self).timestamp()
    }
}

impl<V> Timestamped for (u64, V) {
    fn timestamp(&self) -> u64 {
        self.0
    }
}

impl<T: Timestamped> CircularBuffer<T> {
    /// Items with `start <= timestamp <= end`, oldest first.
    pub fn get_by_time_range(&self, start: u64, end: u64) -> Vec<&T> {
        self.iter()
            .filter(|item| (start..=end).contains(&item.timestamp()))
            .collect()
    }
}

impl<T> CircularBuffer<T> {
    /// Simple trailing moving average of `extract(item)` for every full
    /// window, oldest window first.
    ///
    /// A buffer of `len` items yields `len - window + 1` averages; a window of
    /// zero or larger than `len` yields none.
    ///
    /// ```
    /// use hotpath::buffer::CircularBuffer;
    ///
    /// let mut prices = CircularBuffer::new(8).unwrap();
    /// prices.push_batch([1.0, 2.0, 3.0, 4.0]);
    /// assert_eq!(prices.moving_average(2, |p| *p), vec![1.5, 2.5, 3.5]);
    /// ```
    pub fn moving_average<F>(&self, window: usize, extract: F) -> Vec<f64>
    where
        F: Fn(&T) -> f64,
    {
        if window == 0 || window > self.len() {
            return Vec::new();
        }
        let values: Vec<f64> = self.iter().map(extract).collect();
        let mut sum: f64 = values[..window].iter().sum();
        let mut averages = Vec::with_capacity(values.len() - window + 1);
        averages.push(sum / window as f64);
        for i in window..values.len() {
            sum += values[i] - values[i - window];
            averages.push(sum / window as f64);
        }
        averages
    }

    /// Applies `f` to the most recent `window` items (fewer if the buffer
    /// holds fewer), passed oldest first.
    ///
    /// ```
    /// use hotpath::buffer::CircularBuffer;
    ///
    /// let mut volumes = CircularBuffer::new(8).unwrap();
    /// volumes.push_batch([5u64, 1, 7, 3]);
    /// let max_recent = volumes.aggregate(|w| w.iter().copied().max().copied(), 3);
    /// assert_eq!(max_recent, Some(7));
    /// ```
    pub fn aggregate<R, F>(&self, f: F, window: usize) -> R
    where
        F: FnOnce(&[&T]) -> R,
    {
        let skip = self.len().saturating_sub(window);
        let recent: Vec<&T> = self.iter().skip(skip).collect();
        f(&recent)
    }
}
