//! Entry size estimation for memory-budgeted caches.
//!
//! A [`BoundedCache`](crate::cache::BoundedCache) charges every entry a byte
//! size against its optional memory budget. The size comes from a
//! caller-supplied [`SizeFn`]; without one the cache falls back to
//! [`shallow_size`], which is exact for primitive-like keys and values
//! (integers, floats, fixed arrays, `Copy` structs) and undercounts heap-owning
//! types such as `String` or `Vec<T>`.
//!
//! For heap-owning types, [`serialized_size`] charges the JSON-encoded length
//! of key and value, a reasonable proxy for payload size that needs no
//! per-type code.
//!
//! ```
//! use hotpath::cache::size::{serialized_size, shallow_size};
//!
//! assert_eq!(shallow_size(&1u64, &2u32), 12);
//! // "\"AAPL\"" (6 bytes) + "189.5" (5 bytes)
//! assert_eq!(serialized_size(&"AAPL", &189.5_f64), 11);
//! ```

use std::io;

use serde::Serialize;

/// Computes the byte size charged for an entry.
pub type SizeFn<K, V> = Box<dyn Fn(&K, &V) -> usize + Send>;

/// `size_of::<K>() + size_of::<V>()`.
#[inline]
pub fn shallow_size<K, V>(_key: &K, _value: &V) -> usize {
    std::mem::size_of::<K>() + std::mem::size_of::<V>()
}

/// Length of the JSON encoding of `key` plus that of `value`.
///
/// A value that cannot be encoded (for example a map with non-string keys)
/// is charged its shallow size instead.
pub fn serialized_size<K, V>(key: &K, value: &V) -> usize
where
    K: Serialize + ?Sized,
    V: Serialize + ?Sized,
{
    encoded_len(key) + encoded_len(value)
}

fn encoded_len<T: Serialize + ?Sized>(item: &T) -> usize {
    let mut counter = ByteCounter(0);
    match serde_json::to_writer(&mut counter, item) {
        Ok(()) => counter.0,
        Err(_) => std::mem::size_of_val(item),
    }
}

/// Sink that only counts bytes, so sizing never allocates.
struct ByteCounter(usize);

impl io::Write for ByteCounter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0 += buf.len();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn shallow_size_of_primitives() {
        assert_eq!(shallow_size(&0u8, &0u8), 2);
        assert_eq!(shallow_size(&0u64, &[0f64; 4]), 40);
    }

    #[test]
    fn serialized_size_tracks_payload_length() {
        let short = serialized_size("k", "v");
        let long = serialized_size("k", &"v".repeat(100));
        assert_eq!(short, 6);
        assert_eq!(long, 3 + 102);
    }

    #[test]
    fn unencodable_values_fall_back_to_shallow_size() {
        let mut map: HashMap<(u8, u8), u8> = HashMap::new();
        map.insert((1, 2), 3);
        let size = serialized_size(&1u8, &map);
        assert_eq!(size, 1 + std::mem::size_of::<HashMap<(u8, u8), u8>>());
    }
}
