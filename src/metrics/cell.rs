use std::cell::Cell;

/// Counter bumped from `&self` read paths (e.g. `MembershipFilter::contains`).
///
/// Plain `Cell`, so owners are `Send` but not `Sync`; share an instance across
/// threads behind a lock.
#[repr(transparent)]
#[derive(Debug, Default, Clone)]
pub struct MetricsCell(Cell<u64>);

impl MetricsCell {
    #[inline]
    pub fn new(value: u64) -> Self {
        Self(Cell::new(value))
    }

    #[inline]
    pub fn get(&self) -> u64 {
        self.0.get()
    }

    #[inline]
    pub fn incr(&self) {
        self.0.set(self.0.get().saturating_add(1));
    }

    #[inline]
    pub fn reset(&self) {
        self.0.set(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incr_and_reset() {
        let cell = MetricsCell::default();
        cell.incr();
        cell.incr();
        assert_eq!(cell.get(), 2);
        cell.reset();
        assert_eq!(cell.get(), 0);
        assert_eq!(MetricsCell::new(u64::MAX).get(), u64::MAX);
    }
}
