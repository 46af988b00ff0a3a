//! A collection of utilities to share among tally-* crates.

use std::sync::atomic::{AtomicUsize, Ordering};

use derive_more::Deref;

pub mod time;

/// A wrapper type that aligns the inner value to the cache line size.
// Spatial prefetcher is now pulling two lines at a time, so we use `align(128)`.
#[cfg_attr(any(target_arch = "x86_64", target_arch = "aarch64"), repr(align(128)))]
#[cfg_attr(
    not(any(target_arch = "x86_64", target_arch = "aarch64")),
    repr(align(64))
)]
#[derive(Debug, Clone, Copy, Default, Hash, PartialEq, Eq, Deref)]
pub struct CachePadded<T>(pub T);

/// Returns a small sequential index of the current thread.
///
/// Indices are assigned on first use and never reused, so threads spawned
/// one after another spread over stripes evenly when taken modulo.
#[inline]
pub fn thread_index() -> usize {
    static NEXT: AtomicUsize = AtomicUsize::new(0);

    thread_local! {
        static INDEX: usize = NEXT.fetch_add(1, Ordering::Relaxed);
    }

    INDEX.with(|index| *index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thread_index_is_stable_and_unique() {
        let main = thread_index();
        assert_eq!(thread_index(), main);

        let other = std::thread::spawn(thread_index).join().unwrap();
        assert_ne!(other, main);
    }

    #[test]
    fn cache_padded_alignment() {
        let padded = CachePadded(1u64);
        assert!(std::mem::align_of_val(&padded) >= 64);
        assert_eq!(*padded, 1);
    }
}
