use std::alloc::{GlobalAlloc, Layout};

use crate::runtime;

/// Global allocator providing allocation statistics for
/// [`Store::register_runtime_metrics`](crate::Store::register_runtime_metrics).
///
/// ```
/// # use tally_core::AllocatorStats;
/// #[global_allocator]
/// static ALLOCATOR: AllocatorStats<std::alloc::System> = AllocatorStats::new(std::alloc::System);
/// ```
#[stability::unstable]
pub struct AllocatorStats<A> {
    inner: A,
}

impl<A> AllocatorStats<A> {
    /// Wraps a global allocator, instrumenting it with statistics.
    pub const fn new(inner: A) -> Self {
        Self { inner }
    }
}

// SAFETY: it only counts calls of an inner allocator, but does not change them.
unsafe impl<A> GlobalAlloc for AllocatorStats<A>
where
    A: GlobalAlloc,
{
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = self.inner.alloc(layout);
        if !ptr.is_null() {
            runtime::record_allocation(layout.size());
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        self.inner.dealloc(ptr, layout);
        runtime::record_deallocation(layout.size());
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        let ptr = self.inner.alloc_zeroed(layout);
        if !ptr.is_null() {
            runtime::record_allocation(layout.size());
        }
        ptr
    }

    // Accounted as a deallocation followed by an allocation.
    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let new_ptr = self.inner.realloc(ptr, layout, new_size);
        if !new_ptr.is_null() {
            runtime::record_deallocation(layout.size());
            runtime::record_allocation(new_size);
        }
        new_ptr
    }
}
