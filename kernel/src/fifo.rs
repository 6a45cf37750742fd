//! The kernel's single global bounded FIFO.
//!
//! Capacity and element type are fixed by the Data Model (32-bit words);
//! the ring buffer is generic over capacity only so tests can use a small
//! one without dragging `config::FIFO_CAPACITY` into the type signature
//! used throughout `kernel::api`.

use core::cell::UnsafeCell;

use crate::error::KernelError;
use crate::semaphore::{apply_pend, apply_post, Semaphore};
use crate::tcb::TaskTable;

/// A bounded ring buffer of `K` 32-bit words, sized by a counting
/// semaphore so pend/post bookkeeping (and blocking `get`) falls out of the
/// semaphore primitive for free.
pub struct Fifo<const K: usize> {
    buf: UnsafeCell<[u32; K]>,
    put_idx: UnsafeCell<usize>,
    get_idx: UnsafeCell<usize>,
    size: Semaphore,
}

// SAFETY: callers in `kernel::api` wrap every mutating call in an atomic
// section; see `kernel::critical`.
unsafe impl<const K: usize> Sync for Fifo<K> {}

impl<const K: usize> Fifo<K> {
    pub const fn new() -> Self {
        Self {
            buf: UnsafeCell::new([0; K]),
            put_idx: UnsafeCell::new(0),
            get_idx: UnsafeCell::new(0),
            size: Semaphore::new(0),
        }
    }

    /// Resets indices and the size semaphore. Must be called before
    /// `start()`.
    pub fn init(&self) {
        unsafe {
            *self.put_idx.get() = 0;
            *self.get_idx.get() = 0;
        }
        self.size.init(0);
    }

    /// Current number of enqueued items.
    pub fn len(&self) -> usize {
        self.size.value().max(0) as usize
    }

    /// Enqueues `data`, or returns `FifoFull` without blocking if the
    /// buffer is already at capacity `K`. Callable from task or ISR
    /// context; the caller must hold an atomic section so two producers
    /// never race the capacity check against the write.
    pub(crate) fn try_put(&self, data: u32, tasks: &mut TaskTable) -> Result<(), KernelError> {
        if self.size.value() as usize >= K {
            return Err(KernelError::FifoFull);
        }
        unsafe {
            let idx = *self.put_idx.get();
            (*self.buf.get())[idx] = data;
            *self.put_idx.get() = (idx + 1) % K;
        }
        apply_post(&self.size, tasks);
        Ok(())
    }

    /// Pends the size semaphore; the caller blocks (via `kernel::api`) if
    /// the FIFO was empty, then calls `take` once woken.
    pub(crate) fn pend_size(&self, tasks: &mut TaskTable) -> bool {
        apply_pend(&self.size, tasks)
    }

    /// Dequeues the oldest value. Only correct to call once a pend of the
    /// size semaphore has confirmed an item is available.
    pub(crate) fn take(&self) -> u32 {
        unsafe {
            let idx = *self.get_idx.get();
            let value = (*self.buf.get())[idx];
            *self.get_idx.get() = (idx + 1) % K;
            value
        }
    }
}

impl<const K: usize> Default for Fifo<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tcb::TaskTable;

    fn entry() -> ! {
        loop {}
    }

    #[test]
    fn put_then_take_round_trips_in_order() {
        let fifo: Fifo<4> = Fifo::new();
        fifo.init();
        let mut tasks = TaskTable::new();
        tasks.admit(entry, 0, 0).unwrap();

        fifo.try_put(10, &mut tasks).unwrap();
        fifo.try_put(20, &mut tasks).unwrap();
        assert_eq!(fifo.len(), 2);

        assert!(!fifo.pend_size(&mut tasks));
        assert_eq!(fifo.take(), 10);
        assert!(!fifo.pend_size(&mut tasks));
        assert_eq!(fifo.take(), 20);
    }

    #[test]
    fn full_fifo_rejects_further_puts() {
        let fifo: Fifo<2> = Fifo::new();
        fifo.init();
        let mut tasks = TaskTable::new();
        tasks.admit(entry, 0, 0).unwrap();

        fifo.try_put(1, &mut tasks).unwrap();
        fifo.try_put(2, &mut tasks).unwrap();
        assert_eq!(fifo.try_put(3, &mut tasks), Err(KernelError::FifoFull));
        assert_eq!(fifo.len(), 2);
    }

    #[test]
    fn get_on_empty_fifo_blocks_the_running_task() {
        let fifo: Fifo<2> = Fifo::new();
        fifo.init();
        let mut tasks = TaskTable::new();
        tasks.admit(entry, 0, 0).unwrap();

        assert!(fifo.pend_size(&mut tasks));
        assert!(tasks.running().blocked.is_some());
    }
}
