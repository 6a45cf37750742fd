//! Counting semaphores with signed blocking semantics.
//!
//! The counter's sign carries the blocking state: nonnegative counts
//! available permits, negative counts parked waiters. `pend_step`/
//! `post_step` are the pure counter arithmetic; `apply_pend`/`apply_post`
//! additionally thread that decision through the TCB table to mark or wake
//! a task. None of this acquires an atomic section or talks to the
//! dispatcher — callers in `kernel::api` do both around these functions,
//! which is also what makes the counter/table bookkeeping itself directly
//! testable on a host.

use core::cell::UnsafeCell;

use crate::tcb::TaskTable;

/// A signed counting semaphore. `'static` and address-stable: its address
/// doubles as the identity a blocked task's `blocked` field records.
pub struct Semaphore {
    value: UnsafeCell<i32>,
}

// SAFETY: all access goes through `with_interrupts_disabled`-guarded
// callers in `kernel::api`; the type itself has no further synchronization.
unsafe impl Sync for Semaphore {}

impl Semaphore {
    pub const fn new(initial: i32) -> Self {
        Self {
            value: UnsafeCell::new(initial),
        }
    }

    /// Resets the counter. Must only be called before `start()`.
    pub fn init(&self, value: i32) {
        unsafe {
            *self.value.get() = value;
        }
    }

    pub fn value(&self) -> i32 {
        unsafe { *self.value.get() }
    }

    /// Stable identity used to match a task's `blocked` field against this
    /// semaphore.
    pub fn id(&self) -> usize {
        self as *const Self as usize
    }

    fn counter_mut(&self) -> &mut i32 {
        unsafe { &mut *self.value.get() }
    }
}

impl Default for Semaphore {
    fn default() -> Self {
        Self::new(0)
    }
}

/// Decrements the counter; returns `true` if the result is negative and the
/// caller must therefore block.
pub(crate) fn pend_step(sem: &Semaphore) -> bool {
    let counter = sem.counter_mut();
    *counter -= 1;
    *counter < 0
}

/// Increments the counter; returns `true` if a blocked task should be
/// woken (result is `<= 0`, meaning at least one waiter was counted).
pub(crate) fn post_step(sem: &Semaphore) -> bool {
    let counter = sem.counter_mut();
    *counter += 1;
    *counter <= 0
}

/// Finds the first task parked on `sem_id`, walking the circular list once
/// from `start`.
pub(crate) fn find_waiter(tasks: &TaskTable, start: usize, sem_id: usize) -> Option<usize> {
    let mut found = None;
    tasks.for_each_from(start, |idx, tcb| {
        if found.is_none() && tcb.blocked == Some(sem_id) {
            found = Some(idx);
        }
    });
    found
}

/// Applies a pend of `sem` against `tasks`. If the running task must
/// block, marks its `blocked` field and returns `true`; the caller is then
/// responsible for triggering a reschedule.
pub fn apply_pend(sem: &Semaphore, tasks: &mut TaskTable) -> bool {
    let blocks = pend_step(sem);
    if blocks {
        tasks.running_mut().blocked = Some(sem.id());
    }
    blocks
}

/// Applies a post of `sem` against `tasks`, waking the first waiter found
/// (if any) by clearing its `blocked` field. Does not itself request a
/// reschedule — see the Design Notes on post latency.
pub fn apply_post(sem: &Semaphore, tasks: &mut TaskTable) {
    if post_step(sem) {
        let start = tasks.get(tasks.running).next;
        if let Some(waiter) = find_waiter(tasks, start, sem.id()) {
            tasks.get_mut(waiter).blocked = None;
        }
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
    fn pend_below_zero_blocks() {
        let sem = Semaphore::new(0);
        let mut tasks = TaskTable::new();
        tasks.admit(entry, 0, 0).unwrap();
        assert!(apply_pend(&sem, &mut tasks));
        assert_eq!(sem.value(), -1);
        assert_eq!(tasks.running().blocked, Some(sem.id()));
    }

    #[test]
    fn pend_with_permits_does_not_block() {
        let sem = Semaphore::new(1);
        let mut tasks = TaskTable::new();
        tasks.admit(entry, 0, 0).unwrap();
        assert!(!apply_pend(&sem, &mut tasks));
        assert_eq!(sem.value(), 0);
        assert_eq!(tasks.running().blocked, None);
    }

    #[test]
    fn post_wakes_first_waiter_in_admission_order() {
        let sem = Semaphore::new(0);
        let mut tasks = TaskTable::new();
        tasks.admit(entry, 0, 0).unwrap(); // 0: will stay running
        tasks.admit(entry, 0, 0).unwrap(); // 1
        tasks.admit(entry, 0, 0).unwrap(); // 2

        tasks.get_mut(1).blocked = Some(sem.id());
        tasks.get_mut(2).blocked = Some(sem.id());
        sem.init(-2);

        apply_post(&sem, &mut tasks);
        assert_eq!(sem.value(), -1);
        assert_eq!(tasks.get(1).blocked, None);
        assert_eq!(tasks.get(2).blocked, Some(sem.id()));

        apply_post(&sem, &mut tasks);
        assert_eq!(sem.value(), 0);
        assert_eq!(tasks.get(2).blocked, None);
    }

    #[test]
    fn accounting_law_holds_across_a_history() {
        let sem = Semaphore::new(3);
        let mut tasks = TaskTable::new();
        tasks.admit(entry, 0, 0).unwrap();

        let mut posts = 0;
        let mut pends = 0;
        for _ in 0..5 {
            apply_pend(&sem, &mut tasks);
            pends += 1;
        }
        for _ in 0..2 {
            apply_post(&sem, &mut tasks);
            posts += 1;
        }
        assert_eq!(sem.value(), 3 + posts - pends);
    }
}
