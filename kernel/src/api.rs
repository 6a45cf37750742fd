//! Public kernel API: Lifecycle, Tasking, Events, Semaphore, and FIFO.
//!
//! Thin glue over the pure logic in `tcb`/`sched`/`semaphore`/`fifo`/
//! `event`: every call here acquires an atomic section where the Design
//! says to, and a handful additionally trigger the dispatcher. None of
//! that is testable without real hardware (or at minimum an instruction-set
//! simulator), so unlike the modules it calls into, this one carries no
//! `#[cfg(test)]` tests of its own — it is reviewed by inspection, the way
//! the dispatcher it drives is.

use crate::critical::with_interrupts_disabled;
use crate::error::KernelError;
use crate::event::EventTable;
use crate::fifo::Fifo;
use crate::semaphore::{apply_pend, apply_post, Semaphore};
use crate::stack::init_task_stack;
use crate::tcb::TaskEntry;
use crate::{dispatch, EVENTS, TASKS};

// ---------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------

/// Starts the scheduler. Requires at least one admitted task (the kernel
/// itself does not supply an idle task; `app` admits one at
/// `config::IDLE_TASK_PRIORITY` before calling this). Never returns.
pub fn start() -> ! {
    debug_assert!(
        !unsafe { &*&raw const TASKS }.is_empty(),
        "start() called with no tasks admitted"
    );
    unsafe {
        dispatch::configure_interrupt_priorities();
        dispatch::start_first_task()
    }
}

// ---------------------------------------------------------------------
// Tasking
// ---------------------------------------------------------------------

/// Admits a new task, allocating it a slot in the global TCB table and
/// writing its initial stack frame. Must be called before `start()`.
///
/// # Safety
/// `stack_top` must point one-past-the-end of a region with at least
/// `config::TASK_STACK_WORDS` free words below it, owned exclusively by
/// this task for its entire lifetime.
pub unsafe fn admit_task(
    entry: TaskEntry,
    priority: u8,
    stack_top: *mut u32,
) -> Result<usize, KernelError> {
    // SAFETY: forwarded from this function's own contract.
    let sp = unsafe { init_task_stack(stack_top, entry) } as u32;
    with_interrupts_disabled(|| unsafe { (&mut *&raw mut TASKS).admit(entry, priority, sp) })
}

/// Voluntarily yields the CPU without sleeping; the running task remains
/// runnable and may be re-selected immediately if nothing else is ready.
pub fn suspend() {
    dispatch::request_reschedule();
}

/// Puts the running task to sleep for at least `ms` milliseconds (at most
/// one tick longer, per the event tick's granularity).
pub fn sleep(ms: u32) {
    with_interrupts_disabled(|| unsafe {
        (&mut *&raw mut TASKS).running_mut().sleep_ms = ms;
    });
    dispatch::request_reschedule();
}

// ---------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------

/// Admits a periodic event: `semaphore` is posted every `period_ms`
/// milliseconds once the kernel starts. Must be called before `start()`.
pub fn admit_event(semaphore: &'static Semaphore, period_ms: u32) -> Result<(), KernelError> {
    with_interrupts_disabled(|| unsafe { (&mut *&raw mut EVENTS).admit(semaphore, period_ms) })
}

// ---------------------------------------------------------------------
// Semaphore
// ---------------------------------------------------------------------

/// Initializes a semaphore's counter. Must be called before `start()` or
/// before the semaphore is shared with any other task.
pub fn sem_init(sem: &Semaphore, value: i32) {
    sem.init(value);
}

/// Decrements `sem`; blocks the running task if the result is negative.
/// Callable only from task context.
pub fn pend(sem: &Semaphore) {
    let blocks = with_interrupts_disabled(|| unsafe { apply_pend(sem, &mut *&raw mut TASKS) });
    if blocks {
        dispatch::request_reschedule();
    }
}

/// Increments `sem`, waking the first parked waiter if any. Callable from
/// task or ISR context. Does not itself force an immediate reschedule; see
/// the Design Notes on post latency.
pub fn post(sem: &Semaphore) {
    with_interrupts_disabled(|| unsafe { apply_post(sem, &mut *&raw mut TASKS) });
}

// ---------------------------------------------------------------------
// FIFO
// ---------------------------------------------------------------------

/// Resets a FIFO. Must be called before `start()`.
pub fn fifo_init<const K: usize>(fifo: &Fifo<K>) {
    fifo.init();
}

/// Enqueues `data` without blocking; returns `FifoFull` if already at
/// capacity. Callable from task or ISR context.
pub fn fifo_put<const K: usize>(fifo: &Fifo<K>, data: u32) -> Result<(), KernelError> {
    with_interrupts_disabled(|| unsafe { fifo.try_put(data, &mut *&raw mut TASKS) })
}

/// Dequeues the oldest value, blocking the running task if the FIFO is
/// empty. Callable only from task context.
pub fn fifo_get<const K: usize>(fifo: &Fifo<K>) -> u32 {
    let blocks = with_interrupts_disabled(|| unsafe { fifo.pend_size(&mut *&raw mut TASKS) });
    if blocks {
        dispatch::request_reschedule();
    }
    with_interrupts_disabled(|| fifo.take())
}
