//! Kernel error kinds.
//!
//! Every other way to misuse this kernel (admitting a task after `start`,
//! pending from ISR context, an unregistered semaphore) is undefined
//! behavior by contract rather than a recoverable error; debug builds catch
//! what they cheaply can with `debug_assert!` instead of threading a
//! `Result` through every infallible call.

/// Errors returned by the kernel's two resource-exhaustion-prone
/// operations: task/event admission and FIFO enqueue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelError {
    /// `admit_task` or `admit_event` was called with its table already full.
    TableFull,
    /// `fifo_put` was called with the FIFO already at capacity.
    FifoFull,
}
