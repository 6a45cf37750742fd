//! Compile-time configuration for the scheduler core.
//!
//! These constants size every fixed-capacity table the kernel owns. To
//! retarget this kernel to a different MCU or workload, change the numbers
//! below and re-check that the combined task-stack footprint
//! (`MAX_TASKS * TASK_STACK_WORDS * 4` bytes) still fits the target's RAM
//! alongside whatever the `drivers`/`app` crates also place in SRAM.

/// Maximum number of tasks that can ever be admitted, including the idle
/// task. Admission past this limit fails with `KernelError::TableFull`.
pub const MAX_TASKS: usize = 8;

/// Maximum number of periodic events (ECBs) that can be admitted.
pub const MAX_EVENTS: usize = 8;

/// Size of each task's private stack, in 32-bit words.
pub const TASK_STACK_WORDS: usize = 256; // 1 KiB

/// Capacity, in 32-bit words, of the single global FIFO.
pub const FIFO_CAPACITY: usize = 16;

/// Frequency of the dispatch tick that drives scheduler preemption.
pub const DISPATCH_TICK_HZ: u32 = 1_000;

/// Frequency of the event tick that drives sleep accounting and periodic
/// semaphore posts.
pub const EVENT_TICK_HZ: u32 = 1_000;

/// Priority assigned to the mandatory idle task. Numerically the lowest
/// possible priority, so any other admitted task preempts it.
pub const IDLE_TASK_PRIORITY: u8 = 254;
