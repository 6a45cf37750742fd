//! Architecture-specific context-switch dispatcher (Cortex-M PendSV).
//!
//! The reference kernel this crate is descended from split this
//! responsibility out into a hand-maintained `context_switch.s` assembled
//! by a `cc` build script. That file never made it into this workspace, and
//! a vendored `.s` blob that nothing here can assemble or check is worse
//! than no dispatcher at all, so this keeps the same three jobs — one-time
//! bootstrap into the first task, PendSV register save/restore, and a way
//! to pend PendSV from task context — entirely in-crate using Rust's stable
//! naked-function support. Everything that isn't raw register shuffling is
//! an ordinary `extern "C"` Rust function PendSV calls back into.
//!
//! Not included in the host test surface (see `lib.rs`): none of this can
//! be exercised without real Cortex-M registers.

use core::arch::{asm, naked_asm};

use cortex_m::peripheral::scb::SystemHandler;
use cortex_m::peripheral::SCB;

use crate::sched;
use crate::{EVENTS, MILLIS, TASKS};

/// Pends PendSV so a context switch happens at the next opportunity: at
/// the end of the current exception (if called from one) or as soon as
/// the current task's priority allows (if called from task context).
pub fn request_reschedule() {
    SCB::set_pendsv();
    cortex_m::asm::isb();
}

/// Parks PendSV and SysTick at the two lowest exception priorities, PendSV
/// below SysTick, so neither ever preempts an ordinary interrupt and a
/// pending context switch always waits for the event tick's own bookkeeping
/// to finish first. Must run once, before any task or interrupt that could
/// call `request_reschedule`, and before `start_first_task`.
///
/// # Safety
/// Must be called at most once; it steals the `SCB` singleton rather than
/// threading `cortex_m::Peripherals` through the whole startup path, which
/// is only sound this early, before anything else has taken it.
pub unsafe fn configure_interrupt_priorities() {
    let mut scb = unsafe { cortex_m::Peripherals::steal() }.SCB;
    unsafe {
        scb.set_priority(SystemHandler::PendSV, 0xFF);
        scb.set_priority(SystemHandler::SysTick, 0xF0);
    }
}

/// Switches the processor onto the first admitted task's stack and jumps
/// to its entry point. Never returns.
///
/// `psp` must be the stack pointer `stack::init_task_stack` produced for
/// that task: it points at the synthetic R4-R11 block, with the hardware
/// frame (R0-R3, R12, LR, PC, xPSR) immediately above it.
///
/// # Safety
/// Must be called exactly once, with interrupts still globally disabled
/// and PendSV/SysTick already configured at their final priorities.
unsafe fn bootstrap(psp: *const u32) -> ! {
    unsafe {
        asm!(
            "adds r0, #32",    // skip the software-pushed R4-R11 block
            "msr psp, r0",
            "movs r0, #2",     // CONTROL.SPSEL = 1: Thread mode now runs on PSP
            "msr control, r0",
            "isb",
            "pop {{r0-r3, r12}}",
            "pop {{r4}}",      // discard synthetic LR
            "pop {{r5}}",      // task entry point
            "pop {{r6}}",      // discard synthetic xPSR; hardware holds the real one
            "cpsie i",
            "bx r5",
            in("r0") psp,
            options(noreturn),
        )
    }
}

/// Called once from `kernel::api::start`. Never returns.
///
/// # Safety
/// See `bootstrap`; additionally requires at least one task already
/// admitted into `TASKS`.
pub unsafe fn start_first_task() -> ! {
    // SAFETY: single-threaded at this point, before any interrupt is live.
    let tasks = unsafe { &mut *&raw mut TASKS };
    tasks.running = 0;
    let first = sched::dispatch(tasks);
    let sp = tasks.get(first).sp as *const u32;
    unsafe { bootstrap(sp) }
}

/// PendSV exception handler: performs the actual context switch.
///
/// Sequence: save R4-R11 onto the outgoing task's stack, store its updated
/// PSP into its TCB, run the scheduler, load the incoming task's PSP from
/// its TCB, restore R4-R11, and return from exception onto PSP.
#[unsafe(no_mangle)]
#[unsafe(naked)]
unsafe extern "C" fn PendSV() {
    naked_asm!(
        "mrs r0, psp",
        "stmdb r0!, {{r4-r11}}",
        "bl {save_context}",
        "bl {do_schedule}",
        "ldmia r0!, {{r4-r11}}",
        "msr psp, r0",
        "ldr r0, =0xFFFFFFFD",
        "bx r0",
        save_context = sym save_running_stack_pointer,
        do_schedule = sym select_and_load_next_stack_pointer,
    )
}

/// Stores the outgoing task's just-saved PSP into its TCB. Called only
/// from `PendSV`, with interrupts already effectively disabled by virtue
/// of running in exception context.
#[unsafe(no_mangle)]
extern "C" fn save_running_stack_pointer(psp: u32) {
    // SAFETY: exception context; no other code touches TASKS concurrently.
    let tasks = unsafe { &mut *&raw mut TASKS };
    tasks.running_mut().sp = psp;
}

/// Runs the scheduler and returns the incoming task's saved PSP. Called
/// only from `PendSV`.
#[unsafe(no_mangle)]
extern "C" fn select_and_load_next_stack_pointer() -> u32 {
    // SAFETY: exception context; no other code touches TASKS concurrently.
    let tasks = unsafe { &mut *&raw mut TASKS };
    let next = sched::dispatch(tasks);
    tasks.get(next).sp
}

/// SysTick exception handler: drives both the dispatch tick and, absent a
/// second independent interrupt source wired through a PAC (see
/// `SPEC_FULL.md` section 4.8), the event tick as well.
#[cortex_m_rt::exception]
fn SysTick() {
    // SAFETY: exception context; statics are only otherwise touched inside
    // atomic sections or other exception handlers that cannot preempt this
    // one (SysTick is configured at the lowest priority alongside PendSV).
    let (tasks, events, millis) = unsafe {
        (
            &mut *core::ptr::addr_of_mut!(TASKS),
            &*core::ptr::addr_of!(EVENTS),
            &mut *core::ptr::addr_of_mut!(MILLIS),
        )
    };
    crate::event::on_event_tick(tasks, events, millis);
    // Always offer the scheduler a chance to preempt, not only when an
    // event fired: this is also the dispatch tick, and round-robin
    // fairness among equal-priority tasks depends on it running every ms.
    request_reschedule();
}
