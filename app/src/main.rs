#![no_std]
#![no_main]

mod button;
mod led;

use core::sync::atomic::{AtomicU32, Ordering};

use cortex_m_rt::entry;
use defmt_semihosting as _;
use panic_halt as _;

use drivers::systick::SysTick;
use kernel::config::{DISPATCH_TICK_HZ, FIFO_CAPACITY, IDLE_TASK_PRIORITY, TASK_STACK_WORDS};
use kernel::fifo::Fifo;
use kernel::semaphore::Semaphore;
use kernel::stack::Stack;

use crate::led::{init_led, led1_toggle, led2_toggle, led3_toggle, led4_toggle};

/// STM32F407 core clock, assuming the default HSI-derived reset
/// configuration (no PLL setup performed anywhere in this demo).
const CORE_CLOCK_MHZ: u32 = 16;

// ---------------------------------------------------------------------
// Scenario state
//
// SA / periodic_counter demonstrate a task driven purely by a periodic
// event (SPEC_FULL.md S1). PRODUCER_SEM / CONSUMER_COUNT demonstrate a
// sleep-paced producer waking a consumer (S2). FIFO / FIFO_LAST
// demonstrate the bounded global FIFO (S3). BUTTON_SEM demonstrates a
// post issued from interrupt context.
// ---------------------------------------------------------------------

static PERIODIC_SEM: Semaphore = Semaphore::new(0);
static PERIODIC_COUNT: AtomicU32 = AtomicU32::new(0);

static PRODUCER_SEM: Semaphore = Semaphore::new(0);
static PRODUCER_COUNT: AtomicU32 = AtomicU32::new(0);
static CONSUMER_COUNT: AtomicU32 = AtomicU32::new(0);

static FIFO: Fifo<FIFO_CAPACITY> = Fifo::new();
static FIFO_LAST: AtomicU32 = AtomicU32::new(0);

static BUTTON_SEM: Semaphore = Semaphore::new(0);

static IDLE_STACK: Stack<TASK_STACK_WORDS> = Stack::new();
static PERIODIC_STACK: Stack<TASK_STACK_WORDS> = Stack::new();
static PRODUCER_STACK: Stack<TASK_STACK_WORDS> = Stack::new();
static CONSUMER_STACK: Stack<TASK_STACK_WORDS> = Stack::new();
static FIFO_PRODUCER_STACK: Stack<TASK_STACK_WORDS> = Stack::new();
static FIFO_CONSUMER_STACK: Stack<TASK_STACK_WORDS> = Stack::new();
static BUTTON_TASK_STACK: Stack<TASK_STACK_WORDS> = Stack::new();

#[entry]
fn main() -> ! {
    init_led();
    button::init_user_button();

    kernel::api::sem_init(&PERIODIC_SEM, 0);
    kernel::api::sem_init(&PRODUCER_SEM, 0);
    kernel::api::sem_init(&BUTTON_SEM, 0);
    kernel::api::fifo_init(&FIFO);

    // SAFETY: each stack is a distinct `'static` and admitted exactly once,
    // before `start()`.
    unsafe {
        kernel::api::admit_task(idle_task, IDLE_TASK_PRIORITY, IDLE_STACK.top())
            .expect("idle task admission");
        kernel::api::admit_task(periodic_task, 1, PERIODIC_STACK.top())
            .expect("periodic task admission");
        kernel::api::admit_task(producer_task, 2, PRODUCER_STACK.top())
            .expect("producer task admission");
        kernel::api::admit_task(consumer_task, 3, CONSUMER_STACK.top())
            .expect("consumer task admission");
        kernel::api::admit_task(fifo_producer_task, 4, FIFO_PRODUCER_STACK.top())
            .expect("fifo producer task admission");
        kernel::api::admit_task(fifo_consumer_task, 5, FIFO_CONSUMER_STACK.top())
            .expect("fifo consumer task admission");
        kernel::api::admit_task(button_task, 0, BUTTON_TASK_STACK.top())
            .expect("button task admission");
    }

    kernel::api::admit_event(&PERIODIC_SEM, 10).expect("periodic event admission");

    let mut systick = SysTick::take().expect("SysTick already taken");
    systick.init_systic_interrupt_ms(1_000 / DISPATCH_TICK_HZ, CORE_CLOCK_MHZ);

    defmt::info!("starting scheduler with 7 tasks");
    kernel::api::start();
}

/// Never blocks or sleeps, so the scheduler always has somewhere to fall
/// back to (SPEC_FULL.md section 4.3's resolution of the "no runnable
/// task" question).
fn idle_task() -> ! {
    loop {
        led1_toggle();
    }
}

/// Driven entirely by the periodic event admitted in `main`: wakes every
/// 10 ms without ever calling `sleep` itself.
fn periodic_task() -> ! {
    loop {
        kernel::api::pend(&PERIODIC_SEM);
        PERIODIC_COUNT.fetch_add(1, Ordering::Relaxed);
        led2_toggle();
    }
}

/// Paces itself with `sleep` and posts a semaphore for `consumer_task`.
fn producer_task() -> ! {
    loop {
        kernel::api::sleep(20);
        PRODUCER_COUNT.fetch_add(1, Ordering::Relaxed);
        kernel::api::post(&PRODUCER_SEM);
    }
}

fn consumer_task() -> ! {
    loop {
        kernel::api::pend(&PRODUCER_SEM);
        CONSUMER_COUNT.store(PRODUCER_COUNT.load(Ordering::Relaxed), Ordering::Relaxed);
        led3_toggle();
    }
}

/// Every 50 ms, pushes a small burst of values into the global FIFO.
fn fifo_producer_task() -> ! {
    let mut next: u32 = 0;
    loop {
        kernel::api::sleep(50);
        for _ in 0..5 {
            match kernel::api::fifo_put(&FIFO, next) {
                Ok(()) => next = next.wrapping_add(1),
                Err(kernel::KernelError::FifoFull) => break,
                Err(_) => unreachable!(),
            }
        }
    }
}

fn fifo_consumer_task() -> ! {
    loop {
        let value = kernel::api::fifo_get(&FIFO);
        FIFO_LAST.store(value, Ordering::Relaxed);
        led4_toggle();
    }
}

/// Woken by `EXTI0`'s post, demonstrating a semaphore signaled from
/// interrupt context rather than another task.
fn button_task() -> ! {
    loop {
        kernel::api::pend(&BUTTON_SEM);
        defmt::info!("button pressed");
    }
}

/// The user button's EXTI line, once wired into the vector table by a
/// linker script targeting a real STM32F407 (out of scope here per
/// SPEC_FULL.md section 1 — no peripheral-access crate is in this
/// workspace to generate one), posts `BUTTON_SEM` from interrupt context.
#[allow(non_snake_case)]
#[unsafe(no_mangle)]
extern "C" fn EXTI0() {
    drivers::exti::clear_exti_pending(0);
    kernel::api::post(&BUTTON_SEM);
}
