#![allow(dead_code)]

/// # TIM2 Event-Tick Driver
///
/// Configures the STM32F407's TIM2 general-purpose timer as a periodic
/// interrupt source, the register-level equivalent of `Timer_WTimer5A_init`
/// / `Timer_WTimer5A_clear_irq` from the reference kernel's wide-timer
/// driver: enable the peripheral clock, program a reload value for the
/// desired period, arm the update-event interrupt, prioritize it in the
/// NVIC, and enable the counter.
///
/// This module is a real, wireable hardware collaborator for the kernel's
/// event tick; the demonstration `app` does not enable TIM2's NVIC vector
/// because doing so on a `cortex-m-rt` binary with no peripheral-access
/// crate would require hand-authoring the vector table slot for IRQ 28,
/// which cannot be checked without a device. See `SPEC_FULL.md` section
/// 4.8.
use crate::cortex_m4::{enable_irq, set_interrupt_priority};
use crate::read_write::{read_register, reg_write_bit, write_register};
use crate::stm32f407_registers::{
    RCC_APB1ENR_OFFSET, RCC_APB1ENR_TIM2EN_BIT, RCC_BASE, TIM2_BASE, TIM2_IRQN,
};

/// Priority TIM2's update-event interrupt is parked at, on this device's
/// 4-implemented-priority-bit NVIC (0..15, lower is higher priority): one
/// step above PendSV/SysTick, which both collapse to priority 15 on this
/// scale (see `kernel::dispatch::configure_interrupt_priorities`), so the
/// event tick always preempts a pending context switch, never the reverse.
const TIM2_NVIC_PRIORITY: u8 = 14;

const TIM_CR1_OFFSET: u32 = 0x00;
const TIM_DIER_OFFSET: u32 = 0x0C;
const TIM_SR_OFFSET: u32 = 0x10;
const TIM_PSC_OFFSET: u32 = 0x28;
const TIM_ARR_OFFSET: u32 = 0x2C;

const TIM_CR1_CEN_BIT: u32 = 0;
const TIM_DIER_UIE_BIT: u32 = 0;
const TIM_SR_UIF_BIT: u32 = 0;

/// Enables TIM2's peripheral clock and programs it to overflow every
/// `period_ticks` counter ticks (at the APB1 timer clock, undivided).
///
/// # Safety
/// Must be called with TIM2 not already owned by other code.
pub unsafe fn init(period_ticks: u32) {
    unsafe {
        let rcc_apb1enr = (RCC_BASE + RCC_APB1ENR_OFFSET) as *mut u32;
        reg_write_bit(rcc_apb1enr, RCC_APB1ENR_TIM2EN_BIT, true);

        let cr1 = (TIM2_BASE + TIM_CR1_OFFSET) as *mut u32;
        reg_write_bit(cr1, TIM_CR1_CEN_BIT, false);

        write_register((TIM2_BASE + TIM_PSC_OFFSET) as *mut u32, 0);
        write_register((TIM2_BASE + TIM_ARR_OFFSET) as *mut u32, period_ticks - 1);
        write_register((TIM2_BASE + TIM_SR_OFFSET) as *mut u32, 0);

        let dier = (TIM2_BASE + TIM_DIER_OFFSET) as *mut u32;
        reg_write_bit(dier, TIM_DIER_UIE_BIT, true);

        set_interrupt_priority(TIM2_IRQN, TIM2_NVIC_PRIORITY);
        enable_irq(TIM2_IRQN);

        reg_write_bit(cr1, TIM_CR1_CEN_BIT, true);
    }
}

/// Clears TIM2's update-event pending flag. Call at the top of its
/// interrupt handler before touching kernel state.
pub fn clear_pending() {
    unsafe {
        let sr = (TIM2_BASE + TIM_SR_OFFSET) as *mut u32;
        let value = read_register(sr) & !(1 << TIM_SR_UIF_BIT);
        write_register(sr, value);
    }
}
