#![allow(dead_code)]


use crate:: stm32f407_registers::*;
use crate::read_write::{read_register, write_register};


/// Enables the IRQ for the given IRQ number by setting the appropriate
/// bit in the NVIC ISER register.
///
/// # Parameters
/// - `irq_number`: The IRQ number to enable.
///
/// # Safety
/// Assumes `irq_number` is valid and within NVIC supported IRQ range.
pub fn enable_irq(irq_number: u32) {
    let register_offset = (irq_number / 32) * 4;
    let bit_position = irq_number % 32;
    let iser_addr = (NVIC_ISER + register_offset) as *mut u32;
    unsafe {
        let mut value = read_register(iser_addr);
        value |= 1 << bit_position;
        write_register(iser_addr, value);
    }
}


/// Function name: set_interrupt_priority
///
/// Description:
/// Sets the priority level of a specific IRQ number in the NVIC (Nested Vectored Interrupt Controller).
/// Lower numerical values correspond to higher priority (0 = highest priority).
/// STM32F407 supports 4 bits of priority (0..15) by default, but actual implemented bits may vary.
///
/// # Safety
/// - Caller must ensure `irq_number` is valid and corresponds to an IRQ supported by the MCU.
/// - `priority` must be within the valid priority range supported by the device (usually 0..15).
///
/// # Parameters
/// - `irq_number`: The IRQ number to set priority for.
/// - `priority`: The priority value to assign (lower is higher priority).
///
/// # Return
/// - None
pub fn set_interrupt_priority(irq_number: u32, priority: u8) {
    
    if irq_number >= 240 {
        panic!("Invalid IRQ number");
    }
    let ipr_addr = (NVIC_IPR + irq_number) as *mut u8;

    unsafe {
        // Priority registers are 8-bit wide; STM32F407 uses upper 4 bits for priority
        let priority_value = priority << 4;
        write_register(ipr_addr as *mut u32, priority_value as u32);
    }
}
