#![allow(dead_code)]

use drivers::exti::configure_gpio_interrupt;
use drivers::gpio::gpio_configure_mode;

pub const GPIO_MODE_INPUT: u32 = 0;
pub const EXTI_TRIGGER_FALLING: u32 = 1;

pub const PORTA: u32 = 0;
pub const BUTTON_PIN: u32 = 0;
pub const BUTTON_PORT: u32 = PORTA;

/// Configures the user button's pin as an input and routes its EXTI line
/// on a falling edge, so `main::EXTI0` fires on button press.
pub fn init_user_button() {
    gpio_configure_mode(BUTTON_PORT, BUTTON_PIN, GPIO_MODE_INPUT);
    configure_gpio_interrupt(BUTTON_PORT, BUTTON_PIN, EXTI_TRIGGER_FALLING);
}
