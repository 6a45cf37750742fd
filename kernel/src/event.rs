//! Sleep accounting and periodic-event (ECB) bookkeeping, driven from the
//! 1 kHz event tick.

use crate::config::MAX_EVENTS;
use crate::error::KernelError;
use crate::semaphore::{apply_post, Semaphore};
use crate::tcb::TaskTable;

/// A periodic event: post `semaphore` every `period_ms` milliseconds.
/// `period_ms == 0` marks an unused slot.
#[derive(Clone, Copy)]
pub struct Ecb {
    pub semaphore: &'static Semaphore,
    pub period_ms: u32,
}

/// Fixed-size table of admitted ECBs.
pub struct EventTable {
    events: [Option<Ecb>; MAX_EVENTS],
    len: usize,
}

impl EventTable {
    pub const fn new() -> Self {
        const NONE: Option<Ecb> = None;
        Self {
            events: [NONE; MAX_EVENTS],
            len: 0,
        }
    }

    /// Admits a new periodic event. Must be called before `start()`.
    pub fn admit(&mut self, semaphore: &'static Semaphore, period_ms: u32) -> Result<(), KernelError> {
        if self.len >= MAX_EVENTS {
            return Err(KernelError::TableFull);
        }
        self.events[self.len] = Some(Ecb { semaphore, period_ms });
        self.len += 1;
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ecb> {
        self.events[..self.len].iter().filter_map(Option::as_ref)
    }
}

impl Default for EventTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Decrements every admitted task's sleep counter by one tick. Must run
/// before `post_due_events` within the same tick: a task whose sleep
/// expires on the tick an event it awaits is posted must already be
/// runnable when that post's wake-search runs.
pub fn decrement_sleep(tasks: &mut TaskTable) {
    for idx in 0..tasks.len() {
        let tcb = tasks.get_mut(idx);
        if tcb.sleep_ms > 0 {
            tcb.sleep_ms -= 1;
        }
    }
}

/// Posts every ECB whose period divides `millis`. Returns `true` if any
/// semaphore was posted.
pub fn post_due_events(events: &EventTable, millis: u32, tasks: &mut TaskTable) -> bool {
    let mut posted = false;
    for ecb in events.iter() {
        if ecb.period_ms != 0 && millis % ecb.period_ms == 0 {
            apply_post(ecb.semaphore, tasks);
            posted = true;
        }
    }
    posted
}

/// Advances the millisecond counter by one tick with wrapping arithmetic.
/// Returns the new value, or `None` on the single tick where the counter
/// wraps to zero — on that tick the caller must skip the due-event check
/// entirely, mirroring the source kernel's `if (++millis)` guard rather
/// than spuriously firing every zero-divisible event. This loses at most
/// one event dispatch roughly every 49.7 days of continuous uptime.
pub fn advance_millis(millis: &mut u32) -> Option<u32> {
    *millis = millis.wrapping_add(1);
    if *millis == 0 {
        None
    } else {
        Some(*millis)
    }
}

/// Runs one full event tick: sleep decrement, counter advance, and
/// due-event posting. Returns `true` if the caller should request a
/// reschedule.
pub fn on_event_tick(tasks: &mut TaskTable, events: &EventTable, millis: &mut u32) -> bool {
    decrement_sleep(tasks);
    match advance_millis(millis) {
        Some(now) => post_due_events(events, now, tasks),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> ! {
        loop {}
    }

    #[test]
    fn sleep_decrements_but_not_below_zero() {
        let mut tasks = TaskTable::new();
        tasks.admit(entry, 0, 0).unwrap();
        tasks.get_mut(0).sleep_ms = 1;
        decrement_sleep(&mut tasks);
        assert_eq!(tasks.get(0).sleep_ms, 0);
        decrement_sleep(&mut tasks);
        assert_eq!(tasks.get(0).sleep_ms, 0);
    }

    #[test]
    fn due_event_posts_on_matching_period() {
        static SEM: Semaphore = Semaphore::new(0);
        let mut events = EventTable::new();
        events.admit(&SEM, 10).unwrap();
        let mut tasks = TaskTable::new();
        tasks.admit(entry, 0, 0).unwrap();

        assert!(!post_due_events(&events, 9, &mut tasks));
        assert_eq!(SEM.value(), 0);
        assert!(post_due_events(&events, 10, &mut tasks));
        assert_eq!(SEM.value(), 1);
    }

    #[test]
    fn wraparound_tick_skips_due_check() {
        let mut millis = u32::MAX;
        assert_eq!(advance_millis(&mut millis), None);
        assert_eq!(millis, 0);
        assert_eq!(advance_millis(&mut millis), Some(1));
    }

    #[test]
    fn on_event_tick_orders_sleep_before_events() {
        static SEM: Semaphore = Semaphore::new(0);
        let mut events = EventTable::new();
        events.admit(&SEM, 1).unwrap();
        let mut tasks = TaskTable::new();
        tasks.admit(entry, 0, 0).unwrap();
        tasks.get_mut(0).sleep_ms = 1;
        tasks.get_mut(0).blocked = Some(SEM.id());

        let mut millis = 0;
        let reschedule = on_event_tick(&mut tasks, &events, &mut millis);
        assert!(reschedule);
        assert_eq!(tasks.get(0).sleep_ms, 0);
        assert_eq!(tasks.get(0).blocked, None);
    }
}
