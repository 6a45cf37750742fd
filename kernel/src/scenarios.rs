//! End-to-end reproductions of the six documented scenarios (S1-S6),
//! driving `tcb`/`sched`/`semaphore`/`fifo`/`event` together the way the
//! real dispatcher would between two 1 kHz ticks, without any Cortex-M
//! register access. Each task's loop body is played out by hand at the
//! point its turn is selected: a dispatch that doesn't block keeps running
//! (a tight spin or a producer's burst), a dispatch that blocks ends that
//! task's turn until the next wake. This mirrors `kernel::dispatch`'s real
//! job — PendSV only runs between quanta, never in the middle of one — but
//! without the architecture-specific save/restore, which stays untested
//! here same as `sched`'s own unit tests.

use crate::error::KernelError;
use crate::event::{on_event_tick, EventTable};
use crate::fifo::Fifo;
use crate::sched::dispatch;
use crate::semaphore::{apply_pend, apply_post, Semaphore};
use crate::tcb::TaskTable;

fn entry() -> ! {
    loop {}
}

/// S1: a task pending a periodic event, counting wakeups.
#[test]
fn s1_periodic_event_count_within_bounds() {
    static SA: Semaphore = Semaphore::new(0);
    let mut tasks = TaskTable::new();
    let idle = tasks.admit(entry, 254, 0).unwrap();
    let a = tasks.admit(entry, 0, 0).unwrap();
    let mut events = EventTable::new();
    events.admit(&SA, 10).unwrap();

    tasks.running = a;
    apply_pend(&SA, &mut tasks); // A's loop body starts by pending SA
    tasks.running = idle;

    let mut millis = 0u32;
    let mut cnt_a = 0u32;
    for _ in 0..100 {
        on_event_tick(&mut tasks, &events, &mut millis);
        if dispatch(&mut tasks) == a {
            cnt_a += 1;
            apply_pend(&SA, &mut tasks);
        }
    }

    assert!((9..=10).contains(&cnt_a), "cnt_a = {cnt_a}");
}

/// S2: producer B posts SBC every 20 ms via `sleep`; consumer C pends SBC
/// and mirrors B's counter. No FIFO involved.
#[test]
fn s2_producer_consumer_without_fifo() {
    static SBC: Semaphore = Semaphore::new(0);
    let mut tasks = TaskTable::new();
    tasks.admit(entry, 254, 0).unwrap(); // idle
    let b = tasks.admit(entry, 1, 0).unwrap();
    let c = tasks.admit(entry, 2, 0).unwrap();
    let events = EventTable::new();

    let mut millis = 0u32;
    let mut cnt_b = 0u32;
    let mut cnt_c = 0u32;
    for _ in 0..100 {
        on_event_tick(&mut tasks, &events, &mut millis);
        loop {
            match dispatch(&mut tasks) {
                idx if idx == b => {
                    cnt_b += 1;
                    apply_post(&SBC, &mut tasks);
                    tasks.get_mut(b).sleep_ms = 20;
                }
                idx if idx == c => {
                    cnt_c = cnt_b;
                    if apply_pend(&SBC, &mut tasks) {
                        break;
                    }
                }
                _ => break,
            }
        }
    }

    assert_eq!(cnt_b, 5);
    assert_eq!(cnt_c, 5);
}

/// S3: producer D bursts 5 `fifo_put`s every 50 ms via `sleep`; consumer E
/// drains the FIFO via `fifo_get`, keeping the last value it saw.
#[test]
fn s3_fifo_producer_consumer() {
    let fifo: Fifo<8> = Fifo::new();
    fifo.init();
    let mut tasks = TaskTable::new();
    tasks.admit(entry, 254, 0).unwrap(); // idle
    let d = tasks.admit(entry, 3, 0).unwrap();
    let e = tasks.admit(entry, 4, 0).unwrap();
    let events = EventTable::new();

    let mut millis = 0u32;
    let mut item = 0u32;
    let mut cnt_e = 0u32;
    for _ in 0..100 {
        on_event_tick(&mut tasks, &events, &mut millis);
        loop {
            match dispatch(&mut tasks) {
                idx if idx == d => {
                    for _ in 0..5 {
                        item += 1;
                        fifo.try_put(item, &mut tasks).unwrap();
                    }
                    tasks.get_mut(d).sleep_ms = 50;
                }
                idx if idx == e => {
                    if fifo.pend_size(&mut tasks) {
                        break;
                    }
                    cnt_e = fifo.take();
                }
                _ => break,
            }
        }
    }

    assert_eq!(cnt_e, 10);
    assert!(fifo.len() <= 5, "fifo.len() = {}", fifo.len());
}

/// S4: F spins at low priority while A pends a periodic event at the
/// highest priority. A must preempt F on every wakeup and F must keep
/// advancing the rest of the time.
#[test]
fn s4_priority_preemption_across_event_window() {
    static SA: Semaphore = Semaphore::new(0);
    let mut tasks = TaskTable::new();
    let idle = tasks.admit(entry, 254, 0).unwrap();
    let a = tasks.admit(entry, 0, 0).unwrap();
    let f = tasks.admit(entry, 5, 0).unwrap();
    let mut events = EventTable::new();
    events.admit(&SA, 10).unwrap();

    tasks.running = a;
    apply_pend(&SA, &mut tasks);
    tasks.running = idle;

    let mut millis = 0u32;
    let mut cnt_a = 0u32;
    let mut cnt_f = 0u32;
    let mut cnt_f_at_last_wake = 0u32;
    for tick in 1..=100u32 {
        on_event_tick(&mut tasks, &events, &mut millis);
        let mut a_ran = false;
        loop {
            let next = dispatch(&mut tasks);
            if next == a {
                cnt_a += 1;
                a_ran = true;
                apply_pend(&SA, &mut tasks);
            } else {
                if next == f {
                    cnt_f += 1;
                }
                break;
            }
        }
        if a_ran {
            assert!(
                cnt_f > cnt_f_at_last_wake,
                "F did not resume before A's wakeup at tick {tick}"
            );
            cnt_f_at_last_wake = cnt_f;
        }
    }

    assert_eq!(cnt_a, 10);
    assert_eq!(cnt_f, 100);
}

/// S5: with no consumer admitted, a FIFO of capacity 10 accepts exactly 10
/// puts before rejecting the 11th.
#[test]
fn s5_fifo_full_at_capacity() {
    let fifo: Fifo<10> = Fifo::new();
    fifo.init();
    let mut tasks = TaskTable::new();
    tasks.admit(entry, 0, 0).unwrap();

    for i in 0..10u32 {
        assert_eq!(fifo.try_put(i, &mut tasks), Ok(()));
    }
    assert_eq!(fifo.try_put(10, &mut tasks), Err(KernelError::FifoFull));
    assert_eq!(fifo.len(), 10);
}

/// S6: a task sleeping for N ms becomes runnable after N or N+1 event-tick
/// decrements, never fewer and never more than one extra.
#[test]
fn s6_sleep_precision_bound() {
    let mut tasks = TaskTable::new();
    tasks.admit(entry, 254, 0).unwrap(); // idle
    let t = tasks.admit(entry, 0, 0).unwrap();
    let events = EventTable::new();
    const N: u32 = 37;
    tasks.get_mut(t).sleep_ms = N;

    let mut millis = 0u32;
    let mut ticks = 0u32;
    loop {
        on_event_tick(&mut tasks, &events, &mut millis);
        ticks += 1;
        if tasks.get(t).sleep_ms == 0 {
            break;
        }
    }

    assert!((N..=N + 1).contains(&ticks), "observed {ticks} ticks for sleep({N})");
}
