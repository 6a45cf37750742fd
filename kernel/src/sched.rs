//! Fixed-priority, round-robin-within-priority task selection.

use crate::tcb::TaskTable;

/// Selects the next runnable task.
///
/// The walk starts just past the currently running task and proceeds once
/// around the circular list. Among runnable tasks (`blocked == None` and
/// `sleep_ms == 0`), the numerically smallest priority wins; ties go to
/// whichever candidate the walk reaches first, which — combined with the
/// walk always starting at `running.next` — rotates equal-priority tasks
/// round-robin across successive calls.
pub fn select_next(tasks: &TaskTable) -> usize {
    let current = tasks.running;
    let start = tasks.get(current).next;
    let mut best: Option<(usize, u8)> = None;
    tasks.for_each_from(start, |idx, tcb| {
        if tcb.blocked.is_none() && tcb.sleep_ms == 0 {
            let is_better = match best {
                None => true,
                Some((_, best_priority)) => tcb.priority < best_priority,
            };
            if is_better {
                best = Some((idx, tcb.priority));
            }
        }
    });
    debug_assert!(
        best.is_some(),
        "scheduler found no runnable task; admit an idle task before start()"
    );
    best.map(|(idx, _)| idx).unwrap_or(current)
}

/// Runs task selection and commits the result as the new running task.
/// Returns the newly selected index.
pub fn dispatch(tasks: &mut TaskTable) -> usize {
    let next = select_next(tasks);
    tasks.running = next;
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> ! {
        loop {}
    }

    #[test]
    fn picks_highest_priority_runnable_task() {
        let mut tasks = TaskTable::new();
        tasks.admit(entry, 5, 0).unwrap(); // idle-ish, index 0
        tasks.admit(entry, 2, 0).unwrap(); // index 1, higher priority
        tasks.admit(entry, 3, 0).unwrap(); // index 2

        tasks.running = 0;
        assert_eq!(select_next(&tasks), 1);
    }

    #[test]
    fn skips_blocked_and_sleeping_tasks() {
        let mut tasks = TaskTable::new();
        tasks.admit(entry, 1, 0).unwrap(); // index 0
        tasks.admit(entry, 1, 0).unwrap(); // index 1
        tasks.get_mut(0).blocked = Some(0xdead);
        tasks.running = 1;
        assert_eq!(select_next(&tasks), 1);
    }

    #[test]
    fn equal_priority_rotates_round_robin() {
        let mut tasks = TaskTable::new();
        tasks.admit(entry, 1, 0).unwrap(); // 0
        tasks.admit(entry, 1, 0).unwrap(); // 1
        tasks.admit(entry, 1, 0).unwrap(); // 2

        tasks.running = 0;
        assert_eq!(dispatch(&mut tasks), 1);
        assert_eq!(dispatch(&mut tasks), 2);
        assert_eq!(dispatch(&mut tasks), 0);
    }

    #[test]
    fn falls_back_to_idle_when_everything_else_blocks() {
        let mut tasks = TaskTable::new();
        tasks.admit(entry, 254, 0).unwrap(); // idle, index 0
        tasks.admit(entry, 1, 0).unwrap(); // index 1
        tasks.get_mut(1).sleep_ms = 10;
        tasks.running = 0;
        assert_eq!(select_next(&tasks), 0);
    }
}
