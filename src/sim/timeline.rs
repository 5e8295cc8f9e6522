//! Cursor-addressed step timelines
//!
//! A timeline is an ordered sequence of steps - immediate actions (`Do`) and
//! timed waits (`Wait`) - with an explicitly advanced cursor. Steps may be
//! inserted at arbitrary positions while the timeline is running, including
//! from inside an executing action, which is how the difficulty orchestrator
//! reschedules itself. The cursor is decoupled from iteration so mid-advance
//! mutation is well-defined: a step inserted right after the cursor runs
//! before anything that was already queued, and no step ever runs twice.
//!
//! Several independent timelines run concurrently (gameplay, messages, a pool
//! of transient camera effects). Each is advanced once per tick by its owner;
//! a `Wait` suspends only the timeline that issued it.

/// An action executed by a `Do` step. Receives the owning context and the
/// timeline itself, so it can insert follow-up steps or clear everything.
pub type Action<C> = Box<dyn FnOnce(&mut C, &mut Timeline<C>)>;

/// A single timeline step.
pub enum Step<C> {
    /// Executes once, immediately, consuming zero simulated time
    Do(Action<C>),
    /// Consumes the given number of frame units before the cursor moves on
    Wait(f32),
}

impl<C> Step<C> {
    /// Convenience constructor for `Do` steps
    pub fn run(f: impl FnOnce(&mut C, &mut Timeline<C>) + 'static) -> Self {
        Step::Do(Box::new(f))
    }
}

/// Internal slot. Executed `Do` actions are taken out of their slot, leaving
/// an inert marker so indices of later steps stay stable.
enum Slot<C> {
    Do(Option<Action<C>>),
    Wait { left: f32 },
}

impl<C> From<Step<C>> for Slot<C> {
    fn from(step: Step<C>) -> Self {
        match step {
            Step::Do(f) => Slot::Do(Some(f)),
            Step::Wait(frames) => Slot::Wait { left: frames },
        }
    }
}

/// An ordered, mutable step sequence with a movable cursor.
pub struct Timeline<C> {
    slots: Vec<Slot<C>>,
    index: usize,
    /// Bumped by `clear`, so an `advance` in progress can tell that the
    /// executing action reset the timeline under it.
    epoch: u64,
}

impl<C> Default for Timeline<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Timeline<C> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            index: 0,
            epoch: 0,
        }
    }

    /// Index of the step the cursor is at (next to execute or wait on)
    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// True when the cursor has moved past every step
    pub fn is_finished(&self) -> bool {
        self.index >= self.slots.len()
    }

    /// Add a step to the end
    pub fn append(&mut self, step: Step<C>) {
        self.slots.push(step.into());
    }

    pub fn append_do(&mut self, f: impl FnOnce(&mut C, &mut Timeline<C>) + 'static) {
        self.append(Step::run(f));
    }

    pub fn append_wait(&mut self, frames: f32) {
        self.append(Step::Wait(frames));
    }

    /// Insert a step at `index` (clamped to the end). Inserting strictly
    /// before the cursor shifts the cursor so the current step is neither
    /// skipped nor executed again; inserting at the cursor makes the new
    /// step the next to run.
    pub fn insert(&mut self, index: usize, step: Step<C>) {
        let index = index.min(self.slots.len());
        self.slots.insert(index, step.into());
        if index < self.index {
            self.index += 1;
        }
    }

    pub fn insert_do(&mut self, index: usize, f: impl FnOnce(&mut C, &mut Timeline<C>) + 'static) {
        self.insert(index, Step::run(f));
    }

    pub fn insert_wait(&mut self, index: usize, frames: f32) {
        self.insert(index, Step::Wait(frames));
    }

    /// Discard all steps and reset the cursor. The only cancellation
    /// mechanism; safe to call from inside an executing action.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.index = 0;
        self.epoch += 1;
    }

    /// Advance by `ft` frame units.
    ///
    /// Executes every `Do` up to the next unresolved `Wait`, in order. A
    /// `Wait` whose remaining duration is exhausted carries leftover time
    /// into the steps after it, so `Wait(1.0)` resolves exactly once 1.0
    /// frames have accumulated across calls.
    pub fn advance(&mut self, ctx: &mut C, ft: f32) {
        let mut remaining = ft;
        while self.index < self.slots.len() {
            // Take the action out of its slot before running it, so the
            // step sequence is free to be mutated underneath us.
            let action = match &mut self.slots[self.index] {
                Slot::Wait { left } => {
                    if *left > remaining {
                        *left -= remaining;
                        return;
                    }
                    remaining -= *left;
                    *left = 0.0;
                    None
                }
                Slot::Do(action) => action.take(),
            };

            if let Some(f) = action {
                let epoch = self.epoch;
                f(ctx, self);
                // A clear() inside the action already reset the cursor
                if self.epoch != epoch {
                    continue;
                }
            }
            self.index += 1;
        }
    }
}

/// A pool of independent timelines for transient effects (camera shake,
/// flashes). All are advanced together once per tick against a shared
/// context; finished timelines are dropped.
pub struct TimelinePool<C> {
    timelines: Vec<Timeline<C>>,
}

impl<C> Default for TimelinePool<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> TimelinePool<C> {
    pub fn new() -> Self {
        Self {
            timelines: Vec::new(),
        }
    }

    /// Hand out a fresh timeline owned by the pool
    pub fn acquire(&mut self) -> &mut Timeline<C> {
        self.timelines.push(Timeline::new());
        let last = self.timelines.len() - 1;
        &mut self.timelines[last]
    }

    /// Advance every pooled timeline and drop the ones that finished
    pub fn advance_all(&mut self, ctx: &mut C, ft: f32) {
        for tl in &mut self.timelines {
            tl.advance(ctx, ft);
        }
        self.timelines.retain(|tl| !tl.is_finished());
    }

    pub fn clear(&mut self) {
        self.timelines.clear();
    }

    pub fn len(&self) -> usize {
        self.timelines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timelines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test context: a log of executed step labels
    type Log = Vec<&'static str>;

    fn mark(label: &'static str) -> Step<Log> {
        Step::run(move |log: &mut Log, _| log.push(label))
    }

    #[test]
    fn test_do_steps_execute_in_order() {
        let mut tl = Timeline::new();
        tl.append(mark("a"));
        tl.append(mark("b"));
        tl.append(mark("c"));

        let mut log = Log::new();
        tl.advance(&mut log, 1.0);
        assert_eq!(log, vec!["a", "b", "c"]);
        assert!(tl.is_finished());
    }

    #[test]
    fn test_wait_blocks_exact_tick_count() {
        let mut tl = Timeline::new();
        tl.append(mark("before"));
        tl.append_wait(1.0);
        tl.append(mark("after"));

        let mut log = Log::new();
        tl.advance(&mut log, 0.5);
        assert_eq!(log, vec!["before"]);
        tl.advance(&mut log, 0.5);
        assert_eq!(log, vec!["before", "after"]);
    }

    #[test]
    fn test_leftover_time_carries_into_next_wait() {
        let mut tl = Timeline::new();
        tl.append_wait(1.0);
        tl.append(mark("first"));
        tl.append_wait(2.0);
        tl.append(mark("second"));

        let mut log = Log::new();
        // 1.5 frames: resolves the first wait, runs "first", eats 0.5 of the
        // second wait.
        tl.advance(&mut log, 1.5);
        assert_eq!(log, vec!["first"]);
        tl.advance(&mut log, 1.5);
        assert_eq!(log, vec!["first", "second"]);
    }

    #[test]
    fn test_insert_during_do_preempts_queued_steps() {
        let mut tl: Timeline<Log> = Timeline::new();
        tl.append_do(|log, tl| {
            log.push("outer");
            let at = tl.current_index() + 1;
            tl.insert_do(at, |log, _| log.push("inserted"));
        });
        tl.append(mark("queued"));

        let mut log = Log::new();
        tl.advance(&mut log, 1.0);
        assert_eq!(log, vec!["outer", "inserted", "queued"]);
    }

    #[test]
    fn test_reverse_insertion_order_like_retry_chain() {
        // Inserting three steps, each at cursor+1, yields reverse order
        // after the running step - the shape the side-change retry relies on.
        let mut tl: Timeline<Log> = Timeline::new();
        tl.append_do(|log, tl| {
            log.push("request");
            let at = tl.current_index() + 1;
            tl.insert_do(at, |log, _| log.push("third"));
            let at = tl.current_index() + 1;
            tl.insert_do(at, |log, _| log.push("second"));
            let at = tl.current_index() + 1;
            tl.insert_wait(at, 1.0);
        });

        let mut log = Log::new();
        tl.advance(&mut log, 0.5);
        assert_eq!(log, vec!["request"]);
        tl.advance(&mut log, 0.5);
        assert_eq!(log, vec!["request", "second", "third"]);
    }

    #[test]
    fn test_no_step_executes_twice() {
        let mut tl: Timeline<Log> = Timeline::new();
        for _ in 0..3 {
            tl.append_do(|log, tl| {
                log.push("step");
                let at = tl.current_index() + 1;
                tl.insert_do(at, |log, _| log.push("extra"));
            });
        }

        let mut log = Log::new();
        tl.advance(&mut log, 1.0);
        tl.advance(&mut log, 1.0);
        assert_eq!(
            log.iter().filter(|s| **s == "step").count(),
            3,
            "each appended step runs exactly once"
        );
        assert_eq!(log.iter().filter(|s| **s == "extra").count(), 3);
    }

    #[test]
    fn test_clear_from_inside_action() {
        let mut tl: Timeline<Log> = Timeline::new();
        tl.append_do(|log, tl| {
            log.push("clearing");
            tl.clear();
        });
        tl.append(mark("unreachable"));

        let mut log = Log::new();
        tl.advance(&mut log, 1.0);
        assert_eq!(log, vec!["clearing"]);
        assert!(tl.is_empty());
        assert_eq!(tl.current_index(), 0);
    }

    #[test]
    fn test_append_after_clear_runs_in_same_advance() {
        let mut tl: Timeline<Log> = Timeline::new();
        tl.append_do(|log, tl| {
            log.push("reset");
            tl.clear();
            tl.append_do(|log, _| log.push("fresh"));
        });

        let mut log = Log::new();
        tl.advance(&mut log, 1.0);
        assert_eq!(log, vec!["reset", "fresh"]);
    }

    #[test]
    fn test_independent_timelines_do_not_block_each_other() {
        let mut a: Timeline<Log> = Timeline::new();
        let mut b: Timeline<Log> = Timeline::new();
        a.append_wait(10.0);
        a.append(mark("a"));
        b.append(mark("b"));

        let mut log = Log::new();
        a.advance(&mut log, 1.0);
        b.advance(&mut log, 1.0);
        assert_eq!(log, vec!["b"]);
    }

    #[test]
    fn test_pool_drops_finished_timelines() {
        let mut pool: TimelinePool<Log> = TimelinePool::new();
        let tl = pool.acquire();
        tl.append(mark("short"));
        let tl = pool.acquire();
        tl.append_wait(5.0);
        tl.append(mark("long"));

        let mut log = Log::new();
        pool.advance_all(&mut log, 1.0);
        assert_eq!(pool.len(), 1);
        pool.advance_all(&mut log, 4.0);
        assert!(pool.is_empty());
        assert_eq!(log, vec!["short", "long"]);
    }

    #[test]
    fn test_wait_split_many_ways() {
        // Wait(3) split into uneven advances resolves exactly when the
        // accumulated time reaches 3 frames.
        let mut tl: Timeline<Log> = Timeline::new();
        tl.append_wait(3.0);
        tl.append(mark("done"));

        let mut log = Log::new();
        for ft in [0.25, 1.0, 0.75, 0.5] {
            tl.advance(&mut log, ft);
            assert!(log.is_empty());
        }
        tl.advance(&mut log, 0.5);
        assert_eq!(log, vec!["done"]);
    }
}
