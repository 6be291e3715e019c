//! Delayed and repeating callbacks driven by simulated time
//!
//! The manager only tracks time. Firing is done by the owner of the context
//! `C` (the world), which takes a due callback out, runs it with `&mut C`,
//! and hands it back. This lets callbacks mutate the structure that owns the
//! manager.

use super::actor::ActorId;
use slotmap::{new_key_type, SlotMap};
use std::fmt;

new_key_type! {
    /// Stable handle for a registered timer
    pub struct TimerHandle;
}

pub type TimerCallback<C> = Box<dyn FnMut(&mut C)>;

struct Timer<C> {
    owner: Option<ActorId>,
    callback: Option<TimerCallback<C>>,
    duration: f32,
    elapsed: f32,
    repeat: bool,
}

pub struct TimerManager<C> {
    timers: SlotMap<TimerHandle, Timer<C>>,
}

impl<C> TimerManager<C> {
    pub fn new() -> Self {
        Self {
            timers: SlotMap::with_key(),
        }
    }

    /// Register a timer firing after `duration` seconds.
    ///
    /// An `owner` ties the timer to an actor: once the actor is gone the
    /// timer is cleared instead of fired.
    pub fn set_timer(
        &mut self,
        owner: Option<ActorId>,
        duration: f32,
        repeat: bool,
        callback: impl FnMut(&mut C) + 'static,
    ) -> TimerHandle {
        self.timers.insert(Timer {
            owner,
            callback: Some(Box::new(callback)),
            duration: duration.max(0.0),
            elapsed: 0.0,
            repeat,
        })
    }

    pub fn clear_timer(&mut self, handle: TimerHandle) -> bool {
        self.timers.remove(handle).is_some()
    }

    pub fn is_active(&self, handle: TimerHandle) -> bool {
        self.timers.contains_key(handle)
    }

    pub fn owner(&self, handle: TimerHandle) -> Option<ActorId> {
        self.timers.get(handle).and_then(|timer| timer.owner)
    }

    /// Advance every timer and return the ones due this update.
    ///
    /// Repeating timers restart their countdown; one-shot timers stay
    /// registered until [`finish`](Self::finish) is called for them.
    pub fn update(&mut self, delta_time: f32) -> Vec<TimerHandle> {
        let mut due = Vec::new();
        for (handle, timer) in self.timers.iter_mut() {
            timer.elapsed += delta_time;
            if timer.elapsed >= timer.duration {
                if timer.repeat {
                    timer.elapsed -= timer.duration;
                }
                due.push(handle);
            }
        }
        due
    }

    pub fn take_callback(&mut self, handle: TimerHandle) -> Option<TimerCallback<C>> {
        self.timers.get_mut(handle)?.callback.take()
    }

    /// Return a fired callback. One-shot timers are removed here.
    pub fn finish(&mut self, handle: TimerHandle, callback: TimerCallback<C>) {
        match self.timers.get_mut(handle) {
            Some(timer) if timer.repeat => timer.callback = Some(callback),
            Some(_) => {
                self.timers.remove(handle);
            }
            None => {}
        }
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    pub fn clear(&mut self) {
        self.timers.clear();
    }
}

impl<C> Default for TimerManager<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for TimerManager<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerManager")
            .field("timers", &self.timers.len())
            .finish()
    }
}
