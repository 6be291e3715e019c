//! Game stages: sequential phases of a level (waves, pauses, boss fights)

use super::World;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    Running,
    Finished,
}

/// One phase in the world's stage queue
///
/// The front stage of the queue is started when it becomes current, ticked
/// once per world tick, and popped when it reports [`StageStatus::Finished`].
pub trait GameStage {
    fn name(&self) -> &str {
        "stage"
    }

    fn start_stage(&mut self, _world: &mut World) {}

    fn tick_stage(&mut self, world: &mut World, delta_time: f32) -> StageStatus;

    fn stage_finished(&mut self, _world: &mut World) {}
}

/// Stage that does nothing for a fixed amount of simulated time
#[derive(Debug, Clone)]
pub struct WaitStage {
    duration: f32,
    elapsed: f32,
}

impl WaitStage {
    pub fn new(duration: f32) -> Self {
        Self {
            duration,
            elapsed: 0.0,
        }
    }

    pub fn remaining(&self) -> f32 {
        (self.duration - self.elapsed).max(0.0)
    }
}

impl GameStage for WaitStage {
    fn name(&self) -> &str {
        "wait"
    }

    fn start_stage(&mut self, _world: &mut World) {
        self.elapsed = 0.0;
    }

    fn tick_stage(&mut self, _world: &mut World, delta_time: f32) -> StageStatus {
        self.elapsed += delta_time;
        if self.elapsed >= self.duration {
            StageStatus::Finished
        } else {
            StageStatus::Running
        }
    }
}
