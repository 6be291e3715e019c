//! Player score and remaining lives

use super::delegate::Delegate;
use tracing::debug;

/// Score and life count of the player, broadcast on every change
#[derive(Debug)]
pub struct PlayerStats {
    score: u32,
    life_count: u32,
    /// Carries the new score
    pub on_score_change: Delegate<u32>,
    /// Carries the new life count
    pub on_life_change: Delegate<u32>,
    pub on_out_of_lives: Delegate<()>,
}

impl PlayerStats {
    pub fn new(life_count: u32) -> Self {
        Self {
            score: 0,
            life_count,
            on_score_change: Delegate::new(),
            on_life_change: Delegate::new(),
            on_out_of_lives: Delegate::new(),
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn life_count(&self) -> u32 {
        self.life_count
    }

    pub fn is_out_of_lives(&self) -> bool {
        self.life_count == 0
    }

    /// Zero awards are ignored; the score saturates instead of wrapping.
    pub fn add_score(&mut self, amount: u32) {
        if amount == 0 {
            return;
        }
        self.score = self.score.saturating_add(amount);
        self.on_score_change.broadcast(&self.score);
    }

    pub fn add_life(&mut self, count: u32) {
        if count == 0 {
            return;
        }
        self.life_count = self.life_count.saturating_add(count);
        self.on_life_change.broadcast(&self.life_count);
    }

    /// Spend one life. Returns `false` if there was none left.
    pub fn lose_life(&mut self) -> bool {
        if self.life_count == 0 {
            return false;
        }
        self.life_count -= 1;
        debug!("Player lost a life ({} left)", self.life_count);
        self.on_life_change.broadcast(&self.life_count);
        if self.life_count == 0 {
            self.on_out_of_lives.broadcast(&());
        }
        true
    }
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self::new(3)
    }
}
