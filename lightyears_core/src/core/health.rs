//! Health tracking with change notifications

use super::delegate::Delegate;

/// Payload of a health change
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthChange {
    /// Signed amount applied
    pub amount: f32,
    pub health: f32,
    pub max_health: f32,
}

#[derive(Debug)]
pub struct HealthComponent {
    health: f32,
    max_health: f32,
    pub on_health_changed: Delegate<HealthChange>,
    /// Carries the positive damage amount
    pub on_taken_damage: Delegate<f32>,
    pub on_health_empty: Delegate<()>,
}

impl HealthComponent {
    pub fn new(health: f32, max_health: f32) -> Self {
        Self {
            health: health.clamp(0.0, max_health),
            max_health,
            on_health_changed: Delegate::new(),
            on_taken_damage: Delegate::new(),
            on_health_empty: Delegate::new(),
        }
    }

    /// Apply a signed health delta.
    ///
    /// Zero deltas and changes to an already empty component are ignored.
    pub fn change_health(&mut self, amount: f32) {
        if amount == 0.0 || self.health <= 0.0 {
            return;
        }

        self.health = (self.health + amount).clamp(0.0, self.max_health);
        self.on_health_changed.broadcast(&HealthChange {
            amount,
            health: self.health,
            max_health: self.max_health,
        });

        if amount < 0.0 {
            self.on_taken_damage.broadcast(&-amount);
            if self.health <= 0.0 {
                self.on_health_empty.broadcast(&());
            }
        }
    }

    pub fn set_initial_health(&mut self, health: f32, max_health: f32) {
        self.max_health = max_health;
        self.health = health.clamp(0.0, max_health);
    }

    pub fn health(&self) -> f32 {
        self.health
    }

    pub fn max_health(&self) -> f32 {
        self.max_health
    }

    pub fn is_empty(&self) -> bool {
        self.health <= 0.0
    }
}

impl Default for HealthComponent {
    fn default() -> Self {
        Self::new(100.0, 100.0)
    }
}
