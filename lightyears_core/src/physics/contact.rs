//! Contact events produced by a physics step

use crate::core::ActorId;
use slotmap::{Key, KeyData};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ContactKind {
    Begin,
    End,
}

/// Two actors whose bodies started or stopped overlapping
///
/// Transient: produced by [`PhysicsSystem::step`](super::PhysicsSystem::step)
/// and consumed by the world in the same frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactEvent {
    pub kind: ContactKind,
    pub actor_a: ActorId,
    pub actor_b: ActorId,
}

impl ContactEvent {
    /// The participant that is not `actor`, if `actor` is part of the contact
    pub fn other(&self, actor: ActorId) -> Option<ActorId> {
        if self.actor_a == actor {
            Some(self.actor_b)
        } else if self.actor_b == actor {
            Some(self.actor_a)
        } else {
            None
        }
    }
}

/// Encode an actor handle into rigid body user data
pub(crate) fn actor_to_user_data(actor: ActorId) -> u128 {
    actor.data().as_ffi() as u128
}

/// Decode rigid body user data written by [`actor_to_user_data`]
pub(crate) fn user_data_to_actor(user_data: u128) -> ActorId {
    KeyData::from_ffi(user_data as u64).into()
}
