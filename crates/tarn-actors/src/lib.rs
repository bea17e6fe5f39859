//! Actors: the avatar state machine, the dyn actor registry, pickups,
//! projectiles, and the session-owned bookkeeping they mutate (save state,
//! scheduled events, input, audio seam).
#![forbid(unsafe_code)]

pub mod actor;
pub mod audio;
pub mod avatar;
pub mod enemy;
pub mod events;
pub mod input;
pub mod items;
pub mod projectiles;
pub mod state;

pub use actor::{
    Actor, ActorBase, ActorCtx, ActorFactory, ActorRegistry, SpawnInit, SpawnRequest, TouchResult,
};
pub use audio::{AudioSink, NullAudio, RecordingAudio};
pub use avatar::Avatar;
pub use events::{GameEvent, ScheduledEvents};
pub use input::{Button, InputState};
pub use state::SaveState;
