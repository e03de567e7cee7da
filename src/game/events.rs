//! Game Events
//!
//! Side effects the player object asks the rest of the game to carry out:
//! sound cues, level transitions, deaths. Collected per tick and handed to
//! the caller in a stable order.

use serde::{Serialize, Deserialize};
use crate::game::level::LevelTransition;

/// Priority for event processing order.
///
/// Lower value = processed first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum EventPriority {
    /// Deaths processed first
    PlayerDeath = 0,
    /// Then level transitions
    LevelTransition = 1,
    /// Then mode switches
    ModeChange = 2,
    /// Then sound and music
    Audio = 3,
    /// Lowest priority
    Other = 255,
}

/// Sound effects and music commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundCue {
    /// Jump
    Jump,
    /// Skid on reversal
    Skid,
    /// Curl into a roll
    Roll,
    /// Generic death
    Death,
    /// Death on spikes
    HitSpikes,
    /// Level music after invincibility ends
    RestoreMusic,
    /// Music back to normal tempo after speed shoes
    MusicNormalSpeed,
}

/// What killed the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeathCause {
    /// Fell below the level
    Pit,
    /// Touched spikes
    Spikes,
    /// Touched a hazard or enemy without protection
    Hazard,
}

impl DeathCause {
    /// Sound played on death.
    pub const fn sound(self) -> SoundCue {
        match self {
            DeathCause::Spikes => SoundCue::HitSpikes,
            _ => SoundCue::Death,
        }
    }
}

/// Game event data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEventData {
    /// Play a sound or music command
    Sound {
        cue: SoundCue,
    },

    /// A level change was requested
    LevelTransition {
        transition: LevelTransition,
    },

    /// Player entered the death routine
    PlayerKilled {
        cause: DeathCause,
    },

    /// Debug placement mode toggled
    DebugMode {
        active: bool,
    },

    /// Sprite data could not be decoded; the object kept its last frame
    ResourceFault {
        message: String,
    },
}

impl GameEventData {
    /// Default priority for this kind of event.
    pub fn priority(&self) -> EventPriority {
        match self {
            GameEventData::PlayerKilled { .. } => EventPriority::PlayerDeath,
            GameEventData::LevelTransition { .. } => EventPriority::LevelTransition,
            GameEventData::DebugMode { .. } => EventPriority::ModeChange,
            GameEventData::Sound { .. } => EventPriority::Audio,
            GameEventData::ResourceFault { .. } => EventPriority::Other,
        }
    }
}

/// A game event with timing and priority.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameEvent {
    /// Tick when event occurred
    pub tick: u32,

    /// Processing priority
    pub priority: EventPriority,

    /// Object slot that raised it (for tie-breaking)
    pub slot: usize,

    /// Event data
    pub data: GameEventData,
}

impl GameEvent {
    /// Create a new event with the data's default priority.
    pub fn new(tick: u32, slot: usize, data: GameEventData) -> Self {
        Self {
            tick,
            priority: data.priority(),
            slot,
            data,
        }
    }
}

impl PartialEq for GameEvent {
    fn eq(&self, other: &Self) -> bool {
        self.tick == other.tick
            && self.priority == other.priority
            && self.slot == other.slot
    }
}

impl Eq for GameEvent {}

impl PartialOrd for GameEvent {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GameEvent {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Sort by: tick, then priority, then slot
        self.tick
            .cmp(&other.tick)
            .then(self.priority.cmp(&other.priority))
            .then(self.slot.cmp(&other.slot))
    }
}
