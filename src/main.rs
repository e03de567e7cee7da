//! Hedgehog Simulation Demo
//!
//! Runs the player over a small test level with scripted input, records the
//! pad, then replays the recording and checks that both runs end on the
//! same state hash.

use anyhow::{bail, Context, Result};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use hedgehog::{
    TICK_RATE, VERSION,
    core::vec2::FixedVec2,
    game::{
        events::GameEventData,
        input::{InputFrame, PlayerInputBuffer, BUTTON_A, BUTTON_LEFT, BUTTON_RIGHT},
        level::{LevelId, Zone},
        resources::SpriteResources,
        terrain::{Block, BlockTerrain},
        tick::{replay, tick, SimConfig, World},
    },
};

/// Ticks the demo runs for.
const DEMO_TICKS: u32 = 10 * TICK_RATE;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Hedgehog simulation v{}", VERSION);
    info!("Tick rate: {} Hz, demo length: {} ticks", TICK_RATE, DEMO_TICKS);

    let config = SimConfig::from_env();
    let terrain = demo_terrain();
    let resources = SpriteResources::builtin();
    info!("Sprite resources: {}", hex::encode(resources.fingerprint()));

    let mut world = World::new(LevelId::new(Zone::GreenHill, 0), &config);
    if world.spawn_player(FixedVec2::from_pixels(64, 236)).is_err() {
        bail!("object table has no player slot ({} slots)", config.object_slots);
    }
    let initial = world.clone();

    // Live run, recording the pad
    let mut recording = PlayerInputBuffer::new();
    let mut previous = 0;
    let mut uploads = 0usize;
    let mut event_count = 0usize;

    for t in 1..=DEMO_TICKS {
        let held = scripted_pad(t);
        recording.record(t, held);

        let result = tick(&mut world, InputFrame::from_held(previous, held), &terrain, &resources, &config);
        previous = held;
        event_count += result.events.len();

        for event in &result.events {
            match &event.data {
                GameEventData::Sound { cue } => debug!(tick = event.tick, ?cue, "sound"),
                GameEventData::PlayerKilled { cause } => info!(tick = event.tick, ?cause, "player died"),
                GameEventData::ResourceFault { message } => info!(tick = event.tick, %message, "resource fault"),
                other => info!(tick = event.tick, event = ?other, "event"),
            }
        }
        if let Some(transition) = result.transition {
            info!(tick = t, next = ?transition.next, kind = ?transition.kind, "level transition");
        }
        if world.take_tile_upload(0).is_some() {
            uploads += 1;
        }

        if t % TICK_RATE == 0 {
            if let Some(player) = world.player() {
                info!(
                    "Tick {}: pos ({}, {}) inertia {:#x} angle {:#04x} anim {:#04x}",
                    t,
                    player.position.px(),
                    player.position.py(),
                    player.inertia,
                    player.angle.raw(),
                    player.anim,
                );
            }
        }
    }
    recording.finalize(DEMO_TICKS);

    let live_hash = world.compute_hash();
    info!("Events: {}, tile uploads: {}", event_count, uploads);
    info!("Live state hash:   {}", hex::encode(live_hash));

    // Round-trip the recording and replay it
    let bytes = recording.to_bytes().context("encoding input recording")?;
    let decoded = PlayerInputBuffer::from_bytes(&bytes).context("decoding input recording")?;
    info!(
        "Recording: {} bytes, {} deltas, digest {}",
        bytes.len(),
        decoded.delta_count(),
        hex::encode(decoded.digest())
    );

    let (replayed, _) = replay(initial, &decoded, DEMO_TICKS, &terrain, &resources, &config);
    let replay_hash = replayed.compute_hash();
    info!("Replay state hash: {}", hex::encode(replay_hash));

    if live_hash != replay_hash {
        bail!("replay diverged from the live run");
    }
    info!("Determinism verified: hashes match");

    if let Some(player) = world.player() {
        let dump = serde_json::to_string_pretty(player).context("serializing player state")?;
        println!("{dump}");
    }

    Ok(())
}

/// Flat ground at y = 256 with a ramp up to a raised shelf and a wall.
fn demo_terrain() -> BlockTerrain {
    let mut terrain = BlockTerrain::flat(128, 32, 16);
    let full = terrain.define(Block::full());
    let ramp = terrain.define(Block::slope(1, 1, 1, 0xE0));

    terrain.place(30, 15, ramp);
    for bx in 31..60 {
        terrain.place(bx, 15, full);
    }
    for by in 9..15 {
        terrain.place(60, by, full);
    }
    terrain
}

/// Held buttons for a tick: run right up the ramp, jump, push the wall,
/// then turn around and roll back.
fn scripted_pad(t: u32) -> u8 {
    match t {
        0..=29 => 0,
        30..=239 => BUTTON_RIGHT,
        240..=249 => BUTTON_RIGHT | BUTTON_A,
        250..=359 => BUTTON_RIGHT,
        360..=479 => BUTTON_LEFT,
        480..=485 => BUTTON_A,
        _ => 0,
    }
}
