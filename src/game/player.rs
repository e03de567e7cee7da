//! Player Object Routine
//!
//! One call to `run_player` is one tick of the player object. The routine
//! field selects what runs:
//!
//! | Routine      | Tick                                                    |
//! |--------------|---------------------------------------------------------|
//! | `Init`       | set extents, art and speeds, then run `Control`         |
//! | `Control`    | physics, timers, history, animation, tile streaming     |
//! | `Debug`      | d-pad moves the player a pixel per tick, B leaves       |
//! | `Dead`       | fall, animate; past the death line go to `ResetLevel`   |
//! | `ResetLevel` | nothing; the level owner restarts the act               |

use tracing::{debug, info, warn};

use crate::core::vec2::SpeedVec;
use crate::game::animation::animate;
use crate::game::context::SimContext;
use crate::game::events::{DeathCause, GameEventData, SoundCue};
use crate::game::input::{BUTTON_B, BUTTON_DOWN, BUTTON_LEFT, BUTTON_RIGHT, BUTTON_UP};
use crate::game::level::{LevelTransition, TransitionKind, AIR_WARNING};
use crate::game::physics::{integrate, object_fall, reset_on_floor};
use crate::game::resources::PlayerAnim;
use crate::game::state::{
    ObjectScratch, ObjectState, PlayerScratch, RenderFlags, Routine, SpeedProfile,
    PLAYER_ART_TILE, PLAYER_HEIGHT_RADIUS, PLAYER_WIDTH_RADIUS,
};

/// Upward speed given on death.
pub const DEATH_BOUNCE: i16 = -0x700;

/// Distance below the bottom camera limit at which the death fall ends.
pub const DEATH_LINE: i16 = 0x100;

/// Sprite priority of the player.
pub const PLAYER_PRIORITY: u8 = 2;

/// Visible half-width of the player.
pub const PLAYER_WIDTH_PIXELS: u8 = 24;

/// Run the player object for one tick.
///
/// Objects that are not players are left alone.
pub fn run_player(obj: &mut ObjectState, ctx: &mut SimContext<'_>) {
    let mut p = match std::mem::take(&mut obj.scratch) {
        ObjectScratch::Player(p) => p,
        other => {
            obj.scratch = other;
            return;
        }
    };

    match obj.routine {
        Routine::Init => {
            init(obj, &mut p);
            control(obj, &mut p, ctx);
        }
        Routine::Control => control(obj, &mut p, ctx),
        Routine::Debug => debug_mode(obj, &mut p, ctx),
        Routine::Dead => dead(obj, &mut p, ctx),
        Routine::ResetLevel => {}
    }

    obj.scratch = ObjectScratch::Player(p);
}

fn init(obj: &mut ObjectState, p: &mut PlayerScratch) {
    obj.routine = Routine::Control;
    obj.y_rad = PLAYER_HEIGHT_RADIUS;
    obj.x_rad = PLAYER_WIDTH_RADIUS;
    obj.art.pattern = PLAYER_ART_TILE;
    obj.art.palette = 0;
    obj.art.high_priority = false;
    obj.priority = PLAYER_PRIORITY;
    obj.width_pixels = PLAYER_WIDTH_PIXELS;
    obj.render = RenderFlags::default();
    p.speed = SpeedProfile::NORMAL;
}

fn control(obj: &mut ObjectState, p: &mut PlayerScratch, ctx: &mut SimContext<'_>) {
    if ctx.env.debug_cheat && ctx.input.is_pressed(BUTTON_B) {
        obj.routine = Routine::Debug;
        ctx.env.lock_controls = false;
        debug!(tick = ctx.tick, slot = ctx.slot, "entered debug mode");
        ctx.emit(GameEventData::DebugMode { active: true });
        return;
    }

    if !ctx.env.lock_controls {
        p.controls = ctx.input;
    }
    if !ctx.env.lock_multi {
        integrate(obj, p, ctx);
    }

    display(obj, p, ctx);
    ctx.history.record(obj.position);

    let [front, back] = ctx.scratch.angle_buffer;
    p.front_angle = front;
    p.back_angle = back;

    // Tube sections keep the walk cycle running across animation changes
    if ctx.env.tunnel_mode && obj.anim == PlayerAnim::Walk.id() {
        obj.prev_anim = obj.anim;
    }
    animate_and_load(obj, p, ctx);
}

/// Blinking while hurt, and power-up timers.
fn display(obj: &mut ObjectState, p: &mut PlayerScratch, ctx: &mut SimContext<'_>) {
    let blink = p.flash_time;
    if blink != 0 {
        p.flash_time -= 1;
        obj.visible = blink & 4 != 0;
    } else {
        obj.visible = true;
    }

    if p.invincibility_time != 0 {
        p.invincibility_time -= 1;
        if p.invincibility_time == 0 {
            if !(ctx.env.lock_screen || ctx.env.air < AIR_WARNING) {
                ctx.sound(SoundCue::RestoreMusic);
            }
            ctx.env.invincibility = false;
        }
    }

    if p.shoes_time != 0 {
        p.shoes_time -= 1;
        if p.shoes_time == 0 {
            p.speed = if obj.status.underwater && !ctx.config.legacy_shoes_restore {
                SpeedProfile::UNDERWATER
            } else {
                SpeedProfile::NORMAL
            };
            ctx.env.shoes = false;
            ctx.sound(SoundCue::MusicNormalSpeed);
        }
    }
}

fn animate_and_load(obj: &mut ObjectState, p: &mut PlayerScratch, ctx: &mut SimContext<'_>) {
    let mut faults = Vec::new();
    if let Err(err) = animate(obj, &ctx.resources.animations) {
        faults.push(err);
    }
    let resources = ctx.resources;
    if let Err(err) = p.gfx.update(obj.frame, &resources.dplc, &resources.atlas) {
        faults.push(err);
    }

    // A fault that persists is reported once
    for err in faults.iter().filter(|err| !p.faults.contains(err)) {
        warn!(tick = ctx.tick, slot = ctx.slot, error = %err, "bad sprite data, holding last frame");
        ctx.emit(GameEventData::ResourceFault { message: err.to_string() });
    }
    p.faults = faults;
}

/// Kill the player. Returns false while in debug mode, where the player
/// cannot die.
pub fn kill(
    obj: &mut ObjectState,
    p: &mut PlayerScratch,
    ctx: &mut SimContext<'_>,
    cause: DeathCause,
) -> bool {
    if obj.routine == Routine::Debug {
        return false;
    }

    ctx.env.invincibility = false;
    obj.routine = Routine::Dead;
    reset_on_floor(obj, p, ctx);
    obj.status.airborne = true;
    obj.velocity = SpeedVec::new(0, DEATH_BOUNCE);
    obj.inertia = 0;
    p.death_y = obj.position.py();
    obj.anim = PlayerAnim::Death.id();
    obj.art.high_priority = true;

    debug!(tick = ctx.tick, slot = ctx.slot, ?cause, y = p.death_y, "player killed");
    ctx.sound(cause.sound());
    ctx.emit(GameEventData::PlayerKilled { cause });
    true
}

fn dead(obj: &mut ObjectState, p: &mut PlayerScratch, ctx: &mut SimContext<'_>) {
    let line = ctx.env.limits.bottom as i32 + DEATH_LINE as i32;
    if obj.position.py() as i32 > line {
        obj.velocity.y = -0x38;
        obj.routine = Routine::ResetLevel;

        let transition = LevelTransition {
            next: ctx.env.level,
            kind: TransitionKind::Restart,
            reset_lamp: false,
        };
        info!(tick = ctx.tick, level = ?transition.next, "death fall over, restarting level");
        ctx.env.request_transition(transition);
        ctx.emit(GameEventData::LevelTransition { transition });
    }

    object_fall(obj);
    ctx.history.record(obj.position);
    animate_and_load(obj, p, ctx);
}

fn debug_mode(obj: &mut ObjectState, p: &mut PlayerScratch, ctx: &mut SimContext<'_>) {
    let input = ctx.input;
    if input.is_pressed(BUTTON_B) {
        obj.routine = Routine::Control;
        obj.velocity = SpeedVec::ZERO;
        obj.inertia = 0;
        obj.exit_ball();
        obj.x_rad = PLAYER_WIDTH_RADIUS;
        obj.y_rad = PLAYER_HEIGHT_RADIUS;
        obj.status.airborne = true;
        p.control_lock = 0;
        debug!(tick = ctx.tick, slot = ctx.slot, x = obj.position.px(), y = obj.position.py(), "left debug mode");
        ctx.emit(GameEventData::DebugMode { active: false });
        return;
    }

    let axis = |neg: u8, pos: u8| -> i16 {
        input.is_held(pos) as i16 - input.is_held(neg) as i16
    };
    obj.position.add_px(axis(BUTTON_LEFT, BUTTON_RIGHT));
    obj.position.add_py(axis(BUTTON_UP, BUTTON_DOWN));
    obj.visible = true;
    ctx.history.record(obj.position);
}

// =============================================================================
// TESTS
// =============================================================================
