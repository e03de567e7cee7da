//! Player Physics Integration
//!
//! One call to `integrate` advances the player by one tick. The phase is
//! picked from the ball and airborne flags:
//!
//! ```text
//!              ┌──────────────────────────┬──────────────────────────┐
//!              │ grounded                 │ airborne                 │
//! ┌────────────┼──────────────────────────┼──────────────────────────┤
//! │ standing   │ jump ─► slope resist     │ jump height              │
//! │            │ ─► move ─► roll          │ ─► air control           │
//! │            │ ─► level bound ─► move   │ ─► level bound           │
//! │            │ ─► floor snap ─► repel   │ ─► fall ─► buoyancy      │
//! ├────────────┼──────────────────────────┤ ─► angle ease            │
//! │ ball       │ jump ─► roll repel       │ ─► air collision         │
//! │            │ ─► roll speed ─► bound   │                          │
//! │            │ ─► move ─► floor snap    │                          │
//! │            │ ─► repel                 │                          │
//! └────────────┴──────────────────────────┴──────────────────────────┘
//! ```
//!
//! A successful jump ends the grounded phase for the tick.
//!
//! ## Speeds
//!
//! `inertia` is ground speed along the surface. Grounded velocity is always
//! derived from it: `xsp = cos·inertia >> 8`, `ysp = sin·inertia >> 8`.
//! All arithmetic wraps at the register width.

use tracing::info;

use crate::core::angle::{sin_cos, Angle, Direction};
use crate::core::fixed::{from_pixel, speed_to_fixed, trig_scale, Speed};
use crate::game::collision::{
    distance_toward, find_surface, floor_distance_at, probe_pair, resolve_angle, room_in_front,
    NO_SURFACE_ANGLE,
};
use crate::game::context::SimContext;
use crate::game::events::{DeathCause, GameEventData, SoundCue};
use crate::game::input::{BUTTONS_JUMP, BUTTON_DOWN, BUTTON_LEFT, BUTTON_RIGHT, BUTTON_UP};
use crate::game::level::{
    LevelEnv, LevelId, LevelTransition, TransitionKind, Zone, LOOK_SHIFT_DOWN, LOOK_SHIFT_NEUTRAL,
    LOOK_SHIFT_UP, SCREEN_HEIGHT,
};
use crate::game::player::kill;
use crate::game::resources::PlayerAnim;
use crate::game::state::{ObjectState, PlayerScratch};
use crate::game::terrain::SolidLayer;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Jump impulse on land.
pub const JUMP_SPEED: Speed = 0x680;

/// Jump impulse underwater.
pub const JUMP_SPEED_UNDERWATER: Speed = 0x380;

/// Clearance needed overhead to jump.
pub const JUMP_HEADROOM: i16 = 6;

/// Upward speed kept after releasing jump.
pub const JUMP_RELEASE_CAP: Speed = -0x400;

/// Upward speed kept after releasing jump underwater.
pub const JUMP_RELEASE_CAP_UNDERWATER: Speed = -0x200;

/// Fastest upward speed when not jumping.
pub const MAX_RISE_SPEED: Speed = -0xFC0;

/// Fastest downward speed kept when landing on a steep slope.
pub const MAX_LAND_SPEED: Speed = 0xFC0;

/// Ground speed at which reversing starts a skid.
pub const SKID_SPEED: Speed = 0x400;

/// Ground speed after reversing through zero.
pub const TURN_SPEED: Speed = 0x80;

/// Slope force factor on foot.
pub const SLOPE_FACTOR: i16 = 0x20;

/// Slope force factor while rolling.
pub const ROLL_SLOPE_FACTOR: i16 = 0x50;

/// Minimum ground speed to start rolling.
pub const ROLL_MIN_SPEED: Speed = 0x80;

/// Ground speed given when rolling from a standstill.
pub const ROLL_START_SPEED: Speed = 0x200;

/// Horizontal speed cap while rolling.
pub const ROLL_SPEED_CAP: Speed = 0x1000;

/// Added to ysp every airborne tick.
pub const GRAVITY: Speed = 0x38;

/// Subtracted from ysp every airborne tick underwater.
pub const BUOYANCY: Speed = 0x28;

/// Largest floor step followed without leaving the ground.
pub const SNAP_TOLERANCE: i16 = 14;

/// Ground speed below which steep slopes shed the player.
pub const SLIP_SPEED: Speed = 0x280;

/// Ticks of ignored left/right after slipping.
pub const SLIP_LOCK_TICKS: u16 = 30;

/// Floor drop under the center that allows balancing on a ledge.
pub const BALANCE_DROP: i16 = 12;

/// Horizontal reach of the airborne wall probes.
pub const WALL_PROBE_REACH: i16 = 10;

const LEFT_RIGHT: u8 = BUTTON_LEFT | BUTTON_RIGHT;

// =============================================================================
// ENTRY POINT
// =============================================================================

/// Advance the player by one tick of movement.
pub fn integrate(obj: &mut ObjectState, p: &mut PlayerScratch, ctx: &mut SimContext<'_>) {
    match (obj.status.ball_form, obj.status.airborne) {
        (false, false) => {
            if jump(obj, p, ctx) {
                return;
            }
            slope_resist(obj);
            move_ground(obj, p, ctx);
            roll(obj, p, ctx);
            level_bound(obj, p, ctx);
            speed_to_pos(obj);
            angle_pos(obj, p, ctx);
            slope_repel(obj, p);
        }
        (true, false) => {
            if jump(obj, p, ctx) {
                return;
            }
            roll_repel(obj);
            roll_speed(obj, p, ctx);
            level_bound(obj, p, ctx);
            speed_to_pos(obj);
            angle_pos(obj, p, ctx);
            slope_repel(obj, p);
        }
        (_, true) => {
            jump_height(obj, p);
            air_control(obj, p, ctx);
            level_bound(obj, p, ctx);
            object_fall(obj);
            if obj.status.underwater {
                obj.velocity.y = obj.velocity.y.wrapping_sub(BUOYANCY);
            }
            jump_angle(obj);
            air_collision(obj, p, ctx);
        }
    }
}

// =============================================================================
// GROUND MOVEMENT
// =============================================================================

/// Jump if a jump button was pressed and there is headroom.
///
/// Returns true if the player left the ground.
pub fn jump(obj: &mut ObjectState, p: &mut PlayerScratch, ctx: &mut SimContext<'_>) -> bool {
    if !p.controls.is_pressed(BUTTONS_JUMP) {
        return false;
    }

    let room = distance_toward(ctx.terrain, obj.position, obj.x_rad, obj.y_rad, obj.angle + 0x80);
    if room.distance < JUMP_HEADROOM {
        return false;
    }

    let speed = if obj.status.underwater { JUMP_SPEED_UNDERWATER } else { JUMP_SPEED };
    let (sin, cos) = sin_cos(obj.angle - 0x40);
    obj.velocity.x = obj.velocity.x.wrapping_add(trig_scale(cos, speed));
    obj.velocity.y = obj.velocity.y.wrapping_add(trig_scale(sin, speed));

    obj.status.airborne = true;
    obj.status.pushing = false;
    p.jumping = true;
    p.floor_clip = false;
    ctx.sound(SoundCue::Jump);

    if obj.enter_ball() {
        obj.anim = PlayerAnim::Roll.id();
    } else {
        obj.status.roll_jump = true;
    }
    true
}

/// Gravity along the slope while on foot.
pub fn slope_resist(obj: &mut ObjectState) {
    if obj.angle.quadrant() >= 0x60 {
        return;
    }
    let (sin, _) = sin_cos(obj.angle);
    let force = trig_scale(sin, SLOPE_FACTOR);
    if obj.inertia != 0 {
        obj.inertia = obj.inertia.wrapping_add(force);
    }
}

/// Walk input, idle poses, camera look, friction, then velocity and the
/// wall check.
pub fn move_ground(obj: &mut ObjectState, p: &mut PlayerScratch, ctx: &mut SimContext<'_>) {
    if !ctx.env.jump_only {
        let mut looking = false;
        if p.control_lock == 0 {
            if p.controls.is_held(BUTTON_LEFT) {
                move_left(obj, p, ctx);
            }
            if p.controls.is_held(BUTTON_RIGHT) {
                move_right(obj, p, ctx);
            }
            if obj.angle.quadrant() == 0 && obj.inertia == 0 {
                looking = idle(obj, p, ctx);
            }
        }

        if !looking {
            ease_look_shift(ctx.env);
        }

        if !p.controls.is_held(LEFT_RIGHT) {
            let acc = p.speed.acc;
            if obj.inertia > 0 {
                obj.inertia = obj.inertia.wrapping_sub(acc).max(0);
            } else {
                obj.inertia = obj.inertia.wrapping_add(acc);
                if obj.inertia >= 0 {
                    obj.inertia = 0;
                }
            }
        }
    }

    let (sin, cos) = sin_cos(obj.angle);
    obj.velocity.x = trig_scale(cos, obj.inertia);
    obj.velocity.y = trig_scale(sin, obj.inertia);

    wall_check(obj, ctx);
}

fn move_left(obj: &mut ObjectState, p: &PlayerScratch, ctx: &mut SimContext<'_>) {
    let mut inertia = obj.inertia;
    if inertia <= 0 {
        if !obj.status.x_flip {
            obj.status.x_flip = true;
            obj.status.pushing = false;
            obj.restart_animation();
        }
        inertia = inertia.wrapping_sub(p.speed.acc);
        if inertia <= -p.speed.max {
            inertia = -p.speed.max;
        }
        obj.inertia = inertia;
        obj.anim = PlayerAnim::Walk.id();
    } else {
        inertia = inertia.wrapping_sub(p.speed.dec);
        if inertia < 0 {
            inertia = -TURN_SPEED;
        }
        obj.inertia = inertia;
        if obj.angle.quadrant() == 0 && inertia >= SKID_SPEED {
            obj.anim = PlayerAnim::Stop.id();
            obj.status.x_flip = false;
            ctx.sound(SoundCue::Skid);
        }
    }
}

fn move_right(obj: &mut ObjectState, p: &PlayerScratch, ctx: &mut SimContext<'_>) {
    let mut inertia = obj.inertia;
    if inertia >= 0 {
        if obj.status.x_flip {
            obj.status.x_flip = false;
            obj.status.pushing = false;
            obj.restart_animation();
        }
        inertia = inertia.wrapping_add(p.speed.acc);
        if inertia >= p.speed.max {
            inertia = p.speed.max;
        }
        obj.inertia = inertia;
        obj.anim = PlayerAnim::Walk.id();
    } else {
        inertia = inertia.wrapping_add(p.speed.dec);
        if inertia >= 0 {
            inertia = TURN_SPEED;
        }
        obj.inertia = inertia;
        if obj.angle.quadrant() == 0 && inertia <= -SKID_SPEED {
            obj.anim = PlayerAnim::Stop.id();
            obj.status.x_flip = true;
            ctx.sound(SoundCue::Skid);
        }
    }
}

/// Standing still on level ground: wait, balance, look up or duck.
///
/// Returns true while looking up or ducking (the camera is held).
fn idle(obj: &mut ObjectState, p: &PlayerScratch, ctx: &mut SimContext<'_>) -> bool {
    obj.status.pushing = false;
    obj.anim = PlayerAnim::Wait.id();

    if obj.status.object_stand {
        let platform = p.standing_on.and_then(|slot| ctx.objects.get(slot));
        if let Some(platform) = platform {
            let no_balance = platform.platform_scratch().map_or(false, |s| s.no_balance);
            if !no_balance {
                let width = platform.width_pixels as i16;
                let from_left = width
                    .wrapping_add(obj.position.px())
                    .wrapping_sub(platform.position.px());
                let edge = width.wrapping_mul(2).wrapping_sub(4);
                if from_left < 4 {
                    obj.status.x_flip = true;
                    obj.anim = PlayerAnim::Balance.id();
                    return false;
                }
                if from_left >= edge {
                    obj.status.x_flip = false;
                    obj.anim = PlayerAnim::Balance.id();
                    return false;
                }
            }
        }
    } else if floor_distance_at(ctx.terrain, obj.position, obj.y_rad, obj.position.px()) >= BALANCE_DROP {
        if p.front_angle == NO_SURFACE_ANGLE {
            obj.status.x_flip = false;
            obj.anim = PlayerAnim::Balance.id();
            return false;
        }
        if p.back_angle == NO_SURFACE_ANGLE {
            obj.status.x_flip = true;
            obj.anim = PlayerAnim::Balance.id();
            return false;
        }
    }

    if p.controls.is_held(BUTTON_UP) {
        obj.anim = PlayerAnim::LookUp.id();
        if ctx.env.look_shift != LOOK_SHIFT_UP {
            ctx.env.look_shift += 2;
        }
        return true;
    }
    if p.controls.is_held(BUTTON_DOWN) {
        obj.anim = PlayerAnim::Duck.id();
        if ctx.env.look_shift != LOOK_SHIFT_DOWN {
            ctx.env.look_shift -= 2;
        }
        return true;
    }
    false
}

/// Move the camera look shift two steps toward neutral.
pub fn ease_look_shift(env: &mut LevelEnv) {
    if env.look_shift < LOOK_SHIFT_NEUTRAL {
        env.look_shift += 2;
    } else if env.look_shift > LOOK_SHIFT_NEUTRAL {
        env.look_shift -= 2;
    }
}

/// Stop against walls the player is about to run into.
pub fn wall_check(obj: &mut ObjectState, ctx: &mut SimContext<'_>) {
    if obj.angle.raw().wrapping_add(0x40) & 0x80 != 0 || obj.inertia == 0 {
        return;
    }

    let probe = if obj.inertia < 0 { obj.angle + 0x40 } else { obj.angle - 0x40 };
    let distance = room_in_front(ctx.terrain, obj.position, obj.velocity, probe);
    if distance >= 0 {
        return;
    }

    let d = distance.wrapping_shl(8);
    match probe.direction() {
        Direction::Down => obj.velocity.y = obj.velocity.y.wrapping_add(d),
        Direction::Left => {
            obj.velocity.x = obj.velocity.x.wrapping_sub(d);
            obj.status.pushing = true;
            obj.inertia = 0;
        }
        Direction::Up => obj.velocity.y = obj.velocity.y.wrapping_sub(d),
        Direction::Right => {
            obj.velocity.x = obj.velocity.x.wrapping_add(d);
            obj.status.pushing = true;
            obj.inertia = 0;
        }
    }
}

/// Curl up when holding down at speed.
pub fn roll(obj: &mut ObjectState, p: &PlayerScratch, ctx: &mut SimContext<'_>) {
    if ctx.env.jump_only || (obj.inertia as i32).abs() < ROLL_MIN_SPEED as i32 {
        return;
    }
    if p.controls.is_held(LEFT_RIGHT) || !p.controls.is_held(BUTTON_DOWN) {
        return;
    }
    start_roll(obj, ctx);
}

/// Enter ball form on the ground.
pub fn start_roll(obj: &mut ObjectState, ctx: &mut SimContext<'_>) {
    if !obj.enter_ball() {
        return;
    }
    obj.anim = PlayerAnim::Roll.id();
    ctx.sound(SoundCue::Roll);
    if obj.inertia == 0 {
        obj.inertia = ROLL_START_SPEED;
    }
}

/// Clamp to the horizontal scroll limits and handle falling out of the
/// level.
pub fn level_bound(obj: &mut ObjectState, p: &mut PlayerScratch, ctx: &mut SimContext<'_>) {
    // The predicted pixel is compared unsigned, so x < 0 counts as past the
    // right edge.
    let next_x = (obj.position.x.wrapping_add(speed_to_fixed(obj.velocity.x)) >> 16) as u16 as i32;
    let limits = ctx.env.limits;
    let left = limits.left as i32 + 16;
    let right = limits.right as i32 + if ctx.env.lock_screen { 290 } else { 360 };

    let bound = if next_x < left {
        Some(left)
    } else if next_x > right {
        Some(right)
    } else {
        None
    };
    if let Some(bound) = bound {
        obj.position.x = from_pixel(bound as i16);
        obj.velocity.x = 0;
        obj.inertia = 0;
    }

    if obj.position.py() as i32 >= limits.bottom as i32 + SCREEN_HEIGHT as i32 {
        let warp_from = LevelId::new(Zone::ScrapBrain, 1);
        if ctx.env.level == warp_from && obj.position.px() >= 0x2000 {
            let transition = LevelTransition {
                next: LevelId::new(Zone::Labyrinth, 3),
                kind: TransitionKind::Warp,
                reset_lamp: true,
            };
            info!(tick = ctx.tick, next = ?transition.next, "fell out of level into warp");
            ctx.env.request_transition(transition);
            ctx.emit(GameEventData::LevelTransition { transition });
        } else {
            kill(obj, p, ctx, DeathCause::Pit);
        }
    }
}

/// Move by the current velocity.
#[inline]
pub fn speed_to_pos(obj: &mut ObjectState) {
    obj.position.apply_speed(obj.velocity);
}

/// Keep a grounded player glued to the surface under it.
pub fn angle_pos(obj: &mut ObjectState, p: &PlayerScratch, ctx: &mut SimContext<'_>) {
    if obj.status.object_stand {
        ctx.scratch.angle_buffer = [0, 0];
        return;
    }
    ctx.scratch.angle_buffer = [NO_SURFACE_ANGLE; 2];

    let direction = obj.angle.symmetric_quadrant();
    let pair = probe_pair(ctx.terrain, obj.position, obj.x_rad, obj.y_rad, direction);
    ctx.scratch.angle_buffer = [pair.left.angle, pair.right.angle];

    let hit = pair.nearest();
    obj.angle = resolve_angle(obj.angle, hit.angle);

    let distance = hit.distance;
    if distance == 0 || distance < -SNAP_TOLERANCE {
        return;
    }
    if distance <= SNAP_TOLERANCE {
        shift_along(obj, direction, distance);
    } else if !p.floor_clip {
        obj.status.airborne = true;
        obj.status.pushing = false;
        obj.restart_animation();
    }
}

fn shift_along(obj: &mut ObjectState, direction: Direction, distance: i16) {
    match direction {
        Direction::Down => obj.position.add_py(distance),
        Direction::Up => obj.position.add_py(distance.wrapping_neg()),
        Direction::Right => obj.position.add_px(distance),
        Direction::Left => obj.position.add_px(distance.wrapping_neg()),
    }
}

/// Shed the player off steep surfaces when too slow; counts down the
/// control lock.
pub fn slope_repel(obj: &mut ObjectState, p: &mut PlayerScratch) {
    if p.floor_clip {
        return;
    }
    if p.control_lock != 0 {
        p.control_lock -= 1;
        return;
    }
    if obj.angle.quadrant() == 0 {
        return;
    }
    if (obj.inertia as i32).abs() >= SLIP_SPEED as i32 {
        return;
    }
    obj.inertia = 0;
    obj.status.airborne = true;
    p.control_lock = SLIP_LOCK_TICKS;
}

// =============================================================================
// ROLLING
// =============================================================================

/// Gravity along the slope while rolling; a quarter as strong uphill.
pub fn roll_repel(obj: &mut ObjectState) {
    if obj.angle.raw().wrapping_add(0x60) >= 0xC0 {
        return;
    }
    let (sin, _) = sin_cos(obj.angle);
    let mut force = trig_scale(sin, ROLL_SLOPE_FACTOR);
    if obj.inertia >= 0 {
        if force < 0 {
            force >>= 2;
        }
    } else if force >= 0 {
        force >>= 2;
    }
    obj.inertia = obj.inertia.wrapping_add(force);
}

/// Rolling friction and braking, unroll at a standstill, then velocity and
/// the wall check.
pub fn roll_speed(obj: &mut ObjectState, p: &PlayerScratch, ctx: &mut SimContext<'_>) {
    let friction = p.speed.acc >> 1;
    let brake = p.speed.dec >> 2;

    if !ctx.env.jump_only {
        if p.control_lock == 0 {
            if p.controls.is_held(BUTTON_LEFT) {
                roll_left(obj, brake);
            }
            if p.controls.is_held(BUTTON_RIGHT) {
                roll_right(obj, brake);
            }
        }

        if obj.inertia > 0 {
            obj.inertia = obj.inertia.wrapping_sub(friction).max(0);
        } else if obj.inertia < 0 {
            obj.inertia = obj.inertia.wrapping_add(friction);
            if obj.inertia >= 0 {
                obj.inertia = 0;
            }
        }

        if obj.inertia == 0 {
            obj.exit_ball();
            obj.anim = PlayerAnim::Wait.id();
        }
    }

    let (sin, cos) = sin_cos(obj.angle);
    obj.velocity.y = trig_scale(sin, obj.inertia);
    obj.velocity.x = trig_scale(cos, obj.inertia).clamp(-ROLL_SPEED_CAP, ROLL_SPEED_CAP);

    wall_check(obj, ctx);
}

fn roll_left(obj: &mut ObjectState, brake: Speed) {
    if obj.inertia <= 0 {
        obj.status.x_flip = true;
        obj.anim = PlayerAnim::Roll.id();
        return;
    }
    let inertia = obj.inertia.wrapping_sub(brake);
    obj.inertia = if inertia < 0 { -TURN_SPEED } else { inertia };
}

fn roll_right(obj: &mut ObjectState, brake: Speed) {
    if obj.inertia >= 0 {
        obj.status.x_flip = false;
        obj.anim = PlayerAnim::Roll.id();
        return;
    }
    let inertia = obj.inertia.wrapping_add(brake);
    obj.inertia = if inertia >= 0 { TURN_SPEED } else { inertia };
}

// =============================================================================
// AIRBORNE
// =============================================================================

/// Variable jump height and the rise speed cap.
pub fn jump_height(obj: &mut ObjectState, p: &PlayerScratch) {
    if p.jumping {
        let cap = if obj.status.underwater { JUMP_RELEASE_CAP_UNDERWATER } else { JUMP_RELEASE_CAP };
        if obj.velocity.y < cap && !p.controls.is_held(BUTTONS_JUMP) {
            obj.velocity.y = cap;
        }
    } else if obj.velocity.y < MAX_RISE_SPEED {
        obj.velocity.y = MAX_RISE_SPEED;
    }
}

/// Steering in the air, camera easing and air drag near the jump apex.
pub fn air_control(obj: &mut ObjectState, p: &PlayerScratch, ctx: &mut SimContext<'_>) {
    let max = p.speed.max;
    let acc = p.speed.acc.wrapping_shl(1);

    if !obj.status.roll_jump {
        let mut x = obj.velocity.x;
        if p.controls.is_held(BUTTON_LEFT) {
            obj.status.x_flip = true;
            x = x.wrapping_sub(acc);
            if x <= -max {
                x = -max;
            }
        }
        if p.controls.is_held(BUTTON_RIGHT) {
            obj.status.x_flip = false;
            x = x.wrapping_add(acc);
            if x >= max {
                x = max;
            }
        }
        obj.velocity.x = x;
    }

    ease_look_shift(ctx.env);

    if (-0x400..0).contains(&obj.velocity.y) {
        let drag = obj.velocity.x >> 5;
        obj.velocity.x = obj.velocity.x.wrapping_sub(drag);
    }
}

/// Move, then apply gravity. The position uses the speed from before
/// gravity.
#[inline]
pub fn object_fall(obj: &mut ObjectState) {
    obj.position.apply_speed(obj.velocity);
    obj.velocity.y = obj.velocity.y.wrapping_add(GRAVITY);
}

/// Ease the angle back to level by 2 steps, stopping at 0.
pub fn jump_angle(obj: &mut ObjectState) {
    let a = obj.angle.raw();
    if a == 0 {
        return;
    }
    let eased = if a & 0x80 != 0 { a.checked_add(2) } else { a.checked_sub(2) };
    obj.angle = Angle(eased.unwrap_or(0));
}

/// Walls, then floor when falling or ceiling when rising.
pub fn air_collision(obj: &mut ObjectState, p: &mut PlayerScratch, ctx: &mut SimContext<'_>) {
    let (x, y) = (obj.position.px(), obj.position.py());

    let left = find_surface(ctx.terrain, x.wrapping_sub(WALL_PROBE_REACH), y, Direction::Left, SolidLayer::Full);
    if left.distance < 0 {
        obj.position.add_px(left.distance.wrapping_neg());
        obj.velocity.x = 0;
    }
    let right = find_surface(ctx.terrain, x.wrapping_add(WALL_PROBE_REACH), y, Direction::Right, SolidLayer::Full);
    if right.distance < 0 {
        obj.position.add_px(right.distance);
        obj.velocity.x = 0;
    }

    if obj.velocity.y < 0 {
        let hit = probe_pair(ctx.terrain, obj.position, obj.x_rad, obj.y_rad, Direction::Up).nearest();
        if hit.distance < 0 {
            obj.position.add_py(hit.distance.wrapping_neg());
            obj.velocity.y = 0;
        }
        return;
    }

    let pair = probe_pair(ctx.terrain, obj.position, obj.x_rad, obj.y_rad, Direction::Down);
    ctx.scratch.angle_buffer = [pair.left.angle, pair.right.angle];
    let hit = pair.nearest();
    if hit.distance >= 0 {
        return;
    }

    // Too deep for either probe: still falling past a wall edge.
    let limit = -((obj.velocity.y >> 8) + 8);
    let far = pair.left.distance.max(pair.right.distance);
    if hit.distance < limit && far < limit {
        return;
    }

    obj.position.add_py(hit.distance);
    obj.angle = if Angle(hit.angle).is_special() { Angle::ZERO } else { Angle(hit.angle) };
    reset_on_floor(obj, p, ctx);
    obj.anim = PlayerAnim::Walk.id();
    land_speed(obj);
}

/// Turn air speed into ground speed for the angle just landed on.
fn land_speed(obj: &mut ObjectState) {
    let a = obj.angle.raw();
    let from_ysp = |ysp: Speed| if a & 0x80 != 0 { ysp.wrapping_neg() } else { ysp };

    if a.wrapping_add(0x20) & 0x40 != 0 {
        obj.velocity.x = 0;
        if obj.velocity.y > MAX_LAND_SPEED {
            obj.velocity.y = MAX_LAND_SPEED;
        }
        obj.inertia = from_ysp(obj.velocity.y);
    } else if a.wrapping_add(0x10) & 0x20 != 0 {
        obj.velocity.y >>= 1;
        obj.inertia = from_ysp(obj.velocity.y);
    } else {
        obj.velocity.y = 0;
        obj.inertia = obj.velocity.x;
    }
}

/// Back on the ground: clear the air flags and uncurl.
pub fn reset_on_floor(obj: &mut ObjectState, p: &mut PlayerScratch, ctx: &mut SimContext<'_>) {
    obj.status.pushing = false;
    obj.status.airborne = false;
    obj.status.roll_jump = false;
    if obj.exit_ball() {
        obj.anim = PlayerAnim::Walk.id();
    }
    p.jumping = false;
    ctx.env.item_bonus = 0;
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vec2::{FixedVec2, SpeedVec};
    use crate::game::context::fixture::Fixture;
    use crate::game::input::{InputFrame, BUTTON_A};
    use crate::game::state::{
        ObjectScratch, Routine, BALL_HEIGHT_RADIUS, BALL_WIDTH_RADIUS, PLAYER_HEIGHT_RADIUS,
        PLAYER_WIDTH_RADIUS,
    };
    use crate::game::terrain::{Block, BlockTerrain};
    use proptest::prelude::*;

    // Ground surface at y = 256, so a standing player rests at y = 236.
    const REST_Y: i16 = 236;

    fn player(x: i16, y: i16) -> (ObjectState, PlayerScratch) {
        let mut obj = ObjectState::player(FixedVec2::from_pixels(x, y));
        obj.routine = Routine::Control;
        obj.x_rad = PLAYER_WIDTH_RADIUS;
        obj.y_rad = PLAYER_HEIGHT_RADIUS;
        let p = match std::mem::take(&mut obj.scratch) {
            ObjectScratch::Player(p) => p,
            _ => unreachable!(),
        };
        (obj, p)
    }

    fn step(fx: &mut Fixture, obj: &mut ObjectState, p: &mut PlayerScratch, held: u8, pressed: u8) {
        p.controls = InputFrame { held, pressed };
        integrate(obj, p, &mut fx.ctx());
    }

    #[test]
    fn test_at_rest_stays_put() {
        let mut fx = Fixture::flat();
        let (mut obj, mut p) = player(100, REST_Y);
        step(&mut fx, &mut obj, &mut p, 0, 0);

        assert_eq!(obj.inertia, 0);
        assert_eq!(obj.velocity, SpeedVec::ZERO);
        assert_eq!(obj.position, FixedVec2::from_pixels(100, REST_Y));
        assert_eq!(obj.anim, PlayerAnim::Wait.id());
        assert!(!obj.status.airborne);
        assert_eq!(fx.scratch.angle_buffer, [0, 0]);
        assert_eq!(fx.env.look_shift, LOOK_SHIFT_NEUTRAL);
    }

    #[test]
    fn test_accelerate_right() {
        let mut fx = Fixture::flat();
        let (mut obj, mut p) = player(100, REST_Y);
        step(&mut fx, &mut obj, &mut p, BUTTON_RIGHT, BUTTON_RIGHT);

        assert_eq!(obj.inertia, 0x0C);
        assert_eq!(obj.velocity, SpeedVec::new(0x0C, 0));
        assert_eq!(obj.anim, PlayerAnim::Walk.id());
        assert_eq!(obj.position.x, FixedVec2::from_pixels(100, 0).x + 0x0C00);
    }

    #[test]
    fn test_top_speed_cap() {
        let mut fx = Fixture::flat();
        let (mut obj, mut p) = player(100, REST_Y);
        obj.inertia = 0x5FA;
        step(&mut fx, &mut obj, &mut p, BUTTON_RIGHT, 0);
        assert_eq!(obj.inertia, 0x600);
    }

    #[test]
    fn test_friction_without_input() {
        let mut fx = Fixture::flat();
        let (mut obj, mut p) = player(100, REST_Y);
        obj.inertia = 0x100;
        step(&mut fx, &mut obj, &mut p, 0, 0);
        assert_eq!(obj.inertia, 0xF4);

        obj.inertia = -0x08;
        step(&mut fx, &mut obj, &mut p, 0, 0);
        assert_eq!(obj.inertia, 0);
    }

    #[test]
    fn test_reversal_skids() {
        let mut fx = Fixture::flat();
        let (mut obj, mut p) = player(100, REST_Y);
        obj.inertia = 0x500;
        step(&mut fx, &mut obj, &mut p, BUTTON_LEFT, BUTTON_LEFT);

        assert_eq!(obj.inertia, 0x480);
        assert_eq!(obj.anim, PlayerAnim::Stop.id());
        assert!(!obj.status.x_flip);
        assert_eq!(fx.sounds(), vec![SoundCue::Skid]);
    }

    #[test]
    fn test_reversal_through_zero_snaps() {
        let mut fx = Fixture::flat();
        let (mut obj, mut p) = player(100, REST_Y);
        obj.inertia = 0x40;
        step(&mut fx, &mut obj, &mut p, BUTTON_LEFT, BUTTON_LEFT);
        assert_eq!(obj.inertia, -TURN_SPEED);
        assert!(fx.sounds().is_empty());
    }

    #[test]
    fn test_turning_restarts_animation() {
        let mut fx = Fixture::flat();
        let (mut obj, mut p) = player(100, REST_Y);
        obj.prev_anim = PlayerAnim::Walk.id();
        obj.status.pushing = true;
        step(&mut fx, &mut obj, &mut p, BUTTON_LEFT, BUTTON_LEFT);

        assert!(obj.status.x_flip);
        assert!(!obj.status.pushing);
        assert_eq!(obj.prev_anim, 1);
        assert_eq!(obj.inertia, -0x0C);
    }

    #[test]
    fn test_jump_from_rest() {
        let mut fx = Fixture::flat();
        let (mut obj, mut p) = player(100, REST_Y);
        step(&mut fx, &mut obj, &mut p, BUTTON_A, BUTTON_A);

        assert!(obj.status.airborne);
        assert!(obj.status.ball_form);
        assert!(p.jumping);
        assert_eq!((obj.x_rad, obj.y_rad), (BALL_WIDTH_RADIUS, BALL_HEIGHT_RADIUS));
        assert_eq!(obj.position.py(), REST_Y + 5);
        assert_eq!(obj.velocity, SpeedVec::new(0, -JUMP_SPEED));
        assert_eq!(obj.anim, PlayerAnim::Roll.id());
        assert_eq!(fx.sounds(), vec![SoundCue::Jump]);
    }

    #[test]
    fn test_jump_needs_headroom() {
        let mut terrain = BlockTerrain::flat(64, 32, 16);
        let full = terrain.define(Block::full());
        for bx in 0..64 {
            terrain.place(bx, 13, full); // y 208..223, head is at 217
        }
        let mut fx = Fixture::with_terrain(terrain);
        let (mut obj, mut p) = player(100, REST_Y);
        step(&mut fx, &mut obj, &mut p, BUTTON_A, BUTTON_A);

        assert!(!obj.status.airborne);
        assert!(!p.jumping);
        assert!(fx.sounds().is_empty());
    }

    #[test]
    fn test_roll_jump_keeps_ball() {
        let mut fx = Fixture::flat();
        let (mut obj, mut p) = player(100, REST_Y);
        obj.enter_ball();
        obj.inertia = 0x300;
        step(&mut fx, &mut obj, &mut p, BUTTON_A, BUTTON_A);

        assert!(obj.status.airborne);
        assert!(obj.status.roll_jump);
        assert_eq!(obj.y_rad, BALL_HEIGHT_RADIUS);
        assert_eq!(obj.position.py(), REST_Y + 5);
    }

    #[test]
    fn test_roll_when_ducking_at_speed() {
        let mut fx = Fixture::flat();
        let (mut obj, mut p) = player(100, REST_Y);
        obj.inertia = 0x100;
        step(&mut fx, &mut obj, &mut p, BUTTON_DOWN, BUTTON_DOWN);

        assert!(obj.status.ball_form);
        assert_eq!(obj.anim, PlayerAnim::Roll.id());
        assert_eq!(obj.inertia, 0xF4);
        assert_eq!(obj.position.py(), REST_Y + 5);
        assert!(!obj.status.airborne);
        assert_eq!(fx.sounds(), vec![SoundCue::Roll]);
    }

    #[test]
    fn test_duck_and_look_up_move_camera() {
        let mut fx = Fixture::flat();
        let (mut obj, mut p) = player(100, REST_Y);
        step(&mut fx, &mut obj, &mut p, BUTTON_DOWN, BUTTON_DOWN);
        assert_eq!(obj.anim, PlayerAnim::Duck.id());
        assert_eq!(fx.env.look_shift, LOOK_SHIFT_NEUTRAL - 2);
        assert!(!obj.status.ball_form);

        step(&mut fx, &mut obj, &mut p, BUTTON_UP, BUTTON_UP);
        assert_eq!(obj.anim, PlayerAnim::LookUp.id());
        assert_eq!(fx.env.look_shift, LOOK_SHIFT_NEUTRAL);

        step(&mut fx, &mut obj, &mut p, 0, 0);
        fx.env.look_shift = LOOK_SHIFT_UP;
        step(&mut fx, &mut obj, &mut p, 0, 0);
        assert_eq!(fx.env.look_shift, LOOK_SHIFT_UP - 2);
    }

    #[test]
    fn test_wall_stops_and_pushes() {
        let mut terrain = BlockTerrain::flat(64, 32, 16);
        let full = terrain.define(Block::full());
        terrain.place(10, 15, full); // x 160..175, y 240..255
        let mut fx = Fixture::with_terrain(terrain);
        let (mut obj, mut p) = player(145, REST_Y);
        obj.inertia = 0x600;
        step(&mut fx, &mut obj, &mut p, BUTTON_RIGHT, 0);

        assert!(obj.status.pushing);
        assert_eq!(obj.inertia, 0);
        assert_eq!(obj.velocity.x, 0x400);
        assert_eq!(obj.position.px(), 149);
    }

    #[test]
    fn test_floor_snap_follows_small_steps() {
        let mut fx = Fixture::flat();
        let (mut obj, mut p) = player(100, REST_Y - 4);
        step(&mut fx, &mut obj, &mut p, 0, 0);
        assert_eq!(obj.position.py(), REST_Y);
        assert!(!obj.status.airborne);
    }

    #[test]
    fn test_ledge_drop_goes_airborne() {
        let mut fx = Fixture::flat();
        let (mut obj, mut p) = player(100, REST_Y - 20);
        obj.prev_anim = PlayerAnim::Walk.id();
        step(&mut fx, &mut obj, &mut p, 0, 0);
        assert!(obj.status.airborne);
        assert_eq!(obj.prev_anim, 1);
        assert_eq!(obj.position.py(), REST_Y - 20);

        let (mut obj, mut p) = player(100, REST_Y - 20);
        p.floor_clip = true;
        step(&mut fx, &mut obj, &mut p, 0, 0);
        assert!(!obj.status.airborne);
    }

    #[test]
    fn test_standing_on_object_skips_floor() {
        let mut fx = Fixture::flat();
        let (mut obj, mut p) = player(100, 100);
        obj.status.object_stand = true;
        step(&mut fx, &mut obj, &mut p, 0, 0);
        assert_eq!(fx.scratch.angle_buffer, [0, 0]);
        assert_eq!(obj.position.py(), 100);
        assert!(!obj.status.airborne);
    }

    #[test]
    fn test_balance_on_ledge() {
        let mut terrain = BlockTerrain::new(64, 32);
        let full = terrain.define(Block::full());
        for bx in 0..10 {
            for by in 16..32 {
                terrain.place(bx, by, full); // ground ends at x = 160
            }
        }
        let mut fx = Fixture::with_terrain(terrain);
        let (mut obj, mut p) = player(163, REST_Y);
        p.front_angle = NO_SURFACE_ANGLE;
        step(&mut fx, &mut obj, &mut p, 0, 0);

        assert_eq!(obj.anim, PlayerAnim::Balance.id());
        assert!(!obj.status.x_flip);
        // Back probe still on the ground
        assert!(!obj.status.airborne);
        assert_eq!(fx.scratch.angle_buffer, [NO_SURFACE_ANGLE, 0]);
    }

    #[test]
    fn test_balance_on_platform_edge() {
        let mut fx = Fixture::flat();
        let platform = ObjectState::platform(FixedVec2::from_pixels(200, 150), 16);
        let slot = fx.objects.spawn(platform).unwrap();

        let (mut obj, mut p) = player(186, 120);
        obj.status.object_stand = true;
        p.standing_on = Some(slot);
        step(&mut fx, &mut obj, &mut p, 0, 0);
        assert_eq!(obj.anim, PlayerAnim::Balance.id());
        assert!(obj.status.x_flip);

        // Middle of the platform
        let (mut obj, mut p) = player(200, 120);
        obj.status.object_stand = true;
        p.standing_on = Some(slot);
        step(&mut fx, &mut obj, &mut p, 0, 0);
        assert_eq!(obj.anim, PlayerAnim::Wait.id());

        // Right edge: 16 + 212 - 200 = 28, at the limit
        let (mut obj, mut p) = player(212, 120);
        obj.status.object_stand = true;
        p.standing_on = Some(slot);
        step(&mut fx, &mut obj, &mut p, 0, 0);
        assert_eq!(obj.anim, PlayerAnim::Balance.id());
        assert!(!obj.status.x_flip);
    }

    #[test]
    fn test_level_bound_left_edge() {
        let mut fx = Fixture::flat();
        let (mut obj, mut p) = player(10, REST_Y);
        obj.position.x += 0x8000;
        obj.inertia = -0x100;
        step(&mut fx, &mut obj, &mut p, BUTTON_LEFT, 0);

        assert_eq!(obj.position.x, FixedVec2::from_pixels(16, 0).x);
        assert_eq!(obj.inertia, 0);
        assert_eq!(obj.velocity.x, 0);
    }

    #[test]
    fn test_fall_into_pit_kills() {
        let mut fx = Fixture::flat();
        let bottom = fx.env.limits.bottom + SCREEN_HEIGHT;
        let (mut obj, mut p) = player(100, bottom);
        obj.status.airborne = true;
        step(&mut fx, &mut obj, &mut p, 0, 0);

        assert_eq!(obj.routine, Routine::Dead);
        assert!(fx
            .events
            .iter()
            .any(|e| e.data == GameEventData::PlayerKilled { cause: DeathCause::Pit }));
        assert_eq!(fx.sounds(), vec![SoundCue::Death]);
    }

    #[test]
    fn test_scrap_brain_warp() {
        let mut fx = Fixture::flat();
        fx.env.level = LevelId::new(Zone::ScrapBrain, 1);
        fx.env.last_lamp = 3;
        let bottom = fx.env.limits.bottom + SCREEN_HEIGHT;
        let (mut obj, mut p) = player(0x2000, bottom);
        obj.status.airborne = true;
        step(&mut fx, &mut obj, &mut p, 0, 0);

        assert_eq!(obj.routine, Routine::Control);
        assert_eq!(fx.env.level, LevelId::new(Zone::Labyrinth, 3));
        assert!(fx.env.restart);
        assert_eq!(fx.env.last_lamp, 0);
        assert!(fx.env.pending_transition.is_some());
    }

    #[test]
    fn test_falling_lands_on_floor() {
        let mut fx = Fixture::flat();
        let (mut obj, mut p) = player(100, REST_Y);
        obj.status.airborne = true;
        obj.velocity = SpeedVec::new(0x180, 0x400);
        step(&mut fx, &mut obj, &mut p, 0, 0);

        assert!(!obj.status.airborne);
        assert_eq!(obj.position.py(), REST_Y);
        assert_eq!(obj.velocity.y, 0);
        assert_eq!(obj.inertia, obj.velocity.x);
        assert_eq!(obj.anim, PlayerAnim::Walk.id());
    }

    #[test]
    fn test_landing_uncurls() {
        let mut fx = Fixture::flat();
        let (mut obj, mut p) = player(100, REST_Y);
        obj.enter_ball();
        obj.status.airborne = true;
        obj.status.roll_jump = true;
        p.jumping = true;
        fx.env.item_bonus = 4;
        obj.velocity = SpeedVec::new(0, 0x300);
        step(&mut fx, &mut obj, &mut p, 0, 0);

        assert!(!obj.status.ball_form);
        assert!(!obj.status.roll_jump);
        assert!(!p.jumping);
        assert_eq!(obj.y_rad, PLAYER_HEIGHT_RADIUS);
        assert_eq!(fx.env.item_bonus, 0);
        assert_eq!(obj.position.py(), REST_Y);
    }

    #[test]
    fn test_ceiling_stops_rise() {
        let mut terrain = BlockTerrain::flat(64, 32, 16);
        let full = terrain.define(Block::full());
        for bx in 0..64 {
            terrain.place(bx, 5, full); // y 80..95
        }
        let mut fx = Fixture::with_terrain(terrain);
        let (mut obj, mut p) = player(100, 118);
        obj.status.airborne = true;
        obj.velocity = SpeedVec::new(0, -0x400);
        step(&mut fx, &mut obj, &mut p, BUTTON_A, 0);

        assert_eq!(obj.velocity.y, 0);
        // Head at 114 - 19 = 95 is one pixel into the ceiling
        assert_eq!(obj.position.py(), 115);
    }

    #[test]
    fn test_jump_release_caps_rise() {
        let mut fx = Fixture::flat();
        let (mut obj, mut p) = player(100, 150);
        obj.status.airborne = true;
        p.jumping = true;
        obj.velocity = SpeedVec::new(0, -0x600);
        step(&mut fx, &mut obj, &mut p, 0, 0);
        assert_eq!(obj.velocity.y, JUMP_RELEASE_CAP + GRAVITY);

        obj.velocity = SpeedVec::new(0, -0x600);
        step(&mut fx, &mut obj, &mut p, BUTTON_A, 0);
        assert_eq!(obj.velocity.y, -0x600 + GRAVITY);
    }

    #[test]
    fn test_air_drag_near_apex() {
        let mut fx = Fixture::flat();
        let (mut obj, mut p) = player(100, 150);
        obj.status.airborne = true;
        obj.velocity = SpeedVec::new(0x200, -0x100);
        step(&mut fx, &mut obj, &mut p, 0, 0);
        assert_eq!(obj.velocity.x, 0x1F0);
    }

    #[test]
    fn test_air_control_steers() {
        let mut fx = Fixture::flat();
        let (mut obj, mut p) = player(100, 150);
        obj.status.airborne = true;
        obj.velocity = SpeedVec::new(0, 0x100);
        step(&mut fx, &mut obj, &mut p, BUTTON_LEFT, 0);
        assert_eq!(obj.velocity.x, -0x18);
        assert!(obj.status.x_flip);

        obj.status.roll_jump = true;
        step(&mut fx, &mut obj, &mut p, BUTTON_RIGHT, 0);
        assert_eq!(obj.velocity.x, -0x18);
    }

    #[test]
    fn test_jump_angle_eases_to_level() {
        let mut obj = player(0, 0).0;
        obj.angle = Angle(0x10);
        jump_angle(&mut obj);
        assert_eq!(obj.angle, Angle(0x0E));

        obj.angle = Angle(0xFF);
        jump_angle(&mut obj);
        assert_eq!(obj.angle, Angle::ZERO);

        obj.angle = Angle(0x01);
        jump_angle(&mut obj);
        assert_eq!(obj.angle, Angle::ZERO);
    }

    #[test]
    fn test_roll_unrolls_when_stopped() {
        let mut fx = Fixture::flat();
        let (mut obj, mut p) = player(100, REST_Y);
        obj.enter_ball();
        obj.inertia = 4;
        step(&mut fx, &mut obj, &mut p, 0, 0);

        assert!(!obj.status.ball_form);
        assert_eq!(obj.anim, PlayerAnim::Wait.id());
        assert_eq!(obj.position.py(), REST_Y);
    }

    #[test]
    fn test_roll_braking_and_cap() {
        let mut fx = Fixture::flat();
        let (mut obj, mut p) = player(100, REST_Y);
        obj.enter_ball();
        obj.inertia = 0x300;
        roll_speed(&mut obj, &p, &mut fx.ctx());
        assert_eq!(obj.inertia, 0x300 - 6);

        p.controls = InputFrame::hold(BUTTON_LEFT);
        roll_speed(&mut obj, &p, &mut fx.ctx());
        assert_eq!(obj.inertia, 0x2FA - 0x20 - 6);

        obj.inertia = 0x1400;
        p.controls = InputFrame::new();
        roll_speed(&mut obj, &p, &mut fx.ctx());
        assert_eq!(obj.velocity.x, ROLL_SPEED_CAP);
    }

    #[test]
    fn test_roll_repel_weaker_uphill() {
        let mut obj = player(0, 0).0;
        obj.angle = Angle(0x20);
        obj.inertia = 0x100;
        roll_repel(&mut obj);
        let downhill = obj.inertia - 0x100;
        assert!(downhill > 0);

        obj.inertia = -0x100;
        roll_repel(&mut obj);
        assert_eq!(obj.inertia + 0x100, downhill >> 2);

        obj.angle = Angle(0x80);
        obj.inertia = 0x100;
        roll_repel(&mut obj);
        assert_eq!(obj.inertia, 0x100);
    }

    #[test]
    fn test_slope_repel_sheds_slow_player() {
        let (mut obj, mut p) = player(0, 0);
        obj.angle = Angle(0x40);
        obj.inertia = 0x100;
        slope_repel(&mut obj, &mut p);
        assert!(obj.status.airborne);
        assert_eq!(obj.inertia, 0);
        assert_eq!(p.control_lock, SLIP_LOCK_TICKS);

        slope_repel(&mut obj, &mut p);
        assert_eq!(p.control_lock, SLIP_LOCK_TICKS - 1);
    }

    #[test]
    fn test_slope_resist_only_when_moving() {
        let mut obj = player(0, 0).0;
        obj.angle = Angle(0x20);
        slope_resist(&mut obj);
        assert_eq!(obj.inertia, 0);

        obj.inertia = 0x100;
        slope_resist(&mut obj);
        let (sin, _) = sin_cos(Angle(0x20));
        assert_eq!(obj.inertia, 0x100 + ((sin as i32 * 0x20) >> 8) as i16);
    }

    #[test]
    fn test_control_lock_ignores_walk_input() {
        let mut fx = Fixture::flat();
        let (mut obj, mut p) = player(100, REST_Y);
        p.control_lock = 5;
        step(&mut fx, &mut obj, &mut p, BUTTON_RIGHT, BUTTON_RIGHT);
        assert_eq!(obj.inertia, 0);
        assert_eq!(p.control_lock, 4);
    }

    proptest! {
        #[test]
        fn prop_friction_never_speeds_up(inertia in -0x600i16..=0x600) {
            let mut fx = Fixture::flat();
            let (mut obj, mut p) = player(300, REST_Y);
            obj.inertia = inertia;
            p.controls = InputFrame::new();
            move_ground(&mut obj, &mut p, &mut fx.ctx());
            prop_assert!(obj.inertia.abs() <= inertia.abs());
            prop_assert!(obj.inertia == 0 || obj.inertia.signum() == inertia.signum());
        }

        #[test]
        fn prop_ground_velocity_follows_angle(angle in any::<u8>(), inertia in -0x1000i16..=0x1000) {
            let mut fx = Fixture::with_terrain(BlockTerrain::new(64, 32));
            fx.env.jump_only = true;
            let (mut obj, mut p) = player(300, REST_Y);
            obj.angle = Angle(angle);
            obj.inertia = inertia;
            move_ground(&mut obj, &mut p, &mut fx.ctx());

            let (sin, cos) = sin_cos(Angle(angle));
            prop_assert_eq!(obj.inertia, inertia);
            prop_assert_eq!(obj.velocity, SpeedVec::new(trig_scale(cos, inertia), trig_scale(sin, inertia)));
        }
    }
}
