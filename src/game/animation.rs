//! Script-Driven Animation
//!
//! Each animation is a delay byte followed by one-byte commands:
//!
//! ```text
//!   0x00..=0x7F   show this mapping frame, advance
//!   0xFF          restart from the first command
//!   0xFE k        jump back k commands
//!   0xFD id       switch to animation `id` (takes effect next step)
//! ```
//!
//! A non-negative delay is the hold time of every frame. A negative delay
//! marks a procedural animation whose frames come from a speed-selected
//! sub-script:
//!
//! ```text
//!   -1   walk / run     delay (0x800 - |inertia|) >> 8, frame rotated by slope
//!   -2   roll / roll2   delay (0x400 - |inertia|) >> 8
//!   ≤-3  push           delay (0x800 - |inertia|) >> 6
//! ```
//!
//! Scripts are validated while they run. On a decode error every animation
//! field is put back as it was, so the object keeps showing its last good
//! frame.

use crate::core::fixed::{speed_abs, Speed};
use crate::game::resources::{
    AnimationTable, DecodeError, PlayerAnim, Script, OP_BACK, OP_CHANGE, OP_RESTART,
};
use crate::game::state::{ObjectState, RenderFlags};

/// Ground speed at which walking turns into running (and roll into roll2).
pub const RUN_SPEED: Speed = 0x600;

/// High bit set on opcodes.
const OPCODE_BIT: u8 = 0x80;

/// Animation fields saved before a step.
#[derive(Clone, Copy)]
struct Cursor {
    anim: u8,
    prev_anim: u8,
    anim_frame: u8,
    frame: u8,
    frame_time: i8,
    render: RenderFlags,
}

impl Cursor {
    fn save(obj: &ObjectState) -> Self {
        Self {
            anim: obj.anim,
            prev_anim: obj.prev_anim,
            anim_frame: obj.anim_frame,
            frame: obj.frame,
            frame_time: obj.frame_time,
            render: obj.render,
        }
    }

    fn restore(self, obj: &mut ObjectState) {
        obj.anim = self.anim;
        obj.prev_anim = self.prev_anim;
        obj.anim_frame = self.anim_frame;
        obj.frame = self.frame;
        obj.frame_time = self.frame_time;
        obj.render = self.render;
    }
}

/// Advance the object's animation by one tick.
pub fn animate(obj: &mut ObjectState, table: &AnimationTable) -> Result<(), DecodeError> {
    let saved = Cursor::save(obj);
    let result = step(obj, table);
    if result.is_err() {
        saved.restore(obj);
    }
    result
}

fn step(obj: &mut ObjectState, table: &AnimationTable) -> Result<(), DecodeError> {
    if obj.anim != obj.prev_anim {
        obj.prev_anim = obj.anim;
        obj.anim_frame = 0;
        obj.frame_time = 0;
    }

    let script = table.script(obj.anim)?;

    if script.delay >= 0 {
        obj.render = RenderFlags { x_flip: obj.status.x_flip, y_flip: false };
        if hold(obj) {
            return Ok(());
        }
        obj.frame_time = script.delay;
        return read_frame(obj, &script);
    }

    if hold(obj) {
        return Ok(());
    }
    match script.delay {
        -1 => walk(obj, table),
        -2 => roll(obj, table),
        _ => push(obj, table),
    }
}

/// Count the frame timer down; true while the current frame is held.
#[inline]
fn hold(obj: &mut ObjectState) -> bool {
    obj.frame_time = obj.frame_time.wrapping_sub(1);
    obj.frame_time >= 0
}

/// Delay for a speed-scaled animation: `max(0, base - speed) >> shift`.
#[inline]
pub fn speed_delay(speed: Speed, base: Speed, shift: u32) -> i8 {
    (base.wrapping_sub(speed).max(0) >> shift) as i8
}

/// Execute the command under the cursor of `script`.
pub fn read_frame(obj: &mut ObjectState, script: &Script<'_>) -> Result<(), DecodeError> {
    let index = obj.anim_frame as usize;
    let frame = match script.command(index)? {
        cmd if cmd & OPCODE_BIT == 0 => cmd,
        OP_RESTART => {
            obj.anim_frame = 0;
            frame_at(script, 0)?
        }
        OP_BACK => {
            let by = script.command(index + 1)?;
            let target = index
                .checked_sub(by as usize)
                .ok_or(DecodeError::NegativeBackJump { anim: script.id, index, by })?;
            obj.anim_frame = target as u8;
            frame_at(script, target)?
        }
        OP_CHANGE => {
            obj.anim = script.command(index + 1)?;
            return Ok(());
        }
        opcode => {
            return Err(DecodeError::UnknownOpcode { anim: script.id, opcode, index });
        }
    };

    obj.frame = frame;
    obj.anim_frame = obj.anim_frame.wrapping_add(1);
    Ok(())
}

/// Frame a restart or back-jump lands on.
fn frame_at(script: &Script<'_>, index: usize) -> Result<u8, DecodeError> {
    let cmd = script.command(index)?;
    if cmd & OPCODE_BIT != 0 {
        return Err(DecodeError::UnknownOpcode { anim: script.id, opcode: cmd, index });
    }
    Ok(cmd)
}

/// Look up a speed-selected sub-script. The cursor is shared between
/// sub-scripts of different lengths, so one past the end starts over.
fn sub_script<'t>(
    obj: &mut ObjectState,
    table: &'t AnimationTable,
    anim: PlayerAnim,
) -> Result<Script<'t>, DecodeError> {
    let script = table.script(anim.id())?;
    if obj.anim_frame as usize >= script.len() {
        obj.anim_frame = 0;
    }
    Ok(script)
}

fn walk(obj: &mut ObjectState, table: &AnimationTable) -> Result<(), DecodeError> {
    let mut angle = obj.angle.raw();
    let mut flip = obj.status.x_flip as u8;
    if flip == 0 {
        angle = !angle;
    }
    angle = angle.wrapping_add(0x10);
    if angle & 0x80 != 0 {
        flip ^= 3;
    }
    obj.render = RenderFlags { x_flip: flip & 1 != 0, y_flip: flip & 2 != 0 };

    if obj.status.pushing {
        return push(obj, table);
    }

    let mut rotation = (angle >> 4) & 6;
    let speed = speed_abs(obj.inertia);
    let anim = if speed >= RUN_SPEED {
        PlayerAnim::Run
    } else {
        rotation += rotation >> 1;
        PlayerAnim::Walk
    };
    rotation <<= 1;

    obj.frame_time = speed_delay(speed, 0x800, 8);
    let script = sub_script(obj, table, anim)?;
    read_frame(obj, &script)?;
    obj.frame = obj.frame.wrapping_add(rotation);
    Ok(())
}

fn roll(obj: &mut ObjectState, table: &AnimationTable) -> Result<(), DecodeError> {
    let speed = speed_abs(obj.inertia);
    let anim = if speed >= RUN_SPEED { PlayerAnim::Roll2 } else { PlayerAnim::Roll };
    obj.frame_time = speed_delay(speed, 0x400, 8);
    obj.render = RenderFlags { x_flip: obj.status.x_flip, y_flip: false };

    let script = sub_script(obj, table, anim)?;
    read_frame(obj, &script)
}

fn push(obj: &mut ObjectState, table: &AnimationTable) -> Result<(), DecodeError> {
    let speed = speed_abs(obj.inertia);
    obj.frame_time = speed_delay(speed, 0x800, 6);
    obj.render = RenderFlags { x_flip: obj.status.x_flip, y_flip: false };

    let script = sub_script(obj, table, PlayerAnim::Push)?;
    read_frame(obj, &script)
}

// =============================================================================
// TESTS
// =============================================================================
