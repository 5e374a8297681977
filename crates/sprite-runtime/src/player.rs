// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Player movement and animation selection.

use crate::input::InputFrame;
use crate::settings::{AnimationSettings, PlayerSettings};
use sprite_core::animation::{Animation, PingPong};
use std::time::{Duration, Instant};

/// Idle frames.
pub const STAND_FRAMES: &[&str] = &["stand1", "stand2", "stand3", "stand4"];
/// Attack frames.
pub const HIT_FRAMES: &[&str] = &["hit1", "hit2", "hit3", "hit4"];
/// Walk frames. Some frames repeat to hold the pose.
pub const MOVE_FRAMES: &[&str] = &[
    "mv1", "mv2", "mv3", "mv4", "mv4", "mv5", "mv4", "mv6",
];

/// A 2D position or velocity.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    /// Horizontal component.
    pub x: f32,
    /// Vertical component, growing downwards.
    pub y: f32,
}

impl Vec2 {
    /// Creates a vector.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Which animation the player is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pose {
    /// Idle.
    Stand,
    /// Walking.
    Move,
    /// Attacking.
    Hit,
}

impl Pose {
    /// The frame identifiers of this pose.
    pub fn frames(self) -> &'static [&'static str] {
        match self {
            Pose::Stand => STAND_FRAMES,
            Pose::Move => MOVE_FRAMES,
            Pose::Hit => HIT_FRAMES,
        }
    }
}

/// The player character.
#[derive(Debug, Clone)]
pub struct Player {
    /// Top-left corner of the sprite.
    pub pos: Vec2,
    /// Resting position; its `y` is the ground line.
    pub ground: Vec2,
    /// Vertical velocity.
    pub velocity_y: f32,
    /// Whether the player stands on the ground.
    pub on_ground: bool,
    /// Whether the sprite is mirrored (facing left).
    pub flip: bool,
    /// Whether the player moved this frame.
    pub moving: bool,
    /// Idle loop.
    pub stand: Animation,
    /// Walk loop.
    pub walk: Animation,
    /// Attack swing.
    pub hit: PingPong,
    settings: PlayerSettings,
}

impl Player {
    /// Places the player on the ground near the left edge.
    pub fn new(
        settings: &PlayerSettings,
        animation: &AnimationSettings,
        screen_height: f32,
        now: Instant,
    ) -> Self {
        let ground = Vec2::new(settings.start_x, screen_height - settings.ground_offset);
        let mut stand = Animation::new(
            STAND_FRAMES.len(),
            Duration::from_millis(animation.stand_delay_ms),
            now,
        );
        stand.playing = true;

        Self {
            pos: ground,
            ground,
            velocity_y: 0.0,
            on_ground: true,
            flip: false,
            moving: false,
            stand,
            walk: Animation::new(
                MOVE_FRAMES.len(),
                Duration::from_millis(animation.move_delay_ms),
                now,
            ),
            hit: PingPong::new(
                HIT_FRAMES.len(),
                Duration::from_millis(animation.hit_delay_ms),
                now,
            ),
            settings: settings.clone(),
        }
    }

    /// Advances one frame.
    ///
    /// `sprite_width` is the drawn width of the walk sprite, used to keep the
    /// player inside the screen.
    pub fn update(&mut self, input: &InputFrame, now: Instant, screen_width: f32, sprite_width: f32) {
        self.moving = false;

        if input.left {
            if self.pos.x > 0.0 {
                self.pos.x -= self.settings.speed;
                self.moving = true;
            }
            self.flip = true;
        }
        if input.right {
            if self.pos.x + sprite_width < screen_width {
                self.pos.x += self.settings.speed;
                self.moving = true;
            }
            self.flip = false;
        }
        self.walk.update(self.moving && !self.hit.playing, now);

        self.velocity_y += self.settings.gravity;
        self.pos.y += self.velocity_y;
        if self.pos.y >= self.ground.y {
            self.pos.y = self.ground.y;
            self.velocity_y = 0.0;
            self.on_ground = true;
        } else {
            self.on_ground = false;
        }

        if input.jump && self.on_ground {
            self.velocity_y = self.settings.jump_force;
            self.on_ground = false;
        }

        if input.hit {
            self.hit.trigger(now);
        }
        self.hit.update(now);

        if !self.moving && !self.hit.playing {
            self.stand.update(true, now);
        }
    }

    /// The pose to draw this frame.
    pub fn pose(&self, input: &InputFrame) -> Pose {
        if self.hit.playing && self.hit.current_frame < self.hit.frame_count {
            Pose::Hit
        } else if input.is_moving() {
            Pose::Move
        } else {
            Pose::Stand
        }
    }

    /// The frame identifier to draw for `pose`.
    pub fn frame_id(&self, pose: Pose) -> &'static str {
        let frames = pose.frames();
        let index = match pose {
            Pose::Stand => self.stand.current_frame,
            Pose::Move => self.walk.current_frame,
            Pose::Hit => self.hit.current_frame,
        };
        frames[index % frames.len()]
    }

    /// Scale applied to frame textures.
    pub fn scale(&self) -> f32 {
        self.settings.scale
    }
}
