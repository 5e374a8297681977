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

//! Per-frame input, produced by a script instead of a keyboard.

/// The keys that matter to the player for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputFrame {
    /// Left held.
    pub left: bool,
    /// Right held.
    pub right: bool,
    /// Jump pressed this frame.
    pub jump: bool,
    /// Attack pressed this frame.
    pub hit: bool,
}

impl InputFrame {
    /// Returns `true` if a horizontal direction is held.
    pub fn is_moving(&self) -> bool {
        self.left || self.right
    }
}

/// Length of the demo script loop, in frames.
pub const DEMO_LOOP_FRAMES: u64 = 360;

/// A fixed input loop exercising every animation: idle, walk right with a
/// jump, an attack, then walk back left with another jump.
pub fn demo_input(frame: u64) -> InputFrame {
    let t = frame % DEMO_LOOP_FRAMES;
    InputFrame {
        right: (60..180).contains(&t),
        left: (240..330).contains(&t),
        jump: t == 120 || t == 270,
        hit: t == 200,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_loop_covers_every_action() {
        let frames: Vec<_> = (0..DEMO_LOOP_FRAMES).map(demo_input).collect();
        assert!(frames.iter().any(|f| f.left));
        assert!(frames.iter().any(|f| f.right));
        assert_eq!(frames.iter().filter(|f| f.jump).count(), 2);
        assert_eq!(frames.iter().filter(|f| f.hit).count(), 1);
        assert!(!frames.iter().any(|f| f.left && f.right));
        assert_eq!(demo_input(DEMO_LOOP_FRAMES + 200), demo_input(200));
    }
}
