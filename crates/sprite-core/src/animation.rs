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

//! Frame-index stepping for sprite animations.
//!
//! These types only track which frame of a sequence is current. Which texture
//! backs each frame, and how it is drawn, is up to the caller.

use std::time::{Duration, Instant};

/// A looping frame sequence advanced on a fixed delay.
#[derive(Debug, Clone)]
pub struct Animation {
    /// Index of the frame to draw.
    pub current_frame: usize,
    /// Number of frames in the sequence.
    pub frame_count: usize,
    /// Minimum time between two frame advances.
    pub frame_delay: Duration,
    /// When the current frame started.
    pub last_step: Instant,
    /// Whether the animation is running.
    pub playing: bool,
}

impl Animation {
    /// Creates a stopped animation at frame 0.
    pub fn new(frame_count: usize, frame_delay: Duration, now: Instant) -> Self {
        Self {
            current_frame: 0,
            frame_count,
            frame_delay,
            last_step: now,
            playing: false,
        }
    }

    /// Advances the loop if `should_update` is set and the delay has elapsed.
    ///
    /// When `should_update` is false the animation rewinds to frame 0 and
    /// restarts its clock, so it resumes from the beginning next time.
    pub fn update(&mut self, should_update: bool, now: Instant) {
        if self.frame_count == 0 {
            return;
        }

        if should_update {
            if now.saturating_duration_since(self.last_step) > self.frame_delay {
                self.last_step = now;
                self.current_frame = (self.current_frame + 1) % self.frame_count;
            }
        } else {
            self.current_frame = 0;
            self.last_step = now;
        }
    }
}

/// A one-shot sequence that plays forward then back, e.g. an attack swing.
#[derive(Debug, Clone)]
pub struct PingPong {
    /// Index of the frame to draw.
    pub current_frame: usize,
    /// Number of frames in the sequence.
    pub frame_count: usize,
    /// Minimum time between two frame advances.
    pub frame_delay: Duration,
    /// When the current frame started.
    pub last_step: Instant,
    /// Whether the sequence is running.
    pub playing: bool,
    /// Whether the sequence is on its way back to frame 0.
    pub reversing: bool,
}

/// Frame a ping-pong sequence starts on when triggered.
pub const PING_PONG_START_FRAME: usize = 2;

impl PingPong {
    /// Creates an idle sequence.
    pub fn new(frame_count: usize, frame_delay: Duration, now: Instant) -> Self {
        Self {
            current_frame: 0,
            frame_count,
            frame_delay,
            last_step: now,
            playing: false,
            reversing: false,
        }
    }

    /// Starts the sequence unless it is already running.
    ///
    /// Returns `true` if the sequence was started.
    pub fn trigger(&mut self, now: Instant) -> bool {
        if self.playing || self.frame_count == 0 {
            return false;
        }
        self.playing = true;
        self.reversing = false;
        self.current_frame = PING_PONG_START_FRAME.min(self.frame_count - 1);
        self.last_step = now;
        true
    }

    /// Steps the sequence. Stops once it has come back to frame 0.
    pub fn update(&mut self, now: Instant) {
        if !self.playing || now.saturating_duration_since(self.last_step) <= self.frame_delay {
            return;
        }
        self.last_step = now;

        if self.reversing {
            self.current_frame = self.current_frame.saturating_sub(1);
            if self.current_frame == 0 {
                self.playing = false;
                self.reversing = false;
            }
        } else {
            self.current_frame += 1;
            if self.current_frame >= self.frame_count {
                self.current_frame = self.frame_count - 1;
                self.reversing = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(100);

    #[test]
    fn loop_advances_only_after_delay() {
        let start = Instant::now();
        let mut anim = Animation::new(3, DELAY, start);

        anim.update(true, start + Duration::from_millis(50));
        assert_eq!(anim.current_frame, 0);

        anim.update(true, start + Duration::from_millis(150));
        assert_eq!(anim.current_frame, 1);
    }

    #[test]
    fn loop_wraps_around() {
        let start = Instant::now();
        let mut anim = Animation::new(2, DELAY, start);
        anim.update(true, start + DELAY * 2);
        anim.update(true, start + DELAY * 4);
        assert_eq!(anim.current_frame, 0);
    }

    #[test]
    fn loop_rewinds_when_not_updating() {
        let start = Instant::now();
        let mut anim = Animation::new(4, DELAY, start);
        anim.update(true, start + DELAY * 2);
        assert_eq!(anim.current_frame, 1);

        let later = start + DELAY * 3;
        anim.update(false, later);
        assert_eq!(anim.current_frame, 0);
        assert_eq!(anim.last_step, later);
    }

    #[test]
    fn empty_loop_is_a_no_op() {
        let start = Instant::now();
        let mut anim = Animation::new(0, DELAY, start);
        anim.update(true, start + DELAY * 5);
        assert_eq!(anim.current_frame, 0);
    }

    #[test]
    fn ping_pong_plays_forward_then_back() {
        let start = Instant::now();
        let mut hit = PingPong::new(4, DELAY, start);
        assert!(hit.trigger(start));
        assert!(!hit.trigger(start), "already playing");
        assert_eq!(hit.current_frame, 2);

        let mut frames = Vec::new();
        let mut now = start;
        while hit.playing {
            now += DELAY * 2;
            hit.update(now);
            frames.push(hit.current_frame);
        }

        assert_eq!(frames, vec![3, 3, 2, 1, 0]);
        assert!(!hit.reversing);
    }
}
