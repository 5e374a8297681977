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

//! The headless application: asset groups, the player and the frame loop.

use crate::input::{demo_input, InputFrame};
use crate::player::{Player, HIT_FRAMES, MOVE_FRAMES, STAND_FRAMES};
use crate::settings::Settings;
use anyhow::{Context, Result};
use sprite_cache::{AssetCache, AssetGroup, CacheStats, CacheWorkers};
use sprite_core::animation::Animation;
use sprite_core::asset::Priority;
use sprite_core::texture::TextureId;
use sprite_infra::{load_gif_frames, TextureDevice, TextureLoader};
use sprite_telemetry::{CounterHandle, MetricsRegistry};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Simulated time between two frames.
pub const FRAME_TIME_MS: u64 = 16;

/// One textured quad to draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCommand {
    /// The texture to sample.
    pub texture: TextureId,
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Drawn width.
    pub width: f32,
    /// Drawn height.
    pub height: f32,
    /// Mirror horizontally.
    pub flip: bool,
}

#[derive(Debug)]
struct Background {
    frames: Vec<TextureId>,
    animation: Animation,
}

/// The running application.
pub struct App {
    settings: Settings,
    metrics: MetricsRegistry,
    device: Arc<TextureDevice>,
    cache: AssetCache<TextureLoader>,
    workers: CacheWorkers<TextureLoader>,
    character: AssetGroup<TextureLoader>,
    ui: AssetGroup<TextureLoader>,
    background: Option<Background>,
    player: Player,
    start: Instant,
    frame: u64,
    frames_total: CounterHandle,
}

impl App {
    /// Builds the cache, starts its workers and loads the initial assets.
    ///
    /// Character frames are loaded at high priority, so they are resident when
    /// this returns. UI assets load in the background.
    pub fn start(settings: Settings) -> Result<Self> {
        let metrics = MetricsRegistry::new();
        let device = Arc::new(TextureDevice::new());

        let mut loader = TextureLoader::new(&settings.assets.dir, device.clone());
        let frame_size = settings.assets.frame_size;
        if frame_size > 0 {
            loader = loader.with_resize(frame_size, frame_size);
        }

        let cache = AssetCache::new(settings.cache.clone(), loader, &metrics)
            .context("Failed to create the asset cache")?;
        let workers = cache
            .spawn_workers()
            .context("Failed to start the asset cache workers")?;
        let frames_total = metrics
            .register_counter("runtime", "frames_total", "Frames stepped")
            .context("Failed to register runtime metrics")?;

        let mut character = AssetGroup::new(&cache, "character");
        let frames = STAND_FRAMES.iter().chain(HIT_FRAMES).chain(MOVE_FRAMES).copied();
        let report = character.load_group(frames, Priority::High);
        if !report.is_complete() {
            log::warn!(
                "App: {} character frames failed to load, they will not be drawn",
                report.failed.len()
            );
        }

        let mut ui = AssetGroup::new(&cache, "ui");
        ui.load_group(settings.assets.ui.iter().map(String::as_str), Priority::Medium);

        let start = Instant::now();
        let background = load_background(&settings, &device, start);
        let player = Player::new(
            &settings.player,
            &settings.animation,
            settings.window.height,
            start,
        );

        log::info!(
            "App: Started with {} resident textures ({} bytes)",
            device.texture_count(),
            device.resident_bytes()
        );

        Ok(Self {
            settings,
            metrics,
            device,
            cache,
            workers,
            character,
            ui,
            background,
            player,
            start,
            frame: 0,
            frames_total,
        })
    }

    /// The asset cache.
    pub fn cache(&self) -> &AssetCache<TextureLoader> {
        &self.cache
    }

    /// The texture device.
    pub fn device(&self) -> &Arc<TextureDevice> {
        &self.device
    }

    /// The metrics registry every component publishes to.
    pub fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }

    /// The player.
    pub fn player(&self) -> &Player {
        &self.player
    }

    /// Number of frames stepped so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Advances the world by one frame and returns what to draw, back to front.
    pub fn step(&mut self, input: &InputFrame, now: Instant) -> Vec<DrawCommand> {
        let mut commands = Vec::new();

        if let Some(background) = &mut self.background {
            background.animation.update(true, now);
            let texture = background.frames[background.animation.current_frame];
            commands.push(DrawCommand {
                texture,
                x: 0.0,
                y: 0.0,
                width: self.settings.window.width,
                height: self.settings.window.height,
                flip: false,
            });
        }

        let scale = self.player.scale();
        let sprite_width = self
            .texture_size(MOVE_FRAMES[0])
            .map(|(width, _)| width as f32 * scale)
            .unwrap_or(self.settings.assets.frame_size as f32 * scale);
        self.player
            .update(input, now, self.settings.window.width, sprite_width);

        let pose = self.player.pose(input);
        let frame_id = self.player.frame_id(pose);
        match self.character.resource(frame_id) {
            Some(texture) => {
                if let Some((width, height)) = self.device.dimensions(texture) {
                    commands.push(DrawCommand {
                        texture,
                        x: self.player.pos.x,
                        y: self.player.pos.y,
                        width: width as f32 * scale,
                        height: height as f32 * scale,
                        flip: self.player.flip,
                    });
                }
            }
            None => log::trace!("App: Frame '{}' is not loaded, skipping", frame_id),
        }

        let mut x = 0.0;
        for id in &self.settings.assets.ui {
            let Some(texture) = self.ui.resource(id) else {
                continue;
            };
            if let Some((width, height)) = self.device.dimensions(texture) {
                commands.push(DrawCommand {
                    texture,
                    x,
                    y: 0.0,
                    width: width as f32,
                    height: height as f32,
                    flip: false,
                });
                x += width as f32;
            }
        }

        log::trace!("App: Frame {} issues {} draws", self.frame, commands.len());

        self.frame += 1;
        if let Err(e) = self.frames_total.increment() {
            log::warn!("App: Failed to update metric {}: {}", self.frames_total.id(), e);
        }
        commands
    }

    /// Runs `frames` frames of the demo input on a simulated clock.
    ///
    /// Returns the total number of draw commands issued.
    pub fn run(&mut self, frames: u64) -> usize {
        let mut draws = 0;
        for _ in 0..frames {
            let now = self.start + Duration::from_millis(FRAME_TIME_MS * self.frame);
            let input = demo_input(self.frame);
            draws += self.step(&input, now).len();
        }
        log::info!("App: Ran {} frames, {} draws", frames, draws);
        draws
    }

    /// Releases every asset, stops the workers and frees all textures.
    ///
    /// Returns the final cache statistics.
    pub fn shutdown(mut self) -> CacheStats {
        self.character.unload_group();
        self.ui.unload_group();
        self.workers.shutdown();
        self.cache.purge();

        if let Some(background) = self.background.take() {
            for texture in background.frames {
                self.device.destroy(texture);
            }
        }

        let stats = self.cache.stats();
        log::info!(
            "App: Shut down after {} frames: {} loads, {} failures, {} unloads, {} evictions, {} textures left",
            self.frame,
            stats.loads,
            stats.load_failures,
            stats.unloads,
            stats.evictions,
            self.device.texture_count()
        );
        stats
    }

    fn texture_size(&self, id: &str) -> Option<(u32, u32)> {
        self.character
            .resource(id)
            .and_then(|texture| self.device.dimensions(texture))
    }
}

/// The background is drawn every frame for the whole run, so it is uploaded
/// straight to the device rather than going through the cache.
fn load_background(settings: &Settings, device: &TextureDevice, now: Instant) -> Option<Background> {
    let file = settings.assets.background.as_ref()?;
    let path = settings.assets.dir.join(file);
    match load_gif_frames(&path) {
        Ok(textures) => {
            let frames: Vec<TextureId> = textures
                .into_iter()
                .map(|texture| device.upload(texture))
                .collect();
            log::info!("App: Loaded background with {} frames", frames.len());
            Some(Background {
                animation: Animation::new(
                    frames.len(),
                    Duration::from_millis(settings.animation.background_delay_ms),
                    now,
                ),
                frames,
            })
        }
        Err(e) => {
            log::warn!("App: No background: {}", e);
            None
        }
    }
}
