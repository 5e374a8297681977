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

use image::codecs::gif::GifEncoder;
use image::{Delay, Frame, Rgba, RgbaImage};
use sprite_core::asset::AssetState;
use sprite_runtime::player::{HIT_FRAMES, MOVE_FRAMES, STAND_FRAMES};
use sprite_runtime::{App, Settings};
use std::fs::File;
use std::path::Path;
use std::time::Duration;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn write_assets(dir: &Path) {
    for name in STAND_FRAMES.iter().chain(HIT_FRAMES).chain(MOVE_FRAMES) {
        RgbaImage::from_pixel(8, 8, Rgba([200, 100, 50, 255]))
            .save(dir.join(format!("{name}.png")))
            .unwrap();
    }
    RgbaImage::from_pixel(4, 2, Rgba([0, 0, 0, 255]))
        .save(dir.join("hud.png"))
        .unwrap();

    let file = File::create(dir.join("a.gif")).unwrap();
    let mut encoder = GifEncoder::new(file);
    let frames = [Rgba([255, 0, 0, 255]), Rgba([0, 0, 255, 255])]
        .into_iter()
        .map(|color| {
            Frame::from_parts(
                RgbaImage::from_pixel(6, 4, color),
                0,
                0,
                Delay::from_numer_denom_ms(100, 1),
            )
        });
    encoder.encode_frames(frames).unwrap();
}

fn settings(dir: &Path) -> Settings {
    let mut settings = Settings::default();
    settings.assets.dir = dir.to_path_buf();
    settings.assets.frame_size = 16;
    settings.assets.ui = vec!["hud".to_string()];
    settings.cache = settings.cache.clone().with_debounce(Duration::from_millis(20));
    settings
}

#[test]
fn demo_run_loads_draws_and_frees_everything() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    write_assets(dir.path());

    let mut app = App::start(settings(dir.path())).unwrap();

    for frame in STAND_FRAMES.iter().chain(HIT_FRAMES).chain(MOVE_FRAMES) {
        let snapshot = app.cache().snapshot(frame).unwrap();
        assert_eq!(snapshot.state, AssetState::Loaded, "{frame}");
        assert_eq!(snapshot.size_bytes, 16 * 16 * 4);
    }
    assert_eq!(app.cache().snapshot("mv4").unwrap().ref_count, 3);

    let frames = 360;
    let draws = app.run(frames);
    assert!(draws >= 2 * frames as usize);
    assert_eq!(app.frame(), frames);

    let device = app.device().clone();
    let stats = app.shutdown();
    assert_eq!(stats.load_failures, 0);
    assert_eq!(stats.loaded, 0);
    assert_eq!(stats.memory_used, 0);
    assert_eq!(device.texture_count(), 0);
    assert_eq!(device.resident_bytes(), 0);
}

#[test]
fn demo_script_walks_the_player_right() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    write_assets(dir.path());

    let mut app = App::start(settings(dir.path())).unwrap();
    let start_x = app.player().pos.x;
    app.run(180);

    assert_eq!(app.player().pos.x, start_x + 120.0 * 5.0);
    assert!(app.player().on_ground);
    assert!(!app.player().flip);
    app.shutdown();
}

#[test]
fn missing_assets_leave_the_runtime_usable() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let mut settings = settings(&dir.path().join("nowhere"));
    settings.assets.ui.clear();

    let mut app = App::start(settings).unwrap();
    assert_eq!(app.device().texture_count(), 0);
    assert_eq!(
        app.cache().snapshot("stand1").unwrap().ref_count,
        0,
        "failed high priority requests give their reference back"
    );

    assert_eq!(app.run(30), 0);

    let device = app.device().clone();
    let stats = app.shutdown();
    assert_eq!(stats.loads, 0);
    assert!(stats.load_failures >= 14);
    assert_eq!(device.texture_count(), 0);
}
