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

use image::{Rgba, RgbaImage};
use sprite_cache::{AssetCache, AssetGroup, CacheConfig};
use sprite_core::asset::{AssetState, Priority};
use sprite_infra::{TextureDevice, TextureLoader};
use sprite_telemetry::MetricsRegistry;
use std::sync::Arc;

fn write_frames(dir: &std::path::Path, names: &[&str]) {
    for name in names {
        RgbaImage::from_pixel(16, 16, Rgba([10, 20, 30, 255]))
            .save(dir.join(format!("{name}.png")))
            .unwrap();
    }
}

#[test]
fn cache_drives_texture_uploads_and_frees() {
    let dir = tempfile::tempdir().unwrap();
    write_frames(dir.path(), &["stand1", "stand2", "hit1"]);

    let device = Arc::new(TextureDevice::new());
    let loader = TextureLoader::new(dir.path(), device.clone()).with_resize(32, 32);
    let cache = AssetCache::new(CacheConfig::default(), loader, &MetricsRegistry::new()).unwrap();
    let workers = cache.spawn_workers().unwrap();

    let mut character = AssetGroup::new(&cache, "character");
    let report = character.load_group(["stand1", "stand2", "hit1", "missing"], Priority::High);

    assert_eq!(report.requested.len(), 3);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(device.texture_count(), 3);
    assert_eq!(cache.memory_used(), 3 * 32 * 32 * 4);
    assert_eq!(device.resident_bytes(), cache.memory_used());

    let texture = character.resource("stand2").unwrap();
    assert_eq!(device.dimensions(texture), Some((32, 32)));
    assert_eq!(
        cache.snapshot("missing").unwrap().state,
        AssetState::Unloaded
    );

    character.unload_group();
    drop(workers);
    assert_eq!(cache.purge(), 3);
    assert_eq!(device.texture_count(), 0);
    assert_eq!(device.resident_bytes(), 0);
}
