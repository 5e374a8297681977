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

//! A software texture store standing in for a GPU.

use sprite_core::texture::{CpuTexture, TextureId};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct DeviceState {
    textures: HashMap<TextureId, CpuTexture>,
    next_id: usize,
    resident_bytes: u64,
}

/// Thread-safe texture storage keyed by [`TextureId`].
///
/// Uploading takes ownership of the pixels and hands back an opaque id; the
/// id stays valid until [`TextureDevice::destroy`] is called with it.
#[derive(Debug, Default)]
pub struct TextureDevice {
    state: Mutex<DeviceState>,
}

impl TextureDevice {
    /// Creates an empty device.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, DeviceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stores a texture and returns its id.
    pub fn upload(&self, texture: CpuTexture) -> TextureId {
        let mut state = self.lock();
        let id = TextureId(state.next_id);
        state.next_id += 1;
        state.resident_bytes += texture.byte_size();
        log::trace!(
            "TextureDevice: Uploaded {:?} ({}x{})",
            id,
            texture.width,
            texture.height
        );
        state.textures.insert(id, texture);
        id
    }

    /// Frees a texture. Returns `false` if the id was not resident.
    pub fn destroy(&self, id: TextureId) -> bool {
        let mut state = self.lock();
        match state.textures.remove(&id) {
            Some(texture) => {
                state.resident_bytes = state.resident_bytes.saturating_sub(texture.byte_size());
                log::trace!("TextureDevice: Destroyed {:?}", id);
                true
            }
            None => false,
        }
    }

    /// Returns a copy of a resident texture.
    pub fn get(&self, id: TextureId) -> Option<CpuTexture> {
        self.lock().textures.get(&id).cloned()
    }

    /// Returns the width and height of a resident texture.
    pub fn dimensions(&self, id: TextureId) -> Option<(u32, u32)> {
        self.lock()
            .textures
            .get(&id)
            .map(|texture| (texture.width, texture.height))
    }

    /// Number of resident textures.
    pub fn texture_count(&self) -> usize {
        self.lock().textures.len()
    }

    /// Bytes held by resident textures.
    pub fn resident_bytes(&self) -> u64 {
        self.lock().resident_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texture(width: u32, height: u32) -> CpuTexture {
        CpuTexture::from_rgba8(width, height, vec![0; (width * height * 4) as usize]).unwrap()
    }

    #[test]
    fn upload_and_destroy_track_residency() {
        let device = TextureDevice::new();
        let a = device.upload(texture(2, 2));
        let b = device.upload(texture(4, 1));

        assert_ne!(a, b);
        assert_eq!(device.texture_count(), 2);
        assert_eq!(device.resident_bytes(), 32);
        assert_eq!(device.dimensions(b), Some((4, 1)));

        assert!(device.destroy(a));
        assert!(!device.destroy(a));
        assert_eq!(device.texture_count(), 1);
        assert_eq!(device.resident_bytes(), 16);
        assert!(device.get(a).is_none());
    }
}
