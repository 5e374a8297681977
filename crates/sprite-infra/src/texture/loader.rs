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

//! Image-file texture loading for the asset cache.

use crate::texture::device::TextureDevice;
use anyhow::{Context, Result};
use image::imageops::FilterType;
use sprite_core::asset::{AssetId, LoadedResource, LoaderError, ResourceLoader};
use sprite_core::texture::{CpuTexture, TextureId};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Extension appended to identifiers that have none.
pub const DEFAULT_EXTENSION: &str = "png";

/// Loads textures from image files under a root directory.
///
/// An identifier maps to `<root>/<id>.png`, or to `<root>/<id>` if it already
/// carries an extension. Decoded images are optionally resized, then uploaded
/// to the [`TextureDevice`]. The size charged to the cache is
/// `width * height * 4`.
#[derive(Debug, Clone)]
pub struct TextureLoader {
    root: PathBuf,
    device: Arc<TextureDevice>,
    resize_to: Option<(u32, u32)>,
}

impl TextureLoader {
    /// Creates a loader reading from `root` and uploading to `device`.
    pub fn new(root: impl Into<PathBuf>, device: Arc<TextureDevice>) -> Self {
        Self {
            root: root.into(),
            device,
            resize_to: None,
        }
    }

    /// Resizes every decoded image to `width` x `height` before upload.
    pub fn with_resize(mut self, width: u32, height: u32) -> Self {
        self.resize_to = Some((width, height));
        self
    }

    /// The device textures are uploaded to.
    pub fn device(&self) -> &Arc<TextureDevice> {
        &self.device
    }

    /// The file an identifier resolves to.
    pub fn resolve(&self, id: &AssetId) -> PathBuf {
        if Path::new(id.as_str()).extension().is_some() {
            self.root.join(id.as_str())
        } else {
            self.root.join(format!("{}.{}", id, DEFAULT_EXTENSION))
        }
    }

    /// Reads and decodes an image file into RGBA8 pixels.
    pub fn decode(&self, path: &Path) -> Result<CpuTexture> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read image file {}", path.display()))?;
        let mut img =
            image::load_from_memory(&bytes).context("Failed to decode image from memory")?;

        if let Some((width, height)) = self.resize_to {
            if img.width() != width || img.height() != height {
                img = img.resize_exact(width, height, FilterType::Triangle);
            }
        }

        let rgba_img = img.to_rgba8();
        let (width, height) = rgba_img.dimensions();
        CpuTexture::from_rgba8(width, height, rgba_img.into_raw())
            .context("Decoded image has an inconsistent pixel buffer")
    }
}

impl ResourceLoader for TextureLoader {
    type Resource = TextureId;

    fn load(&self, id: &AssetId) -> Result<LoadedResource<TextureId>, LoaderError> {
        let path = self.resolve(id);
        let texture = self.decode(&path)?;
        let size_bytes = texture.byte_size();
        let texture_id = self.device.upload(texture);
        log::debug!(
            "TextureLoader: Uploaded '{}' from {} as {:?}",
            id,
            path.display(),
            texture_id
        );
        Ok(LoadedResource::new(texture_id, size_bytes))
    }

    fn destroy(&self, resource: TextureId) {
        if !self.device.destroy(resource) {
            log::warn!("TextureLoader: {:?} was not resident", resource);
        }
    }
}
