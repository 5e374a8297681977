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

//! CPU-side texture data and the opaque handle a texture device hands out.

/// Number of bytes per pixel for the RGBA8 layout used throughout the engine.
pub const RGBA8_BYTES_PER_PIXEL: u64 = 4;

/// Decoded texture data, ready to be uploaded to a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpuTexture {
    /// Tightly packed RGBA8 pixels, row-major.
    pub pixels: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl CpuTexture {
    /// Creates a texture from raw RGBA8 pixels.
    ///
    /// Returns `None` if the buffer length does not match the dimensions.
    pub fn from_rgba8(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        let expected = width as u64 * height as u64 * RGBA8_BYTES_PER_PIXEL;
        (pixels.len() as u64 == expected).then_some(Self {
            pixels,
            width,
            height,
        })
    }

    /// The memory footprint of this texture once resident on a device.
    pub fn byte_size(&self) -> u64 {
        self.width as u64 * self.height as u64 * RGBA8_BYTES_PER_PIXEL
    }

    /// Gets the row size in bytes.
    pub fn row_size(&self) -> usize {
        self.width as usize * RGBA8_BYTES_PER_PIXEL as usize
    }
}

/// An opaque handle to a texture resident on a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub usize);
