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

//! Animated GIF decoding.

use image::codecs::gif::GifDecoder;
use image::AnimationDecoder;
use sprite_core::texture::CpuTexture;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from [`load_gif_frames`].
#[derive(Debug, Error)]
pub enum GifLoadError {
    /// The file could not be opened.
    #[error("failed to open '{}': {source}", path.display())]
    Open {
        /// The file that was opened.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
    /// The file is not a valid GIF.
    #[error("failed to decode '{}': {source}", path.display())]
    Decode {
        /// The file that was decoded.
        path: PathBuf,
        /// The underlying decoder error.
        source: image::ImageError,
    },
    /// The GIF contains no frames.
    #[error("'{}' contains no frames", path.display())]
    Empty {
        /// The file that was decoded.
        path: PathBuf,
    },
}

/// Decodes every frame of an animated GIF into RGBA8 textures.
///
/// Frames are fully composited by the decoder, so each one can be drawn on
/// its own.
pub fn load_gif_frames(path: impl AsRef<Path>) -> Result<Vec<CpuTexture>, GifLoadError> {
    let path = path.as_ref();
    let decode_error = |source| GifLoadError::Decode {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(|source| GifLoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let decoder = GifDecoder::new(BufReader::new(file)).map_err(decode_error)?;
    let frames = decoder.into_frames().collect_frames().map_err(decode_error)?;

    let textures: Vec<CpuTexture> = frames
        .into_iter()
        .filter_map(|frame| {
            let buffer = frame.into_buffer();
            let (width, height) = buffer.dimensions();
            CpuTexture::from_rgba8(width, height, buffer.into_raw())
        })
        .collect();

    if textures.is_empty() {
        return Err(GifLoadError::Empty {
            path: path.to_path_buf(),
        });
    }
    log::debug!(
        "GifLoader: Decoded {} frames from {}",
        textures.len(),
        path.display()
    );
    Ok(textures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::gif::GifEncoder;
    use image::{Delay, Frame, Rgba, RgbaImage};

    #[test]
    fn decodes_every_frame() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.gif");
        {
            let file = File::create(&path).unwrap();
            let mut encoder = GifEncoder::new(file);
            let frames = [Rgba([255, 0, 0, 255]), Rgba([0, 255, 0, 255]), Rgba([0, 0, 255, 255])]
                .into_iter()
                .map(|color| {
                    Frame::from_parts(
                        RgbaImage::from_pixel(4, 3, color),
                        0,
                        0,
                        Delay::from_numer_denom_ms(100, 1),
                    )
                });
            encoder.encode_frames(frames).unwrap();
        }

        let textures = load_gif_frames(&path).unwrap();
        assert_eq!(textures.len(), 3);
        assert!(textures.iter().all(|t| t.width == 4 && t.height == 3));
        assert!(textures.iter().all(|t| t.byte_size() == 4 * 3 * 4));
    }

    #[test]
    fn reports_missing_and_invalid_files() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_gif_frames(dir.path().join("missing.gif")),
            Err(GifLoadError::Open { .. })
        ));

        let junk = dir.path().join("junk.gif");
        std::fs::write(&junk, b"not a gif").unwrap();
        assert!(matches!(
            load_gif_frames(&junk),
            Err(GifLoadError::Decode { .. })
        ));
    }
}
