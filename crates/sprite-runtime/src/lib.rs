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

//! # Sprite Runtime
//!
//! A headless sprite animation runtime. It loads character frames through the
//! asset cache, steps a player through a scripted input loop and produces the
//! draw list a renderer would consume.

#![warn(missing_docs)]

pub mod app;
pub mod input;
pub mod player;
pub mod settings;

pub use app::{App, DrawCommand};
pub use settings::Settings;
