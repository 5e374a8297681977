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

// Sprite Runtime
// Runs the scripted demo loop against the asset cache and reports cache statistics.

use anyhow::Result;
use clap::Parser;
use sprite_runtime::{App, Settings};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// TOML settings file. Defaults are used when omitted.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Asset directory, overriding the settings file.
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Number of frames to simulate.
    #[arg(long, default_value_t = 600)]
    frames: u64,
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut settings = Settings::load(cli.settings.as_deref())?;
    if let Some(dir) = cli.assets {
        settings.assets.dir = dir;
    }

    let mut app = App::start(settings)?;
    app.run(cli.frames);
    app.shutdown();
    Ok(())
}
