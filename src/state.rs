/*
MIT License

Copyright (c) 2025 Vincent Hiribarren

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/

//! Small bits of viewer state that survive restarts: where the camera was,
//! whether the panel was open, which clear color was picked.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use anyhow::Context;
use log::warn;
use serde::{Deserialize, Serialize};

pub const STATE_FILE: &str = "nightroad_state.json";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerState {
    pub clear_color: [f32; 3],
    pub panel_open: bool,
    pub eye: [f32; 3],
    pub forward: [f32; 3],
}

impl Default for ViewerState {
    fn default() -> Self {
        Self {
            clear_color: [0.0, 0.0, 0.0],
            panel_open: false,
            eye: [0.0, 0.0, 3.0],
            forward: [0.0, 0.0, -1.0],
        }
    }
}

impl ViewerState {
    /// Never fails: a missing or corrupt file logs and yields the defaults,
    /// so a bad state file cannot keep the viewer from starting.
    #[must_use]
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::try_load(path) {
            Ok(state) => state,
            Err(err) => {
                warn!(
                    "Viewer state not restored from {}: {err:#}",
                    path.display()
                );
                Self::default()
            }
        }
    }

    fn try_load(path: &Path) -> anyhow::Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open state file {}", path.display()))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse state file {}", path.display()))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("Failed to create state file {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)
            .with_context(|| format!("Failed to write state file {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_round_trip() {
        let state = ViewerState {
            clear_color: [0.1, 0.2, 0.3],
            panel_open: true,
            eye: [1.0, 2.0, 3.0],
            forward: [0.0, 1.0, 0.0],
        };
        let encoded = serde_json::to_string(&state).expect("serialize");
        let decoded: ViewerState = serde_json::from_str(&encoded).expect("deserialize");
        assert_eq!(state, decoded);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let state = ViewerState::load("definitely/not/a/state.json");
        assert_eq!(state, ViewerState::default());
    }

    #[test]
    fn corrupt_file_yields_defaults() {
        let path = std::env::temp_dir().join("nightroad_state_corrupt_test.json");
        std::fs::write(&path, "{ not json").expect("write corrupt file");
        let state = ViewerState::load(&path);
        assert_eq!(state, ViewerState::default());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let parsed: ViewerState =
            serde_json::from_str(r#"{"panel_open": true}"#).expect("parse partial");
        assert!(parsed.panel_open);
        assert_eq!(parsed.eye, ViewerState::default().eye);
    }

    #[test]
    fn save_and_reload() {
        let path = std::env::temp_dir().join("nightroad_state_roundtrip_test.json");
        let state = ViewerState {
            eye: [12.0, 34.0, 56.0],
            ..Default::default()
        };
        state.save(&path).expect("save state");
        assert_eq!(ViewerState::load(&path), state);
        std::fs::remove_file(&path).ok();
    }
}
