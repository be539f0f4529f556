use std::fs;
use std::path::{Path, PathBuf};

use dragkit::app::{PointerDevice, PointerPhase, PointerSample, Scene, TickDriver, Vec2, Viewport};
use dragkit::interaction::{DragConfig, DragEvent};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// A headless pointer sequence. Every `pointer` step runs in its own tick; `wait`
/// runs empty ticks so smoothed items can settle.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ReplayScript {
    /// Replaces the resolved drag config when present.
    #[serde(default)]
    pub(crate) config: Option<DragConfig>,
    #[serde(default)]
    pub(crate) viewport: ScriptViewport,
    #[serde(default = "default_tick_rate")]
    pub(crate) tick_rate: u32,
    pub(crate) steps: Vec<ScriptStep>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ScriptViewport {
    pub(crate) width: u32,
    pub(crate) height: u32,
}

impl Default for ScriptViewport {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub(crate) enum ScriptStep {
    Pointer {
        phase: ScriptPhase,
        x: f32,
        y: f32,
        #[serde(default)]
        device: ScriptDevice,
    },
    Wait {
        ticks: u32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum ScriptPhase {
    Down,
    Move,
    Up,
    Cancel,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum ScriptDevice {
    #[default]
    Mouse,
    Touch(u64),
}

#[derive(Debug, Error)]
pub(crate) enum ScriptError {
    #[error("failed to read replay script at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse replay script at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_path_to_error::Error<serde_json::Error>,
    },
}

/// One line of replay output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub(crate) struct ReplayRecord {
    pub(crate) tick: u64,
    #[serde(flatten)]
    pub(crate) event: DragEvent,
}

fn default_tick_rate() -> u32 {
    60
}

pub(crate) fn parse_script(
    raw: &str,
) -> Result<ReplayScript, serde_path_to_error::Error<serde_json::Error>> {
    let deserializer = &mut serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize(deserializer)
}

pub(crate) fn load_script(path: &Path) -> Result<ReplayScript, ScriptError> {
    let raw = fs::read_to_string(path).map_err(|source| ScriptError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_script(&raw).map_err(|source| ScriptError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

impl ScriptStep {
    fn sample(self) -> Option<PointerSample> {
        match self {
            Self::Pointer {
                phase,
                x,
                y,
                device,
            } => Some(PointerSample {
                device: match device {
                    ScriptDevice::Mouse => PointerDevice::Mouse,
                    ScriptDevice::Touch(id) => PointerDevice::Touch(id),
                },
                phase: match phase {
                    ScriptPhase::Down => PointerPhase::Down,
                    ScriptPhase::Move => PointerPhase::Move,
                    ScriptPhase::Up => PointerPhase::Up,
                    ScriptPhase::Cancel => PointerPhase::Cancel,
                },
                position: Vec2::new(x, y),
            }),
            Self::Wait { .. } => None,
        }
    }
}

/// Runs `script` against `scene` without a window and returns every posted event,
/// including the ones from the cancel at shutdown.
pub(crate) fn replay(
    script: &ReplayScript,
    scene: Box<dyn Scene>,
    fallback_config: DragConfig,
) -> Vec<ReplayRecord> {
    let config = script.config.unwrap_or(fallback_config);
    let viewport = Viewport {
        width: script.viewport.width.max(1),
        height: script.viewport.height.max(1),
    };
    let fixed_dt_seconds = 1.0 / script.tick_rate.max(1) as f32;

    let mut driver = TickDriver::new(scene, config, viewport);
    driver.load();
    info!(
        steps = script.steps.len(),
        width = viewport.width,
        height = viewport.height,
        drag_threshold_px = config.effective_threshold_px(),
        "replay_started"
    );

    let mut records = Vec::new();
    for step in &script.steps {
        match *step {
            ScriptStep::Pointer { .. } => {
                let samples = step.sample().into_iter().collect::<Vec<_>>();
                let outcomes = driver.run_tick(fixed_dt_seconds, &samples);
                debug!(tick = driver.tick_count(), outcome = ?outcomes, "replay_pointer_step");
                collect_last_tick(&driver, &mut records);
            }
            ScriptStep::Wait { ticks } => {
                for _ in 0..ticks {
                    driver.run_tick(fixed_dt_seconds, &[]);
                    collect_last_tick(&driver, &mut records);
                }
            }
        }
    }

    driver.shutdown();
    collect_last_tick(&driver, &mut records);
    info!(
        ticks = driver.tick_count(),
        events = records.len(),
        "replay_finished"
    );
    records
}

fn collect_last_tick(driver: &TickDriver, records: &mut Vec<ReplayRecord>) {
    let tick = driver.tick_count();
    records.extend(
        driver
            .bus()
            .last_tick_events()
            .iter()
            .map(|event| ReplayRecord { tick, event: *event }),
    );
}
