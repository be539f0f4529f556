use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;

use dragkit::run_app;
use tracing::error;

use super::bootstrap::{build_loop_config, resolve_drag_config};
use super::kitchen::KitchenScene;
use super::script::{load_script, replay, ReplayRecord};

pub(crate) fn run_windowed() -> ExitCode {
    let config = build_loop_config();
    if let Err(err) = run_app(config, Box::new(KitchenScene::new())) {
        error!(error = %err, "startup_failed");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Replays the script headlessly and prints each event as one JSON line on stdout.
pub(crate) fn run_replay(script_path: &Path) -> ExitCode {
    let script = match load_script(script_path) {
        Ok(script) => script,
        Err(err) => {
            error!(error = %err, "startup_failed");
            return ExitCode::FAILURE;
        }
    };

    let records = replay(&script, Box::new(KitchenScene::new()), resolve_drag_config());
    if let Err(err) = write_records(io::stdout().lock(), &records) {
        error!(error = %err, "replay_output_failed");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn write_records(mut out: impl Write, records: &[ReplayRecord]) -> io::Result<()> {
    for record in records {
        serde_json::to_writer(&mut out, record)?;
        out.write_all(b"\n")?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use dragkit::app::{EntityRegistry, Vec2, Vec3};
    use dragkit::interaction::DragEvent;
    use dragkit::items::DraggableItem;

    use super::*;

    #[test]
    fn writes_one_json_object_per_line() {
        let mut registry = EntityRegistry::default();
        let handle = registry.spawn(Box::new(DraggableItem::new(
            "tomato",
            Vec3::ZERO,
            Vec2::new(0.5, 0.5),
        )));
        let records = [
            ReplayRecord {
                tick: 1,
                event: DragEvent::Started {
                    draggable: handle,
                    start_position: Vec3::ZERO,
                    start_input: Vec2::new(320.0, 240.0),
                },
            },
            ReplayRecord {
                tick: 2,
                event: DragEvent::ExitedTarget {
                    draggable: handle,
                    target: handle,
                },
            },
        ];

        let mut out = Vec::new();
        write_records(&mut out, &records).expect("write");
        let text = String::from_utf8(out).expect("utf8");
        let lines = text.lines().collect::<Vec<_>>();

        assert_eq!(lines.len(), 2);
        let second: serde_json::Value = serde_json::from_str(lines[1]).expect("json");
        assert_eq!(second["tick"], 2);
        assert_eq!(second["event"], "exited_target");
    }
}
