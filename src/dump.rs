use crate::geometry::{Rect, Side};
use crate::path::PathGeometry;
use crate::scenario::Replay;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct ReplayDump {
    pub draws: usize,
    pub redraws: usize,
    pub destroyed: bool,
    pub frames: Vec<FrameDump>,
}

#[derive(Debug, Serialize)]
pub struct FrameDump {
    pub index: usize,
    pub first: Rect,
    pub second: Rect,
    pub events: Vec<EventDump>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDump {
    pub source: String,
    pub outcome: String,
    pub left_side: Option<Side>,
    pub right_side: Option<Side>,
    pub geometry: Option<PathGeometry>,
    pub error: Option<String>,
}

impl ReplayDump {
    pub fn from_replay(replay: &Replay) -> Self {
        let frames = replay
            .frames
            .iter()
            .map(|frame| FrameDump {
                index: frame.index,
                first: frame.first,
                second: frame.second,
                events: frame
                    .events
                    .iter()
                    .map(|event| {
                        let drawing = event.outcome.drawing();
                        let error = match &event.outcome {
                            crate::connector::Outcome::Skipped(err) => Some(err.to_string()),
                            _ => None,
                        };
                        EventDump {
                            source: event.source.to_string(),
                            outcome: event.outcome.name().to_string(),
                            left_side: drawing.map(|d| d.pair.left.side),
                            right_side: drawing.map(|d| d.pair.right.side),
                            geometry: drawing.map(|d| d.geometry),
                            error,
                        }
                    })
                    .collect(),
            })
            .collect();

        ReplayDump {
            draws: replay.draws,
            redraws: replay.redraws,
            destroyed: replay.destroyed,
            frames,
        }
    }
}

pub fn write_replay_dump(output: Option<&Path>, replay: &Replay) -> anyhow::Result<()> {
    let dump = ReplayDump::from_replay(replay);
    match output {
        Some(path) => {
            let writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(writer, &dump)?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            serde_json::to_writer_pretty(&mut lock, &dump)?;
            writeln!(lock)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::scenario::{parse_scenario, replay};

    #[test]
    fn dump_names_sides_and_geometry() {
        let scenario = parse_scenario(
            r#"{"frames": [{"first": {"top": 0, "left": 0, "width": 100, "height": 50},
                "second": {"top": 0, "left": 300, "width": 100, "height": 50}}]}"#,
        )
        .unwrap();
        let dump = ReplayDump::from_replay(&replay(&scenario, &Config::default()));
        let value = serde_json::to_value(&dump).unwrap();
        let event = &value["frames"][0]["events"][0];
        assert_eq!(event["source"], "connect");
        assert_eq!(event["outcome"], "drawn");
        assert_eq!(event["leftSide"], "RIGHT");
        assert_eq!(event["rightSide"], "LEFT");
        assert!(event.get("left_side").is_none());
        assert_eq!(event["geometry"]["width"], 200.0);
        assert!(event["error"].is_null());
    }
}
