use anyhow::Result;
use serde::Deserialize;

use crate::config::Config;
use crate::connector::{ChangeSource, Connector, Outcome};
use crate::geometry::Rect;
use crate::headless::{LayoutRoot, ManualNotifier, MeasuredElement};
use crate::render::SvgSurface;

/// Sequence of element placements replayed against one connector.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub frames: Vec<Frame>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Frame {
    pub first: Rect,
    pub second: Rect,
    #[serde(default)]
    pub detached: bool,
    /// Change sources that fire after this frame is applied; defaults to viewport.
    #[serde(default)]
    pub fire: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct FrameEvent {
    pub source: &'static str,
    pub outcome: Outcome,
}

#[derive(Debug, Clone)]
pub struct FrameReport {
    pub index: usize,
    pub first: Rect,
    pub second: Rect,
    pub events: Vec<FrameEvent>,
}

impl FrameReport {
    /// Last path drawn while this frame was active.
    pub fn drawn_geometry(&self) -> Option<&crate::path::PathGeometry> {
        self.events
            .iter()
            .rev()
            .find_map(|event| event.outcome.geometry())
    }
}

#[derive(Debug, Clone)]
pub struct Replay {
    pub frames: Vec<FrameReport>,
    pub draws: usize,
    pub redraws: usize,
    pub destroyed: bool,
}

impl Replay {
    /// Index of the most recent frame that produced a drawing.
    pub fn last_drawn_frame(&self) -> Option<usize> {
        self.frames
            .iter()
            .rev()
            .find(|frame| frame.drawn_geometry().is_some())
            .map(|frame| frame.index)
    }
}

pub fn parse_scenario(input: &str) -> Result<Scenario> {
    let scenario: Scenario = match serde_json::from_str(input) {
        Ok(scenario) => scenario,
        Err(json_err) => match json5::from_str(input) {
            Ok(scenario) => scenario,
            Err(_) => return Err(anyhow::anyhow!("invalid scenario: {json_err}")),
        },
    };
    if scenario.frames.is_empty() {
        return Err(anyhow::anyhow!("scenario has no frames"));
    }
    for (idx, frame) in scenario.frames.iter().enumerate() {
        for name in &frame.fire {
            if ChangeSource::from_name(name).is_none() {
                let message = format!("frame {idx}: unknown change source `{name}`");
                return Err(anyhow::anyhow!(message));
            }
        }
    }
    Ok(scenario)
}

/// Drives a connector through every frame: frame 0 connects, later frames
/// deliver their fired notifications.
pub fn replay(scenario: &Scenario, config: &Config) -> Replay {
    let Some(initial) = scenario.frames.first() else {
        return Replay {
            frames: Vec::new(),
            draws: 0,
            redraws: 0,
            destroyed: false,
        };
    };
    let first = MeasuredElement::new(initial.first);
    let second = MeasuredElement::new(initial.second);
    let mut connector = Connector::new(
        first.clone(),
        second.clone(),
        ManualNotifier::default(),
        LayoutRoot,
        SvgSurface::new(config.connector.clone()),
        config.connector.clone(),
    );

    let mut frames = Vec::with_capacity(scenario.frames.len());
    for (index, frame) in scenario.frames.iter().enumerate() {
        first.set_rect(frame.first);
        second.set_rect(frame.second);
        if frame.detached {
            first.detach();
        } else {
            first.attach();
        }

        let mut events = Vec::new();
        if index == 0 {
            events.push(FrameEvent {
                source: "connect",
                outcome: connector.connect(),
            });
        } else {
            for source in fired_sources(frame) {
                let subscriptions = connector.notifier().subscriptions_for(source);
                if subscriptions.is_empty() {
                    events.push(FrameEvent {
                        source: source.name(),
                        outcome: Outcome::Inactive,
                    });
                }
                for subscription in subscriptions {
                    events.push(FrameEvent {
                        source: source.name(),
                        outcome: connector.on_layout_change(subscription),
                    });
                }
            }
        }
        tracing::debug!(frame = index, events = events.len(), "frame replayed");
        frames.push(FrameReport {
            index,
            first: frame.first,
            second: frame.second,
            events,
        });
    }

    Replay {
        frames,
        draws: connector.surface().draws(),
        redraws: connector.surface().redraws(),
        destroyed: connector.is_destroyed(),
    }
}

fn fired_sources(frame: &Frame) -> Vec<ChangeSource> {
    if frame.fire.is_empty() {
        return vec![ChangeSource::Viewport];
    }
    frame
        .fire
        .iter()
        .filter_map(|name| ChangeSource::from_name(name))
        .collect()
}
