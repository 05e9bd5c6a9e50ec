use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::select::{DEFAULT_CHANGE_TRIGGER_SIZE, DEFAULT_CORNER_ANGLE};

static CSS_LENGTH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([+-]?(?:\d+\.?\d*|\.\d+))\s*(?:px)?\s*$").unwrap());

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectorConfig {
    pub stroke_color: String,
    /// Stroke width of the path; also the inset applied to both endpoints.
    pub stroke_width: f32,
    pub element_id: String,
    pub corner_angle: f32,
    pub change_trigger_size: f32,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            stroke_color: "red".to_string(),
            stroke_width: 10.0,
            element_id: "connector-line".to_string(),
            corner_angle: DEFAULT_CORNER_ANGLE,
            change_trigger_size: DEFAULT_CHANGE_TRIGGER_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            background: "#FFFFFF".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub connector: ConnectorConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    stroke_color: Option<String>,
    stroke_width: Option<NumberOrString>,
    id: Option<String>,
    corner_angle: Option<NumberOrString>,
    change_trigger_size: Option<NumberOrString>,
    background: Option<String>,
    width: Option<NumberOrString>,
    height: Option<NumberOrString>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f32),
    String(String),
}

impl NumberOrString {
    fn as_f32(&self) -> Option<f32> {
        match self {
            NumberOrString::Number(val) => Some(*val),
            NumberOrString::String(val) => CSS_LENGTH_RE
                .captures(val)
                .and_then(|caps| caps.get(1))
                .and_then(|num| num.as_str().parse::<f32>().ok()),
        }
    }
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let parsed: ConfigFile = match serde_json::from_str(contents) {
        Ok(parsed) => parsed,
        Err(json_err) => match json5::from_str(contents) {
            Ok(parsed) => parsed,
            Err(_) => return Err(anyhow::anyhow!("invalid config: {json_err}")),
        },
    };

    let mut config = Config::default();
    if let Some(v) = parsed.stroke_color {
        config.connector.stroke_color = v;
    }
    if let Some(v) = parsed.id {
        config.connector.element_id = v;
    }
    if let Some(v) = parsed.stroke_width {
        config.connector.stroke_width = non_negative("strokeWidth", &v)?;
    }
    if let Some(v) = parsed.corner_angle {
        config.connector.corner_angle = non_negative("cornerAngle", &v)?;
    }
    if let Some(v) = parsed.change_trigger_size {
        config.connector.change_trigger_size = non_negative("changeTriggerSize", &v)?;
    }
    if let Some(v) = parsed.background {
        config.render.background = v;
    }
    if let Some(v) = parsed.width {
        config.render.width = non_negative("width", &v)?;
    }
    if let Some(v) = parsed.height {
        config.render.height = non_negative("height", &v)?;
    }
    Ok(config)
}

fn non_negative(key: &str, value: &NumberOrString) -> anyhow::Result<f32> {
    match value.as_f32() {
        Some(v) if v.is_finite() && v >= 0.0 => Ok(v),
        _ => Err(anyhow::anyhow!(
            "config key `{key}` must be a finite, non-negative number"
        )),
    }
}
