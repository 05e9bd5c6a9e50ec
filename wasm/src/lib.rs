use anchor_line::{ConnectorConfig, Rect, connect_rects, line_svg};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConnectorOptions {
    stroke_color: Option<String>,
    stroke_width: Option<f32>,
    id: Option<String>,
    corner_angle: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ConnectorResult {
    top: f32,
    left: f32,
    width: f32,
    height: f32,
    points: [[f32; 2]; 2],
    svg: String,
}

fn build_config(options: ConnectorOptions) -> ConnectorConfig {
    let mut config = ConnectorConfig::default();
    if let Some(stroke_color) = options.stroke_color {
        config.stroke_color = stroke_color;
    }
    if let Some(stroke_width) = options.stroke_width {
        config.stroke_width = stroke_width;
    }
    if let Some(id) = options.id {
        config.element_id = id;
    }
    if let Some(corner_angle) = options.corner_angle {
        config.corner_angle = corner_angle;
    }
    config
}

fn compute(
    first: Rect,
    second: Rect,
    options: ConnectorOptions,
) -> Result<Option<ConnectorResult>, String> {
    let config = build_config(options);
    let drawing = connect_rects(&first, &second, &config).map_err(|error| error.to_string())?;
    Ok(drawing.map(|drawing| {
        let geometry = drawing.geometry;
        ConnectorResult {
            top: geometry.top,
            left: geometry.left,
            width: geometry.width,
            height: geometry.height,
            points: geometry.points.map(|p| [p.x, p.y]),
            svg: line_svg(&geometry, &config),
        }
    }))
}

/// Takes two `{top,left,width,height}` JSON boxes and returns the connector
/// layout as JSON, or `null` when no pair qualifies.
#[wasm_bindgen]
pub fn compute_connector_path(
    first_json: &str,
    second_json: &str,
    options_json: Option<String>,
) -> Result<String, JsValue> {
    let first: Rect = serde_json::from_str(first_json).map_err(to_js_error)?;
    let second: Rect = serde_json::from_str(second_json).map_err(to_js_error)?;
    let options = if let Some(raw_options) = options_json {
        serde_json::from_str::<ConnectorOptions>(&raw_options).map_err(to_js_error)?
    } else {
        ConnectorOptions::default()
    };

    let result = compute(first, second, options).map_err(|error| JsValue::from_str(&error))?;
    serde_json::to_string(&result).map_err(to_js_error)
}

fn to_js_error(error: serde_json::Error) -> JsValue {
    JsValue::from_str(&error.to_string())
}
