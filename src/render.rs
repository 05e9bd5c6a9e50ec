use crate::config::{ConnectorConfig, RenderConfig};
use crate::geometry::Rect;
use crate::path::PathGeometry;
use crate::surface::DrawSurface;
use anyhow::Result;
use std::path::Path;

const ELEMENT_FILL: &str = "#F8FAFF";
const ELEMENT_STROKE: &str = "#7A8AA6";

/// Positioned `<svg>` fragment holding the connector, ready to drop into a page.
pub fn line_svg(geometry: &PathGeometry, config: &ConnectorConfig) -> String {
    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w:.2}\" height=\"{h:.2}\" style=\"position: fixed; overflow: hidden; pointer-events: none; top: {top:.2}px; left: {left:.2}px; width: {w:.2}px; height: {h:.2}px\">",
        w = geometry.width,
        h = geometry.height,
        top = geometry.top,
        left = geometry.left,
    ));
    svg.push_str(&path_element(geometry, config));
    svg.push_str("</svg>");
    svg
}

/// Standalone document with both elements and the connector clipped to its box.
pub fn scene_svg(
    first: &Rect,
    second: &Rect,
    geometry: Option<&PathGeometry>,
    connector: &ConnectorConfig,
    render: &RenderConfig,
) -> String {
    let width = render.width.max(first.right()).max(second.right()).max(1.0);
    let height = render
        .height
        .max(first.bottom())
        .max(second.bottom())
        .max(1.0);
    let mut svg = String::new();

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        escape_xml(&render.background)
    ));

    for rect in [first, second] {
        svg.push_str(&format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1\"/>",
            rect.left, rect.top, rect.width, rect.height, ELEMENT_FILL, ELEMENT_STROKE
        ));
    }

    if let Some(geometry) = geometry {
        svg.push_str(&format!(
            "<svg x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" overflow=\"hidden\">",
            geometry.left, geometry.top, geometry.width, geometry.height
        ));
        svg.push_str(&path_element(geometry, connector));
        svg.push_str("</svg>");
    }

    svg.push_str("</svg>");
    svg
}

fn path_element(geometry: &PathGeometry, config: &ConnectorConfig) -> String {
    format!(
        "<path id=\"{}\" d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\"/>",
        escape_xml(&config.element_id),
        geometry.to_path_data(),
        escape_xml(&config.stroke_color),
        config.stroke_width
    )
}

/// Surface that keeps the latest fragment in memory.
#[derive(Debug, Clone, Default)]
pub struct SvgSurface {
    config: ConnectorConfig,
    markup: Option<String>,
    geometry: Option<PathGeometry>,
    draws: usize,
    redraws: usize,
    removed: bool,
}

impl SvgSurface {
    pub fn new(config: ConnectorConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn markup(&self) -> Option<&str> {
        self.markup.as_deref()
    }

    pub fn geometry(&self) -> Option<&PathGeometry> {
        self.geometry.as_ref()
    }

    pub fn draws(&self) -> usize {
        self.draws
    }

    pub fn redraws(&self) -> usize {
        self.redraws
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }

    fn paint(&mut self, geometry: &PathGeometry) {
        self.markup = Some(line_svg(geometry, &self.config));
        self.geometry = Some(*geometry);
    }
}

impl DrawSurface for SvgSurface {
    fn draw(&mut self, geometry: &PathGeometry) {
        self.draws += 1;
        self.paint(geometry);
    }

    fn redraw(&mut self, geometry: &PathGeometry) {
        self.redraws += 1;
        self.paint(geometry);
    }

    fn remove(&mut self) {
        self.markup = None;
        self.geometry = None;
        self.removed = true;
    }
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height)
        .or_else(|| usvg::Size::from_wh(800.0, 600.0))
        .ok_or_else(|| anyhow::anyhow!("Invalid render size"))?;

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::default(),
        &mut pixmap_mut,
    );
    pixmap.save_png(output)?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    fn geometry() -> PathGeometry {
        PathGeometry {
            top: 25.0,
            left: 100.0,
            width: 200.0,
            height: 10.0,
            points: [Point::new(-10.0, 10.0), Point::new(210.0, 0.0)],
        }
    }

    #[test]
    fn line_fragment_is_positioned_and_styled() {
        let config = ConnectorConfig {
            element_id: "a<b".to_string(),
            ..ConnectorConfig::default()
        };
        let svg = line_svg(&geometry(), &config);
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("top: 25.00px; left: 100.00px"));
        assert!(svg.contains("d=\"M -10.00 10.00 L 210.00 0.00\""));
        assert!(svg.contains("stroke=\"red\""));
        assert!(svg.contains("stroke-width=\"10\""));
        assert!(svg.contains("id=\"a&lt;b\""));
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn scene_grows_to_fit_elements() {
        let first = Rect::new(0.0, 0.0, 100.0, 50.0);
        let second = Rect::new(700.0, 900.0, 100.0, 50.0);
        let svg = scene_svg(
            &first,
            &second,
            Some(&geometry()),
            &ConnectorConfig::default(),
            &RenderConfig::default(),
        );
        assert!(svg.contains("width=\"1000\" height=\"750\""));
        assert!(svg.contains("overflow=\"hidden\""));
        assert_eq!(svg.matches("<path").count(), 1);
    }

    #[test]
    fn scene_without_connector_has_no_path() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        let (connector, render) = (ConnectorConfig::default(), RenderConfig::default());
        let svg = scene_svg(&rect, &rect, None, &connector, &render);
        assert!(!svg.contains("<path"));
    }

    #[test]
    fn surface_tracks_draws_and_removal() {
        let mut surface = SvgSurface::new(ConnectorConfig::default());
        surface.draw(&geometry());
        surface.redraw(&geometry());
        assert_eq!((surface.draws(), surface.redraws()), (1, 1));
        assert!(surface.markup().is_some());
        surface.remove();
        assert!(surface.is_removed());
        assert!(surface.markup().is_none());
    }
}
