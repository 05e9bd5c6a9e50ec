#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod connector;
pub mod dump;
pub mod geometry;
pub mod headless;
pub mod path;
pub mod render;
pub mod scenario;
pub mod select;
pub mod surface;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, ConnectorConfig, RenderConfig, load_config};
pub use connector::{
    ChangeSource, Connector, Drawing, Endpoint, LayoutNotifier, Outcome, Subscription,
};
pub use geometry::{AnchorPoint, Point, Rect, Side};
pub use path::{MIN_CONTAINER_SIZE, PathError, PathGeometry, line_path};
pub use render::{SvgSurface, line_svg, scene_svg};
pub use select::{
    AlwaysAttached, ConnectionPair, ConnectionPointSelector, ContainmentQuery, ElementHandle,
    Selection,
};
pub use surface::{DrawSurface, SurfaceCallbacks};

/// One-shot layout for two boxes with no hysteresis, for stateless callers.
pub fn connect_rects(
    first: &Rect,
    second: &Rect,
    config: &ConnectorConfig,
) -> Result<Option<Drawing>, PathError> {
    let mut selector = ConnectionPointSelector::from_config(config);
    let Some(pair) = selector.select(first, second).pair().copied() else {
        return Ok(None);
    };
    let geometry = line_path(&pair, config.stroke_width)?;
    Ok(Some(Drawing { pair, geometry }))
}
