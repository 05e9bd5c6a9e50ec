use serde::Serialize;

use crate::config::ConnectorConfig;
use crate::path::{PathError, PathGeometry, line_path};
use crate::select::{
    ConnectionPair, ConnectionPointSelector, ContainmentQuery, ElementHandle, Selection,
};
use crate::surface::DrawSurface;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    First,
    Second,
}

/// Kinds of layout change a connector listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeSource {
    /// Content somewhere in the element's subtree mutated.
    Subtree(Endpoint),
    Resize(Endpoint),
    /// Global scroll or zoom.
    Viewport,
}

impl ChangeSource {
    pub const ALL: [ChangeSource; 5] = [
        ChangeSource::Subtree(Endpoint::First),
        ChangeSource::Subtree(Endpoint::Second),
        ChangeSource::Resize(Endpoint::First),
        ChangeSource::Resize(Endpoint::Second),
        ChangeSource::Viewport,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            "subtree-first" => Some(Self::Subtree(Endpoint::First)),
            "subtree-second" => Some(Self::Subtree(Endpoint::Second)),
            "resize-first" => Some(Self::Resize(Endpoint::First)),
            "resize-second" => Some(Self::Resize(Endpoint::Second)),
            "viewport" | "scroll" => Some(Self::Viewport),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Subtree(Endpoint::First) => "subtree-first",
            Self::Subtree(Endpoint::Second) => "subtree-second",
            Self::Resize(Endpoint::First) => "resize-first",
            Self::Resize(Endpoint::Second) => "resize-second",
            Self::Viewport => "viewport",
        }
    }
}

/// Opaque handle returned by `LayoutNotifier::subscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Subscription(u64);

impl Subscription {
    pub fn from_raw(id: u64) -> Self {
        Self(id)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Change-notification channel. The host delivers each firing back through
/// `Connector::on_layout_change` with the handle it returned here.
pub trait LayoutNotifier {
    fn subscribe(&mut self, source: ChangeSource) -> Subscription;
    fn unsubscribe(&mut self, subscription: Subscription);
}

/// Pair chosen in a pass and the path laid out for it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Drawing {
    pub pair: ConnectionPair,
    pub geometry: PathGeometry,
}

/// What a single pipeline pass did.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Drawn(Drawing),
    Redrawn(Drawing),
    Unchanged,
    NoCandidate,
    /// A pair was chosen but has no path layout; nothing was drawn.
    Skipped(PathError),
    /// An element left the layout; the connector tore itself down.
    Detached,
    /// The connector is destroyed or the notification is not ours.
    Inactive,
}

impl Outcome {
    pub fn drawing(&self) -> Option<&Drawing> {
        match self {
            Outcome::Drawn(drawing) | Outcome::Redrawn(drawing) => Some(drawing),
            _ => None,
        }
    }

    pub fn geometry(&self) -> Option<&PathGeometry> {
        self.drawing().map(|drawing| &drawing.geometry)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Outcome::Drawn(_) => "drawn",
            Outcome::Redrawn(_) => "redrawn",
            Outcome::Unchanged => "unchanged",
            Outcome::NoCandidate => "no-candidate",
            Outcome::Skipped(_) => "skipped",
            Outcome::Detached => "detached",
            Outcome::Inactive => "inactive",
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Pass {
    Initial,
    Redraw,
}

/// Keeps one connector line attached to two elements.
///
/// Subscribes to every [`ChangeSource`] on construction. Each notification runs
/// select, then path layout, then the surface. Teardown happens once, either
/// explicitly through [`Connector::destroy`], when an element detaches, or on drop.
pub struct Connector<E, N, Q, S>
where
    E: ElementHandle,
    N: LayoutNotifier,
    Q: ContainmentQuery<E>,
    S: DrawSurface,
{
    first: E,
    second: E,
    notifier: N,
    containment: Q,
    surface: S,
    selector: ConnectionPointSelector,
    config: ConnectorConfig,
    subscriptions: Vec<Subscription>,
    destroyed: bool,
}

impl<E, N, Q, S> Connector<E, N, Q, S>
where
    E: ElementHandle,
    N: LayoutNotifier,
    Q: ContainmentQuery<E>,
    S: DrawSurface,
{
    pub fn new(
        first: E,
        second: E,
        mut notifier: N,
        containment: Q,
        surface: S,
        config: ConnectorConfig,
    ) -> Self {
        let subscriptions = ChangeSource::ALL
            .iter()
            .map(|source| notifier.subscribe(*source))
            .collect();
        Self {
            first,
            second,
            notifier,
            containment,
            surface,
            selector: ConnectionPointSelector::from_config(&config),
            config,
            subscriptions,
            destroyed: false,
        }
    }

    /// Initial draw.
    pub fn connect(&mut self) -> Outcome {
        self.run(Pass::Initial)
    }

    pub fn on_layout_change(&mut self, subscription: Subscription) -> Outcome {
        if !self.subscriptions.contains(&subscription) {
            tracing::trace!(
                subscription = subscription.raw(),
                "ignoring foreign notification"
            );
            return Outcome::Inactive;
        }
        self.run(Pass::Redraw)
    }

    /// Re-measures without a specific notification, for polling hosts.
    pub fn refresh(&mut self) -> Outcome {
        self.run(Pass::Redraw)
    }

    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        for subscription in self.subscriptions.drain(..) {
            self.notifier.unsubscribe(subscription);
        }
        self.selector.reset();
        self.surface.remove();
        tracing::debug!(id = %self.config.element_id, "connector torn down");
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn config(&self) -> &ConnectorConfig {
        &self.config
    }

    pub fn subscriptions(&self) -> &[Subscription] {
        &self.subscriptions
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn elements(&self) -> (&E, &E) {
        (&self.first, &self.second)
    }

    fn run(&mut self, pass: Pass) -> Outcome {
        if self.destroyed {
            return Outcome::Inactive;
        }
        let selection = self
            .selector
            .select_elements(&self.first, &self.second, &self.containment);
        let pair = match selection {
            Selection::Connected(pair) => pair,
            Selection::Unchanged => return Outcome::Unchanged,
            Selection::NoCandidate => return Outcome::NoCandidate,
            Selection::Detached => {
                self.destroy();
                return Outcome::Detached;
            }
        };
        let geometry = match line_path(&pair, self.config.stroke_width) {
            Ok(geometry) => geometry,
            Err(err) => {
                tracing::warn!(%err, "connector pair has no path layout");
                return Outcome::Skipped(err);
            }
        };
        let drawing = Drawing { pair, geometry };
        match pass {
            Pass::Initial => {
                self.surface.draw(&geometry);
                Outcome::Drawn(drawing)
            }
            Pass::Redraw => {
                self.surface.redraw(&geometry);
                Outcome::Redrawn(drawing)
            }
        }
    }
}

impl<E, N, Q, S> Drop for Connector<E, N, Q, S>
where
    E: ElementHandle,
    N: LayoutNotifier,
    Q: ContainmentQuery<E>,
    S: DrawSurface,
{
    fn drop(&mut self) {
        self.destroy();
    }
}

impl<E, N, Q, S> std::fmt::Debug for Connector<E, N, Q, S>
where
    E: ElementHandle + std::fmt::Debug,
    N: LayoutNotifier + std::fmt::Debug,
    Q: ContainmentQuery<E>,
    S: DrawSurface,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connector")
            .field("first", &self.first)
            .field("second", &self.second)
            .field("notifier", &self.notifier)
            .field("selector", &self.selector)
            .field("config", &self.config)
            .field("subscriptions", &self.subscriptions)
            .field("destroyed", &self.destroyed)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Rect, Side};
    use crate::headless::{LayoutRoot, ManualNotifier, MeasuredElement};
    use crate::path::PairEnd;
    use crate::surface::SurfaceCallbacks;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    fn recording_surface(log: &Log) -> SurfaceCallbacks {
        let (a, b, c) = (log.clone(), log.clone(), log.clone());
        let draw = move |g: &PathGeometry| a.borrow_mut().push(format!("draw {}", g.width));
        let redraw = move |g: &PathGeometry| b.borrow_mut().push(format!("redraw {}", g.width));
        SurfaceCallbacks::new(draw)
            .with_redraw(redraw)
            .with_remove(move || c.borrow_mut().push("remove".to_string()))
    }

    fn side_by_side() -> (MeasuredElement, MeasuredElement) {
        (
            MeasuredElement::new(Rect::new(0.0, 0.0, 100.0, 50.0)),
            MeasuredElement::new(Rect::new(0.0, 300.0, 100.0, 50.0)),
        )
    }

    #[test]
    fn subscribes_to_every_change_source() {
        let (first, second) = side_by_side();
        let log = Log::default();
        let connector = Connector::new(
            first,
            second,
            ManualNotifier::default(),
            LayoutRoot,
            recording_surface(&log),
            ConnectorConfig::default(),
        );
        assert_eq!(connector.subscriptions().len(), ChangeSource::ALL.len());
        assert_eq!(connector.notifier().active().len(), ChangeSource::ALL.len());
    }

    #[test]
    fn connect_draws_then_notifications_redraw() {
        let (first, second) = side_by_side();
        let log = Log::default();
        let mut connector = Connector::new(
            first,
            second.clone(),
            ManualNotifier::default(),
            LayoutRoot,
            recording_surface(&log),
            ConnectorConfig::default(),
        );
        let outcome = connector.connect();
        assert_eq!(outcome.name(), "drawn");
        assert_eq!(outcome.geometry().map(|g| g.width), Some(200.0));

        let source = ChangeSource::Resize(Endpoint::Second);
        let resize = connector.notifier().subscriptions_for(source)[0];
        assert_eq!(connector.on_layout_change(resize), Outcome::Unchanged);

        second.set_rect(Rect::new(0.0, 350.0, 100.0, 50.0));
        let outcome = connector.on_layout_change(resize);
        assert_eq!(outcome.geometry().map(|g| g.width), Some(250.0));
        assert_eq!(*log.borrow(), vec!["draw 200", "redraw 250"]);
    }

    #[test]
    fn foreign_subscription_is_ignored() {
        let (first, second) = side_by_side();
        let mut connector = Connector::new(
            first,
            second,
            ManualNotifier::default(),
            LayoutRoot,
            recording_surface(&Log::default()),
            ConnectorConfig::default(),
        );
        let foreign = Subscription::from_raw(9_999);
        assert_eq!(connector.on_layout_change(foreign), Outcome::Inactive);
    }

    #[test]
    fn teardown_is_idempotent() {
        let (first, second) = side_by_side();
        let log = Log::default();
        let mut connector = Connector::new(
            first,
            second,
            ManualNotifier::default(),
            LayoutRoot,
            recording_surface(&log),
            ConnectorConfig::default(),
        );
        connector.connect();
        connector.destroy();
        connector.destroy();
        assert!(connector.is_destroyed());
        assert!(connector.notifier().active().is_empty());
        assert_eq!(connector.connect(), Outcome::Inactive);
        drop(connector);
        let removals = log
            .borrow()
            .iter()
            .filter(|entry| *entry == "remove")
            .count();
        assert_eq!(removals, 1);
    }

    #[test]
    fn drop_removes_the_line() {
        let (first, second) = side_by_side();
        let log = Log::default();
        {
            let mut connector = Connector::new(
                first,
                second,
                ManualNotifier::default(),
                LayoutRoot,
                recording_surface(&log),
                ConnectorConfig::default(),
            );
            connector.connect();
        }
        assert_eq!(log.borrow().last().map(String::as_str), Some("remove"));
    }

    #[test]
    fn detached_element_tears_down_and_stays_down() {
        let (first, second) = side_by_side();
        let log = Log::default();
        let mut connector = Connector::new(
            first.clone(),
            second,
            ManualNotifier::default(),
            LayoutRoot,
            recording_surface(&log),
            ConnectorConfig::default(),
        );
        connector.connect();
        let viewport = connector
            .notifier()
            .subscriptions_for(ChangeSource::Viewport)[0];

        first.detach();
        assert_eq!(connector.on_layout_change(viewport), Outcome::Detached);
        assert!(connector.is_destroyed());
        assert!(connector.notifier().active().is_empty());

        first.attach();
        first.set_rect(Rect::new(40.0, 0.0, 100.0, 50.0));
        assert_eq!(connector.on_layout_change(viewport), Outcome::Inactive);
        assert_eq!(connector.refresh(), Outcome::Inactive);
        assert_eq!(*log.borrow(), vec!["draw 200", "remove"]);
    }

    #[test]
    fn unsupported_side_skips_the_draw() {
        // Wide bar above a small box at its left edge: the bar's LEFT center is the left anchor.
        let first = MeasuredElement::new(Rect::new(0.0, 0.0, 400.0, 20.0));
        let second = MeasuredElement::new(Rect::new(200.0, 0.0, 20.0, 20.0));
        let log = Log::default();
        let mut connector = Connector::new(
            first,
            second,
            ManualNotifier::default(),
            LayoutRoot,
            recording_surface(&log),
            ConnectorConfig::default(),
        );
        assert_eq!(
            connector.connect(),
            Outcome::Skipped(PathError::UnsupportedSide {
                end: PairEnd::Left,
                side: Side::Left,
            })
        );
        assert!(log.borrow().is_empty());
    }
}
