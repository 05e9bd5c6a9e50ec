//! In-memory stand-ins for a live layout: elements whose boxes are set by a
//! driver loop, and a notifier that only records subscriptions. A host without
//! change notifications re-measures on its own schedule and delivers the
//! recorded handles to the connector.

use std::cell::Cell;
use std::rc::Rc;

use crate::connector::{ChangeSource, LayoutNotifier, Subscription};
use crate::geometry::Rect;
use crate::select::{ContainmentQuery, ElementHandle};

/// Element with a shared, externally updated bounding box. Clones observe the
/// same box and attachment flag.
#[derive(Debug, Clone)]
pub struct MeasuredElement {
    rect: Rc<Cell<Rect>>,
    attached: Rc<Cell<bool>>,
}

impl MeasuredElement {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect: Rc::new(Cell::new(rect)),
            attached: Rc::new(Cell::new(true)),
        }
    }

    pub fn rect(&self) -> Rect {
        self.rect.get()
    }

    pub fn set_rect(&self, rect: Rect) {
        self.rect.set(rect);
    }

    pub fn detach(&self) {
        self.attached.set(false);
    }

    pub fn attach(&self) {
        self.attached.set(true);
    }

    pub fn is_attached(&self) -> bool {
        self.attached.get()
    }
}

impl ElementHandle for MeasuredElement {
    fn bounding_box(&self) -> Rect {
        self.rect.get()
    }
}

/// Layout root that contains every attached `MeasuredElement`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutRoot;

impl ContainmentQuery<MeasuredElement> for LayoutRoot {
    fn contains(&self, element: &MeasuredElement) -> bool {
        element.is_attached()
    }
}

#[derive(Debug, Default)]
pub struct ManualNotifier {
    next_id: u64,
    active: Vec<(Subscription, ChangeSource)>,
}

impl ManualNotifier {
    pub fn active(&self) -> &[(Subscription, ChangeSource)] {
        &self.active
    }

    pub fn subscriptions_for(&self, source: ChangeSource) -> Vec<Subscription> {
        self.active
            .iter()
            .filter(|(_, s)| *s == source)
            .map(|(subscription, _)| *subscription)
            .collect()
    }
}

impl LayoutNotifier for ManualNotifier {
    fn subscribe(&mut self, source: ChangeSource) -> Subscription {
        self.next_id += 1;
        let subscription = Subscription::from_raw(self.next_id);
        self.active.push((subscription, source));
        subscription
    }

    fn unsubscribe(&mut self, subscription: Subscription) {
        self.active.retain(|(s, _)| *s != subscription);
    }
}
