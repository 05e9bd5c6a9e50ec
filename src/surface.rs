use crate::path::PathGeometry;

/// Whatever actually paints the connector.
pub trait DrawSurface {
    fn draw(&mut self, geometry: &PathGeometry);

    fn redraw(&mut self, geometry: &PathGeometry) {
        self.draw(geometry);
    }

    fn remove(&mut self) {}
}

type GeometryCallback = Box<dyn FnMut(&PathGeometry)>;

/// Closure-backed surface; redraw falls back to the draw callback.
pub struct SurfaceCallbacks {
    draw: GeometryCallback,
    redraw: Option<GeometryCallback>,
    remove: Option<Box<dyn FnMut()>>,
}

impl SurfaceCallbacks {
    pub fn new(draw: impl FnMut(&PathGeometry) + 'static) -> Self {
        Self {
            draw: Box::new(draw),
            redraw: None,
            remove: None,
        }
    }

    pub fn with_redraw(mut self, redraw: impl FnMut(&PathGeometry) + 'static) -> Self {
        self.redraw = Some(Box::new(redraw));
        self
    }

    pub fn with_remove(mut self, remove: impl FnMut() + 'static) -> Self {
        self.remove = Some(Box::new(remove));
        self
    }
}

impl std::fmt::Debug for SurfaceCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurfaceCallbacks")
            .field("redraw", &self.redraw.is_some())
            .field("remove", &self.remove.is_some())
            .finish_non_exhaustive()
    }
}

impl DrawSurface for SurfaceCallbacks {
    fn draw(&mut self, geometry: &PathGeometry) {
        (self.draw)(geometry);
    }

    fn redraw(&mut self, geometry: &PathGeometry) {
        match self.redraw.as_mut() {
            Some(redraw) => redraw(geometry),
            None => (self.draw)(geometry),
        }
    }

    fn remove(&mut self) {
        if let Some(remove) = self.remove.as_mut() {
            remove();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn geometry() -> PathGeometry {
        PathGeometry {
            top: 0.0,
            left: 0.0,
            width: 10.0,
            height: 10.0,
            points: [Point::new(0.0, 0.0), Point::new(10.0, 10.0)],
        }
    }

    #[test]
    fn redraw_defaults_to_draw() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let sink = calls.clone();
        let mut surface = SurfaceCallbacks::new(move |_| sink.borrow_mut().push("draw"));
        surface.draw(&geometry());
        surface.redraw(&geometry());
        surface.remove();
        assert_eq!(*calls.borrow(), vec!["draw", "draw"]);
    }

    #[test]
    fn separate_redraw_and_remove() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let (a, b, c) = (calls.clone(), calls.clone(), calls.clone());
        let mut surface = SurfaceCallbacks::new(move |_| a.borrow_mut().push("draw"))
            .with_redraw(move |_| b.borrow_mut().push("redraw"))
            .with_remove(move || c.borrow_mut().push("remove"));
        surface.draw(&geometry());
        surface.redraw(&geometry());
        surface.remove();
        assert_eq!(*calls.borrow(), vec!["draw", "redraw", "remove"]);
    }
}
