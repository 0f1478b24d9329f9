use std::ops::Sub;

use tracing::{debug, warn};

use crate::compose::ViewState;
use crate::payload::{DragData, DragPayload};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub origin: Point,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub const fn new(origin: Point, width: f32, height: f32) -> Self {
        Self {
            origin,
            width,
            height,
        }
    }
}

/// The rendered element a ghost is built from.
#[derive(Debug, Clone, PartialEq)]
pub struct GhostSource {
    pub label: String,
    /// `None` when the element is not laid out yet.
    pub bounds: Option<Bounds>,
}

/// Transient overlay layer the drag ghost lives in.
pub trait GhostOverlay {
    type Ghost;

    /// Returns `None` if the overlay cannot show a ghost right now.
    fn mount(&mut self, source: &GhostSource, origin: Point) -> Option<Self::Ghost>;

    fn place(&mut self, ghost: &mut Self::Ghost, origin: Point);

    fn unmount(&mut self, ghost: Self::Ghost);
}

/// Whether a hovered drop target accepts the drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropEffect {
    Move,
    None,
}

struct ActiveDrag<G> {
    payload: DragPayload,
    offset: Point,
    ghost: Option<G>,
    origin: Option<Point>,
}

/// State of a single drag gesture: idle, or dragging with an optional ghost.
pub struct DragSession<O: GhostOverlay> {
    overlay: O,
    active: Option<ActiveDrag<O::Ghost>>,
    on_drag_end: Option<Box<dyn FnMut(&DragPayload)>>,
}

impl<O: GhostOverlay> DragSession<O> {
    pub fn new(overlay: O) -> Self {
        Self {
            overlay,
            active: None,
            on_drag_end: None,
        }
    }

    /// Provide a callback invoked once whenever a drag ends, dropped or not.
    pub fn on_drag_end(mut self, on_drag_end: impl FnMut(&DragPayload) + 'static) -> Self {
        self.on_drag_end = Some(Box::new(on_drag_end));
        self
    }

    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    pub fn payload(&self) -> Option<&DragPayload> {
        self.active.as_ref().map(|active| &active.payload)
    }

    /// Last valid ghost origin.
    pub fn ghost_origin(&self) -> Option<Point> {
        self.active.as_ref().and_then(|active| active.origin)
    }

    pub fn has_ghost(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| active.ghost.is_some())
    }

    pub fn overlay(&self) -> &O {
        &self.overlay
    }

    pub fn overlay_mut(&mut self) -> &mut O {
        &mut self.overlay
    }

    /// Enter the dragging state and return the drag data to publish.
    ///
    /// Without source bounds no ghost is mounted; the drag itself still starts.
    pub fn start(
        &mut self,
        payload: DragPayload,
        position: Option<usize>,
        pointer: Point,
        source: Option<GhostSource>,
    ) -> DragData {
        if self.active.is_some() {
            debug!("drag started while another was active, ending the stale one");
            self.end();
        }

        let data = DragData::encode(&payload, position).unwrap_or_else(|err| {
            warn!(id = %payload.id, "failed to encode drag payload: {err}");
            DragData::new()
        });

        let bounds = source.as_ref().and_then(|source| source.bounds);
        let offset = bounds
            .map(|bounds| pointer - bounds.origin)
            .unwrap_or_default();
        let origin = bounds.map(|bounds| bounds.origin);
        let ghost = match (&source, origin) {
            (Some(source), Some(origin)) => self.overlay.mount(source, origin),
            _ => {
                debug!(id = %payload.id, "no ghost source, using the default drag visual");
                None
            }
        };

        self.active = Some(ActiveDrag {
            payload,
            offset,
            ghost,
            origin,
        });
        data
    }

    /// Follow the pointer. A move reported at exactly `(0, 0)` is ignored.
    pub fn drag_to(&mut self, pointer: Point) {
        if pointer.is_zero() {
            return;
        }
        let Some(active) = self.active.as_mut() else {
            return;
        };
        let origin = pointer - active.offset;
        active.origin = Some(origin);
        if let Some(ghost) = active.ghost.as_mut() {
            self.overlay.place(ghost, origin);
        }
    }

    /// Return to idle, removing the ghost and firing `on_drag_end`.
    ///
    /// Calling this while idle does nothing.
    pub fn end(&mut self) -> Option<DragPayload> {
        let active = self.active.take()?;
        if let Some(ghost) = active.ghost {
            self.overlay.unmount(ghost);
        }
        if let Some(on_drag_end) = self.on_drag_end.as_mut() {
            on_drag_end(&active.payload);
        }
        Some(active.payload)
    }
}

/// Hover flag of one drop target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HoverState {
    hovered: bool,
}

impl HoverState {
    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    pub fn enter(&mut self, accepts: bool) -> DropEffect {
        self.over(accepts)
    }

    pub fn over(&mut self, accepts: bool) -> DropEffect {
        self.hovered = accepts;
        if accepts {
            DropEffect::Move
        } else {
            DropEffect::None
        }
    }

    pub fn leave(&mut self) {
        self.hovered = false;
    }

    pub fn drop(&mut self) {
        self.hovered = false;
    }
}

/// Everything one shelf view shares between its rows and cards: the drag in
/// progress and the view state (current folder, open menu, flipped card).
pub struct ShelfSession<O: GhostOverlay> {
    pub drag: DragSession<O>,
    pub view: ViewState,
}

impl<O: GhostOverlay> ShelfSession<O> {
    pub fn new(overlay: O) -> Self {
        Self {
            drag: DragSession::new(overlay),
            view: ViewState::default(),
        }
    }

    pub fn with_view(mut self, view: ViewState) -> Self {
        self.view = view;
        self
    }
}
