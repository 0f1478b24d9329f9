use gpui::{
    Context, Hsla, IntoElement, ParentElement as _, Pixels, Render, SharedString, Styled as _,
    Window, div, px,
};
use gpui_component::{ActiveTheme as _, Icon, IconName, Sizable as _, Theme, h_flex};
use gpui_shelf_core::{GhostOverlay, GhostSource, NodeKind, Point};

pub(crate) struct DragGhost {
    label: SharedString,
    kind: NodeKind,
}

impl DragGhost {
    pub(crate) fn new(label: SharedString, kind: NodeKind) -> Self {
        Self { label, kind }
    }
}

impl Render for DragGhost {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        h_flex()
            .gap_x_2()
            .items_center()
            .px(px(10.))
            .py(px(6.))
            .rounded(px(8.))
            .bg(theme.popover)
            .border_1()
            .border_color(theme.border)
            .shadow_md()
            .text_color(theme.popover_foreground)
            .text_sm()
            .child(Icon::from(kind_icon(self.kind, false)).small())
            .child(self.label.clone())
    }
}

/// Ghost bookkeeping for a gpui window.
///
/// gpui paints the dragged view itself and drops it when the drag ends, so
/// the layer only tracks what is on screen and where.
#[derive(Debug, Default)]
pub struct ShelfGhostLayer {
    label: Option<SharedString>,
    origin: Option<Point>,
}

/// Token for the ghost currently shown by a [`ShelfGhostLayer`].
#[derive(Debug)]
pub struct ShelfGhost(());

impl ShelfGhostLayer {
    pub fn label(&self) -> Option<&SharedString> {
        self.label.as_ref()
    }

    pub fn origin(&self) -> Option<Point> {
        self.origin
    }
}

impl GhostOverlay for ShelfGhostLayer {
    type Ghost = ShelfGhost;

    fn mount(&mut self, source: &GhostSource, origin: Point) -> Option<ShelfGhost> {
        if self.label.is_some() {
            return None;
        }
        self.label = Some(source.label.clone().into());
        self.origin = Some(origin);
        Some(ShelfGhost(()))
    }

    fn place(&mut self, _ghost: &mut ShelfGhost, origin: Point) {
        self.origin = Some(origin);
    }

    fn unmount(&mut self, _ghost: ShelfGhost) {
        self.label = None;
        self.origin = None;
    }
}

pub(crate) fn to_point(position: gpui::Point<Pixels>) -> Point {
    Point::new(f32::from(position.x), f32::from(position.y))
}

pub(crate) fn kind_icon(kind: NodeKind, open: bool) -> IconName {
    match kind {
        NodeKind::Folder if open => IconName::FolderOpen,
        NodeKind::Folder => IconName::FolderClosed,
        NodeKind::Subject => IconName::File,
    }
}

/// Map a stored gradient token such as `from-blue-500 to-indigo-600` onto a
/// theme color. Unknown tokens fall back to the accent color.
pub(crate) fn color_tint(token: &str, theme: &Theme) -> Hsla {
    let hue = token
        .split_whitespace()
        .find_map(|part| part.strip_prefix("from-"))
        .unwrap_or(token);
    let name = hue.split('-').next().unwrap_or_default();
    match name {
        "red" | "rose" | "pink" => theme.red,
        "green" | "emerald" | "lime" | "teal" => theme.green,
        "blue" | "sky" | "indigo" | "cyan" => theme.blue,
        "yellow" | "amber" | "orange" => theme.warning,
        "purple" | "violet" | "fuchsia" => theme.primary,
        _ => theme.accent,
    }
}
