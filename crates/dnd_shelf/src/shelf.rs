use std::{ops::Range, rc::Rc};

use gpui::{
    AnyElement, App, AppContext as _, ClickEvent, Context, DragMoveEvent, ElementId, Entity,
    EntityId, FocusHandle, InteractiveElement as _, IntoElement, ListSizingBehavior,
    ParentElement as _, Pixels, Point, Render, RenderOnce, SharedString,
    StatefulInteractiveElement as _, StyleRefinement, Styled, UniformListScrollHandle, Window,
    div, prelude::FluentBuilder as _, px, uniform_list,
};
use gpui_component::button::{Button, ButtonVariants as _};
use gpui_component::list::ListItem;
use gpui_component::scroll::{Scrollbar, ScrollbarState};
use gpui_component::{
    ActiveTheme as _, Icon, IconName, Sizable as _, StyledExt as _, h_flex, v_flex,
};
use gpui_shelf_core::{
    Bounds, DragData, DragPayload, DropTarget, FolderCounts, GhostSource, GridCard, GridLayout,
    HoverState, ListRow, MoveResolver, NodeId, NodeKind, NodeRef, ResolveContext, ShelfBackend,
    ShelfIntent, ShelfSession, ShelfSnapshot, ViewMode, ViewState, compose_grid, compose_list,
    resolve_drop,
};
use tracing::debug;

use crate::common::{DragGhost, ShelfGhostLayer, color_tint, kind_icon, to_point};

const CONTEXT: &str = "ShelfView";

/// Create a [`ShelfView`].
pub fn shelf_view(state: &Entity<ShelfState>) -> ShelfView {
    ShelfView::new(state)
}

#[derive(Clone)]
struct ShelfDrag {
    shelf_id: EntityId,
    payload: DragPayload,
    /// Index among same-kind siblings, grid cards only.
    position: Option<usize>,
    label: SharedString,
}

/// State for a folder/subject shelf bound to a [`ShelfBackend`].
pub struct ShelfState {
    focus_handle: FocusHandle,
    backend: Rc<dyn ShelfBackend>,
    snapshot: ShelfSnapshot,
    revision: u64,
    session: ShelfSession<ShelfGhostLayer>,
    drag_data: Option<DragData>,
    hover: Option<(DropTarget, HoverState)>,
    rows: Vec<ListRow>,
    grid: GridLayout,
    indent_width: Pixels,
    row_height: Pixels,
    card_width: Pixels,
    show_counts: bool,
    last_intent: Option<ShelfIntent>,
    scrollbar_state: ScrollbarState,
    scroll_handle: UniformListScrollHandle,
}

impl ShelfState {
    pub fn new(backend: Rc<dyn ShelfBackend>, cx: &mut App) -> Self {
        let snapshot = backend.snapshot();
        let revision = backend.revision();
        let mut this = Self {
            focus_handle: cx.focus_handle(),
            backend,
            snapshot,
            revision,
            session: ShelfSession::new(ShelfGhostLayer::default()),
            drag_data: None,
            hover: None,
            rows: Vec::new(),
            grid: GridLayout::default(),
            indent_width: px(16.),
            row_height: px(32.),
            card_width: px(180.),
            show_counts: true,
            last_intent: None,
            scrollbar_state: ScrollbarState::default(),
            scroll_handle: UniformListScrollHandle::default(),
        };
        this.recompose();
        this
    }

    /// Set the indentation width (in pixels) per nesting level of the list view.
    pub fn indent_width(mut self, indent_width: Pixels) -> Self {
        self.indent_width = indent_width;
        self
    }

    pub fn card_width(mut self, card_width: Pixels) -> Self {
        self.card_width = card_width;
        self
    }

    /// Show recursive subject and folder counts next to folders.
    ///
    /// Defaults to `true`.
    pub fn show_counts(mut self, show_counts: bool) -> Self {
        self.show_counts = show_counts;
        self
    }

    pub fn view_mode(mut self, mode: ViewMode) -> Self {
        self.session.view.mode = mode;
        self.recompose();
        self
    }

    pub fn snapshot(&self) -> &ShelfSnapshot {
        &self.snapshot
    }

    pub fn view_state(&self) -> &ViewState {
        &self.session.view
    }

    /// The mutation dispatched by the most recent successful drop.
    pub fn last_intent(&self) -> Option<&ShelfIntent> {
        self.last_intent.as_ref()
    }

    pub fn set_view_mode(&mut self, mode: ViewMode, cx: &mut Context<Self>) {
        if self.session.view.mode == mode {
            return;
        }
        self.session.view.mode = mode;
        self.session.view.close_menu();
        self.recompose();
        cx.notify();
    }

    pub fn open_folder(&mut self, folder_id: Option<NodeId>, cx: &mut Context<Self>) {
        self.session.view.open_folder(folder_id);
        self.recompose();
        cx.notify();
    }

    pub fn go_up(&mut self, cx: &mut Context<Self>) {
        self.session.view.go_up(&self.snapshot);
        self.recompose();
        cx.notify();
    }

    /// Pull a fresh snapshot if the backend changed since the last render.
    pub fn refresh(&mut self, cx: &mut Context<Self>) {
        if self.sync() {
            cx.notify();
        }
    }

    fn sync(&mut self) -> bool {
        let revision = self.backend.revision();
        if revision == self.revision {
            return false;
        }
        self.revision = revision;
        self.snapshot = self.backend.snapshot();
        self.session.view.prune(&self.snapshot);
        self.recompose();
        true
    }

    fn recompose(&mut self) {
        self.rows = compose_list(&self.snapshot, &self.session.view);
        self.grid = compose_grid(&self.snapshot, &self.session.view);
    }

    fn is_dragged(&self, id: &NodeId) -> bool {
        self.session
            .drag
            .payload()
            .is_some_and(|payload| payload.id == *id)
    }

    fn is_hovered(&self, target: &DropTarget) -> bool {
        self.hover
            .as_ref()
            .is_some_and(|(hovered, state)| hovered == target && state.is_hovered())
    }

    fn toggle_menu(&mut self, id: &NodeId, cx: &mut Context<Self>) {
        self.session.view.toggle_menu(id);
        self.recompose();
        cx.notify();
    }

    fn on_row_click(&mut self, node: &NodeRef, cx: &mut Context<Self>) {
        match node.kind {
            NodeKind::Folder => self.session.view.toggle_collapsed(&node.id),
            NodeKind::Subject => self.session.view.toggle_menu(&node.id),
        }
        self.recompose();
        cx.notify();
    }

    fn on_card_click(&mut self, node: &NodeRef, cx: &mut Context<Self>) {
        match node.kind {
            NodeKind::Folder => self.session.view.open_folder(Some(node.id.clone())),
            NodeKind::Subject => self.session.view.toggle_flipped(&node.id),
        }
        self.recompose();
        cx.notify();
    }

    fn on_drag_start(
        &mut self,
        drag: &ShelfDrag,
        cursor_offset: Point<Pixels>,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        let pointer = window.mouse_position();
        let origin = gpui::point(pointer.x - cursor_offset.x, pointer.y - cursor_offset.y);
        let (width, height) = match self.session.view.mode {
            ViewMode::List => (0., f32::from(self.row_height)),
            ViewMode::Grid => (f32::from(self.card_width), 0.),
        };
        let source = GhostSource {
            label: drag.label.to_string(),
            bounds: Some(Bounds::new(to_point(origin), width, height)),
        };
        debug!(id = %drag.payload.id, kind = drag.payload.kind.as_str(), "shelf drag started");
        self.drag_data = Some(self.session.drag.start(
            drag.payload.clone(),
            drag.position,
            to_point(pointer),
            Some(source),
        ));
        self.hover = None;
        self.session.view.close_menu();
        self.recompose();
        cx.notify();
    }

    fn on_drag_move(
        &mut self,
        event: &DragMoveEvent<ShelfDrag>,
        _window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        if !cx.has_active_drag() {
            return;
        }
        if event.drag(cx).shelf_id != cx.entity_id() {
            return;
        }
        self.session.drag.drag_to(to_point(event.event.position));
    }

    fn on_target_drag_move(
        &mut self,
        target: &DropTarget,
        event: &DragMoveEvent<ShelfDrag>,
        _window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        if !cx.has_active_drag() {
            return;
        }
        let drag = event.drag(cx);
        if drag.shelf_id != cx.entity_id() {
            return;
        }
        let payload = drag.payload.clone();

        if event.bounds.contains(&event.event.position) {
            let accepts = drop_accepted(
                &payload,
                target,
                self.session.view.mode,
                &self.snapshot,
                self.session.view.current_folder(),
            );
            self.hover_over(target, accepts, cx);
        } else {
            self.hover_leave(target, cx);
        }
    }

    fn hover_over(&mut self, target: &DropTarget, accepts: bool, cx: &mut Context<Self>) {
        if let Some((hovered, state)) = self.hover.as_mut()
            && hovered == target
        {
            if state.is_hovered() != accepts {
                state.over(accepts);
                cx.notify();
            }
            return;
        }

        if let Some((_, mut state)) = self.hover.take() {
            state.leave();
        }
        let mut state = HoverState::default();
        state.enter(accepts);
        self.hover = Some((target.clone(), state));
        cx.notify();
    }

    fn hover_leave(&mut self, target: &DropTarget, cx: &mut Context<Self>) {
        if !self
            .hover
            .as_ref()
            .is_some_and(|(hovered, _)| hovered == target)
        {
            return;
        }
        if let Some((_, mut state)) = self.hover.take() {
            state.leave();
        }
        cx.notify();
    }

    fn cancel_drag(&mut self) {
        if let Some(payload) = self.session.drag.end() {
            debug!(id = %payload.id, "shelf drag ended without a drop");
        }
        self.drag_data = None;
        self.hover = None;
    }

    fn on_drop(&mut self, drag: &ShelfDrag, target: DropTarget, cx: &mut Context<Self>) {
        if drag.shelf_id != cx.entity_id() {
            self.cancel_drag();
            cx.notify();
            return;
        }
        if let Some((_, state)) = self.hover.as_mut() {
            state.drop();
        }

        let data = self.drag_data.take().unwrap_or_default();
        let current = self.session.view.current_folder().cloned();
        let resolve_cx = ResolveContext::new(&self.snapshot, current.as_ref());
        let intent = MoveResolver::finish_drop(
            &mut self.session.drag,
            &data,
            &target,
            &resolve_cx,
            self.backend.as_ref(),
        );
        self.finish(intent, cx);
    }

    /// Grid cards: same-kind siblings reorder, holding Alt over a sibling folder
    /// nests instead, anything else resolves as a move.
    fn on_drop_on_card(
        &mut self,
        drag: &ShelfDrag,
        card: &NodeRef,
        card_ix: usize,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        let nest = window.modifiers().alt && card.kind == NodeKind::Folder;
        if drag.shelf_id != cx.entity_id() || nest || !is_sibling(&drag.payload, card) {
            self.on_drop(drag, DropTarget::Node(card.clone()), cx);
            return;
        }

        if let Some((_, state)) = self.hover.as_mut() {
            state.drop();
        }
        let sibling_count = match card.kind {
            NodeKind::Folder => self.grid.folders.len(),
            NodeKind::Subject => self.grid.subjects.len(),
        };
        let data = self.drag_data.take().unwrap_or_default();
        let intent = MoveResolver::finish_reorder(
            &mut self.session.drag,
            &data,
            card,
            card_ix,
            sibling_count,
            self.backend.as_ref(),
        );
        self.finish(intent, cx);
    }

    fn finish(&mut self, intent: Option<ShelfIntent>, cx: &mut Context<Self>) {
        self.hover = None;
        self.drag_data = None;
        if intent.is_some() {
            self.last_intent = intent;
        }
        self.sync();
        cx.notify();
    }

    fn render_toolbar(&self, cx: &mut Context<Self>) -> AnyElement {
        let border = cx.theme().border;
        let muted_foreground = cx.theme().muted_foreground;
        let mode = self.session.view.mode;
        let inside_folder = self.session.view.current_folder().is_some();

        let mut crumbs = Vec::with_capacity(self.grid.breadcrumbs.len());
        for (ix, crumb) in self.grid.breadcrumbs.iter().enumerate() {
            let folder_id = crumb.id.clone();
            crumbs.push(
                h_flex()
                    .items_center()
                    .child(
                        Icon::from(IconName::ChevronRight)
                            .small()
                            .text_color(muted_foreground),
                    )
                    .child(
                        Button::new(("shelf-crumb", ix))
                            .label(crumb.name.clone())
                            .ghost()
                            .small()
                            .on_click(cx.listener(move |this, _, _window, cx| {
                                this.open_folder(Some(folder_id.clone()), cx);
                            })),
                    ),
            );
        }

        h_flex()
            .gap_1()
            .px_2()
            .py_1()
            .items_center()
            .border_b_1()
            .border_color(border)
            .when(inside_folder, |this| {
                this.child(
                    Button::new("shelf-up")
                        .icon(IconName::ChevronUp)
                        .ghost()
                        .small()
                        .on_click(cx.listener(|this, _, _window, cx| this.go_up(cx))),
                )
            })
            .child(
                Button::new("shelf-crumb-root")
                    .label("Shelf")
                    .ghost()
                    .small()
                    .on_click(cx.listener(|this, _, _window, cx| this.open_folder(None, cx))),
            )
            .children(crumbs)
            .child(div().flex_1())
            .child(
                Button::new("shelf-mode-list")
                    .icon(IconName::Menu)
                    .small()
                    .map(|this| {
                        if mode == ViewMode::List {
                            this.primary()
                        } else {
                            this.ghost()
                        }
                    })
                    .on_click(cx.listener(|this, _, _window, cx| {
                        this.set_view_mode(ViewMode::List, cx);
                    })),
            )
            .child(
                Button::new("shelf-mode-grid")
                    .icon(IconName::Layers)
                    .small()
                    .map(|this| {
                        if mode == ViewMode::Grid {
                            this.primary()
                        } else {
                            this.ghost()
                        }
                    })
                    .on_click(cx.listener(|this, _, _window, cx| {
                        this.set_view_mode(ViewMode::Grid, cx);
                    })),
            )
            .into_any_element()
    }

    fn render_drop_zone(
        &self,
        id: &'static str,
        target: DropTarget,
        icon: IconName,
        label: &'static str,
        cx: &mut Context<Self>,
    ) -> AnyElement {
        let theme = cx.theme();
        let hovered = self.is_hovered(&target);
        let (border, drag_border, drop_target, muted_foreground, radius) = (
            theme.border,
            theme.drag_border,
            theme.drop_target,
            theme.muted_foreground,
            theme.radius,
        );
        let move_target = target.clone();

        h_flex()
            .id(id)
            .mx_2()
            .px_3()
            .py_2()
            .gap_x_2()
            .items_center()
            .rounded(radius)
            .border_1()
            .border_color(if hovered { drag_border } else { border })
            .when(hovered, |this| this.bg(drop_target))
            .text_sm()
            .text_color(muted_foreground)
            .child(Icon::from(icon).small())
            .child(label)
            .on_drag_move::<ShelfDrag>(cx.listener(move |this, ev, window, cx| {
                this.on_target_drag_move(&move_target, ev, window, cx);
            }))
            .on_drop::<ShelfDrag>(cx.listener(move |this, drag, _window, cx| {
                this.on_drop(drag, target.clone(), cx);
            }))
            .into_any_element()
    }

    fn render_list(&self, cx: &mut Context<Self>) -> AnyElement {
        let state_entity = cx.entity();

        div()
            .id("shelf-list")
            .size_full()
            .relative()
            .child(
                uniform_list("shelf-rows", self.rows.len(), {
                    cx.processor(move |state, visible_range: Range<usize>, _window, cx| {
                        let theme = cx.theme();
                        let (drop_target_bg, muted_foreground, foreground) =
                            (theme.drop_target, theme.muted_foreground, theme.foreground);
                        let shelf_id = cx.entity_id();
                        let mut items = Vec::with_capacity(visible_range.len());
                        for ix in visible_range {
                            let row = &state.rows[ix];
                            let target = DropTarget::Node(row.node.clone());
                            let hovered = state.is_hovered(&target);
                            let dragging = state.is_dragged(&row.node.id) && cx.has_active_drag();
                            let tint = color_tint(&row.color, cx.theme());
                            let detail = row_detail(row, state.snapshot(), state.show_counts);

                            let drag_value = ShelfDrag {
                                shelf_id,
                                payload: row.node.clone(),
                                position: None,
                                label: row.name.clone().into(),
                            };
                            let menu_id = row.node.id.clone();
                            let open_id = (row.is_folder() && row.menu_open)
                                .then(|| row.node.id.clone());
                            let click_node = row.node.clone();
                            let move_target = target.clone();

                            let item = ListItem::new(ix)
                                .pl(px(10.) + state.indent_width * row.depth)
                                .when(dragging, |this| this.opacity(0.4))
                                .child(
                                    h_flex()
                                        .w_full()
                                        .gap_x_2()
                                        .items_center()
                                        .child(
                                            Icon::from(kind_icon(row.node.kind, !row.collapsed))
                                                .small()
                                                .text_color(tint),
                                        )
                                        .child(
                                            div()
                                                .flex_1()
                                                .text_color(foreground)
                                                .child(row.name.clone()),
                                        )
                                        .when_some(detail, |this, detail| {
                                            this.child(
                                                div()
                                                    .text_xs()
                                                    .text_color(muted_foreground)
                                                    .child(detail),
                                            )
                                        })
                                        .when_some(open_id, |this, open_id| {
                                            this.child(
                                                Button::new(("shelf-row-open", ix))
                                                    .label("Open")
                                                    .ghost()
                                                    .xsmall()
                                                    .on_click(cx.listener(
                                                        move |this, _, _window, cx| {
                                                            cx.stop_propagation();
                                                            this.open_folder(
                                                                Some(open_id.clone()),
                                                                cx,
                                                            );
                                                        },
                                                    )),
                                            )
                                        })
                                        .child(
                                            div()
                                                .id(("shelf-row-menu", ix))
                                                .px_1()
                                                .rounded(px(4.))
                                                .child(
                                                    Icon::from(IconName::Ellipsis)
                                                        .small()
                                                        .text_color(muted_foreground),
                                                )
                                                .on_click(cx.listener(
                                                    move |this, _: &ClickEvent, _window, cx| {
                                                        cx.stop_propagation();
                                                        this.toggle_menu(&menu_id, cx);
                                                    },
                                                )),
                                        ),
                                );

                            let state_entity = state_entity.clone();
                            let row = div()
                                .id(ix)
                                .h(state.row_height)
                                .when(hovered, |this| this.bg(drop_target_bg))
                                .child(item)
                                .on_drag_move::<ShelfDrag>(cx.listener(
                                    move |this, ev, window, cx| {
                                        this.on_target_drag_move(&move_target, ev, window, cx);
                                    },
                                ))
                                .on_drop::<ShelfDrag>(cx.listener(
                                    move |this, drag, _window, cx| {
                                        this.on_drop(drag, target.clone(), cx);
                                    },
                                ))
                                .on_click(cx.listener(
                                    move |this, _: &ClickEvent, _window, cx| {
                                        this.on_row_click(&click_node, cx);
                                    },
                                ))
                                .on_drag(drag_value, move |drag, cursor_offset, window, cx| {
                                    state_entity.update(cx, |state, cx| {
                                        state.on_drag_start(drag, cursor_offset, window, cx);
                                    });
                                    let label = drag.label.clone();
                                    let kind = drag.payload.kind;
                                    cx.new(|_| DragGhost::new(label, kind))
                                });

                            items.push(row);
                        }
                        items
                    })
                })
                .flex_grow()
                .size_full()
                .track_scroll(self.scroll_handle.clone())
                .with_sizing_behavior(ListSizingBehavior::Auto)
                .into_any_element(),
            )
            .child(
                div()
                    .absolute()
                    .top_0()
                    .right_0()
                    .bottom_0()
                    .w(px(12.))
                    .child(Scrollbar::uniform_scroll(
                        &self.scrollbar_state,
                        &self.scroll_handle,
                    )),
            )
            .into_any_element()
    }

    fn render_card(&self, card: &GridCard, cx: &mut Context<Self>) -> AnyElement {
        let theme = cx.theme();
        let (background, border, drag_border, drop_target, foreground, muted_foreground, radius) = (
            theme.background,
            theme.border,
            theme.drag_border,
            theme.drop_target,
            theme.foreground,
            theme.muted_foreground,
            theme.radius,
        );
        let tint = color_tint(&card.color, theme);

        let target = DropTarget::Node(card.node.clone());
        let hovered = self.is_hovered(&target);
        let dragging = self.is_dragged(&card.node.id) && cx.has_active_drag();
        let lines = card_lines(card, &self.snapshot, self.show_counts);

        let drag_value = ShelfDrag {
            shelf_id: cx.entity_id(),
            payload: card.node.clone(),
            position: Some(card.index),
            label: card.name.clone().into(),
        };
        let state_entity = cx.entity();
        let card_ix = card.index;
        let click_node = card.node.clone();
        let drop_node = card.node.clone();
        let menu_id = card.node.id.clone();
        let key = format!("{}-{}", card.node.kind.as_str(), card.node.id);
        let element_id = ElementId::Name(format!("shelf-card-{key}").into());
        let menu_element_id = ElementId::Name(format!("shelf-card-menu-{key}").into());

        v_flex()
            .id(element_id)
            .w(self.card_width)
            .min_h(px(112.))
            .p_3()
            .gap_1()
            .rounded(radius)
            .border_1()
            .border_color(if hovered { drag_border } else { border })
            .bg(if hovered { drop_target } else { background })
            .when(dragging, |this| this.opacity(0.4))
            .child(div().h(px(4.)).w_full().rounded(px(2.)).bg(tint))
            .child(
                h_flex()
                    .gap_x_2()
                    .items_center()
                    .child(
                        Icon::from(kind_icon(card.node.kind, false))
                            .small()
                            .text_color(tint),
                    )
                    .child(
                        div()
                            .flex_1()
                            .text_color(foreground)
                            .font_semibold()
                            .child(card.name.clone()),
                    )
                    .child(
                        div()
                            .id(menu_element_id)
                            .px_1()
                            .rounded(px(4.))
                            .child(
                                Icon::from(IconName::Ellipsis)
                                    .small()
                                    .text_color(muted_foreground),
                            )
                            .on_click(cx.listener(move |this, _: &ClickEvent, _window, cx| {
                                cx.stop_propagation();
                                this.toggle_menu(&menu_id, cx);
                            })),
                    ),
            )
            .children(lines.into_iter().map(|line| {
                div()
                    .text_xs()
                    .text_color(muted_foreground)
                    .child(line)
            }))
            .on_drag_move::<ShelfDrag>(cx.listener(move |this, ev, window, cx| {
                this.on_target_drag_move(&target, ev, window, cx);
            }))
            .on_drop::<ShelfDrag>(cx.listener(move |this, drag, window, cx| {
                this.on_drop_on_card(drag, &drop_node, card_ix, window, cx);
            }))
            .on_click(cx.listener(move |this, _: &ClickEvent, _window, cx| {
                this.on_card_click(&click_node, cx);
            }))
            .on_drag(drag_value, move |drag, cursor_offset, window, cx| {
                state_entity.update(cx, |state, cx| {
                    state.on_drag_start(drag, cursor_offset, window, cx);
                });
                let label = drag.label.clone();
                let kind = drag.payload.kind;
                cx.new(|_| DragGhost::new(label, kind))
            })
            .into_any_element()
    }

    fn render_section(
        &self,
        title: &'static str,
        cards: Vec<AnyElement>,
        cx: &mut Context<Self>,
    ) -> AnyElement {
        let muted_foreground = cx.theme().muted_foreground;
        v_flex()
            .gap_2()
            .child(
                div()
                    .text_sm()
                    .text_color(muted_foreground)
                    .child(title),
            )
            .child(h_flex().flex_wrap().gap_3().children(cards))
            .into_any_element()
    }

    fn render_grid(&self, dragging: bool, cx: &mut Context<Self>) -> AnyElement {
        let folders = self
            .grid
            .folders
            .iter()
            .map(|card| self.render_card(card, cx))
            .collect::<Vec<_>>();
        let subjects = self
            .grid
            .subjects
            .iter()
            .map(|card| self.render_card(card, cx))
            .collect::<Vec<_>>();
        let promote = (dragging && self.grid.can_promote).then(|| {
            self.render_drop_zone(
                "shelf-promote-zone",
                DropTarget::PromoteZone,
                IconName::ArrowUpToLine,
                "Move up one level",
                cx,
            )
        });
        let empty = folders.is_empty() && subjects.is_empty();
        let muted_foreground = cx.theme().muted_foreground;

        let folders = (!folders.is_empty()).then(|| self.render_section("Folders", folders, cx));
        let subjects =
            (!subjects.is_empty()).then(|| self.render_section("Subjects", subjects, cx));

        div().id("shelf-grid").size_full().overflow_y_scroll().child(
            v_flex()
                .p_3()
                .gap_4()
                .when_some(promote, |this, zone| this.child(zone))
                .when_some(folders, |this, section| this.child(section))
                .when_some(subjects, |this, section| this.child(section))
                .when(empty, |this| {
                    this.child(
                        div()
                            .text_sm()
                            .text_color(muted_foreground)
                            .child("This folder is empty"),
                    )
                }),
        )
        .into_any_element()
    }
}

impl Render for ShelfState {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        if !cx.has_active_drag() && self.session.drag.is_dragging() {
            self.cancel_drag();
        }
        self.sync();

        let dragging = cx.has_active_drag() && self.session.drag.is_dragging();
        let toolbar = self.render_toolbar(cx);
        let body = match self.session.view.mode {
            ViewMode::List => v_flex()
                .size_full()
                .gap_1()
                .when(dragging, |this| {
                    this.child(self.render_drop_zone(
                        "shelf-current-layer-zone",
                        DropTarget::CurrentLayer,
                        IconName::ArrowDownToLine,
                        "Move to this level",
                        cx,
                    ))
                })
                .child(self.render_list(cx))
                .into_any_element(),
            ViewMode::Grid => self.render_grid(dragging, cx),
        };

        v_flex()
            .id("shelf-state")
            .size_full()
            .on_drag_move::<ShelfDrag>(cx.listener(Self::on_drag_move))
            .child(toolbar)
            .child(div().flex_1().w_full().relative().child(body))
    }
}

/// A drop target view over a shelf of folders and subjects.
#[derive(IntoElement)]
pub struct ShelfView {
    id: ElementId,
    state: Entity<ShelfState>,
    style: StyleRefinement,
}

impl ShelfView {
    pub fn new(state: &Entity<ShelfState>) -> Self {
        Self {
            id: ElementId::Name(format!("shelf-view-{}", state.entity_id()).into()),
            state: state.clone(),
            style: StyleRefinement::default(),
        }
    }
}

impl Styled for ShelfView {
    fn style(&mut self) -> &mut StyleRefinement {
        &mut self.style
    }
}

impl RenderOnce for ShelfView {
    fn render(self, _window: &mut Window, cx: &mut App) -> impl IntoElement {
        let focus_handle = self.state.read(cx).focus_handle.clone();

        div()
            .id(self.id)
            .key_context(CONTEXT)
            .track_focus(&focus_handle)
            .size_full()
            .child(self.state)
            .refine_style(&self.style)
    }
}

fn is_sibling(dragged: &DragPayload, target: &NodeRef) -> bool {
    dragged.kind == target.kind && dragged.parent_id == target.parent_id
}

/// Whether hovering `target` with `payload` should highlight the target.
fn drop_accepted(
    payload: &DragPayload,
    target: &DropTarget,
    mode: ViewMode,
    snapshot: &ShelfSnapshot,
    current_folder: Option<&NodeId>,
) -> bool {
    if mode == ViewMode::Grid
        && let DropTarget::Node(node) = target
        && is_sibling(payload, node)
    {
        return payload.id != node.id;
    }
    let cx = ResolveContext::new(snapshot, current_folder);
    resolve_drop(payload, target, &cx).is_ok()
}

fn counts_label(counts: FolderCounts) -> String {
    fn plural(n: usize, one: &str, many: &str) -> String {
        format!("{n} {}", if n == 1 { one } else { many })
    }
    if counts.total_count() == 0 {
        return "Empty".to_string();
    }
    format!(
        "{}, {}",
        plural(counts.subject_count, "subject", "subjects"),
        plural(counts.folder_count, "folder", "folders"),
    )
}

/// Trailing text of a list row: counts for folders, and extra details while
/// the row's menu is open.
fn row_detail(row: &ListRow, snapshot: &ShelfSnapshot, show_counts: bool) -> Option<String> {
    let counts = row
        .counts
        .filter(|_| show_counts)
        .map(counts_label);
    if !row.menu_open {
        return counts;
    }
    let extra = match row.node.kind {
        NodeKind::Folder => snapshot
            .folder(&row.node.id)
            .and_then(|folder| folder.description.clone()),
        NodeKind::Subject => snapshot.subject(&row.node.id).map(|subject| {
            let topics = subject.topics.len();
            match &subject.course {
                Some(course) => format!("{course} · {topics} topics"),
                None => format!("{topics} topics"),
            }
        }),
    };
    match (counts, extra) {
        (Some(counts), Some(extra)) => Some(format!("{counts} · {extra}")),
        (counts, extra) => counts.or(extra),
    }
}

/// Secondary lines of a grid card. A flipped subject card shows its back side.
fn card_lines(card: &GridCard, snapshot: &ShelfSnapshot, show_counts: bool) -> Vec<String> {
    let mut lines = Vec::new();
    match card.node.kind {
        NodeKind::Folder => {
            if let Some(counts) = card.counts.filter(|_| show_counts) {
                lines.push(counts_label(counts));
            }
            if card.menu_open
                && let Some(folder) = snapshot.folder(&card.node.id)
            {
                lines.extend(folder.description.clone());
                if folder.is_shared {
                    lines.push(format!("Shared with {}", folder.shared_with.len()));
                }
            }
        }
        NodeKind::Subject => {
            let subject = snapshot.subject(&card.node.id);
            if card.flipped {
                lines.extend(subject.and_then(|subject| subject.course.clone()));
                lines.extend(
                    subject
                        .into_iter()
                        .flat_map(|subject| subject.topics.iter())
                        .map(|topic| topic.name.clone()),
                );
            } else {
                lines.push(format!("{} topics", card.topic_count));
            }
            if card.menu_open
                && let Some(subject) = subject
                && !subject.tags.is_empty()
            {
                lines.push(subject.tags.join(", "));
            }
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use gpui_shelf_core::{FolderNode, SubjectNode, Topic};

    use super::*;

    fn snapshot() -> ShelfSnapshot {
        let mut biology = SubjectNode::new("bio", "Biology")
            .parent("science")
            .course("BIO 101");
        biology.topics = vec![
            Topic {
                name: "Cells".to_string(),
                rest: Default::default(),
            },
            Topic {
                name: "Genetics".to_string(),
                rest: Default::default(),
            },
        ];
        ShelfSnapshot::new(
            vec![
                FolderNode::new("science", "Science")
                    .subjects(["bio"])
                    .folders(["labs"]),
                FolderNode::new("labs", "Labs").parent("science"),
            ],
            vec![biology, SubjectNode::new("art", "Art")],
        )
    }

    #[test]
    fn counts_labels() {
        assert_eq!(
            counts_label(FolderCounts {
                subject_count: 1,
                folder_count: 2,
            }),
            "1 subject, 2 folders"
        );
        assert_eq!(counts_label(FolderCounts::default()), "Empty");
    }

    #[test]
    fn grid_siblings_accept_reorder_but_not_self() {
        let snapshot = snapshot();
        let science = NodeRef::folder("science", None);
        let art = NodeRef::subject("art", None);
        let other_root_folder = NodeRef::folder("other", None);

        assert!(drop_accepted(
            &science,
            &DropTarget::Node(other_root_folder.clone()),
            ViewMode::Grid,
            &snapshot,
            None,
        ));
        assert!(!drop_accepted(
            &science,
            &DropTarget::Node(science.clone()),
            ViewMode::Grid,
            &snapshot,
            None,
        ));
        // A root subject dropped on a root subject in the list is a no-op move.
        assert!(!drop_accepted(
            &art,
            &DropTarget::Node(art.clone()),
            ViewMode::List,
            &snapshot,
            None,
        ));
    }

    #[test]
    fn list_rejects_nesting_into_descendant() {
        let snapshot = snapshot();
        let science = NodeRef::folder("science", None);
        let labs = NodeRef::folder("labs", Some("science".into()));
        assert!(!drop_accepted(
            &science,
            &DropTarget::Node(labs),
            ViewMode::List,
            &snapshot,
            None,
        ));
        let art = NodeRef::subject("art", None);
        assert!(drop_accepted(
            &art,
            &DropTarget::Node(science),
            ViewMode::List,
            &snapshot,
            None,
        ));
    }

    #[test]
    fn flipped_subject_card_lists_course_and_topics() {
        let snapshot = snapshot();
        let view = {
            let mut view = ViewState::new(ViewMode::Grid);
            view.open_folder(Some("science".into()));
            view.toggle_flipped(&"bio".into());
            view
        };
        let grid = compose_grid(&snapshot, &view);
        let card = grid
            .subjects
            .iter()
            .find(|card| card.node.id == "bio")
            .unwrap();
        assert_eq!(
            card_lines(card, &snapshot, true),
            vec!["BIO 101", "Cells", "Genetics"]
        );
    }

    #[test]
    fn open_menu_adds_subject_details() {
        let snapshot = snapshot();
        let mut view = ViewState::default();
        view.toggle_menu(&"bio".into());
        let rows = compose_list(&snapshot, &view);
        let bio = rows.iter().find(|row| row.node.id == "bio").unwrap();
        assert_eq!(
            row_detail(bio, &snapshot, true).as_deref(),
            Some("BIO 101 · 2 topics")
        );
        let science = rows.iter().find(|row| row.node.id == "science").unwrap();
        assert_eq!(
            row_detail(science, &snapshot, true).as_deref(),
            Some("1 subject, 1 folder")
        );
        assert_eq!(row_detail(science, &snapshot, false), None);
    }
}
