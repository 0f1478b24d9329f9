use std::rc::Rc;

use gpui::*;
use gpui_component::button::{Button, ButtonVariants as _};
use gpui_component::{ActiveTheme as _, IconName, Sizable as _, Theme, ThemeMode, h_flex, v_flex};
use gpui_dnd_shelf::{ShelfState, shelf_view};
use gpui_shelf_core::{FolderNode, MemoryShelf, ShelfBackend, ShelfSource as _, SubscriptionId};
use tracing::{info, warn};

use crate::config::ShelfConfig;

pub struct ShelfStory {
    store: Rc<MemoryShelf>,
    shelf: Entity<ShelfState>,
    subscription: SubscriptionId,
    next_folder: usize,
}

impl ShelfStory {
    pub fn view(
        store: Rc<MemoryShelf>,
        config: &ShelfConfig,
        _window: &mut Window,
        cx: &mut App,
    ) -> Entity<Self> {
        let backend: Rc<dyn ShelfBackend> = store.clone();
        let shelf = cx.new(|cx| {
            ShelfState::new(backend, cx)
                .indent_width(px(config.indent_width))
                .card_width(px(config.card_width))
                .show_counts(config.show_counts)
                .view_mode(config.view_mode)
        });
        let subscription = store.subscribe(Box::new(|snapshot| {
            info!(
                folders = snapshot.folders.len(),
                subjects = snapshot.subjects.len(),
                "shelf changed"
            );
        }));
        cx.new(|_| Self {
            store,
            shelf,
            subscription,
            next_folder: 1,
        })
    }

    fn new_folder(&mut self, cx: &mut Context<Self>) {
        let parent = self.shelf.read(cx).view_state().current_folder().cloned();
        let n = self.next_folder;
        self.next_folder += 1;

        let mut folder = FolderNode::new(format!("new-folder-{n}"), format!("New folder {n}"))
            .color("from-sky-400 to-blue-500");
        if let Some(parent) = parent {
            folder = folder.parent(parent);
        }
        if let Err(err) = self.store.create_folder(folder) {
            warn!("failed to create folder: {err}");
            return;
        }
        self.shelf.update(cx, |shelf, cx| shelf.refresh(cx));
    }

    fn toggle_theme(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        let mode = if cx.theme().mode.is_dark() {
            ThemeMode::Light
        } else {
            ThemeMode::Dark
        };
        Theme::change(mode, Some(window), cx);
    }
}

impl Drop for ShelfStory {
    fn drop(&mut self) {
        self.store.unsubscribe(self.subscription);
    }
}

impl Render for ShelfStory {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let shelf = self.shelf.read(cx);
        let revision = self.store.revision();
        let last_intent = shelf
            .last_intent()
            .map(|intent| format!("{intent:?}"))
            .unwrap_or_else(|| "<none>".to_string());
        let snapshot = shelf.snapshot();
        let totals = format!(
            "{} folders, {} subjects",
            snapshot.folders.len(),
            snapshot.subjects.len()
        );

        v_flex()
            .size_full()
            .p(px(16.))
            .gap_y_3()
            .child(
                v_flex()
                    .gap_y_1()
                    .child(div().text_xl().font_weight(FontWeight::BOLD).child("Shelf"))
                    .child(
                        div()
                            .text_sm()
                            .text_color(theme.muted_foreground)
                            .child("Tip: drop an item on a folder to move it inside. Drop on a subject to move next to it. In the grid, dropping on a sibling card of the same kind reorders; hold Alt to nest a folder instead. While inside a folder, the top zone moves items up one level."),
                    )
                    .child(
                        div()
                            .text_sm()
                            .text_color(theme.muted_foreground)
                            .child(format!("Revision {revision} · {totals}")),
                    )
                    .child(
                        div()
                            .text_sm()
                            .text_color(theme.muted_foreground)
                            .child(format!("Last move: {last_intent}")),
                    ),
            )
            .child(
                h_flex()
                    .gap_x_2()
                    .child(
                        Button::new("shelf-story-new-folder")
                            .icon(IconName::Plus)
                            .label("New folder")
                            .ghost()
                            .small()
                            .on_click(cx.listener(|this, _, _window, cx| this.new_folder(cx))),
                    )
                    .child(
                        Button::new("shelf-story-theme")
                            .icon(IconName::Palette)
                            .label("Toggle theme")
                            .ghost()
                            .small()
                            .on_click(cx.listener(|this, _, window, cx| {
                                this.toggle_theme(window, cx);
                            })),
                    ),
            )
            .child(
                div()
                    .flex_1()
                    .min_h(px(0.))
                    .border_1()
                    .border_color(theme.border)
                    .rounded(theme.radius)
                    .child(shelf_view(&self.shelf)),
            )
    }
}
