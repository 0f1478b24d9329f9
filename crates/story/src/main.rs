use std::rc::Rc;

use gpui::*;
use gpui_component::{Root, Theme, ThemeMode};
use gpui_shelf_core::MemoryShelf;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt as _, util::SubscriberInitExt as _};

use crate::config::ShelfConfig;
use crate::shelf_story::ShelfStory;

mod config;
mod demo;
mod shelf_story;

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gpui_shelf_story=info,gpui_shelf_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn load_store(config: &ShelfConfig) -> MemoryShelf {
    match config.load_seed() {
        Ok(Some(store)) => store,
        Ok(None) => MemoryShelf::new(demo::demo_snapshot()),
        Err(err) => {
            warn!("{err:#}, falling back to the demo shelf");
            MemoryShelf::new(demo::demo_snapshot())
        }
    }
}

fn main() {
    init_tracing();

    let config = ShelfConfig::load().unwrap_or_else(|err| {
        warn!("{err:#}, using default settings");
        ShelfConfig::default()
    });
    info!(?config, "starting shelf story");

    let app = Application::new();

    app.run(move |cx| {
        gpui_component::init(cx);
        if config.dark {
            Theme::change(ThemeMode::Dark, None, cx);
        }
        cx.activate(true);

        let store = Rc::new(load_store(&config));

        cx.spawn(async move |cx| {
            cx.open_window(
                WindowOptions {
                    titlebar: Some(TitlebarOptions {
                        title: Some("Shelf".into()),
                        appears_transparent: false,
                        traffic_light_position: None,
                    }),
                    ..Default::default()
                },
                |window, cx| {
                    let view = ShelfStory::view(store, &config, window, cx);
                    cx.new(|cx| Root::new(view, window, cx))
                },
            )?;

            Ok::<_, anyhow::Error>(())
        })
        .detach();
    });
}
