mod agent;
mod app;
mod config;
mod event;
mod ids;
mod store;
mod theme;
mod view;
mod workspace;

use agent::gemini::GeminiProvider;
use agent::registry::{Capacity, SessionRegistry};
use agent::ChatProvider;
use app::WorkbenchApp;
use config::Config;
use eframe::egui;
use std::sync::{mpsc, Arc};
use theme::Theme;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(model = %config.model, api_base = %config.api_base, "starting workbench");
    if config.api_key.is_none() {
        tracing::warn!("no API key configured; agent replies will report a connection error");
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("workbench-runtime")
        .build()?;

    let provider: Arc<dyn ChatProvider> = Arc::new(GeminiProvider::new(&config)?);
    let registry = Arc::new(match config.max_sessions {
        Some(limit) => SessionRegistry::with_eviction(provider, Box::new(Capacity(limit))),
        None => SessionRegistry::new(provider),
    });
    let (tx, rx) = mpsc::channel();

    let theme = Theme::default();
    let app = WorkbenchApp::new(
        rx,
        tx,
        registry,
        runtime.handle().clone(),
        config.model.clone(),
        theme.clone(),
    );
    let _runtime = runtime;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Workbench")
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([1024.0, 640.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Workbench",
        native_options,
        Box::new(move |creation_context| {
            theme.apply_visuals(&creation_context.egui_ctx);
            Ok(Box::new(app))
        }),
    )?;

    Ok(())
}
