mod app;
mod classify;
mod event;
mod gateway;
mod model;
mod render;
mod session;
mod theme;

use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::Arc;

use clap::Parser;
use eframe::egui;
use tracing_subscriber::EnvFilter;

use app::ChatApp;
use gateway::{ChatGateway, HttpGateway, MockGateway};
use session::{SessionController, SessionHandle};
use theme::Theme;

/// Desktop chat client with artifact rendering.
#[derive(Debug, Parser)]
#[command(name = "colloquy", version, about)]
struct Args {
    /// Base URL of the chat backend.
    #[arg(long, env = "COLLOQUY_BASE_URL", default_value = "http://127.0.0.1:8000")]
    base_url: String,

    /// Conversation to open on startup. Falls back to creating a new one
    /// when the id does not exist.
    #[arg(long)]
    conversation: Option<String>,

    /// Run against the built-in simulated backend instead of HTTP.
    #[arg(long)]
    mock: bool,

    /// Directory for saved artifacts. Defaults to the user downloads folder.
    #[arg(long)]
    downloads: Option<PathBuf>,
}

fn downloads_dir(arg: Option<PathBuf>) -> PathBuf {
    arg.or_else(dirs::download_dir)
        .unwrap_or_else(std::env::temp_dir)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    let downloads = downloads_dir(args.downloads);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("colloquy-runtime")
        .build()?;

    let gateway: Arc<dyn ChatGateway> = if args.mock {
        Arc::new(MockGateway::new())
    } else {
        Arc::new(HttpGateway::new(args.base_url))
    };

    let (tx, rx) = mpsc::channel();
    let controller = SessionController::new(gateway, args.conversation);
    let runtime_handle = runtime.handle().clone();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 760.0])
            .with_min_inner_size([820.0, 560.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Colloquy",
        native_options,
        Box::new(move |cc| {
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Theme::default().apply_visuals(&cc.egui_ctx);
            let session =
                SessionHandle::new(controller, tx, runtime_handle, cc.egui_ctx.clone());
            session.initialize();
            Ok(Box::new(ChatApp::new(rx, session, downloads)))
        }),
    )
    .map_err(|err| anyhow::anyhow!("ui loop failed: {err}"))?;

    drop(runtime);
    Ok(())
}
