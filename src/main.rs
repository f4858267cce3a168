mod analysis;
mod app;
mod config;
mod util;

use clap::Parser;

use crate::config::Args;

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "LaundroGraph",
        options,
        Box::new(move |cc| Ok(Box::new(app::FraudGraphApp::new(cc, args)))),
    )
}
