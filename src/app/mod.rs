use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context, Vec2};
use tracing::{info, warn};

use crate::analysis::{
    AnalysisResult, AnalysisSource, GraphModel, LoadedAnalysis, SuspiciousAccount, load_analysis,
};
use crate::config::Args;

mod graph;
mod physics;
mod projection;
mod render_utils;
mod selection;
mod ui;

pub(crate) use physics::SimulationConfig;

use graph::InteractionController;
use physics::Simulation;
use render_utils::ViewTransform;
use selection::SelectionState;

pub struct FraudGraphApp {
    args: Args,
    file_path: String,
    state: AppState,
    load_rx: Option<Receiver<Result<LoadedAnalysis, String>>>,
    status: Option<StatusLine>,
}

enum AppState {
    Empty,
    Ready(Box<ViewModel>),
}

#[derive(Clone, Debug, PartialEq)]
enum StatusLine {
    Info(String),
    Failure(String),
}

/// Replacing the result drops this as a unit, so no pin, hover or tick
/// outlives its graph.
struct ViewModel {
    model: GraphModel,
    result: AnalysisResult,
    transaction_count: usize,
    accounts: HashMap<String, SuspiciousAccount>,
    simulation: Simulation,
    selection: SelectionState,
    controller: InteractionController,
    transform: ViewTransform,
}

impl ViewModel {
    fn new(loaded: LoadedAnalysis, config: SimulationConfig) -> Self {
        let LoadedAnalysis {
            result,
            transactions,
            model,
        } = loaded;
        let accounts = result
            .suspicious_accounts
            .iter()
            .map(|account| (account.account_id.clone(), account.clone()))
            .collect();
        // Recentered on the canvas before the first painted tick.
        let simulation = Simulation::new(&model, Vec2::ZERO, config);

        Self {
            model,
            result,
            transaction_count: transactions.len(),
            accounts,
            simulation,
            selection: SelectionState::default(),
            controller: InteractionController::default(),
            transform: ViewTransform::default(),
        }
    }
}

impl FraudGraphApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, args: Args) -> Self {
        let startup = match (&args.csv, &args.input) {
            (Some(csv_path), _) => Some(upload_source(&args, csv_path.clone())),
            (None, Some(path)) => Some(AnalysisSource::SavedResponse { path: path.clone() }),
            (None, None) => None,
        };
        let file_path = args
            .csv
            .as_ref()
            .or(args.input.as_ref())
            .map(|path| path.display().to_string())
            .unwrap_or_default();

        let mut app = Self {
            args,
            file_path,
            state: AppState::Empty,
            load_rx: None,
            status: None,
        };
        if let Some(source) = startup {
            app.start_load(source);
        }
        app
    }

    fn spawn_load(source: AnalysisSource) -> Receiver<Result<LoadedAnalysis, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_analysis(&source).map_err(|error| {
                warn!(
                    source = %source.describe(),
                    status = ?error.http_status(),
                    %error,
                    "analysis load failed"
                );
                format!("Analysis Failed: {error}")
            });
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(&mut self, source: AnalysisSource) {
        info!(source = %source.describe(), "starting analysis load");
        self.status = None;
        self.load_rx = Some(Self::spawn_load(source));
    }

    fn is_loading(&self) -> bool {
        self.load_rx.is_some()
    }

    fn poll_load(&mut self) {
        let Some(rx) = self.load_rx.take() else {
            return;
        };

        match rx.try_recv() {
            Ok(Ok(loaded)) => {
                self.status = Some(StatusLine::Info(format!(
                    "Loaded {} accounts, {} transfers, {} flagged",
                    loaded.model.node_count(),
                    loaded.model.link_count(),
                    loaded.result.suspicious_accounts.len()
                )));
                let view = ViewModel::new(loaded, self.args.simulation_config());
                self.state = AppState::Ready(Box::new(view));
            }
            Ok(Err(message)) => {
                self.status = Some(StatusLine::Failure(message));
            }
            Err(TryRecvError::Empty) => {
                self.load_rx = Some(rx);
            }
            Err(TryRecvError::Disconnected) => {
                self.status = Some(StatusLine::Failure(
                    "Analysis Failed: background load worker disconnected".to_owned(),
                ));
            }
        }
    }
}

fn upload_source(args: &Args, csv_path: PathBuf) -> AnalysisSource {
    AnalysisSource::Upload {
        endpoint: args.endpoint.clone(),
        csv_path,
        timeout: args.timeout(),
    }
}

impl eframe::App for FraudGraphApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.poll_load();

        if let Some(request) = self.draw_top_bar(ctx) {
            self.apply_request(request);
        }

        match &mut self.state {
            AppState::Empty => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        if self.load_rx.is_some() {
                            ui.heading("Analyzing transactions...");
                            ui.add_space(8.0);
                            ui.spinner();
                        } else {
                            ui.heading("No analysis loaded");
                            ui.add_space(6.0);
                            ui.label("Enter a transaction CSV path and press Analyze, or open a saved result with Load JSON.");
                        }
                    });
                });
            }
            AppState::Ready(view) => {
                if let Some(status) = view.show(ctx, &self.args.export_dir) {
                    self.status = Some(status);
                }
            }
        }

        if self.is_loading() {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
    }
}
