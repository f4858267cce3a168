use std::path::{Path, PathBuf};

use eframe::egui::{self, Align, Color32, Context, Layout};

use crate::analysis::AnalysisSource;

use super::super::{AppState, FraudGraphApp, StatusLine, ViewModel, upload_source};

const FAILURE_COLOR: Color32 = Color32::from_rgb(248, 113, 113);

#[derive(Clone, Debug, PartialEq)]
pub(in crate::app) enum TopBarRequest {
    Analyze(PathBuf),
    OpenSaved(PathBuf),
    ResetView,
}

fn dropped_file_request(path: &Path) -> Option<TopBarRequest> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "csv" => Some(TopBarRequest::Analyze(path.to_path_buf())),
        "json" => Some(TopBarRequest::OpenSaved(path.to_path_buf())),
        _ => None,
    }
}

impl FraudGraphApp {
    pub(in crate::app) fn draw_top_bar(&mut self, ctx: &Context) -> Option<TopBarRequest> {
        let is_loading = self.is_loading();
        let mut request = None;

        if !is_loading {
            request = ctx.input(|input| {
                input
                    .raw
                    .dropped_files
                    .iter()
                    .filter_map(|file| file.path.as_deref())
                    .find_map(dropped_file_request)
            });
        }

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("LaundroGraph");
                    ui.separator();
                    ui.label("File:");
                    ui.add(
                        egui::TextEdit::singleline(&mut self.file_path)
                            .hint_text("transactions.csv or analysis.json")
                            .desired_width(320.0),
                    );

                    let path = self.file_path.trim();
                    let has_path = !path.is_empty();
                    if ui
                        .add_enabled(!is_loading && has_path, egui::Button::new("Analyze"))
                        .clicked()
                    {
                        request = Some(TopBarRequest::Analyze(PathBuf::from(path)));
                    }
                    if ui
                        .add_enabled(!is_loading && has_path, egui::Button::new("Load JSON"))
                        .clicked()
                    {
                        request = Some(TopBarRequest::OpenSaved(PathBuf::from(path)));
                    }

                    let ready = matches!(self.state, AppState::Ready(_));
                    if ui.add_enabled(ready, egui::Button::new("Reset view")).clicked() {
                        request = Some(TopBarRequest::ResetView);
                    }

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if is_loading {
                            ui.spinner();
                            ui.label("Analyzing transaction graph...");
                        }
                        if let AppState::Ready(view) = &self.state {
                            ui.label(view.graph_counts_text());
                        }
                        match &self.status {
                            Some(StatusLine::Failure(message)) => {
                                ui.colored_label(FAILURE_COLOR, message.as_str());
                            }
                            Some(StatusLine::Info(message)) => {
                                ui.label(message.as_str());
                            }
                            None => {}
                        }
                    });
                });
            });

        request
    }

    pub(in crate::app) fn apply_request(&mut self, request: TopBarRequest) {
        match request {
            TopBarRequest::Analyze(csv_path) => {
                self.file_path = csv_path.display().to_string();
                let source = upload_source(&self.args, csv_path);
                self.start_load(source);
            }
            TopBarRequest::OpenSaved(path) => {
                self.file_path = path.display().to_string();
                self.start_load(AnalysisSource::SavedResponse { path });
            }
            TopBarRequest::ResetView => {
                if let AppState::Ready(view) = &mut self.state {
                    view.transform.reset();
                }
            }
        }
    }
}

impl ViewModel {
    pub(in crate::app) fn show(&mut self, ctx: &Context, export_dir: &Path) -> Option<StatusLine> {
        let mut status = None;

        egui::SidePanel::left("report")
            .resizable(true)
            .default_width(380.0)
            .show(ctx, |ui| status = self.draw_report(ui, export_dir));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default().show(ctx, |ui| self.draw_graph(ui));

        status
    }

    fn graph_counts_text(&self) -> String {
        format!(
            "accounts: {}  |  transfers: {}  |  flagged: {}",
            self.model.node_count(),
            self.model.link_count(),
            self.model.suspicious_count()
        )
    }
}
