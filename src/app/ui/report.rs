use std::path::Path;

use eframe::egui::{self, Color32, RichText, Ui};
use tracing::{info, warn};

use crate::analysis::{EXPORT_FILE_NAME, export_result};
use crate::util::format_score;

use super::super::{StatusLine, ViewModel};

const RISK_COLOR: Color32 = Color32::from_rgb(248, 113, 113);
const PATTERN_COLOR: Color32 = Color32::from_rgb(96, 165, 250);

impl ViewModel {
    pub(in crate::app) fn draw_report(&mut self, ui: &mut Ui, export_dir: &Path) -> Option<StatusLine> {
        let mut status = None;

        ui.heading("Analysis Report");
        ui.add_space(6.0);

        let summary = &self.result.summary;
        egui::Grid::new("report_summary")
            .num_columns(2)
            .spacing([24.0, 4.0])
            .show(ui, |ui| {
                ui.label("Accounts analyzed");
                ui.label(RichText::new(summary.total_accounts_analyzed.to_string()).strong());
                ui.end_row();
                ui.label("Suspicious accounts");
                ui.label(RichText::new(summary.suspicious_accounts_flagged.to_string()).strong());
                ui.end_row();
                ui.label("Fraud rings");
                ui.label(RichText::new(summary.fraud_rings_detected.to_string()).strong());
                ui.end_row();
                ui.label("Transactions");
                ui.label(self.transaction_count.to_string());
                ui.end_row();
                ui.label("Processing time");
                ui.label(format!("{:.3} s", summary.processing_time_seconds));
                ui.end_row();
            });

        ui.add_space(6.0);
        let export = ui
            .button("Export JSON")
            .on_hover_text(format!("Writes {EXPORT_FILE_NAME} into {}", export_dir.display()));
        if export.clicked() {
            status = Some(match export_result(export_dir, &self.result) {
                Ok(path) => {
                    info!(path = %path.display(), "exported analysis result");
                    StatusLine::Info(format!("Exported {}", path.display()))
                }
                Err(error) => {
                    warn!("export failed: {error:#}");
                    StatusLine::Failure(format!("Export failed: {error:#}"))
                }
            });
        }

        ui.separator();

        egui::ScrollArea::vertical()
            .id_salt("report_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                if !self.result.fraud_rings.is_empty() {
                    ui.label(RichText::new("Detected Fraud Rings").strong());
                    egui::Grid::new("fraud_rings")
                        .num_columns(4)
                        .striped(true)
                        .show(ui, |ui| {
                            ui.small("RING ID");
                            ui.small("TYPE");
                            ui.small("MEMBERS");
                            ui.small("RISK");
                            ui.end_row();

                            for ring in &self.result.fraud_rings {
                                ui.monospace(ring.ring_id.as_str());
                                ui.label(ring.pattern_type.as_str());
                                ui.label(ring.member_accounts.join(", "));
                                ui.colored_label(RISK_COLOR, format_score(ring.risk_score));
                                ui.end_row();
                            }
                        });
                    ui.add_space(10.0);
                }

                ui.label(RichText::new("Suspicious Accounts").strong());
                if self.result.suspicious_accounts.is_empty() {
                    ui.label("No accounts were flagged.");
                    return;
                }

                egui::Grid::new("suspicious_accounts")
                    .num_columns(3)
                    .striped(true)
                    .show(ui, |ui| {
                        ui.small("ACCOUNT ID");
                        ui.small("SCORE");
                        ui.small("PATTERNS");
                        ui.end_row();

                        for account in &self.result.suspicious_accounts {
                            let is_selected = self.selection.selected() == Some(account.account_id.as_str());
                            let label = RichText::new(account.account_id.as_str()).monospace();
                            if ui.selectable_label(is_selected, label).clicked() {
                                self.selection.select(Some(account.account_id.clone()));
                            }

                            let fraction = (account.suspicion_score / 100.0).clamp(0.0, 1.0) as f32;
                            ui.add(
                                egui::ProgressBar::new(fraction)
                                    .desired_width(90.0)
                                    .fill(RISK_COLOR)
                                    .text(format!("{:.0}", account.suspicion_score)),
                            );

                            ui.horizontal_wrapped(|ui| {
                                for pattern in &account.detected_patterns {
                                    ui.colored_label(PATTERN_COLOR, pattern.as_str());
                                }
                            });
                            ui.end_row();
                        }
                    });
            });

        status
    }
}
