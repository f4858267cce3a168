use eframe::egui::{self, RichText, Ui};

use super::super::ViewModel;
use super::super::projection::{DetailPanel, account_detail};

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Account Details");
        ui.add_space(6.0);

        let Some(detail) = account_detail(self.selection.selected(), &self.accounts) else {
            ui.label("Click an account in the graph or the report to inspect it.");
            return;
        };

        match &detail {
            DetailPanel::Found(found) => {
                ui.label(RichText::new(found.account_id.as_str()).monospace().strong());
                ui.add_space(4.0);
                egui::Grid::new("account_detail")
                    .num_columns(2)
                    .spacing([18.0, 4.0])
                    .show(ui, |ui| {
                        ui.label("Suspicion score");
                        ui.label(RichText::new(found.score.as_str()).strong());
                        ui.end_row();
                        ui.label("Ring");
                        ui.monospace(found.ring.as_str());
                        ui.end_row();
                    });

                ui.add_space(6.0);
                ui.label(RichText::new("Detected patterns").strong());
                if found.patterns.is_empty() {
                    ui.label("none");
                }
                for pattern in &found.patterns {
                    ui.label(format!("- {pattern}"));
                }
            }
            DetailPanel::NotFound { account_id } => {
                ui.label(RichText::new(account_id.as_str()).monospace().strong());
                ui.add_space(4.0);
                ui.label("No suspicious-activity record for this account.");
            }
        }

        let account_id = match &detail {
            DetailPanel::Found(found) => found.account_id.as_str(),
            DetailPanel::NotFound { account_id } => account_id.as_str(),
        };
        if let Some(index) = self.model.index_of(account_id) {
            let node = &self.model.nodes()[index];
            let transfers = self.model.transfers_of(index);

            ui.separator();
            ui.label(RichText::new("In this graph").strong());
            ui.label(format!("Degree: {}", node.degree));
            ui.label(format!(
                "Received: {} transfers, {:.2}",
                transfers.incoming, transfers.received
            ));
            ui.label(format!(
                "Sent: {} transfers, {:.2}",
                transfers.outgoing, transfers.sent
            ));
        } else {
            ui.separator();
            ui.label("Not present in the current graph.");
        }

        ui.add_space(8.0);
        if ui.button("Clear selection").clicked() {
            self.selection.select(None);
        }
    }
}
