use std::path::Path;

use eframe::egui::{self, Align, Context, Layout};

use crate::sites::{SiteRecord, SortDirection, SortKey};

use super::super::ViewModel;
use super::super::camera::Camera;
use super::super::interaction::DragController;
use super::super::render_utils::Theme;
use super::super::ring::RingGraph;
use super::super::sim::{SimParams, Simulation};

impl ViewModel {
    pub(in crate::app) fn new(
        sites: Vec<SiteRecord>,
        sort_key: SortKey,
        sort_direction: SortDirection,
    ) -> Self {
        let params = SimParams::default();
        Self {
            sites,
            sorted_sites: Vec::new(),
            sort_key,
            sort_direction,
            search: String::new(),
            params,
            sim: Simulation::new(RingGraph::default(), params),
            camera: Camera::new(),
            drag: DragController::new(),
            theme: Theme::default(),
            hovered_site: None,
            hovered_group: None,
            graph_dirty: true,
        }
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        sites_path: &Path,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        // External highlight keys live for one frame; the list panel below
        // re-asserts them while a row is hovered.
        self.hovered_site = None;
        self.hovered_group = None;

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("webring-atlas");
                    ui.separator();
                    ui.label(format!("sites: {}", sites_path.display()));
                    ui.label(format!("nodes: {}", self.sim.node_count()));
                    ui.label(format!("edges: {}", self.sim.edges().len()));
                    let reload_button =
                        ui.add_enabled(!is_loading, egui::Button::new("Reload sites"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(format!(
                            "{}  alpha {:.3}",
                            self.sim.phase().label(),
                            self.sim.alpha()
                        ));
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            if is_loading {
                ui.vertical_centered(|ui| {
                    ui.add_space(120.0);
                    ui.heading("Reloading web ring...");
                    ui.add_space(8.0);
                    ui.spinner();
                });
            } else {
                self.draw_graph(ui);
            }
        });
    }
}
