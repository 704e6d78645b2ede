use std::collections::BTreeMap;

use eframe::egui::{self, Slider, Ui};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::sites::{SortDirection, SortKey};
use crate::util::host_name;

use super::super::ViewModel;

fn fuzzy_match(matcher: &SkimMatcherV2, text: &str, query: &str) -> bool {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
        .is_some()
}

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Ring Controls");
        ui.separator();
        ui.add_space(4.0);

        let mut sort_changed = false;
        ui.horizontal(|ui| {
            ui.label("Sort by");
            egui::ComboBox::from_id_salt("sort_key")
                .selected_text(self.sort_key.label())
                .show_ui(ui, |ui| {
                    for key in [SortKey::Name, SortKey::Program, SortKey::Year] {
                        sort_changed |= ui
                            .selectable_value(&mut self.sort_key, key, key.label())
                            .changed();
                    }
                });
        });
        ui.horizontal(|ui| {
            for direction in [SortDirection::Ascending, SortDirection::Descending] {
                sort_changed |= ui
                    .selectable_value(&mut self.sort_direction, direction, direction.label())
                    .changed();
            }
        });
        if sort_changed {
            self.graph_dirty = true;
        }

        ui.add_space(8.0);
        ui.collapsing("Forces", |ui| {
            ui.add(Slider::new(&mut self.params.link_distance, 40.0..=300.0).text("link distance"));
            ui.add(Slider::new(&mut self.params.link_strength, 0.01..=0.5).text("link strength"));
            ui.add(
                Slider::new(&mut self.params.charge_strength, 0.0..=120_000.0).text("repulsion"),
            );
            ui.add(
                Slider::new(&mut self.params.charge_max_distance, 100.0..=1500.0)
                    .text("repulsion range"),
            );
            ui.add(
                Slider::new(&mut self.params.collision_radius, 4.0..=40.0).text("collision radius"),
            );
            ui.add(
                Slider::new(&mut self.params.center_strength, 0.0..=0.1).text("centering"),
            );
            ui.add_space(4.0);
            ui.label("Parameters apply to the next layout.");
            if ui.button("Restart layout").clicked() {
                self.graph_dirty = true;
            }
        });

        ui.add_space(8.0);
        ui.separator();
        ui.label("Programs");
        let mut program_counts: BTreeMap<&str, usize> = BTreeMap::new();
        for site in &self.sorted_sites {
            *program_counts.entry(site.program.as_str()).or_insert(0) += 1;
        }
        let programs = program_counts
            .into_iter()
            .map(|(program, count)| (program.to_owned(), count))
            .collect::<Vec<_>>();
        for (program, count) in programs {
            let row = ui.selectable_label(false, format!("{program} ({count})"));
            if row.hovered() {
                self.hovered_group = Some(program);
            }
        }

        ui.add_space(8.0);
        ui.separator();
        ui.horizontal(|ui| {
            ui.label("Search");
            ui.text_edit_singleline(&mut self.search);
        });

        let query = self.search.trim().to_owned();
        let matcher = SkimMatcherV2::default();
        let rows = self
            .sorted_sites
            .iter()
            .filter(|site| query.is_empty() || fuzzy_match(&matcher, &site.name, &query))
            .map(|site| {
                (
                    site.name.clone(),
                    site.url.clone(),
                    format!("{}  ({} {})", site.name, site.program, site.year),
                )
            })
            .collect::<Vec<_>>();

        egui::ScrollArea::vertical().show(ui, |ui| {
            for (name, url, label) in rows {
                let row = ui.selectable_label(false, label);
                if row.hovered() {
                    self.hovered_site = Some(name);
                }
                if row.clicked() {
                    log::debug!("opening {url} from the site list");
                    ui.ctx().open_url(egui::OpenUrl::new_tab(&url));
                }
                row.on_hover_text(host_name(&url));
            }
        });
    }
}
