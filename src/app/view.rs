use eframe::egui::{self, Align2, FontId, Pos2, Sense, Stroke, Ui, Vec2, vec2};

use crate::sites::{SiteRecord, sort_sites};

use super::ViewModel;
use super::camera::FRAME_ALPHA;
use super::interaction::Release;
use super::render_utils::{
    blend_color, circle_visible, draw_background, group_color, node_screen_radius,
    screen_to_world, world_to_screen,
};
use super::ring::build_ring;
use super::sim::Simulation;

/// Whether a node renders in the highlight color. Either source may request
/// it: the pointer hovering the node directly, or the externally driven
/// site-name / grouping keys from the list panel.
fn node_highlighted(
    site: &SiteRecord,
    directly_hovered: bool,
    hovered_site: Option<&str>,
    hovered_group: Option<&str>,
) -> bool {
    directly_hovered
        || hovered_site.is_some_and(|name| name == site.name)
        || hovered_group.is_some_and(|group| group == site.program)
}

impl ViewModel {
    /// Tear down the old engine and build a fresh layout from the current
    /// sort order. An in-flight drag dies with the old engine.
    pub(in crate::app) fn rebuild_layout(&mut self, surface: Vec2) {
        let mut sorted = self.sites.clone();
        sort_sites(&mut sorted, self.sort_key, self.sort_direction);

        let graph = build_ring(&sorted, surface);
        log::debug!(
            "rebuilt ring: {} nodes, {} edges, sorted by {} {}",
            graph.node_count(),
            graph.edge_count(),
            self.sort_key.label(),
            self.sort_direction.label(),
        );

        self.sorted_sites = sorted;
        self.drag.abandon();
        self.sim = Simulation::new(graph, self.params);
        self.camera.reset_framing();
        self.graph_dirty = false;
    }

    fn hovered_node(&self, rect: egui::Rect, pointer: Option<Pos2>) -> Option<usize> {
        let pointer = pointer?;
        if !rect.contains(pointer) {
            return None;
        }

        let radius = node_screen_radius(self.camera.zoom);
        self.sim
            .nodes()
            .iter()
            .enumerate()
            .filter_map(|(index, node)| {
                let position = world_to_screen(rect, self.camera.pan, self.camera.zoom, node.pos);
                let distance = position.distance(pointer);
                (distance <= radius).then_some((index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }

    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());

        if self.graph_dirty {
            self.rebuild_layout(rect.size());
        }

        let painter = ui.painter_at(rect);
        draw_background(&painter, rect, self.camera.pan, self.camera.zoom, &self.theme);

        if response.hovered() {
            let scroll = ui.input(|input| input.raw_scroll_delta.y);
            if scroll.abs() > f32::EPSILON {
                let pointer = ui
                    .input(|input| input.pointer.hover_pos())
                    .unwrap_or_else(|| rect.center());
                self.camera.zoom_at(rect, pointer, scroll);
            }
        }

        let pointer = ui.input(|input| input.pointer.interact_pos());
        let hovered = self.hovered_node(rect, ui.input(|input| input.pointer.hover_pos()));

        if ui.input(|input| input.pointer.primary_pressed())
            && response.hovered()
            && let Some(screen) = pointer
        {
            let world = screen_to_world(rect, self.camera.pan, self.camera.zoom, screen);
            self.drag.on_press(hovered, screen, world, &self.sim);
        }

        if let Some(screen) = pointer {
            let world = screen_to_world(rect, self.camera.pan, self.camera.zoom, screen);
            self.drag.on_move(screen, world, &mut self.sim);
        }

        if ui.input(|input| input.pointer.primary_released()) {
            match self.drag.on_release(&mut self.sim) {
                Release::Click { node } => {
                    if let Some(node) = self.sim.nodes().get(node) {
                        log::debug!("opening {}", node.site.url);
                        ui.ctx().open_url(egui::OpenUrl::new_tab(&node.site.url));
                    }
                }
                Release::DragEnd { .. } | Release::None => {}
            }
        }

        // The framing animation never fights the user: any gesture wins.
        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
            || (response.dragged_by(egui::PointerButton::Primary) && self.drag.is_idle())
        {
            let delta = response.drag_delta();
            if delta != Vec2::ZERO {
                self.camera.pan_by(delta);
            }
        }

        let stepped = self.sim.step();
        let frame_delta_seconds = ui
            .ctx()
            .input(|input| input.stable_dt)
            .clamp(1.0 / 240.0, 1.0 / 20.0);
        self.camera.advance(frame_delta_seconds);

        if stepped || self.camera.is_animating() || self.drag.dragging().is_some() {
            ui.ctx().request_repaint();
        }

        let pan = self.camera.pan;
        let zoom = self.camera.zoom;
        let radius = node_screen_radius(zoom);
        let edge_stroke = Stroke::new((1.3 * zoom.sqrt()).clamp(0.6, 3.0), self.theme.edge);

        for &(from, to) in self.sim.edges() {
            let start = world_to_screen(rect, pan, zoom, self.sim.nodes()[from].pos);
            let end = world_to_screen(rect, pan, zoom, self.sim.nodes()[to].pos);
            painter.line_segment([start, end], edge_stroke);
        }

        let show_all_labels = zoom > 0.85 || self.sim.node_count() <= 24;
        let mut highlight_animating = false;

        for (index, node) in self.sim.nodes().iter().enumerate() {
            let position = world_to_screen(rect, pan, zoom, node.pos);
            if !circle_visible(rect, position, radius) {
                continue;
            }

            let highlighted = node_highlighted(
                &node.site,
                hovered == Some(index),
                self.hovered_site.as_deref(),
                self.hovered_group.as_deref(),
            );
            let highlight_mix = ui.ctx().animate_bool(
                ui.make_persistent_id(("site-highlight", node.site.name.as_str())),
                highlighted,
            );
            if highlight_mix > 0.0 && highlight_mix < 1.0 {
                highlight_animating = true;
            }

            let color = blend_color(group_color(&node.site.program), self.theme.accent, highlight_mix);
            painter.circle_filled(position, radius, color);
            painter.circle_stroke(
                position,
                radius,
                Stroke::new(1.0 + (highlight_mix * 0.8), self.theme.outline),
            );

            if highlighted || show_all_labels {
                painter.text(
                    position - vec2(0.0, radius + 5.0),
                    Align2::CENTER_BOTTOM,
                    &node.site.name,
                    FontId::proportional(12.0),
                    self.theme.label,
                );
            }
        }

        if highlight_animating {
            ui.ctx().request_repaint();
        }

        if hovered.is_some() {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });
        }

        if let Some(node) = hovered.and_then(|index| self.sim.nodes().get(index)) {
            let info = format!(
                "{}  |  {}  |  {} {}",
                node.site.name,
                crate::util::host_name(&node.site.url),
                node.site.program,
                node.site.year,
            );
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                info,
                FontId::proportional(13.0),
                self.theme.label,
            );
        }

        // Convergence check, once per draw: the first pass below the frame
        // threshold arms the one-shot framing.
        if self.sim.has_run()
            && self.sim.alpha() < FRAME_ALPHA
            && self.camera.request_frame_to_fit(self.sim.node_count())
        {
            ui.ctx().request_repaint();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sites::{SortDirection, SortKey};

    fn sites() -> Vec<SiteRecord> {
        [
            ("Aster", "garden", 2019),
            ("Briar", "garden", 2021),
            ("Cedar", "forest", 2020),
            ("Dune", "coast", 2022),
        ]
        .into_iter()
        .map(|(name, program, year)| SiteRecord {
            name: name.to_owned(),
            url: format!("https://{}.example", name.to_lowercase()),
            program: program.to_owned(),
            year,
        })
        .collect()
    }

    const SURFACE: Vec2 = vec2(1280.0, 800.0);

    #[test]
    fn either_highlight_source_wins() {
        let all = sites();
        let site = &all[0];

        assert!(node_highlighted(site, true, None, None));
        assert!(node_highlighted(site, false, Some("Aster"), None));
        assert!(node_highlighted(site, false, None, Some("garden")));
        assert!(!node_highlighted(site, false, Some("Briar"), Some("forest")));
        assert!(!node_highlighted(site, false, None, None));
    }

    #[test]
    fn group_highlight_covers_every_member() {
        let all = sites();
        let highlighted = all
            .iter()
            .filter(|site| node_highlighted(site, false, None, Some("garden")))
            .count();
        assert_eq!(highlighted, 2);
    }

    #[test]
    fn resorting_rebuilds_an_isomorphic_ring() {
        let mut model = ViewModel::new(sites(), SortKey::Name, SortDirection::Ascending);
        model.rebuild_layout(SURFACE);
        let by_name = model.sim.edges().to_vec();

        model.sort_key = SortKey::Year;
        model.rebuild_layout(SURFACE);
        let by_year = model.sim.edges().to_vec();

        // Same cycle shape, different adjacency.
        assert_eq!(by_name.len(), by_year.len());
        let mut degrees = vec![0usize; model.sim.node_count()];
        for &(a, b) in &by_year {
            degrees[a] += 1;
            degrees[b] += 1;
        }
        assert!(degrees.iter().all(|&d| d == 2));
        assert_eq!(model.sorted_sites[0].name, "Aster"); // 2019 first
    }

    #[test]
    fn rebuild_discards_an_active_drag_with_the_old_engine() {
        let mut model = ViewModel::new(sites(), SortKey::Name, SortDirection::Ascending);
        model.rebuild_layout(SURFACE);

        model.drag.on_press(
            Some(0),
            eframe::egui::pos2(0.0, 0.0),
            Vec2::ZERO,
            &model.sim,
        );
        model
            .drag
            .on_move(eframe::egui::pos2(50.0, 0.0), vec2(50.0, 0.0), &mut model.sim);
        assert_eq!(model.drag.dragging(), Some(0));

        model.rebuild_layout(SURFACE);
        assert!(model.drag.is_idle());
        assert!(model.sim.nodes().iter().all(|node| !node.is_pinned()));
    }

    #[test]
    fn empty_ring_never_starts_the_engine() {
        let mut model = ViewModel::new(Vec::new(), SortKey::Name, SortDirection::Ascending);
        model.rebuild_layout(SURFACE);

        assert_eq!(model.sim.node_count(), 0);
        assert!(!model.sim.step());
        assert!(!model.sim.has_run());
    }
}
