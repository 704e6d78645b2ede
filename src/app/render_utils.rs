use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2};

/// Background / foreground / accent color set for the rendered scene.
/// Resolved by the host; the core only reads it.
pub(super) struct Theme {
    pub background: Color32,
    pub grid: Color32,
    pub edge: Color32,
    pub label: Color32,
    pub accent: Color32,
    pub outline: Color32,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Color32::from_rgb(19, 23, 29),
            grid: Color32::from_rgba_unmultiplied(60, 70, 80, 70),
            edge: Color32::from_rgba_unmultiplied(110, 118, 130, 190),
            label: Color32::from_gray(238),
            accent: Color32::from_rgb(255, 164, 101),
            outline: Color32::from_rgba_unmultiplied(15, 15, 15, 190),
        }
    }
}

pub(super) fn world_to_screen(rect: Rect, pan: Vec2, zoom: f32, world: Vec2) -> Pos2 {
    rect.center() + pan + world * zoom
}

pub(super) fn screen_to_world(rect: Rect, pan: Vec2, zoom: f32, screen: Pos2) -> Vec2 {
    (screen - rect.center() - pan) / zoom
}

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, pan: Vec2, zoom: f32, theme: &Theme) {
    painter.rect_filled(rect, 0.0, theme.background);

    let step = (56.0 * zoom.clamp(0.6, 1.8)).max(20.0);
    let origin = rect.center() + pan;

    let mut x = origin.x.rem_euclid(step);
    while x < rect.right() {
        painter.line_segment(
            [Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())],
            Stroke::new(1.0, theme.grid),
        );
        x += step;
    }

    let mut y = origin.y.rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment(
            [Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)],
            Stroke::new(1.0, theme.grid),
        );
        y += step;
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

pub(super) fn node_screen_radius(zoom: f32) -> f32 {
    (14.0 * zoom.powf(0.40)).clamp(3.0, 40.0)
}

fn hue_to_channel(p: f32, q: f32, mut t: f32) -> f32 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

fn hsl_color(hue: f32, saturation: f32, lightness: f32) -> Color32 {
    let q = if lightness < 0.5 {
        lightness * (1.0 + saturation)
    } else {
        lightness + saturation - lightness * saturation
    };
    let p = 2.0 * lightness - q;

    Color32::from_rgb(
        (hue_to_channel(p, q, hue + 1.0 / 3.0) * 255.0) as u8,
        (hue_to_channel(p, q, hue) * 255.0) as u8,
        (hue_to_channel(p, q, hue - 1.0 / 3.0) * 255.0) as u8,
    )
}

/// Stable per-group node color: the grouping key hashes to a hue so every
/// site in a program shares a color across rebuilds.
pub(super) fn group_color(group: &str) -> Color32 {
    let mut hasher = DefaultHasher::new();
    group.hash(&mut hasher);
    let hue = (hasher.finish() % 360) as f32 / 360.0;
    hsl_color(hue, 0.52, 0.62)
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::{pos2, vec2};

    #[test]
    fn screen_world_transforms_round_trip() {
        let rect = Rect::from_min_size(pos2(0.0, 0.0), vec2(800.0, 600.0));
        let pan = vec2(37.0, -12.0);
        let zoom = 1.4;

        let world = vec2(123.0, -456.0);
        let back = screen_to_world(rect, pan, zoom, world_to_screen(rect, pan, zoom, world));
        assert!((back - world).length() < 0.001);
    }

    #[test]
    fn blend_endpoints_return_the_inputs() {
        let a = Color32::from_rgb(10, 20, 30);
        let b = Color32::from_rgb(200, 100, 50);
        assert_eq!(blend_color(a, b, 0.0), a);
        assert_eq!(blend_color(a, b, 1.0), b);
    }

    #[test]
    fn group_color_is_stable_per_group() {
        assert_eq!(group_color("spring"), group_color("spring"));
        assert_ne!(group_color("spring"), group_color("winter"));
    }
}
