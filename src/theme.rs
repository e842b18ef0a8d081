use eframe::egui::{self, Color32, Context, Rounding};

use crate::role::RoleTheme;

#[derive(Debug, Clone, PartialEq)]
pub struct ThemeConfig {
    pub name: String,
    pub surface: String,
    pub panel: String,
    pub text: String,
    pub muted_text: String,
    pub accent: String,
    pub accent_soft: String,
    pub border: String,
    pub radius: f32,
    pub shadow: f32,
    pub font_size_base: f32,
}

impl ThemeConfig {
    /// Swaps the accent for a role's brand colors.
    pub fn branded(&self, brand: RoleTheme) -> ThemeConfig {
        let mut themed = self.clone();
        themed.accent = brand.brand.to_string();
        if !is_dark(self) {
            themed.accent_soft = brand.brand_soft.to_string();
        }
        themed
    }
}

/// Looks up a preset by name, falling back to `classic_light`.
pub fn preset(name: &str) -> ThemeConfig {
    let presets = default_presets();
    presets
        .iter()
        .find(|t| t.name == name)
        .or_else(|| presets.iter().find(|t| t.name == "classic_light"))
        .cloned()
        .unwrap_or_else(|| presets[0].clone())
}

pub fn preset_names() -> Vec<String> {
    default_presets().into_iter().map(|t| t.name).collect()
}

pub fn apply_theme(theme: &ThemeConfig, ctx: &Context) {
    let mut style = (*ctx.style()).clone();
    let mut visuals = if is_dark(theme) {
        egui::Visuals::dark()
    } else {
        egui::Visuals::light()
    };

    visuals.panel_fill = parse_color(&theme.panel);
    visuals.widgets.noninteractive.bg_fill = parse_color(&theme.surface);
    visuals.widgets.noninteractive.fg_stroke.color = parse_color(&theme.text);
    visuals.widgets.inactive.bg_fill = parse_color(&theme.surface);
    visuals.widgets.inactive.fg_stroke.color = parse_color(&theme.text);
    visuals.widgets.inactive.bg_stroke.color = parse_color(&theme.border);

    visuals.widgets.hovered.bg_fill = parse_color(&theme.accent_soft);
    visuals.widgets.hovered.bg_stroke.color = parse_color(&theme.accent);
    visuals.widgets.hovered.fg_stroke.color = parse_color(&theme.text);

    visuals.widgets.active.bg_fill = parse_color(&theme.accent_soft);
    visuals.widgets.active.bg_stroke.color = parse_color(&theme.accent);
    visuals.widgets.active.fg_stroke.color = parse_color(&theme.text);

    visuals.window_rounding = Rounding::same(theme.radius);
    visuals.widgets.noninteractive.rounding = Rounding::same(theme.radius);
    visuals.widgets.inactive.rounding = Rounding::same(theme.radius);
    visuals.widgets.hovered.rounding = Rounding::same(theme.radius);
    visuals.widgets.active.rounding = Rounding::same(theme.radius);

    visuals.window_shadow = egui::epaint::Shadow {
        offset: egui::vec2(0.0, 6.0),
        blur: theme.shadow,
        spread: 0.0,
        color: Color32::from_black_alpha(40),
    };
    visuals.popup_shadow = visuals.window_shadow;

    style.text_styles = [
        (
            egui::TextStyle::Small,
            egui::FontId::proportional(theme.font_size_base - 2.0),
        ),
        (
            egui::TextStyle::Body,
            egui::FontId::proportional(theme.font_size_base),
        ),
        (
            egui::TextStyle::Button,
            egui::FontId::proportional(theme.font_size_base),
        ),
        (
            egui::TextStyle::Heading,
            egui::FontId::proportional(theme.font_size_base + 6.0),
        ),
        (
            egui::TextStyle::Monospace,
            egui::FontId::monospace(theme.font_size_base - 1.0),
        ),
    ]
    .into();
    style.visuals = visuals;
    ctx.set_style(style);
}

fn is_dark(theme: &ThemeConfig) -> bool {
    let bg = parse_color(&theme.panel);
    // Simple luminance check; lower means darker.
    let luminance = 0.2126 * (bg.r() as f32) + 0.7152 * (bg.g() as f32) + 0.0722 * (bg.b() as f32);
    luminance < 128.0
}

pub fn parse_color(hex: &str) -> Color32 {
    let h = hex.trim_start_matches('#');
    if h.len() == 6 {
        if let Ok(rgb) = u32::from_str_radix(h, 16) {
            let r = ((rgb >> 16) & 0xFF) as u8;
            let g = ((rgb >> 8) & 0xFF) as u8;
            let b = (rgb & 0xFF) as u8;
            return Color32::from_rgb(r, g, b);
        }
    } else if h.len() == 8 {
        if let Ok(rgba) = u32::from_str_radix(h, 16) {
            let r = ((rgba >> 24) & 0xFF) as u8;
            let g = ((rgba >> 16) & 0xFF) as u8;
            let b = ((rgba >> 8) & 0xFF) as u8;
            let a = (rgba & 0xFF) as u8;
            return Color32::from_rgba_premultiplied(r, g, b, a);
        }
    }
    Color32::LIGHT_GRAY
}

pub fn default_presets() -> Vec<ThemeConfig> {
    vec![
        ThemeConfig {
            name: "classic_light".to_string(),
            surface: "#f5f6fa".to_string(),
            panel: "#ffffff".to_string(),
            text: "#1f2933".to_string(),
            muted_text: "#637588".to_string(),
            accent: "#2b78e4".to_string(),
            accent_soft: "#dfe9ff".to_string(),
            border: "#d0d5dc".to_string(),
            radius: 6.0,
            shadow: 8.0,
            font_size_base: 16.0,
        },
        ThemeConfig {
            name: "chalkboard_dark".to_string(),
            surface: "#1f2a33".to_string(),
            panel: "#15202b".to_string(),
            text: "#e5f0ff".to_string(),
            muted_text: "#9bb2c7".to_string(),
            accent: "#4caf50".to_string(),
            accent_soft: "#23402a".to_string(),
            border: "#2e3c48".to_string(),
            radius: 6.0,
            shadow: 10.0,
            font_size_base: 16.0,
        },
        ThemeConfig {
            name: "high_contrast".to_string(),
            surface: "#000000".to_string(),
            panel: "#0d0d0d".to_string(),
            text: "#ffffff".to_string(),
            muted_text: "#c7c7c7".to_string(),
            accent: "#ffcc00".to_string(),
            accent_soft: "#4d3b00".to_string(),
            border: "#ffffff".to_string(),
            radius: 0.0,
            shadow: 4.0,
            font_size_base: 18.0,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::role::Role;

    #[test]
    fn unknown_preset_falls_back_to_classic_light() {
        assert_eq!(preset("neon").name, "classic_light");
        assert_eq!(preset("chalkboard_dark").name, "chalkboard_dark");
        assert_eq!(preset_names().len(), 3);
    }

    #[test]
    fn parse_color_handles_rgb_rgba_and_garbage() {
        assert_eq!(parse_color("#2b78e4"), Color32::from_rgb(0x2b, 0x78, 0xe4));
        assert_eq!(
            parse_color("#ffffff80"),
            Color32::from_rgba_premultiplied(0xff, 0xff, 0xff, 0x80)
        );
        assert_eq!(parse_color("blue"), Color32::LIGHT_GRAY);
    }

    #[test]
    fn branding_keeps_dark_soft_accent() {
        let light = preset("classic_light").branded(Role::Parent.theme());
        assert_eq!(light.accent, Role::Parent.theme().brand);
        assert_eq!(light.accent_soft, Role::Parent.theme().brand_soft);

        let dark = preset("chalkboard_dark");
        let branded = dark.branded(Role::Parent.theme());
        assert_eq!(branded.accent, Role::Parent.theme().brand);
        assert_eq!(branded.accent_soft, dark.accent_soft);
    }
}
