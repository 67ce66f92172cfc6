use eframe::egui::{self, Color32, CornerRadius, FontId, Frame, Margin, Stroke, TextStyle};

/// VS Code "Dark+" inspired palette.
#[derive(Debug, Clone)]
pub struct Theme {
    pub editor_bg: Color32,
    pub sidebar_bg: Color32,
    pub header_bg: Color32,
    pub activity_bar_bg: Color32,
    pub input_bg: Color32,
    pub list_hover: Color32,
    pub list_active: Color32,
    pub border: Color32,
    pub accent: Color32,
    pub button_bg: Color32,
    pub workspace_button_bg: Color32,
    pub success: Color32,
    pub danger: Color32,
    pub running: Color32,
    pub text_primary: Color32,
    pub text_muted: Color32,
    pub text_bright: Color32,
    pub spacing_4: f32,
    pub spacing_8: f32,
    pub spacing_12: f32,
    pub spacing_16: f32,
    pub radius_2: u8,
    pub radius_4: u8,
    pub tree_indent: f32,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            editor_bg: Color32::from_rgb(0x1E, 0x1E, 0x1E),
            sidebar_bg: Color32::from_rgb(0x25, 0x25, 0x26),
            header_bg: Color32::from_rgb(0x33, 0x33, 0x33),
            activity_bar_bg: Color32::from_rgb(0x2C, 0x2C, 0x2C),
            input_bg: Color32::from_rgb(0x3C, 0x3C, 0x3C),
            list_hover: Color32::from_rgb(0x2A, 0x2D, 0x2E),
            list_active: Color32::from_rgb(0x37, 0x37, 0x3D),
            border: Color32::from_rgb(0x3E, 0x3E, 0x42),
            accent: Color32::from_rgb(0x00, 0x7A, 0xCC),
            button_bg: Color32::from_rgb(0x0E, 0x63, 0x9C),
            workspace_button_bg: Color32::from_rgb(0x15, 0x80, 0x3D),
            success: Color32::from_rgb(0x22, 0xC5, 0x5E),
            danger: Color32::from_rgb(0xEF, 0x44, 0x44),
            running: Color32::from_rgb(0x3B, 0x82, 0xF6),
            text_primary: Color32::from_rgb(0xCC, 0xCC, 0xCC),
            text_muted: Color32::from_rgb(0x85, 0x85, 0x85),
            text_bright: Color32::WHITE,
            spacing_4: 4.0,
            spacing_8: Self::P8,
            spacing_12: 12.0,
            spacing_16: Self::P16,
            radius_2: 2,
            radius_4: Self::R4,
            tree_indent: 12.0,
        }
    }
}

impl Theme {
    pub const R4: u8 = 4;
    pub const P8: f32 = 8.0;
    pub const P16: f32 = 16.0;

    pub fn apply_visuals(&self, ctx: &egui::Context) {
        let mut visuals = egui::Visuals::dark();
        visuals.panel_fill = self.editor_bg;
        visuals.override_text_color = Some(self.text_primary);
        visuals.widgets.noninteractive.bg_fill = self.sidebar_bg;
        visuals.widgets.noninteractive.weak_bg_fill = self.sidebar_bg;
        visuals.widgets.noninteractive.bg_stroke = Stroke::new(1.0, self.border);
        visuals.widgets.inactive.bg_fill = self.input_bg;
        visuals.widgets.inactive.weak_bg_fill = self.input_bg;
        visuals.widgets.inactive.bg_stroke = Stroke::NONE;
        visuals.widgets.hovered.bg_fill = self.list_hover;
        visuals.widgets.hovered.weak_bg_fill = self.list_hover;
        visuals.widgets.hovered.bg_stroke = Stroke::NONE;
        visuals.widgets.active.bg_fill = self.accent;
        visuals.widgets.active.bg_stroke = Stroke::NONE;
        visuals.selection.bg_fill = self.list_active;
        visuals.selection.stroke = Stroke::new(1.0, self.accent);
        visuals.extreme_bg_color = self.input_bg;
        visuals.window_fill = self.sidebar_bg;
        visuals.window_stroke = Stroke::new(1.0, self.border);
        visuals.window_corner_radius = CornerRadius::same(self.radius_4);

        let mut style = (*ctx.style()).clone();
        style.visuals = visuals;
        style.spacing.item_spacing = egui::vec2(8.0, 6.0);
        style.spacing.button_padding = egui::vec2(10.0, 5.0);
        style.text_styles.insert(TextStyle::Heading, FontId::proportional(18.0));
        style.text_styles.insert(TextStyle::Body, FontId::proportional(13.0));
        style.text_styles.insert(TextStyle::Button, FontId::proportional(13.0));
        style.text_styles.insert(TextStyle::Monospace, FontId::monospace(12.0));
        style.text_styles.insert(TextStyle::Small, FontId::proportional(11.0));
        ctx.set_style(style);
    }

    pub fn panel_frame(&self, fill: Color32, inner_padding: i8) -> Frame {
        Frame::new()
            .fill(fill)
            .inner_margin(Margin::same(inner_padding))
            .stroke(Stroke::NONE)
    }

    /// Automation tile / empty-state box.
    pub fn card_frame(&self) -> Frame {
        Frame::new()
            .fill(self.sidebar_bg)
            .inner_margin(Margin::same(self.spacing_16 as i8))
            .corner_radius(CornerRadius::same(self.radius_4))
            .stroke(Stroke::new(1.0, self.border))
    }

    pub fn bubble_frame(&self, from_user: bool) -> Frame {
        let (fill, stroke) = if from_user {
            (self.accent, Stroke::NONE)
        } else {
            (self.input_bg, Stroke::new(1.0, self.border))
        };
        Frame::new()
            .fill(fill)
            .inner_margin(Margin::symmetric(self.spacing_12 as i8, self.spacing_8 as i8))
            .corner_radius(CornerRadius::same(self.radius_4))
            .stroke(stroke)
    }

    pub fn section_header_frame(&self) -> Frame {
        Frame::new()
            .fill(self.header_bg)
            .inner_margin(Margin::symmetric(self.spacing_16 as i8, self.spacing_8 as i8))
    }

    pub fn filled_button(&self, label: &str, fill: Color32) -> egui::Button<'static> {
        egui::Button::new(egui::RichText::new(label.to_string()).color(self.text_bright))
            .fill(fill)
            .stroke(Stroke::NONE)
            .corner_radius(CornerRadius::same(self.radius_2))
    }
}
