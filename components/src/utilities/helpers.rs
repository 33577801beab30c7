// Helper utilities for TUI components
use ratatui::style::{Color, Style};

/// Convert hex color to ratatui Color
pub fn hex_color(hex: u32) -> Color {
    Color::Rgb(
        ((hex >> 16) & 0xFF) as u8,
        ((hex >> 8) & 0xFF) as u8,
        (hex & 0xFF) as u8,
    )
}

/// Dimming context - tracks if an overlay is visible above the page
pub struct DimmingContext {
    pub overlay_visible: bool,
}

impl DimmingContext {
    pub fn new(overlay_visible: bool) -> Self {
        Self { overlay_visible }
    }

    /// Apply dimming to a color based on overlay state
    pub fn dim_color(&self, color: Color) -> Color {
        if self.overlay_visible {
            hex_color(0x444444)
        } else {
            color
        }
    }

    /// Apply dimming to a style based on overlay state
    pub fn dim_style(&self, style: Style) -> Style {
        if self.overlay_visible {
            style.fg(hex_color(0x444444))
        } else {
            style
        }
    }

}

/// Wrap text to fit within max width, counting chars not bytes
pub fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        if paragraph.is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current_line = String::new();
        let mut current_len = 0usize;

        for word in paragraph.split_whitespace() {
            let word_len = word.chars().count();
            if current_line.is_empty() {
                current_line = word.to_string();
                current_len = word_len;
            } else if current_len + 1 + word_len <= max_width {
                current_line.push(' ');
                current_line.push_str(word);
                current_len += 1 + word_len;
            } else {
                lines.push(current_line);
                current_line = word.to_string();
                current_len = word_len;
            }
        }

        if !current_line.is_empty() {
            lines.push(current_line);
        }
    }

    lines
}
