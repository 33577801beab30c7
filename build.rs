// Build script - reads content.yaml at compile time and generates UI defaults
// This allows changing defaults during development without editing source code

use std::env;
use std::fs;
use std::path::Path;

fn main() {
    // Tell Cargo to rerun if content.yaml changes
    println!("cargo:rerun-if-changed=src/content.yaml");

    let out_dir = env::var("OUT_DIR").unwrap();
    let dest_path = Path::new(&out_dir).join("compiled_config.rs");

    // Try to read content.yaml from src/, fall back to hardcoded defaults if not found
    let config = if Path::new("src/content.yaml").exists() {
        let content = fs::read_to_string("src/content.yaml")
            .expect("Failed to read src/content.yaml");
        parse_config(&content)
    } else {
        CompiledConfig::default()
    };

    // Generate Rust code with the compiled-in values
    let generated = format!(
        r#"// Auto-generated from content.yaml at compile time
// Do not edit - modify content.yaml and rebuild instead

pub const MOUSE_ENABLED: bool = {mouse_enabled};
pub const REDUCED_MOTION: bool = {reduced_motion};
pub const DIALOG_FADE_MS: u64 = {dialog_fade_ms};

// UI palette (RGB tuples)
pub const ACCENT: (u8, u8, u8) = {accent};
pub const PANEL_BG: (u8, u8, u8) = {panel_bg};
pub const BACKDROP: (u8, u8, u8) = {backdrop};
"#,
        mouse_enabled = config.mouse_enabled,
        reduced_motion = config.reduced_motion,
        dialog_fade_ms = config.dialog_fade_ms,
        accent = format!("({}, {}, {})", config.accent.0, config.accent.1, config.accent.2),
        panel_bg = format!("({}, {}, {})", config.panel_bg.0, config.panel_bg.1, config.panel_bg.2),
        backdrop = format!("({}, {}, {})", config.backdrop.0, config.backdrop.1, config.backdrop.2),
    );

    fs::write(&dest_path, generated).expect("Failed to write compiled config");
}

struct CompiledConfig {
    mouse_enabled: bool,
    reduced_motion: bool,
    dialog_fade_ms: u64,
    accent: (u8, u8, u8),
    panel_bg: (u8, u8, u8),
    backdrop: (u8, u8, u8),
}

impl Default for CompiledConfig {
    fn default() -> Self {
        Self {
            mouse_enabled: true,
            reduced_motion: false,
            dialog_fade_ms: 220,
            accent: (34, 211, 238),   // #22d3ee
            panel_bg: (20, 20, 32),   // #141420
            backdrop: (10, 10, 10),   // #0a0a0a
        }
    }
}

fn parse_config(content: &str) -> CompiledConfig {
    let mut config = CompiledConfig::default();

    // Simple YAML parsing (avoiding external dependencies in build script)
    let mut in_ui = false;
    let mut in_colors = false;

    for line in content.lines() {
        let trimmed = line.trim();

        // Track which section we're in; only the ui block matters here
        if trimmed.starts_with("ui:") {
            in_ui = true;
            in_colors = false;
            continue;
        } else if !line.starts_with(' ') && !line.starts_with('\t') && trimmed.ends_with(':') {
            // Another top-level section
            in_ui = false;
            in_colors = false;
            continue;
        } else if in_ui && trimmed.starts_with("colors:") {
            in_colors = true;
            continue;
        }

        if !in_ui {
            continue;
        }

        if let Some((key, value)) = parse_kv(trimmed) {
            if in_colors {
                match key {
                    "accent" => config.accent = parse_hex_color(value),
                    "panel_bg" => config.panel_bg = parse_hex_color(value),
                    "backdrop" => config.backdrop = parse_hex_color(value),
                    _ => in_colors = false,
                }
                if in_colors {
                    continue;
                }
            }
            match key {
                "mouse_enabled" => config.mouse_enabled = parse_bool(value),
                "reduced_motion" => config.reduced_motion = parse_bool(value),
                "dialog_fade_ms" => config.dialog_fade_ms = value.parse().unwrap_or(220),
                _ => {}
            }
        }
    }

    config
}

fn parse_kv(line: &str) -> Option<(&str, &str)> {
    // Skip comments and empty lines
    if line.starts_with('#') || line.is_empty() {
        return None;
    }

    let colon_pos = line.find(':')?;
    let key = line[..colon_pos].trim();
    let mut value = line[colon_pos + 1..].trim();

    // Remove inline comments; preserve # at start of value (hex color)
    if let Some(comment_pos) = value.find(" #") {
        value = value[..comment_pos].trim();
    }

    if value.is_empty() {
        return None;
    }

    Some((key, value))
}

fn parse_bool(s: &str) -> bool {
    matches!(s.to_lowercase().as_str(), "true" | "yes" | "1")
}

fn parse_hex_color(s: &str) -> (u8, u8, u8) {
    let s = s.trim().trim_matches('"').trim_matches('\'');
    let s = s.strip_prefix('#').unwrap_or(s);

    if s.len() == 6 {
        if let (Ok(r), Ok(g), Ok(b)) = (
            u8::from_str_radix(&s[0..2], 16),
            u8::from_str_radix(&s[2..4], 16),
            u8::from_str_radix(&s[4..6], 16),
        ) {
            return (r, g, b);
        }
    }

    (0, 0, 0)
}
