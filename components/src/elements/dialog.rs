// Dialog primitive
// Modal disclosure: a trigger opens an overlay-rendered panel over a dimmed
// backdrop. Closed by backdrop click, the close affordance, Escape at the
// host level, or the external owner pushing a new value.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};
use std::cell::RefCell;
use std::rc::Rc;

use crate::core::{
    ContextRegistry, DialogContext, NoTransition, OpenChangeFn, OverlayHost, Ownership,
    PrimitiveError, Transition,
};
use crate::utilities::{hex_color, wrap_text, DimmingContext};

/// Preferred wrap width for panel text before the panel is sized.
const PANEL_TEXT_WIDTH: usize = 56;

fn contains(rect: Rect, x: u16, y: u16) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

/// Root configuration. A present `value` makes the dialog externally
/// controlled; otherwise it owns an internal flag seeded from
/// `initial_value` (default closed).
pub struct DialogConfig {
    value: Option<bool>,
    initial_value: bool,
    on_change: Option<OpenChangeFn>,
    transition: Box<dyn Transition>,
}

impl Default for DialogConfig {
    fn default() -> Self {
        Self {
            value: None,
            initial_value: false,
            on_change: None,
            transition: Box::new(NoTransition),
        }
    }
}

impl DialogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Externally controlled: every change request only invokes `on_change`,
    /// and the visible state moves when the owner calls `sync_value`.
    pub fn controlled(mut self, value: bool) -> Self {
        self.value = Some(value);
        self
    }

    pub fn initially_open(mut self, open: bool) -> Self {
        self.initial_value = open;
        self
    }

    pub fn on_change(mut self, f: impl FnMut(bool) + 'static) -> Self {
        self.on_change = Some(Box::new(f));
        self
    }

    pub fn transition(mut self, t: Box<dyn Transition>) -> Self {
        self.transition = t;
        self
    }
}

/// Dialog root: owns the shared context and the mutation entry point.
pub struct Dialog {
    name: String,
    ctx: Rc<RefCell<DialogContext>>,
}

impl Dialog {
    /// Mount a dialog root under `name`; parts attach by the same name.
    /// The controlled/uncontrolled kind is fixed here for the lifetime.
    pub fn mount(
        registry: &mut ContextRegistry,
        host: &OverlayHost,
        name: &str,
        config: DialogConfig,
    ) -> Result<Self, PrimitiveError> {
        let ownership = match config.value {
            Some(v) => Ownership::External(v),
            None => Ownership::Owned(config.initial_value),
        };
        let ctx = DialogContext::new(ownership, config.on_change, host.clone(), config.transition);
        registry.insert_dialog(name, ctx.clone())?;
        Ok(Self {
            name: name.to_string(),
            ctx,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_open(&self) -> bool {
        self.ctx.borrow().is_open()
    }

    pub fn is_controlled(&self) -> bool {
        self.ctx.borrow().is_controlled()
    }

    /// Request a state change through the single mutation entry point.
    pub fn request_open(&self, next: bool) {
        DialogContext::request_open(&self.ctx, next);
    }

    /// Controlled-mode feedback: the external owner pushes the value it now
    /// holds. Ignored for internally owned dialogs.
    pub fn sync_value(&self, next: bool) {
        DialogContext::sync_value(&self.ctx, next);
    }
}

/// Trigger part. Renders its own interactive element; a caller-supplied
/// hook runs before the open request, preserving pre-existing handler
/// ordering.
pub struct DialogTrigger {
    ctx: Rc<RefCell<DialogContext>>,
    label: String,
    style: Style,
    on_click: Option<Box<dyn FnMut()>>,
    bounds: Option<Rect>,
}

impl DialogTrigger {
    pub fn attach(
        registry: &ContextRegistry,
        dialog: &str,
        label: impl Into<String>,
    ) -> Result<Self, PrimitiveError> {
        let ctx = registry.dialog("DialogTrigger", dialog)?;
        Ok(Self {
            ctx,
            label: label.into(),
            style: Style::default().fg(Color::Cyan),
            on_click: None,
            bounds: None,
        })
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn with_on_click(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_click = Some(Box::new(f));
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Activate the trigger: the caller hook first, then the open request.
    pub fn click(&mut self) {
        if let Some(f) = self.on_click.as_mut() {
            f();
        }
        DialogContext::request_open(&self.ctx, true);
    }

    /// Render as `[ label ]` and record bounds for click routing.
    pub fn render(&mut self, f: &mut Frame, area: Rect, dimming: &DimmingContext) {
        if area.width == 0 || area.height == 0 {
            self.bounds = None;
            return;
        }
        let text = format!("[ {} ]", self.label);
        let width = (text.chars().count() as u16).min(area.width);
        let rect = Rect {
            x: area.x,
            y: area.y,
            width,
            height: 1,
        };
        f.render_widget(
            Paragraph::new(Span::styled(text, dimming.dim_style(self.style))),
            rect,
        );
        self.bounds = Some(rect);
    }

    /// Whether (x, y) lands on the last rendered bounds.
    pub fn hit(&self, x: u16, y: u16) -> bool {
        self.bounds.is_some_and(|b| contains(b, x, y))
    }
}

/// Title part: presentational; the text becomes the panel's label line.
pub struct DialogTitle {
    text: String,
    style: Style,
}

impl DialogTitle {
    pub fn attach(
        registry: &ContextRegistry,
        dialog: &str,
        text: impl Into<String>,
    ) -> Result<Self, PrimitiveError> {
        // Validates the root exists; the title itself carries no state.
        registry.dialog("DialogTitle", dialog)?;
        Ok(Self {
            text: text.into(),
            style: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        })
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Description part: presentational; rendered directly under the title so
/// the panel's label/description association is preserved.
pub struct DialogDescription {
    text: String,
    style: Style,
}

impl DialogDescription {
    pub fn attach(
        registry: &ContextRegistry,
        dialog: &str,
        text: impl Into<String>,
    ) -> Result<Self, PrimitiveError> {
        registry.dialog("DialogDescription", dialog)?;
        Ok(Self {
            text: text.into(),
            style: Style::default().fg(hex_color(0x999999)),
        })
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Content part. Suspended from the page tree and rendered on the overlay
/// layer; renders nothing until the host has confirmed the overlay and the
/// dialog is open.
pub struct DialogContent {
    ctx: Rc<RefCell<DialogContext>>,
    host: OverlayHost,
    title: Option<DialogTitle>,
    description: Option<DialogDescription>,
    panel_bg: Color,
    backdrop: Color,
    panel_bounds: Option<Rect>,
    close_bounds: Option<Rect>,
}

impl DialogContent {
    pub fn attach(registry: &ContextRegistry, dialog: &str) -> Result<Self, PrimitiveError> {
        let ctx = registry.dialog("DialogContent", dialog)?;
        let host = ctx.borrow().host();
        Ok(Self {
            ctx,
            host,
            title: None,
            description: None,
            panel_bg: hex_color(0x141420),
            backdrop: hex_color(0x0A0A0A),
            panel_bounds: None,
            close_bounds: None,
        })
    }

    pub fn with_title(mut self, title: DialogTitle) -> Self {
        self.title = Some(title);
        self
    }

    pub fn with_description(mut self, description: DialogDescription) -> Self {
        self.description = Some(description);
        self
    }

    /// Override the panel and backdrop colors (default matches the
    /// built-in theme).
    pub fn with_colors(mut self, panel_bg: Color, backdrop: Color) -> Self {
        self.panel_bg = panel_bg;
        self.backdrop = backdrop;
        self
    }

    pub fn is_open(&self) -> bool {
        self.ctx.borrow().is_open()
    }

    /// Render the backdrop and centered panel over `area`. `body` is the
    /// caller-supplied content below the title/description block; each
    /// entry is wrapped as its own paragraph.
    pub fn render(&mut self, f: &mut Frame, area: Rect, body: &[String]) {
        self.panel_bounds = None;
        self.close_bounds = None;

        // First-render guard: no overlay target confirmed yet.
        if !self.host.overlay_ready() {
            return;
        }
        let (open, progress) = {
            let c = self.ctx.borrow();
            (c.is_open(), c.transition_progress())
        };
        if !open {
            return;
        }
        if area.width == 0 || area.height == 0 {
            return;
        }

        // Dim everything behind the panel; lighter while still settling.
        let shade = if progress >= 1.0 {
            self.backdrop
        } else {
            half_shade(self.backdrop)
        };
        f.render_widget(
            Paragraph::new("").style(Style::default().bg(shade)),
            area,
        );

        // Too small for the bordered panel: fall back to a single-line
        // panel so an open dialog is never invisible.
        if area.width < 8 || area.height < 5 {
            self.render_minimal(f, area);
            return;
        }

        // Size the panel from its content, then re-wrap at the final width.
        let title_text = self.title.as_ref().map(|t| t.text.clone()).unwrap_or_default();
        let mut max_line = title_text.chars().count() + 4;
        let desc_text = self.description.as_ref().map(|d| d.text.clone());
        for block in desc_text.iter().chain(body.iter()) {
            for line in wrap_text(block, PANEL_TEXT_WIDTH) {
                max_line = max_line.max(line.chars().count());
            }
        }
        let panel_width = (max_line as u16 + 6)
            .max(40)
            .min((area.width as f32 * 0.7) as u16)
            .min(area.width.saturating_sub(4));
        let inner = panel_width.saturating_sub(2) as usize;
        let text_width = inner.saturating_sub(2);

        let border = Style::default().fg(Color::White);
        let mut lines: Vec<Line<'static>> = Vec::new();
        lines.push(Line::from(Span::styled(
            format!("┏{}┓", "━".repeat(inner)),
            border,
        )));

        // Title row carries the close affordance at the right edge.
        let title_style = self
            .title
            .as_ref()
            .map(|t| t.style)
            .unwrap_or_else(|| Style::default().add_modifier(Modifier::BOLD));
        let title_room = inner.saturating_sub(4);
        let shown_title: String = title_text.chars().take(title_room).collect();
        let pad = inner.saturating_sub(shown_title.chars().count() + 3);
        lines.push(Line::from(vec![
            Span::styled("┃ ", border),
            Span::styled(shown_title, title_style),
            Span::raw(" ".repeat(pad)),
            Span::styled("✕", Style::default().fg(hex_color(0x777777))),
            Span::styled(" ┃", border),
        ]));
        lines.push(blank_row(inner, border));

        if let Some(desc) = &self.description {
            for line in wrap_text(&desc.text, text_width) {
                lines.push(text_row(&line, inner, desc.style, border));
            }
            lines.push(blank_row(inner, border));
        }
        for block in body {
            for line in wrap_text(block, text_width) {
                lines.push(text_row(&line, inner, Style::default().fg(Color::White), border));
            }
            lines.push(blank_row(inner, border));
        }
        lines.push(Line::from(Span::styled(
            format!("┗{}┛", "━".repeat(inner)),
            border,
        )));

        let panel_height = (lines.len() as u16).min(area.height.saturating_sub(2));
        let panel = Rect {
            x: area.x + area.width.saturating_sub(panel_width) / 2,
            y: area.y + area.height.saturating_sub(panel_height) / 2,
            width: panel_width,
            height: panel_height,
        };
        f.render_widget(Clear, panel);
        f.render_widget(
            Paragraph::new(lines).style(Style::default().bg(self.panel_bg)),
            panel,
        );

        self.panel_bounds = Some(panel);
        self.close_bounds = Some(Rect {
            x: panel.x + panel.width.saturating_sub(4),
            y: panel.y + 1,
            width: 3,
            height: 1,
        });
    }

    /// One-line panel for areas too small to hold the bordered layout:
    /// truncated title plus the close affordance.
    fn render_minimal(&mut self, f: &mut Frame, area: Rect) {
        let row = Rect {
            x: area.x,
            y: area.y + area.height / 2,
            width: area.width,
            height: 1,
        };
        let title_text = self
            .title
            .as_ref()
            .map(|t| t.text.as_str())
            .unwrap_or_default();
        let shown: String = title_text
            .chars()
            .take(area.width.saturating_sub(2) as usize)
            .collect();
        let title_style = self
            .title
            .as_ref()
            .map(|t| t.style)
            .unwrap_or_else(|| Style::default().add_modifier(Modifier::BOLD));
        f.render_widget(Clear, row);
        f.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(shown, title_style),
                Span::styled(" ✕", Style::default().fg(hex_color(0x777777))),
            ]))
            .style(Style::default().bg(self.panel_bg)),
            row,
        );
        self.panel_bounds = Some(row);
        self.close_bounds = Some(Rect {
            x: row.x + row.width.saturating_sub(1),
            y: row.y,
            width: 1,
            height: 1,
        });
    }

    /// Route a click that happened while the overlay is up. Returns true
    /// when the overlay consumed the click.
    pub fn handle_click(&self, x: u16, y: u16) -> bool {
        if !self.ctx.borrow().is_open() {
            return false;
        }
        if self.close_bounds.is_some_and(|b| contains(b, x, y)) {
            DialogContext::request_open(&self.ctx, false);
            return true;
        }
        match self.panel_bounds {
            // Clicks inside the panel stay in the panel.
            Some(panel) if contains(panel, x, y) => true,
            // Anything else is the backdrop.
            _ => {
                DialogContext::request_open(&self.ctx, false);
                true
            }
        }
    }
}

fn half_shade(color: Color) -> Color {
    match color {
        Color::Rgb(r, g, b) => Color::Rgb(r / 2, g / 2, b / 2),
        other => other,
    }
}

fn blank_row(inner: usize, border: Style) -> Line<'static> {
    Line::from(Span::styled(format!("┃{}┃", " ".repeat(inner)), border))
}

fn text_row(text: &str, inner: usize, style: Style, border: Style) -> Line<'static> {
    let shown: String = text.chars().take(inner.saturating_sub(2)).collect();
    let pad = inner.saturating_sub(shown.chars().count() + 2);
    Line::from(vec![
        Span::styled("┃ ", border),
        Span::styled(shown, style),
        Span::raw(" ".repeat(pad + 1)),
        Span::styled("┃", border),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn mount_basic(
        registry: &mut ContextRegistry,
        host: &OverlayHost,
        name: &str,
    ) -> (Dialog, DialogContent) {
        let dialog = Dialog::mount(registry, host, name, DialogConfig::new()).unwrap();
        let title = DialogTitle::attach(registry, name, "Case Study X").unwrap();
        let description = DialogDescription::attach(registry, name, "A short summary").unwrap();
        let content = DialogContent::attach(registry, name)
            .unwrap()
            .with_title(title)
            .with_description(description);
        (dialog, content)
    }

    #[test]
    fn parts_outside_root_fail_fast() {
        let registry = ContextRegistry::new();
        assert!(DialogTrigger::attach(&registry, "missing", "Open").is_err());
        assert!(DialogContent::attach(&registry, "missing").is_err());
        assert!(DialogTitle::attach(&registry, "missing", "T").is_err());
        assert!(DialogDescription::attach(&registry, "missing", "D").is_err());
    }

    #[test]
    fn uncontrolled_visibility_follows_logical_state() {
        let mut registry = ContextRegistry::new();
        let host = OverlayHost::new();
        host.confirm_overlay();
        let (dialog, mut content) = mount_basic(&mut registry, &host, "case");
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();

        for open in [true, false, true, true, false] {
            dialog.request_open(open);
            terminal
                .draw(|f| content.render(f, f.area(), &[]))
                .unwrap();
            let rendered = buffer_text(&terminal).contains("Case Study X");
            assert_eq!(rendered, dialog.is_open());
            assert_eq!(dialog.is_open(), open);
        }
    }

    #[test]
    fn content_renders_nothing_before_overlay_is_confirmed() {
        let mut registry = ContextRegistry::new();
        let host = OverlayHost::new();
        let (dialog, mut content) = mount_basic(&mut registry, &host, "case");
        dialog.request_open(true);

        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| content.render(f, f.area(), &[])).unwrap();
        assert!(!buffer_text(&terminal).contains("Case Study X"));

        host.confirm_overlay();
        terminal.draw(|f| content.render(f, f.area(), &[])).unwrap();
        assert!(buffer_text(&terminal).contains("Case Study X"));
    }

    #[test]
    fn escape_always_closes_after_any_toggle_history() {
        let mut registry = ContextRegistry::new();
        let host = OverlayHost::new();
        host.confirm_overlay();
        let (dialog, _content) = mount_basic(&mut registry, &host, "case");

        for _ in 0..3 {
            dialog.request_open(true);
            dialog.request_open(false);
        }
        dialog.request_open(true);
        assert!(host.dispatch_escape());
        assert!(!dialog.is_open());
        assert!(host.scroll_allowed());
    }

    #[test]
    fn trigger_hook_runs_before_open_request() {
        let order: Rc<RefCell<Vec<&'static str>>> = Rc::new(RefCell::new(Vec::new()));
        let mut registry = ContextRegistry::new();
        let host = OverlayHost::new();
        let changes = order.clone();
        let _dialog = Dialog::mount(
            &mut registry,
            &host,
            "case",
            DialogConfig::new().on_change(move |_| changes.borrow_mut().push("request")),
        )
        .unwrap();
        let hook = order.clone();
        let mut trigger = DialogTrigger::attach(&registry, "case", "Open")
            .unwrap()
            .with_on_click(move || hook.borrow_mut().push("hook"));

        trigger.click();
        assert_eq!(*order.borrow(), vec!["hook", "request"]);
    }

    #[test]
    fn backdrop_and_close_affordance_close_the_dialog() {
        let mut registry = ContextRegistry::new();
        let host = OverlayHost::new();
        host.confirm_overlay();
        let (dialog, mut content) = mount_basic(&mut registry, &host, "case");
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();

        // Backdrop click.
        dialog.request_open(true);
        terminal.draw(|f| content.render(f, f.area(), &[])).unwrap();
        assert!(content.handle_click(0, 0));
        assert!(!dialog.is_open());

        // Click inside the panel is consumed without closing.
        dialog.request_open(true);
        terminal.draw(|f| content.render(f, f.area(), &[])).unwrap();
        let panel = content.panel_bounds.unwrap();
        assert!(content.handle_click(panel.x + 2, panel.y + 2));
        assert!(dialog.is_open());

        // Close affordance.
        let close = content.close_bounds.unwrap();
        assert!(content.handle_click(close.x + 1, close.y));
        assert!(!dialog.is_open());
        assert!(host.scroll_allowed());
    }

    #[test]
    fn scroll_restored_after_every_close_path_and_unmount() {
        let mut registry = ContextRegistry::new();
        let host = OverlayHost::new();
        host.confirm_overlay();
        let (dialog, mut content) = mount_basic(&mut registry, &host, "case");
        let mut trigger = DialogTrigger::attach(&registry, "case", "Open").unwrap();
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();

        // Close affordance path.
        trigger.click();
        assert!(!host.scroll_allowed());
        terminal.draw(|f| content.render(f, f.area(), &[])).unwrap();
        let close = content.close_bounds.unwrap();
        content.handle_click(close.x, close.y);
        assert!(host.scroll_allowed());

        // Backdrop path.
        trigger.click();
        terminal.draw(|f| content.render(f, f.area(), &[])).unwrap();
        content.handle_click(0, 0);
        assert!(host.scroll_allowed());

        // Escape path.
        trigger.click();
        host.dispatch_escape();
        assert!(host.scroll_allowed());

        // Teardown while open.
        trigger.click();
        assert!(!host.scroll_allowed());
        registry.unmount_dialog("case");
        drop(dialog);
        drop(content);
        drop(trigger);
        assert!(host.scroll_allowed());
    }

    #[test]
    fn controlled_dialog_waits_for_owner_feedback() {
        let seen: Rc<RefCell<Vec<bool>>> = Rc::new(RefCell::new(Vec::new()));
        let mut registry = ContextRegistry::new();
        let host = OverlayHost::new();
        host.confirm_overlay();
        let sink = seen.clone();
        let dialog = Dialog::mount(
            &mut registry,
            &host,
            "case",
            DialogConfig::new()
                .controlled(false)
                .on_change(move |open| sink.borrow_mut().push(open)),
        )
        .unwrap();
        let mut trigger = DialogTrigger::attach(&registry, "case", "Open").unwrap();

        trigger.click();
        assert!(!dialog.is_open());
        assert_eq!(*seen.borrow(), vec![true]);

        // Owner feeds the value back; only now does state move.
        dialog.sync_value(true);
        assert!(dialog.is_open());
        assert!(!host.scroll_allowed());
        dialog.sync_value(false);
        assert!(host.scroll_allowed());
    }

    #[test]
    fn panel_and_backdrop_colors_are_configurable() {
        let mut registry = ContextRegistry::new();
        let host = OverlayHost::new();
        host.confirm_overlay();
        let dialog = Dialog::mount(&mut registry, &host, "case", DialogConfig::new()).unwrap();
        let title = DialogTitle::attach(&registry, "case", "Case Study X").unwrap();
        let mut content = DialogContent::attach(&registry, "case")
            .unwrap()
            .with_title(title)
            .with_colors(Color::Rgb(1, 2, 3), Color::Rgb(40, 50, 60));
        dialog.request_open(true);

        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|f| content.render(f, f.area(), &[])).unwrap();

        let buffer = terminal.backend().buffer();
        let panel = content.panel_bounds.unwrap();
        let inside = &buffer.content[(panel.y as usize + 1) * 80 + panel.x as usize + 1];
        assert_eq!(inside.bg, Color::Rgb(1, 2, 3));
        let corner = &buffer.content[0];
        assert_eq!(corner.bg, Color::Rgb(40, 50, 60));
    }

    #[test]
    fn tiny_terminal_still_shows_an_open_dialog() {
        let mut registry = ContextRegistry::new();
        let host = OverlayHost::new();
        host.confirm_overlay();
        let (dialog, mut content) = mount_basic(&mut registry, &host, "case");
        dialog.request_open(true);

        let mut terminal = Terminal::new(TestBackend::new(6, 3)).unwrap();
        terminal.draw(|f| content.render(f, f.area(), &[])).unwrap();
        let text = buffer_text(&terminal);
        assert!(text.contains("Case"));
        assert!(text.contains("✕"));

        // The fallback stays closable by its affordance.
        let close = content.close_bounds.unwrap();
        assert!(content.handle_click(close.x, close.y));
        assert!(!dialog.is_open());
        assert!(host.scroll_allowed());
    }
}
