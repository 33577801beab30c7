// Tabs primitive
// One-of-many panel switcher keyed by string. Triggers in a list line
// select a key; each content panel mounts its state when its key becomes
// active and drops it when the key goes inactive.

use crossterm::event::KeyCode;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use serde::Deserialize;
use std::cell::RefCell;
use std::rc::Rc;

use crate::core::{ContextRegistry, KeyChangeFn, Ownership, PrimitiveError, TabsContext};
use crate::utilities::DimmingContext;

/// Declarative tab group shape, deserialized from application config.
#[derive(Debug, Clone, Deserialize)]
pub struct TabsSpec {
    pub initial: String,
    pub items: Vec<TabItemSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TabItemSpec {
    pub key: String,
    pub label: String,
}

impl TabsSpec {
    pub fn config(&self) -> TabsConfig {
        TabsConfig::new(self.initial.clone())
    }
}

/// Root configuration. A present `value` makes the group externally
/// controlled; otherwise it owns the active key, seeded from `initial`.
pub struct TabsConfig {
    value: Option<String>,
    initial: String,
    on_change: Option<KeyChangeFn>,
}

impl TabsConfig {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            value: None,
            initial: initial.into(),
            on_change: None,
        }
    }

    pub fn controlled(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn on_change(mut self, f: impl FnMut(&str) + 'static) -> Self {
        self.on_change = Some(Box::new(f));
        self
    }
}

/// Tabs root: owns the shared context and the selection entry point.
pub struct Tabs {
    name: String,
    ctx: Rc<RefCell<TabsContext>>,
}

impl std::fmt::Debug for Tabs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tabs")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl Tabs {
    /// Mount a tab group under `name`. The effective starting key must be
    /// non-empty; key/item agreement beyond that is the caller's contract.
    pub fn mount(
        registry: &mut ContextRegistry,
        name: &str,
        config: TabsConfig,
    ) -> Result<Self, PrimitiveError> {
        let ownership = match config.value {
            Some(v) => Ownership::External(v),
            None => Ownership::Owned(config.initial),
        };
        if ownership.value().is_empty() {
            return Err(PrimitiveError::EmptyInitialKey {
                name: name.to_string(),
            });
        }
        let ctx = TabsContext::new(ownership, config.on_change);
        registry.insert_tabs(name, ctx.clone())?;
        Ok(Self {
            name: name.to_string(),
            ctx,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn active_key(&self) -> String {
        self.ctx.borrow().active_key().to_string()
    }

    pub fn is_controlled(&self) -> bool {
        self.ctx.borrow().is_controlled()
    }

    /// Request a selection through the single mutation entry point.
    pub fn select(&self, key: &str) {
        self.ctx.borrow_mut().select(key);
    }

    /// Controlled-mode feedback: the external owner pushes the key it now
    /// holds. Ignored for internally owned groups.
    pub fn sync_value(&self, key: &str) {
        self.ctx.borrow_mut().sync_value(key);
    }
}

/// Trigger part: selects its key when activated.
pub struct TabsTrigger {
    ctx: Rc<RefCell<TabsContext>>,
    key: String,
    label: String,
}

impl TabsTrigger {
    pub fn attach(
        registry: &ContextRegistry,
        tabs: &str,
        key: impl Into<String>,
        label: impl Into<String>,
    ) -> Result<Self, PrimitiveError> {
        let ctx = registry.tabs("TabsTrigger", tabs)?;
        let key = key.into();
        ctx.borrow_mut().register_key(&key);
        Ok(Self {
            ctx,
            key,
            label: label.into(),
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_active(&self) -> bool {
        self.ctx.borrow().active_key() == self.key
    }

    pub fn select(&self) {
        self.ctx.borrow_mut().select(&self.key);
    }
}

/// Trigger list: renders the triggers as one separator-joined line with
/// the active tab boxed, and routes clicks and arrow keys back to
/// selection.
pub struct TabsList {
    ctx: Rc<RefCell<TabsContext>>,
    triggers: Vec<TabsTrigger>,
    color: Color,
    bounds: Vec<Rect>,
}

impl TabsList {
    pub fn attach(registry: &ContextRegistry, tabs: &str) -> Result<Self, PrimitiveError> {
        let ctx = registry.tabs("TabsList", tabs)?;
        Ok(Self {
            ctx,
            triggers: Vec::new(),
            color: Color::Cyan,
            bounds: Vec::new(),
        })
    }

    pub fn with_trigger(mut self, trigger: TabsTrigger) -> Self {
        self.triggers.push(trigger);
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn triggers(&self) -> &[TabsTrigger] {
        &self.triggers
    }

    /// Render the tab line: `── inactive ─ [ ACTIVE ]─ inactive ──` and
    /// record per-trigger bounds for click detection.
    pub fn render(&mut self, f: &mut Frame, area: Rect, dimming: &DimmingContext) {
        self.bounds.clear();
        if area.width == 0 || area.height == 0 {
            return;
        }

        let active_key = self.ctx.borrow().active_key().to_string();
        let line_style = Style::default().fg(dimming.dim_color(Color::White));
        let max_x = area.x + area.width;

        let mut spans: Vec<Span<'static>> = Vec::new();
        let mut x = area.x;

        let first_is_active = self
            .triggers
            .first()
            .map(|t| t.key == active_key)
            .unwrap_or(false);
        let leading = if first_is_active { "──" } else { "── " };
        spans.push(Span::styled(leading, line_style));
        x += leading.chars().count() as u16;

        let last = self.triggers.len().saturating_sub(1);
        let mut prev_was_active = false;
        for (idx, trigger) in self.triggers.iter().enumerate() {
            let active = trigger.key == active_key;
            if idx > 0 && !prev_was_active {
                let sep = if active { " ─" } else { " ─ " };
                spans.push(Span::styled(sep, line_style));
                x += sep.chars().count() as u16;
            }

            let label_width = trigger.label.chars().count() as u16;
            let tab_width = if active { label_width + 4 } else { label_width };
            if x + tab_width > max_x {
                self.bounds.push(Rect::default());
                continue;
            }

            if active {
                spans.push(Span::styled("[ ", line_style));
                spans.push(Span::styled(
                    trigger.label.clone(),
                    Style::default()
                        .fg(dimming.dim_color(self.color))
                        .add_modifier(Modifier::BOLD),
                ));
                spans.push(Span::styled(" ]", line_style));
            } else {
                spans.push(Span::styled(trigger.label.clone(), line_style));
            }
            self.bounds.push(Rect {
                x,
                y: area.y,
                width: tab_width,
                height: 1,
            });
            x += tab_width;

            if active && idx < last {
                spans.push(Span::styled("─ ", line_style));
                x += 2;
                prev_was_active = true;
            } else {
                prev_was_active = false;
            }
        }

        let last_is_active = self
            .triggers
            .last()
            .map(|t| t.key == active_key)
            .unwrap_or(false);
        let trailing = if last_is_active { "──" } else { " ──" };
        if x + trailing.chars().count() as u16 <= max_x {
            spans.push(Span::styled(trailing, line_style));
        }

        f.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    /// Select the tab at (x, y) if one was clicked. Returns whether the
    /// click landed on a trigger.
    pub fn click_at(&self, x: u16, y: u16) -> bool {
        let hit = self.bounds.iter().position(|b| {
            b.width > 0 && x >= b.x && x < b.x + b.width && y >= b.y && y < b.y + b.height
        });
        match hit {
            Some(idx) => {
                self.triggers[idx].select();
                true
            }
            None => false,
        }
    }

    /// Cycle the active tab with Left/Right, wrapping at the edges.
    pub fn handle_key(&self, key: KeyCode) -> bool {
        if self.triggers.is_empty() {
            return false;
        }
        let active_key = self.ctx.borrow().active_key().to_string();
        let current = self
            .triggers
            .iter()
            .position(|t| t.key == active_key)
            .unwrap_or(0);
        let next = match key {
            KeyCode::Left => (current + self.triggers.len() - 1) % self.triggers.len(),
            KeyCode::Right => (current + 1) % self.triggers.len(),
            _ => return false,
        };
        self.triggers[next].select();
        true
    }
}

/// Content part, generic over its panel state. The state is built by the
/// mount factory when the key becomes active and dropped when it goes
/// inactive; returning to the tab starts from a fresh mount.
pub struct TabsContent<S> {
    ctx: Rc<RefCell<TabsContext>>,
    key: String,
    mount: Box<dyn Fn() -> S>,
    state: Option<S>,
}

impl<S> TabsContent<S> {
    pub fn attach(
        registry: &ContextRegistry,
        tabs: &str,
        key: impl Into<String>,
        mount: impl Fn() -> S + 'static,
    ) -> Result<Self, PrimitiveError> {
        let ctx = registry.tabs("TabsContent", tabs)?;
        let key = key.into();
        ctx.borrow_mut().register_key(&key);
        Ok(Self {
            ctx,
            key,
            mount: Box::new(mount),
            state: None,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_active(&self) -> bool {
        self.ctx.borrow().active_key() == self.key
    }

    pub fn is_mounted(&self) -> bool {
        self.state.is_some()
    }

    /// Reconcile mounted state with the active key. Call once per frame
    /// before rendering.
    pub fn sync(&mut self) {
        let active = self.is_active();
        match (active, self.state.is_some()) {
            (true, false) => self.state = Some((self.mount)()),
            (false, true) => self.state = None,
            _ => {}
        }
    }

    pub fn state(&self) -> Option<&S> {
        self.state.as_ref()
    }

    pub fn state_mut(&mut self) -> Option<&mut S> {
        self.state.as_mut()
    }

    /// Sync, then draw the panel through `draw` if this key is active.
    pub fn render(&mut self, f: &mut Frame, area: Rect, draw: impl FnOnce(&mut Frame, Rect, &mut S)) {
        self.sync();
        if let Some(state) = self.state.as_mut() {
            draw(f, area, state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};
    use std::cell::Cell;

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn skill_tabs(registry: &mut ContextRegistry) -> (Tabs, TabsList) {
        let tabs = Tabs::mount(registry, "skills", TabsConfig::new("core")).unwrap();
        let list = TabsList::attach(registry, "skills")
            .unwrap()
            .with_trigger(TabsTrigger::attach(registry, "skills", "core", "Core").unwrap())
            .with_trigger(TabsTrigger::attach(registry, "skills", "systems", "Systems").unwrap())
            .with_trigger(TabsTrigger::attach(registry, "skills", "product", "Product").unwrap());
        (tabs, list)
    }

    #[test]
    fn empty_initial_key_is_rejected() {
        let mut registry = ContextRegistry::new();
        let err = Tabs::mount(&mut registry, "skills", TabsConfig::new("")).unwrap_err();
        assert!(matches!(err, PrimitiveError::EmptyInitialKey { .. }));
    }

    #[test]
    fn parts_outside_root_fail_fast() {
        let registry = ContextRegistry::new();
        assert!(TabsTrigger::attach(&registry, "missing", "a", "A").is_err());
        assert!(TabsList::attach(&registry, "missing").is_err());
        assert!(TabsContent::<()>::attach(&registry, "missing", "a", || ()).is_err());
    }

    #[test]
    fn exactly_one_panel_mounted_per_selection() {
        let mut registry = ContextRegistry::new();
        let (tabs, _list) = skill_tabs(&mut registry);
        let mut panels = vec![
            TabsContent::attach(&registry, "skills", "core", || ()).unwrap(),
            TabsContent::attach(&registry, "skills", "systems", || ()).unwrap(),
            TabsContent::attach(&registry, "skills", "product", || ()).unwrap(),
        ];

        for key in ["core", "systems", "product", "systems"] {
            tabs.select(key);
            for p in panels.iter_mut() {
                p.sync();
            }
            let mounted: Vec<&str> = panels
                .iter()
                .filter(|p| p.is_mounted())
                .map(|p| p.key())
                .collect();
            assert_eq!(mounted, vec![key]);
        }
    }

    #[test]
    fn returning_to_a_tab_remounts_fresh_state() {
        let mut registry = ContextRegistry::new();
        let (tabs, _list) = skill_tabs(&mut registry);
        let mounts = Rc::new(Cell::new(0usize));
        let counter = mounts.clone();
        let mut core_panel =
            TabsContent::attach(&registry, "skills", "core", move || {
                counter.set(counter.get() + 1);
                0usize
            })
            .unwrap();

        core_panel.sync();
        assert_eq!(mounts.get(), 1);
        // Mutate the mounted state, then leave and come back.
        *core_panel.state_mut().unwrap() = 42;

        tabs.select("systems");
        core_panel.sync();
        assert!(!core_panel.is_mounted());

        tabs.select("core");
        core_panel.sync();
        assert_eq!(mounts.get(), 2);
        assert_eq!(*core_panel.state().unwrap(), 0);
    }

    #[test]
    fn list_renders_active_tab_boxed_and_routes_clicks() {
        let mut registry = ContextRegistry::new();
        let (tabs, mut list) = skill_tabs(&mut registry);
        let backend = TestBackend::new(60, 3);
        let mut terminal = Terminal::new(backend).unwrap();
        let dimming = DimmingContext::new(false);

        terminal
            .draw(|f| list.render(f, f.area(), &dimming))
            .unwrap();
        let text = buffer_text(&terminal);
        assert!(text.contains("[ Core ]"));
        assert!(text.contains("Systems"));
        assert!(!text.contains("[ Systems ]"));

        // Click the Systems trigger using the recorded bounds.
        let systems = list.bounds[1];
        assert!(list.click_at(systems.x, systems.y));
        assert_eq!(tabs.active_key(), "systems");

        terminal
            .draw(|f| list.render(f, f.area(), &dimming))
            .unwrap();
        assert!(buffer_text(&terminal).contains("[ Systems ]"));
    }

    #[test]
    fn arrow_keys_cycle_with_wraparound() {
        let mut registry = ContextRegistry::new();
        let (tabs, list) = skill_tabs(&mut registry);

        assert!(list.handle_key(KeyCode::Right));
        assert_eq!(tabs.active_key(), "systems");
        assert!(list.handle_key(KeyCode::Left));
        assert_eq!(tabs.active_key(), "core");
        assert!(list.handle_key(KeyCode::Left));
        assert_eq!(tabs.active_key(), "product");
        assert!(list.handle_key(KeyCode::Right));
        assert_eq!(tabs.active_key(), "core");
        assert!(!list.handle_key(KeyCode::Enter));
    }

    #[test]
    fn controlled_group_waits_for_owner_feedback() {
        let seen: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let mut registry = ContextRegistry::new();
        let tabs = Tabs::mount(
            &mut registry,
            "skills",
            TabsConfig::new("core")
                .controlled("core")
                .on_change(move |key| sink.borrow_mut().push(key.to_string())),
        )
        .unwrap();

        tabs.select("systems");
        assert_eq!(tabs.active_key(), "core");
        assert_eq!(*seen.borrow(), vec!["systems".to_string()]);

        tabs.sync_value("systems");
        assert_eq!(tabs.active_key(), "systems");
    }

    #[test]
    fn spec_deserializes_from_config_shape() {
        let yaml = "
initial: core
items:
  - key: core
    label: Core
  - key: systems
    label: Systems
";
        let spec: TabsSpec = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(spec.initial, "core");
        assert_eq!(spec.items.len(), 2);
        assert_eq!(spec.items[1].label, "Systems");
    }
}
