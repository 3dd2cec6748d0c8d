//! Keybinding registry — maps actions to key events with config overrides.
//!
//! Bindings are data-driven so users can remap keys from config.toml.
use crossterm::event::{KeyCode, KeyModifiers};
use std::collections::HashMap;

// ============================================================================
// Action Enum
// ============================================================================

/// All user-facing actions that can be triggered by keybindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    NavDown,
    NavUp,
    PageDown,
    PageUp,
    JumpTop,
    JumpBottom,
    Select,
    Back,
    NextFilter,
    PrevFilter,
    ClearFilter,
    Reload,
    OpenInBrowser,
    ScrollDown,
    ScrollUp,
    CycleTheme,
    ShowHelp,
}

impl Action {
    /// Human-readable description for the help screen.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Quit => "Quit application",
            Self::NavDown => "Next post",
            Self::NavUp => "Previous post",
            Self::PageDown => "Page down",
            Self::PageUp => "Page up",
            Self::JumpTop => "Jump to first post",
            Self::JumpBottom => "Jump to last loaded post",
            Self::Select => "Open post",
            Self::Back => "Back to list",
            Self::NextFilter => "Next category tab",
            Self::PrevFilter => "Previous category tab",
            Self::ClearFilter => "Show all categories",
            Self::Reload => "Reload from first page",
            Self::OpenInBrowser => "Open in browser",
            Self::ScrollDown => "Scroll down one line",
            Self::ScrollUp => "Scroll up one line",
            Self::CycleTheme => "Cycle theme",
            Self::ShowHelp => "Show help",
        }
    }
}

// ============================================================================
// Context Enum
// ============================================================================

/// Dispatch context — determines which bindings are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    Global,
    List,
    Detail,
}

impl Context {
    pub fn title(self) -> &'static str {
        match self {
            Self::Global => "Global",
            Self::List => "Post list",
            Self::Detail => "Post detail",
        }
    }
}

// ============================================================================
// Key Specification
// ============================================================================

/// A key event: code + modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeySpec {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeySpec {
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub const fn ch(c: char) -> Self {
        Self::plain(KeyCode::Char(c))
    }

    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    /// Drop SHIFT where the key code already encodes it.
    ///
    /// Terminals report `G` as `Char('G')` + SHIFT and Shift+Tab as `BackTab`
    /// + SHIFT; bindings are stored without the modifier.
    fn normalized(self) -> Self {
        match self.code {
            KeyCode::Char(_) | KeyCode::BackTab => Self {
                code: self.code,
                modifiers: self.modifiers.difference(KeyModifiers::SHIFT),
            },
            _ => self,
        }
    }
}

/// Parse a key string from config into a KeySpec.
///
/// Supported formats:
/// - Single char: "q", "j", "/"
/// - Named keys: "Enter", "Esc", "Tab", "BackTab", "Up", "Down", "PageUp", "Home"
/// - Modifier combos: "Ctrl+d", "Ctrl+u"
/// - Function keys: "F1" through "F12"
fn parse_key_string(s: &str) -> Option<KeySpec> {
    let s = s.trim();

    if let Some(rest) = s.strip_prefix("Ctrl+") {
        let mut chars = rest.trim().chars();
        let c = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        return Some(KeySpec::ctrl(c));
    }

    // Named keys (case-insensitive)
    let named = match s.to_lowercase().as_str() {
        "enter" | "return" => Some(KeyCode::Enter),
        "esc" | "escape" => Some(KeyCode::Esc),
        "tab" => Some(KeyCode::Tab),
        "backtab" | "shift+tab" => Some(KeyCode::BackTab),
        "up" => Some(KeyCode::Up),
        "down" => Some(KeyCode::Down),
        "left" => Some(KeyCode::Left),
        "right" => Some(KeyCode::Right),
        "pageup" => Some(KeyCode::PageUp),
        "pagedown" => Some(KeyCode::PageDown),
        "home" => Some(KeyCode::Home),
        "end" => Some(KeyCode::End),
        "backspace" => Some(KeyCode::Backspace),
        "space" => Some(KeyCode::Char(' ')),
        _ => None,
    };
    if let Some(code) = named {
        return Some(KeySpec::plain(code));
    }

    // Function keys
    if let Some(n) = s
        .strip_prefix(['F', 'f'])
        .and_then(|rest| rest.parse::<u8>().ok())
    {
        if (1..=12).contains(&n) {
            return Some(KeySpec::plain(KeyCode::F(n)));
        }
        return None;
    }

    let mut chars = s.chars();
    let c = chars.next()?;
    if chars.next().is_none() {
        return Some(KeySpec::ch(c));
    }

    None
}

/// Format a KeySpec as a human-readable string for the help screen.
fn format_key(key: &KeySpec) -> String {
    let modifier = if key.modifiers.contains(KeyModifiers::CONTROL) {
        "Ctrl+"
    } else {
        ""
    };

    let key_name = match key.code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::BackTab => "Shift+Tab".to_string(),
        KeyCode::Up => "Up".to_string(),
        KeyCode::Down => "Down".to_string(),
        KeyCode::Left => "Left".to_string(),
        KeyCode::Right => "Right".to_string(),
        KeyCode::PageUp => "PageUp".to_string(),
        KeyCode::PageDown => "PageDown".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        _ => "?".to_string(),
    };

    format!("{}{}", modifier, key_name)
}

// ============================================================================
// Keybinding Registry
// ============================================================================

/// Registry of keybindings, supporting default bindings and config overrides.
///
/// The same key can map to different actions in different contexts; lookups
/// fall back to [`Context::Global`].
#[derive(Debug, Clone)]
pub struct KeybindingRegistry {
    lookup: HashMap<(Context, KeySpec), Action>,
    /// All bindings in registration order, for the help screen
    bindings: Vec<(Context, KeySpec, Action)>,
}

impl KeybindingRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            lookup: HashMap::new(),
            bindings: Vec::new(),
        };
        registry.register_defaults();
        registry
    }

    fn bind(&mut self, context: Context, key: KeySpec, action: Action) {
        self.lookup.insert((context, key), action);
        self.bindings.push((context, key, action));
    }

    fn bind_all(&mut self, context: Context, keys: &[KeySpec], action: Action) {
        for key in keys {
            self.bind(context, *key, action);
        }
    }

    fn register_defaults(&mut self) {
        use Context::{Detail, Global, List};

        // === Global ===
        self.bind_all(Global, &[KeySpec::ch('q'), KeySpec::ctrl('c')], Action::Quit);
        self.bind(Global, KeySpec::ch('?'), Action::ShowHelp);
        self.bind(Global, KeySpec::ch('T'), Action::CycleTheme);
        self.bind(Global, KeySpec::ch('o'), Action::OpenInBrowser);
        self.bind(Global, KeySpec::ch('r'), Action::Reload);

        // === Post list ===
        self.bind_all(
            List,
            &[KeySpec::ch('j'), KeySpec::plain(KeyCode::Down)],
            Action::NavDown,
        );
        self.bind_all(
            List,
            &[KeySpec::ch('k'), KeySpec::plain(KeyCode::Up)],
            Action::NavUp,
        );
        self.bind_all(
            List,
            &[KeySpec::ctrl('d'), KeySpec::plain(KeyCode::PageDown)],
            Action::PageDown,
        );
        self.bind_all(
            List,
            &[KeySpec::ctrl('u'), KeySpec::plain(KeyCode::PageUp)],
            Action::PageUp,
        );
        self.bind_all(
            List,
            &[KeySpec::ch('g'), KeySpec::plain(KeyCode::Home)],
            Action::JumpTop,
        );
        self.bind_all(
            List,
            &[KeySpec::ch('G'), KeySpec::plain(KeyCode::End)],
            Action::JumpBottom,
        );
        self.bind(List, KeySpec::plain(KeyCode::Enter), Action::Select);
        self.bind_all(
            List,
            &[
                KeySpec::plain(KeyCode::Tab),
                KeySpec::ch('l'),
                KeySpec::plain(KeyCode::Right),
            ],
            Action::NextFilter,
        );
        self.bind_all(
            List,
            &[
                KeySpec::plain(KeyCode::BackTab),
                KeySpec::ch('h'),
                KeySpec::plain(KeyCode::Left),
            ],
            Action::PrevFilter,
        );
        self.bind_all(
            List,
            &[KeySpec::ch('0'), KeySpec::plain(KeyCode::Esc)],
            Action::ClearFilter,
        );

        // === Post detail ===
        self.bind_all(
            Detail,
            &[KeySpec::ch('j'), KeySpec::plain(KeyCode::Down)],
            Action::ScrollDown,
        );
        self.bind_all(
            Detail,
            &[KeySpec::ch('k'), KeySpec::plain(KeyCode::Up)],
            Action::ScrollUp,
        );
        self.bind_all(
            Detail,
            &[
                KeySpec::ctrl('d'),
                KeySpec::plain(KeyCode::PageDown),
                KeySpec::ch(' '),
            ],
            Action::PageDown,
        );
        self.bind_all(
            Detail,
            &[KeySpec::ctrl('u'), KeySpec::plain(KeyCode::PageUp)],
            Action::PageUp,
        );
        self.bind_all(
            Detail,
            &[
                KeySpec::plain(KeyCode::Esc),
                KeySpec::ch('b'),
                KeySpec::plain(KeyCode::Backspace),
            ],
            Action::Back,
        );
    }

    /// Apply user overrides from config keybindings map.
    ///
    /// Keys in the map are action names (e.g., "quit", "nav_down").
    /// Values are key strings (e.g., "q", "Ctrl+d", "F5"). Every context the
    /// action was bound in gets the new key instead of all its old ones.
    ///
    /// Returns a list of warnings for unrecognized action names or unparseable keys.
    pub fn apply_overrides(&mut self, overrides: &HashMap<String, String>) -> Vec<String> {
        let mut warnings = Vec::new();

        // Sorted for deterministic results when two overrides collide
        let mut entries: Vec<_> = overrides.iter().collect();
        entries.sort();

        for (action_name, key_str) in entries {
            let Some(action) = parse_action_name(action_name) else {
                warnings.push(format!("Unknown action '{}', ignoring", action_name));
                continue;
            };

            let Some(key) = parse_key_string(key_str) else {
                warnings.push(format!(
                    "Cannot parse key '{}' for action '{}', ignoring",
                    key_str, action_name
                ));
                continue;
            };

            let mut contexts: Vec<Context> = Vec::new();
            for (ctx, _, a) in &self.bindings {
                if *a == action && !contexts.contains(ctx) {
                    contexts.push(*ctx);
                }
            }

            self.lookup.retain(|_, a| *a != action);
            self.bindings.retain(|(_, _, a)| *a != action);

            for ctx in contexts {
                self.bind(ctx, key, action);
            }

            tracing::info!(
                action = %action_name,
                key = %key_str,
                "Applied keybinding override"
            );
        }

        warnings
    }

    /// Look up the action for a given key in a given context.
    ///
    /// Tries the specific context first, then falls back to Global.
    pub fn action_for_key(
        &self,
        code: KeyCode,
        modifiers: KeyModifiers,
        context: Context,
    ) -> Option<Action> {
        let key = KeySpec::new(code, modifiers).normalized();

        if let Some(&action) = self.lookup.get(&(context, key)) {
            return Some(action);
        }

        if context != Context::Global {
            if let Some(&action) = self.lookup.get(&(Context::Global, key)) {
                return Some(action);
            }
        }

        None
    }

    /// Get all bindings for the help screen.
    ///
    /// Returns (context, key_display_string, action, description) tuples.
    pub fn all_bindings(&self) -> Vec<(Context, String, Action, &'static str)> {
        self.bindings
            .iter()
            .map(|(ctx, key, action)| (*ctx, format_key(key), *action, action.describe()))
            .collect()
    }
}

impl Default for KeybindingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse an action name string (from config) into an Action enum.
fn parse_action_name(name: &str) -> Option<Action> {
    match name.to_lowercase().as_str() {
        "quit" => Some(Action::Quit),
        "nav_down" | "navdown" | "down" => Some(Action::NavDown),
        "nav_up" | "navup" | "up" => Some(Action::NavUp),
        "page_down" | "pagedown" => Some(Action::PageDown),
        "page_up" | "pageup" => Some(Action::PageUp),
        "jump_top" | "top" => Some(Action::JumpTop),
        "jump_bottom" | "bottom" => Some(Action::JumpBottom),
        "select" | "enter" | "open_post" => Some(Action::Select),
        "back" => Some(Action::Back),
        "next_filter" | "nextfilter" | "next_category" => Some(Action::NextFilter),
        "prev_filter" | "prevfilter" | "prev_category" => Some(Action::PrevFilter),
        "clear_filter" | "clearfilter" | "all" => Some(Action::ClearFilter),
        "reload" | "refresh" => Some(Action::Reload),
        "open_in_browser" | "openinbrowser" | "open" => Some(Action::OpenInBrowser),
        "scroll_down" | "scrolldown" => Some(Action::ScrollDown),
        "scroll_up" | "scrollup" => Some(Action::ScrollUp),
        "cycle_theme" | "cycletheme" | "theme" => Some(Action::CycleTheme),
        "show_help" | "showhelp" | "help" => Some(Action::ShowHelp),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================
