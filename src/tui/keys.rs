use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Key binding configuration
#[derive(Debug, Clone)]
pub struct KeyBinding {
    pub keys: Vec<(KeyCode, KeyModifiers)>,
    pub label: String,
    pub description: String,
}

impl KeyBinding {
    pub fn new(keys: &[(KeyCode, KeyModifiers)], label: &str, description: &str) -> Self {
        Self {
            keys: keys.to_vec(),
            label: label.to_string(),
            description: description.to_string(),
        }
    }

    pub fn matches(&self, event: &KeyEvent) -> bool {
        self.keys
            .iter()
            .any(|(code, modifiers)| *code == event.code && *modifiers == event.modifiers)
    }
}

/// Application key mappings
#[derive(Debug, Clone)]
pub struct KeyMap {
    /// Quit application
    pub quit: KeyBinding,

    /// Show help
    pub help: KeyBinding,

    /// Reload the catalogue
    pub reload: KeyBinding,
}

impl Default for KeyMap {
    fn default() -> Self {
        Self {
            quit: KeyBinding::new(
                &[
                    (KeyCode::Char('c'), KeyModifiers::CONTROL),
                    (KeyCode::Char('q'), KeyModifiers::NONE),
                ],
                "q / Ctrl+C",
                "Quit application",
            ),
            help: KeyBinding::new(
                &[
                    (KeyCode::Char('g'), KeyModifiers::CONTROL),
                    (KeyCode::Char('?'), KeyModifiers::NONE),
                    (KeyCode::Char('?'), KeyModifiers::SHIFT),
                ],
                "? / Ctrl+G",
                "Show/hide help",
            ),
            reload: KeyBinding::new(
                &[(KeyCode::Char('r'), KeyModifiers::CONTROL)],
                "Ctrl+R",
                "Reload track catalogue",
            ),
        }
    }
}

impl KeyMap {
    /// Check if the event should quit the application
    pub fn should_quit(&self, event: &KeyEvent) -> bool {
        self.quit.matches(event)
    }

    /// Check if the event should show help
    pub fn should_show_help(&self, event: &KeyEvent) -> bool {
        self.help.matches(event)
    }

    pub fn should_reload(&self, event: &KeyEvent) -> bool {
        self.reload.matches(event)
    }

    /// Get help text for all key bindings, list bindings appended
    pub fn help_text(&self, list_help: &[(&str, &str)]) -> String {
        let mut lines: Vec<String> = [&self.quit, &self.help, &self.reload]
            .iter()
            .map(|binding| format!("{:<14} {}", binding.label, binding.description))
            .collect();
        lines.extend(
            list_help
                .iter()
                .map(|(keys, description)| format!("{:<14} {}", keys, description)),
        );
        lines.join("\n")
    }
}
