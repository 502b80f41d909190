use std::collections::HashMap;
use std::fmt;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::warn;

use crate::settings::KeybindingsConfig;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum KeyContext {
    Global,
    List,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum KeyAction {
    ForceQuit,
    CycleFocus,
    Quit,
    ToggleHelp,
    FocusNewTask,
    FocusSearch,
    SelectUp,
    SelectDown,
    ToggleDone,
    EditTask,
    DeleteTask,
    MoveTaskUp,
    MoveTaskDown,
    FilterAll,
    FilterCompleted,
    FilterUncompleted,
    CycleFilter,
    ClearSearch,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    fn matches(&self, key: KeyEvent) -> bool {
        match (&self.code, key.code) {
            (KeyCode::Char(left), KeyCode::Char(right)) => {
                let left = normalize_char(*left, self.modifiers);
                let right = normalize_char(right, key.modifiers);
                if left != right {
                    return false;
                }
                normalize_modifiers(self.modifiers) == normalize_modifiers(key.modifiers)
            }
            _ => self.code == key.code && self.modifiers == key.modifiers,
        }
    }
}

impl fmt::Display for KeyBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = Vec::new();
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            parts.push("Ctrl".to_string());
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            parts.push("Alt".to_string());
        }
        if self.modifiers.contains(KeyModifiers::SHIFT) {
            parts.push("Shift".to_string());
        }

        parts.push(match self.code {
            KeyCode::Enter => "Enter".to_string(),
            KeyCode::Esc => "Esc".to_string(),
            KeyCode::Tab => "Tab".to_string(),
            KeyCode::BackTab => "BackTab".to_string(),
            KeyCode::Backspace => "Backspace".to_string(),
            KeyCode::Left => "Left".to_string(),
            KeyCode::Right => "Right".to_string(),
            KeyCode::Up => "Up".to_string(),
            KeyCode::Down => "Down".to_string(),
            KeyCode::Home => "Home".to_string(),
            KeyCode::End => "End".to_string(),
            KeyCode::Delete => "Delete".to_string(),
            KeyCode::F(n) => format!("F{n}"),
            KeyCode::Char(' ') => "Space".to_string(),
            KeyCode::Char(ch) => ch.to_string(),
            _ => "Unknown".to_string(),
        });

        write!(f, "{}", parts.join("+"))
    }
}

#[derive(Debug, Clone)]
pub struct ActionBinding {
    pub id: &'static str,
    pub action: KeyAction,
    pub description: &'static str,
    pub bindings: Vec<KeyBinding>,
}

#[derive(Debug, Clone)]
pub struct Keybindings {
    global: Vec<ActionBinding>,
    list: Vec<ActionBinding>,
}

struct ActionDef {
    id: &'static str,
    action: KeyAction,
    description: &'static str,
    defaults: &'static [&'static str],
}

const GLOBAL_DEFS: &[ActionDef] = &[
    ActionDef {
        id: "force_quit",
        action: KeyAction::ForceQuit,
        description: "quit from anywhere",
        defaults: &["Ctrl+C"],
    },
    ActionDef {
        id: "cycle_focus",
        action: KeyAction::CycleFocus,
        description: "move focus between input, search and list",
        defaults: &["Tab"],
    },
];

const LIST_DEFS: &[ActionDef] = &[
    ActionDef {
        id: "quit",
        action: KeyAction::Quit,
        description: "quit",
        defaults: &["q"],
    },
    ActionDef {
        id: "toggle_help",
        action: KeyAction::ToggleHelp,
        description: "toggle help",
        defaults: &["?"],
    },
    ActionDef {
        id: "new_task",
        action: KeyAction::FocusNewTask,
        description: "type a new task",
        defaults: &["a", "n"],
    },
    ActionDef {
        id: "search",
        action: KeyAction::FocusSearch,
        description: "search tasks",
        defaults: &["/"],
    },
    ActionDef {
        id: "select_up",
        action: KeyAction::SelectUp,
        description: "select previous task",
        defaults: &["k", "Up"],
    },
    ActionDef {
        id: "select_down",
        action: KeyAction::SelectDown,
        description: "select next task",
        defaults: &["j", "Down"],
    },
    ActionDef {
        id: "toggle",
        action: KeyAction::ToggleDone,
        description: "mark done / not done",
        defaults: &["Space", "x"],
    },
    ActionDef {
        id: "edit",
        action: KeyAction::EditTask,
        description: "edit title",
        defaults: &["e", "Enter"],
    },
    ActionDef {
        id: "delete",
        action: KeyAction::DeleteTask,
        description: "delete task",
        defaults: &["d", "Delete"],
    },
    ActionDef {
        id: "move_up",
        action: KeyAction::MoveTaskUp,
        description: "move task up",
        defaults: &["K"],
    },
    ActionDef {
        id: "move_down",
        action: KeyAction::MoveTaskDown,
        description: "move task down",
        defaults: &["J"],
    },
    ActionDef {
        id: "filter_all",
        action: KeyAction::FilterAll,
        description: "show all tasks",
        defaults: &["1"],
    },
    ActionDef {
        id: "filter_completed",
        action: KeyAction::FilterCompleted,
        description: "show completed tasks",
        defaults: &["2"],
    },
    ActionDef {
        id: "filter_uncompleted",
        action: KeyAction::FilterUncompleted,
        description: "show uncompleted tasks",
        defaults: &["3"],
    },
    ActionDef {
        id: "cycle_filter",
        action: KeyAction::CycleFilter,
        description: "cycle status filter",
        defaults: &["f"],
    },
    ActionDef {
        id: "clear_search",
        action: KeyAction::ClearSearch,
        description: "clear search",
        defaults: &["Esc"],
    },
];

impl Default for Keybindings {
    fn default() -> Self {
        Self::from_config(&KeybindingsConfig::default())
    }
}

impl Keybindings {
    pub fn from_config(config: &KeybindingsConfig) -> Self {
        let keybindings = Self {
            global: build_section(KeyContext::Global, GLOBAL_DEFS, &config.global),
            list: build_section(KeyContext::List, LIST_DEFS, &config.list),
        };

        keybindings.warn_conflicts();
        keybindings
    }

    pub fn action_for_key(&self, context: KeyContext, key: KeyEvent) -> Option<KeyAction> {
        self.bindings_for(context)
            .iter()
            .find(|binding| {
                binding
                    .bindings
                    .iter()
                    .any(|candidate| candidate.matches(key))
            })
            .map(|binding| binding.action)
    }

    pub fn display_for(&self, context: KeyContext, action: KeyAction) -> Option<String> {
        self.bindings_for(context)
            .iter()
            .find(|binding| binding.action == action)
            .map(|binding| {
                binding
                    .bindings
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(" / ")
            })
    }

    pub fn help_lines(&self) -> Vec<String> {
        let mut lines = vec!["Keyboard shortcuts".to_string(), String::new()];
        for (heading, context) in [("Anywhere", KeyContext::Global), ("Task list", KeyContext::List)]
        {
            lines.push(heading.to_string());
            for binding in self.bindings_for(context) {
                lines.push(format!(
                    "  {}: {}",
                    self.display_for(context, binding.action)
                        .unwrap_or_else(|| "-".to_string()),
                    binding.description
                ));
            }
            lines.push(String::new());
        }
        lines.push("Mouse".to_string());
        lines.push("  drag a row by its handle to reorder".to_string());
        lines.push("  click [ ] / [edit] / [del] on a row".to_string());
        lines.push(String::new());
        lines.push("Inputs: Enter submits, Esc leaves, Tab moves on".to_string());
        lines
    }

    fn bindings_for(&self, context: KeyContext) -> &[ActionBinding] {
        match context {
            KeyContext::Global => &self.global,
            KeyContext::List => &self.list,
        }
    }

    fn warn_conflicts(&self) {
        for context in [KeyContext::Global, KeyContext::List] {
            let mut seen: HashMap<String, &'static str> = HashMap::new();
            for binding in self.bindings_for(context) {
                for key in &binding.bindings {
                    let key_name = key.to_string();
                    if let Some(first_action) = seen.get(&key_name) {
                        warn!(
                            "keybinding conflict in {:?}: '{}' used by '{}' and '{}' (first wins)",
                            context, key_name, first_action, binding.id
                        );
                    } else {
                        seen.insert(key_name, binding.id);
                    }
                }
            }
        }
    }
}

fn build_section(
    context: KeyContext,
    defs: &[ActionDef],
    overrides: &HashMap<String, Vec<String>>,
) -> Vec<ActionBinding> {
    let mut output = Vec::new();
    for def in defs {
        let source = overrides.get(def.id).cloned().unwrap_or_else(|| {
            def.defaults
                .iter()
                .map(|binding| binding.to_string())
                .collect()
        });

        let mut parsed = Vec::new();
        for raw in source {
            match parse_binding(&raw) {
                Some(binding) => parsed.push(binding),
                None => warn!(
                    "invalid keybinding '{}' for action '{}' in {:?}; ignoring",
                    raw, def.id, context
                ),
            }
        }

        if parsed.is_empty() {
            warn!(
                "no valid keybindings for action '{}' in {:?}; falling back to defaults",
                def.id, context
            );
            parsed = def
                .defaults
                .iter()
                .filter_map(|raw| parse_binding(raw))
                .collect();
        }

        output.push(ActionBinding {
            id: def.id,
            action: def.action,
            description: def.description,
            bindings: parsed,
        });
    }
    output
}

fn normalize_modifiers(mut modifiers: KeyModifiers) -> KeyModifiers {
    modifiers.remove(KeyModifiers::SHIFT);
    modifiers
}

fn normalize_char(ch: char, modifiers: KeyModifiers) -> char {
    if modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
        ch.to_ascii_lowercase()
    } else {
        ch
    }
}

fn parse_binding(raw: &str) -> Option<KeyBinding> {
    let mut modifiers = KeyModifiers::empty();
    let mut key: Option<&str> = None;

    for part in raw.split('+').map(str::trim).filter(|s| !s.is_empty()) {
        match part.to_ascii_lowercase().as_str() {
            "ctrl" | "control" => modifiers.insert(KeyModifiers::CONTROL),
            "alt" => modifiers.insert(KeyModifiers::ALT),
            "shift" => modifiers.insert(KeyModifiers::SHIFT),
            _ => {
                if key.is_some() {
                    return None;
                }
                key = Some(part);
            }
        }
    }

    let key = key?;
    let lower = key.to_ascii_lowercase();
    let code = match lower.as_str() {
        "enter" => KeyCode::Enter,
        "esc" | "escape" => KeyCode::Esc,
        "tab" => KeyCode::Tab,
        "backtab" => KeyCode::BackTab,
        "backspace" => KeyCode::Backspace,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "delete" | "del" => KeyCode::Delete,
        "space" => KeyCode::Char(' '),
        _ if lower.starts_with('f') && lower.len() > 1 && lower.len() <= 3 => {
            KeyCode::F(lower[1..].parse::<u8>().ok()?)
        }
        _ if key.chars().count() == 1 => {
            let ch = normalize_char(key.chars().next()?, modifiers);
            KeyCode::Char(ch)
        }
        _ => return None,
    };

    Some(KeyBinding { code, modifiers })
}
