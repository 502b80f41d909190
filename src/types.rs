use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Creation timestamp in milliseconds since the Unix epoch, bumped past the
/// largest existing id when the clock has not moved.
pub type TaskId = i64;

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct Task {
    pub id: TaskId,
    #[serde(rename = "todo")]
    pub title: String,
    #[serde(rename = "completed")]
    pub done: bool,
}

impl Task {
    pub fn new(id: TaskId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            done: false,
        }
    }

    pub fn title_key(&self) -> String {
        title_key(&self.title)
    }

    pub fn has_title(&self, candidate: &str) -> bool {
        self.title_key() == title_key(candidate)
    }
}

/// Case-insensitive comparison key for titles.
pub fn title_key(title: &str) -> String {
    title.to_lowercase()
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Completed,
    Uncompleted,
}

impl StatusFilter {
    pub const ALL: [Self; 3] = [Self::All, Self::Completed, Self::Uncompleted];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Completed => "completed",
            Self::Uncompleted => "uncompleted",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Completed => "Completed",
            Self::Uncompleted => "Uncompleted",
        }
    }

    pub const fn next(self) -> Self {
        match self {
            Self::All => Self::Completed,
            Self::Completed => Self::Uncompleted,
            Self::Uncompleted => Self::All,
        }
    }

    pub fn matches(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Completed => task.done,
            Self::Uncompleted => !task.done,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "completed" | "done" => Ok(Self::Completed),
            "uncompleted" | "pending" | "open" => Ok(Self::Uncompleted),
            _ => Err(()),
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
