//! Enumerations and field types for the task dashboard.
//!
//! Every closed value set the store accepts lives here. Strings coming from the
//! outside (command line, seed files, form pickers) are parsed through `FromStr`,
//! which rejects anything outside the enumeration.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::FieldError;

/// Task lifecycle status. Any status may move to any other.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Todo,
    InProgress,
    Done,
}

impl Status {
    /// Board column order.
    pub const ALL: [Status; 3] = [Status::Todo, Status::InProgress, Status::Done];

    /// Wire name, as used in seed files and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Todo => "todo",
            Status::InProgress => "in-progress",
            Status::Done => "done",
        }
    }

    /// Human label used for column headers and pickers.
    pub fn label(self) -> &'static str {
        match self {
            Status::Todo => "To Do",
            Status::InProgress => "In Progress",
            Status::Done => "Done",
        }
    }

    /// Position of this status in `Status::ALL`.
    pub fn column_index(self) -> usize {
        match self {
            Status::Todo => 0,
            Status::InProgress => 1,
            Status::Done => 2,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" => Ok(Status::Todo),
            "in-progress" => Ok(Status::InProgress),
            "done" => Ok(Status::Done),
            other => Err(FieldError::InvalidStatus(other.to_string())),
        }
    }
}

/// Task priority.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    /// Picker order, highest first.
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(FieldError::InvalidPriority(other.to_string())),
        }
    }
}

/// Presentation mode over the task collection.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ViewType {
    #[default]
    List,
    Board,
    Calendar,
}

impl ViewType {
    pub const ALL: [ViewType; 3] = [ViewType::List, ViewType::Board, ViewType::Calendar];

    pub fn as_str(self) -> &'static str {
        match self {
            ViewType::List => "list",
            ViewType::Board => "board",
            ViewType::Calendar => "calendar",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ViewType::List => "List",
            ViewType::Board => "Board",
            ViewType::Calendar => "Calendar",
        }
    }

    /// The view after this one, wrapping around.
    pub fn next(self) -> ViewType {
        match self {
            ViewType::List => ViewType::Board,
            ViewType::Board => ViewType::Calendar,
            ViewType::Calendar => ViewType::List,
        }
    }
}

impl fmt::Display for ViewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewType {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "list" => Ok(ViewType::List),
            "board" => Ok(ViewType::Board),
            "calendar" => Ok(ViewType::Calendar),
            other => Err(FieldError::InvalidView(other.to_string())),
        }
    }
}
