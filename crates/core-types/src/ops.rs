//! The operation model: discrete UI steps the executor can perform.
//!
//! Operations are side-effect descriptions, not closures; everything needed
//! to execute one is carried in its fields.

use serde::{Deserialize, Serialize};

use crate::geom::RelativePosition;

/// Default scroll distance in pixels when the plan does not specify one.
pub const DEFAULT_SCROLL_AMOUNT: i32 = 300;

/// Default wait duration in milliseconds when the plan does not specify one.
pub const DEFAULT_WAIT_MS: u64 = 500;

/// Where an operation should act.
///
/// A target may carry a CSS selector, a viewport-relative position, or a
/// visible-text label. The label form is late-bound: it is resolved to a
/// concrete element immediately before the operation executes, because the
/// element may only exist after a preceding step revealed it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Target {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<RelativePosition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Target {
    pub fn selector(selector: impl Into<String>) -> Self {
        Self {
            selector: Some(selector.into()),
            ..Self::default()
        }
    }

    pub fn label(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::default()
        }
    }

    pub fn position(position: RelativePosition) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.selector.is_none() && self.position.is_none() && self.label.is_none()
    }
}

/// Scroll direction for scroll operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollDirection {
    Up,
    Down,
    Left,
    Right,
}

impl ScrollDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScrollDirection::Up => "up",
            ScrollDirection::Down => "down",
            ScrollDirection::Left => "left",
            ScrollDirection::Right => "right",
        }
    }
}

/// One concrete UI step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    Click {
        target: Target,
    },
    Type {
        target: Target,
        text: String,
    },
    Press {
        key: String,
    },
    Scroll {
        direction: ScrollDirection,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        amount: Option<i32>,
    },
    Hover {
        target: Target,
    },
    Wait {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        duration_ms: Option<u64>,
    },
}

impl Operation {
    /// The target this operation acts on, if it has one.
    pub fn target(&self) -> Option<&Target> {
        match self {
            Operation::Click { target }
            | Operation::Type { target, .. }
            | Operation::Hover { target } => Some(target),
            _ => None,
        }
    }

    pub fn target_mut(&mut self) -> Option<&mut Target> {
        match self {
            Operation::Click { target }
            | Operation::Type { target, .. }
            | Operation::Hover { target } => Some(target),
            _ => None,
        }
    }

    pub fn is_wait(&self) -> bool {
        matches!(self, Operation::Wait { .. })
    }

    /// Short human-readable description, used in step results, playbook
    /// summaries and auto-generated playbook names.
    pub fn describe(&self) -> String {
        match self {
            Operation::Click { target } => format!("click {}", describe_target(target)),
            Operation::Type { text, .. } => format!("type \"{}\"", truncate(text, 20)),
            Operation::Press { key } => format!("press {}", key),
            Operation::Scroll { direction, amount } => match amount {
                Some(px) => format!("scroll {} {}px", direction.as_str(), px),
                None => format!("scroll {}", direction.as_str()),
            },
            Operation::Hover { target } => format!("hover {}", describe_target(target)),
            Operation::Wait { duration_ms } => {
                format!("wait {}ms", duration_ms.unwrap_or(DEFAULT_WAIT_MS))
            }
        }
    }
}

fn describe_target(target: &Target) -> String {
    if let Some(selector) = &target.selector {
        return truncate(selector, 40);
    }
    if let Some(label) = &target.label {
        return format!("\"{}\"", truncate(label, 30));
    }
    if let Some(pos) = &target.position {
        return format!("at {:.0}%,{:.0}%", pos.rel_x * 100.0, pos.rel_y * 100.0);
    }
    "<no target>".to_string()
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{}…", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_covers_all_variants() {
        assert_eq!(
            Operation::Click {
                target: Target::selector("#search")
            }
            .describe(),
            "click #search"
        );
        assert_eq!(
            Operation::Type {
                target: Target::selector("#q"),
                text: "cats".into()
            }
            .describe(),
            "type \"cats\""
        );
        assert_eq!(Operation::Press { key: "Enter".into() }.describe(), "press Enter");
        assert_eq!(
            Operation::Scroll {
                direction: ScrollDirection::Down,
                amount: None
            }
            .describe(),
            "scroll down"
        );
        assert_eq!(Operation::Wait { duration_ms: None }.describe(), "wait 500ms");
    }

    #[test]
    fn operation_wire_shape_is_tagged() {
        let op = Operation::Click {
            target: Target::selector("#a"),
        };
        let json = serde_json::to_string(&op).unwrap();
        assert!(json.contains("\"op\":\"click\""));

        let parsed: Operation = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, op);
    }

    #[test]
    fn long_text_is_truncated_in_descriptions() {
        let op = Operation::Type {
            target: Target::selector("#q"),
            text: "a very long query that keeps going and going".into(),
        };
        let desc = op.describe();
        assert!(desc.len() < 40, "description too long: {}", desc);
    }
}
