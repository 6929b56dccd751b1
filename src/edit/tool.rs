//! Brush tools and per-frame pointer input.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::core::Rgba;

/// What the brush does to the cells under it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ToolKind {
    /// Raise (or lower, with negative strength) by a weighted amount
    #[default]
    Normal,
    /// Add weighted uniform noise in `[0, strength]`
    Noise,
    /// Add weighted uniform noise in `[-strength, strength]`
    Bumps,
    /// Blend towards the 3x3 neighborhood average
    Smooth,
    /// Blend the color map towards the brush color
    Paint,
}

impl ToolKind {
    pub const ALL: [ToolKind; 5] = [
        ToolKind::Normal,
        ToolKind::Noise,
        ToolKind::Bumps,
        ToolKind::Smooth,
        ToolKind::Paint,
    ];

    /// Whether the tool changes geometry (and therefore needs chunk rebuilds)
    pub fn edits_height(&self) -> bool {
        !matches!(self, ToolKind::Paint)
    }
}

/// User-selected brush parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrushSettings {
    pub tool: ToolKind,
    /// Brush radius in world units
    pub size: f32,
    /// Height change per second at the brush center
    pub strength: f32,
    pub color: Rgba,
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self {
            tool: ToolKind::Normal,
            size: 25.0,
            strength: 250.0,
            color: Rgba::WHITE,
        }
    }
}

/// Pointer state for one host frame, already projected onto the terrain.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BrushInput {
    pub world_position: Vec2,
    pub pressed: bool,
}

impl BrushInput {
    pub fn pressed_at(world_position: Vec2) -> Self {
        Self {
            world_position,
            pressed: true,
        }
    }

    pub fn released() -> Self {
        Self::default()
    }
}

/// Brush state machine
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EditState {
    #[default]
    Idle,
    Editing,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brush_defaults() {
        let brush = BrushSettings::default();
        assert_eq!(brush.tool, ToolKind::Normal);
        assert_eq!(brush.size, 25.0);
        assert_eq!(brush.strength, 250.0);
        assert_eq!(brush.color, Rgba::WHITE);
    }

    #[test]
    fn test_only_paint_leaves_geometry_alone() {
        let geometric: Vec<_> = ToolKind::ALL.iter().filter(|t| t.edits_height()).collect();
        assert_eq!(geometric.len(), 4);
        assert!(!ToolKind::Paint.edits_height());
    }

    #[test]
    fn test_brush_settings_json() {
        let brush: BrushSettings = serde_json::from_str(r#"{ "tool": "Smooth", "size": 4.0 }"#).unwrap();
        assert_eq!(brush.tool, ToolKind::Smooth);
        assert_eq!(brush.size, 4.0);
        assert_eq!(brush.strength, 250.0);
    }

    #[test]
    fn test_input_constructors() {
        let input = BrushInput::pressed_at(Vec2::new(1.0, 2.0));
        assert!(input.pressed);
        assert!(!BrushInput::released().pressed);
    }
}
