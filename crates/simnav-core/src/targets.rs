//! The externally tracked target for pursuit guidance.
//!
//! The host decides what was picked (ray casts, UI); this only remembers it
//! and keeps its position current.

use crate::models::Point3;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedTarget {
    pub name: String,
    pub position: Point3,
}

/// Holds at most one selected target. Starts disabled.
#[derive(Debug, Clone, Default)]
pub struct TargetSelector {
    enabled: bool,
    selected: Option<TrackedTarget>,
}

impl TargetSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Disabling also drops the current selection.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled == enabled {
            return;
        }
        self.enabled = enabled;
        if !enabled {
            self.clear();
        }
    }

    /// Select a target. Ignored while disabled; returns whether it took.
    pub fn select(&mut self, name: impl Into<String>, position: Point3) -> bool {
        if !self.enabled {
            return false;
        }
        let name = name.into();
        tracing::info!(target_name = %name, "selected pursuit target");
        self.selected = Some(TrackedTarget { name, position });
        true
    }

    /// Move the selected target; no-op without a selection.
    pub fn update_position(&mut self, position: Point3) {
        if let Some(target) = self.selected.as_mut() {
            target.position = position;
        }
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&TrackedTarget> {
        self.selected.as_ref()
    }

    /// Position of the selected target, if any.
    pub fn position(&self) -> Option<Point3> {
        self.selected.as_ref().map(|target| target.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_requires_enabled() {
        let mut selector = TargetSelector::new();
        assert!(!selector.select("box", Point3::ZERO));
        assert!(selector.selected().is_none());

        selector.set_enabled(true);
        assert!(selector.select("box", Point3::new(1.0, 0.0, 0.0)));
        assert_eq!(selector.selected().map(|t| t.name.as_str()), Some("box"));
    }

    #[test]
    fn disabling_clears_selection() {
        let mut selector = TargetSelector::new();
        selector.set_enabled(true);
        selector.select("box", Point3::ZERO);
        selector.set_enabled(false);
        assert!(selector.position().is_none());
    }

    #[test]
    fn update_moves_selected_target() {
        let mut selector = TargetSelector::new();
        selector.update_position(Point3::new(9.0, 9.0, 9.0));
        assert!(selector.position().is_none());

        selector.set_enabled(true);
        selector.select("cart", Point3::ZERO);
        selector.update_position(Point3::new(2.0, 0.0, 1.0));
        assert_eq!(selector.position(), Some(Point3::new(2.0, 0.0, 1.0)));
    }
}
