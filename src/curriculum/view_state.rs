use super::error::{EditError, EditResult};
use super::model::{Curriculum, EntityKind};
use std::collections::BTreeSet;

/// Which weeks are expanded in the editor. Keyed by week id so that deleting
/// a week never moves another week's expansion onto its neighbour.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpandedWeeks {
    ids: BTreeSet<String>,
}

impl ExpandedWeeks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle(&self, week_id: &str) -> Self {
        let mut ids = self.ids.clone();
        if !ids.remove(week_id) {
            ids.insert(week_id.to_string());
        }
        Self { ids }
    }

    /// Toggles the week currently rendered at `week_index`.
    pub fn toggle_index(&self, c: &Curriculum, week_index: usize) -> EditResult<Self> {
        let week = c
            .week(week_index)
            .ok_or_else(|| EditError::invalid_path(EntityKind::Week, &[week_index]))?;
        Ok(self.toggle(&week.id))
    }

    pub fn is_expanded(&self, week_id: &str) -> bool {
        self.ids.contains(week_id)
    }

    /// Positions of the expanded weeks in `c`, ascending.
    pub fn expanded_indices(&self, c: &Curriculum) -> Vec<usize> {
        c.weeks()
            .iter()
            .enumerate()
            .filter(|(_, w)| self.ids.contains(&w.id))
            .map(|(i, _)| i)
            .collect()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    /// Drops ids of weeks that no longer exist in `c`.
    pub fn prune(&self, c: &Curriculum) -> Self {
        let live: BTreeSet<&str> = c.weeks().iter().map(|w| w.id.as_str()).collect();
        Self {
            ids: self
                .ids
                .iter()
                .filter(|id| live.contains(id.as_str()))
                .cloned()
                .collect(),
        }
    }
}
