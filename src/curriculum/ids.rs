use super::model::EntityKind;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Source of fresh node ids. Ids carry the kind prefix, e.g. `week_<uuid>`.
pub trait IdGenerator {
    fn next_id(&mut self, kind: EntityKind) -> String;
}

#[derive(Debug, Default)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_id(&mut self, kind: EntityKind) -> String {
        format!("{}_{}", kind.id_prefix(), Uuid::new_v4())
    }
}

/// Deterministic ids (`week_1`, `section_2`, ...). One counter is shared by
/// all kinds so ids stay unique even if a prefix is ever reused.
#[derive(Debug, Default)]
pub struct SequentialIds {
    issued: u64,
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self, kind: EntityKind) -> String {
        self.issued += 1;
        format!("{}_{}", kind.id_prefix(), self.issued)
    }
}

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn uuid_ids_are_prefixed_and_distinct() {
        let mut ids = UuidIds;
        let a = ids.next_id(EntityKind::Week);
        let b = ids.next_id(EntityKind::Week);
        assert!(a.starts_with("week_"));
        assert_eq!(a.len(), "week_".len() + 36);
        assert_ne!(a, b);
    }

    #[test]
    fn sequential_ids_never_repeat_across_kinds() {
        let mut ids = SequentialIds::default();
        let issued: HashSet<String> = [
            EntityKind::Week,
            EntityKind::Section,
            EntityKind::Lesson,
            EntityKind::Week,
        ]
        .into_iter()
        .map(|k| ids.next_id(k))
        .collect();
        assert_eq!(issued.len(), 4);
        assert!(issued.contains("week_1"));
        assert!(issued.contains("week_4"));
    }
}
