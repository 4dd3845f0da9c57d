use crate::curriculum::model::{EntityKind, ResourceKind};
use anyhow::Context;
use serde_json::{json, Map, Value as JsonValue};
use std::path::Path;

/// Defaults applied to newly created nodes.
#[derive(Clone, Debug, PartialEq)]
pub struct EditorDefaults {
    pub week_title_prefix: String,
    pub section_title_prefix: String,
    pub lesson_title_prefix: String,
    pub quiz_title_prefix: String,
    pub assignment_title_prefix: String,
    pub resource_title_prefix: String,
    pub quiz_duration_minutes: u32,
    pub assignment_max_score: u32,
    pub resource_kind: ResourceKind,
}

impl Default for EditorDefaults {
    fn default() -> Self {
        Self {
            week_title_prefix: "Week".to_string(),
            section_title_prefix: "Section".to_string(),
            lesson_title_prefix: "Lesson".to_string(),
            quiz_title_prefix: "Quiz".to_string(),
            assignment_title_prefix: "Assignment".to_string(),
            resource_title_prefix: "Resource".to_string(),
            quiz_duration_minutes: 30,
            assignment_max_score: 100,
            resource_kind: ResourceKind::Pdf,
        }
    }
}

const PREFIX_KEYS: [(&str, EntityKind); 6] = [
    ("weekTitlePrefix", EntityKind::Week),
    ("sectionTitlePrefix", EntityKind::Section),
    ("lessonTitlePrefix", EntityKind::Lesson),
    ("quizTitlePrefix", EntityKind::Quiz),
    ("assignmentTitlePrefix", EntityKind::Assignment),
    ("resourceTitlePrefix", EntityKind::Resource),
];

impl EditorDefaults {
    pub fn title_prefix(&self, kind: EntityKind) -> &str {
        match kind {
            EntityKind::Week => &self.week_title_prefix,
            EntityKind::Section => &self.section_title_prefix,
            EntityKind::Lesson => &self.lesson_title_prefix,
            EntityKind::Quiz => &self.quiz_title_prefix,
            EntityKind::Assignment => &self.assignment_title_prefix,
            EntityKind::Resource => &self.resource_title_prefix,
        }
    }

    fn title_prefix_mut(&mut self, kind: EntityKind) -> &mut String {
        match kind {
            EntityKind::Week => &mut self.week_title_prefix,
            EntityKind::Section => &mut self.section_title_prefix,
            EntityKind::Lesson => &mut self.lesson_title_prefix,
            EntityKind::Quiz => &mut self.quiz_title_prefix,
            EntityKind::Assignment => &mut self.assignment_title_prefix,
            EntityKind::Resource => &mut self.resource_title_prefix,
        }
    }

    /// Title for the node that will become the `sibling_count + 1`th of its kind.
    pub fn default_title(&self, kind: EntityKind, sibling_count: usize) -> String {
        format!("{} {}", self.title_prefix(kind), sibling_count + 1)
    }

    /// Lenient load: unusable values fall back to the built-in default.
    pub fn from_json(obj: &Map<String, JsonValue>) -> Self {
        let mut out = Self::default();
        for (key, kind) in PREFIX_KEYS {
            if let Some(prefix) = obj
                .get(key)
                .and_then(|v| v.as_str())
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
            {
                *out.title_prefix_mut(kind) = prefix;
            }
        }
        if let Some(v) = obj
            .get("quizDurationMinutes")
            .and_then(|v| v.as_u64())
            .and_then(|v| u32::try_from(v).ok())
            .filter(|v| *v > 0)
        {
            out.quiz_duration_minutes = v;
        }
        if let Some(v) = obj
            .get("assignmentMaxScore")
            .and_then(|v| v.as_u64())
            .and_then(|v| u32::try_from(v).ok())
            .filter(|v| *v > 0)
        {
            out.assignment_max_score = v;
        }
        if let Some(kind) = obj
            .get("resourceType")
            .and_then(|v| v.as_str())
            .and_then(ResourceKind::parse)
        {
            out.resource_kind = kind;
        }
        out
    }

    pub fn load_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read setup file {}", path.to_string_lossy()))?;
        let value: JsonValue = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse setup file {}", path.to_string_lossy()))?;
        let obj = value
            .as_object()
            .with_context(|| format!("setup file {} must hold an object", path.to_string_lossy()))?;
        Ok(Self::from_json(obj))
    }

    pub fn to_json(&self) -> JsonValue {
        json!({
            "weekTitlePrefix": self.week_title_prefix,
            "sectionTitlePrefix": self.section_title_prefix,
            "lessonTitlePrefix": self.lesson_title_prefix,
            "quizTitlePrefix": self.quiz_title_prefix,
            "assignmentTitlePrefix": self.assignment_title_prefix,
            "resourceTitlePrefix": self.resource_title_prefix,
            "quizDurationMinutes": self.quiz_duration_minutes,
            "assignmentMaxScore": self.assignment_max_score,
            "resourceType": self.resource_kind.as_str(),
        })
    }

    /// Strict patch: the first bad key rejects the whole patch and leaves
    /// `self` untouched.
    pub fn apply_patch(&mut self, patch: &Map<String, JsonValue>) -> Result<(), String> {
        let mut next = self.clone();
        for (k, v) in patch {
            if let Some((_, kind)) = PREFIX_KEYS.iter().find(|(key, _)| *key == k.as_str()) {
                let Some(s) = v.as_str() else {
                    return Err(format!("patch.{} must be string", k));
                };
                let s = s.trim();
                if s.is_empty() {
                    return Err(format!("patch.{} must not be empty", k));
                }
                *next.title_prefix_mut(*kind) = s.to_string();
                continue;
            }
            match k.as_str() {
                "quizDurationMinutes" => {
                    next.quiz_duration_minutes = positive_u32(v)
                        .ok_or_else(|| format!("patch.{} must be a positive integer", k))?;
                }
                "assignmentMaxScore" => {
                    next.assignment_max_score = positive_u32(v)
                        .ok_or_else(|| format!("patch.{} must be a positive integer", k))?;
                }
                "resourceType" => {
                    next.resource_kind = v
                        .as_str()
                        .and_then(ResourceKind::parse)
                        .ok_or_else(|| format!("patch.{} is not a known resource type", k))?;
                }
                _ => return Err(format!("unknown patch field: {}", k)),
            }
        }
        *self = next;
        Ok(())
    }
}

fn positive_u32(v: &JsonValue) -> Option<u32> {
    v.as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .filter(|n| *n > 0)
}
