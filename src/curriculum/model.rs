use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// The six kinds of node a curriculum tree is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Week,
    Section,
    Lesson,
    Quiz,
    Assignment,
    Resource,
}

impl EntityKind {
    pub fn id_prefix(self) -> &'static str {
        match self {
            EntityKind::Week => "week",
            EntityKind::Section => "section",
            EntityKind::Lesson => "lesson",
            EntityKind::Quiz => "quiz",
            EntityKind::Assignment => "assignment",
            EntityKind::Resource => "resource",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id_prefix())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Pdf,
    Video,
    Audio,
    Image,
    Document,
    Link,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 6] = [
        ResourceKind::Pdf,
        ResourceKind::Video,
        ResourceKind::Audio,
        ResourceKind::Image,
        ResourceKind::Document,
        ResourceKind::Link,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Pdf => "pdf",
            ResourceKind::Video => "video",
            ResourceKind::Audio => "audio",
            ResourceKind::Image => "image",
            ResourceKind::Document => "document",
            ResourceKind::Link => "link",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let lowered = raw.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|k| k.as_str() == lowered)
    }
}

/// Ordered sequence of weeks. Nodes are shared between successive snapshots;
/// a mutation rebuilds only the chain of ancestors above the changed node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Curriculum {
    weeks: Vec<Arc<Week>>,
}

impl Curriculum {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_weeks(weeks: Vec<Arc<Week>>) -> Self {
        Self { weeks }
    }

    pub fn weeks(&self) -> &[Arc<Week>] {
        &self.weeks
    }

    pub fn week(&self, index: usize) -> Option<&Arc<Week>> {
        self.weeks.get(index)
    }

    pub fn len(&self) -> usize {
        self.weeks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weeks.is_empty()
    }

    /// Every id in the tree, depth first, including lesson and assignment
    /// attachments.
    pub fn ids(&self) -> Vec<&str> {
        let mut out = Vec::new();
        for week in &self.weeks {
            out.push(week.id.as_str());
            for section in &week.sections {
                out.push(section.id.as_str());
                for lesson in &section.lessons {
                    out.push(lesson.id.as_str());
                    out.extend(lesson.resources.iter().map(|r| r.id.as_str()));
                }
                for assignment in &section.assignments {
                    out.push(assignment.id.as_str());
                    out.extend(assignment.resources.iter().map(|r| r.id.as_str()));
                }
                out.extend(section.quizzes.iter().map(|q| q.id.as_str()));
                out.extend(section.resources.iter().map(|r| r.id.as_str()));
            }
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Week {
    pub id: String,
    pub week_title: String,
    #[serde(default)]
    pub week_description: String,
    #[serde(default)]
    pub sections: Vec<Arc<Section>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub order: u32,
    #[serde(default)]
    pub lessons: Vec<Arc<Lesson>>,
    #[serde(default)]
    pub assignments: Vec<Arc<Assignment>>,
    #[serde(default)]
    pub quizzes: Vec<Arc<Quiz>>,
    #[serde(default)]
    pub resources: Vec<Arc<Resource>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: String,
    /// Minutes.
    #[serde(default)]
    pub duration: u32,
    #[serde(default)]
    pub order: u32,
    #[serde(default)]
    pub video_url: String,
    #[serde(default)]
    pub resources: Vec<Resource>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Minutes.
    pub duration: u32,
    /// Question bodies are authored elsewhere and kept verbatim.
    #[serde(default)]
    pub questions: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    pub max_score: u32,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub resources: Vec<Resource>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub size_mb: Option<f64>,
    #[serde(default)]
    pub pages: Option<u32>,
    pub upload_date: DateTime<Utc>,
}
