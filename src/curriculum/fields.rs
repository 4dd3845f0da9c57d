//! Single-field updates, parsed from the wire spelling of a field name and a
//! JSON value. Parsing is where local validation happens: a field that parses
//! is always safe to apply.

use super::error::{EditError, EditResult};
use super::model::{Assignment, Lesson, Quiz, Resource, ResourceKind, Section, Week};
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value as JsonValue;

const FROZEN_FIELDS: [&str; 3] = ["id", "order", "upload_date"];

fn unknown(name: &str) -> EditError {
    if FROZEN_FIELDS.contains(&name) {
        EditError::validation(name, "cannot be updated")
    } else {
        EditError::validation(name, "is not a known field")
    }
}

fn text(name: &str, v: &JsonValue) -> EditResult<String> {
    match v {
        JsonValue::Null => Ok(String::new()),
        JsonValue::String(s) => Ok(s.clone()),
        _ => Err(EditError::validation(name, "must be string")),
    }
}

fn title(name: &str, v: &JsonValue) -> EditResult<String> {
    let Some(s) = v.as_str() else {
        return Err(EditError::validation(name, "must be string"));
    };
    let s = s.trim();
    if s.is_empty() {
        return Err(EditError::validation(name, "must not be empty"));
    }
    Ok(s.to_string())
}

fn non_negative(name: &str, v: &JsonValue) -> EditResult<u32> {
    if let Some(n) = v.as_i64() {
        if n < 0 {
            return Err(EditError::validation(name, "must be >= 0"));
        }
        return u32::try_from(n).map_err(|_| EditError::validation(name, "is too large"));
    }
    Err(EditError::validation(name, "must be integer"))
}

fn opt_non_negative(name: &str, v: &JsonValue) -> EditResult<Option<u32>> {
    if v.is_null() {
        return Ok(None);
    }
    non_negative(name, v).map(Some)
}

fn opt_size(name: &str, v: &JsonValue) -> EditResult<Option<f64>> {
    if v.is_null() {
        return Ok(None);
    }
    match v.as_f64() {
        Some(n) if n >= 0.0 && n.is_finite() => Ok(Some(n)),
        Some(_) => Err(EditError::validation(name, "must be >= 0")),
        None => Err(EditError::validation(name, "must be number or null")),
    }
}

/// Accepts RFC 3339 timestamps or bare `YYYY-MM-DD` dates (midnight UTC).
pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn opt_timestamp(name: &str, v: &JsonValue) -> EditResult<Option<DateTime<Utc>>> {
    match v {
        JsonValue::Null => Ok(None),
        JsonValue::String(s) if s.trim().is_empty() => Ok(None),
        JsonValue::String(s) => parse_timestamp(s)
            .map(Some)
            .ok_or_else(|| EditError::validation(name, "must be an ISO date or timestamp")),
        _ => Err(EditError::validation(name, "must be string or null")),
    }
}

fn attachments(name: &str, v: &JsonValue) -> EditResult<Vec<Resource>> {
    if v.is_null() {
        return Ok(Vec::new());
    }
    serde_json::from_value(v.clone())
        .map_err(|e| EditError::validation(name, format!("must be a list of resources ({})", e)))
}

#[derive(Debug, Clone, PartialEq)]
pub enum WeekField {
    Title(String),
    Description(String),
}

impl WeekField {
    pub fn parse(name: &str, value: &JsonValue) -> EditResult<Self> {
        match name {
            "weekTitle" => Ok(Self::Title(title(name, value)?)),
            "weekDescription" => Ok(Self::Description(text(name, value)?)),
            _ => Err(unknown(name)),
        }
    }

    pub fn apply(self, week: &mut Week) {
        match self {
            Self::Title(v) => week.week_title = v,
            Self::Description(v) => week.week_description = v,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SectionField {
    Title(String),
    Description(String),
}

impl SectionField {
    pub fn parse(name: &str, value: &JsonValue) -> EditResult<Self> {
        match name {
            "title" => Ok(Self::Title(title(name, value)?)),
            "description" => Ok(Self::Description(text(name, value)?)),
            _ => Err(unknown(name)),
        }
    }

    pub fn apply(self, section: &mut Section) {
        match self {
            Self::Title(v) => section.title = v,
            Self::Description(v) => section.description = v,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LessonField {
    Title(String),
    Description(String),
    Content(String),
    Duration(u32),
    VideoUrl(String),
    Resources(Vec<Resource>),
}

impl LessonField {
    pub fn parse(name: &str, value: &JsonValue) -> EditResult<Self> {
        match name {
            "title" => Ok(Self::Title(title(name, value)?)),
            "description" => Ok(Self::Description(text(name, value)?)),
            "content" => Ok(Self::Content(text(name, value)?)),
            "duration" => Ok(Self::Duration(non_negative(name, value)?)),
            "videoUrl" => Ok(Self::VideoUrl(text(name, value)?.trim().to_string())),
            "resources" => Ok(Self::Resources(attachments(name, value)?)),
            _ => Err(unknown(name)),
        }
    }

    pub fn apply(self, lesson: &mut Lesson) {
        match self {
            Self::Title(v) => lesson.title = v,
            Self::Description(v) => lesson.description = v,
            Self::Content(v) => lesson.content = v,
            Self::Duration(v) => lesson.duration = v,
            Self::VideoUrl(v) => lesson.video_url = v,
            Self::Resources(v) => lesson.resources = v,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum QuizField {
    Title(String),
    Description(String),
    Duration(u32),
    Questions(Vec<JsonValue>),
}

impl QuizField {
    pub fn parse(name: &str, value: &JsonValue) -> EditResult<Self> {
        match name {
            "title" => Ok(Self::Title(title(name, value)?)),
            "description" => Ok(Self::Description(text(name, value)?)),
            "duration" => Ok(Self::Duration(non_negative(name, value)?)),
            "questions" => match value {
                JsonValue::Array(items) => Ok(Self::Questions(items.clone())),
                JsonValue::Null => Ok(Self::Questions(Vec::new())),
                _ => Err(EditError::validation(name, "must be array")),
            },
            _ => Err(unknown(name)),
        }
    }

    pub fn apply(self, quiz: &mut Quiz) {
        match self {
            Self::Title(v) => quiz.title = v,
            Self::Description(v) => quiz.description = v,
            Self::Duration(v) => quiz.duration = v,
            Self::Questions(v) => quiz.questions = v,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AssignmentField {
    Title(String),
    Description(String),
    DueDate(Option<DateTime<Utc>>),
    MaxScore(u32),
    Instructions(String),
    Resources(Vec<Resource>),
}

impl AssignmentField {
    pub fn parse(name: &str, value: &JsonValue) -> EditResult<Self> {
        match name {
            "title" => Ok(Self::Title(title(name, value)?)),
            "description" => Ok(Self::Description(text(name, value)?)),
            "dueDate" => Ok(Self::DueDate(opt_timestamp(name, value)?)),
            "maxScore" => Ok(Self::MaxScore(non_negative(name, value)?)),
            "instructions" => Ok(Self::Instructions(text(name, value)?)),
            "resources" => Ok(Self::Resources(attachments(name, value)?)),
            _ => Err(unknown(name)),
        }
    }

    pub fn apply(self, assignment: &mut Assignment) {
        match self {
            Self::Title(v) => assignment.title = v,
            Self::Description(v) => assignment.description = v,
            Self::DueDate(v) => assignment.due_date = v,
            Self::MaxScore(v) => assignment.max_score = v,
            Self::Instructions(v) => assignment.instructions = v,
            Self::Resources(v) => assignment.resources = v,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResourceField {
    Title(String),
    Kind(ResourceKind),
    Url(String),
    Description(String),
    SizeMb(Option<f64>),
    Pages(Option<u32>),
}

impl ResourceField {
    pub fn parse(name: &str, value: &JsonValue) -> EditResult<Self> {
        match name {
            "title" => Ok(Self::Title(title(name, value)?)),
            "type" => value
                .as_str()
                .and_then(ResourceKind::parse)
                .map(Self::Kind)
                .ok_or_else(|| EditError::validation(name, "is not a known resource type")),
            "url" => Ok(Self::Url(text(name, value)?.trim().to_string())),
            "description" => Ok(Self::Description(text(name, value)?)),
            "size_mb" => Ok(Self::SizeMb(opt_size(name, value)?)),
            "pages" => Ok(Self::Pages(opt_non_negative(name, value)?)),
            _ => Err(unknown(name)),
        }
    }

    pub fn apply(self, resource: &mut Resource) {
        match self {
            Self::Title(v) => resource.title = v,
            Self::Kind(v) => resource.kind = v,
            Self::Url(v) => resource.url = v,
            Self::Description(v) => resource.description = v,
            Self::SizeMb(v) => resource.size_mb = v,
            Self::Pages(v) => resource.pages = v,
        }
    }
}
