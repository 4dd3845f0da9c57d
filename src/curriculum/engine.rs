//! Add/update/delete over the curriculum tree.
//!
//! Every operation borrows the current tree and returns a new one. Only the
//! ancestors of the changed node are rebuilt; every other node is shared with
//! the input by `Arc`. `Arc::make_mut` is only ever reached through a freshly
//! copied parent, so nodes reachable from the input are never written to.

use super::error::{EditError, EditResult};
use super::fields::{
    AssignmentField, LessonField, QuizField, ResourceField, SectionField, WeekField,
};
use super::ids::{Clock, IdGenerator};
use super::model::{
    Assignment, Curriculum, EntityKind, Lesson, Quiz, Resource, ResourceKind, Section, Week,
};
use crate::setup::EditorDefaults;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// Capabilities an edit may draw on: fresh ids, the current time and the
/// configured defaults for new nodes.
pub struct EditContext<'a> {
    pub ids: &'a mut dyn IdGenerator,
    pub clock: &'a dyn Clock,
    pub defaults: &'a EditorDefaults,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionPath {
    pub week: usize,
    pub section: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemPath {
    pub week: usize,
    pub section: usize,
    pub item: usize,
}

impl ItemPath {
    pub fn section_path(self) -> SectionPath {
        SectionPath {
            week: self.week,
            section: self.section,
        }
    }
}

/// Metadata for a file the upload collaborator has finished storing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UploadedFile {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<ResourceKind>,
    pub url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub size_mb: Option<f64>,
    #[serde(default)]
    pub pages: Option<u32>,
}

trait Ordered: Clone {
    fn order(&self) -> u32;
    fn set_order(&mut self, order: u32);
}

impl Ordered for Section {
    fn order(&self) -> u32 {
        self.order
    }
    fn set_order(&mut self, order: u32) {
        self.order = order;
    }
}

impl Ordered for Lesson {
    fn order(&self) -> u32 {
        self.order
    }
    fn set_order(&mut self, order: u32) {
        self.order = order;
    }
}

fn position(index: usize) -> u32 {
    u32::try_from(index).unwrap_or(u32::MAX)
}

/// Rewrites `order` to match position. Siblings already in place stay shared.
fn renumber<T: Ordered>(items: &mut [Arc<T>]) {
    for (i, slot) in items.iter_mut().enumerate() {
        let want = position(i);
        if slot.order() != want {
            Arc::make_mut(slot).set_order(want);
        }
    }
}

/// The four leaf sequences a section owns.
trait SectionChild: Clone {
    const KIND: EntityKind;

    fn children(section: &Section) -> &Vec<Arc<Self>>;
    fn children_mut(section: &mut Section) -> &mut Vec<Arc<Self>>;

    fn after_remove(_items: &mut [Arc<Self>]) {}
}

impl SectionChild for Lesson {
    const KIND: EntityKind = EntityKind::Lesson;

    fn children(section: &Section) -> &Vec<Arc<Self>> {
        &section.lessons
    }
    fn children_mut(section: &mut Section) -> &mut Vec<Arc<Self>> {
        &mut section.lessons
    }
    fn after_remove(items: &mut [Arc<Self>]) {
        renumber(items);
    }
}

impl SectionChild for Quiz {
    const KIND: EntityKind = EntityKind::Quiz;

    fn children(section: &Section) -> &Vec<Arc<Self>> {
        &section.quizzes
    }
    fn children_mut(section: &mut Section) -> &mut Vec<Arc<Self>> {
        &mut section.quizzes
    }
}

impl SectionChild for Assignment {
    const KIND: EntityKind = EntityKind::Assignment;

    fn children(section: &Section) -> &Vec<Arc<Self>> {
        &section.assignments
    }
    fn children_mut(section: &mut Section) -> &mut Vec<Arc<Self>> {
        &mut section.assignments
    }
}

impl SectionChild for Resource {
    const KIND: EntityKind = EntityKind::Resource;

    fn children(section: &Section) -> &Vec<Arc<Self>> {
        &section.resources
    }
    fn children_mut(section: &mut Section) -> &mut Vec<Arc<Self>> {
        &mut section.resources
    }
}

/// Draws ids until one is not already used anywhere in `c`. A host may load
/// a tree whose ids came from another generator. Callers draw only once the
/// target path has resolved, so a rejected add consumes no id.
fn fresh_id(c: &Curriculum, kind: EntityKind, ids: &mut dyn IdGenerator) -> String {
    let taken: HashSet<&str> = c.ids().into_iter().collect();
    loop {
        let id = ids.next_id(kind);
        if !taken.contains(id.as_str()) {
            return id;
        }
        debug!(%id, "generated id already in use");
    }
}

fn replace_week<F>(c: &Curriculum, week: usize, f: F) -> EditResult<Curriculum>
where
    F: FnOnce(&mut Week) -> EditResult<()>,
{
    if week >= c.len() {
        return Err(EditError::invalid_path(EntityKind::Week, &[week]));
    }
    let mut weeks = c.weeks().to_vec();
    f(Arc::make_mut(&mut weeks[week]))?;
    Ok(Curriculum::from_weeks(weeks))
}

fn replace_section<F>(c: &Curriculum, path: SectionPath, f: F) -> EditResult<Curriculum>
where
    F: FnOnce(&mut Section) -> EditResult<()>,
{
    replace_week(c, path.week, |week| {
        let slot = week.sections.get_mut(path.section).ok_or_else(|| {
            EditError::invalid_path(EntityKind::Section, &[path.week, path.section])
        })?;
        f(Arc::make_mut(slot))
    })
}

fn add_child<T, F>(c: &Curriculum, path: SectionPath, build: F) -> EditResult<Curriculum>
where
    T: SectionChild,
    F: FnOnce(usize) -> T,
{
    let next = replace_section(c, path, |section| {
        let count = T::children(section).len();
        T::children_mut(section).push(Arc::new(build(count)));
        Ok(())
    })?;
    debug!(week = path.week, section = path.section, kind = %T::KIND, "node appended");
    Ok(next)
}

fn update_child<T, F>(c: &Curriculum, path: ItemPath, f: F) -> EditResult<Curriculum>
where
    T: SectionChild,
    F: FnOnce(&mut T),
{
    let next = replace_section(c, path.section_path(), |section| {
        let slot = T::children_mut(section).get_mut(path.item).ok_or_else(|| {
            EditError::invalid_path(T::KIND, &[path.week, path.section, path.item])
        })?;
        f(Arc::make_mut(slot));
        Ok(())
    })?;
    debug!(
        week = path.week,
        section = path.section,
        item = path.item,
        kind = %T::KIND,
        "node updated"
    );
    Ok(next)
}

fn delete_child<T: SectionChild>(c: &Curriculum, path: ItemPath) -> EditResult<Curriculum> {
    let next = replace_section(c, path.section_path(), |section| {
        let items = T::children_mut(section);
        if path.item >= items.len() {
            return Err(EditError::invalid_path(
                T::KIND,
                &[path.week, path.section, path.item],
            ));
        }
        items.remove(path.item);
        T::after_remove(items);
        Ok(())
    })?;
    debug!(
        week = path.week,
        section = path.section,
        item = path.item,
        kind = %T::KIND,
        "node deleted"
    );
    Ok(next)
}

pub fn add_week(c: &Curriculum, ctx: &mut EditContext<'_>) -> Curriculum {
    let week = Week {
        id: fresh_id(c, EntityKind::Week, ctx.ids),
        week_title: ctx.defaults.default_title(EntityKind::Week, c.len()),
        week_description: String::new(),
        sections: Vec::new(),
    };
    debug!(week_id = %week.id, "week appended");
    let mut weeks = c.weeks().to_vec();
    weeks.push(Arc::new(week));
    Curriculum::from_weeks(weeks)
}

pub fn add_section(
    c: &Curriculum,
    week: usize,
    ctx: &mut EditContext<'_>,
) -> EditResult<Curriculum> {
    let next = replace_week(c, week, |w| {
        let count = w.sections.len();
        w.sections.push(Arc::new(Section {
            id: fresh_id(c, EntityKind::Section, ctx.ids),
            title: ctx.defaults.default_title(EntityKind::Section, count),
            description: String::new(),
            order: position(count),
            lessons: Vec::new(),
            assignments: Vec::new(),
            quizzes: Vec::new(),
            resources: Vec::new(),
        }));
        Ok(())
    })?;
    debug!(week, "section appended");
    Ok(next)
}

pub fn add_lesson(
    c: &Curriculum,
    path: SectionPath,
    ctx: &mut EditContext<'_>,
) -> EditResult<Curriculum> {
    add_child(c, path, |count| Lesson {
        id: fresh_id(c, EntityKind::Lesson, ctx.ids),
        title: ctx.defaults.default_title(EntityKind::Lesson, count),
        description: String::new(),
        content: String::new(),
        duration: 0,
        order: position(count),
        video_url: String::new(),
        resources: Vec::new(),
    })
}

pub fn add_quiz(
    c: &Curriculum,
    path: SectionPath,
    ctx: &mut EditContext<'_>,
) -> EditResult<Curriculum> {
    add_child(c, path, |count| Quiz {
        id: fresh_id(c, EntityKind::Quiz, ctx.ids),
        title: ctx.defaults.default_title(EntityKind::Quiz, count),
        description: String::new(),
        duration: ctx.defaults.quiz_duration_minutes,
        questions: Vec::new(),
    })
}

pub fn add_assignment(
    c: &Curriculum,
    path: SectionPath,
    ctx: &mut EditContext<'_>,
) -> EditResult<Curriculum> {
    add_child(c, path, |count| Assignment {
        id: fresh_id(c, EntityKind::Assignment, ctx.ids),
        title: ctx.defaults.default_title(EntityKind::Assignment, count),
        description: String::new(),
        due_date: None,
        max_score: ctx.defaults.assignment_max_score,
        instructions: String::new(),
        resources: Vec::new(),
    })
}

pub fn add_resource(
    c: &Curriculum,
    path: SectionPath,
    ctx: &mut EditContext<'_>,
) -> EditResult<Curriculum> {
    add_child(c, path, |count| Resource {
        id: fresh_id(c, EntityKind::Resource, ctx.ids),
        title: ctx.defaults.default_title(EntityKind::Resource, count),
        kind: ctx.defaults.resource_kind,
        url: String::new(),
        description: String::new(),
        size_mb: None,
        pages: None,
        upload_date: ctx.clock.now(),
    })
}

/// Appends a resource for a finished upload. A failed upload leaves the tree
/// as it was.
pub fn attach_uploaded_resource(
    c: &Curriculum,
    path: SectionPath,
    outcome: Result<UploadedFile, String>,
    ctx: &mut EditContext<'_>,
) -> EditResult<Curriculum> {
    let file = outcome.map_err(EditError::Upload)?;
    let url = file.url.trim().to_string();
    if url.is_empty() {
        return Err(EditError::Upload("upload returned no url".to_string()));
    }
    if file.size_mb.is_some_and(|s| !s.is_finite() || s < 0.0) {
        return Err(EditError::validation("size_mb", "must be >= 0"));
    }
    add_child(c, path, |count| Resource {
        id: fresh_id(c, EntityKind::Resource, ctx.ids),
        title: file
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| ctx.defaults.default_title(EntityKind::Resource, count)),
        kind: file.kind.unwrap_or(ctx.defaults.resource_kind),
        url,
        description: file.description,
        size_mb: file.size_mb,
        pages: file.pages,
        upload_date: ctx.clock.now(),
    })
}

pub fn update_week(c: &Curriculum, week: usize, field: WeekField) -> EditResult<Curriculum> {
    let next = replace_week(c, week, |w| {
        field.apply(w);
        Ok(())
    })?;
    debug!(week, "week updated");
    Ok(next)
}

pub fn update_section(
    c: &Curriculum,
    path: SectionPath,
    field: SectionField,
) -> EditResult<Curriculum> {
    let next = replace_section(c, path, |s| {
        field.apply(s);
        Ok(())
    })?;
    debug!(week = path.week, section = path.section, "section updated");
    Ok(next)
}

fn section_at(c: &Curriculum, path: SectionPath) -> Option<&Section> {
    c.week(path.week)?
        .sections
        .get(path.section)
        .map(|s| s.as_ref())
}

/// Attachment ids must be non-empty and unique across the whole tree. The
/// ids held by the attachments being replaced are free for reuse.
fn check_attachments(c: &Curriculum, current: &[Resource], next: &[Resource]) -> EditResult<()> {
    let mut taken: HashMap<&str, usize> = HashMap::new();
    for id in c.ids() {
        *taken.entry(id).or_default() += 1;
    }
    for r in current {
        if let Some(n) = taken.get_mut(r.id.as_str()) {
            *n = n.saturating_sub(1);
        }
    }
    let mut seen = HashSet::new();
    for r in next {
        if r.id.trim().is_empty() {
            return Err(EditError::validation("resources", "must not hold an empty id"));
        }
        let in_tree = taken.get(r.id.as_str()).is_some_and(|n| *n > 0);
        if in_tree || !seen.insert(r.id.as_str()) {
            return Err(EditError::validation(
                "resources",
                format!("holds duplicate id {}", r.id),
            ));
        }
    }
    Ok(())
}

pub fn update_lesson(c: &Curriculum, path: ItemPath, field: LessonField) -> EditResult<Curriculum> {
    if let LessonField::Resources(next) = &field {
        let current = section_at(c, path.section_path()).and_then(|s| s.lessons.get(path.item));
        if let Some(lesson) = current {
            check_attachments(c, &lesson.resources, next)?;
        }
    }
    update_child::<Lesson, _>(c, path, |l| field.apply(l))
}

pub fn update_quiz(c: &Curriculum, path: ItemPath, field: QuizField) -> EditResult<Curriculum> {
    update_child::<Quiz, _>(c, path, |q| field.apply(q))
}

pub fn update_assignment(
    c: &Curriculum,
    path: ItemPath,
    field: AssignmentField,
) -> EditResult<Curriculum> {
    if let AssignmentField::Resources(next) = &field {
        let current =
            section_at(c, path.section_path()).and_then(|s| s.assignments.get(path.item));
        if let Some(assignment) = current {
            check_attachments(c, &assignment.resources, next)?;
        }
    }
    update_child::<Assignment, _>(c, path, |a| field.apply(a))
}

pub fn update_resource(
    c: &Curriculum,
    path: ItemPath,
    field: ResourceField,
) -> EditResult<Curriculum> {
    update_child::<Resource, _>(c, path, |r| field.apply(r))
}

pub fn delete_week(c: &Curriculum, week: usize) -> EditResult<Curriculum> {
    if week >= c.len() {
        return Err(EditError::invalid_path(EntityKind::Week, &[week]));
    }
    let mut weeks = c.weeks().to_vec();
    let removed = weeks.remove(week);
    debug!(week, week_id = %removed.id, "week deleted");
    Ok(Curriculum::from_weeks(weeks))
}

pub fn delete_section(c: &Curriculum, path: SectionPath) -> EditResult<Curriculum> {
    let next = replace_week(c, path.week, |w| {
        if path.section >= w.sections.len() {
            return Err(EditError::invalid_path(
                EntityKind::Section,
                &[path.week, path.section],
            ));
        }
        w.sections.remove(path.section);
        renumber(&mut w.sections);
        Ok(())
    })?;
    debug!(week = path.week, section = path.section, "section deleted");
    Ok(next)
}

pub fn delete_lesson(c: &Curriculum, path: ItemPath) -> EditResult<Curriculum> {
    delete_child::<Lesson>(c, path)
}

pub fn delete_quiz(c: &Curriculum, path: ItemPath) -> EditResult<Curriculum> {
    delete_child::<Quiz>(c, path)
}

pub fn delete_assignment(c: &Curriculum, path: ItemPath) -> EditResult<Curriculum> {
    delete_child::<Assignment>(c, path)
}

pub fn delete_resource(c: &Curriculum, path: ItemPath) -> EditResult<Curriculum> {
    delete_child::<Resource>(c, path)
}
