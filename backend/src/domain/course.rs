//! Course aggregate: authored content with an append-only lesson list.
//!
//! A course is owned by exactly one instructor for its whole life. Lessons
//! are embedded and only ever appended; each lesson's `order` is the lesson
//! count at the moment it was added. Enrollment membership is not stored on
//! the course; rosters are read from enrollment records.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::{Actor, UserId};

/// Validation errors raised while building or mutating a course.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CourseValidationError {
    #[error("course id must be a valid UUID")]
    InvalidId,
    #[error("{field} is required")]
    MissingField { field: &'static str },
    #[error("price must be a non-negative number")]
    InvalidPrice,
    #[error("unknown level '{0}'; expected beginner, intermediate, or advanced")]
    UnknownLevel(String),
    #[error("{field} must be a valid http(s) URL")]
    InvalidUrl { field: &'static str },
}

/// Stable course identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseId(Uuid);

impl CourseId {
    /// Parse a course identifier from its string form.
    pub fn new(id: impl AsRef<str>) -> Result<Self, CourseValidationError> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| CourseValidationError::InvalidId)
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Difficulty level advertised in the catalogue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl CourseLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }
}

impl fmt::Display for CourseLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CourseLevel {
    type Err = CourseValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "beginner" => Ok(Self::Beginner),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            other => Err(CourseValidationError::UnknownLevel(other.to_owned())),
        }
    }
}

/// Course price in the catalogue currency; zero means free.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Price(f64);

impl Price {
    /// Validate a price; it must be finite and not negative.
    pub fn new(value: f64) -> Result<Self, CourseValidationError> {
        if !value.is_finite() || value < 0.0 {
            return Err(CourseValidationError::InvalidPrice);
        }
        Ok(Self(value))
    }

    pub fn free() -> Self {
        Self(0.0)
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn is_free(self) -> bool {
        self.0 == 0.0
    }
}

impl TryFrom<f64> for Price {
    type Error = CourseValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for f64 {
    fn from(value: Price) -> Self {
        value.0
    }
}

fn required(field: &'static str, value: String) -> Result<String, CourseValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CourseValidationError::MissingField { field });
    }
    Ok(trimmed.to_owned())
}

fn optional_url(
    field: &'static str,
    value: Option<String>,
) -> Result<Option<String>, CourseValidationError> {
    let Some(raw) = value else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match url::Url::parse(trimmed) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(Some(trimmed.to_owned())),
        _ => Err(CourseValidationError::InvalidUrl { field }),
    }
}

fn normalise_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let trimmed = tag.trim();
        if !trimmed.is_empty() && !out.iter().any(|existing| existing == trimmed) {
            out.push(trimmed.to_owned());
        }
    }
    out
}

/// Supplementary link attached to a lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonResource {
    pub title: String,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Lesson embedded in a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    title: String,
    content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    video_url: Option<String>,
    duration_minutes: u32,
    order: u32,
    #[serde(default)]
    resources: Vec<LessonResource>,
}

impl Lesson {
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    pub fn content(&self) -> &str {
        self.content.as_str()
    }

    pub fn video_url(&self) -> Option<&str> {
        self.video_url.as_deref()
    }

    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    /// Zero-based position assigned when the lesson was appended.
    pub fn order(&self) -> u32 {
        self.order
    }

    pub fn resources(&self) -> &[LessonResource] {
        &self.resources
    }
}

/// Unvalidated lesson input supplied by an author.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LessonDraft {
    pub title: String,
    pub content: String,
    pub video_url: Option<String>,
    pub duration_minutes: Option<u32>,
    pub resources: Vec<LessonResource>,
}

impl LessonDraft {
    fn into_lesson(self, order: u32) -> Result<Lesson, CourseValidationError> {
        let LessonDraft {
            title,
            content,
            video_url,
            duration_minutes,
            resources,
        } = self;
        Ok(Lesson {
            title: required("title", title)?,
            content: required("content", content)?,
            video_url: optional_url("videoUrl", video_url)?,
            duration_minutes: duration_minutes.unwrap_or(0),
            order,
            resources,
        })
    }
}

/// Unvalidated course input supplied by an author.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseDraft {
    pub title: String,
    pub description: String,
    pub category: String,
    pub level: Option<CourseLevel>,
    pub price: Option<f64>,
    pub thumbnail: Option<String>,
    pub tags: Vec<String>,
    pub published: Option<bool>,
}

/// Whitelisted course fields an owner may change.
///
/// Ownership, lessons, rating, and timestamps are deliberately absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoursePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub level: Option<CourseLevel>,
    pub price: Option<f64>,
    pub thumbnail: Option<String>,
    pub tags: Option<Vec<String>>,
    pub published: Option<bool>,
}

impl CoursePatch {
    /// Whether the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Course aggregate.
///
/// ## Invariants
/// - `title`, `description`, and `category` are non-empty once trimmed.
/// - `lessons[i].order() == i` for every lesson.
/// - `instructor` never changes after creation.
/// - `revision` increases by one on every persisted mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct Course {
    id: CourseId,
    instructor: UserId,
    title: String,
    description: String,
    category: String,
    level: CourseLevel,
    price: Price,
    thumbnail: Option<String>,
    published: bool,
    lessons: Vec<Lesson>,
    rating: f64,
    tags: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    revision: u32,
}

/// Persisted course state used to rebuild the aggregate from storage.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseSnapshot {
    pub id: CourseId,
    pub instructor: UserId,
    pub title: String,
    pub description: String,
    pub category: String,
    pub level: CourseLevel,
    pub price: Price,
    pub thumbnail: Option<String>,
    pub published: bool,
    pub lessons: Vec<Lesson>,
    pub rating: f64,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub revision: u32,
}

impl Course {
    /// Create a new course owned by `instructor`.
    ///
    /// # Examples
    /// ```
    /// use chrono::Utc;
    /// use edumaster::domain::{Course, CourseDraft, CourseId, UserId};
    ///
    /// let course = Course::create(
    ///     CourseId::random(),
    ///     UserId::random(),
    ///     CourseDraft {
    ///         title: "Rust basics".into(),
    ///         description: "Ownership and borrowing".into(),
    ///         category: "Programming".into(),
    ///         ..CourseDraft::default()
    ///     },
    ///     Utc::now(),
    /// )
    /// .expect("valid draft");
    /// assert!(course.published());
    /// assert!(course.lessons().is_empty());
    /// ```
    pub fn create(
        id: CourseId,
        instructor: UserId,
        draft: CourseDraft,
        now: DateTime<Utc>,
    ) -> Result<Self, CourseValidationError> {
        let CourseDraft {
            title,
            description,
            category,
            level,
            price,
            thumbnail,
            tags,
            published,
        } = draft;

        Ok(Self {
            id,
            instructor,
            title: required("title", title)?,
            description: required("description", description)?,
            category: required("category", category)?,
            level: level.unwrap_or_default(),
            price: price.map(Price::new).transpose()?.unwrap_or_default(),
            thumbnail: optional_url("thumbnail", thumbnail)?,
            published: published.unwrap_or(true),
            lessons: Vec::new(),
            rating: 0.0,
            tags: normalise_tags(tags),
            created_at: now,
            updated_at: now,
            revision: 1,
        })
    }

    /// Rebuild a course from a persisted snapshot.
    pub fn from_snapshot(snapshot: CourseSnapshot) -> Self {
        let CourseSnapshot {
            id,
            instructor,
            title,
            description,
            category,
            level,
            price,
            thumbnail,
            published,
            lessons,
            rating,
            tags,
            created_at,
            updated_at,
            revision,
        } = snapshot;
        Self {
            id,
            instructor,
            title,
            description,
            category,
            level,
            price,
            thumbnail,
            published,
            lessons,
            rating,
            tags,
            created_at,
            updated_at,
            revision,
        }
    }

    pub fn id(&self) -> CourseId {
        self.id
    }

    /// Owning instructor.
    pub fn instructor(&self) -> &UserId {
        &self.instructor
    }

    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    pub fn category(&self) -> &str {
        self.category.as_str()
    }

    pub fn level(&self) -> CourseLevel {
        self.level
    }

    pub fn price(&self) -> Price {
        self.price
    }

    pub fn thumbnail(&self) -> Option<&str> {
        self.thumbnail.as_deref()
    }

    pub fn published(&self) -> bool {
        self.published
    }

    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    /// Current number of lessons; the live denominator for progress.
    pub fn lesson_count(&self) -> u32 {
        u32::try_from(self.lessons.len()).unwrap_or(u32::MAX)
    }

    /// Aggregate rating, 0 to 5. Maintained outside this service.
    pub fn rating(&self) -> f64 {
        self.rating
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn revision(&self) -> u32 {
        self.revision
    }

    /// Whether `actor` may edit, delete, or extend this course.
    pub fn is_managed_by(&self, actor: &Actor) -> bool {
        actor.is_admin() || actor.id() == &self.instructor
    }

    /// Whether `viewer` may read this course. Drafts are limited to their
    /// owner and administrators.
    pub fn is_visible_to(&self, viewer: Option<&Actor>) -> bool {
        self.published || viewer.is_some_and(|actor| self.is_managed_by(actor))
    }

    /// Apply a whitelisted patch and bump the revision.
    pub fn apply_patch(
        &mut self,
        patch: CoursePatch,
        now: DateTime<Utc>,
    ) -> Result<(), CourseValidationError> {
        let CoursePatch {
            title,
            description,
            category,
            level,
            price,
            thumbnail,
            tags,
            published,
        } = patch;

        // Validate everything before mutating so a bad field leaves the
        // course untouched.
        let title = title.map(|value| required("title", value)).transpose()?;
        let description = description
            .map(|value| required("description", value))
            .transpose()?;
        let category = category
            .map(|value| required("category", value))
            .transpose()?;
        let price = price.map(Price::new).transpose()?;
        let thumbnail = thumbnail
            .map(|value| optional_url("thumbnail", Some(value)))
            .transpose()?;

        if let Some(value) = title {
            self.title = value;
        }
        if let Some(value) = description {
            self.description = value;
        }
        if let Some(value) = category {
            self.category = value;
        }
        if let Some(value) = level {
            self.level = value;
        }
        if let Some(value) = price {
            self.price = value;
        }
        if let Some(value) = thumbnail {
            self.thumbnail = value;
        }
        if let Some(value) = tags {
            self.tags = normalise_tags(value);
        }
        if let Some(value) = published {
            self.published = value;
        }
        self.touch(now);
        Ok(())
    }

    /// Append a lesson at the end of the course and return its order.
    pub fn append_lesson(
        &mut self,
        draft: LessonDraft,
        now: DateTime<Utc>,
    ) -> Result<u32, CourseValidationError> {
        let order = self.lesson_count();
        self.lessons.push(draft.into_lesson(order)?);
        self.touch(now);
        Ok(order)
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
        self.revision = self.revision.saturating_add(1);
    }
}

/// Catalogue search filters; every present filter must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseFilter {
    pub category: Option<String>,
    pub level: Option<CourseLevel>,
    pub search: Option<String>,
}

impl CourseFilter {
    /// Search text with surrounding whitespace removed; `None` when blank.
    pub fn search_text(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }

    /// Evaluate the filter against a course, published state included.
    pub fn matches(&self, course: &Course) -> bool {
        if !course.published() {
            return false;
        }
        if self
            .category
            .as_deref()
            .is_some_and(|category| category != course.category())
        {
            return false;
        }
        if self.level.is_some_and(|level| level != course.level()) {
            return false;
        }
        match self.search_text() {
            None => true,
            Some(text) => {
                let needle = text.to_lowercase();
                course.title().to_lowercase().contains(&needle)
                    || course.description().to_lowercase().contains(&needle)
                    || course
                        .tags()
                        .iter()
                        .any(|tag| tag.to_lowercase().contains(&needle))
            }
        }
    }
}

/// Course read model enriched with owner and roster projections.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseDetail {
    pub course: Course,
    pub instructor_name: Option<String>,
    pub enrolled_students: Vec<UserId>,
}
