//! Course DTOs and parsing helpers.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    Course, CourseDetail, CourseDraft, CourseFilter, CoursePatch, EnrolledCourse, Error, Lesson,
    LessonDraft, LessonResource,
};
use crate::inbound::http::validation::{FieldName, parse_level, require};

#[derive(Debug, Deserialize)]
pub(super) struct CoursePath {
    pub(super) id: String,
}

/// Catalogue filters for `GET /api/v1/courses`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseListQuery {
    /// Exact category match.
    pub category: Option<String>,
    /// `beginner`, `intermediate`, or `advanced`.
    pub level: Option<String>,
    /// Case-insensitive match against title, description, or tags.
    pub search: Option<String>,
}

/// Request payload for creating a course.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub level: Option<String>,
    pub price: Option<f64>,
    pub thumbnail: Option<String>,
    pub tags: Option<Vec<String>>,
    /// Defaults to `true`.
    pub published: Option<bool>,
}

/// Request payload for updating a course. Only these fields may change.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CoursePatchRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub level: Option<String>,
    pub price: Option<f64>,
    pub thumbnail: Option<String>,
    pub tags: Option<Vec<String>>,
    pub published: Option<bool>,
}

/// Supplementary link attached to a lesson.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LessonResourceDto {
    pub title: String,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl From<LessonResourceDto> for LessonResource {
    fn from(value: LessonResourceDto) -> Self {
        Self {
            title: value.title,
            url: value.url,
            kind: value.kind,
        }
    }
}

impl From<&LessonResource> for LessonResourceDto {
    fn from(value: &LessonResource) -> Self {
        Self {
            title: value.title.clone(),
            url: value.url.clone(),
            kind: value.kind.clone(),
        }
    }
}

/// Request payload for appending a lesson.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LessonRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub video_url: Option<String>,
    pub duration_minutes: Option<u32>,
    pub resources: Option<Vec<LessonResourceDto>>,
}

/// Lesson as returned to clients.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LessonResponse {
    pub title: String,
    pub content: String,
    pub video_url: Option<String>,
    pub duration_minutes: u32,
    pub order: u32,
    pub resources: Vec<LessonResourceDto>,
}

impl From<&Lesson> for LessonResponse {
    fn from(lesson: &Lesson) -> Self {
        Self {
            title: lesson.title().to_owned(),
            content: lesson.content().to_owned(),
            video_url: lesson.video_url().map(str::to_owned),
            duration_minutes: lesson.duration_minutes(),
            order: lesson.order(),
            resources: lesson.resources().iter().map(LessonResourceDto::from).collect(),
        }
    }
}

/// Course as returned to clients.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseResponse {
    pub id: String,
    pub instructor_id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub level: String,
    pub price: f64,
    pub thumbnail: Option<String>,
    pub published: bool,
    pub lessons: Vec<LessonResponse>,
    pub rating: f64,
    pub tags: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
    pub revision: u32,
}

impl From<&Course> for CourseResponse {
    fn from(course: &Course) -> Self {
        Self {
            id: course.id().to_string(),
            instructor_id: course.instructor().to_string(),
            title: course.title().to_owned(),
            description: course.description().to_owned(),
            category: course.category().to_owned(),
            level: course.level().as_str().to_owned(),
            price: course.price().value(),
            thumbnail: course.thumbnail().map(str::to_owned),
            published: course.published(),
            lessons: course.lessons().iter().map(LessonResponse::from).collect(),
            rating: course.rating(),
            tags: course.tags().to_vec(),
            created_at: course.created_at().to_rfc3339(),
            updated_at: course.updated_at().to_rfc3339(),
            revision: course.revision(),
        }
    }
}

impl From<Course> for CourseResponse {
    fn from(course: Course) -> Self {
        Self::from(&course)
    }
}

/// Course detail with the instructor's name and the enrolled roster.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseDetailResponse {
    #[serde(flatten)]
    pub course: CourseResponse,
    pub instructor_name: Option<String>,
    pub enrolled_students: Vec<String>,
}

impl From<CourseDetail> for CourseDetailResponse {
    fn from(detail: CourseDetail) -> Self {
        Self {
            course: CourseResponse::from(&detail.course),
            instructor_name: detail.instructor_name,
            enrolled_students: detail
                .enrolled_students
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

/// A course the caller is enrolled in with headline progress.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnrolledCourseResponse {
    #[serde(flatten)]
    pub course: CourseResponse,
    pub progress: u8,
    pub last_accessed: String,
}

impl From<EnrolledCourse> for EnrolledCourseResponse {
    fn from(value: EnrolledCourse) -> Self {
        Self {
            course: CourseResponse::from(&value.course),
            progress: value.progress,
            last_accessed: value.last_accessed.to_rfc3339(),
        }
    }
}

pub(super) fn parse_filter(query: CourseListQuery) -> Result<CourseFilter, Error> {
    Ok(CourseFilter {
        level: parse_level(query.level.as_deref(), FieldName::new("level"))?,
        category: query.category,
        search: query.search,
    })
}

pub(super) fn parse_course_request(payload: CourseRequest) -> Result<CourseDraft, Error> {
    Ok(CourseDraft {
        title: require(payload.title, FieldName::new("title"))?,
        description: require(payload.description, FieldName::new("description"))?,
        category: require(payload.category, FieldName::new("category"))?,
        level: parse_level(payload.level.as_deref(), FieldName::new("level"))?,
        price: payload.price,
        thumbnail: payload.thumbnail,
        tags: payload.tags.unwrap_or_default(),
        published: payload.published,
    })
}

pub(super) fn parse_patch_request(payload: CoursePatchRequest) -> Result<CoursePatch, Error> {
    Ok(CoursePatch {
        level: parse_level(payload.level.as_deref(), FieldName::new("level"))?,
        title: payload.title,
        description: payload.description,
        category: payload.category,
        price: payload.price,
        thumbnail: payload.thumbnail,
        tags: payload.tags,
        published: payload.published,
    })
}

pub(super) fn parse_lesson_request(payload: LessonRequest) -> Result<LessonDraft, Error> {
    Ok(LessonDraft {
        title: require(payload.title, FieldName::new("title"))?,
        content: require(payload.content, FieldName::new("content"))?,
        video_url: payload.video_url,
        duration_minutes: payload.duration_minutes,
        resources: payload
            .resources
            .unwrap_or_default()
            .into_iter()
            .map(LessonResource::from)
            .collect(),
    })
}
