use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse, Responder};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;

use crate::store::{Course, CourseDraft, CourseError};
use crate::users::{verify_teacher_role, verify_token};
use crate::AppState;

/// Catalog entry without the lesson bodies.
#[derive(Debug, Serialize)]
struct CourseSummary {
    id: String,
    title: String,
    description: String,
    level: String,
    price: u32,
    duration: String,
    image: String,
    teacher_ids: Vec<String>,
    lesson_count: usize,
    total_students: usize,
    rating: f64,
    review_count: usize,
    is_published: bool,
    features: Vec<String>,
}

impl From<&Course> for CourseSummary {
    fn from(course: &Course) -> Self {
        Self {
            id: course.id.clone(),
            title: course.title.clone(),
            description: course.description.clone(),
            level: course.level.clone(),
            price: course.price,
            duration: course.duration.clone(),
            image: course.image.clone(),
            teacher_ids: course.teacher_ids.clone(),
            lesson_count: course.lessons.len(),
            total_students: course.total_students(),
            rating: course.rating,
            review_count: course.reviews.len(),
            is_published: course.is_published,
            features: course.features.clone(),
        }
    }
}

/// Full course body with the derived roster count alongside.
#[derive(Debug, Serialize)]
struct CourseDetail {
    #[serde(flatten)]
    course: Course,
    total_students: usize,
}

impl From<&Course> for CourseDetail {
    fn from(course: &Course) -> Self {
        Self {
            total_students: course.total_students(),
            course: course.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct DeletedResponse {
    message: String,
    deleted_at: DateTime<Utc>,
}

/// Published catalog. Unpublished drafts only appear to their teachers.
#[get("")]
async fn list_courses(app_state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    let teacher_id = verify_token(&req, &app_state)
        .ok()
        .filter(|claims| claims.roles.contains(&"teacher".to_string()))
        .map(|claims| claims.sub);

    let courses = app_state.courses.read().await;
    let summaries: Vec<CourseSummary> = courses
        .courses()
        .iter()
        .filter(|c| {
            c.is_published
                || teacher_id
                    .as_ref()
                    .map(|id| c.teacher_ids.contains(id))
                    .unwrap_or(false)
        })
        .map(CourseSummary::from)
        .collect();

    HttpResponse::Ok().json(summaries)
}

#[get("/{id}")]
async fn get_course(app_state: web::Data<AppState>, id: web::Path<String>) -> impl Responder {
    let courses = app_state.courses.read().await;
    match courses.course(&id) {
        Some(course) => HttpResponse::Ok().json(CourseDetail::from(course)),
        None => HttpResponse::NotFound().json(json!({
            "error": "Course not found"
        })),
    }
}

#[post("")]
async fn create_course(
    app_state: web::Data<AppState>,
    req: HttpRequest,
    draft: web::Json<CourseDraft>,
) -> impl Responder {
    let claims = match verify_teacher_role(&req, &app_state) {
        Ok(claims) => claims,
        Err(response) => return response,
    };

    let mut draft = draft.into_inner();
    if draft.title.trim().is_empty() {
        return HttpResponse::BadRequest().json(json!({
            "error": "Title is required"
        }));
    }
    // The creating teacher always ends up on the course.
    if !draft.teacher_ids.contains(&claims.sub) {
        draft.teacher_ids.push(claims.sub.clone());
    }

    let mut courses = app_state.courses.write().await;
    let course = courses.add_course(draft);
    HttpResponse::Created().json(CourseDetail::from(&course))
}

#[put("/{id}")]
async fn update_course(
    app_state: web::Data<AppState>,
    req: HttpRequest,
    id: web::Path<String>,
    draft: web::Json<CourseDraft>,
) -> impl Responder {
    let claims = match verify_teacher_role(&req, &app_state) {
        Ok(claims) => claims,
        Err(response) => return response,
    };

    let mut courses = app_state.courses.write().await;
    match courses.course(&id) {
        Some(course) if !course.teacher_ids.contains(&claims.sub) => {
            return HttpResponse::Forbidden().json(json!({
                "error": "Not a teacher of this course"
            }));
        }
        None => {
            return HttpResponse::NotFound().json(json!({
                "error": "Course not found"
            }));
        }
        Some(_) => {}
    }

    match courses.update_course(&id, draft.into_inner()) {
        Ok(course) => HttpResponse::Ok().json(CourseDetail::from(&course)),
        Err(CourseError::NotFound) => HttpResponse::NotFound().json(json!({
            "error": "Course not found"
        })),
    }
}

#[delete("/{id}")]
async fn delete_course(
    app_state: web::Data<AppState>,
    req: HttpRequest,
    id: web::Path<String>,
) -> impl Responder {
    let claims = match verify_teacher_role(&req, &app_state) {
        Ok(claims) => claims,
        Err(response) => return response,
    };

    let mut courses = app_state.courses.write().await;
    match courses.course(&id) {
        Some(course) if !course.teacher_ids.contains(&claims.sub) => {
            return HttpResponse::Forbidden().json(json!({
                "error": "Not a teacher of this course"
            }));
        }
        None => {
            return HttpResponse::NotFound().json(json!({
                "error": "Course not found"
            }));
        }
        Some(_) => {}
    }

    match courses.delete_course(&id) {
        Ok(()) => HttpResponse::Ok().json(DeletedResponse {
            message: "Course deleted".to_string(),
            deleted_at: Utc::now(),
        }),
        Err(CourseError::NotFound) => HttpResponse::NotFound().json(json!({
            "error": "Course not found"
        })),
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/courses")
            .service(list_courses)
            .service(create_course)
            .service(get_course)
            .service(update_course)
            .service(delete_course),
    );
}
