use actix_web::{get, post, web, HttpRequest, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;

use crate::store::{EnrollError, ProgressError};
use crate::users::verify_token;
use crate::AppState;

#[derive(Debug, Deserialize)]
struct QuizScoreRequest {
    score: u32,
}

/// Enroll the calling student. The course roster and the student's own
/// enrolled-course list are updated together; the roster is the source of
/// truth for the enrollment count.
#[post("/api/courses/{id}/enroll")]
async fn enroll(
    app_state: web::Data<AppState>,
    req: HttpRequest,
    id: web::Path<String>,
) -> impl Responder {
    let claims = match verify_token(&req, &app_state) {
        Ok(claims) => claims,
        Err(response) => return response,
    };
    if !claims.roles.contains(&"student".to_string()) {
        return HttpResponse::Forbidden().json(json!({
            "error": "Only students can enroll"
        }));
    }

    let course_id = id.into_inner();
    let progress = {
        let mut courses = app_state.courses.write().await;
        match courses.enroll(&course_id, &claims.sub) {
            Ok(progress) => progress,
            Err(EnrollError::CourseNotFound) => {
                return HttpResponse::NotFound().json(json!({
                    "error": "Course not found"
                }));
            }
            Err(EnrollError::AlreadyEnrolled) => {
                return HttpResponse::Conflict().json(json!({
                    "error": "Already enrolled in this course"
                }));
            }
        }
    };

    {
        let mut users = app_state.users.write().await;
        users.add_enrollment(&claims.sub, &course_id);
    }

    HttpResponse::Created().json(progress)
}

/// The calling student's progress record for a course.
#[get("/api/courses/{id}/progress")]
async fn get_progress(
    app_state: web::Data<AppState>,
    req: HttpRequest,
    id: web::Path<String>,
) -> impl Responder {
    let claims = match verify_token(&req, &app_state) {
        Ok(claims) => claims,
        Err(response) => return response,
    };

    let courses = app_state.courses.read().await;
    match courses.progress(&id, &claims.sub) {
        Some(progress) => HttpResponse::Ok().json(progress),
        None => HttpResponse::NotFound().json(json!({
            "error": "Not enrolled in this course"
        })),
    }
}

#[post("/api/courses/{id}/lessons/{lesson_id}/complete")]
async fn complete_lesson(
    app_state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<(String, String)>,
) -> impl Responder {
    let claims = match verify_token(&req, &app_state) {
        Ok(claims) => claims,
        Err(response) => return response,
    };
    let (course_id, lesson_id) = path.into_inner();

    let progress = {
        let mut courses = app_state.courses.write().await;
        match courses.mark_lesson_complete(&course_id, &lesson_id, &claims.sub) {
            Ok(()) => courses
                .progress(&course_id, &claims.sub)
                .cloned(),
            Err(ProgressError::NotEnrolled) => {
                return HttpResponse::Forbidden().json(json!({
                    "error": "Not enrolled in this course"
                }));
            }
            Err(ProgressError::LessonNotFound) => {
                return HttpResponse::NotFound().json(json!({
                    "error": "Lesson not found"
                }));
            }
        }
    };

    {
        let mut users = app_state.users.write().await;
        users.add_completed_lesson(&claims.sub, &lesson_id);
    }

    match progress {
        Some(progress) => HttpResponse::Ok().json(progress),
        None => HttpResponse::InternalServerError().json(json!({
            "error": "Progress record missing"
        })),
    }
}

/// Record a quiz score; scoring a quiz also completes its lesson.
#[post("/api/courses/{id}/lessons/{lesson_id}/quiz-score")]
async fn record_quiz_score(
    app_state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<(String, String)>,
    body: web::Json<QuizScoreRequest>,
) -> impl Responder {
    let claims = match verify_token(&req, &app_state) {
        Ok(claims) => claims,
        Err(response) => return response,
    };
    let (course_id, lesson_id) = path.into_inner();

    let progress = {
        let mut courses = app_state.courses.write().await;
        match courses.record_quiz_score(&course_id, &lesson_id, &claims.sub, body.score) {
            Ok(()) => courses
                .progress(&course_id, &claims.sub)
                .cloned(),
            Err(ProgressError::NotEnrolled) => {
                return HttpResponse::Forbidden().json(json!({
                    "error": "Not enrolled in this course"
                }));
            }
            Err(ProgressError::LessonNotFound) => {
                return HttpResponse::NotFound().json(json!({
                    "error": "Lesson not found"
                }));
            }
        }
    };

    {
        let mut users = app_state.users.write().await;
        users.add_completed_lesson(&claims.sub, &lesson_id);
    }

    match progress {
        Some(progress) => HttpResponse::Ok().json(progress),
        None => HttpResponse::InternalServerError().json(json!({
            "error": "Progress record missing"
        })),
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(enroll)
        .service(get_progress)
        .service(complete_lesson)
        .service(record_quiz_score);
}
