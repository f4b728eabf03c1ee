use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use serde::Serialize;

use crate::users::verify_teacher_role;
use crate::AppState;

/// One row per (student, course) pair across the teacher's courses.
#[derive(Debug, Serialize)]
struct StudentOverview {
    user_id: String,
    username: String,
    email: String,
    course_id: String,
    course_title: String,
    progress_percentage: f64,
}

#[derive(Debug, Serialize)]
struct TeacherStats {
    course_count: usize,
    published_count: usize,
    total_students: usize,
    /// Mean rating across courses that have at least one review.
    average_rating: Option<f64>,
}

/// Roster of students across all courses owned by the calling teacher.
#[get("/api/teacher/students")]
async fn teacher_students(app_state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    let claims = match verify_teacher_role(&req, &app_state) {
        Ok(claims) => claims,
        Err(response) => return response,
    };

    let courses = app_state.courses.read().await;
    let users = app_state.users.read().await;

    let mut rows = Vec::new();
    for course in courses.courses() {
        if !course.teacher_ids.contains(&claims.sub) {
            continue;
        }
        for student_id in &course.enrolled_students {
            let Some(user) = users.user(student_id) else {
                continue;
            };
            let percentage = courses
                .progress(&course.id, student_id)
                .map(|p| p.progress_percentage)
                .unwrap_or(0.0);
            rows.push(StudentOverview {
                user_id: user.id.clone(),
                username: user.username.clone(),
                email: user.email.clone(),
                course_id: course.id.clone(),
                course_title: course.title.clone(),
                progress_percentage: percentage,
            });
        }
    }

    HttpResponse::Ok().json(rows)
}

/// Aggregate numbers for the calling teacher's courses.
#[get("/api/teacher/stats")]
async fn teacher_stats(app_state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    let claims = match verify_teacher_role(&req, &app_state) {
        Ok(claims) => claims,
        Err(response) => return response,
    };

    let courses = app_state.courses.read().await;
    let own: Vec<_> = courses
        .courses()
        .iter()
        .filter(|c| c.teacher_ids.contains(&claims.sub))
        .collect();

    let rated: Vec<f64> = own
        .iter()
        .filter(|c| !c.reviews.is_empty())
        .map(|c| c.rating)
        .collect();
    let average_rating = if rated.is_empty() {
        None
    } else {
        Some(rated.iter().sum::<f64>() / rated.len() as f64)
    };

    HttpResponse::Ok().json(TeacherStats {
        course_count: own.len(),
        published_count: own.iter().filter(|c| c.is_published).count(),
        total_students: own.iter().map(|c| c.total_students()).sum(),
        average_rating,
    })
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(teacher_students).service(teacher_stats);
}
