use actix_web::{get, post, web, HttpRequest, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;

use crate::store::{ReviewError, ReviewInput};
use crate::users::verify_token;
use crate::AppState;

#[derive(Debug, Deserialize)]
struct AddReviewRequest {
    rating: u8,
    comment: String,
}

/// Leave a review on a course. Only enrolled students may review; the
/// reviewer's identity comes from the token, never from the body.
#[post("/api/courses/{id}/reviews")]
async fn add_review(
    app_state: web::Data<AppState>,
    req: HttpRequest,
    id: web::Path<String>,
    body: web::Json<AddReviewRequest>,
) -> impl Responder {
    let claims = match verify_token(&req, &app_state) {
        Ok(claims) => claims,
        Err(response) => return response,
    };
    let course_id = id.into_inner();

    let student_name = {
        let users = app_state.users.read().await;
        match users.user(&claims.sub) {
            Some(user) => user.username.clone(),
            None => {
                return HttpResponse::Unauthorized().json(json!({
                    "error": "User not found"
                }));
            }
        }
    };

    let mut courses = app_state.courses.write().await;

    // Enrollment gate lives here at the boundary; the store itself does
    // not tie reviews to enrollment.
    match courses.course(&course_id) {
        Some(course) if !course.enrolled_students.contains(&claims.sub) => {
            return HttpResponse::Forbidden().json(json!({
                "error": "Only enrolled students can review this course"
            }));
        }
        None => {
            return HttpResponse::NotFound().json(json!({
                "error": "Course not found"
            }));
        }
        Some(_) => {}
    }

    let input = ReviewInput {
        student_id: claims.sub.clone(),
        student_name,
        rating: body.rating,
        comment: body.comment.clone(),
        is_visible: true,
    };

    match courses.add_review(&course_id, input) {
        Ok(review) => HttpResponse::Created().json(review),
        Err(ReviewError::CourseNotFound) => HttpResponse::NotFound().json(json!({
            "error": "Course not found"
        })),
        Err(ReviewError::InvalidRating) => HttpResponse::BadRequest().json(json!({
            "error": "Rating must be between 1 and 5"
        })),
        Err(ReviewError::EmptyComment) => HttpResponse::BadRequest().json(json!({
            "error": "Comment must not be empty"
        })),
    }
}

/// Visible reviews for a course, with the current aggregate rating.
#[get("/api/courses/{id}/reviews")]
async fn list_reviews(app_state: web::Data<AppState>, id: web::Path<String>) -> impl Responder {
    let courses = app_state.courses.read().await;
    match courses.course(&id) {
        Some(course) => {
            let visible: Vec<_> = course
                .reviews
                .iter()
                .filter(|r| r.is_visible)
                .cloned()
                .collect();
            HttpResponse::Ok().json(json!({
                "course_id": course.id,
                "rating": course.rating,
                "reviews": visible,
            }))
        }
        None => HttpResponse::NotFound().json(json!({
            "error": "Course not found"
        })),
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(add_review).service(list_reviews);
}
