use std::collections::HashMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::models::{Course, CourseProgress, Lesson, Review};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnrollError {
    #[error("course not found")]
    CourseNotFound,
    #[error("already enrolled")]
    AlreadyEnrolled,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProgressError {
    #[error("not enrolled in this course")]
    NotEnrolled,
    #[error("lesson not found in this course")]
    LessonNotFound,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReviewError {
    #[error("course not found")]
    CourseNotFound,
    #[error("rating must be between 1 and 5")]
    InvalidRating,
    #[error("comment must not be empty")]
    EmptyComment,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CourseError {
    #[error("course not found")]
    NotFound,
}

/// Content fields of a course, without id or bookkeeping state. Used for
/// teacher create/update; roster, reviews and rating are owned by the store
/// and survive updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseDraft {
    pub title: String,
    pub description: String,
    pub level: String,
    pub price: u32,
    pub duration: String,
    pub image: String,
    pub teacher_ids: Vec<String>,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub features: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewInput {
    pub student_id: String,
    pub student_name: String,
    pub rating: u8,
    pub comment: String,
    pub is_visible: bool,
}

/// Course catalog plus per-student progress records. Progress is keyed by
/// (user id, course id), so a record can only ever belong to one student.
#[derive(Default)]
pub struct CourseStore {
    courses: Vec<Course>,
    progress: HashMap<(String, String), CourseProgress>,
}

impl CourseStore {
    pub fn new(courses: Vec<Course>) -> Self {
        Self {
            courses,
            progress: HashMap::new(),
        }
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn course(&self, id: &str) -> Option<&Course> {
        self.courses.iter().find(|c| c.id == id)
    }

    fn course_mut(&mut self, id: &str) -> Option<&mut Course> {
        self.courses.iter_mut().find(|c| c.id == id)
    }

    /// Enroll a user in a course. Adds the user to the roster and creates
    /// the progress record with the lesson count frozen at this moment.
    /// Re-enrollment fails without touching any state.
    pub fn enroll(&mut self, course_id: &str, user_id: &str) -> Result<CourseProgress, EnrollError> {
        let course = self
            .course_mut(course_id)
            .ok_or(EnrollError::CourseNotFound)?;

        if course.enrolled_students.iter().any(|s| s == user_id) {
            return Err(EnrollError::AlreadyEnrolled);
        }
        course.enrolled_students.push(user_id.to_string());

        let progress = CourseProgress {
            course_id: course.id.clone(),
            completed_lessons: Vec::new(),
            total_lessons: course.lessons.len(),
            progress_percentage: 0.0,
            current_lesson: course
                .lessons
                .first()
                .map(|l| l.id.clone())
                .unwrap_or_default(),
            time_spent: 0,
            last_accessed: Utc::now(),
            quiz_scores: HashMap::new(),
            assignment_grades: HashMap::new(),
        };
        self.progress.insert(
            (user_id.to_string(), course_id.to_string()),
            progress.clone(),
        );
        Ok(progress)
    }

    pub fn progress(&self, course_id: &str, user_id: &str) -> Option<&CourseProgress> {
        self.progress
            .get(&(user_id.to_string(), course_id.to_string()))
    }

    /// Record a lesson as completed and recompute the percentage. Calling
    /// this twice with the same lesson id leaves the record unchanged.
    pub fn mark_lesson_complete(
        &mut self,
        course_id: &str,
        lesson_id: &str,
        user_id: &str,
    ) -> Result<(), ProgressError> {
        let lesson_exists = self
            .course(course_id)
            .map(|c| c.lessons.iter().any(|l| l.id == lesson_id))
            .unwrap_or(false);

        let progress = self
            .progress
            .get_mut(&(user_id.to_string(), course_id.to_string()))
            .ok_or(ProgressError::NotEnrolled)?;

        if !lesson_exists {
            return Err(ProgressError::LessonNotFound);
        }

        if !progress.completed_lessons.iter().any(|l| l == lesson_id) {
            progress.completed_lessons.push(lesson_id.to_string());
            progress.progress_percentage = percentage(
                progress.completed_lessons.len(),
                progress.total_lessons,
            );
        }
        progress.last_accessed = Utc::now();
        Ok(())
    }

    /// Store a quiz score and complete the lesson through the same path as
    /// any other lesson.
    pub fn record_quiz_score(
        &mut self,
        course_id: &str,
        lesson_id: &str,
        user_id: &str,
        score: u32,
    ) -> Result<(), ProgressError> {
        self.mark_lesson_complete(course_id, lesson_id, user_id)?;
        let progress = self
            .progress
            .get_mut(&(user_id.to_string(), course_id.to_string()))
            .ok_or(ProgressError::NotEnrolled)?;
        progress.quiz_scores.insert(lesson_id.to_string(), score);
        Ok(())
    }

    /// Append a review and recompute the course rating. Multiple reviews by
    /// the same student are allowed.
    pub fn add_review(&mut self, course_id: &str, input: ReviewInput) -> Result<Review, ReviewError> {
        if !(1..=5).contains(&input.rating) {
            return Err(ReviewError::InvalidRating);
        }
        if input.comment.trim().is_empty() {
            return Err(ReviewError::EmptyComment);
        }

        let course = self
            .course_mut(course_id)
            .ok_or(ReviewError::CourseNotFound)?;

        let review = Review {
            id: Uuid::new_v4().to_string(),
            course_id: course.id.clone(),
            student_id: input.student_id,
            student_name: input.student_name,
            rating: input.rating,
            comment: input.comment,
            created_at: Utc::now(),
            is_visible: input.is_visible,
        };
        course.reviews.push(review.clone());
        self.update_rating(course_id);
        Ok(review)
    }

    /// Recompute the mean rating, rounded to one decimal. A course without
    /// reviews keeps its previous rating.
    pub fn update_rating(&mut self, course_id: &str) {
        if let Some(course) = self.course_mut(course_id) {
            if course.reviews.is_empty() {
                return;
            }
            let sum: u32 = course.reviews.iter().map(|r| u32::from(r.rating)).sum();
            let mean = f64::from(sum) / course.reviews.len() as f64;
            course.rating = (mean * 10.0).round() / 10.0;
        }
    }

    pub fn add_course(&mut self, draft: CourseDraft) -> Course {
        let id = Uuid::new_v4().to_string();
        let lessons = lessons_for(draft.lessons, &id);
        let course = Course {
            id,
            title: draft.title,
            description: draft.description,
            level: draft.level,
            price: draft.price,
            duration: draft.duration,
            image: draft.image,
            teacher_ids: draft.teacher_ids,
            lessons,
            enrolled_students: Vec::new(),
            rating: 0.0,
            reviews: Vec::new(),
            created_at: Utc::now(),
            is_published: draft.is_published,
            features: draft.features,
        };
        self.courses.push(course.clone());
        course
    }

    /// Replace a course's content fields. Roster, reviews, rating and the
    /// creation timestamp are preserved; existing progress records keep
    /// their lesson count snapshot.
    pub fn update_course(&mut self, course_id: &str, draft: CourseDraft) -> Result<Course, CourseError> {
        let lessons = lessons_for(draft.lessons, course_id);
        let course = self.course_mut(course_id).ok_or(CourseError::NotFound)?;
        course.title = draft.title;
        course.description = draft.description;
        course.level = draft.level;
        course.price = draft.price;
        course.duration = draft.duration;
        course.image = draft.image;
        course.teacher_ids = draft.teacher_ids;
        course.lessons = lessons;
        course.is_published = draft.is_published;
        course.features = draft.features;
        Ok(course.clone())
    }

    pub fn delete_course(&mut self, course_id: &str) -> Result<(), CourseError> {
        let before = self.courses.len();
        self.courses.retain(|c| c.id != course_id);
        if self.courses.len() == before {
            return Err(CourseError::NotFound);
        }
        Ok(())
    }
}

fn percentage(completed: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    completed as f64 * 100.0 / total as f64
}

/// Rebind lessons to their course and assign ids to ones arriving without.
fn lessons_for(mut lessons: Vec<Lesson>, course_id: &str) -> Vec<Lesson> {
    for lesson in &mut lessons {
        if lesson.id.is_empty() {
            lesson.id = Uuid::new_v4().to_string();
        }
        lesson.course_id = course_id.to_string();
    }
    lessons
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::models::LessonKind;

    fn lesson(id: &str, course_id: &str, order: u32) -> Lesson {
        Lesson {
            id: id.to_string(),
            course_id: course_id.to_string(),
            title: format!("Lesson {}", order),
            description: String::new(),
            duration: 15,
            order,
            kind: LessonKind::Video,
            video_url: None,
            content: None,
            quiz: None,
            assignment: None,
        }
    }

    fn course(id: &str, lessons: Vec<Lesson>) -> Course {
        Course {
            id: id.to_string(),
            title: "Course".to_string(),
            description: String::new(),
            level: "Beginner".to_string(),
            price: 89,
            duration: "12 weeks".to_string(),
            image: String::new(),
            teacher_ids: vec!["teacher1".to_string()],
            lessons,
            enrolled_students: Vec::new(),
            rating: 0.0,
            reviews: Vec::new(),
            created_at: Utc::now(),
            is_published: true,
            features: Vec::new(),
        }
    }

    fn store_with_two_lessons() -> CourseStore {
        let lessons = vec![lesson("lesson1", "course1", 1), lesson("lesson2", "course1", 2)];
        CourseStore::new(vec![course("course1", lessons)])
    }

    fn review(rating: u8) -> ReviewInput {
        ReviewInput {
            student_id: "student1".to_string(),
            student_name: "Alex Johnson".to_string(),
            rating,
            comment: "Great course".to_string(),
            is_visible: true,
        }
    }

    #[test]
    fn enroll_initializes_progress() {
        let mut store = store_with_two_lessons();
        let progress = store.enroll("course1", "student1").unwrap();

        assert_eq!(progress.total_lessons, 2);
        assert_eq!(progress.progress_percentage, 0.0);
        assert_eq!(progress.current_lesson, "lesson1");
        assert!(progress.completed_lessons.is_empty());
        assert_eq!(store.course("course1").unwrap().total_students(), 1);
    }

    #[test]
    fn enroll_twice_is_rejected_and_counts_once() {
        let mut store = store_with_two_lessons();
        store.enroll("course1", "student1").unwrap();
        let err = store.enroll("course1", "student1").unwrap_err();

        assert_eq!(err, EnrollError::AlreadyEnrolled);
        let course = store.course("course1").unwrap();
        assert_eq!(course.total_students(), 1);
        assert_eq!(
            course
                .enrolled_students
                .iter()
                .filter(|s| *s == "student1")
                .count(),
            1
        );
    }

    #[test]
    fn enroll_unknown_course_fails() {
        let mut store = store_with_two_lessons();
        assert_eq!(
            store.enroll("nope", "student1").unwrap_err(),
            EnrollError::CourseNotFound
        );
    }

    #[test]
    fn enroll_in_empty_course_has_zero_percentage() {
        let mut store = CourseStore::new(vec![course("empty", Vec::new())]);
        let progress = store.enroll("empty", "student1").unwrap();

        assert_eq!(progress.total_lessons, 0);
        assert_eq!(progress.progress_percentage, 0.0);
        assert_eq!(progress.current_lesson, "");
    }

    #[test]
    fn completing_lessons_walks_percentage_to_100() {
        let mut store = store_with_two_lessons();
        store.enroll("course1", "student1").unwrap();

        store
            .mark_lesson_complete("course1", "lesson1", "student1")
            .unwrap();
        assert_eq!(
            store.progress("course1", "student1").unwrap().progress_percentage,
            50.0
        );

        store
            .mark_lesson_complete("course1", "lesson2", "student1")
            .unwrap();
        let progress = store.progress("course1", "student1").unwrap();
        assert_eq!(progress.progress_percentage, 100.0);
        assert_eq!(progress.completed_lessons.len(), 2);
    }

    #[test]
    fn completing_a_lesson_twice_changes_nothing() {
        let mut store = store_with_two_lessons();
        store.enroll("course1", "student1").unwrap();

        store
            .mark_lesson_complete("course1", "lesson1", "student1")
            .unwrap();
        store
            .mark_lesson_complete("course1", "lesson1", "student1")
            .unwrap();

        let progress = store.progress("course1", "student1").unwrap();
        assert_eq!(progress.completed_lessons.len(), 1);
        assert_eq!(progress.progress_percentage, 50.0);
    }

    #[test]
    fn completion_requires_enrollment() {
        let mut store = store_with_two_lessons();
        assert_eq!(
            store
                .mark_lesson_complete("course1", "lesson1", "student1")
                .unwrap_err(),
            ProgressError::NotEnrolled
        );
    }

    #[test]
    fn completion_requires_a_known_lesson() {
        let mut store = store_with_two_lessons();
        store.enroll("course1", "student1").unwrap();
        assert_eq!(
            store
                .mark_lesson_complete("course1", "lesson99", "student1")
                .unwrap_err(),
            ProgressError::LessonNotFound
        );
    }

    #[test]
    fn progress_is_per_student() {
        let mut store = store_with_two_lessons();
        store.enroll("course1", "student1").unwrap();
        store.enroll("course1", "student2").unwrap();

        store
            .mark_lesson_complete("course1", "lesson1", "student1")
            .unwrap();

        assert_eq!(
            store.progress("course1", "student1").unwrap().progress_percentage,
            50.0
        );
        assert_eq!(
            store.progress("course1", "student2").unwrap().progress_percentage,
            0.0
        );
    }

    #[test]
    fn quiz_score_completes_the_lesson() {
        let mut store = store_with_two_lessons();
        store.enroll("course1", "student1").unwrap();
        store
            .record_quiz_score("course1", "lesson2", "student1", 80)
            .unwrap();

        let progress = store.progress("course1", "student1").unwrap();
        assert_eq!(progress.quiz_scores.get("lesson2"), Some(&80));
        assert!(progress.completed_lessons.contains(&"lesson2".to_string()));
        assert_eq!(progress.progress_percentage, 50.0);
    }

    #[test]
    fn first_review_sets_rating_to_its_value() {
        let mut store = store_with_two_lessons();
        store.add_review("course1", review(5)).unwrap();
        assert_eq!(store.course("course1").unwrap().rating, 5.0);
    }

    #[test]
    fn rating_is_mean_rounded_to_one_decimal() {
        let mut store = store_with_two_lessons();
        store.add_review("course1", review(5)).unwrap();
        store.add_review("course1", review(3)).unwrap();
        assert_eq!(store.course("course1").unwrap().rating, 4.0);

        store.add_review("course1", review(5)).unwrap();
        // mean of 5, 3, 5 is 4.333...
        assert_eq!(store.course("course1").unwrap().rating, 4.3);
    }

    #[test]
    fn review_validation() {
        let mut store = store_with_two_lessons();
        assert_eq!(
            store.add_review("course1", review(6)).unwrap_err(),
            ReviewError::InvalidRating
        );
        assert_eq!(
            store.add_review("course1", review(0)).unwrap_err(),
            ReviewError::InvalidRating
        );

        let mut blank = review(4);
        blank.comment = "   ".to_string();
        assert_eq!(
            store.add_review("course1", blank).unwrap_err(),
            ReviewError::EmptyComment
        );
        assert_eq!(
            store.add_review("missing", review(4)).unwrap_err(),
            ReviewError::CourseNotFound
        );
    }

    #[test]
    fn update_rating_leaves_reviewless_course_alone() {
        let mut store = store_with_two_lessons();
        store.update_rating("course1");
        assert_eq!(store.course("course1").unwrap().rating, 0.0);
    }

    fn draft() -> CourseDraft {
        CourseDraft {
            title: "New Course".to_string(),
            description: "Desc".to_string(),
            level: "Beginner".to_string(),
            price: 50,
            duration: "8 weeks".to_string(),
            image: String::new(),
            teacher_ids: vec!["teacher1".to_string()],
            lessons: Vec::new(),
            is_published: false,
            features: Vec::new(),
        }
    }

    #[test]
    fn course_crud_round_trip() {
        let mut store = CourseStore::default();
        let created = store.add_course(draft());
        assert!(store.course(&created.id).is_some());

        let mut updated = draft();
        updated.title = "Renamed".to_string();
        let course = store.update_course(&created.id, updated).unwrap();
        assert_eq!(course.title, "Renamed");
        assert_eq!(course.id, created.id);

        store.delete_course(&created.id).unwrap();
        assert!(store.course(&created.id).is_none());
        assert_eq!(store.delete_course(&created.id).unwrap_err(), CourseError::NotFound);
    }

    #[test]
    fn update_preserves_roster_and_reviews() {
        let mut store = store_with_two_lessons();
        store.enroll("course1", "student1").unwrap();
        store.add_review("course1", review(5)).unwrap();

        store.update_course("course1", draft()).unwrap();

        let course = store.course("course1").unwrap();
        assert_eq!(course.total_students(), 1);
        assert_eq!(course.reviews.len(), 1);
        assert_eq!(course.rating, 5.0);
    }

    #[test]
    fn total_lessons_snapshot_survives_course_edits() {
        let mut store = store_with_two_lessons();
        store.enroll("course1", "student1").unwrap();
        store
            .mark_lesson_complete("course1", "lesson1", "student1")
            .unwrap();

        // Shrink the course to a single lesson; the enrollment-time
        // snapshot keeps the percentage stable.
        let mut shrunk = draft();
        shrunk.lessons = vec![lesson("lesson1", "course1", 1)];
        store.update_course("course1", shrunk).unwrap();

        let progress = store.progress("course1", "student1").unwrap();
        assert_eq!(progress.total_lessons, 2);
        assert_eq!(progress.progress_percentage, 50.0);
    }
}
