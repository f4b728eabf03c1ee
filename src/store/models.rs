use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
    Parent,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
            Role::Parent => "parent",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub username: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student: Option<StudentProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teacher: Option<TeacherProfile>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StudentProfile {
    pub enrolled_courses: Vec<String>,
    pub completed_lessons: Vec<String>,
    pub total_points: u32,
    pub achievements: Vec<Achievement>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeacherProfile {
    pub bio: String,
    pub specialties: Vec<String>,
    /// Years of teaching experience.
    pub experience: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub color: String,
    pub unlocked_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub title: String,
    pub description: String,
    pub level: String,
    /// Price in whole currency units.
    pub price: u32,
    pub duration: String,
    pub image: String,
    pub teacher_ids: Vec<String>,
    pub lessons: Vec<Lesson>,
    pub enrolled_students: Vec<String>,
    /// Mean of review ratings, rounded to one decimal. Left at its seeded
    /// value while the course has no reviews.
    pub rating: f64,
    pub reviews: Vec<Review>,
    pub created_at: DateTime<Utc>,
    pub is_published: bool,
    pub features: Vec<String>,
}

impl Course {
    /// Roster size. The original platform carried a separate counter that
    /// could drift from the roster; here it is always derived.
    pub fn total_students(&self) -> usize {
        self.enrolled_students.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LessonKind {
    Video,
    Quiz,
    Assignment,
    Reading,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lesson {
    pub id: String,
    pub course_id: String,
    pub title: String,
    pub description: String,
    /// Duration in minutes.
    pub duration: u32,
    /// 1-based position within the course.
    pub order: u32,
    pub kind: LessonKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quiz: Option<Quiz>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignment: Option<Assignment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    pub id: String,
    pub lesson_id: String,
    pub questions: Vec<Question>,
    pub passing_score: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_limit: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionKind {
    MultipleChoice,
    TrueFalse,
    FillBlank,
    ShortAnswer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub kind: QuestionKind,
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    pub correct_answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    pub points: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub id: String,
    pub lesson_id: String,
    pub title: String,
    pub description: String,
    pub instructions: String,
    pub allowed_formats: Vec<String>,
    pub max_file_size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseProgress {
    pub course_id: String,
    pub completed_lessons: Vec<String>,
    /// Lesson count captured at enrollment time. Deliberately not updated
    /// when the course later gains or loses lessons.
    pub total_lessons: usize,
    pub progress_percentage: f64,
    pub current_lesson: String,
    /// Minutes spent in the course.
    pub time_spent: u32,
    pub last_accessed: DateTime<Utc>,
    pub quiz_scores: HashMap<String, u32>,
    pub assignment_grades: HashMap<String, u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    pub course_id: String,
    pub student_id: String,
    pub student_name: String,
    pub rating: u8,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub is_visible: bool,
}
