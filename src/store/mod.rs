pub mod courses;
pub mod models;
pub mod users;

pub use courses::{CourseDraft, CourseError, CourseStore, EnrollError, ProgressError, ReviewError, ReviewInput};
pub use models::{Course, CourseProgress, Lesson, LessonKind, Review, Role, User};
pub use users::{AuthError, NewStudent, ProfileUpdate, UserStore, DEMO_PASSWORD};
