use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use super::models::{Role, StudentProfile, User};

/// Single shared credential for the whole directory. This mirrors the demo
/// credential scheme of the platform: there is no per-user password storage
/// and no hashing.
pub const DEMO_PASSWORD: &str = "password123";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("email already registered")]
    EmailTaken,
    #[error("user not found")]
    UserNotFound,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewStudent {
    pub email: String,
    pub username: String,
    pub profile_picture: Option<String>,
}

/// Optional fields shallow-merged into the user record. Teacher-specific
/// fields are ignored for non-teacher accounts.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub email: Option<String>,
    pub username: Option<String>,
    pub profile_picture: Option<String>,
    pub bio: Option<String>,
    pub specialties: Option<Vec<String>>,
    pub experience: Option<u32>,
}

/// In-memory user directory.
#[derive(Default)]
pub struct UserStore {
    users: Vec<User>,
}

impl UserStore {
    pub fn new(users: Vec<User>) -> Self {
        Self { users }
    }

    pub fn user(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn by_email(&self, email: &str) -> Option<&User> {
        self.users.iter().find(|u| u.email == email)
    }

    /// Exact email match plus the shared demo password. Unknown user and
    /// wrong password are deliberately indistinguishable.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<&User, AuthError> {
        let user = self
            .by_email(email)
            .ok_or(AuthError::InvalidCredentials)?;
        if password != DEMO_PASSWORD {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(user)
    }

    /// Create a student account. There is no path that creates a teacher or
    /// parent account; the role is fixed here.
    pub fn signup(&mut self, request: NewStudent) -> Result<User, AuthError> {
        if self.by_email(&request.email).is_some() {
            return Err(AuthError::EmailTaken);
        }
        let user = User {
            id: Uuid::new_v4().to_string(),
            email: request.email,
            username: request.username,
            role: Role::Student,
            profile_picture: request.profile_picture,
            created_at: Utc::now(),
            student: Some(StudentProfile::default()),
            teacher: None,
        };
        self.users.push(user.clone());
        Ok(user)
    }

    pub fn update_profile(&mut self, user_id: &str, updates: ProfileUpdate) -> Result<User, AuthError> {
        let user = self
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or(AuthError::UserNotFound)?;

        if let Some(email) = updates.email {
            user.email = email;
        }
        if let Some(username) = updates.username {
            user.username = username;
        }
        if let Some(picture) = updates.profile_picture {
            user.profile_picture = Some(picture);
        }
        if let Some(teacher) = user.teacher.as_mut() {
            if let Some(bio) = updates.bio {
                teacher.bio = bio;
            }
            if let Some(specialties) = updates.specialties {
                teacher.specialties = specialties;
            }
            if let Some(experience) = updates.experience {
                teacher.experience = experience;
            }
        }
        Ok(user.clone())
    }

    /// Record an enrollment on the student side. Idempotent so the course
    /// roster stays the single source of truth.
    pub fn add_enrollment(&mut self, user_id: &str, course_id: &str) {
        if let Some(student) = self.student_mut(user_id) {
            if !student.enrolled_courses.iter().any(|c| c == course_id) {
                student.enrolled_courses.push(course_id.to_string());
            }
        }
    }

    pub fn add_completed_lesson(&mut self, user_id: &str, lesson_id: &str) {
        if let Some(student) = self.student_mut(user_id) {
            if !student.completed_lessons.iter().any(|l| l == lesson_id) {
                student.completed_lessons.push(lesson_id.to_string());
            }
        }
    }

    fn student_mut(&mut self, user_id: &str) -> Option<&mut StudentProfile> {
        self.users
            .iter_mut()
            .find(|u| u.id == user_id)
            .and_then(|u| u.student.as_mut())
    }
}
