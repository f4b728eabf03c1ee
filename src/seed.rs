//! Development seed data. The platform ships with two teachers, one student
//! and three published courses so every flow can be exercised without a
//! backend of record.

use chrono::Utc;

use crate::store::models::{
    Lesson, LessonKind, Question, QuestionKind, Quiz, Review, Role, StudentProfile,
    TeacherProfile, User,
};
use crate::store::{Course, CourseStore, UserStore};

pub fn seed_users() -> UserStore {
    let users = vec![
        User {
            id: "teacher1".to_string(),
            email: "gannah@lingonest.com".to_string(),
            username: "Miss Gannah".to_string(),
            role: Role::Teacher,
            profile_picture: Some("/assets/avatars/gannah.jpg".to_string()),
            created_at: Utc::now(),
            student: None,
            teacher: Some(TeacherProfile {
                bio: "Experienced English teacher specializing in early childhood education"
                    .to_string(),
                specialties: vec![
                    "Grammar".to_string(),
                    "Vocabulary".to_string(),
                    "Reading".to_string(),
                ],
                experience: 8,
            }),
        },
        User {
            id: "teacher2".to_string(),
            email: "suzan@lingonest.com".to_string(),
            username: "Miss Suzan".to_string(),
            role: Role::Teacher,
            profile_picture: Some("/assets/avatars/suzan.jpg".to_string()),
            created_at: Utc::now(),
            student: None,
            teacher: Some(TeacherProfile {
                bio: "Passionate educator focused on teen English mastery and academic success"
                    .to_string(),
                specialties: vec![
                    "Writing".to_string(),
                    "Speaking".to_string(),
                    "Literature".to_string(),
                ],
                experience: 7,
            }),
        },
        User {
            id: "student1".to_string(),
            email: "student@example.com".to_string(),
            username: "Alex Johnson".to_string(),
            role: Role::Student,
            profile_picture: Some("/assets/avatars/alex.jpg".to_string()),
            created_at: Utc::now(),
            student: Some(StudentProfile {
                enrolled_courses: Vec::new(),
                completed_lessons: Vec::new(),
                total_points: 150,
                achievements: Vec::new(),
            }),
            teacher: None,
        },
    ];
    UserStore::new(users)
}

pub fn seed_courses() -> CourseStore {
    let course1 = Course {
        id: "course1".to_string(),
        title: "Little Sprouts English".to_string(),
        description:
            "Perfect for ages 4-6. Foundation building with fun activities, songs, and interactive games."
                .to_string(),
        level: "Beginner".to_string(),
        price: 89,
        duration: "12 weeks".to_string(),
        image: "/assets/courses/little-sprouts.jpg".to_string(),
        teacher_ids: vec!["teacher1".to_string(), "teacher2".to_string()],
        lessons: vec![
            Lesson {
                id: "lesson1".to_string(),
                course_id: "course1".to_string(),
                title: "Hello World - First Words".to_string(),
                description: "Learn basic greetings and introduce yourself".to_string(),
                duration: 15,
                order: 1,
                kind: LessonKind::Video,
                video_url: Some("https://example.com/video1".to_string()),
                content: None,
                quiz: None,
                assignment: None,
            },
            Lesson {
                id: "lesson2".to_string(),
                course_id: "course1".to_string(),
                title: "Colors and Shapes Quiz".to_string(),
                description: "Interactive quiz about colors and basic shapes".to_string(),
                duration: 10,
                order: 2,
                kind: LessonKind::Quiz,
                video_url: None,
                content: None,
                quiz: Some(Quiz {
                    id: "quiz1".to_string(),
                    lesson_id: "lesson2".to_string(),
                    questions: vec![Question {
                        id: "q1".to_string(),
                        kind: QuestionKind::MultipleChoice,
                        question: "What color is the sun?".to_string(),
                        options: Some(vec![
                            "Blue".to_string(),
                            "Yellow".to_string(),
                            "Green".to_string(),
                            "Red".to_string(),
                        ]),
                        correct_answer: "Yellow".to_string(),
                        explanation: Some("The sun appears yellow in the sky!".to_string()),
                        points: 10,
                    }],
                    passing_score: 70,
                    time_limit: Some(300),
                }),
                assignment: None,
            },
        ],
        enrolled_students: Vec::new(),
        // Seeded rating reflects review history that predates the seed data.
        rating: 4.9,
        reviews: vec![Review {
            id: "review1".to_string(),
            course_id: "course1".to_string(),
            student_id: "student1".to_string(),
            student_name: "Alex Johnson".to_string(),
            rating: 5,
            comment: "My child loves this course! Very engaging and fun.".to_string(),
            created_at: Utc::now(),
            is_visible: true,
        }],
        created_at: Utc::now(),
        is_published: true,
        features: vec![
            "Interactive games".to_string(),
            "Songs & rhymes".to_string(),
            "Basic vocabulary".to_string(),
            "Letter recognition".to_string(),
        ],
    };

    let course2 = Course {
        id: "course2".to_string(),
        title: "Growing Readers".to_string(),
        description:
            "For ages 7-10. Build reading skills, expand vocabulary, and develop confidence in speaking."
                .to_string(),
        level: "Elementary".to_string(),
        price: 129,
        duration: "16 weeks".to_string(),
        image: "/assets/courses/growing-readers.jpg".to_string(),
        teacher_ids: vec!["teacher1".to_string(), "teacher2".to_string()],
        lessons: vec![Lesson {
            id: "lesson3".to_string(),
            course_id: "course2".to_string(),
            title: "Reading Adventures Begin".to_string(),
            description: "Introduction to reading comprehension".to_string(),
            duration: 20,
            order: 1,
            kind: LessonKind::Video,
            video_url: Some("https://example.com/video2".to_string()),
            content: None,
            quiz: None,
            assignment: None,
        }],
        enrolled_students: Vec::new(),
        rating: 4.8,
        reviews: Vec::new(),
        created_at: Utc::now(),
        is_published: true,
        features: vec![
            "Reading comprehension".to_string(),
            "Vocabulary building".to_string(),
            "Speaking practice".to_string(),
            "Story writing".to_string(),
        ],
    };

    let course3 = Course {
        id: "course3".to_string(),
        title: "Teen English Mastery".to_string(),
        description:
            "For ages 11-17. Advanced grammar, essay writing, and preparation for academic success."
                .to_string(),
        level: "Intermediate".to_string(),
        price: 189,
        duration: "20 weeks".to_string(),
        image: "/assets/courses/teen-mastery.jpg".to_string(),
        teacher_ids: vec!["teacher1".to_string(), "teacher2".to_string()],
        lessons: vec![Lesson {
            id: "lesson4".to_string(),
            course_id: "course3".to_string(),
            title: "Advanced Grammar Mastery".to_string(),
            description: "Complex sentence structures and advanced grammar rules".to_string(),
            duration: 25,
            order: 1,
            kind: LessonKind::Video,
            video_url: Some("https://example.com/video3".to_string()),
            content: None,
            quiz: None,
            assignment: None,
        }],
        enrolled_students: Vec::new(),
        rating: 4.9,
        reviews: Vec::new(),
        created_at: Utc::now(),
        is_published: true,
        features: vec![
            "Advanced grammar".to_string(),
            "Essay writing".to_string(),
            "Presentation skills".to_string(),
            "Exam preparation".to_string(),
        ],
    };

    CourseStore::new(vec![course1, course2, course3])
}

/// Seed both stores and wire the demo student's enrollment through the
/// normal enrollment path so the invariants hold from the start.
pub fn seed_stores() -> (CourseStore, UserStore) {
    let mut courses = seed_courses();
    let mut users = seed_users();

    if courses.enroll("course1", "student1").is_ok() {
        users.add_enrollment("student1", "course1");
    }

    (courses, users)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_student_is_enrolled_with_progress() {
        let (courses, users) = seed_stores();

        let course = courses.course("course1").unwrap();
        assert_eq!(course.total_students(), 1);

        let progress = courses.progress("course1", "student1").unwrap();
        assert_eq!(progress.total_lessons, 2);
        assert_eq!(progress.progress_percentage, 0.0);
        assert_eq!(progress.current_lesson, "lesson1");

        let student = users.user("student1").unwrap();
        assert_eq!(
            student.student.as_ref().unwrap().enrolled_courses,
            vec!["course1".to_string()]
        );
    }

    #[test]
    fn seed_catalog_is_published() {
        let courses = seed_courses();
        assert_eq!(courses.courses().len(), 3);
        assert!(courses.courses().iter().all(|c| c.is_published));
    }
}
