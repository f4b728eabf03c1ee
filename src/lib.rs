pub mod courses;
pub mod dashboard;
pub mod enrollment;
pub mod reviews;
pub mod seed;
pub mod storage;
pub mod store;
pub mod users;

use actix_cors::Cors;
use actix_web::{middleware, web, App};
use tokio::sync::RwLock;

use crate::storage::SessionService;
use crate::store::{CourseStore, UserStore};

pub struct AppState {
    pub courses: RwLock<CourseStore>,
    pub users: RwLock<UserStore>,
    pub jwt_secret: String,
    pub sessions: SessionService,
}

pub fn create_app(app_state: web::Data<AppState>) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(app_state)
        .wrap(
            Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600),
        )
        .wrap(middleware::Logger::default())
        .configure(users::configure)
        // Absolute course sub-routes must come before the catalog scope,
        // which would otherwise swallow the /api/courses prefix.
        .configure(enrollment::configure)
        .configure(reviews::configure)
        .configure(dashboard::configure)
        .configure(courses::configure)
}
