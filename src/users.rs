use actix_web::{get, post, put, web, HttpRequest, HttpResponse, Responder};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use log::error;
use serde::{Deserialize, Serialize};

use crate::store::{AuthError, NewStudent, ProfileUpdate, User};
use crate::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    pub profile_picture: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,        // user id
    pub exp: usize,         // expiration time
    pub roles: Vec<String>, // user roles
}

/// Extract and validate JWT token from request
/// Returns Claims if valid, or an error HttpResponse
pub fn verify_token(req: &HttpRequest, app_state: &AppState) -> Result<Claims, HttpResponse> {
    let auth_header = req.headers().get("Authorization");

    let token = match auth_header {
        Some(header) => {
            let header_str = header.to_str().unwrap_or("");
            if header_str.starts_with("Bearer ") {
                &header_str[7..]
            } else {
                return Err(HttpResponse::Unauthorized().json(serde_json::json!({
                    "error": "Invalid authorization header"
                })));
            }
        }
        None => {
            return Err(HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "Missing authorization header"
            })));
        }
    };

    let claims = match decode::<Claims>(
        token,
        &DecodingKey::from_secret(app_state.jwt_secret.as_ref()),
        &Validation::default(),
    ) {
        Ok(data) => data.claims,
        Err(_) => {
            return Err(HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "Invalid token"
            })));
        }
    };

    Ok(claims)
}

pub fn verify_teacher_role(req: &HttpRequest, app_state: &AppState) -> Result<Claims, HttpResponse> {
    let claims = verify_token(req, app_state)?;

    if !claims.roles.contains(&"teacher".to_string()) {
        return Err(HttpResponse::Forbidden().json(serde_json::json!({
            "error": "Teacher access required"
        })));
    }

    Ok(claims)
}

fn issue_token(user: &User, jwt_secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(24))
        .expect("valid timestamp")
        .timestamp() as usize;

    let claims = Claims {
        sub: user.id.clone(),
        exp: expiration,
        roles: vec![user.role.as_str().to_string()],
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_ref()),
    )
}

#[post("/login")]
async fn login(
    app_state: web::Data<AppState>,
    credentials: web::Json<LoginRequest>,
) -> impl Responder {
    let user = {
        let users = app_state.users.read().await;
        match users.authenticate(&credentials.email, &credentials.password) {
            Ok(user) => user.clone(),
            Err(AuthError::InvalidCredentials) => {
                return HttpResponse::Unauthorized().json(ErrorResponse {
                    error: "Invalid credentials".to_string(),
                });
            }
            Err(e) => {
                error!("Login error: {}", e);
                return HttpResponse::InternalServerError().json(ErrorResponse {
                    error: "Internal server error".to_string(),
                });
            }
        }
    };

    let token = match issue_token(&user, &app_state.jwt_secret) {
        Ok(t) => t,
        Err(e) => {
            error!("JWT encoding error: {}", e);
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Could not generate token".to_string(),
            });
        }
    };

    if let Err(e) = app_state.sessions.save(&user).await {
        error!("Failed to persist session snapshot: {}", e);
    }

    HttpResponse::Ok().json(AuthResponse { token, user })
}

#[post("/signup")]
async fn signup(
    app_state: web::Data<AppState>,
    request: web::Json<SignupRequest>,
) -> impl Responder {
    let request = request.into_inner();

    if request.email.trim().is_empty() || request.username.trim().is_empty() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Email and username are required".to_string(),
        });
    }
    if request.password.len() < 6 {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Password must be at least 6 characters".to_string(),
        });
    }

    let user = {
        let mut users = app_state.users.write().await;
        match users.signup(NewStudent {
            email: request.email,
            username: request.username,
            profile_picture: request.profile_picture,
        }) {
            Ok(user) => user,
            Err(AuthError::EmailTaken) => {
                return HttpResponse::Conflict().json(ErrorResponse {
                    error: "Email already registered".to_string(),
                });
            }
            Err(e) => {
                error!("Signup error: {}", e);
                return HttpResponse::InternalServerError().json(ErrorResponse {
                    error: "Internal server error".to_string(),
                });
            }
        }
    };

    // New accounts are authenticated immediately.
    let token = match issue_token(&user, &app_state.jwt_secret) {
        Ok(t) => t,
        Err(e) => {
            error!("JWT encoding error: {}", e);
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Could not generate token".to_string(),
            });
        }
    };

    if let Err(e) = app_state.sessions.save(&user).await {
        error!("Failed to persist session snapshot: {}", e);
    }

    HttpResponse::Created().json(AuthResponse { token, user })
}

#[post("/logout")]
async fn logout(app_state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    if let Err(response) = verify_token(&req, &app_state) {
        return response;
    }

    if let Err(e) = app_state.sessions.clear().await {
        error!("Failed to clear session snapshot: {}", e);
    }

    HttpResponse::Ok().json(serde_json::json!({
        "message": "Logged out"
    }))
}

#[get("/validate")]
async fn validate_token_endpoint(
    req: HttpRequest,
    app_state: web::Data<AppState>,
) -> impl Responder {
    let claims = match verify_token(&req, &app_state) {
        Ok(claims) => claims,
        Err(response) => return response,
    };

    let users = app_state.users.read().await;
    match users.user(&claims.sub) {
        Some(user) => HttpResponse::Ok().json(serde_json::json!({
            "valid": true,
            "user_id": user.id,
            "roles": claims.roles,
        })),
        None => HttpResponse::Unauthorized().json(serde_json::json!({
            "error": "User not found",
        })),
    }
}

/// Get current user's profile
#[get("")]
async fn get_profile(app_state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    let claims = match verify_token(&req, &app_state) {
        Ok(claims) => claims,
        Err(response) => return response,
    };

    let users = app_state.users.read().await;
    match users.user(&claims.sub) {
        Some(user) => HttpResponse::Ok().json(user),
        None => HttpResponse::NotFound().json(ErrorResponse {
            error: "User not found".to_string(),
        }),
    }
}

/// Update current user's profile
#[put("")]
async fn update_profile(
    app_state: web::Data<AppState>,
    req: HttpRequest,
    updates: web::Json<ProfileUpdate>,
) -> impl Responder {
    let claims = match verify_token(&req, &app_state) {
        Ok(claims) => claims,
        Err(response) => return response,
    };

    let user = {
        let mut users = app_state.users.write().await;
        match users.update_profile(&claims.sub, updates.into_inner()) {
            Ok(user) => user,
            Err(AuthError::UserNotFound) => {
                return HttpResponse::NotFound().json(ErrorResponse {
                    error: "User not found".to_string(),
                });
            }
            Err(e) => {
                error!("Profile update error: {}", e);
                return HttpResponse::InternalServerError().json(ErrorResponse {
                    error: "Internal server error".to_string(),
                });
            }
        }
    };

    if let Err(e) = app_state.sessions.save(&user).await {
        error!("Failed to persist session snapshot: {}", e);
    }

    HttpResponse::Ok().json(user)
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/auth")
            .service(login)
            .service(signup)
            .service(logout)
            .service(validate_token_endpoint),
    );
    cfg.service(
        web::scope("/api/profile")
            .service(get_profile)
            .service(update_profile),
    );
}
