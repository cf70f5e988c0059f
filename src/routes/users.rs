use std::collections::HashMap;

use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use rusqlite::params;
use serde::{Deserialize, Serialize};

use crate::db::models::User;
use crate::error::{AppError, AppResult};
use crate::routes::require_field;
use crate::state::AppState;
use crate::upload;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/validateUser", post(validate_user))
        .route("/getUserProfile", get(get_user_profile))
}

// --- Request / response types ---

#[derive(Serialize)]
pub struct RegisteredUser {
    pub id: String,
    pub uname: String,
    pub email: String,
    pub photo_path: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub upassword: String,
}

#[derive(Serialize)]
pub struct LoginProfile {
    pub uname: String,
    pub email: String,
    pub address: String,
    pub photo_path: Option<String>,
}

#[derive(Deserialize)]
pub struct ValidateUserRequest {
    pub email: String,
}

// --- Handlers ---

/// POST /register — multipart form with an optional `photo` attachment.
/// The unique index on users.email makes the insert itself report a
/// duplicate, so there is no check-then-insert race.
async fn register(State(state): State<AppState>, multipart: Multipart) -> AppResult<Response> {
    let (fields, photo) = upload::collect_form(multipart, "photo").await?;

    let uname = require_field(&fields, "uname")?.to_string();
    let email = require_field(&fields, "email")?.to_string();
    let unumber = require_field(&fields, "unumber")?.to_string();
    let country = require_field(&fields, "country")?.to_string();
    let city = require_field(&fields, "city")?.to_string();
    let address = require_field(&fields, "address")?.to_string();
    let upassword = require_field(&fields, "upassword")?.to_string();

    let photo_path = match photo {
        Some(file) => Some(
            upload::save(state.config.uploads_path(), &file.original_name, file.data).await?,
        ),
        None => None,
    };

    let password_hash = bcrypt::hash(&upassword, bcrypt::DEFAULT_COST)?;
    let user_id = uuid::Uuid::now_v7().to_string();

    {
        let conn = state.db.get()?;
        let inserted = conn.execute(
            "INSERT INTO users (id, uname, email, unumber, country, city, address, password_hash, photo_path)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                user_id,
                uname,
                email,
                unumber,
                country,
                city,
                address,
                password_hash,
                photo_path
            ],
        );
        match inserted {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                return Err(AppError::Conflict("Email already registered".into()));
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok((
        StatusCode::CREATED,
        Json(RegisteredUser {
            id: user_id,
            uname,
            email,
            photo_path,
        }),
    )
        .into_response())
}

/// POST /login — plain credential check, answers profile fields on match.
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginProfile>> {
    let conn = state.db.get()?;
    let user = query_user_by_email(&conn, req.email.trim()).map_err(|_| AppError::Unauthorized)?;

    if !bcrypt::verify(&req.upassword, &user.password_hash)? {
        return Err(AppError::Unauthorized);
    }

    Ok(Json(LoginProfile {
        uname: user.uname,
        email: user.email,
        address: user.address,
        photo_path: user.photo_path,
    }))
}

/// POST /validateUser — existence check by email.
async fn validate_user(
    State(state): State<AppState>,
    Json(req): Json<ValidateUserRequest>,
) -> AppResult<Response> {
    let conn = state.db.get()?;
    let exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM users WHERE email = ?1",
        params![req.email.trim()],
        |row| row.get(0),
    )?;

    if exists {
        Ok((StatusCode::OK, "User exists").into_response())
    } else {
        Err(AppError::NotFound)
    }
}

/// GET /getUserProfile?userId=... — full profile minus the password hash.
async fn get_user_profile(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> AppResult<Json<User>> {
    let user_id = query
        .get("userId")
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::BadRequest("userId is required".into()))?;

    let conn = state.db.get()?;
    let user = conn
        .query_row(
            "SELECT id, uname, email, unumber, country, city, address, password_hash, photo_path, created_at
             FROM users WHERE id = ?1",
            params![user_id],
            map_user_row,
        )
        .map_err(|_| AppError::NotFound)?;

    Ok(Json(user))
}

// --- Query helpers ---

fn query_user_by_email(
    conn: &rusqlite::Connection,
    email: &str,
) -> Result<User, rusqlite::Error> {
    conn.query_row(
        "SELECT id, uname, email, unumber, country, city, address, password_hash, photo_path, created_at
         FROM users WHERE email = ?1",
        params![email],
        map_user_row,
    )
}

fn map_user_row(row: &rusqlite::Row<'_>) -> Result<User, rusqlite::Error> {
    Ok(User {
        id: row.get(0)?,
        uname: row.get(1)?,
        email: row.get(2)?,
        unumber: row.get(3)?,
        country: row.get(4)?,
        city: row.get(5)?,
        address: row.get(6)?,
        password_hash: row.get(7)?,
        photo_path: row.get(8)?,
        created_at: row.get(9)?,
    })
}
