use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use rusqlite::params;
use serde::{Deserialize, Serialize};

use crate::db::models::Comment;
use crate::error::{AppError, AppResult};
use crate::routes::require_field;
use crate::state::AppState;
use crate::upload;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/uploadPost", post(upload_post))
        .route("/getPosts", get(get_posts))
        .route("/add-comment", post(add_comment))
        .route("/comments/{postid}", get(list_comments))
}

// --- View structs ---

/// A post as the feed renders it: author name and photo come from the
/// users table at read time, not from a write-time copy.
#[derive(Debug, Serialize)]
pub struct FeedPost {
    pub id: String,
    pub username: String,
    pub userphoto: Option<String>,
    pub pdetails: String,
    pub ptags: String,
    pub pimg: String,
    pub created_at: String,
}

#[derive(Serialize)]
struct CreatedPost {
    id: String,
}

#[derive(Deserialize)]
pub struct AddCommentRequest {
    pub postid: String,
    pub userid: String,
    pub userphoto: Option<String>,
    pub username: String,
    pub comment: String,
}

// --- Handlers ---

/// POST /uploadPost — multipart form: email, pdetails, ptags, pimg.
/// The posting user must already exist; the post row references them.
async fn upload_post(State(state): State<AppState>, multipart: Multipart) -> AppResult<Response> {
    let (fields, image) = upload::collect_form(multipart, "pimg").await?;

    let email = require_field(&fields, "email")?.to_string();
    let pdetails = require_field(&fields, "pdetails")?.to_string();
    let ptags = require_field(&fields, "ptags")?.to_string();
    let image = image.ok_or_else(|| AppError::BadRequest("pimg is required".into()))?;

    let user_id: String = {
        let conn = state.db.get()?;
        conn.query_row(
            "SELECT id FROM users WHERE email = ?1",
            params![email],
            |row| row.get(0),
        )
        .map_err(|_| AppError::NotFound)?
    };

    let pimg = upload::save(state.config.uploads_path(), &image.original_name, image.data).await?;

    let post_id = uuid::Uuid::now_v7().to_string();
    {
        let conn = state.db.get()?;
        conn.execute(
            "INSERT INTO posts (id, user_id, pdetails, ptags, pimg) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![post_id, user_id, pdetails, ptags, pimg],
        )?;
    }

    Ok((StatusCode::CREATED, Json(CreatedPost { id: post_id })).into_response())
}

/// GET /getPosts — every post, newest first.
async fn get_posts(State(state): State<AppState>) -> AppResult<Json<Vec<FeedPost>>> {
    let conn = state.db.get()?;
    let posts = query_posts(&conn)?;
    Ok(Json(posts))
}

/// POST /add-comment — stores the caller-supplied author fields verbatim.
async fn add_comment(
    State(state): State<AppState>,
    Json(req): Json<AddCommentRequest>,
) -> AppResult<Response> {
    let postid = req.postid.trim().to_string();
    let userid = req.userid.trim().to_string();
    let username = req.username.trim().to_string();
    let comment = req.comment.trim().to_string();
    if postid.is_empty() || userid.is_empty() || username.is_empty() || comment.is_empty() {
        return Err(AppError::BadRequest(
            "postid, userid, username and comment are required".into(),
        ));
    }

    let comment_id = uuid::Uuid::now_v7().to_string();
    let conn = state.db.get()?;
    conn.execute(
        "INSERT INTO comments (id, post_id, user_id, username, userphoto, comment)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![comment_id, postid, userid, username, req.userphoto, comment],
    )?;

    let stored = conn.query_row(
        "SELECT id, post_id, user_id, username, userphoto, comment, created_at
         FROM comments WHERE id = ?1",
        params![comment_id],
        map_comment_row,
    )?;

    Ok((StatusCode::CREATED, Json(stored)).into_response())
}

/// GET /comments/{postid} — comments for one post, newest first.
async fn list_comments(
    State(state): State<AppState>,
    Path(postid): Path<String>,
) -> AppResult<Json<Vec<Comment>>> {
    let conn = state.db.get()?;
    let comments = query_comments(&conn, &postid)?;
    Ok(Json(comments))
}

// --- Query helpers ---

fn query_posts(conn: &rusqlite::Connection) -> Result<Vec<FeedPost>, AppError> {
    let mut stmt = conn.prepare(
        "SELECT p.id, u.uname, u.photo_path, p.pdetails, p.ptags, p.pimg, p.created_at
         FROM posts p
         JOIN users u ON u.id = p.user_id
         ORDER BY p.created_at DESC, p.id DESC",
    )?;

    let posts = stmt
        .query_map([], |row| {
            Ok(FeedPost {
                id: row.get(0)?,
                username: row.get(1)?,
                userphoto: row.get(2)?,
                pdetails: row.get(3)?,
                ptags: row.get(4)?,
                pimg: row.get(5)?,
                created_at: row.get(6)?,
            })
        })?
        .filter_map(|r| r.ok())
        .collect();

    Ok(posts)
}

fn query_comments(conn: &rusqlite::Connection, postid: &str) -> Result<Vec<Comment>, AppError> {
    let mut stmt = conn.prepare(
        "SELECT id, post_id, user_id, username, userphoto, comment, created_at
         FROM comments
         WHERE post_id = ?1
         ORDER BY created_at DESC, id DESC",
    )?;

    let comments = stmt
        .query_map(params![postid], map_comment_row)?
        .filter_map(|r| r.ok())
        .collect();

    Ok(comments)
}

fn map_comment_row(row: &rusqlite::Row<'_>) -> Result<Comment, rusqlite::Error> {
    Ok(Comment {
        id: row.get(0)?,
        post_id: row.get(1)?,
        user_id: row.get(2)?,
        username: row.get(3)?,
        userphoto: row.get(4)?,
        comment: row.get(5)?,
        created_at: row.get(6)?,
    })
}
