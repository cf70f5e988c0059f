use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use rusqlite::params;
use serde::Serialize;

use crate::db::models::{Category, Product};
use crate::error::{AppError, AppResult};
use crate::routes::require_field;
use crate::state::AppState;
use crate::upload;

/// Stored in place of an image filename when a category is created
/// without one.
pub const PLACEHOLDER_IMG: &str = "placeholder.png";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/addCategory", post(add_category))
        .route("/getCategories", get(get_categories))
        .route("/addProduct", post(add_product))
        .route("/products/{category}", get(products_by_category))
}

#[derive(Serialize)]
struct CreatedCategory {
    id: String,
}

#[derive(Serialize)]
struct CreatedProduct {
    id: String,
}

// --- Handlers ---

/// POST /addCategory — multipart form: title, optional img attachment.
async fn add_category(State(state): State<AppState>, multipart: Multipart) -> AppResult<Response> {
    let (fields, image) = upload::collect_form(multipart, "img").await?;

    let title = require_field(&fields, "title")?.to_string();

    let img = match image {
        Some(file) => {
            upload::save(state.config.uploads_path(), &file.original_name, file.data).await?
        }
        None => PLACEHOLDER_IMG.to_string(),
    };

    let category_id = uuid::Uuid::now_v7().to_string();
    {
        let conn = state.db.get()?;
        conn.execute(
            "INSERT INTO categories (id, title, img) VALUES (?1, ?2, ?3)",
            params![category_id, title, img],
        )?;
    }

    Ok((StatusCode::CREATED, Json(CreatedCategory { id: category_id })).into_response())
}

/// GET /getCategories — every category, oldest first.
async fn get_categories(State(state): State<AppState>) -> AppResult<Json<Vec<Category>>> {
    let conn = state.db.get()?;
    let categories = query_categories(&conn)?;
    Ok(Json(categories))
}

/// POST /addProduct — multipart form: product_title, title (category
/// title), pdetails, brandName, optional categoryId, pimg attachment.
async fn add_product(State(state): State<AppState>, multipart: Multipart) -> AppResult<Response> {
    let (fields, image) = upload::collect_form(multipart, "pimg").await?;

    let product_title = require_field(&fields, "product_title")?.to_string();
    let category_title = require_field(&fields, "title")?.to_string();
    let pdetails = require_field(&fields, "pdetails")?.to_string();
    let brand_name = require_field(&fields, "brandName")?.to_string();
    let category_id = fields
        .get("categoryId")
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    let image = image.ok_or_else(|| AppError::BadRequest("pimg is required".into()))?;

    let pimg = upload::save(state.config.uploads_path(), &image.original_name, image.data).await?;

    let product_id = uuid::Uuid::now_v7().to_string();
    {
        let conn = state.db.get()?;
        conn.execute(
            "INSERT INTO products (id, product_title, category_title, pdetails, brand_name, category_id, pimg)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                product_id,
                product_title,
                category_title,
                pdetails,
                brand_name,
                category_id,
                pimg
            ],
        )?;
    }

    Ok((StatusCode::CREATED, Json(CreatedProduct { id: product_id })).into_response())
}

/// GET /products/{category} — products whose category title matches.
async fn products_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> AppResult<Json<Vec<Product>>> {
    let conn = state.db.get()?;
    let products = query_products(&conn, &category)?;
    Ok(Json(products))
}

// --- Query helpers ---

fn query_categories(conn: &rusqlite::Connection) -> Result<Vec<Category>, AppError> {
    let mut stmt = conn.prepare(
        "SELECT id, title, img, created_at FROM categories ORDER BY id ASC",
    )?;

    let categories = stmt
        .query_map([], |row| {
            Ok(Category {
                id: row.get(0)?,
                title: row.get(1)?,
                img: row.get(2)?,
                created_at: row.get(3)?,
            })
        })?
        .filter_map(|r| r.ok())
        .collect();

    Ok(categories)
}

fn query_products(conn: &rusqlite::Connection, category: &str) -> Result<Vec<Product>, AppError> {
    let mut stmt = conn.prepare(
        "SELECT id, product_title, category_title, pdetails, brand_name, category_id, pimg, created_at
         FROM products
         WHERE category_title = ?1
         ORDER BY id ASC",
    )?;

    let products = stmt
        .query_map(params![category], |row| {
            Ok(Product {
                id: row.get(0)?,
                product_title: row.get(1)?,
                category_title: row.get(2)?,
                pdetails: row.get(3)?,
                brand_name: row.get(4)?,
                category_id: row.get(5)?,
                pimg: row.get(6)?,
                created_at: row.get(7)?,
            })
        })?
        .filter_map(|r| r.ok())
        .collect();

    Ok(products)
}
