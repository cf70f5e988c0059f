use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: String,
    pub uname: String,
    pub email: String,
    pub unumber: String,
    pub country: String,
    pub city: String,
    pub address: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub photo_path: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    #[serde(rename = "postid")]
    pub post_id: String,
    #[serde(rename = "userid")]
    pub user_id: String,
    pub username: String,
    pub userphoto: Option<String>,
    pub comment: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub title: String,
    pub img: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub product_title: String,
    pub category_title: String,
    pub pdetails: String,
    pub brand_name: String,
    pub category_id: Option<String>,
    pub pimg: String,
    pub created_at: String,
}
