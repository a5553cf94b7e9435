//! User management routes.

use std::collections::HashMap;

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::auth::hash_password;
use crate::error::{not_found, AppError, DatabaseError, ValidationError};

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RenameUserRequest {
    pub username: String,
}

#[derive(Serialize, sqlx::FromRow)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub name: String,
    pub disabled: bool,
}

/// A blog as it appears nested under a user.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBlog {
    pub id: i32,
    pub author: Option<String>,
    pub url: String,
    pub title: String,
    pub likes: i32,
    pub year: Option<i32>,
}

#[derive(Serialize)]
pub struct UserWithBlogs {
    pub id: i32,
    pub username: String,
    pub name: String,
    pub disabled: bool,
    pub blogs: Vec<UserBlog>,
}

/// The join row linking a reading to its list entry.
#[derive(Serialize)]
pub struct ReadingListState {
    pub id: i32,
    pub read: bool,
}

/// A blog on a user's reading list, tagged with the entry that put it there.
#[derive(Serialize)]
pub struct ReadingBlog {
    #[serde(flatten)]
    pub blog: UserBlog,
    pub readinglist: ReadingListState,
}

#[derive(Serialize)]
pub struct UserDetail {
    pub id: i32,
    pub username: String,
    pub name: String,
    pub disabled: bool,
    pub blogs: Vec<UserBlog>,
    pub readings: Vec<ReadingBlog>,
}

fn require_non_blank(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(ValidationError::EmptyField(
            field.to_string(),
        )));
    }
    Ok(())
}

fn map_duplicate_username(err: AppError) -> AppError {
    match err {
        AppError::Database(DatabaseError::Duplicate(_)) => AppError::Database(
            DatabaseError::Duplicate("username already taken".to_string()),
        ),
        other => other,
    }
}

type UserBlogRow = (i32, Option<String>, String, String, i32, Option<i32>);

fn user_blog((id, author, url, title, likes, year): UserBlogRow) -> UserBlog {
    UserBlog {
        id,
        author,
        url,
        title,
        likes,
        year,
    }
}

/// POST /api/users
pub async fn create_user(
    form: web::Json<CreateUserRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    require_non_blank("name", &form.name)?;
    require_non_blank("username", &form.username)?;
    let password_hash = hash_password(&form.password)?;

    let user = sqlx::query_as::<_, UserResponse>(
        r#"
        INSERT INTO users (name, username, password_hash)
        VALUES ($1, $2, $3)
        RETURNING id, username, name, disabled
        "#,
    )
    .bind(form.name.trim())
    .bind(form.username.trim())
    .bind(&password_hash)
    .fetch_one(pool.get_ref())
    .await
    .map_err(|e| map_duplicate_username(e.into()))?;

    tracing::info!(user_id = user.id, "user created");

    Ok(HttpResponse::Created().json(user))
}

/// GET /api/users
///
/// Lists users with their blogs nested under each.
pub async fn list_users(pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let users = sqlx::query_as::<_, UserResponse>(
        "SELECT id, username, name, disabled FROM users ORDER BY id ASC",
    )
    .fetch_all(pool.get_ref())
    .await?;

    let blog_rows = sqlx::query_as::<_, (i32, i32, Option<String>, String, String, i32, Option<i32>)>(
        r#"
        SELECT user_id, id, author, url, title, likes, year
        FROM blogs
        WHERE user_id IS NOT NULL
        ORDER BY id ASC
        "#,
    )
    .fetch_all(pool.get_ref())
    .await?;

    let mut blogs_by_user: HashMap<i32, Vec<UserBlog>> = HashMap::new();
    for (user_id, id, author, url, title, likes, year) in blog_rows {
        blogs_by_user
            .entry(user_id)
            .or_default()
            .push(user_blog((id, author, url, title, likes, year)));
    }

    let users: Vec<UserWithBlogs> = users
        .into_iter()
        .map(|u| UserWithBlogs {
            blogs: blogs_by_user.remove(&u.id).unwrap_or_default(),
            id: u.id,
            username: u.username,
            name: u.name,
            disabled: u.disabled,
        })
        .collect();

    Ok(HttpResponse::Ok().json(users))
}

/// GET /api/users/{id}
///
/// One user with their blogs and their reading list; each reading carries
/// the list entry's id and read flag.
pub async fn get_user(
    path: web::Path<i32>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let user = sqlx::query_as::<_, UserResponse>(
        "SELECT id, username, name, disabled FROM users WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or_else(|| not_found("user"))?;

    let blogs = sqlx::query_as::<_, UserBlogRow>(
        r#"
        SELECT id, author, url, title, likes, year
        FROM blogs
        WHERE user_id = $1
        ORDER BY id ASC
        "#,
    )
    .bind(id)
    .fetch_all(pool.get_ref())
    .await?;

    let readings = sqlx::query_as::<_, (i32, Option<String>, String, String, i32, Option<i32>, i32, bool)>(
        r#"
        SELECT b.id, b.author, b.url, b.title, b.likes, b.year, r.id, r.read
        FROM readinglists r
        JOIN blogs b ON b.id = r.blog_id
        WHERE r.user_id = $1
        ORDER BY r.id ASC
        "#,
    )
    .bind(id)
    .fetch_all(pool.get_ref())
    .await?;

    let detail = UserDetail {
        id: user.id,
        username: user.username,
        name: user.name,
        disabled: user.disabled,
        blogs: blogs.into_iter().map(user_blog).collect(),
        readings: readings
            .into_iter()
            .map(|(id, author, url, title, likes, year, entry_id, read)| ReadingBlog {
                blog: user_blog((id, author, url, title, likes, year)),
                readinglist: ReadingListState { id: entry_id, read },
            })
            .collect(),
    };

    Ok(HttpResponse::Ok().json(detail))
}

/// PUT /api/users/{username}
///
/// Changes an account's handle. The handle stays unique; taking one that
/// is already in use is a conflict.
pub async fn rename_user(
    path: web::Path<String>,
    form: web::Json<RenameUserRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let current_username = path.into_inner();
    require_non_blank("username", &form.username)?;

    let user = sqlx::query_as::<_, UserResponse>(
        r#"
        UPDATE users
        SET username = $1, updated_at = now()
        WHERE username = $2
        RETURNING id, username, name, disabled
        "#,
    )
    .bind(form.username.trim())
    .bind(&current_username)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| map_duplicate_username(e.into()))?
    .ok_or_else(|| not_found("user"))?;

    Ok(HttpResponse::Ok().json(user))
}
