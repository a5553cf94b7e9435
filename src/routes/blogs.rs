//! Blog routes.
//!
//! Listing is public; creating requires an authenticated session and
//! deleting additionally requires ownership of the blog.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::auth::{authenticate, TokenCodec};
use crate::error::{not_found, AppError, ValidationError};
use crate::middleware::bearer_token;

#[derive(Deserialize)]
pub struct CreateBlogRequest {
    pub author: Option<String>,
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub likes: i32,
    pub year: Option<i32>,
}

#[derive(Deserialize)]
pub struct UpdateBlogRequest {
    pub likes: i32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogResponse {
    pub id: i32,
    pub author: Option<String>,
    pub url: String,
    pub title: String,
    pub likes: i32,
    pub year: Option<i32>,
    pub user_id: Option<i32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogOwner {
    pub id: i32,
    pub username: String,
    pub name: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogWithOwner {
    #[serde(flatten)]
    pub blog: BlogResponse,
    pub user: Option<BlogOwner>,
}

type BlogRow = (i32, Option<String>, String, String, i32, Option<i32>, Option<i32>);

fn blog_response(row: BlogRow) -> BlogResponse {
    let (id, author, url, title, likes, year, user_id) = row;
    BlogResponse {
        id,
        author,
        url,
        title,
        likes,
        year,
        user_id,
    }
}

fn require_non_blank(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(ValidationError::EmptyField(
            field.to_string(),
        )));
    }
    Ok(())
}

/// GET /api/blogs
pub async fn list_blogs(pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let rows = sqlx::query_as::<
        _,
        (
            i32,
            Option<String>,
            String,
            String,
            i32,
            Option<i32>,
            Option<i32>,
            Option<String>,
            Option<String>,
        ),
    >(
        r#"
        SELECT b.id, b.author, b.url, b.title, b.likes, b.year, b.user_id, u.username, u.name
        FROM blogs b
        LEFT JOIN users u ON u.id = b.user_id
        ORDER BY b.id ASC
        "#,
    )
    .fetch_all(pool.get_ref())
    .await?;

    let blogs: Vec<BlogWithOwner> = rows
        .into_iter()
        .map(|(id, author, url, title, likes, year, user_id, username, name)| {
            let user = match (user_id, username, name) {
                (Some(id), Some(username), Some(name)) => Some(BlogOwner { id, username, name }),
                _ => None,
            };
            BlogWithOwner {
                blog: blog_response((id, author, url, title, likes, year, user_id)),
                user,
            }
        })
        .collect();

    Ok(HttpResponse::Ok().json(blogs))
}

/// POST /api/blogs
///
/// Requires a bearer token; the blog is owned by the authenticated user.
pub async fn create_blog(
    req: HttpRequest,
    form: web::Json<CreateBlogRequest>,
    pool: web::Data<PgPool>,
    codec: web::Data<TokenCodec>,
) -> Result<HttpResponse, AppError> {
    let bearer = bearer_token(req.headers());
    let user = authenticate(pool.get_ref(), codec.get_ref(), bearer.as_deref()).await?;

    require_non_blank("url", &form.url)?;
    require_non_blank("title", &form.title)?;

    let blog = sqlx::query_as::<_, BlogRow>(
        r#"
        INSERT INTO blogs (author, url, title, likes, year, user_id)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, author, url, title, likes, year, user_id
        "#,
    )
    .bind(&form.author)
    .bind(form.url.trim())
    .bind(form.title.trim())
    .bind(form.likes)
    .bind(form.year)
    .bind(user.user_id)
    .fetch_one(pool.get_ref())
    .await?;

    tracing::info!(blog_id = blog.0, user_id = user.user_id, "blog created");

    Ok(HttpResponse::Created().json(blog_response(blog)))
}

/// PUT /api/blogs/{id}
pub async fn update_blog(
    path: web::Path<i32>,
    form: web::Json<UpdateBlogRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let blog = sqlx::query_as::<_, BlogRow>(
        r#"
        UPDATE blogs
        SET likes = $1, updated_at = now()
        WHERE id = $2
        RETURNING id, author, url, title, likes, year, user_id
        "#,
    )
    .bind(form.likes)
    .bind(id)
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or_else(|| not_found("blog"))?;

    Ok(HttpResponse::Ok().json(blog_response(blog)))
}

/// DELETE /api/blogs/{id}
///
/// Requires a bearer token; only the blog's owner may delete it.
pub async fn delete_blog(
    req: HttpRequest,
    path: web::Path<i32>,
    pool: web::Data<PgPool>,
    codec: web::Data<TokenCodec>,
) -> Result<HttpResponse, AppError> {
    let bearer = bearer_token(req.headers());
    let user = authenticate(pool.get_ref(), codec.get_ref(), bearer.as_deref()).await?;

    let id = path.into_inner();

    let owner_id = sqlx::query_as::<_, (Option<i32>,)>("SELECT user_id FROM blogs WHERE id = $1")
        .bind(id)
        .fetch_optional(pool.get_ref())
        .await?
        .ok_or_else(|| not_found("blog"))?
        .0;

    if owner_id != Some(user.user_id) {
        return Err(AppError::Forbidden);
    }

    sqlx::query("DELETE FROM blogs WHERE id = $1")
        .bind(id)
        .execute(pool.get_ref())
        .await?;

    tracing::info!(blog_id = id, user_id = user.user_id, "blog deleted");

    Ok(HttpResponse::NoContent().finish())
}
