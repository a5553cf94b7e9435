//! Author statistics.

use actix_web::{web, HttpResponse};
use serde::Serialize;
use sqlx::PgPool;

use crate::error::AppError;

#[derive(Serialize)]
pub struct AuthorStats {
    pub author: String,
    pub articles: i64,
    pub likes: i64,
}

/// GET /api/authors
///
/// Per-author article count and total likes, most-liked authors first.
pub async fn list_authors(pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let rows = sqlx::query_as::<_, (String, i64, i64)>(
        r#"
        SELECT author, COUNT(id), COALESCE(SUM(likes), 0)
        FROM blogs
        WHERE author IS NOT NULL
        GROUP BY author
        ORDER BY SUM(likes) DESC, author ASC
        "#,
    )
    .fetch_all(pool.get_ref())
    .await?;

    let authors: Vec<AuthorStats> = rows
        .into_iter()
        .map(|(author, articles, likes)| AuthorStats {
            author,
            articles,
            likes,
        })
        .collect();

    Ok(HttpResponse::Ok().json(authors))
}
