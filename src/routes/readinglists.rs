//! Reading list routes. All of them require an authenticated session, and
//! a user may only touch their own list.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::auth::CurrentUser;
use crate::error::{not_found, AppError, DatabaseError};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEntryRequest {
    pub blog_id: i32,
    pub user_id: i32,
}

#[derive(Deserialize)]
pub struct UpdateEntryRequest {
    pub read: bool,
}

#[derive(Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ReadingListEntry {
    pub id: i32,
    pub user_id: i32,
    pub blog_id: i32,
    pub read: bool,
}

/// POST /api/readinglists
pub async fn create_entry(
    user: web::ReqData<CurrentUser>,
    form: web::Json<CreateEntryRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    if form.user_id != user.user_id {
        return Err(AppError::Forbidden);
    }

    let (user_exists, blog_exists) = sqlx::query_as::<_, (bool, bool)>(
        r#"
        SELECT
            EXISTS(SELECT 1 FROM users WHERE id = $1),
            EXISTS(SELECT 1 FROM blogs WHERE id = $2)
        "#,
    )
    .bind(form.user_id)
    .bind(form.blog_id)
    .fetch_one(pool.get_ref())
    .await?;

    if !user_exists || !blog_exists {
        return Err(not_found("user or blog"));
    }

    let entry = sqlx::query_as::<_, ReadingListEntry>(
        r#"
        INSERT INTO readinglists (user_id, blog_id)
        VALUES ($1, $2)
        RETURNING id, user_id, blog_id, read
        "#,
    )
    .bind(form.user_id)
    .bind(form.blog_id)
    .fetch_one(pool.get_ref())
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.code().as_deref() == Some("23505") {
                return AppError::Database(DatabaseError::Duplicate(
                    "blog already in reading list".to_string(),
                ));
            }
        }
        e.into()
    })?;

    Ok(HttpResponse::Created().json(entry))
}

/// PUT /api/readinglists/{id}
///
/// Marks an entry read or unread. Only the entry's owner may change it.
pub async fn update_entry(
    user: web::ReqData<CurrentUser>,
    path: web::Path<i32>,
    form: web::Json<UpdateEntryRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let entry = sqlx::query_as::<_, ReadingListEntry>(
        "SELECT id, user_id, blog_id, read FROM readinglists WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or_else(|| not_found("reading list entry"))?;

    if entry.user_id != user.user_id {
        return Err(AppError::Forbidden);
    }

    let updated = sqlx::query_as::<_, ReadingListEntry>(
        r#"
        UPDATE readinglists
        SET read = $1
        WHERE id = $2
        RETURNING id, user_id, blog_id, read
        "#,
    )
    .bind(form.read)
    .bind(id)
    .fetch_one(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(updated))
}
