//! Watch history routes
//!
//! - GET    /api/v1/history
//! - POST   /api/v1/history
//! - DELETE /api/v1/history
//! - DELETE /api/v1/history/{mediaType}/{id}
use crate::auth::AuthenticatedUser;
use crate::error::Result;
use crate::server::AppState;
use actix_web::{web, HttpResponse};
use cinehub_core::{ItemEnvelope, ItemKey, ItemsEnvelope, MediaType, NewWatchHistoryEntry};
use tracing::info;
use validator::Validate;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/history")
            .route("", web::get().to(list_history))
            .route("", web::post().to(record_watch))
            .route("", web::delete().to(clear_history))
            .route("/{media_type}/{id}", web::delete().to(remove_entry)),
    );
}

async fn list_history(user: AuthenticatedUser, state: web::Data<AppState>) -> Result<HttpResponse> {
    let items = state.repository.list_history(&user.owner_id).await?;
    Ok(HttpResponse::Ok().json(ItemsEnvelope { items }))
}

/// Upsert: watching a title again refreshes its entry
async fn record_watch(
    user: AuthenticatedUser,
    body: web::Json<NewWatchHistoryEntry>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let draft = body.into_inner();
    draft.validate()?;

    let item = state.repository.record_watch(&user.owner_id, &draft).await?;

    info!(owner = %user.owner_id, key = %item.key(), "Watch recorded");
    Ok(HttpResponse::Ok().json(ItemEnvelope { item }))
}

async fn remove_entry(
    user: AuthenticatedUser,
    path: web::Path<(String, i64)>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let (media_type, id) = path.into_inner();
    let key = ItemKey::new(id, media_type.parse::<MediaType>()?);

    state
        .repository
        .remove_history_entry(&user.owner_id, key)
        .await?;

    info!(owner = %user.owner_id, key = %key, "History entry removed");
    Ok(HttpResponse::NoContent().finish())
}

async fn clear_history(user: AuthenticatedUser, state: web::Data<AppState>) -> Result<HttpResponse> {
    let removed = state.repository.clear_history(&user.owner_id).await?;

    info!(owner = %user.owner_id, removed, "Watch history cleared");
    Ok(HttpResponse::NoContent().finish())
}
