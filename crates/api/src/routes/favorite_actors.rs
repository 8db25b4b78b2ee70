//! Favorite actor routes
//!
//! - GET    /api/v1/favorite-actors
//! - POST   /api/v1/favorite-actors
//! - DELETE /api/v1/favorite-actors/{actor_id}
use crate::auth::AuthenticatedUser;
use crate::error::Result;
use crate::server::AppState;
use actix_web::{web, HttpResponse};
use cinehub_core::{ItemEnvelope, ItemsEnvelope, NewFavoriteActor};
use tracing::info;
use validator::Validate;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/favorite-actors")
            .route("", web::get().to(list_actors))
            .route("", web::post().to(add_actor))
            .route("/{actor_id}", web::delete().to(remove_actor)),
    );
}

async fn list_actors(user: AuthenticatedUser, state: web::Data<AppState>) -> Result<HttpResponse> {
    let items = state.repository.list_actors(&user.owner_id).await?;
    Ok(HttpResponse::Ok().json(ItemsEnvelope { items }))
}

async fn add_actor(
    user: AuthenticatedUser,
    body: web::Json<NewFavoriteActor>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let draft = body.into_inner();
    draft.validate()?;

    let item = state.repository.add_actor(&user.owner_id, &draft).await?;

    info!(owner = %user.owner_id, actor_id = item.actor_id, "Favorite actor added");
    Ok(HttpResponse::Created().json(ItemEnvelope { item }))
}

async fn remove_actor(
    user: AuthenticatedUser,
    actor_id: web::Path<i64>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let actor_id = actor_id.into_inner();
    state.repository.remove_actor(&user.owner_id, actor_id).await?;

    info!(owner = %user.owner_id, actor_id, "Favorite actor removed");
    Ok(HttpResponse::NoContent().finish())
}
