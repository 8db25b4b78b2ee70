//! Watchlist and favorites routes
//!
//! - GET    /api/v1/{watchlist|favorites}
//! - POST   /api/v1/{watchlist|favorites}
//! - DELETE /api/v1/{watchlist|favorites}/{mediaType}/{id}
use crate::auth::AuthenticatedUser;
use crate::error::{ApiError, Result};
use crate::server::AppState;
use actix_web::{web, HttpResponse};
use cinehub_core::{CollectionKind, ItemEnvelope, ItemKey, ItemsEnvelope, MediaType, NewCollectionItem};
use tracing::info;
use validator::Validate;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/{kind}")
            .route(web::get().to(list_items))
            .route(web::post().to(add_item)),
    )
    .service(web::resource("/{kind}/{media_type}/{id}").route(web::delete().to(remove_item)));
}

fn parse_kind(kind: &str) -> Result<CollectionKind> {
    kind.parse()
        .map_err(|_| ApiError::NotFound(format!("collection {}", kind)))
}

async fn list_items(
    user: AuthenticatedUser,
    kind: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let kind = parse_kind(&kind)?;
    let items = state.repository.list_items(&user.owner_id, kind).await?;
    Ok(HttpResponse::Ok().json(ItemsEnvelope { items }))
}

async fn add_item(
    user: AuthenticatedUser,
    kind: web::Path<String>,
    body: web::Json<NewCollectionItem>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let kind = parse_kind(&kind)?;
    let draft = body.into_inner();
    draft.validate()?;

    let item = state
        .repository
        .add_item(&user.owner_id, kind, &draft)
        .await?;

    info!(owner = %user.owner_id, collection = %kind, key = %item.key(), "Item added");
    Ok(HttpResponse::Created().json(ItemEnvelope { item }))
}

async fn remove_item(
    user: AuthenticatedUser,
    path: web::Path<(String, String, i64)>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let (kind, media_type, id) = path.into_inner();
    let kind = parse_kind(&kind)?;
    let key = ItemKey::new(id, media_type.parse::<MediaType>()?);

    state
        .repository
        .remove_item(&user.owner_id, kind, key)
        .await?;

    info!(owner = %user.owner_id, collection = %kind, key = %key, "Item removed");
    Ok(HttpResponse::NoContent().finish())
}
