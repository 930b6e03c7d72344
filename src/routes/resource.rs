//! Automatic REST exposure of a repository.
//!
//! [`expose`] derives collection and item endpoints for any [`Resource`]:
//!
//! | Method | Path                | Effect                               |
//! |--------|---------------------|--------------------------------------|
//! | GET    | `/{collection}`      | paged listing                        |
//! | POST   | `/{collection}`      | create, `201` with `Location`        |
//! | GET    | `/{collection}/{id}` | fetch                                |
//! | PUT    | `/{collection}/{id}` | replace, `201` if it did not exist   |
//! | PATCH  | `/{collection}/{id}` | merge the given fields               |
//! | DELETE | `/{collection}/{id}` | delete, `204`                        |
//!
//! Bodies carry HAL-style `_links`, built from the registered base path.

use crate::error::{AppError, AppResult};
use crate::repository::{Entity, Repository, MAX_ID};
use crate::rest::BasePath;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use validator::Validate;

use super::extract::{AppJson, AppPath, AppQuery};
use super::types::{PageMetadata, PageQuery};

/// An entity that can be exposed as a REST collection
pub trait Resource: Entity + Serialize + DeserializeOwned + Validate {
    /// Collection path segment, e.g. `students`
    const COLLECTION: &'static str;

    /// Human-readable name used in error messages
    const NAME: &'static str;
}

/// Handler state of one exposed collection
pub struct Exposed<R: Resource> {
    repository: Arc<dyn Repository<R>>,
    base_path: BasePath,
}

impl<R: Resource> Clone for Exposed<R> {
    fn clone(&self) -> Self {
        Self {
            repository: self.repository.clone(),
            base_path: self.base_path.clone(),
        }
    }
}

impl<R: Resource> Exposed<R> {
    fn collection_href(&self) -> String {
        self.base_path.join(R::COLLECTION)
    }

    fn item_href(&self, id: i64) -> String {
        self.base_path.join(&format!("{}/{}", R::COLLECTION, id))
    }

    fn represent(&self, entity: &R) -> AppResult<Value> {
        let mut value = to_value::<R>(entity)?;
        if let (Some(id), Some(object)) = (entity.id(), value.as_object_mut()) {
            object.insert(
                "_links".to_string(),
                json!({ "self": { "href": self.item_href(id) } }),
            );
        }
        Ok(value)
    }

    async fn require(&self, id: i64) -> AppResult<R> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(R::NAME, id))
    }
}

/// Serialize a stored entity. Failures are internal errors.
fn to_value<R: Resource>(entity: &R) -> AppResult<Value> {
    serde_json::to_value(entity)
        .map_err(|e| AppError::Internal(format!("failed to serialize {}: {}", R::NAME, e)))
}

/// Build the endpoints of `R`'s collection. Paths are relative to the base
/// path; mounting is left to [`crate::rest::RestSettings::mount`].
pub fn expose<R: Resource>(repository: Arc<dyn Repository<R>>, base_path: BasePath) -> Router {
    let collection = format!("/{}", R::COLLECTION);
    let item = format!("/{}/{{id}}", R::COLLECTION);

    Router::new()
        .route(&collection, get(list::<R>).post(create::<R>))
        .route(
            &item,
            get(fetch::<R>)
                .put(replace::<R>)
                .patch(update::<R>)
                .delete(remove::<R>),
        )
        .with_state(Exposed {
            repository,
            base_path,
        })
}

async fn list<R: Resource>(
    State(exposed): State<Exposed<R>>,
    AppQuery(query): AppQuery<PageQuery>,
) -> AppResult<Json<Value>> {
    let total = exposed.repository.count().await?;
    let items = exposed
        .repository
        .find_page(query.offset(), query.size())
        .await?;

    let represented = items
        .iter()
        .map(|entity| exposed.represent(entity))
        .collect::<AppResult<Vec<_>>>()?;

    let mut embedded = Map::new();
    embedded.insert(R::COLLECTION.to_string(), Value::Array(represented));

    Ok(Json(json!({
        "_embedded": embedded,
        "_links": { "self": { "href": exposed.collection_href() } },
        "page": PageMetadata::new(&query, total),
    })))
}

async fn create<R: Resource>(
    State(exposed): State<Exposed<R>>,
    AppJson(mut entity): AppJson<R>,
) -> AppResult<impl IntoResponse> {
    entity.validate()?;
    entity.set_id(None);

    let saved = exposed.repository.save(entity).await?;
    let id = saved
        .id()
        .ok_or_else(|| AppError::Internal(format!("saved {} has no id", R::NAME)))?;

    tracing::info!(resource = R::COLLECTION, id, "Created resource");

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, exposed.item_href(id))],
        Json(exposed.represent(&saved)?),
    ))
}

async fn fetch<R: Resource>(
    State(exposed): State<Exposed<R>>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<Value>> {
    let entity = exposed.require(id).await?;
    Ok(Json(exposed.represent(&entity)?))
}

async fn replace<R: Resource>(
    State(exposed): State<Exposed<R>>,
    AppPath(id): AppPath<i64>,
    AppJson(mut entity): AppJson<R>,
) -> AppResult<impl IntoResponse> {
    if !(1..=MAX_ID).contains(&id) {
        return Err(AppError::Validation(format!(
            "{} id must be between 1 and {}",
            R::NAME,
            MAX_ID
        )));
    }

    entity.validate()?;
    entity.set_id(Some(id));

    let existed = exposed.repository.exists_by_id(id).await?;
    let saved = exposed.repository.save(entity).await?;
    let status = if existed {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };

    Ok((status, Json(exposed.represent(&saved)?)))
}

async fn update<R: Resource>(
    State(exposed): State<Exposed<R>>,
    AppPath(id): AppPath<i64>,
    AppJson(changes): AppJson<Value>,
) -> AppResult<Json<Value>> {
    let Value::Object(changes) = changes else {
        return Err(AppError::Validation(
            "PATCH body must be a JSON object".to_string(),
        ));
    };

    let current = exposed.require(id).await?;
    let mut merged = to_value(&current)?;
    if let Some(target) = merged.as_object_mut() {
        for (field, value) in changes {
            if field == "id" || field == "_links" {
                continue;
            }
            target.insert(field, value);
        }
    }

    let mut entity: R = serde_json::from_value(merged)
        .map_err(|e| AppError::Validation(format!("Malformed {}: {}", R::NAME, e)))?;
    entity.validate()?;
    entity.set_id(Some(id));

    let saved = exposed.repository.save(entity).await?;
    Ok(Json(exposed.represent(&saved)?))
}

async fn remove<R: Resource>(
    State(exposed): State<Exposed<R>>,
    AppPath(id): AppPath<i64>,
) -> AppResult<StatusCode> {
    if !exposed.repository.delete_by_id(id).await? {
        return Err(AppError::not_found(R::NAME, id));
    }

    tracing::info!(resource = R::COLLECTION, id, "Deleted resource");
    Ok(StatusCode::NO_CONTENT)
}
