use crate::controller::ApiResponse;
use crate::{AppState, Error};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use entity_api::items::{Model, Status};
use entity_api::{item as ItemApi, Id};
use events::DomainEvent;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

use log::*;

#[derive(Debug, Deserialize)]
pub struct DeleteManyParams {
    status: Status,
}

fn to_value(item: &Model) -> Value {
    serde_json::to_value(item).unwrap_or_else(|err| {
        warn!("Failed to serialize item {} for its domain event: {err}", item.id);
        Value::Null
    })
}

/// POST create a new Item
pub async fn create(
    State(app_state): State<AppState>,
    Json(item_model): Json<Model>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST Create a New Item from: {item_model:?}");

    let item = ItemApi::create(app_state.store_ref(), item_model)?;

    debug!("New Item: {item:?}");

    app_state
        .event_publisher
        .publish(DomainEvent::ItemCreated {
            item_id: item.id,
            item: to_value(&item),
        })
        .await;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(StatusCode::CREATED.into(), item)),
    ))
}

/// GET a particular Item specified by its id.
pub async fn read(
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET Item by id: {id}");

    let item = ItemApi::find_by_id(app_state.store_ref(), id)?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), item)))
}

/// GET all Items in list order.
pub async fn index(State(app_state): State<AppState>) -> Result<impl IntoResponse, Error> {
    debug!("GET all Items");

    let items = ItemApi::find_all(app_state.store_ref());

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), items)))
}

/// PUT update an existing Item.
pub async fn update(
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
    Json(item_model): Json<Model>,
) -> Result<impl IntoResponse, Error> {
    debug!("PUT Update Item with id: {id}");

    let item = ItemApi::update(app_state.store_ref(), id, item_model)?;

    debug!("Updated Item: {item:?}");

    app_state
        .event_publisher
        .publish(DomainEvent::ItemUpdated {
            item_id: item.id,
            item: to_value(&item),
        })
        .await;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), item)))
}

/// DELETE an Item specified by its id.
pub async fn delete(
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("DELETE Item by id: {id}");

    ItemApi::delete_by_id(app_state.store_ref(), id)?;

    app_state
        .event_publisher
        .publish(DomainEvent::ItemDeleted { item_id: id })
        .await;

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE every Item with the status given in the query, `?status=CHECKED` or `?status=OPEN`.
pub async fn delete_many(
    State(app_state): State<AppState>,
    Query(params): Query<DeleteManyParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("DELETE Items with status: {:?}", params.status);

    let count = ItemApi::delete_many_by_status(app_state.store_ref(), params.status);

    app_state
        .event_publisher
        .publish(DomainEvent::ItemsDeleted {
            status: params.status.as_str().to_string(),
            count,
        })
        .await;

    Ok(StatusCode::NO_CONTENT)
}

/// POST new list positions as `{"<item id>": orderno}` and get back the reordered list.
pub async fn reorder(
    State(app_state): State<AppState>,
    Json(ordernos): Json<HashMap<Id, i64>>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST Reorder Items: {ordernos:?}");

    let items = ItemApi::reorder(app_state.store_ref(), &ordernos)?;

    let mut item_ids: Vec<Id> = ordernos.into_keys().collect();
    item_ids.sort_unstable();
    app_state
        .event_publisher
        .publish(DomainEvent::ItemsReordered { item_ids })
        .await;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), items)))
}
