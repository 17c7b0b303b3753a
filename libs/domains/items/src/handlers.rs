use axum::{
    Extension, Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{
    CurrentUser, Message, UuidPath, ValidatedJson,
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, InternalServerErrorResponse,
        NotFoundResponse, UnauthorizedResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::ItemResult;
use crate::models::{ItemCreate, ItemPublic, ItemUpdate, ItemsPublic, ListParams};
use crate::repository::ItemRepository;
use crate::service::ItemService;

/// OpenAPI documentation for Items API
#[derive(OpenApi)]
#[openapi(
    paths(list_items, create_item, get_item, update_item, delete_item),
    components(
        schemas(ItemPublic, ItemsPublic, ItemCreate, ItemUpdate, Message),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            UnauthorizedResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Items", description = "Item management endpoints (MongoDB)")
    )
)]
pub struct ApiDoc;

/// Create the items router with all HTTP endpoints
///
/// Every route expects an authenticated [`CurrentUser`] in the request
/// extensions, inserted by the auth middleware.
pub fn router<R: ItemRepository + 'static>(service: ItemService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_items).post(create_item))
        .route("/{id}", get(get_item).put(update_item).delete(delete_item))
        .with_state(shared_service)
}

/// List items visible to the current user
#[utoipa::path(
    get,
    path = "",
    tag = "Items",
    params(ListParams),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Paginated list of items", body = ItemsPublic),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_items<R: ItemRepository>(
    State(service): State<Arc<ItemService<R>>>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<ListParams>,
) -> ItemResult<Json<ItemsPublic>> {
    let (items, count) = service.list_items(&user, params).await?;
    Ok(Json(ItemsPublic {
        data: items.into_iter().map(ItemPublic::from).collect(),
        count,
    }))
}

/// Create a new item owned by the current user
#[utoipa::path(
    post,
    path = "",
    tag = "Items",
    request_body = ItemCreate,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Item created successfully", body = ItemPublic),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_item<R: ItemRepository>(
    State(service): State<Arc<ItemService<R>>>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(input): ValidatedJson<ItemCreate>,
) -> ItemResult<impl IntoResponse> {
    let item = service.create_item(&user, input).await?;
    Ok((StatusCode::CREATED, Json(ItemPublic::from(item))))
}

/// Get an item by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Items",
    params(
        ("id" = Uuid, Path, description = "Item ID")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Item found", body = ItemPublic),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_item<R: ItemRepository>(
    State(service): State<Arc<ItemService<R>>>,
    Extension(user): Extension<CurrentUser>,
    UuidPath(id): UuidPath,
) -> ItemResult<Json<ItemPublic>> {
    let item = service.get_item(&user, id).await?;
    Ok(Json(ItemPublic::from(item)))
}

/// Update an item
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Items",
    params(
        ("id" = Uuid, Path, description = "Item ID")
    ),
    request_body = ItemUpdate,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Item updated successfully", body = ItemPublic),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_item<R: ItemRepository>(
    State(service): State<Arc<ItemService<R>>>,
    Extension(user): Extension<CurrentUser>,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<ItemUpdate>,
) -> ItemResult<Json<ItemPublic>> {
    let item = service.update_item(&user, id, input).await?;
    Ok(Json(ItemPublic::from(item)))
}

/// Delete an item
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Items",
    params(
        ("id" = Uuid, Path, description = "Item ID")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Item deleted successfully", body = Message),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_item<R: ItemRepository>(
    State(service): State<Arc<ItemService<R>>>,
    Extension(user): Extension<CurrentUser>,
    UuidPath(id): UuidPath,
) -> ItemResult<Json<Message>> {
    service.delete_item(&user, id).await?;
    Ok(Json(Message::new("Item deleted successfully")))
}
