//! Users API handlers.
//!
//! ```text
//! GET    /users
//! GET    /users/{id}
//! POST   /users        {"type":1,"firstName":"Bill",...}
//! PUT    /users/{id}   {"type":1,"firstName":"Bill",...}
//! DELETE /users/{id}
//! ```
//!
//! Handlers decode input, call the user directory with the request's trace id
//! and map the result to a status code. Every failure is handed to
//! [`ApiError`], which owns the mapping to HTTP.

use std::fmt;
use std::marker::PhantomData;

use actix_web::error::JsonPayloadError;
use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use chrono::{DateTime, Utc};
use serde::de::value::MapAccessDeserializer;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{Address, AddressDraft, User, UserDetails, UserDraft};
use crate::inbound::http::context::RequestContext;
use crate::inbound::http::error::{ApiError, ApiResult, ErrorBody};
use crate::inbound::http::validation::{json_payload_error, parse_user_id, user_validation_error};
use crate::middleware::trace::trace_id_of;

/// JSON object decoded into `T`.
///
/// Derived struct deserializers also accept positional arrays; this wrapper
/// only accepts objects so `[...]` bodies fail as malformed JSON.
#[derive(Debug)]
pub struct JsonObject<T>(pub T);

impl<T> JsonObject<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

struct JsonObjectVisitor<T>(PhantomData<T>);

impl<'de, T: Deserialize<'de>> Visitor<'de> for JsonObjectVisitor<T> {
    type Value = T;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a JSON object")
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<T, A::Error> {
        T::deserialize(MapAccessDeserializer::new(map))
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for JsonObject<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer
            .deserialize_map(JsonObjectVisitor(PhantomData))
            .map(Self)
    }
}

fn deserialize_address_objects<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Vec<AddressRequest>>, D::Error> {
    let addresses = Option::<Vec<JsonObject<AddressRequest>>>::deserialize(deserializer)?;
    Ok(addresses.map(|items| items.into_iter().map(JsonObject::into_inner).collect()))
}

/// Address as submitted by clients.
#[derive(Debug, Default, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct AddressRequest {
    #[serde(rename = "type")]
    #[schema(example = 1)]
    pub address_type: Option<i64>,
    #[schema(example = "12973 SW 112th ST")]
    pub line_one: Option<String>,
    #[schema(example = "Suite 153")]
    pub line_two: Option<String>,
    #[schema(example = "Miami")]
    pub city: Option<String>,
    #[schema(example = "FL")]
    pub state: Option<String>,
    #[schema(example = "33172")]
    pub zipcode: Option<String>,
    #[schema(example = "305-527-3353")]
    pub phone: Option<String>,
}

/// User body for `POST /users` and `PUT /users/{id}`.
///
/// Server-assigned fields (`userId`, `dateCreated`, `dateModified`) and any
/// unknown fields are ignored.
#[derive(Debug, Default, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct UserRequest {
    #[serde(rename = "type")]
    #[schema(example = 1)]
    pub user_type: Option<i64>,
    #[schema(example = "Bill")]
    pub first_name: Option<String>,
    #[schema(example = "Kennedy")]
    pub last_name: Option<String>,
    #[schema(example = "bill@ardanlabs.com")]
    pub email: Option<String>,
    #[schema(example = "Ardan Labs")]
    pub company: Option<String>,
    #[serde(deserialize_with = "deserialize_address_objects")]
    pub addresses: Option<Vec<AddressRequest>>,
}

impl From<AddressRequest> for AddressDraft {
    fn from(value: AddressRequest) -> Self {
        Self {
            address_type: value.address_type,
            line_one: value.line_one,
            line_two: value.line_two,
            city: value.city,
            state: value.state,
            zipcode: value.zipcode,
            phone: value.phone,
        }
    }
}

impl From<UserRequest> for UserDraft {
    fn from(value: UserRequest) -> Self {
        Self {
            user_type: value.user_type,
            first_name: value.first_name,
            last_name: value.last_name,
            email: value.email,
            company: value.company,
            addresses: value
                .addresses
                .unwrap_or_default()
                .into_iter()
                .map(AddressDraft::from)
                .collect(),
        }
    }
}

/// Stored address as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddressResponse {
    #[serde(rename = "type")]
    pub address_type: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_one: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_two: Option<String>,
    pub city: String,
    pub state: String,
    pub zipcode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub date_created: DateTime<Utc>,
    pub date_modified: DateTime<Utc>,
}

impl From<&Address> for AddressResponse {
    fn from(value: &Address) -> Self {
        let details = value.details();
        let stamps = value.timestamps();
        Self {
            address_type: details.address_type().get(),
            line_one: details.line_one().map(str::to_owned),
            line_two: details.line_two().map(str::to_owned),
            city: details.city().to_owned(),
            state: details.state().to_owned(),
            zipcode: details.zipcode().to_owned(),
            phone: details.phone().map(str::to_owned),
            date_created: stamps.created,
            date_modified: stamps.modified,
        }
    }
}

/// Stored user as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub user_type: u8,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    pub date_created: DateTime<Utc>,
    pub date_modified: DateTime<Utc>,
    pub addresses: Vec<AddressResponse>,
}

impl From<&User> for UserResponse {
    fn from(value: &User) -> Self {
        let stamps = value.timestamps();
        Self {
            user_id: *value.id().as_uuid(),
            user_type: value.user_type().get(),
            first_name: value.first_name().to_string(),
            last_name: value.last_name().to_string(),
            email: value.email().to_string(),
            company: value.company().map(str::to_owned),
            date_created: stamps.created,
            date_modified: stamps.modified,
            addresses: value.addresses().iter().map(AddressResponse::from).collect(),
        }
    }
}

fn validate(context: &RequestContext, payload: UserRequest) -> ApiResult<UserDetails> {
    UserDetails::try_from_draft(UserDraft::from(payload))
        .map_err(|errors| context.reject(user_validation_error(&errors)))
}

/// Route JSON decoding failures through the error boundary.
pub fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    ApiError::new(json_payload_error(&err), trace_id_of(req)).into()
}

/// Register the user routes and their JSON body configuration.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use apid::Trace;
/// use apid::inbound::http::users;
///
/// let app = App::new().wrap(Trace).configure(users::configure);
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .service(list_users)
        .service(create_user)
        .service(retrieve_user)
        .service(update_user)
        .service(delete_user);
}

/// List every user, oldest first.
#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "Users", body = [UserResponse]),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(context: RequestContext) -> ApiResult<web::Json<Vec<UserResponse>>> {
    let users = context
        .users()
        .list(&context.trace_id())
        .await
        .map_err(|err| context.reject(err))?;
    Ok(web::Json(users.iter().map(UserResponse::from).collect()))
}

/// Fetch one user.
#[utoipa::path(
    get,
    path = "/users/{id}",
    params(("id" = String, Path, description = "User identifier (UUID)")),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 400, description = "Malformed id", body = ErrorBody),
        (status = 404, description = "Unknown user", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tags = ["users"],
    operation_id = "retrieveUser"
)]
#[get("/users/{id}")]
pub async fn retrieve_user(
    context: RequestContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<UserResponse>> {
    let id = parse_user_id(&path).map_err(|err| context.reject(err))?;
    let user = context
        .users()
        .retrieve(&context.trace_id(), &id)
        .await
        .map_err(|err| context.reject(err))?;
    Ok(web::Json(UserResponse::from(&user)))
}

/// Validate and store a new user.
#[utoipa::path(
    post,
    path = "/users",
    request_body = UserRequest,
    responses(
        (status = 201, description = "Created user", body = UserResponse),
        (status = 400, description = "Malformed or invalid payload", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/users")]
pub async fn create_user(
    context: RequestContext,
    payload: web::Json<JsonObject<UserRequest>>,
) -> ApiResult<HttpResponse> {
    let details = validate(&context, payload.into_inner().into_inner())?;
    let user = context
        .users()
        .create(&context.trace_id(), details)
        .await
        .map_err(|err| context.reject(err))?;
    Ok(HttpResponse::Created().json(UserResponse::from(&user)))
}

/// Replace the mutable fields of a user.
#[utoipa::path(
    put,
    path = "/users/{id}",
    params(("id" = String, Path, description = "User identifier (UUID)")),
    request_body = UserRequest,
    responses(
        (status = 204, description = "User updated"),
        (status = 400, description = "Malformed id or payload", body = ErrorBody),
        (status = 404, description = "Unknown user", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[put("/users/{id}")]
pub async fn update_user(
    context: RequestContext,
    path: web::Path<String>,
    payload: web::Json<JsonObject<UserRequest>>,
) -> ApiResult<HttpResponse> {
    let id = parse_user_id(&path).map_err(|err| context.reject(err))?;
    let details = validate(&context, payload.into_inner().into_inner())?;
    context
        .users()
        .update(&context.trace_id(), &id, details)
        .await
        .map_err(|err| context.reject(err))?;
    Ok(HttpResponse::NoContent().finish())
}

/// Remove a user, returning the record as it was.
#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(("id" = String, Path, description = "User identifier (UUID)")),
    responses(
        (status = 200, description = "Deleted user", body = UserResponse),
        (status = 400, description = "Malformed id", body = ErrorBody),
        (status = 404, description = "Unknown user", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    context: RequestContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<UserResponse>> {
    let id = parse_user_id(&path).map_err(|err| context.reject(err))?;
    let user = context
        .users()
        .delete(&context.trace_id(), &id)
        .await
        .map_err(|err| context.reject(err))?;
    Ok(web::Json(UserResponse::from(&user)))
}
