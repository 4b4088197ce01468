//! Domain primitives, aggregates and services.
//!
//! Purpose: Define strongly typed domain entities used by the HTTP and
//! persistence layers. Keep types immutable and document invariants in each
//! type's Rustdoc.
//!
//! Public surface:
//! - Error (alias to `error::Error`) — transport-agnostic error payload.
//! - ErrorCode (alias to `error::ErrorCode`) — stable error identifier.
//! - TraceId (alias to `trace_id::TraceId`) — per-request correlation id.
//! - User (alias to `user::User`) — user aggregate with its addresses.
//! - UserDirectoryService — implementation of the user CRUD driving port.

pub mod error;
pub mod ports;
pub mod trace_id;
pub mod user;
mod user_directory;

pub use self::error::{Error, ErrorCode};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    Address, AddressDetails, AddressDraft, EmailAddress, FieldErrorKind, PersonName, Timestamps,
    TypeCode, User, UserDetails, UserDraft, UserFieldError, UserId, UserIdError,
    UserValidationErrors,
};
pub use self::user_directory::UserDirectoryService;
