//! Profile and user CRUD on top of the store, with an optional
//! read-through cache.

pub mod service;

pub use service::{Pagination, UserError, UserService, UserUpdate};
