//! Shared types for list endpoints.

mod pagination;

pub use pagination::{Paginated, PaginationMeta, PaginationParams};
