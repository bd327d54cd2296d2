//! Data Transfer Objects for backend request/response serialization.
//!
//! Field names follow the backend verbatim, which mixes `snake_case` and
//! `camelCase` between endpoints.

pub mod geometry_dto;
pub mod image_dto;
pub mod search_dto;
pub mod station_dto;

pub use geometry_dto::*;
pub use image_dto::*;
pub use search_dto::*;
pub use station_dto::*;
