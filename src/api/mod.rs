//! Backend API layer: the [`SearchBackend`] seam, its HTTP implementation,
//! and the wire DTOs.
//!
//! Endpoints consumed:
//!
//! | Method | Path                              |
//! |--------|-----------------------------------|
//! | POST   | `/api/search_images`              |
//! | GET    | `/api/download_links/{id}`        |
//! | GET    | `/api/image_details/{id}`         |
//! | GET    | `/api/water_level_stations`       |
//! | GET    | `/api/water_level_at_time?time=…` |
//! | POST   | `/process_geometry` (legacy)      |

pub mod backend;
pub mod dto;
pub mod http_backend;

pub use backend::SearchBackend;
pub use http_backend::HttpBackend;
