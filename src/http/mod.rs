//! HTTP adapter over the booking engine: JSON API under `/v1`, an HTML
//! overview page at `/`, and CSV/JSON download endpoints under `/export`.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod render;
pub mod router;
pub mod state;

pub use router::create_router;
pub use state::AppState;
