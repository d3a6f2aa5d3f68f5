//! Room-booking engine with interval-overlap conflict detection, a write-ahead
//! log for durability, and two thin adapters over the same core: an
//! interactive CLI menu and an HTTP API.

pub mod engine;
pub mod export;
pub mod http;
pub mod limits;
pub mod menu;
pub mod model;
pub mod observability;
pub mod wal;
