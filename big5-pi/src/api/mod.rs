//! HTTP API handlers for big5-pi

pub mod health;
pub mod insight;
pub mod predict;
pub mod root;

pub use health::health_routes;
pub use insight::insight_routes;
pub use predict::predict_routes;
pub use root::root_routes;
