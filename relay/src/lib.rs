pub mod api;
pub mod config;
pub mod event;
pub mod relay;
pub mod router;
pub mod server;
pub mod sink;
