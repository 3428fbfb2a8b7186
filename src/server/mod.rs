mod album_routes;
mod artist_routes;
pub mod config;
mod http_layers;
mod like_routes;
mod response;
pub mod server;
mod session;
mod song_routes;
pub mod state;
mod stream_media;
mod user_routes;

pub use config::ServerConfig;
pub use http_layers::*;
pub use server::{make_app, run_server};
pub use session::Session;
pub use state::ServerState;
