pub mod app;
pub mod auth;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod state;
pub mod storage;
pub mod timesheet;
pub mod ui;
pub mod weekly;

pub use app::router;
pub use config::Config;
pub use state::AppState;
pub use storage::load_data;
pub use weekly::aggregate;
