mod app;
pub mod cli;
pub mod commands;
mod credentials;
pub mod logging;

pub use app::App;
pub use cli::Cli;
