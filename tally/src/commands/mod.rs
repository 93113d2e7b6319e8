mod executor;

pub use executor::{execute_command, resolve_store};
