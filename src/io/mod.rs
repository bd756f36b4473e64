pub mod config_io;
pub mod state;

pub use config_io::{StateError, read_config, write_config};
pub use state::{GridUiState, read_grid_state, write_grid_state};
