pub mod config;
pub mod events;
pub mod game;
pub mod grid;
pub mod io;
pub mod render;
pub mod rule_set;
pub mod ticker;

pub use config::Config;
pub use game::Game;
pub use grid::Change;
pub use grid::Grid;
pub use grid::GridError;
