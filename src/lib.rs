pub mod board;
pub mod config;
pub mod game;
pub mod input;
pub mod session;
pub mod shapes;
