pub mod coaching;
pub mod players;
pub mod refresh;
