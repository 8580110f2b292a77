//! Knight-and-queen puzzle: visit every safe square in order without being
//! taken by the queen and without taking it.

pub mod logic;
pub mod session;
pub mod types;

pub use logic::*;
pub use session::PuzzleSession;
pub use types::*;
