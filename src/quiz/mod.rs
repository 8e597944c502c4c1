pub mod clock;
pub mod fall;
pub mod game;
pub mod options;
pub mod pool;
pub mod prompt;
pub mod question;
pub mod resolver;
pub mod round;
pub mod source;

pub use game::{Game, GameEvent};
pub use round::RoundStatus;
