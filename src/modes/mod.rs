pub mod play;
pub mod schedule;

pub use play::PlayMode;
pub use schedule::TickSchedule;
