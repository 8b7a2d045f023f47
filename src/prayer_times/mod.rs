pub mod board;
pub mod resolver;

pub use board::PrayerBoard;
pub use resolver::WeeklyRule;
