pub mod clock;
pub mod config;
pub mod dispatcher;
pub mod message;
pub mod schedule;
pub mod slack;
pub mod testing;

pub use clock::{Clock, SystemClock};
pub use config::{Config, ConfigError, Plan};
pub use dispatcher::{Dispatcher, RunMode};
pub use message::{MessageSet, MessageSetError};
pub use schedule::{ScheduleError, ScheduleSpec};
pub use slack::{ChatClient, PostError, PostedMessage, SlackClient, ThreadTs};
