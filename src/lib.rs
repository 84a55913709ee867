pub mod actor;
pub mod common;
pub mod layout_engine;
pub mod model;
pub mod sys;

pub use actor::broadcast::BroadcastEvent;
pub use actor::reactor::{Event, Reactor};
pub use common::config::{Config, Settings};
pub use model::error::DragError;
