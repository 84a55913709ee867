pub mod drag;
pub mod frame;
pub mod press;
