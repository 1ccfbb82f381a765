//! Plain data shared across screens and the database layer.

pub mod bindable;
pub mod play_mode;

pub use bindable::Bindable;
pub use play_mode::PlayMode;
