//! Settings subsections.

pub mod renderer;

pub use renderer::{GraphicsBindables, GraphicsSettings, HostInfo, Platform, RendererSettings, RendererType};
