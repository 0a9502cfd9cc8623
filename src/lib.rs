#[macro_use]
pub mod logger;
pub mod canvas;
pub mod cli;
pub mod color;
pub mod components;
pub mod controller;
pub mod geometry;
pub mod input;
pub mod io;
pub mod ops;
pub mod project;
pub mod settings;
pub mod viewport;

pub use canvas::{LayerStack, PixelBuffer};
pub use controller::CanvasController;
