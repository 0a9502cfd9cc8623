pub mod clipboard;
pub mod fill;
pub mod transform;
