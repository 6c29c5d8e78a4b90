/// Debug text overlay: 8x8 bitmap font laid out on a character grid
/// and drawn as solid rectangles through the graphics device

pub mod font;
pub mod debug_text;

pub use debug_text::*;
