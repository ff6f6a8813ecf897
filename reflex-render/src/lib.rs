pub mod digits;
pub mod palette;
pub mod render;
pub mod text;

pub use ab_glyph::FontArc;
pub use render::{FrameStats, SkiaRenderer, View};
pub use text::{load_font, load_font_file};
