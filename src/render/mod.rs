//! render: reveal compositor and the PNG codec it writes with.

pub mod png;
pub mod reveal;

pub use reveal::{composite, render_reveal_png, reveal_mask, RenderStats};
