mod input;
mod painter;
pub(crate) mod render_cache;
mod scrollbar;
mod special_chars;
mod theme;
mod widget;
mod wrap_map;

pub use painter::SyntaxHighlighter;
pub use theme::EditorTheme;
pub use widget::EditorWidget;
