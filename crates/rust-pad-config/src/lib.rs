pub mod color;
pub mod config;
pub mod session;
pub mod theme;

pub use color::HexColor;
pub use config::AppConfig;
pub use session::{SessionData, SessionStore, SessionTabEntry};
pub use theme::{EditorColors, ThemeDefinition, UiColors};
