//! Top-level application tying together tabs, editor, menus, and status bar.

mod about_dialog;
mod clipboard;
mod editing;
mod file_ops;
mod menu_bar;
mod search;
mod settings_dialog;
mod shortcuts;
mod status_bar;
mod tab_bar;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use eframe::egui;
use egui::Color32;

use rust_pad_config::session::{generate_session_id, SessionData, SessionStore, SessionTabEntry};
use rust_pad_config::{AppConfig, ThemeDefinition, UiColors};
use rust_pad_core::bookmarks::BookmarkManager;
use rust_pad_core::cursor::Position;
use rust_pad_core::history::{HistoryConfig, PersistenceLayer};

use crate::dialogs::{FindReplaceDialog, GoToLineDialog};
use crate::editor::{EditorTheme, EditorWidget, SyntaxHighlighter};
use crate::tabs::TabManager;

/// How often to flush undo history to disk (in seconds).
const FLUSH_INTERVAL_SECS: u64 = 30;

/// Arguments passed from the command line to the application.
#[derive(Debug, Clone, Default)]
pub struct StartupArgs {
    /// File paths to open on startup.
    pub files: Vec<PathBuf>,
    /// If set, create a new tab pre-filled with this text.
    pub new_file_text: Option<String>,
}

/// Which color theme to use.
///
/// Wraps a string name. Special values: `"System"`, `"Dark"`, `"Light"`.
/// Any other value refers to a custom theme name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeMode(pub String);

impl Default for ThemeMode {
    fn default() -> Self {
        Self::system()
    }
}

impl ThemeMode {
    pub fn system() -> Self {
        Self("System".to_string())
    }

    pub fn dark() -> Self {
        Self("Dark".to_string())
    }

    pub fn light() -> Self {
        Self("Light".to_string())
    }

    /// Returns true if this is the "System" mode.
    pub fn is_system(&self) -> bool {
        self.0 == "System"
    }

    /// Resolves "System" to a concrete theme name using the OS preference.
    /// Non-system modes return their own name.
    pub fn resolve(&self) -> &str {
        if self.is_system() {
            match dark_light::detect() {
                Ok(dark_light::Mode::Light) => "Light",
                _ => "Dark",
            }
        } else {
            &self.0
        }
    }
}

/// The main application state.
pub struct App {
    pub tabs: TabManager,
    pub theme: EditorTheme,
    pub theme_mode: ThemeMode,
    pub zoom_level: f32,
    pub max_zoom_level: f32,
    pub word_wrap: bool,
    pub show_special_chars: bool,
    pub show_line_numbers: bool,
    pub restore_open_files: bool,
    pub show_full_path_in_title: bool,
    pub default_extension: String,
    pub remember_last_folder: bool,
    pub default_work_folder: String,
    pub last_used_folder: Option<PathBuf>,
    pub auto_save_enabled: bool,
    pub auto_save_interval_secs: u64,
    last_auto_save: Instant,
    pub available_themes: Vec<ThemeDefinition>,
    accent_color: Color32,
    config_path: PathBuf,
    clipboard: Option<arboard::Clipboard>,
    dialog_state: DialogState,
    pub find_replace: FindReplaceDialog,
    pub go_to_line: GoToLineDialog,
    bookmarks: BookmarkManager,
    syntax_highlighter: SyntaxHighlighter,
    last_flush: Instant,
    session_store: Option<SessionStore>,
    last_window_title: String,
    last_file_check: Instant,
    pub(crate) settings_open: bool,
    pub(crate) settings_tab: settings_dialog::SettingsTab,
    pub(crate) about_open: bool,
    pub(crate) about_logo: Option<egui::TextureHandle>,
}

#[derive(Debug, Default)]
pub(crate) enum DialogState {
    #[default]
    None,
    ConfirmClose(usize),
}

impl App {
    /// Creates a new application instance.
    pub fn new(cc: &eframe::CreationContext<'_>, args: StartupArgs) -> Self {
        // Disable egui's built-in keyboard zoom so Ctrl+/- only affects the editor text
        cc.egui_ctx.options_mut(|o| o.zoom_with_keyboard = false);

        // Load config
        let config_path = AppConfig::config_path();
        let app_config = AppConfig::load_or_create(&config_path);

        let mut theme_mode = ThemeMode(app_config.current_theme.clone());
        let resolved_name = theme_mode.resolve().to_string();
        let font_size = app_config.font_size;

        // Resolve theme definition; fall back to System if the theme doesn't exist
        let theme_def = match app_config.find_theme(&resolved_name).cloned() {
            Some(def) => def,
            None => {
                tracing::warn!(
                    "Theme '{}' not found, falling back to System",
                    resolved_name
                );
                theme_mode = ThemeMode::system();
                let fallback_name = theme_mode.resolve().to_string();
                app_config
                    .find_theme(&fallback_name)
                    .cloned()
                    .unwrap_or_else(rust_pad_config::theme::builtin_dark)
            }
        };

        let editor_theme = EditorTheme::from_config(&theme_def.editor, font_size);
        Self::apply_theme_visuals(&cc.egui_ctx, &theme_def.ui, theme_def.dark_mode);
        let ac = theme_def.ui.accent_color;
        let accent_color = Color32::from_rgba_premultiplied(ac.r, ac.g, ac.b, ac.a);

        let mut syntax_highlighter = SyntaxHighlighter::new();
        syntax_highlighter.set_theme(&theme_def.syntax_theme);

        let history_config = HistoryConfig::default();
        let mut tabs = match PersistenceLayer::open(&history_config.data_dir) {
            Ok(pl) => TabManager::with_persistence(pl, history_config),
            Err(e) => {
                tracing::warn!(
                    "Failed to open undo history database, falling back to in-memory: {e}"
                );
                TabManager::new()
            }
        };
        tabs.default_extension = app_config.default_extension.clone();

        // Open session store
        let session_store = match SessionStore::open(&SessionStore::session_path()) {
            Ok(store) => Some(store),
            Err(e) => {
                tracing::warn!("Failed to open session store: {e}");
                None
            }
        };

        // Restore session if enabled
        if app_config.restore_open_files {
            if let Some(store) = &session_store {
                if let Ok(Some(session_data)) = store.load_session() {
                    let mut any_restored = false;
                    for entry in &session_data.tabs {
                        match entry {
                            SessionTabEntry::File { path } => {
                                let p = std::path::Path::new(path);
                                if p.exists() {
                                    if let Err(e) = tabs.open_file(p) {
                                        tracing::warn!("Failed to restore '{path}': {e}");
                                    } else {
                                        any_restored = true;
                                    }
                                }
                            }
                            SessionTabEntry::Unsaved { session_id, title } => {
                                let content = store
                                    .load_content(session_id)
                                    .ok()
                                    .flatten()
                                    .unwrap_or_default();
                                let mut doc = rust_pad_core::document::Document::new();
                                doc.title = title.clone();
                                if !content.is_empty() {
                                    doc.buffer =
                                        rust_pad_core::buffer::TextBuffer::from(content.as_str());
                                    doc.modified = true;
                                }
                                doc.session_id = Some(generate_session_id());
                                tabs.documents.push(doc);
                                any_restored = true;
                            }
                        }
                    }
                    if any_restored {
                        // Remove the phantom initial empty tab
                        tabs.documents.remove(0);
                        tabs.active = session_data
                            .active_tab_index
                            .min(tabs.documents.len().saturating_sub(1));
                    }
                    // Clear old content — fresh IDs assigned, will be rewritten on exit
                    let _ = store.clear_all_content();
                }
            }
        }

        // Open files requested via CLI arguments
        let has_cli_content = !args.files.is_empty() || args.new_file_text.is_some();
        for path in &args.files {
            let abs_path = if path.is_absolute() {
                path.clone()
            } else {
                std::env::current_dir().unwrap_or_default().join(path)
            };
            if let Err(e) = tabs.open_file(&abs_path) {
                tracing::warn!("Failed to open '{}': {e}", abs_path.display());
            }
        }

        // Handle --new-file: create an untitled tab pre-filled with the given text
        if let Some(text) = args.new_file_text {
            tabs.new_tab();
            let doc = tabs.active_doc_mut();
            doc.insert_text(&text);
        }

        // If CLI args opened any tabs, remove the initial empty tab that came
        // from TabManager construction (only if it's still pristine).
        if has_cli_content && tabs.tab_count() > 1 {
            let first_is_empty = tabs.documents[0].buffer.is_empty()
                && tabs.documents[0].file_path.is_none()
                && !tabs.documents[0].modified;
            if first_is_empty {
                tabs.close_tab(0);
            }
        }

        Self {
            tabs,
            theme: editor_theme,
            theme_mode,
            zoom_level: app_config.current_zoom_level,
            max_zoom_level: app_config.max_zoom_level,
            word_wrap: app_config.word_wrap,
            show_special_chars: app_config.show_special_chars,
            show_line_numbers: app_config.show_line_numbers,
            restore_open_files: app_config.restore_open_files,
            show_full_path_in_title: app_config.show_full_path_in_title,
            default_extension: app_config.default_extension,
            remember_last_folder: app_config.remember_last_folder,
            default_work_folder: app_config.default_work_folder,
            last_used_folder: if app_config.last_used_folder.is_empty() {
                None
            } else {
                Some(PathBuf::from(app_config.last_used_folder))
            },
            auto_save_enabled: app_config.auto_save_enabled,
            auto_save_interval_secs: app_config.auto_save_interval_secs,
            last_auto_save: Instant::now(),
            available_themes: app_config.themes,
            accent_color,
            config_path,
            clipboard: arboard::Clipboard::new().ok(),
            dialog_state: DialogState::None,
            find_replace: FindReplaceDialog::new(),
            go_to_line: GoToLineDialog::new(),
            bookmarks: BookmarkManager::new(),
            syntax_highlighter,
            last_flush: Instant::now(),
            session_store,
            last_window_title: String::new(),
            last_file_check: Instant::now(),
            settings_open: false,
            settings_tab: settings_dialog::SettingsTab::default(),
            about_open: false,
            about_logo: None,
        }
    }

    /// Applies egui visuals from config UI colors.
    fn apply_theme_visuals(ctx: &egui::Context, ui_colors: &UiColors, dark_mode: bool) {
        let hex = |c: rust_pad_config::HexColor| -> Color32 {
            Color32::from_rgba_premultiplied(c.r, c.g, c.b, c.a)
        };
        let mut visuals = if dark_mode {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        };

        // Fill colors
        visuals.panel_fill = hex(ui_colors.panel_fill);
        visuals.window_fill = hex(ui_colors.window_fill);
        visuals.faint_bg_color = hex(ui_colors.faint_bg_color);
        visuals.extreme_bg_color = hex(ui_colors.extreme_bg_color);
        visuals.widgets.noninteractive.bg_fill = hex(ui_colors.widget_noninteractive_bg);
        visuals.widgets.inactive.bg_fill = hex(ui_colors.widget_inactive_bg);
        visuals.widgets.hovered.bg_fill = hex(ui_colors.widget_hovered_bg);
        visuals.widgets.active.bg_fill = hex(ui_colors.widget_active_bg);

        // Widget rounding — consistent 4px on all states
        let widget_rounding = egui::CornerRadius::same(4);
        visuals.widgets.noninteractive.corner_radius = widget_rounding;
        visuals.widgets.inactive.corner_radius = widget_rounding;
        visuals.widgets.hovered.corner_radius = widget_rounding;
        visuals.widgets.active.corner_radius = widget_rounding;
        visuals.widgets.open.corner_radius = widget_rounding;

        // Window/menu rounding
        visuals.window_corner_radius = egui::CornerRadius::same(6);
        visuals.menu_corner_radius = egui::CornerRadius::same(4);

        // Clean borders
        visuals.widgets.noninteractive.bg_stroke.width = 0.0;
        visuals.window_stroke.width = 1.0;

        // Popup shadow — minimal
        visuals.popup_shadow = egui::Shadow {
            offset: [0, 2],
            blur: 8,
            spread: 0,
            color: Color32::from_black_alpha(40),
        };

        ctx.set_visuals(visuals);

        // Spacing
        ctx.style_mut(|style| {
            style.spacing.item_spacing = egui::Vec2::new(8.0, 6.0);
            style.spacing.button_padding = egui::Vec2::new(8.0, 4.0);
            style.spacing.window_margin = egui::Margin::same(12);
        });
    }

    /// Updates the OS window title to show the active document name.
    ///
    /// Only sends the viewport command when the title actually changes,
    /// to avoid triggering unnecessary repaints.
    fn update_window_title(&mut self, ctx: &egui::Context) {
        let doc = self.tabs.active_doc();
        let file_label = if let Some(ref path) = doc.file_path {
            if self.show_full_path_in_title {
                path.to_string_lossy().into_owned()
            } else {
                doc.title.clone()
            }
        } else {
            doc.title.clone()
        };
        let modified_marker = if doc.modified { " *" } else { "" };
        let title = format!("{file_label}{modified_marker} - rust-pad");
        if title != self.last_window_title {
            self.last_window_title.clone_from(&title);
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(title));
        }
    }

    /// Switches to a new theme mode and applies all theme changes.
    pub fn set_theme_mode(&mut self, mode: ThemeMode, ctx: &egui::Context) {
        self.theme_mode = mode;
        let resolved_name = self.theme_mode.resolve().to_string();

        // Fall back to System if the resolved theme doesn't exist
        let theme_def = match self
            .available_themes
            .iter()
            .find(|t| t.name == resolved_name)
            .cloned()
        {
            Some(def) => def,
            None => {
                tracing::warn!(
                    "Theme '{}' not found, falling back to System",
                    resolved_name
                );
                self.theme_mode = ThemeMode::system();
                let fallback_name = self.theme_mode.resolve().to_string();
                self.available_themes
                    .iter()
                    .find(|t| t.name == fallback_name)
                    .cloned()
                    .unwrap_or_else(rust_pad_config::theme::builtin_dark)
            }
        };

        self.theme = EditorTheme::from_config(&theme_def.editor, self.theme.font_size);
        Self::apply_theme_visuals(ctx, &theme_def.ui, theme_def.dark_mode);
        let ac = theme_def.ui.accent_color;
        self.accent_color = Color32::from_rgba_premultiplied(ac.r, ac.g, ac.b, ac.a);
        self.syntax_highlighter.set_theme(&theme_def.syntax_theme);
    }

    /// Shows all dialog windows.
    fn show_dialogs(&mut self, ctx: &egui::Context) {
        // Confirm close dialog
        match self.dialog_state {
            DialogState::ConfirmClose(idx) => {
                let mut open = true;
                let title = if idx < self.tabs.tab_count() {
                    self.tabs.documents[idx].title.clone()
                } else {
                    "Document".to_string()
                };

                egui::Window::new("Unsaved Changes")
                    .collapsible(false)
                    .resizable(false)
                    .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                    .open(&mut open)
                    .show(ctx, |ui| {
                        ui.spacing_mut().item_spacing.y = 8.0;

                        ui.label(format!("'{title}' has unsaved changes. Close anyway?"));

                        ui.add_space(4.0);

                        ui.horizontal(|ui| {
                            ui.spacing_mut().item_spacing.x = 8.0;
                            if ui.button("  Save & Close  ").clicked() {
                                if idx < self.tabs.tab_count() {
                                    let doc = &mut self.tabs.documents[idx];
                                    if doc.file_path.is_some() {
                                        let _ = doc.save();
                                    }
                                    self.cleanup_session_for_tab(idx);
                                    self.tabs.close_tab(idx);
                                }
                                self.dialog_state = DialogState::None;
                            }
                            if ui.button("  Discard  ").clicked() {
                                self.cleanup_session_for_tab(idx);
                                self.tabs.close_tab(idx);
                                self.dialog_state = DialogState::None;
                            }
                            if ui.button("  Cancel  ").clicked() {
                                self.dialog_state = DialogState::None;
                            }
                        });
                    });

                if !open {
                    self.dialog_state = DialogState::None;
                }
            }
            DialogState::None => {}
        }

        // Settings dialog
        self.show_settings_dialog(ctx);

        // About dialog
        if self.about_open {
            self.load_about_logo(ctx);
        }
        self.show_about_dialog(ctx);

        // Find/Replace dialog
        if let Some(action) = self.find_replace.show(ctx) {
            self.handle_search_action(action);
        }

        // Go to Line dialog
        let total_lines = self.tabs.active_doc().buffer.len_lines();
        if let Some(target) = self.go_to_line.show(ctx, total_lines) {
            let doc = self.tabs.active_doc_mut();
            doc.cursor.clear_selection();
            doc.cursor
                .move_to(Position::new(target.line, target.column), &doc.buffer);
        }
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Prevent egui's built-in Ctrl+scroll zoom — we handle zoom ourselves
        ctx.set_zoom_factor(1.0);

        self.handle_global_shortcuts(ctx);

        // Update the OS window title to reflect the active document
        self.update_window_title(ctx);

        // Menu bar
        let panel_fill = ctx.style().visuals.panel_fill;
        let faint_bg = ctx.style().visuals.faint_bg_color;
        let extreme_bg = ctx.style().visuals.extreme_bg_color;

        egui::TopBottomPanel::top("menu_bar")
            .frame(
                egui::Frame::new()
                    .fill(panel_fill)
                    .inner_margin(egui::Margin::symmetric(8, 4)),
            )
            .show(ctx, |ui| {
                self.show_menu_bar(ui, ctx);
            });

        // Tab bar
        egui::TopBottomPanel::top("tab_bar")
            .frame(
                egui::Frame::new()
                    .fill(faint_bg)
                    .inner_margin(egui::Margin::symmetric(8, 4)),
            )
            .show(ctx, |ui| {
                self.show_tab_bar(ui);
            });

        // Status bar
        egui::TopBottomPanel::bottom("status_bar")
            .max_height(24.0)
            .frame(
                egui::Frame::new()
                    .fill(extreme_bg)
                    .inner_margin(egui::Margin::symmetric(8, 3)),
            )
            .show(ctx, |ui| {
                self.show_status_bar(ui);
            });

        // Editor area
        let dialog_open = self.is_dialog_open();
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE.fill(self.theme.bg_color))
            .show(ctx, |ui| {
                let doc = self.tabs.active_doc_mut();
                let mut editor = EditorWidget::new(
                    doc,
                    &self.theme,
                    self.zoom_level,
                    Some(&self.syntax_highlighter),
                );
                editor.word_wrap = self.word_wrap;
                editor.show_special_chars = self.show_special_chars;
                editor.show_line_numbers = self.show_line_numbers;
                editor.dialog_open = dialog_open;
                editor.show(ui);

                // Apply Ctrl+scroll zoom from the editor widget
                if editor.zoom_request != 1.0 {
                    self.zoom_level =
                        (self.zoom_level * editor.zoom_request).clamp(0.5, self.max_zoom_level);
                }
            });

        // Dialogs
        self.show_dialogs(ctx);

        // Live file monitoring: check for external changes every second
        if self.last_file_check.elapsed() >= Duration::from_secs(1) {
            self.check_live_monitored_files();
            self.last_file_check = Instant::now();
        }

        // Periodic flush of undo history to disk
        if self.last_flush.elapsed() >= Duration::from_secs(FLUSH_INTERVAL_SECS) {
            self.tabs.flush_all_history();
            self.last_flush = Instant::now();
        }

        // Auto-save file-backed documents
        if self.auto_save_enabled
            && self.last_auto_save.elapsed() >= Duration::from_secs(self.auto_save_interval_secs)
        {
            self.auto_save_all();
            self.last_auto_save = Instant::now();
        }

        let has_live_monitoring = self.tabs.documents.iter().any(|d| d.live_monitoring);
        let next_repaint = if has_live_monitoring {
            Duration::from_secs(1)
        } else if self.auto_save_enabled {
            Duration::from_secs(self.auto_save_interval_secs.min(FLUSH_INTERVAL_SECS))
        } else {
            Duration::from_secs(FLUSH_INTERVAL_SECS)
        };
        ctx.request_repaint_after(next_repaint);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.tabs.flush_all_history();

        // Save session state (tab list + unsaved content) to redb
        if let Some(store) = &self.session_store {
            let mut tabs_list = Vec::new();
            for doc in &self.tabs.documents {
                if let Some(path) = &doc.file_path {
                    tabs_list.push(SessionTabEntry::File {
                        path: path.to_string_lossy().into_owned(),
                    });
                } else {
                    let sid = doc.session_id.clone().unwrap_or_else(generate_session_id);
                    let content = doc.buffer.to_string();
                    if let Err(e) = store.save_content(&sid, &content) {
                        tracing::warn!("Failed to save session content: {e}");
                    }
                    tabs_list.push(SessionTabEntry::Unsaved {
                        session_id: sid,
                        title: doc.title.clone(),
                    });
                }
            }
            let session_data = SessionData {
                tabs: tabs_list,
                active_tab_index: self.tabs.active,
            };
            if let Err(e) = store.save_session(&session_data) {
                tracing::warn!("Failed to save session: {e}");
            }
        }

        // Save current preferences to config file
        let config = AppConfig {
            current_theme: self.theme_mode.0.clone(),
            current_zoom_level: self.zoom_level,
            max_zoom_level: self.max_zoom_level,
            word_wrap: self.word_wrap,
            show_special_chars: self.show_special_chars,
            show_line_numbers: self.show_line_numbers,
            restore_open_files: self.restore_open_files,
            show_full_path_in_title: self.show_full_path_in_title,
            font_size: self.theme.font_size,
            default_extension: self.default_extension.clone(),
            remember_last_folder: self.remember_last_folder,
            default_work_folder: self.default_work_folder.clone(),
            last_used_folder: self
                .last_used_folder
                .as_ref()
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_default(),
            auto_save_enabled: self.auto_save_enabled,
            auto_save_interval_secs: self.auto_save_interval_secs,
            themes: self.available_themes.clone(),
        };
        if let Err(e) = config.save(&self.config_path) {
            tracing::warn!("Failed to save config on exit: {e}");
        }
    }
}
