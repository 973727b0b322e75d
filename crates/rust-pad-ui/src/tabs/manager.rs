/// Tab manager for handling multiple open documents.
use std::sync::Arc;

use rust_pad_core::document::Document;
use rust_pad_core::history::{HistoryConfig, PersistenceLayer};

/// Manages open document tabs.
#[derive(Debug)]
pub struct TabManager {
    /// All open documents.
    pub documents: Vec<Document>,
    /// Index of the active document.
    pub active: usize,
    /// Shared persistence layer for undo history (None = in-memory only).
    persistence: Option<Arc<PersistenceLayer>>,
    /// History configuration.
    config: HistoryConfig,
    /// Default file extension for new untitled tabs (e.g. "txt", "md"). Empty = none.
    pub default_extension: String,
}

impl Default for TabManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TabManager {
    /// Creates a new tab manager with one empty document (in-memory history).
    pub fn new() -> Self {
        Self {
            documents: vec![Document::new()],
            active: 0,
            persistence: None,
            config: HistoryConfig::default(),
            default_extension: String::new(),
        }
    }

    /// Creates a new tab manager with persistent undo history.
    pub fn with_persistence(persistence: Arc<PersistenceLayer>, config: HistoryConfig) -> Self {
        let doc = Document::with_persistence(Arc::clone(&persistence), &config);
        Self {
            documents: vec![doc],
            active: 0,
            persistence: Some(persistence),
            config,
            default_extension: String::new(),
        }
    }

    /// Returns the active document.
    pub fn active_doc(&self) -> &Document {
        &self.documents[self.active]
    }

    /// Returns the active document mutably.
    pub fn active_doc_mut(&mut self) -> &mut Document {
        &mut self.documents[self.active]
    }

    /// Adds a new empty document tab and switches to it.
    ///
    /// The tab receives a numbered "Untitled" title that avoids
    /// collisions with existing tabs ("Untitled", "Untitled 2", …).
    /// When `default_extension` is set, the title includes the extension
    /// (e.g. "Untitled.txt", "Untitled 2.md").
    pub fn new_tab(&mut self) {
        let title = self.next_untitled_title();
        let mut doc = self.create_document();
        doc.title = title;
        self.documents.push(doc);
        self.active = self.documents.len() - 1;
    }

    /// Returns the next available "Untitled" title.
    ///
    /// Finds the highest existing "Untitled" number and returns the next one.
    /// Strips any file extension from existing titles before matching, so
    /// "Untitled.txt" and "Untitled" both count as number 1.
    ///
    /// Numbers always increase: "Untitled", "Untitled 2", "Untitled 3", etc.
    /// Closing an earlier tab does not cause its number to be reused.
    ///
    /// When `default_extension` is non-empty, appends it to the title
    /// (e.g. "Untitled.txt", "Untitled 2.md").
    pub fn next_untitled_title(&self) -> String {
        let mut max_n = 0usize;
        for doc in &self.documents {
            let n = Self::parse_untitled_number(&doc.title);
            max_n = max_n.max(n);
        }
        let next = max_n + 1;
        let name = if next == 1 {
            "Untitled".to_string()
        } else {
            format!("Untitled {next}")
        };
        if self.default_extension.is_empty() {
            name
        } else {
            format!("{name}.{}", self.default_extension)
        }
    }

    /// Extracts the untitled number from a tab title, or 0 if not an untitled tab.
    ///
    /// Handles titles with or without file extensions:
    /// - "Untitled" or "Untitled.txt" → 1
    /// - "Untitled 3" or "Untitled 3.md" → 3
    /// - "myfile.rs" → 0
    fn parse_untitled_number(title: &str) -> usize {
        // Strip any file extension
        let base = match title.rfind('.') {
            Some(pos) if pos > 0 => &title[..pos],
            _ => title,
        };
        if base == "Untitled" {
            1
        } else if let Some(suffix) = base.strip_prefix("Untitled ") {
            suffix.parse::<usize>().unwrap_or(0)
        } else {
            0
        }
    }

    /// Opens a document from file and adds it as a new tab.
    pub fn open_file(&mut self, path: &std::path::Path) -> anyhow::Result<()> {
        // Check if this file is already open
        for (idx, doc) in self.documents.iter().enumerate() {
            if doc.file_path.as_deref() == Some(path) {
                self.active = idx;
                return Ok(());
            }
        }

        let doc = match &self.persistence {
            Some(pl) => Document::open_with_persistence(path, Arc::clone(pl), &self.config)?,
            None => Document::open(path)?,
        };
        self.documents.push(doc);
        self.active = self.documents.len() - 1;
        Ok(())
    }

    /// Closes the active tab. Returns true if the tab was closed.
    /// The caller should check for unsaved changes before calling this.
    pub fn close_active(&mut self) -> bool {
        if self.documents.len() <= 1 {
            self.delete_tab_history(0);
            self.documents[0] = self.create_document();
            self.active = 0;
            return true;
        }

        self.delete_tab_history(self.active);
        self.documents.remove(self.active);
        if self.active >= self.documents.len() {
            self.active = self.documents.len() - 1;
        }
        true
    }

    /// Closes a tab by index. Returns true if closed.
    pub fn close_tab(&mut self, idx: usize) -> bool {
        if idx >= self.documents.len() {
            return false;
        }

        if self.documents.len() <= 1 {
            self.delete_tab_history(0);
            self.documents[0] = self.create_document();
            self.active = 0;
            return true;
        }

        self.delete_tab_history(idx);
        self.documents.remove(idx);
        if self.active >= self.documents.len() {
            self.active = self.documents.len() - 1;
        } else if self.active > idx {
            self.active -= 1;
        }
        true
    }

    /// Switches to a specific tab.
    pub fn switch_to(&mut self, idx: usize) {
        if idx < self.documents.len() {
            self.active = idx;
        }
    }

    /// Returns the number of open tabs.
    pub fn tab_count(&self) -> usize {
        self.documents.len()
    }

    /// Flushes undo history for all open documents to disk.
    pub fn flush_all_history(&mut self) {
        for doc in &mut self.documents {
            if let Err(e) = doc.flush_history() {
                tracing::warn!("Failed to flush history for '{}': {e}", doc.title);
            }
        }
    }

    /// Creates a new empty document with the appropriate persistence setting.
    fn create_document(&self) -> Document {
        match &self.persistence {
            Some(pl) => Document::with_persistence(Arc::clone(pl), &self.config),
            None => Document::new(),
        }
    }

    /// Deletes persisted history for a tab that is being closed.
    fn delete_tab_history(&mut self, idx: usize) {
        if idx < self.documents.len() {
            if let Err(e) = self.documents[idx].delete_history() {
                tracing::warn!(
                    "Failed to delete history for '{}': {e}",
                    self.documents[idx].title
                );
            }
        }
    }
}
