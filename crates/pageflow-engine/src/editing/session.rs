//! Reference orchestration of one editing surface.
//!
//! Ties the synchronizer, cursor translator, debouncer and history manager
//! together in the order a host UI needs them: edits schedule a reflow, the
//! reflow rebuilds pages from the flattened document while the caret is
//! carried across, and every content change lands in history.

use std::time::{Duration, Instant};

use super::cursor::{SelectionSurface, carry, restore_cursor, save_cursor};
use super::debounce::Debouncer;
use super::sync;
use crate::history::{HistoryManager, HistoryOutcome, HistoryStatus, HistoryStore};
use crate::layout::{MeasureBlock, PageCapacity, paginate};
use crate::models::{Document, Page};

/// The host's editable page view
pub trait EditSurface: SelectionSurface {
    /// Pages as currently shown, including the user's edits. `None` when the
    /// surface is not mounted.
    fn pages(&self) -> Option<Vec<Page>>;

    /// Replace the shown pages
    fn render(&mut self, pages: &[Page]);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReflowOutcome {
    /// The surface had nothing to read; the page list is unchanged
    Skipped,
    Reflowed {
        page_count: usize,
        /// A new snapshot was appended because the markup changed
        history_saved: bool,
    },
}

pub struct EditorSession<S: HistoryStore, M: MeasureBlock> {
    document: Document,
    pages: Vec<Page>,
    capacity: PageCapacity,
    measure: M,
    history: HistoryManager<S>,
    debouncer: Debouncer<()>,
    /// Markup of the state history currently points at. A reflow whose
    /// markup differs from it is recorded.
    last_markup: String,
}

impl<S: HistoryStore, M: MeasureBlock> EditorSession<S, M> {
    /// Build the initial pages.
    ///
    /// The document is `restored` content when given, otherwise the current
    /// history state, otherwise the default template. Empty history is seeded
    /// with it; persisted history gets it appended when it differs from the
    /// current state. History that could not be read is left untouched.
    pub fn mount(
        restored: Option<&str>,
        capacity: PageCapacity,
        measure: M,
        mut history: HistoryManager<S>,
        quiet_period: Duration,
    ) -> Self {
        let current = history.current_content();
        let document = restored
            .map(Document::from_markup)
            .filter(|document| !document.is_empty())
            .or_else(|| current.as_deref().map(Document::from_markup))
            .unwrap_or_else(Document::default_template);
        let pages = paginate(&document, &capacity, &measure);
        let markup = document.to_markup();

        let last_markup = if !history.is_available() {
            log::warn!("History unavailable, mounted without undo");
            markup
        } else if history.is_empty() {
            match history.initialize_history(&markup) {
                Some(_) => markup,
                None => String::new(),
            }
        } else {
            log::info!(
                "Mounted with {} persisted history states",
                history.status().total_states
            );
            if current.as_deref() == Some(markup.as_str()) {
                markup
            } else {
                match history.save_to_history(&markup) {
                    Some(_) => markup,
                    None => current.unwrap_or_default(),
                }
            }
        };

        Self {
            document,
            pages,
            capacity,
            measure,
            history,
            debouncer: Debouncer::new(quiet_period),
            last_markup,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn capacity(&self) -> &PageCapacity {
        &self.capacity
    }

    pub fn history(&self) -> &HistoryManager<S> {
        &self.history
    }

    pub fn into_history(self) -> HistoryManager<S> {
        self.history
    }

    pub fn status(&self) -> HistoryStatus {
        self.history.status()
    }

    pub fn is_reflow_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn reflow_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Record that the surface content changed at `now`
    pub fn notify_edit(&mut self, now: Instant) {
        self.debouncer.schedule((), now);
    }

    /// Run the scheduled reflow if its quiet period has elapsed
    pub fn tick<E>(&mut self, now: Instant, surface: &mut E) -> Option<ReflowOutcome>
    where
        E: EditSurface + ?Sized,
    {
        self.debouncer.poll(now)?;
        Some(self.reflow(surface))
    }

    /// Run the scheduled reflow immediately, if one is pending
    pub fn flush<E>(&mut self, surface: &mut E) -> Option<ReflowOutcome>
    where
        E: EditSurface + ?Sized,
    {
        self.debouncer.flush()?;
        Some(self.reflow(surface))
    }

    /// Reflow now, dropping any scheduled one
    pub fn reflow_now<E>(&mut self, surface: &mut E) -> ReflowOutcome
    where
        E: EditSurface + ?Sized,
    {
        self.debouncer.cancel();
        self.reflow(surface)
    }

    fn reflow<E>(&mut self, surface: &mut E) -> ReflowOutcome
    where
        E: EditSurface + ?Sized,
    {
        let Some(edited) = surface.pages() else {
            log::debug!("Surface has no pages, reflow skipped");
            return ReflowOutcome::Skipped;
        };

        let address = save_cursor(surface.selection().as_ref(), &edited);
        let (document, pages) = sync::reflow(&edited, &self.capacity, &self.measure);
        surface.render(&pages);
        if let Some(moved) = address.and_then(|address| carry(&address, &edited, &pages)) {
            restore_cursor(&moved, &pages, surface);
        }

        let markup = document.to_markup();
        let history_saved =
            markup != self.last_markup && self.history.save_to_history(&markup).is_some();
        if history_saved {
            self.last_markup = markup;
        }
        log::debug!(
            "Reflowed {} blocks onto {} pages",
            document.len(),
            pages.len()
        );

        let page_count = pages.len();
        self.document = document;
        self.pages = pages;
        ReflowOutcome::Reflowed {
            page_count,
            history_saved,
        }
    }

    /// Step back through history and show the result.
    ///
    /// A pending reflow is dropped. Boundary and storage outcomes leave the
    /// document and surface untouched.
    pub fn undo<E>(&mut self, surface: &mut E) -> HistoryOutcome
    where
        E: EditSurface + ?Sized,
    {
        self.debouncer.cancel();
        let outcome = self.history.undo();
        if let Some(content) = &outcome.content {
            self.apply(content, surface);
        }
        outcome
    }

    /// Step forward through history and show the result
    pub fn redo<E>(&mut self, surface: &mut E) -> HistoryOutcome
    where
        E: EditSurface + ?Sized,
    {
        self.debouncer.cancel();
        let outcome = self.history.redo();
        if let Some(content) = &outcome.content {
            self.apply(content, surface);
        }
        outcome
    }

    /// Replace the document wholesale and restart history from it.
    ///
    /// Returns `None` when the new state could not be recorded; the next
    /// reflow retries.
    pub fn reset<E>(&mut self, content: Option<&str>, surface: &mut E) -> Option<HistoryStatus>
    where
        E: EditSurface + ?Sized,
    {
        self.debouncer.cancel();
        self.document = content
            .map(Document::from_markup)
            .unwrap_or_else(Document::default_template);
        self.pages = paginate(&self.document, &self.capacity, &self.measure);
        surface.render(&self.pages);
        log::info!("Session reset with {} blocks", self.document.len());

        let markup = self.document.to_markup();
        let status = self.history.initialize_history(&markup);
        self.last_markup = if status.is_some() { markup } else { String::new() };
        status
    }

    fn apply<E>(&mut self, content: &str, surface: &mut E)
    where
        E: EditSurface + ?Sized,
    {
        let shown = surface.pages().unwrap_or_else(|| self.pages.clone());
        let address = save_cursor(surface.selection().as_ref(), &shown);

        self.document = Document::from_markup(content);
        self.pages = paginate(&self.document, &self.capacity, &self.measure);
        surface.render(&self.pages);
        if let Some(moved) = address.and_then(|address| carry(&address, &shown, &self.pages)) {
            restore_cursor(&moved, &self.pages, surface);
        }
        self.last_markup = content.to_string();
    }
}
