//! The annotation session.
//!
//! [`Session`] owns everything one reviewer works with: settings, the loaded
//! dataset, annotations with their history, the grid position, modal state
//! and save bookkeeping. Key events come in through [`Session::handle_key`];
//! every successful annotation change ends with a save request.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use web_time::Instant;

use crate::annotation::AnnotationStore;
use crate::config::AppConfig;
use crate::format::{Dataset, FormatError};
use crate::input::message_for_key;
use crate::keybindings::{KeyBindings, KeyEvent};
use crate::labels::LabelRegistry;
use crate::message::{Effect, Message};
use crate::model::Item;
use crate::navigation::{Filter, GridGeometry, Navigator, filtered_view};
use crate::state::{
    Dialog, Notification, NotificationCenter, SaveJob, SaveResult, SaveSync, SaveWorker, Storage,
    StorageError, TypingBuffer, run_job,
};

/// Why a dataset could not be loaded.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The metadata file could not be read
    #[error("Could not read metadata: {0}")]
    Storage(#[from] StorageError),

    /// The metadata file is not usable
    #[error("Invalid metadata: {0}")]
    Format(#[from] FormatError),
}

/// State of one annotation session.
pub struct Session {
    config: AppConfig,
    registry: LabelRegistry,
    bindings: KeyBindings,
    storage: Arc<dyn Storage>,

    /// Loaded dataset and the path it came from
    dataset: Option<Dataset>,
    dataset_path: String,
    store: AnnotationStore,

    navigator: Navigator,
    /// Original indices of the items passing the filter
    view: Vec<usize>,
    /// Last viewport size, for refitting the grid
    viewport: Option<(f32, f32)>,
    zoomed: Option<usize>,

    typing: TypingBuffer,
    dialog: Option<Dialog>,

    worker: Option<SaveWorker>,
    sync: SaveSync,
    notifications: NotificationCenter,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("dataset_path", &self.dataset_path)
            .field("items", &self.store.item_count())
            .field("navigator", &self.navigator)
            .field("dialog", &self.dialog)
            .field("pending_saves", &self.sync.pending_saves())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Create a session with no dataset loaded.
    ///
    /// Saves run on a background thread; if it cannot be started they run
    /// inline instead.
    pub fn new(config: AppConfig, storage: Arc<dyn Storage>) -> Self {
        for issue in config.validate() {
            log::warn!("Settings: {}", issue);
        }

        let worker = match SaveWorker::spawn(Arc::clone(&storage)) {
            Ok(worker) => Some(worker),
            Err(e) => {
                log::warn!("Failed to start save thread, saving inline: {}", e);
                None
            }
        };

        Self {
            registry: LabelRegistry::from_config(&config.hotkeys.labels),
            bindings: KeyBindings::from_config(&config.hotkeys),
            navigator: Navigator::new(GridGeometry {
                columns: config.layout.images_per_row.max(1),
                ..GridGeometry::default()
            }),
            config,
            storage,
            dataset: None,
            dataset_path: String::new(),
            store: AnnotationStore::default(),
            view: Vec::new(),
            viewport: None,
            zoomed: None,
            typing: TypingBuffer::new(),
            dialog: None,
            worker,
            sync: SaveSync::new(),
            notifications: NotificationCenter::new(),
        }
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Load the metadata file named in the settings.
    ///
    /// On failure the previous dataset stays in place and an error banner
    /// is shown.
    pub fn load(&mut self, now: Instant) -> Result<(), LoadError> {
        let path = self.config.paths.metadata_path.clone();
        let result = self
            .storage
            .load(&path)
            .map_err(LoadError::from)
            .and_then(|text| self.replace_dataset(&text, &path));

        if let Err(e) = &result {
            log::error!("Failed to load '{}': {}", path, e);
            self.notifications
                .error(format!("Error loading the CSV file: {}", e), now);
        }
        result
    }

    /// Load a dataset from CSV text, as if read from the configured path.
    pub fn load_from_str(&mut self, text: &str, now: Instant) -> Result<(), LoadError> {
        let path = self.config.paths.metadata_path.clone();
        let result = self.replace_dataset(text, &path);
        if let Err(e) = &result {
            self.notifications
                .error(format!("Error loading the CSV file: {}", e), now);
        }
        result
    }

    fn replace_dataset(&mut self, text: &str, path: &str) -> Result<(), LoadError> {
        let dataset = Dataset::parse(text, &self.config, &self.registry)?;

        self.store = AnnotationStore::new(
            dataset.len(),
            dataset.marks.clone(),
            dataset.comments.clone(),
        );
        self.dataset = Some(dataset);
        self.dataset_path = path.to_string();
        self.sync.reset();
        self.navigator.set_filter(Filter::All);
        self.zoomed = None;
        self.dialog = None;
        self.typing.clear();
        self.refresh_view();

        log::info!("📂 Loaded '{}' ({} items)", path, self.store.item_count());
        Ok(())
    }

    /// Switch to new settings.
    ///
    /// A different metadata path or column set reloads the dataset. A
    /// change limited to the label set keeps the dataset and re-resolves
    /// marks by name.
    pub fn apply_config(&mut self, config: AppConfig, now: Instant) -> Result<(), LoadError> {
        for issue in config.validate() {
            log::warn!("Settings: {}", issue);
        }

        let reload = config.paths != self.config.paths || config.metadata != self.config.metadata;
        let labels_changed = config.hotkeys.labels != self.config.hotkeys.labels;
        let columns_changed = config.layout.images_per_row != self.config.layout.images_per_row;

        self.config = config;
        self.registry = LabelRegistry::from_config(&self.config.hotkeys.labels);
        self.bindings = KeyBindings::from_config(&self.config.hotkeys);
        self.typing.clear();

        if columns_changed {
            self.refit_grid();
        }

        if reload {
            log::info!("Settings changed paths or columns, reloading");
            let result = self.load(now);
            // A failed reload keeps the old dataset, whose marks must follow the new labels
            if result.is_err() && labels_changed {
                self.relabel_marks(now);
            }
            return result;
        }

        if labels_changed {
            self.relabel_marks(now);
        }
        Ok(())
    }

    fn relabel_marks(&mut self, now: Instant) {
        self.dialog = None;
        if self.store.relabel(&self.registry) {
            self.after_mutation(now);
        } else {
            self.refresh_view();
        }
    }

    // ========================================================================
    // Input
    // ========================================================================

    /// Handle one key press.
    pub fn handle_key(&mut self, event: &KeyEvent, now: Instant) -> Option<Effect> {
        self.typing.tick(now);
        let message = message_for_key(event, self.dialog.as_ref(), &self.bindings)?;
        self.update(message, now)
    }

    /// Apply one message.
    pub fn update(&mut self, message: Message, now: Instant) -> Option<Effect> {
        if !message.continues_typing() {
            self.typing.clear();
        }

        match message {
            Message::Undo => {
                if self.store.undo() {
                    self.after_mutation(now);
                }
            }
            Message::Redo => {
                if self.store.redo() {
                    self.after_mutation(now);
                }
            }
            Message::Navigate { direction, by_page } => {
                self.navigator.navigate(direction, by_page, self.view.len());
                if self.zoomed.is_some() {
                    self.zoomed = self.current_index();
                }
            }
            Message::SetFilter(filter) => {
                log::debug!("Filter set to {:?}", filter);
                self.navigator.set_filter(filter);
                self.refresh_view();
            }
            Message::SetGeometry(geometry) => {
                self.navigator.set_geometry(geometry, self.view.len());
            }
            Message::Resize { width, height } => {
                self.viewport = Some((width, height));
                self.refit_grid();
            }
            Message::ToggleZoom => {
                self.zoomed = match self.zoomed {
                    Some(_) => None,
                    None => self.current_index(),
                };
            }
            Message::CopyFileName => {
                return self
                    .current_item()
                    .map(|item| Effect::CopyToClipboard(item.file_name.clone()));
            }
            Message::CycleMark => {
                self.edit_current(now, |store, index, registry| {
                    store.cycle_mark(index, registry)
                });
            }
            Message::ClearMark => {
                self.edit_current(now, |store, index, registry| {
                    store.clear_mark(index, registry)
                });
            }
            Message::SetMark(number) => self.set_current_mark(number, now),
            Message::TypeAcronym(letter) => self.type_acronym(letter, now),
            Message::OpenLabelPicker => {
                if let Some(item) = self.current_index() {
                    let selected = self.store.mark_number(item);
                    self.open_dialog(Dialog::LabelPicker { item, selected });
                }
            }
            Message::OpenComment => {
                if let Some(item) = self.current_index() {
                    let draft = self.store.comment(item).unwrap_or("").to_string();
                    self.open_dialog(Dialog::Comment { item, draft });
                }
            }
            Message::OpenSettings => self.open_dialog(Dialog::Settings),
            Message::CloseDialog => {
                if let Some(dialog) = self.dialog.take() {
                    log::debug!("Closed {} dialog", dialog.name());
                }
            }
            Message::PickerPrevious => {
                if let Some(Dialog::LabelPicker { selected, .. }) = &mut self.dialog {
                    *selected = selected.saturating_sub(1);
                }
            }
            Message::PickerNext => {
                let max = self.registry.max_label_value();
                if let Some(Dialog::LabelPicker { selected, .. }) = &mut self.dialog {
                    *selected = (*selected + 1).min(max);
                }
            }
            Message::PickerConfirm => {
                if let Some(Dialog::LabelPicker { item, selected }) = self.dialog.take() {
                    if self
                        .store
                        .set_mark(item, to_label_value(selected), &self.registry)
                    {
                        self.after_mutation(now);
                    }
                }
            }
            Message::CommentInput(c) => {
                if let Some(Dialog::Comment { draft, .. }) = &mut self.dialog {
                    draft.push(c);
                }
            }
            Message::CommentBackspace => {
                if let Some(Dialog::Comment { draft, .. }) = &mut self.dialog {
                    draft.pop();
                }
            }
            Message::CommentSubmit => {
                if let Some(Dialog::Comment { item, draft }) = self.dialog.take() {
                    if self.store.set_comment(item, &draft) {
                        self.after_mutation(now);
                    }
                }
            }
        }
        None
    }

    /// Expire the typing buffer and banner, and collect finished saves.
    pub fn tick(&mut self, now: Instant) {
        self.typing.tick(now);
        self.notifications.tick(now);
        self.poll_saves(now);
    }

    fn open_dialog(&mut self, dialog: Dialog) {
        log::debug!("Opened {} dialog", dialog.name());
        self.dialog = Some(dialog);
    }

    /// Run an annotation edit on the selected item; save if it changed anything.
    fn edit_current(
        &mut self,
        now: Instant,
        edit: impl FnOnce(&mut AnnotationStore, usize, &LabelRegistry) -> bool,
    ) {
        let Some(index) = self.current_index() else {
            return;
        };
        if edit(&mut self.store, index, &self.registry) {
            self.after_mutation(now);
        }
    }

    fn set_current_mark(&mut self, number: usize, now: Instant) {
        self.edit_current(now, |store, index, registry| {
            store.set_mark(index, to_label_value(number), registry)
        });
    }

    /// Extend the typed acronym and apply the first label it matches.
    ///
    /// If the extended text matches nothing, the letter starts a new word.
    fn type_acronym(&mut self, letter: char, now: Instant) {
        let mut number = self
            .registry
            .find_by_acronym_prefix(self.typing.push(letter, now));
        if number == 0 && self.typing.as_str().chars().count() > 1 {
            number = self
                .registry
                .find_by_acronym_prefix(self.typing.restart(letter, now));
        }

        log::debug!("⌨️ Typed '{}' -> label {}", self.typing.as_str(), number);
        if number > 0 {
            self.set_current_mark(number, now);
        }
    }

    // ========================================================================
    // View
    // ========================================================================

    fn refresh_view(&mut self) {
        self.view = filtered_view(
            self.store.item_count(),
            self.store.marks(),
            self.navigator.filter(),
        );
        self.navigator.clamp(self.view.len());
        if self.zoomed.is_some_and(|i| i >= self.store.item_count()) {
            self.zoomed = None;
        }
    }

    fn refit_grid(&mut self) {
        let columns = self.config.layout.images_per_row;
        let geometry = match self.viewport {
            Some((width, height)) => GridGeometry::fit(width, height, columns),
            None => GridGeometry::new(columns, self.navigator.geometry().rows),
        };
        log::debug!("Grid {}x{}", geometry.columns, geometry.rows);
        self.navigator.set_geometry(geometry, self.view.len());
    }

    // ========================================================================
    // Saving
    // ========================================================================

    fn after_mutation(&mut self, now: Instant) {
        self.refresh_view();
        self.request_save(now);
    }

    /// Serialize the current annotations and hand them to the save path.
    fn request_save(&mut self, now: Instant) {
        let Some(dataset) = &self.dataset else {
            return;
        };
        if dataset.is_empty() {
            return;
        }

        let content = dataset.to_csv(self.store.marks(), self.store.comments());
        if let Some(job) = self.sync.request(&self.dataset_path, content) {
            self.dispatch(job, now);
        }
    }

    /// Send a job to the save thread, or run it inline without one.
    fn dispatch(&mut self, job: SaveJob, now: Instant) {
        let mut job = job;
        loop {
            let rejected = match &self.worker {
                Some(worker) => worker.submit(job).err(),
                None => Some(job),
            };
            let Some(inline) = rejected else {
                return;
            };
            if self.worker.take().is_some() {
                log::warn!("Save thread gone, saving inline");
            }

            let outcome = run_job(self.storage.as_ref(), &inline);
            match self.finish_save(outcome, now) {
                Some(next) => job = next,
                None => return,
            }
        }
    }

    /// Record a finished save. Returns the queued job that should run next.
    fn finish_save(&mut self, outcome: SaveResult, now: Instant) -> Option<SaveJob> {
        let completion = self.sync.complete(outcome);
        if let Some(message) = completion.error {
            self.notifications.error(message, now);
        }
        completion.next
    }

    /// Collect finished saves without blocking.
    pub fn poll_saves(&mut self, now: Instant) {
        while let Some(outcome) = self.worker.as_ref().and_then(SaveWorker::try_result) {
            if let Some(next) = self.finish_save(outcome, now) {
                self.dispatch(next, now);
            }
        }
    }

    /// Wait until no saves are pending, at most `timeout`.
    ///
    /// Returns whether everything was written (successfully or not).
    pub fn flush_saves(&mut self, timeout: Duration, now: Instant) -> bool {
        let deadline = Instant::now() + timeout;
        while self.sync.pending_saves() > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let outcome = match &self.worker {
                Some(worker) if !remaining.is_zero() => worker.wait_result(remaining),
                _ => None,
            };
            let Some(outcome) = outcome else {
                log::warn!("{} save(s) still pending", self.sync.pending_saves());
                return false;
            };
            if let Some(next) = self.finish_save(outcome, now) {
                self.dispatch(next, now);
            }
        }
        true
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn registry(&self) -> &LabelRegistry {
        &self.registry
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    /// The loaded dataset, if any.
    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    /// All loaded items.
    pub fn items(&self) -> &[Item] {
        self.dataset.as_ref().map(|d| d.items.as_slice()).unwrap_or(&[])
    }

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    /// Original indices of the items visible under the current filter.
    pub fn view(&self) -> &[usize] {
        &self.view
    }

    /// Original indices of the items on the current page.
    pub fn page_items(&self) -> &[usize] {
        let per_page = self.navigator.items_per_page();
        let start = ((self.navigator.current_page() - 1) * per_page).min(self.view.len());
        let end = (start + per_page).min(self.view.len());
        &self.view[start..end]
    }

    pub fn total_pages(&self) -> usize {
        self.navigator.total_pages(self.view.len())
    }

    /// Original index of the selected item.
    pub fn current_index(&self) -> Option<usize> {
        self.navigator.current_item(&self.view)
    }

    /// The selected item.
    pub fn current_item(&self) -> Option<&Item> {
        self.current_index().and_then(|i| self.items().get(i))
    }

    /// Item shown enlarged, if zoomed in.
    pub fn zoomed(&self) -> Option<usize> {
        self.zoomed
    }

    pub fn dialog(&self) -> Option<&Dialog> {
        self.dialog.as_ref()
    }

    /// Letters typed towards an acronym so far.
    pub fn typed(&self) -> &str {
        self.typing.as_str()
    }

    /// The visible banner, if any.
    pub fn notification(&self) -> Option<&Notification> {
        self.notifications.current()
    }

    pub fn pending_saves(&self) -> usize {
        self.sync.pending_saves()
    }

    pub fn last_save_success(&self) -> bool {
        self.sync.last_save_success()
    }

    /// Item counts per label name, starting with unlabeled items.
    pub fn label_statistics(&self) -> Vec<(String, usize)> {
        self.store
            .label_counts(&self.registry)
            .into_iter()
            .enumerate()
            .map(|(number, count)| (self.registry.name_for(number).to_string(), count))
            .collect()
    }
}

fn to_label_value(number: usize) -> i64 {
    i64::try_from(number).unwrap_or(i64::MAX)
}
