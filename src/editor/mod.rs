//! The editing coordinator: state container, batched undo/redo, plugin
//! dispatch, selection, and subscriptions (spec §4.F).

use crate::errors::OperationError;
use crate::model::Document;
use crate::normalize;
use crate::ops::{apply_operation, invert, Operation};
use crate::path::Range;
use crate::plugin::{Command, CommandArgs, Plugin, PluginManager};
use crate::selection;
use std::collections::VecDeque;
use tracing::{debug, instrument};

/// A committed group of non-selection ops, plus the selection snapshots
/// taken at the batch's boundaries so undo/redo can restore selection even
/// when the batch carries no explicit `set_selection` op (spec §4.F:
/// "editor restores it" when the batch carries a selection prelude/postlude
/// — here the editor supplies that snapshot itself rather than requiring
/// every caller to bracket their ops with one).
#[derive(Clone, Debug, Default)]
pub struct Batch {
    pub ops: Vec<Operation>,
    pub selection_before: Option<Range>,
    pub selection_after: Option<Range>,
}

#[derive(Clone, Debug)]
pub struct EditorConfig {
    /// Caps the undo stack; oldest batches are dropped once exceeded. `None`
    /// means unbounded (spec §5: "implementations should expose a cap").
    pub max_history_batches: Option<usize>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        EditorConfig { max_history_batches: Some(500) }
    }
}

#[derive(Default)]
struct History {
    undo: VecDeque<Batch>,
    redo: VecDeque<Batch>,
}

type Listener = Box<dyn Fn(&Document)>;

/// `apply`/`batch`/`undo`/`redo`/selection/plugin surface (spec §6 Editor
/// API). `subscribe` returns a numeric token rather than an unsubscribe
/// closure — a plain id plus [`Editor::unsubscribe`] avoids boxing a second
/// closure per listener for the same effect.
pub struct Editor {
    document: Document,
    selection: Option<Range>,
    read_only: bool,
    history: History,
    pending_batch: Option<Batch>,
    batch_depth: usize,
    config: EditorConfig,
    plugins: PluginManager,
    subscribers: Vec<(u64, Listener)>,
    next_subscriber_id: u64,
}

impl Default for Editor {
    fn default() -> Self {
        Editor::new()
    }
}

impl Editor {
    pub fn new() -> Self {
        Editor::with_document(Document::empty())
    }

    pub fn with_document(document: Document) -> Self {
        Editor {
            document,
            selection: None,
            read_only: false,
            history: History::default(),
            pending_batch: None,
            batch_depth: 0,
            config: EditorConfig::default(),
            plugins: PluginManager::new(),
            subscribers: Vec::new(),
            next_subscriber_id: 0,
        }
    }

    pub fn get_document(&self) -> &Document {
        &self.document
    }

    pub fn get_selection(&self) -> Option<&Range> {
        self.selection.as_ref()
    }

    pub fn set_selection(&mut self, selection: Option<Range>) {
        let old = self.selection.clone();
        self.selection = selection.clone();
        let _ = self.apply_internal(vec![Operation::SetSelection { old_selection: old, new_selection: selection }]);
    }

    pub fn get_selected_text(&self) -> String {
        match &self.selection {
            Some(range) => selection::get_selected_text(&self.document.root, range),
            None => String::new(),
        }
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn set_read_only(&mut self, flag: bool) {
        self.read_only = flag;
    }

    /// Replaces the document wholesale. `reset_history` clears undo/redo
    /// (the usual case — loading a different document) as opposed to
    /// leaving history in place when a caller is restoring a snapshot that
    /// should remain undoable against prior state.
    pub fn set_document(&mut self, document: Document, reset_history: bool) {
        self.document = document;
        if reset_history {
            self.history.undo.clear();
            self.history.redo.clear();
            self.pending_batch = None;
            self.batch_depth = 0;
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: EditorConfig) {
        self.config = config;
    }

    /// Applies a single op (spec §4.F `apply`). Read-only editors silently
    /// no-op non-selection ops.
    #[instrument(level = "debug", skip(self))]
    pub fn apply(&mut self, op: Operation) -> Result<(), OperationError> {
        if self.read_only && !matches!(op, Operation::SetSelection { .. }) {
            return Ok(());
        }
        self.apply_internal(vec![op])
    }

    pub fn apply_batch(&mut self, ops: Vec<Operation>) -> Result<(), OperationError> {
        self.batch(|editor| {
            for op in ops {
                editor.apply(op)?;
            }
            Ok(())
        })
    }

    /// Runs `f` inside a batch: ops `f` applies via [`Editor::apply`] are
    /// accumulated and committed as one undo step when the outermost batch
    /// closes. Batches nest (spec §4.F).
    pub fn batch<F>(&mut self, f: F) -> Result<(), OperationError>
    where
        F: FnOnce(&mut Editor) -> Result<(), OperationError>,
    {
        self.batch_depth += 1;
        if self.batch_depth == 1 {
            self.pending_batch = Some(Batch { selection_before: self.selection.clone(), ..Default::default() });
        }
        let result = f(self);
        self.batch_depth -= 1;
        if self.batch_depth == 0 {
            self.commit_pending_batch();
        }
        result
    }

    fn apply_internal(&mut self, ops: Vec<Operation>) -> Result<(), OperationError> {
        let ops = self.with_plugins(|plugins, editor| plugins.dispatch_before_apply(editor, ops));
        if ops.is_empty() {
            return Ok(());
        }

        let mut applied = Vec::with_capacity(ops.len());
        let mut result = Ok(());
        for op in &ops {
            match op {
                Operation::SetSelection { new_selection, .. } => {
                    self.selection = new_selection.clone();
                }
                _ => match apply_operation(&self.document.root, op) {
                    Ok(new_root) => self.document = self.document.with_root(new_root),
                    Err(err) => {
                        result = Err(err);
                        break;
                    }
                },
            }
            applied.push(op.clone());
        }

        if self.batch_depth > 0 {
            if let Some(batch) = &mut self.pending_batch {
                batch.ops.extend(applied.iter().filter(|op| !matches!(op, Operation::SetSelection { .. })).cloned());
                batch.selection_after = self.selection.clone();
            }
        } else {
            let non_selection: Vec<Operation> =
                applied.iter().filter(|op| !matches!(op, Operation::SetSelection { .. })).cloned().collect();
            if !non_selection.is_empty() {
                let mut batch = Batch { ops: non_selection, selection_before: None, selection_after: self.selection.clone() };
                self.normalize_batch(&mut batch);
                self.push_batch(batch);
            }
        }

        self.with_plugins(|plugins, editor| {
            plugins.dispatch_after_apply(editor, &applied);
        });
        self.notify_subscribers();
        result
    }

    fn commit_pending_batch(&mut self) {
        if let Some(mut batch) = self.pending_batch.take() {
            if !batch.ops.is_empty() {
                self.normalize_batch(&mut batch);
                self.push_batch(batch);
            }
        }
    }

    fn push_batch(&mut self, batch: Batch) {
        self.history.undo.push_back(batch);
        self.history.redo.clear();
        if let Some(cap) = self.config.max_history_batches {
            while self.history.undo.len() > cap {
                self.history.undo.pop_front();
            }
        }
    }

    /// Runs the five structural-invariant rules to a fixed point against the
    /// current document (spec §4.E: "after every batch commit") and appends
    /// whatever ops they emitted onto the end of `batch`, so `undo` inverts
    /// the normalization along with the user's edit (spec §8 property 7).
    /// Called once per batch commit, never per op, so a multi-op batch
    /// (e.g. "insert an empty run, then insert text into it") doesn't have
    /// an earlier op's path invalidated by normalization before a later op
    /// in the same batch runs.
    fn normalize_batch(&mut self, batch: &mut Batch) {
        let (normalized, ops) = normalize::normalize_with_ops(&self.document.root);
        if !ops.is_empty() {
            self.document = self.document.with_root(normalized);
            batch.ops.extend(ops);
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.history.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.history.redo.is_empty()
    }

    /// Pops one batch, applies `invert` to each op in reverse order, and
    /// moves the batch to the redo stack (spec §4.F). Restores the
    /// selection captured at the batch's start.
    pub fn undo(&mut self) -> Result<(), OperationError> {
        let Some(batch) = self.history.undo.pop_back() else { return Ok(()) };
        for op in batch.ops.iter().rev() {
            let new_root = apply_operation(&self.document.root, &invert(op))?;
            self.document = self.document.with_root(new_root);
        }
        if batch.selection_before.is_some() {
            self.selection = batch.selection_before.clone();
        }
        self.history.redo.push_back(batch);
        debug!(undo_depth = self.history.undo.len(), "undo applied");
        Ok(())
    }

    pub fn redo(&mut self) -> Result<(), OperationError> {
        let Some(batch) = self.history.redo.pop_back() else { return Ok(()) };
        for op in &batch.ops {
            let new_root = apply_operation(&self.document.root, op)?;
            self.document = self.document.with_root(new_root);
        }
        if batch.selection_after.is_some() {
            self.selection = batch.selection_after.clone();
        }
        self.history.undo.push_back(batch);
        Ok(())
    }

    pub fn register_plugin(&mut self, mut plugin: Box<dyn Plugin>) {
        plugin.initialize(self);
        self.plugins.register_plugin(plugin);
    }

    pub fn unregister_plugin(&mut self, id: &str) {
        self.plugins.unregister_plugin(id);
    }

    pub fn get_plugin(&self, id: &str) -> Option<&dyn Plugin> {
        self.plugins.plugin(id)
    }

    pub fn register_command(&mut self, command: Box<dyn Command>) {
        self.plugins.register_command(command);
    }

    pub fn can_execute_command(&self, id: &str, args: &CommandArgs) -> bool {
        match self.plugins.command(id) {
            Some(command) => command.can_execute(self, args),
            None => false,
        }
    }

    /// Executes a registered command. Commands may themselves call
    /// `editor.apply`/`editor.batch` re-entrantly; those ops participate in
    /// whatever batch is already open (spec §4.G). Cloning the command's
    /// `Rc` out of the registry first lets `execute` take `&mut self` even
    /// though the command itself lives inside `self.plugins`.
    pub fn execute_command(&mut self, id: &str, args: &CommandArgs) {
        let Some(command) = self.plugins.command_handle(id) else { return };
        if command.can_execute(self, args) {
            command.execute(self, args);
        }
    }

    pub fn subscribe<F>(&mut self, listener: F) -> u64
    where
        F: Fn(&Document) + 'static,
    {
        let id = self.next_subscriber_id;
        self.next_subscriber_id += 1;
        self.subscribers.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: u64) {
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
    }

    fn notify_subscribers(&self) {
        for (_, listener) in &self.subscribers {
            listener(&self.document);
        }
    }

    /// Temporarily takes `self.plugins` out so callers can pass `&self`/`&mut
    /// self` to plugin hooks without a field-borrow conflict.
    fn with_plugins<F, R>(&mut self, f: F) -> R
    where
        F: FnOnce(&mut PluginManager, &Editor) -> R,
    {
        let mut plugins = std::mem::take(&mut self.plugins);
        let result = f(&mut plugins, self);
        self.plugins = plugins;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::factory;
    use crate::path::{Path, Point};

    fn editor_with_paragraph(text: &str) -> Editor {
        let root = factory::document(factory::body(smallvec::smallvec![factory::simple_paragraph(text)]));
        Editor::with_document(Document { root, ..Document::empty() })
    }

    #[test]
    fn apply_insert_text_updates_document() {
        let mut editor = editor_with_paragraph("Hello World");
        let path = Path::from_indices([0, 0, 0, 0]);
        editor.apply(Operation::InsertText { path: path.clone(), offset: 5, text: ",".to_string() }).unwrap();
        let node = crate::model::get_node_at_path(&editor.get_document().root, &path).unwrap();
        assert_eq!(node.text(), Some("Hello, World"));
    }

    #[test]
    fn undo_reverts_and_redo_reapplies() {
        let mut editor = editor_with_paragraph("Hello");
        let path = Path::from_indices([0, 0, 0, 0]);
        editor.apply(Operation::InsertText { path: path.clone(), offset: 5, text: "!".to_string() }).unwrap();
        assert!(editor.can_undo());
        editor.undo().unwrap();
        let node = crate::model::get_node_at_path(&editor.get_document().root, &path).unwrap();
        assert_eq!(node.text(), Some("Hello"));
        assert!(editor.can_redo());
        editor.redo().unwrap();
        let node = crate::model::get_node_at_path(&editor.get_document().root, &path).unwrap();
        assert_eq!(node.text(), Some("Hello!"));
    }

    #[test]
    fn read_only_editor_ignores_non_selection_ops() {
        let mut editor = editor_with_paragraph("Hello");
        editor.set_read_only(true);
        let path = Path::from_indices([0, 0, 0, 0]);
        editor.apply(Operation::InsertText { path: path.clone(), offset: 0, text: "X".to_string() }).unwrap();
        let node = crate::model::get_node_at_path(&editor.get_document().root, &path).unwrap();
        assert_eq!(node.text(), Some("Hello"));
    }

    #[test]
    fn batch_groups_multiple_ops_into_one_undo_step() {
        let mut editor = editor_with_paragraph("");
        let path = Path::from_indices([0, 0, 0, 0]);
        editor
            .batch(|editor| {
                editor.apply(Operation::InsertText { path: path.clone(), offset: 0, text: "f".to_string() })?;
                editor.apply(Operation::InsertText { path: path.clone(), offset: 1, text: "oo".to_string() })?;
                Ok(())
            })
            .unwrap();
        let node = crate::model::get_node_at_path(&editor.get_document().root, &path).unwrap();
        assert_eq!(node.text(), Some("foo"));
        editor.undo().unwrap();
        let node = crate::model::get_node_at_path(&editor.get_document().root, &path).unwrap();
        assert_eq!(node.text(), Some(""));
    }

    #[test]
    fn undo_restores_selection_captured_at_batch_start() {
        let mut editor = editor_with_paragraph("Hello");
        let point = Point::new(Path::from_indices([0, 0, 0, 0]), 0);
        editor.set_selection(Some(Range::collapsed(point.clone())));
        let path = Path::from_indices([0, 0, 0, 0]);
        editor.apply(Operation::InsertText { path, offset: 0, text: "X".to_string() }).unwrap();
        editor.set_selection(Some(Range::collapsed(Point::new(point.path.clone(), 1))));
        editor.undo().unwrap();
        assert_eq!(editor.get_selection().unwrap().anchor.offset, 1);
    }

    #[test]
    fn undo_reverses_a_normalization_triggered_merge() {
        use crate::properties::{PropertyPatch, PropertyValue, RunProperties};

        let run_a = factory::run(
            RunProperties::default().merged(&PropertyPatch::new().set("bold", PropertyValue::Bool(false))),
            "foo",
        );
        let run_b = factory::run(
            RunProperties::default().merged(&PropertyPatch::new().set("bold", PropertyValue::Bool(true))),
            "bar",
        );
        let paragraph = factory::paragraph(Default::default(), smallvec::smallvec![run_a, run_b]);
        let root = factory::document(factory::body(smallvec::smallvec![paragraph]));
        let mut editor = Editor::with_document(Document { root, ..Document::empty() });

        let run_b_path = Path::from_indices([0, 0, 1]);
        let patch = PropertyPatch::new().set("bold", PropertyValue::Bool(false));
        let op = crate::ops::build_set_properties(&editor.get_document().root, &run_b_path, patch).unwrap();
        editor.apply(op).unwrap();

        // Making run_b's bold match run_a's triggers normalization's
        // adjacent-runs-with-equal-properties merge, collapsing the
        // paragraph down to a single run.
        let paragraph_node = &editor.get_document().root.children()[0].children()[0];
        assert_eq!(paragraph_node.children().len(), 1);
        assert_eq!(paragraph_node.children()[0].children()[0].text(), Some("foobar"));

        editor.undo().unwrap();

        let paragraph_node = &editor.get_document().root.children()[0].children()[0];
        assert_eq!(paragraph_node.children().len(), 2);
        assert_eq!(paragraph_node.children()[0].children()[0].text(), Some("foo"));
        assert_eq!(paragraph_node.children()[1].children()[0].text(), Some("bar"));
        let run_a_bold = match &paragraph_node.children()[0].as_element().unwrap().kind {
            crate::model::ElementKind::Run(props) => props.bold,
            _ => panic!("expected a run"),
        };
        let run_b_bold = match &paragraph_node.children()[1].as_element().unwrap().kind {
            crate::model::ElementKind::Run(props) => props.bold,
            _ => panic!("expected a run"),
        };
        assert_eq!(run_a_bold, Some(false));
        assert_eq!(run_b_bold, Some(true));
    }

    #[test]
    fn subscribers_fire_on_apply() {
        let mut editor = editor_with_paragraph("Hello");
        let count = std::rc::Rc::new(std::cell::Cell::new(0));
        let count_clone = count.clone();
        editor.subscribe(move |_doc| count_clone.set(count_clone.get() + 1));
        editor.apply(Operation::SetSelection { old_selection: None, new_selection: None }).unwrap();
        assert_eq!(count.get(), 1);
    }
}
