//! Undo/redo history for document edits.
//!
//! Commands are kept in two stacks. The id of the command on top of the undo
//! stack is the current *position*; ids grow monotonically, so any recorded
//! position can be reached again with [`History::set_position`].
//!
//! The stacks lock is only held to move commands between stacks. Commands
//! apply and revert, and events go out, with the lock released, so event
//! handlers may query the history. Each apply or revert runs inside an event
//! bus batch.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::time::Duration;
use vectis_core::{CommandError, EditorConfig, EditorEvent, HistoryEvent, LayerId, Severity};

use crate::commands::{same_kind, Command};
use crate::scene::Document;

/// One row of the history list.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub id: u64,
    pub description: String,
    pub time: DateTime<Utc>,
    /// False for entries that have been undone and can be redone.
    pub applied: bool,
}

impl HistoryEntry {
    fn of(command: &dyn Command, applied: bool) -> Self {
        Self {
            id: command.id(),
            description: command.description().to_string(),
            time: command.meta().time,
            applied,
        }
    }
}

#[derive(Debug, Default)]
struct Stacks {
    undo: Vec<Box<dyn Command>>,
    redo: Vec<Box<dyn Command>>,
    /// Layers kept alive by commands that have since been dropped.
    released: Vec<LayerId>,
}

impl Stacks {
    fn position(&self) -> u64 {
        self.undo.last().map_or(0, |c| c.id())
    }

    fn discard(&mut self, command: Box<dyn Command>) {
        self.released.extend(command.retained_layers());
    }

    fn clear_redo(&mut self) {
        for command in std::mem::take(&mut self.redo) {
            self.discard(command);
        }
    }

    fn push_undo(&mut self, command: Box<dyn Command>, max_depth: usize) {
        self.undo.push(command);
        if max_depth > 0 && self.undo.len() > max_depth {
            let dropped = self.undo.remove(0);
            tracing::debug!(id = dropped.id(), "Dropped oldest history entry");
            self.discard(dropped);
        }
    }

    /// Released layers together with every layer still retained by a
    /// recorded command.
    fn take_released(&mut self) -> Option<(Vec<LayerId>, HashSet<LayerId>)> {
        if self.released.is_empty() {
            return None;
        }
        let keep = self
            .undo
            .iter()
            .chain(self.redo.iter())
            .flat_map(|c| c.retained_layers())
            .collect();
        Some((std::mem::take(&mut self.released), keep))
    }
}

/// Undo and redo stacks for one document.
#[derive(Debug, Default)]
pub struct History {
    stacks: Mutex<Stacks>,
    max_depth: usize,
}

impl History {
    /// Create an unbounded history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a history bounded by `max_history_depth` (0 = unlimited).
    pub fn with_config(config: &EditorConfig) -> Self {
        Self {
            stacks: Mutex::new(Stacks::default()),
            max_depth: config.max_history_depth,
        }
    }

    /// Apply `command` and record it. Returns the new position.
    ///
    /// On failure nothing is recorded, a status event is published and the
    /// error is returned.
    pub fn execute(
        &self,
        doc: &mut Document,
        mut command: Box<dyn Command>,
    ) -> vectis_core::Result<u64> {
        if let Err(e) = batched(doc, |doc| command.apply(doc)) {
            return Err(reject(doc, command.as_ref(), e));
        }
        let event = executed(command.as_ref());

        let position = {
            let mut stacks = self.stacks.lock();
            stacks.clear_redo();
            stacks.push_undo(command, self.max_depth);
            stacks.position()
        };
        doc.notify(event);
        self.reclaim(doc);
        Ok(position)
    }

    /// Apply `command` and coalesce it into the top entry when both are of the
    /// same kind, created less than `window` apart, and the top entry accepts
    /// the merge. Returns the new position.
    pub fn merge(
        &self,
        doc: &mut Document,
        mut command: Box<dyn Command>,
        window: Duration,
    ) -> vectis_core::Result<u64> {
        let top = match self.stacks.lock().undo.last() {
            Some(top) if same_kind(top.as_ref(), command.as_ref()) => Some(top.id()),
            _ => None,
        };
        let Some(top) = top else {
            return self.execute(doc, command);
        };

        if let Err(e) = batched(doc, |doc| command.apply(doc)) {
            return Err(reject(doc, command.as_ref(), e));
        }

        let (event, position) = {
            let mut stacks = self.stacks.lock();
            stacks.clear_redo();

            // the top may have moved while the lock was released
            let replacement = stacks
                .undo
                .last()
                .filter(|current| current.id() == top)
                .and_then(|current| {
                    let within = match (command.meta().time - current.meta().time).to_std() {
                        Ok(elapsed) => elapsed < window,
                        Err(_) => true,
                    };
                    if within {
                        current.merge(command.as_ref())
                    } else {
                        None
                    }
                });

            let event = match replacement {
                Some(merged) => {
                    stacks.undo.pop();
                    let id = merged.id();
                    tracing::debug!(id, description = merged.description(), "Merged command");
                    stacks.undo.push(merged);
                    EditorEvent::History(HistoryEvent::Merged { id })
                }
                None => {
                    let event = executed(command.as_ref());
                    stacks.push_undo(command, self.max_depth);
                    event
                }
            };
            (event, stacks.position())
        };
        doc.notify(event);
        self.reclaim(doc);
        Ok(position)
    }

    /// Remove the top undo entry without reverting it.
    pub fn pop(&self) -> Option<Box<dyn Command>> {
        self.stacks.lock().undo.pop()
    }

    /// Record an already-applied command.
    ///
    /// Layers released by the dropped redo entries are reclaimed on the next
    /// call that takes the document.
    pub fn push(&self, command: Box<dyn Command>) {
        let mut stacks = self.stacks.lock();
        stacks.clear_redo();
        stacks.push_undo(command, self.max_depth);
    }

    /// Id of the last applied command, or 0.
    pub fn position(&self) -> u64 {
        self.stacks.lock().position()
    }

    /// Undo or redo one command at a time until `target` is reached or a
    /// stack runs out. Returns the final position.
    ///
    /// A command that fails to apply or revert goes back onto the stack it
    /// came from and the error is returned.
    pub fn set_position(&self, doc: &mut Document, target: u64) -> vectis_core::Result<u64> {
        let start = self.position();
        let result = self.step(doc, target);

        let position = self.position();
        if position != start {
            doc.notify(EditorEvent::History(HistoryEvent::PositionChanged { position }));
        }
        self.reclaim(doc);
        result.map(|_| position)
    }

    fn step(&self, doc: &mut Document, target: u64) -> vectis_core::Result<()> {
        loop {
            let next = {
                let mut stacks = self.stacks.lock();
                if stacks.undo.last().is_some_and(|c| c.id() > target) {
                    stacks.undo.pop()
                } else {
                    None
                }
            };
            let Some(mut command) = next else {
                break;
            };
            if let Err(e) = batched(doc, |doc| command.revert(doc)) {
                tracing::warn!(id = command.id(), "Undo failed: {}", e);
                let description = command.description().to_string();
                self.stacks.lock().undo.push(command);
                return Err(report(doc, &description, e));
            }
            tracing::debug!(id = command.id(), description = command.description(), "Undo");
            self.stacks.lock().redo.push(command);
        }

        loop {
            let next = {
                let mut stacks = self.stacks.lock();
                if stacks.redo.last().is_some_and(|c| c.id() <= target) {
                    stacks.redo.pop()
                } else {
                    None
                }
            };
            let Some(mut command) = next else {
                break;
            };
            if let Err(e) = batched(doc, |doc| command.apply(doc)) {
                tracing::warn!(id = command.id(), "Redo failed: {}", e);
                let description = command.description().to_string();
                self.stacks.lock().redo.push(command);
                return Err(report(doc, &description, e));
            }
            tracing::debug!(id = command.id(), description = command.description(), "Redo");
            self.stacks.lock().push_undo(command, self.max_depth);
        }
        Ok(())
    }

    /// Revert the last applied command. Returns the new position.
    pub fn undo(&self, doc: &mut Document) -> vectis_core::Result<u64> {
        let target = {
            let stacks = self.stacks.lock();
            match stacks.undo.len() {
                0 => return Ok(0),
                1 => 0,
                n => stacks.undo[n - 2].id(),
            }
        };
        self.set_position(doc, target)
    }

    /// Re-apply the last undone command. Returns the new position.
    pub fn redo(&self, doc: &mut Document) -> vectis_core::Result<u64> {
        let target = {
            let stacks = self.stacks.lock();
            match stacks.redo.last() {
                Some(command) => command.id(),
                None => return Ok(stacks.position()),
            }
        };
        self.set_position(doc, target)
    }

    pub fn can_undo(&self) -> bool {
        !self.stacks.lock().undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.stacks.lock().redo.is_empty()
    }

    pub fn undo_description(&self) -> Option<String> {
        self.stacks
            .lock()
            .undo
            .last()
            .map(|c| c.description().to_string())
    }

    pub fn redo_description(&self) -> Option<String> {
        self.stacks
            .lock()
            .redo
            .last()
            .map(|c| c.description().to_string())
    }

    pub fn undo_len(&self) -> usize {
        self.stacks.lock().undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.stacks.lock().redo.len()
    }

    /// The whole log, oldest first.
    pub fn entries(&self) -> Vec<HistoryEntry> {
        let stacks = self.stacks.lock();
        stacks
            .undo
            .iter()
            .map(|c| HistoryEntry::of(c.as_ref(), true))
            .chain(
                stacks
                    .redo
                    .iter()
                    .rev()
                    .map(|c| HistoryEntry::of(c.as_ref(), false)),
            )
            .collect()
    }

    /// Drop every entry and purge layers only the history kept alive.
    pub fn clear(&self, doc: &mut Document) {
        let mut stacks = self.stacks.lock();
        let entries = stacks.undo.len() + stacks.redo.len();
        stacks.undo.clear();
        stacks.redo.clear();
        stacks.released.clear();
        drop(stacks);

        let purged = doc.purge_detached();
        tracing::info!(entries, purged, "History cleared");
        doc.notify(EditorEvent::History(HistoryEvent::Cleared));
    }

    /// Free detached layers that no recorded command can attach again.
    fn reclaim(&self, doc: &mut Document) {
        let Some((released, keep)) = self.stacks.lock().take_released() else {
            return;
        };
        let freed = doc.release(&released, &keep);
        if freed > 0 {
            tracing::debug!(freed, "Reclaimed layers of dropped history entries");
        }
    }
}

/// Run `edit` with the document's events held back until it returns.
fn batched<F>(doc: &mut Document, edit: F) -> Result<(), CommandError>
where
    F: FnOnce(&mut Document) -> Result<(), CommandError>,
{
    doc.events().begin_batch();
    let result = edit(doc);
    doc.events().end_batch();
    result
}

fn executed(command: &dyn Command) -> EditorEvent {
    let id = command.id();
    tracing::debug!(id, description = command.description(), "Executed command");
    EditorEvent::History(HistoryEvent::Executed {
        id,
        description: command.description().to_string(),
    })
}

fn report(doc: &Document, description: &str, error: CommandError) -> vectis_core::Error {
    doc.notify(EditorEvent::status(
        format!("{}: {}", description, error),
        Severity::Error,
    ));
    error.into()
}

fn reject(doc: &Document, command: &dyn Command, error: CommandError) -> vectis_core::Error {
    tracing::warn!(id = command.id(), description = command.description(), "Command rejected: {}", error);
    report(doc, command.description(), error)
}
