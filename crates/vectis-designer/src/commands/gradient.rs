//! Gradient swatch edits.

use std::any::Any;
use vectis_core::{CommandError, GradientId};

use super::{downcast, not_applied, Command, CommandMeta, Target};
use crate::geometry::Point;
use crate::scene::{Color, Document, Gradient, GradientKind, GradientStop};

/// A single mutation of a gradient resource.
#[derive(Debug, Clone, PartialEq)]
pub enum GradientOperation {
    MoveStart(Point),
    MoveEnd(Point),
    /// Radial gradients only.
    MoveFocus(Point),
    /// Offset is clamped to 0..=1.
    ChangeStopOffset { index: usize, delta: f64 },
    /// Components are clamped to 0..=1.
    ChangeStopColor { index: usize, delta: Color },
    InsertStop { index: usize, stop: GradientStop },
    RemoveStop { index: usize },
}

impl GradientOperation {
    pub fn name(&self) -> &'static str {
        match self {
            GradientOperation::MoveStart(_) => "move_start",
            GradientOperation::MoveEnd(_) => "move_end",
            GradientOperation::MoveFocus(_) => "move_focus",
            GradientOperation::ChangeStopOffset { .. } => "change_stop_offset",
            GradientOperation::ChangeStopColor { .. } => "change_stop_color",
            GradientOperation::InsertStop { .. } => "insert_stop",
            GradientOperation::RemoveStop { .. } => "remove_stop",
        }
    }

    fn check(&self, gradient: &Gradient) -> Result<(), CommandError> {
        let unsupported = |reason: String| CommandError::UnsupportedOperation {
            operation: self.name().to_string(),
            reason,
        };
        let len = gradient.stops.len();
        match self {
            GradientOperation::MoveFocus(_) if gradient.kind != GradientKind::Radial => Err(
                unsupported("only radial gradients have a focus".to_string()),
            ),
            GradientOperation::ChangeStopOffset { index, .. }
            | GradientOperation::ChangeStopColor { index, .. }
            | GradientOperation::RemoveStop { index }
                if *index >= len =>
            {
                Err(unsupported(format!("stop {} out of range (len: {})", index, len)))
            }
            GradientOperation::InsertStop { index, .. } if *index > len => Err(unsupported(
                format!("stop {} out of range (len: {})", index, len),
            )),
            _ => Ok(()),
        }
    }

    /// Whether `other` edits the same property, so the two can share a
    /// history entry.
    fn same_subject(&self, other: &GradientOperation) -> bool {
        match (self, other) {
            (GradientOperation::MoveStart(_), GradientOperation::MoveStart(_))
            | (GradientOperation::MoveEnd(_), GradientOperation::MoveEnd(_))
            | (GradientOperation::MoveFocus(_), GradientOperation::MoveFocus(_)) => true,
            (
                GradientOperation::ChangeStopOffset { index: i, .. },
                GradientOperation::ChangeStopOffset { index: j, .. },
            )
            | (
                GradientOperation::ChangeStopColor { index: i, .. },
                GradientOperation::ChangeStopColor { index: j, .. },
            ) => i == j,
            _ => false,
        }
    }
}

/// What revert needs to undo an operation.
#[derive(Debug, Clone, PartialEq)]
enum Undo {
    Point(Point),
    Offset(f64),
    Color(Color),
    Remove(usize),
    Insert(usize, GradientStop),
}

/// Mutate one gradient resource.
///
/// Merged edits keep every request and replay them in order, so clamped
/// offsets and colours redo exactly as they were first applied.
#[derive(Debug)]
pub struct ModifyGradientCommand {
    meta: CommandMeta,
    gradient: GradientId,
    operations: Vec<GradientOperation>,
    undo: Vec<Undo>,
}

impl ModifyGradientCommand {
    pub fn new(gradient: GradientId, operation: GradientOperation) -> Self {
        Self {
            meta: CommandMeta::new(format!("Edit gradient ({})", operation.name())),
            gradient,
            operations: vec![operation],
            undo: Vec::new(),
        }
    }

    /// Requests in the order they are applied.
    pub fn operations(&self) -> &[GradientOperation] {
        &self.operations
    }

    /// Sum of the requested deltas, ignoring clamping.
    pub fn requested(&self) -> Option<GradientOperation> {
        let (first, rest) = self.operations.split_first()?;
        let mut total = first.clone();
        for op in rest {
            total = match (total, op) {
                (GradientOperation::MoveStart(a), GradientOperation::MoveStart(b)) => {
                    GradientOperation::MoveStart(a + *b)
                }
                (GradientOperation::MoveEnd(a), GradientOperation::MoveEnd(b)) => {
                    GradientOperation::MoveEnd(a + *b)
                }
                (GradientOperation::MoveFocus(a), GradientOperation::MoveFocus(b)) => {
                    GradientOperation::MoveFocus(a + *b)
                }
                (
                    GradientOperation::ChangeStopOffset { index, delta: a },
                    GradientOperation::ChangeStopOffset { delta: b, .. },
                ) => GradientOperation::ChangeStopOffset {
                    index,
                    delta: a + b,
                },
                (
                    GradientOperation::ChangeStopColor { index, delta: a },
                    GradientOperation::ChangeStopColor { delta: b, .. },
                ) => GradientOperation::ChangeStopColor {
                    index,
                    delta: Color::rgba(a.r + b.r, a.g + b.g, a.b + b.b, a.a + b.a),
                },
                _ => return None,
            };
        }
        Some(total)
    }
}

fn mutate(gradient: &mut Gradient, operation: &GradientOperation) -> Undo {
    match operation {
        GradientOperation::MoveStart(d) => {
            let old = gradient.start;
            gradient.start += *d;
            Undo::Point(old)
        }
        GradientOperation::MoveEnd(d) => {
            let old = gradient.end;
            gradient.end += *d;
            Undo::Point(old)
        }
        GradientOperation::MoveFocus(d) => {
            let old = gradient.focus;
            gradient.focus += *d;
            Undo::Point(old)
        }
        GradientOperation::ChangeStopOffset { index, delta } => {
            let stop = &mut gradient.stops[*index];
            let old = stop.offset;
            stop.offset = (old + delta).clamp(0.0, 1.0);
            Undo::Offset(old)
        }
        GradientOperation::ChangeStopColor { index, delta } => {
            let stop = &mut gradient.stops[*index];
            let old = stop.color;
            stop.color = old.offset(delta);
            Undo::Color(old)
        }
        GradientOperation::InsertStop { index, stop } => {
            gradient.stops.insert(*index, *stop);
            Undo::Remove(*index)
        }
        GradientOperation::RemoveStop { index } => {
            let stop = gradient.stops.remove(*index);
            Undo::Insert(*index, stop)
        }
    }
}

fn restore(gradient: &mut Gradient, operation: &GradientOperation, undo: Undo) {
    match (undo, operation) {
        (Undo::Point(old), GradientOperation::MoveStart(_)) => gradient.start = old,
        (Undo::Point(old), GradientOperation::MoveEnd(_)) => gradient.end = old,
        (Undo::Point(old), GradientOperation::MoveFocus(_)) => gradient.focus = old,
        (Undo::Offset(old), GradientOperation::ChangeStopOffset { index, .. }) => {
            if let Some(stop) = gradient.stops.get_mut(*index) {
                stop.offset = old;
            }
        }
        (Undo::Color(old), GradientOperation::ChangeStopColor { index, .. }) => {
            if let Some(stop) = gradient.stops.get_mut(*index) {
                stop.color = old;
            }
        }
        (Undo::Remove(index), _) => {
            if index < gradient.stops.len() {
                gradient.stops.remove(index);
            }
        }
        (Undo::Insert(index, stop), _) => {
            let index = index.min(gradient.stops.len());
            gradient.stops.insert(index, stop);
        }
        _ => {}
    }
}

impl Command for ModifyGradientCommand {
    fn meta(&self) -> &CommandMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut CommandMeta {
        &mut self.meta
    }

    fn targets(&self) -> Vec<Target> {
        vec![Target::Gradient(self.gradient)]
    }

    fn apply(&mut self, doc: &mut Document) -> Result<(), CommandError> {
        // merged requests share one subject, so none of them changes the
        // stop count and all can be checked up front
        let gradient = doc.gradient(self.gradient)?;
        for operation in &self.operations {
            operation.check(gradient)?;
        }
        let operations = &self.operations;
        self.undo = doc.edit_gradient(self.gradient, |g| {
            operations.iter().map(|op| mutate(g, op)).collect::<Vec<_>>()
        })?;
        Ok(())
    }

    fn revert(&mut self, doc: &mut Document) -> Result<(), CommandError> {
        if self.undo.is_empty() {
            return Err(not_applied(&self.meta));
        }
        let undo = std::mem::take(&mut self.undo);
        let operations = &self.operations;
        doc.edit_gradient(self.gradient, |g| {
            for (operation, undo) in operations.iter().zip(undo).rev() {
                restore(g, operation, undo);
            }
        })?;
        Ok(())
    }

    /// Same gradient and same property (and stop) share one entry.
    fn merge(&self, next: &dyn Command) -> Option<Box<dyn Command>> {
        let next = downcast::<Self>(next)?;
        if next.gradient != self.gradient {
            return None;
        }
        let subject = self.operations.first()?;
        if !next.operations.iter().all(|op| subject.same_subject(op)) {
            return None;
        }
        let mut operations = self.operations.clone();
        operations.extend(next.operations.iter().cloned());
        let mut undo = self.undo.clone();
        undo.extend(next.undo.iter().cloned());
        Some(Box::new(Self {
            meta: next.meta.clone(),
            gradient: self.gradient,
            operations,
            undo,
        }))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
