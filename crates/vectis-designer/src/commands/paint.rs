//! Fill and stroke assignment.

use std::any::Any;
use std::fmt::Debug;
use std::marker::PhantomData;
use vectis_core::{CommandError, LayerId, SceneError};

use super::{downcast, ensure_layers, layer_targets, not_applied, Command, CommandMeta, Target};
use crate::scene::{Brush, Document, Pen};

/// Which paint property a command writes.
pub trait PaintSlot: Debug + Send + 'static {
    type Value: Clone + PartialEq + Debug + Send + 'static;

    const LABEL: &'static str;

    fn set(
        doc: &mut Document,
        id: LayerId,
        value: Option<Self::Value>,
    ) -> Result<Option<Self::Value>, SceneError>;
}

#[derive(Debug)]
pub struct FillSlot;

impl PaintSlot for FillSlot {
    type Value = Brush;
    const LABEL: &'static str = "fill";

    fn set(doc: &mut Document, id: LayerId, value: Option<Brush>) -> Result<Option<Brush>, SceneError> {
        doc.set_fill(id, value)
    }
}

#[derive(Debug)]
pub struct StrokeSlot;

impl PaintSlot for StrokeSlot {
    type Value = Pen;
    const LABEL: &'static str = "stroke";

    fn set(doc: &mut Document, id: LayerId, value: Option<Pen>) -> Result<Option<Pen>, SceneError> {
        doc.set_stroke(id, value)
    }
}

/// Set the same fill or stroke on several layers.
#[derive(Debug)]
pub struct ApplyPaintCommand<S: PaintSlot> {
    meta: CommandMeta,
    targets: Vec<LayerId>,
    value: Option<S::Value>,
    previous: Option<Vec<Option<S::Value>>>,
    _slot: PhantomData<S>,
}

pub type ApplyFillCommand = ApplyPaintCommand<FillSlot>;
pub type ApplyStrokeCommand = ApplyPaintCommand<StrokeSlot>;

impl<S: PaintSlot> ApplyPaintCommand<S> {
    /// `None` clears the property.
    pub fn new(targets: Vec<LayerId>, value: Option<S::Value>) -> Self {
        Self {
            meta: CommandMeta::new(format!("Apply {}", S::LABEL)),
            targets,
            value,
            previous: None,
            _slot: PhantomData,
        }
    }

    pub fn value(&self) -> Option<&S::Value> {
        self.value.as_ref()
    }
}

impl<S: PaintSlot> Command for ApplyPaintCommand<S> {
    fn meta(&self) -> &CommandMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut CommandMeta {
        &mut self.meta
    }

    fn targets(&self) -> Vec<Target> {
        layer_targets(&self.targets)
    }

    fn apply(&mut self, doc: &mut Document) -> Result<(), CommandError> {
        ensure_layers(doc, &self.targets)?;
        for id in &self.targets {
            let layer = doc.layer(*id)?;
            if layer.paint().is_none() {
                return Err(SceneError::WrongLayerKind {
                    id: *id,
                    expected: "paintable".to_string(),
                    actual: layer.kind().name().to_string(),
                }
                .into());
            }
        }

        let mut previous = Vec::with_capacity(self.targets.len());
        for id in &self.targets {
            previous.push(S::set(doc, *id, self.value.clone())?);
        }
        self.previous = Some(previous);
        Ok(())
    }

    fn revert(&mut self, doc: &mut Document) -> Result<(), CommandError> {
        let previous = self.previous.take().ok_or_else(|| not_applied(&self.meta))?;
        for (id, value) in self.targets.iter().zip(previous).rev() {
            S::set(doc, *id, value)?;
        }
        Ok(())
    }

    fn merge(&self, next: &dyn Command) -> Option<Box<dyn Command>> {
        let next = downcast::<Self>(next)?;
        if next.targets != self.targets {
            return None;
        }
        Some(Box::new(Self {
            meta: next.meta.clone(),
            targets: self.targets.clone(),
            value: next.value.clone(),
            previous: self.previous.clone(),
            _slot: PhantomData,
        }))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
