use std::any::Any;
use vectis_core::{CommandError, LayerId};

use super::{Command, CommandMeta, Target};
use crate::scene::Document;

/// Several commands recorded as one history entry.
///
/// Applies in order and reverts in reverse order.
#[derive(Debug)]
pub struct CompoundCommand {
    meta: CommandMeta,
    commands: Vec<Box<dyn Command>>,
}

impl CompoundCommand {
    pub fn new(description: impl Into<String>, commands: Vec<Box<dyn Command>>) -> Self {
        Self {
            meta: CommandMeta::new(description),
            commands,
        }
    }

    pub fn commands(&self) -> &[Box<dyn Command>] {
        &self.commands
    }
}

impl Command for CompoundCommand {
    fn meta(&self) -> &CommandMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut CommandMeta {
        &mut self.meta
    }

    fn targets(&self) -> Vec<Target> {
        let mut targets: Vec<Target> = Vec::new();
        for target in self.commands.iter().flat_map(|c| c.targets()) {
            if !targets.contains(&target) {
                targets.push(target);
            }
        }
        targets
    }

    fn retained_layers(&self) -> Vec<LayerId> {
        self.commands.iter().flat_map(|c| c.retained_layers()).collect()
    }

    fn apply(&mut self, doc: &mut Document) -> Result<(), CommandError> {
        for i in 0..self.commands.len() {
            if let Err(e) = self.commands[i].apply(doc) {
                // roll back what already went through
                for done in self.commands[..i].iter_mut().rev() {
                    if let Err(undo) = done.revert(doc) {
                        tracing::warn!("Rollback of {} failed: {}", done.description(), undo);
                    }
                }
                return Err(e);
            }
        }
        Ok(())
    }

    fn revert(&mut self, doc: &mut Document) -> Result<(), CommandError> {
        for command in self.commands.iter_mut().rev() {
            command.revert(doc)?;
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
