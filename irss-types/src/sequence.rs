//! Macros: named, ordered command sequences.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::command::Command;
use crate::variables::VARIABLE_PREFIX;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Macro {
    pub name: String,
    pub commands: Vec<Command>,
}

impl Macro {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            commands: Vec::new(),
        }
    }

    pub fn with_commands(name: impl Into<String>, commands: Vec<Command>) -> Self {
        Self {
            name: name.into(),
            commands,
        }
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Command> {
        self.commands.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Command> {
        self.commands.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Command> {
        self.commands.get_mut(index)
    }

    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// Insert at `index`; indices past the end append.
    pub fn insert(&mut self, index: usize, command: Command) {
        let index = index.min(self.commands.len());
        self.commands.insert(index, command);
    }

    pub fn remove(&mut self, index: usize) -> Option<Command> {
        if index < self.commands.len() {
            Some(self.commands.remove(index))
        } else {
            None
        }
    }

    pub fn replace(&mut self, index: usize, command: Command) -> Option<Command> {
        self.commands
            .get_mut(index)
            .map(|slot| std::mem::replace(slot, command))
    }

    /// Swap the command at `index` with its predecessor.
    pub fn move_up(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.commands.len() {
            return false;
        }
        self.commands.swap(index - 1, index);
        true
    }

    /// Swap the command at `index` with its successor.
    pub fn move_down(&mut self, index: usize) -> bool {
        if index >= self.commands.len().saturating_sub(1) {
            return false;
        }
        self.commands.swap(index, index + 1);
        true
    }

    /// Trimmed label name → index of its first occurrence.
    pub fn labels(&self) -> HashMap<&str, usize> {
        let mut labels = HashMap::new();
        for (i, cmd) in self.commands.iter().enumerate() {
            if cmd.kind() == crate::CommandKind::Label {
                labels.entry(cmd.parameters()[0].trim()).or_insert(i);
            }
        }
        labels
    }

    /// Literal jump targets with no matching label, as `(index, label)`.
    ///
    /// Targets that reference variables can only be resolved while running
    /// and are not reported.
    pub fn unresolved_gotos(&self) -> Vec<(usize, String)> {
        let labels = self.labels();
        let mut missing = Vec::new();
        for (i, cmd) in self.commands.iter().enumerate() {
            for &p in cmd.kind().label_params() {
                let target = cmd.parameters()[p].trim();
                if target.is_empty() || target.contains('%') || target.starts_with(VARIABLE_PREFIX) {
                    continue;
                }
                if !labels.contains_key(target) {
                    missing.push((i, target.to_string()));
                }
            }
        }
        missing
    }
}

impl<'a> IntoIterator for &'a Macro {
    type Item = &'a Command;
    type IntoIter = std::slice::Iter<'a, Command>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}
