//! Macro processor: runs a command sequence against a variable list and host.

use std::collections::HashMap;

use irss_types::{Category, Command, CommandKind, Macro, VariableList};

use crate::config::{Config, DEFAULT_MAX_STEPS};
use crate::error::{HostError, MacroError};
use crate::execute::{execute_command, Flow};
use crate::host::Host;

/// Outcome of a completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Commands executed, counting every pass through a loop.
    pub steps: usize,
    /// Side effects handed to the host.
    pub effects: usize,
    /// Side effects the host could not perform and that were skipped.
    pub skipped: usize,
}

#[derive(Debug, Clone)]
pub struct Processor {
    max_steps: usize,
    skip_unsupported: bool,
}

impl Default for Processor {
    fn default() -> Self {
        Self::new()
    }
}

impl Processor {
    pub fn new() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            skip_unsupported: false,
        }
    }

    /// `0` disables the ceiling.
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn with_skip_unsupported(mut self, skip: bool) -> Self {
        self.skip_unsupported = skip;
        self
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new()
            .with_max_steps(config.max_steps())
            .with_skip_unsupported(config.skip_unsupported())
    }

    /// Execute `mac` from its first command until it falls off the end.
    pub fn run(
        &self,
        mac: &Macro,
        vars: &mut VariableList,
        host: &mut dyn Host,
    ) -> Result<RunSummary, MacroError> {
        let labels = resolve_labels(mac);
        let mut summary = RunSummary::default();
        let mut effects = Vec::new();
        let mut ip = 0;

        log::info!(target: "processor", "running macro \"{}\" ({} commands)", mac.name, mac.len());

        while let Some(cmd) = mac.get(ip) {
            if self.max_steps > 0 && summary.steps >= self.max_steps {
                log::error!(target: "processor", "macro \"{}\" stopped after {} steps", mac.name, summary.steps);
                return Err(MacroError::StepLimit(self.max_steps));
            }
            summary.steps += 1;

            let flow = execute_command(cmd, vars, &mut effects)
                .map_err(|source| MacroError::Execute { index: ip, source })?;

            for effect in effects.drain(..) {
                match host.apply(&effect) {
                    Ok(()) => summary.effects += 1,
                    Err(HostError::Unsupported(what)) if self.skip_unsupported => {
                        log::warn!(target: "processor", "step {}: skipping {} (unsupported)", ip, what);
                        summary.skipped += 1;
                    }
                    Err(source) => return Err(MacroError::Host { index: ip, source }),
                }
            }

            ip = match flow {
                Flow::Continue => ip + 1,
                Flow::Jump(label) => match labels.get(label.as_str()) {
                    Some(&target) => {
                        log::debug!(target: "processor", "step {}: jump to \"{}\" at {}", ip, label, target);
                        target + 1
                    }
                    None => return Err(MacroError::LabelNotFound { label, index: ip }),
                },
            };
        }

        log::info!(
            target: "processor",
            "macro \"{}\" finished: {} steps, {} effects",
            mac.name,
            summary.steps,
            summary.effects
        );
        Ok(summary)
    }
}

fn resolve_labels(mac: &Macro) -> HashMap<&str, usize> {
    let labels = mac.labels();
    for (i, cmd) in mac.iter().enumerate() {
        if cmd.kind() != CommandKind::Label {
            continue;
        }
        let name = cmd.parameters()[0].trim();
        if labels.get(name) != Some(&i) {
            log::warn!(target: "processor", "duplicate label \"{}\" at step {} ignored", name, i);
        }
    }
    labels
}

pub fn category_of(kind: CommandKind) -> Category {
    kind.category()
}

pub fn display_text(cmd: &Command) -> String {
    cmd.display_text()
}

/// Every command kind grouped under its category, in listing order.
pub fn commands_by_category() -> Vec<(Category, Vec<CommandKind>)> {
    Category::ALL
        .iter()
        .map(|&category| {
            let kinds = CommandKind::ALL
                .iter()
                .copied()
                .filter(|k| k.category() == category)
                .collect();
            (category, kinds)
        })
        .collect()
}
