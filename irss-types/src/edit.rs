//! The editing seam between commands and whatever presents them to a user.

use crate::command::CommandKind;

/// Result of presenting a command's parameters to an editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// The user confirmed; the full replacement parameter vector.
    Accepted(Vec<String>),
    Cancelled,
}

/// Something that can show a modal parameter editor.
///
/// Implementations must not hold on to `current`; the command keeps its
/// parameters until an accepted result is validated.
pub trait ParameterEditor {
    fn edit(&mut self, kind: CommandKind, current: &[String]) -> EditOutcome;
}

impl<F> ParameterEditor for F
where
    F: FnMut(CommandKind, &[String]) -> EditOutcome,
{
    fn edit(&mut self, kind: CommandKind, current: &[String]) -> EditOutcome {
        self(kind, current)
    }
}
