//! Command kinds and the fixed-arity parameter model.
//!
//! Every command is a [`CommandKind`] tag plus an ordered vector of string
//! parameters whose length is fixed by the kind. Parameters stay as strings
//! until execution time so that variable tokens can be substituted first.

use serde::{Deserialize, Serialize};

use crate::edit::{EditOutcome, ParameterEditor};

/// Grouping tag used to organise the command picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Control,
    Maths,
    General,
    RemoteControl,
    Power,
    Translator,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Control,
        Category::Maths,
        Category::General,
        Category::RemoteControl,
        Category::Power,
        Category::Translator,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Control => "Control Statements",
            Category::Maths => "Maths Operations",
            Category::General => "General Commands",
            Category::RemoteControl => "Remote Control",
            Category::Power => "Power Commands",
            Category::Translator => "Translator Commands",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comparison operators understood by the `If` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparison {
    Equal,
    NotEqual,
    Less,
    Greater,
    LessOrEqual,
    GreaterOrEqual,
    Contains,
    StartsWith,
    EndsWith,
}

impl Comparison {
    pub const ALL: [Comparison; 9] = [
        Comparison::Equal,
        Comparison::NotEqual,
        Comparison::Less,
        Comparison::Greater,
        Comparison::LessOrEqual,
        Comparison::GreaterOrEqual,
        Comparison::Contains,
        Comparison::StartsWith,
        Comparison::EndsWith,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Comparison::Equal => "==",
            Comparison::NotEqual => "!=",
            Comparison::Less => "<",
            Comparison::Greater => ">",
            Comparison::LessOrEqual => "<=",
            Comparison::GreaterOrEqual => ">=",
            Comparison::Contains => "contains",
            Comparison::StartsWith => "starts with",
            Comparison::EndsWith => "ends with",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
    }

    /// Numeric comparisons parse both sides as integers; the rest compare text.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Comparison::Equal
                | Comparison::NotEqual
                | Comparison::Less
                | Comparison::Greater
                | Comparison::LessOrEqual
                | Comparison::GreaterOrEqual
        )
    }
}

/// Target addressing for the `WindowMessage` command.
pub const WINDOW_TARGETS: [&str; 4] = ["active", "application", "class", "window"];

/// Every executable command type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandKind {
    // Control statements
    Label,
    GotoLabel,
    If,
    SetVariable,
    ClearVariables,
    // Maths
    MathsAdd,
    MathsSubtract,
    MathsMultiply,
    MathsDivide,
    MathsModulo,
    MathsPower,
    MathsAbsolute,
    MathsSquareRoot,
    // General
    Run,
    Pause,
    Popup,
    GotoScreen,
    Focus,
    Exit,
    // Remote control
    Blast,
    Serial,
    WindowMessage,
    // Power
    Standby,
    Hibernate,
    Reboot,
    Shutdown,
    // Translator
    ShowTranslatorOsd,
}

impl CommandKind {
    pub const ALL: [CommandKind; 27] = [
        CommandKind::Label,
        CommandKind::GotoLabel,
        CommandKind::If,
        CommandKind::SetVariable,
        CommandKind::ClearVariables,
        CommandKind::MathsAdd,
        CommandKind::MathsSubtract,
        CommandKind::MathsMultiply,
        CommandKind::MathsDivide,
        CommandKind::MathsModulo,
        CommandKind::MathsPower,
        CommandKind::MathsAbsolute,
        CommandKind::MathsSquareRoot,
        CommandKind::Run,
        CommandKind::Pause,
        CommandKind::Popup,
        CommandKind::GotoScreen,
        CommandKind::Focus,
        CommandKind::Exit,
        CommandKind::Blast,
        CommandKind::Serial,
        CommandKind::WindowMessage,
        CommandKind::Standby,
        CommandKind::Hibernate,
        CommandKind::Reboot,
        CommandKind::Shutdown,
        CommandKind::ShowTranslatorOsd,
    ];

    /// Names of the parameter slots, in order. The length is the arity.
    pub fn parameter_names(self) -> &'static [&'static str] {
        match self {
            CommandKind::Label => &["name"],
            CommandKind::GotoLabel => &["label"],
            CommandKind::If => &["left", "comparison", "right", "label_true", "label_false"],
            CommandKind::SetVariable => &["name", "value"],
            CommandKind::MathsAdd
            | CommandKind::MathsSubtract
            | CommandKind::MathsMultiply
            | CommandKind::MathsDivide
            | CommandKind::MathsModulo
            | CommandKind::MathsPower => &["input1", "input2", "output"],
            CommandKind::MathsAbsolute | CommandKind::MathsSquareRoot => &["input", "output"],
            CommandKind::Run => &["program", "working_dir", "arguments", "wait_for_exit"],
            CommandKind::Pause => &["milliseconds"],
            CommandKind::Popup => &["heading", "text", "timeout_secs"],
            CommandKind::GotoScreen => &["screen"],
            CommandKind::Blast => &["ir_file", "port"],
            CommandKind::Serial => &[
                "command",
                "port",
                "baud",
                "parity",
                "data_bits",
                "stop_bits",
                "wait_for_response",
            ],
            CommandKind::WindowMessage => &["target_type", "target", "message", "wparam", "lparam"],
            CommandKind::ClearVariables
            | CommandKind::Focus
            | CommandKind::Exit
            | CommandKind::Standby
            | CommandKind::Hibernate
            | CommandKind::Reboot
            | CommandKind::Shutdown
            | CommandKind::ShowTranslatorOsd => &[],
        }
    }

    pub fn arity(self) -> usize {
        self.parameter_names().len()
    }

    pub fn category(self) -> Category {
        match self {
            CommandKind::Label
            | CommandKind::GotoLabel
            | CommandKind::If
            | CommandKind::SetVariable
            | CommandKind::ClearVariables => Category::Control,
            CommandKind::MathsAdd
            | CommandKind::MathsSubtract
            | CommandKind::MathsMultiply
            | CommandKind::MathsDivide
            | CommandKind::MathsModulo
            | CommandKind::MathsPower
            | CommandKind::MathsAbsolute
            | CommandKind::MathsSquareRoot => Category::Maths,
            CommandKind::Run
            | CommandKind::Pause
            | CommandKind::Popup
            | CommandKind::GotoScreen
            | CommandKind::Focus
            | CommandKind::Exit => Category::General,
            CommandKind::Blast | CommandKind::Serial | CommandKind::WindowMessage => {
                Category::RemoteControl
            }
            CommandKind::Standby
            | CommandKind::Hibernate
            | CommandKind::Reboot
            | CommandKind::Shutdown => Category::Power,
            CommandKind::ShowTranslatorOsd => Category::Translator,
        }
    }

    pub fn ui_text(self) -> &'static str {
        match self {
            CommandKind::Label => "Label",
            CommandKind::GotoLabel => "Goto Label",
            CommandKind::If => "If Statement",
            CommandKind::SetVariable => "Set Variable",
            CommandKind::ClearVariables => "Clear Variables",
            CommandKind::MathsAdd => "Maths Add",
            CommandKind::MathsSubtract => "Maths Subtract",
            CommandKind::MathsMultiply => "Maths Multiply",
            CommandKind::MathsDivide => "Maths Divide",
            CommandKind::MathsModulo => "Maths Modulo",
            CommandKind::MathsPower => "Maths Power",
            CommandKind::MathsAbsolute => "Maths Absolute",
            CommandKind::MathsSquareRoot => "Maths Square Root",
            CommandKind::Run => "Run Program",
            CommandKind::Pause => "Pause",
            CommandKind::Popup => "Popup Message",
            CommandKind::GotoScreen => "Go To Screen",
            CommandKind::Focus => "Get Focus",
            CommandKind::Exit => "Exit",
            CommandKind::Blast => "Blast IR",
            CommandKind::Serial => "Serial Command",
            CommandKind::WindowMessage => "Window Message",
            CommandKind::Standby => "Standby",
            CommandKind::Hibernate => "Hibernate",
            CommandKind::Reboot => "Reboot",
            CommandKind::Shutdown => "Shutdown",
            CommandKind::ShowTranslatorOsd => "Show Translator OSD",
        }
    }

    /// Value of the `command` attribute in macro files.
    pub fn xml_tag(self) -> &'static str {
        match self {
            CommandKind::Label => "LABEL",
            CommandKind::GotoLabel => "GOTO_LABEL",
            CommandKind::If => "IF",
            CommandKind::SetVariable => "SET_VARIABLE",
            CommandKind::ClearVariables => "CLEAR_VARIABLES",
            CommandKind::MathsAdd => "MATHS_ADD",
            CommandKind::MathsSubtract => "MATHS_SUBTRACT",
            CommandKind::MathsMultiply => "MATHS_MULTIPLY",
            CommandKind::MathsDivide => "MATHS_DIVIDE",
            CommandKind::MathsModulo => "MATHS_MODULO",
            CommandKind::MathsPower => "MATHS_POWER",
            CommandKind::MathsAbsolute => "MATHS_ABSOLUTE",
            CommandKind::MathsSquareRoot => "MATHS_SQUARE_ROOT",
            CommandKind::Run => "RUN",
            CommandKind::Pause => "PAUSE",
            CommandKind::Popup => "POPUP",
            CommandKind::GotoScreen => "GOTO",
            CommandKind::Focus => "GET_FOCUS",
            CommandKind::Exit => "EXIT",
            CommandKind::Blast => "BLAST",
            CommandKind::Serial => "SERIAL",
            CommandKind::WindowMessage => "WINDOW_MESSAGE",
            CommandKind::Standby => "STANDBY",
            CommandKind::Hibernate => "HIBERNATE",
            CommandKind::Reboot => "REBOOT",
            CommandKind::Shutdown => "SHUTDOWN",
            CommandKind::ShowTranslatorOsd => "TRANSLATOR_OSD",
        }
    }

    pub fn from_xml_tag(tag: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.xml_tag() == tag)
    }

    /// Index of the parameter that names an output variable.
    pub fn output_param(self) -> Option<usize> {
        match self {
            CommandKind::SetVariable => Some(0),
            CommandKind::MathsAdd
            | CommandKind::MathsSubtract
            | CommandKind::MathsMultiply
            | CommandKind::MathsDivide
            | CommandKind::MathsModulo
            | CommandKind::MathsPower => Some(2),
            CommandKind::MathsAbsolute | CommandKind::MathsSquareRoot => Some(1),
            _ => None,
        }
    }

    /// Indices of parameters holding label names that execution may jump to.
    pub fn label_params(self) -> &'static [usize] {
        match self {
            CommandKind::GotoLabel => &[0],
            CommandKind::If => &[3, 4],
            _ => &[],
        }
    }

    /// Accept-time checks on a full parameter vector.
    ///
    /// Arity is checked separately by [`Command::with_parameters`].
    pub fn validate(self, params: &[String]) -> Result<(), String> {
        let param = |i: usize| params.get(i).map(String::as_str).unwrap_or("");
        let blank = |i: usize| param(i).trim().is_empty();
        match self {
            CommandKind::Label if blank(0) => Err("label name is required".into()),
            CommandKind::GotoLabel if blank(0) => Err("label to jump to is required".into()),
            CommandKind::If => {
                if blank(0) {
                    return Err("left operand is required".into());
                }
                if Comparison::parse(param(1)).is_none() {
                    return Err(format!("unknown comparison \"{}\"", param(1)));
                }
                if blank(3) && blank(4) {
                    return Err("at least one target label is required".into());
                }
                Ok(())
            }
            CommandKind::SetVariable if blank(0) => Err("variable name is required".into()),
            CommandKind::MathsAdd
            | CommandKind::MathsSubtract
            | CommandKind::MathsMultiply
            | CommandKind::MathsDivide
            | CommandKind::MathsModulo
            | CommandKind::MathsPower => {
                if blank(0) {
                    Err("you must include at least the first input".into())
                } else if blank(2) {
                    Err("you must include an output variable name".into())
                } else {
                    Ok(())
                }
            }
            CommandKind::MathsAbsolute | CommandKind::MathsSquareRoot => {
                if blank(0) {
                    Err("input is required".into())
                } else if blank(1) {
                    Err("you must include an output variable name".into())
                } else {
                    Ok(())
                }
            }
            CommandKind::Run if blank(0) => Err("program is required".into()),
            CommandKind::Pause => match param(0).trim().parse::<u64>() {
                Ok(_) => Ok(()),
                Err(_) => Err(format!(
                    "pause time \"{}\" is not a whole number of milliseconds",
                    param(0)
                )),
            },
            CommandKind::Popup if blank(1) => Err("popup text is required".into()),
            CommandKind::GotoScreen if blank(0) => Err("screen is required".into()),
            CommandKind::Blast if blank(0) => Err("IR command file is required".into()),
            CommandKind::Serial => {
                if blank(0) {
                    Err("serial command is required".into())
                } else if blank(1) {
                    Err("serial port is required".into())
                } else {
                    Ok(())
                }
            }
            CommandKind::WindowMessage => {
                let target = param(0).trim().to_ascii_lowercase();
                if !WINDOW_TARGETS.contains(&target.as_str()) {
                    Err(format!("unknown window target type \"{}\"", param(0)))
                } else if target != "active" && blank(1) {
                    Err("window target is required".into())
                } else {
                    Ok(())
                }
            }
            _ => Ok(()),
        }
    }
}

impl std::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.ui_text())
    }
}

/// Errors raised while constructing or editing a command.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("{kind} takes {expected} parameters, got {got}")]
    Arity {
        kind: CommandKind,
        expected: usize,
        got: usize,
    },
    #[error("invalid {kind} parameters: {reason}")]
    Invalid { kind: CommandKind, reason: String },
}

/// One executable step: a kind plus exactly `kind.arity()` string parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCommand", into = "RawCommand")]
pub struct Command {
    kind: CommandKind,
    parameters: Vec<String>,
}

#[derive(Serialize, Deserialize)]
struct RawCommand {
    kind: CommandKind,
    #[serde(default)]
    parameters: Vec<String>,
}

impl TryFrom<RawCommand> for Command {
    type Error = CommandError;

    fn try_from(raw: RawCommand) -> Result<Self, Self::Error> {
        Command::with_parameters(raw.kind, raw.parameters)
    }
}

impl From<Command> for RawCommand {
    fn from(cmd: Command) -> Self {
        RawCommand {
            kind: cmd.kind,
            parameters: cmd.parameters,
        }
    }
}

impl Command {
    /// A command with every parameter empty.
    pub fn new(kind: CommandKind) -> Self {
        Self {
            kind,
            parameters: vec![String::new(); kind.arity()],
        }
    }

    pub fn with_parameters<S: Into<String>>(
        kind: CommandKind,
        parameters: impl IntoIterator<Item = S>,
    ) -> Result<Self, CommandError> {
        let parameters: Vec<String> = parameters.into_iter().map(Into::into).collect();
        if parameters.len() != kind.arity() {
            return Err(CommandError::Arity {
                kind,
                expected: kind.arity(),
                got: parameters.len(),
            });
        }
        Ok(Self { kind, parameters })
    }

    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    pub fn parameter(&self, index: usize) -> Option<&str> {
        self.parameters.get(index).map(String::as_str)
    }

    pub fn category(&self) -> Category {
        self.kind.category()
    }

    /// Text shown for this command in a macro listing.
    pub fn display_text(&self) -> String {
        match self.kind {
            CommandKind::Label | CommandKind::GotoLabel => {
                format!("{} \"{}\"", self.kind.ui_text(), self.parameters[0])
            }
            _ if self.parameters.is_empty() => self.kind.ui_text().to_string(),
            _ => format!("{} ({})", self.kind.ui_text(), self.parameters.join(", ")),
        }
    }

    /// Replace every parameter at once. Nothing changes unless the new vector
    /// has the right arity and passes the kind's checks.
    pub fn set_parameters(&mut self, parameters: Vec<String>) -> Result<(), CommandError> {
        if parameters.len() != self.kind.arity() {
            return Err(CommandError::Arity {
                kind: self.kind,
                expected: self.kind.arity(),
                got: parameters.len(),
            });
        }
        self.kind
            .validate(&parameters)
            .map_err(|reason| CommandError::Invalid {
                kind: self.kind,
                reason,
            })?;
        self.parameters = parameters;
        Ok(())
    }

    /// Present the current parameters to `editor`.
    ///
    /// Returns `Ok(true)` when the editor accepted and the parameters were
    /// replaced, `Ok(false)` on cancel.
    pub fn edit(&mut self, editor: &mut dyn ParameterEditor) -> Result<bool, CommandError> {
        match editor.edit(self.kind, &self.parameters) {
            EditOutcome::Cancelled => Ok(false),
            EditOutcome::Accepted(parameters) => {
                self.set_parameters(parameters)?;
                Ok(true)
            }
        }
    }
}
