//! Single-command execution.
//!
//! `execute_command` substitutes variables into a command's parameters and
//! performs its semantics. Variable mutations happen in place; anything that
//! touches the outside world is pushed into `effects` for the caller to apply
//! through a [`Host`](crate::host::Host).

mod control;
mod general;
mod maths;

use irss_types::{Category, Command, VariableList};

use crate::error::ExecuteError;
use crate::host::SideEffect;
use crate::substitute::process_parameters;

/// What the processor should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Jump(String),
}

pub fn execute_command(
    cmd: &Command,
    vars: &mut VariableList,
    effects: &mut Vec<SideEffect>,
) -> Result<Flow, ExecuteError> {
    let params = process_parameters(cmd, vars);
    let kind = cmd.kind();
    log::trace!(target: "processor", "execute {} {:?}", kind, params);

    match kind.category() {
        Category::Control => control::execute_control(kind, &params, vars),
        Category::Maths => {
            maths::execute_maths(kind, &params, vars)?;
            Ok(Flow::Continue)
        }
        Category::General
        | Category::RemoteControl
        | Category::Power
        | Category::Translator => {
            effects.push(general::side_effect_for(kind, &params));
            Ok(Flow::Continue)
        }
    }
}

/// Integer parse with a zero default, after trimming.
pub fn parse_int(s: &str) -> i32 {
    s.trim().parse().unwrap_or(0)
}

/// Accepts `true`/`false`, `yes`/`no` and `1`/`0`; anything else is false.
pub fn parse_bool(s: &str) -> bool {
    matches!(
        s.trim().to_ascii_lowercase().as_str(),
        "true" | "yes" | "1"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use irss_types::CommandKind;

    fn cmd<const N: usize>(kind: CommandKind, params: [&str; N]) -> Command {
        Command::with_parameters(kind, params).unwrap()
    }

    #[test]
    fn parse_int_defaults_to_zero() {
        assert_eq!(parse_int(" 42 "), 42);
        assert_eq!(parse_int("-7"), -7);
        assert_eq!(parse_int("abc"), 0);
        assert_eq!(parse_int(""), 0);
        assert_eq!(parse_int("99999999999"), 0);
    }

    #[test]
    fn parse_bool_forms() {
        assert!(parse_bool("True"));
        assert!(parse_bool(" yes"));
        assert!(parse_bool("1"));
        assert!(!parse_bool("false"));
        assert!(!parse_bool(""));
        assert!(!parse_bool("maybe"));
    }

    #[test]
    fn maths_add_sets_output() {
        let mut vars = VariableList::new();
        let mut effects = Vec::new();
        let flow = execute_command(
            &cmd(CommandKind::MathsAdd, ["5", "3", "result"]),
            &mut vars,
            &mut effects,
        )
        .unwrap();
        assert_eq!(flow, Flow::Continue);
        assert_eq!(vars.get("result"), Some("8"));

        execute_command(
            &cmd(CommandKind::MathsAdd, ["abc", "3", "result"]),
            &mut vars,
            &mut effects,
        )
        .unwrap();
        assert_eq!(vars.get("result"), Some("3"));
        assert!(effects.is_empty());
    }

    #[test]
    fn variables_flow_between_commands() {
        let mut vars = VariableList::new();
        let mut effects = Vec::new();
        execute_command(&cmd(CommandKind::SetVariable, ["var_x", "10"]), &mut vars, &mut effects)
            .unwrap();
        execute_command(
            &cmd(CommandKind::MathsMultiply, ["var_x", "%x%", "var_y"]),
            &mut vars,
            &mut effects,
        )
        .unwrap();
        assert_eq!(vars.get("y"), Some("100"));
    }

    #[test]
    fn general_commands_only_emit_effects() {
        let mut vars = VariableList::new();
        vars.set("ms", "250");
        let mut effects = Vec::new();
        let flow = execute_command(&cmd(CommandKind::Pause, ["var_ms"]), &mut vars, &mut effects)
            .unwrap();
        assert_eq!(flow, Flow::Continue);
        assert_eq!(
            effects,
            vec![SideEffect::Pause(std::time::Duration::from_millis(250))]
        );
    }

    #[test]
    fn goto_resolves_variable_target() {
        let mut vars = VariableList::new();
        vars.set("target", "end");
        let mut effects = Vec::new();
        let flow = execute_command(&cmd(CommandKind::GotoLabel, ["var_target"]), &mut vars, &mut effects)
            .unwrap();
        assert_eq!(flow, Flow::Jump("end".into()));
    }
}
