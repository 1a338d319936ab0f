//! Variable substitution applied to command parameters before execution.
//!
//! Two forms are recognised:
//! - a whole parameter of the form `var_NAME` resolves to the variable value;
//! - inline `%NAME%` tokens are replaced in place, and `%%` yields `%`.
//!
//! Undefined variables resolve to the empty string.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use irss_types::{Command, VariableList, VARIABLE_PREFIX};

fn token_regex() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| {
        Regex::new(r"%%|%([A-Za-z_][A-Za-z0-9_]*)%").expect("token pattern is valid")
    })
}

/// Replace inline `%NAME%` tokens in `text`.
pub fn substitute(text: &str, vars: &VariableList) -> String {
    if !text.contains('%') {
        return text.to_string();
    }
    token_regex()
        .replace_all(text, |caps: &Captures| match caps.get(1) {
            Some(name) => vars.get(name.as_str()).unwrap_or("").to_string(),
            None => "%".to_string(),
        })
        .into_owned()
}

/// The variable name if `param` is entirely a `var_NAME` reference.
pub fn whole_reference(param: &str) -> Option<&str> {
    let name = param.trim().strip_prefix(VARIABLE_PREFIX)?;
    let valid = !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    valid.then_some(name)
}

/// Resolve every parameter of `cmd` against `vars`.
///
/// The output-variable slot (if the kind has one) only gets inline
/// substitution, so `var_total` there names the variable instead of reading it.
pub fn process_parameters(cmd: &Command, vars: &VariableList) -> Vec<String> {
    let output = cmd.kind().output_param();
    cmd.parameters()
        .iter()
        .enumerate()
        .map(|(i, param)| match whole_reference(param) {
            Some(name) if Some(i) != output => vars.get(name).unwrap_or("").to_string(),
            _ => substitute(param, vars),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use irss_types::CommandKind;

    fn vars() -> VariableList {
        let mut vars = VariableList::new();
        vars.set("count", "7");
        vars.set("name", "den");
        vars
    }

    #[test]
    fn inline_tokens() {
        assert_eq!(substitute("%count% items", &vars()), "7 items");
        assert_eq!(substitute("%var_count%", &vars()), "7");
        assert_eq!(substitute("%missing%!", &vars()), "!");
        assert_eq!(substitute("100%% of %name%", &vars()), "100% of den");
        assert_eq!(substitute("50% off", &vars()), "50% off");
    }

    #[test]
    fn whole_parameter_reference() {
        assert_eq!(whole_reference("var_count"), Some("count"));
        assert_eq!(whole_reference(" var_count "), Some("count"));
        assert_eq!(whole_reference("var_"), None);
        assert_eq!(whole_reference("var_a b"), None);
        assert_eq!(whole_reference("count"), None);
    }

    #[test]
    fn output_slot_is_not_dereferenced() {
        let cmd = Command::with_parameters(CommandKind::MathsAdd, ["var_count", "%count%", "var_count"])
            .unwrap();
        let processed = process_parameters(&cmd, &vars());
        assert_eq!(processed, vec!["7", "7", "var_count"]);
    }

    #[test]
    fn output_slot_gets_inline_substitution() {
        let cmd = Command::with_parameters(CommandKind::SetVariable, ["out_%name%", "x"]).unwrap();
        assert_eq!(process_parameters(&cmd, &vars())[0], "out_den");
    }
}
