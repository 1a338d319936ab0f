use irss_types::{CommandKind, Comparison, VariableList};

use super::{parse_int, Flow};
use crate::error::ExecuteError;

pub(super) fn execute_control(
    kind: CommandKind,
    params: &[String],
    vars: &mut VariableList,
) -> Result<Flow, ExecuteError> {
    match kind {
        CommandKind::Label => Ok(Flow::Continue),
        CommandKind::GotoLabel => Ok(jump_to(&params[0])),
        CommandKind::If => {
            let comparison = Comparison::parse(&params[1])
                .ok_or_else(|| ExecuteError::UnknownComparison(params[1].clone()))?;
            let taken = if compare(&params[0], comparison, &params[2]) {
                &params[3]
            } else {
                &params[4]
            };
            Ok(jump_to(taken))
        }
        CommandKind::SetVariable => {
            vars.set(&params[0], params[1].as_str());
            Ok(Flow::Continue)
        }
        CommandKind::ClearVariables => {
            vars.clear();
            Ok(Flow::Continue)
        }
        other => unreachable!("{} is not a control statement", other),
    }
}

/// An empty label means fall through to the next command.
fn jump_to(label: &str) -> Flow {
    let label = label.trim();
    if label.is_empty() {
        Flow::Continue
    } else {
        Flow::Jump(label.to_string())
    }
}

pub(crate) fn compare(left: &str, comparison: Comparison, right: &str) -> bool {
    let (l, r) = (parse_int(left), parse_int(right));
    match comparison {
        Comparison::Equal => l == r,
        Comparison::NotEqual => l != r,
        Comparison::Less => l < r,
        Comparison::Greater => l > r,
        Comparison::LessOrEqual => l <= r,
        Comparison::GreaterOrEqual => l >= r,
        Comparison::Contains => left.contains(right),
        Comparison::StartsWith => left.starts_with(right),
        Comparison::EndsWith => left.ends_with(right),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn numeric_comparisons_default_to_zero() {
        assert!(compare("10", Comparison::Greater, "9"));
        assert!(compare(" 3", Comparison::Equal, "3 "));
        assert!(compare("abc", Comparison::Equal, "0"));
        assert!(compare("-1", Comparison::LessOrEqual, "x"));
        assert!(!compare("2", Comparison::NotEqual, "2"));
    }

    #[test]
    fn textual_comparisons() {
        assert!(compare("living room", Comparison::Contains, "room"));
        assert!(compare("living room", Comparison::StartsWith, "living"));
        assert!(compare("living room", Comparison::EndsWith, "room"));
        assert!(!compare("living room", Comparison::Contains, "Room"));
    }

    #[test]
    fn if_picks_branch() {
        let mut vars = VariableList::new();
        let flow = execute_control(CommandKind::If, &p(&["1", "==", "1", "yes", "no"]), &mut vars)
            .unwrap();
        assert_eq!(flow, Flow::Jump("yes".into()));

        let flow = execute_control(CommandKind::If, &p(&["1", ">", "2", "yes", ""]), &mut vars)
            .unwrap();
        assert_eq!(flow, Flow::Continue);
    }

    #[test]
    fn if_rejects_unknown_comparison() {
        let mut vars = VariableList::new();
        let err = execute_control(CommandKind::If, &p(&["1", "~=", "1", "a", "b"]), &mut vars)
            .unwrap_err();
        assert!(matches!(err, ExecuteError::UnknownComparison(c) if c == "~="));
    }

    #[test]
    fn set_and_clear() {
        let mut vars = VariableList::new();
        execute_control(CommandKind::SetVariable, &p(&["var_a", "x"]), &mut vars).unwrap();
        assert_eq!(vars.get("a"), Some("x"));
        execute_control(CommandKind::ClearVariables, &[], &mut vars).unwrap();
        assert!(vars.is_empty());
    }
}
