mod common;

use common::cmd;
use irss_core::host::{DryRunHost, SideEffect};
use irss_core::{MacroError, Processor};
use irss_types::{CommandKind, Macro, VariableList};

#[test]
fn test_goto_missing_label_fails() {
    let mac = Macro::with_commands(
        "broken",
        vec![
            cmd(CommandKind::Label, ["start"]),
            cmd(CommandKind::GotoLabel, ["finish"]),
        ],
    );
    assert_eq!(mac.unresolved_gotos(), vec![(1, "finish".to_string())]);

    let err = Processor::new()
        .run(&mac, &mut VariableList::new(), &mut DryRunHost::new())
        .unwrap_err();
    match err {
        MacroError::LabelNotFound { label, index } => {
            assert_eq!(label, "finish");
            assert_eq!(index, 1);
        }
        other => panic!("Expected LabelNotFound, got {:?}", other),
    }
}

#[test]
fn test_branching_macro_emits_effects() {
    let mac = Macro::with_commands(
        "volume",
        vec![
            cmd(CommandKind::SetVariable, ["level", "3"]),
            cmd(CommandKind::MathsMultiply, ["var_level", "10", "level"]),
            cmd(CommandKind::If, ["var_level", ">=", "30", "loud", "quiet"]),
            cmd(CommandKind::Label, ["quiet"]),
            cmd(CommandKind::Blast, ["volume_down", "Default"]),
            cmd(CommandKind::GotoLabel, ["end"]),
            cmd(CommandKind::Label, ["loud"]),
            cmd(CommandKind::Popup, ["Volume", "Level %level%", "2"]),
            cmd(CommandKind::Label, ["end"]),
        ],
    );

    let mut vars = VariableList::new();
    let mut host = DryRunHost::new();
    let summary = Processor::new().run(&mac, &mut vars, &mut host).unwrap();

    assert_eq!(vars.get("level"), Some("30"));
    assert_eq!(summary.effects, 1);
    assert_eq!(
        host.applied,
        vec![SideEffect::Popup {
            heading: "Volume".into(),
            text: "Level 30".into(),
            timeout: std::time::Duration::from_secs(2),
        }]
    );
}

#[test]
fn test_variables_survive_across_runs() {
    let counter = Macro::with_commands(
        "counter",
        vec![cmd(CommandKind::MathsAdd, ["var_runs", "1", "runs"])],
    );
    let mut vars = VariableList::new();
    let processor = Processor::new();
    for _ in 0..3 {
        processor.run(&counter, &mut vars, &mut DryRunHost::new()).unwrap();
    }
    assert_eq!(vars.get("runs"), Some("3"));
}
