#![allow(dead_code)]

use irss_types::{Command, CommandKind, Macro};

pub fn cmd<const N: usize>(kind: CommandKind, params: [&str; N]) -> Command {
    Command::with_parameters(kind, params).unwrap()
}

/// One command of every kind, with parameters that exercise escaping and a
/// separator inside a final parameter.
pub fn every_kind() -> Macro {
    let commands = CommandKind::ALL
        .iter()
        .map(|&kind| {
            let params: Vec<String> = match kind {
                CommandKind::If => vec!["var_a".into(), "<=".into(), "10".into(), "yes".into(), "no".into()],
                CommandKind::Pause => vec!["250".into()],
                CommandKind::SetVariable => vec!["pipe".into(), "left|right|".into()],
                CommandKind::WindowMessage => {
                    vec!["class".into(), "Notepad".into(), "16".into(), "0".into(), "0".into()]
                }
                CommandKind::Run => vec![
                    r"C:\Program Files\App\app.exe".into(),
                    r"C:\Program Files\App".into(),
                    r#"/x "quoted & <odd>" a"#.into(),
                    "true".into(),
                ],
                _ => kind
                    .parameter_names()
                    .iter()
                    .enumerate()
                    .map(|(i, name)| format!("{}_{}", name, i))
                    .collect(),
            };
            Command::with_parameters(kind, params).unwrap()
        })
        .collect();
    Macro::with_commands("Every Kind", commands)
}
