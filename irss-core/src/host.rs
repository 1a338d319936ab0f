//! SideEffect: the outward-facing operations produced by command execution.
//!
//! Execution pushes side effects into a `Vec<SideEffect>` instead of touching
//! the outside world directly. The processor hands them to a [`Host`] after
//! each step, in order, so a host decides what "launch a program" or "blast
//! an IR code" means in its environment.

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

use crate::error::HostError;

/// Power state changes requested by a macro.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PowerAction {
    Standby,
    Hibernate,
    Reboot,
    Shutdown,
}

/// Window addressing for a window message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum WindowTarget {
    Active,
    Application(String),
    Class(String),
    Window(String),
}

/// A deferred operation produced while executing a command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SideEffect {
    RunProgram {
        program: String,
        working_dir: Option<PathBuf>,
        arguments: String,
        wait_for_exit: bool,
    },
    Pause(Duration),
    Popup {
        heading: String,
        text: String,
        timeout: Duration,
    },
    GotoScreen {
        screen: String,
    },
    Focus,
    Exit,
    BlastIr {
        ir_file: String,
        port: String,
    },
    SerialSend {
        command: String,
        port: String,
        baud: u32,
        parity: String,
        data_bits: u8,
        stop_bits: String,
        wait_for_response: bool,
    },
    WindowMessage {
        target: WindowTarget,
        message: u32,
        wparam: i32,
        lparam: i32,
    },
    Power(PowerAction),
    ShowTranslatorOsd,
}

impl SideEffect {
    pub fn name(&self) -> &'static str {
        match self {
            SideEffect::RunProgram { .. } => "run program",
            SideEffect::Pause(_) => "pause",
            SideEffect::Popup { .. } => "popup message",
            SideEffect::GotoScreen { .. } => "go to screen",
            SideEffect::Focus => "get focus",
            SideEffect::Exit => "exit",
            SideEffect::BlastIr { .. } => "blast IR",
            SideEffect::SerialSend { .. } => "serial command",
            SideEffect::WindowMessage { .. } => "window message",
            SideEffect::Power(PowerAction::Standby) => "standby",
            SideEffect::Power(PowerAction::Hibernate) => "hibernate",
            SideEffect::Power(PowerAction::Reboot) => "reboot",
            SideEffect::Power(PowerAction::Shutdown) => "shutdown",
            SideEffect::ShowTranslatorOsd => "show translator OSD",
        }
    }
}

/// Carries out side effects on behalf of a macro run.
pub trait Host {
    fn apply(&mut self, effect: &SideEffect) -> Result<(), HostError>;
}

/// Performs the effects that make sense on any desktop: launching programs,
/// pausing and re-launching the Translator OSD. Everything that needs a
/// media-center or IR hardware host is reported as unsupported.
#[derive(Debug, Default)]
pub struct SystemHost;

impl SystemHost {
    pub fn new() -> Self {
        Self
    }
}

impl Host for SystemHost {
    fn apply(&mut self, effect: &SideEffect) -> Result<(), HostError> {
        match effect {
            SideEffect::RunProgram { program, working_dir, arguments, wait_for_exit } => {
                let mut command = std::process::Command::new(program);
                command.args(split_arguments(arguments));
                if let Some(dir) = working_dir {
                    command.current_dir(dir);
                }
                let mut child = command.spawn()?;
                log::info!(target: "host", "started {} (pid {})", program, child.id());
                if *wait_for_exit {
                    let status = child.wait()?;
                    log::info!(target: "host", "{} exited with {}", program, status);
                }
                Ok(())
            }
            SideEffect::Pause(duration) => {
                std::thread::sleep(*duration);
                Ok(())
            }
            SideEffect::ShowTranslatorOsd => {
                let exe = std::env::current_exe()?;
                let is_translator = exe
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .is_some_and(|s| s.eq_ignore_ascii_case("Translator"));
                if !is_translator {
                    log::debug!(target: "host", "not running inside Translator, OSD request ignored");
                    return Ok(());
                }
                std::process::Command::new(&exe).arg("/OSD").spawn()?;
                Ok(())
            }
            other => Err(HostError::Unsupported(other.name())),
        }
    }
}

/// Logs and records every effect without performing it.
#[derive(Debug, Default)]
pub struct DryRunHost {
    pub applied: Vec<SideEffect>,
}

impl DryRunHost {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Host for DryRunHost {
    fn apply(&mut self, effect: &SideEffect) -> Result<(), HostError> {
        log::info!(target: "host", "dry run: {:?}", effect);
        self.applied.push(effect.clone());
        Ok(())
    }
}

/// Split a command line into arguments on whitespace, honouring double quotes.
pub fn split_arguments(line: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    args.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }
    if has_token {
        args.push(current);
    }
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_arguments_honours_quotes() {
        assert_eq!(split_arguments(""), Vec::<String>::new());
        assert_eq!(split_arguments("  -a  b "), vec!["-a", "b"]);
        assert_eq!(
            split_arguments(r#"/open "C:\My Files\x.txt" -q"#),
            vec!["/open", r"C:\My Files\x.txt", "-q"]
        );
        assert_eq!(split_arguments(r#""""#), vec![""]);
    }

    #[test]
    fn dry_run_records_in_order() {
        let mut host = DryRunHost::new();
        let effects = vec![SideEffect::Focus, SideEffect::Pause(Duration::from_millis(5))];
        for effect in &effects {
            host.apply(effect).unwrap();
        }
        assert_eq!(host.applied, effects);
    }

    #[test]
    fn system_host_rejects_hardware_effects() {
        let mut host = SystemHost::new();
        let err = host
            .apply(&SideEffect::BlastIr { ir_file: "tv_on".into(), port: "Default".into() })
            .unwrap_err();
        assert!(matches!(err, HostError::Unsupported("blast IR")));
    }

    #[test]
    fn system_host_pauses() {
        let mut host = SystemHost::new();
        let start = std::time::Instant::now();
        host.apply(&SideEffect::Pause(Duration::from_millis(20))).unwrap();
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn translator_osd_outside_translator_is_ignored() {
        let mut host = SystemHost::new();
        assert!(host.apply(&SideEffect::ShowTranslatorOsd).is_ok());
    }
}
