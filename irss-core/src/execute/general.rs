use std::path::PathBuf;
use std::time::Duration;

use irss_types::CommandKind;

use super::{parse_bool, parse_int};
use crate::host::{PowerAction, SideEffect, WindowTarget};

fn non_negative(s: &str) -> u64 {
    parse_int(s).max(0) as u64
}

pub(super) fn side_effect_for(kind: CommandKind, params: &[String]) -> SideEffect {
    match kind {
        CommandKind::Run => SideEffect::RunProgram {
            program: params[0].trim().to_string(),
            working_dir: Some(params[1].trim())
                .filter(|dir| !dir.is_empty())
                .map(PathBuf::from),
            arguments: params[2].clone(),
            wait_for_exit: parse_bool(&params[3]),
        },
        CommandKind::Pause => SideEffect::Pause(Duration::from_millis(non_negative(&params[0]))),
        CommandKind::Popup => SideEffect::Popup {
            heading: params[0].clone(),
            text: params[1].clone(),
            timeout: Duration::from_secs(non_negative(&params[2])),
        },
        CommandKind::GotoScreen => SideEffect::GotoScreen {
            screen: params[0].trim().to_string(),
        },
        CommandKind::Focus => SideEffect::Focus,
        CommandKind::Exit => SideEffect::Exit,
        CommandKind::Blast => SideEffect::BlastIr {
            ir_file: params[0].clone(),
            port: params[1].clone(),
        },
        CommandKind::Serial => SideEffect::SerialSend {
            command: params[0].clone(),
            port: params[1].trim().to_string(),
            baud: non_negative(&params[2]).min(u32::MAX as u64) as u32,
            parity: params[3].trim().to_string(),
            data_bits: non_negative(&params[4]).min(u8::MAX as u64) as u8,
            stop_bits: params[5].trim().to_string(),
            wait_for_response: parse_bool(&params[6]),
        },
        CommandKind::WindowMessage => SideEffect::WindowMessage {
            target: window_target(&params[0], &params[1]),
            message: parse_int(&params[2]) as u32,
            wparam: parse_int(&params[3]),
            lparam: parse_int(&params[4]),
        },
        CommandKind::Standby => SideEffect::Power(PowerAction::Standby),
        CommandKind::Hibernate => SideEffect::Power(PowerAction::Hibernate),
        CommandKind::Reboot => SideEffect::Power(PowerAction::Reboot),
        CommandKind::Shutdown => SideEffect::Power(PowerAction::Shutdown),
        CommandKind::ShowTranslatorOsd => SideEffect::ShowTranslatorOsd,
        other => unreachable!("{} does not produce a side effect", other),
    }
}

/// Unknown target types fall back to the active window.
fn window_target(target_type: &str, target: &str) -> WindowTarget {
    let target = target.trim().to_string();
    match target_type.trim().to_ascii_lowercase().as_str() {
        "application" => WindowTarget::Application(target),
        "class" => WindowTarget::Class(target),
        "window" => WindowTarget::Window(target),
        "active" => WindowTarget::Active,
        other => {
            log::warn!(target: "processor", "unknown window target type \"{}\", using active window", other);
            WindowTarget::Active
        }
    }
}
