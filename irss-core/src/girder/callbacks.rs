//! Host callbacks exposed to Girder plugins.
//!
//! The callback ABI carries no context pointer, so the active
//! [`GirderHost`] lives in a single process-wide slot. A plugin installs its
//! host on open and releases it on close; while the slot is taken a second
//! plugin cannot open.
//!
//! A host method runs with the slot unlocked. Callbacks it triggers in turn
//! are answered by [`DefaultHost`].

use std::alloc::{self, Layout};
use std::ffi::{c_char, c_double, c_int, c_void};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::command::GirderCommand;
use super::ffi::*;

/// Receives calls a plugin makes back into the host. Every method has the
/// answer a headless host gives when it has nothing better.
pub trait GirderHost: Send {
    /// An event raised by the plugin, e.g. a received IR code.
    fn event(&mut self, event: &str, payload: &[u8], device: i32) -> bool {
        log::debug!(target: "girder", "event {} (device {}, {} bytes)", event, device, payload.len());
        true
    }

    fn command_set(&mut self, command: &GirderCommand) {
        log::debug!(target: "girder", "set_command {}", command.name);
    }

    fn parse_registry_string(&mut self, _orig: &str) -> String {
        "Error".to_string()
    }

    fn link_name(&mut self, _lvalue: i32) -> String {
        "Error".to_string()
    }

    fn translate(&mut self, orig: &str) -> String {
        orig.to_string()
    }

    fn int_var(&mut self, _name: &str) -> i32 {
        0
    }

    fn double_var(&mut self, _name: &str) -> f64 {
        0.0
    }

    fn string_var(&mut self, _name: &str) -> String {
        "Error".to_string()
    }

    fn set_int_var(&mut self, _name: &str, _value: i32) -> bool {
        true
    }

    fn set_double_var(&mut self, _name: &str, _value: f64) -> bool {
        true
    }

    fn set_string_var(&mut self, _name: &str, _value: &str) -> bool {
        true
    }

    fn delete_var(&mut self, _name: &str) -> bool {
        true
    }

    fn run_parser(&mut self, _script: &str) -> bool {
        true
    }

    fn trigger_command(&mut self, _command_id: i32) -> bool {
        true
    }
}

/// Host with every default answer.
#[derive(Debug, Default)]
pub struct DefaultHost;

impl GirderHost for DefaultHost {}

enum Slot {
    Empty,
    Idle(Box<dyn GirderHost>),
    /// Taken out by a callback that is still running.
    Lent,
}

static HOST: Mutex<Slot> = Mutex::new(Slot::Empty);

fn slot() -> MutexGuard<'static, Slot> {
    HOST.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Take the slot, or hand `host` back if another plugin holds it.
pub(crate) fn install(host: Box<dyn GirderHost>) -> Result<(), Box<dyn GirderHost>> {
    let mut slot = slot();
    if !matches!(*slot, Slot::Empty) {
        return Err(host);
    }
    *slot = Slot::Idle(host);
    Ok(())
}

/// Empty the slot. A host lent to a running callback is dropped when that
/// callback returns.
pub(crate) fn release() -> Option<Box<dyn GirderHost>> {
    match std::mem::replace(&mut *slot(), Slot::Empty) {
        Slot::Idle(host) => Some(host),
        Slot::Empty | Slot::Lent => None,
    }
}

/// Run `f` against the installed host with the slot unlocked, so the host
/// may call into the plugin again. Nested callbacks get [`DefaultHost`].
fn with_host<R>(f: impl FnOnce(&mut dyn GirderHost) -> R) -> R {
    let taken = {
        let mut slot = slot();
        match std::mem::replace(&mut *slot, Slot::Lent) {
            Slot::Idle(host) => Some(host),
            other => {
                if matches!(other, Slot::Lent) {
                    log::debug!(target: "girder", "nested callback answered by the default host");
                }
                *slot = other;
                None
            }
        }
    };
    let Some(mut host) = taken else {
        return f(&mut DefaultHost);
    };

    let result = f(host.as_mut());
    let mut slot = slot();
    if matches!(*slot, Slot::Lent) {
        *slot = Slot::Idle(host);
    }
    result
}

fn gir_bool(value: bool) -> GirBool {
    value as GirBool
}

const FONT_NAME: &str = "Times New Roman";

/// OSD appearance reported to plugins, keyed by Girder's setting ids.
pub fn osd_setting(setting: i32) -> u32 {
    match setting {
        1 => 0xFF00_FF00,  // foreground: lime
        2 => 0xFF00_8000,  // dimmed foreground: green
        3 => 0xFF00_0000,  // background: black
        4 => 380,          // width
        5 => 255,          // height
        6 => 1,            // caption
        7 => 1,            // border
        8 => 0,            // transparent
        9 => 15,           // font size
        10..=13 => 0,      // weight, italic, underline, strikeout
        14 | 15 => 0,      // left, top
        16 => 1,           // center
        17 => 0,           // monitor
        _ => 0,
    }
}

unsafe extern "system" fn parse_reg_string(orig: *const c_char, store: *mut c_char, size: c_int) -> GirBool {
    let orig = read_c_str(orig);
    let value = with_host(|h| h.parse_registry_string(&orig));
    gir_bool(write_c_string_raw(store, size, &value))
}

unsafe extern "system" fn get_link_name(lvalue: c_int, store: *mut c_char, size: c_int) -> GirBool {
    let value = with_host(|h| h.link_name(lvalue));
    gir_bool(write_c_string_raw(store, size, &value))
}

unsafe extern "system" fn set_command(command: *mut RawGirCommand) {
    if let Some(command) = GirderCommand::from_raw(command) {
        with_host(|h| h.command_set(&command));
    }
}

unsafe extern "system" fn target_enum(id: c_int, _callback: Option<TargetCallback>) {
    log::trace!(target: "girder", "target_enum({})", id);
}

unsafe extern "system" fn realloc_pchar(old: *mut *mut c_char, new: *const c_char) {
    if old.is_null() || new.is_null() {
        return;
    }
    let bytes = std::ffi::CStr::from_ptr(new).to_bytes_with_nul();
    let copy = gir_malloc(bytes.len() as c_int).cast::<u8>();
    if copy.is_null() {
        return;
    }
    std::ptr::copy_nonoverlapping(bytes.as_ptr(), copy, bytes.len());
    *old = copy.cast();
}

unsafe extern "system" fn show_osd(timer: c_int) {
    log::trace!(target: "girder", "show_osd({})", timer);
}

unsafe extern "system" fn hide_osd() {
    log::trace!(target: "girder", "hide_osd()");
}

unsafe extern "system" fn start_osd_draw(_hw: *mut c_void, _hdc: *mut c_void, user: c_int) -> GirBool {
    log::trace!(target: "girder", "start_osd_draw({})", user);
    1
}

unsafe extern "system" fn stop_osd_draw(_hdc: *mut c_void) {
    log::trace!(target: "girder", "stop_osd_draw()");
}

unsafe extern "system" fn treepicker_show(_window: *mut c_void, id: c_int) -> GirBool {
    log::trace!(target: "girder", "treepicker_show({})", id);
    1
}

unsafe extern "system" fn register_cb(
    action_plugin: c_int,
    _callback: Option<EventCb>,
    prefix: *const c_char,
    device: c_int,
) -> GirBool {
    log::debug!(
        target: "girder",
        "register_cb({}, {:?}, {})",
        action_plugin,
        read_c_str(prefix),
        device
    );
    1
}

unsafe extern "system" fn i18n_translate(orig: *const c_char, store: *mut c_char, size: c_int) -> GirBool {
    let orig = read_c_str(orig);
    let value = with_host(|h| h.translate(&orig));
    gir_bool(write_c_string_raw(store, size, &value))
}

unsafe extern "system" fn get_osd_settings(setting: c_int) -> u32 {
    osd_setting(setting)
}

unsafe extern "system" fn get_osd_font_name(store: *mut c_char, size: c_int) -> GirBool {
    gir_bool(write_c_string_raw(store, size, FONT_NAME))
}

const ALLOC_HEADER: usize = 16;

/// Allocates `size` bytes; the requested size is kept in a header in front
/// of the returned pointer so `gir_free` can rebuild the layout.
pub(crate) unsafe extern "system" fn gir_malloc(size: c_int) -> *mut c_void {
    if size < 0 {
        return std::ptr::null_mut();
    }
    let total = size as usize + ALLOC_HEADER;
    let Ok(layout) = Layout::from_size_align(total, ALLOC_HEADER) else {
        return std::ptr::null_mut();
    };
    let base = alloc::alloc(layout);
    if base.is_null() {
        return std::ptr::null_mut();
    }
    base.cast::<usize>().write(total);
    base.add(ALLOC_HEADER).cast()
}

pub(crate) unsafe extern "system" fn gir_free(data: *mut c_void) {
    if data.is_null() {
        return;
    }
    let base = data.cast::<u8>().sub(ALLOC_HEADER);
    let total = base.cast::<usize>().read();
    let layout = Layout::from_size_align_unchecked(total, ALLOC_HEADER);
    alloc::dealloc(base, layout);
}

unsafe extern "system" fn get_int_var(name: *const c_char) -> c_int {
    let name = read_c_str(name);
    with_host(|h| h.int_var(&name))
}

unsafe extern "system" fn get_double_var(name: *const c_char) -> c_double {
    let name = read_c_str(name);
    with_host(|h| h.double_var(&name))
}

unsafe extern "system" fn get_string_var(name: *const c_char, store: *mut c_char, size: c_int) -> GirBool {
    let name = read_c_str(name);
    let value = with_host(|h| h.string_var(&name));
    gir_bool(write_c_string_raw(store, size, &value))
}

unsafe extern "system" fn set_int_var(name: *const c_char, value: c_int) -> GirBool {
    let name = read_c_str(name);
    gir_bool(with_host(|h| h.set_int_var(&name, value)))
}

unsafe extern "system" fn set_double_var(name: *const c_char, value: c_double) -> GirBool {
    let name = read_c_str(name);
    gir_bool(with_host(|h| h.set_double_var(&name, value)))
}

unsafe extern "system" fn set_string_var(name: *const c_char, value: *const c_char) -> GirBool {
    let (name, value) = (read_c_str(name), read_c_str(value));
    gir_bool(with_host(|h| h.set_string_var(&name, &value)))
}

unsafe extern "system" fn delete_var(name: *const c_char) -> GirBool {
    let name = read_c_str(name);
    gir_bool(with_host(|h| h.delete_var(&name)))
}

unsafe extern "system" fn run_parser(script: *const c_char, error_value: *mut c_int) -> GirBool {
    let script = read_c_str(script);
    if !error_value.is_null() {
        *error_value = 0;
    }
    gir_bool(with_host(|h| h.run_parser(&script)))
}

unsafe extern "system" fn send_event(event: *const c_char, payload: *mut c_void, len: c_int, device: c_int) -> GirBool {
    let event = read_c_str(event);
    let payload: &[u8] = if payload.is_null() || len <= 0 {
        &[]
    } else {
        std::slice::from_raw_parts(payload.cast::<u8>(), len as usize)
    };
    gir_bool(with_host(|h| h.event(&event, payload, device)))
}

unsafe extern "system" fn trigger_command(command_id: c_int) -> GirBool {
    gir_bool(with_host(|h| h.trigger_command(command_id)))
}

/// A fully populated callback table with its `size` field set.
pub(crate) fn api_table() -> Box<GirApiFunctions> {
    Box::new(GirApiFunctions {
        size: std::mem::size_of::<GirApiFunctions>() as c_int,
        parse_reg_string,
        get_link_name,
        set_command,
        target_enum,
        realloc_pchar,
        show_osd,
        hide_osd,
        start_osd_draw,
        stop_osd_draw,
        treepicker_show,
        register_cb,
        i18n_translate,
        get_osd_settings,
        get_osd_font_name,
        gir_malloc,
        gir_free,
        get_int_var,
        get_double_var,
        get_string_var,
        set_int_var,
        set_double_var,
        set_string_var,
        delete_var,
        run_parser,
        send_event,
        trigger_command,
        parent_hwnd: std::ptr::null_mut(),
    })
}
