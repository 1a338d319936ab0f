//! Raw Girder 3.x plugin ABI: export signatures, the host callback table and
//! the command record.

use std::ffi::{c_char, c_double, c_int, c_void};

/// Girder BOOL.
pub type GirBool = c_int;

// Plugin exports.
pub type GirStringFn = unsafe extern "system" fn(buffer: *mut c_char, size: c_int);
pub type GirDevicenumFn = unsafe extern "system" fn() -> c_int;
pub type GirRequestedApiFn = unsafe extern "system" fn(max_api: c_int) -> c_int;
pub type GirOpenFn = unsafe extern "system" fn(
    major: c_int,
    minor: c_int,
    micro: c_int,
    api: *mut GirApiFunctions,
) -> GirBool;
pub type GirBoolFn = unsafe extern "system" fn() -> GirBool;
pub type GirCommandGuiFn = unsafe extern "system" fn();
pub type GirInfoFn = unsafe extern "system" fn(message: c_int, wparam: c_int, lparam: c_int) -> GirBool;
pub type GirEventFn = unsafe extern "system" fn(
    command: *mut RawGirCommand,
    event: *const c_char,
    payload: *mut c_void,
    len: c_int,
    status: *mut c_char,
    status_len: c_int,
) -> GirBool;

// Host callbacks.
pub type EventCb =
    unsafe extern "system" fn(event: *const c_char, device: c_int, payload: *mut c_void, len: c_int) -> GirBool;
pub type TargetCallback = unsafe extern "system" fn(hw: *mut c_void, command: *mut RawGirCommand);

pub type ParseRegFn = unsafe extern "system" fn(orig: *const c_char, store: *mut c_char, size: c_int) -> GirBool;
pub type GetLinkNameFn = unsafe extern "system" fn(lvalue: c_int, store: *mut c_char, size: c_int) -> GirBool;
pub type SetCommandFn = unsafe extern "system" fn(command: *mut RawGirCommand);
pub type TargetEnumFn = unsafe extern "system" fn(id: c_int, callback: Option<TargetCallback>);
pub type ReallocPcharFn = unsafe extern "system" fn(old: *mut *mut c_char, new: *const c_char);
pub type ShowOsdFn = unsafe extern "system" fn(timer: c_int);
pub type HideOsdFn = unsafe extern "system" fn();
pub type StartOsdDrawFn = unsafe extern "system" fn(hw: *mut c_void, hdc: *mut c_void, user: c_int) -> GirBool;
pub type StopOsdDrawFn = unsafe extern "system" fn(hdc: *mut c_void);
pub type TreepickerShowFn = unsafe extern "system" fn(window: *mut c_void, id: c_int) -> GirBool;
pub type RegisterCbFn = unsafe extern "system" fn(
    action_plugin: c_int,
    callback: Option<EventCb>,
    prefix: *const c_char,
    device: c_int,
) -> GirBool;
pub type TranslateFn = unsafe extern "system" fn(orig: *const c_char, store: *mut c_char, size: c_int) -> GirBool;
pub type GetOsdSettingsFn = unsafe extern "system" fn(setting: c_int) -> u32;
pub type GetOsdFontNameFn = unsafe extern "system" fn(store: *mut c_char, size: c_int) -> GirBool;
pub type MallocFn = unsafe extern "system" fn(size: c_int) -> *mut c_void;
pub type FreeFn = unsafe extern "system" fn(data: *mut c_void);
pub type GetIntVarFn = unsafe extern "system" fn(name: *const c_char) -> c_int;
pub type GetDoubleVarFn = unsafe extern "system" fn(name: *const c_char) -> c_double;
pub type GetStringVarFn = unsafe extern "system" fn(name: *const c_char, store: *mut c_char, size: c_int) -> GirBool;
pub type SetIntVarFn = unsafe extern "system" fn(name: *const c_char, value: c_int) -> GirBool;
pub type SetDoubleVarFn = unsafe extern "system" fn(name: *const c_char, value: c_double) -> GirBool;
pub type SetStringVarFn = unsafe extern "system" fn(name: *const c_char, value: *const c_char) -> GirBool;
pub type DeleteVarFn = unsafe extern "system" fn(name: *const c_char) -> GirBool;
pub type RunParserFn = unsafe extern "system" fn(script: *const c_char, error_value: *mut c_int) -> GirBool;
pub type SendEventFn =
    unsafe extern "system" fn(event: *const c_char, payload: *mut c_void, len: c_int, device: c_int) -> GirBool;
pub type TriggerCommandFn = unsafe extern "system" fn(command_id: c_int) -> GirBool;

/// Callback table handed to `gir_open`. Field order is fixed by the ABI.
#[repr(C)]
pub struct GirApiFunctions {
    pub size: c_int,
    pub parse_reg_string: ParseRegFn,
    pub get_link_name: GetLinkNameFn,
    pub set_command: SetCommandFn,
    pub target_enum: TargetEnumFn,
    pub realloc_pchar: ReallocPcharFn,
    pub show_osd: ShowOsdFn,
    pub hide_osd: HideOsdFn,
    pub start_osd_draw: StartOsdDrawFn,
    pub stop_osd_draw: StopOsdDrawFn,
    pub treepicker_show: TreepickerShowFn,
    pub register_cb: RegisterCbFn,
    pub i18n_translate: TranslateFn,
    pub get_osd_settings: GetOsdSettingsFn,
    pub get_osd_font_name: GetOsdFontNameFn,
    pub gir_malloc: MallocFn,
    pub gir_free: FreeFn,
    pub get_int_var: GetIntVarFn,
    pub get_double_var: GetDoubleVarFn,
    pub get_string_var: GetStringVarFn,
    pub set_int_var: SetIntVarFn,
    pub set_double_var: SetDoubleVarFn,
    pub set_string_var: SetStringVarFn,
    pub delete_var: DeleteVarFn,
    pub run_parser: RunParserFn,
    pub send_event: SendEventFn,
    pub trigger_command: TriggerCommandFn,
    pub parent_hwnd: *mut c_void,
}

#[cfg(target_pointer_width = "64")]
pub const CRITICAL_SECTION_SIZE: usize = 40;
#[cfg(not(target_pointer_width = "64"))]
pub const CRITICAL_SECTION_SIZE: usize = 24;

/// `s_command` as laid out by the plugin header. The critical section is
/// opaque to us and only reserves space.
#[repr(C)]
pub struct RawGirCommand {
    pub critical_section: [u8; CRITICAL_SECTION_SIZE],
    pub name: *mut c_char,
    pub actiontype: c_int,
    pub actionsubtype: c_int,
    pub svalue1: *mut c_char,
    pub svalue2: *mut c_char,
    pub svalue3: *mut c_char,
    pub bvalue1: GirBool,
    pub bvalue2: GirBool,
    pub bvalue3: GirBool,
    pub ivalue1: c_int,
    pub ivalue2: c_int,
    pub ivalue3: c_int,
    pub lvalue1: c_int,
    pub lvalue2: c_int,
    pub lvalue3: c_int,
    pub binary: *mut u8,
    pub size: c_int,
}

/// Copy a NUL-terminated string, lossily. Null reads as empty.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string.
pub unsafe fn read_c_str(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }
    std::ffi::CStr::from_ptr(ptr).to_string_lossy().into_owned()
}

/// Read a string a plugin wrote into `buf`, stopping at the first NUL.
pub fn buffer_to_string(buf: &[u8]) -> String {
    let len = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    String::from_utf8_lossy(&buf[..len]).into_owned()
}

/// Write `value` as ASCII plus a terminating NUL into `buf`.
///
/// Non-ASCII characters become `?`. Returns false, leaving `buf` untouched,
/// when the value and its terminator do not fit.
pub fn write_c_string(buf: &mut [u8], value: &str) -> bool {
    let bytes: Vec<u8> = value
        .chars()
        .map(|c| if c.is_ascii() { c as u8 } else { b'?' })
        .collect();
    if bytes.len() >= buf.len() {
        return false;
    }
    buf[..bytes.len()].copy_from_slice(&bytes);
    buf[bytes.len()] = 0;
    true
}

/// [`write_c_string`] into a caller-owned buffer of `size` bytes.
///
/// # Safety
/// `ptr` must be null or valid for writes of `size` bytes.
pub unsafe fn write_c_string_raw(ptr: *mut c_char, size: c_int, value: &str) -> bool {
    if ptr.is_null() || size <= 0 {
        return false;
    }
    let buf = std::slice::from_raw_parts_mut(ptr.cast::<u8>(), size as usize);
    write_c_string(buf, value)
}
