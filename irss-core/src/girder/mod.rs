//! Wrapper for native Girder 3.x plugins.
//!
//! A plugin is a shared library exporting `gir_*` functions. Loading resolves
//! the exports and checks the requested API level; opening hands the plugin a
//! table of host callbacks that stays alive until the wrapper is dropped.

mod callbacks;
mod command;
pub mod ffi;
mod host;

use std::ffi::{c_int, c_void, CString};
use std::fmt;
use std::mem;
use std::path::{Path, PathBuf};

use libloading::Library;

use crate::error::GirderError;
use ffi::*;

pub use callbacks::{osd_setting, DefaultHost, GirderHost};
pub use command::GirderCommand;
pub use ffi::write_c_string;
pub use host::VariableListHost;

pub const HOST_VERSION: (i32, i32, i32) = (3, 3, 0);
pub const MAX_API: i32 = 2;

const VERSION_BUFFER: usize = 255;
const STRING_BUFFER: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginState {
    Loaded,
    Opened,
    Started,
    Stopped,
    Closed,
}

impl fmt::Display for PluginState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PluginState::Loaded => "loaded",
            PluginState::Opened => "open",
            PluginState::Started => "started",
            PluginState::Stopped => "stopped",
            PluginState::Closed => "closed",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Open,
    Close,
    Start,
    Stop,
    Configure,
    Info,
    Event,
}

impl Operation {
    fn as_str(self) -> &'static str {
        match self {
            Operation::Open => "open",
            Operation::Close => "close",
            Operation::Start => "start",
            Operation::Stop => "stop",
            Operation::Configure => "configure",
            Operation::Info => "send info to",
            Operation::Event => "send an event to",
        }
    }
}

impl PluginState {
    /// State after `op` succeeds, or `InvalidState` if `op` is not allowed.
    pub fn after(self, op: Operation) -> Result<PluginState, GirderError> {
        use PluginState::*;
        let next = match (op, self) {
            (Operation::Open, Loaded | Closed) => Some(Opened),
            (Operation::Close, Opened | Started | Stopped) => Some(Closed),
            (Operation::Start, Opened | Stopped) => Some(Started),
            (Operation::Stop, Started) => Some(Stopped),
            (Operation::Configure | Operation::Info | Operation::Event, Opened | Started | Stopped) => {
                Some(self)
            }
            _ => None,
        };
        next.ok_or(GirderError::InvalidState {
            operation: op.as_str(),
            state: self,
        })
    }

    pub fn is_open(self) -> bool {
        matches!(self, PluginState::Opened | PluginState::Started | PluginState::Stopped)
    }
}

struct Exports {
    version: GirStringFn,
    name: GirStringFn,
    description: GirStringFn,
    devicenum: GirDevicenumFn,
    requested_api: GirRequestedApiFn,
    open: GirOpenFn,
    close: GirBoolFn,
    start: Option<GirBoolFn>,
    stop: Option<GirBoolFn>,
    command_gui: Option<GirCommandGuiFn>,
    info: Option<GirInfoFn>,
    event: Option<GirEventFn>,
}

/// Export name to address, null or `None` when absent.
type Lookup<'a> = dyn Fn(&str) -> Option<*mut c_void> + 'a;

/// `T` must be the function pointer type of the export.
unsafe fn optional<T: Copy>(lookup: &Lookup<'_>, name: &str) -> Option<T> {
    debug_assert_eq!(mem::size_of::<T>(), mem::size_of::<*mut c_void>());
    let address = lookup(name).filter(|a| !a.is_null())?;
    Some(mem::transmute_copy::<*mut c_void, T>(&address))
}

unsafe fn required<T: Copy>(lookup: &Lookup<'_>, name: &'static str) -> Result<T, GirderError> {
    optional(lookup, name).ok_or(GirderError::MissingExport(name))
}

fn library_lookup(lib: &Library) -> impl Fn(&str) -> Option<*mut c_void> + '_ {
    move |name: &str| {
        let symbol = format!("{}\0", name);
        unsafe { lib.get::<*mut c_void>(symbol.as_bytes()) }
            .ok()
            .map(|s| *s)
    }
}

impl Exports {
    unsafe fn resolve(lookup: &Lookup<'_>) -> Result<Self, GirderError> {
        Ok(Self {
            version: required(lookup, "gir_version")?,
            name: required(lookup, "gir_name")?,
            description: required(lookup, "gir_description")?,
            devicenum: required(lookup, "gir_devicenum")?,
            requested_api: required(lookup, "gir_requested_api")?,
            open: required(lookup, "gir_open")?,
            close: required(lookup, "gir_close")?,
            start: optional(lookup, "gir_start"),
            stop: optional(lookup, "gir_stop"),
            command_gui: optional(lookup, "gir_command_gui"),
            info: optional(lookup, "gir_info"),
            event: optional(lookup, "gir_event"),
        })
    }
}

/// Outcome of [`GirderPlugin::event`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventResult {
    pub handled: bool,
    pub status: String,
}

pub struct GirderPlugin {
    path: PathBuf,
    state: PluginState,
    exports: Exports,
    api: Box<GirApiFunctions>,
    host: Option<Box<dyn GirderHost>>,
    // Dropped last: every function pointer above points into it.
    _library: Option<Library>,
}

impl fmt::Debug for GirderPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GirderPlugin")
            .field("path", &self.path)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl GirderPlugin {
    /// Load the plugin at `path` and resolve its exports.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GirderError> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(GirderError::EmptyPath);
        }

        let library = unsafe { Library::new(path) }.map_err(|source| GirderError::Load {
            path: path.to_path_buf(),
            source,
        })?;
        let exports = unsafe { Exports::resolve(&library_lookup(&library)) }?;
        Self::with_exports(path, exports, Some(library))
    }

    fn with_exports(path: &Path, exports: Exports, library: Option<Library>) -> Result<Self, GirderError> {
        let requested = unsafe { (exports.requested_api)(MAX_API) };
        if requested > MAX_API {
            return Err(GirderError::ApiTooNew {
                requested,
                supported: MAX_API,
            });
        }

        let plugin = Self {
            path: path.to_path_buf(),
            state: PluginState::Loaded,
            exports,
            api: callbacks::api_table(),
            host: None,
            _library: library,
        };
        log::info!(
            target: "girder",
            "loaded {} ({} {}), API {}",
            plugin.path.display(),
            plugin.name(),
            plugin.version(),
            requested
        );
        Ok(plugin)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> PluginState {
        self.state
    }

    pub fn version(&self) -> String {
        self.read_string(self.exports.version, VERSION_BUFFER)
    }

    pub fn name(&self) -> String {
        self.read_string(self.exports.name, STRING_BUFFER)
    }

    pub fn description(&self) -> String {
        self.read_string(self.exports.description, STRING_BUFFER)
    }

    pub fn device_count(&self) -> i32 {
        unsafe { (self.exports.devicenum)() }
    }

    pub fn requested_api(&self) -> i32 {
        unsafe { (self.exports.requested_api)(MAX_API) }
    }

    pub fn can_configure(&self) -> bool {
        self.exports.command_gui.is_some()
    }

    fn read_string(&self, f: GirStringFn, size: usize) -> String {
        let mut buf = vec![0u8; size];
        unsafe { f(buf.as_mut_ptr().cast(), size as c_int) };
        buffer_to_string(&buf)
    }

    /// Host that answers this plugin's callbacks once it is opened.
    /// Without one, [`DefaultHost`] is used.
    pub fn set_host(&mut self, host: Box<dyn GirderHost>) {
        self.host = Some(host);
    }

    pub fn open(&mut self) -> Result<bool, GirderError> {
        let next = self.state.after(Operation::Open)?;
        let host = self.host.take().unwrap_or_else(|| Box::new(DefaultHost));
        if let Err(host) = callbacks::install(host) {
            self.host = Some(host);
            return Err(GirderError::HostBusy);
        }

        let (major, minor, micro) = HOST_VERSION;
        let api: *mut GirApiFunctions = &mut *self.api;
        let opened = unsafe { (self.exports.open)(major, minor, micro, api) } != 0;
        if !opened {
            self.host = callbacks::release();
            log::warn!(target: "girder", "gir_open failed for {}", self.path.display());
            return Ok(false);
        }
        self.state = next;
        Ok(true)
    }

    pub fn close(&mut self) -> Result<bool, GirderError> {
        let next = self.state.after(Operation::Close)?;
        let closed = unsafe { (self.exports.close)() } != 0;
        self.host = callbacks::release();
        self.state = next;
        Ok(closed)
    }

    pub fn start(&mut self) -> Result<bool, GirderError> {
        let next = self.state.after(Operation::Start)?;
        let Some(start) = self.exports.start else {
            return Ok(false);
        };
        let started = unsafe { start() } != 0;
        if started {
            self.state = next;
        }
        Ok(started)
    }

    pub fn stop(&mut self) -> Result<bool, GirderError> {
        let next = self.state.after(Operation::Stop)?;
        let Some(stop) = self.exports.stop else {
            return Ok(false);
        };
        let stopped = unsafe { stop() } != 0;
        if stopped {
            self.state = next;
        }
        Ok(stopped)
    }

    /// Show the plugin's own configuration dialog, if it has one.
    pub fn command_gui(&mut self) -> Result<(), GirderError> {
        self.state.after(Operation::Configure)?;
        if let Some(gui) = self.exports.command_gui {
            unsafe { gui() };
        }
        Ok(())
    }

    pub fn info(&mut self, message: i32, wparam: i32, lparam: i32) -> Result<bool, GirderError> {
        self.state.after(Operation::Info)?;
        let Some(info) = self.exports.info else {
            return Ok(false);
        };
        let handled = unsafe { info(message, wparam, lparam) };
        Ok(handled != 0)
    }

    /// Deliver `event` with `command` to the plugin.
    pub fn event(
        &mut self,
        command: &GirderCommand,
        event: &str,
        payload: &[u8],
    ) -> Result<EventResult, GirderError> {
        self.state.after(Operation::Event)?;
        let Some(handler) = self.exports.event else {
            return Ok(EventResult {
                handled: false,
                status: String::new(),
            });
        };

        let mut raw = command.to_raw()?;
        let event = CString::new(event)?;
        let mut payload = payload.to_vec();
        let mut status = vec![0u8; STRING_BUFFER];
        let handled = unsafe {
            handler(
                &mut raw.raw,
                event.as_ptr(),
                payload.as_mut_ptr().cast(),
                payload.len() as c_int,
                status.as_mut_ptr().cast(),
                status.len() as c_int,
            )
        } != 0;
        Ok(EventResult {
            handled,
            status: buffer_to_string(&status),
        })
    }
}

impl Drop for GirderPlugin {
    fn drop(&mut self) {
        if self.state.is_open() {
            if let Err(e) = self.close() {
                log::warn!(target: "girder", "closing {} on drop: {}", self.path.display(), e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::c_char;

    use super::callbacks::tests::slot_lock;

    unsafe extern "system" fn stub_name(buffer: *mut c_char, size: c_int) {
        write_c_string_raw(buffer, size, "Stub Remote");
    }

    unsafe extern "system" fn stub_devicenum() -> c_int {
        212
    }

    unsafe extern "system" fn stub_api(max_api: c_int) -> c_int {
        max_api
    }

    unsafe extern "system" fn stub_api_too_new(max_api: c_int) -> c_int {
        max_api + 1
    }

    unsafe extern "system" fn stub_open(_: c_int, _: c_int, _: c_int, api: *mut GirApiFunctions) -> GirBool {
        (!api.is_null()) as GirBool
    }

    unsafe extern "system" fn stub_open_fails(_: c_int, _: c_int, _: c_int, _: *mut GirApiFunctions) -> GirBool {
        0
    }

    unsafe extern "system" fn stub_true() -> GirBool {
        1
    }

    unsafe extern "system" fn stub_info(message: c_int, wparam: c_int, lparam: c_int) -> GirBool {
        (message == 1 && wparam == 2 && lparam == 3) as GirBool
    }

    /// The mandatory exports of a well-behaved plugin.
    fn mandatory() -> Vec<(&'static str, *mut c_void)> {
        vec![
            ("gir_version", stub_name as GirStringFn as *mut c_void),
            ("gir_name", stub_name as GirStringFn as *mut c_void),
            ("gir_description", stub_name as GirStringFn as *mut c_void),
            ("gir_devicenum", stub_devicenum as GirDevicenumFn as *mut c_void),
            ("gir_requested_api", stub_api as GirRequestedApiFn as *mut c_void),
            ("gir_open", stub_open as GirOpenFn as *mut c_void),
            ("gir_close", stub_true as GirBoolFn as *mut c_void),
        ]
    }

    fn with_export(
        mut table: Vec<(&'static str, *mut c_void)>,
        name: &'static str,
        address: *mut c_void,
    ) -> Vec<(&'static str, *mut c_void)> {
        table.retain(|(n, _)| *n != name);
        table.push((name, address));
        table
    }

    fn plugin_from(table: &[(&'static str, *mut c_void)]) -> Result<GirderPlugin, GirderError> {
        let lookup = |name: &str| table.iter().find(|(n, _)| *n == name).map(|(_, a)| *a);
        let exports = unsafe { Exports::resolve(&lookup) }?;
        GirderPlugin::with_exports(Path::new("stub.dll"), exports, None)
    }

    #[test]
    fn reads_plugin_details() {
        let plugin = plugin_from(&mandatory()).unwrap();
        assert_eq!(plugin.name(), "Stub Remote");
        assert_eq!(plugin.version(), "Stub Remote");
        assert_eq!(plugin.device_count(), 212);
        assert_eq!(plugin.requested_api(), MAX_API);
        assert!(!plugin.can_configure());
        assert_eq!(plugin.state(), PluginState::Loaded);
    }

    #[test]
    fn later_mandatory_export_missing() {
        let mut table = mandatory();
        table.retain(|(n, _)| *n != "gir_close");
        let err = plugin_from(&table).unwrap_err();
        assert!(matches!(err, GirderError::MissingExport("gir_close")));

        let table = with_export(mandatory(), "gir_open", std::ptr::null_mut());
        assert!(matches!(plugin_from(&table), Err(GirderError::MissingExport("gir_open"))));
    }

    #[test]
    fn newer_api_is_rejected() {
        let table = with_export(
            mandatory(),
            "gir_requested_api",
            stub_api_too_new as GirRequestedApiFn as *mut c_void,
        );
        let err = plugin_from(&table).unwrap_err();
        assert!(matches!(err, GirderError::ApiTooNew { requested: 3, supported: 2 }));
    }

    #[test]
    fn absent_optional_exports_answer_false() {
        let _guard = slot_lock();
        let mut plugin = plugin_from(&mandatory()).unwrap();
        assert!(plugin.open().unwrap());
        assert_eq!(plugin.state(), PluginState::Opened);

        assert!(!plugin.start().unwrap());
        assert_eq!(plugin.state(), PluginState::Opened);
        assert!(!plugin.info(1, 2, 3).unwrap());
        plugin.command_gui().unwrap();
        let result = plugin.event(&GirderCommand::default(), "IR.Power", &[1]).unwrap();
        assert_eq!(result, EventResult { handled: false, status: String::new() });

        assert!(plugin.close().unwrap());
        assert_eq!(plugin.state(), PluginState::Closed);
    }

    #[test]
    fn start_stop_and_info_when_exported() {
        let _guard = slot_lock();
        let table = with_export(mandatory(), "gir_start", stub_true as GirBoolFn as *mut c_void);
        let table = with_export(table, "gir_stop", stub_true as GirBoolFn as *mut c_void);
        let table = with_export(table, "gir_info", stub_info as GirInfoFn as *mut c_void);
        let mut plugin = plugin_from(&table).unwrap();

        assert!(plugin.start().is_err());
        assert!(plugin.open().unwrap());
        assert!(plugin.info(1, 2, 3).unwrap());
        assert!(!plugin.info(1, 2, 4).unwrap());
        assert!(plugin.start().unwrap());
        assert_eq!(plugin.state(), PluginState::Started);
        assert!(plugin.stop().unwrap());
        assert_eq!(plugin.state(), PluginState::Stopped);
    }

    #[test]
    fn second_open_is_host_busy() {
        let _guard = slot_lock();
        let mut first = plugin_from(&mandatory()).unwrap();
        let mut second = plugin_from(&mandatory()).unwrap();

        assert!(first.open().unwrap());
        assert!(matches!(second.open(), Err(GirderError::HostBusy)));
        assert_eq!(second.state(), PluginState::Loaded);

        first.close().unwrap();
        assert!(second.open().unwrap());
        drop(second);
        assert!(callbacks::install(Box::new(DefaultHost)).is_ok());
        assert!(callbacks::release().is_some());
    }

    #[test]
    fn failed_open_frees_host_slot() {
        let _guard = slot_lock();
        let table = with_export(mandatory(), "gir_open", stub_open_fails as GirOpenFn as *mut c_void);
        let mut plugin = plugin_from(&table).unwrap();

        assert!(!plugin.open().unwrap());
        assert_eq!(plugin.state(), PluginState::Loaded);
        assert!(callbacks::install(Box::new(DefaultHost)).is_ok());
        assert!(callbacks::release().is_some());
    }

    #[test]
    fn state_machine() {
        use PluginState::*;
        assert_eq!(Loaded.after(Operation::Open).unwrap(), Opened);
        assert_eq!(Opened.after(Operation::Start).unwrap(), Started);
        assert_eq!(Started.after(Operation::Stop).unwrap(), Stopped);
        assert_eq!(Stopped.after(Operation::Start).unwrap(), Started);
        assert_eq!(Started.after(Operation::Close).unwrap(), Closed);
        assert_eq!(Closed.after(Operation::Open).unwrap(), Opened);
        assert_eq!(Stopped.after(Operation::Event).unwrap(), Stopped);

        assert!(matches!(
            Loaded.after(Operation::Start),
            Err(GirderError::InvalidState { operation: "start", state: Loaded })
        ));
        assert!(Opened.after(Operation::Open).is_err());
        assert!(Opened.after(Operation::Stop).is_err());
        assert!(Closed.after(Operation::Close).is_err());
        assert!(Loaded.after(Operation::Configure).is_err());
    }

    #[test]
    fn empty_path_is_rejected() {
        assert!(matches!(GirderPlugin::load(""), Err(GirderError::EmptyPath)));
    }

    #[test]
    fn missing_library_fails_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let err = GirderPlugin::load(dir.path().join("NoSuchPlugin.dll")).unwrap_err();
        assert!(matches!(err, GirderError::Load { .. }));
    }

    #[cfg(all(target_os = "linux", target_env = "gnu"))]
    #[test]
    fn library_without_exports_is_rejected() {
        let err = GirderPlugin::load("libc.so.6").unwrap_err();
        assert!(matches!(err, GirderError::MissingExport("gir_version")));
    }

    #[test]
    fn callback_table_records_its_size() {
        let api = callbacks::api_table();
        assert_eq!(api.size as usize, std::mem::size_of::<GirApiFunctions>());
        assert!(api.parent_hwnd.is_null());
    }
}
