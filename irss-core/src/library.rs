//! Folder of `<name>.Macro` files.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use irss_types::{Macro, VariableList};

use crate::error::LibraryError;
use crate::host::Host;
use crate::persistence::{read_macro, write_macro};
use crate::processor::{Processor, RunSummary};

pub const MACRO_EXTENSION: &str = "Macro";

#[derive(Debug, Clone)]
pub struct MacroLibrary {
    folder: PathBuf,
}

impl MacroLibrary {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// File path for a macro name. Names may not contain path separators.
    pub fn path_for(&self, name: &str) -> Result<PathBuf, LibraryError> {
        let name = name.trim();
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(LibraryError::InvalidName(name.to_string()));
        }
        Ok(self.folder.join(format!("{}.{}", name, MACRO_EXTENSION)))
    }

    /// Sorted macro names. A missing folder is an empty library.
    pub fn list(&self) -> Result<Vec<String>, LibraryError> {
        let entries = match fs::read_dir(&self.folder) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let is_macro = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case(MACRO_EXTENSION));
            if let (true, Some(stem)) = (is_macro, path.file_stem().and_then(|s| s.to_str())) {
                names.push(stem.to_string());
            }
        }
        names.sort_by_key(|n| n.to_lowercase());
        Ok(names)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path_for(name).map(|p| p.is_file()).unwrap_or(false)
    }

    pub fn load(&self, name: &str) -> Result<Macro, LibraryError> {
        let path = self.path_for(name)?;
        if !path.is_file() {
            return Err(LibraryError::NotFound(name.trim().to_string()));
        }
        Ok(read_macro(&path)?)
    }

    /// Write `mac` under its own name, replacing any existing file.
    pub fn save(&self, mac: &Macro) -> Result<PathBuf, LibraryError> {
        let path = self.path_for(&mac.name)?;
        write_macro(&path, mac)?;
        log::info!(target: "persistence", "saved macro \"{}\"", mac.name.trim());
        Ok(path)
    }

    pub fn delete(&self, name: &str) -> Result<(), LibraryError> {
        let path = self.path_for(name)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(LibraryError::NotFound(name.trim().to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Load and run a stored macro.
    pub fn run(
        &self,
        name: &str,
        vars: &mut VariableList,
        host: &mut dyn Host,
        processor: &Processor,
    ) -> Result<RunSummary, LibraryError> {
        let mac = self.load(name)?;
        Ok(processor.run(&mac, vars, host)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::DryRunHost;
    use irss_types::{Command, CommandKind};

    fn sample(name: &str) -> Macro {
        Macro::with_commands(
            name,
            vec![Command::with_parameters(CommandKind::SetVariable, ["ran", "yes"]).unwrap()],
        )
    }

    #[test]
    fn save_list_load_delete() {
        let dir = tempfile::tempdir().unwrap();
        let library = MacroLibrary::new(dir.path().join("Macro"));
        assert!(library.list().unwrap().is_empty());

        library.save(&sample("b")).unwrap();
        library.save(&sample("A")).unwrap();
        std::fs::write(dir.path().join("Macro").join("notes.txt"), "x").unwrap();

        assert_eq!(library.list().unwrap(), vec!["A", "b"]);
        assert!(library.exists("b"));
        assert_eq!(library.load("b").unwrap(), sample("b"));

        library.delete("b").unwrap();
        assert!(!library.exists("b"));
        assert!(matches!(library.delete("b"), Err(LibraryError::NotFound(_))));
    }

    #[test]
    fn rejects_bad_names() {
        let library = MacroLibrary::new("/tmp/irss");
        assert!(matches!(library.path_for("  "), Err(LibraryError::InvalidName(_))));
        assert!(matches!(library.path_for("../etc"), Err(LibraryError::InvalidName(_))));
        assert!(library.save(&sample("")).is_err());
        assert_eq!(
            library.path_for(" Power On ").unwrap(),
            PathBuf::from("/tmp/irss/Power On.Macro")
        );
    }

    #[test]
    fn load_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let library = MacroLibrary::new(dir.path());
        assert!(matches!(library.load("ghost"), Err(LibraryError::NotFound(n)) if n == "ghost"));
    }

    #[test]
    fn run_stored_macro() {
        let dir = tempfile::tempdir().unwrap();
        let library = MacroLibrary::new(dir.path());
        library.save(&sample("test")).unwrap();

        let mut vars = VariableList::new();
        let summary = library
            .run("test", &mut vars, &mut DryRunHost::new(), &Processor::new())
            .unwrap();
        assert_eq!(summary.steps, 1);
        assert_eq!(vars.get("ran"), Some("yes"));
    }
}
