use std::sync::{Arc, Mutex, PoisonError};

use irss_types::VariableList;

use super::callbacks::GirderHost;

/// Serves a plugin's variable callbacks from a [`VariableList`] shared with
/// the macro processor. Everything else falls back to the default answers.
#[derive(Debug, Clone, Default)]
pub struct VariableListHost {
    vars: Arc<Mutex<VariableList>>,
}

impl VariableListHost {
    pub fn new(vars: Arc<Mutex<VariableList>>) -> Self {
        Self { vars }
    }

    fn with_vars<R>(&self, f: impl FnOnce(&mut VariableList) -> R) -> R {
        let mut vars = self.vars.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut vars)
    }
}

impl GirderHost for VariableListHost {
    fn int_var(&mut self, name: &str) -> i32 {
        self.with_vars(|v| v.get(name).and_then(|s| s.trim().parse().ok()).unwrap_or(0))
    }

    fn double_var(&mut self, name: &str) -> f64 {
        self.with_vars(|v| v.get(name).and_then(|s| s.trim().parse().ok()).unwrap_or(0.0))
    }

    fn string_var(&mut self, name: &str) -> String {
        self.with_vars(|v| v.get(name).map(str::to_string))
            .unwrap_or_else(|| "Error".to_string())
    }

    fn set_int_var(&mut self, name: &str, value: i32) -> bool {
        self.with_vars(|v| v.set(name, value.to_string()));
        true
    }

    fn set_double_var(&mut self, name: &str, value: f64) -> bool {
        self.with_vars(|v| v.set(name, value.to_string()));
        true
    }

    fn set_string_var(&mut self, name: &str, value: &str) -> bool {
        self.with_vars(|v| v.set(name, value));
        true
    }

    fn delete_var(&mut self, name: &str) -> bool {
        self.with_vars(|v| v.remove(name).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variables_are_shared() {
        let vars = Arc::new(Mutex::new(VariableList::new()));
        let mut host = VariableListHost::new(Arc::clone(&vars));

        assert!(host.set_int_var("count", 3));
        assert!(host.set_double_var("ratio", 0.5));
        assert!(host.set_string_var("var_title", "News"));
        assert_eq!(vars.lock().unwrap().get("count"), Some("3"));
        assert_eq!(vars.lock().unwrap().get("title"), Some("News"));

        assert_eq!(host.int_var("count"), 3);
        assert_eq!(host.double_var("ratio"), 0.5);
        assert_eq!(host.int_var("title"), 0);
        assert_eq!(host.string_var("missing"), "Error");

        assert!(host.delete_var("count"));
        assert!(!host.delete_var("count"));
        assert_eq!(host.int_var("count"), 0);
    }
}
