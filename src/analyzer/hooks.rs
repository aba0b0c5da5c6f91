//! Call Hooks - macro-like call forms
//!
//! A table of matcher/handler pairs consulted during call lowering.
//! When a hook claims a call it runs instead of the default lowering and
//! synthesizes registry entries (no Call vertex is emitted). New hooks
//! extend the table without touching the visitor.

use crate::env::method_registry::{MethodKind, Visibility};
use crate::env::{GlobalEnv, ScopeStack};
use ruby_prism::CallNode;
use std::path::Path;

/// A macro-like call form intercepted during the walk
pub trait CallHook {
    /// Whether this hook claims a call with the given method name in the
    /// given constant (None at top level)
    fn claims(&self, const_name: Option<&str>, method_name: &str) -> bool;

    /// Run instead of the default call lowering
    fn apply(&self, genv: &mut GlobalEnv, scopes: &ScopeStack, file: &Path, call: &CallNode<'_>);
}

/// attr_reader / attr_writer / attr_accessor: synthesize public instance
/// methods for each symbol or string argument
pub struct AttrHook {
    trigger: &'static str,
    reader: bool,
    writer: bool,
}

impl AttrHook {
    pub fn reader() -> Self {
        Self {
            trigger: "attr_reader",
            reader: true,
            writer: false,
        }
    }

    pub fn writer() -> Self {
        Self {
            trigger: "attr_writer",
            reader: false,
            writer: true,
        }
    }

    pub fn accessor() -> Self {
        Self {
            trigger: "attr_accessor",
            reader: true,
            writer: true,
        }
    }
}

impl CallHook for AttrHook {
    fn claims(&self, _const_name: Option<&str>, method_name: &str) -> bool {
        method_name == self.trigger
    }

    fn apply(&self, genv: &mut GlobalEnv, scopes: &ScopeStack, file: &Path, call: &CallNode<'_>) {
        let receiver_name = scopes.receiver_name();
        if receiver_name.is_empty() {
            // no constant to attach the methods to
            return;
        }
        let Some(args) = call.arguments() else {
            return;
        };

        for arg in args.arguments().iter() {
            let attr_name = if let Some(symbol) = arg.as_symbol_node() {
                String::from_utf8_lossy(symbol.unescaped()).to_string()
            } else if let Some(string) = arg.as_string_node() {
                String::from_utf8_lossy(string.unescaped()).to_string()
            } else {
                continue;
            };

            if self.reader {
                genv.method_registry.add(
                    &receiver_name,
                    &attr_name,
                    None,
                    file,
                    false,
                    Visibility::Public,
                    MethodKind::AttrReader,
                );
            }
            if self.writer {
                genv.method_registry.add(
                    &receiver_name,
                    &format!("{}=", attr_name),
                    None,
                    file,
                    false,
                    Visibility::Public,
                    MethodKind::AttrWriter,
                );
            }
        }
    }
}

/// Registry of call hooks, consulted in registration order
pub struct HookTable {
    hooks: Vec<Box<dyn CallHook>>,
}

impl HookTable {
    pub fn new() -> Self {
        let mut table = Self { hooks: Vec::new() };
        table.register(Box::new(AttrHook::reader()));
        table.register(Box::new(AttrHook::writer()));
        table.register(Box::new(AttrHook::accessor()));
        table
    }

    pub fn register(&mut self, hook: Box<dyn CallHook>) {
        self.hooks.push(hook);
    }

    /// First hook claiming the call, if any
    pub fn claim(&self, const_name: Option<&str>, method_name: &str) -> Option<&dyn CallHook> {
        self.hooks
            .iter()
            .find(|hook| hook.claims(const_name, method_name))
            .map(|hook| hook.as_ref())
    }
}

impl Default for HookTable {
    fn default() -> Self {
        Self::new()
    }
}
