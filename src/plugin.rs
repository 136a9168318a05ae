//! Plugin lifecycle and the command registry (spec §4.G).

use crate::editor::Editor;
use crate::ops::Operation;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::warn;

/// A plugin observes and can rewrite the operation stream around every
/// `apply` call. Hooks are optional; a plugin implements only what it needs.
pub trait Plugin {
    fn id(&self) -> &str;
    fn name(&self) -> &str;

    fn initialize(&mut self, _editor: &mut Editor) {}

    /// Called before an op list is applied. Returning an empty `Vec`
    /// cancels the whole `apply` call (spec §4.F: "if any plugin returns an
    /// empty list the op is cancelled"). Returning a different list rewrites
    /// what gets applied.
    fn on_before_apply(&mut self, _editor: &Editor, ops: Vec<Operation>) -> Vec<Operation> {
        ops
    }

    fn on_after_apply(&mut self, _editor: &Editor, _applied: &[Operation]) {}

    /// Lets a plugin contribute extra ops to the normalizer's fixed-point
    /// loop beyond the five built-in structural rules.
    fn normalize(&mut self, _editor: &Editor) -> Vec<Operation> {
        Vec::new()
    }

    fn reset(&mut self, _editor: &mut Editor) {}
    fn destroy(&mut self, _editor: &mut Editor) {}
}

/// `{ id, name, shortcuts?, canExecute(editor, args), execute(editor, args) }`.
pub trait Command {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn shortcuts(&self) -> &[&str] {
        &[]
    }
    fn can_execute(&self, editor: &Editor, args: &CommandArgs) -> bool;
    fn execute(&self, editor: &mut Editor, args: &CommandArgs);
}

/// Opaque argument bag passed to commands. A flat string map covers every
/// command this crate ships; richer payloads are out of scope for the core.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CommandArgs(pub HashMap<String, String>);

impl CommandArgs {
    pub fn none() -> Self {
        CommandArgs::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }
}

/// Stores plugins in registration order (hook dispatch is sequential) and
/// commands by id (last registration wins, logged — spec §4.G).
#[derive(Default)]
pub struct PluginManager {
    plugins: Vec<Box<dyn Plugin>>,
    // Rc, not Box: execute_command needs to clone a command out of the map
    // and call it with `&mut Editor` (which owns this PluginManager) without
    // holding a borrow of `self.plugins` across the call.
    commands: HashMap<String, Rc<dyn Command>>,
}

impl PluginManager {
    pub fn new() -> Self {
        PluginManager::default()
    }

    pub fn register_plugin(&mut self, plugin: Box<dyn Plugin>) {
        self.plugins.push(plugin);
    }

    pub fn unregister_plugin(&mut self, id: &str) {
        self.plugins.retain(|p| p.id() != id);
    }

    pub fn plugin_ids(&self) -> Vec<String> {
        self.plugins.iter().map(|p| p.id().to_string()).collect()
    }

    pub fn plugin(&self, id: &str) -> Option<&dyn Plugin> {
        self.plugins.iter().find(|p| p.id() == id).map(|p| p.as_ref())
    }

    pub fn register_command(&mut self, command: Box<dyn Command>) {
        let id = command.id().to_string();
        if self.commands.contains_key(&id) {
            warn!(command_id = %id, "command id already registered, replacing");
        }
        self.commands.insert(id, Rc::from(command));
    }

    pub fn command(&self, id: &str) -> Option<&dyn Command> {
        self.commands.get(id).map(|c| c.as_ref())
    }

    pub fn command_handle(&self, id: &str) -> Option<Rc<dyn Command>> {
        self.commands.get(id).cloned()
    }

    /// Runs every plugin's `onBeforeApply` in registration order, each
    /// seeing the previous plugin's rewritten list. Short-circuits (returns
    /// an empty list immediately) the moment any plugin cancels.
    pub fn dispatch_before_apply(&mut self, editor: &Editor, mut ops: Vec<Operation>) -> Vec<Operation> {
        for plugin in &mut self.plugins {
            ops = plugin.on_before_apply(editor, ops);
            if ops.is_empty() {
                return ops;
            }
        }
        ops
    }

    pub fn dispatch_after_apply(&mut self, editor: &Editor, applied: &[Operation]) {
        for plugin in &mut self.plugins {
            plugin.on_after_apply(editor, applied);
        }
    }

    pub fn dispatch_normalize(&mut self, editor: &Editor) -> Vec<Operation> {
        let mut ops = Vec::new();
        for plugin in &mut self.plugins {
            ops.extend(plugin.normalize(editor));
        }
        ops
    }
}

impl std::fmt::Debug for PluginManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginManager")
            .field("plugins", &self.plugin_ids())
            .field("commands", &self.commands.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CancelingPlugin;
    impl Plugin for CancelingPlugin {
        fn id(&self) -> &str {
            "canceling"
        }
        fn name(&self) -> &str {
            "Canceling"
        }
        fn on_before_apply(&mut self, _editor: &Editor, _ops: Vec<Operation>) -> Vec<Operation> {
            Vec::new()
        }
    }

    struct NoopCommand;
    impl Command for NoopCommand {
        fn id(&self) -> &str {
            "noop"
        }
        fn name(&self) -> &str {
            "Noop"
        }
        fn can_execute(&self, _editor: &Editor, _args: &CommandArgs) -> bool {
            true
        }
        fn execute(&self, _editor: &mut Editor, _args: &CommandArgs) {}
    }

    #[test]
    fn before_apply_short_circuits_on_empty_return() {
        let mut manager = PluginManager::new();
        manager.register_plugin(Box::new(CancelingPlugin));
        let editor = Editor::new();
        let ops = vec![Operation::SetSelection { old_selection: None, new_selection: None }];
        assert!(manager.dispatch_before_apply(&editor, ops).is_empty());
    }

    #[test]
    fn last_command_registration_wins() {
        let mut manager = PluginManager::new();
        manager.register_command(Box::new(NoopCommand));
        manager.register_command(Box::new(NoopCommand));
        assert!(manager.command("noop").is_some());
    }

    #[test]
    fn unregister_plugin_removes_it() {
        let mut manager = PluginManager::new();
        manager.register_plugin(Box::new(CancelingPlugin));
        manager.unregister_plugin("canceling");
        assert!(manager.plugin_ids().is_empty());
    }
}
