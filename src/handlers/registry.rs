//! The command registry: plugin -> verb -> handler.
//!
//! Three tables, kept symmetric by `register`/`unregister`:
//! `command` maps each verb to the plugin serving it, `commands` is the
//! reverse index from plugin name to its verb set, and `plugins` holds
//! the loaded plugins themselves. Lookup is case-insensitive.
//!
//! Hot reload swaps a plugin without touching connections: the write
//! lock serializes the swap against verb lookup, and a dispatch that
//! already cloned the plugin `Arc` finishes on the old handler.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;

use super::Handler;

/// A pluggable handler-set: a name, the verbs it serves, and a handler
/// per verb.
pub trait Plugin: Send + Sync {
    fn name(&self) -> &'static str;
    fn verbs(&self) -> &'static [&'static str];
    /// Look up the handler for an uppercase verb.
    fn handler(&self, verb: &str) -> Option<&dyn Handler>;
}

/// Names of the plugins compiled into the server.
pub const BUILTIN_PLUGINS: &[&str] = &["core", "channel", "mode", "user", "admin"];

pub struct Registry {
    /// verb (lowercase) -> plugin name
    command: RwLock<HashMap<String, String>>,
    /// plugin name -> verbs
    commands: RwLock<HashMap<String, BTreeSet<String>>>,
    /// plugin name -> plugin
    plugins: RwLock<HashMap<String, Arc<dyn Plugin>>>,
}

impl Default for Registry {
    fn default() -> Registry {
        Registry::new()
    }
}

impl Registry {
    pub fn new() -> Registry {
        Registry {
            command: RwLock::new(HashMap::new()),
            commands: RwLock::new(HashMap::new()),
            plugins: RwLock::new(HashMap::new()),
        }
    }

    /// A registry with every built-in plugin loaded.
    pub fn with_builtins() -> Registry {
        let registry = Registry::new();
        for &name in BUILTIN_PLUGINS {
            let plugin = Registry::construct(name).expect("built-in plugin");
            registry.register(plugin);
        }
        registry
    }

    /// Build a plugin by name. This is the loader hot reload goes
    /// through.
    pub fn construct(name: &str) -> Option<Arc<dyn Plugin>> {
        match name.to_ascii_lowercase().as_str() {
            "core" => Some(Arc::new(super::core::CorePlugin::new())),
            "channel" => Some(Arc::new(super::channel::ChannelPlugin::new())),
            "mode" => Some(Arc::new(super::mode::ModePlugin::new())),
            "user" => Some(Arc::new(super::user::UserPlugin::new())),
            "admin" => Some(Arc::new(super::admin::AdminPlugin::new())),
            _ => None,
        }
    }

    /// Add a plugin and every verb it declares.
    pub fn register(&self, plugin: Arc<dyn Plugin>) {
        let name = plugin.name().to_ascii_lowercase();
        let mut command = self.command.write();
        let mut commands = self.commands.write();
        let mut plugins = self.plugins.write();

        for verb in plugin.verbs() {
            command.insert(verb.to_ascii_lowercase(), name.clone());
            commands
                .entry(name.clone())
                .or_default()
                .insert(verb.to_string());
        }
        plugins.insert(name, plugin);
    }

    /// Remove a plugin and its verb entries. Returns false when no such
    /// plugin is loaded.
    pub fn unregister(&self, name: &str) -> bool {
        let key = name.to_ascii_lowercase();
        let mut command = self.command.write();
        let mut commands = self.commands.write();
        let mut plugins = self.plugins.write();

        if plugins.remove(&key).is_none() {
            return false;
        }
        command.retain(|_, plugin| plugin != &key);
        commands.remove(&key);
        true
    }

    /// Resolve a verb (any case) to the plugin serving it.
    pub fn lookup(&self, verb: &str) -> Option<Arc<dyn Plugin>> {
        let plugin_name = self.command.read().get(&verb.to_ascii_lowercase())?.clone();
        self.plugins.read().get(&plugin_name).cloned()
    }

    pub fn has_plugin(&self, name: &str) -> bool {
        self.plugins.read().contains_key(&name.to_ascii_lowercase())
    }

    /// Verb set of a loaded plugin.
    pub fn verbs_of(&self, name: &str) -> Option<BTreeSet<String>> {
        self.commands.read().get(&name.to_ascii_lowercase()).cloned()
    }
}
