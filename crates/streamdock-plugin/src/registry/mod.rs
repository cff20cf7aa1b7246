//! Mapping from action names to the factories that build instances.
//!
//! The host names actions by UUID (`com.tunl.volume.settings`); the registry
//! keys factories by the trailing segment, compared case-insensitively.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::action::{Action, ActionIdentity, SettingsAction, TestAction};
use crate::bridge::SettingsBridge;
use crate::error::PluginError;
use crate::settings::SettingsRecord;

/// Builds an action instance from its identity and initial settings.
pub type ActionFactory = Box<dyn Fn(ActionIdentity, SettingsRecord) -> Box<dyn Action>>;

/// Registry of action factories keyed by action name.
#[derive(Default)]
pub struct ActionRegistry {
    factories: HashMap<String, ActionFactory>,
}

impl ActionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in actions, with `bridge`
    /// handling settings traffic for [`SettingsAction`].
    #[must_use]
    pub fn with_defaults(bridge: Arc<dyn SettingsBridge>) -> Self {
        let mut registry = Self::new();
        registry.factories.insert(
            SettingsAction::NAME.to_owned(),
            Box::new(move |identity: ActionIdentity, settings: SettingsRecord| -> Box<dyn Action> {
                Box::new(SettingsAction::new(identity, settings, Arc::clone(&bridge)))
            }),
        );
        registry.factories.insert(
            TestAction::NAME.to_owned(),
            Box::new(|identity: ActionIdentity, settings: SettingsRecord| -> Box<dyn Action> {
                Box::new(TestAction::new(identity, settings))
            }),
        );
        registry
    }

    /// Registers `factory` under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::DuplicateAction`] when `name` is taken.
    pub fn register<F>(&mut self, name: &str, factory: F) -> Result<(), PluginError>
    where
        F: Fn(ActionIdentity, SettingsRecord) -> Box<dyn Action> + 'static,
    {
        let key = name.to_ascii_lowercase();
        if self.factories.contains_key(&key) {
            return Err(PluginError::DuplicateAction { name: key });
        }
        self.factories.insert(key, Box::new(factory));
        Ok(())
    }

    /// Builds the action named by `identity`.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::UnknownAction`] when no factory matches.
    pub fn create(
        &self,
        identity: ActionIdentity,
        settings: SettingsRecord,
    ) -> Result<Box<dyn Action>, PluginError> {
        let key = identity.name().to_ascii_lowercase();
        let factory = self
            .factories
            .get(&key)
            .ok_or_else(|| PluginError::UnknownAction {
                name: key.clone(),
                action: identity.action().to_owned(),
            })?;
        Ok(factory(identity, settings))
    }

    /// Returns `true` when a factory is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(&name.to_ascii_lowercase())
    }

    /// Registered names in sorted order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered factories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Returns `true` when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("names", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests;
