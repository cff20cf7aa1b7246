//! Unit tests for the action registry.

use std::sync::Arc;

use rstest::{fixture, rstest};
use serde_json::json;

use super::*;
use crate::bridge::MirrorBridge;

#[fixture]
fn registry() -> ActionRegistry {
    ActionRegistry::with_defaults(Arc::new(MirrorBridge))
}

#[rstest]
fn defaults_register_settings_and_test(registry: ActionRegistry) {
    assert_eq!(registry.names(), vec!["settings", "test"]);
    assert_eq!(registry.len(), 2);
}

#[rstest]
fn duplicate_registration_is_rejected(mut registry: ActionRegistry) {
    let error = registry
        .register("Test", |identity, settings| {
            Box::new(TestAction::new(identity, settings))
        })
        .expect_err("duplicate must fail");
    assert!(matches!(error, PluginError::DuplicateAction { name } if name == "test"));
    assert_eq!(registry.len(), 2);
}

#[rstest]
fn custom_factory_is_used(mut registry: ActionRegistry) {
    registry
        .register("Volume", |identity, settings| {
            Box::new(TestAction::new(identity, settings))
        })
        .expect("register volume");
    assert!(registry.contains("volume"));

    let action = registry
        .create(
            ActionIdentity::new("com.tunl.volume.volume", "ctx"),
            SettingsRecord::from_value(&json!({"level": 4})),
        )
        .expect("create volume");
    assert_eq!(action.settings().get("level"), Some(&json!(4)));
}

#[rstest]
fn create_seeds_settings_and_identity(registry: ActionRegistry) {
    let action = registry
        .create(
            ActionIdentity::new("com.tunl.volume.Settings", "ctx-3"),
            SettingsRecord::from_value(&json!({"x": 1})),
        )
        .expect("create settings action");
    assert_eq!(action.identity().context(), "ctx-3");
    assert_eq!(action.settings().get("x"), Some(&json!(1)));
}

#[rstest]
fn unknown_action_is_an_error(registry: ActionRegistry) {
    let Err(error) = registry.create(
        ActionIdentity::new("com.tunl.volume.missing", "ctx"),
        SettingsRecord::new(),
    ) else {
        panic!("unknown action must not be created");
    };
    assert!(matches!(
        error,
        PluginError::UnknownAction { name, action }
            if name == "missing" && action == "com.tunl.volume.missing"
    ));
}

#[test]
fn empty_registry_reports_empty() {
    let registry = ActionRegistry::new();
    assert!(registry.is_empty());
    assert!(!registry.contains("settings"));
}
