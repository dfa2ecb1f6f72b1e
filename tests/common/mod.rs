#![allow(dead_code)]

use inheritmap::hierarchy::registry::ManifestFormat;
use inheritmap::TypeRegistry;
use std::path::PathBuf;

pub const TESTING_MANIFEST: &str = include_str!("../fixtures/testing.toml");
pub const HELPERS_MANIFEST: &str = include_str!("../fixtures/helpers.yaml");

pub const ROOT: &str = "testing.ClassForTesting";
pub const TRACKED: &str = "use_this_func";

/// `testing` module only
pub fn testing_registry() -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    registry
        .load_str(TESTING_MANIFEST, ManifestFormat::Toml, "testing")
        .unwrap();
    registry.validate().unwrap();
    registry
}

/// `testing` plus the `helpers` module that extends it
pub fn extended_registry() -> TypeRegistry {
    let mut registry = testing_registry();
    registry
        .load_str(HELPERS_MANIFEST, ManifestFormat::Yaml, "helpers")
        .unwrap();
    registry.validate().unwrap();
    registry
}

pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}
