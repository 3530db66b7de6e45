// tests/checksum.rs

//! Integration tests for source verification.
//!
//! These tests verify that:
//! 1. A source matching its declared digest always fetches cleanly
//! 2. Any single-byte change to the source is a checksum mismatch
//! 3. A mismatch aborts before any install step runs
//! 4. Mismatched downloads never land in the cache

mod common;

use common::{TestPantry, recipe_toml};
use pantry::{Error, Stage};
use std::fs;

#[test]
fn test_matching_source_never_mismatches() {
    let pantry = TestPantry::new();

    let cases: [&[u8]; 4] = [b"", b"x", b"hello world\n", &[0u8; 4096]];

    for (i, contents) in cases.iter().enumerate() {
        let recipe = pantry.recipe(&format!("tool{}", i), contents, "");
        let artifact = pantry.kitchen.fetch(&recipe).unwrap();
        assert_eq!(fs::read(&artifact).unwrap(), *contents);
    }
}

#[test]
fn test_single_byte_mutation_is_mismatch() {
    let original = b"#!/bin/sh\necho cdk8s\n".to_vec();

    for position in 0..original.len() {
        let pantry = TestPantry::new();
        let digest = pantry::hash::sha256(&original);

        let mut mutated = original.clone();
        mutated[position] ^= 0x01;
        let (url, _) = pantry.artifact("tool-1.0.0.tgz", &mutated);

        let recipe = pantry
            .kitchen
            .load(&recipe_toml("tool", &url, &digest, ""))
            .unwrap();

        let err = pantry.kitchen.fetch(&recipe).unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Verify), "byte {}", position);
        match err.kind() {
            Error::ChecksumMismatch { expected, actual } => {
                assert_eq!(expected, &format!("sha256:{}", digest));
                assert_eq!(actual, &format!("sha256:{}", pantry::hash::sha256(&mutated)));
            }
            other => panic!("byte {}: unexpected error {}", position, other),
        }
        assert!(!pantry.kitchen.is_cached(&recipe));
    }
}

#[test]
fn test_deadbeef_fails_before_any_step() {
    let pantry = TestPantry::new();
    let marker = pantry.marker("step-ran");
    let (url, _) = pantry.artifact("tool-1.0.0.tgz", b"real contents");

    let recipe = pantry
        .kitchen
        .load(&recipe_toml(
            "tool",
            &url,
            "deadbeef",
            &format!("install = [\"touch {}\"]", marker.display()),
        ))
        .unwrap();

    let err = pantry.kitchen.cook(recipe, false).unwrap_err();
    assert_eq!(err.kind_name(), "ChecksumMismatch");
    assert!(err.to_string().starts_with("tool: verify failed: checksum mismatch"));
    assert!(!marker.exists());
    assert!(!pantry.root.path().join("cellar/tool").exists());
    assert!(!pantry.kitchen.registry().is_installed("tool").unwrap());
}

#[test]
fn test_corrupt_cache_is_refetched() {
    let pantry = TestPantry::new();
    let recipe = pantry.recipe("tool", b"good bytes", "");

    let artifact = pantry.kitchen.fetch(&recipe).unwrap();
    fs::write(&artifact, b"bit rot").unwrap();

    let again = pantry.kitchen.fetch(&recipe).unwrap();
    assert_eq!(again, artifact);
    assert_eq!(fs::read(&again).unwrap(), b"good bytes");
}

#[test]
fn test_missing_source_is_fetch_error() {
    let pantry = TestPantry::new();
    let missing = pantry.sources_dir().join("nope.tgz");

    let recipe = pantry
        .kitchen
        .load(&recipe_toml(
            "tool",
            &common::file_url(&missing),
            &pantry::hash::sha256(b""),
            "",
        ))
        .unwrap();

    let err = pantry.kitchen.fetch(&recipe).unwrap_err();
    assert_eq!(err.stage(), Some(Stage::Fetch));
    assert!(matches!(err.kind(), Error::FetchError { .. }));

    // No stray temp files are left in the cache
    let cache = &pantry.kitchen.config().source_cache;
    assert_eq!(fs::read_dir(cache).unwrap().count(), 0);
}
