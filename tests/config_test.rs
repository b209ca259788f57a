//! Integration tests for Settings loading.
//!
//! Note: these tests use temp files only and do not set FAMTREE_* variables,
//! so they exercise the file layer merged over compiled defaults.

use std::fs;

use chrono::NaiveDate;
use tempfile::TempDir;

use famtree::config::Settings;
use famtree::domain::{ConnectorStyle, RelationshipModel};
use famtree::ApplicationError;

fn write_config(dir: &TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("famtree.toml");
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn given_no_file_when_using_defaults_then_four_level_elbow_and_you() {
    let settings = Settings::default();

    assert_eq!(settings.model, RelationshipModel::FourLevel);
    assert_eq!(settings.connector_style, ConnectorStyle::Elbow);
    assert_eq!(settings.seed.name, "You");
    assert_eq!(
        settings.seed.birth_date,
        NaiveDate::from_ymd_opt(1990, 1, 1).unwrap()
    );
    assert_eq!(settings.seed.generation, 4);
}

#[test]
fn given_full_file_when_loading_then_every_field_is_taken() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
model = "free-generation"
connector_style = "diagonal"

[seed]
name = "Maria Ivanova"
birth_date = "1985-07-21"
generation = 3
"#,
    );

    // Act
    let settings = Settings::load_from_file(&path).expect("load settings");

    // Assert
    assert_eq!(settings.model, RelationshipModel::FreeGeneration);
    assert_eq!(settings.connector_style, ConnectorStyle::Diagonal);
    assert_eq!(settings.seed.name, "Maria Ivanova");
    assert_eq!(
        settings.seed.birth_date,
        NaiveDate::from_ymd_opt(1985, 7, 21).unwrap()
    );
    assert_eq!(settings.seed.generation, 3);
}

#[test]
fn given_partial_file_when_loading_then_missing_fields_keep_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "model = \"six-category\"\n");

    let settings = Settings::load(Some(path.as_path())).expect("load settings");

    assert_eq!(settings.model, RelationshipModel::SixCategory);
    assert_eq!(settings.connector_style, ConnectorStyle::Elbow);
    assert_eq!(settings.seed.name, "You");
}

#[test]
fn given_unknown_model_when_loading_then_config_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "model = \"nine-level\"\n");

    let result = Settings::load_from_file(&path);

    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_out_of_range_generation_when_loading_then_config_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[seed]\ngeneration = 9\n");

    let result = Settings::load_from_file(&path);

    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_blank_seed_name_when_loading_then_config_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[seed]\nname = \"   \"\n");

    let result = Settings::load_from_file(&path);

    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_missing_file_when_loading_then_config_error_names_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");

    let err = Settings::load(Some(path.as_path())).unwrap_err();

    assert!(err.to_string().contains("absent.toml"), "{}", err);
}

#[test]
fn given_settings_when_rendering_toml_then_loading_it_back_gives_same_settings() {
    let dir = TempDir::new().unwrap();
    let original = Settings {
        model: RelationshipModel::SixCategory,
        connector_style: ConnectorStyle::Diagonal,
        ..Settings::default()
    };
    let path = write_config(&dir, &original.to_toml().unwrap());

    let loaded = Settings::load_from_file(&path).unwrap();

    assert_eq!(loaded, original);
}
