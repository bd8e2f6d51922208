use std::fs;
use std::path::PathBuf;

use ghostwalk::config::{ExperimentConfig, PhaseConfig};

fn unique_path(name: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!(
        "ghostwalk_config_restore_{}_{}",
        name,
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    path
}

fn assert_config_eq(actual: &ExperimentConfig, expected: &ExperimentConfig) {
    assert_eq!(actual.seed, expected.seed);
    assert_eq!(actual.objects, expected.objects);
    assert_eq!(actual.rooms, expected.rooms);
    assert_eq!(actual.walk.mu, expected.walk.mu);
    assert_eq!(actual.walk.sigma, expected.walk.sigma);
    assert_eq!(actual.quiz.enabled, expected.quiz.enabled);
    assert_eq!(actual.quiz.must_pass, expected.quiz.must_pass);
    assert_eq!(actual.phases.len(), expected.phases.len());
    for (a, e) in actual.phases.iter().zip(&expected.phases) {
        assert_eq!(a.name, e.name);
        assert_eq!(a.blocks, e.blocks);
        assert_eq!(a.trials, e.trials);
    }
}

#[test]
fn a_saved_config_restores_identically() {
    let path = unique_path("modified");
    let mut config = ExperimentConfig::default();
    config.seed = Some(99);
    config.walk.sigma = 0.05;
    config.quiz.must_pass = true;
    config.phases = vec![
        PhaseConfig::new("standardExperimental", 3, 6),
        PhaseConfig::new("tripletWarmup", 1, 9),
    ];

    fs::write(&path, toml::to_string_pretty(&config).unwrap()).unwrap();
    let loaded = ExperimentConfig::load(&path).unwrap();
    assert_config_eq(&loaded, &config);
    loaded.validate().unwrap();

    let _ = fs::remove_file(&path);
}

#[test]
fn load_or_init_seeds_a_missing_file_with_the_defaults() {
    let path = unique_path("seeded");
    assert!(!path.exists());

    let written = ExperimentConfig::load_or_init(&path).unwrap();
    assert!(path.exists());
    assert_config_eq(&written, &ExperimentConfig::default());

    let reread = ExperimentConfig::load_or_init(&path).unwrap();
    assert_config_eq(&reread, &written);

    let _ = fs::remove_file(&path);
}
