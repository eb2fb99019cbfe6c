use std::fs;

use signalfield::config::{AggregationMode, EngineSettings, ModelKind};
use signalfield::field::{Aggregation, FieldParams};
use signalfield::settings::{SettingsProvider, StaticSource, TomlFileSource};

const SAMPLE: &str = r##"
[thresholds]
excellent = -45
good = -55
fair = -65
poor = -75

[heatmap]
intensity = 0.6
gradient = [
    { offset = 0.0, color = "#000000" },
    { offset = 1.0, color = "#ffffff" },
]

[calculation]
aggregation = "interpolated"
interpolation_method = "kriging"
max_interpolation_distance = 30

[propagation]
model = "log-distance"
path_loss_exponent = 2.5
"##;

#[test]
fn test_empty_toml_gives_defaults() {
    let settings = EngineSettings::from_toml_str("").unwrap();
    assert_eq!(settings, EngineSettings::default());
    assert_eq!(settings.propagation.model, ModelKind::ItuIndoor);
    assert_eq!(settings.thresholds.cutoffs(), [-50.0, -60.0, -70.0, -80.0]);
}

#[test]
fn test_file_source_round_trip() {
    let dir = std::env::temp_dir().join(format!("signalfield-settings-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("engine.toml");
    fs::write(&path, SAMPLE).unwrap();

    let mut provider = SettingsProvider::new(TomlFileSource::new(&path));
    let settings = provider.current().unwrap();
    assert_eq!(settings.thresholds.poor(), -75.0);
    assert_eq!(settings.heatmap.gradient.stops().len(), 2);
    assert_eq!(settings.calculation.aggregation, AggregationMode::Interpolated);

    let params = FieldParams::from_settings(&settings).unwrap();
    assert!(matches!(params.aggregation, Aggregation::Interpolated(_)));
    assert_eq!(params.max_distance, Some(30.0));
    assert_eq!(params.model.exponent(), 2.5);

    // Edits on disk are picked up only after invalidation.
    fs::write(&path, "[heatmap]\nintensity = 0.2\n").unwrap();
    assert_eq!(provider.current().unwrap().heatmap.intensity, 0.6);
    provider.invalidate();
    assert_eq!(provider.current().unwrap().heatmap.intensity, 0.2);
    assert_eq!(provider.version(), 2);

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_update_bumps_version() {
    let mut provider = SettingsProvider::new(StaticSource::default());
    let v0 = provider.current().unwrap();
    let mut next = (*v0).clone();
    next.heatmap.enabled = false;
    provider.update(next).unwrap();
    assert!(provider.version() > 1);
    assert!(!provider.current().unwrap().heatmap.enabled);
}
