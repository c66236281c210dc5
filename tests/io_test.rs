use ground_speed::aggregator::{AcceptanceBand, SessionEstimate};
use ground_speed::config::VelocityConfig;
use ground_speed::io::{format_speed, object_from_json, object_to_json, write_report, write_result};
use ground_speed::speed::SpeedSample;
use tempfile::TempDir;

fn estimate(speed_km_s: f64) -> SessionEstimate {
    SessionEstimate {
        speed_km_s,
        valid_samples: 2,
        total_samples: 3,
        used_fallback: false,
    }
}

#[test]
fn test_format_speed_precision() {
    assert_eq!(format_speed(7.25), "7.2500 km/s");
    assert_eq!(format_speed(0.25296), "0.2530 km/s");
    assert_eq!(format_speed(12.3456), "12.346 km/s");
    assert_eq!(format_speed(10.0), "10.000 km/s");
    assert_eq!(format_speed(9.99999), "10.0000 km/s");
}

#[test]
fn test_write_result() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("result.txt");
    write_result(path.to_str().unwrap(), &estimate(7.6612)).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "7.6612 km/s");
}

#[test]
fn test_write_report() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("report.json");
    let samples = [
        SpeedSample {
            pair_index: 0,
            speed_km_s: 7.0,
        },
        SpeedSample {
            pair_index: 1,
            speed_km_s: 7.5,
        },
        SpeedSample {
            pair_index: 3,
            speed_km_s: 9.0,
        },
    ];
    write_report(
        path.to_str().unwrap(),
        &estimate(7.25),
        &samples,
        AcceptanceBand::default(),
        12648.0,
    )
    .unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["estimate"]["speed_km_s"], 7.25);
    assert_eq!(json["estimate"]["total_samples"], 3);
    assert_eq!(json["samples"].as_array().unwrap().len(), 3);
    assert_eq!(json["samples"][2]["pair_index"], 3);
    assert_eq!(json["samples"][2]["in_band"], false);
    assert_eq!(json["band"]["min_km_s"], 6.0);
}

#[test]
fn test_config_json_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    let mut config = VelocityConfig::default();
    config.extractor.max_features = 500;
    config.max_hamming = Some(40);
    object_to_json(path.to_str().unwrap(), &config).unwrap();
    let loaded: VelocityConfig = object_from_json(path.to_str().unwrap()).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_missing_config_is_an_error() {
    let result: ground_speed::Result<VelocityConfig> = object_from_json("non_existent_config.json");
    assert!(result.is_err());
}
