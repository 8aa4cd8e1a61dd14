use log_miner::llm_config::LlmConfig;
use log_miner::masks::MaskBundle;
use log_miner::synthesis::SynthMode;
use log_miner::traits::SynthOptions;
use log_miner::{synth_masks, Drain, Mask, MinerError};
use std::fs;

#[test]
fn test_drain_with_mask_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("masks.json");
    let bundle = MaskBundle {
        dataset: "unit".to_string(),
        masks: vec![Mask::new("BLK", r"blk_-?\d+", "block ids")],
    };
    bundle.write_json(&path).unwrap();

    let mut drain = Drain::new(4, 0.6).unwrap();
    drain.load_masks(&path).unwrap();

    let templates = drain.parse_all([
        "Receiving block blk_-1608999687919862906 src",
        "Receiving block blk_7503483334202473044 src",
    ]);
    assert_eq!(templates, vec!["Receiving block <*> src", "Receiving block <*> src"]);
    assert_eq!(drain.engine().cluster_count(), 1);
}

#[test]
fn test_load_masks_propagates_bad_pattern() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("masks.json");
    fs::write(&path, r#"[{"label": "BAD", "pattern": "[a-"}]"#).unwrap();

    let mut drain = Drain::new(4, 0.6).unwrap();
    let err = drain.load_masks(&path).unwrap_err();
    assert!(matches!(err, MinerError::InvalidPattern { ref pattern, .. } if pattern == "[a-"));
}

#[test]
fn test_load_masks_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut drain = Drain::new(4, 0.6).unwrap();
    let err = drain.load_masks(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, MinerError::Io { .. }));
}

#[tokio::test]
async fn test_synth_masks_then_parse() {
    let logs: Vec<String> = [
        "2024-01-01 00:00:00 INFO opened /var/log/app.log handle 0x1f",
        "2024-01-01 00:00:05 INFO opened /var/log/db.log handle 0x2a",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    let masks = synth_masks(&logs, 10, SynthMode::Offline, &SynthOptions::default(), &LlmConfig::mock())
        .await
        .unwrap();
    let labels: Vec<&str> = masks.iter().map(|m| m.label.as_str()).collect();
    assert_eq!(labels, vec!["TIMESTAMP", "IPV4", "NUMBER", "LOGLEVEL", "PATH", "HEX"]);

    let mut drain = Drain::new(4, 0.6).unwrap();
    drain.set_masks(&masks).unwrap();
    let templates = drain.parse_all(&logs);
    assert_eq!(templates[1], "<*> <*> opened <*> handle <*>");
    assert_eq!(drain.engine().cluster_count(), 1);
}

#[tokio::test]
async fn test_synth_masks_empty_input() {
    let err = synth_masks(&[], 10, SynthMode::Offline, &SynthOptions::default(), &LlmConfig::mock())
        .await
        .unwrap_err();
    assert!(matches!(err, MinerError::EmptySample));
}

#[tokio::test]
async fn test_synth_masks_mock_llm_provider() {
    let logs = vec!["2024-01-01 00:00:00 WARN disk 91 percent".to_string()];
    let masks = synth_masks(&logs, 5, SynthMode::Llm, &SynthOptions::default(), &LlmConfig::mock())
        .await
        .unwrap();
    assert!(masks.iter().any(|m| m.label == "TIMESTAMP"));
}
