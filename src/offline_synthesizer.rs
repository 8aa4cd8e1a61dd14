/// Rule-based mask synthesis
///
/// Always emits the core masks, then adds HEX, PATH and UUID masks when the
/// sample shows evidence of them. Output depends only on the sample.
use crate::error::{MinerError, Result};
use crate::masks::Mask;
use crate::tokenizer::tokenize;
use crate::traits::{MaskSynthesizer, SynthOptions};
use async_trait::async_trait;

pub const REQUIRED_LABELS: [&str; 4] = ["TIMESTAMP", "IPV4", "NUMBER", "LOGLEVEL"];

pub fn core_masks() -> Vec<Mask> {
    vec![
        Mask::new(
            "TIMESTAMP",
            r"(?P<timestamp>\d{4}-\d{2}-\d{2}[ T]\d{2}:\d{2}:\d{2})",
            "Matches ISO timestamps",
        ),
        Mask::new(
            "IPV4",
            r"(?P<ip>(?:\d{1,3}\.){3}\d{1,3})",
            "Captures IPv4 addresses",
        ),
        Mask::new("NUMBER", r"(?P<number>-?\d+(?:\.\d+)?)", "Numerical literals"),
        Mask::new(
            "LOGLEVEL",
            r"(?P<level>TRACE|DEBUG|INFO|WARN|ERROR|FATAL)",
            "Standard log levels",
        ),
    ]
}

fn hex_mask() -> Mask {
    Mask::new("HEX", r"(?P<hex>0x[0-9a-fA-F]+)", "Hex identifiers")
}

fn path_mask() -> Mask {
    Mask::new("PATH", r"(?P<path>/[^\s]+)", "Unix style path")
}

fn uuid_mask() -> Mask {
    Mask::new(
        "UUID",
        r"(?P<uuid>[0-9a-fA-F]{8}(?:-[0-9a-fA-F]{4}){3}-[0-9a-fA-F]{12})",
        "UUIDs",
    )
}

/// Extra masks in order of first evidence, each at most once
fn infer_additional_masks(sample: &[String]) -> Vec<Mask> {
    let mut found = Vec::new();
    for line in sample {
        for token in tokenize(line) {
            if token.starts_with("0x") {
                push_once(&mut found, hex_mask());
            }
            if token.starts_with('/') {
                push_once(&mut found, path_mask());
            }
            if token.matches('-').count() == 4 && token.chars().count() > 10 {
                push_once(&mut found, uuid_mask());
            }
        }
    }
    found
}

fn push_once(found: &mut Vec<Mask>, mask: Mask) {
    if !found.iter().any(|m| m.label == mask.label) {
        found.push(mask);
    }
}

#[derive(Debug, Clone)]
pub struct OfflineSynthesizer {
    pub require_core_classes: bool,
}

impl Default for OfflineSynthesizer {
    fn default() -> Self {
        Self {
            require_core_classes: true,
        }
    }
}

impl OfflineSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn synthesize_sync(&self, sample: &[String]) -> Result<Vec<Mask>> {
        let mut masks = core_masks();
        masks.extend(infer_additional_masks(sample));

        if self.require_core_classes {
            let missing: Vec<String> = REQUIRED_LABELS
                .iter()
                .filter(|label| !masks.iter().any(|m| m.label == **label))
                .map(|label| label.to_string())
                .collect();
            if !missing.is_empty() {
                return Err(MinerError::MissingCoreMasks(missing));
            }
        }

        tracing::debug!("Offline synthesis produced {} masks", masks.len());
        Ok(masks)
    }
}

#[async_trait]
impl MaskSynthesizer for OfflineSynthesizer {
    async fn synthesize(&self, sample: &[String], _options: &SynthOptions) -> Result<Vec<Mask>> {
        self.synthesize_sync(sample)
    }

    fn name(&self) -> &str {
        "offline"
    }
}
