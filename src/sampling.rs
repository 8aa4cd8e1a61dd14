/// Deterministic k-line sampling for mask synthesis
///
/// Lines are grouped by a token-class fingerprint of their first four tokens.
/// Groups are visited in sorted order and strided so that the sample covers
/// as many distinct shapes as possible. Any shortfall is filled from all lines
/// ordered by their SHA-256 digest.
use crate::regex_library::classify_token;
use crate::tokenizer::tokenize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

const SIGNATURE_TOKENS: usize = 4;

/// SHA-256 of the UTF-8 bytes; byte order equals the digest's integer order
pub fn stable_hash(value: &str) -> [u8; 32] {
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&Sha256::digest(value.as_bytes()));
    digest
}

fn signature(line: &str) -> String {
    tokenize(line)
        .into_iter()
        .take(SIGNATURE_TOKENS)
        .map(|tok| classify_token(tok).unwrap_or(tok))
        .collect::<Vec<_>>()
        .join(",")
}

pub fn deterministic_sample(logs: &[String], k: usize) -> Vec<String> {
    if k >= logs.len() {
        return logs.to_vec();
    }
    if k == 0 {
        return Vec::new();
    }

    let mut buckets: BTreeMap<String, Vec<&String>> = BTreeMap::new();
    for line in logs {
        buckets.entry(signature(line)).or_default().push(line);
    }

    let per_bucket = (k / buckets.len().max(1)).max(1);
    let mut selected: Vec<String> = Vec::with_capacity(k);
    for lines in buckets.values() {
        let step = (lines.len() / per_bucket).max(1);
        for line in lines.iter().step_by(step) {
            selected.push((*line).clone());
            if selected.len() >= k {
                return selected;
            }
        }
    }

    let mut remaining: Vec<&String> = logs.iter().collect();
    remaining.sort_by_key(|line| stable_hash(line));
    for line in remaining {
        if selected.len() >= k {
            break;
        }
        if !selected.contains(line) {
            selected.push(line.clone());
        }
    }

    tracing::debug!("Sampled {} of {} lines", selected.len(), logs.len());
    selected
}

/// Positions of the sampled lines in `logs` (first occurrence)
pub fn deterministic_indices(logs: &[String], k: usize) -> Vec<usize> {
    deterministic_sample(logs, k)
        .iter()
        .filter_map(|line| logs.iter().position(|l| l == line))
        .collect()
}
