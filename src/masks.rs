/// Line-level regex masks applied before tokenization
///
/// Each match of a mask is replaced by the generic wildcard `<*>`. Masks are
/// applied in list order and compound: a later mask sees the output of the
/// earlier ones.
use crate::error::{MinerError, Result};
use crate::tokenizer::tokenize;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const WILDCARD: &str = "<*>";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mask {
    pub label: String,
    pub pattern: String,
    #[serde(default)]
    pub justification: String,
}

impl Mask {
    pub fn new(label: &str, pattern: &str, justification: &str) -> Self {
        Self {
            label: label.to_string(),
            pattern: pattern.to_string(),
            justification: justification.to_string(),
        }
    }
}

/// Masks synthesized for one dataset
#[derive(Debug, Clone)]
pub struct MaskBundle {
    pub dataset: String,
    pub masks: Vec<Mask>,
}

impl MaskBundle {
    /// Write the masks as a pretty JSON array
    pub fn write_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| MinerError::io(e, format!("creating {}", parent.display())))?;
        }
        let json = serde_json::to_string_pretty(&self.masks)
            .map_err(|e| MinerError::json(e, "serializing masks"))?;
        fs::write(path, json).map_err(|e| MinerError::io(e, format!("writing {}", path.display())))?;
        tracing::info!("Wrote {} masks to {}", self.masks.len(), path.display());
        Ok(())
    }
}

/// Parse a JSON array of masks
pub fn masks_from_json(json: &str) -> Result<Vec<Mask>> {
    serde_json::from_str(json).map_err(|e| MinerError::json(e, "parsing mask list"))
}

/// Read a mask file produced by `MaskBundle::write_json`
pub fn load_masks(path: &Path) -> Result<Vec<Mask>> {
    let content = fs::read_to_string(path)
        .map_err(|e| MinerError::io(e, format!("reading mask file {}", path.display())))?;
    masks_from_json(&content)
}

/// Pre-compiled ordered mask list
#[derive(Debug, Clone, Default)]
pub struct MaskApplier {
    compiled: Vec<(Mask, Regex)>,
}

impl MaskApplier {
    /// Compile every mask up front; the first malformed pattern is an error
    pub fn new(masks: &[Mask]) -> Result<Self> {
        let mut compiled = Vec::with_capacity(masks.len());
        for mask in masks {
            let regex = Regex::new(&mask.pattern).map_err(|source| MinerError::InvalidPattern {
                pattern: mask.pattern.clone(),
                source,
            })?;
            compiled.push((mask.clone(), regex));
        }
        tracing::debug!("Compiled {} masks", compiled.len());
        Ok(Self { compiled })
    }

    pub fn apply(&self, line: &str) -> String {
        let mut masked = line.to_string();
        for (_, regex) in &self.compiled {
            masked = substitute(regex, &masked);
        }
        masked
    }

    /// Join tokens with single spaces, mask, then split again
    pub fn apply_tokens(&self, tokens: &[&str]) -> Vec<String> {
        let masked = self.apply(&tokens.join(" "));
        tokenize(&masked).into_iter().map(str::to_string).collect()
    }

    pub fn masks(&self) -> impl Iterator<Item = &Mask> {
        self.compiled.iter().map(|(mask, _)| mask)
    }

    pub fn len(&self) -> usize {
        self.compiled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }
}

/// Replace every match of `regex` in `text` with the wildcard
///
/// An empty match directly after a non-empty one is replaced too; only a
/// second empty match at the same position is skipped.
fn substitute(regex: &Regex, text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut copied = 0;
    let mut pos = 0;
    let mut last_empty_at = None;

    while pos <= text.len() {
        let Some(m) = regex.find_at(text, pos) else {
            break;
        };
        if m.is_empty() && last_empty_at == Some(m.start()) {
            match text[m.start()..].chars().next() {
                Some(c) => pos = m.start() + c.len_utf8(),
                None => break,
            }
            continue;
        }

        out.push_str(&text[copied..m.start()]);
        out.push_str(WILDCARD);
        copied = m.end();
        pos = m.end();
        last_empty_at = m.is_empty().then_some(m.start());
    }

    out.push_str(&text[copied..]);
    out
}
