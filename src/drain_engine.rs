/// Incremental Drain-style clustering
///
/// Lines are grouped by a bucket key of (token count, first `depth` tokens).
/// Within a bucket every cluster is scored against the incoming tokens in
/// insertion order; the first cluster with the strictly highest score wins if
/// it reaches the similarity threshold, otherwise a new cluster is appended.
///
/// The engine is single-pass and order dependent. One instance must be driven
/// by one sequence of calls; `add_log` takes `&mut self`.
use crate::drain_config::DrainConfig;
use crate::error::Result;
use crate::masks::{Mask, MaskApplier, WILDCARD};
use crate::regex_library::RegexRegistry;
use crate::tokenizer::{apply_token_classes, tokenize};
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrainCluster {
    cluster_id: usize,
    template: Vec<String>,
    observation_count: usize,
}

impl DrainCluster {
    fn new(cluster_id: usize, tokens: &[String]) -> Self {
        Self {
            cluster_id,
            template: tokens.to_vec(),
            observation_count: 0,
        }
    }

    /// Fraction of template positions matching `tokens` or already `<*>`
    pub fn similarity(&self, tokens: &[String]) -> f64 {
        // zip truncates to the shorter side; bucketing keeps lengths equal
        let matches = self
            .template
            .iter()
            .zip(tokens)
            .filter(|(tmpl, tok)| tmpl == tok || tmpl.as_str() == WILDCARD)
            .count();
        matches as f64 / self.template.len().max(1) as f64
    }

    /// Count one more observation and generalize differing positions
    pub fn update(&mut self, tokens: &[String]) {
        self.observation_count += 1;
        for (idx, token) in tokens.iter().enumerate() {
            if idx >= self.template.len() {
                self.template.push(token.clone());
            } else if self.template[idx] != *token {
                self.template[idx] = WILDCARD.to_string();
            }
        }
    }

    pub fn template_str(&self) -> String {
        self.template.join(" ")
    }

    pub fn template(&self) -> &[String] {
        &self.template
    }

    pub fn observation_count(&self) -> usize {
        self.observation_count
    }

    /// Creation ordinal within the owning engine
    pub fn cluster_id(&self) -> usize {
        self.cluster_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BucketKey {
    pub token_count: usize,
    pub prefix: String,
}

impl BucketKey {
    pub fn for_tokens(tokens: &[String], depth: usize) -> Self {
        let end = depth.min(tokens.len());
        Self {
            token_count: tokens.len(),
            prefix: tokens[..end].join(" "),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DrainEngine {
    config: DrainConfig,
    applier: MaskApplier,
    registry: RegexRegistry,
    buckets: FxHashMap<BucketKey, Vec<DrainCluster>>,
    next_cluster_id: usize,
}

impl DrainEngine {
    /// Build an engine, compiling the masks immediately
    pub fn new(config: DrainConfig, masks: &[Mask]) -> Result<Self> {
        Self::with_registry(config, masks, RegexRegistry::default())
    }

    pub fn with_registry(config: DrainConfig, masks: &[Mask], registry: RegexRegistry) -> Result<Self> {
        config.validate()?;
        let applier = MaskApplier::new(masks)?;
        tracing::debug!(
            "Drain engine: depth={} threshold={} masks={}",
            config.depth,
            config.similarity_threshold,
            applier.len()
        );
        Ok(Self {
            config,
            applier,
            registry,
            buckets: FxHashMap::default(),
            next_cluster_id: 0,
        })
    }

    /// Mask, tokenize and classify a raw line
    pub fn preprocess(&self, line: &str) -> Vec<String> {
        let masked = self.applier.apply(line);
        apply_token_classes(&tokenize(&masked), &self.registry)
    }

    /// Assign a line to a cluster, creating one if nothing is similar enough
    pub fn add_log(&mut self, line: &str) -> &DrainCluster {
        let tokens = self.preprocess(line);
        let key = BucketKey::for_tokens(&tokens, self.config.depth);
        let threshold = self.config.similarity_threshold;
        let cluster_id = self.next_cluster_id;

        let clusters = Self::get_or_create_bucket(&mut self.buckets, key);

        let mut best: Option<usize> = None;
        let mut best_score = 0.0;
        for (idx, cluster) in clusters.iter().enumerate() {
            let score = cluster.similarity(&tokens);
            if score > best_score {
                best_score = score;
                best = Some(idx);
            }
        }

        let idx = match best {
            Some(idx) if best_score >= threshold => idx,
            _ => {
                clusters.push(DrainCluster::new(cluster_id, &tokens));
                self.next_cluster_id += 1;
                tracing::debug!("New cluster {} for {} tokens", cluster_id, tokens.len());
                clusters.len() - 1
            }
        };

        let cluster = &mut clusters[idx];
        cluster.update(&tokens);
        cluster
    }

    fn get_or_create_bucket(
        buckets: &mut FxHashMap<BucketKey, Vec<DrainCluster>>,
        key: BucketKey,
    ) -> &mut Vec<DrainCluster> {
        buckets.entry(key).or_insert_with(Vec::new)
    }

    /// Template of each line right after it was added
    pub fn parse<I, S>(&mut self, lines: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        lines
            .into_iter()
            .map(|line| self.add_log(line.as_ref()).template_str())
            .collect()
    }

    /// Lazy form of `parse`; each `next` adds exactly one line
    pub fn parse_iter<I, S>(&mut self, lines: I) -> ParseIter<'_, I::IntoIter>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        ParseIter {
            engine: self,
            lines: lines.into_iter(),
        }
    }

    /// All clusters in creation order
    pub fn clusters(&self) -> Vec<&DrainCluster> {
        let mut all: Vec<&DrainCluster> = self.buckets.values().flatten().collect();
        all.sort_by_key(|c| c.cluster_id);
        all
    }

    pub fn bucket(&self, key: &BucketKey) -> Option<&[DrainCluster]> {
        self.buckets.get(key).map(Vec::as_slice)
    }

    pub fn cluster_count(&self) -> usize {
        self.next_cluster_id
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn config(&self) -> &DrainConfig {
        &self.config
    }

    pub fn masks(&self) -> impl Iterator<Item = &Mask> {
        self.applier.masks()
    }
}

impl Default for DrainEngine {
    fn default() -> Self {
        Self {
            config: DrainConfig::default(),
            applier: MaskApplier::default(),
            registry: RegexRegistry::default(),
            buckets: FxHashMap::default(),
            next_cluster_id: 0,
        }
    }
}

pub struct ParseIter<'a, I> {
    engine: &'a mut DrainEngine,
    lines: I,
}

impl<'a, I, S> Iterator for ParseIter<'a, I>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let line = self.lines.next()?;
        Some(self.engine.add_log(line.as_ref()).template_str())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.lines.size_hint()
    }
}
