//! Link discovery engine.
//!
//! A run moves through fixed stages:
//!
//! ```text
//! Filter → Sample → ScoreEach → Sort → Truncate
//! ```
//!
//! Filtering drops the focal note and every note it already links to.
//! Sampling bounds how many candidates reach the model. Scoring isolates
//! failures per candidate, except configuration errors, which end the run
//! because every later call would fail the same way. Sorting is stable so
//! equal scores keep their sample order.

use std::collections::HashSet;
use std::time::Instant;

use futures::stream::{self, StreamExt};
use tracing::{debug, info, trace, warn};

use linkmuse_core::{
    defaults, extract_wiki_links, AnalysisBudget, Document, DocumentSource, PotentialLink,
    RelevanceAnalysis, Result,
};

use crate::sampler;

/// Notes eligible for suggestion: not the focal note and not already linked.
pub fn candidate_pool<'a>(
    focal: &Document,
    corpus: &'a [Document],
    existing_links: &HashSet<String>,
) -> Vec<&'a Document> {
    corpus
        .iter()
        .filter(|doc| doc.path != focal.path)
        .filter(|doc| !existing_links.contains(&doc.name))
        .collect()
}

/// Discovers unlinked notes related to a focal note.
pub struct LinkDiscovery<A: RelevanceAnalysis> {
    analyzer: A,
    budget: AnalysisBudget,
    concurrency: usize,
}

impl<A: RelevanceAnalysis> LinkDiscovery<A> {
    pub fn new(analyzer: A) -> Self {
        Self {
            analyzer,
            budget: AnalysisBudget::default(),
            concurrency: defaults::DISCOVERY_CONCURRENCY,
        }
    }

    /// Budget used by [`discover_for`](Self::discover_for).
    pub fn with_budget(mut self, budget: AnalysisBudget) -> Self {
        self.budget = budget;
        self
    }

    /// Candidates scored at once. Values below 1 are treated as 1.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn analyzer(&self) -> &A {
        &self.analyzer
    }

    pub fn budget(&self) -> AnalysisBudget {
        self.budget
    }

    /// Rank up to `budget.max_links_to_generate` candidates from `corpus`.
    ///
    /// An empty result is a normal outcome. Only configuration errors are
    /// returned; other per-candidate failures are logged and skipped.
    pub async fn discover_links(
        &self,
        focal: &Document,
        corpus: &[Document],
        existing_links: &HashSet<String>,
        budget: AnalysisBudget,
    ) -> Result<Vec<PotentialLink>> {
        let start = Instant::now();
        let pool = candidate_pool(focal, corpus, existing_links);
        let sample = if pool.len() > budget.max_notes_to_analyze {
            sampler::sample(&pool, budget.max_notes_to_analyze)
        } else {
            pool
        };

        info!(
            subsystem = "discovery",
            component = "engine",
            op = "discover_links",
            note_path = %focal.path,
            corpus_size = corpus.len(),
            existing_links = existing_links.len(),
            candidate_count = sample.len(),
            "Starting link discovery"
        );

        let mut scored = stream::iter(sample)
            .map(|candidate| self.score(focal, candidate))
            .buffered(self.concurrency);

        let mut links = Vec::new();
        while let Some(outcome) = scored.next().await {
            if let Some(link) = outcome? {
                links.push(link);
            }
        }

        links.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
        links.truncate(budget.max_links_to_generate);

        info!(
            subsystem = "discovery",
            component = "engine",
            note_path = %focal.path,
            result_count = links.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Link discovery complete"
        );
        Ok(links)
    }

    /// Run discovery for `focal` against every note in `source`.
    ///
    /// Existing links are read from the focal note's `[[...]]` markers.
    pub async fn discover_for(
        &self,
        focal: &Document,
        source: &dyn DocumentSource,
    ) -> Result<Vec<PotentialLink>> {
        let corpus = source.list_all().await?;
        let existing = extract_wiki_links(&focal.content);
        debug!(
            subsystem = "discovery",
            component = "engine",
            note_path = %focal.path,
            existing_links = existing.len(),
            "Extracted existing links"
        );
        self.discover_links(focal, &corpus, &existing, self.budget)
            .await
    }

    /// Score one candidate. `Ok(None)` means the candidate was skipped.
    async fn score(&self, focal: &Document, candidate: &Document) -> Result<Option<PotentialLink>> {
        match self
            .analyzer
            .analyze_relevance(&focal.name, &candidate.name, &focal.content, &candidate.content)
            .await
        {
            Ok(result) => {
                trace!(
                    subsystem = "discovery",
                    component = "engine",
                    note_path = %candidate.path,
                    score = result.relevance_score,
                    "Candidate scored"
                );
                Ok(Some(PotentialLink::from_result(candidate, result)))
            }
            Err(e) if e.is_config() => {
                warn!(
                    subsystem = "discovery",
                    component = "engine",
                    error = %e,
                    "Configuration error, aborting discovery"
                );
                Err(e)
            }
            Err(e) => {
                warn!(
                    subsystem = "discovery",
                    component = "engine",
                    note_path = %candidate.path,
                    error = %e,
                    "Skipping candidate after analysis failure"
                );
                Ok(None)
            }
        }
    }
}
