//! NameResolver (C2, §4.3): maps a user-typed name to at most K canonical
//! cleaned names known to the store, with strong precision. Has no mutable
//! state; it is a pure pipeline over whatever candidate source it is given.

use crate::config::ResolverConfig;
use crate::textsim::token_set_ratio;

/// A candidate surfaced by the store-side trigram prefilter (Stage A).
#[derive(Debug, Clone, PartialEq)]
pub struct TrigramCandidate {
    pub clean_name: String,
    /// Store-side similarity, when the store supports it; `None` when the
    /// substring-containment fallback was used instead.
    pub similarity: Option<f32>,
}

#[derive(Debug, Clone, PartialEq)]
struct ScoredCandidate {
    clean_name: String,
    stage_b_score: u32,
}

/// Runs Stages B and C of §4.3 over candidates already produced by Stage A.
///
/// Stage A (trigram prefilter / substring fallback, `5·K` rows) is a store
/// query and lives on [`crate::repositories::PeopleRepository`]; this
/// function is the pure remainder of the pipeline so it can be tested
/// without a database.
pub fn resolve(input: &str, candidates: &[TrigramCandidate], config: &ResolverConfig) -> Vec<String> {
    let input_lower = input.to_lowercase();

    let mut stage_b: Vec<ScoredCandidate> = candidates
        .iter()
        .map(|candidate| ScoredCandidate {
            clean_name: candidate.clean_name.clone(),
            stage_b_score: token_set_ratio(&input_lower, &candidate.clean_name.to_lowercase()),
        })
        .filter(|c| c.stage_b_score >= (config.beta * 100.0) as u32)
        .collect();

    stage_b.sort_by(|a, b| b.stage_b_score.cmp(&a.stage_b_score));

    let ranked: Vec<ScoredCandidate> = if config.pairwise_enabled && stage_b.len() > config.min_strong_links {
        pairwise_cohesion_filter(stage_b, config)
    } else {
        stage_b
    };

    ranked
        .into_iter()
        .take(config.limit)
        .map(|c| c.clean_name)
        .collect()
}

fn pairwise_cohesion_filter(
    survivors: Vec<ScoredCandidate>,
    config: &ResolverConfig,
) -> Vec<ScoredCandidate> {
    if survivors.len() <= 1 {
        return survivors;
    }

    let gamma_threshold = (config.gamma * 100.0) as u32;

    let mut with_links: Vec<(ScoredCandidate, usize)> = survivors
        .iter()
        .enumerate()
        .map(|(i, candidate)| {
            let strong_links = survivors
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .filter(|(_, other)| {
                    token_set_ratio(
                        &candidate.clean_name.to_lowercase(),
                        &other.clean_name.to_lowercase(),
                    ) >= gamma_threshold
                })
                .count();
            (candidate.clone(), strong_links)
        })
        .filter(|(_, strong_links)| *strong_links >= config.min_strong_links)
        .collect();

    with_links.sort_by(|(a, a_links), (b, b_links)| {
        b_links
            .cmp(a_links)
            .then_with(|| b.stage_b_score.cmp(&a.stage_b_score))
    });

    with_links.into_iter().map(|(candidate, _)| candidate).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates(names: &[&str]) -> Vec<TrigramCandidate> {
        names
            .iter()
            .map(|name| TrigramCandidate {
                clean_name: name.to_string(),
                similarity: Some(0.5),
            })
            .collect()
    }

    #[test]
    fn exact_match_is_returned_first() {
        let config = ResolverConfig::default();
        let result = resolve("jane tan", &candidates(&["jane tan", "jane tang"]), &config);
        assert_eq!(result.first(), Some(&"jane tan".to_string()));
    }

    #[test]
    fn low_scoring_candidates_are_dropped() {
        let config = ResolverConfig::default();
        let result = resolve("jane tan", &candidates(&["mohammed ali"]), &config);
        assert!(result.is_empty());
    }

    #[test]
    fn pairwise_filter_prefers_corroborated_candidates() {
        // "jane tan" and "jane tann" corroborate each other (typo cluster);
        // "janet an" is a distinct name with no corroboration.
        let config = ResolverConfig::default();
        let result = resolve(
            "jane tan",
            &candidates(&["jane tan", "jane tann", "janette"]),
            &config,
        );
        assert!(result.contains(&"jane tan".to_string()));
    }

    #[test]
    fn empty_input_is_a_valid_empty_result() {
        let config = ResolverConfig::default();
        let result = resolve("zzzz nonexistent", &candidates(&["jane tan"]), &config);
        assert!(result.is_empty());
    }

    #[test]
    fn respects_limit() {
        let mut config = ResolverConfig::default();
        config.limit = 1;
        config.pairwise_enabled = false;
        let result = resolve(
            "jane tan",
            &candidates(&["jane tan", "jane tans", "jane tanz"]),
            &config,
        );
        assert_eq!(result.len(), 1);
    }
}
