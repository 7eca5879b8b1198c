use openmemory_core::constants::sector_weight;
use openmemory_core::memory::Sector;
use openmemory_core::models::Classification;
use openmemory_core::traits::Classifier;

use crate::patterns::COMPILED;

/// Regex-pattern classifier per §4.3: sum `matches * sector_weight` across
/// an ordered set of patterns per sector, pick the top scorer as primary
/// (ties broken by `Sector::ALL` declaration order), and derive additional
/// sectors and a confidence estimate from the score gap to the runner-up.
#[derive(Debug, Default, Clone, Copy)]
pub struct PatternClassifier;

impl PatternClassifier {
    pub fn new() -> Self {
        Self
    }

    fn score(&self, text: &str) -> [f64; 5] {
        let mut scores = [0.0f64; 5];
        for compiled in COMPILED.iter() {
            let matches: usize = compiled.regexes.iter().map(|re| re.find_iter(text).count()).sum();
            if matches > 0 {
                let idx = openmemory_core::constants::sector_index(compiled.sector);
                scores[idx] = matches as f64 * sector_weight(compiled.sector);
            }
        }
        scores
    }
}

impl Classifier for PatternClassifier {
    fn classify(&self, text: &str, explicit_sector: Option<&str>) -> Classification {
        if let Some(s) = explicit_sector.and_then(|s| s.parse::<Sector>().ok()) {
            return Classification::single(s, 1.0);
        }

        let scores = self.score(text);

        let mut ranked: Vec<(Sector, f64)> =
            Sector::ALL.iter().map(|&s| (s, scores[openmemory_core::constants::sector_index(s)])).collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let (primary, primary_score) = ranked[0];
        if primary_score == 0.0 {
            return Classification::single(Sector::Semantic, 0.2);
        }

        let second_score = ranked.get(1).map(|(_, s)| *s).unwrap_or(0.0);
        let confidence = (primary_score / (primary_score + second_score + 1.0)).min(1.0);

        let threshold = (0.3 * primary_score).max(1.0);
        let additional: Vec<Sector> =
            ranked.iter().skip(1).filter(|(_, score)| *score >= threshold).map(|(s, _)| *s).collect();

        Classification { primary, additional, confidence }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn episodic_text_classifies_episodic() {
        let c = PatternClassifier::new();
        let out = c.classify("Yesterday we visited Paris and saw the Eiffel Tower", None);
        assert_eq!(out.primary, Sector::Episodic);
    }

    #[test]
    fn procedural_text_classifies_procedural() {
        let c = PatternClassifier::new();
        let out = c.classify("How to install the CLI: step 1, run the installer", None);
        assert_eq!(out.primary, Sector::Procedural);
    }

    #[test]
    fn emotional_text_classifies_emotional() {
        let c = PatternClassifier::new();
        let out = c.classify("I feel so happy and grateful today", None);
        assert_eq!(out.primary, Sector::Emotional);
    }

    #[test]
    fn no_pattern_match_defaults_to_semantic_low_confidence() {
        let c = PatternClassifier::new();
        let out = c.classify("xk12 qzt 09", None);
        assert_eq!(out.primary, Sector::Semantic);
        assert_eq!(out.confidence, 0.2);
    }

    #[test]
    fn explicit_sector_hint_overrides_regex_path() {
        let c = PatternClassifier::new();
        let out = c.classify("Yesterday we visited Paris", Some("procedural"));
        assert_eq!(out.primary, Sector::Procedural);
        assert_eq!(out.confidence, 1.0);
    }

    #[test]
    fn confidence_is_bounded() {
        let c = PatternClassifier::new();
        let out = c.classify("I think, in hindsight, I should have remembered how to install it yesterday", None);
        assert!(out.confidence >= 0.0 && out.confidence <= 1.0);
    }
}
