// hiveforge-orchestrator/src/ra/ambiguity_scorer.rs
// ============================================================================
// Module: Ambiguity Scorer
// Description: Pure text-to-AmbiguityScores mapping (§4.5.1).
// Dependencies: hiveforge_core::AmbiguityScores
// ============================================================================

use hiveforge_core::AmbiguityScores;

const VAGUE_TOKENS: &[&str] = &["suitably", "somehow", "nicely", "properly", "appropriately", "reasonably"];

const DEFAULT_RISK_KEYWORDS: &[&str] = &["authentication", "encryption", "payment", "database migration"];

/// Scores raw intake text into [`AmbiguityScores`] (§4.5.1). Pure: the same
/// text and `context_sufficiency` always produce the same scores.
pub struct AmbiguityScorer {
    risk_keywords: Vec<String>,
}

impl Default for AmbiguityScorer {
    fn default() -> Self {
        Self {
            risk_keywords: DEFAULT_RISK_KEYWORDS.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

impl AmbiguityScorer {
    /// Builds a scorer with a configurable execution-risk keyword set
    /// (§4.5.1 "a configurable set").
    #[must_use]
    pub fn new(risk_keywords: Vec<String>) -> Self {
        Self { risk_keywords }
    }

    /// Scores `text`, treating `context_sufficiency` as externally supplied
    /// (it defaults low pre-foraging and is raised by context enrichment).
    #[must_use]
    pub fn score(&self, text: &str, context_sufficiency: f64) -> AmbiguityScores {
        let lowered = text.to_lowercase();

        let vague_hits = VAGUE_TOKENS.iter().filter(|token| lowered.contains(*token)).count();
        let concrete_hits = concreteness_hits(text);

        let ambiguity = (0.3 + 0.15 * vague_hits as f64 - 0.1 * concrete_hits as f64).clamp(0.0, 1.0);

        let risk_hits = self.risk_keywords.iter().filter(|kw| lowered.contains(kw.as_str())).count();
        let execution_risk = (0.1 + 0.3 * risk_hits as f64).clamp(0.0, 1.0);

        AmbiguityScores::new(ambiguity, context_sufficiency, execution_risk)
    }
}

/// Counts concrete-language indicators: file paths, line numbers, and
/// command-line fragments (§4.5.1).
fn concreteness_hits(text: &str) -> usize {
    let has_file_path = text.split_whitespace().any(|word| word.contains('/') || word.contains('.') && word.len() > 2);
    let has_line_number = text.split_whitespace().any(|word| {
        let digits: String = word.chars().filter(char::is_ascii_digit).collect();
        !digits.is_empty() && word.chars().any(|c| c == ':' || c == '#')
    });
    let has_command_line = text.contains("--") || text.contains(" -");
    [has_file_path, has_line_number, has_command_line].into_iter().filter(|b| *b).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vague_language_raises_ambiguity() {
        let scorer = AmbiguityScorer::default();
        let vague = scorer.score("handle this suitably and somehow make it nice", 0.5);
        let concrete = scorer.score("fix src/main.rs:42 using cargo --release", 0.5);
        assert!(vague.ambiguity > concrete.ambiguity);
    }

    #[test]
    fn risk_keywords_raise_execution_risk() {
        let scorer = AmbiguityScorer::default();
        let scores = scorer.score("add payment processing to checkout", 0.9);
        assert!(scores.execution_risk > 0.1);
    }

    #[test]
    fn context_sufficiency_passes_through_clamped() {
        let scorer = AmbiguityScorer::default();
        let scores = scorer.score("anything", 1.5);
        assert!((scores.context_sufficiency - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn concrete_low_risk_high_context_reaches_instant_pass() {
        let scorer = AmbiguityScorer::default();
        let scores = scorer.score("pytest tests/ を実行してください", 0.9);
        assert!(scores.ambiguity < 0.3);
        assert_eq!(scores.analysis_path(), hiveforge_core::AnalysisPath::InstantPass);
    }
}
