//! Category scorer.
//!
//! Scores accumulate per category from keyword occurrences, title boosts,
//! and bonus rules; the highest score wins. Ties go to the category declared
//! first in [`Category::ALL`], and an all-zero card falls back to
//! [`Category::FALLBACK`].

use triage_shared::{Category, RulesConfig};

/// Compiled scoring rules. Phrases are stored lowercase.
#[derive(Debug, Clone)]
pub struct Scorer {
    title_boost: u32,
    keywords: Vec<(Category, Vec<String>)>,
    bonuses: Vec<Bonus>,
}

#[derive(Debug, Clone)]
struct Bonus {
    category: Category,
    triggers: Vec<String>,
    bonus: u32,
}

/// Per-category scores for one document and the resulting category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreCard {
    scores: [u32; Category::ALL.len()],
    category: Category,
}

impl ScoreCard {
    /// Winning category.
    pub fn category(&self) -> Category {
        self.category
    }

    pub fn score(&self, category: Category) -> u32 {
        self.scores[category.index()]
    }

    /// Whether any rule fired at all.
    pub fn is_empty(&self) -> bool {
        self.scores.iter().all(|s| *s == 0)
    }

    /// Non-zero scores, highest first (ties in declaration order).
    pub fn ranked(&self) -> Vec<(Category, u32)> {
        let mut ranked: Vec<_> = Category::ALL
            .into_iter()
            .map(|c| (c, self.score(c)))
            .filter(|(_, s)| *s > 0)
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }
}

impl Scorer {
    pub fn new(rules: &RulesConfig) -> Self {
        let keywords = rules
            .keywords
            .iter()
            .map(|rule| {
                let phrases = rule.phrases.iter().map(|p| p.to_lowercase()).collect();
                (rule.category, phrases)
            })
            .collect();

        let bonuses = rules
            .bonuses
            .iter()
            .map(|rule| Bonus {
                category: rule.category,
                triggers: rule.triggers.iter().map(|t| t.to_lowercase()).collect(),
                bonus: rule.bonus,
            })
            .collect();

        Self {
            title_boost: rules.title_boost,
            keywords,
            bonuses,
        }
    }

    /// Score a document from its title and description.
    pub fn score(&self, title: &str, description: &str) -> ScoreCard {
        let search_text = format!("{title} {description}").to_lowercase();
        let title_text = title.to_lowercase();

        let mut scores = [0u32; Category::ALL.len()];

        for (category, phrases) in &self.keywords {
            let slot = &mut scores[category.index()];
            for phrase in phrases {
                let hits = u32::try_from(search_text.matches(phrase.as_str()).count()).unwrap_or(u32::MAX);
                *slot = slot.saturating_add(hits);
                if title_text.contains(phrase.as_str()) {
                    *slot = slot.saturating_add(self.title_boost);
                }
            }
        }

        for bonus in &self.bonuses {
            if bonus.triggers.iter().any(|t| search_text.contains(t.as_str())) {
                let slot = &mut scores[bonus.category.index()];
                *slot = slot.saturating_add(bonus.bonus);
            }
        }

        ScoreCard {
            category: pick_winner(&scores),
            scores,
        }
    }
}

/// First category with the maximum score; fallback when everything is zero.
fn pick_winner(scores: &[u32; Category::ALL.len()]) -> Category {
    let mut best = Category::FALLBACK;
    let mut best_score = 0;
    for category in Category::ALL {
        let score = scores[category.index()];
        if score > best_score {
            best = category;
            best_score = score;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use triage_shared::{BonusRule, KeywordRule};

    use super::*;

    fn scorer() -> Scorer {
        Scorer::new(&RulesConfig::default())
    }

    #[test]
    fn crash_with_assertion_is_bug() {
        let card = scorer().score(
            "Crash on invalid SIMD shuffle",
            "Binaryen aborts with an assertion failure when given malformed input",
        );
        assert_eq!(card.category(), Category::Bug);
        // crash (1 + 5 title), assert, abort, +10 bonus
        assert_eq!(card.score(Category::Bug), 18);
        // invalid (1 + 5), valid (1 + 5)
        assert_eq!(card.score(Category::SpecCompliance), 12);
    }

    #[test]
    fn no_keywords_defaults_to_feature() {
        let card = scorer().score("Hmm", "Nothing here matches anything whatsoever");
        assert!(card.is_empty());
        assert_eq!(card.category(), Category::Feature);
    }

    #[test]
    fn title_boost_applies_once_per_phrase() {
        let card = scorer().score("typo typo", "");
        // two occurrences in search text + one title boost
        assert_eq!(card.score(Category::Docs), 7);
        assert_eq!(card.category(), Category::Docs);
    }

    #[test]
    fn validator_bonus_favors_spec_compliance() {
        let card = scorer().score("Validator rejects module", "The validator rejects it.");
        assert_eq!(card.score(Category::SpecCompliance), 5);
        assert_eq!(card.category(), Category::SpecCompliance);
    }

    #[test]
    fn ties_break_in_declaration_order() {
        let rules = RulesConfig {
            title_boost: 0,
            keywords: vec![
                KeywordRule {
                    category: Category::Docs,
                    phrases: vec!["alpha".into()],
                },
                KeywordRule {
                    category: Category::Optimization,
                    phrases: vec!["beta".into()],
                },
            ],
            bonuses: vec![],
        };
        let card = Scorer::new(&rules).score("", "alpha beta");
        assert_eq!(card.score(Category::Docs), 1);
        assert_eq!(card.score(Category::Optimization), 1);
        assert_eq!(card.category(), Category::Optimization);
    }

    #[test]
    fn alternate_rule_set_is_honored() {
        let rules = RulesConfig {
            title_boost: 1,
            keywords: vec![KeywordRule {
                category: Category::Meta,
                phrases: vec!["ROADMAP".into()],
            }],
            bonuses: vec![BonusRule {
                category: Category::Api,
                triggers: vec!["sdk".into()],
                bonus: 4,
            }],
        };
        let card = Scorer::new(&rules).score("Roadmap", "sdk");
        assert_eq!(card.score(Category::Meta), 2);
        assert_eq!(card.score(Category::Api), 4);
        assert_eq!(card.category(), Category::Api);
    }

    #[test]
    fn large_weights_saturate() {
        let rules = RulesConfig {
            title_boost: u32::MAX,
            keywords: vec![KeywordRule {
                category: Category::Docs,
                phrases: vec!["readme".into()],
            }],
            bonuses: vec![BonusRule {
                category: Category::Docs,
                triggers: vec!["readme".into()],
                bonus: u32::MAX,
            }],
        };
        let card = Scorer::new(&rules).score("README typo", "readme readme");
        assert_eq!(card.score(Category::Docs), u32::MAX);
        assert_eq!(card.category(), Category::Docs);
    }

    #[test]
    fn ranked_orders_by_score() {
        let card = scorer().score(
            "Crash on invalid SIMD shuffle",
            "Binaryen aborts with an assertion failure when given malformed input",
        );
        let ranked = card.ranked();
        assert_eq!(ranked[0], (Category::Bug, 18));
        assert_eq!(ranked[1], (Category::SpecCompliance, 12));
    }

    #[test]
    fn scoring_is_deterministic() {
        let s = scorer();
        let a = s.score("Slow inlining", "Inlining is slow and the benchmark regressed");
        let b = s.score("Slow inlining", "Inlining is slow and the benchmark regressed");
        assert_eq!(a, b);
    }
}
