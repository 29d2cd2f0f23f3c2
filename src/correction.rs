//! Rating-driven correction of predicted labels.
//!
//! Two rules run in order:
//!
//! 1. A rating of 4 or 5 raises `aucun_probleme` and clears every other
//!    label except `retour_client`.
//! 2. A rating of 1, 2 or 3 with no raised label raises `autre_probleme`.
//!
//! [`LabelCorrector::correct`] is pure and idempotent.

use crate::record::{Label, LabelSet, LabeledReview};

/// Labels untouched by the high-rating rule.
const HIGH_RATING_EXEMPT: [Label; 2] = [Label::RetourClient, Label::AucunProbleme];

#[derive(Debug, Clone, Copy, Default)]
pub struct LabelCorrector;

impl LabelCorrector {
    pub fn new() -> Self {
        LabelCorrector
    }

    /// Apply both rules to one label set.
    pub fn correct(&self, labels: LabelSet, rating: i64) -> LabelSet {
        let mut corrected = labels;

        if matches!(rating, 4 | 5) {
            corrected.set(Label::AucunProbleme, true);
            for label in Label::ALL {
                if !HIGH_RATING_EXEMPT.contains(&label) {
                    corrected.set(label, false);
                }
            }
        }

        if matches!(rating, 1..=3) && corrected.count() == 0 {
            corrected.set(Label::AutreProbleme, true);
        }

        corrected
    }

    /// Correct every review in place.
    pub fn correct_all(&self, reviews: &mut [LabeledReview]) {
        for review in reviews {
            review.labels = self.correct(review.labels, review.record.rating);
        }
    }
}
