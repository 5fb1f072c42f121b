use super::thresholds::Thresholds;
use serde::Serialize;
use std::fmt;

/// Qualitative reading of a combined 2D score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Effect {
    Stabilized,
    Destabilized,
    /// The shift is already present at the reference temperature, so it reflects a change in
    /// solubility or expression rather than in thermal stability.
    SolubilityOrExpression,
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Effect::Stabilized => "Stabilized",
            Effect::Destabilized => "Destabilized",
            Effect::SolubilityOrExpression => "Solubility/Expression",
        };
        write!(f, "{}", s)
    }
}

/// Labels a combined score.
///
/// `reference` holds the normalized ratios at the lowest temperature, one per concentration.
/// A zero or missing score carries no label.
pub fn classify(score: f64, reference: &[f64], thresholds: Thresholds) -> Option<Effect> {
    if score < 0.0 {
        if reference.iter().any(|&r| r < thresholds.min) {
            Some(Effect::SolubilityOrExpression)
        } else {
            Some(Effect::Destabilized)
        }
    } else if score > 0.0 {
        if reference.iter().any(|&r| r > thresholds.max) {
            Some(Effect::SolubilityOrExpression)
        } else {
            Some(Effect::Stabilized)
        }
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLDS: Thresholds = Thresholds::new(0.8, 1.2);

    #[test]
    fn positive_score_with_quiet_reference_is_stabilized() {
        let effect = classify(0.25, &[1.0, 1.1], THRESHOLDS);
        assert_eq!(effect, Some(Effect::Stabilized));
    }

    #[test]
    fn positive_score_with_elevated_reference_is_solubility_change() {
        let effect = classify(0.25, &[1.0, 1.5], THRESHOLDS);
        assert_eq!(effect, Some(Effect::SolubilityOrExpression));
    }

    #[test]
    fn negative_score_with_quiet_reference_is_destabilized() {
        let effect = classify(-0.25, &[0.9, 1.0], THRESHOLDS);
        assert_eq!(effect, Some(Effect::Destabilized));
    }

    #[test]
    fn negative_score_with_depleted_reference_is_solubility_change() {
        let effect = classify(-0.25, &[0.5, 1.0], THRESHOLDS);
        assert_eq!(effect, Some(Effect::SolubilityOrExpression));
    }

    #[test]
    fn zero_and_missing_scores_have_no_effect() {
        assert_eq!(classify(0.0, &[0.1, 5.0], THRESHOLDS), None);
        assert_eq!(classify(f64::NAN, &[0.1, 5.0], THRESHOLDS), None);
    }

    #[test]
    fn missing_reference_cells_are_ignored() {
        let effect = classify(0.5, &[f64::NAN, 1.0], THRESHOLDS);
        assert_eq!(effect, Some(Effect::Stabilized));
    }

    #[test]
    fn effect_names_match_report_labels() {
        assert_eq!(Effect::Stabilized.to_string(), "Stabilized");
        assert_eq!(Effect::Destabilized.to_string(), "Destabilized");
        assert_eq!(Effect::SolubilityOrExpression.to_string(), "Solubility/Expression");
    }
}
