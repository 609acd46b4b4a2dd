//! Qualitative trait labels
//!
//! Scores arrive on the 0-10 profile scale and are banded on the unit scale
//! (`score / 10`): low below 0.4, medium below 0.7, high otherwise.

use big5_common::traits::TRAIT_COUNT;
use big5_common::{PersonalityProfile, Trait};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

const LOW_UPPER: f64 = 0.4;
const MEDIUM_UPPER: f64 = 0.7;

/// Interpretation band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TraitLevel {
    Low,
    Medium,
    High,
}

impl TraitLevel {
    /// Band a unit-scale (0-1) score
    pub fn from_unit(unit: f64) -> Self {
        if unit < LOW_UPPER {
            TraitLevel::Low
        } else if unit < MEDIUM_UPPER {
            TraitLevel::Medium
        } else {
            TraitLevel::High
        }
    }

    /// Band a profile-scale (0-10) score
    pub fn from_score(score: f64) -> Self {
        Self::from_unit(score / 10.0)
    }
}

fn label(t: Trait, level: TraitLevel) -> &'static str {
    match (t, level) {
        (Trait::Openness, TraitLevel::Low) => "Prefers routine and familiar experiences",
        (Trait::Openness, TraitLevel::Medium) => "Balanced approach to new experiences",
        (Trait::Openness, TraitLevel::High) => "Very open to new ideas and experiences",
        (Trait::Conscientiousness, TraitLevel::Low) => "Spontaneous and flexible",
        (Trait::Conscientiousness, TraitLevel::Medium) => "Moderately organized and reliable",
        (Trait::Conscientiousness, TraitLevel::High) => "Highly organized and disciplined",
        (Trait::Extraversion, TraitLevel::Low) => "Reserved and introspective",
        (Trait::Extraversion, TraitLevel::Medium) => "Balanced social engagement",
        (Trait::Extraversion, TraitLevel::High) => "Outgoing and energetic",
        (Trait::Agreeableness, TraitLevel::Low) => "Direct and competitive",
        (Trait::Agreeableness, TraitLevel::Medium) => "Cooperative when needed",
        (Trait::Agreeableness, TraitLevel::High) => "Warm and compassionate",
        (Trait::Neuroticism, TraitLevel::Low) => "Emotionally stable and calm",
        (Trait::Neuroticism, TraitLevel::Medium) => "Moderate emotional sensitivity",
        (Trait::Neuroticism, TraitLevel::High) => "Emotionally reactive and sensitive",
    }
}

/// Label for a 0-10 trait score
pub fn interpret(t: Trait, score: f64) -> &'static str {
    label(t, TraitLevel::from_score(score))
}

/// Labels for every trait of a profile, serialized as `{trait: label}`
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileInterpretation {
    labels: [&'static str; TRAIT_COUNT],
}

impl ProfileInterpretation {
    pub fn from_profile(profile: &PersonalityProfile) -> Self {
        Self {
            labels: Trait::ALL.map(|t| interpret(t, profile.get(t).score)),
        }
    }

    pub fn get(&self, t: Trait) -> &'static str {
        self.labels[t.index()]
    }
}

impl Serialize for ProfileInterpretation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(TRAIT_COUNT))?;
        for t in Trait::ALL {
            map.serialize_entry(t.name(), self.labels[t.index()])?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_band_boundaries() {
        assert_eq!(TraitLevel::from_unit(0.0), TraitLevel::Low);
        assert_eq!(TraitLevel::from_unit(0.399), TraitLevel::Low);
        assert_eq!(TraitLevel::from_unit(0.4), TraitLevel::Medium);
        assert_eq!(TraitLevel::from_unit(0.699), TraitLevel::Medium);
        assert_eq!(TraitLevel::from_unit(0.7), TraitLevel::High);
        assert_eq!(TraitLevel::from_unit(1.0), TraitLevel::High);
    }

    #[test]
    fn test_profile_scale_is_divided_by_ten() {
        assert_eq!(interpret(Trait::Openness, 3.99), "Prefers routine and familiar experiences");
        assert_eq!(interpret(Trait::Openness, 4.0), "Balanced approach to new experiences");
        assert_eq!(interpret(Trait::Openness, 7.0), "Very open to new ideas and experiences");
    }

    #[test]
    fn test_three_distinct_labels_per_trait() {
        for t in Trait::ALL {
            let labels: std::collections::HashSet<_> =
                [1.0, 5.0, 9.0].iter().map(|s| interpret(t, *s)).collect();
            assert_eq!(labels.len(), 3, "{t}");
        }
    }

    #[test]
    fn test_profile_interpretation_serializes_all_traits() {
        let profile = PersonalityProfile::from_means([2.0, 5.0, 8.0, 6.9, 7.0]);
        let interp = ProfileInterpretation::from_profile(&profile);
        assert_eq!(interp.get(Trait::Agreeableness), "Cooperative when needed");
        let json = serde_json::to_value(&interp).unwrap();
        assert_eq!(json.as_object().unwrap().len(), 5);
        assert_eq!(json["Neuroticism"], "Emotionally reactive and sensitive");
        assert_eq!(json["Conscientiousness"], "Moderately organized and reliable");
    }
}
