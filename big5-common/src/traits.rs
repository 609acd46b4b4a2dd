//! Canonical Big Five trait and profile types
//!
//! The regressor emits one score per trait in the fixed order of [`Trait::ALL`].
//! Profiles are stored positionally in that order, so every profile holds
//! exactly the five canonical traits.

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Number of canonical traits (and regressor outputs)
pub const TRAIT_COUNT: usize = 5;

/// Score assigned to every trait by the neutral profile
pub const NEUTRAL_SCORE: f64 = 5.0;

/// Big Five personality dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Trait {
    Openness,
    Conscientiousness,
    Extraversion,
    Agreeableness,
    Neuroticism,
}

impl Trait {
    /// All traits in regressor output order
    pub const ALL: [Trait; TRAIT_COUNT] = [
        Trait::Openness,
        Trait::Conscientiousness,
        Trait::Extraversion,
        Trait::Agreeableness,
        Trait::Neuroticism,
    ];

    /// Position of this trait in the regressor output vector
    pub fn index(self) -> usize {
        match self {
            Trait::Openness => 0,
            Trait::Conscientiousness => 1,
            Trait::Extraversion => 2,
            Trait::Agreeableness => 3,
            Trait::Neuroticism => 4,
        }
    }

    /// Canonical capitalized name
    pub fn name(self) -> &'static str {
        match self {
            Trait::Openness => "Openness",
            Trait::Conscientiousness => "Conscientiousness",
            Trait::Extraversion => "Extraversion",
            Trait::Agreeableness => "Agreeableness",
            Trait::Neuroticism => "Neuroticism",
        }
    }
}

impl fmt::Display for Trait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Trait {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Trait::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::InvalidInput(format!("Unknown trait: {}", s)))
    }
}

impl Serialize for Trait {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Trait {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Round to two decimals, half away from zero
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Score for a single trait on the 0-10 scale plus its percentage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraitScore {
    pub score: f64,
    pub percentage: f64,
}

impl TraitScore {
    /// Build from an unrounded mean: `score = round(mean, 2)`,
    /// `percentage = round(score * 10, 2)`
    pub fn from_mean(mean: f64) -> Self {
        let score = round2(mean);
        Self {
            score,
            percentage: round2(score * 10.0),
        }
    }
}

/// Final per-trait scores for one prediction request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PersonalityProfile {
    scores: [TraitScore; TRAIT_COUNT],
}

impl PersonalityProfile {
    /// Build a profile from per-trait means in [`Trait::ALL`] order
    pub fn from_means(means: [f64; TRAIT_COUNT]) -> Self {
        Self {
            scores: means.map(TraitScore::from_mean),
        }
    }

    /// Neutral default profile (5.0 / 50% for every trait)
    pub fn neutral() -> Self {
        Self::from_means([NEUTRAL_SCORE; TRAIT_COUNT])
    }

    pub fn get(&self, t: Trait) -> TraitScore {
        self.scores[t.index()]
    }

    /// Iterate `(trait, score)` pairs in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (Trait, TraitScore)> + '_ {
        Trait::ALL.into_iter().map(move |t| (t, self.scores[t.index()]))
    }

    /// Mean of the five trait scores
    pub fn average_score(&self) -> f64 {
        self.scores.iter().map(|s| s.score).sum::<f64>() / TRAIT_COUNT as f64
    }

    /// Trait with the highest score (first one wins on ties)
    pub fn strongest(&self) -> (Trait, TraitScore) {
        self.iter()
            .fold(None, |best: Option<(Trait, TraitScore)>, cur| match best {
                Some(b) if b.1.score >= cur.1.score => Some(b),
                _ => Some(cur),
            })
            .unwrap_or((Trait::Openness, self.scores[0]))
    }

    /// Trait with the lowest score (first one wins on ties)
    pub fn weakest(&self) -> (Trait, TraitScore) {
        self.iter()
            .fold(None, |best: Option<(Trait, TraitScore)>, cur| match best {
                Some(b) if b.1.score <= cur.1.score => Some(b),
                _ => Some(cur),
            })
            .unwrap_or((Trait::Openness, self.scores[0]))
    }
}

impl Serialize for PersonalityProfile {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(TRAIT_COUNT))?;
        for (t, score) in self.iter() {
            map.serialize_entry(t.name(), &score)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for PersonalityProfile {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ProfileVisitor;

        impl<'de> Visitor<'de> for ProfileVisitor {
            type Value = PersonalityProfile;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map with exactly the five Big Five trait names")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut slots: [Option<TraitScore>; TRAIT_COUNT] = [None; TRAIT_COUNT];
                while let Some((t, score)) = access.next_entry::<Trait, TraitScore>()? {
                    if slots[t.index()].replace(score).is_some() {
                        return Err(de::Error::custom(format!("duplicate trait: {}", t)));
                    }
                }
                let mut scores = [TraitScore { score: 0.0, percentage: 0.0 }; TRAIT_COUNT];
                for t in Trait::ALL {
                    scores[t.index()] = slots[t.index()]
                        .ok_or_else(|| de::Error::custom(format!("missing trait: {}", t)))?;
                }
                Ok(PersonalityProfile { scores })
            }
        }

        deserializer.deserialize_map(ProfileVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trait_order_matches_index() {
        for (i, t) in Trait::ALL.iter().enumerate() {
            assert_eq!(t.index(), i);
        }
    }

    #[test]
    fn test_trait_parse_case_insensitive() {
        assert_eq!("openness".parse::<Trait>().unwrap(), Trait::Openness);
        assert_eq!(" NEUROTICISM ".parse::<Trait>().unwrap(), Trait::Neuroticism);
        assert!("Honesty".parse::<Trait>().is_err());
    }

    #[test]
    fn test_trait_score_rounding() {
        let s = TraitScore::from_mean(6.23456);
        assert_eq!(s.score, 6.23);
        assert_eq!(s.percentage, 62.3);
        assert_eq!(s.percentage, round2(s.score * 10.0));
    }

    #[test]
    fn test_neutral_profile() {
        let p = PersonalityProfile::neutral();
        for (_, s) in p.iter() {
            assert_eq!(s.score, 5.0);
            assert_eq!(s.percentage, 50.0);
        }
    }

    #[test]
    fn test_profile_serializes_as_trait_map() {
        let p = PersonalityProfile::from_means([1.0, 2.0, 3.0, 4.0, 5.0]);
        let json = serde_json::to_value(p).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 5);
        assert_eq!(json["Extraversion"]["score"], 3.0);
        assert_eq!(json["Neuroticism"]["percentage"], 50.0);

        let back: PersonalityProfile = serde_json::from_value(json).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn test_profile_rejects_missing_trait() {
        let json = serde_json::json!({
            "Openness": {"score": 1.0, "percentage": 10.0},
            "Conscientiousness": {"score": 1.0, "percentage": 10.0},
        });
        assert!(serde_json::from_value::<PersonalityProfile>(json).is_err());
    }

    #[test]
    fn test_strongest_and_weakest() {
        let p = PersonalityProfile::from_means([4.0, 8.5, 2.0, 6.0, 3.0]);
        assert_eq!(p.strongest().0, Trait::Conscientiousness);
        assert_eq!(p.weakest().0, Trait::Extraversion);
        assert!((p.average_score() - 4.7).abs() < 1e-9);
    }
}
