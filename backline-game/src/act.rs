//! Performing acts as handed to the engine by the booking layer.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Inline tag storage; most acts carry only a handful of subgenres or tags.
pub type TagSet = SmallVec<[String; 4]>;

/// Named characteristic of an act, e.g. "Straight Edge" or "Road Veterans".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActTrait {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Canonical symbolic tags, matched exactly (ignoring case). The name and
    /// description are always searched as well, by substring.
    #[serde(default)]
    pub tags: TagSet,
}

impl ActTrait {
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            tags: TagSet::new(),
        }
    }

    #[must_use]
    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Case-insensitive match of a lowercase needle against this trait.
    fn mentions(&self, needle: &str) -> bool {
        if self.tags.iter().any(|tag| tag.eq_ignore_ascii_case(needle)) {
            return true;
        }
        self.name.to_lowercase().contains(needle) || self.description.to_lowercase().contains(needle)
    }
}

/// Snapshot of a band as seen by one show resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Act {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub genre: String,
    #[serde(default)]
    pub subgenres: TagSet,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub authenticity: f64,
    #[serde(default)]
    pub energy: f64,
    #[serde(default)]
    pub technical_skill: f64,
    #[serde(default)]
    pub traits: Vec<ActTrait>,
    #[serde(default)]
    pub formed_year: Option<i32>,
}

impl Act {
    /// Create an act with neutral (50) attributes.
    #[must_use]
    pub fn new(id: impl Into<String>, genre: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            genre: genre.into(),
            subgenres: TagSet::new(),
            popularity: 50.0,
            authenticity: 50.0,
            energy: 50.0,
            technical_skill: 50.0,
            traits: Vec::new(),
            formed_year: None,
        }
    }

    #[must_use]
    pub fn with_subgenres<I, T>(mut self, subgenres: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.subgenres = subgenres.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub const fn with_stats(
        mut self,
        popularity: f64,
        authenticity: f64,
        energy: f64,
        technical_skill: f64,
    ) -> Self {
        self.popularity = popularity;
        self.authenticity = authenticity;
        self.energy = energy;
        self.technical_skill = technical_skill;
        self
    }

    #[must_use]
    pub fn with_trait(mut self, act_trait: ActTrait) -> Self {
        self.traits.push(act_trait);
        self
    }

    #[must_use]
    pub const fn formed_in(mut self, year: i32) -> Self {
        self.formed_year = Some(year);
        self
    }

    /// Years since formation relative to `current_year`, never negative.
    #[must_use]
    pub fn years_active(&self, current_year: i32) -> i32 {
        self.formed_year
            .map_or(0, |formed| current_year.saturating_sub(formed).max(0))
    }

    /// Whether any trait mentions one of the keywords (case-insensitive).
    #[must_use]
    pub fn has_trait_keyword(&self, keywords: &[&str]) -> bool {
        keywords.iter().any(|keyword| {
            let needle = keyword.to_lowercase();
            self.traits.iter().any(|t| t.mentions(&needle))
        })
    }

    /// Whether this act satisfies a synergy rule's act-side tag.
    ///
    /// Genre and subgenres match exactly (ignoring case); traits match by
    /// explicit tag or by substring of their name or description.
    #[must_use]
    pub fn matches_tag(&self, tag: &str) -> bool {
        if self.genre.eq_ignore_ascii_case(tag)
            || self.subgenres.iter().any(|s| s.eq_ignore_ascii_case(tag))
        {
            return true;
        }
        let needle = tag.to_lowercase();
        self.traits.iter().any(|t| t.mentions(&needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_tag_checks_genre_subgenre_and_traits() {
        let act = Act::new("a", "Punk")
            .with_subgenres(["hardcore"])
            .with_trait(ActTrait::new("DIY Ethic", "Booked their own basement tours"));
        assert!(act.matches_tag("punk"));
        assert!(act.matches_tag("HARDCORE"));
        assert!(act.matches_tag("basement"));
        assert!(act.matches_tag("diy"));
        assert!(!act.matches_tag("jazz"));
        assert!(!act.matches_tag("core"), "subgenres match exactly");
    }

    #[test]
    fn explicit_trait_tags_match_exactly() {
        let act = Act::new("a", "indie")
            .with_trait(ActTrait::new("Quiet Types", "").with_tags(["acoustic"]));
        assert!(act.matches_tag("Acoustic"));
        assert!(act.has_trait_keyword(&["acoustic"]));
    }

    #[test]
    fn tags_do_not_suppress_free_text_matching() {
        let act = Act::new("a", "punk")
            .with_trait(ActTrait::new("Party Animals", "Last out of the bar").with_tags(["sober"]));
        assert!(act.matches_tag("sober"));
        assert!(act.matches_tag("party"));
        assert!(act.has_trait_keyword(&["party"]));
    }

    #[test]
    fn years_active_never_negative() {
        let act = Act::new("a", "rock").formed_in(2030);
        assert_eq!(act.years_active(2024), 0);
        assert_eq!(Act::new("b", "rock").formed_in(2014).years_active(2024), 10);
        assert_eq!(Act::new("c", "rock").years_active(2024), 0);
    }

    #[test]
    fn act_deserializes_with_defaults() {
        let json = r#"{"id": "x", "genre": "metal", "popularity": 80}"#;
        let act: Act = serde_json::from_str(json).unwrap();
        assert_eq!(act.id, "x");
        assert!((act.popularity - 80.0).abs() < f64::EPSILON);
        assert!(act.traits.is_empty());
        assert!(act.formed_year.is_none());
    }
}
