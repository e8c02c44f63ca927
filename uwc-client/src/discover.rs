//! Client-side narrowing of the discover listing.

use uwc_shared::types::ProfileType;

use crate::models::Profile;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TypeFilter {
    #[default]
    All,
    Human,
    Ai,
}

impl TypeFilter {
    pub const ALL: [TypeFilter; 3] = [TypeFilter::All, TypeFilter::Human, TypeFilter::Ai];

    pub fn label(&self) -> &'static str {
        match self {
            TypeFilter::All => "ALL",
            TypeFilter::Human => "HUMAN",
            TypeFilter::Ai => "AI",
        }
    }

    fn matches(&self, profile_type: ProfileType) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Human => profile_type == ProfileType::Human,
            TypeFilter::Ai => profile_type == ProfileType::Ai,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InterestCategory {
    #[default]
    All,
    Tech,
    Art,
    Music,
    Science,
    Sports,
    Nature,
}

impl InterestCategory {
    pub const ALL: [InterestCategory; 7] = [
        InterestCategory::All,
        InterestCategory::Tech,
        InterestCategory::Art,
        InterestCategory::Music,
        InterestCategory::Science,
        InterestCategory::Sports,
        InterestCategory::Nature,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            InterestCategory::All => "All",
            InterestCategory::Tech => "Tech",
            InterestCategory::Art => "Art",
            InterestCategory::Music => "Music",
            InterestCategory::Science => "Science",
            InterestCategory::Sports => "Sports",
            InterestCategory::Nature => "Nature",
        }
    }

    /// Interest tags grouped under this category. Tags may appear in more
    /// than one category. `All` has none and matches every profile.
    pub fn tags(&self) -> &'static [&'static str] {
        match self {
            InterestCategory::All => &[],
            InterestCategory::Tech => &[
                "AI Research",
                "Quantum Physics",
                "Cybersecurity",
                "Game Dev",
                "UI Design",
                "Biotechnology",
                "Clean Energy",
            ],
            InterestCategory::Art => &["Digital Art", "Street Art", "Animation", "Photography"],
            InterestCategory::Music => &[
                "Synthwave",
                "Electronic Music",
                "Live Music",
                "Vinyl Records",
                "Piano",
                "Guitar",
                "Jazz",
            ],
            InterestCategory::Science => &[
                "Quantum Physics",
                "Astronomy",
                "Biotechnology",
                "Aerospace",
                "AI Research",
            ],
            InterestCategory::Sports => &[
                "Surfing",
                "Rock Climbing",
                "Martial Arts",
                "Skateboarding",
                "Trail Running",
                "Yoga",
                "Hiking",
            ],
            InterestCategory::Nature => &["Urban Farming", "Stargazing", "Hiking", "Astronomy"],
        }
    }

    fn matches(&self, interests: &[String]) -> bool {
        if *self == InterestCategory::All {
            return true;
        }
        let tags = self.tags();
        interests.iter().any(|i| tags.contains(&i.as_str()))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Highest compatibility score first; ties keep server order.
    #[default]
    Compatibility,
    /// Server order as returned.
    Newest,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Compatibility => SortOrder::Newest,
            SortOrder::Newest => SortOrder::Compatibility,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortOrder::Compatibility => "Top Matches",
            SortOrder::Newest => "Newest",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoverFilter {
    pub search: String,
    pub type_filter: TypeFilter,
    pub category: InterestCategory,
    pub sort: SortOrder,
}

impl DiscoverFilter {
    pub fn matches(&self, profile: &Profile) -> bool {
        self.matches_search(profile)
            && self.type_filter.matches(profile.profile_type)
            && self.category.matches(&profile.interests)
    }

    fn matches_search(&self, profile: &Profile) -> bool {
        if self.search.is_empty() {
            return true;
        }
        let needle = self.search.to_lowercase();
        let contains = |s: &str| s.to_lowercase().contains(&needle);

        contains(profile.display_name())
            || contains(profile.location())
            || profile.interests.iter().any(|i| contains(i))
    }

    pub fn apply(&self, profiles: &[Profile]) -> Vec<Profile> {
        let mut out: Vec<Profile> = profiles.iter().filter(|p| self.matches(p)).cloned().collect();
        if self.sort == SortOrder::Compatibility {
            // `sort_by` is stable.
            out.sort_by(|a, b| b.compatibility_score.cmp(&a.compatibility_score));
        }
        out
    }
}

pub fn results_label(count: usize) -> String {
    if count == 1 {
        "1 profile found".to_string()
    } else {
        format!("{count} profiles found")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn profile(
        name: &str,
        location: &str,
        interests: &[&str],
        kind: ProfileType,
        score: i32,
    ) -> Profile {
        Profile {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            display_name: Some(name.into()),
            age: Some(21),
            gender: None,
            bio: None,
            avatar_url: None,
            banner_url: None,
            location: Some(location.into()),
            looking_for: None,
            interests: interests.iter().map(|s| s.to_string()).collect(),
            profile_type: kind,
            compatibility_score: score,
            online_status: true,
            created_at: None,
            updated_at: None,
        }
    }

    fn sample() -> Vec<Profile> {
        vec![
            profile("Ava", "Seattle", &["Hiking", "Coffee"], ProfileType::Human, 70),
            profile("Nova", "Cloud", &["AI Research", "Jazz"], ProfileType::Ai, 95),
            profile("Ben", "Bellevue", &["Street Art"], ProfileType::Human, 70),
            profile("Kai", "Tacoma", &["Piano"], ProfileType::Ai, 40),
        ]
    }

    fn names(profiles: &[Profile]) -> Vec<&str> {
        profiles.iter().map(|p| p.display_name()).collect()
    }

    #[test]
    fn default_filter_sorts_by_score_stably() {
        let out = DiscoverFilter::default().apply(&sample());
        assert_eq!(names(&out), vec!["Nova", "Ava", "Ben", "Kai"]);
    }

    #[test]
    fn newest_keeps_server_order() {
        let filter = DiscoverFilter { sort: SortOrder::Newest, ..Default::default() };
        assert_eq!(names(&filter.apply(&sample())), vec!["Ava", "Nova", "Ben", "Kai"]);
    }

    #[test]
    fn search_is_case_insensitive_over_name_location_interests() {
        let mut filter = DiscoverFilter { search: "SEATTLE".into(), ..Default::default() };
        assert_eq!(names(&filter.apply(&sample())), vec!["Ava"]);

        filter.search = "jaz".into();
        assert_eq!(names(&filter.apply(&sample())), vec!["Nova"]);

        filter.search = "be".into();
        assert_eq!(names(&filter.apply(&sample())), vec!["Ben"]);
    }

    #[test]
    fn search_tolerates_missing_fields() {
        let mut p = profile("x", "y", &[], ProfileType::Human, 0);
        p.display_name = None;
        p.location = None;
        let filter = DiscoverFilter { search: "x".into(), ..Default::default() };
        assert!(!filter.matches(&p));
    }

    #[test]
    fn type_filter() {
        let filter = DiscoverFilter { type_filter: TypeFilter::Ai, ..Default::default() };
        assert_eq!(names(&filter.apply(&sample())), vec!["Nova", "Kai"]);

        let filter = DiscoverFilter { type_filter: TypeFilter::Human, ..Default::default() };
        assert_eq!(names(&filter.apply(&sample())), vec!["Ava", "Ben"]);
    }

    #[test]
    fn category_matches_any_listed_tag() {
        let filter = DiscoverFilter { category: InterestCategory::Music, ..Default::default() };
        assert_eq!(names(&filter.apply(&sample())), vec!["Nova", "Kai"]);

        let filter = DiscoverFilter { category: InterestCategory::Nature, ..Default::default() };
        assert_eq!(names(&filter.apply(&sample())), vec!["Ava"]);

        // Tag matching is exact, unlike search.
        let mut p = profile("Zed", "Here", &["hiking"], ProfileType::Human, 0);
        assert!(!InterestCategory::Sports.matches(&p.interests));
        p.interests = vec!["Hiking".into()];
        assert!(InterestCategory::Sports.matches(&p.interests));
    }

    #[test]
    fn filters_combine() {
        let filter = DiscoverFilter {
            search: "a".into(),
            type_filter: TypeFilter::Human,
            category: InterestCategory::Art,
            sort: SortOrder::Compatibility,
        };
        assert_eq!(names(&filter.apply(&sample())), vec!["Ben"]);
    }

    #[test]
    fn labels() {
        assert_eq!(results_label(1), "1 profile found");
        assert_eq!(results_label(0), "0 profiles found");
        assert_eq!(SortOrder::Compatibility.toggled(), SortOrder::Newest);
        assert_eq!(InterestCategory::ALL.len(), 7);
    }
}
