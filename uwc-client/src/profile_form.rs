//! Editable model behind the "my profile" page.

use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use uwc_shared::types::ProfileType;

use crate::error::{ClientError, ClientResult};
use crate::models::{Profile, ProfileUpdate};

pub const DEFAULT_AGE: i32 = 20;
pub const MIN_AGE: i32 = 18;
pub const MAX_AGE: i32 = 99;
pub const MAX_INTERESTS: usize = 8;
pub const MAX_BIO_CHARS: usize = 300;
pub const MAX_DISPLAY_NAME_CHARS: usize = 30;
pub const MAX_LOCATION_CHARS: usize = 50;
pub const MAX_INTEREST_CHARS: usize = 25;

pub const GENDER_OPTIONS: [&str; 5] =
    ["Male", "Female", "Non-binary", "Other", "Prefer not to say"];

pub const LOOKING_FOR_OPTIONS: [&str; 10] = [
    "Genuine Connection",
    "Long-term Relationship",
    "Something Casual",
    "Friends First",
    "Study Buddy",
    "Adventure Partner",
    "Someone Fun",
    "Creative Spark",
    "My Person",
    "Something Real",
];

pub const SUGGESTED_INTERESTS: [&str; 27] = [
    "Coding", "Coffee", "Hiking", "Gaming", "Music", "Photography",
    "Cooking", "Anime", "Art", "Dance", "Movies", "Reading",
    "Basketball", "Skateboarding", "Yoga", "Travel", "Ramen",
    "Board Games", "K-dramas", "Bubble Tea", "Memes", "Fashion",
    "Guitar", "Piano", "Volunteering", "Podcasts", "Stargazing",
];

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some("Display name is required".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Validate)]
pub struct ProfileForm {
    #[validate(custom = "not_blank")]
    pub display_name: String,
    #[validate(range(min = 18, max = 99, message = "Age must be between 18 and 99"))]
    pub age: i32,
    pub gender: String,
    #[validate(length(max = 300, message = "Bio must be at most 300 characters"))]
    pub bio: String,
    pub avatar_url: String,
    pub location: String,
    pub looking_for: String,
    #[validate(length(max = 8, message = "Pick up to 8 interests"))]
    pub interests: Vec<String>,
}

impl Default for ProfileForm {
    fn default() -> Self {
        Self {
            display_name: String::new(),
            age: DEFAULT_AGE,
            gender: String::new(),
            bio: String::new(),
            avatar_url: String::new(),
            location: String::new(),
            looking_for: String::new(),
            interests: Vec::new(),
        }
    }
}

fn truncate_chars(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}

impl ProfileForm {
    /// Pre-fills the form from a stored row; blanks and a zero age fall back to defaults.
    pub fn from_profile(profile: &Profile) -> Self {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        Self {
            display_name: text(&profile.display_name),
            age: profile.age.filter(|a| *a != 0).unwrap_or(DEFAULT_AGE),
            gender: text(&profile.gender),
            bio: text(&profile.bio),
            avatar_url: text(&profile.avatar_url),
            location: text(&profile.location),
            looking_for: text(&profile.looking_for),
            interests: profile.interests.clone(),
        }
    }

    pub fn set_display_name(&mut self, value: &str) {
        self.display_name = truncate_chars(value, MAX_DISPLAY_NAME_CHARS);
    }

    pub fn set_age(&mut self, age: i32) {
        self.age = age.clamp(MIN_AGE, MAX_AGE);
    }

    pub fn set_bio(&mut self, value: &str) {
        self.bio = truncate_chars(value, MAX_BIO_CHARS);
    }

    pub fn set_location(&mut self, value: &str) {
        self.location = truncate_chars(value, MAX_LOCATION_CHARS);
    }

    /// Selecting the current choice again clears it.
    pub fn toggle_looking_for(&mut self, option: &str) {
        if self.looking_for == option {
            self.looking_for.clear();
        } else {
            self.looking_for = option.to_string();
        }
    }

    /// Removes a selected interest, or adds it while under the cap.
    pub fn toggle_interest(&mut self, interest: &str) {
        if let Some(pos) = self.interests.iter().position(|i| i == interest) {
            self.interests.remove(pos);
        } else if self.interests.len() < MAX_INTERESTS {
            self.interests.push(interest.to_string());
        }
    }

    /// Adds a free-text interest. Returns false when it is blank, already
    /// present, or the list is full.
    pub fn add_interest(&mut self, interest: &str) -> bool {
        let trimmed = truncate_chars(interest.trim(), MAX_INTEREST_CHARS);
        if trimmed.is_empty()
            || self.interests.contains(&trimmed)
            || self.interests.len() >= MAX_INTERESTS
        {
            return false;
        }
        self.interests.push(trimmed);
        true
    }

    pub fn can_add_interest(&self) -> bool {
        self.interests.len() < MAX_INTERESTS
    }

    /// Suggestions not yet picked.
    pub fn remaining_suggestions(&self) -> Vec<&'static str> {
        SUGGESTED_INTERESTS
            .iter()
            .copied()
            .filter(|s| !self.interests.iter().any(|i| i == s))
            .collect()
    }

    /// Validates and builds the save payload for `user_id`.
    pub fn to_update(&self, user_id: Uuid) -> ClientResult<ProfileUpdate> {
        self.validate()
            .map_err(|e| ClientError::Validation(first_message(&e)))?;

        Ok(ProfileUpdate {
            user_id,
            display_name: Some(self.display_name.trim().to_string()),
            age: Some(self.age),
            gender: Some(self.gender.clone()),
            bio: Some(self.bio.trim().to_string()),
            avatar_url: Some(self.avatar_url.trim().to_string()),
            banner_url: None,
            location: Some(self.location.trim().to_string()),
            looking_for: Some(self.looking_for.clone()),
            interests: Some(self.interests.clone()),
            profile_type: Some(ProfileType::Human),
            online_status: Some(true),
        })
    }
}

fn first_message(errors: &ValidationErrors) -> String {
    // Report fields in form order.
    const ORDER: [&str; 4] = ["display_name", "age", "bio", "interests"];
    let fields = errors.field_errors();

    ORDER
        .iter()
        .filter_map(|name| fields.get(name))
        .flat_map(|errs| errs.iter())
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| errors.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let form = ProfileForm::default();
        assert_eq!(form.age, 20);
        assert!(form.display_name.is_empty());
        assert!(form.interests.is_empty());
    }

    #[test]
    fn display_name_required() {
        let mut form = ProfileForm::default();
        form.set_display_name("   ");
        let err = form.to_update(Uuid::new_v4()).unwrap_err();
        assert_eq!(err.to_string(), "Display name is required");
    }

    #[test]
    fn payload_is_trimmed_human_and_online() {
        let user = Uuid::new_v4();
        let mut form = ProfileForm::default();
        form.set_display_name("  Ava ");
        form.set_bio(" hi ");

        let update = form.to_update(user).unwrap();
        assert_eq!(update.user_id, user);
        assert_eq!(update.display_name.as_deref(), Some("Ava"));
        assert_eq!(update.bio.as_deref(), Some("hi"));
        assert_eq!(update.age, Some(20));
        assert_eq!(update.profile_type, Some(ProfileType::Human));
        assert_eq!(update.online_status, Some(true));
        assert_eq!(update.banner_url, None);
    }

    #[test]
    fn age_is_clamped() {
        let mut form = ProfileForm::default();
        form.set_age(5);
        assert_eq!(form.age, 18);
        form.set_age(150);
        assert_eq!(form.age, 99);
        form.set_age(42);
        assert_eq!(form.age, 42);
    }

    #[test]
    fn out_of_range_age_fails_validation() {
        let form = ProfileForm { display_name: "Ava".into(), age: 17, ..Default::default() };
        let err = form.to_update(Uuid::new_v4()).unwrap_err();
        assert_eq!(err.to_string(), "Age must be between 18 and 99");
    }

    #[test]
    fn bio_capped_at_300_chars() {
        let mut form = ProfileForm::default();
        form.set_bio(&"é".repeat(400));
        assert_eq!(form.bio.chars().count(), 300);
    }

    #[test]
    fn interests_capped_at_eight_without_duplicates() {
        let mut form = ProfileForm::default();
        for s in SUGGESTED_INTERESTS.iter().take(10) {
            form.toggle_interest(s);
        }
        assert_eq!(form.interests.len(), 8);
        assert!(!form.can_add_interest());
        assert!(!form.add_interest("Sailing"));

        form.toggle_interest("Coding");
        assert_eq!(form.interests.len(), 7);
        assert!(!form.add_interest("Coffee"));
        assert!(!form.add_interest("   "));
        assert!(form.add_interest("  Sailing  "));
        assert_eq!(form.interests.last().map(String::as_str), Some("Sailing"));
    }

    #[test]
    fn suggestions_exclude_picked() {
        let mut form = ProfileForm::default();
        form.toggle_interest("Coffee");
        let remaining = form.remaining_suggestions();
        assert_eq!(remaining.len(), SUGGESTED_INTERESTS.len() - 1);
        assert!(!remaining.contains(&"Coffee"));
    }

    #[test]
    fn looking_for_toggles() {
        let mut form = ProfileForm::default();
        form.toggle_looking_for("Study Buddy");
        assert_eq!(form.looking_for, "Study Buddy");
        form.toggle_looking_for("Study Buddy");
        assert!(form.looking_for.is_empty());
    }

    #[test]
    fn loads_from_profile_with_fallbacks() {
        let profile = Profile {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            display_name: Some("Ava".into()),
            age: Some(0),
            gender: None,
            bio: None,
            avatar_url: None,
            banner_url: None,
            location: Some("Seattle".into()),
            looking_for: None,
            interests: vec!["Coffee".into()],
            profile_type: ProfileType::Human,
            compatibility_score: 0,
            online_status: true,
            created_at: None,
            updated_at: None,
        };
        let form = ProfileForm::from_profile(&profile);
        assert_eq!(form.age, DEFAULT_AGE);
        assert_eq!(form.location, "Seattle");
        assert_eq!(form.interests, vec!["Coffee".to_string()]);
    }
}
