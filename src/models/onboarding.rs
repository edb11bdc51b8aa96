// src/models/onboarding.rs
use serde::{Deserialize, Serialize};

/// Onboarding screens in the order a new user walks through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OnboardingStep {
    PersonalInfo = 1,
    PersonalityTraits = 2,
    FavoriteBrands = 3,
    FavoriteColors = 4,
    Completed = 5,
}

impl OnboardingStep {
    pub fn number(self) -> u8 {
        self as u8
    }

    /// Maps a stored pointer value back to a step. Anything outside 1..=5 is `None`.
    pub fn from_number(n: i32) -> Option<Self> {
        match n {
            1 => Some(Self::PersonalInfo),
            2 => Some(Self::PersonalityTraits),
            3 => Some(Self::FavoriteBrands),
            4 => Some(Self::FavoriteColors),
            5 => Some(Self::Completed),
            _ => None,
        }
    }

    pub fn definition(self) -> &'static StepDefinition {
        // table is ordered by step number
        &STEP_DEFINITIONS[(self.number() - 1) as usize]
    }

    pub fn is_optional(self) -> bool {
        matches!(
            self,
            Self::PersonalityTraits | Self::FavoriteBrands | Self::FavoriteColors
        )
    }
}

/// Where the client should navigate next.
///
/// `ProfileRedirect` means "the user's own profile page". The resolver does not
/// know usernames, so the caller turns it into a concrete URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum NavigationTarget {
    Path { value: &'static str },
    ProfileRedirect,
}

impl NavigationTarget {
    pub fn path(&self) -> Option<&'static str> {
        match *self {
            NavigationTarget::Path { value } => Some(value),
            NavigationTarget::ProfileRedirect => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepDefinition {
    pub step: OnboardingStep,
    pub number: u8,
    pub skippable: bool,
    pub target: NavigationTarget,
}

impl StepDefinition {
    pub fn for_number(n: i32) -> Option<&'static StepDefinition> {
        OnboardingStep::from_number(n).map(OnboardingStep::definition)
    }
}

pub const STEP_DEFINITIONS: [StepDefinition; 5] = [
    StepDefinition {
        step: OnboardingStep::PersonalInfo,
        number: 1,
        skippable: false,
        target: NavigationTarget::Path { value: "/complete-profile" },
    },
    StepDefinition {
        step: OnboardingStep::PersonalityTraits,
        number: 2,
        skippable: true,
        target: NavigationTarget::Path { value: "/personality-traits" },
    },
    StepDefinition {
        step: OnboardingStep::FavoriteBrands,
        number: 3,
        skippable: true,
        target: NavigationTarget::Path { value: "/favorite-brands" },
    },
    StepDefinition {
        step: OnboardingStep::FavoriteColors,
        number: 4,
        skippable: true,
        target: NavigationTarget::Path { value: "/favorite-colors" },
    },
    StepDefinition {
        step: OnboardingStep::Completed,
        number: 5,
        skippable: true,
        target: NavigationTarget::ProfileRedirect,
    },
];

/// Read-only view of a user's onboarding progress, built from the `profiles` row.
///
/// Every field is optional: absent, `false` and `""` are kept distinct here
/// even though the resolver treats all of them as "not complete".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfileSnapshot {
    pub full_name: Option<String>,
    pub username: Option<String>,
    pub onboarding_step: Option<i32>,
    pub is_onboarded: Option<bool>,
    pub has_personality_traits: Option<bool>,
    pub has_favorite_brands: Option<bool>,
    pub has_favorite_colors: Option<bool>,
}

impl UserProfileSnapshot {
    /// Only the empty string counts as missing; whitespace is a (bad) name, not an absent one.
    pub fn has_full_name(&self) -> bool {
        self.full_name.as_deref().is_some_and(|n| !n.is_empty())
    }

    pub fn is_terminal(&self) -> bool {
        self.is_onboarded == Some(true)
            || self.onboarding_step == Some(OnboardingStep::Completed.number() as i32)
    }
}
