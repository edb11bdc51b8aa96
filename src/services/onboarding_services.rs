// src/services/onboarding_services.rs
//! Onboarding step resolution.
//!
//! Navigation follows the stored `onboarding_step` pointer; progress display
//! follows the completion flags. The two are computed independently and can
//! disagree, e.g. a user with an unset pointer is sent to their profile while
//! the progress bar still shows step 3.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use urlencoding::encode;

use crate::models::onboarding::{
    NavigationTarget, OnboardingStep, StepDefinition, UserProfileSnapshot,
};

/// Denominator for the completion percentage: personal info plus the three
/// optional preference steps. Username is not counted.
pub const TOTAL_STEPS: u8 = 4;

/// Fallback page when the profile redirect cannot be turned into `/@username`.
pub const GENERIC_PROFILE_PATH: &str = "/profile";

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.]{3,30}$").expect("username pattern is valid"));

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OnboardingError {
    #[error("invalid onboarding step: {0}")]
    InvalidStep(i32),
    #[error("step {0:?} cannot be skipped")]
    StepNotSkippable(OnboardingStep),
    #[error("onboarding already completed")]
    AlreadyCompleted,
}

/// Where a returning or in-progress user should land.
pub fn resolve_next_target(snapshot: &UserProfileSnapshot) -> NavigationTarget {
    if snapshot.is_terminal() {
        return NavigationTarget::ProfileRedirect;
    }

    // step 1 is enforced no matter what the stored pointer says
    if !snapshot.has_full_name() {
        return OnboardingStep::PersonalInfo.definition().target;
    }

    match snapshot.onboarding_step.and_then(StepDefinition::for_number) {
        Some(def) if def.step.is_optional() => def.target,
        _ => NavigationTarget::ProfileRedirect,
    }
}

/// Step number (1..=5) for progress indicators, from the completion flags.
pub fn resolve_current_step(snapshot: &UserProfileSnapshot) -> u8 {
    let step = if !snapshot.has_full_name() {
        OnboardingStep::PersonalInfo
    } else if snapshot.has_personality_traits != Some(true) {
        OnboardingStep::PersonalityTraits
    } else if snapshot.has_favorite_brands != Some(true) {
        OnboardingStep::FavoriteBrands
    } else if snapshot.has_favorite_colors != Some(true) {
        OnboardingStep::FavoriteColors
    } else {
        OnboardingStep::Completed
    };
    step.number()
}

pub fn calculate_completion_percentage(snapshot: &UserProfileSnapshot) -> u8 {
    let completed = [
        snapshot.has_full_name(),
        snapshot.has_personality_traits == Some(true),
        snapshot.has_favorite_brands == Some(true),
        snapshot.has_favorite_colors == Some(true),
    ]
    .iter()
    .filter(|done| **done)
    .count();

    (completed as f64 / TOTAL_STEPS as f64 * 100.0).round() as u8
}

pub fn next_step_after(step: OnboardingStep) -> OnboardingStep {
    match step {
        OnboardingStep::PersonalInfo => OnboardingStep::PersonalityTraits,
        OnboardingStep::PersonalityTraits => OnboardingStep::FavoriteBrands,
        OnboardingStep::FavoriteBrands => OnboardingStep::FavoriteColors,
        OnboardingStep::FavoriteColors | OnboardingStep::Completed => OnboardingStep::Completed,
    }
}

/// Where the stored pointer moves when the user skips the screen they are on.
pub fn skip_from(snapshot: &UserProfileSnapshot) -> Result<OnboardingStep, OnboardingError> {
    if snapshot.is_terminal() {
        return Err(OnboardingError::AlreadyCompleted);
    }
    if !snapshot.has_full_name() {
        return Err(OnboardingError::StepNotSkippable(OnboardingStep::PersonalInfo));
    }

    match snapshot.onboarding_step.and_then(OnboardingStep::from_number) {
        Some(step) if step.definition().skippable => Ok(next_step_after(step)),
        // no pointer means the resolver already sends this user to their profile
        _ => Ok(OnboardingStep::Completed),
    }
}

/// Values written to (`onboarding_step`, `is_onboarded`) for a requested step.
/// Step 1 is derived from `full_name` and is never stored as a pointer target.
/// Finished users cannot be moved back, and nobody gets past step 1 without a name.
pub fn step_update_for(
    snapshot: &UserProfileSnapshot,
    requested: i32,
) -> Result<(OnboardingStep, bool), OnboardingError> {
    let step = match OnboardingStep::from_number(requested) {
        Some(OnboardingStep::PersonalInfo) | None => {
            return Err(OnboardingError::InvalidStep(requested));
        }
        Some(step) => step,
    };

    if snapshot.is_terminal() {
        return Err(OnboardingError::AlreadyCompleted);
    }
    if !snapshot.has_full_name() {
        return Err(OnboardingError::StepNotSkippable(OnboardingStep::PersonalInfo));
    }

    Ok((step, step == OnboardingStep::Completed))
}

/// Concrete URL for `NavigationTarget::ProfileRedirect`.
pub fn profile_path(username: Option<&str>) -> String {
    match username.map(str::trim) {
        Some(name) if USERNAME_RE.is_match(name) => format!("/@{}", encode(name)),
        _ => GENERIC_PROFILE_PATH.to_string(),
    }
}

/// Resolves a target into the path the client should actually open.
pub fn redirect_path(target: NavigationTarget, snapshot: &UserProfileSnapshot) -> String {
    target
        .path()
        .map(String::from)
        .unwrap_or_else(|| profile_path(snapshot.username.as_deref()))
}
