use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

use crate::models::onboarding::{NavigationTarget, StepDefinition, UserProfileSnapshot};
use crate::services::onboarding_services::{
    calculate_completion_percentage, redirect_path, resolve_current_step, resolve_next_target,
};

/// Body for PUT /api/onboarding/step
#[derive(Deserialize, Debug)]
pub struct UpdateStepIn {
    pub step: i32,
}

/// What the client needs to route the user and draw the progress bar.
#[derive(Serialize, Debug)]
pub struct OnboardingStatusOut {
    pub next_target: NavigationTarget,
    /// `next_target` with the profile redirect already turned into a URL
    pub redirect_path: String,
    pub current_step: u8,
    pub completion_percentage: u8,
    pub is_onboarded: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

impl OnboardingStatusOut {
    pub fn from_snapshot(snapshot: &UserProfileSnapshot, updated_at: Option<DateTime<Utc>>) -> Self {
        let next_target = resolve_next_target(snapshot);
        Self {
            next_target,
            redirect_path: redirect_path(next_target, snapshot),
            current_step: resolve_current_step(snapshot),
            completion_percentage: calculate_completion_percentage(snapshot),
            is_onboarded: snapshot.is_terminal(),
            updated_at,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct StepsOut {
    pub steps: Vec<StepDefinition>,
    pub total: usize,
}
