use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::onboarding::UserProfileSnapshot;

/// Columns of the `profiles` row that onboarding cares about.
/// `id` is the same uuid as `auth.users.id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfileRecord {
    pub id: Uuid,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub onboarding_step: Option<i32>,
    #[serde(default)]
    pub is_onboarded: Option<bool>,
    #[serde(default)]
    pub has_personality_traits: Option<bool>,
    #[serde(default)]
    pub has_favorite_brands: Option<bool>,
    #[serde(default)]
    pub has_favorite_colors: Option<bool>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// PostgREST `select=` list matching `UserProfileRecord`.
pub const PROFILE_COLUMNS: &str = "id,username,full_name,onboarding_step,is_onboarded,\
has_personality_traits,has_favorite_brands,has_favorite_colors,updated_at";

impl UserProfileRecord {
    pub fn snapshot(&self) -> UserProfileSnapshot {
        UserProfileSnapshot {
            full_name: self.full_name.clone(),
            username: self.username.clone(),
            onboarding_step: self.onboarding_step,
            is_onboarded: self.is_onboarded,
            has_personality_traits: self.has_personality_traits,
            has_favorite_brands: self.has_favorite_brands,
            has_favorite_colors: self.has_favorite_colors,
        }
    }
}

/// JWT claims carried by Supabase access tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    /// subject / user id
    pub sub: String,
    pub aud: Option<String>,
    pub exp: Option<u64>,
    pub iat: Option<u64>,
    pub role: Option<String>,
    pub email: Option<String>,
}
