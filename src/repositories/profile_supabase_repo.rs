// src/repositories/profile_supabase_repo.rs
use log::debug;
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use thiserror::Error;
use urlencoding::encode;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::models::onboarding::OnboardingStep;
use crate::models::user::{UserProfileRecord, PROFILE_COLUMNS};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("supabase error: {0}")]
    Supabase(String),
    #[error("not found")]
    NotFound,
    #[error("profile changed since it was read")]
    Conflict,
}

/// Repository for the `profiles` table via Supabase (PostgREST)
#[derive(Clone)]
pub struct ProfileSupabaseRepo {
    client: Client,
    base_rest_url: String,    // e.g. https://xyz.supabase.co/rest/v1
    service_role_key: String, // server-only
    anon_key: Option<String>,
}

impl ProfileSupabaseRepo {
    pub fn new(client: Client, config: &AppConfig) -> Self {
        Self {
            client,
            base_rest_url: config.rest_base_url(),
            service_role_key: config.supabase_service_role_key.clone(),
            anon_key: config.supabase_anon_key.clone(),
        }
    }

    fn profiles_url(&self) -> String {
        format!("{}/profiles", self.base_rest_url.trim_end_matches('/'))
    }

    fn by_id_url(&self, user_id: Uuid) -> String {
        format!(
            "{}?id=eq.{}&select={}",
            self.profiles_url(),
            encode(&user_id.to_string()),
            PROFILE_COLUMNS
        )
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        // apikey is the project key; the bearer token decides the role
        let apikey = self.anon_key.as_deref().unwrap_or(&self.service_role_key);
        req.header("apikey", apikey)
            .header("Authorization", format!("Bearer {}", self.service_role_key))
            .header("Content-Type", "application/json")
    }

    /// Loads the onboarding view of a user's profile row.
    pub async fn fetch_user_profile(&self, user_id: Uuid) -> Result<UserProfileRecord, RepoError> {
        let url = self.by_id_url(user_id);
        debug!("fetching profile {}", user_id);

        let resp = self.authorized(self.client.get(&url)).send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(RepoError::Supabase(format!("{} -> {}", status.as_u16(), text)));
        }

        first_row(&text)
    }

    /// Moves the stored onboarding pointer from `current` to `step`. Returns the updated row.
    ///
    /// The PATCH only matches while the row still holds `current`, so a concurrent
    /// move between read and write comes back as `RepoError::Conflict`.
    pub async fn update_onboarding_step(
        &self,
        user_id: Uuid,
        current: Option<i32>,
        step: OnboardingStep,
        is_onboarded: bool,
    ) -> Result<UserProfileRecord, RepoError> {
        #[derive(Serialize)]
        struct Payload {
            onboarding_step: i32,
            is_onboarded: bool,
        }

        let payload = Payload {
            onboarding_step: step.number() as i32,
            is_onboarded,
        };

        let guard = match current {
            Some(n) => format!("eq.{}", n),
            None => "is.null".to_string(),
        };
        let url = format!("{}&onboarding_step={}", self.by_id_url(user_id), guard);
        debug!("updating onboarding step for {} {:?} -> {:?}", user_id, current, step);

        let resp = self
            .authorized(self.client.patch(&url))
            .header("Prefer", "return=representation")
            .json(&payload)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(RepoError::Supabase(format!("{} -> {}", status.as_u16(), text)));
        }

        // no matching row: either deleted or the pointer moved underneath us
        first_row(&text).map_err(|e| match e {
            RepoError::NotFound => RepoError::Conflict,
            other => other,
        })
    }
}

fn first_row(body: &str) -> Result<UserProfileRecord, RepoError> {
    let rows: Vec<UserProfileRecord> = serde_json::from_str(body)?;
    rows.into_iter().next().ok_or(RepoError::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::test_support::{PostgrestStub, USER_ID};

    fn repo(url: &str) -> ProfileSupabaseRepo {
        let cfg = AppConfig::from_lookup(|key| match key {
            "SUPABASE_URL" => Some(url.to_string()),
            "SUPABASE_SERVICE_ROLE_KEY" => Some("service-key".to_string()),
            _ => None,
        })
        .unwrap();
        ProfileSupabaseRepo::new(Client::new(), &cfg)
    }

    #[test]
    fn builds_filtered_profile_url() {
        let id = Uuid::parse_str("5b0c2f4e-8a51-4c8e-9d1e-2f3a4b5c6d7e").unwrap();
        let url = repo("https://xyz.supabase.co").by_id_url(id);
        assert!(url.starts_with("https://xyz.supabase.co/rest/v1/profiles?id=eq.5b0c2f4e-"));
        assert!(url.contains("select=id,username,full_name,onboarding_step"));
    }

    #[test]
    fn empty_result_is_not_found() {
        assert!(matches!(first_row("[]"), Err(RepoError::NotFound)));
    }

    #[test]
    fn garbage_body_is_serde_error() {
        assert!(matches!(first_row("{\"message\":\"oops\"}"), Err(RepoError::Serde(_))));
    }

    fn user_id() -> Uuid {
        Uuid::parse_str(USER_ID).unwrap()
    }

    fn stub_repo(stub: &PostgrestStub) -> ProfileSupabaseRepo {
        ProfileSupabaseRepo::new(Client::new(), &stub.config())
    }

    #[actix_web::test]
    async fn fetch_missing_row_is_not_found() {
        let stub = PostgrestStub::start(None).await;
        let res = stub_repo(&stub).fetch_user_profile(user_id()).await;
        assert!(matches!(res, Err(RepoError::NotFound)));
        stub.stop().await;
    }

    #[actix_web::test]
    async fn update_sends_guarded_patch() {
        let stub = PostgrestStub::start(Some(json!({
            "id": USER_ID,
            "full_name": "Ana",
            "onboarding_step": 3
        })))
        .await;

        let rec = stub_repo(&stub)
            .update_onboarding_step(user_id(), Some(3), OnboardingStep::FavoriteColors, false)
            .await
            .unwrap();
        assert_eq!(rec.onboarding_step, Some(4));
        assert_eq!(rec.is_onboarded, Some(false));

        let patches = stub.patches();
        let patch = &patches[0];
        assert_eq!(patch.body, json!({"onboarding_step": 4, "is_onboarded": false}));
        assert_eq!(patch.prefer.as_deref(), Some("return=representation"));
        assert_eq!(patch.filters.get("id").cloned(), Some(format!("eq.{}", USER_ID)));
        assert_eq!(patch.filters.get("onboarding_step").map(String::as_str), Some("eq.3"));
        stub.stop().await;
    }

    #[actix_web::test]
    async fn update_after_concurrent_move_is_conflict() {
        let stub = PostgrestStub::start(Some(json!({
            "id": USER_ID,
            "full_name": "Ana",
            "onboarding_step": 3
        })))
        .await;
        let repo = stub_repo(&stub);

        // both requests read pointer 2; the row already moved on to 3
        let res = repo
            .update_onboarding_step(user_id(), Some(2), OnboardingStep::FavoriteBrands, false)
            .await;
        assert!(matches!(res, Err(RepoError::Conflict)));
        assert_eq!(stub.row().unwrap()["onboarding_step"], 3);

        let res = repo
            .update_onboarding_step(user_id(), None, OnboardingStep::Completed, true)
            .await;
        assert!(matches!(res, Err(RepoError::Conflict)));
        stub.stop().await;
    }

    #[actix_web::test]
    async fn apikey_falls_back_to_service_key() {
        let stub = PostgrestStub::start(Some(json!({ "id": USER_ID, "full_name": "Ana" }))).await;
        let mut config = stub.config();
        config.supabase_anon_key = None;
        let repo = ProfileSupabaseRepo::new(Client::new(), &config);

        repo.update_onboarding_step(user_id(), None, OnboardingStep::PersonalityTraits, false)
            .await
            .unwrap();
        assert_eq!(stub.patches()[0].apikey.as_deref(), Some("service-key"));
        stub.stop().await;
    }

    #[test]
    fn first_row_is_returned() {
        let body = r#"[{"id":"5b0c2f4e-8a51-4c8e-9d1e-2f3a4b5c6d7e","full_name":"Ana","onboarding_step":2}]"#;
        let rec = first_row(body).unwrap();
        assert_eq!(rec.full_name.as_deref(), Some("Ana"));
        assert_eq!(rec.onboarding_step, Some(2));
    }
}
