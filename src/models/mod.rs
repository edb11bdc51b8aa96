pub mod onboarding;
pub mod user;
