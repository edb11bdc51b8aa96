pub mod onboarding_handlers;
