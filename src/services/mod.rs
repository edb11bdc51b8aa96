pub mod onboarding_services;
