//! Application layer for RetroChallenges.
//!
//! Use cases that coordinate the domain types in `rc-core` with the
//! filesystem, process and HTTP adapters in `rc-infrastructure`.

pub mod account_service;
pub mod completion_reporter;
pub mod launch_usecase;

pub use account_service::AccountService;
pub use completion_reporter::CompletionReporter;
pub use launch_usecase::{LaunchChallengeUseCase, LaunchError, LaunchPlan};
