//! # Keygate - Account Management Service Library
//!
//! This is a facade crate that re-exports all public APIs from the keygate components.
//! Use this crate to get access to all account-management functionality in one place.
//!
//! ## Usage
//!
//! Add to your `Cargo.toml`:
//! ```toml
//! [dependencies]
//! keygate = { path = "../keygate" }
//! ```
//!
//! ## Structure
//!
//! - **Core domain types**: `Email`, `Password`, `OneTimeCode`, `User`, etc.
//! - **Repository traits**: `UserStore`, `ResetRequestStore`
//! - **Use cases**: `SignupUseCase`, `LoginUseCase`, `ConfirmPasswordResetUseCase`, etc.
//! - **Adapters**: `PostgresUserStore`, `PostmarkEmailSender`, etc.
//! - **Service**: `AccountService` - The main entry point for the account service

// ============================================================================
// Core Domain Types
// ============================================================================

/// Core domain types and value objects
pub mod core {
    pub use keygate_core::*;
}

// Re-export most commonly used core types at the root level
pub use keygate_core::{
    Email, EmailParseError, NewUser, OneTimeCode, OneTimeCodeError, Password, PasswordPolicyError,
    PasswordResetRequest, User, VerifiedOutcome,
};

// ============================================================================
// Repository Traits (Ports)
// ============================================================================

/// Repository trait definitions
pub mod repositories {
    pub use keygate_core::{ResetRequestStore, ResetRequestStoreError, UserStore, UserStoreError};
}

// Re-export ports at root level
pub use keygate_core::{
    CodeSource, EmailSendError, EmailSender, RandomCodeSource, ResetRequestStore,
    ResetRequestStoreError, UserStore, UserStoreError,
};

// ============================================================================
// Use Cases (Application Layer)
// ============================================================================

/// Application use cases
pub mod use_cases {
    pub use keygate_application::*;
}

// Re-export use cases at root level
pub use keygate_application::{
    ConfirmPasswordResetUseCase, LoginUseCase, RequestPasswordResetUseCase,
    ResendVerificationUseCase, SignupUseCase, VerifyEmailUseCase,
};

// ============================================================================
// Adapters (Infrastructure)
// ============================================================================

/// Infrastructure adapters
pub mod adapters {
    /// HTTP route handlers
    pub mod http {
        pub use keygate_axum::*;
    }

    /// Persistence implementations
    pub mod persistence {
        pub use keygate_adapters::persistence::*;
    }

    /// Email sender implementations
    pub mod email {
        pub use keygate_adapters::email::*;
    }

    /// Configuration
    pub mod config {
        pub use keygate_adapters::config::*;
    }
}

// Re-export commonly used adapters at root level
pub use keygate_adapters::{
    email::{MockEmailSender, PostmarkEmailSender},
    persistence::{
        HashMapResetRequestStore, HashMapUserStore, PostgresResetRequestStore, PostgresUserStore,
    },
};

// ============================================================================
// Account Service (Main Entry Point)
// ============================================================================

/// Main account service
pub use keygate_service::{AccountService, configure_postgresql, get_postgres_pool, init_tracing};

// ============================================================================
// Re-export common external dependencies
// ============================================================================

/// Re-export async-trait for implementing repository traits
pub use async_trait::async_trait;

/// Re-export secrecy for working with secrets
pub use secrecy::{ExposeSecret, Secret};

pub use http;
