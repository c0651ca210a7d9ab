use axum::{
    Router,
    http::{HeaderValue, Method, request},
    routing::post,
};
use keygate_adapters::config::AllowedOrigins;
use keygate_axum::{
    forgot_password, login, resend_verification, reset_password, signup, verify_email,
};
use keygate_core::{CodeSource, EmailSender, ResetRequestStore, UserStore};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::tracing::{make_span_with_request_id, on_request, on_response};

/// Account management service that provides all account-related routes
pub struct AccountService {
    router: Router,
}

impl AccountService {
    /// Create a new AccountService with the provided stores, code source and
    /// email sender
    ///
    /// # Note on Architecture
    /// Stores implement Clone via an internal Arc (or connection pool) for
    /// thread-safe sharing. Each route is given its specific state
    /// requirements, avoiding unnecessary cloning.
    pub fn new<U, R, C, E>(
        user_store: U,
        reset_request_store: R,
        code_source: C,
        email_sender: E,
    ) -> Self
    where
        U: UserStore + Clone + 'static,
        R: ResetRequestStore + Clone + 'static,
        C: CodeSource + Clone + 'static,
        E: EmailSender + Clone + 'static,
    {
        let router = Router::new()
            // Signup needs user store, code source, and email sender
            .route("/signup", post(signup::<U, C, E>))
            .with_state((
                user_store.clone(),
                code_source.clone(),
                email_sender.clone(),
            ))
            // Verify email only needs the user store
            .route("/verify-email", post(verify_email::<U>))
            .with_state(user_store.clone())
            // Resend verification issues a fresh code
            .route("/resend-verification", post(resend_verification::<U, C, E>))
            .with_state((
                user_store.clone(),
                code_source.clone(),
                email_sender.clone(),
            ))
            // Login only needs the user store
            .route("/login", post(login::<U>))
            .with_state(user_store.clone())
            // Forgot password writes a reset request and emails its code
            .route("/forgot-password", post(forgot_password::<U, R, C, E>))
            .with_state((
                user_store.clone(),
                reset_request_store.clone(),
                code_source,
                email_sender,
            ))
            // Reset password consumes the code and rotates the password
            .route("/reset-password", post(reset_password::<U, R>))
            .with_state((user_store, reset_request_store));

        Self { router }
    }

    fn with_trace_layer(mut self) -> Self {
        self.router = self.router.layer(
            TraceLayer::new_for_http()
                .make_span_with(make_span_with_request_id)
                .on_request(on_request)
                .on_response(on_response),
        );
        self
    }

    /// Convert the AccountService into a router that can be mounted on
    /// another application
    ///
    /// # Arguments
    /// * `allowed_origins` - Optional list of allowed CORS origins
    pub fn as_router(mut self, allowed_origins: Option<AllowedOrigins>) -> Router {
        if let Some(allowed_origins) = allowed_origins {
            let cors = CorsLayer::new()
                .allow_methods([Method::GET, Method::POST])
                .allow_credentials(true)
                .allow_origin(AllowOrigin::predicate(
                    move |origin: &HeaderValue, _request_parts: &request::Parts| {
                        allowed_origins.contains(origin)
                    },
                ));

            self.router = self.router.layer(cors);
        }
        self.with_trace_layer().router
    }

    /// Run the account service as a standalone server
    ///
    /// # Arguments
    /// * `listener` - TCP listener to bind the server to
    /// * `allowed_origins` - Optional list of allowed CORS origins
    pub async fn run_standalone(
        self,
        listener: TcpListener,
        allowed_origins: Option<AllowedOrigins>,
    ) -> Result<(), std::io::Error> {
        let router = self.as_router(allowed_origins);

        tracing::info!("Account service listening on {}", listener.local_addr()?);

        axum::serve(listener, router).await
    }
}
