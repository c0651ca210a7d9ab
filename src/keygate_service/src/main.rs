use keygate_adapters::{
    PostgresResetRequestStore, PostgresUserStore, PostmarkEmailSender,
    config::{Settings, constants::prod},
};
use keygate_core::{Email, RandomCodeSource};
use keygate_service::{AccountService, configure_postgresql, init_tracing};
use reqwest::Client as HttpClient;
use secrecy::Secret;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    color_eyre::install().expect("Failed to install color_eyre");
    init_tracing().expect("Failed to initialize tracing");

    let settings = Settings::load()?;

    let pg_pool = configure_postgresql(&settings).await;
    let user_store = PostgresUserStore::new(pg_pool.clone());
    let reset_request_store = PostgresResetRequestStore::new(pg_pool);

    let http_client = HttpClient::builder()
        .timeout(prod::email_client::TIMEOUT)
        .build()?;
    let email_sender = PostmarkEmailSender::new(
        settings.email.base_url.clone(),
        Email::try_from(Secret::from(settings.email.sender.clone()))?,
        settings.email.auth_token.clone(),
        http_client,
    );

    let account_service = AccountService::new(
        user_store,
        reset_request_store,
        RandomCodeSource::new(),
        email_sender,
    );

    let allowed_origins = settings.allowed_origins();

    let listener = tokio::net::TcpListener::bind(&settings.app.address).await?;
    account_service
        .run_standalone(listener, allowed_origins)
        .await?;

    Ok(())
}
