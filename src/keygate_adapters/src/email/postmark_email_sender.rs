use reqwest::{Client, StatusCode, Url};
use secrecy::{ExposeSecret, Secret};

use keygate_core::{Email, EmailSender, EmailSendError, OneTimeCode, PasswordResetRequest};

use crate::config::constants::VERIFICATION_CODE_TTL_MINUTES;

#[derive(Clone)]
pub struct PostmarkEmailSender {
    http_client: Client,
    base_url: String,
    sender: Email,
    authorization_token: Secret<String>,
}

impl PostmarkEmailSender {
    pub fn new(
        base_url: String,
        sender: Email,
        authorization_token: Secret<String>,
        http_client: Client,
    ) -> Self {
        Self {
            http_client,
            base_url,
            sender,
            authorization_token,
        }
    }

    async fn send(
        &self,
        recipient: &Email,
        subject: &str,
        body: &str,
    ) -> Result<(), EmailSendError> {
        let base = Url::parse(&self.base_url).map_err(|e| EmailSendError::Other(e.to_string()))?;
        let url = base
            .join("/email")
            .map_err(|e| EmailSendError::Other(e.to_string()))?;

        let request_body = SendEmailRequest {
            from: self.sender.as_ref().expose_secret(),
            to: recipient.as_ref().expose_secret(),
            subject,
            text_body: body,
            message_stream: MESSAGE_STREAM,
        };

        let response = self
            .http_client
            .post(url)
            .header(
                POSTMARK_AUTH_HEADER,
                self.authorization_token.expose_secret(),
            )
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    EmailSendError::Connection
                } else {
                    EmailSendError::Other(e.to_string())
                }
            })?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(EmailSendError::Auth),
            StatusCode::UNPROCESSABLE_ENTITY => Err(EmailSendError::InvalidRecipient),
            status => Err(EmailSendError::Other(format!(
                "provider returned {status}"
            ))),
        }
    }
}

#[async_trait::async_trait]
impl EmailSender for PostmarkEmailSender {
    #[tracing::instrument(name = "Sending verification email", skip_all)]
    async fn send_verification(
        &self,
        recipient: &Email,
        code: OneTimeCode,
    ) -> Result<(), EmailSendError> {
        let body = format!(
            "Thank you for signing up! Your verification code is {code}.\n\
             This code will expire in {VERIFICATION_CODE_TTL_MINUTES} minutes.\n\
             If you didn't create an account, you can safely ignore this email.",
        );
        self.send(recipient, "Verify your email address", &body).await
    }

    #[tracing::instrument(name = "Sending password reset email", skip_all)]
    async fn send_password_reset(
        &self,
        recipient: &Email,
        code: OneTimeCode,
    ) -> Result<(), EmailSendError> {
        let body = format!(
            "Your password reset code is {code}.\n\
             This code is valid for {} minutes.\n\
             If you didn't request a password reset, you can safely ignore this email.",
            PasswordResetRequest::VALID_FOR_MINUTES,
        );
        self.send(recipient, "Password reset code", &body).await
    }
}

const MESSAGE_STREAM: &str = "outbound";
const POSTMARK_AUTH_HEADER: &str = "X-Postmark-Server-Token";

#[derive(serde::Serialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text_body: &'a str,
    message_stream: &'a str,
}
