pub mod mock_email_sender;
pub mod postmark_email_sender;

pub use mock_email_sender::{MockEmailSender, SentEmail, SentEmailKind};
pub use postmark_email_sender::PostmarkEmailSender;
