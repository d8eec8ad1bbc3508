use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

pub mod resetcode;

use crate::{conf::settings, prelude::Result};

pub trait SendEmail {
    fn send(&self, email: &str) -> Result<()>;
}

fn deliver(
    recipient: &str,
    subject: &str,
    body: String,
    is_html: bool,
) -> std::result::Result<(), String> {
    let content_type = if is_html {
        ContentType::TEXT_HTML
    } else {
        ContentType::TEXT_PLAIN
    };
    let from = format!("{} <{}>", &settings.service_name, &settings.from_email)
        .parse()
        .map_err(|e| format!("bad sender address: {e}"))?;
    let to = recipient
        .parse()
        .map_err(|e| format!("bad recipient address: {e}"))?;
    let message = Message::builder()
        .from(from)
        .to(to)
        .subject(subject)
        .header(content_type)
        .body(body)
        .map_err(|e| format!("could not build message: {e}"))?;

    let creds = Credentials::new(settings.smtp_user.clone(), settings.smtp_pass.clone());
    let mailer = SmtpTransport::relay(&settings.smtp_server)
        .map_err(|e| format!("bad smtp relay: {e}"))?
        .credentials(creds)
        .build();
    mailer.send(&message).map_err(|e| format!("send failed: {e}"))?;
    Ok(())
}

/// Fire-and-forget delivery. SMTP happens on a blocking worker and
/// failures are logged, not surfaced, so slow mail never holds a request
/// open.
pub fn send_email(email: &str, subject: &str, body: &str, is_html: bool) -> Result<()> {
    let email = email.to_string();
    let subject = subject.to_string();
    let body = body.to_string();
    tracing::debug!("sending email to {}", &email);
    tokio::spawn(async move {
        let recipient = email.clone();
        let result =
            tokio::task::spawn_blocking(move || deliver(&email, &subject, body, is_html)).await;
        match result {
            Ok(Ok(())) => tracing::info!("email delivered to {}", &recipient),
            Ok(Err(e)) => tracing::error!("could not send email to {}: {}", &recipient, e),
            Err(e) => tracing::error!("email task failed to execute: {e:?}"),
        }
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[traced_test]
    #[tokio::test]
    async fn send_returns_without_waiting_for_delivery() {
        // delivery runs on a background task; the caller never blocks on SMTP
        assert!(send_email("someone@example.edu", "hello", "body", false).is_ok());
    }
}
