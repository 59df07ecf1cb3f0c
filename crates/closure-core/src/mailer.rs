//! SMTP delivery over lettre's async transport.
//!
//! Batches go out one message at a time in input order. A failed recipient
//! is recorded and the loop moves on.

use crate::compose;
use crate::config::SmtpSettings;
use crate::error::{ClosureError, Result};
use crate::jira::JiraClient;
use crate::types::{BatchReport, EmailJob, SendResult, Ticket};
use lettre::message::header::ContentType;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

pub const SKIP_NO_ASSIGNEE: &str = "No assignee";
pub const SKIP_NO_EMAIL: &str = "No assignee email";

fn mailbox(address: &str) -> Result<Mailbox> {
    address
        .trim()
        .parse()
        .map_err(|_| ClosureError::InvalidAddress(address.to_string()))
}

pub struct Mailer<T = AsyncSmtpTransport<Tokio1Executor>> {
    transport: T,
    from: Mailbox,
}

impl Mailer {
    /// Relay from settings: implicit TLS on 465, opportunistic STARTTLS
    /// elsewhere. Credentials are always sent.
    pub fn smtp(settings: &SmtpSettings) -> Result<Self> {
        let smtp_err = |e: lettre::transport::smtp::Error| ClosureError::Mail(e.to_string());
        let builder = if settings.implicit_tls() {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host).map_err(smtp_err)?
        } else {
            let tls = TlsParameters::new(settings.host.clone()).map_err(smtp_err)?;
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.host)
                .tls(Tls::Opportunistic(tls))
        };
        let transport = builder
            .port(settings.port)
            .credentials(Credentials::new(
                settings.user.clone(),
                settings.password.clone(),
            ))
            .build();
        Ok(Self {
            transport,
            from: mailbox(&settings.from)?,
        })
    }
}

impl<T> Mailer<T>
where
    T: AsyncTransport + Send + Sync,
    T::Error: std::fmt::Display,
{
    pub fn with_transport(transport: T, from: &str) -> Result<Self> {
        Ok(Self {
            transport,
            from: mailbox(from)?,
        })
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn build(&self, job: &EmailJob) -> Result<Message> {
        if job.to.is_empty() {
            return Err(ClosureError::Validation(
                "email needs at least one recipient".to_string(),
            ));
        }
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(job.subject.as_str());
        for to in &job.to {
            builder = builder.to(mailbox(to)?);
        }
        for cc in &job.cc {
            builder = builder.cc(mailbox(cc)?);
        }
        let message = match &job.html {
            Some(html) => builder.multipart(MultiPart::alternative_plain_html(
                job.text.clone(),
                html.clone(),
            )),
            None => builder
                .header(ContentType::TEXT_PLAIN)
                .body(job.text.clone()),
        };
        message.map_err(|e| ClosureError::Mail(e.to_string()))
    }

    pub async fn send(&self, job: &EmailJob) -> Result<()> {
        let message = self.build(job)?;
        self.transport
            .send(message)
            .await
            .map_err(|e| ClosureError::Mail(e.to_string()))?;
        tracing::info!(to = %job.to.join(","), subject = %job.subject, "mail sent");
        Ok(())
    }

    async fn attempt(&self, key: &str, job: &EmailJob) -> SendResult {
        match self.send(job).await {
            Ok(()) => SendResult::sent(key, &job.to.join(",")),
            Err(e) => {
                tracing::warn!(%key, error = %e, "notification failed");
                SendResult::failed(key, e.to_string())
            }
        }
    }

    /// One "missing release version" mail per ticket assignee.
    pub async fn notify_developers(
        &self,
        tickets: &[Ticket],
        release_version: Option<&str>,
        base_url: &str,
    ) -> BatchReport {
        let mut results = Vec::with_capacity(tickets.len());
        for ticket in tickets {
            if ticket.assignee_name().is_none() {
                tracing::warn!(key = %ticket.key, "skipping ticket without assignee");
                results.push(SendResult::skipped(&ticket.key, SKIP_NO_ASSIGNEE));
                continue;
            }
            let Some(to) = ticket
                .assignee_email
                .as_deref()
                .map(str::trim)
                .filter(|e| !e.is_empty())
            else {
                tracing::warn!(key = %ticket.key, "skipping assignee without email");
                results.push(SendResult::skipped(&ticket.key, SKIP_NO_EMAIL));
                continue;
            };
            let job = compose::developer_notification(ticket, to, release_version, base_url);
            results.push(self.attempt(&ticket.key, &job).await);
        }
        BatchReport::new(results)
    }

    /// Look each key up in the tracker and mail its assignee. Lookup
    /// failures are recorded against the key like send failures.
    pub async fn notify_issue_assignees(&self, jira: &JiraClient, keys: &[String]) -> BatchReport {
        let mut results = Vec::with_capacity(keys.len());
        for key in keys {
            let issue = match jira.issue(key, &["assignee", "summary"]).await {
                Ok(issue) => issue,
                Err(e) => {
                    tracing::warn!(%key, error = %e, "issue lookup failed");
                    results.push(SendResult::failed(key, format!("Failed to fetch issue {key}: {e}")));
                    continue;
                }
            };
            let assignee = issue.fields.assignee.as_ref();
            let Some(to) = assignee
                .and_then(|a| a.email_address.as_deref())
                .filter(|e| !e.trim().is_empty())
            else {
                results.push(SendResult::failed(key, format!("No assignee email for issue {key}")));
                continue;
            };
            let job = compose::issue_notification(
                key,
                assignee.and_then(|a| a.display_name.as_deref()),
                to,
                issue.summary(),
                &jira.browse_url(key),
            );
            results.push(self.attempt(key, &job).await);
        }
        BatchReport::new(results)
    }
}
