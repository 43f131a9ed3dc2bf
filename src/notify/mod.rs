// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 nightbuild contributors

//! Failure notification
//!
//! Sends one plain-text mail carrying the tail of the build log when the
//! build stage fails. Gated on all three mail settings being present.
//! A send failure is caught and logged to standard output; notification
//! must never abort the pipeline.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::warn;

use crate::config::MailConfig;

/// How many trailing build-log lines the notification carries
pub const TAIL_LINES: usize = 20;

/// Last `n` lines of a log, joined with newlines
pub fn log_tail(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].join("\n")
}

/// Seam for failure notification.
///
/// The pipeline controller only talks to this trait, so tests can swap
/// in a recording notifier and assert exactly what was sent.
#[async_trait]
pub trait Notify: Send + Sync {
    /// Send a single failure notification with the given body. Missing
    /// mail settings skip silently; transport errors are logged and
    /// swallowed.
    async fn notify_failure(&self, body: &str, date_dashed: &str);
}

/// SMTP-backed failure-mail sender
pub struct Notifier<'a> {
    mail: &'a MailConfig,
    project: &'a str,
}

impl<'a> Notifier<'a> {
    pub fn new(mail: &'a MailConfig, project: &'a str) -> Self {
        Self { mail, project }
    }
}

#[async_trait]
impl Notify for Notifier<'_> {
    async fn notify_failure(&self, body: &str, date_dashed: &str) {
        if !self.mail.is_complete() {
            println!("Skipping mail");
            return;
        }
        let (Some(server), Some(from), Some(to)) = (
            self.mail.server.as_deref(),
            self.mail.from.as_deref(),
            self.mail.to.as_deref(),
        ) else {
            return;
        };

        let message = Message::builder()
            .from(match from.parse() {
                Ok(mbox) => mbox,
                Err(e) => {
                    println!("Could not send mail: bad from address: {e}");
                    return;
                }
            })
            .to(match to.parse() {
                Ok(mbox) => mbox,
                Err(e) => {
                    println!("Could not send mail: bad to address: {e}");
                    return;
                }
            })
            .subject(format!(
                "{} Nightly Build Failed {}",
                self.project, date_dashed
            ))
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string());

        let message = match message {
            Ok(m) => m,
            Err(e) => {
                println!("Could not build mail: {e}");
                return;
            }
        };

        // Plain relay on the standard port, matching a local MTA setup
        let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(server).build();

        match transport.send(message).await {
            Ok(_) => println!("Sent mail to {to}"),
            Err(e) => {
                warn!("notification failed: {}", e);
                println!("Could not send mail: {e}");
            }
        }
    }
}
