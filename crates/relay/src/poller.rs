//! The fixed-interval check loop.
//!
//! Each cycle resolves both channels, fetches unprocessed responses,
//! notifies them one at a time in sheet order, records their keys, and
//! clears the sheet once if anything was processed. Cycles never overlap:
//! the next tick is only awaited after the previous cycle finished.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use form_notify::ChatChannel;
use futures::FutureExt;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::clearer::SheetClearer;
use crate::config::RelaySettings;
use crate::error::CycleError;
use crate::fetcher::ResponseFetcher;
use crate::notifier::{ChannelHandles, MentionOutcome, Notifier};
use crate::sheet::SheetApi;
use crate::store::{InMemoryKeySet, ProcessedKeySet};

/// Summary of one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleReport {
    /// Nothing new (or the sheet could not be read); the sheet was left alone.
    Empty,
    /// At least one response was handled and a clear was attempted.
    Processed {
        notified: usize,
        /// Responses whose summary post failed.
        failed: usize,
        mentions: usize,
        cleared: bool,
    },
}

/// Polls the form sheet and relays new responses to chat.
pub struct FormRelay {
    chat: Arc<dyn ChatChannel>,
    fetcher: ResponseFetcher,
    notifier: Notifier,
    clearer: SheetClearer,
    processed: Box<dyn ProcessedKeySet>,
    settings: RelaySettings,
}

impl FormRelay {
    /// Create a relay with an in-memory processed-key set.
    #[must_use]
    pub fn new(
        sheet: Arc<dyn SheetApi>,
        chat: Arc<dyn ChatChannel>,
        settings: RelaySettings,
    ) -> Self {
        Self {
            fetcher: ResponseFetcher::new(Arc::clone(&sheet), settings.fields.key_column.clone()),
            notifier: Notifier::new(
                Arc::clone(&chat),
                settings.fields.clone(),
                settings.mention.clone(),
            ),
            clearer: SheetClearer::new(sheet),
            chat,
            processed: Box::new(InMemoryKeySet::new()),
            settings,
        }
    }

    /// Swap in a different processed-key store.
    #[must_use]
    pub fn with_store(mut self, store: Box<dyn ProcessedKeySet>) -> Self {
        self.processed = store;
        self
    }

    #[must_use]
    pub fn processed(&self) -> &dyn ProcessedKeySet {
        self.processed.as_ref()
    }

    async fn resolve_channel(
        &self,
        role: &'static str,
        channel_id: Option<u64>,
    ) -> Result<form_notify::ChannelHandle, CycleError> {
        let channel_id = channel_id.ok_or(CycleError::ChannelNotConfigured { role })?;
        self.chat
            .resolve(channel_id)
            .await
            .map_err(|source| CycleError::ChannelUnavailable {
                role,
                channel_id,
                source,
            })
    }

    async fn resolve_channels(&self) -> Result<ChannelHandles, CycleError> {
        Ok(ChannelHandles {
            primary: self
                .resolve_channel("primary", self.settings.channel_id)
                .await?,
            mention: self
                .resolve_channel("mention", self.settings.mention_channel_id)
                .await?,
        })
    }

    /// Run one check. Only channel resolution aborts the cycle with an
    /// error; fetch, send and clear failures are logged and absorbed.
    pub async fn run_cycle(&mut self) -> Result<CycleReport, CycleError> {
        let channels = self.resolve_channels().await?;

        let responses = match self.fetcher.fetch(self.processed.as_ref()).await {
            Ok(responses) => responses,
            Err(e) => {
                error!(error = %e, "Failed to fetch form responses");
                Vec::new()
            }
        };

        if responses.is_empty() {
            info!("No new responses found");
            return Ok(CycleReport::Empty);
        }

        let key_column = self.settings.fields.key_column.clone();
        let mut notified = 0;
        let mut failed = 0;
        let mut mentions = 0;

        for response in &responses {
            let Some(key) = response.get(&key_column) else {
                warn!("Response without a key value, skipping");
                continue;
            };

            if self.processed.contains(key) {
                debug!(key = %key, "Already processed, skipping");
                continue;
            }

            let report = self.notifier.notify(response, &channels).await;
            self.processed.add(key);

            notified += 1;
            if !report.primary_sent {
                failed += 1;
            }
            if report.mention == MentionOutcome::Sent {
                mentions += 1;
            }
        }

        let cleared = match self.clearer.clear().await {
            Ok(_) => true,
            Err(e) => {
                error!(error = %e, "Failed to clear form responses");
                false
            }
        };

        Ok(CycleReport::Processed {
            notified,
            failed,
            mentions,
            cleared,
        })
    }

    /// Run one cycle, logging any error or panic instead of propagating it.
    pub async fn run_guarded(&mut self) -> Option<CycleReport> {
        match AssertUnwindSafe(self.run_cycle()).catch_unwind().await {
            Ok(Ok(report)) => Some(report),
            Ok(Err(e)) => {
                error!(error = %e, "Form check cycle aborted");
                None
            }
            Err(panic) => {
                error!(panic = %panic_message(panic.as_ref()), "Form check cycle panicked");
                None
            }
        }
    }

    /// Check for new responses forever at the configured interval.
    pub async fn run(mut self) {
        let mut ticker = tokio::time::interval(self.settings.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            backend = self.chat.name(),
            interval_secs = self.settings.poll_interval.as_secs(),
            "Starting form check loop"
        );

        loop {
            ticker.tick().await;
            self.run_guarded().await;
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message() {
        let boxed: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(boxed.as_ref()), "boom");

        let boxed: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(boxed.as_ref()), "bang");

        let boxed: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(boxed.as_ref()), "unknown panic");
    }
}
