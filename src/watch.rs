//! A single watch run: crawl, diff, notify, persist
//!
//! # Run Order
//!
//! 1. Crawl the brand listing. A fetch failure ends the run here, before the
//!    state file is read or written.
//! 2. Load the seen set and diff the crawl against it.
//! 3. Compose the notification and deliver it if there is anything new.
//! 4. Save the updated seen set, even if delivery failed.

use crate::config::{Config, EmailConfig, WatchConfig};
use crate::crawler::Crawler;
use crate::notify::{compose, Mailer, Notification, SmtpMailer};
use crate::state::{diff, Product, StopReason};
use crate::storage::{JsonStateStore, StateStore};
use crate::Result;
use std::fmt;

/// What happened to the notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Nothing new, nothing to send
    NotNeeded,

    Sent,

    /// There were new items but no attempt was made to send
    Skipped { reason: String },

    /// Sending was attempted and failed
    Failed { error: String },
}

/// Outcome of a completed run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub pages_fetched: u32,
    pub products_found: usize,
    pub stop_reason: StopReason,
    pub new_items: Vec<Product>,
    pub notification: Notification,
    pub delivery: Delivery,
    pub state_saved: bool,
}

impl RunSummary {
    pub fn delivery_failed(&self) -> bool {
        matches!(self.delivery, Delivery::Failed { .. })
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.new_items.len();

        match &self.delivery {
            Delivery::Sent => return write!(f, "Sent email for {} new item(s).", count),
            Delivery::NotNeeded => write!(f, "No new items.")?,
            Delivery::Skipped { reason } => {
                write!(f, "Found {} new item(s); email skipped ({}).", count, reason)?
            }
            Delivery::Failed { error } => write!(
                f,
                "Found {} new item(s); email delivery failed: {}.",
                count, error
            )?,
        }

        if self.state_saved {
            write!(f, " State updated.")
        } else {
            write!(f, " State not saved.")
        }
    }
}

/// Runs the watch pipeline against one state store and optional mailer
pub struct Watcher<S: StateStore = JsonStateStore> {
    watch: WatchConfig,
    crawler: Crawler,
    store: S,
    mailer: Option<Box<dyn Mailer>>,
    dry_run: bool,
}

impl Watcher<JsonStateStore> {
    /// Builds a watcher with a JSON state file and, when email settings are
    /// complete, an SMTP mailer
    pub fn from_config(config: Config) -> Result<Self> {
        let crawler = Crawler::from_config(&config.fetch)?;
        let store = JsonStateStore::new(&config.watch.state_path);
        let mailer = mailer_from_config(&config.email)?;

        Ok(Self::new(config.watch, crawler, store, mailer))
    }
}

impl<S: StateStore> Watcher<S> {
    pub fn new(
        watch: WatchConfig,
        crawler: Crawler,
        store: S,
        mailer: Option<Box<dyn Mailer>>,
    ) -> Self {
        Self {
            watch,
            crawler,
            store,
            mailer,
            dry_run: false,
        }
    }

    /// In dry-run mode nothing is sent and the state file is left alone
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Executes one run
    ///
    /// # Returns
    ///
    /// * `Ok(RunSummary)` - The crawl completed; delivery may still have failed
    /// * `Err(WatcherError)` - The crawl failed or the state could not be saved
    pub async fn run(&self) -> Result<RunSummary> {
        let crawl = self.crawler.crawl(&self.watch.brand_url).await?;

        let seen = self.store.load();
        let result = diff(&crawl, &seen);
        tracing::info!(
            "{} product(s) listed, {} previously seen, {} new",
            crawl.len(),
            seen.len(),
            result.new_items.len()
        );

        let notification = compose(
            &result.new_items,
            &self.watch.brand_name,
            &self.watch.brand_url,
        );
        let delivery = self.deliver(result.has_new_items(), &notification).await;

        let state_saved = if self.dry_run {
            tracing::info!("Dry run, leaving state untouched");
            false
        } else {
            self.store.save(&result.updated_seen)?;
            tracing::info!("Recorded {} seen id(s)", result.updated_seen.len());
            true
        };

        Ok(RunSummary {
            pages_fetched: crawl.pages_fetched,
            products_found: crawl.len(),
            stop_reason: crawl.stop_reason,
            new_items: result.new_items,
            notification,
            delivery,
            state_saved,
        })
    }

    async fn deliver(&self, has_new_items: bool, notification: &Notification) -> Delivery {
        if !has_new_items {
            return Delivery::NotNeeded;
        }

        if self.dry_run {
            return Delivery::Skipped {
                reason: "dry run".to_string(),
            };
        }

        let Some(mailer) = &self.mailer else {
            return Delivery::Skipped {
                reason: "email not configured".to_string(),
            };
        };

        match mailer.send(notification).await {
            Ok(()) => Delivery::Sent,
            Err(e) => {
                tracing::error!("Failed to send notification: {}", e);
                Delivery::Failed {
                    error: e.to_string(),
                }
            }
        }
    }
}

/// Builds the SMTP mailer, or `None` with a warning per missing setting
fn mailer_from_config(email: &EmailConfig) -> Result<Option<Box<dyn Mailer>>> {
    match email.settings() {
        Ok(settings) => Ok(Some(Box::new(SmtpMailer::new(&settings)?))),
        Err(missing) => {
            for name in missing {
                tracing::warn!("{} is not set; email notifications are disabled", name);
            }
            Ok(None)
        }
    }
}

/// Runs the watcher described by `config` once
///
/// # Arguments
///
/// * `config` - The watcher configuration, environment overlay already applied
/// * `dry_run` - Crawl and diff only; do not send or save
pub async fn run_watch(config: Config, dry_run: bool) -> Result<RunSummary> {
    Watcher::from_config(config)?.dry_run(dry_run).run().await
}
