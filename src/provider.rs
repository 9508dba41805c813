use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::Result;

use crate::api_fetch::Backend;
use crate::state::{Delta, LoadTicket, LogLevel, PredictionTicket, ProviderCommand, Section};

const RETRY_BASE_DELAY: Duration = Duration::from_millis(250);
const RETRY_MAX_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy)]
pub struct ProviderOptions {
    /// Extra attempts for heatmap and feature-importance fetches.
    pub secondary_retries: u32,
    pub retry_base_delay: Duration,
}

impl Default for ProviderOptions {
    fn default() -> Self {
        Self {
            secondary_retries: 0,
            retry_base_delay: RETRY_BASE_DELAY,
        }
    }
}

/// Runs until every command sender is dropped. Each command gets its own
/// worker thread, so a slow load never holds up a newer one.
pub fn spawn_provider(
    backend: Arc<dyn Backend>,
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
    options: ProviderOptions,
) -> JoinHandle<()> {
    thread::spawn(move || {
        while let Ok(cmd) = cmd_rx.recv() {
            let backend = Arc::clone(&backend);
            let tx = tx.clone();
            match cmd {
                ProviderCommand::LoadPlayer(ticket) => {
                    thread::spawn(move || run_player_load(backend, tx, ticket, options));
                }
                ProviderCommand::Predict(ticket) => {
                    thread::spawn(move || run_prediction(backend.as_ref(), &tx, ticket));
                }
            }
        }
    })
}

/// Primary fetch, then the two secondary fetches on detached threads.
pub fn run_player_load(
    backend: Arc<dyn Backend>,
    tx: Sender<Delta>,
    ticket: LoadTicket,
    options: ProviderOptions,
) {
    let LoadTicket { generation, player } = ticket;
    let snapshot = match backend.player(&player) {
        Ok(snapshot) => snapshot,
        Err(err) => {
            let _ = tx.send(Delta::PlayerFailed {
                generation,
                player,
                error: format!("{err:#}"),
            });
            return;
        }
    };
    if tx
        .send(Delta::PlayerLoaded {
            generation,
            player: player.clone(),
            snapshot: Box::new(snapshot),
        })
        .is_err()
    {
        return;
    }

    {
        let backend = Arc::clone(&backend);
        let tx = tx.clone();
        let player = player.clone();
        thread::spawn(move || {
            let delta = match with_retries(options, &tx, Section::Heatmap, || {
                backend.heatmap(&player)
            }) {
                Ok(sample) => Delta::HeatmapLoaded {
                    generation,
                    player,
                    sample,
                },
                Err(err) => Delta::SectionFailed {
                    generation,
                    section: Section::Heatmap,
                    error: format!("{err:#}"),
                },
            };
            let _ = tx.send(delta);
        });
    }

    thread::spawn(move || {
        let delta = match with_retries(options, &tx, Section::FeatureImportance, || {
            backend.feature_importance()
        }) {
            Ok(importance) => Delta::ImportanceLoaded {
                generation,
                importance,
            },
            Err(err) => Delta::SectionFailed {
                generation,
                section: Section::FeatureImportance,
                error: format!("{err:#}"),
            },
        };
        let _ = tx.send(delta);
    });
}

pub fn run_prediction(backend: &dyn Backend, tx: &Sender<Delta>, ticket: PredictionTicket) {
    let delta = match backend.predict(&ticket.input) {
        Ok(response) => Delta::PredictionResolved {
            generation: ticket.generation,
            response,
        },
        Err(err) => Delta::PredictionFailed {
            generation: ticket.generation,
            error: format!("{err:#}"),
        },
    };
    let _ = tx.send(delta);
}

fn with_retries<T>(
    options: ProviderOptions,
    tx: &Sender<Delta>,
    section: Section,
    mut fetch: impl FnMut() -> Result<T>,
) -> Result<T> {
    let attempts = options.secondary_retries + 1;
    let mut attempt = 0;
    loop {
        attempt += 1;
        match fetch() {
            Ok(value) => return Ok(value),
            Err(err) if attempt < attempts => {
                let _ = tx.send(Delta::Log(
                    LogLevel::Debug,
                    format!(
                        "{} fetch attempt {attempt}/{attempts} failed: {err:#}",
                        section.label()
                    ),
                ));
                thread::sleep(backoff_delay(options.retry_base_delay, attempt));
            }
            Err(err) => return Err(err),
        }
    }
}

fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let factor = 1u32 << attempt.saturating_sub(1).min(16);
    base.saturating_mul(factor).min(RETRY_MAX_DELAY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_and_caps() {
        let base = Duration::from_millis(250);
        assert_eq!(backoff_delay(base, 1), Duration::from_millis(250));
        assert_eq!(backoff_delay(base, 2), Duration::from_millis(500));
        assert_eq!(backoff_delay(base, 3), Duration::from_secs(1));
        assert_eq!(backoff_delay(base, 10), RETRY_MAX_DELAY);
    }

    #[test]
    fn retries_until_success() {
        let (tx, rx) = std::sync::mpsc::channel();
        let options = ProviderOptions {
            secondary_retries: 2,
            retry_base_delay: Duration::ZERO,
        };
        let mut calls = 0;
        let out = with_retries(options, &tx, Section::Heatmap, || {
            calls += 1;
            if calls < 3 {
                anyhow::bail!("flaky")
            }
            Ok(calls)
        })
        .unwrap();
        assert_eq!(out, 3);
        assert_eq!(rx.try_iter().count(), 2);
    }

    #[test]
    fn gives_up_after_budget() {
        let (tx, _rx) = std::sync::mpsc::channel();
        let options = ProviderOptions {
            secondary_retries: 1,
            retry_base_delay: Duration::ZERO,
        };
        let mut calls = 0;
        let out: Result<()> = with_retries(options, &tx, Section::FeatureImportance, || {
            calls += 1;
            anyhow::bail!("down")
        });
        assert!(out.is_err());
        assert_eq!(calls, 2);
    }
}
