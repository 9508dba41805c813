use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;

use crate::config::http_timeout_from_env;

static CLIENT: OnceCell<Client> = OnceCell::new();

/// Shared blocking client. The timeout is read from the environment once, on
/// first use; `None` leaves requests unbounded.
pub fn http_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(http_timeout_from_env())
            .build()
            .context("failed to build http client")
    })
}
