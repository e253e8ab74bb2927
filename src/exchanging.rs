use log::{debug, warn};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_RATES_URL: &str = "https://api.exchangerate-api.com/v4/latest";

/// Supplies the rate that turns one unit of `from` into `to`.
///
/// `None` means no usable rate; implementations swallow their own faults.
pub trait RateSource {
    fn rate(&self, from: &str, to: &str) -> Option<f64>;
}

#[derive(Deserialize)]
struct LatestRates {
    #[serde(default)]
    rates: HashMap<String, f64>,
}

/// Fetches `<base_url>/<FROM>` and reads `rates.<TO>` out of the JSON body.
pub struct HttpRates {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpRates {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').into(),
            client,
        })
    }

    fn fetch(&self, from: &str) -> Result<LatestRates, reqwest::Error> {
        let url = format!("{}/{}", self.base_url, from);
        debug!("fetching exchange rates from {url}");
        self.client.get(url).send()?.error_for_status()?.json()
    }
}

impl RateSource for HttpRates {
    fn rate(&self, from: &str, to: &str) -> Option<f64> {
        let from = from.to_ascii_uppercase();
        let to = to.to_ascii_uppercase();
        match self.fetch(&from) {
            Ok(latest) => {
                let rate = latest.rates.get(&to).copied();
                if rate.is_none() {
                    warn!("no {to} rate listed for {from}");
                }
                rate.filter(|rate| rate.is_finite() && *rate > 0.0)
            },
            Err(e) => {
                warn!("exchange rate lookup for {from} failed: {e}");
                None
            },
        }
    }
}

/// Has no rates at all.
pub struct NoRates;

impl RateSource for NoRates {
    fn rate(&self, _from: &str, _to: &str) -> Option<f64> {
        None
    }
}
