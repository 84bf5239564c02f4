//! Spot prices from public providers.
//!
//! A background task polls each provider and swaps the results into a
//! shared snapshot; the currency route serves the snapshot without ever
//! waiting on a provider. A provider failure leaves that quote at zero
//! rather than failing the refresh.

use serde::Deserialize;
use std::sync::RwLock;
use tracing::warn;

const BINANCE_URL: &str = "https://api.binance.com/api/v3/ticker/price?symbol=BTCUSDT";
const BLOCKCHAIN_INFO_URL: &str = "https://blockchain.info/tobtc?currency=USD&value=1000";
const COINBASE_URL: &str = "https://api.coinbase.com/v2/prices/spot?currency=USD";

/// API version date Coinbase pins response shapes to.
const COINBASE_API_VERSION: &str = "2015-04-08";

/// One refresh's worth of quotes, in USD per coin. Zero means the
/// provider could not be read.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PriceSnapshot {
    pub binance: f64,
    pub blockchain_info: f64,
    pub coinbase: f64,
}

/// Latest quotes, shared between the refresh task and request handlers.
#[derive(Default)]
pub struct PriceBoard {
    snapshot: RwLock<PriceSnapshot>,
}

impl PriceBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> PriceSnapshot {
        match self.snapshot.read() {
            Ok(snapshot) => *snapshot,
            Err(_) => PriceSnapshot::default(),
        }
    }

    pub fn store(&self, snapshot: PriceSnapshot) {
        if let Ok(mut current) = self.snapshot.write() {
            *current = snapshot;
        }
    }
}

/// Poll every provider once. Runs outside any lock; callers `store` the
/// result.
pub async fn fetch_all(client: &reqwest::Client) -> PriceSnapshot {
    PriceSnapshot {
        binance: binance_price(client).await,
        blockchain_info: blockchain_info_price(client).await,
        coinbase: coinbase_price(client).await,
    }
}

#[derive(Debug, Deserialize)]
struct BinanceTicker {
    #[allow(dead_code)]
    symbol: String,
    price: String,
}

async fn binance_price(client: &reqwest::Client) -> f64 {
    let ticker: BinanceTicker = match fetch_json(client, BINANCE_URL).await {
        Ok(ticker) => ticker,
        Err(e) => {
            warn!("binance price fetch failed: {e}");
            return 0.0;
        }
    };
    match ticker.price.parse() {
        Ok(price) => price,
        Err(e) => {
            warn!("binance price malformed: {e}");
            0.0
        }
    }
}

/// blockchain.info answers "how many coins is 1000 USD" as a bare
/// decimal; invert to get USD per coin.
async fn blockchain_info_price(client: &reqwest::Client) -> f64 {
    let body = match client.get(BLOCKCHAIN_INFO_URL).send().await {
        Ok(response) => match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!("blockchain.info price read failed: {e}");
                return 0.0;
            }
        },
        Err(e) => {
            warn!("blockchain.info price fetch failed: {e}");
            return 0.0;
        }
    };
    match body.trim().parse::<f64>() {
        Ok(coins) if coins > 0.0 => (1.0 / coins) * 1000.0,
        Ok(_) => 0.0,
        Err(e) => {
            warn!("blockchain.info price malformed: {e}");
            0.0
        }
    }
}

#[derive(Debug, Deserialize)]
struct CoinbaseSpot {
    data: CoinbaseSpotData,
}

#[derive(Debug, Deserialize)]
struct CoinbaseSpotData {
    amount: String,
}

async fn coinbase_price(client: &reqwest::Client) -> f64 {
    let request = client
        .get(COINBASE_URL)
        .header("Content-Type", "application/json")
        .header("CB-VERSION", COINBASE_API_VERSION);
    let spot: CoinbaseSpot = match request.send().await {
        Ok(response) => match response.json().await {
            Ok(spot) => spot,
            Err(e) => {
                warn!("coinbase price malformed: {e}");
                return 0.0;
            }
        },
        Err(e) => {
            warn!("coinbase price fetch failed: {e}");
            return 0.0;
        }
    };
    match spot.data.amount.parse() {
        Ok(price) => price,
        Err(e) => {
            warn!("coinbase price malformed: {e}");
            0.0
        }
    }
}

async fn fetch_json<T: serde::de::DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
) -> Result<T, reqwest::Error> {
    client.get(url).send().await?.json().await
}
