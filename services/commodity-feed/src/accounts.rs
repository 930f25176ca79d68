//! Simulated broker accounts for the dashboard
//!
//! Figures are demo data. A few fields jitter on every call; the random
//! source is passed in so callers (and tests) decide how it is seeded.

use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountStatus {
    Active,
    Pending,
}

/// One broker account row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrokerAccount {
    pub id: u32,
    pub broker: String,
    pub no_of_active_positions: u32,
    pub available_capital: String,
    pub total_deployed_strategies: u32,
    pub active_strategies: u32,
    pub status: AccountStatus,
    pub current_pnl: String,
    pub required_capital: String,
}

const ZERODHA_PNL_K: f64 = 50.02;
const ZERODHA_PNL_JITTER: f64 = 5.0;
const ANGEL_PNL_K: f64 = 60.02;
const ANGEL_PNL_JITTER: f64 = 3.0;

/// "₹ 50.02 K"
pub fn format_thousands(value_k: f64) -> String {
    format!("₹ {:.2} K", value_k)
}

/// Build the account list, drawing jitter from `rng`
pub fn simulated_accounts<R: Rng>(rng: &mut R) -> Vec<BrokerAccount> {
    let zerodha_pnl = ZERODHA_PNL_K + rng.gen_range(-ZERODHA_PNL_JITTER..=ZERODHA_PNL_JITTER);
    let angel_pnl = ANGEL_PNL_K + rng.gen_range(-ANGEL_PNL_JITTER..=ANGEL_PNL_JITTER);

    tracing::debug!(zerodha_pnl, angel_pnl, "Simulated broker P&L");

    vec![
        BrokerAccount {
            id: 1,
            broker: "Zerodha (DU000004)".to_string(),
            no_of_active_positions: rng.gen_range(1..=3),
            available_capital: "₹ 1.54 Cr".to_string(),
            total_deployed_strategies: 3,
            active_strategies: rng.gen_range(1..=3),
            status: AccountStatus::Active,
            current_pnl: format_thousands(zerodha_pnl),
            required_capital: format_thousands(ZERODHA_PNL_K),
        },
        BrokerAccount {
            id: 2,
            broker: "Angel One (MNBN1026)".to_string(),
            no_of_active_positions: rng.gen_range(1..=4),
            available_capital: "₹ 2.50 K".to_string(),
            total_deployed_strategies: 2,
            active_strategies: rng.gen_range(1..=2),
            status: AccountStatus::Active,
            current_pnl: format_thousands(angel_pnl),
            required_capital: format_thousands(ANGEL_PNL_K),
        },
        BrokerAccount {
            id: 3,
            broker: "Finvasia (FA189009)".to_string(),
            no_of_active_positions: 0,
            available_capital: "₹ 50.02 K".to_string(),
            total_deployed_strategies: 0,
            active_strategies: 0,
            status: AccountStatus::Pending,
            current_pnl: "₹ 0.00".to_string(),
            required_capital: "₹ 0.00".to_string(),
        },
    ]
}
