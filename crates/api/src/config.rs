use std::str::FromStr;
use std::time::Duration;

use parkify_core::pricing::{PricingPolicy, TierBoosts, DEFAULT_UNIT_PRICE, MAX_UNIT_PRICE};
use parkify_core::settlement::{SettlementPolicy, DEFAULT_OWNER_SHARE_PERCENT};
use parkify_db::PoolSettings;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Connection pool sizing.
    pub pool: PoolSettings,
    /// JWT token configuration.
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                    |
    /// |---------------------------|----------------------------|
    /// | `HOST`                    | `0.0.0.0`                  |
    /// | `PORT`                    | `3000`                     |
    /// | `CORS_ORIGINS`            | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                       |
    /// | `DB_MAX_CONNECTIONS`      | `20`                       |
    /// | `DB_ACQUIRE_TIMEOUT_SECS` | `5`                        |
    ///
    /// # Panics
    ///
    /// Panics on a malformed value so misconfiguration fails at startup.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let defaults = PoolSettings::default();
        let pool = PoolSettings {
            max_connections: env_or("DB_MAX_CONNECTIONS", defaults.max_connections),
            acquire_timeout: Duration::from_secs(env_or(
                "DB_ACQUIRE_TIMEOUT_SECS",
                defaults.acquire_timeout.as_secs(),
            )),
        };

        Self {
            host,
            port: env_or("PORT", 3000),
            cors_origins,
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30),
            pool,
            jwt: JwtConfig::from_env(),
        }
    }
}

/// Booking, pricing and settlement rules. Built once at startup and shared
/// read-only through `AppState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingPolicy {
    pub pricing: PricingPolicy,
    pub settlement: SettlementPolicy,
    /// Longest billable session; also the sweeper deadline after check-in.
    pub max_session: chrono::Duration,
    /// How often the expiry sweeper runs.
    pub sweep_interval: Duration,
    /// Most bookings the sweeper settles per tick.
    pub sweep_batch_size: i64,
}

/// Default session cap in hours.
const DEFAULT_MAX_SESSION_HOURS: i64 = 12;
/// Default sweeper interval in seconds.
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;
/// Default sweeper batch size.
const DEFAULT_SWEEP_BATCH_SIZE: i64 = 100;

impl Default for BookingPolicy {
    fn default() -> Self {
        Self {
            pricing: PricingPolicy::default(),
            settlement: SettlementPolicy::default(),
            max_session: chrono::Duration::hours(DEFAULT_MAX_SESSION_HOURS),
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
            sweep_batch_size: DEFAULT_SWEEP_BATCH_SIZE,
        }
    }
}

impl BookingPolicy {
    /// Load the policy from environment variables with defaults.
    ///
    /// | Env Var               | Default |
    /// |-----------------------|---------|
    /// | `DEFAULT_UNIT_PRICE`  | `50`    |
    /// | `OWNER_SHARE_PERCENT` | `82`    |
    /// | `MAX_SESSION_HOURS`   | `12`    |
    /// | `SWEEP_INTERVAL_SECS` | `60`    |
    /// | `SWEEP_BATCH_SIZE`    | `100`   |
    /// | `TIER_BOOST_SILVER`   | `5`     |
    /// | `TIER_BOOST_GOLD`     | `10`    |
    /// | `TIER_BOOST_PLATINUM` | `15`    |
    ///
    /// # Panics
    ///
    /// Panics on malformed or out-of-range values.
    pub fn from_env() -> Self {
        let boosts = TierBoosts::default();
        let policy = Self {
            pricing: PricingPolicy {
                default_unit_price: env_or("DEFAULT_UNIT_PRICE", DEFAULT_UNIT_PRICE),
                tier_boosts: TierBoosts {
                    silver: env_or("TIER_BOOST_SILVER", boosts.silver),
                    gold: env_or("TIER_BOOST_GOLD", boosts.gold),
                    platinum: env_or("TIER_BOOST_PLATINUM", boosts.platinum),
                },
            },
            settlement: SettlementPolicy {
                owner_share_percent: env_or("OWNER_SHARE_PERCENT", DEFAULT_OWNER_SHARE_PERCENT),
            },
            max_session: chrono::Duration::hours(env_or(
                "MAX_SESSION_HOURS",
                DEFAULT_MAX_SESSION_HOURS,
            )),
            sweep_interval: Duration::from_secs(env_or(
                "SWEEP_INTERVAL_SECS",
                DEFAULT_SWEEP_INTERVAL_SECS,
            )),
            sweep_batch_size: env_or("SWEEP_BATCH_SIZE", DEFAULT_SWEEP_BATCH_SIZE),
        };
        policy.assert_valid();
        policy
    }

    fn assert_valid(&self) {
        assert!(
            (0..=MAX_UNIT_PRICE).contains(&self.pricing.default_unit_price),
            "DEFAULT_UNIT_PRICE must be between 0 and {MAX_UNIT_PRICE}"
        );
        assert!(
            (0..=100).contains(&self.settlement.owner_share_percent),
            "OWNER_SHARE_PERCENT must be between 0 and 100"
        );
        let boosts = self.pricing.tier_boosts;
        assert!(
            boosts.silver >= 0 && boosts.gold >= 0 && boosts.platinum >= 0,
            "TIER_BOOST_* must not be negative"
        );
        assert!(
            self.max_session > chrono::Duration::zero(),
            "MAX_SESSION_HOURS must be positive"
        );
        assert!(
            !self.sweep_interval.is_zero(),
            "SWEEP_INTERVAL_SECS must be positive"
        );
        assert!(self.sweep_batch_size > 0, "SWEEP_BATCH_SIZE must be positive");
    }
}

/// Read and parse `key`, falling back to `default` when unset.
fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|_| panic!("{key} must be a valid {}", std::any::type_name::<T>())),
        Err(_) => default,
    }
}
