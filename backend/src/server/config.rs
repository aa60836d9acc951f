//! Runtime configuration loaded via OrthoConfig.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use backend::domain::{IntakePoolConfig, ShelfCapacities};

/// Configuration values for shelf capacities, worker cadence, and the HTTP
/// listener. Environment variables use the `KITCHEN_` prefix; CLI flags and
/// config files override per OrthoConfig's layering rules.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "KITCHEN")]
pub struct ShelfSettings {
    /// Slots on the hot shelf.
    #[ortho_config(default = 15)]
    pub hot_capacity: u32,
    /// Slots on the cold shelf.
    #[ortho_config(default = 15)]
    pub cold_capacity: u32,
    /// Slots on the frozen shelf.
    #[ortho_config(default = 15)]
    pub frozen_capacity: u32,
    /// Slots on the shared overflow shelf.
    #[ortho_config(default = 20)]
    pub overflow_capacity: u32,
    /// Intake workers draining the placement queue.
    #[ortho_config(default = 3)]
    pub workers: usize,
    /// Milliseconds between expiration sweeps.
    #[ortho_config(default = 5000)]
    pub sweep_interval_ms: u64,
    /// Milliseconds a worker sleeps after an empty poll.
    #[ortho_config(default = 250)]
    pub poll_interval_ms: u64,
    /// Listener address, e.g. `0.0.0.0:8080`.
    pub bind_addr: Option<SocketAddr>,
}

impl ShelfSettings {
    /// Per-tier capacities as the domain type.
    pub const fn capacities(&self) -> ShelfCapacities {
        ShelfCapacities {
            hot: self.hot_capacity,
            cold: self.cold_capacity,
            frozen: self.frozen_capacity,
            overflow: self.overflow_capacity,
        }
    }

    /// Worker pool sizing and cadence.
    pub const fn intake_config(&self) -> IntakePoolConfig {
        IntakePoolConfig {
            workers: self.workers,
            poll_interval: Duration::from_millis(self.poll_interval_ms),
        }
    }

    /// Cadence of the expiration sweeper.
    pub const fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }

    /// The configured listener address, falling back to all interfaces on
    /// port 8080.
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 8080)))
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for runtime configuration parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    fn load_from_empty_args() -> ShelfSettings {
        ShelfSettings::load_from_iter([OsString::from("backend")]).expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env([
            ("KITCHEN_HOT_CAPACITY", None::<String>),
            ("KITCHEN_COLD_CAPACITY", None::<String>),
            ("KITCHEN_FROZEN_CAPACITY", None::<String>),
            ("KITCHEN_OVERFLOW_CAPACITY", None::<String>),
            ("KITCHEN_WORKERS", None::<String>),
            ("KITCHEN_SWEEP_INTERVAL_MS", None::<String>),
            ("KITCHEN_POLL_INTERVAL_MS", None::<String>),
            ("KITCHEN_BIND_ADDR", None::<String>),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.capacities(), ShelfCapacities::default());
        assert_eq!(settings.workers, 3);
        assert_eq!(settings.sweep_interval(), Duration::from_secs(5));
        assert_eq!(
            settings.intake_config().poll_interval,
            Duration::from_millis(250)
        );
        assert_eq!(settings.bind_addr(), "0.0.0.0:8080".parse().expect("addr"));
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("KITCHEN_HOT_CAPACITY", Some("2".to_owned())),
            ("KITCHEN_WORKERS", Some("8".to_owned())),
            ("KITCHEN_SWEEP_INTERVAL_MS", Some("100".to_owned())),
            ("KITCHEN_BIND_ADDR", Some("127.0.0.1:9999".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.capacities().hot, 2);
        assert_eq!(settings.capacities().cold, 15);
        assert_eq!(settings.workers, 8);
        assert_eq!(settings.sweep_interval(), Duration::from_millis(100));
        assert_eq!(
            settings.bind_addr(),
            "127.0.0.1:9999".parse().expect("addr")
        );
    }
}
