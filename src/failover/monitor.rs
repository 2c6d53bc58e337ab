//! Periodic failover evaluation.

use serde::Serialize;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};

use crate::config::{FailoverContract, PoolTarget};
use crate::failover::probe::HealthProbe;
use crate::failover::state::{HealthState, PoolHealth};
use crate::lifecycle::shutdown::ShutdownSignal;
use crate::observability::metrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PoolRole {
    Primary,
    Backup,
}

/// Snapshot published after every check round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailoverStatus {
    /// Pool the proxy should route new traffic to; `None` if both are withdrawn.
    pub active: Option<PoolRole>,
    pub primary: HealthState,
    pub backup: HealthState,
    /// Completed check rounds.
    pub rounds: u64,
}

impl Default for FailoverStatus {
    fn default() -> Self {
        Self {
            active: Some(PoolRole::Primary),
            primary: HealthState::Unknown,
            backup: HealthState::Unknown,
            rounds: 0,
        }
    }
}

/// Pick the pool that should take traffic.
pub fn select_pool(primary: HealthState, backup: HealthState) -> Option<PoolRole> {
    if primary.is_eligible() {
        Some(PoolRole::Primary)
    } else if backup.is_eligible() {
        Some(PoolRole::Backup)
    } else {
        None
    }
}

pub struct FailoverMonitor {
    contract: FailoverContract,
    probe: HealthProbe,
    primary: PoolHealth,
    backup: PoolHealth,
    rounds: u64,
    status_tx: watch::Sender<FailoverStatus>,
}

impl FailoverMonitor {
    pub fn new(contract: FailoverContract) -> Self {
        let probe_config = &contract.probe;
        let probe = HealthProbe::new(probe_config.path.clone(), probe_config.timeout());
        let primary = PoolHealth::new(
            contract.primary.name.clone(),
            probe_config.unhealthy_threshold,
            probe_config.healthy_threshold,
        );
        let backup = PoolHealth::new(
            contract.backup.name.clone(),
            probe_config.unhealthy_threshold,
            probe_config.healthy_threshold,
        );
        let (status_tx, _) = watch::channel(FailoverStatus::default());

        Self {
            contract,
            probe,
            primary,
            backup,
            rounds: 0,
            status_tx,
        }
    }

    /// Receive a snapshot after every round.
    pub fn subscribe(&self) -> watch::Receiver<FailoverStatus> {
        self.status_tx.subscribe()
    }

    pub fn status(&self) -> FailoverStatus {
        self.status_tx.borrow().clone()
    }

    /// Name of the pool playing `role`.
    pub fn pool_name(&self, role: PoolRole) -> &str {
        match role {
            PoolRole::Primary => &self.contract.primary.name,
            PoolRole::Backup => &self.contract.backup.name,
        }
    }

    /// Probe both pools once and publish the resulting status.
    pub async fn check_once(&mut self) -> FailoverStatus {
        let (primary_ok, backup_ok) = tokio::join!(
            probe_pool(&self.probe, &self.contract.primary),
            probe_pool(&self.probe, &self.contract.backup),
        );

        if primary_ok {
            self.primary.mark_success();
        } else {
            self.primary.mark_failure();
        }
        if backup_ok {
            self.backup.mark_success();
        } else {
            self.backup.mark_failure();
        }
        self.rounds += 1;

        let previous = self.status();
        let status = FailoverStatus {
            active: select_pool(self.primary.state(), self.backup.state()),
            primary: self.primary.state(),
            backup: self.backup.state(),
            rounds: self.rounds,
        };

        if status.active != previous.active {
            match status.active {
                Some(role) => tracing::warn!(
                    pool = %self.pool_name(role),
                    role = ?role,
                    "Failover: traffic should now go to {:?} pool",
                    role
                ),
                None => tracing::error!("Failover: both pools withdrawn, no pool can take traffic"),
            }
        }
        metrics::record_active_pool(&self.contract.primary.name, status.active == Some(PoolRole::Primary));
        metrics::record_active_pool(&self.contract.backup.name, status.active == Some(PoolRole::Backup));

        self.status_tx.send_replace(status.clone());
        status
    }

    /// Poll both pools every interval until shutdown.
    pub async fn run(mut self, mut shutdown: ShutdownSignal) {
        let interval = self.contract.probe.interval();
        tracing::info!(
            primary = %self.contract.primary.url,
            backup = %self.contract.backup.url,
            interval_ms = interval.as_millis() as u64,
            timeout_ms = self.contract.probe.timeout_ms,
            "Failover monitor starting"
        );

        let mut ticker = time::interval(interval.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.check_once().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Failover monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }
}

async fn probe_pool(probe: &HealthProbe, target: &PoolTarget) -> bool {
    let healthy = match probe.check(target).await {
        Ok(latency) => {
            tracing::debug!(pool = %target.name, latency_ms = latency.as_millis() as u64, "Health check passed");
            true
        }
        Err(e) => {
            tracing::warn!(pool = %target.name, error = %e, "Health check failed");
            false
        }
    };
    metrics::record_probe(&target.name, healthy);
    healthy
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_pool() {
        use HealthState::*;
        assert_eq!(select_pool(Unknown, Unknown), Some(PoolRole::Primary));
        assert_eq!(select_pool(Healthy, Unhealthy), Some(PoolRole::Primary));
        assert_eq!(select_pool(Unhealthy, Healthy), Some(PoolRole::Backup));
        assert_eq!(select_pool(Unhealthy, Unknown), Some(PoolRole::Backup));
        assert_eq!(select_pool(Unhealthy, Unhealthy), None);
    }
}
