//! The reaper task: timer loop and the single maintenance pass.

use std::{collections::HashMap, sync::Arc, time::Duration};

use {
    chrono::{DateTime, Utc},
    tokio::task::JoinHandle,
    tokio_util::sync::CancellationToken,
    tracing::{debug, info, warn},
};

use {
    tempvox_platform::{ChannelProbe, VoiceGateway},
    tempvox_registry::{ChannelId, SharedRegistry, TempChannel},
};

/// Deletes empty, expired, or vanished rooms on a fixed interval.
pub struct Reaper {
    registry: SharedRegistry,
    gateway: Arc<dyn VoiceGateway>,
    interval: Duration,
    cancel: CancellationToken,
}

impl Reaper {
    pub fn new(
        registry: SharedRegistry,
        gateway: Arc<dyn VoiceGateway>,
        interval: Duration,
        cancel: CancellationToken,
    ) -> Arc<Self> {
        Arc::new(Self {
            registry,
            gateway,
            interval,
            cancel,
        })
    }

    /// Spawn the timer loop. The returned handle completes once the token is
    /// cancelled.
    pub fn spawn(self: &Arc<Self>) -> JoinHandle<()> {
        let reaper = Arc::clone(self);
        tokio::spawn(async move {
            reaper.run().await;
        })
    }

    /// Request the loop to stop.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    async fn run(&self) {
        info!(interval_secs = self.interval.as_secs(), "reaper started");
        loop {
            tokio::select! {
                () = self.cancel.cancelled() => break,
                () = tokio::time::sleep(self.interval) => {},
            }
            if let Err(err) = self.run_pass(Utc::now()).await {
                warn!(error = %err, "reap pass failed");
            }
        }
        info!("reaper stopped");
    }

    /// One maintenance pass against the given clock.
    ///
    /// Probes happen outside the registry lock; the lock is only taken for
    /// the synchronous reap itself. Running the pass twice with no state
    /// change deletes nothing the second time. Public so hosts and tests can
    /// drive it without the timer.
    pub async fn run_pass(&self, now: DateTime<Utc>) -> anyhow::Result<()> {
        let records: Vec<TempChannel> = {
            let registry = self.registry.read().unwrap_or_else(|e| e.into_inner());
            registry.records()
        };
        if records.is_empty() {
            return Ok(());
        }

        let mut probes: HashMap<ChannelId, ChannelProbe> = HashMap::new();
        for record in &records {
            match self.gateway.probe(record.guild_id, record.channel_id).await {
                Ok(probe) => {
                    probes.insert(record.channel_id, probe);
                },
                Err(err) => {
                    // Without a probe the room is only reaped if its
                    // deadline elapsed.
                    warn!(channel = %record.channel_id, error = %err, "probe failed, skipping");
                },
            }
        }

        let removed = {
            let mut registry = self.registry.write().unwrap_or_else(|e| e.into_inner());
            registry.reap(
                now,
                |channel| probes.get(&channel).is_some_and(ChannelProbe::is_empty),
                |channel| probes.get(&channel).is_some_and(|p| !p.exists),
            )
        };

        for channel in removed {
            if probes.get(&channel).is_some_and(|p| !p.exists) {
                debug!(%channel, "dropped stale room entry");
                continue;
            }
            let expired = records
                .iter()
                .find(|r| r.channel_id == channel)
                .is_some_and(|r| r.expired(now));
            let reason = if expired {
                "temporary voice channel expired"
            } else {
                "temporary voice channel empty"
            };
            match self.gateway.delete_channel(channel, reason).await {
                Ok(()) => info!(%channel, reason, "reaped temp room"),
                // The entry is already gone from the registry; if the room
                // is somehow still live the platform keeps it and nothing
                // re-registers it, matching the reference recovery model.
                Err(err) => warn!(%channel, error = %err, "failed to delete reaped room"),
            }
        }
        Ok(())
    }
}
