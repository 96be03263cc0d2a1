//! Command execution against the registry and the gateway.

use std::sync::{Arc, RwLockReadGuard, RwLockWriteGuard};

use {
    chrono::{Duration, Utc},
    tracing::{debug, info, warn},
};

use {
    tempvox_platform::{CreateRoom, Principal, VoiceGateway},
    tempvox_registry::{
        self as registry, ChannelId, GuildId, SharedRegistry, TempChannel, TempChannelRegistry,
        UserId,
    },
};

use crate::{
    command::{Command, Reply},
    error::{Error, Result},
};

/// Platform cap on channel names.
const MAX_CHANNEL_NAME: usize = 100;

/// Platform bounds for bulk message deletion.
const PURGE_RANGE: std::ops::RangeInclusive<i64> = 1..=100;

/// Default cap for `expire` minute counts (one day).
const DEFAULT_MAX_EXPIRY_MINUTES: i64 = 1440;

/// Names used by the setup command.
#[derive(Debug, Clone)]
pub struct SetupNames {
    pub category_name: String,
    pub join_channel_name: String,
}

/// Outcome of a join-to-create presence event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// A fresh room was created for the member.
    Created(ChannelId),
    /// The member already had a live room and was moved back into it.
    Reused(ChannelId),
}

impl ProvisionOutcome {
    pub fn channel(&self) -> ChannelId {
        match *self {
            Self::Created(channel) | Self::Reused(channel) => channel,
        }
    }
}

/// Routes owner commands and presence events into registry mutations plus
/// gateway calls.
pub struct CommandService {
    registry: SharedRegistry,
    gateway: Arc<dyn VoiceGateway>,
    names: SetupNames,
    max_expiry_minutes: i64,
}

impl CommandService {
    pub fn new(registry: SharedRegistry, gateway: Arc<dyn VoiceGateway>, names: SetupNames) -> Self {
        Self {
            registry,
            gateway,
            names,
            max_expiry_minutes: DEFAULT_MAX_EXPIRY_MINUTES,
        }
    }

    /// Override the `expire` minute cap.
    #[must_use]
    pub fn with_max_expiry_minutes(mut self, minutes: i64) -> Self {
        self.max_expiry_minutes = minutes.max(1);
        self
    }

    /// Execute a parsed command on behalf of `actor`.
    pub async fn dispatch(&self, actor: UserId, command: Command) -> Result<Reply> {
        debug!(%actor, ?command, "dispatching command");
        match command {
            Command::Setup { guild } => self.setup(guild).await,
            Command::Lock => self.lock(actor).await,
            Command::Permit { target } => self.set_connect(actor, target, true).await,
            Command::Reject { target } => self.set_connect(actor, target, false).await,
            Command::Rename { name } => self.rename(actor, name).await,
            Command::Expire { minutes } => self.expire(actor, minutes).await,
            Command::Transfer { new_owner } => self.transfer(actor, new_owner).await,
            Command::Purge { channel, amount } => self.purge(channel, amount).await,
        }
    }

    /// Handle a member entering the join-to-create channel.
    ///
    /// A member who already has a live room is moved back into it instead of
    /// getting a second one; a stale entry (room vanished at the platform) is
    /// evicted and replaced.
    pub async fn provision_on_join(
        &self,
        guild: GuildId,
        owner: UserId,
        display_name: &str,
        category: Option<ChannelId>,
    ) -> Result<ProvisionOutcome> {
        let existing = self.read().lookup_by_owner(owner).cloned();
        if let Some(existing) = existing {
            let probe = self.gateway.probe(existing.guild_id, existing.channel_id).await?;
            if probe.exists {
                self.gateway
                    .move_member(guild, owner, existing.channel_id)
                    .await?;
                // Rejoining your own room cancels a pending deadline.
                let _ = self.write().clear_expiry(existing.channel_id);
                info!(%owner, channel = %existing.channel_id, "moved member back into their room");
                return Ok(ProvisionOutcome::Reused(existing.channel_id));
            }
            self.write().remove(existing.channel_id);
            debug!(%owner, channel = %existing.channel_id, "evicted stale room entry");
        }

        let name = room_name(display_name);
        let channel = self
            .gateway
            .create_voice_channel(CreateRoom {
                guild,
                category,
                name: name.clone(),
                owner,
            })
            .await?;

        let create_result = self.write().create(owner, guild, channel);
        if let Err(err) = create_result {
            // Lost a race with a concurrent event for the same member; drop
            // the extra room rather than leak it.
            warn!(%owner, %channel, error = %err, "registration raced, deleting extra room");
            if let Err(err) = self
                .gateway
                .delete_channel(channel, "duplicate room provisioning")
                .await
            {
                warn!(%channel, error = %err, "failed to delete extra room");
            }
            return Err(match err {
                registry::Error::AlreadyOwned { .. } => Error::AlreadyOwned,
                other => Error::InvalidArgument(other.to_string()),
            });
        }

        if let Err(err) = self.gateway.move_member(guild, owner, channel).await {
            // The room stays; the reaper removes it if it stays empty.
            warn!(%owner, %channel, error = %err, "failed to move member into new room");
        }

        info!(%owner, %channel, name, "provisioned temp room");
        Ok(ProvisionOutcome::Created(channel))
    }

    async fn setup(&self, guild: GuildId) -> Result<Reply> {
        let outcome = self
            .gateway
            .ensure_join_channel(guild, &self.names.category_name, &self.names.join_channel_name)
            .await?;
        info!(%guild, ?outcome, "setup command completed");
        Ok(Reply::SetupComplete(outcome))
    }

    async fn lock(&self, actor: UserId) -> Result<Reply> {
        let record = self.resolve_owned(actor).await?;
        self.gateway
            .set_connect(record.guild_id, record.channel_id, Principal::Everyone, false)
            .await?;
        Ok(Reply::Locked)
    }

    async fn set_connect(&self, actor: UserId, target: Principal, allow: bool) -> Result<Reply> {
        let record = self.resolve_owned(actor).await?;
        self.gateway
            .set_connect(record.guild_id, record.channel_id, target, allow)
            .await?;
        Ok(Reply::ConnectChanged { target, allow })
    }

    async fn rename(&self, actor: UserId, name: String) -> Result<Reply> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(Error::InvalidArgument(
                "The channel name cannot be empty.".into(),
            ));
        }
        if name.chars().count() > MAX_CHANNEL_NAME {
            return Err(Error::InvalidArgument(format!(
                "The channel name is limited to {MAX_CHANNEL_NAME} characters."
            )));
        }

        let record = self.resolve_owned(actor).await?;
        self.gateway.rename_channel(record.channel_id, &name).await?;
        Ok(Reply::Renamed { name })
    }

    async fn expire(&self, actor: UserId, minutes: i64) -> Result<Reply> {
        if !(1..=self.max_expiry_minutes).contains(&minutes) {
            return Err(Error::InvalidArgument(format!(
                "Minutes must be between 1 and {}.",
                self.max_expiry_minutes
            )));
        }

        let record = self.resolve_owned(actor).await?;
        let when = Utc::now() + Duration::minutes(minutes);
        self.write()
            .set_expiry(record.channel_id, when)
            // Reaped between resolve and mutation.
            .map_err(|_| Error::ChannelGone)?;
        Ok(Reply::ExpirySet { minutes })
    }

    async fn transfer(&self, actor: UserId, new_owner: UserId) -> Result<Reply> {
        if new_owner == actor {
            return Err(Error::InvalidArgument(
                "You already own this channel.".into(),
            ));
        }

        let record = self.resolve_owned(actor).await?;
        self.write()
            .transfer_ownership(record.channel_id, actor, new_owner)
            .map_err(|err| match err {
                registry::Error::AlreadyOwned { .. } => Error::TargetAlreadyOwns,
                registry::Error::NotOwned { .. } => Error::NotOwned,
                _ => Error::ChannelGone,
            })?;

        // Flip the manage overwrites at the platform. The registry transfer
        // stands even if these fail; the next pass of normal use surfaces it.
        self.gateway
            .set_manage(record.channel_id, new_owner, true)
            .await?;
        self.gateway
            .set_manage(record.channel_id, actor, false)
            .await?;
        info!(channel = %record.channel_id, %actor, %new_owner, "room ownership transferred");
        Ok(Reply::Transferred { new_owner })
    }

    async fn purge(&self, channel: ChannelId, amount: i64) -> Result<Reply> {
        if !PURGE_RANGE.contains(&amount) {
            return Err(Error::InvalidArgument(
                "You can only delete between 1 and 100 messages.".into(),
            ));
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let count = self.gateway.purge_messages(channel, amount as u8).await?;
        Ok(Reply::Purged { count })
    }

    /// The actor's room, verified to still exist at the platform.
    ///
    /// A stale entry is evicted here so the registry converges without
    /// waiting for the next reaper pass.
    async fn resolve_owned(&self, actor: UserId) -> Result<TempChannel> {
        let record = self
            .read()
            .lookup_by_owner(actor)
            .cloned()
            .ok_or(Error::NotOwned)?;

        let probe = self.gateway.probe(record.guild_id, record.channel_id).await?;
        if !probe.exists {
            self.write().remove(record.channel_id);
            debug!(%actor, channel = %record.channel_id, "evicted stale room entry");
            return Err(Error::ChannelGone);
        }
        Ok(record)
    }

    fn read(&self) -> RwLockReadGuard<'_, TempChannelRegistry> {
        self.registry.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, TempChannelRegistry> {
        self.registry.write().unwrap_or_else(|e| e.into_inner())
    }
}

/// Room name derived from the member's display name, capped at the platform
/// limit.
fn room_name(display_name: &str) -> String {
    let name = format!("{display_name}'s channel");
    if name.chars().count() <= MAX_CHANNEL_NAME {
        name
    } else {
        name.chars().take(MAX_CHANNEL_NAME).collect()
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        sync::{
            Mutex,
            atomic::{AtomicU64, Ordering},
        },
    };

    use async_trait::async_trait;

    use {
        tempvox_platform::{ChannelProbe, Result as GatewayResult, SetupOutcome},
        tempvox_registry::TempChannelRegistry,
    };

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Create { name: String },
        Delete { channel: ChannelId, reason: String },
        Connect { channel: ChannelId, target: Principal, allow: bool },
        Manage { channel: ChannelId, user: UserId, allow: bool },
        Move { user: UserId, channel: ChannelId },
        Rename { channel: ChannelId, name: String },
        Purge { channel: ChannelId, amount: u8 },
        Setup,
    }

    /// Scripted gateway: probe results come from a map, everything else is
    /// recorded.
    struct MockGateway {
        probes: Mutex<HashMap<ChannelId, ChannelProbe>>,
        next_channel: AtomicU64,
        calls: Mutex<Vec<Call>>,
    }

    impl MockGateway {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                probes: Mutex::new(HashMap::new()),
                next_channel: AtomicU64::new(1000),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn set_probe(&self, channel: ChannelId, probe: ChannelProbe) {
            self.probes.lock().unwrap().insert(channel, probe);
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: Call) {
            self.calls.lock().unwrap().push(call);
        }
    }

    #[async_trait]
    impl VoiceGateway for MockGateway {
        async fn create_voice_channel(&self, req: CreateRoom) -> GatewayResult<ChannelId> {
            let channel = ChannelId(self.next_channel.fetch_add(1, Ordering::SeqCst));
            self.set_probe(channel, ChannelProbe::occupied(1));
            self.record(Call::Create { name: req.name });
            Ok(channel)
        }

        async fn delete_channel(&self, channel: ChannelId, reason: &str) -> GatewayResult<()> {
            self.probes.lock().unwrap().remove(&channel);
            self.record(Call::Delete {
                channel,
                reason: reason.into(),
            });
            Ok(())
        }

        async fn set_connect(
            &self,
            _guild: GuildId,
            channel: ChannelId,
            target: Principal,
            allow: bool,
        ) -> GatewayResult<()> {
            self.record(Call::Connect {
                channel,
                target,
                allow,
            });
            Ok(())
        }

        async fn set_manage(&self, channel: ChannelId, user: UserId, allow: bool) -> GatewayResult<()> {
            self.record(Call::Manage {
                channel,
                user,
                allow,
            });
            Ok(())
        }

        async fn move_member(
            &self,
            _guild: GuildId,
            user: UserId,
            channel: ChannelId,
        ) -> GatewayResult<()> {
            self.record(Call::Move { user, channel });
            Ok(())
        }

        async fn rename_channel(&self, channel: ChannelId, name: &str) -> GatewayResult<()> {
            self.record(Call::Rename {
                channel,
                name: name.into(),
            });
            Ok(())
        }

        async fn probe(&self, _guild: GuildId, channel: ChannelId) -> GatewayResult<ChannelProbe> {
            Ok(self
                .probes
                .lock()
                .unwrap()
                .get(&channel)
                .copied()
                .unwrap_or(ChannelProbe::GONE))
        }

        async fn purge_messages(&self, channel: ChannelId, amount: u8) -> GatewayResult<usize> {
            self.record(Call::Purge { channel, amount });
            Ok(amount as usize)
        }

        async fn ensure_join_channel(
            &self,
            _guild: GuildId,
            _category_name: &str,
            _join_name: &str,
        ) -> GatewayResult<SetupOutcome> {
            self.record(Call::Setup);
            Ok(SetupOutcome::Created)
        }
    }

    const GUILD: GuildId = GuildId(1);
    const ACTOR: UserId = UserId(42);

    fn service(gateway: Arc<MockGateway>) -> (CommandService, SharedRegistry) {
        let registry = TempChannelRegistry::shared();
        let svc = CommandService::new(
            Arc::clone(&registry),
            gateway,
            SetupNames {
                category_name: "Voice Channels".into(),
                join_channel_name: "Join to Create".into(),
            },
        );
        (svc, registry)
    }

    fn seed_room(registry: &SharedRegistry, gateway: &MockGateway, channel: ChannelId) {
        registry
            .write()
            .unwrap()
            .create(ACTOR, GUILD, channel)
            .unwrap();
        gateway.set_probe(channel, ChannelProbe::occupied(1));
    }

    #[tokio::test]
    async fn lock_without_room_is_not_owned() {
        let gateway = MockGateway::new();
        let (svc, _registry) = service(Arc::clone(&gateway));

        let err = svc.dispatch(ACTOR, Command::Lock).await.unwrap_err();
        assert!(matches!(err, Error::NotOwned));
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn lock_denies_connect_for_everyone() {
        let gateway = MockGateway::new();
        let (svc, registry) = service(Arc::clone(&gateway));
        seed_room(&registry, &gateway, ChannelId(100));

        let reply = svc.dispatch(ACTOR, Command::Lock).await.unwrap();
        assert_eq!(reply, Reply::Locked);
        assert!(gateway.calls().contains(&Call::Connect {
            channel: ChannelId(100),
            target: Principal::Everyone,
            allow: false,
        }));
    }

    #[tokio::test]
    async fn gone_channel_is_evicted_lazily() {
        let gateway = MockGateway::new();
        let (svc, registry) = service(Arc::clone(&gateway));
        registry
            .write()
            .unwrap()
            .create(ACTOR, GUILD, ChannelId(100))
            .unwrap();
        // No probe entry: the platform does not know the channel.

        let err = svc.dispatch(ACTOR, Command::Lock).await.unwrap_err();
        assert!(matches!(err, Error::ChannelGone));
        assert!(registry.read().unwrap().is_empty());

        // A second attempt now reports no ownership at all.
        let err = svc.dispatch(ACTOR, Command::Lock).await.unwrap_err();
        assert!(matches!(err, Error::NotOwned));
    }

    #[tokio::test]
    async fn permit_and_reject_route_the_principal() {
        let gateway = MockGateway::new();
        let (svc, registry) = service(Arc::clone(&gateway));
        seed_room(&registry, &gateway, ChannelId(100));

        let target = Principal::Member(UserId(7));
        let reply = svc
            .dispatch(ACTOR, Command::Permit { target })
            .await
            .unwrap();
        assert_eq!(
            reply,
            Reply::ConnectChanged {
                target,
                allow: true
            }
        );

        let role = Principal::Role(tempvox_platform::RoleId(9));
        svc.dispatch(ACTOR, Command::Reject { target: role })
            .await
            .unwrap();
        assert!(gateway.calls().contains(&Call::Connect {
            channel: ChannelId(100),
            target: role,
            allow: false,
        }));
    }

    #[tokio::test]
    async fn rename_validates_the_name() {
        let gateway = MockGateway::new();
        let (svc, registry) = service(Arc::clone(&gateway));
        seed_room(&registry, &gateway, ChannelId(100));

        let err = svc
            .dispatch(ACTOR, Command::Rename { name: "   ".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));

        let err = svc
            .dispatch(ACTOR, Command::Rename {
                name: "x".repeat(101),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));

        let reply = svc
            .dispatch(ACTOR, Command::Rename {
                name: "study hall".into(),
            })
            .await
            .unwrap();
        assert_eq!(reply, Reply::Renamed {
            name: "study hall".into()
        });
        assert!(gateway.calls().contains(&Call::Rename {
            channel: ChannelId(100),
            name: "study hall".into(),
        }));
    }

    #[tokio::test]
    async fn expire_rejects_out_of_range_minutes() {
        let gateway = MockGateway::new();
        let (svc, registry) = service(Arc::clone(&gateway));
        seed_room(&registry, &gateway, ChannelId(100));

        for minutes in [0, -5, 1441] {
            let err = svc
                .dispatch(ACTOR, Command::Expire { minutes })
                .await
                .unwrap_err();
            assert!(matches!(err, Error::InvalidArgument(_)), "minutes={minutes}");
        }
        assert!(registry
            .read()
            .unwrap()
            .lookup_channel(ChannelId(100))
            .unwrap()
            .expires_at
            .is_none());
    }

    #[tokio::test]
    async fn expire_sets_a_deadline() {
        let gateway = MockGateway::new();
        let (svc, registry) = service(Arc::clone(&gateway));
        seed_room(&registry, &gateway, ChannelId(100));

        let before = Utc::now();
        let reply = svc
            .dispatch(ACTOR, Command::Expire { minutes: 10 })
            .await
            .unwrap();
        let after = Utc::now();
        assert_eq!(reply, Reply::ExpirySet { minutes: 10 });

        let deadline = registry
            .read()
            .unwrap()
            .lookup_channel(ChannelId(100))
            .unwrap()
            .expires_at
            .unwrap();
        assert!(deadline >= before + Duration::minutes(10));
        assert!(deadline <= after + Duration::minutes(10));
    }

    #[tokio::test]
    async fn transfer_moves_registry_and_flips_manage() {
        let gateway = MockGateway::new();
        let (svc, registry) = service(Arc::clone(&gateway));
        seed_room(&registry, &gateway, ChannelId(50));

        let new_owner = UserId(2);
        let reply = svc
            .dispatch(ACTOR, Command::Transfer { new_owner })
            .await
            .unwrap();
        assert_eq!(reply, Reply::Transferred { new_owner });

        {
            let reg = registry.read().unwrap();
            assert!(reg.lookup_by_owner(ACTOR).is_none());
            assert_eq!(reg.lookup_by_owner(new_owner).unwrap().owner_id, new_owner);
        }
        let calls = gateway.calls();
        assert!(calls.contains(&Call::Manage {
            channel: ChannelId(50),
            user: new_owner,
            allow: true,
        }));
        assert!(calls.contains(&Call::Manage {
            channel: ChannelId(50),
            user: ACTOR,
            allow: false,
        }));
    }

    #[tokio::test]
    async fn transfer_to_self_is_rejected() {
        let gateway = MockGateway::new();
        let (svc, registry) = service(Arc::clone(&gateway));
        seed_room(&registry, &gateway, ChannelId(50));

        let err = svc
            .dispatch(ACTOR, Command::Transfer { new_owner: ACTOR })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn transfer_to_an_existing_owner_is_rejected() {
        let gateway = MockGateway::new();
        let (svc, registry) = service(Arc::clone(&gateway));
        seed_room(&registry, &gateway, ChannelId(50));
        registry
            .write()
            .unwrap()
            .create(UserId(2), GUILD, ChannelId(60))
            .unwrap();
        gateway.set_probe(ChannelId(60), ChannelProbe::occupied(1));

        let err = svc
            .dispatch(ACTOR, Command::Transfer {
                new_owner: UserId(2),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::TargetAlreadyOwns));
        // Nothing moved.
        assert_eq!(
            registry
                .read()
                .unwrap()
                .lookup_by_owner(ACTOR)
                .unwrap()
                .channel_id,
            ChannelId(50)
        );
    }

    #[tokio::test]
    async fn purge_validates_the_amount() {
        let gateway = MockGateway::new();
        let (svc, _registry) = service(Arc::clone(&gateway));

        for amount in [0, -1, 101] {
            let err = svc
                .dispatch(ACTOR, Command::Purge {
                    channel: ChannelId(5),
                    amount,
                })
                .await
                .unwrap_err();
            assert!(matches!(err, Error::InvalidArgument(_)), "amount={amount}");
        }
        assert!(gateway.calls().is_empty());

        let reply = svc
            .dispatch(ACTOR, Command::Purge {
                channel: ChannelId(5),
                amount: 25,
            })
            .await
            .unwrap();
        assert_eq!(reply, Reply::Purged { count: 25 });
    }

    #[tokio::test]
    async fn setup_routes_to_the_gateway() {
        let gateway = MockGateway::new();
        let (svc, _registry) = service(Arc::clone(&gateway));

        let reply = svc
            .dispatch(ACTOR, Command::Setup { guild: GUILD })
            .await
            .unwrap();
        assert_eq!(reply, Reply::SetupComplete(SetupOutcome::Created));
        assert_eq!(gateway.calls(), vec![Call::Setup]);
    }

    #[tokio::test]
    async fn provision_creates_registers_and_moves() {
        let gateway = MockGateway::new();
        let (svc, registry) = service(Arc::clone(&gateway));

        let outcome = svc
            .provision_on_join(GUILD, ACTOR, "ada", Some(ChannelId(9)))
            .await
            .unwrap();
        let ProvisionOutcome::Created(channel) = outcome else {
            panic!("expected a fresh room, got {outcome:?}");
        };

        let record = registry
            .read()
            .unwrap()
            .lookup_by_owner(ACTOR)
            .cloned()
            .unwrap();
        assert_eq!(record.channel_id, channel);
        assert!(record.expires_at.is_none());

        let calls = gateway.calls();
        assert!(calls.contains(&Call::Create {
            name: "ada's channel".into()
        }));
        assert!(calls.contains(&Call::Move {
            user: ACTOR,
            channel
        }));
    }

    #[tokio::test]
    async fn provision_reuses_a_live_room() {
        let gateway = MockGateway::new();
        let (svc, registry) = service(Arc::clone(&gateway));
        seed_room(&registry, &gateway, ChannelId(100));
        registry
            .write()
            .unwrap()
            .set_expiry(ChannelId(100), Utc::now())
            .unwrap();

        let outcome = svc
            .provision_on_join(GUILD, ACTOR, "ada", None)
            .await
            .unwrap();
        assert_eq!(outcome, ProvisionOutcome::Reused(ChannelId(100)));

        // Still exactly one room, no create call, and the pending deadline
        // was cancelled by the rejoin.
        let reg = registry.read().unwrap();
        assert_eq!(reg.len(), 1);
        assert!(reg.lookup_channel(ChannelId(100)).unwrap().expires_at.is_none());
        drop(reg);
        let calls = gateway.calls();
        assert!(!calls.iter().any(|c| matches!(c, Call::Create { .. })));
        assert!(calls.contains(&Call::Move {
            user: ACTOR,
            channel: ChannelId(100)
        }));
    }

    #[tokio::test]
    async fn provision_replaces_a_stale_room() {
        let gateway = MockGateway::new();
        let (svc, registry) = service(Arc::clone(&gateway));
        registry
            .write()
            .unwrap()
            .create(ACTOR, GUILD, ChannelId(100))
            .unwrap();
        // No probe entry: the old room is gone at the platform.

        let outcome = svc
            .provision_on_join(GUILD, ACTOR, "ada", None)
            .await
            .unwrap();
        let ProvisionOutcome::Created(channel) = outcome else {
            panic!("expected a fresh room, got {outcome:?}");
        };
        assert_ne!(channel, ChannelId(100));

        let reg = registry.read().unwrap();
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.lookup_by_owner(ACTOR).unwrap().channel_id, channel);
    }

    #[test]
    fn room_names_are_capped() {
        assert_eq!(room_name("ada"), "ada's channel");
        let long = room_name(&"x".repeat(200));
        assert_eq!(long.chars().count(), 100);
    }
}
