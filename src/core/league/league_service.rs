use super::league_models::LeagueConfig;
use super::league_store::LeagueStore;
use crate::core::draft::TeamId;
use crate::core::store::StoreError;
use tokio::sync::Mutex;

#[derive(Debug, thiserror::Error)]
pub enum LeagueError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Team names cannot be empty.")]
    InvalidName,
    #[error("{0} is already registered.")]
    DuplicateTeam(String),
    #[error("{0} is not a registered team.")]
    UnknownTeam(String),
    #[error("The roster cap must be at least 1.")]
    InvalidRosterCap,
}

impl LeagueError {
    pub fn is_rejection(&self) -> bool {
        !matches!(self, LeagueError::Store(_))
    }
}

pub struct LeagueService<S: LeagueStore> {
    store: S,
    // Serializes read-modify-write updates.
    write_lock: Mutex<()>,
}

impl<S: LeagueStore> LeagueService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Stored config, or defaults for a guild that never configured anything.
    pub async fn get_config(&self, guild_id: u64) -> Result<LeagueConfig, LeagueError> {
        Ok(self
            .store
            .get_config(guild_id)
            .await?
            .unwrap_or_else(|| LeagueConfig::new(guild_id)))
    }

    pub async fn list_teams(&self, guild_id: u64) -> Result<Vec<TeamId>, LeagueError> {
        Ok(self.get_config(guild_id).await?.teams)
    }

    async fn update<F>(&self, guild_id: u64, apply: F) -> Result<LeagueConfig, LeagueError>
    where
        F: FnOnce(&mut LeagueConfig) -> Result<(), LeagueError> + Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut config = self.get_config(guild_id).await?;
        apply(&mut config)?;
        self.store.save_config(config.clone()).await?;
        Ok(config)
    }

    pub async fn add_team(&self, guild_id: u64, name: &str) -> Result<LeagueConfig, LeagueError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LeagueError::InvalidName);
        }
        let config = self
            .update(guild_id, |config| {
                if config.has_team(name) {
                    return Err(LeagueError::DuplicateTeam(name.to_string()));
                }
                config.teams.push(name.to_string());
                Ok(())
            })
            .await?;
        tracing::info!(guild_id, team = name, "Team registered");
        Ok(config)
    }

    pub async fn remove_team(
        &self,
        guild_id: u64,
        name: &str,
    ) -> Result<LeagueConfig, LeagueError> {
        let config = self
            .update(guild_id, |config| {
                let before = config.teams.len();
                config.teams.retain(|team| team != name);
                if config.teams.len() == before {
                    return Err(LeagueError::UnknownTeam(name.to_string()));
                }
                Ok(())
            })
            .await?;
        tracing::info!(guild_id, team = name, "Team removed");
        Ok(config)
    }

    pub async fn set_roster_cap(&self, guild_id: u64, cap: u32) -> Result<LeagueConfig, LeagueError> {
        if cap == 0 {
            return Err(LeagueError::InvalidRosterCap);
        }
        self.update(guild_id, |config| {
            config.roster_cap = cap;
            Ok(())
        })
        .await
    }

    pub async fn set_alerts_channel(
        &self,
        guild_id: u64,
        channel_id: Option<u64>,
    ) -> Result<LeagueConfig, LeagueError> {
        self.update(guild_id, |config| {
            config.alerts_channel_id = channel_id;
            Ok(())
        })
        .await
    }
}
