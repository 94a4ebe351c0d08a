use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use encoding_rs::Encoding;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::player::{default_player_record, PlayerRecord};

/// One campaign: players keyed by their chat user id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(default)]
    pub players: IndexMap<String, PlayerRecord>,
}

/// Whole file contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Datastore {
    #[serde(default)]
    pub sessions: IndexMap<String, SessionData>,
}

/// JSON-file backed player records. Single writer, no locking: callers load,
/// mutate and save within one command.
#[derive(Debug)]
pub struct Store {
    path: PathBuf,
    data: Datastore,
}

impl Store {
    /// Load `path`; a missing or empty file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let data = match read_text_auto(&path) {
            Ok(text) if text.trim().is_empty() => Datastore::default(),
            Ok(text) => serde_json::from_str(&text)
                .with_context(|| format!("failed to parse datastore JSON: {}", path.display()))?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "datastore missing; starting empty");
                Datastore::default()
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("failed to read datastore: {}", path.display())
                });
            }
        };
        Ok(Self { path, data })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn data(&self) -> &Datastore {
        &self.data
    }

    pub fn player(&self, session: &str, player: &str) -> Option<&PlayerRecord> {
        self.data.sessions.get(session)?.players.get(player)
    }

    /// The player's record, created from the default on first access.
    pub fn player_mut(&mut self, session: &str, player: &str) -> &mut PlayerRecord {
        self.data
            .sessions
            .entry(session.to_string())
            .or_default()
            .players
            .entry(player.to_string())
            .or_insert_with(|| {
                info!(session, player, "new player record");
                default_player_record()
            })
    }

    pub fn players<'a>(
        &'a self,
        session: &str,
    ) -> impl Iterator<Item = (&'a str, &'a PlayerRecord)> + 'a {
        self.data
            .sessions
            .get(session)
            .into_iter()
            .flat_map(|s| s.players.iter().map(|(id, rec)| (id.as_str(), rec)))
    }

    /// Write pretty JSON next to the target, then rename over it.
    pub fn save(&self) -> Result<()> {
        let text = serde_json::to_string_pretty(&self.data)
            .context("failed to serialize datastore")?;
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create directory: {}", dir.display()))?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, text)
            .with_context(|| format!("failed to write datastore: {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("failed to replace datastore: {}", self.path.display()))?;
        debug!(path = %self.path.display(), "datastore saved");
        Ok(())
    }
}

/// Read text, honouring a UTF-8/UTF-16 byte order mark if present.
pub fn read_text_auto(path: &Path) -> std::io::Result<String> {
    let bytes = fs::read(path)?;
    if let Some((enc, bom_len)) = Encoding::for_bom(&bytes) {
        let (cow, _, _) = enc.decode(&bytes[bom_len..]);
        Ok(cow.into_owned())
    } else {
        String::from_utf8(bytes).map_err(|e| std::io::Error::new(ErrorKind::InvalidData, e))
    }
}
