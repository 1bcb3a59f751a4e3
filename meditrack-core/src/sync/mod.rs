//! Synchronization layer between the remote table store and the local
//! fallback store.
//!
//! The layer runs in one of two modes, fixed when it is built. In
//! [`Mode::Remote`] reads go to the remote store and are mirrored locally,
//! falling back to the local copy when the remote fails. Writes go to the
//! remote only, and a failed remote write changes nothing. In
//! [`Mode::LocalOnly`] everything is served from the local store, which
//! seeds itself with example records on first use.

mod policy;
mod record;

use std::fmt;

use chrono::Utc;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::entity::{Entity, EntityFields, ListQuery};
use crate::error::{RemoteError, SyncError, ValidationError};
use crate::ids::next_id;
use crate::remote::{RemoteSettings, RemoteStore, RestClient};
use crate::sort::sort_entities;
use crate::store::{KeyValueStore, LocalCollections};

pub use policy::{AfterWrite, EntityPolicy, Policies};

use record::{
    complete, from_record, from_remote, merge, row_id, timestamp, to_record, validate,
};

/// Where reads and writes are routed for the whole session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Remote,
    LocalOnly,
}

impl Mode {
    /// `Remote` exactly when both the endpoint and the key are configured.
    pub fn detect(settings: &RemoteSettings) -> Self {
        if settings.is_configured() {
            Mode::Remote
        } else {
            Mode::LocalOnly
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Remote => write!(f, "remote"),
            Mode::LocalOnly => write!(f, "local-only"),
        }
    }
}

/// Where the records of a [`Listing`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingSource {
    Remote,
    Cache,
    Fixtures,
}

impl fmt::Display for ListingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListingSource::Remote => write!(f, "remote"),
            ListingSource::Cache => write!(f, "local cache"),
            ListingSource::Fixtures => write!(f, "example data"),
        }
    }
}

/// Result of a list read.
#[derive(Debug, Clone)]
pub struct Listing<E> {
    pub records: Vec<E>,
    pub source: ListingSource,
    /// Set when the remote read failed and local data was served instead.
    pub warning: Option<String>,
}

/// Routes entity reads and writes to the remote or local store.
pub struct SyncLayer<S, R = RestClient> {
    mode: Mode,
    local: LocalCollections<S>,
    remote: Option<R>,
    policies: Policies,
    write_lock: Mutex<()>,
}

impl<S: KeyValueStore> SyncLayer<S, RestClient> {
    /// Builds a layer from configuration, talking HTTP when the remote is
    /// configured.
    pub fn connect(store: S, settings: &RemoteSettings, policies: Policies) -> Self {
        let remote = match Mode::detect(settings) {
            Mode::Remote => match RestClient::from_settings(settings) {
                Ok(client) => client,
                Err(e) => {
                    warn!(error = %e, "remote store misconfigured, running local-only");
                    None
                }
            },
            Mode::LocalOnly => None,
        };
        Self::new(store, remote, policies)
    }

    /// Builds a layer that never talks to a remote store.
    pub fn local_only(store: S) -> Self {
        Self::new(store, None, Policies::default())
    }
}

impl<S: KeyValueStore, R: RemoteStore> SyncLayer<S, R> {
    /// Builds a layer around an explicit remote client. Passing `None`
    /// selects [`Mode::LocalOnly`].
    pub fn new(store: S, remote: Option<R>, policies: Policies) -> Self {
        let mode = if remote.is_some() {
            Mode::Remote
        } else {
            Mode::LocalOnly
        };
        debug!(%mode, "sync layer ready");

        Self {
            mode,
            local: LocalCollections::new(store),
            remote,
            policies,
            write_lock: Mutex::new(()),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn policies(&self) -> &Policies {
        &self.policies
    }

    pub fn local(&self) -> &LocalCollections<S> {
        &self.local
    }

    pub fn remote(&self) -> Option<&R> {
        self.remote.as_ref()
    }

    /// Reads a collection. Never fails: remote failures degrade to the local
    /// copy and carry a warning.
    pub async fn list<E: Entity>(&self, query: ListQuery) -> Listing<E> {
        let Some(remote) = self.remote.as_ref() else {
            return self.list_local(&query);
        };

        match self.fetch::<E>(remote, &query).await {
            Ok(records) => {
                if query.limit.is_none() {
                    let _guard = self.write_lock.lock().await;
                    self.mirror(&records);
                }
                Listing {
                    records,
                    source: ListingSource::Remote,
                    warning: None,
                }
            }
            Err(e) => {
                warn!(kind = %E::KIND, error = %e, "remote read failed, serving local data");
                let mut listing = self.list_local(&query);
                listing.warning = Some(format!(
                    "Could not load {} from the remote store, showing saved data instead. ({})",
                    E::KIND,
                    e
                ));
                listing
            }
        }
    }

    /// Looks a single record up by id.
    pub async fn get<E: Entity>(&self, id: &str) -> Option<E> {
        self.list::<E>(ListQuery::default_for(E::KIND))
            .await
            .records
            .into_iter()
            .find(|record| record.id() == id)
    }

    /// Validates `fields`, assigns an identifier and stores a new record.
    pub async fn create<E: Entity>(&self, fields: E::Fields) -> Result<E, SyncError> {
        let kind = E::KIND;
        let mut row = to_record(kind, &fields)?;
        validate(kind, &row, E::Fields::REQUIRED_ON_CREATE)?;

        let now = timestamp(Utc::now());
        row.insert("created_at".into(), now.clone());
        row.insert("updated_at".into(), now);

        let _guard = self.write_lock.lock().await;

        match self.remote.as_ref() {
            Some(remote) => {
                let client_id = self.policies.get(kind).ids.client_generates_id();
                let id = if client_id {
                    let existing = remote.select(kind.table(), &ListQuery::default()).await?;
                    next_id(kind.id_prefix(), existing.iter().filter_map(row_id))
                } else {
                    String::new()
                };
                row.insert("id".into(), Value::String(id));

                // Insert the full record so create-time defaults are stored too.
                let mut row = complete::<E>(kind, row)?;
                if !client_id {
                    row.remove("id");
                }

                debug!(%kind, id = ?row_id(&row), "creating remotely");
                let stored = remote.insert(kind.table(), vec![row.clone()]).await?;
                let row = stored.into_iter().next().unwrap_or(row);
                let created: E = from_remote(kind, row)?;

                let pushed = created.clone();
                self.after_remote_write::<E>(remote, move |records| records.push(pushed))
                    .await;
                Ok(created)
            }
            None => {
                let mut records = self.local.load::<E>().records;
                let id = next_id(kind.id_prefix(), records.iter().map(|r| r.id()));
                debug!(%kind, %id, "creating locally");
                row.insert("id".into(), Value::String(id));

                let created: E = from_record(kind, row)?;
                records.push(created.clone());
                self.local.set(&records)?;
                Ok(created)
            }
        }
    }

    /// Applies the supplied fields to the record with `id` and refreshes its
    /// update timestamp.
    pub async fn update<E: Entity>(&self, id: &str, fields: E::Fields) -> Result<E, SyncError> {
        let kind = E::KIND;
        if id.trim().is_empty() {
            return Err(ValidationError::MissingId(kind).into());
        }

        let mut patch = to_record(kind, &fields)?;
        validate(kind, &patch, E::Fields::REQUIRED_ON_UPDATE)?;
        patch.remove("id");
        patch.remove("created_at");
        patch.insert("updated_at".into(), timestamp(Utc::now()));

        let _guard = self.write_lock.lock().await;

        match self.remote.as_ref() {
            Some(remote) => {
                debug!(%kind, id, "updating remotely");
                let rows = remote.update(kind.table(), patch, "id", id).await?;
                let Some(row) = rows.into_iter().next() else {
                    return Err(SyncError::NotFound {
                        kind,
                        id: id.to_string(),
                    });
                };
                let updated: E = from_remote(kind, row)?;

                let replacement = updated.clone();
                self.after_remote_write::<E>(remote, move |records| {
                    if let Some(slot) = records.iter_mut().find(|r| r.id() == replacement.id()) {
                        *slot = replacement;
                    }
                })
                .await;
                Ok(updated)
            }
            None => {
                let mut records = self.local.load::<E>().records;
                let Some(index) = records.iter().position(|r| r.id() == id) else {
                    return Err(SyncError::NotFound {
                        kind,
                        id: id.to_string(),
                    });
                };

                debug!(%kind, id, "updating locally");
                let current = to_record(kind, &records[index])?;
                let updated: E = from_record(kind, merge(current, &patch))?;
                records[index] = updated.clone();
                self.local.set(&records)?;
                Ok(updated)
            }
        }
    }

    /// Removes the record with `id`. Removing an unknown id succeeds.
    pub async fn delete<E: Entity>(&self, id: &str) -> Result<(), SyncError> {
        let kind = E::KIND;
        if id.trim().is_empty() {
            return Err(ValidationError::MissingId(kind).into());
        }

        let _guard = self.write_lock.lock().await;

        match self.remote.as_ref() {
            Some(remote) => {
                debug!(%kind, id, "deleting remotely");
                remote.delete(kind.table(), "id", id).await?;
                self.after_remote_write::<E>(remote, |records| records.retain(|r| r.id() != id))
                    .await;
            }
            None => {
                let mut records = self.local.load::<E>().records;
                let before = records.len();
                records.retain(|r| r.id() != id);
                if records.len() != before {
                    debug!(%kind, id, "deleting locally");
                    self.local.set(&records)?;
                }
            }
        }
        Ok(())
    }

    async fn fetch<E: Entity>(&self, remote: &R, query: &ListQuery) -> Result<Vec<E>, RemoteError> {
        let rows = remote.select(E::KIND.table(), query).await?;
        rows.into_iter()
            .map(|row| from_remote(E::KIND, row))
            .collect()
    }

    fn list_local<E: Entity>(&self, query: &ListQuery) -> Listing<E> {
        let loaded = self.local.load::<E>();
        let mut records = loaded.records;

        if let Some(order) = &query.order {
            sort_entities(&mut records, order);
        }
        if let Some(limit) = query.limit {
            records.truncate(limit);
        }

        Listing {
            records,
            source: if loaded.seeded {
                ListingSource::Fixtures
            } else {
                ListingSource::Cache
            },
            warning: None,
        }
    }

    /// Overwrites the local copy with what the remote returned.
    fn mirror<E: Entity>(&self, records: &[E]) {
        if let Err(e) = self.local.set(records) {
            warn!(kind = %E::KIND, error = %e, "failed to mirror remote data locally");
        }
    }

    /// Brings the local mirror in line after a remote write succeeded. The
    /// write itself already happened, so failures here only log.
    async fn after_remote_write<E: Entity>(&self, remote: &R, patch: impl FnOnce(&mut Vec<E>)) {
        match self.policies.get(E::KIND).after_write {
            AfterWrite::Refetch => {
                match self.fetch::<E>(remote, &ListQuery::default_for(E::KIND)).await {
                    Ok(records) => self.mirror(&records),
                    Err(e) => {
                        warn!(kind = %E::KIND, error = %e, "re-fetch after write failed")
                    }
                }
            }
            AfterWrite::PatchCache => {
                let mut records = self.local.get::<E>();
                patch(&mut records);
                self.mirror(&records);
            }
        }
    }
}
