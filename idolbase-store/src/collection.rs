//! Keyed, in-memory collection of records of one entity kind.

use crate::error::{CollectionError, CollectionResult};
use idolbase_model::{Entity, EntityResult, Schema};
use idolbase_types::{CollectionTimestamp, RecordId};
use serde_json::Value;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use tracing::debug;

/// Data handed to a collection: a constructed record or a raw attribute bag.
#[derive(Debug, Clone, PartialEq)]
pub enum Incoming<E> {
    Record(E),
    Attributes(Value),
}

impl<E: Entity> Incoming<E> {
    /// Identity the data already carries, if any.
    fn embedded_identity(&self) -> Option<&str> {
        match self {
            Self::Record(record) => record.identity(),
            Self::Attributes(bag) => bag
                .get("id")
                .and_then(Value::as_str)
                .filter(|id| !id.is_empty()),
        }
    }

    fn into_record(self, identity: Option<&str>) -> EntityResult<E> {
        match self {
            Self::Record(mut record) => {
                if let Some(identity) = identity {
                    record.set_identity(identity);
                }
                Ok(record)
            }
            Self::Attributes(bag) => E::with_attributes(identity, &bag),
        }
    }
}

impl<E: Entity> From<Value> for Incoming<E> {
    fn from(bag: Value) -> Self {
        Self::Attributes(bag)
    }
}

/// Records of kind `E` keyed by identity.
///
/// The collection is dirty while `last_updated_at` differs from `created_at`:
/// every mutation advances `last_updated_at`, [`Collection::refresh`] catches
/// `created_at` up to it.
#[derive(Debug, Clone)]
pub struct Collection<E> {
    name: String,
    records: BTreeMap<String, E>,
    created_at: CollectionTimestamp,
    last_updated_at: CollectionTimestamp,
}

impl<E: Entity> Collection<E> {
    /// Creates an empty collection.
    ///
    /// Fails with `MissingCollectionName` for an empty name and
    /// `MissingEntityKind` when `E` has no kind tag.
    pub fn new(name: impl Into<String>) -> CollectionResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(CollectionError::MissingCollectionName);
        }
        if E::KIND.is_empty() {
            return Err(CollectionError::MissingEntityKind);
        }

        let created_at = CollectionTimestamp::now();
        Ok(Self {
            name,
            records: BTreeMap::new(),
            created_at,
            last_updated_at: created_at,
        })
    }

    /// Creates a collection holding `records`. Seeding does not make it dirty.
    pub fn with_seed(
        name: impl Into<String>,
        records: impl IntoIterator<Item = Incoming<E>>,
    ) -> CollectionResult<Self> {
        let mut collection = Self::new(name)?;
        collection.batch_add(records, true)?;
        Ok(collection)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &'static str {
        E::KIND
    }

    /// Schema of the bound entity kind.
    pub fn schema(&self) -> &'static Schema {
        E::schema()
    }

    pub fn created_at(&self) -> CollectionTimestamp {
        self.created_at
    }

    pub fn last_updated_at(&self) -> CollectionTimestamp {
        self.last_updated_at
    }

    pub fn is_dirty(&self) -> bool {
        self.created_at != self.last_updated_at
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in identity order.
    pub fn records(&self) -> impl Iterator<Item = &E> {
        self.records.values()
    }

    pub fn records_dict(&self) -> &BTreeMap<String, E> {
        &self.records
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.records.contains_key(identity)
    }

    /// Adds many records, each keyed by its own identity. Bags are keyed by
    /// their `id`; anything without one fails with `MissingIdentity`.
    ///
    /// Records before a failing entry stay added. Returns how many were added.
    pub fn batch_add(
        &mut self,
        records: impl IntoIterator<Item = Incoming<E>>,
        is_seed: bool,
    ) -> CollectionResult<usize> {
        let mut added = 0;
        let mut outcome: CollectionResult<()> = Ok(());

        for incoming in records {
            match incoming.into_record(None).and_then(|record| {
                let identity = record.identity_check()?.to_string();
                Ok((identity, record))
            }) {
                Ok((identity, record)) => {
                    self.records.insert(identity, record);
                    added += 1;
                }
                Err(e) => {
                    outcome = Err(e.into());
                    break;
                }
            }
        }

        if added > 0 && !is_seed {
            self.touch();
        }
        debug!(
            "Added {} {} record(s) to {} (seed={})",
            added,
            E::KIND,
            self.name,
            is_seed
        );
        outcome.map(|()| added)
    }

    /// Inserts a record under `identity`, overwriting any existing one.
    pub fn add(&mut self, identity: &str, data: Incoming<E>) -> CollectionResult<&E> {
        self.check_identity(identity, data.embedded_identity())?;
        let record = data.into_record(Some(identity))?;
        debug!("Added {} {} to {}", E::KIND, identity, self.name);
        Ok(self.put(identity, record))
    }

    /// Inserts a record under a freshly generated identity.
    pub fn insert_new(&mut self, bag: Value) -> CollectionResult<&E> {
        let identity = RecordId::generate();
        self.add(identity.as_str(), Incoming::Attributes(bag))
    }

    /// Merges `partial` into the record under `identity` and returns its
    /// fresh view.
    ///
    /// A failed merge marks the collection dirty only if it wrote fields
    /// before validation failed. A rejected bag leaves it untouched.
    pub fn update(&mut self, identity: &str, partial: &Value) -> CollectionResult<E::View> {
        let embedded = partial
            .get("id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty());
        self.check_identity(identity, embedded)?;

        let record = self
            .records
            .get_mut(identity)
            .ok_or_else(|| record_not_found(identity, &self.name))?;
        let before = record.core().clone();
        let merged = record.merge(partial);
        let changed = merged.is_ok() || *record.core() != before;

        if changed {
            self.touch();
            debug!("Updated {} {} in {}", E::KIND, identity, self.name);
        }
        Ok(merged?)
    }

    /// Builds a new record from `data` and puts it under `identity`,
    /// discarding whatever was there.
    pub fn replace(&mut self, identity: &str, data: Incoming<E>) -> CollectionResult<&E> {
        self.check_identity(identity, data.embedded_identity())?;
        let record = data.into_record(Some(identity))?;
        debug!("Replaced {} {} in {}", E::KIND, identity, self.name);
        Ok(self.put(identity, record))
    }

    /// Removes and returns the record, if present. Marks the collection
    /// dirty either way.
    pub fn remove(&mut self, identity: &str) -> Option<E> {
        let removed = self.records.remove(identity);
        self.touch();
        debug!(
            "Removed {} {} from {} (present={})",
            E::KIND,
            identity,
            self.name,
            removed.is_some()
        );
        removed
    }

    pub fn find_by_identity(&self, identity: &str) -> CollectionResult<&E> {
        self.records
            .get(identity)
            .ok_or_else(|| record_not_found(identity, &self.name))
    }

    /// Mutable lookup. Changes made through the reference are not tracked;
    /// prefer [`Collection::update`].
    pub fn find_by_identity_mut(&mut self, identity: &str) -> CollectionResult<&mut E> {
        self.records
            .get_mut(identity)
            .ok_or_else(|| record_not_found(identity, &self.name))
    }

    /// Accepts the current contents as clean.
    pub fn refresh(&mut self) {
        self.created_at = self.last_updated_at;
        debug!("Refreshed {}", self.name);
    }

    /// Drops every record and starts over as a new, clean collection.
    pub fn reset(&mut self) {
        self.records.clear();
        self.created_at = CollectionTimestamp::now();
        self.last_updated_at = self.created_at;
        debug!("Reset {}", self.name);
    }

    fn check_identity(&self, identity: &str, embedded: Option<&str>) -> CollectionResult<()> {
        match embedded {
            Some(embedded) if embedded != identity => Err(CollectionError::IdentityConflict {
                identity: identity.to_string(),
                embedded: embedded.to_string(),
            }),
            _ => Ok(()),
        }
    }

    fn put(&mut self, identity: &str, record: E) -> &E {
        self.touch();
        match self.records.entry(identity.to_string()) {
            Entry::Occupied(mut slot) => {
                slot.insert(record);
                slot.into_mut()
            }
            Entry::Vacant(slot) => slot.insert(record),
        }
    }

    fn touch(&mut self) {
        self.last_updated_at = self.last_updated_at.tick();
    }
}

fn record_not_found(identity: &str, collection: &str) -> CollectionError {
    CollectionError::RecordNotFound {
        identity: identity.to_string(),
        collection: collection.to_string(),
    }
}
