//! Session-scoped, in-memory entity stores.
//!
//! Nothing here outlives the process. Each store hands out sequential ids
//! starting at 1 and lists records in insertion order.

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::model::{Contact, Event, Quote, ReservedMaterial};

pub type EntityId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{kind} #{id} not found")]
    NotFound { kind: &'static str, id: EntityId },
}

/// A record type that can live in an [`EntityStore`].
pub trait Entity: Clone {
    const KIND: &'static str;
    type Patch;

    /// Overwrites the fields present in `patch`, leaving the others alone.
    fn apply(&mut self, patch: Self::Patch);

    /// `needle` is already lower-cased.
    fn matches(&self, id: EntityId, needle: &str) -> bool;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record<T> {
    pub id: EntityId,
    #[serde(flatten)]
    pub data: T,
}

#[derive(Debug, Clone)]
pub struct EntityStore<T> {
    records: Vec<Record<T>>,
    next_id: EntityId,
}

impl<T> Default for EntityStore<T> {
    fn default() -> Self {
        EntityStore {
            records: Vec::new(),
            next_id: 1,
        }
    }
}

impl<T: Entity> EntityStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, data: T) -> Record<T> {
        let id = self.next_id;
        self.next_id += 1;
        let record = Record { id, data };
        self.records.push(record.clone());
        info!(kind = T::KIND, id, "record created");
        record
    }

    pub fn update(&mut self, id: EntityId, patch: T::Patch) -> Result<Record<T>, StoreError> {
        let record = self.get_mut(id)?;
        record.data.apply(patch);
        info!(kind = T::KIND, id, "record updated");
        Ok(record.clone())
    }

    pub fn get(&self, id: EntityId) -> Option<&Record<T>> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn list(&self) -> &[Record<T>] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Case-insensitive substring search. A blank term returns everything.
    pub fn search(&self, term: &str) -> Vec<&Record<T>> {
        let needle = term.trim().to_lowercase();
        let hits: Vec<_> = self
            .records
            .iter()
            .filter(|r| needle.is_empty() || r.data.matches(r.id, &needle))
            .collect();
        debug!(kind = T::KIND, term, hits = hits.len(), "search");
        hits
    }

    fn get_mut(&mut self, id: EntityId) -> Result<&mut Record<T>, StoreError> {
        match self.records.iter_mut().find(|r| r.id == id) {
            Some(record) => Ok(record),
            None => {
                warn!(kind = T::KIND, id, "record not found");
                Err(StoreError::NotFound { kind: T::KIND, id })
            }
        }
    }
}

impl EntityStore<Event> {
    pub fn assign_technicians(
        &mut self,
        event_id: EntityId,
        technician_ids: Vec<EntityId>,
    ) -> Result<Record<Event>, StoreError> {
        let record = self.get_mut(event_id)?;
        record.data.assigned_technicians = technician_ids;
        info!(
            id = event_id,
            technicians = record.data.assigned_technicians.len(),
            "technicians assigned"
        );
        Ok(record.clone())
    }

    pub fn reserve_materials(
        &mut self,
        event_id: EntityId,
        materials: Vec<ReservedMaterial>,
    ) -> Result<Record<Event>, StoreError> {
        let record = self.get_mut(event_id)?;
        record.data.reserved_materials = materials;
        info!(id = event_id, lines = record.data.reserved_materials.len(), "materials reserved");
        Ok(record.clone())
    }
}

/// Every store of one session, handed explicitly to whatever needs it.
#[derive(Debug, Clone, Default)]
pub struct Workspace {
    pub contacts: EntityStore<Contact>,
    pub events: EntityStore<Event>,
    pub quotes: EntityStore<Quote>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }
}
