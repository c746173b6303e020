//! Operations desk for a small events business: contacts, events and
//! quotes kept in session memory, with form validation and derived payment
//! state.

pub mod config;
pub mod derived;
pub mod document;
pub mod form;
pub mod model;
pub mod report;
pub mod sample;
pub mod store;

pub use derived::PaymentStatus;
pub use form::{FieldErrors, Form};
pub use store::{EntityId, EntityStore, Record, StoreError, Workspace};
