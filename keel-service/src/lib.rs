//! Entity service orchestration for keel.
//!
//! [`EntityService`] exposes create, read-by-key, paged read, patch and
//! delete for one record type. It compiles and validates every request
//! against the record's shape before touching storage, then drives the
//! storage collaborators ([`Repository`], [`UnitOfWork`]) and projects
//! records to and from their external form through a [`Mapper`].
//!
//! The [`memory`] module provides a non-persistent collaborator set.

mod config;
mod error;
mod mapper;
pub mod memory;
mod patch;
mod repository;
mod service;

pub use config::ServiceConfig;
pub use error::{ErrorKind, FieldError, ServiceError, ServiceResult};
pub use mapper::{ConvertMapper, IdentityMapper, Mapper};
pub use patch::{Patch, PreparedPatch, apply};
pub use repository::{Repository, UnitOfWork};
pub use service::EntityService;
