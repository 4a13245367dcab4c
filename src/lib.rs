//! cinequery: query translation and response shaping for a movie-catalog
//! document API.
//!
//! The engine turns one flat, untyped query string into one validated
//! `QueryPlan` (filter tree + sort + projection + pagination), hands it to
//! a [`store::DocumentStore`], and shapes the resulting canonical documents
//! into the payload of the requested API version. Everything client-facing
//! is validated against static resource descriptors before storage is
//! touched.

pub mod config;
pub mod errors;
pub mod logger;
pub mod query;
pub mod resource;
pub mod shape;
pub mod store;

use crate::config::CatalogConfig;
use crate::errors::ApiError;
use crate::query::{QueryPlan, RawQuery, total_pages};
use crate::resource::ResourceDescriptor;
use crate::shape::{ApiVersion, DocsResponse, shape_document};
use crate::store::DocumentStore;
use std::collections::HashMap;
use std::sync::Arc;

/// The catalog facade: resource descriptors plus a storage collaborator.
///
/// Descriptors are immutable once the catalog is built; `find` creates only
/// request-local state, so one `Catalog` serves any number of concurrent
/// requests without synchronization.
pub struct Catalog {
    resources: HashMap<String, ResourceDescriptor>,
    store: Arc<dyn DocumentStore>,
}

impl Catalog {
    /// Builds a catalog with the built-in movie/person/review resources and
    /// default limits.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self::with_config(store, &CatalogConfig::default())
    }

    /// Builds a catalog with the built-in resources under a custom config.
    #[must_use]
    pub fn with_config(store: Arc<dyn DocumentStore>, config: &CatalogConfig) -> Self {
        let mut resources = HashMap::new();
        for descriptor in resource::builtin(config) {
            resources.insert(descriptor.name().to_string(), descriptor);
        }
        Self { resources, store }
    }

    /// Registers an additional resource descriptor. Descriptors without a
    /// registered response shape are shaped by passthrough rendering.
    pub fn add_resource(&mut self, descriptor: ResourceDescriptor) {
        self.resources.insert(descriptor.name().to_string(), descriptor);
    }

    /// # Errors
    /// `ApiError::UnknownResource` for an unregistered resource name.
    pub fn resource(&self, name: &str) -> Result<&ResourceDescriptor, ApiError> {
        self.resources.get(name).ok_or_else(|| ApiError::UnknownResource(name.to_string()))
    }

    /// Builds the query plan for a resource without executing it.
    ///
    /// # Errors
    /// Any validation failure from plan construction.
    pub fn plan(&self, resource: &str, raw: &RawQuery) -> Result<QueryPlan, ApiError> {
        query::build_plan(self.resource(resource)?, raw)
    }

    /// The universal find-by-query operation: validates and compiles the
    /// raw query, executes the plan against the storage collaborator, and
    /// shapes one page of documents for the requested API version.
    ///
    /// # Errors
    /// Validation failures before any storage call; `ApiError::Storage`
    /// wrapping the collaborator's failure unchanged afterwards.
    pub fn find(
        &self,
        resource: &str,
        version: ApiVersion,
        raw: &RawQuery,
    ) -> Result<DocsResponse, ApiError> {
        let descriptor = self.resource(resource)?;
        let plan = query::build_plan(descriptor, raw)?;
        log::debug!(
            "find resource={resource} version={} page={} limit={} skip={}",
            version.as_str(),
            plan.page.page,
            plan.page.limit,
            plan.page.skip
        );
        let output = self.store.execute(descriptor.collection(), &plan).map_err(|e| {
            log::warn!("storage failure for resource={resource}: {e}");
            ApiError::Storage(e)
        })?;
        let docs = output
            .docs
            .iter()
            .map(|doc| shape_document(resource, version, doc))
            .collect();
        Ok(DocsResponse {
            docs,
            page: plan.page.page,
            limit: plan.page.limit,
            total: output.total,
            pages: total_pages(output.total, plan.page.limit),
        })
    }
}

/// Initializes the logging system. Call once at startup, before serving.
///
/// # Errors
/// Propagates logger initialization failures.
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    logger::init()
}
