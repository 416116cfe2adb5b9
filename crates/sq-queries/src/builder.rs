//! Query Builder
//!
//! Owns the pagination, search, sort and filter states of one query and
//! assembles them into a [`QueryDescriptor`] or URL parameters. The capability
//! tables are resolved once from the schema and shared by the sort and filter
//! states.

use sq_core::config::QueryConfig;
use sq_core::{KeyPath, Operator, Order, Pagination, PaginationSnapshot, QueryResult, Schema};
use std::sync::Arc;
use tracing::debug;

use crate::capabilities::{Capabilities, CapabilityTable};
use crate::filters::{FilterEntry, FilterSnapshot, FilterState, FilterValue};
use crate::params::QueryParams;
use crate::query::QueryDescriptor;
use crate::search::SearchState;
use crate::sorts::{SortCriterion, SortState};

/// Starting state for a new builder
#[derive(Debug, Clone, Default)]
pub struct BuilderOptions {
    /// Page to start on (defaults to the configured default page)
    pub initial_page: Option<i64>,
    /// Page size (defaults to the configured default limit)
    pub page_size: Option<i64>,
    pub initial_search: Option<String>,
    /// Conditions applied as with `apply_filters(.., true)`
    pub initial_filters: Vec<FilterEntry>,
}

impl BuilderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn initial_page(mut self, page: i64) -> Self {
        self.initial_page = Some(page);
        self
    }

    pub fn page_size(mut self, limit: i64) -> Self {
        self.page_size = Some(limit);
        self
    }

    pub fn initial_search(mut self, term: impl Into<String>) -> Self {
        self.initial_search = Some(term.into());
        self
    }

    pub fn initial_filter(mut self, entry: FilterEntry) -> Self {
        self.initial_filters.push(entry);
        self
    }
}

/// Query state for one schema
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    capabilities: Capabilities,
    config: QueryConfig,
    pagination: Pagination,
    search: SearchState,
    sort: SortState,
    filters: FilterState,
}

impl QueryBuilder {
    /// Create a builder with the default configuration
    pub fn new<S: Schema + ?Sized>(schema: &S) -> Self {
        Self::with_config(schema, QueryConfig::default())
    }

    /// Create a builder with a custom configuration
    pub fn with_config<S: Schema + ?Sized>(schema: &S, config: QueryConfig) -> Self {
        let capabilities = Capabilities::resolve(schema);
        Self {
            pagination: Pagination::with_defaults(
                config.pagination.default_page,
                config.pagination.default_limit,
            ),
            search: SearchState::default(),
            sort: SortState::new(Arc::clone(&capabilities.sortable)),
            filters: FilterState::new(Arc::clone(&capabilities.filterable), config.filters.clone()),
            capabilities,
            config,
        }
    }

    /// Create a builder seeded from `options`
    ///
    /// Fails with the first invalid initial filter.
    pub fn with_options<S: Schema + ?Sized>(
        schema: &S,
        config: QueryConfig,
        options: BuilderOptions,
    ) -> QueryResult<Self> {
        let mut builder = Self::with_config(schema, config);

        let page = options.initial_page.unwrap_or(builder.pagination.page());
        let limit = options.page_size.unwrap_or(builder.pagination.limit());
        builder.pagination.set_pagination(page, limit);

        if let Some(term) = options.initial_search {
            builder.search.set_search(term);
        }
        if !options.initial_filters.is_empty() {
            builder.filters.apply_filters(options.initial_filters, true)?;
        }
        Ok(builder)
    }

    // Pagination

    pub fn set_pagination(&mut self, page: i64, limit: i64) -> &mut Self {
        self.pagination.set_pagination(page, limit);
        self
    }

    pub fn set_page(&mut self, page: i64) -> &mut Self {
        self.pagination.set_page(page);
        self
    }

    pub fn set_page_size(&mut self, limit: i64) -> &mut Self {
        self.pagination.set_page_size(limit);
        self
    }

    pub fn next_page(&mut self) -> &mut Self {
        self.pagination.next_page();
        self
    }

    /// Go back one page; does nothing on the first page
    pub fn prev_page(&mut self) -> &mut Self {
        self.pagination.prev_page();
        self
    }

    /// Record the total item count reported by the API
    pub fn set_total(&mut self, total: i64) -> &mut Self {
        self.pagination.set_total(total);
        self
    }

    pub fn has_next_page(&self) -> bool {
        self.pagination.has_next_page()
    }

    pub fn has_prev_page(&self) -> bool {
        self.pagination.has_prev_page()
    }

    /// Copy of the pagination fields
    pub fn pagination(&self) -> PaginationSnapshot {
        self.pagination.snapshot()
    }

    // Search

    pub fn set_search(&mut self, term: impl Into<String>) -> &mut Self {
        self.search.set_search(term);
        self
    }

    pub fn search(&self) -> &str {
        self.search.search()
    }

    // Sort

    pub fn add_sort(&mut self, key: impl Into<KeyPath>, order: Order) -> QueryResult<&mut Self> {
        self.sort.add_sort(key, order)?;
        Ok(self)
    }

    pub fn update_sort(&mut self, key: impl Into<KeyPath>, order: Order) -> QueryResult<&mut Self> {
        self.sort.update_sort(key, order)?;
        Ok(self)
    }

    pub fn remove_sort(&mut self, key: impl Into<KeyPath>) -> QueryResult<&mut Self> {
        self.sort.remove_sort(key)?;
        Ok(self)
    }

    pub fn sort(&self) -> Option<&SortCriterion> {
        self.sort.sort()
    }

    // Filters

    pub fn add_filter(
        &mut self,
        field: impl Into<KeyPath>,
        operator: Operator,
        value: impl Into<FilterValue>,
    ) -> QueryResult<&mut Self> {
        self.filters.add_filter(field, operator, value)?;
        Ok(self)
    }

    pub fn update_filter(
        &mut self,
        field: impl Into<KeyPath>,
        operator: Option<Operator>,
        value: Option<FilterValue>,
    ) -> QueryResult<&mut Self> {
        self.filters.update_filter(field, operator, value)?;
        Ok(self)
    }

    pub fn remove_filter(
        &mut self,
        field: impl Into<KeyPath>,
        operator: Option<Operator>,
    ) -> &mut Self {
        self.filters.remove_filter(field, operator);
        self
    }

    pub fn apply_filters<I>(&mut self, entries: I, reset_existing: bool) -> QueryResult<&mut Self>
    where
        I: IntoIterator<Item = FilterEntry>,
    {
        self.filters.apply_filters(entries, reset_existing)?;
        Ok(self)
    }

    /// Copy of the filters (flat view)
    pub fn filters(&self) -> FilterSnapshot {
        self.filters.snapshot()
    }

    /// Filters in their nested form
    pub fn nested_filters(&self) -> serde_json::Value {
        self.filters.nested()
    }

    // Sub-states

    pub fn pagination_state(&self) -> &Pagination {
        &self.pagination
    }

    pub fn search_state(&self) -> &SearchState {
        &self.search
    }

    pub fn sort_state(&self) -> &SortState {
        &self.sort
    }

    pub fn filter_state(&self) -> &FilterState {
        &self.filters
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    // Capabilities

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Key paths that may be sorted on
    pub fn sortable(&self) -> &CapabilityTable {
        &self.capabilities.sortable
    }

    /// Key paths that may be filtered on
    pub fn filterable(&self) -> &CapabilityTable {
        &self.capabilities.filterable
    }

    /// Resolve the capability tables from another schema
    ///
    /// Current state is kept. Later sort and filter mutations are checked
    /// against the new tables.
    pub fn rebind_schema<S: Schema + ?Sized>(&mut self, schema: &S) -> &mut Self {
        self.capabilities = Capabilities::resolve(schema);
        self.sort.rebind(Arc::clone(&self.capabilities.sortable));
        self.filters.rebind(Arc::clone(&self.capabilities.filterable));
        debug!("Schema rebound");
        self
    }

    /// Reset pagination, search, sort and filters to their defaults
    pub fn reset(&mut self) -> &mut Self {
        self.pagination.reset();
        self.search.reset();
        self.sort.reset();
        self.filters.reset();
        debug!("Query state reset");
        self
    }

    // Assembly

    /// Assemble the query descriptor
    pub fn build(&self) -> QueryDescriptor {
        QueryDescriptor::assemble(
            self.pagination.snapshot(),
            self.sort.sort(),
            self.search.search(),
            self.filters.snapshot(),
        )
    }

    /// URL parameters for the current state
    ///
    /// `page` and `limit` are always present; the rest only when set.
    pub fn build_url_params(&self) -> QueryParams {
        let sort = self.sort.sort();
        QueryParams {
            page: Some(self.pagination.page()),
            limit: Some(self.pagination.limit()),
            order_by: sort.map(|s| s.order_by.clone()),
            order_type: sort.map(|s| s.order_type),
            search: (!self.search.is_empty()).then(|| self.search.search().to_string()),
            filter: (!self.filters.is_empty()).then(|| self.filters.snapshot()),
        }
    }

    /// URL parameters as an encoded query string
    pub fn build_url_params_string(&self) -> String {
        self.build_url_params().to_query_string()
    }

    /// Apply decoded URL parameters
    ///
    /// Present fields overwrite the current state: page and limit, search,
    /// the sort (order defaults to ascending) and the whole filter set. Nothing
    /// is applied unless the sort and every filter validate.
    pub fn apply_params(&mut self, params: &QueryParams) -> QueryResult<&mut Self> {
        let mut sort = self.sort.clone();
        if let Some(order_by) = &params.order_by {
            sort.add_sort(order_by.as_str(), params.order_type.unwrap_or_default())?;
        }

        let mut filters = self.filters.clone();
        if let Some(filter) = &params.filter {
            filters.set_filters(filter.clone())?;
        }

        self.sort = sort;
        self.filters = filters;
        if let Some(page) = params.page {
            self.pagination.set_page(page);
        }
        if let Some(limit) = params.limit {
            self.pagination.set_page_size(limit);
        }
        if let Some(search) = &params.search {
            self.search.set_search(search.as_str());
        }
        debug!("Query parameters applied");
        Ok(self)
    }
}
