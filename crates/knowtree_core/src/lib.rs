//! Core domain logic for KnowTree.
//! Pure tree transformations: tabular import, radial layout, fuzzy search.

pub mod config;
pub mod import;
pub mod layout;
pub mod logging;
pub mod model;
pub mod search;

pub use config::{ConfigError, ConfigResult, CoreConfig};
pub use import::reconciler::{
    duplicate_titles, reconcile, reconcile_with_report, ImportReport, OrphanReason, OrphanRow,
    DEFAULT_ROOT_TITLE,
};
pub use import::rows::{header_columns, rows_from_json, FieldMap, ImportError, ImportResult, RawRow};
pub use layout::radial::{
    layout_forest, AngularWindow, Edge, Layout, LayoutConfig, LayoutSession, Point,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::node::{build_forest, ExternalLink, Node, NodeId, NodeKind};
pub use search::flatten::flatten;
pub use search::index::{search_tree, MatchField, SearchHit, SearchIndex, SearchOptions};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
