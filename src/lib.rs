#![allow(dead_code)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::trivially_copy_pass_by_ref)]
#![allow(clippy::should_implement_trait)]

//! # Member Base
//!
//! Security, logging and manifest validation core for the Member Base
//! multi-tenant app platform.
//!
//! ## Features
//!
//! - **Input validation**: string, email, phone and identifier checks with
//!   field-tagged results
//! - **Sanitization**: recursive redaction of credentials before data is logged
//! - **Structured logging**: level-gated, build-aware logger with breadcrumb
//!   contexts, forwarding to `tracing`
//! - **Plugin manifests**: schema validation that reports every defect at once
//! - **Tenants**: white-label tenant configuration checks against the plugin catalog
//!
//! ## Quick Start
//!
//! ```
//! use memberbase::security::{ensure_valid, validate_email};
//! use serde_json::json;
//!
//! let result = validate_email(&json!("ops@memberbase.id"), None);
//! assert!(ensure_valid(&result).is_ok());
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
// Allow common patterns that are intentional in this codebase
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::redundant_else)]
#![allow(clippy::if_not_else)]
#![allow(clippy::manual_let_else)]
#![allow(clippy::derivable_impls)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::struct_field_names)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::significant_drop_tightening)]
#![allow(clippy::map_unwrap_or)]
#![allow(clippy::needless_lifetimes)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::unnecessary_literal_bound)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::redundant_clone)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::unnecessary_map_or)]
#![allow(clippy::collapsible_if)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::cognitive_complexity)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unreadable_literal)]
#![allow(clippy::redundant_closure_for_method_calls)]
#![allow(clippy::unnecessary_debug_formatting)]
#![allow(clippy::for_kv_map)]
#![allow(clippy::use_self)]
#![allow(clippy::ptr_arg)]

pub mod config;
pub mod logging;
pub mod plugin;
pub mod security;
pub mod tenant;

// Re-export commonly used types
pub use config::Config;
pub use logging::{logger, LogLevel, Logger, LoggerConfig};
pub use plugin::{
    parse_manifest, validate_manifest, PluginCatalog, PluginError, PluginManifest, PluginResult,
    PluginType, ValidationReport,
};
pub use security::{ensure_valid, Sanitizer, ValidationError, ValidationResult};
pub use tenant::{validate_all_tenants, validate_tenant, TenantSet};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "memberbase";
