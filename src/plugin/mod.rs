//! Plugin manifests for Member Base.
//!
//! Every feature of a tenant app (user, company, outlet, withdraw,
//! notification, ...) ships as a plugin described by a manifest. Manifests
//! are validated once per plugin load, before the plugin is trusted.
//!
//! # Plugin Types
//!
//! - **Core plugins**: available to every tenant
//! - **Segment plugins**: enabled per business segment
//! - **Company plugins**: built for one company
//!
//! # Example Manifest
//!
//! ```json
//! {
//!   "id": "withdraw",
//!   "name": "Withdraw",
//!   "version": "1.0.0",
//!   "type": "core-plugin",
//!   "description": "Point withdrawal",
//!   "dependencies": [],
//!   "exports": {},
//!   "permissions": ["withdraw.read"],
//!   "routes": [
//!     { "name": "withdraw", "path": "/withdraw", "component": "WithdrawHome", "permissions": [] }
//!   ]
//! }
//! ```

mod catalog;
mod error;
mod manifest;
mod types;

pub use catalog::PluginCatalog;
pub use error::{PluginError, PluginResult};
pub use manifest::{parse_manifest, validate_manifest, FieldError, PluginManifest, ValidationReport};
pub use types::{PluginRoute, PluginType, CATALOG_FILE, MANIFEST_FILES};
