//! Tenant configuration validation.
//!
//! A tenant is one white-label build of the app. Tenants live in a JSON
//! object keyed by tenant id (`tenants.json`); each one names its package,
//! branding and the plugins it enables. Checks stop at the first failure,
//! and every message is prefixed with the tenant it concerns.

use std::path::Path;

use anyhow::{bail, Context};
use serde_json::{json, Value};

use crate::logging;
use crate::plugin::PluginCatalog;
use crate::security::{validate_required, validate_string, ValidationResult};

/// Maximum package name length.
pub const MAX_PACKAGE_NAME_LENGTH: usize = 100;

/// Maximum logo URL length.
pub const MAX_LOGO_URL_LENGTH: usize = 500;

/// Maximum relative logo path length.
pub const MAX_LOGO_PATH_LENGTH: usize = 200;

/// Maximum company initial length.
pub const MAX_COMPANY_INITIAL_LENGTH: usize = 20;

/// Default tenants file name.
pub const TENANTS_FILE: &str = "tenants.json";

const PACKAGE_FORMAT_HINT: &str = "Expected format: com.company.app (reverse domain notation)";
const LOGO_FORMAT_HINT: &str =
    "Expected: relative path (e.g., assets/logo.png) or URL (e.g., https://example.com/logo.png)";
const INITIAL_FORMAT_HINT: &str =
    "Expected: uppercase alphanumeric string starting with a letter (e.g., 'TKIFTP', 'MB', 'P2L')";
const INVALID_PATH_CHARS: [char; 6] = ['<', '>', '|', '?', '*', '"'];

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Normalize a tenant id to lower-case kebab-case.
///
/// `"My_Tenant  App"` becomes `"my-tenant-app"`.
pub fn normalize_tenant_id(tenant_id: &str) -> String {
    let replaced: String = tenant_id
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '_' { '-' } else { c })
        .collect();

    replaced.split('-').filter(|segment| !segment.is_empty()).collect::<Vec<_>>().join("-")
}

/// Check a reverse-domain package name such as `com.company.app`.
pub fn validate_package_name(package_name: &str) -> ValidationResult {
    const FIELD: &str = "packageName";

    let base = validate_string(
        &json!(package_name),
        Some(FIELD),
        None,
        Some(MAX_PACKAGE_NAME_LENGTH),
        false,
    );
    if let Some(message) = base.error() {
        return ValidationResult::fail(FIELD, format!("{}. {}", message, PACKAGE_FORMAT_HINT));
    }

    let trimmed = package_name.trim();
    let parts: Vec<&str> = trimmed.split('.').collect();
    if parts.len() < 2 {
        return ValidationResult::fail(
            FIELD,
            format!(
                "Package name must contain at least 2 parts separated by dots. {}. Got: '{}'",
                PACKAGE_FORMAT_HINT, trimmed
            ),
        );
    }

    for part in parts {
        let problem = if part.is_empty() {
            Some("contains an empty part".to_string())
        } else if !part.chars().next().is_some_and(char::is_alphabetic) {
            Some(format!("part '{}' must start with a letter", part))
        } else if !part.chars().all(is_identifier_char) {
            Some(format!(
                "part '{}' contains invalid characters; only lowercase letters, numbers, and underscores are allowed",
                part
            ))
        } else if part != part.to_lowercase() {
            Some(format!("part '{}' should be lowercase", part))
        } else {
            None
        };

        if let Some(problem) = problem {
            return ValidationResult::fail(
                FIELD,
                format!("Package name {}. {}. Got: '{}'", problem, PACKAGE_FORMAT_HINT, trimmed),
            );
        }
    }

    ValidationResult::ok()
}

/// Check an optional logo reference: empty, an http(s) URL, or a relative path.
pub fn validate_logo_path(logo_path: &str) -> ValidationResult {
    const FIELD: &str = "logoPath";

    let trimmed = logo_path.trim();
    if trimmed.is_empty() {
        return ValidationResult::ok();
    }

    let length = trimmed.chars().count();

    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        if length > MAX_LOGO_URL_LENGTH {
            return ValidationResult::fail(
                FIELD,
                format!(
                    "Logo URL is too long ({} characters). Maximum length is {} characters",
                    length, MAX_LOGO_URL_LENGTH
                ),
            );
        }
        return ValidationResult::ok();
    }

    if let Some(invalid) = INVALID_PATH_CHARS.iter().find(|c| trimmed.contains(**c)) {
        return ValidationResult::fail(
            FIELD,
            format!(
                "Logo path contains invalid character '{}'. {}. Got: '{}'",
                invalid, LOGO_FORMAT_HINT, trimmed
            ),
        );
    }

    let drive_letter = trimmed.chars().nth(1) == Some(':');
    if trimmed.starts_with('/') || drive_letter {
        return ValidationResult::fail(
            FIELD,
            format!(
                "Logo path should be a relative path, not an absolute path. {}. Got: '{}'",
                LOGO_FORMAT_HINT, trimmed
            ),
        );
    }

    if length > MAX_LOGO_PATH_LENGTH {
        return ValidationResult::fail(
            FIELD,
            format!(
                "Logo path is too long ({} characters). Maximum length is {} characters",
                length, MAX_LOGO_PATH_LENGTH
            ),
        );
    }

    ValidationResult::ok()
}

/// Check a company initial such as `MB` or `P2L`.
pub fn validate_company_initial(company_initial: &str) -> ValidationResult {
    const FIELD: &str = "companyInitial";

    let base = validate_string(
        &json!(company_initial),
        Some(FIELD),
        None,
        Some(MAX_COMPANY_INITIAL_LENGTH),
        false,
    );
    if let Some(message) = base.error() {
        return ValidationResult::fail(FIELD, format!("{}. {}", message, INITIAL_FORMAT_HINT));
    }

    let trimmed = company_initial.trim();

    if !trimmed.chars().all(is_identifier_char) {
        return ValidationResult::fail(
            FIELD,
            format!(
                "Company initial contains invalid characters. {}. Got: '{}'",
                INITIAL_FORMAT_HINT, trimmed
            ),
        );
    }

    if !trimmed.chars().next().is_some_and(char::is_alphabetic) {
        return ValidationResult::fail(
            FIELD,
            format!(
                "Company initial must start with a letter. {}. Got: '{}'",
                INITIAL_FORMAT_HINT, trimmed
            ),
        );
    }

    ValidationResult::ok()
}

/// Initial derived from a tenant id when the tenant does not declare one.
pub fn derive_company_initial(tenant_id: &str) -> String {
    tenant_id.chars().filter(|c| *c != '-' && *c != '_').collect::<String>().to_uppercase()
}

fn scoped(result: ValidationResult, tenant_id: &str) -> ValidationResult {
    match result {
        ValidationResult::Valid => ValidationResult::Valid,
        ValidationResult::Invalid(failure) => ValidationResult::fail(
            failure.field.unwrap_or_else(|| "tenant".to_string()),
            format!("Tenant '{}': {}", tenant_id, failure.message),
        ),
    }
}

/// A string field that is treated as absent when missing, null, or empty.
fn present<'a>(tenant: &'a Value, key: &str) -> Option<&'a Value> {
    tenant.get(key).filter(|value| match value {
        Value::Null => false,
        Value::String(text) => !text.is_empty(),
        _ => true,
    })
}

/// Validate one tenant entry stored under `tenant_id`.
pub fn validate_tenant(tenant: &Value, tenant_id: &str, catalog: &PluginCatalog) -> ValidationResult {
    if !tenant.is_object() {
        return ValidationResult::fail("tenant", format!("Tenant '{}' must be an object", tenant_id));
    }

    let id = tenant.get("id").unwrap_or(&Value::Null);
    if !validate_required(id, Some("id")).is_valid() {
        return ValidationResult::fail("id", "Tenant ID is required");
    }
    match id.as_str() {
        Some(id) if id == tenant_id => {}
        Some(id) => {
            return ValidationResult::fail(
                "id",
                format!("Tenant ID mismatch: key '{}' but id field is '{}'", tenant_id, id),
            );
        }
        None => return ValidationResult::fail("id", "Tenant ID must be a string"),
    }

    let app_name = present(tenant, "appName").or_else(|| present(tenant, "name"));
    let app_name = validate_string(app_name.unwrap_or(&Value::Null), Some("appName"), None, None, false);
    if !app_name.is_valid() {
        return scoped(app_name, tenant_id);
    }

    let initial = match present(tenant, "companyInitial") {
        None => validate_company_initial(&derive_company_initial(tenant_id)),
        Some(Value::String(initial)) => validate_company_initial(initial),
        Some(_) => ValidationResult::fail("companyInitial", "companyInitial must be a string"),
    };
    if !initial.is_valid() {
        return scoped(initial, tenant_id);
    }

    let package = match present(tenant, "packageName") {
        None => ValidationResult::fail("packageName", "packageName is required"),
        Some(Value::String(package)) => validate_package_name(package),
        Some(_) => ValidationResult::fail("packageName", "packageName must be a string"),
    };
    if !package.is_valid() {
        return scoped(package, tenant_id);
    }

    let logo = match present(tenant, "logoPath") {
        None => ValidationResult::ok(),
        Some(Value::String(logo)) => validate_logo_path(logo),
        Some(_) => ValidationResult::fail("logoPath", "logoPath must be a string"),
    };
    if !logo.is_valid() {
        return scoped(logo, tenant_id);
    }

    scoped(validate_enabled_features(tenant.get("enabledFeatures"), catalog), tenant_id)
}

fn validate_enabled_features(features: Option<&Value>, catalog: &PluginCatalog) -> ValidationResult {
    const FIELD: &str = "enabledFeatures";

    let Some(features) = features else {
        return ValidationResult::fail(FIELD, "enabledFeatures is required");
    };
    let Some(features) = features.as_array() else {
        return ValidationResult::fail(FIELD, "enabledFeatures must be an array");
    };

    for feature in features {
        let Some(feature) = feature.as_str() else {
            return ValidationResult::fail(FIELD, "enabledFeatures must contain only strings");
        };
        if !catalog.contains(feature) {
            return ValidationResult::fail(
                FIELD,
                format!("enabledFeatures contains unknown plugin '{}'", feature),
            );
        }
    }

    ValidationResult::ok()
}

/// Tenant configurations keyed by normalized tenant id, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TenantSet {
    tenants: Vec<(String, Value)>,
}

impl TenantSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a tenants JSON object, normalizing ids.
    ///
    /// Each key is normalized with [`normalize_tenant_id`] and the tenant's
    /// `id` field is rewritten to match it.
    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        let value: Value = serde_json::from_str(content).context("Invalid JSON in tenants file")?;
        let Value::Object(map) = value else {
            bail!("Invalid format: tenants file must contain a JSON object");
        };

        let mut set = Self::new();
        for (key, tenant) in map {
            set.insert(&key, tenant);
        }
        Ok(set)
    }

    /// Load a tenants file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            bail!("File not found: {}", path.display());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Error reading {}", path.display()))?;
        Self::from_json(&content).with_context(|| format!("Failed to load {}", path.display()))
    }

    /// Insert a tenant under the normalized form of `key`.
    ///
    /// A key that normalizes to an existing id replaces that tenant in place.
    pub fn insert(&mut self, key: &str, mut tenant: Value) {
        let id = normalize_tenant_id(key);
        if let Value::Object(fields) = &mut tenant {
            fields.insert("id".to_string(), Value::String(id.clone()));
        }

        match self.tenants.iter_mut().find(|(existing, _)| *existing == id) {
            Some((_, slot)) => *slot = tenant,
            None => self.tenants.push((id, tenant)),
        }
    }

    pub fn ids(&self) -> Vec<&str> {
        self.tenants.iter().map(|(id, _)| id.as_str()).collect()
    }

    pub fn get(&self, id: &str) -> Option<&Value> {
        self.tenants.iter().find(|(existing, _)| existing == id).map(|(_, tenant)| tenant)
    }

    pub fn len(&self) -> usize {
        self.tenants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tenants.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.tenants.iter().map(|(id, tenant)| (id.as_str(), tenant))
    }
}

/// Validate every tenant, returning the first failure.
pub fn validate_all_tenants(tenants: &TenantSet, catalog: &PluginCatalog) -> ValidationResult {
    if tenants.is_empty() {
        return ValidationResult::fail("tenants", "No tenants found");
    }

    let log = logging::logger().child("tenant");
    for (id, tenant) in tenants.iter() {
        let result = validate_tenant(tenant, id, catalog);
        if !result.is_valid() {
            log.warn("tenant rejected", &[json!({ "tenant": id, "reason": result.error() })]);
            return result;
        }
        log.debug("tenant validated", &[json!({ "tenant": id })]);
    }

    ValidationResult::ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> PluginCatalog {
        let mut catalog = PluginCatalog::new();
        catalog.insert("user", json!({}));
        catalog.insert("withdraw", json!({}));
        catalog
    }

    fn tenant(id: &str) -> Value {
        json!({
            "id": id,
            "appName": "Member Base",
            "companyInitial": "MB",
            "packageName": "com.memberbase.app",
            "logoPath": "assets/logo.png",
            "enabledFeatures": ["user", "withdraw"]
        })
    }

    #[test]
    fn test_normalize_tenant_id() {
        assert_eq!(normalize_tenant_id("My_Tenant  App"), "my-tenant-app");
        assert_eq!(normalize_tenant_id("--Acme__Corp--"), "acme-corp");
        assert_eq!(normalize_tenant_id("already-fine"), "already-fine");
        assert_eq!(normalize_tenant_id(""), "");
    }

    #[test]
    fn test_validate_package_name() {
        assert!(validate_package_name("com.company.app").is_valid());
        assert!(validate_package_name("id.co.member_base2").is_valid());

        let rejected = ["", "   ", "company", "com..app", "com.1company", "com.comp-any", "com.Company"];
        for name in rejected {
            let result = validate_package_name(name);
            assert!(!result.is_valid(), "'{}' should be rejected", name);
            assert_eq!(result.field(), Some("packageName"));
        }

        let long = format!("com.{}", "a".repeat(100));
        assert!(!validate_package_name(&long).is_valid());
    }

    #[test]
    fn test_validate_logo_path() {
        for path in ["", "  ", "assets/logo.png", "https://cdn.example.com/logo.png"] {
            assert!(validate_logo_path(path).is_valid(), "'{}' should be accepted", path);
        }

        for path in ["/abs/logo.png", "C:\\logo.png", "assets/lo?go.png", "logo*.png"] {
            let result = validate_logo_path(path);
            assert!(!result.is_valid(), "'{}' should be rejected", path);
            assert_eq!(result.field(), Some("logoPath"));
        }

        assert!(!validate_logo_path(&"a".repeat(201)).is_valid());
        assert!(!validate_logo_path(&format!("https://{}", "a".repeat(500))).is_valid());
    }

    #[test]
    fn test_validate_company_initial() {
        assert!(validate_company_initial("MB").is_valid());
        assert!(validate_company_initial("P2L").is_valid());
        assert!(validate_company_initial("TK_IFTP").is_valid());

        assert!(!validate_company_initial("").is_valid());
        assert!(!validate_company_initial("2PL").is_valid());
        assert!(!validate_company_initial("M-B").is_valid());
        assert!(!validate_company_initial(&"A".repeat(21)).is_valid());
    }

    #[test]
    fn test_validate_tenant() {
        assert!(validate_tenant(&tenant("acme"), "acme", &catalog()).is_valid());
    }

    #[test]
    fn test_validate_tenant_id_mismatch() {
        let result = validate_tenant(&tenant("acme"), "other", &catalog());
        assert_eq!(result.field(), Some("id"));
        assert!(result.error().unwrap().contains("mismatch"));
    }

    #[test]
    fn test_validate_tenant_app_name_fallback() {
        let mut entry = tenant("acme");
        entry.as_object_mut().unwrap().remove("appName");
        entry["name"] = json!("Acme");
        assert!(validate_tenant(&entry, "acme", &catalog()).is_valid());

        entry["name"] = json!("   ");
        let result = validate_tenant(&entry, "acme", &catalog());
        assert_eq!(result.field(), Some("appName"));
        assert!(result.error().unwrap().starts_with("Tenant 'acme': "));
    }

    #[test]
    fn test_validate_tenant_derives_initial() {
        let mut entry = tenant("acme-corp");
        entry.as_object_mut().unwrap().remove("companyInitial");
        assert!(validate_tenant(&entry, "acme-corp", &catalog()).is_valid());

        let mut entry = tenant("7-eleven");
        entry.as_object_mut().unwrap().remove("companyInitial");
        let result = validate_tenant(&entry, "7-eleven", &catalog());
        assert_eq!(result.field(), Some("companyInitial"));
    }

    #[test]
    fn test_validate_tenant_features() {
        let mut entry = tenant("acme");
        entry["enabledFeatures"] = json!(["user", "outlet"]);
        let result = validate_tenant(&entry, "acme", &catalog());
        assert!(result.error().unwrap().contains("unknown plugin 'outlet'"));

        entry["enabledFeatures"] = json!("user");
        assert!(!validate_tenant(&entry, "acme", &catalog()).is_valid());

        entry["enabledFeatures"] = json!([1]);
        assert!(!validate_tenant(&entry, "acme", &catalog()).is_valid());

        entry.as_object_mut().unwrap().remove("enabledFeatures");
        assert_eq!(validate_tenant(&entry, "acme", &catalog()).field(), Some("enabledFeatures"));
    }

    #[test]
    fn test_validate_tenant_missing_package() {
        let mut entry = tenant("acme");
        entry["packageName"] = json!("");
        let result = validate_tenant(&entry, "acme", &catalog());
        assert_eq!(result.error(), Some("Tenant 'acme': packageName is required"));
    }

    #[test]
    fn test_tenant_set_normalizes_ids() {
        let set = TenantSet::from_json(r#"{ "Acme_Corp": { "id": "whatever" }, "beta": 1 }"#).unwrap();
        assert_eq!(set.ids(), vec!["acme-corp", "beta"]);
        assert_eq!(set.get("acme-corp").unwrap()["id"], json!("acme-corp"));
        assert_eq!(set.get("beta"), Some(&json!(1)));
    }

    #[test]
    fn test_tenant_set_keeps_file_order() {
        let set = TenantSet::from_json(r#"{ "zeta": 1, "alpha": 2, "Zeta": 3 }"#).unwrap();
        assert_eq!(set.ids(), vec!["zeta", "alpha"]);
        assert_eq!(set.get("zeta"), Some(&json!(3)));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_validate_all_tenants_reports_first_in_file_order() {
        let set = TenantSet::from_json(
            r#"{
                "zeta": { "appName": "Zeta", "packageName": "zeta", "enabledFeatures": [] },
                "alpha": { "appName": "", "packageName": "com.alpha.app", "enabledFeatures": [] }
            }"#,
        )
        .unwrap();

        let result = validate_all_tenants(&set, &catalog());
        assert!(result.error().unwrap().starts_with("Tenant 'zeta':"));
    }

    #[test]
    fn test_tenant_set_rejects_non_object() {
        assert!(TenantSet::from_json("[]").is_err());
        assert!(TenantSet::from_json("{").is_err());
    }

    #[test]
    fn test_validate_all_tenants() {
        let mut set = TenantSet::new();
        assert_eq!(validate_all_tenants(&set, &catalog()).error(), Some("No tenants found"));

        set.insert("Acme", tenant("ignored"));
        assert!(validate_all_tenants(&set, &catalog()).is_valid());

        set.insert("broken", json!("not an object"));
        assert_eq!(validate_all_tenants(&set, &catalog()).field(), Some("tenant"));
    }
}
