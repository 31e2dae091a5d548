pub mod profile_service;
pub mod tenant_service;
pub mod user_service;

pub use profile_service::ProfileService;
pub use tenant_service::TenantService;
pub use user_service::UserService;

/// Required-field check shared by the services: present and non-blank.
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Some(v),
        _ => None,
    }
}
