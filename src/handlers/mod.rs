pub mod auth;
pub mod profile;
pub mod tenant;
pub mod user;
