//! The conformance procedures, each an `impl Runner` block grouped by API area.

mod auth;
mod clicks;
mod cors;
mod links;
mod profile;
mod protection;
mod public_profile;
