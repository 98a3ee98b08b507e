//! Reelroom — a self-hosted content portal backend.
//!
//! Administrators upload videos or blog articles (optionally extracted
//! from PDFs) through an authenticated multipart API; the public browses
//! a filterable catalog and streams assets from `/uploads`. The
//! [`catalog::view`] module is the embeddable counterpart of the browse
//! screens: a pure filter/sort over an already-fetched catalog snapshot.

pub mod auth;
pub mod catalog;
pub mod config;
pub mod error;
pub mod server;
