//! A tracking beacon for [Ackee](https://github.com/electerious/Ackee), a self-hosted analytics
//! tool.
//!
//! # Overview
//!
//! A [`Beacon`] reads its [`Configuration`] from the `<script>` element that embeds the tracker,
//! takes an [`EnvironmentRecord`] snapshot of the page, screen, device and viewport, and sends it
//! with a single `POST` to `{server}/users/{userId}/domains/{domainId}/records`.
//!
//! ```html
//! <script async src="https://ackee.example/tracker.js"
//!         data-ackee="https://ackee.example"
//!         data-userId="..."
//!         data-domainId="..."></script>
//! ```
//!
//! Page and screen state is read through the [`Environment`] trait. Device, operating system and
//! browser are determined by a [`PlatformDetector`]: [`UserAgentDetector`] by default.
//!
//! # Error Handling
//!
//! Errors are represented by the [`Error`] enum. Every error is fatal to the beacon that produced
//! it: a missing script element or attribute, an unexpected response, a network failure, an abort
//! or a timeout. Nothing is retried.
//!
//! # Logging
//!
//! The package uses the [`log`](https://docs.rs/log/latest/log/) crate for logging
//! messages under the `ackee` target. The response to a successful beacon is logged at `info`
//! level.
//!
//! # Examples
//!
//! An example can be found in the `demos` directory of the crate repository.

#![warn(rustdoc::missing_crate_level_docs)]
#![warn(missing_docs)]

mod beacon;
mod config;
mod environment;
mod error;
mod platform;
mod record;
mod script_element;
mod transport;

pub use beacon::{track, Beacon};
pub use config::{Configuration, DOMAIN_ID_ATTRIBUTE, USER_ID_ATTRIBUTE};
pub use environment::{Environment, StaticEnvironment};
pub use error::{Error, Result};
pub use platform::{OperatingSystem, Platform, PlatformDetector, UserAgentDetector};
pub use record::EnvironmentRecord;
pub use script_element::{ScriptElement, MARKER_ATTRIBUTE};
pub use transport::{records_url, PendingResponse, Transport};

#[doc(no_inline)]
pub use reqwest::{Method, StatusCode};
