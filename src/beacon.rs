use reqwest::Method;
use serde_json::Value;

use crate::{
    Configuration, Environment, EnvironmentRecord, PlatformDetector, Result, Transport,
    UserAgentDetector,
};

/// One tracking run: read configuration from the host page, snapshot the environment, send the
/// record.
///
/// # Examples
/// ```no_run
/// # use ackee_tracker::{Beacon, StaticEnvironment};
/// let html = r#"<script data-ackee="https://ackee.example" data-userId="u1" data-domainId="d1"></script>"#;
/// let response = Beacon::new(html, StaticEnvironment::default()).run().unwrap();
/// ```
pub struct Beacon<'a, E, D = UserAgentDetector> {
    html: &'a str,
    environment: E,
    platform_detector: D,
    transport: Transport,
}

impl<'a, E: Environment> Beacon<'a, E> {
    /// Create a beacon for the page `html` viewed in `environment`.
    pub fn new(html: &'a str, environment: E) -> Self {
        Beacon {
            html,
            environment,
            platform_detector: UserAgentDetector,
            transport: Transport::new(),
        }
    }
}

impl<'a, E: Environment, D: PlatformDetector> Beacon<'a, E, D> {
    /// Replace the default [`UserAgentDetector`].
    pub fn platform_detector<P: PlatformDetector>(self, platform_detector: P) -> Beacon<'a, E, P> {
        Beacon {
            html: self.html,
            environment: self.environment,
            platform_detector,
            transport: self.transport,
        }
    }

    /// Send the record with `transport`, e.g. one with a timeout.
    pub fn transport(mut self, transport: Transport) -> Self {
        self.transport = transport;
        self
    }

    /// Run the beacon and block until the server responded.
    ///
    /// Any error is returned as-is. Nothing is retried.
    pub fn run(&self) -> Result<Value> {
        let config = Configuration::from_html(self.html)?;
        let record = EnvironmentRecord::snapshot(&self.environment, &self.platform_detector);

        let response = self
            .transport
            .send(
                Method::POST,
                config.server_url(),
                config.user_id(),
                config.domain_id(),
                &record,
            )?
            .wait()?;

        log::info!(target: "ackee", response:serde = &response; "record sent");

        Ok(response)
    }
}

/// Track a page view of `html` in `environment` with default settings.
pub fn track(html: &str, environment: &impl Environment) -> Result<Value> {
    Beacon::new(html, environment).run()
}
