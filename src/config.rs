use crate::{script_element::MARKER_ATTRIBUTE, Result, ScriptElement};

/// Attribute holding the id of the user.
pub const USER_ID_ATTRIBUTE: &str = "data-userId";

/// Attribute holding the id of the domain.
pub const DOMAIN_ID_ATTRIBUTE: &str = "data-domainId";

/// Tracker configuration, read once from the embedding script element.
///
/// # Examples
/// ```
/// # use ackee_tracker::Configuration;
/// let config = Configuration::from_html(
///     r#"<script data-ackee="https://ackee.example/" data-userId="u1" data-domainId="d1"></script>"#,
/// )
/// .unwrap();
/// assert_eq!(config.server_url(), "https://ackee.example");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    server_url: String,
    user_id: String,
    domain_id: String,
}

impl Configuration {
    /// Create a configuration from explicit values.
    ///
    /// The server URL is normalized the same way as when it is read from the host page.
    pub fn new(
        server_url: impl Into<String>,
        user_id: impl Into<String>,
        domain_id: impl Into<String>,
    ) -> Self {
        Configuration {
            server_url: normalize_server_url(server_url.into()),
            user_id: user_id.into(),
            domain_id: domain_id.into(),
        }
    }

    /// Read configuration from the first script element carrying the `data-ackee` attribute.
    pub fn from_html(html: &str) -> Result<Self> {
        let element = ScriptElement::find(html)?;
        Configuration::from_script_element(&element)
    }

    /// Read configuration from an already located script element.
    ///
    /// Values are not validated beyond presence.
    pub fn from_script_element(element: &ScriptElement) -> Result<Self> {
        let require = |name: &'static str| {
            element
                .attribute(name)
                .map(str::to_owned)
                .ok_or(crate::Error::MissingAttribute(name))
        };

        let config = Configuration::new(
            require(MARKER_ATTRIBUTE)?,
            require(USER_ID_ATTRIBUTE)?,
            require(DOMAIN_ID_ATTRIBUTE)?,
        );

        log::debug!(target: "ackee",
                    server_url = config.server_url.as_str(),
                    user_id = config.user_id.as_str(),
                    domain_id = config.domain_id.as_str();
                    "read configuration from script element");

        Ok(config)
    }

    /// URL of the Ackee server. Never ends with a slash.
    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Id of the user.
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Id of the domain.
    pub fn domain_id(&self) -> &str {
        &self.domain_id
    }
}

/// Strip exactly one trailing slash.
pub(crate) fn normalize_server_url(mut url: String) -> String {
    if url.ends_with('/') {
        url.pop();
    }
    url
}
