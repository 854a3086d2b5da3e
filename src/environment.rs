//! Access to the ambient state of the host page.
use serde::{Deserialize, Serialize};

/// Provides the page, screen and viewport state the tracker reads.
///
/// Implement this for your host environment. [`StaticEnvironment`] covers the case where the values
/// are already known.
pub trait Environment {
    /// Full URL of the current page (`window.location.href`).
    fn location_href(&self) -> String;

    /// URL of the referring page (`document.referrer`). Empty if there is none.
    fn referrer(&self) -> String;

    /// Title of the current page (`document.title`).
    fn title(&self) -> String;

    /// Preferred language of the user, e.g. `"en-US"` (`navigator.language`).
    fn language(&self) -> String;

    /// User agent string (`navigator.userAgent`), used for platform detection.
    fn user_agent(&self) -> String;

    /// Width of the screen in pixels.
    fn screen_width(&self) -> u32;

    /// Height of the screen in pixels.
    fn screen_height(&self) -> u32;

    /// Color depth of the screen in bits.
    fn screen_color_depth(&self) -> u32;

    /// Width of the document's client area, if known.
    fn client_width(&self) -> Option<u32>;

    /// Height of the document's client area, if known.
    fn client_height(&self) -> Option<u32>;

    /// Outer width of the browser window.
    fn outer_width(&self) -> u32;

    /// Outer height of the browser window.
    fn outer_height(&self) -> u32;
}

impl<T: Environment + ?Sized> Environment for &T {
    fn location_href(&self) -> String {
        (**self).location_href()
    }
    fn referrer(&self) -> String {
        (**self).referrer()
    }
    fn title(&self) -> String {
        (**self).title()
    }
    fn language(&self) -> String {
        (**self).language()
    }
    fn user_agent(&self) -> String {
        (**self).user_agent()
    }
    fn screen_width(&self) -> u32 {
        (**self).screen_width()
    }
    fn screen_height(&self) -> u32 {
        (**self).screen_height()
    }
    fn screen_color_depth(&self) -> u32 {
        (**self).screen_color_depth()
    }
    fn client_width(&self) -> Option<u32> {
        (**self).client_width()
    }
    fn client_height(&self) -> Option<u32> {
        (**self).client_height()
    }
    fn outer_width(&self) -> u32 {
        (**self).outer_width()
    }
    fn outer_height(&self) -> u32 {
        (**self).outer_height()
    }
}

/// An [`Environment`] backed by plain values.
///
/// # Examples
/// ```
/// # use ackee_tracker::StaticEnvironment;
/// let environment = StaticEnvironment {
///     location_href: "https://example.com/".to_owned(),
///     language: "en-US".to_owned(),
///     screen_width: 1920,
///     screen_height: 1080,
///     screen_color_depth: 24,
///     client_width: Some(1280),
///     client_height: Some(720),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StaticEnvironment {
    /// See [`Environment::location_href`].
    pub location_href: String,
    /// See [`Environment::referrer`].
    pub referrer: String,
    /// See [`Environment::title`].
    pub title: String,
    /// See [`Environment::language`].
    pub language: String,
    /// See [`Environment::user_agent`].
    pub user_agent: String,
    /// See [`Environment::screen_width`].
    pub screen_width: u32,
    /// See [`Environment::screen_height`].
    pub screen_height: u32,
    /// See [`Environment::screen_color_depth`].
    pub screen_color_depth: u32,
    /// See [`Environment::client_width`].
    pub client_width: Option<u32>,
    /// See [`Environment::client_height`].
    pub client_height: Option<u32>,
    /// See [`Environment::outer_width`].
    pub outer_width: u32,
    /// See [`Environment::outer_height`].
    pub outer_height: u32,
}

impl Environment for StaticEnvironment {
    fn location_href(&self) -> String {
        self.location_href.clone()
    }
    fn referrer(&self) -> String {
        self.referrer.clone()
    }
    fn title(&self) -> String {
        self.title.clone()
    }
    fn language(&self) -> String {
        self.language.clone()
    }
    fn user_agent(&self) -> String {
        self.user_agent.clone()
    }
    fn screen_width(&self) -> u32 {
        self.screen_width
    }
    fn screen_height(&self) -> u32 {
        self.screen_height
    }
    fn screen_color_depth(&self) -> u32 {
        self.screen_color_depth
    }
    fn client_width(&self) -> Option<u32> {
        self.client_width
    }
    fn client_height(&self) -> Option<u32> {
        self.client_height
    }
    fn outer_width(&self) -> u32 {
        self.outer_width
    }
    fn outer_height(&self) -> u32 {
        self.outer_height
    }
}
