//! Intercepted request descriptors

use url::Url;

use crate::Result;

/// HTTP method of an intercepted request.
///
/// Cache partition keys include the method, but in practice everything the
/// worker stores is a GET; mutating methods flow through the
/// network-only strategy untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Method {
    #[default]
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
}

impl Method {
    /// Canonical uppercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Options => "OPTIONS",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The kind of resource the requesting context declared it wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Destination {
    Document,
    Image,
    Script,
    Style,
    Font,
    #[default]
    Other,
}

/// The navigation mode the request was issued with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestMode {
    /// Top-level document load.
    Navigate,
    SameOrigin,
    Cors,
    #[default]
    NoCors,
}

/// An intercepted network request, as handed to the worker by the host.
#[derive(Debug, Clone)]
pub struct RequestRecord {
    pub method: Method,
    pub url: Url,
    pub destination: Destination,
    pub mode: RequestMode,
}

impl RequestRecord {
    /// Create a plain GET request for a subresource.
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::Get,
            url,
            destination: Destination::Other,
            mode: RequestMode::NoCors,
        }
    }

    /// Create a top-level document navigation request.
    pub fn navigation(url: Url) -> Self {
        Self {
            method: Method::Get,
            url,
            destination: Destination::Document,
            mode: RequestMode::Navigate,
        }
    }

    /// Create an image subresource request.
    pub fn image(url: Url) -> Self {
        Self {
            method: Method::Get,
            url,
            destination: Destination::Image,
            mode: RequestMode::NoCors,
        }
    }

    /// Parse a URL string into a plain GET request.
    pub fn parse(url: &str) -> Result<Self> {
        Ok(Self::get(Url::parse(url)?))
    }

    /// Set the HTTP method.
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Set the declared destination.
    pub fn destination(mut self, destination: Destination) -> Self {
        self.destination = destination;
        self
    }

    /// Set the navigation mode.
    pub fn mode(mut self, mode: RequestMode) -> Self {
        self.mode = mode;
        self
    }

    /// Whether the request uses a fetchable scheme.
    ///
    /// Anything else (extension schemes, `data:`, `blob:`) is passed
    /// through to the host untouched.
    pub fn is_http(&self) -> bool {
        matches!(self.url.scheme(), "http" | "https")
    }

    /// Whether this is a top-level document navigation.
    pub fn is_navigation(&self) -> bool {
        self.mode == RequestMode::Navigate
    }

    /// Normalized cache partition key: method plus the URL without its
    /// fragment. Two requests with the same key are the same cache entry.
    pub fn cache_key(&self) -> String {
        let mut url = self.url.clone();
        url.set_fragment(None);
        format!("{} {}", self.method, url)
    }
}
