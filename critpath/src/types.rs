/// The kind of resource a network record fetched, as reported by the browser.
///
/// Only [`Script`](ResourceType::Script) records can take part in a critical path; everything
/// else is ignored when resolving call frames.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ResourceType {
    Document,
    Stylesheet,
    Image,
    Media,
    Font,
    Script,
    XHR,
    Fetch,
    Other,
}

impl From<&str> for ResourceType {
    fn from(v: &str) -> Self {
        match v.to_ascii_lowercase().as_str() {
            "document" => Self::Document,
            "stylesheet" => Self::Stylesheet,
            "image" => Self::Image,
            "media" => Self::Media,
            "font" => Self::Font,
            "script" => Self::Script,
            "xhr" => Self::XHR,
            "fetch" => Self::Fetch,
            _ => Self::Other,
        }
    }
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Document => "Document",
            Self::Stylesheet => "Stylesheet",
            Self::Image => "Image",
            Self::Media => "Media",
            Self::Font => "Font",
            Self::Script => "Script",
            Self::XHR => "XHR",
            Self::Fetch => "Fetch",
            Self::Other => "Other",
        }
    }
}

/// What caused the browser to issue a request.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum InitiatorType {
    /// The HTML parser, e.g. a `<script src>` tag in the document.
    Parser,
    /// Running JavaScript. Only these initiators normally carry a call stack.
    Script,
    Preload,
    Other,
}

impl From<&str> for InitiatorType {
    fn from(v: &str) -> Self {
        match v.to_ascii_lowercase().as_str() {
            "parser" => Self::Parser,
            "script" => Self::Script,
            "preload" => Self::Preload,
            _ => Self::Other,
        }
    }
}

impl InitiatorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Parser => "parser",
            Self::Script => "script",
            Self::Preload => "preload",
            Self::Other => "other",
        }
    }
}
