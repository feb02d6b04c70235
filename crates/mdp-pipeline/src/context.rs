//! Read-only render options shared by all filters.

use serde::Deserialize;

/// Default root for emoji images and other static assets.
pub const DEFAULT_ASSET_ROOT: &str = "/images";

/// Default prefix for user mention links.
pub const DEFAULT_BASE_URL: &str = "/";

/// Options available to every filter of a render call.
///
/// A context is built once per call by overlaying [`ContextOverrides`] on the
/// pipeline's default context and is only handed out by shared reference
/// afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Context {
    /// Add a `disabled` attribute to generated task-list checkboxes.
    pub checkbox_disabled: bool,
    /// Root URL for emoji images.
    pub asset_root: String,
    /// Prefix for user mention links.
    pub base_url: String,
    /// Enable GitHub Flavored Markdown extensions (tables, strikethrough, alerts, footnotes).
    pub gfm: bool,
    /// Host of the site the HTML is published on. Absolute links to any
    /// other host are external; when unset, every absolute link is.
    pub hostname: Option<String>,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            checkbox_disabled: false,
            asset_root: DEFAULT_ASSET_ROOT.to_owned(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            gfm: true,
            hostname: None,
        }
    }
}

/// Per-call context overrides.
///
/// All fields are optional. Only `Some` values replace the defaults.
#[derive(Clone, Debug, Default)]
pub struct ContextOverrides {
    pub checkbox_disabled: Option<bool>,
    pub asset_root: Option<String>,
    pub base_url: Option<String>,
    pub gfm: Option<bool>,
    pub hostname: Option<String>,
}

impl Context {
    /// Build the effective context for one render call.
    #[must_use]
    pub fn merge(&self, overrides: &ContextOverrides) -> Self {
        let mut context = self.clone();
        if let Some(disabled) = overrides.checkbox_disabled {
            context.checkbox_disabled = disabled;
        }
        if let Some(asset_root) = &overrides.asset_root {
            context.asset_root.clone_from(asset_root);
        }
        if let Some(base_url) = &overrides.base_url {
            context.base_url.clone_from(base_url);
        }
        if let Some(gfm) = overrides.gfm {
            context.gfm = gfm;
        }
        if let Some(hostname) = &overrides.hostname {
            context.hostname = Some(hostname.clone());
        }
        context
    }
}
