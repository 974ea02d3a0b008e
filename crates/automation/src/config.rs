use std::collections::HashMap;

use adstudio_core::webhook::WebhookKind;

/// Workflow URLs keyed by kind. Kinds without a URL are unconfigured and
/// their routes answer 500 without calling out.
#[derive(Debug, Clone, Default)]
pub struct WebhookUrls {
    urls: HashMap<WebhookKind, String>,
}

impl WebhookUrls {
    /// Read each kind's `WEBHOOK_*_URL` variable; blank values are skipped.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let urls = WebhookKind::ALL
            .into_iter()
            .filter_map(|kind| {
                let url = lookup(kind.env_var())?;
                let url = url.trim();
                (!url.is_empty()).then(|| (kind, url.to_string()))
            })
            .collect();
        Self { urls }
    }

    pub fn with(mut self, kind: WebhookKind, url: impl Into<String>) -> Self {
        self.urls.insert(kind, url.into());
        self
    }

    pub fn get(&self, kind: WebhookKind) -> Option<&str> {
        self.urls.get(&kind).map(String::as_str)
    }

    pub fn configured(&self) -> impl Iterator<Item = WebhookKind> + '_ {
        self.urls.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_only_non_blank_vars() {
        let urls = WebhookUrls::from_lookup(|name| match name {
            "WEBHOOK_SITE_ANALYSIS_URL" => Some(" https://hooks.example.com/site ".into()),
            "WEBHOOK_VIDEO_GENERATION_URL" => Some("   ".into()),
            _ => None,
        });
        assert_eq!(
            urls.get(WebhookKind::SiteAnalysis),
            Some("https://hooks.example.com/site")
        );
        assert_eq!(urls.get(WebhookKind::VideoGeneration), None);
        assert_eq!(urls.configured().count(), 1);
    }
}
