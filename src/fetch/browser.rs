// src/fetch/browser.rs
use anyhow::{anyhow, Context, Result};
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::{ffi::OsStr, sync::Arc, thread, time::Duration};
use tracing::{debug, info, instrument};
use url::Url;

use super::PageSource;
use crate::config::BrowserProfile;

/// Launch options for `profile`: its extra switches added, its suppressed
/// default switches (`--enable-automation` out of the box) removed.
fn launch_options(profile: &BrowserProfile) -> Result<LaunchOptions<'_>> {
    let args: Vec<&OsStr> = profile.args.iter().map(OsStr::new).collect();
    let suppressed: Vec<&OsStr> = profile
        .suppressed_default_args
        .iter()
        .map(OsStr::new)
        .collect();
    LaunchOptions::default_builder()
        .headless(profile.headless)
        .args(args)
        .ignore_default_args(suppressed)
        .build()
        .map_err(|e| anyhow!("building Chrome launch options: {}", e))
}

/// A running Chrome process. Dropping it terminates the browser, so every
/// exit path out of a fetch releases it.
pub struct ChromeSession {
    browser: Browser,
}

impl ChromeSession {
    pub fn launch(profile: &BrowserProfile) -> Result<Self> {
        let browser = Browser::new(launch_options(profile)?).context("launching Chrome")?;
        debug!(headless = profile.headless, "browser session started");
        Ok(Self { browser })
    }

    /// New tab dressed up as an ordinary desktop browser.
    pub fn disguised_tab(&self, profile: &BrowserProfile) -> Result<Arc<Tab>> {
        let tab = self.browser.new_tab().context("opening browser tab")?;
        // webdriver flag, plugins, permissions, WebGL vendor/renderer
        tab.enable_stealth_mode().context("enabling stealth mode")?;
        let accept_language = profile.accept_language();
        tab.set_user_agent(
            &profile.user_agent,
            Some(accept_language.as_str()),
            Some(profile.platform.as_str()),
        )
        .context("overriding user agent")?;
        Ok(tab)
    }
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        debug!("browser session closed");
    }
}

/// `PageSource` backed by headless Chrome: navigate, wait a flat settle
/// delay for client-side rendering, read back the DOM.
pub struct ChromePage {
    profile: BrowserProfile,
    settle: Duration,
}

impl ChromePage {
    pub fn new(profile: BrowserProfile, settle: Duration) -> Self {
        Self { profile, settle }
    }
}

impl PageSource for ChromePage {
    #[instrument(level = "info", skip(self), fields(url = %url))]
    fn page_source(&self, url: &Url) -> Result<String> {
        let session = ChromeSession::launch(&self.profile)?;
        let tab = session.disguised_tab(&self.profile)?;

        info!("bypassing protection and fetching report");
        tab.navigate_to(url.as_str())
            .with_context(|| format!("navigating to {}", url))?;
        tab.wait_until_navigated()
            .with_context(|| format!("waiting for {} to load", url))?;

        thread::sleep(self.settle);

        let html = tab.get_content().context("reading rendered page")?;
        debug!(bytes = html.len(), "page rendered");
        Ok(html)
    }
}
