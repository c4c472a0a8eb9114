use crate::config::LaunchFlags;
use crate::error::{ExportError, Phase, Result};
use crate::webpage::WebPage;
use headless_chrome::LaunchOptions;
use std::ffi::OsStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// `headless_chrome` drops the DevTools connection after this long without
/// traffic; never go below its own default.
const MIN_IDLE_BROWSER_TIMEOUT: Duration = Duration::from_secs(30);

pub struct Browser {
    tab: Arc<headless_chrome::Tab>,
    inner: headless_chrome::Browser,
}

impl Browser {
    pub fn launch(flags: &LaunchFlags, timeout: Duration) -> Result<Self> {
        if !flags.sandbox {
            println!("⚠️  Running without sandbox");
        }
        if flags.disable_dev_shm_usage {
            println!("⚠️  Running with disabled /dev/shm usage");
        }
        if let Some(path) = &flags.executable_path {
            println!("📍 Using Chrome at: {}", path.display());
        }

        let extra_args = flags.args();
        let idle_browser_timeout = timeout.max(MIN_IDLE_BROWSER_TIMEOUT);
        match serde_json::to_string(flags) {
            Ok(json) => debug!(flags = %json, ?extra_args, ?idle_browser_timeout, "browser launch options"),
            Err(e) => warn!("can't serialize launch flags: {e}"),
        }

        let options = LaunchOptions {
            headless: true,
            sandbox: flags.sandbox,
            path: flags.executable_path.clone(),
            args: extra_args.iter().map(OsStr::new).collect(),
            idle_browser_timeout,
            ..Default::default()
        };

        let inner = headless_chrome::Browser::new(options)
            .map_err(|e| ExportError::from_collaborator(e, Phase::Launch))?;
        debug!(version = ?inner.get_version().ok().map(|v| v.product), "browser started");

        let tab = inner.new_tab().map_err(|e| {
            println!("👋 Closing browser...");
            ExportError::from_collaborator(e, Phase::Launch)
        })?;
        tab.set_default_timeout(timeout);

        Ok(Self { tab, inner })
    }

    pub fn page(&self) -> WebPage {
        WebPage::from_tab(Arc::clone(&self.tab))
    }
}

impl Drop for Browser {
    fn drop(&mut self) {
        println!("👋 Closing browser...");
        // `inner` kills and reaps the Chrome process when it drops.
        debug!(pid = ?self.inner.get_process_id(), "terminating browser process");
    }
}
