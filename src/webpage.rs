use crate::error::{ExportError, Phase, Result};
use headless_chrome::protocol::cdp::Page;
use headless_chrome::protocol::cdp::types::Event;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::debug;
use url::Url;

const RESPONSE_HANDLER: &str = "webpage2pdf-status";
const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(50);

// `networkIdle` only counts after the new document's `init`.
#[derive(Debug, Default)]
struct Lifecycle {
    loading: bool,
    idle: bool,
}

impl Lifecycle {
    fn observe(&mut self, name: &str) {
        match name {
            "init" => {
                self.loading = true;
                self.idle = false;
            }
            "networkIdle" if self.loading => self.idle = true,
            _ => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct ResponseStatus {
    status: u16,
    status_text: String,
}

impl ResponseStatus {
    fn is_ok(&self) -> bool {
        // 0: no HTTP status, as for file: and data: documents
        self.status == 0 || (200..400).contains(&self.status)
    }

    fn check(&self) -> Result<()> {
        if self.is_ok() {
            return Ok(());
        }
        Err(ExportError::Navigation {
            status: Some(self.status),
            message: format!("Failed to load page: {} {}", self.status, self.status_text)
                .trim_end()
                .to_string(),
        })
    }
}

// Chrome leaves fragments out of response URLs.
fn response_key(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut url) => {
            url.set_fragment(None);
            url.to_string()
        }
        Err(_) => url.to_string(),
    }
}

fn timed_out(phase: Phase, what: &str, timeout: Duration) -> ExportError {
    ExportError::Timeout {
        phase,
        message: format!("{what}: timeout of {} ms exceeded", timeout.as_millis()),
    }
}

pub struct WebPage(Arc<headless_chrome::Tab>);

impl WebPage {
    pub fn from_tab(tab: Arc<headless_chrome::Tab>) -> Self {
        Self(tab)
    }

    pub fn tab(&self) -> &headless_chrome::Tab {
        &self.0
    }

    pub fn navigate(&self, url: &Url, timeout: Duration) -> Result<()> {
        println!("🌐 Navigating to {url}...");

        let nav_err = |e| ExportError::from_collaborator(e, Phase::Navigation);
        let lifecycle = Arc::new(Mutex::new(Lifecycle::default()));
        let responses = Arc::new(Mutex::new(HashMap::<String, ResponseStatus>::new()));

        self.0
            .call_method(Page::SetLifecycleEventsEnabled { enabled: true })
            .map_err(nav_err)?;

        let main_frame = self.0.get_target_id().to_string();
        let listener = {
            let lifecycle = Arc::clone(&lifecycle);
            self.0
                .add_event_listener(Arc::new(move |event: &Event| {
                    if let Event::PageLifecycleEvent(e) = event {
                        if e.params.frame_id == main_frame {
                            if let Ok(mut state) = lifecycle.lock() {
                                state.observe(&e.params.name);
                            }
                        }
                    }
                }))
                .map_err(nav_err)?
        };

        {
            let responses = Arc::clone(&responses);
            self.0
                .register_response_handling(
                    RESPONSE_HANDLER,
                    Box::new(move |params, _fetch_body| {
                        let key = response_key(&params.response.url);
                        let status = ResponseStatus {
                            status: params.response.status as u16,
                            status_text: params.response.status_text.clone(),
                        };
                        if let Ok(mut seen) = responses.lock() {
                            seen.entry(key).or_insert(status);
                        }
                    }),
                )
                .map_err(nav_err)?;
        }

        let outcome = self.load(url, timeout, &lifecycle).and_then(|()| {
            let final_url = response_key(&self.0.get_url());
            let status = responses
                .lock()
                .ok()
                .and_then(|seen| seen.get(&final_url).cloned());
            match status {
                Some(status) => {
                    debug!(url = %final_url, status = status.status, "document response");
                    status.check()
                }
                None => {
                    debug!(url = %final_url, "no response recorded for document");
                    Ok(())
                }
            }
        });

        if let Err(e) = self.0.remove_event_listener(&listener) {
            debug!("ignoring error while removing lifecycle listener: {e:#}");
        }
        if let Err(e) = self.0.deregister_response_handling(RESPONSE_HANDLER) {
            debug!("ignoring error while removing response handler: {e:#}");
        }

        outcome
    }

    fn load(&self, url: &Url, timeout: Duration, lifecycle: &Mutex<Lifecycle>) -> Result<()> {
        let deadline = Instant::now() + timeout;
        let as_navigation_error = |e| match ExportError::from_collaborator(e, Phase::Navigation) {
            ExportError::Timeout { .. } => timed_out(Phase::Navigation, "Navigation", timeout),
            other => other,
        };

        self.0.navigate_to(url.as_str()).map_err(as_navigation_error)?;
        self.0.wait_until_navigated().map_err(as_navigation_error)?;

        loop {
            if lifecycle.lock().map(|state| state.idle).unwrap_or(false) {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(timed_out(Phase::Navigation, "Navigation", timeout));
            }
            std::thread::sleep(IDLE_POLL_INTERVAL);
        }
    }

    pub fn wait_for(&self, selector: &str, timeout: Duration) -> Result<()> {
        println!("⏳ Waiting for element \"{selector}\"...");
        let started = Instant::now();

        match self.0.wait_for_element_with_custom_timeout(selector, timeout) {
            Ok(_) => Ok(()),
            Err(e) => {
                let err = ExportError::from_collaborator(e, Phase::Wait);
                if matches!(err, ExportError::Timeout { .. }) || started.elapsed() >= timeout {
                    let what = format!("Waiting for selector `{selector}` failed");
                    Err(timed_out(Phase::Wait, &what, timeout))
                } else {
                    Err(err)
                }
            }
        }
    }
}
