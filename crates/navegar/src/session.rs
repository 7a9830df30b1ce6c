//! Browser session management.
//!
//! A session is one launched browser plus one page, owned by a single
//! invocation and closed on every exit path. When compiled with the
//! `browser` feature, it drives a real Chromium over the Chrome DevTools
//! Protocol via chromiumoxide. Without the feature, a mock with the same
//! surface records calls for lifecycle testing.

use crate::error::Result;

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            chromium_path: None,
            sandbox: true,
        }
    }
}

impl SessionConfig {
    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set viewport dimensions
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }
}

// ============================================================================
// Real CDP Implementation (when `browser` feature is enabled)
// ============================================================================

#[cfg(feature = "browser")]
#[allow(
    clippy::wildcard_imports,
    clippy::significant_drop_tightening,
    clippy::missing_errors_doc,
    clippy::items_after_statements
)]
mod cdp {
    use super::*;
    use crate::dialog::{DialogAction, DialogKind, DialogRecord};
    use crate::error::NavegarError;
    use crate::events::{
        CaptureHandle, CaptureLog, ConsoleLocation, ConsoleMessageRecord, NetworkRequestRecord,
    };
    use crate::keys::KeyInput;
    use crate::nav::{
        NavigationPolicy, DEFAULT_ELEMENT_TIMEOUT_MS, DEFAULT_WAIT_TIMEOUT_MS,
        NETWORK_IDLE_THRESHOLD_MS, POLL_INTERVAL_MS,
    };
    use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
    use chromiumoxide::cdp::browser_protocol::accessibility::{
        AxNode, AxNodeId, AxValue, EnableParams as AxEnableParams, GetFullAxTreeParams,
    };
    use chromiumoxide::cdp::browser_protocol::dom::SetFileInputFilesParams;
    use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
    use chromiumoxide::cdp::browser_protocol::input::{
        DispatchKeyEventParams, DispatchKeyEventType, DispatchMouseEventParams,
        DispatchMouseEventType, MouseButton,
    };
    use chromiumoxide::cdp::browser_protocol::network::{
        EventLoadingFailed, EventLoadingFinished, EventRequestWillBeSent,
    };
    use chromiumoxide::cdp::browser_protocol::page::{
        CaptureScreenshotFormat, DialogType, EventJavascriptDialogOpening,
        GetNavigationHistoryParams, HandleJavaScriptDialogParams, NavigateToHistoryEntryParams,
        PrintToPdfParams,
    };
    use chromiumoxide::cdp::js_protocol::runtime::EventConsoleApiCalled;
    use chromiumoxide::element::Element;
    use chromiumoxide::page::{Page as CdpPage, ScreenshotParams};
    use futures::StreamExt;
    use std::collections::HashMap;
    use std::path::Path;
    use std::sync::{Arc, Mutex as StdMutex};
    use std::time::{Duration, Instant};
    use tracing::debug;

    /// A live browser session: one browser, one page.
    #[derive(Debug)]
    pub struct Session {
        config: SessionConfig,
        browser: CdpBrowser,
        handle: tokio::task::JoinHandle<()>,
        page: Page,
    }

    impl Session {
        /// Launch a browser and open a blank page.
        ///
        /// # Errors
        ///
        /// Returns an error if the browser cannot be launched or the page
        /// cannot be created.
        pub async fn launch(config: SessionConfig) -> Result<Self> {
            let mut builder = CdpConfig::builder();

            if !config.headless {
                builder = builder.with_head();
            }

            if !config.sandbox {
                builder = builder.no_sandbox();
            }

            if let Some(ref path) = config.chromium_path {
                builder = builder.chrome_executable(path);
            }

            builder = builder.window_size(config.viewport_width, config.viewport_height);

            let cdp_config = builder.build().map_err(NavegarError::browser)?;

            debug!(headless = config.headless, "launching browser");
            let (browser, mut handler) = CdpBrowser::launch(cdp_config)
                .await
                .map_err(|e| NavegarError::browser(e.to_string()))?;

            // Drain CDP messages for the life of the session
            let handle = tokio::spawn(async move {
                while let Some(h) = handler.next().await {
                    if h.is_err() {
                        break;
                    }
                }
            });

            let cdp_page = browser
                .new_page("about:blank")
                .await
                .map_err(|e| NavegarError::browser(e.to_string()))?;

            Ok(Self {
                config,
                browser,
                handle,
                page: Page { inner: cdp_page },
            })
        }

        /// The session's single page
        #[must_use]
        pub const fn page(&self) -> &Page {
            &self.page
        }

        /// The session's configuration
        #[must_use]
        pub const fn config(&self) -> &SessionConfig {
            &self.config
        }

        /// Close the browser and stop the message handler.
        pub async fn close(mut self) -> Result<()> {
            debug!("closing browser");
            let closed = self.browser.close().await;
            self.handle.abort();
            closed.map_err(|e| NavegarError::browser(e.to_string()))?;
            Ok(())
        }
    }

    /// The single page owned by a session.
    #[derive(Debug)]
    pub struct Page {
        inner: CdpPage,
    }

    impl Page {
        /// Navigate to a URL under the given policy.
        pub async fn goto(&self, url: &str, policy: NavigationPolicy) -> Result<()> {
            debug!(url, ?policy, "navigating");
            match policy {
                NavigationPolicy::Immediate => {
                    self.inner
                        .goto(url)
                        .await
                        .map_err(|e| NavegarError::navigation(url, e.to_string()))?;
                    self.inner
                        .wait_for_navigation()
                        .await
                        .map_err(|e| NavegarError::navigation(url, e.to_string()))?;
                }
                NavigationPolicy::NetworkIdle => self.goto_idle(url).await?,
            }
            Ok(())
        }

        /// Navigate and wait for the network to go quiet.
        ///
        /// Idle means: the load event fired and no request has been
        /// in flight for `NETWORK_IDLE_THRESHOLD_MS`.
        async fn goto_idle(&self, url: &str) -> Result<()> {
            let activity = Arc::new(StdMutex::new(NetworkActivity::new()));

            let mut sent = self
                .inner
                .event_listener::<EventRequestWillBeSent>()
                .await
                .map_err(|e| NavegarError::browser(e.to_string()))?;
            let mut finished = self
                .inner
                .event_listener::<EventLoadingFinished>()
                .await
                .map_err(|e| NavegarError::browser(e.to_string()))?;
            let mut failed = self
                .inner
                .event_listener::<EventLoadingFailed>()
                .await
                .map_err(|e| NavegarError::browser(e.to_string()))?;

            let sent_activity = Arc::clone(&activity);
            let sent_task = tokio::spawn(async move {
                while let Some(_event) = sent.next().await {
                    if let Ok(mut a) = sent_activity.lock() {
                        a.started();
                    }
                }
            });
            let finished_activity = Arc::clone(&activity);
            let finished_task = tokio::spawn(async move {
                while let Some(_event) = finished.next().await {
                    if let Ok(mut a) = finished_activity.lock() {
                        a.ended();
                    }
                }
            });
            let failed_activity = Arc::clone(&activity);
            let failed_task = tokio::spawn(async move {
                while let Some(_event) = failed.next().await {
                    if let Ok(mut a) = failed_activity.lock() {
                        a.ended();
                    }
                }
            });

            let navigated = async {
                self.inner
                    .goto(url)
                    .await
                    .map_err(|e| NavegarError::navigation(url, e.to_string()))?;
                self.inner
                    .wait_for_navigation()
                    .await
                    .map_err(|e| NavegarError::navigation(url, e.to_string()))?;

                let deadline = Instant::now() + Duration::from_millis(DEFAULT_WAIT_TIMEOUT_MS);
                loop {
                    let quiet = activity
                        .lock()
                        .map(|a| a.quiet_for(Duration::from_millis(NETWORK_IDLE_THRESHOLD_MS)))
                        .unwrap_or(true);
                    if quiet {
                        return Ok(());
                    }
                    if Instant::now() >= deadline {
                        return Err(NavegarError::navigation(
                            url,
                            format!("network did not go idle within {DEFAULT_WAIT_TIMEOUT_MS}ms"),
                        ));
                    }
                    tokio::time::sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;
                }
            }
            .await;

            sent_task.abort();
            finished_task.abort();
            failed_task.abort();
            navigated
        }

        /// Page title, empty when the page has none.
        pub async fn title(&self) -> Result<String> {
            let title = self
                .inner
                .get_title()
                .await
                .map_err(|e| NavegarError::action(e.to_string()))?;
            Ok(title.unwrap_or_default())
        }

        /// Current page URL.
        pub async fn current_url(&self) -> Result<String> {
            let url = self
                .inner
                .url()
                .await
                .map_err(|e| NavegarError::action(e.to_string()))?;
            Ok(url.unwrap_or_else(|| "about:blank".to_string()))
        }

        /// Go back one entry in the navigation history.
        ///
        /// Returns the URL after the back navigation.
        pub async fn go_back(&self) -> Result<String> {
            let history = self
                .inner
                .execute(GetNavigationHistoryParams::default())
                .await
                .map_err(|e| NavegarError::action(e.to_string()))?;

            let current = history.result.current_index;
            if current <= 0 {
                return Err(NavegarError::action("no previous page in history"));
            }

            let entry_id = history.result.entries[(current - 1) as usize].id;
            let params = NavigateToHistoryEntryParams::builder()
                .entry_id(entry_id)
                .build()
                .map_err(NavegarError::action)?;
            self.inner
                .execute(params)
                .await
                .map_err(|e| NavegarError::action(e.to_string()))?;
            self.inner
                .wait_for_navigation()
                .await
                .map_err(|e| NavegarError::action(e.to_string()))?;

            self.current_url().await
        }

        /// Wait for a selector to match, bounded by `timeout_ms`.
        pub async fn wait_for_selector(&self, selector: &str, timeout_ms: u64) -> Result<()> {
            self.find_with_timeout(selector, timeout_ms).await.map(|_| ())
        }

        /// Poll for an element until found or the deadline passes.
        async fn find_with_timeout(&self, selector: &str, timeout_ms: u64) -> Result<Element> {
            let deadline = Instant::now() + Duration::from_millis(timeout_ms);
            loop {
                if let Ok(element) = self.inner.find_element(selector).await {
                    return Ok(element);
                }
                if Instant::now() >= deadline {
                    return Err(NavegarError::element_timeout(selector, timeout_ms));
                }
                tokio::time::sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;
            }
        }

        /// Click the element matching `selector`.
        pub async fn click(&self, selector: &str) -> Result<()> {
            let element = self
                .find_with_timeout(selector, DEFAULT_ELEMENT_TIMEOUT_MS)
                .await?;
            element
                .click()
                .await
                .map_err(|e| NavegarError::action(e.to_string()))?;
            Ok(())
        }

        /// Clear the element matching `selector` and type `text` into it.
        pub async fn fill(&self, selector: &str, text: &str) -> Result<()> {
            let element = self
                .find_with_timeout(selector, DEFAULT_ELEMENT_TIMEOUT_MS)
                .await?;
            element
                .click()
                .await
                .map_err(|e| NavegarError::action(e.to_string()))?;
            element
                .call_js_fn(
                    "function() { \
                        if ('value' in this) { \
                            this.value = ''; \
                            this.dispatchEvent(new Event('input', { bubbles: true })); \
                        } \
                    }",
                    false,
                )
                .await
                .map_err(|e| NavegarError::action(e.to_string()))?;
            element
                .type_str(text)
                .await
                .map_err(|e| NavegarError::action(e.to_string()))?;
            Ok(())
        }

        /// Select the option with `value` in the dropdown matching `selector`.
        ///
        /// Returns the value actually selected.
        pub async fn select_option(&self, selector: &str, value: &str) -> Result<String> {
            let element = self
                .find_with_timeout(selector, DEFAULT_ELEMENT_TIMEOUT_MS)
                .await?;
            let encoded = serde_json::to_string(value)?;
            let declaration = format!(
                "function() {{ \
                    this.value = {encoded}; \
                    if (this.value !== {encoded}) {{ \
                        throw new Error('no option with value ' + {encoded}); \
                    }} \
                    this.dispatchEvent(new Event('input', {{ bubbles: true }})); \
                    this.dispatchEvent(new Event('change', {{ bubbles: true }})); \
                    return this.value; \
                }}"
            );
            let returned = element
                .call_js_fn(&declaration, false)
                .await
                .map_err(|e| NavegarError::action(e.to_string()))?;
            if let Some(details) = returned.exception_details {
                let message = details
                    .exception
                    .and_then(|e| e.description)
                    .unwrap_or(details.text);
                return Err(NavegarError::action(message));
            }
            Ok(returned
                .result
                .value
                .and_then(|v| v.as_str().map(String::from))
                .unwrap_or_else(|| value.to_string()))
        }

        /// Move the mouse over the element matching `selector`.
        pub async fn hover(&self, selector: &str) -> Result<()> {
            let (x, y) = self.element_center(selector).await?;
            self.dispatch_mouse(DispatchMouseEventType::MouseMoved, x, y, false)
                .await
        }

        /// Drag the element matching `source` onto the element matching
        /// `target`.
        pub async fn drag(&self, source: &str, target: &str) -> Result<()> {
            let (sx, sy) = self.element_center(source).await?;
            let (tx, ty) = self.element_center(target).await?;

            self.dispatch_mouse(DispatchMouseEventType::MouseMoved, sx, sy, false)
                .await?;
            self.dispatch_mouse(DispatchMouseEventType::MousePressed, sx, sy, true)
                .await?;
            self.dispatch_mouse(DispatchMouseEventType::MouseMoved, tx, ty, false)
                .await?;
            self.dispatch_mouse(DispatchMouseEventType::MouseReleased, tx, ty, true)
                .await?;
            Ok(())
        }

        /// Set the files of the file input matching `selector`.
        pub async fn upload_file(&self, selector: &str, path: &Path) -> Result<()> {
            let element = self
                .find_with_timeout(selector, DEFAULT_ELEMENT_TIMEOUT_MS)
                .await?;
            let params = SetFileInputFilesParams::builder()
                .files(vec![path.to_string_lossy().into_owned()])
                .backend_node_id(element.backend_node_id)
                .build()
                .map_err(NavegarError::action)?;
            self.inner
                .execute(params)
                .await
                .map_err(|e| NavegarError::action(e.to_string()))?;
            Ok(())
        }

        /// Press a key: keydown, char (when the key produces text), keyup.
        pub async fn press_key(&self, key: &KeyInput) -> Result<()> {
            let mut down = DispatchKeyEventParams::builder()
                .r#type(DispatchKeyEventType::KeyDown)
                .key(key.key.clone());
            if let Some(code) = key.code {
                down = down.windows_virtual_key_code(code);
            }
            if let Some(ref text) = key.text {
                down = down.text(text.clone());
            }
            let down = down.build().map_err(NavegarError::action)?;
            self.inner
                .execute(down)
                .await
                .map_err(|e| NavegarError::action(e.to_string()))?;

            let mut up = DispatchKeyEventParams::builder()
                .r#type(DispatchKeyEventType::KeyUp)
                .key(key.key.clone());
            if let Some(code) = key.code {
                up = up.windows_virtual_key_code(code);
            }
            let up = up.build().map_err(NavegarError::action)?;
            self.inner
                .execute(up)
                .await
                .map_err(|e| NavegarError::action(e.to_string()))?;
            Ok(())
        }

        /// Override the viewport dimensions. Issued before navigation by
        /// the resize command.
        pub async fn set_viewport(&self, width: u32, height: u32) -> Result<()> {
            let params = SetDeviceMetricsOverrideParams::builder()
                .width(i64::from(width))
                .height(i64::from(height))
                .device_scale_factor(1.0)
                .mobile(false)
                .build()
                .map_err(NavegarError::action)?;
            self.inner
                .execute(params)
                .await
                .map_err(|e| NavegarError::action(e.to_string()))?;
            Ok(())
        }

        /// Evaluate a script and return its JSON value.
        ///
        /// An expression that yields `undefined` comes back as `null`.
        pub async fn evaluate(&self, script: &str) -> Result<serde_json::Value> {
            let result = self
                .inner
                .evaluate(script)
                .await
                .map_err(|e| NavegarError::evaluate(e.to_string()))?;
            Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
        }

        /// Capture the accessibility tree as nested JSON.
        ///
        /// Ignored nodes are elided, with their children promoted.
        pub async fn accessibility_snapshot(&self) -> Result<serde_json::Value> {
            self.inner
                .execute(AxEnableParams::default())
                .await
                .map_err(|e| NavegarError::action(e.to_string()))?;
            let tree = self
                .inner
                .execute(GetFullAxTreeParams::default())
                .await
                .map_err(|e| NavegarError::action(e.to_string()))?;

            let nodes = &tree.result.nodes;
            let by_id: HashMap<&str, &AxNode> = nodes
                .iter()
                .map(|node| (node.node_id.inner().as_str(), node))
                .collect();

            let root = nodes
                .first()
                .map(|node| render_ax_subtree(node, &by_id))
                .unwrap_or_default();
            match root.into_iter().next() {
                Some(value) => Ok(value),
                None => Ok(serde_json::Value::Null),
            }
        }

        /// Capture a full-page PNG screenshot to `path`.
        pub async fn screenshot(&self, path: &Path) -> Result<()> {
            ensure_parent_dir(path).await?;
            let bytes = self
                .inner
                .screenshot(
                    ScreenshotParams::builder()
                        .format(CaptureScreenshotFormat::Png)
                        .full_page(true)
                        .build(),
                )
                .await
                .map_err(|e| NavegarError::action(e.to_string()))?;
            tokio::fs::write(path, bytes).await?;
            Ok(())
        }

        /// Export the page to an A4 PDF with background graphics at `path`.
        pub async fn pdf(&self, path: &Path) -> Result<()> {
            ensure_parent_dir(path).await?;
            let params = PrintToPdfParams::builder()
                .paper_width(8.27)
                .paper_height(11.7)
                .print_background(true)
                .build();
            let bytes = self
                .inner
                .pdf(params)
                .await
                .map_err(|e| NavegarError::action(e.to_string()))?;
            tokio::fs::write(path, bytes).await?;
            Ok(())
        }

        /// Start collecting network requests. Register before navigating.
        pub async fn watch_network(&self) -> Result<CaptureHandle<NetworkRequestRecord>> {
            let log = CaptureLog::new();
            let mut events = self
                .inner
                .event_listener::<EventRequestWillBeSent>()
                .await
                .map_err(|e| NavegarError::browser(e.to_string()))?;
            let sink = log.clone();
            let task = tokio::spawn(async move {
                while let Some(event) = events.next().await {
                    let resource_type = event
                        .r#type
                        .as_ref()
                        .map(|t| format!("{t:?}").to_lowercase())
                        .unwrap_or_else(|| "other".to_string());
                    let headers = serde_json::to_value(&event.request.headers)
                        .unwrap_or(serde_json::Value::Null);
                    sink.push(NetworkRequestRecord {
                        method: event.request.method.clone(),
                        url: event.request.url.clone(),
                        resource_type,
                        headers,
                    });
                }
            });
            Ok(CaptureHandle::new(log, task))
        }

        /// Start collecting console messages. Register before navigating.
        pub async fn watch_console(&self) -> Result<CaptureHandle<ConsoleMessageRecord>> {
            let log = CaptureLog::new();
            let mut events = self
                .inner
                .event_listener::<EventConsoleApiCalled>()
                .await
                .map_err(|e| NavegarError::browser(e.to_string()))?;
            let sink = log.clone();
            let task = tokio::spawn(async move {
                while let Some(event) = events.next().await {
                    let text = event
                        .args
                        .iter()
                        .map(|arg| {
                            arg.value
                                .as_ref()
                                .map(|v| match v {
                                    serde_json::Value::String(s) => s.clone(),
                                    other => other.to_string(),
                                })
                                .or_else(|| arg.description.clone())
                                .unwrap_or_default()
                        })
                        .collect::<Vec<_>>()
                        .join(" ");
                    let location = event
                        .stack_trace
                        .as_ref()
                        .and_then(|st| st.call_frames.first())
                        .map(|frame| ConsoleLocation {
                            url: frame.url.clone(),
                            line_number: frame.line_number,
                            column_number: frame.column_number,
                        });
                    sink.push(ConsoleMessageRecord {
                        kind: format!("{:?}", event.r#type).to_lowercase(),
                        text,
                        location,
                    });
                }
            });
            Ok(CaptureHandle::new(log, task))
        }

        /// Resolve every dialog the page raises with `action`, recording
        /// each one. Register before navigating.
        pub async fn watch_dialogs(
            &self,
            action: DialogAction,
        ) -> Result<CaptureHandle<DialogRecord>> {
            let log = CaptureLog::new();
            let mut events = self
                .inner
                .event_listener::<EventJavascriptDialogOpening>()
                .await
                .map_err(|e| NavegarError::browser(e.to_string()))?;
            let page = self.inner.clone();
            let sink = log.clone();
            let task = tokio::spawn(async move {
                while let Some(event) = events.next().await {
                    let kind = dialog_kind(&event.r#type);
                    let mut builder =
                        HandleJavaScriptDialogParams::builder().accept(action.accepts());
                    if kind == DialogKind::Prompt {
                        if let Some(text) = action.prompt_text() {
                            builder = builder.prompt_text(text.to_string());
                        }
                    }
                    if let Ok(params) = builder.build() {
                        let _ = page.execute(params).await;
                    }
                    sink.push(DialogRecord {
                        kind,
                        message: event.message.clone(),
                        accepted: action.accepts(),
                    });
                }
            });
            Ok(CaptureHandle::new(log, task))
        }

        /// Scroll an element into view and return its center in viewport
        /// coordinates.
        async fn element_center(&self, selector: &str) -> Result<(f64, f64)> {
            let element = self
                .find_with_timeout(selector, DEFAULT_ELEMENT_TIMEOUT_MS)
                .await?;
            let returned = element
                .call_js_fn(
                    "function() { \
                        this.scrollIntoView({ block: 'center', inline: 'center', behavior: 'instant' }); \
                        const rect = this.getBoundingClientRect(); \
                        return JSON.stringify({ x: rect.x + rect.width / 2, y: rect.y + rect.height / 2 }); \
                    }",
                    false,
                )
                .await
                .map_err(|e| NavegarError::action(e.to_string()))?;
            let encoded = returned
                .result
                .value
                .and_then(|v| v.as_str().map(String::from))
                .ok_or_else(|| {
                    NavegarError::action(format!("could not measure element: {selector}"))
                })?;
            let point: serde_json::Value = serde_json::from_str(&encoded)?;
            let x = point["x"].as_f64().unwrap_or(0.0);
            let y = point["y"].as_f64().unwrap_or(0.0);
            Ok((x, y))
        }

        async fn dispatch_mouse(
            &self,
            kind: DispatchMouseEventType,
            x: f64,
            y: f64,
            with_button: bool,
        ) -> Result<()> {
            let mut builder = DispatchMouseEventParams::builder().r#type(kind).x(x).y(y);
            if with_button {
                builder = builder.button(MouseButton::Left).click_count(1);
            }
            let params = builder.build().map_err(NavegarError::action)?;
            self.inner
                .execute(params)
                .await
                .map_err(|e| NavegarError::action(e.to_string()))?;
            Ok(())
        }
    }

    /// In-flight request tracking for the network-idle wait.
    #[derive(Debug)]
    struct NetworkActivity {
        in_flight: usize,
        last_change: Instant,
    }

    impl NetworkActivity {
        fn new() -> Self {
            Self {
                in_flight: 0,
                last_change: Instant::now(),
            }
        }

        fn started(&mut self) {
            self.in_flight += 1;
            self.last_change = Instant::now();
        }

        fn ended(&mut self) {
            self.in_flight = self.in_flight.saturating_sub(1);
            self.last_change = Instant::now();
        }

        fn quiet_for(&self, window: Duration) -> bool {
            self.in_flight == 0 && self.last_change.elapsed() >= window
        }
    }

    fn dialog_kind(cdp: &DialogType) -> DialogKind {
        match cdp {
            DialogType::Alert => DialogKind::Alert,
            DialogType::Confirm => DialogKind::Confirm,
            DialogType::Prompt => DialogKind::Prompt,
            DialogType::Beforeunload => DialogKind::BeforeUnload,
        }
    }

    fn ax_value_string(value: &Option<AxValue>) -> Option<String> {
        value
            .as_ref()?
            .value
            .as_ref()
            .and_then(|v| v.as_str().map(String::from))
    }

    /// Render a node and its descendants; an ignored node contributes its
    /// children in its place.
    fn render_ax_subtree(
        node: &AxNode,
        by_id: &HashMap<&str, &AxNode>,
    ) -> Vec<serde_json::Value> {
        let children: Vec<serde_json::Value> = node
            .child_ids
            .as_ref()
            .map(|ids| {
                ids.iter()
                    .filter_map(|id: &AxNodeId| by_id.get(id.inner().as_str()))
                    .flat_map(|child| render_ax_subtree(child, by_id))
                    .collect()
            })
            .unwrap_or_default();

        if node.ignored {
            return children;
        }

        let mut rendered = serde_json::Map::new();
        rendered.insert(
            "role".to_string(),
            serde_json::Value::String(ax_value_string(&node.role).unwrap_or_default()),
        );
        if let Some(name) = ax_value_string(&node.name) {
            rendered.insert("name".to_string(), serde_json::Value::String(name));
        }
        if let Some(value) = ax_value_string(&node.value) {
            rendered.insert("value".to_string(), serde_json::Value::String(value));
        }
        if !children.is_empty() {
            rendered.insert(
                "children".to_string(),
                serde_json::Value::Array(children),
            );
        }
        vec![serde_json::Value::Object(rendered)]
    }

    async fn ensure_parent_dir(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        Ok(())
    }
}

// ============================================================================
// Mock Implementation (when `browser` feature is disabled)
// ============================================================================

#[cfg(not(feature = "browser"))]
mod mock {
    use super::*;
    use crate::dialog::{DialogAction, DialogRecord};
    use crate::error::NavegarError;
    use crate::events::{CaptureHandle, CaptureLog, ConsoleMessageRecord, NetworkRequestRecord};
    use crate::keys::KeyInput;
    use crate::nav::NavigationPolicy;
    use std::path::Path;
    use std::sync::{Arc, Mutex as StdMutex};

    /// Mock session that records the calls made against it.
    #[derive(Debug)]
    pub struct Session {
        config: SessionConfig,
        page: Page,
    }

    impl Session {
        /// Create a mock session. Never fails.
        pub async fn launch(config: SessionConfig) -> Result<Self> {
            let page = Page::new();
            page.record("launch");
            Ok(Self { config, page })
        }

        /// The session's single page
        #[must_use]
        pub const fn page(&self) -> &Page {
            &self.page
        }

        /// The session's configuration
        #[must_use]
        pub const fn config(&self) -> &SessionConfig {
            &self.config
        }

        /// Record the close. Never fails.
        pub async fn close(self) -> Result<()> {
            self.page.record("close");
            Ok(())
        }
    }

    /// Mock page. Every operation succeeds and is appended to the call
    /// record in invocation order.
    #[derive(Debug, Clone)]
    pub struct Page {
        calls: Arc<StdMutex<Vec<String>>>,
    }

    impl Page {
        fn new() -> Self {
            Self {
                calls: Arc::new(StdMutex::new(Vec::new())),
            }
        }

        fn record(&self, call: impl Into<String>) {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(call.into());
            }
        }

        /// Calls made against this page, in order
        #[must_use]
        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().map(|c| c.clone()).unwrap_or_default()
        }

        /// Record a navigation.
        pub async fn goto(&self, url: &str, policy: NavigationPolicy) -> Result<()> {
            self.record(format!("goto {url} {policy:?}"));
            Ok(())
        }

        /// Canned page title.
        pub async fn title(&self) -> Result<String> {
            self.record("title");
            Ok("Mock Page".to_string())
        }

        /// Canned page URL.
        pub async fn current_url(&self) -> Result<String> {
            self.record("current_url");
            Ok("about:blank".to_string())
        }

        /// Record a back navigation.
        pub async fn go_back(&self) -> Result<String> {
            self.record("go_back");
            Ok("about:blank".to_string())
        }

        /// Record the wait; a selector named `#missing` never appears.
        pub async fn wait_for_selector(&self, selector: &str, timeout_ms: u64) -> Result<()> {
            self.record(format!("wait_for_selector {selector} {timeout_ms}"));
            if selector == "#missing" {
                return Err(NavegarError::element_timeout(selector, timeout_ms));
            }
            Ok(())
        }

        /// Record a click.
        pub async fn click(&self, selector: &str) -> Result<()> {
            self.record(format!("click {selector}"));
            Ok(())
        }

        /// Record a fill.
        pub async fn fill(&self, selector: &str, text: &str) -> Result<()> {
            self.record(format!("fill {selector}={text}"));
            Ok(())
        }

        /// Record a selection.
        pub async fn select_option(&self, selector: &str, value: &str) -> Result<String> {
            self.record(format!("select {selector}={value}"));
            Ok(value.to_string())
        }

        /// Record a hover.
        pub async fn hover(&self, selector: &str) -> Result<()> {
            self.record(format!("hover {selector}"));
            Ok(())
        }

        /// Record a drag.
        pub async fn drag(&self, source: &str, target: &str) -> Result<()> {
            self.record(format!("drag {source} -> {target}"));
            Ok(())
        }

        /// Record a file upload.
        pub async fn upload_file(&self, selector: &str, path: &Path) -> Result<()> {
            self.record(format!("upload {selector} {}", path.display()));
            Ok(())
        }

        /// Record a key press.
        pub async fn press_key(&self, key: &KeyInput) -> Result<()> {
            self.record(format!("press_key {}", key.key));
            Ok(())
        }

        /// Record a viewport override.
        pub async fn set_viewport(&self, width: u32, height: u32) -> Result<()> {
            self.record(format!("set_viewport {width}x{height}"));
            Ok(())
        }

        /// Record an evaluation; returns null.
        pub async fn evaluate(&self, script: &str) -> Result<serde_json::Value> {
            self.record(format!("evaluate {script}"));
            Ok(serde_json::Value::Null)
        }

        /// Record a snapshot; returns an empty tree.
        pub async fn accessibility_snapshot(&self) -> Result<serde_json::Value> {
            self.record("accessibility_snapshot");
            Ok(serde_json::json!({ "role": "WebArea" }))
        }

        /// Record a screenshot without writing a file.
        pub async fn screenshot(&self, path: &Path) -> Result<()> {
            self.record(format!("screenshot {}", path.display()));
            Ok(())
        }

        /// Record a PDF export without writing a file.
        pub async fn pdf(&self, path: &Path) -> Result<()> {
            self.record(format!("pdf {}", path.display()));
            Ok(())
        }

        /// Record a network watch; the log stays empty.
        pub async fn watch_network(&self) -> Result<CaptureHandle<NetworkRequestRecord>> {
            self.record("watch_network");
            Ok(CaptureHandle::new(CaptureLog::new(), tokio::spawn(async {})))
        }

        /// Record a console watch; the log stays empty.
        pub async fn watch_console(&self) -> Result<CaptureHandle<ConsoleMessageRecord>> {
            self.record("watch_console");
            Ok(CaptureHandle::new(CaptureLog::new(), tokio::spawn(async {})))
        }

        /// Record a dialog watch; the log stays empty.
        pub async fn watch_dialogs(
            &self,
            action: DialogAction,
        ) -> Result<CaptureHandle<DialogRecord>> {
            self.record(format!(
                "watch_dialogs {}",
                if action.accepts() { "accept" } else { "dismiss" }
            ));
            Ok(CaptureHandle::new(CaptureLog::new(), tokio::spawn(async {})))
        }
    }
}

#[cfg(feature = "browser")]
pub use cdp::{Page, Session};
#[cfg(not(feature = "browser"))]
pub use mock::{Page, Session};

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();
        assert!(config.headless);
        assert_eq!(config.viewport_width, 1280);
        assert_eq!(config.viewport_height, 720);
        assert!(config.sandbox);
        assert!(config.chromium_path.is_none());
    }

    #[test]
    fn test_config_builders() {
        let config = SessionConfig::default()
            .with_headless(false)
            .with_viewport(1920, 1080)
            .with_chromium_path("/usr/bin/chromium")
            .with_no_sandbox();
        assert!(!config.headless);
        assert_eq!(config.viewport_width, 1920);
        assert_eq!(config.viewport_height, 1080);
        assert_eq!(config.chromium_path.as_deref(), Some("/usr/bin/chromium"));
        assert!(!config.sandbox);
    }

    #[cfg(not(feature = "browser"))]
    mod lifecycle {
        use super::*;
        use crate::nav::NavigationPolicy;

        #[tokio::test]
        async fn test_mock_session_records_lifecycle() {
            let session = Session::launch(SessionConfig::default()).await.unwrap();
            let page = session.page().clone();
            page.goto("https://example.com", NavigationPolicy::NetworkIdle)
                .await
                .unwrap();
            page.click("#go").await.unwrap();
            session.close().await.unwrap();

            let calls = page.calls();
            assert_eq!(calls.first().map(String::as_str), Some("launch"));
            assert_eq!(calls.last().map(String::as_str), Some("close"));
            assert!(calls.iter().any(|c| c.starts_with("goto")));
            assert!(calls.iter().any(|c| c.starts_with("click")));
        }

        #[tokio::test]
        async fn test_mock_missing_selector_times_out() {
            let session = Session::launch(SessionConfig::default()).await.unwrap();
            let err = session
                .page()
                .wait_for_selector("#missing", 500)
                .await
                .unwrap_err();
            assert!(err.to_string().contains("500ms"));
            session.close().await.unwrap();
        }
    }
}
