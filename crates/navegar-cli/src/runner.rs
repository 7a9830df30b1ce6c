//! Command planning and execution.
//!
//! Every command runs the same lifecycle: validate the invocation,
//! launch a browser session, navigate once, perform the single action,
//! report the result, and close the session. Validation failures are
//! reported before any browser is launched, and the session is closed
//! on success and failure alike.

use std::path::PathBuf;
use std::time::Duration;

use navegar::keys::{self, KeyInput};
use navegar::nav::{NavigationPolicy, DEFAULT_ELEMENT_TIMEOUT_MS};
use navegar::{DialogAction, DialogKind, DialogRecord, Page, Session, SessionConfig};

use crate::commands::{Cli, Commands};
use crate::error::{CliError, CliResult};
use crate::output;

/// Settle delay after most actions (milliseconds)
const SETTLE_MS: u64 = 2_000;

/// Settle delay where the effect needs longer to be visible (milliseconds)
const SETTLE_LONG_MS: u64 = 3_000;

/// Settle delay while waiting for dialogs to fire (milliseconds)
const SETTLE_DIALOG_MS: u64 = 5_000;

/// Session-level options taken from the global CLI flags.
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    /// Headless override; None keeps the command default
    pub headless: Option<bool>,
    /// Explicit chromium binary path
    pub browser_path: Option<String>,
    /// Whether the browser sandbox stays enabled
    pub sandbox: bool,
    /// Settle delay override; None keeps the command default
    pub settle_ms: Option<u64>,
}

impl From<&Cli> for GlobalOptions {
    fn from(cli: &Cli) -> Self {
        let headless = if cli.headless {
            Some(true)
        } else if cli.headed {
            Some(false)
        } else {
            None
        };
        Self {
            headless,
            browser_path: cli
                .browser_path
                .as_ref()
                .map(|p| p.to_string_lossy().into_owned()),
            sandbox: !cli.no_sandbox,
            settle_ms: cli.settle_ms,
        }
    }
}

/// The single action a command performs after navigating.
#[derive(Debug, Clone)]
pub enum PlannedAction {
    /// Report the page title
    Navigate,
    /// Go back one history entry
    NavigateBack,
    /// Click an element
    Click {
        /// Element selector
        selector: String,
    },
    /// Fill one input
    Fill {
        /// Input selector
        selector: String,
        /// Text to fill in
        text: String,
    },
    /// Fill several inputs in order
    FillForm {
        /// Selector and value pairs, in the order given
        fields: Vec<(String, String)>,
    },
    /// Select a dropdown option
    Select {
        /// Dropdown selector
        selector: String,
        /// Option value
        value: String,
    },
    /// Hover over an element
    Hover {
        /// Element selector
        selector: String,
    },
    /// Drag one element onto another
    Drag {
        /// Source selector
        source: String,
        /// Target selector
        target: String,
    },
    /// Upload a file through a file input
    FileUpload {
        /// File input selector
        selector: String,
        /// File to upload
        path: PathBuf,
    },
    /// Press a keyboard key
    PressKey {
        /// Key name as given on the command line
        name: String,
        /// Resolved key
        key: KeyInput,
    },
    /// Wait for a selector to appear
    WaitFor {
        /// Selector to wait for
        selector: String,
        /// Wait timeout in milliseconds
        timeout_ms: u64,
    },
    /// Override the viewport before navigating
    Resize {
        /// Viewport width
        width: u32,
        /// Viewport height
        height: u32,
    },
    /// Save a full-page screenshot
    Screenshot {
        /// Output file
        output: PathBuf,
    },
    /// Save an A4 PDF
    Pdf {
        /// Output file
        output: PathBuf,
    },
    /// Evaluate a script and report its value
    Evaluate {
        /// JavaScript expression
        script: String,
    },
    /// Report the accessibility tree
    Snapshot,
    /// Report network requests observed during load
    NetworkRequests,
    /// Report console messages observed during load
    ConsoleMessages,
    /// Resolve dialogs raised by the page
    HandleDialog {
        /// How each dialog is resolved
        action: DialogAction,
    },
}

/// A validated invocation, ready to execute.
#[derive(Debug, Clone)]
pub struct CommandPlan {
    /// Page URL
    pub url: String,
    /// How the navigation waits
    pub policy: NavigationPolicy,
    /// Command's default headless mode
    pub headless: bool,
    /// Command's default settle delay (milliseconds)
    pub settle_ms: u64,
    /// The action to perform
    pub action: PlannedAction,
}

impl CommandPlan {
    /// Validate a parsed command into an executable plan.
    ///
    /// # Errors
    ///
    /// Returns a usage error for malformed form data, an unknown dialog
    /// action, a missing upload file, or an unrecognized key name.
    pub fn new(command: Commands) -> CliResult<Self> {
        let plan = match command {
            Commands::Navigate(args) => Self {
                url: args.url,
                policy: NavigationPolicy::Immediate,
                headless: false,
                settle_ms: 0,
                action: PlannedAction::Navigate,
            },
            Commands::NavigateBack(args) => Self {
                url: args.url,
                policy: NavigationPolicy::Immediate,
                headless: false,
                settle_ms: SETTLE_MS,
                action: PlannedAction::NavigateBack,
            },
            Commands::Click(args) => Self {
                url: args.url,
                policy: NavigationPolicy::NetworkIdle,
                headless: false,
                settle_ms: SETTLE_MS,
                action: PlannedAction::Click {
                    selector: args.selector,
                },
            },
            Commands::Fill(args) => Self {
                url: args.url,
                policy: NavigationPolicy::NetworkIdle,
                headless: false,
                settle_ms: SETTLE_MS,
                action: PlannedAction::Fill {
                    selector: args.selector,
                    text: args.text,
                },
            },
            Commands::FillForm(args) => Self {
                url: args.url,
                policy: NavigationPolicy::NetworkIdle,
                headless: false,
                settle_ms: SETTLE_MS,
                action: PlannedAction::FillForm {
                    fields: parse_form_data(&args.data)?,
                },
            },
            Commands::Select(args) => Self {
                url: args.url,
                policy: NavigationPolicy::NetworkIdle,
                headless: false,
                settle_ms: SETTLE_MS,
                action: PlannedAction::Select {
                    selector: args.selector,
                    value: args.value,
                },
            },
            Commands::Hover(args) => Self {
                url: args.url,
                policy: NavigationPolicy::NetworkIdle,
                headless: false,
                settle_ms: SETTLE_LONG_MS,
                action: PlannedAction::Hover {
                    selector: args.selector,
                },
            },
            Commands::Drag(args) => Self {
                url: args.url,
                policy: NavigationPolicy::NetworkIdle,
                headless: false,
                settle_ms: SETTLE_MS,
                action: PlannedAction::Drag {
                    source: args.source,
                    target: args.target,
                },
            },
            Commands::FileUpload(args) => {
                if !args.file.exists() {
                    return Err(CliError::usage(format!(
                        "File not found: {}",
                        args.file.display()
                    )));
                }
                Self {
                    url: args.url,
                    policy: NavigationPolicy::NetworkIdle,
                    headless: false,
                    settle_ms: SETTLE_MS,
                    action: PlannedAction::FileUpload {
                        selector: args.selector,
                        path: args.file,
                    },
                }
            }
            Commands::PressKey(args) => {
                let key = keys::resolve(&args.key)?;
                Self {
                    url: args.url,
                    policy: NavigationPolicy::NetworkIdle,
                    headless: false,
                    settle_ms: SETTLE_MS,
                    action: PlannedAction::PressKey {
                        name: args.key,
                        key,
                    },
                }
            }
            Commands::WaitFor(args) => Self {
                url: args.url,
                policy: NavigationPolicy::Immediate,
                headless: false,
                settle_ms: SETTLE_MS,
                action: PlannedAction::WaitFor {
                    selector: args.selector,
                    timeout_ms: args.timeout,
                },
            },
            Commands::Resize(args) => Self {
                url: args.url,
                policy: NavigationPolicy::Immediate,
                headless: false,
                settle_ms: SETTLE_LONG_MS,
                action: PlannedAction::Resize {
                    width: args.width,
                    height: args.height,
                },
            },
            Commands::Screenshot(args) => Self {
                url: args.url,
                policy: NavigationPolicy::NetworkIdle,
                headless: true,
                settle_ms: 0,
                action: PlannedAction::Screenshot {
                    output: args.output,
                },
            },
            Commands::Pdf(args) => Self {
                url: args.url,
                policy: NavigationPolicy::NetworkIdle,
                headless: true,
                settle_ms: 0,
                action: PlannedAction::Pdf {
                    output: args.output,
                },
            },
            Commands::Evaluate(args) => Self {
                url: args.url,
                policy: NavigationPolicy::NetworkIdle,
                headless: true,
                settle_ms: 0,
                action: PlannedAction::Evaluate {
                    script: args.script,
                },
            },
            Commands::Snapshot(args) => Self {
                url: args.url,
                policy: NavigationPolicy::NetworkIdle,
                headless: true,
                settle_ms: 0,
                action: PlannedAction::Snapshot,
            },
            Commands::NetworkRequests(args) => Self {
                url: args.url,
                policy: NavigationPolicy::NetworkIdle,
                headless: true,
                settle_ms: 0,
                action: PlannedAction::NetworkRequests,
            },
            Commands::ConsoleMessages(args) => Self {
                url: args.url,
                policy: NavigationPolicy::NetworkIdle,
                headless: true,
                settle_ms: SETTLE_MS,
                action: PlannedAction::ConsoleMessages,
            },
            Commands::HandleDialog(args) => Self {
                url: args.url,
                policy: NavigationPolicy::NetworkIdle,
                headless: false,
                settle_ms: SETTLE_DIALOG_MS,
                action: PlannedAction::HandleDialog {
                    action: parse_dialog_action(&args.action, args.prompt_text)?,
                },
            },
        };
        Ok(plan)
    }
}

/// Parse the fill-form JSON object into ordered selector/value pairs.
///
/// Non-string scalar values are coerced to their text form.
fn parse_form_data(data: &str) -> CliResult<Vec<(String, String)>> {
    let parsed: serde_json::Value =
        serde_json::from_str(data).map_err(|_| CliError::usage("Invalid JSON data"))?;
    let object = parsed
        .as_object()
        .ok_or_else(|| CliError::usage("Invalid JSON data"))?;
    Ok(object
        .iter()
        .map(|(selector, value)| (selector.clone(), scalar_text(value)))
        .collect())
}

fn scalar_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn parse_dialog_action(action: &str, prompt_text: Option<String>) -> CliResult<DialogAction> {
    match action {
        "accept" => Ok(prompt_text.map_or(DialogAction::Accept, DialogAction::AcceptWith)),
        "dismiss" => Ok(DialogAction::Dismiss),
        _ => Err(CliError::usage("Action must be \"accept\" or \"dismiss\"")),
    }
}

/// Run a plan to completion.
///
/// The session is closed whether the action succeeds or fails; an action
/// error takes precedence over a close error.
///
/// # Errors
///
/// Returns any error raised while launching, navigating, acting, or
/// closing the session.
pub fn execute(plan: &CommandPlan, globals: &GlobalOptions) -> CliResult<()> {
    let headless = globals.headless.unwrap_or(plan.headless);
    let settle_ms = globals.settle_ms.unwrap_or(plan.settle_ms);

    let mut config = SessionConfig::default().with_headless(headless);
    if let Some(ref path) = globals.browser_path {
        config = config.with_chromium_path(path.clone());
    }
    if !globals.sandbox {
        config = config.with_no_sandbox();
    }

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        let session = Session::launch(config).await.map_err(CliError::from)?;
        let outcome = drive(session.page(), plan, settle_ms).await;
        let closed = session.close().await;
        match outcome {
            Ok(()) => closed.map_err(CliError::from),
            Err(err) => {
                if let Err(close_err) = closed {
                    tracing::warn!("failed to close browser session: {close_err}");
                }
                Err(err)
            }
        }
    })
}

/// Perform the planned action against an open page.
#[allow(clippy::too_many_lines)]
async fn drive(page: &Page, plan: &CommandPlan, settle_ms: u64) -> CliResult<()> {
    match &plan.action {
        PlannedAction::Navigate => {
            navigate(page, plan).await?;
            let title = page.title().await?;
            println!("Page title: {title}");
            println!("Navigation successful");
            settle(settle_ms).await;
        }
        PlannedAction::NavigateBack => {
            navigate(page, plan).await?;
            settle(settle_ms).await;
            println!("Navigating back...");
            page.go_back().await?;
            println!("Back navigation successful");
            settle(settle_ms).await;
        }
        PlannedAction::Click { selector } => {
            navigate(page, plan).await?;
            println!("Waiting for selector: {selector}");
            page.wait_for_selector(selector, DEFAULT_ELEMENT_TIMEOUT_MS)
                .await?;
            println!("Clicking: {selector}");
            page.click(selector).await?;
            println!("Click successful");
            settle(settle_ms).await;
        }
        PlannedAction::Fill { selector, text } => {
            navigate(page, plan).await?;
            println!("Waiting for selector: {selector}");
            page.wait_for_selector(selector, DEFAULT_ELEMENT_TIMEOUT_MS)
                .await?;
            println!("Filling: {selector} with \"{text}\"");
            page.fill(selector, text).await?;
            println!("Fill successful");
            settle(settle_ms).await;
        }
        PlannedAction::FillForm { fields } => {
            navigate(page, plan).await?;
            println!("Filling form fields...");
            for (selector, value) in fields {
                println!("  {selector} = {value}");
                page.wait_for_selector(selector, DEFAULT_ELEMENT_TIMEOUT_MS)
                    .await?;
                page.fill(selector, value).await?;
            }
            println!("Form fill successful");
            settle(settle_ms).await;
        }
        PlannedAction::Select { selector, value } => {
            navigate(page, plan).await?;
            println!("Waiting for selector: {selector}");
            page.wait_for_selector(selector, DEFAULT_ELEMENT_TIMEOUT_MS)
                .await?;
            println!("Selecting option: {value}");
            page.select_option(selector, value).await?;
            println!("Selection successful");
            settle(settle_ms).await;
        }
        PlannedAction::Hover { selector } => {
            navigate(page, plan).await?;
            println!("Waiting for selector: {selector}");
            page.wait_for_selector(selector, DEFAULT_ELEMENT_TIMEOUT_MS)
                .await?;
            println!("Hovering over: {selector}");
            page.hover(selector).await?;
            println!("Hover successful");
            settle(settle_ms).await;
        }
        PlannedAction::Drag { source, target } => {
            navigate(page, plan).await?;
            println!("Waiting for selectors...");
            page.wait_for_selector(source, DEFAULT_ELEMENT_TIMEOUT_MS)
                .await?;
            page.wait_for_selector(target, DEFAULT_ELEMENT_TIMEOUT_MS)
                .await?;
            println!("Dragging {source} to {target}");
            page.drag(source, target).await?;
            println!("Drag and drop successful");
            settle(settle_ms).await;
        }
        PlannedAction::FileUpload { selector, path } => {
            navigate(page, plan).await?;
            println!("Waiting for file input: {selector}");
            page.wait_for_selector(selector, DEFAULT_ELEMENT_TIMEOUT_MS)
                .await?;
            println!("Uploading file: {}", path.display());
            page.upload_file(selector, path).await?;
            println!("File upload successful");
            settle(settle_ms).await;
        }
        PlannedAction::PressKey { name, key } => {
            navigate(page, plan).await?;
            println!("Pressing key: {name}");
            page.press_key(key).await?;
            println!("Key press successful");
            settle(settle_ms).await;
        }
        PlannedAction::WaitFor {
            selector,
            timeout_ms,
        } => {
            navigate(page, plan).await?;
            println!("Waiting for selector: {selector} (timeout: {timeout_ms}ms)");
            page.wait_for_selector(selector, *timeout_ms).await?;
            println!("Element found!");
            settle(settle_ms).await;
        }
        PlannedAction::Resize { width, height } => {
            println!("Setting viewport to {width}x{height}");
            page.set_viewport(*width, *height).await?;
            navigate(page, plan).await?;
            println!("Resize successful");
            settle(settle_ms).await;
        }
        PlannedAction::Screenshot { output } => {
            navigate(page, plan).await?;
            println!("Taking screenshot: {}", output.display());
            page.screenshot(output).await?;
            println!("Screenshot saved successfully");
            settle(settle_ms).await;
        }
        PlannedAction::Pdf { output } => {
            navigate(page, plan).await?;
            println!("Generating PDF: {}", output.display());
            page.pdf(output).await?;
            println!("PDF generated successfully");
            settle(settle_ms).await;
        }
        PlannedAction::Evaluate { script } => {
            navigate(page, plan).await?;
            println!("Evaluating: {script}");
            let result = page.evaluate(script).await?;
            output::json_block("Result", &result)?;
        }
        PlannedAction::Snapshot => {
            navigate(page, plan).await?;
            println!("Capturing accessibility snapshot...");
            let snapshot = page.accessibility_snapshot().await?;
            output::json_block("Accessibility Snapshot", &snapshot)?;
        }
        PlannedAction::NetworkRequests => {
            let watch = page.watch_network().await?;
            navigate(page, plan).await?;
            settle(settle_ms).await;
            let records = watch.stop();
            output::json_block("Network Requests", &records)?;
        }
        PlannedAction::ConsoleMessages => {
            let watch = page.watch_console().await?;
            navigate(page, plan).await?;
            settle(settle_ms).await;
            let records = watch.stop();
            output::json_block("Console Messages", &records)?;
        }
        PlannedAction::HandleDialog { action } => {
            let watch = page.watch_dialogs(action.clone()).await?;
            navigate(page, plan).await?;
            println!("Page loaded. Dialog handler is active.");
            println!("Waiting for dialogs...");
            settle(settle_ms).await;
            let records = watch.stop();
            for record in &records {
                report_dialog(record, action);
            }
        }
    }
    Ok(())
}

async fn navigate(page: &Page, plan: &CommandPlan) -> navegar::Result<()> {
    println!("Navigating to: {}", plan.url);
    page.goto(&plan.url, plan.policy).await
}

fn report_dialog(record: &DialogRecord, action: &DialogAction) {
    println!("Dialog type: {}", record.kind);
    println!("Dialog message: {}", record.message);
    match action {
        DialogAction::AcceptWith(text) if record.kind == DialogKind::Prompt => {
            println!("Accepting with text: {text}");
        }
        DialogAction::Accept | DialogAction::AcceptWith(_) => println!("Accepting dialog"),
        DialogAction::Dismiss => println!("Dismissing dialog"),
    }
}

async fn settle(ms: u64) {
    if ms > 0 {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}
