//! CLI command definitions using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use navegar::nav::DEFAULT_WAIT_TIMEOUT_MS;

/// Navegador: one browser action per invocation over the Chrome DevTools Protocol
#[derive(Parser, Debug)]
#[command(name = "navegador")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Force headless mode regardless of the command default
    #[arg(long, global = true, conflicts_with = "headed")]
    pub headless: bool,

    /// Force headed mode regardless of the command default
    #[arg(long, global = true)]
    pub headed: bool,

    /// Path to the chromium binary (auto-detected when omitted)
    #[arg(long, global = true, env = "NAVEGADOR_BROWSER_PATH", value_name = "PATH")]
    pub browser_path: Option<PathBuf>,

    /// Disable the browser sandbox (for containers/CI)
    #[arg(long, global = true)]
    pub no_sandbox: bool,

    /// Override the post-action settle delay in milliseconds
    #[arg(long, global = true, value_name = "MS")]
    pub settle_ms: Option<u64>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Navigate to a URL and print the page title
    Navigate(NavigateArgs),

    /// Navigate to a URL, then go back one history entry
    NavigateBack(NavigateArgs),

    /// Navigate to a URL and click an element
    Click(SelectorArgs),

    /// Navigate to a URL and fill a form field
    Fill(FillArgs),

    /// Fill multiple form fields from a JSON object
    FillForm(FillFormArgs),

    /// Select an option from a dropdown
    Select(SelectArgs),

    /// Hover over an element
    Hover(SelectorArgs),

    /// Drag one element onto another
    Drag(DragArgs),

    /// Upload a file through a file input
    FileUpload(FileUploadArgs),

    /// Press a keyboard key
    PressKey(PressKeyArgs),

    /// Wait for a selector to appear
    WaitFor(WaitForArgs),

    /// Set the viewport size before navigating
    Resize(ResizeArgs),

    /// Take a full-page screenshot
    Screenshot(ScreenshotArgs),

    /// Generate an A4 PDF of the page
    Pdf(PdfArgs),

    /// Evaluate JavaScript on the page and print the result
    Evaluate(EvaluateArgs),

    /// Capture the accessibility tree of the page
    Snapshot(UrlArgs),

    /// Capture network requests issued during page load
    NetworkRequests(UrlArgs),

    /// Capture console messages emitted during page load
    ConsoleMessages(UrlArgs),

    /// Resolve JavaScript dialogs raised by the page
    HandleDialog(HandleDialogArgs),
}

/// Arguments for commands that only take a URL
#[derive(Parser, Debug)]
pub struct UrlArgs {
    /// Page URL
    pub url: String,
}

/// Arguments for navigate and navigate-back
#[derive(Parser, Debug)]
pub struct NavigateArgs {
    /// Page URL
    pub url: String,
}

/// Arguments for commands that act on one element
#[derive(Parser, Debug)]
pub struct SelectorArgs {
    /// Page URL
    pub url: String,

    /// CSS selector of the element
    pub selector: String,
}

/// Arguments for the fill command
#[derive(Parser, Debug)]
pub struct FillArgs {
    /// Page URL
    pub url: String,

    /// CSS selector of the input
    pub selector: String,

    /// Text to fill in
    pub text: String,
}

/// Arguments for the fill-form command
#[derive(Parser, Debug)]
pub struct FillFormArgs {
    /// Page URL
    pub url: String,

    /// JSON object mapping selectors to values,
    /// e.g. '{"input[name=email]":"test@example.com"}'
    pub data: String,
}

/// Arguments for the select command
#[derive(Parser, Debug)]
pub struct SelectArgs {
    /// Page URL
    pub url: String,

    /// CSS selector of the dropdown
    pub selector: String,

    /// Option value to select
    pub value: String,
}

/// Arguments for the drag command
#[derive(Parser, Debug)]
pub struct DragArgs {
    /// Page URL
    pub url: String,

    /// CSS selector of the element to drag
    pub source: String,

    /// CSS selector of the drop target
    pub target: String,
}

/// Arguments for the file-upload command
#[derive(Parser, Debug)]
pub struct FileUploadArgs {
    /// Page URL
    pub url: String,

    /// CSS selector of the file input
    pub selector: String,

    /// Path of the file to upload
    pub file: PathBuf,
}

/// Arguments for the press-key command
#[derive(Parser, Debug)]
pub struct PressKeyArgs {
    /// Page URL
    pub url: String,

    /// Key to press (Enter, Escape, ArrowDown, Tab, Space, or a single character)
    pub key: String,
}

/// Arguments for the wait-for command
#[derive(Parser, Debug)]
pub struct WaitForArgs {
    /// Page URL
    pub url: String,

    /// CSS selector to wait for
    pub selector: String,

    /// Timeout in milliseconds
    #[arg(default_value_t = DEFAULT_WAIT_TIMEOUT_MS)]
    pub timeout: u64,
}

/// Arguments for the resize command
#[derive(Parser, Debug)]
pub struct ResizeArgs {
    /// Page URL
    pub url: String,

    /// Viewport width in pixels
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    pub width: u32,

    /// Viewport height in pixels
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    pub height: u32,
}

/// Arguments for the screenshot command
#[derive(Parser, Debug)]
pub struct ScreenshotArgs {
    /// Page URL
    pub url: String,

    /// Output file path
    #[arg(default_value = "./tmp/navegar/screenshot.png")]
    pub output: PathBuf,
}

/// Arguments for the pdf command
#[derive(Parser, Debug)]
pub struct PdfArgs {
    /// Page URL
    pub url: String,

    /// Output file path
    #[arg(default_value = "./tmp/navegar/page.pdf")]
    pub output: PathBuf,
}

/// Arguments for the evaluate command
#[derive(Parser, Debug)]
pub struct EvaluateArgs {
    /// Page URL
    pub url: String,

    /// JavaScript expression, e.g. "document.title"
    pub script: String,
}

/// Arguments for the handle-dialog command
#[derive(Parser, Debug)]
pub struct HandleDialogArgs {
    /// Page URL
    pub url: String,

    /// What to do with dialogs: "accept" or "dismiss"
    pub action: String,

    /// Text to supply when accepting a prompt dialog
    pub prompt_text: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_navigate_parses_url() {
        let cli = Cli::try_parse_from(["navegador", "navigate", "https://example.com"]).unwrap();
        match cli.command {
            Commands::Navigate(args) => assert_eq!(args.url, "https://example.com"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_wait_for_default_timeout() {
        let cli =
            Cli::try_parse_from(["navegador", "wait-for", "https://example.com", ".loaded"])
                .unwrap();
        match cli.command {
            Commands::WaitFor(args) => assert_eq!(args.timeout, DEFAULT_WAIT_TIMEOUT_MS),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_wait_for_explicit_timeout() {
        let cli = Cli::try_parse_from([
            "navegador",
            "wait-for",
            "https://example.com",
            ".loaded",
            "10000",
        ])
        .unwrap();
        match cli.command {
            Commands::WaitFor(args) => assert_eq!(args.timeout, 10_000),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_screenshot_default_output() {
        let cli = Cli::try_parse_from(["navegador", "screenshot", "https://example.com"]).unwrap();
        match cli.command {
            Commands::Screenshot(args) => {
                assert_eq!(args.output, PathBuf::from("./tmp/navegar/screenshot.png"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_pdf_default_output() {
        let cli = Cli::try_parse_from(["navegador", "pdf", "https://example.com"]).unwrap();
        match cli.command {
            Commands::Pdf(args) => {
                assert_eq!(args.output, PathBuf::from("./tmp/navegar/page.pdf"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_resize_rejects_zero_width() {
        let err =
            Cli::try_parse_from(["navegador", "resize", "https://example.com", "0", "600"])
                .unwrap_err();
        assert_ne!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_headless_and_headed_conflict() {
        let err = Cli::try_parse_from([
            "navegador",
            "--headless",
            "--headed",
            "navigate",
            "https://example.com",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_missing_subcommand_is_an_error() {
        assert!(Cli::try_parse_from(["navegador"]).is_err());
    }
}
