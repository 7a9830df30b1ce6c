//! Navegador CLI Library
//!
//! Command-line interface for Navegar browser automation. Every
//! subcommand performs exactly one browser action: launch, navigate,
//! act, report, close.

#![warn(missing_docs)]

mod commands;
mod error;
mod output;
mod runner;

pub use commands::{
    Cli, Commands, DragArgs, EvaluateArgs, FileUploadArgs, FillArgs, FillFormArgs,
    HandleDialogArgs, NavigateArgs, PdfArgs, PressKeyArgs, ResizeArgs, ScreenshotArgs,
    SelectArgs, SelectorArgs, UrlArgs, WaitForArgs,
};
pub use error::{CliError, CliResult};
pub use output::report_error;
pub use runner::{execute, CommandPlan, GlobalOptions, PlannedAction};
