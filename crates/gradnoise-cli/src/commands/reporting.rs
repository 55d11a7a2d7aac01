//! Console and report helpers shared by the commands.

use colored::Colorize;
use gradnoise_engine::EngineError;

const RULE: &str = "======================================";

/// Prints a cyan framed title.
pub(crate) fn print_banner(title: &str) {
    println!("{}", RULE.cyan());
    println!("{}", title.cyan().bold());
    println!("{}", RULE.cyan());
}

/// Current UTC time in RFC 3339 with second precision.
pub(crate) fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

/// Engine error code of an anyhow error chain, if any link is an engine error.
pub(crate) fn error_code(err: &anyhow::Error) -> Option<String> {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<EngineError>())
        .map(|e| e.code().to_string())
}
