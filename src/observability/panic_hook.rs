//! Panic hook printing a short crash report with the current context.

use super::context::{discovered_count, get_current_context, ExplorerContext};
use std::panic::PanicHookInfo;
use tracing::Span;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Install the crash-report hook. Call early in `main`.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        print_crash_report(info);
    }));
}

fn print_crash_report(info: &PanicHookInfo<'_>) {
    let context = get_current_context();

    eprintln!();
    eprintln!("inheritmap {VERSION} crashed on {}", std::env::consts::OS);
    eprintln!("  panic: {}", truncate(&extract_panic_message(info), 120));
    if let Some(location) = info.location() {
        eprintln!(
            "  location: {}:{}:{}",
            location.file(),
            location.line(),
            location.column()
        );
    }
    print_context(&context, discovered_count());

    if std::env::var("RUST_BACKTRACE").is_ok() {
        eprintln!("{}", std::backtrace::Backtrace::capture());
    } else {
        eprintln!("  run with RUST_BACKTRACE=1 for a stack trace");
    }
}

fn print_context(context: &ExplorerContext, discovered: usize) {
    match &context.phase {
        Some(phase) => eprintln!("  phase: {phase}"),
        None => eprintln!("  phase: (not set)"),
    }
    if let Some(metadata) = Span::current().metadata() {
        eprintln!("  span: {}", metadata.name());
    }
    if let Some(ty) = &context.current_type {
        eprintln!("  type: {ty}");
    }
    if discovered > 0 {
        eprintln!("  nodes discovered: {discovered}");
    }
}

fn extract_panic_message(info: &PanicHookInfo<'_>) -> String {
    if let Some(s) = info.payload().downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = info.payload().downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_string() {
        assert_eq!(truncate("short", 10), "short");
    }

    #[test]
    fn test_truncate_long_string() {
        let result = truncate("this is a long string that needs truncation", 20);
        assert_eq!(result.chars().count(), 20);
        assert!(result.ends_with("..."));
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate("ééééé", 4), "é...");
    }
}
