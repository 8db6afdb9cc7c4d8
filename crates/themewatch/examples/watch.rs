//! Print appearance changes until stdin is closed.
//!
//! Reads settings from the default location, or from the path given as the
//! first argument. Press Ctrl-D (EOF) to stop.
//!
//! Run with: cargo run -p themewatch --example watch
//!
//! Set `RUST_LOG=themewatch=trace` to see what the source is doing.

use std::io::{self, BufRead};

use themewatch::{NativeLibrary, Settings, platform_monitor};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = match std::env::args().nth(1) {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };

    let status = NativeLibrary::get();
    println!("Theme watch example");
    println!("===================");
    println!(
        "Platform: {} {} (version {})",
        status.os,
        status.architecture,
        status
            .os_version
            .map(|v| v.to_string())
            .unwrap_or_else(|| "unknown".to_string())
    );
    println!(
        "Native support: {} ({})",
        status.compatibility.supported, status.compatibility.reason
    );
    println!();

    let monitor = platform_monitor(&settings, |dark, high_contrast| {
        println!("dark={dark} high_contrast={high_contrast}");
    });
    monitor.install();
    monitor.start();

    if monitor.is_running() {
        println!("Watching for changes. Press Ctrl-D to quit.");
    } else {
        println!("No theme source is running. Press Ctrl-D to quit.");
    }

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        line?;
        // Any input forces a fresh report.
        monitor.request_update();
    }

    monitor.stop();
    monitor.uninstall();
    println!("Stopped");
    Ok(())
}
