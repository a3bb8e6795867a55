// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Gangway — Cross-platform WebView application shell
//
// Entry point. Initialises logging and backend services, then either runs
// the self-check round trip (GANGWAY_SELF_CHECK=1) or serves the bridge
// until interrupted.

mod services;

use std::process::ExitCode;

use services::app_services::AppServices;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Gangway starting");

    let services = match AppServices::init() {
        Ok(s) => {
            tracing::info!("backend services initialised");
            s
        }
        Err(e) => {
            tracing::error!(error = %e, "startup failed");
            return ExitCode::FAILURE;
        }
    };

    // CI smoke mode: one full bridge round trip, then exit.
    if std::env::var("GANGWAY_SELF_CHECK").as_deref() == Ok("1") {
        return match services.self_check().await {
            Ok(()) => {
                println!("ready");
                ExitCode::SUCCESS
            }
            Err(e) => {
                tracing::error!(error = %e, "self-check failed");
                ExitCode::FAILURE
            }
        };
    }

    if gangway_webview::native_webview_available() {
        tracing::info!("native webview adapter available on this target");
    } else {
        tracing::info!("no native webview on this target, serving headless bridge");
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "signal wait failed");
        return ExitCode::FAILURE;
    }
    tracing::info!("shutting down");
    ExitCode::SUCCESS
}
