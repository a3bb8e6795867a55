// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Central service layer — loads configuration, builds the handler registry,
// and wires the bridge context to a transport.
//
// Desktop targets without a native binding (and every CI run) use the
// headless transport; the page side of the bridge can then be driven through
// a `ScriptPort`, which is exactly what the self-check mode does.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{Value, json};
use tracing::info;

use gangway_bridge::registry::RegistryBuilder;
use gangway_bridge::{BridgeContext, CallError, CorrelationTable, EventDispatcher, ScriptPort};
use gangway_capabilities::window::MAIN_WINDOW;
use gangway_capabilities::{
    AutoConfirmDialogs, CapabilityDeps, ClipboardStore, DialogBackend, FsScope,
    NotificationCenter, ShellOpener, SystemOpener, Tray, WindowManager, register_all,
};
use gangway_core::config::AppConfig;
use gangway_core::error::{BridgeError, Result};
use gangway_webview::headless::HeadlessTransport;
use gangway_webview::tokio_ui::TokioUiExecutor;

use super::data_dir;

/// Shared application services, built once at startup.
pub struct AppServices {
    config: AppConfig,
    context: BridgeContext,
    transport: Arc<HeadlessTransport>,
    windows: Arc<WindowManager>,
    main_context: u64,
    data_dir: PathBuf,
}

impl AppServices {
    /// Initialise all services. Must run inside the tokio runtime — the
    /// transport hookup spawns routing tasks on it.
    pub fn init() -> Result<Self> {
        let dir = data_dir::data_dir();
        info!(path = %dir.display(), "initialising app services");

        // Load persisted config or use defaults
        let config = load_config(&dir).unwrap_or_default();
        Self::init_with(dir, config)
    }

    fn init_with(dir: PathBuf, config: AppConfig) -> Result<Self> {
        // The correlation table and event dispatcher are shared between the
        // context and the capability backends that need them early.
        let correlation = Arc::new(CorrelationTable::new());
        let events = EventDispatcher::new();

        let windows = Arc::new(WindowManager::new(Arc::clone(&correlation), events.clone()));
        let main_context = windows.create_window(
            MAIN_WINDOW,
            &config.window_title,
            config.window_width,
            config.window_height,
        );

        let deps = CapabilityDeps {
            windows: Arc::clone(&windows),
            clipboard: Arc::new(ClipboardStore::new()),
            fs: config
                .fs_scope
                .as_ref()
                .map(|root| Arc::new(FsScope::new(root))),
            dialogs: Arc::new(AutoConfirmDialogs) as Arc<dyn DialogBackend>,
            shell: Arc::new(SystemOpener) as Arc<dyn ShellOpener>,
            notifications: Arc::new(NotificationCenter::new(events.clone())),
            tray: Arc::new(Tray::new("gangway", events.clone())),
        };

        let mut builder = RegistryBuilder::new();
        register_all(&mut builder, &deps);

        let context =
            BridgeContext::with_parts(builder.build(), config.grants(), correlation, events);

        let transport = Arc::new(HeadlessTransport::new());
        let ui = Arc::new(TokioUiExecutor::spawn());
        context.attach_transport(ui, Arc::clone(&transport) as _)?;

        info!(start_url = %config.start_url, "app services initialised");

        Ok(Self {
            config,
            context,
            transport,
            windows,
            main_context,
            data_dir: dir,
        })
    }

    /// Open the script side of the main window's bridge.
    ///
    /// Marks the page as loaded and routes everything the page would receive
    /// into the returned port.
    pub fn open_script_port(&self) -> Arc<ScriptPort> {
        let to_native = {
            let transport = Arc::clone(&self.transport);
            Arc::new(move |raw: Vec<u8>| transport.push_from_script(&raw))
        };
        let port = Arc::new(ScriptPort::with_correlation(
            self.main_context,
            to_native,
            Arc::clone(self.context.correlation()),
        ));

        let sink = Arc::clone(&port);
        self.transport
            .set_script_sink(Arc::new(move |json| sink.handle_inbound(json)));
        self.transport.set_ready(true);
        port
    }

    /// One full round trip through the real stack; used by CI smoke runs.
    pub async fn self_check(&self) -> Result<()> {
        let port = self.open_script_port();

        port.call("clipboard", "setText", json!({"text": "self-check"}))
            .await
            .map_err(check_failed)?;
        let text = port
            .call("clipboard", "getText", json!({}))
            .await
            .map_err(check_failed)?;
        if text != json!("self-check") {
            return Err(BridgeError::Internal(format!(
                "clipboard round trip returned {text}"
            )));
        }

        let size = port
            .call("window", "getSize", Value::Null)
            .await
            .map_err(check_failed)?;
        info!(%size, "self-check passed");
        Ok(())
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn windows(&self) -> &Arc<WindowManager> {
        &self.windows
    }

    pub fn context(&self) -> &BridgeContext {
        &self.context
    }

    /// Update and persist the config.
    pub fn save_config(&mut self, config: AppConfig) -> Result<()> {
        persist_config(&self.data_dir, &config)?;
        self.config = config;
        Ok(())
    }
}

fn check_failed(e: CallError) -> BridgeError {
    BridgeError::Internal(format!("self-check call failed: {e}"))
}

// -- Config file persistence -------------------------------------------------

const CONFIG_FILE: &str = "config.json";

fn load_config(data_dir: &Path) -> Option<AppConfig> {
    let path = data_dir.join(CONFIG_FILE);
    let data = std::fs::read_to_string(&path).ok()?;
    serde_json::from_str(&data).ok()
}

fn persist_config(data_dir: &Path, config: &AppConfig) -> Result<()> {
    let path = data_dir.join(CONFIG_FILE);
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(&path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gangway_core::capability::Capability;

    #[tokio::test(flavor = "multi_thread")]
    async fn self_check_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let services =
            AppServices::init_with(dir.path().to_owned(), AppConfig::default()).expect("init");
        services.self_check().await.expect("self-check");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn config_grants_gate_the_bridge() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut config = AppConfig::default();
        config.granted_capabilities.retain(|c| *c != Capability::Clipboard);

        let services = AppServices::init_with(dir.path().to_owned(), config).expect("init");
        let port = services.open_script_port();

        let err = port
            .call("clipboard", "getText", json!({}))
            .await
            .expect_err("denied");
        assert_eq!(err.code, gangway_core::error::ErrorCode::PermissionDenied);
    }

    #[test]
    fn config_persists_and_reloads() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut config = AppConfig::default();
        config.window_title = "Custom".into();

        persist_config(dir.path(), &config).expect("persist");
        let loaded = load_config(dir.path()).expect("load");
        assert_eq!(loaded.window_title, "Custom");
    }

    #[test]
    fn missing_config_file_loads_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(load_config(dir.path()).is_none());
    }
}
