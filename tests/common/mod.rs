//! Scripted in-memory page driver shared by the integration tests.

use async_trait::async_trait;
use pagepilot::{BrowserDriver, DriverError, ScrollDirection};
use parking_lot::Mutex;
use serde_json::{json, Value};

#[derive(Default)]
pub struct PageState {
    pub url: String,
    pub viewport: (u32, u32),
    pub elements: Vec<String>,
    pub labels: Vec<(String, String)>,
    pub clicks: Vec<String>,
    pub typed: Vec<(String, String)>,
    pub pressed: Vec<String>,
    pub clicks_at: Vec<(i64, i64)>,
    pub fail_click: Option<String>,
    pub navigate_on_click: Option<(String, String)>,
}

/// A fake page: elements either exist or they don't, clicks can be scripted
/// to fail or navigate, and `evaluate` answers the probe scripts the core
/// actually sends.
pub struct ScriptedDriver {
    pub state: Mutex<PageState>,
}

impl ScriptedDriver {
    pub fn new(url: &str, viewport: (u32, u32), elements: &[&str]) -> Self {
        Self {
            state: Mutex::new(PageState {
                url: url.into(),
                viewport,
                elements: elements.iter().map(|s| s.to_string()).collect(),
                ..PageState::default()
            }),
        }
    }
}

#[async_trait]
impl BrowserDriver for ScriptedDriver {
    async fn click(&self, selector: &str) -> Result<(), DriverError> {
        let mut state = self.state.lock();
        if state.fail_click.as_deref() == Some(selector) {
            return Err(DriverError::NotInteractable(selector.into()));
        }
        if !state.elements.iter().any(|e| e == selector) {
            return Err(DriverError::NotFound(selector.into()));
        }
        state.clicks.push(selector.to_string());
        if let Some((trigger, url)) = state.navigate_on_click.clone() {
            if trigger == selector {
                state.url = url;
            }
        }
        Ok(())
    }

    async fn type_text(&self, selector: &str, text: &str) -> Result<(), DriverError> {
        let mut state = self.state.lock();
        if !state.elements.iter().any(|e| e == selector) {
            return Err(DriverError::NotFound(selector.into()));
        }
        state.typed.push((selector.to_string(), text.to_string()));
        Ok(())
    }

    async fn press(&self, key: &str) -> Result<(), DriverError> {
        self.state.lock().pressed.push(key.to_string());
        Ok(())
    }

    async fn scroll(&self, _direction: ScrollDirection, _amount: i32) -> Result<(), DriverError> {
        Ok(())
    }

    async fn hover(&self, selector: &str) -> Result<(), DriverError> {
        let state = self.state.lock();
        if state.elements.iter().any(|e| e == selector) {
            Ok(())
        } else {
            Err(DriverError::NotFound(selector.into()))
        }
    }

    async fn wait(&self, _ms: u64) -> Result<(), DriverError> {
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> Result<Value, DriverError> {
        let state = self.state.lock();
        let (w, h) = state.viewport;
        if script.contains("MutationObserver") {
            return Ok(json!(true));
        }
        if script.contains("__settleWatch") {
            return Ok(json!(10_000));
        }
        if script.contains("location.href") {
            return Ok(json!(state.url));
        }
        if script.contains("innerWidth") && !script.contains("querySelector") {
            return Ok(json!({ "w": w, "h": h, "sx": 0.0, "sy": 0.0 }));
        }
        if script.contains("CSS.escape") {
            for (label, selector) in &state.labels {
                if script.contains(&serde_json::to_string(label).unwrap()) {
                    return Ok(json!(selector));
                }
            }
            return Ok(Value::Null);
        }
        if script.contains("getBoundingClientRect") {
            for element in &state.elements {
                if script.contains(&serde_json::to_string(element).unwrap()) {
                    // Every element sits at the viewport center.
                    return Ok(json!({
                        "x": w as f64 / 2.0, "y": h as f64 / 2.0,
                        "w": w, "h": h, "sx": 0.0, "sy": 0.0
                    }));
                }
            }
            return Ok(Value::Null);
        }
        if script.contains("!!document.querySelector") {
            let found = state
                .elements
                .iter()
                .any(|e| script.contains(&serde_json::to_string(e).unwrap()));
            return Ok(json!(found));
        }
        Ok(Value::Null)
    }

    async fn click_at(&self, x: i64, y: i64) -> Result<(), DriverError> {
        self.state.lock().clicks_at.push((x, y));
        Ok(())
    }
}

/// Executor config with settle timings short enough for tests.
pub fn quick_config() -> pagepilot::ExecutorConfig {
    pagepilot::ExecutorConfig {
        settle: pagepilot::SettleOptions {
            timeout_ms: 200,
            quiet_ms: 50,
        },
        ..pagepilot::ExecutorConfig::default()
    }
}
