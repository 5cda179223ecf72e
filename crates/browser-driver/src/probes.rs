//! Page probes built on `evaluate`.
//!
//! Every probe degrades gracefully: if the script cannot run because the
//! page navigated out from under it, the probe returns `None` instead of an
//! error. Navigation is a state transition the caller detects elsewhere,
//! not a fault to propagate from here.

use pagepilot_core_types::{to_relative, RelativePosition, ScrollOffset, Viewport};
use serde_json::Value;
use tracing::debug;

use crate::driver::BrowserDriver;

/// Current page URL, or `None` if the context is gone.
pub async fn current_url(driver: &dyn BrowserDriver) -> Option<String> {
    match driver.evaluate("window.location.href").await {
        Ok(Value::String(url)) => Some(url),
        Ok(other) => {
            debug!(?other, "unexpected url probe result");
            None
        }
        Err(err) => {
            debug!(%err, "url probe failed");
            None
        }
    }
}

/// Current viewport dimensions and scroll offsets.
pub async fn viewport(driver: &dyn BrowserDriver) -> Option<(Viewport, ScrollOffset)> {
    let script = "(() => ({ w: window.innerWidth, h: window.innerHeight, \
                  sx: window.scrollX, sy: window.scrollY }))()";
    let value = driver.evaluate(script).await.ok()?;
    let w = value.get("w")?.as_u64()? as u32;
    let h = value.get("h")?.as_u64()? as u32;
    let sx = value.get("sx").and_then(Value::as_f64).unwrap_or(0.0);
    let sy = value.get("sy").and_then(Value::as_f64).unwrap_or(0.0);
    Some((Viewport::new(w, h), ScrollOffset::new(sx, sy)))
}

/// Whether any element currently matches `selector`.
///
/// `None` means the check itself could not run (stale context), which the
/// executor treats as an implicit pass.
pub async fn selector_exists(driver: &dyn BrowserDriver, selector: &str) -> Option<bool> {
    let script = format!(
        "!!document.querySelector({})",
        serde_json::to_string(selector).ok()?
    );
    match driver.evaluate(&script).await {
        Ok(Value::Bool(found)) => Some(found),
        Ok(_) => None,
        Err(err) => {
            debug!(%err, selector, "existence probe failed");
            None
        }
    }
}

/// Viewport-relative center of the element matching `selector`.
pub async fn element_center(
    driver: &dyn BrowserDriver,
    selector: &str,
) -> Option<RelativePosition> {
    let script = format!(
        "(() => {{ const el = document.querySelector({}); if (!el) return null; \
         const r = el.getBoundingClientRect(); \
         return {{ x: r.left + r.width / 2, y: r.top + r.height / 2, \
                   w: window.innerWidth, h: window.innerHeight, \
                   sx: window.scrollX, sy: window.scrollY }}; }})()",
        serde_json::to_string(selector).ok()?
    );
    let value = driver.evaluate(&script).await.ok()?;
    let x = value.get("x")?.as_f64()?;
    let y = value.get("y")?.as_f64()?;
    let w = value.get("w")?.as_u64()? as u32;
    let h = value.get("h")?.as_u64()? as u32;
    let sx = value.get("sx").and_then(Value::as_f64).unwrap_or(0.0);
    let sy = value.get("sy").and_then(Value::as_f64).unwrap_or(0.0);
    Some(to_relative(x, y, Viewport::new(w, h), ScrollOffset::new(sx, sy)))
}

/// Resolve a visible-text label to a CSS selector, searching interactive
/// elements. Returns `None` when nothing matches (or the probe cannot run).
pub async fn resolve_label(driver: &dyn BrowserDriver, label: &str) -> Option<String> {
    let script = format!(
        r#"(() => {{
  const needle = {}.trim().toLowerCase();
  if (!needle) return null;
  const nodes = document.querySelectorAll(
    'a,button,input,select,textarea,summary,[role="button"],[role="link"],[onclick]');
  for (const el of nodes) {{
    const text = (el.innerText || el.value || el.getAttribute('aria-label') || '')
      .trim().toLowerCase();
    if (!text || !text.includes(needle)) continue;
    if (el.id) return '#' + CSS.escape(el.id);
    const path = [];
    let cur = el;
    while (cur && cur !== document.body) {{
      let index = 1, sib = cur;
      while ((sib = sib.previousElementSibling)) {{
        if (sib.tagName === cur.tagName) index++;
      }}
      path.unshift(cur.tagName.toLowerCase() + ':nth-of-type(' + index + ')');
      cur = cur.parentElement;
    }}
    return 'body > ' + path.join(' > ');
  }}
  return null;
}})()"#,
        serde_json::to_string(label).ok()?
    );
    match driver.evaluate(&script).await {
        Ok(Value::String(selector)) => Some(selector),
        Ok(_) => None,
        Err(err) => {
            debug!(%err, label, "label probe failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pagepilot_core_types::ScrollDirection;
    use serde_json::json;

    use crate::errors::DriverError;

    /// Driver whose `evaluate` answers from a fixed table keyed by script
    /// substring; everything else is a no-op.
    struct TableDriver {
        answers: Vec<(&'static str, Result<Value, DriverError>)>,
    }

    #[async_trait]
    impl BrowserDriver for TableDriver {
        async fn click(&self, _selector: &str) -> Result<(), DriverError> {
            Ok(())
        }
        async fn type_text(&self, _selector: &str, _text: &str) -> Result<(), DriverError> {
            Ok(())
        }
        async fn press(&self, _key: &str) -> Result<(), DriverError> {
            Ok(())
        }
        async fn scroll(&self, _d: ScrollDirection, _a: i32) -> Result<(), DriverError> {
            Ok(())
        }
        async fn hover(&self, _selector: &str) -> Result<(), DriverError> {
            Ok(())
        }
        async fn wait(&self, _ms: u64) -> Result<(), DriverError> {
            Ok(())
        }
        async fn evaluate(&self, script: &str) -> Result<Value, DriverError> {
            for (needle, answer) in &self.answers {
                if script.contains(needle) {
                    return answer.clone();
                }
            }
            Ok(Value::Null)
        }
        async fn click_at(&self, _x: i64, _y: i64) -> Result<(), DriverError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn url_probe_swallows_context_loss() {
        let driver = TableDriver {
            answers: vec![(
                "location.href",
                Err(DriverError::ContextLost("navigating".into())),
            )],
        };
        assert_eq!(current_url(&driver).await, None);
    }

    #[tokio::test]
    async fn viewport_probe_parses_metrics() {
        let driver = TableDriver {
            answers: vec![(
                "innerWidth",
                Ok(json!({ "w": 1440, "h": 900, "sx": 0.0, "sy": 120.0 })),
            )],
        };
        let (viewport, scroll) = viewport(&driver).await.unwrap();
        assert_eq!(viewport, Viewport::new(1440, 900));
        assert_eq!(scroll.y, 120.0);
    }

    #[tokio::test]
    async fn element_center_yields_relative_position() {
        let driver = TableDriver {
            answers: vec![(
                "getBoundingClientRect",
                Ok(json!({ "x": 720.0, "y": 450.0, "w": 1440, "h": 900, "sx": 0.0, "sy": 0.0 })),
            )],
        };
        let pos = element_center(&driver, "#search").await.unwrap();
        assert!((pos.rel_x - 0.5).abs() < 1e-9);
        assert!((pos.rel_y - 0.5).abs() < 1e-9);
        assert_eq!(pos.viewport_width, 1440);
    }

    #[tokio::test]
    async fn existence_probe_reports_missing() {
        let driver = TableDriver {
            answers: vec![("!!document.querySelector", Ok(json!(false)))],
        };
        assert_eq!(selector_exists(&driver, "#gone").await, Some(false));
    }
}
