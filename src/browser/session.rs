use crate::{browser::{ElementRef, LaunchOptions, RenderClient, Scope, Selector, SessionFactory},
            error::{Result, ScrapeError}};
use headless_chrome::{Browser, Tab};
use serde::Deserialize;
use serde_json::Value;
use std::{ffi::OsStr, sync::Arc, time::Duration};

/// Page-side array holding every element handed out as an [`ElementRef`]
const REGISTRY: &str = "(window.__workdayRefs = window.__workdayRefs || [])";

/// Browser session that drives one Chrome/Chromium tab
pub struct BrowserSession {
    /// Kept alive for the session; dropping it kills the browser process
    _browser: Browser,

    tab: Arc<Tab>,
}

/// Envelope every session script answers with
#[derive(Debug, Default, Deserialize)]
struct ScriptReply {
    #[serde(default)]
    stale: bool,

    #[serde(default)]
    handle: Option<u64>,

    #[serde(default)]
    value: Value,
}

impl BrowserSession {
    /// Launch a new browser instance with the given options
    pub fn launch(options: LaunchOptions) -> Result<Self> {
        let mut launch_opts = headless_chrome::LaunchOptions::default();

        // Hide the automation banner and navigator.webdriver flag
        launch_opts.ignore_default_args.push(OsStr::new("--enable-automation"));
        launch_opts.args.push(OsStr::new("--disable-blink-features=AutomationControlled"));
        launch_opts.args.push(OsStr::new("--disable-gpu"));
        launch_opts.args.push(OsStr::new("--disable-dev-shm-usage"));

        // A full traversal easily outlives the 30 second default
        launch_opts.idle_browser_timeout = Duration::from_secs(60 * 60);

        launch_opts.headless = options.headless;
        launch_opts.window_size = Some((options.window_width, options.window_height));
        launch_opts.sandbox = options.sandbox;

        if let Some(path) = options.chrome_path {
            launch_opts.path = Some(path);
        }

        if let Some(dir) = options.user_data_dir {
            launch_opts.user_data_dir = Some(dir);
        }

        log::info!("Launching {} browser", if options.headless { "headless" } else { "headed" });
        let browser = Browser::new(launch_opts).map_err(|e| ScrapeError::LaunchFailed(e.to_string()))?;

        let tab = browser
            .new_tab()
            .map_err(|e| ScrapeError::LaunchFailed(format!("Failed to create tab: {}", e)))?;

        Ok(Self { _browser: browser, tab })
    }

    /// Evaluate an expression that returns a JSON string and parse it
    fn evaluate_json<T: for<'de> Deserialize<'de>>(&self, expression: &str) -> Result<T> {
        let result = self
            .tab
            .evaluate(expression, false)
            .map_err(|e| ScrapeError::EvaluationFailed(e.to_string()))?;

        // Objects are not returned by value, so every script stringifies its answer
        let json_str = match result.value {
            Some(Value::String(s)) => s,
            other => {
                return Err(ScrapeError::ScriptResultInvalid(format!("expected JSON string, got {:?}", other)));
            }
        };

        serde_json::from_str(&json_str).map_err(|e| ScrapeError::ScriptResultInvalid(e.to_string()))
    }

    /// Run `body` against a registered element, failing with `StaleElement` if it was detached
    fn with_element(&self, element: &ElementRef, body: &str) -> Result<Value> {
        let reply: ScriptReply = self.evaluate_json(&element_script(element, body))?;
        if reply.stale {
            return Err(ScrapeError::StaleElement(element.to_string()));
        }
        Ok(reply.value)
    }
}

impl RenderClient for BrowserSession {
    fn navigate(&self, url: &str) -> Result<()> {
        self.tab
            .navigate_to(url)
            .map_err(|e| ScrapeError::NavigationFailed(format!("Failed to navigate to {}: {}", url, e)))?;

        self.tab
            .wait_until_navigated()
            .map_err(|e| ScrapeError::NavigationFailed(format!("Navigation timeout: {}", e)))?;

        Ok(())
    }

    fn find(&self, scope: Scope<'_>, selector: &Selector) -> Result<Option<ElementRef>> {
        let reply: ScriptReply = self.evaluate_json(&lookup_script(scope, selector))?;
        if reply.stale {
            let scope_desc = match scope {
                Scope::Within(el) => el.to_string(),
                Scope::Document => "document".to_string(),
            };
            return Err(ScrapeError::StaleElement(scope_desc));
        }
        Ok(reply.handle.map(ElementRef::new))
    }

    fn is_clickable(&self, element: &ElementRef) -> Result<bool> {
        let value = self.with_element(
            element,
            r#"const rect = el.getBoundingClientRect();
            const style = window.getComputedStyle(el);
            return rect.width > 0 && rect.height > 0
                && style.visibility !== 'hidden'
                && style.display !== 'none'
                && !el.disabled;"#,
        )?;
        Ok(value.as_bool().unwrap_or(false))
    }

    fn is_selected(&self, element: &ElementRef) -> Result<bool> {
        let value = self.with_element(
            element,
            "return el.checked === true || el.selected === true || el.getAttribute('aria-checked') === 'true';",
        )?;
        Ok(value.as_bool().unwrap_or(false))
    }

    fn text(&self, element: &ElementRef) -> Result<String> {
        let value = self.with_element(element, "return el.innerText || el.textContent || '';")?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    fn execute(&self, script: &str) -> Result<Value> {
        let expression = format!(
            "(function() {{ const value = (function() {{ {} }})(); return JSON.stringify(value === undefined ? null : value); }})()",
            script
        );
        self.evaluate_json(&expression)
    }

    fn click(&self, element: &ElementRef) -> Result<()> {
        self.with_element(element, "el.click(); return true;")?;
        Ok(())
    }

    fn scroll_into_view(&self, element: &ElementRef) -> Result<()> {
        self.with_element(element, "el.scrollIntoView(true); return true;")?;
        Ok(())
    }

    fn scroll_to_bottom(&self) -> Result<()> {
        self.execute("window.scrollTo(0, document.body.scrollHeight); return true;")?;
        Ok(())
    }

    fn close(&self) -> Result<()> {
        self.tab
            .close(false)
            .map_err(|e| ScrapeError::TabOperationFailed(format!("Failed to close tab: {}", e)))?;
        Ok(())
    }
}

impl SessionFactory for LaunchOptions {
    type Client = BrowserSession;

    fn open(&self) -> Result<BrowserSession> {
        BrowserSession::launch(self.clone())
    }
}

/// Quote `s` as a JavaScript string literal
fn js_string(s: &str) -> String {
    // A JSON string literal is a valid JS string literal
    Value::String(s.to_string()).to_string()
}

fn lookup_script(scope: Scope<'_>, selector: &Selector) -> String {
    let root = match scope {
        Scope::Document => "document".to_string(),
        Scope::Within(el) => format!("{}[{}]", REGISTRY, el.id()),
    };

    let query = match selector {
        Selector::Css(css) => format!("root.querySelector({})", js_string(css)),
        Selector::XPath(xpath) => format!(
            "document.evaluate({}, root, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue",
            js_string(xpath)
        ),
    };

    format!(
        r#"(function() {{
    const refs = {registry};
    const root = {root};
    if (!root || (root !== document && !root.isConnected)) {{
        return JSON.stringify({{ stale: true }});
    }}
    const el = {query};
    if (!el) {{
        return JSON.stringify({{ handle: null }});
    }}
    let handle = refs.indexOf(el);
    if (handle < 0) {{
        refs.push(el);
        handle = refs.length - 1;
    }}
    return JSON.stringify({{ handle: handle }});
}})()"#,
        registry = REGISTRY,
        root = root,
        query = query
    )
}

fn element_script(element: &ElementRef, body: &str) -> String {
    format!(
        r#"(function() {{
    const el = {registry}[{id}];
    if (!el || !el.isConnected) {{
        return JSON.stringify({{ stale: true }});
    }}
    const value = (function(el) {{ {body} }})(el);
    return JSON.stringify({{ value: value === undefined ? null : value }});
}})()"#,
        registry = REGISTRY,
        id = element.id(),
        body = body
    )
}
