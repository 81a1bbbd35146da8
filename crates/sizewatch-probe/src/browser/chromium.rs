use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::Browser;
use chromiumoxide::element::Element;
use chromiumoxide::error::CdpError;
use chromiumoxide::page::Page;
use parking_lot::Mutex;
use tokio::task::JoinHandle;

use super::launch::{launch, LaunchOptions};
use crate::error::PageError;
use crate::page::{BrowserSession, Node, PageSession};

const MARK_ATTRIBUTE: &str = "data-sizewatch-following";
const SELECTOR_POLL: Duration = Duration::from_millis(100);

const VISIBILITY_FN: &str = r"function() {
    const style = window.getComputedStyle(this);
    if (style.display === 'none' || style.visibility === 'hidden' || style.opacity === '0') {
        return false;
    }
    const rect = this.getBoundingClientRect();
    return rect.width > 0 && rect.height > 0;
}";

/// A launched Chromium instance.
pub struct ChromiumBrowser {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl ChromiumBrowser {
    /// # Errors
    ///
    /// Returns [`PageError::Browser`] if no executable is found or the
    /// browser fails to start.
    pub async fn launch(options: &LaunchOptions) -> Result<Self, PageError> {
        let (browser, handler) = launch(options).await?;
        Ok(Self { browser, handler })
    }

    /// Close the browser and wait for its connection task to finish.
    pub async fn shutdown(mut self) {
        if let Err(e) = self.browser.close().await {
            tracing::warn!(error = %e, "browser close failed");
        }
        if let Err(e) = self.browser.wait().await {
            tracing::warn!(error = %e, "browser process wait failed");
        }
        if let Err(e) = self.handler.await {
            tracing::warn!(error = %e, "browser handler task failed");
        }
    }
}

#[async_trait]
impl BrowserSession for ChromiumBrowser {
    type Page = ChromiumPage;

    async fn open_page(&self) -> Result<ChromiumPage, PageError> {
        let page = self.browser.new_page("about:blank").await.map_err(from_cdp)?;
        Ok(ChromiumPage::new(page))
    }
}

/// Element handles of one tab, keyed by position and deduplicated by
/// backend node id.
struct Arena<T> {
    elements: Vec<Arc<T>>,
    by_backend_id: HashMap<i64, usize>,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self {
            elements: Vec::new(),
            by_backend_id: HashMap::new(),
        }
    }
}

impl<T> Arena<T> {
    fn insert(&mut self, backend_id: i64, element: T) -> usize {
        if let Some(&key) = self.by_backend_id.get(&backend_id) {
            return key;
        }
        self.elements.push(Arc::new(element));
        let key = self.elements.len() - 1;
        self.by_backend_id.insert(backend_id, key);
        key
    }
}

/// One Chromium tab. Elements handed out as [`Node`]s are kept in an arena
/// for the life of the tab.
pub struct ChromiumPage {
    page: Page,
    arena: Mutex<Arena<Element>>,
    marks: AtomicUsize,
}

impl ChromiumPage {
    fn new(page: Page) -> Self {
        Self {
            page,
            arena: Mutex::new(Arena::default()),
            marks: AtomicUsize::new(0),
        }
    }

    /// Hand out keys for `found`. A DOM node seen before keeps its key, so
    /// repeated queries over the same page do not grow the arena.
    fn register(&self, found: Vec<Element>) -> Vec<Node<'_>> {
        let mut arena = self.arena.lock();
        found
            .into_iter()
            .map(|element| {
                let backend_id = *element.backend_node_id.inner();
                Node::from_key(arena.insert(backend_id, element))
            })
            .collect()
    }

    fn element(&self, node: Node<'_>) -> Result<Arc<Element>, PageError> {
        self.arena
            .lock()
            .elements
            .get(node.key())
            .cloned()
            .ok_or(PageError::Detached)
    }

    async fn call_on(&self, node: Node<'_>, function: String) -> Result<serde_json::Value, PageError> {
        let element = self.element(node)?;
        let returns = element.call_js_fn(function, false).await.map_err(from_cdp)?;
        Ok(returns.result.value.unwrap_or(serde_json::Value::Null))
    }
}

fn from_cdp(err: CdpError) -> PageError {
    if matches!(err, CdpError::Timeout) {
        return PageError::Timeout {
            operation: "CDP request".to_string(),
        };
    }
    let message = err.to_string();
    if message.contains("detached")
        || message.contains("No node with given id")
        || message.contains("Could not find node")
    {
        PageError::Detached
    } else {
        PageError::Browser(message)
    }
}

fn lookup<T>(result: Result<Vec<T>, CdpError>) -> Result<Vec<T>, PageError> {
    match result {
        Ok(found) => Ok(found),
        Err(CdpError::NotFound) => Ok(Vec::new()),
        Err(e) => Err(from_cdp(e)),
    }
}

async fn within<F, T>(operation: &str, limit: Duration, fut: F) -> Result<T, PageError>
where
    F: Future<Output = Result<T, CdpError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result.map_err(from_cdp),
        Err(_) => Err(PageError::Timeout {
            operation: operation.to_string(),
        }),
    }
}

fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

#[async_trait]
impl PageSession for ChromiumPage {
    async fn goto(&self, url: &str, timeout: Duration) -> Result<(), PageError> {
        match tokio::time::timeout(timeout, self.page.goto(url)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(CdpError::Timeout)) | Err(_) => Err(PageError::Timeout {
                operation: format!("navigation to {url}"),
            }),
            Ok(Err(e)) => Err(PageError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    async fn query_all<'p>(
        &'p self,
        scope: Option<Node<'p>>,
        selector: &str,
    ) -> Result<Vec<Node<'p>>, PageError> {
        let found = match scope {
            None => lookup(self.page.find_elements(selector).await)?,
            Some(node) => lookup(self.element(node)?.find_elements(selector).await)?,
        };
        Ok(self.register(found))
    }

    async fn following<'p>(
        &'p self,
        anchor: Node<'p>,
        selector: &str,
        limit: usize,
    ) -> Result<Vec<Node<'p>>, PageError> {
        let token = self.marks.fetch_add(1, Ordering::Relaxed);
        let function = format!(
            r"function() {{
                let taken = 0;
                for (const el of document.querySelectorAll({selector})) {{
                    if (taken >= {limit}) break;
                    const pos = this.compareDocumentPosition(el);
                    if ((pos & Node.DOCUMENT_POSITION_FOLLOWING) && !(pos & Node.DOCUMENT_POSITION_CONTAINED_BY)) {{
                        el.setAttribute('{MARK_ATTRIBUTE}', '{token}');
                        taken += 1;
                    }}
                }}
                return taken;
            }}",
            selector = js_string(selector),
        );
        self.call_on(anchor, function).await?;
        let marked = lookup(
            self.page
                .find_elements(format!("[{MARK_ATTRIBUTE}='{token}']"))
                .await,
        )?;
        Ok(self.register(marked))
    }

    async fn leaves_containing<'p>(
        &'p self,
        selector: &str,
        captions: &[&str],
    ) -> Result<Vec<Node<'p>>, PageError> {
        let token = self.marks.fetch_add(1, Ordering::Relaxed);
        let lowered: Vec<String> = captions.iter().map(|c| c.to_lowercase()).collect();
        let script = format!(
            r"(() => {{
                const captions = {captions};
                let taken = 0;
                for (const el of document.querySelectorAll({selector})) {{
                    if (el.childElementCount > 0) continue;
                    const text = (el.textContent || '').toLowerCase();
                    if (captions.some((c) => text.includes(c))) {{
                        el.setAttribute('{MARK_ATTRIBUTE}', '{token}');
                        taken += 1;
                    }}
                }}
                return taken;
            }})()",
            captions = serde_json::Value::from(lowered),
            selector = js_string(selector),
        );
        self.page.evaluate(script.as_str()).await.map_err(from_cdp)?;
        let marked = lookup(
            self.page
                .find_elements(format!("[{MARK_ATTRIBUTE}='{token}']"))
                .await,
        )?;
        Ok(self.register(marked))
    }

    async fn attribute(&self, node: Node<'_>, name: &str) -> Result<Option<String>, PageError> {
        self.element(node)?.attribute(name).await.map_err(from_cdp)
    }

    async fn text(&self, node: Node<'_>) -> Result<String, PageError> {
        let text = self.element(node)?.inner_text().await.map_err(from_cdp)?;
        Ok(text.unwrap_or_default())
    }

    async fn is_visible(&self, node: Node<'_>) -> Result<bool, PageError> {
        let value = self.call_on(node, VISIBILITY_FN.to_string()).await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    async fn click(&self, node: Node<'_>, timeout: Duration) -> Result<(), PageError> {
        let element = self.element(node)?;
        within("click", timeout, async { element.click().await.map(|_| ()) }).await
    }

    async fn select_option(
        &self,
        select: Node<'_>,
        value: &str,
        timeout: Duration,
    ) -> Result<(), PageError> {
        let element = self.element(select)?;
        let function = format!(
            r"function() {{
                this.value = {value};
                this.dispatchEvent(new Event('input', {{ bubbles: true }}));
                this.dispatchEvent(new Event('change', {{ bubbles: true }}));
                return this.value;
            }}",
            value = js_string(value),
        );
        within("select", timeout, async {
            element.call_js_fn(function, false).await.map(|_| ())
        })
        .await
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<bool, PageError> {
        let poll = async {
            loop {
                match lookup(self.page.find_elements(selector).await) {
                    Ok(found) if !found.is_empty() => return Ok(()),
                    Ok(_) => tokio::time::sleep(SELECTOR_POLL).await,
                    Err(e) => return Err(e),
                }
            }
        };
        match tokio::time::timeout(timeout, poll).await {
            Ok(Ok(())) => Ok(true),
            Ok(Err(e)) => Err(e),
            Err(_) => Ok(false),
        }
    }

    async fn close(&self) -> Result<(), PageError> {
        self.page.clone().close().await.map_err(from_cdp)
    }
}
