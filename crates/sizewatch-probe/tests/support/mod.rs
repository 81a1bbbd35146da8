//! In-process page fake backed by `scraper`.
//!
//! Each call re-renders the page from the current selections and parses it
//! again. Node keys are document-order element indices, so renderers must
//! keep the element structure stable across selections and only toggle
//! attributes or text.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use sizewatch_core::ProbeSettings;
use sizewatch_probe::{BrowserSession, Node, PageError, PageSession};

pub type Selections = BTreeMap<String, String>;

/// Selection key set once the engine has waited for the variant widgets.
pub const READY_KEY: &str = "ready";
type Render = Arc<dyn Fn(&Selections) -> String + Send + Sync>;

#[derive(Clone)]
enum Site {
    Page(Render),
    Timeout,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    Click(String),
    Select { group: String, value: String },
}

#[derive(Debug, Default)]
pub struct Journal {
    pub opened: usize,
    pub closed: usize,
    pub visits: Vec<String>,
    pub interactions: Vec<Interaction>,
}

#[derive(Clone, Default)]
pub struct FakeBrowser {
    sites: HashMap<String, Site>,
    journal: Arc<Mutex<Journal>>,
}

impl FakeBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(self, url: &str, html: &str) -> Self {
        let html = html.to_string();
        self.with_dynamic_page(url, move |_| html.clone())
    }

    pub fn with_dynamic_page(
        mut self,
        url: &str,
        render: impl Fn(&Selections) -> String + Send + Sync + 'static,
    ) -> Self {
        self.sites.insert(url.to_string(), Site::Page(Arc::new(render)));
        self
    }

    pub fn with_timeout(mut self, url: &str) -> Self {
        self.sites.insert(url.to_string(), Site::Timeout);
        self
    }

    pub fn journal(&self) -> MutexGuard<'_, Journal> {
        self.journal.lock().unwrap()
    }

    /// Open a page already navigated to `url`.
    pub async fn loaded(&self, url: &str) -> FakePage {
        let page = self.open_page().await.unwrap();
        page.goto(url, Duration::from_secs(1)).await.unwrap();
        page
    }
}

#[async_trait]
impl BrowserSession for FakeBrowser {
    type Page = FakePage;

    async fn open_page(&self) -> Result<FakePage, PageError> {
        self.journal().opened += 1;
        Ok(FakePage {
            sites: self.sites.clone(),
            journal: Arc::clone(&self.journal),
            state: Mutex::new(PageState::default()),
        })
    }
}

#[derive(Default)]
struct PageState {
    render: Option<Render>,
    selections: Selections,
}

pub struct FakePage {
    sites: HashMap<String, Site>,
    journal: Arc<Mutex<Journal>>,
    state: Mutex<PageState>,
}

fn parse_selector(selector: &str) -> Result<Selector, PageError> {
    Selector::parse(selector).map_err(|_| PageError::InvalidSelector {
        selector: selector.to_string(),
    })
}

fn is_within(element: &ElementRef<'_>, ancestor: &ElementRef<'_>) -> bool {
    element.ancestors().any(|a| a.id() == ancestor.id())
}

fn self_or_ancestor_attr<'a>(element: &ElementRef<'a>, name: &str) -> Option<&'a str> {
    std::iter::once(**element)
        .chain(element.ancestors())
        .filter_map(ElementRef::wrap)
        .find_map(|el| el.value().attr(name))
}

fn element_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

impl FakePage {
    pub fn selections(&self) -> Selections {
        self.state.lock().unwrap().selections.clone()
    }

    fn with_doc<T>(&self, f: impl FnOnce(&[ElementRef<'_>]) -> T) -> Result<T, PageError> {
        let html = {
            let state = self.state.lock().unwrap();
            let render = state
                .render
                .clone()
                .ok_or_else(|| PageError::Browser("no page loaded".to_string()))?;
            render(&state.selections)
        };
        let doc = Html::parse_document(&html);
        let elements: Vec<ElementRef<'_>> = doc
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .collect();
        Ok(f(&elements))
    }

    fn with_element<T>(
        &self,
        node: Node<'_>,
        f: impl FnOnce(&ElementRef<'_>) -> T,
    ) -> Result<T, PageError> {
        self.with_doc(|elements| elements.get(node.key()).map(f))?
            .ok_or(PageError::Detached)
    }

    fn matching(
        &self,
        selector: &str,
        keep: impl Fn(usize, &ElementRef<'_>, &[ElementRef<'_>]) -> bool,
    ) -> Result<Vec<usize>, PageError> {
        let selector = parse_selector(selector)?;
        self.with_doc(|elements| {
            elements
                .iter()
                .enumerate()
                .filter(|(index, el)| selector.matches(el) && keep(*index, el, elements))
                .map(|(index, _)| index)
                .collect()
        })
    }

    fn select_group(&self, group: String, value: String) {
        self.state
            .lock()
            .unwrap()
            .selections
            .insert(group, value);
    }
}

#[async_trait]
impl PageSession for FakePage {
    async fn goto(&self, url: &str, _timeout: Duration) -> Result<(), PageError> {
        self.journal.lock().unwrap().visits.push(url.to_string());
        match self.sites.get(url) {
            Some(Site::Page(render)) => {
                let mut state = self.state.lock().unwrap();
                state.render = Some(Arc::clone(render));
                state.selections.clear();
                Ok(())
            }
            Some(Site::Timeout) => Err(PageError::Timeout {
                operation: format!("navigation to {url}"),
            }),
            None => Err(PageError::Navigation {
                url: url.to_string(),
                reason: "net::ERR_NAME_NOT_RESOLVED".to_string(),
            }),
        }
    }

    async fn query_all<'p>(
        &'p self,
        scope: Option<Node<'p>>,
        selector: &str,
    ) -> Result<Vec<Node<'p>>, PageError> {
        let keys = self.matching(selector, |_, el, elements| match scope {
            None => true,
            Some(scope) => elements
                .get(scope.key())
                .is_some_and(|root| is_within(el, root)),
        })?;
        Ok(keys.into_iter().map(Node::from_key).collect())
    }

    async fn following<'p>(
        &'p self,
        anchor: Node<'p>,
        selector: &str,
        limit: usize,
    ) -> Result<Vec<Node<'p>>, PageError> {
        let keys = self.matching(selector, |index, el, elements| {
            index > anchor.key()
                && elements
                    .get(anchor.key())
                    .is_some_and(|root| !is_within(el, root))
        })?;
        Ok(keys.into_iter().take(limit).map(Node::from_key).collect())
    }

    async fn attribute(&self, node: Node<'_>, name: &str) -> Result<Option<String>, PageError> {
        self.with_element(node, |el| el.value().attr(name).map(str::to_string))
    }

    async fn text(&self, node: Node<'_>) -> Result<String, PageError> {
        self.with_element(node, element_text)
    }

    async fn is_visible(&self, node: Node<'_>) -> Result<bool, PageError> {
        self.with_element(node, |el| {
            let hidden = std::iter::once(**el)
                .chain(el.ancestors())
                .filter_map(ElementRef::wrap)
                .any(|e| {
                    e.value().attr("hidden").is_some()
                        || e.value()
                            .attr("style")
                            .is_some_and(|s| s.replace(' ', "").contains("display:none"))
                });
            !hidden
        })
    }

    async fn click(&self, node: Node<'_>, _timeout: Duration) -> Result<(), PageError> {
        let (text, detached, group, value) = self.with_element(node, |el| {
            let text = element_text(el);
            let value = el
                .value()
                .attr("data-value")
                .map_or_else(|| text.clone(), str::to_string);
            (
                text,
                self_or_ancestor_attr(el, "data-detached").is_some(),
                self_or_ancestor_attr(el, "data-group").map(str::to_string),
                value,
            )
        })?;
        if detached {
            return Err(PageError::Detached);
        }
        self.journal
            .lock()
            .unwrap()
            .interactions
            .push(Interaction::Click(text));
        if let Some(group) = group {
            self.select_group(group, value);
        }
        Ok(())
    }

    async fn select_option(
        &self,
        select: Node<'_>,
        value: &str,
        _timeout: Duration,
    ) -> Result<(), PageError> {
        let group = self.with_element(select, |el| {
            el.value()
                .attr("name")
                .or_else(|| el.value().attr("data-group"))
                .unwrap_or("select")
                .to_string()
        })?;
        self.journal
            .lock()
            .unwrap()
            .interactions
            .push(Interaction::Select {
                group: group.clone(),
                value: value.to_string(),
            });
        self.select_group(group, value.to_string());
        Ok(())
    }

    async fn wait(&self, _duration: Duration) {}

    /// Also marks the page as settled: renderers see `ready = "yes"` from
    /// here on, standing in for client-side rendering finishing.
    async fn wait_for_selector(&self, selector: &str, _timeout: Duration) -> Result<bool, PageError> {
        self.select_group(READY_KEY.to_string(), "yes".to_string());
        Ok(!self.matching(selector, |_, _, _| true)?.is_empty())
    }

    async fn close(&self) -> Result<(), PageError> {
        self.journal.lock().unwrap().closed += 1;
        Ok(())
    }
}

/// Engine settings with every wait removed.
pub fn quick_settings() -> ProbeSettings {
    ProbeSettings {
        settle: Duration::ZERO,
        page_init_wait: Duration::ZERO,
        variant_wait: Duration::ZERO,
        consent_settle: Duration::ZERO,
        inter_product_delay: Duration::ZERO,
        ..ProbeSettings::default()
    }
}

/// Cart and notify controls toggled by `available`, structure unchanged.
pub fn purchase_controls(available: bool) -> String {
    let (cart, notify) = if available {
        ("", " hidden")
    } else {
        (" hidden", "")
    };
    format!(
        r#"<div class="buy">
             <button class="add-to-cart"{cart}>Dodaj do koszyka</button>
             <div class="notify-box"{notify}><button>Powiadom o dostępności</button></div>
           </div>"#
    )
}
