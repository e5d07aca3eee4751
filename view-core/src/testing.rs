//! In-memory stand-ins for the browser surfaces, for unit tests.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::broker::{ServerDirectory, ServerList, ServerListFuture};
use crate::error::{FetchError, ViewError, ViewResult};
use crate::page::{ids, Display, Page, SelectOption};
use crate::store::KeyValueStore;
use crate::url::{PageLocation, QueryStringEditor};

// ---------- Storage and location ---------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            items: pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> ViewResult<()> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> ViewResult<()> {
        self.items.remove(key);
        Ok(())
    }
}

/// Current URL plus a count of history replacements.
#[derive(Debug, Clone)]
pub struct MemoryLocation {
    href: String,
    replacements: usize,
}

impl MemoryLocation {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            replacements: 0,
        }
    }

    pub fn current(&self) -> &str {
        &self.href
    }

    pub fn replacements(&self) -> usize {
        self.replacements
    }
}

impl QueryStringEditor for MemoryLocation {
    fn location(&self) -> ViewResult<PageLocation> {
        PageLocation::parse(&self.href)
    }

    fn replace_location(&mut self, location: &PageLocation) -> ViewResult<()> {
        self.href = location.to_relative();
        self.replacements += 1;
        Ok(())
    }
}

// ---------- Page -------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct FakeElement {
    pub classes: BTreeSet<String>,
    pub display: Option<Display>,
    pub text: Option<String>,
    pub value: String,
    pub checked: bool,
    pub disabled: bool,
    pub attributes: HashMap<String, String>,
    pub options: Vec<SelectOption>,
}

/// A table row: a stable key for assertions plus its data attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeRow {
    pub key: String,
    pub attributes: HashMap<String, String>,
}

impl FakeRow {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            attributes: HashMap::new(),
        }
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }
}

/// Page made of elements keyed by id, plus row containers.
#[derive(Debug, Clone, Default)]
pub struct FakePage {
    elements: HashMap<String, FakeElement>,
    tables: HashMap<String, Vec<FakeRow>>,
    body_overflow: Option<String>,
    overflow_writes: Vec<Option<String>>,
}

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every element the dashboard markup renders.
    pub fn dashboard() -> Self {
        Self::new().with_elements([
            ids::TAB_OVERVIEW,
            ids::TAB_TRADES,
            ids::PANEL_OVERVIEW,
            ids::PANEL_TRADES,
            ids::TRADES_TAB_OPEN,
            ids::TRADES_TAB_CLOSED,
            ids::TRADES_PANEL_OPEN,
            ids::TRADES_PANEL_CLOSED,
            ids::DATE_RANGE_SELECTOR,
            ids::CLOSED_STATS_ROW,
            ids::COPY_MODAL,
            ids::STOP_MODAL,
            ids::LINK_MODAL,
            ids::UNLINK_MODAL,
            ids::COPY_MODAL_TITLE,
            ids::COPY_COPIER_ID,
            ids::COPY_STRATEGY_ID,
            ids::COPY_STRATEGY_NAME,
            ids::TRADE_SIZE_TYPE,
            ids::TRADE_SIZE_VALUE,
            ids::TRADE_SIZE_LABEL,
            ids::OPEN_EXISTING_TRADES,
            ids::ROUND_UP_TO_MINIMUM,
            ids::STOP_MODAL_TITLE,
            ids::STOP_COPIER_ID,
            ids::STOP_STRATEGY_ID,
            ids::STOP_STRATEGY_NAME,
            ids::UNLINK_FORM,
            ids::UNLINK_ACCOUNT_LABEL,
            ids::BROKER_SELECT,
            ids::SERVER_SELECT,
            ids::COPY_AFFORDANCE,
        ])
    }

    pub fn with_elements<'a>(mut self, element_ids: impl IntoIterator<Item = &'a str>) -> Self {
        for id in element_ids {
            self.elements.insert(id.to_string(), FakeElement::default());
        }
        self
    }

    /// Drop a node, as on a page variant that does not render it.
    pub fn without(mut self, id: &str) -> Self {
        self.elements.remove(id);
        self
    }

    pub fn with_table(mut self, container: &str, rows: Vec<FakeRow>) -> Self {
        self.tables.insert(container.to_string(), rows);
        self
    }

    pub fn element(&self, id: &str) -> Option<&FakeElement> {
        self.elements.get(id)
    }

    fn element_mut(&mut self, id: &str) -> ViewResult<&mut FakeElement> {
        self.elements.get_mut(id).ok_or_else(|| ViewError::missing(id))
    }

    pub fn has_class(&self, id: &str, class: &str) -> bool {
        self.element(id).is_some_and(|e| e.classes.contains(class))
    }

    pub fn display(&self, id: &str) -> Option<Display> {
        self.element(id).and_then(|e| e.display)
    }

    pub fn text(&self, id: &str) -> Option<&str> {
        self.element(id).and_then(|e| e.text.as_deref())
    }

    pub fn value_of(&self, id: &str) -> Option<&str> {
        self.element(id).map(|e| e.value.as_str())
    }

    pub fn checked(&self, id: &str) -> Option<bool> {
        self.element(id).map(|e| e.checked)
    }

    pub fn disabled(&self, id: &str) -> Option<bool> {
        self.element(id).map(|e| e.disabled)
    }

    pub fn attribute(&self, id: &str, name: &str) -> Option<&str> {
        self.element(id)
            .and_then(|e| e.attributes.get(name))
            .map(String::as_str)
    }

    pub fn options(&self, id: &str) -> Vec<SelectOption> {
        self.element(id).map(|e| e.options.clone()).unwrap_or_default()
    }

    pub fn body_overflow(&self) -> Option<&str> {
        self.body_overflow.as_deref()
    }

    pub fn overflow_writes(&self) -> Vec<Option<String>> {
        self.overflow_writes.clone()
    }

    pub fn rows(&self, container: &str) -> Option<&[FakeRow]> {
        self.tables.get(container).map(Vec::as_slice)
    }

    pub fn row_keys(&self, container: &str) -> Vec<String> {
        self.rows(container)
            .map(|rows| rows.iter().map(|r| r.key.clone()).collect())
            .unwrap_or_default()
    }
}

impl Page for FakePage {
    fn set_class(&mut self, id: &str, class: &str, on: bool) -> ViewResult<()> {
        let element = self.element_mut(id)?;
        if on {
            element.classes.insert(class.to_string());
        } else {
            element.classes.remove(class);
        }
        Ok(())
    }

    fn set_display(&mut self, id: &str, display: Display) -> ViewResult<()> {
        self.element_mut(id)?.display = Some(display);
        Ok(())
    }

    fn set_text(&mut self, id: &str, text: &str) -> ViewResult<()> {
        self.element_mut(id)?.text = Some(text.to_string());
        Ok(())
    }

    fn value(&self, id: &str) -> ViewResult<String> {
        self.element(id)
            .map(|e| e.value.clone())
            .ok_or_else(|| ViewError::missing(id))
    }

    fn set_value(&mut self, id: &str, value: &str) -> ViewResult<()> {
        self.element_mut(id)?.value = value.to_string();
        Ok(())
    }

    fn set_checked(&mut self, id: &str, checked: bool) -> ViewResult<()> {
        self.element_mut(id)?.checked = checked;
        Ok(())
    }

    fn set_attribute(&mut self, id: &str, name: &str, value: &str) -> ViewResult<()> {
        self.element_mut(id)?
            .attributes
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn set_disabled(&mut self, id: &str, disabled: bool) -> ViewResult<()> {
        self.element_mut(id)?.disabled = disabled;
        Ok(())
    }

    fn replace_options(&mut self, id: &str, options: &[SelectOption]) -> ViewResult<()> {
        let element = self.element_mut(id)?;
        element.options = options.to_vec();
        element.value = options.first().map(|o| o.value.clone()).unwrap_or_default();
        Ok(())
    }

    fn set_body_overflow(&mut self, overflow: Option<&str>) {
        self.body_overflow = overflow.map(str::to_string);
        self.overflow_writes.push(self.body_overflow.clone());
    }

    fn row_attributes(&self, container: &str, attr: &str) -> ViewResult<Vec<Option<String>>> {
        let rows = self
            .tables
            .get(container)
            .ok_or_else(|| ViewError::missing(container))?;
        Ok(rows.iter().map(|r| r.attributes.get(attr).cloned()).collect())
    }

    fn reorder_rows(&mut self, container: &str, order: &[usize]) -> ViewResult<()> {
        let rows = self
            .tables
            .get_mut(container)
            .ok_or_else(|| ViewError::missing(container))?;
        let mut seen = vec![false; rows.len()];
        assert_eq!(order.len(), rows.len(), "reorder must cover every row");
        for &i in order {
            assert!(!seen[i], "row {i} placed twice");
            seen[i] = true;
        }
        let reordered: Vec<FakeRow> = order.iter().map(|&i| rows[i].clone()).collect();
        *rows = reordered;
        Ok(())
    }
}

// ---------- Server directory -------------------------------------------------

/// Server directory answering every broker with the same canned result.
pub struct StaticDirectory {
    result: Result<ServerList, FetchError>,
    requests: RefCell<Vec<String>>,
}

impl StaticDirectory {
    pub fn ok(list: ServerList) -> Self {
        Self {
            result: Ok(list),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn err(err: FetchError) -> Self {
        Self {
            result: Err(err),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl ServerDirectory for StaticDirectory {
    fn fetch_servers(&self, broker_code: &str) -> ServerListFuture {
        self.requests.borrow_mut().push(broker_code.to_string());
        let result = self.result.clone();
        Box::pin(async move { result })
    }
}
