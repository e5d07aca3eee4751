use view_core::{Display, Page, SelectOption, ViewError, ViewResult};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement, HtmlInputElement, HtmlOptionElement, HtmlSelectElement};

pub(crate) fn js_error(err: JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}

pub(crate) fn document() -> Result<Document, JsValue> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))
}

/// The live document, addressed by element id.
pub struct DomPage {
    doc: Document,
}

impl DomPage {
    pub fn new() -> Result<Self, JsValue> {
        Ok(Self { doc: document()? })
    }

    fn element(&self, id: &str) -> ViewResult<Element> {
        self.doc.get_element_by_id(id).ok_or_else(|| ViewError::missing(id))
    }

    fn html_element(&self, id: &str) -> ViewResult<HtmlElement> {
        self.element(id)?
            .dyn_into::<HtmlElement>()
            .map_err(|_| ViewError::UnknownControl(format!("{id} is not an HTML element")))
    }

    fn rows(&self, container: &str) -> ViewResult<(Element, Vec<Element>)> {
        let container_el = self.element(container)?;
        let children = container_el.children();
        let rows = (0..children.length())
            .filter_map(|i| children.item(i))
            .collect();
        Ok((container_el, rows))
    }
}

impl Page for DomPage {
    fn set_class(&mut self, id: &str, class: &str, on: bool) -> ViewResult<()> {
        self.element(id)?
            .class_list()
            .toggle_with_force(class, on)
            .map(|_| ())
            .map_err(|e| ViewError::UnknownControl(js_error(e)))
    }

    fn set_display(&mut self, id: &str, display: Display) -> ViewResult<()> {
        self.html_element(id)?
            .style()
            .set_property("display", display.as_css())
            .map_err(|e| ViewError::UnknownControl(js_error(e)))
    }

    fn set_text(&mut self, id: &str, text: &str) -> ViewResult<()> {
        self.element(id)?.set_text_content(Some(text));
        Ok(())
    }

    fn value(&self, id: &str) -> ViewResult<String> {
        let el = self.element(id)?;
        if let Some(select) = el.dyn_ref::<HtmlSelectElement>() {
            return Ok(select.value());
        }
        if let Some(input) = el.dyn_ref::<HtmlInputElement>() {
            return Ok(input.value());
        }
        Ok(el.get_attribute("value").unwrap_or_default())
    }

    fn set_value(&mut self, id: &str, value: &str) -> ViewResult<()> {
        let el = self.element(id)?;
        if let Some(select) = el.dyn_ref::<HtmlSelectElement>() {
            select.set_value(value);
        } else if let Some(input) = el.dyn_ref::<HtmlInputElement>() {
            input.set_value(value);
        } else {
            el.set_attribute("value", value)
                .map_err(|e| ViewError::UnknownControl(js_error(e)))?;
        }
        Ok(())
    }

    fn set_checked(&mut self, id: &str, checked: bool) -> ViewResult<()> {
        let el = self.element(id)?;
        let input = el
            .dyn_ref::<HtmlInputElement>()
            .ok_or_else(|| ViewError::UnknownControl(format!("{id} is not an input")))?;
        input.set_checked(checked);
        Ok(())
    }

    fn set_attribute(&mut self, id: &str, name: &str, value: &str) -> ViewResult<()> {
        self.element(id)?
            .set_attribute(name, value)
            .map_err(|e| ViewError::UnknownControl(js_error(e)))
    }

    fn set_disabled(&mut self, id: &str, disabled: bool) -> ViewResult<()> {
        let el = self.element(id)?;
        if let Some(select) = el.dyn_ref::<HtmlSelectElement>() {
            select.set_disabled(disabled);
        } else if let Some(input) = el.dyn_ref::<HtmlInputElement>() {
            input.set_disabled(disabled);
        } else {
            el.toggle_attribute_with_force("disabled", disabled)
                .map_err(|e| ViewError::UnknownControl(js_error(e)))?;
        }
        Ok(())
    }

    fn replace_options(&mut self, id: &str, options: &[SelectOption]) -> ViewResult<()> {
        let el = self.element(id)?;
        let select = el
            .dyn_ref::<HtmlSelectElement>()
            .ok_or_else(|| ViewError::UnknownControl(format!("{id} is not a select")))?;
        select.set_inner_html("");
        for opt in options {
            let node = HtmlOptionElement::new_with_text_and_value(&opt.label, &opt.value)
                .map_err(|e| ViewError::UnknownControl(js_error(e)))?;
            node.set_disabled(opt.disabled);
            select
                .append_child(&node)
                .map_err(|e| ViewError::UnknownControl(js_error(e)))?;
        }
        Ok(())
    }

    fn set_body_overflow(&mut self, overflow: Option<&str>) {
        let Some(body) = self.doc.body() else {
            return;
        };
        let style = body.style();
        let applied = match overflow {
            Some(value) => style.set_property("overflow", value),
            None => style.remove_property("overflow").map(|_| ()),
        };
        if let Err(err) = applied {
            tracing::warn!(error = %js_error(err), "failed to update body overflow");
        }
    }

    fn row_attributes(&self, container: &str, attr: &str) -> ViewResult<Vec<Option<String>>> {
        let (_, rows) = self.rows(container)?;
        Ok(rows.iter().map(|row| row.get_attribute(attr)).collect())
    }

    fn reorder_rows(&mut self, container: &str, order: &[usize]) -> ViewResult<()> {
        let (container_el, rows) = self.rows(container)?;
        for &idx in order {
            let Some(row) = rows.get(idx) else {
                continue;
            };
            // Appending an attached node moves it; nothing is cloned or recreated.
            container_el
                .append_child(row)
                .map_err(|e| ViewError::UnknownControl(js_error(e)))?;
        }
        Ok(())
    }
}
