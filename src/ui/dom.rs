/// Rendered view over the live document
///
/// Rows are `li` elements. Section rows sit directly in `ul#stats`, every
/// group row keeps its count header in a leading `span` and its rows in a
/// child `ul`. Lists that were never opened carry `data-lazy="pending"`.
use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement, NodeList, TransitionEvent};

use crate::update::{RenderedView, RowLevel, prune_empty_groups};

const REMOVING: &str = "removing";
pub const LAZY_ATTR: &str = "data-lazy";
pub const LAZY_PENDING: &str = "pending";

pub struct DomView {
    document: Document,
}

impl DomView {
    pub fn new() -> Option<DomView> {
        let document = web_sys::window()?.document()?;
        Some(DomView { document })
    }

    fn select_all(&self, selector: &str) -> Vec<Element> {
        match self.document.query_selector_all(selector) {
            Ok(list) => elements(&list),
            Err(e) => {
                log::warn!("bad selector {}: {:?}", selector, e);
                Vec::new()
            }
        }
    }
}

fn elements(list: &NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

fn child(element: &Element, selector: &str) -> Option<Element> {
    element.query_selector(selector).ok().flatten()
}

fn has_class(element: &Element, class: &str) -> bool {
    element.class_list().contains(class)
}

impl RenderedView for DomView {
    type Node = Element;

    fn enclosing_row(&self, target: &Element) -> Option<Element> {
        target.closest("li").ok().flatten()
    }

    fn row_level(&self, row: &Element) -> RowLevel {
        let parent = row.parent_element();
        if has_class(row, "group") && parent.as_ref().is_some_and(|p| p.id() == "stats") {
            RowLevel::Section
        } else if parent.as_ref().is_some_and(|p| has_class(p, "members")) {
            RowLevel::Member
        } else {
            RowLevel::Entry
        }
    }

    fn header(&self) -> Option<Element> {
        self.document.query_selector("h1").ok().flatten()
    }

    fn loaded_line(&self) -> Option<Element> {
        self.document.query_selector("#stats > li:first-child").ok().flatten()
    }

    fn scheme_lines(&self) -> Vec<Element> {
        self.select_all("li.schemes > span")
    }

    fn ancestor_labels(&self, row: &Element) -> Vec<Element> {
        let mut labels = Vec::new();
        let mut current = row.parent_element();
        while let Some(element) = current {
            if element.tag_name() == "LI" && has_class(&element, "group") {
                labels.extend(child(&element, ":scope > span"));
            }
            current = element.parent_element();
        }
        labels
    }

    fn text(&self, node: &Element) -> String {
        node.text_content().unwrap_or_default()
    }

    fn set_text(&mut self, node: &Element, text: &str) {
        node.set_text_content(Some(text));
    }

    fn remove_line(&mut self, node: &Element) {
        node.remove();
    }

    fn empty_groups(&self) -> Vec<Element> {
        self.select_all("li.group")
            .into_iter()
            .filter(|group| !has_class(group, REMOVING))
            .filter(|group| {
                child(group, ":scope > ul").is_some_and(|list| {
                    list.child_element_count() == 0
                        && list.get_attribute(LAZY_ATTR).as_deref() != Some(LAZY_PENDING)
                })
            })
            .collect()
    }

    fn retire(&mut self, row: &Element) {
        if !row.is_connected() || has_class(row, REMOVING) {
            return;
        }

        let Some(html) = row.dyn_ref::<HtmlElement>() else {
            row.remove();
            prune_empty_groups(self);
            return;
        };

        // pin the current height so max-height can transition to zero
        let height = html.offset_height();
        if let Err(e) = html.style().set_property("max-height", &format!("{}px", height)) {
            log::debug!("cannot pin row height: {:?}", e);
        }
        let _ = html.offset_height();
        if let Err(e) = row.class_list().add_1(REMOVING) {
            log::warn!("cannot animate row out: {:?}", e);
            row.remove();
            prune_empty_groups(self);
            return;
        }

        // the listener owns itself until the row is gone, then lets go
        let slot: Rc<RefCell<Option<TransitionListener>>> = Rc::new(RefCell::new(None));
        let target = row.clone();
        let own_slot = slot.clone();
        let on_end = TransitionListener::new(move |e: TransitionEvent| {
            let own = e.target().is_some_and(|t| {
                let t: &JsValue = t.as_ref();
                let target: &JsValue = target.as_ref();
                t == target
            });
            if !own || e.property_name() != "opacity" {
                return;
            }
            if let Some(listener) = own_slot.borrow_mut().take() {
                let _ = target
                    .remove_event_listener_with_callback("transitionend", listener.as_ref().unchecked_ref());
            }
            target.remove();
            if let Some(mut view) = DomView::new() {
                prune_empty_groups(&mut view);
            }
        });

        if let Err(e) = row.add_event_listener_with_callback("transitionend", on_end.as_ref().unchecked_ref()) {
            log::warn!("cannot watch row transition: {:?}", e);
            row.remove();
            prune_empty_groups(self);
            return;
        }
        *slot.borrow_mut() = Some(on_end);
    }
}

type TransitionListener = Closure<dyn FnMut(TransitionEvent)>;
