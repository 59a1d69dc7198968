/// Reusable UI components
use std::rc::Rc;

use wasm_bindgen::JsCast;
use web_sys::Element;
use yew::prelude::*;

use crate::aggregate::AggregationMode;
use crate::browser::BrowserTabs;
use crate::snapshot::Selection;
use crate::ui::dom::LAZY_PENDING;
use crate::view_state::ViewState;

/// What a click asks the page to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Close,
    Dedup,
    SwitchTo,
}

#[derive(Debug, Clone)]
pub struct ActionRequest {
    pub action: Action,
    pub selection: Selection,
    /// Element the click landed on
    pub anchor: Option<Element>,
}

/// Shared page state handed down to every row
#[derive(Clone)]
pub struct TabsContext {
    pub state: Rc<ViewState<BrowserTabs>>,
    pub on_action: Callback<ActionRequest>,
}

impl PartialEq for TabsContext {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state) && self.on_action == other.on_action
    }
}

fn click_target(e: &MouseEvent) -> Option<Element> {
    e.target().and_then(|t| t.dyn_into::<Element>().ok())
}

#[derive(Properties, PartialEq)]
pub struct ActionButtonProps {
    pub action: Action,
    pub selection: Selection,
    pub label: AttrValue,
}

#[function_component(ActionButton)]
pub fn action_button(props: &ActionButtonProps) -> Html {
    let context = use_context::<TabsContext>();

    let onclick = {
        let action = props.action;
        let selection = props.selection.clone();

        Callback::from(move |e: MouseEvent| {
            e.prevent_default();
            e.stop_propagation();
            if let Some(context) = &context {
                context.on_action.emit(ActionRequest {
                    action,
                    selection: selection.clone(),
                    anchor: click_target(&e),
                });
            }
        })
    };

    let class = match props.action {
        Action::Dedup => "dedup",
        _ => "close",
    };

    html! {
        <button class={class} onclick={onclick}>{props.label.clone()}</button>
    }
}

#[derive(Properties, PartialEq)]
pub struct CollapsibleProps {
    pub label: AttrValue,
    pub list_class: &'static str,
    #[prop_or_default]
    pub actions: Html,
    #[prop_or_default]
    pub children: Children,
}

/// Group row whose list is only built the first time it is opened
#[function_component(Collapsible)]
pub fn collapsible(props: &CollapsibleProps) -> Html {
    let open = use_state(|| false);
    let instantiated = use_state(|| false);

    let toggle = {
        let open = open.clone();
        let instantiated = instantiated.clone();

        Callback::from(move |e: MouseEvent| {
            e.stop_propagation();
            if !*open && !*instantiated {
                instantiated.set(true);
            }
            open.set(!*open);
        })
    };

    // clicks inside the list belong to its rows
    let squash = Callback::from(|e: MouseEvent| e.stop_propagation());

    html! {
        <li class={classes!("group", (!*open).then_some("closed"))} onclick={toggle}>
            <span>{props.label.clone()}</span>
            {props.actions.clone()}
            <ul class={props.list_class} data-lazy={(!*instantiated).then_some(LAZY_PENDING)} onclick={squash}>
                if *instantiated {
                    {props.children.clone()}
                }
            </ul>
        </li>
    }
}

#[derive(Properties, PartialEq)]
pub struct TabRowProps {
    /// A unique tab or one member of a duplicate group
    pub selection: Selection,
}

/// One open tab; clicking it brings the tab to the front
#[function_component(TabRow)]
pub fn tab_row(props: &TabRowProps) -> Html {
    let Some(context) = use_context::<TabsContext>() else {
        return html! {};
    };

    let onclick = {
        let on_action = context.on_action.clone();
        let selection = props.selection.clone();

        Callback::from(move |e: MouseEvent| {
            e.prevent_default();
            on_action.emit(ActionRequest {
                action: Action::SwitchTo,
                selection: selection.clone(),
                anchor: click_target(&e),
            });
        })
    };

    let summary = context.state.summary();
    let Ok(tab) = summary.tab(&props.selection) else {
        return html! {};
    };
    if !tab.is_open() {
        return html! {};
    }

    let title = tab.title.clone().or_else(|| tab.url.clone()).unwrap_or_default();
    let ago = tab.last_accessed_ago(summary.refreshed_at());

    html! {
        <li class="tab" title={ago} onclick={onclick}>
            if let Some(favicon) = &tab.favicon {
                <img class="favicon" src={favicon.clone()} />
            }
            <span class="title">{title}</span>
            if let Some(url) = &tab.url {
                <span class="url">{url.clone()}</span>
            }
            <ActionButton action={Action::Close} selection={props.selection.clone()} label="close" />
        </li>
    }
}

#[derive(Properties, PartialEq)]
pub struct ModeProps {
    pub mode: AggregationMode,
}

/// Every open unique tab of a collection
#[function_component(UniqueList)]
pub fn unique_list(props: &ModeProps) -> Html {
    let Some(context) = use_context::<TabsContext>() else {
        return html! {};
    };
    let mode = props.mode;
    let summary = context.state.summary();

    summary
        .collection(mode)
        .unique()
        .iter()
        .filter(|(_, tab)| tab.is_open())
        .map(|(key, _)| {
            let selection = Selection::Tab { mode, key: key.to_string() };
            html! { <TabRow key={key.to_string()} selection={selection} /> }
        })
        .collect()
}

/// Duplicate groups of a collection, largest first
#[function_component(DuplicateList)]
pub fn duplicate_list(props: &ModeProps) -> Html {
    let Some(context) = use_context::<TabsContext>() else {
        return html! {};
    };
    let mode = props.mode;
    let summary = context.state.summary();

    summary
        .collection(mode)
        .dupes()
        .by_length()
        .into_iter()
        .filter(|(_, group)| group.tabs().iter().any(|tab| tab.is_open()))
        .map(|(key, group)| {
            let label = group.title.clone().unwrap_or_else(|| key.to_string());
            let selection = Selection::Group { mode, key: key.to_string() };
            let actions = html! {
                <>
                    <ActionButton action={Action::Close} selection={selection.clone()} label="close all" />
                    if mode.dedupable() {
                        <ActionButton action={Action::Dedup} selection={selection} label="dedup" />
                    }
                </>
            };
            html! {
                <Collapsible key={key.to_string()} label={label} list_class="members" actions={actions}>
                    <MemberList mode={mode} group={key.to_string()} />
                </Collapsible>
            }
        })
        .collect()
}

#[derive(Properties, PartialEq)]
pub struct MemberListProps {
    pub mode: AggregationMode,
    pub group: String,
}

#[function_component(MemberList)]
pub fn member_list(props: &MemberListProps) -> Html {
    let Some(context) = use_context::<TabsContext>() else {
        return html! {};
    };
    let summary = context.state.summary();
    let Some(group) = summary.collection(props.mode).dupes().get(&props.group) else {
        return html! {};
    };

    group
        .tabs()
        .iter()
        .enumerate()
        .filter(|(_, tab)| tab.is_open())
        .map(|(index, _)| {
            let selection = Selection::Member {
                mode: props.mode,
                key: props.group.clone(),
                index,
            };
            html! { <TabRow key={index} selection={selection} /> }
        })
        .collect()
}
