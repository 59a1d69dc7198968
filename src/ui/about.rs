/// About Tabs page: tab statistics with duplicate detection
use std::rc::Rc;

use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::browser::BrowserTabs;
use crate::config::ViewConfig;
use crate::format::{
    blank_label, duplicates_label, loaded_label, scheme_label, tab_count_label, unique_label,
    windows_label,
};
use crate::snapshot::{Selection, TabSummary};
use crate::ui::components::{
    Action, ActionButton, ActionRequest, Collapsible, DuplicateList, TabsContext, UniqueList,
};
use crate::ui::dom::DomView;
use crate::update::ViewUpdate;
use crate::view_state::ViewState;

#[derive(Clone)]
enum PageState {
    Loading,
    Ready(Rc<ViewState<BrowserTabs>>),
    Error(String),
}

/// Bumped on every full refresh so the rendered tree is rebuilt from scratch
#[derive(Default, PartialEq)]
struct Generation(u32);

impl Reducible for Generation {
    type Action = ();

    fn reduce(self: Rc<Self>, _: ()) -> Rc<Self> {
        Rc::new(Generation(self.0.wrapping_add(1)))
    }
}

#[derive(Properties, PartialEq)]
pub struct AboutTabsProps {
    pub config: ViewConfig,
}

#[function_component(AboutTabs)]
pub fn about_tabs(props: &AboutTabsProps) -> Html {
    let page = use_state(|| PageState::Loading);
    let generation = use_reducer(Generation::default);

    // Query the browser on mount
    {
        let page = page.clone();
        let config = props.config.clone();
        use_effect_with((), move |_| {
            spawn_local(async move {
                let source = BrowserTabs::new(config.window_types.clone());
                match ViewState::load(source, config, js_sys::Date::now()).await {
                    Ok(state) => page.set(PageState::Ready(Rc::new(state))),
                    Err(e) => {
                        log::error!("{}", e);
                        page.set(PageState::Error(e.to_string()));
                    }
                }
            });
            || ()
        });
    }

    let state = match &*page {
        PageState::Loading => {
            return html! { <p class="loading">{"Loading tabs..."}</p> };
        }
        PageState::Error(msg) => {
            return html! { <p class="error">{msg.clone()}</p> };
        }
        PageState::Ready(state) => state.clone(),
    };

    let on_action = {
        let state = state.clone();
        let generation = generation.dispatcher();

        Callback::from(move |request: ActionRequest| {
            let state = state.clone();
            let generation = generation.clone();

            spawn_local(async move {
                if run_action(&state, request).await != ViewUpdate::RefreshNeeded {
                    return;
                }
                match state.refresh(js_sys::Date::now()).await {
                    Ok(()) => generation.dispatch(()),
                    Err(e) => log::error!("refresh failed: {}", e),
                }
            });
        })
    };

    let context = TabsContext {
        state: state.clone(),
        on_action,
    };
    let summary = state.summary();

    html! {
        <ContextProvider<TabsContext> context={context}>
            <main key={generation.0.to_string()}>
                <h1>{tab_count_label(summary.tab_count)}</h1>
                <p class="windows">{windows_label(summary.windows_count)}</p>
                <ul id="stats">
                    <li>{loaded_label(summary.loaded_tabs)}</li>
                    if summary.blank_tabs > 0 {
                        <li class="blank">{blank_label(summary.blank_tabs)}</li>
                    }
                    <li class="schemes">
                        {for summary.schemes().map(|line| html! {
                            <span>{scheme_label(line.count, &line.scheme)}</span>
                        })}
                    </li>
                    {sections(&summary)}
                </ul>
            </main>
        </ContextProvider<TabsContext>>
    }
}

/// Duplicate and unique sections of both collections, addresses first
fn sections(summary: &TabSummary) -> Html {
    summary
        .groups()
        .into_iter()
        .map(|collection| {
            let mode = collection.mode();
            let noun = mode.noun();

            let dupes = (!collection.dupes().is_empty()).then(|| {
                let selection = Selection::Duplicates { mode };
                let actions = html! {
                    <>
                        <ActionButton action={Action::Close} selection={selection.clone()} label="close all" />
                        if mode.dedupable() {
                            <ActionButton action={Action::Dedup} selection={selection} label="dedup all" />
                        }
                    </>
                };
                html! {
                    <Collapsible
                        label={duplicates_label(collection.duplicate_group_count(), noun)}
                        list_class="dupes"
                        actions={actions}
                    >
                        <DuplicateList mode={mode} />
                    </Collapsible>
                }
            });

            let unique = (!collection.unique().is_empty()).then(|| {
                let actions = html! {
                    <ActionButton action={Action::Close} selection={Selection::Uniques { mode }} label="close all" />
                };
                html! {
                    <Collapsible
                        label={unique_label(collection.unique_count(), noun)}
                        list_class="unique"
                        actions={actions}
                    >
                        <UniqueList mode={mode} />
                    </Collapsible>
                }
            });

            html! { <>{dupes}{unique}</> }
        })
        .collect()
}

async fn run_action(state: &ViewState<BrowserTabs>, request: ActionRequest) -> ViewUpdate {
    let Some(mut view) = DomView::new() else {
        return ViewUpdate::RefreshNeeded;
    };
    let anchor = request.anchor.as_ref();

    match request.action {
        Action::Close => state.close(&request.selection, &mut view, anchor).await,
        Action::Dedup => state.dedup(&request.selection, &mut view, anchor).await,
        Action::SwitchTo => {
            if let Err(e) = state.switch_to(&request.selection).await {
                log::debug!("switch skipped: {}", e);
            }
            ViewUpdate::Unchanged
        }
    }
}
