use crate::api::media_url;
use crate::components::ui::{Badge, Card, CardContent};
use crate::models::EntryListItem;
use crate::state::AppContext;
use crate::util::{date_part, split_tags};
use icons::{Camera, ChevronRight};
use leptos::prelude::*;

#[component]
pub fn TagBadges(
    #[prop(into)] tags: Option<String>,
    /// Each tag links to the filtered entries list.
    #[prop(optional)]
    linked: bool,
) -> impl IntoView {
    let tags = tags.as_deref().map(split_tags).unwrap_or_default();
    (!tags.is_empty()).then(|| {
        view! {
            <div class="flex flex-wrap gap-1">
                {tags
                    .into_iter()
                    .map(|tag| {
                        let label = format!("#{tag}");
                        if linked {
                            let href = format!("/entries?tag={}", urlencoding::encode(&tag));
                            view! {
                                <a href=href>
                                    <Badge class="hover:text-foreground">{label}</Badge>
                                </a>
                            }
                            .into_any()
                        } else {
                            view! { <Badge>{label}</Badge> }.into_any()
                        }
                    })
                    .collect_view()}
            </div>
        }
    })
}

#[component]
pub fn EntryCard(
    item: EntryListItem,
    /// Display title of the entry's type, when known.
    #[prop(optional_no_strip)]
    type_title: Option<String>,
) -> impl IntoView {
    let app_state = expect_context::<AppContext>().0;
    let base_url = app_state.client().base_url().to_string();

    let href = format!("/entries/{}", item.id);
    let title = item
        .title
        .clone()
        .filter(|t| !t.trim().is_empty());
    let thumbnail = item
        .thumbnail_url
        .as_deref()
        .map(|path| media_url(&base_url, path));
    let kind = type_title.unwrap_or_else(|| item.type_key.clone());
    let date = date_part(&item.created_at).to_string();
    let media_count = item.media_count;

    view! {
        <a href=href class="block transition-colors hover:opacity-90">
            <Card class="gap-3 py-4">
                <CardContent class="flex gap-3 px-4">
                    {thumbnail.map(|src| view! {
                        <img src=src alt="" class="size-16 shrink-0 rounded-md object-cover" />
                    })}
                    <div class="min-w-0 flex-1 space-y-1">
                        <div class="flex items-center justify-between gap-2">
                            <div class="truncate text-sm font-medium">
                                {match title {
                                    Some(t) => t.into_any(),
                                    None => view! {
                                        <span class="italic text-muted-foreground">
                                            {move || app_state.tr("entry.untitled")}
                                        </span>
                                    }
                                    .into_any(),
                                }}
                            </div>
                            <ChevronRight class="size-4 shrink-0 text-muted-foreground" />
                        </div>
                        <div class="flex items-center gap-2 text-xs text-muted-foreground">
                            <span>{kind}</span>
                            <span>"·"</span>
                            <span>{date}</span>
                            {(media_count > 0).then(|| view! {
                                <span class="inline-flex items-center gap-1">
                                    <Camera class="size-3" />
                                    {media_count}
                                </span>
                            })}
                        </div>
                        {item.description.filter(|d| !d.trim().is_empty()).map(|d| view! {
                            <p class="line-clamp-2 text-xs text-muted-foreground">{d}</p>
                        })}
                        <TagBadges tags=item.tags />
                    </div>
                </CardContent>
            </Card>
        </a>
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use crate::state::AppState;
    use leptos::mount::mount_to;
    use wasm_bindgen::JsCast;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn container() -> web_sys::HtmlElement {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .expect("document");
        let div = document
            .create_element("div")
            .expect("create div")
            .dyn_into::<web_sys::HtmlElement>()
            .expect("html element");
        document.body().expect("body").append_child(&div).expect("append");
        div
    }

    fn item() -> EntryListItem {
        serde_json::from_str(
            r#"{"id":9,"hobby_id":3,"type_key":"book","title":"Dune","created_at":"2024-05-01T10:00:00","media_count":2}"#,
        )
        .expect("list item")
    }

    fn render(type_title: Option<String>) -> String {
        let parent = container();
        let _handle = mount_to(parent.clone(), move || {
            provide_context(AppContext(AppState::new()));
            view! { <EntryCard item=item() type_title=type_title /> }
        });
        parent.inner_html()
    }

    #[wasm_bindgen_test]
    fn card_shows_known_type_title() {
        let html = render(Some("Book".to_string()));
        assert!(html.contains("Book"), "{html}");
        assert!(html.contains("Dune"), "{html}");
        assert!(html.contains("/entries/9"), "{html}");
        assert!(html.contains("2024-05-01"), "{html}");
    }

    #[wasm_bindgen_test]
    fn card_falls_back_to_type_key() {
        let html = render(None);
        assert!(html.contains(">book<"), "{html}");
        assert!(!html.contains("Book"), "{html}");
    }
}
