use crate::components::ui::{Alert, AlertDescription, Label, FIELD_CLASS};
use crate::models::EntryProp;
use crate::schema::{FieldKind, PropertyDraft, SchemaError, TypeSchema};
use crate::state::AppContext;
use leptos::prelude::*;
use tw_merge::tw_merge;
use wasm_bindgen::JsCast;

/// Editable property form for one entry.
///
/// One input per schema field in declared order, then any stored keys the schema does not
/// declare. A schema that fails to parse renders an inline message and no inputs.
#[component]
pub fn SchemaForm(
    #[prop(into)] schema: Signal<Result<TypeSchema, SchemaError>>,
    draft: RwSignal<PropertyDraft>,
    #[prop(into, optional)] disabled: Signal<bool>,
) -> impl IntoView {
    let app_state = expect_context::<AppContext>().0;

    // Keyed on the field list only, so typing does not rebuild the inputs.
    let keys = Memo::new(move |_| draft.with(|d| d.keys().map(str::to_string).collect::<Vec<_>>()));

    move || match schema.get() {
        Err(e) => view! {
            <Alert class="border-destructive/30">
                <AlertDescription class="text-destructive text-xs">
                    {format!("{}: {e}", app_state.tr("schema.invalid"))}
                </AlertDescription>
            </Alert>
        }
        .into_any(),
        Ok(schema) => {
            let keys = keys.get();
            if keys.is_empty() {
                return view! {
                    <p class="text-xs text-muted-foreground">{app_state.tr("schema.no_fields")}</p>
                }
                .into_any();
            }

            keys.into_iter()
                .map(|key| {
                    let field = schema.field(&key).cloned();
                    let kind = field.as_ref().map(|f| f.kind).unwrap_or(FieldKind::Fallback);
                    let label = field
                        .as_ref()
                        .map(|f| f.label().to_string())
                        .unwrap_or_else(|| key.clone());
                    let placeholder = field
                        .as_ref()
                        .map(|f| f.placeholder().to_string())
                        .unwrap_or_default();
                    let required = field.as_ref().is_some_and(|f| f.required);
                    let undeclared = field.is_none();
                    view! {
                        <FieldInput
                            field_key=key
                            label=label
                            placeholder=placeholder
                            kind=kind
                            required=required
                            undeclared=undeclared
                            draft=draft
                            disabled=disabled
                        />
                    }
                })
                .collect_view()
                .into_any()
        }
    }
}

#[component]
fn FieldInput(
    field_key: String,
    label: String,
    placeholder: String,
    kind: FieldKind,
    required: bool,
    undeclared: bool,
    draft: RwSignal<PropertyDraft>,
    disabled: Signal<bool>,
) -> impl IntoView {
    let app_state = expect_context::<AppContext>().0;
    let dom_id = format!("prop-{field_key}");
    let input_class = tw_merge!("flex h-9", FIELD_CLASS);
    let key = StoredValue::new(field_key);

    let value = move || key.with_value(|k| draft.with(|d| d.value(k).to_string()));

    let on_input = move |ev: web_sys::Event| {
        if let Some(input) = ev
            .target()
            .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok())
        {
            let v = input.value();
            key.with_value(|k| draft.update(|d| d.set(k, v)));
        }
    };

    view! {
        <div class="flex flex-col gap-1.5">
            <Label html_for=dom_id.clone() required=required>
                {label}
                {undeclared.then(|| view! {
                    <span class="font-normal text-muted-foreground">
                        {format!("({})", app_state.tr("schema.undeclared"))}
                    </span>
                })}
            </Label>
            <input
                id=dom_id
                data-field-kind=format!("{kind:?}")
                type=kind.input_type()
                inputmode=kind.input_mode()
                step=(kind == FieldKind::Number).then_some("any")
                class=input_class
                placeholder=placeholder
                disabled=move || disabled.get()
                prop:value=value
                on:input=on_input
            />
        </div>
    }
}

/// Read-only rendering of stored properties, in schema order when the schema parses.
#[component]
pub fn PropertyList(
    #[prop(into)] schema: Signal<Result<TypeSchema, SchemaError>>,
    #[prop(into)] props: Signal<Vec<EntryProp>>,
) -> impl IntoView {
    let app_state = expect_context::<AppContext>().0;

    move || {
        let schema = schema.get().unwrap_or_default();
        let draft = PropertyDraft::new(&schema, &props.get());
        let rows: Vec<(String, String)> = draft
            .keys()
            .map(|k| {
                let label = schema
                    .field(k)
                    .map(|f| f.label().to_string())
                    .unwrap_or_else(|| k.to_string());
                (label, draft.value(k).to_string())
            })
            .filter(|(_, v)| !v.trim().is_empty())
            .collect();

        if rows.is_empty() {
            return view! {
                <p class="text-xs text-muted-foreground">{app_state.tr("schema.no_values")}</p>
            }
            .into_any();
        }

        view! {
            <dl class="grid grid-cols-[auto_1fr] gap-x-4 gap-y-1 text-sm">
                {rows
                    .into_iter()
                    .map(|(label, value)| view! {
                        <dt class="text-muted-foreground">{label}</dt>
                        <dd class="break-words">{value}</dd>
                    })
                    .collect_view()}
            </dl>
        }
        .into_any()
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use crate::models::PropValue;
    use crate::state::AppState;
    use leptos::mount::mount_to;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    const CAMERA_SCHEMA: &str =
        r#"{"type":"object","properties":{"camera":{"type":"string"},"lens":{"type":"string"}}}"#;

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

    fn input_value(parent: &web_sys::HtmlElement, id: &str) -> String {
        parent
            .query_selector(&format!("#{id}"))
            .expect("selector")
            .expect("input present")
            .dyn_into::<web_sys::HtmlInputElement>()
            .expect("input element")
            .value()
    }

    #[wasm_bindgen_test]
    fn broken_schema_renders_message_and_no_inputs() {
        let parent = container();
        let parsed = TypeSchema::parse("[1, 2]");
        let draft = RwSignal::new(PropertyDraft::default());
        let _handle = mount_to(parent.clone(), move || {
            provide_context(AppContext(AppState::new()));
            view! { <SchemaForm schema=Signal::derive(move || parsed.clone()) draft=draft /> }
        });

        assert_eq!(parent.query_selector_all("input").expect("inputs").length(), 0);
        let text = parent.text_content().unwrap_or_default();
        assert!(text.contains("schema must be a JSON object"), "{text}");
    }

    #[wasm_bindgen_test]
    fn camera_schema_renders_one_prefilled_input_per_field() {
        let parent = container();
        let schema = TypeSchema::parse(CAMERA_SCHEMA).expect("valid schema");
        let stored = [EntryProp {
            id: 1,
            entry_id: 1,
            key: "camera".to_string(),
            value_text: Some("Canon EOS R5".to_string()),
        }];
        let draft = RwSignal::new(PropertyDraft::new(&schema, &stored));
        let parsed = Ok(schema);
        let _handle = mount_to(parent.clone(), move || {
            provide_context(AppContext(AppState::new()));
            view! { <SchemaForm schema=Signal::derive(move || parsed.clone()) draft=draft /> }
        });

        assert_eq!(parent.query_selector_all("input").expect("inputs").length(), 2);
        assert_eq!(input_value(&parent, "prop-camera"), "Canon EOS R5");
        assert_eq!(input_value(&parent, "prop-lens"), "");
        assert_eq!(
            draft.with_untracked(|d| d.to_props()),
            vec![
                PropValue::new("camera", "Canon EOS R5"),
                PropValue::new("lens", ""),
            ]
        );
    }
}
