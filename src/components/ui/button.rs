use leptos::prelude::*;
use leptos_ui::variants;
use tw_merge::tw_merge;

variants! {
    Button {
        base: "inline-flex items-center justify-center gap-2 whitespace-nowrap rounded-md text-sm font-medium transition-all disabled:pointer-events-none disabled:opacity-50 [&_svg]:pointer-events-none [&_svg:not([class*='size-'])]:size-4 shrink-0 [&_svg]:shrink-0 outline-none focus-visible:border-ring focus-visible:ring-ring/50 focus-visible:ring-[3px] w-fit hover:cursor-pointer active:scale-[0.98] touch-manipulation select-none",
        variants: {
            variant: {
                Default: "bg-primary text-primary-foreground shadow-xs hover:bg-primary/90",
                Destructive: "bg-destructive text-white shadow-xs hover:bg-destructive/90 focus-visible:ring-destructive/20 dark:bg-destructive/60",
                Outline: "border bg-border/30 shadow-xs hover:bg-border/50 hover:text-foreground dark:bg-input/30 dark:border-input",
                Secondary: "bg-secondary text-secondary-foreground shadow-xs hover:bg-secondary/80",
                Ghost: "hover:bg-accent hover:text-accent-foreground dark:hover:bg-accent/50",
                Link: "text-primary underline-offset-4 hover:underline",
                // Active tab / selected chip.
                Active: "bg-accent text-accent-foreground font-semibold",
            },
            size: {
                Default: "h-9 px-4 py-2 has-[>svg]:px-3",
                Sm: "h-8 rounded-md gap-1.5 px-3 has-[>svg]:px-2.5",
                Xs: "h-6 rounded-md gap-1 px-2 text-xs",
                Icon: "size-8",
            }
        },
        component: {
            element: button,
            support_href: true,
            support_aria_current: true
        }
    }
}

const LINK_BUTTON_BASE: &str = "inline-flex h-8 items-center justify-center gap-1.5 whitespace-nowrap rounded-md px-3 text-sm font-medium transition-all [&_svg]:pointer-events-none [&_svg:not([class*='size-'])]:size-4 [&_svg]:shrink-0 outline-none focus-visible:ring-ring/50 focus-visible:ring-[3px] select-none";

/// Navigation link styled as a small button.
#[component]
pub fn LinkButton(
    #[prop(into)] href: String,
    #[prop(optional)] primary: bool,
    #[prop(into, optional)] class: String,
    #[prop(into, optional)] title: String,
    children: Children,
) -> impl IntoView {
    let tone = if primary {
        "bg-primary text-primary-foreground shadow-xs hover:bg-primary/90"
    } else {
        "hover:bg-accent hover:text-accent-foreground dark:hover:bg-accent/50"
    };
    let merged_class = tw_merge!(LINK_BUTTON_BASE, tone, class);

    view! {
        <a href=href class=merged_class title=title>
            {children()}
        </a>
    }
}
