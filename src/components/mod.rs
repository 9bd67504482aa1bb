pub mod ui;

mod entry_card;
mod hobby_sidebar;
mod schema_form;

pub(crate) use entry_card::{EntryCard, TagBadges};
pub(crate) use hobby_sidebar::{HobbySidebar, DEFAULT_HOBBY_COLOR};
pub(crate) use schema_form::{PropertyList, SchemaForm};
