mod custom_field;
mod issue;

pub use custom_field::{extract_custom_fields, render_field_value, CustomFields, CUSTOM_FIELD_PREFIX};
pub use issue::{Issue, IssueFields, NamedRef, SearchOptions, SearchPage};
