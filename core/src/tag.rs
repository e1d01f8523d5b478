use crate::config::TagConfig;

/// Tag value telling the ORM to ignore the field.
pub const SKIP: &str = "-";

#[derive(Debug, Clone, Copy)]
pub struct TagPolicy<'a> {
    config: &'a TagConfig,
}

impl<'a> TagPolicy<'a> {
    pub fn new(config: &'a TagConfig) -> Self {
        Self { config }
    }

    /// The value placed under the ORM key, escaped for use inside a quoted tag value.
    pub fn value(&self, raw_column: &str, field_name: &str) -> String {
        if self.config.rm_tag_if_uc_first && starts_upper(field_name) {
            return SKIP.to_string();
        }
        let value = if self.config.tag_to_lower {
            raw_column.to_lowercase()
        } else {
            raw_column.to_string()
        };
        // a raw string literal cannot contain a backtick at all
        if value.contains('`') {
            tracing::warn!(column = %raw_column, field = %field_name, "Column name contains a backtick, tagging it as skipped");
            return SKIP.to_string();
        }
        value.replace('\\', "\\\\").replace('"', "\\\"")
    }

    /// The full struct tag, backticks included: `` `xorm:"user_name" json:"userName"` ``.
    pub fn render(&self, raw_column: &str, field_name: &str) -> String {
        let value = self.value(raw_column, field_name);
        let key = self.config.tag_key();
        if self.config.json_tag {
            format!("`{key}:\"{value}\" json:\"{}\"`", json_key(field_name))
        } else {
            format!("`{key}:\"{value}\"`")
        }
    }
}

fn starts_upper(s: &str) -> bool {
    s.chars().next().is_some_and(|c| !c.is_lowercase())
}

/// `UserName` → `userName`.
pub fn json_key(field_name: &str) -> String {
    let mut chars = field_name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
