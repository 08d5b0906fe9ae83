use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::{Map, Value};

/// `{{#each field}}item template{{/each}}` or `{{field}}`. Item templates
/// refer to the current element as `{{this}}`.
static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\{\{#each\s+(\w+)\s*\}\}(.*?)\{\{/each\}\}|\{\{\s*(\w+)\s*\}\}")
        .expect("valid regex. qed")
});

/// Placeholders allowed inside an each-block item template.
static ITEM_PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*(\w+)\s*\}\}").expect("valid regex. qed"));

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    #[error("placeholder `{0}` has no matching field")]
    MissingField(String),
    #[error("field `{0}` is used in an each-block but is not a list")]
    NotAList(String),
}

impl TemplateError {
    pub fn field(&self) -> &str {
        match self {
            TemplateError::MissingField(name) | TemplateError::NotAList(name) => name,
        }
    }
}

/// Fixed natural-language instructions with named placeholders.
#[derive(Debug, Clone, Copy)]
pub struct PromptTemplate {
    pub name: &'static str,
    pub source: &'static str,
}

impl PromptTemplate {
    pub const fn new(name: &'static str, source: &'static str) -> Self {
        Self { name, source }
    }

    /// Substitutes `fields` into the template in a single pass, so text coming
    /// from a field is never rescanned for placeholders.
    ///
    /// Each-blocks render their item template once per element, joined by
    /// newlines. Scalar placeholders become the field's plain text.
    pub fn render(&self, fields: &Map<String, Value>) -> Result<String, TemplateError> {
        let mut failure = None;

        let rendered = PLACEHOLDER.replace_all(self.source, |caps: &Captures| {
            match (caps.get(1), caps.get(3)) {
                (Some(list), _) => match fields.get(list.as_str()) {
                    Some(Value::Array(items)) => items
                        .iter()
                        .map(|item| render_item(&caps[2], item, fields, &mut failure))
                        .collect::<Vec<_>>()
                        .join("\n"),
                    Some(_) => {
                        failure.get_or_insert(TemplateError::NotAList(list.as_str().to_string()));
                        String::new()
                    }
                    None => {
                        failure
                            .get_or_insert(TemplateError::MissingField(list.as_str().to_string()));
                        String::new()
                    }
                },
                (None, Some(scalar)) => match fields.get(scalar.as_str()) {
                    Some(value) => plain_text(value),
                    None => {
                        let name = scalar.as_str().to_string();
                        failure.get_or_insert(TemplateError::MissingField(name));
                        String::new()
                    }
                },
                (None, None) => caps[0].to_string(),
            }
        });

        match failure {
            Some(err) => Err(err),
            None => Ok(rendered.into_owned()),
        }
    }
}

/// Renders one element of an each-block. `this` is the element, other names
/// resolve against the template fields.
fn render_item(
    body: &str,
    item: &Value,
    fields: &Map<String, Value>,
    failure: &mut Option<TemplateError>,
) -> String {
    ITEM_PLACEHOLDER
        .replace_all(body, |caps: &Captures| match &caps[1] {
            "this" => plain_text(item),
            name => match fields.get(name) {
                Some(value) => plain_text(value),
                None => {
                    failure.get_or_insert(TemplateError::MissingField(name.to_string()));
                    String::new()
                }
            },
        })
        .into_owned()
}

fn plain_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
