use serde_json::Value;

/// Contract for settings form fields. Rendering is left to the host; a field
/// here only carries its label and cleans up submitted input.
pub trait Field: Send + Sync {
    /// Label to use for display.
    fn label(&self) -> &str;

    /// Sanitize user input before saving it. `value` is `None` when the form
    /// did not submit the field at all; problems go to `reporter`.
    fn sanitize_value(&self, value: Option<Value>, _reporter: &mut dyn FnMut(String)) -> Value {
        value.unwrap_or(Value::Null)
    }
}

/// Single-line text input with an optional description.
#[derive(Clone, Debug)]
pub struct TextField {
    label: String,
    description: Option<String>,
}

impl TextField {
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into(), description: None }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn description(&self) -> Option<&str> { self.description.as_deref() }
}

impl Field for TextField {
    fn label(&self) -> &str { &self.label }

    fn sanitize_value(&self, value: Option<Value>, reporter: &mut dyn FnMut(String)) -> Value {
        match value {
            None | Some(Value::Null) => Value::String(String::new()),
            Some(Value::String(s)) => Value::String(s),
            Some(Value::Bool(b)) => Value::String(if b { "1".into() } else { String::new() }),
            Some(Value::Number(n)) => Value::String(n.to_string()),
            Some(Value::Array(_)) | Some(Value::Object(_)) => {
                reporter(format!("{} must be plain text.", self.label));
                Value::String(String::new())
            }
        }
    }
}

/// A checkbox; stores a boolean.
#[derive(Clone, Debug)]
pub struct CheckboxField {
    label: String,
    caption: String,
}

impl CheckboxField {
    /// `caption` falls back to the label when empty.
    pub fn new(label: impl Into<String>, caption: impl Into<String>) -> Self {
        let label = label.into();
        let caption = caption.into();
        let caption = if caption.is_empty() { label.clone() } else { caption };
        Self { label, caption }
    }

    pub fn caption(&self) -> &str { &self.caption }
}

/// Loose truthiness of submitted form data.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !(s.is_empty() || s == "0"),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

impl Field for CheckboxField {
    fn label(&self) -> &str { &self.label }

    fn sanitize_value(&self, value: Option<Value>, _reporter: &mut dyn FnMut(String)) -> Value {
        Value::Bool(value.as_ref().is_some_and(truthy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sanitize(field: &dyn Field, value: Option<Value>) -> (Value, Vec<String>) {
        let mut reported = Vec::new();
        let out = field.sanitize_value(value, &mut |m: String| reported.push(m));
        (out, reported)
    }

    #[test]
    fn text_field_coerces_scalars() {
        let f = TextField::new("Title").with_description("Shown in the header");
        assert_eq!(f.description(), Some("Shown in the header"));
        assert_eq!(sanitize(&f, Some(json!("hi"))).0, json!("hi"));
        assert_eq!(sanitize(&f, Some(json!(12))).0, json!("12"));
        assert_eq!(sanitize(&f, None).0, json!(""));
    }

    #[test]
    fn text_field_reports_structured_input() {
        let f = TextField::new("Title");
        let (out, reported) = sanitize(&f, Some(json!(["a"])));
        assert_eq!(out, json!(""));
        assert_eq!(reported, vec!["Title must be plain text.".to_string()]);
    }

    #[test]
    fn checkbox_field_is_boolean() {
        let f = CheckboxField::new("Banner", "");
        assert_eq!(f.caption(), "Banner");
        assert_eq!(sanitize(&f, Some(json!("1"))).0, json!(true));
        assert_eq!(sanitize(&f, Some(json!("0"))).0, json!(false));
        assert_eq!(sanitize(&f, Some(json!(0))).0, json!(false));
        assert_eq!(sanitize(&f, None).0, json!(false));
        assert_eq!(sanitize(&f, Some(json!({"on": 1}))).0, json!(true));
    }
}
