//! Credential/config resolution.
//!
//! Merges the static [`NodeConfig`] with the overrides of one inbound
//! payload. For every field the payload wins over the node configuration,
//! which wins over the field's default. Empty strings count as absent.

use std::{collections::BTreeMap, fmt};

use serde_json::Value;

use crate::{NotiflowError, Result, common::Vars, nodes::NodeConfig};

pub const DEFAULT_AUTHOR: &str = "a07122dd-447f-4d30-953c-283cbe320216";
pub const DEFAULT_SUBJECT_PUSH: &str = "Notificação Padrão";
pub const DEFAULT_CONTENT_PUSH: &str = "Você tem uma nova mensagem.";

/// Scalar field of an effective request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    To,
    Text,
    Caption,
    ImageUrl,
    VideoUrl,
    AudioUrl,
    FileUrl,
    MediaUrl,
    ButtonTitle,
    Url,
    MessageId,
    TemplateName,
    Language,
    SubjectPush,
    ContentPush,
    From,
    Author,
    AppCompanyId,
    ApiKey,
    Token,
    ClientSecret,
}

impl Field {
    /// Name used in error messages, as written in the node configuration.
    pub fn name(&self) -> &'static str {
        match self {
            Field::To => "to",
            Field::Text => "text",
            Field::Caption => "caption",
            Field::ImageUrl => "imageUrl",
            Field::VideoUrl => "videoUrl",
            Field::AudioUrl => "audioUrl",
            Field::FileUrl => "fileUrl",
            Field::MediaUrl => "mediaUrl",
            Field::ButtonTitle => "buttonTitle",
            Field::Url => "url",
            Field::MessageId => "message_id",
            Field::TemplateName => "templateName",
            Field::Language => "language",
            Field::SubjectPush => "subjectPush",
            Field::ContentPush => "contentPush",
            Field::From => "from",
            Field::Author => "author",
            Field::AppCompanyId => "appCompanyId",
            Field::ApiKey => "apiKey",
            Field::Token => "token",
            Field::ClientSecret => "clientSecret",
        }
    }

    /// Key of the inbound payload that overrides this field. Credentials,
    /// sender identity and templates are node-only.
    fn payload_key(&self) -> Option<&'static str> {
        match self {
            Field::To => Some("to"),
            Field::Text => Some("text"),
            Field::Caption => Some("caption"),
            Field::ImageUrl => Some("imageUrl"),
            Field::VideoUrl => Some("videoUrl"),
            Field::AudioUrl => Some("audioUrl"),
            Field::FileUrl => Some("fileUrl"),
            Field::MediaUrl => Some("mediaUrl"),
            Field::ButtonTitle => Some("buttonTitle"),
            Field::Url => Some("url"),
            Field::MessageId => Some("message_id"),
            Field::SubjectPush => Some("subjectPush"),
            Field::ContentPush => Some("contentPush"),
            _ => None,
        }
    }

    fn config_value<'a>(
        &self,
        config: &'a NodeConfig,
    ) -> Option<&'a str> {
        let value = match self {
            Field::To => &config.to,
            Field::Text => &config.text,
            Field::Caption => &config.caption,
            Field::ImageUrl => &config.image_url,
            Field::VideoUrl => &config.video_url,
            Field::AudioUrl => &config.audio_url,
            Field::FileUrl => &config.file_url,
            Field::MediaUrl => &config.media_url,
            Field::ButtonTitle => &config.button_title,
            Field::Url => &config.url,
            Field::MessageId => &config.message_id,
            Field::TemplateName => &config.template_name,
            Field::Language => &config.language,
            Field::SubjectPush => &config.subject_push,
            Field::ContentPush => &config.content_push,
            Field::From => &config.from,
            Field::Author => &config.author,
            Field::AppCompanyId => &config.app_company_id,
            Field::ApiKey => &config.api_key,
            Field::Token => &config.token,
            Field::ClientSecret => &config.client_secret,
        };
        value.as_deref().filter(|v| !v.is_empty())
    }

    fn default_value(&self) -> Option<&'static str> {
        match self {
            Field::Caption => Some(""),
            Field::Author => Some(DEFAULT_AUTHOR),
            Field::SubjectPush => Some(DEFAULT_SUBJECT_PUSH),
            Field::ContentPush => Some(DEFAULT_CONTENT_PUSH),
            _ => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Structured field supplied as a JSON list or a JSON-encoded string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ListField {
    Components,
    Buttons,
    ActionPush,
    Userids,
}

impl ListField {
    pub fn name(&self) -> &'static str {
        match self {
            ListField::Components => "components",
            ListField::Buttons => "buttons",
            ListField::ActionPush => "actionPush",
            ListField::Userids => "userids",
        }
    }

    fn payload_key(&self) -> Option<&'static str> {
        match self {
            ListField::Components => Some("components"),
            ListField::Buttons => Some("buttons"),
            ListField::Userids => Some("userids"),
            ListField::ActionPush => None,
        }
    }

    fn config_value<'a>(
        &self,
        config: &'a NodeConfig,
    ) -> Option<&'a Value> {
        match self {
            ListField::Components => config.components.as_ref(),
            ListField::Buttons => config.buttons.as_ref(),
            ListField::ActionPush => config.action_push.as_ref(),
            ListField::Userids => config.userids.as_ref(),
        }
    }
}

/// The fields one message shape needs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSet {
    pub required: Vec<Field>,
    pub optional: Vec<Field>,
    pub lists: Vec<ListField>,
}

/// An optional structured field that could not be decoded into a list and
/// was replaced with `[]`. Not an error.
#[derive(Debug, Clone, PartialEq)]
pub struct DegradedInput {
    pub field: ListField,
    pub reason: String,
    pub input: String,
}

impl fmt::Display for DegradedInput {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{} {}, using []. Input: {}", self.field.name(), self.reason, self.input)
    }
}

/// Fully resolved fields for one outbound call. Built fresh per invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectiveRequest {
    values: BTreeMap<Field, String>,
    lists: BTreeMap<ListField, Vec<Value>>,
    degraded: Vec<DegradedInput>,
}

impl EffectiveRequest {
    pub fn get(
        &self,
        field: Field,
    ) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    pub fn require(
        &self,
        field: Field,
    ) -> Result<&str> {
        self.get(field).ok_or_else(|| missing(&[field]))
    }

    /// The decoded list, `[]` when absent or degraded.
    pub fn list(
        &self,
        field: ListField,
    ) -> Vec<Value> {
        self.lists.get(&field).cloned().unwrap_or_default()
    }

    pub fn degraded(&self) -> &[DegradedInput] {
        &self.degraded
    }
}

/// Merge node configuration and payload overrides.
///
/// Fails with [`NotiflowError::Configuration`] naming every required field
/// that is absent from both sources and has no default. Structured fields
/// never fail; see [`DegradedInput`].
pub fn resolve(
    config: &NodeConfig,
    payload: &Vars,
    fields: &FieldSet,
) -> Result<EffectiveRequest> {
    let mut request = EffectiveRequest::default();
    let mut absent = Vec::new();

    for field in fields.required.iter().chain(fields.optional.iter()) {
        let value = field
            .payload_key()
            .and_then(|key| payload.get_text(key))
            .or_else(|| field.config_value(config).map(str::to_string))
            .or_else(|| field.default_value().map(str::to_string));

        match value {
            Some(value) => {
                request.values.insert(*field, value);
            }
            None if fields.required.contains(field) => absent.push(*field),
            None => {}
        }
    }

    if !absent.is_empty() {
        return Err(missing(&absent));
    }

    for field in fields.lists.iter() {
        let source = field
            .payload_key()
            .and_then(|key| payload.get_value(key))
            .filter(|v| is_present(v))
            .or_else(|| field.config_value(config).filter(|v| is_present(v)));

        let list = match source.map(decode_list) {
            None => Vec::new(),
            Some(Ok(list)) => list,
            Some(Err(reason)) => {
                request.degraded.push(DegradedInput {
                    field: *field,
                    reason,
                    input: source.map(display_input).unwrap_or_default(),
                });
                Vec::new()
            }
        };
        request.lists.insert(*field, list);
    }

    Ok(request)
}

fn missing(fields: &[Field]) -> NotiflowError {
    let names: Vec<&str> = fields.iter().map(Field::name).collect();
    NotiflowError::Configuration(format!("missing required field: {}", names.join(", ")))
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    }
}

fn decode_list(value: &Value) -> std::result::Result<Vec<Value>, String> {
    match value {
        Value::Array(list) => Ok(list.clone()),
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(Value::Array(list)) => Ok(list),
            Ok(_) => Err("did not result in a list".to_string()),
            Err(err) => Err(format!("could not be parsed ({})", err)),
        },
        _ => Err("did not result in a list".to_string()),
    }
}

fn display_input(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn text_fields() -> FieldSet {
        FieldSet {
            required: vec![Field::To, Field::Text],
            optional: vec![Field::From],
            lists: vec![],
        }
    }

    #[test]
    fn test_payload_overrides_node_config() {
        let config = NodeConfig {
            to: Some("B".to_string()),
            text: Some("default".to_string()),
            ..Default::default()
        };
        let payload = Vars::from(json!({"to": "A", "text": "hi"}));

        let request = resolve(&config, &payload, &text_fields()).unwrap();
        assert_eq!(request.get(Field::To), Some("A"));
        assert_eq!(request.get(Field::Text), Some("hi"));
    }

    #[test]
    fn test_numeric_payload_override_wins() {
        let config = NodeConfig {
            to: Some("B".to_string()),
            text: Some("t".to_string()),
            ..Default::default()
        };
        let payload = Vars::from(json!({"to": 5511999990000u64}));

        let request = resolve(&config, &payload, &text_fields()).unwrap();
        assert_eq!(request.get(Field::To), Some("5511999990000"));

        let config = NodeConfig {
            text: Some("t".to_string()),
            ..Default::default()
        };
        let request = resolve(&config, &payload, &text_fields()).unwrap();
        assert_eq!(request.get(Field::To), Some("5511999990000"));
    }

    #[test]
    fn test_null_payload_value_falls_back_to_node() {
        let config = NodeConfig {
            to: Some("B".to_string()),
            text: Some("t".to_string()),
            ..Default::default()
        };
        let request = resolve(&config, &Vars::from(json!({"to": null})), &text_fields()).unwrap();
        assert_eq!(request.get(Field::To), Some("B"));
    }

    #[test]
    fn test_node_config_used_without_overrides() {
        let config = NodeConfig {
            to: Some("B".to_string()),
            text: Some("default".to_string()),
            ..Default::default()
        };

        let request = resolve(&config, &Vars::new(), &text_fields()).unwrap();
        assert_eq!(request.get(Field::To), Some("B"));
        assert_eq!(request.get(Field::Text), Some("default"));
        assert_eq!(request.get(Field::From), None);
    }

    #[test]
    fn test_empty_strings_count_as_absent() {
        let config = NodeConfig {
            to: Some("".to_string()),
            text: Some("default".to_string()),
            ..Default::default()
        };
        let payload = Vars::from(json!({"to": "", "text": ""}));

        let err = resolve(&config, &payload, &text_fields()).unwrap_err();
        assert_eq!(err, NotiflowError::Configuration("missing required field: to".to_string()));
    }

    #[test]
    fn test_missing_fields_are_all_named() {
        let err = resolve(&NodeConfig::default(), &Vars::new(), &text_fields()).unwrap_err();
        assert_eq!(err, NotiflowError::Configuration("missing required field: to, text".to_string()));
    }

    #[test]
    fn test_defaults_apply_last() {
        let fields = FieldSet {
            required: vec![],
            optional: vec![Field::Author, Field::SubjectPush, Field::Caption],
            lists: vec![],
        };
        let config = NodeConfig {
            subject_push: Some("Configured".to_string()),
            ..Default::default()
        };

        let request = resolve(&config, &Vars::new(), &fields).unwrap();
        assert_eq!(request.get(Field::Author), Some(DEFAULT_AUTHOR));
        assert_eq!(request.get(Field::SubjectPush), Some("Configured"));
        assert_eq!(request.get(Field::Caption), Some(""));
    }

    #[test]
    fn test_credentials_are_not_overridable() {
        let fields = FieldSet {
            required: vec![Field::Token],
            ..Default::default()
        };
        let payload = Vars::from(json!({"token": "from-message"}));

        let err = resolve(&NodeConfig::default(), &payload, &fields).unwrap_err();
        assert!(err.to_string().contains("token"));
    }

    #[test]
    fn test_list_from_payload_array_or_config_string() {
        let fields = FieldSet {
            lists: vec![ListField::Buttons, ListField::Components],
            ..Default::default()
        };
        let config = NodeConfig {
            buttons: Some(json!(r#"[{"type":"reply","title":"no"}]"#)),
            components: Some(json!(r#"[{"type":"body"}]"#)),
            ..Default::default()
        };
        let payload = Vars::from(json!({"buttons": [{"type": "reply", "title": "yes"}]}));

        let request = resolve(&config, &payload, &fields).unwrap();
        assert_eq!(request.list(ListField::Buttons), vec![json!({"type": "reply", "title": "yes"})]);
        assert_eq!(request.list(ListField::Components), vec![json!({"type": "body"})]);
        assert!(request.degraded().is_empty());
    }

    #[test]
    fn test_invalid_list_degrades_to_empty() {
        let fields = FieldSet {
            lists: vec![ListField::Components, ListField::Userids, ListField::ActionPush],
            ..Default::default()
        };
        let config = NodeConfig {
            components: Some(json!("{not json")),
            action_push: Some(json!(r#"{"name":"link"}"#)),
            ..Default::default()
        };
        let payload = Vars::from(json!({"userids": 42}));

        let request = resolve(&config, &payload, &fields).unwrap();
        assert_eq!(request.list(ListField::Components), Vec::<Value>::new());
        assert_eq!(request.list(ListField::Userids), Vec::<Value>::new());
        assert_eq!(request.list(ListField::ActionPush), Vec::<Value>::new());

        let degraded: Vec<ListField> = request.degraded().iter().map(|d| d.field).collect();
        assert_eq!(degraded, vec![ListField::Components, ListField::Userids, ListField::ActionPush]);
        assert!(request.degraded()[0].to_string().starts_with("components could not be parsed"));
    }

    #[test]
    fn test_absent_or_blank_list_is_empty_without_warning() {
        let fields = FieldSet {
            lists: vec![ListField::Userids, ListField::ActionPush],
            ..Default::default()
        };
        let config = NodeConfig {
            action_push: Some(json!("")),
            ..Default::default()
        };

        let request = resolve(&config, &Vars::new(), &fields).unwrap();
        assert!(request.list(ListField::Userids).is_empty());
        assert!(request.list(ListField::ActionPush).is_empty());
        assert!(request.degraded().is_empty());
    }
}
