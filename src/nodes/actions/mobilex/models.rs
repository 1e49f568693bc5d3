use serde::Serialize;
use serde_json::{Map, Value};

use crate::{
    AddressStateShape, Result,
    nodes::resolver::{EffectiveRequest, Field, FieldSet, ListField},
};

/// Fields the push node resolves for every invocation.
pub fn push_fields() -> FieldSet {
    FieldSet {
        required: vec![Field::ClientSecret, Field::AppCompanyId],
        optional: vec![Field::SubjectPush, Field::ContentPush, Field::Author],
        lists: vec![ListField::Userids, ListField::ActionPush],
    }
}

/// Push-notification send body.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PushPayload {
    pub tipos_array: String,
    pub targets: PushTargets,
    pub actions: Vec<Value>,
    pub action_push: Vec<Value>,
    pub momento_envio: bool,
    pub subject_push: String,
    pub content_push: String,
    pub tipo_envio: u8,
    pub author: String,
    pub source: String,
    pub send_to_all: bool,
    pub send_inbox: bool,
    pub send_push: bool,
    pub level: u8,
}

/// Demographic filters. Only `userids` is ever filled in.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PushTargets {
    pub born_in: Map<String, Value>,
    pub registered_in: Map<String, Value>,
    pub specialty: Vec<Value>,
    pub address_city: Vec<Value>,
    pub address_country: Vec<Value>,
    pub address_state: Value,
    pub userids: Vec<Value>,
}

impl PushTargets {
    pub fn for_users(
        userids: Vec<Value>,
        address_state: AddressStateShape,
    ) -> Self {
        Self {
            born_in: Map::new(),
            registered_in: Map::new(),
            specialty: vec![],
            address_city: vec![],
            address_country: vec![],
            address_state: match address_state {
                AddressStateShape::List => Value::Array(vec![]),
                AddressStateShape::Object => Value::Object(Map::new()),
            },
            userids,
        }
    }
}

impl PushPayload {
    pub fn build(
        request: &EffectiveRequest,
        address_state: AddressStateShape,
    ) -> Result<Self> {
        Ok(Self {
            tipos_array: "2".to_string(),
            targets: PushTargets::for_users(request.list(ListField::Userids), address_state),
            actions: vec![],
            action_push: request.list(ListField::ActionPush),
            momento_envio: false,
            subject_push: request.require(Field::SubjectPush)?.to_string(),
            content_push: request.require(Field::ContentPush)?.to_string(),
            tipo_envio: 1,
            author: request.require(Field::Author)?.to_string(),
            source: "web".to_string(),
            send_to_all: false,
            send_inbox: false,
            send_push: true,
            level: 1,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{
        NotiflowError,
        common::Vars,
        nodes::{
            NodeConfig,
            resolver::{DEFAULT_AUTHOR, resolve},
        },
    };

    fn config() -> NodeConfig {
        NodeConfig {
            client_secret: Some("s3cr3t".to_string()),
            app_company_id: Some("42".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_push_body_with_defaults() {
        let request = resolve(&config(), &Vars::from(json!({"userids": ["u1", "u2"]})), &push_fields()).unwrap();
        let body = serde_json::to_value(PushPayload::build(&request, AddressStateShape::List).unwrap()).unwrap();

        assert_eq!(
            body,
            json!({
                "tiposArray": "2",
                "targets": {
                    "bornIn": {},
                    "registeredIn": {},
                    "specialty": [],
                    "addressCity": [],
                    "addressCountry": [],
                    "addressState": [],
                    "userids": ["u1", "u2"]
                },
                "actions": [],
                "actionPush": [],
                "momentoEnvio": false,
                "subjectPush": "Notificação Padrão",
                "contentPush": "Você tem uma nova mensagem.",
                "tipoEnvio": 1,
                "author": DEFAULT_AUTHOR,
                "source": "web",
                "sendToAll": false,
                "sendInbox": false,
                "sendPush": true,
                "level": 1
            })
        );
    }

    #[test]
    fn test_push_body_overrides_and_object_address_state() {
        let mut config = config();
        config.author = Some("3f8e2b7c-1d2a-4c4e-9c1b-0a1b2c3d4e5f".to_string());
        config.action_push = Some(json!(r#"[{"type":"link","value":"https://mobilex.tech"}]"#));
        let payload = Vars::from(json!({"subjectPush": "Hello", "userids": "[\"u9\"]"}));

        let request = resolve(&config, &payload, &push_fields()).unwrap();
        let body = PushPayload::build(&request, AddressStateShape::Object).unwrap();

        assert_eq!(body.subject_push, "Hello");
        assert_eq!(body.author, "3f8e2b7c-1d2a-4c4e-9c1b-0a1b2c3d4e5f");
        assert_eq!(body.targets.userids, vec![json!("u9")]);
        assert_eq!(body.targets.address_state, json!({}));
        assert_eq!(body.action_push, vec![json!({"type": "link", "value": "https://mobilex.tech"})]);
    }

    #[test]
    fn test_push_requires_credentials() {
        let err = resolve(&NodeConfig::default(), &Vars::new(), &push_fields()).unwrap_err();
        assert_eq!(err, NotiflowError::Configuration("missing required field: clientSecret, appCompanyId".to_string()));
    }
}
