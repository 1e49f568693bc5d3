use serde_json::Value;

use crate::{
    NotiflowError, Result,
    nodes::resolver::{EffectiveRequest, Field, ListField},
};

use super::models::*;

/// Build the send body for `kind` from a resolved request.
///
/// Fails with [`NotiflowError::Configuration`] when a field the shape
/// requires is absent. Structured fields were already decoded (or degraded
/// to `[]`) by the resolver.
pub fn build_payload(
    kind: MessageKind,
    request: &EffectiveRequest,
) -> Result<Value> {
    let content = match kind {
        MessageKind::MarkAsRead => return Ok(serde_json::to_value(read_receipt(request)?)?),
        MessageKind::Text => text(request)?,
        MessageKind::Image | MessageKind::Video | MessageKind::Audio | MessageKind::File | MessageKind::Media => media(kind, request)?,
        MessageKind::ButtonLink => button_link(request)?,
        MessageKind::ButtonQuickReply => button_quick_reply(request)?,
        MessageKind::AuthenticationTemplate => authentication_template(request)?,
    };

    let message = OutboundMessage {
        from: request.get(Field::From).map(str::to_string),
        to: request.require(Field::To)?.to_string(),
        message: content,
    };
    Ok(serde_json::to_value(message)?)
}

fn text(request: &EffectiveRequest) -> Result<MessageContent> {
    Ok(MessageContent::Text {
        text: request.require(Field::Text)?.to_string(),
    })
}

fn media(
    kind: MessageKind,
    request: &EffectiveRequest,
) -> Result<MessageContent> {
    let field = kind.media_field().ok_or_else(|| NotiflowError::Configuration(format!("{} is not a media shape", kind.as_ref())))?;
    let object = MediaObject {
        url: request.require(field)?.to_string(),
        caption: request.get(Field::Caption).unwrap_or_default().to_string(),
    };

    Ok(match kind {
        MessageKind::Image => MessageContent::Image {
            image: object,
        },
        MessageKind::Video => MessageContent::Video {
            video: object,
        },
        MessageKind::Audio => MessageContent::Audio {
            audio: object,
        },
        MessageKind::File => MessageContent::File {
            file: object,
        },
        _ => MessageContent::Media {
            media: object,
        },
    })
}

fn button_link(request: &EffectiveRequest) -> Result<MessageContent> {
    let button = UrlButton {
        kind: "url",
        title: request.require(Field::ButtonTitle)?.to_string(),
        payload: request.require(Field::Url)?.to_string(),
    };
    Ok(MessageContent::Button {
        text: request.require(Field::Text)?.to_string(),
        buttons: vec![serde_json::to_value(button)?],
    })
}

fn button_quick_reply(request: &EffectiveRequest) -> Result<MessageContent> {
    Ok(MessageContent::Button {
        text: request.require(Field::Text)?.to_string(),
        buttons: request.list(ListField::Buttons),
    })
}

fn authentication_template(request: &EffectiveRequest) -> Result<MessageContent> {
    Ok(MessageContent::AuthenticationTemplate {
        template: Template {
            name: request.require(Field::TemplateName)?.to_string(),
            language: request.require(Field::Language)?.to_string(),
            components: request.list(ListField::Components),
        },
    })
}

fn read_receipt(request: &EffectiveRequest) -> Result<ReadReceipt> {
    Ok(ReadReceipt {
        message_id: request.require(Field::MessageId)?.to_string(),
        status: "read",
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{
        common::Vars,
        nodes::{NodeConfig, resolver::resolve},
    };

    fn config() -> NodeConfig {
        NodeConfig {
            from: Some("5511999990000".to_string()),
            api_key: Some("ak".to_string()),
            token: Some("tk".to_string()),
            ..Default::default()
        }
    }

    fn build(
        kind: MessageKind,
        config: &NodeConfig,
        payload: Value,
    ) -> Result<Value> {
        let request = resolve(config, &Vars::from(payload), &kind.fields())?;
        build_payload(kind, &request)
    }

    #[test]
    fn test_text_body() {
        let body = build(MessageKind::Text, &config(), json!({"to": "A", "text": "hi"})).unwrap();
        assert_eq!(
            body,
            json!({"from": "5511999990000", "to": "A", "message": {"type": "text", "text": "hi"}})
        );
    }

    #[test]
    fn test_text_without_recipient_fails() {
        let err = build(MessageKind::Text, &config(), json!({"text": "hi"})).unwrap_err();
        assert_eq!(err, NotiflowError::Configuration("missing required field: to".to_string()));
    }

    #[test]
    fn test_builder_rejects_unresolved_request() {
        for kind in [MessageKind::Text, MessageKind::Image, MessageKind::ButtonLink, MessageKind::MarkAsRead] {
            let err = build_payload(kind, &EffectiveRequest::default()).unwrap_err();
            assert!(matches!(err, NotiflowError::Configuration(_)), "{:?}", kind);
        }
    }

    #[test]
    fn test_media_bodies_default_caption() {
        let cases = [
            (MessageKind::Image, "imageUrl", "image"),
            (MessageKind::Video, "videoUrl", "video"),
            (MessageKind::Audio, "audioUrl", "audio"),
            (MessageKind::File, "fileUrl", "file"),
            (MessageKind::Media, "mediaUrl", "media"),
        ];
        for (kind, key, tag) in cases {
            let mut payload = json!({"to": "A"});
            payload[key] = json!("https://cdn/x");
            let body = build(kind, &config(), payload).unwrap();
            assert_eq!(body["message"]["type"], json!(tag));
            assert_eq!(body["message"][tag], json!({"url": "https://cdn/x", "caption": ""}));
        }
    }

    #[test]
    fn test_media_caption_from_node() {
        let mut config = config();
        config.caption = Some("look".to_string());
        config.video_url = Some("https://cdn/v.mp4".to_string());
        let body = build(MessageKind::Video, &config, json!({"to": "A"})).unwrap();
        assert_eq!(body["message"]["video"], json!({"url": "https://cdn/v.mp4", "caption": "look"}));
    }

    #[test]
    fn test_audio_without_url_names_field() {
        let err = build(MessageKind::Audio, &config(), json!({"to": "A"})).unwrap_err();
        assert_eq!(err, NotiflowError::Configuration("missing required field: audioUrl".to_string()));
    }

    #[test]
    fn test_button_link_body() {
        let body = build(
            MessageKind::ButtonLink,
            &config(),
            json!({"to": "A", "text": "see", "buttonTitle": "Open", "url": "https://mobilex.tech"}),
        )
        .unwrap();
        assert_eq!(
            body["message"],
            json!({
                "type": "button",
                "text": "see",
                "buttons": [{"type": "url", "title": "Open", "payload": "https://mobilex.tech"}]
            })
        );
    }

    #[test]
    fn test_button_link_missing_title() {
        let err = build(MessageKind::ButtonLink, &config(), json!({"to": "A", "text": "see", "url": "https://x"})).unwrap_err();
        assert!(err.to_string().contains("buttonTitle"));
    }

    #[test]
    fn test_quick_reply_invalid_buttons_degrade() {
        let mut config = config();
        config.buttons = Some(json!("[{broken"));
        let body = build(MessageKind::ButtonQuickReply, &config, json!({"to": "A", "text": "pick"})).unwrap();
        assert_eq!(body["message"], json!({"type": "button", "text": "pick", "buttons": []}));
    }

    #[test]
    fn test_authentication_template_body() {
        let mut config = config();
        config.template_name = Some("otp".to_string());
        config.language = Some("pt_BR".to_string());
        config.components = Some(json!(r#"[{"type":"body","parameters":[{"type":"text","text":"123456"}]}]"#));

        let body = build(MessageKind::AuthenticationTemplate, &config, json!({"to": "A"})).unwrap();
        assert_eq!(
            body["message"],
            json!({
                "type": "authentication_template",
                "template": {
                    "name": "otp",
                    "language": "pt_BR",
                    "components": [{"type": "body", "parameters": [{"type": "text", "text": "123456"}]}]
                }
            })
        );
    }

    #[test]
    fn test_mark_as_read_body() {
        let body = build(MessageKind::MarkAsRead, &config(), json!({"message_id": "wamid.1"})).unwrap();
        assert_eq!(body, json!({"message_id": "wamid.1", "status": "read"}));
    }

    #[test]
    fn test_from_is_omitted_when_absent() {
        let config = NodeConfig {
            token: Some("tk".to_string()),
            ..Default::default()
        };
        let body = build(MessageKind::Text, &config, json!({"to": "A", "text": "hi"})).unwrap();
        assert!(body.get("from").is_none());
    }
}
