use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    http::AuthScheme,
    nodes::resolver::{Field, FieldSet, ListField},
};

/// Message shape sent by one whatsapp-family node.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr, strum::EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MessageKind {
    Text,
    Image,
    Video,
    Audio,
    File,
    Media,
    ButtonLink,
    ButtonQuickReply,
    AuthenticationTemplate,
    MarkAsRead,
}

impl MessageKind {
    /// The `Authorization` scheme each node of this family was published with.
    pub fn auth_scheme(&self) -> AuthScheme {
        match self {
            MessageKind::Image | MessageKind::File | MessageKind::ButtonLink | MessageKind::ButtonQuickReply => AuthScheme::Basic,
            MessageKind::Text
            | MessageKind::Video
            | MessageKind::Audio
            | MessageKind::Media
            | MessageKind::AuthenticationTemplate
            | MessageKind::MarkAsRead => AuthScheme::Bearer,
        }
    }

    /// URL field of the media shapes.
    pub fn media_field(&self) -> Option<Field> {
        match self {
            MessageKind::Image => Some(Field::ImageUrl),
            MessageKind::Video => Some(Field::VideoUrl),
            MessageKind::Audio => Some(Field::AudioUrl),
            MessageKind::File => Some(Field::FileUrl),
            MessageKind::Media => Some(Field::MediaUrl),
            _ => None,
        }
    }

    pub fn fields(&self) -> FieldSet {
        let mut required = match self {
            MessageKind::Text => vec![Field::To, Field::Text],
            MessageKind::ButtonLink => vec![Field::To, Field::Text, Field::ButtonTitle, Field::Url],
            MessageKind::ButtonQuickReply => vec![Field::To, Field::Text],
            MessageKind::AuthenticationTemplate => vec![Field::To, Field::TemplateName, Field::Language],
            MessageKind::MarkAsRead => vec![Field::MessageId],
            media => {
                let mut fields = vec![Field::To];
                fields.extend(media.media_field());
                fields
            }
        };
        required.push(Field::Token);
        if self.auth_scheme() == AuthScheme::Basic {
            required.push(Field::ApiKey);
        }

        let optional = match self {
            MessageKind::MarkAsRead => vec![],
            kind if kind.media_field().is_some() => vec![Field::From, Field::Caption],
            _ => vec![Field::From],
        };

        let lists = match self {
            MessageKind::ButtonQuickReply => vec![ListField::Buttons],
            MessageKind::AuthenticationTemplate => vec![ListField::Components],
            _ => vec![],
        };

        FieldSet {
            required,
            optional,
            lists,
        }
    }
}

/// `{ from, to, message }` send body.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    pub to: String,
    pub message: MessageContent,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContent {
    Text {
        text: String,
    },
    Image {
        image: MediaObject,
    },
    Video {
        video: MediaObject,
    },
    Audio {
        audio: MediaObject,
    },
    File {
        file: MediaObject,
    },
    Media {
        media: MediaObject,
    },
    Button {
        text: String,
        buttons: Vec<Value>,
    },
    AuthenticationTemplate {
        template: Template,
    },
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct MediaObject {
    pub url: String,
    pub caption: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Template {
    pub name: String,
    pub language: String,
    pub components: Vec<Value>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct UrlButton {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub title: String,
    pub payload: String,
}

/// `{ message_id, status: "read" }` status update body.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ReadReceipt {
    pub message_id: String,
    pub status: &'static str,
}
