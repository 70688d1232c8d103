//! Bot API objects, reduced to the fields the bot reads.

use serde::Deserialize;

/// Envelope of every Bot API reply.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
    pub error_code: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    pub from: Option<User>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    pub message: Option<Message>,
    pub data: Option<String>,
}

/// What an update asks the bot to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Text {
        chat_id: i64,
        text: String,
        first_name: Option<String>,
    },
    Callback {
        query_id: String,
        chat_id: Option<i64>,
        data: Option<String>,
    },
}

impl Update {
    /// Reduce an update to the bot-relevant event, if any.
    pub fn into_inbound(self) -> Option<Inbound> {
        if let Some(query) = self.callback_query {
            return Some(Inbound::Callback {
                query_id: query.id,
                chat_id: query.message.map(|m| m.chat.id),
                data: query.data,
            });
        }

        let message = self.message?;
        let text = message.text?;
        Some(Inbound::Text {
            chat_id: message.chat.id,
            text,
            first_name: message.from.map(|u| u.first_name),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(json: &str) -> Update {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_text_message() {
        let u = update(
            r#"{"update_id": 10, "message": {"message_id": 5, "date": 0,
                "chat": {"id": 42, "type": "private"},
                "from": {"id": 42, "is_bot": false, "first_name": "Asha"},
                "text": "hello"}}"#,
        );
        assert_eq!(
            u.into_inbound(),
            Some(Inbound::Text {
                chat_id: 42,
                text: "hello".to_string(),
                first_name: Some("Asha".to_string()),
            })
        );
    }

    #[test]
    fn test_callback_query() {
        let u = update(
            r#"{"update_id": 11, "callback_query": {"id": "abc",
                "from": {"id": 42, "is_bot": false, "first_name": "Asha"},
                "message": {"message_id": 6, "chat": {"id": 42}},
                "data": "lang_hi"}}"#,
        );
        assert_eq!(
            u.into_inbound(),
            Some(Inbound::Callback {
                query_id: "abc".to_string(),
                chat_id: Some(42),
                data: Some("lang_hi".to_string()),
            })
        );
    }

    #[test]
    fn test_non_text_message_ignored() {
        let u = update(
            r#"{"update_id": 12, "message": {"message_id": 7, "chat": {"id": 1},
                "sticker": {"file_id": "x"}}}"#,
        );
        assert_eq!(u.into_inbound(), None);
        assert_eq!(update(r#"{"update_id": 13}"#).into_inbound(), None);
    }

    #[test]
    fn test_error_envelope() {
        let r: ApiResponse<Vec<Update>> = serde_json::from_str(
            r#"{"ok": false, "error_code": 401, "description": "Unauthorized"}"#,
        )
        .unwrap();
        assert!(!r.ok);
        assert_eq!(r.error_code, Some(401));
        assert_eq!(r.description.as_deref(), Some("Unauthorized"));
    }
}
