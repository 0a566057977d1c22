use crate::shared::entity::{Entity, ID};

/// A chat user. `telegram_id` identifies the person, `chat_id` is where
/// messages for them are delivered.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: ID,
    pub telegram_id: i64,
    pub chat_id: i64,
    pub name: String,
    pub lastname: Option<String>,
    pub is_active: bool,
}

impl User {
    pub fn new(telegram_id: i64, chat_id: i64, name: String, lastname: Option<String>) -> Self {
        Self {
            id: 0,
            telegram_id,
            chat_id,
            name,
            lastname,
            is_active: true,
        }
    }

    pub fn display_name(&self) -> String {
        match &self.lastname {
            Some(lastname) => format!("{} {}", self.name, lastname),
            None => self.name.clone(),
        }
    }
}

impl Entity for User {
    fn id(&self) -> ID {
        self.id
    }
}
