use serde::{Deserialize, Serialize};

/// Ответ ассистента. Ошибки провайдера сюда не попадают: вместо них приходит текст-извинение.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
}
