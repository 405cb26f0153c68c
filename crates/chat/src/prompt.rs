//! Generation prompt construction.
//!
//! Builds the ordered message list for one synthesis call: the
//! senior-advisor system instruction, a bounded suffix of prior turns,
//! and a single user message carrying the assembled context plus the
//! original query.

use crate::session::{ConversationTurn, TurnRole};
use mevzuat_llm::ChatMessage;

/// The advisor persona and formatting rules.
const SYSTEM_INSTRUCTION: &str = "Sen kıdemli bir avukat ve hukuk müşavirisin. \
     Sana verilen mevzuat parçalarını kullanarak profesyonel, gerekçeli ve kesin \
     cevaplar ver. Cevaplarında önemli kavramları **kalın** yaz ve gerektiğinde \
     liste kullan. Yalnızca gerçekten yararlandığın kaynaklara atıf yap. \
     Verilen parçalarda bulunmayan bilgiyi uydurma.";

/// Appended when more than one partition was searched.
const FOCUS_INSTRUCTION: &str = "Bağlamda birden fazla hukuk alanından parçalar \
     bulunuyor. Soruya en uygun alanı belirle ve yalnızca o alanın parçalarını \
     kullan; diğer alanlardan gelen parçaları yok say.";

/// Build the message list for a synthesis request.
///
/// `history` is the bounded suffix of prior turns; it must not include
/// the query being answered, which is carried in the final user
/// message together with the context.
pub fn build_messages(
    query: &str,
    context: &str,
    history: &[ConversationTurn],
    multi_partition: bool,
) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);

    let system = if multi_partition {
        format!("{}\n\n{}", SYSTEM_INSTRUCTION, FOCUS_INSTRUCTION)
    } else {
        SYSTEM_INSTRUCTION.to_string()
    };
    messages.push(ChatMessage::system(system));

    for turn in history {
        messages.push(match turn.role {
            TurnRole::User => ChatMessage::user(turn.content.clone()),
            TurnRole::Assistant => ChatMessage::assistant(turn.content.clone()),
        });
    }

    messages.push(ChatMessage::user(format!(
        "Bağlam:\n{}\n\nSoru: {}",
        context, query
    )));

    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use mevzuat_llm::Role;

    fn turn(role: TurnRole, content: &str) -> ConversationTurn {
        ConversationTurn {
            role,
            content: content.to_string(),
            partition_badge: None,
        }
    }

    #[test]
    fn test_message_order() {
        let history = vec![
            turn(TurnRole::User, "önceki soru"),
            turn(TurnRole::Assistant, "önceki cevap"),
        ];

        let messages = build_messages("yeni soru", "bağlam metni", &history, false);

        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[1].role, Role::User);
        assert_eq!(messages[2].role, Role::Assistant);
        assert_eq!(messages[3].role, Role::User);
        assert!(messages[3].content.contains("bağlam metni"));
        assert!(messages[3].content.contains("Soru: yeni soru"));
    }

    #[test]
    fn test_focus_instruction_only_on_fan_out() {
        let single = build_messages("soru", "bağlam", &[], false);
        let multi = build_messages("soru", "bağlam", &[], true);

        assert!(!single[0].content.contains("yok say"));
        assert!(multi[0].content.contains("yok say"));
        assert!(multi[0].content.contains("kıdemli bir avukat"));
    }

    #[test]
    fn test_empty_history() {
        let messages = build_messages("soru", "bağlam", &[], false);
        assert_eq!(messages.len(), 2);
    }
}
