use jollof_llm::{Content, Message};

#[test]
fn test_content_text_creation() {
    let content = Content::text("Heat the oil");
    assert_eq!(content.as_text().as_deref(), Some("Heat the oil"));
}

#[test]
fn test_content_from_string() {
    let content: Content = "Stir".into();
    assert_eq!(content.as_text().as_deref(), Some("Stir"));
}

#[test]
fn test_message_roles() {
    assert_eq!(Message::system("You are a cooking assistant").role(), "system");
    assert_eq!(Message::human("How long to boil rice?").role(), "user");
    assert_eq!(Message::ai("About 20 minutes").role(), "assistant");
}

#[test]
fn test_message_serialization_human() {
    let msg = Message::human("Hello");
    let json = serde_json::to_string(&msg).unwrap();
    assert!(json.contains("\"role\":\"user\""));
    assert!(json.contains("Hello"));
}

#[test]
fn test_message_deserialization() {
    let json = r#"{"role":"assistant","content":"Simmer for 10 minutes"}"#;
    let msg: Message = serde_json::from_str(json).unwrap();
    assert_eq!(msg.role(), "assistant");
    assert_eq!(msg.content().as_text().as_deref(), Some("Simmer for 10 minutes"));
}
