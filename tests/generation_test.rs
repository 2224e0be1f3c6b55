//! Generation client tests against canned completion backends.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use game_master::{
    CompletionBackend, CredentialHook, GameKind, GameRoute, GenerationErrorKind, Generator,
    LlmError, QUIZ_BANK_SIZE,
};

/// Backend that returns the same answer every time and counts calls.
struct CannedBackend {
    reply: Result<String, String>,
    calls: AtomicUsize,
    last_prompt: std::sync::Mutex<String>,
}

impl CannedBackend {
    fn ok(body: impl Into<String>) -> Self {
        Self {
            reply: Ok(body.into()),
            calls: AtomicUsize::new(0),
            last_prompt: std::sync::Mutex::new(String::new()),
        }
    }

    fn err(message: impl Into<String>) -> Self {
        Self {
            reply: Err(message.into()),
            calls: AtomicUsize::new(0),
            last_prompt: std::sync::Mutex::new(String::new()),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionBackend for CannedBackend {
    async fn complete_json(&self, prompt: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = prompt.to_string();
        self.reply.clone().map_err(LlmError::new)
    }
}

#[derive(Default)]
struct CountingHook {
    fired: AtomicUsize,
}

impl CredentialHook for CountingHook {
    fn reselect_credential(&self) {
        self.fired.fetch_add(1, Ordering::SeqCst);
    }
}

fn quiz_body(questions: usize) -> String {
    let items: Vec<serde_json::Value> = (0..questions)
        .map(|i| {
            serde_json::json!({
                "id": format!("q{}", i + 1),
                "text": format!("Câu hỏi số {}?", i + 1),
                "options": ["A", "B", "C", "D"],
                "answer": "B",
                "explanation": "Vì B đúng."
            })
        })
        .collect();
    serde_json::json!({
        "type": "RUNG_CHUONG_VANG",
        "title": "Hệ Mặt Trời",
        "reason": "Nội dung có nhiều sự kiện để hỏi đáp.",
        "items": items
    })
    .to_string()
}

#[tokio::test]
async fn test_quiz_generation_keeps_fifty_questions() {
    let generator = Generator::new(CannedBackend::ok(quiz_body(QUIZ_BANK_SIZE)));

    let game = generator
        .generate("Trái Đất quay quanh Mặt Trời.")
        .await
        .expect("valid body");

    assert_eq!(game.kind(), &GameKind::RungChuongVang);
    assert_eq!(game.route(), GameRoute::QuizShow);
    assert_eq!(game.items().questions().len(), QUIZ_BANK_SIZE);
    for question in game.items().questions() {
        assert_eq!(question.options().len(), 4);
        assert!(question.options().contains(question.answer()));
    }
    assert_eq!(generator.backend().calls(), 1);
    assert!(
        generator
            .backend()
            .last_prompt
            .lock()
            .unwrap()
            .contains("Trái Đất quay quanh Mặt Trời.")
    );
}

#[tokio::test]
async fn test_memory_generation_routes_to_memory() {
    let body = r#"```json
{"type":"MEMORY","title":"Tiếng Anh","reason":"Từ vựng ghép cặp","items":[
  {"id":"p1","left":"Cat","right":"Con mèo"},
  {"id":"p2","left":"Dog","right":"Con chó"}
]}
```"#;
    let generator = Generator::new(CannedBackend::ok(body));
    let game = generator.generate("cat, dog").await.expect("valid body");

    assert_eq!(game.route(), GameRoute::MemoryMatch);
    assert_eq!(game.items().pairs().len(), 2);
}

#[tokio::test]
async fn test_empty_input_never_calls_backend() {
    let generator = Generator::new(CannedBackend::ok(quiz_body(1)));

    let err = generator.generate("  \n\t ").await.expect_err("blank input");
    assert_eq!(err.kind, GenerationErrorKind::EmptyInput);
    assert_eq!(generator.backend().calls(), 0);
}

#[tokio::test]
async fn test_credential_error_fires_hook_once() {
    let hook = Arc::new(CountingHook::default());
    let generator = Generator::new(CannedBackend::err(
        "API key not valid. Please pass a valid API key.",
    ))
    .with_credential_hook(hook.clone());

    let err = generator.generate("Bài học").await.expect_err("service error");

    assert_eq!(err.kind, GenerationErrorKind::Service);
    assert!(err.message.contains("API key not valid"));
    assert_eq!(hook.fired.load(Ordering::SeqCst), 1);
    assert_eq!(generator.backend().calls(), 1, "no retry");
}

#[tokio::test]
async fn test_entity_not_found_fires_hook() {
    let hook = Arc::new(CountingHook::default());
    let generator = Generator::new(CannedBackend::err("Requested entity was not found."))
        .with_credential_hook(hook.clone());

    generator.generate("Bài học").await.expect_err("service error");
    assert_eq!(hook.fired.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_other_service_error_does_not_fire_hook() {
    let hook = Arc::new(CountingHook::default());
    let generator = Generator::new(CannedBackend::err("503 Service Unavailable"))
        .with_credential_hook(hook.clone());

    let err = generator.generate("Bài học").await.expect_err("service error");
    assert_eq!(err.kind, GenerationErrorKind::Service);
    assert!(!err.is_credential_failure());
    assert_eq!(hook.fired.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_credential_error_without_hook_still_fails() {
    let generator = Generator::new(CannedBackend::err("API key missing"));
    let err = generator.generate("Bài học").await.expect_err("service error");
    assert!(err.is_credential_failure());
}

#[tokio::test]
async fn test_non_json_body_is_parse_error() {
    let hook = Arc::new(CountingHook::default());
    let generator = Generator::new(CannedBackend::ok("Xin lỗi, tôi không thể giúp."))
        .with_credential_hook(hook.clone());

    let err = generator.generate("Bài học").await.expect_err("parse error");
    assert_eq!(err.kind, GenerationErrorKind::Parse);
    assert_eq!(hook.fired.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_empty_body_is_parse_error() {
    let generator = Generator::new(CannedBackend::ok(""));
    let err = generator.generate("Bài học").await.expect_err("parse error");
    assert_eq!(err.kind, GenerationErrorKind::Parse);
}

#[tokio::test]
async fn test_unknown_type_is_accepted_as_quiz() {
    let body = r#"{"type":"CROSSWORD","title":"Ô chữ","reason":"thử","items":[
        {"id":"q1","text":"1 + 1?","options":["1","2","3","4"],"answer":"2"}]}"#;
    let generator = Generator::new(CannedBackend::ok(body));

    let game = generator.generate("Toán").await.expect("accepted");
    assert_eq!(game.kind(), &GameKind::Unrecognized("CROSSWORD".to_string()));
    assert_eq!(game.route(), GameRoute::QuizShow);
    assert_eq!(game.items().questions().len(), 1);
}
