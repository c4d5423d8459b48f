//! Drives the interactive loop end to end with scripted input, a scripted
//! completion service and an in-memory renderer.

use std::collections::VecDeque;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use attache::chat::{BufferRenderer, ChatConfig, ChatSession, Input, LineReader, PROMPT, run};
use attache::{Completion, CompletionFailure, CompletionService, Error, Message, Usage};

type Reply = Result<Completion, CompletionFailure>;

#[derive(Clone, Default)]
struct ScriptedService {
    replies: Arc<Mutex<VecDeque<Reply>>>,
    submissions: Arc<Mutex<Vec<Vec<Message>>>>,
}

impl ScriptedService {
    fn reply(self, text: &str, usage: Usage) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Ok(Completion::new(text, usage)));
        self
    }

    fn fail(self, failure: CompletionFailure) -> Self {
        self.replies.lock().unwrap().push_back(Err(failure));
        self
    }

    fn submissions(&self) -> Vec<Vec<Message>> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl CompletionService for ScriptedService {
    async fn complete(&self, _model: &str, messages: &[Message]) -> Reply {
        self.submissions.lock().unwrap().push(messages.to_vec());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::empty_response("script exhausted").into()))
    }
}

/// Replays canned input and counts how many prompts were shown.
struct ScriptedReader {
    inputs: VecDeque<Result<Input, Error>>,
    prompts: usize,
}

impl ScriptedReader {
    fn lines(lines: &[&str]) -> Self {
        Self::new(
            lines
                .iter()
                .map(|line| Ok(Input::Line(line.to_string())))
                .collect(),
        )
    }

    fn new(inputs: Vec<Result<Input, Error>>) -> Self {
        Self {
            inputs: inputs.into(),
            prompts: 0,
        }
    }
}

impl LineReader for ScriptedReader {
    fn read_line(&mut self, prompt: &str) -> Result<Input, Error> {
        assert_eq!(prompt, PROMPT);
        self.prompts += 1;
        self.inputs.pop_front().unwrap_or(Ok(Input::Eof))
    }
}

fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> String {
    let path = dir.join(name);
    std::fs::File::create(&path)
        .unwrap()
        .write_all(bytes)
        .unwrap();
    path.to_string_lossy().into_owned()
}

async fn drive(
    service: ScriptedService,
    reader: &mut ScriptedReader,
) -> (ChatSession<ScriptedService>, BufferRenderer) {
    let mut session = ChatSession::new(service, ChatConfig::default());
    let mut renderer = BufferRenderer::new();
    run(&mut session, reader, &mut renderer).await;
    (session, renderer)
}

#[tokio::test]
async fn hello_turn_prints_reply_and_usage() {
    let service = ScriptedService::default().reply("Hi there", Usage::new(5, 3, 8));
    let mut reader = ScriptedReader::lines(&["Hello", "/quit"]);
    let (session, renderer) = drive(service, &mut reader).await;

    assert_eq!(
        session.log().snapshot(),
        &[Message::user("Hello"), Message::assistant("Hi there")]
    );
    assert!(renderer.contains("Assistant: Hi there"));
    assert!(renderer.contains("|-> Token usage - Prompt: 5, Completion: 3, Total: 8"));
}

#[tokio::test]
async fn quit_stops_prompting() {
    let service = ScriptedService::default();
    let mut reader = ScriptedReader::lines(&["/quit", "never read", "/list"]);
    let (session, renderer) = drive(service.clone(), &mut reader).await;

    assert_eq!(reader.prompts, 1);
    assert_eq!(reader.inputs.len(), 2);
    assert_eq!(renderer.lines().last().map(String::as_str), Some("Goodbye!"));
    assert_eq!(session.message_count(), 0);
    assert!(service.submissions().is_empty());
}

#[tokio::test]
async fn list_without_attachments_is_explicit() {
    let mut reader = ScriptedReader::lines(&["/list", "/quit"]);
    let (_, renderer) = drive(ScriptedService::default(), &mut reader).await;
    assert_eq!(renderer.lines()[0], "No attachments in context");
}

#[tokio::test]
async fn attachments_interleaved_with_chat() {
    let dir = tempfile::tempdir().unwrap();
    let notes = write_file(dir.path(), "notes.txt", b"abc");
    let png_bytes = b"\x89PNG\x0D\x0A\x1A\x0A\x00\x00\x00\x0DIHDR\x00\x01";
    let image = write_file(dir.path(), "image.png", png_bytes);
    let blob = write_file(dir.path(), "blob", b"\x00\xFF\x10");

    let service = ScriptedService::default()
        .reply("noted", Usage::new(10, 1, 11))
        .reply("a picture", Usage::new(20, 2, 22));
    let attach_notes = format!("/attach {notes}");
    let attach_image = format!("/attach {image}");
    let attach_blob = format!("/attach {blob}");
    let mut reader = ScriptedReader::lines(&[
        &attach_notes,
        "what did I send?",
        &attach_image,
        &attach_blob,
        "and now?",
        "/list",
        "/quit",
    ]);
    let (session, renderer) = drive(service.clone(), &mut reader).await;

    let registry = session.attachments();
    assert_eq!(registry.len(), 3);
    let names: Vec<_> = registry.iter().map(|a| a.filename().to_string()).collect();
    assert_eq!(names, vec![notes.clone(), image.clone(), blob.clone()]);
    let types: Vec<_> = registry.iter().map(|a| a.media_type().to_string()).collect();
    assert_eq!(
        types,
        vec!["text/plain", "image/png", "application/octet-stream"]
    );

    // Three attachment messages plus two user turns and two replies.
    assert_eq!(session.message_count(), 7);
    let log = session.log().snapshot();
    assert_eq!(log[0], Message::user("File content (text/plain):\nabc"));
    assert_eq!(
        log[3],
        Message::user(format!(
            "File content (image/png):\n{}",
            STANDARD.encode(png_bytes)
        ))
    );
    assert_eq!(log[4], Message::user("File content (application/octet-stream):\nAP8Q"));

    let submissions = service.submissions();
    assert_eq!(submissions.len(), 2);
    assert_eq!(submissions[0].len(), 2);
    assert_eq!(submissions[1], log[..6].to_vec());

    assert!(renderer.contains(&format!("File attached: {notes}")));
    assert!(renderer.contains("Active attachments:"));
    assert!(renderer.contains(&format!("1. {notes} (text/plain) - added ")));
    assert!(renderer.contains(&format!("3. {blob} (application/octet-stream) - added ")));
}

#[tokio::test]
async fn unreadable_attachment_changes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.txt");
    let line = format!("/attach {}", missing.display());
    let mut reader = ScriptedReader::lines(&[&line, "/attach", "/list", "/quit"]);
    let (session, renderer) = drive(ScriptedService::default(), &mut reader).await;

    assert_eq!(session.message_count(), 0);
    assert!(session.attachments().is_empty());
    assert!(renderer.contains("error: Error reading file: failed to read file"));
    assert!(renderer.contains("error: /attach requires a file path"));
    assert!(renderer.contains("No attachments in context"));
}

#[tokio::test]
async fn failed_turn_keeps_user_message() {
    let service = ScriptedService::default()
        .fail(CompletionFailure::with_usage(
            Error::empty_response("the service returned no choices"),
            Usage::new(12, 0, 12),
        ))
        .reply("sorry about that", Usage::new(14, 4, 18));
    let mut reader = ScriptedReader::lines(&["Hello", "Hello", "/quit"]);
    let (session, renderer) = drive(service.clone(), &mut reader).await;

    assert!(renderer.contains("error: Error getting response: Empty response"));
    assert!(renderer.contains(
        "|-> Token usage (in error case) - Prompt: 12, Completion: 0, Total: 12"
    ));

    let submissions = service.submissions();
    assert_eq!(submissions[0], vec![Message::user("Hello")]);
    assert_eq!(
        submissions[1],
        vec![Message::user("Hello"), Message::user("Hello")]
    );
    assert_eq!(
        session.log().snapshot(),
        &[
            Message::user("Hello"),
            Message::user("Hello"),
            Message::assistant("sorry about that"),
        ]
    );
    let stats = session.stats();
    assert_eq!(stats.failed_requests, 1);
    assert_eq!(stats.total_requests, 1);
    assert_eq!(stats.total_usage, Usage::new(26, 4, 30));
}

#[tokio::test]
async fn failure_without_counters_reports_zeros() {
    let service =
        ScriptedService::default().fail(Error::authentication("invalid api key").into());
    let mut reader = ScriptedReader::lines(&["Hello", "/quit"]);
    let (session, renderer) = drive(service, &mut reader).await;

    assert!(renderer.contains("Authentication error: invalid api key"));
    assert!(renderer.contains(
        "|-> Token usage (in error case) - Prompt: 0, Completion: 0, Total: 0"
    ));
    assert_eq!(session.message_count(), 1);
}

#[tokio::test]
async fn read_errors_and_interrupts_do_not_end_the_session() {
    let service = ScriptedService::default().reply("still here", Usage::new(1, 1, 2));
    let mut reader = ScriptedReader::new(vec![
        Err(Error::input("terminal went away")),
        Ok(Input::Interrupted),
        Ok(Input::Line("   ".to_string())),
        Ok(Input::Line("ping".to_string())),
        Ok(Input::Eof),
    ]);
    let (session, renderer) = drive(service, &mut reader).await;

    assert_eq!(reader.prompts, 5);
    assert!(renderer.contains("error: Error reading input: Input error: terminal went away"));
    assert_eq!(
        session.log().snapshot(),
        &[Message::user("ping"), Message::assistant("still here")]
    );
    assert_eq!(renderer.lines().last().map(String::as_str), Some("Goodbye!"));
}

#[tokio::test]
async fn unknown_slash_words_are_chat_turns() {
    let service = ScriptedService::default().reply("that is not a command", Usage::default());
    let mut reader = ScriptedReader::lines(&["/summarize", "/quit"]);
    let (session, _) = drive(service, &mut reader).await;
    assert_eq!(session.log().snapshot()[0], Message::user("/summarize"));
}

#[tokio::test]
async fn stats_and_help() {
    let service = ScriptedService::default().reply("ok", Usage::new(2, 1, 3));
    let mut reader = ScriptedReader::lines(&["hi", "/stats", "/help", "/quit"]);
    let (session, renderer) = drive(service, &mut reader).await;

    assert_eq!(session.message_count(), 2);
    assert!(renderer.contains("Messages: 2"));
    assert!(renderer.contains("Attachments: 0"));
    assert!(renderer.contains("Requests: 1 ok / 0 failed"));
    assert!(renderer.contains("/attach <filepath> - Upload a file for context"));
}
