use std::fmt::Display;
use std::sync::Arc;

use super::gate::{AccessForm, GateError, View};
use super::transcript::{Role, Transcript};
use crate::api::{ApiError, BackendClient, ChatReply};
use crate::assessment::{ScoreMap, ScoreRow, render_report, score_rows};
use crate::avatar::{Avatar, AvatarError, AvatarMount, AvatarOptions, SharedMount};
use crate::speech::{Recognition, SpeechConfig, SpeechInput};

pub const NO_SESSION_HINT: &str = "Start a session first.";
pub const SPEECH_CONFIG_MISSING: &str = "Speech config missing. Check backend /config env.";
pub const AVATAR_READY: &str = "Avatar initialized. I will speak responses.";
pub const RECOGNITION_UNAVAILABLE: &str = "Speech recognition is not available.";
pub const LISTENING: &str = "Listening… speak now.";
pub const NOT_HEARD: &str = "I didn't catch that. Try again.";

/// Voice and persona used when bringing the avatar up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarPreferences {
    pub voice: String,
    pub character: String,
    pub style: String,
}

/// Mutable state owned by the controller for the lifetime of the app.
#[derive(Debug, Default)]
pub struct AppState {
    /// Set once the backend has issued a session.
    pub session_id: Option<String>,
    /// Present only when both key and region are known.
    pub speech: Option<SpeechConfig>,
    pub view: View,
}

/// Everything the terminal renders.
#[derive(Debug)]
pub struct Screen {
    pub landing_error: Option<String>,
    pub transcript: Transcript,
    pub scores: Vec<ScoreRow>,
    pub report: Option<String>,
    pub mount: SharedMount,
}

impl Default for Screen {
    fn default() -> Self {
        Self {
            landing_error: None,
            transcript: Transcript::default(),
            scores: score_rows(&ScoreMap::new()),
            report: None,
            mount: AvatarMount::shared(),
        }
    }
}

/// Drives the assessment conversation.
///
/// Backend calls that the conversation depends on return errors to the
/// caller. Speech, avatar and config calls are best-effort: their failures
/// are logged here and never abort the surrounding action.
pub struct ChatController {
    backend: BackendClient,
    avatar: Box<dyn Avatar>,
    speech_input: Option<Arc<dyn SpeechInput>>,
    preferences: AvatarPreferences,
    state: AppState,
    screen: Screen,
}

impl ChatController {
    pub fn new(
        backend: BackendClient,
        avatar: Box<dyn Avatar>,
        speech_input: Option<Arc<dyn SpeechInput>>,
        preferences: AvatarPreferences,
    ) -> Self {
        Self {
            backend,
            avatar,
            speech_input,
            preferences,
            state: AppState::default(),
            screen: Screen::default(),
        }
    }

    pub const fn state(&self) -> &AppState {
        &self.state
    }

    pub const fn screen(&self) -> &Screen {
        &self.screen
    }

    pub const fn backend(&self) -> &BackendClient {
        &self.backend
    }

    fn say(&mut self, text: impl Into<String>) {
        self.screen.transcript.push(Role::Assistant, text);
    }

    /// Reads `/config`, updating the backend URL and speech credentials.
    ///
    /// On failure nothing changes.
    pub async fn load_config(&mut self) -> Result<(), ApiError> {
        let remote = self.backend.fetch_config().await?;

        if let Some(url) = remote.backend_url.as_deref().filter(|u| !u.trim().is_empty()) {
            self.backend.set_base_url(url);
        }
        self.state.speech =
            SpeechConfig::from_parts(remote.speech_key.as_deref(), remote.speech_region.as_deref());
        tracing::debug!(
            backend = %self.backend.base_url(),
            speech = self.state.speech.is_some(),
            "loaded backend config"
        );
        Ok(())
    }

    async fn ensure_speech_config(&mut self) -> Option<SpeechConfig> {
        if self.state.speech.is_none()
            && let Err(err) = self.load_config().await
        {
            tracing::warn!(error = %err, "failed to load config");
        }
        self.state.speech.clone()
    }

    pub async fn verify_access(&self, password: &str) -> bool {
        self.backend.verify_access(password).await
    }

    /// Landing gate. On success switches to the app view; on failure sets
    /// the inline error and changes nothing else.
    pub async fn handle_enter(&mut self, form: &AccessForm) -> Result<(), GateError> {
        self.screen.landing_error = None;

        let outcome = match form.validate() {
            Ok(password) => {
                if self.verify_access(password).await {
                    Ok(())
                } else {
                    Err(GateError::InvalidPassword)
                }
            }
            Err(err) => Err(err),
        };

        match outcome {
            Ok(()) => {
                self.state.view = View::App;
                Ok(())
            }
            Err(err) => {
                self.screen.landing_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Brings the avatar up with the cached speech credentials.
    pub async fn init_avatar(&mut self) -> Result<(), AvatarError> {
        let Some(speech) = self.ensure_speech_config().await else {
            self.say(SPEECH_CONFIG_MISSING);
            return Ok(());
        };

        let options = AvatarOptions::new(speech, Arc::clone(&self.screen.mount))
            .with_voice(self.preferences.voice.clone())
            .with_persona(
                self.preferences.character.clone(),
                self.preferences.style.clone(),
            );
        self.avatar.init(options).await?;
        self.say(AVATAR_READY);
        Ok(())
    }

    async fn speak(&mut self, text: &str) {
        if let Err(err) = self.avatar.speak(text).await {
            tracing::debug!(error = %err, "avatar speech skipped");
        }
    }

    /// Starts a backend session and shows its greeting.
    pub async fn start_session(&mut self) -> Result<(), ApiError> {
        match self.init_avatar().await {
            Ok(()) => {}
            Err(AvatarError::SdkUnavailable) => tracing::debug!("avatar disabled"),
            Err(err) => tracing::warn!(error = %err, "avatar unavailable, continuing without it"),
        }

        let start = self.backend.start_session().await?;
        self.state.session_id = Some(start.session_id);
        self.say(start.assistant_text.clone());
        self.speak(&start.assistant_text).await;
        Ok(())
    }

    /// Sends one user turn and renders the reply.
    pub async fn send_text(&mut self, text: &str) -> Result<(), ApiError> {
        let Some(session_id) = self.state.session_id.clone() else {
            self.say(NO_SESSION_HINT);
            return Ok(());
        };

        self.screen.transcript.push(Role::User, text);
        let reply = self.backend.chat(&session_id, text).await?;
        self.apply_reply(&reply);
        self.speak(&reply.assistant_text).await;
        Ok(())
    }

    fn apply_reply(&mut self, reply: &ChatReply) {
        self.say(reply.assistant_text.clone());
        self.screen.scores = score_rows(reply.scores.as_ref().unwrap_or(&ScoreMap::new()));
        if let Some(report) = &reply.report {
            self.screen.report = Some(render_report(report));
        }
    }

    /// Listens once and sends whatever was recognized.
    pub async fn start_stt(&mut self) -> Result<(), ApiError> {
        let Some(input) = self.speech_input.clone() else {
            self.say(RECOGNITION_UNAVAILABLE);
            return Ok(());
        };
        let Some(speech) = self.ensure_speech_config().await else {
            self.say(SPEECH_CONFIG_MISSING);
            return Ok(());
        };

        let mut recognizer = match input.recognizer(&speech) {
            Ok(recognizer) => recognizer,
            Err(err) => {
                tracing::warn!(error = %err, "could not create recognizer");
                self.say(NOT_HEARD);
                return Ok(());
            }
        };

        self.say(LISTENING);
        let recognition = match recognizer.recognize_once().await {
            Ok(recognition) => recognition,
            Err(err) => {
                tracing::warn!(error = %err, "speech recognition failed");
                Recognition::NoMatch
            }
        };

        let result = match recognition.text() {
            Some(text) => self.send_text(text).await,
            None => {
                self.say(NOT_HEARD);
                Ok(())
            }
        };
        recognizer.close();
        result
    }

    /// Shows a failed user action in the transcript.
    pub fn report_failure(&mut self, err: &dyn Display) {
        self.say(format!("Something went wrong: {err}"));
    }

    pub fn shutdown(&mut self) {
        self.avatar.close();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::assessment::PLACEHOLDER;
    use crate::avatar::AvatarState;
    use crate::speech::{Recognizer, SpeechError};
    use async_trait::async_trait;
    use mockito::{Matcher, Server};
    use parking_lot::Mutex;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct AvatarLog {
        inits: AtomicUsize,
        closes: AtomicUsize,
        spoken: Mutex<Vec<String>>,
    }

    struct FakeAvatar {
        log: Arc<AvatarLog>,
        init_fails: bool,
        speak_fails: bool,
        ready: bool,
    }

    #[async_trait]
    impl Avatar for FakeAvatar {
        async fn init(&mut self, _options: AvatarOptions) -> Result<(), AvatarError> {
            self.log.inits.fetch_add(1, Ordering::SeqCst);
            if self.init_fails {
                return Err(AvatarError::NoIceServer);
            }
            self.ready = true;
            Ok(())
        }

        async fn speak(&mut self, text: &str) -> Result<(), AvatarError> {
            if self.speak_fails || !self.ready {
                return Err(AvatarError::NotInitialized);
            }
            self.log.spoken.lock().push(text.to_string());
            Ok(())
        }

        fn close(&mut self) {
            self.log.closes.fetch_add(1, Ordering::SeqCst);
            self.ready = false;
        }

        fn state(&self) -> AvatarState {
            if self.ready {
                AvatarState::Ready
            } else {
                AvatarState::Uninitialized
            }
        }
    }

    /// `None` makes the capture step fail.
    struct FakeRecognizer {
        result: Option<Recognition>,
        closed: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Recognizer for FakeRecognizer {
        async fn recognize_once(&mut self) -> Result<Recognition, SpeechError> {
            self.result
                .clone()
                .ok_or_else(|| SpeechError::Capture("device busy".into()))
        }

        fn close(&mut self) {
            self.closed.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct FakeInput {
        result: Option<Recognition>,
        create_fails: bool,
        closed: Arc<AtomicUsize>,
    }

    impl FakeInput {
        fn new(result: Option<Recognition>, closed: &Arc<AtomicUsize>) -> Self {
            Self {
                result,
                create_fails: false,
                closed: Arc::clone(closed),
            }
        }
    }

    impl SpeechInput for FakeInput {
        fn recognizer(&self, _speech: &SpeechConfig) -> Result<Box<dyn Recognizer>, SpeechError> {
            if self.create_fails {
                return Err(SpeechError::Capture("no microphone".into()));
            }
            Ok(Box::new(FakeRecognizer {
                result: self.result.clone(),
                closed: Arc::clone(&self.closed),
            }))
        }
    }

    fn preferences() -> AvatarPreferences {
        AvatarPreferences {
            voice: "en-US-AvaMultilingualNeural".into(),
            character: "lisa".into(),
            style: "casual-sitting".into(),
        }
    }

    fn controller_with(
        url: &str,
        init_fails: bool,
        speak_fails: bool,
        input: Option<Arc<dyn SpeechInput>>,
    ) -> (ChatController, Arc<AvatarLog>) {
        let log = Arc::new(AvatarLog::default());
        let avatar = FakeAvatar {
            log: Arc::clone(&log),
            init_fails,
            speak_fails,
            ready: false,
        };
        let controller =
            ChatController::new(BackendClient::new(url), Box::new(avatar), input, preferences());
        (controller, log)
    }

    async fn mock_config(server: &mut Server) -> mockito::Mock {
        let body = json!({
            "backend_url": server.url(),
            "speech_key": "k",
            "speech_region": "r",
        });
        server
            .mock("GET", "/config")
            .with_body(body.to_string())
            .create_async()
            .await
    }

    fn texts(controller: &ChatController) -> Vec<(Role, String)> {
        controller
            .screen()
            .transcript
            .messages()
            .iter()
            .map(|m| (m.role, m.text.clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_send_without_session_makes_no_request() {
        let mut server = Server::new_async().await;
        let chat = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;
        let (mut controller, _) = controller_with(&server.url(), false, false, None);

        controller.send_text("hello").await.unwrap();

        chat.assert_async().await;
        assert_eq!(
            texts(&controller),
            vec![(Role::Assistant, NO_SESSION_HINT.to_string())]
        );
    }

    #[tokio::test]
    async fn test_start_session_shows_greeting() {
        let mut server = Server::new_async().await;
        mock_config(&mut server).await;
        let start = server
            .mock("POST", "/session/start")
            .match_body(Matcher::Json(json!({})))
            .with_body(r#"{"session_id":"s1","assistant_text":"Hi"}"#)
            .create_async()
            .await;
        // Avatar init fails: the chat must carry on without it.
        let (mut controller, log) = controller_with(&server.url(), true, false, None);

        controller.load_config().await.unwrap();
        controller.start_session().await.unwrap();

        start.assert_async().await;
        assert_eq!(log.inits.load(Ordering::SeqCst), 1);
        assert_eq!(controller.state().session_id.as_deref(), Some("s1"));
        assert_eq!(texts(&controller), vec![(Role::Assistant, "Hi".to_string())]);
    }

    #[tokio::test]
    async fn test_start_session_speaks_greeting_with_avatar() {
        let mut server = Server::new_async().await;
        mock_config(&mut server).await;
        server
            .mock("POST", "/session/start")
            .with_body(r#"{"session_id":"s1","assistant_text":"Hi"}"#)
            .create_async()
            .await;
        let (mut controller, log) = controller_with(&server.url(), false, false, None);

        controller.start_session().await.unwrap();

        assert_eq!(
            texts(&controller),
            vec![
                (Role::Assistant, AVATAR_READY.to_string()),
                (Role::Assistant, "Hi".to_string()),
            ]
        );
        assert_eq!(*log.spoken.lock(), vec!["Hi".to_string()]);
    }

    #[tokio::test]
    async fn test_start_session_without_speech_config() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/config")
            .with_body(r#"{"speech_key":"","speech_region":"r"}"#)
            .create_async()
            .await;
        server
            .mock("POST", "/session/start")
            .with_body(r#"{"session_id":"s1","assistant_text":"Hi"}"#)
            .create_async()
            .await;
        let (mut controller, log) = controller_with(&server.url(), false, false, None);

        controller.start_session().await.unwrap();

        assert_eq!(log.inits.load(Ordering::SeqCst), 0);
        assert_eq!(
            texts(&controller),
            vec![
                (Role::Assistant, SPEECH_CONFIG_MISSING.to_string()),
                (Role::Assistant, "Hi".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_send_text_renders_reply_and_scores() {
        let mut server = Server::new_async().await;
        mock_config(&mut server).await;
        server
            .mock("POST", "/session/start")
            .with_body(r#"{"session_id":"s1","assistant_text":"Hi"}"#)
            .create_async()
            .await;
        let chat = server
            .mock("POST", "/session/s1/chat")
            .match_body(Matcher::Json(json!({ "user_text": "I use AI daily" })))
            .with_body(r#"{"assistant_text":"Noted","scores":{"A":2}}"#)
            .create_async()
            .await;
        let (mut controller, log) = controller_with(&server.url(), false, false, None);
        controller.start_session().await.unwrap();
        let before = controller.screen().transcript.len();

        controller.send_text("I use AI daily").await.unwrap();

        chat.assert_async().await;
        let added: Vec<_> = controller.screen().transcript.since(before).to_vec();
        assert_eq!(added.len(), 2);
        assert_eq!((added[0].role, added[0].text.as_str()), (Role::User, "I use AI daily"));
        assert_eq!((added[1].role, added[1].text.as_str()), (Role::Assistant, "Noted"));

        let scores = &controller.screen().scores;
        assert_eq!(scores.len(), 7);
        assert_eq!(scores[0].value, "2 · Practicing with checks");
        assert!(scores[1..].iter().all(|row| row.value == PLACEHOLDER));
        assert!(controller.screen().report.is_none());
        assert_eq!(log.spoken.lock().last().map(String::as_str), Some("Noted"));
    }

    #[tokio::test]
    async fn test_each_reply_replaces_whole_score_table() {
        let mut server = Server::new_async().await;
        mock_config(&mut server).await;
        server
            .mock("POST", "/session/start")
            .with_body(r#"{"session_id":"s1","assistant_text":"Hi"}"#)
            .create_async()
            .await;
        server
            .mock("POST", "/session/s1/chat")
            .match_body(Matcher::Json(json!({ "user_text": "first" })))
            .with_body(r#"{"assistant_text":"ok","scores":{"A":2,"B":1}}"#)
            .create_async()
            .await;
        server
            .mock("POST", "/session/s1/chat")
            .match_body(Matcher::Json(json!({ "user_text": "second" })))
            .with_body(r#"{"assistant_text":"ok","report":{"overall":"developing"}}"#)
            .create_async()
            .await;
        let (mut controller, _) = controller_with(&server.url(), false, false, None);
        controller.start_session().await.unwrap();

        controller.send_text("first").await.unwrap();
        assert_eq!(controller.screen().scores[1].value, "1 · Aware / basic");

        controller.send_text("second").await.unwrap();
        assert!(
            controller
                .screen()
                .scores
                .iter()
                .all(|row| row.value == PLACEHOLDER)
        );
        assert_eq!(
            controller.screen().report.as_deref(),
            Some("{\n  \"overall\": \"developing\"\n}")
        );
    }

    #[tokio::test]
    async fn test_report_kept_when_reply_has_none() {
        let mut server = Server::new_async().await;
        mock_config(&mut server).await;
        server
            .mock("POST", "/session/start")
            .with_body(r#"{"session_id":"s1","assistant_text":"Hi"}"#)
            .create_async()
            .await;
        server
            .mock("POST", "/session/s1/chat")
            .match_body(Matcher::Json(json!({ "user_text": "done" })))
            .with_body(r#"{"assistant_text":"Here is your report","report":{"level":2}}"#)
            .create_async()
            .await;
        server
            .mock("POST", "/session/s1/chat")
            .match_body(Matcher::Json(json!({ "user_text": "thanks" })))
            .with_body(r#"{"assistant_text":"You're welcome"}"#)
            .create_async()
            .await;
        let (mut controller, _) = controller_with(&server.url(), false, false, None);
        controller.start_session().await.unwrap();

        controller.send_text("done").await.unwrap();
        controller.send_text("thanks").await.unwrap();

        assert_eq!(
            controller.screen().report.as_deref(),
            Some("{\n  \"level\": 2\n}")
        );
    }

    #[tokio::test]
    async fn test_chat_error_keeps_user_message() {
        let mut server = Server::new_async().await;
        mock_config(&mut server).await;
        server
            .mock("POST", "/session/start")
            .with_body(r#"{"session_id":"s1","assistant_text":"Hi"}"#)
            .create_async()
            .await;
        server
            .mock("POST", "/session/s1/chat")
            .with_status(500)
            .with_body("model overloaded")
            .create_async()
            .await;
        let (mut controller, _) = controller_with(&server.url(), true, false, None);
        controller.start_session().await.unwrap();

        let err = controller.send_text("hello").await.unwrap_err();

        assert_eq!(err.status().map(|s| s.as_u16()), Some(500));
        assert_eq!(err.body(), Some("model overloaded"));
        let last = controller.screen().transcript.messages().last().unwrap();
        assert_eq!((last.role, last.text.as_str()), (Role::User, "hello"));

        controller.report_failure(&err);
        let last = controller.screen().transcript.messages().last().unwrap();
        assert_eq!(last.role, Role::Assistant);
        assert!(last.text.contains("500"));
    }

    #[tokio::test]
    async fn test_speech_failure_does_not_break_chat() {
        let mut server = Server::new_async().await;
        mock_config(&mut server).await;
        server
            .mock("POST", "/session/start")
            .with_body(r#"{"session_id":"s1","assistant_text":"Hi"}"#)
            .create_async()
            .await;
        server
            .mock("POST", "/session/s1/chat")
            .with_body(r#"{"assistant_text":"Noted"}"#)
            .create_async()
            .await;
        let (mut controller, _) = controller_with(&server.url(), false, true, None);

        controller.start_session().await.unwrap();
        controller.send_text("hello").await.unwrap();

        let last = controller.screen().transcript.messages().last().unwrap();
        assert_eq!(last.text, "Noted");
    }

    #[tokio::test]
    async fn test_handle_enter_without_consent_never_verifies() {
        let mut server = Server::new_async().await;
        let verify = server
            .mock("POST", "/auth/verify")
            .expect(0)
            .create_async()
            .await;
        let (mut controller, _) = controller_with(&server.url(), false, false, None);

        let form = AccessForm {
            consent: false,
            password: "open-sesame".into(),
        };
        assert_eq!(
            controller.handle_enter(&form).await,
            Err(GateError::ConsentRequired)
        );

        verify.assert_async().await;
        assert_eq!(controller.state().view, View::Landing);
        assert_eq!(
            controller.screen().landing_error.as_deref(),
            Some("Please accept the guidelines to proceed.")
        );
    }

    #[tokio::test]
    async fn test_handle_enter_empty_password_never_verifies() {
        let mut server = Server::new_async().await;
        let verify = server
            .mock("POST", "/auth/verify")
            .expect(0)
            .create_async()
            .await;
        let (mut controller, _) = controller_with(&server.url(), false, false, None);

        let form = AccessForm {
            consent: true,
            password: "  ".into(),
        };
        assert_eq!(
            controller.handle_enter(&form).await,
            Err(GateError::PasswordRequired)
        );
        verify.assert_async().await;
        assert_eq!(
            controller.screen().landing_error.as_deref(),
            Some("Enter the access password.")
        );
    }

    #[tokio::test]
    async fn test_handle_enter_wrong_password_stays_on_landing() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/auth/verify")
            .with_body(r#"{"ok":false}"#)
            .create_async()
            .await;
        let (mut controller, _) = controller_with(&server.url(), false, false, None);

        let form = AccessForm {
            consent: true,
            password: "guess".into(),
        };
        assert_eq!(
            controller.handle_enter(&form).await,
            Err(GateError::InvalidPassword)
        );
        assert_eq!(controller.state().view, View::Landing);
        assert_eq!(
            controller.screen().landing_error.as_deref(),
            Some("Invalid password.")
        );
    }

    #[tokio::test]
    async fn test_handle_enter_correct_password_opens_app() {
        let mut server = Server::new_async().await;
        let verify = server
            .mock("POST", "/auth/verify")
            .match_body(Matcher::Json(json!({ "password": "open-sesame" })))
            .with_body(r#"{"ok":true}"#)
            .expect(1)
            .create_async()
            .await;
        let (mut controller, _) = controller_with(&server.url(), false, false, None);

        let wrong = AccessForm {
            consent: false,
            password: String::new(),
        };
        let _ = controller.handle_enter(&wrong).await;
        assert!(controller.screen().landing_error.is_some());

        let form = AccessForm {
            consent: true,
            password: " open-sesame ".into(),
        };
        controller.handle_enter(&form).await.unwrap();

        verify.assert_async().await;
        assert_eq!(controller.state().view, View::App);
        assert!(controller.screen().landing_error.is_none());
    }

    #[tokio::test]
    async fn test_load_config_failure_keeps_defaults() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/config")
            .with_status(503)
            .create_async()
            .await;
        let (mut controller, _) = controller_with(&server.url(), false, false, None);

        assert!(controller.load_config().await.is_err());
        assert_eq!(controller.backend().base_url(), server.url());
        assert!(controller.state().speech.is_none());
    }

    #[tokio::test]
    async fn test_load_config_switches_backend() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/config")
            .with_body(r#"{"backend_url":"http://x/","speech_key":"k","speech_region":"r"}"#)
            .create_async()
            .await;
        let (mut controller, _) = controller_with(&server.url(), false, false, None);

        controller.load_config().await.unwrap();

        assert_eq!(controller.backend().base_url(), "http://x");
        let speech = controller.state().speech.as_ref().unwrap();
        assert_eq!((speech.key(), speech.region()), ("k", "r"));
    }

    #[tokio::test]
    async fn test_stt_without_speech_input() {
        let server = Server::new_async().await;
        let (mut controller, _) = controller_with(&server.url(), false, false, None);

        controller.start_stt().await.unwrap();

        assert_eq!(
            texts(&controller),
            vec![(Role::Assistant, RECOGNITION_UNAVAILABLE.to_string())]
        );
    }

    #[tokio::test]
    async fn test_stt_forwards_recognized_text_and_closes() {
        let mut server = Server::new_async().await;
        mock_config(&mut server).await;
        server
            .mock("POST", "/session/start")
            .with_body(r#"{"session_id":"s1","assistant_text":"Hi"}"#)
            .create_async()
            .await;
        let chat = server
            .mock("POST", "/session/s1/chat")
            .match_body(Matcher::Json(json!({ "user_text": "I review outputs" })))
            .with_body(r#"{"assistant_text":"Good practice"}"#)
            .create_async()
            .await;
        let closed = Arc::new(AtomicUsize::new(0));
        let input: Arc<dyn SpeechInput> = Arc::new(FakeInput::new(
            Some(Recognition::Recognized("I review outputs".into())),
            &closed,
        ));
        let (mut controller, _) = controller_with(&server.url(), false, false, Some(input));
        controller.start_session().await.unwrap();

        controller.start_stt().await.unwrap();

        chat.assert_async().await;
        assert_eq!(closed.load(Ordering::SeqCst), 1);
        let tail: Vec<_> = texts(&controller).into_iter().rev().take(3).collect();
        assert_eq!(tail[0], (Role::Assistant, "Good practice".to_string()));
        assert_eq!(tail[1], (Role::User, "I review outputs".to_string()));
        assert_eq!(tail[2], (Role::Assistant, LISTENING.to_string()));
    }

    #[tokio::test]
    async fn test_stt_no_match_prompts_retry() {
        let mut server = Server::new_async().await;
        mock_config(&mut server).await;
        let closed = Arc::new(AtomicUsize::new(0));
        let input: Arc<dyn SpeechInput> =
            Arc::new(FakeInput::new(Some(Recognition::NoMatch), &closed));
        let (mut controller, _) = controller_with(&server.url(), false, false, Some(input));

        controller.start_stt().await.unwrap();

        assert_eq!(closed.load(Ordering::SeqCst), 1);
        assert_eq!(
            texts(&controller),
            vec![
                (Role::Assistant, LISTENING.to_string()),
                (Role::Assistant, NOT_HEARD.to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_stt_capture_error_counts_as_no_match() {
        let mut server = Server::new_async().await;
        mock_config(&mut server).await;
        let closed = Arc::new(AtomicUsize::new(0));
        let input: Arc<dyn SpeechInput> = Arc::new(FakeInput::new(None, &closed));
        let (mut controller, _) = controller_with(&server.url(), false, false, Some(input));

        controller.start_stt().await.unwrap();

        assert_eq!(closed.load(Ordering::SeqCst), 1);
        assert_eq!(
            texts(&controller),
            vec![
                (Role::Assistant, LISTENING.to_string()),
                (Role::Assistant, NOT_HEARD.to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_stt_recognizer_creation_failure_prompts_retry() {
        let mut server = Server::new_async().await;
        mock_config(&mut server).await;
        let chat = server
            .mock("POST", Matcher::Regex(r"^/session/.*/chat$".into()))
            .expect(0)
            .create_async()
            .await;
        let closed = Arc::new(AtomicUsize::new(0));
        let input: Arc<dyn SpeechInput> = Arc::new(FakeInput {
            create_fails: true,
            ..FakeInput::new(Some(Recognition::Recognized("unused".into())), &closed)
        });
        let (mut controller, _) = controller_with(&server.url(), false, false, Some(input));

        controller.start_stt().await.unwrap();

        chat.assert_async().await;
        assert_eq!(closed.load(Ordering::SeqCst), 0);
        assert_eq!(
            texts(&controller),
            vec![(Role::Assistant, NOT_HEARD.to_string())]
        );
    }

    #[tokio::test]
    async fn test_stt_closes_recognizer_when_send_fails() {
        let mut server = Server::new_async().await;
        mock_config(&mut server).await;
        server
            .mock("POST", "/session/start")
            .with_body(r#"{"session_id":"s1","assistant_text":"Hi"}"#)
            .create_async()
            .await;
        server
            .mock("POST", "/session/s1/chat")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;
        let closed = Arc::new(AtomicUsize::new(0));
        let input: Arc<dyn SpeechInput> = Arc::new(FakeInput::new(
            Some(Recognition::Recognized("I review outputs".into())),
            &closed,
        ));
        let (mut controller, _) = controller_with(&server.url(), false, false, Some(input));
        controller.start_session().await.unwrap();

        let err = controller.start_stt().await.unwrap_err();

        assert!(err.to_string().contains("500"), "unexpected error: {err}");
        assert_eq!(closed.load(Ordering::SeqCst), 1);
        assert_eq!(
            texts(&controller).last(),
            Some(&(Role::User, "I review outputs".to_string()))
        );
    }

    #[tokio::test]
    async fn test_shutdown_closes_avatar() {
        let server = Server::new_async().await;
        let (mut controller, log) = controller_with(&server.url(), false, false, None);

        controller.shutdown();

        assert_eq!(log.closes.load(Ordering::SeqCst), 1);
    }
}
