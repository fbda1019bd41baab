//! Pipeline for callbrief.
//!
//! Coordinates the whole process from call recording to structured summary.

use crate::agent::{Agent, OpenAiChatModel, ToolContext};
use crate::config::{Prompts, Settings};
use crate::error::{CallBriefError, Result};
use crate::openai::create_client;
use crate::report::{parse_response, repair_calendar, AgentOutputRecord};
use crate::tools::{GoogleCalendar, Scheduler, SerpApiSearch, WebSearch};
use crate::transcription::{Transcriber, TranscriptionResult, WhisperTranscriber};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Transcript and analysis of one call.
#[derive(Debug, Clone, Serialize)]
pub struct CallReport {
    pub transcript: TranscriptionResult,
    #[serde(flatten)]
    pub record: AgentOutputRecord,
}

/// The callbrief pipeline: transcription, agent analysis, response parsing.
pub struct Pipeline {
    transcriber: Arc<dyn Transcriber>,
    agent: Agent,
    scheduler: Option<Scheduler>,
}

impl Pipeline {
    /// Build the production pipeline from settings.
    ///
    /// An OpenAI key is required. Web search is only offered to the model when
    /// a SerpAPI key is configured. The calendar is always offered; without a
    /// token file its events fail and the failure is reported in the record.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let api_key = settings.openai_api_key().ok_or_else(|| {
            CallBriefError::Config(
                "OpenAI API key not set. Set OPENAI_API_KEY or openai.api_key in the config file"
                    .to_string(),
            )
        })?;

        let prompts = Prompts::load(settings.agent.prompt_file.as_deref())?;

        let transcriber: Arc<dyn Transcriber> = Arc::new(WhisperTranscriber::new(
            &api_key,
            &settings.openai,
            &settings.transcription,
        )?);

        let model = OpenAiChatModel::new(
            create_client(&api_key, &settings.openai)?,
            &settings.agent.model,
            settings.agent.temperature,
        );

        let search = build_search(settings)?;
        let scheduler = build_scheduler(settings)?;

        let agent = Agent::new(
            Arc::new(model),
            ToolContext::new(search, Some(scheduler.clone())),
            prompts,
        )
        .with_max_iterations(settings.agent.max_iterations)
        .with_structured_output(settings.agent.structured_output);

        Ok(Self::with_components(transcriber, agent, Some(scheduler)))
    }

    /// Create a pipeline with custom components.
    pub fn with_components(
        transcriber: Arc<dyn Transcriber>,
        agent: Agent,
        scheduler: Option<Scheduler>,
    ) -> Self {
        Self {
            transcriber,
            agent,
            scheduler,
        }
    }

    /// Transcribe a recording without analyzing it.
    pub async fn transcribe(&self, audio_path: &Path) -> Result<TranscriptionResult> {
        self.transcriber.transcribe(audio_path).await
    }

    /// Analyze a transcript.
    #[instrument(skip(self, transcription), fields(words = transcription.split_whitespace().count()))]
    pub async fn process(&self, transcription: &str) -> Result<AgentOutputRecord> {
        if transcription.trim().is_empty() {
            return Err(CallBriefError::InvalidInput("transcription is empty".to_string()));
        }

        info!("Running agent...");
        let run = self.agent.run(transcription).await?;
        for call in &run.tool_calls {
            info!("Tool call: {}", call);
        }

        let mut record = parse_response(&run.content);
        if record.is_empty() {
            warn!("Agent response contained no recognizable sections");
        }

        if let Some(scheduler) = &self.scheduler {
            if repair_calendar(&mut record, scheduler).await {
                info!("Calendar section repaired: {}", record.calendar);
            }
        }

        Ok(record)
    }

    /// Transcribe and analyze a recording.
    #[instrument(skip(self), fields(audio_path = %audio_path.display()))]
    pub async fn process_audio(&self, audio_path: &Path) -> Result<CallReport> {
        info!("Transcribing audio...");
        let transcript = self.transcribe(audio_path).await?;
        info!("Transcription complete ({} words)", transcript.word_count());

        let record = self.process(transcript.text()).await?;
        Ok(CallReport { transcript, record })
    }
}

/// Web search adapter, if a SerpAPI key is configured.
pub fn build_search(settings: &Settings) -> Result<Option<Arc<dyn WebSearch>>> {
    match settings.serpapi_api_key() {
        Some(key) => {
            let search: Arc<dyn WebSearch> = Arc::new(SerpApiSearch::new(key, &settings.search)?);
            Ok(Some(search))
        }
        None => {
            warn!("SERPAPI_API_KEY not set, web search disabled");
            Ok(None)
        }
    }
}

/// Calendar scheduler over Google Calendar.
///
/// A missing token file is not an error here; each event submission reports it.
pub fn build_scheduler(settings: &Settings) -> Result<Scheduler> {
    let token_path = settings.token_path();
    if !token_path.exists() {
        warn!(
            "Calendar token not found at {}, events will not be created",
            token_path.display()
        );
    }

    let calendar = GoogleCalendar::new(token_path, &settings.calendar)?;
    Ok(Scheduler::new(Arc::new(calendar))
        .with_timezone(&settings.calendar.timezone)
        .with_default_duration(settings.calendar.default_duration_minutes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::testing::{invocation, ScriptedModel};
    use crate::agent::ModelReply;
    use crate::tools::testing::{RecordingCalendar, TEST_EVENT_LINK};
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};

    const DEMO_TRANSCRIPT: &str = "Rep: Thanks for your time today. \
        Prospect: Happy to continue, please schedule a demo for 2025-07-02T15:00:00.";

    struct StaticTranscriber(&'static str);

    #[async_trait]
    impl Transcriber for StaticTranscriber {
        async fn transcribe(&self, _audio_path: &Path) -> Result<TranscriptionResult> {
            TranscriptionResult::new(self.0)
                .ok_or_else(|| CallBriefError::Transcription("empty transcript".to_string()))
        }
    }

    fn pipeline(replies: Vec<Result<ModelReply>>, calendar: Arc<RecordingCalendar>) -> Pipeline {
        let now = Utc.with_ymd_and_hms(2025, 6, 25, 10, 0, 0).unwrap();
        let scheduler = Scheduler::new(calendar).with_now(now);
        let agent = Agent::new(
            Arc::new(ScriptedModel::new(replies)),
            ToolContext::new(None, Some(scheduler.clone())),
            Prompts::default(),
        );
        Pipeline::with_components(
            Arc::new(StaticTranscriber(DEMO_TRANSCRIPT)),
            agent,
            Some(scheduler),
        )
    }

    #[tokio::test]
    async fn test_demo_scheduled_through_tool() {
        let calendar = Arc::new(RecordingCalendar::default());
        let pipeline = pipeline(
            vec![
                Ok(ModelReply::tools(vec![invocation(
                    "call_1",
                    "calendar",
                    r#"{"summary": "Product demo", "start_time": "2025-07-02T15:00:00"}"#,
                )])),
                Ok(ModelReply::text(format!(
                    "Executive Summary: Prospect wants a demo.\n\
                     Action Items:\n- Prepare demo\n\
                     Calendar: Event created: {}\n\
                     Web Search: none",
                    TEST_EVENT_LINK
                ))),
            ],
            calendar.clone(),
        );

        let report = pipeline.process_audio(Path::new("call.mp3")).await.unwrap();
        assert_eq!(report.transcript.text(), DEMO_TRANSCRIPT);
        assert_eq!(report.record.summary, "Prospect wants a demo.");
        assert_eq!(report.record.action_items, vec!["Prepare demo"]);
        assert_eq!(report.record.calendar, format!("Event created: {}", TEST_EVENT_LINK));
        assert_eq!(calendar.submitted().len(), 1);
    }

    #[tokio::test]
    async fn test_demo_scheduled_by_repair_pass() {
        let calendar = Arc::new(RecordingCalendar::default());
        let pipeline = pipeline(
            vec![Ok(ModelReply::text(
                "Executive Summary: Prospect wants a demo.\n\
                 Calendar: Schedule a demo for 2025-07-02T15:00:00",
            ))],
            calendar.clone(),
        );

        let record = pipeline.process(DEMO_TRANSCRIPT).await.unwrap();
        assert_eq!(record.calendar, format!("Event created: {}", TEST_EVENT_LINK));

        let events = calendar.submitted();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].summary, "Demo");
        assert_eq!(events[0].start, Utc.with_ymd_and_hms(2025, 7, 2, 15, 0, 0).unwrap());
    }

    #[tokio::test]
    async fn test_calendar_failure_reported_not_raised() {
        let calendar = Arc::new(RecordingCalendar::failing("insufficient permissions"));
        let pipeline = pipeline(
            vec![Ok(ModelReply::text(
                "Executive Summary: Demo requested.\nCalendar: Demo 2025-07-02T15:00:00",
            ))],
            calendar,
        );

        let record = pipeline.process(DEMO_TRANSCRIPT).await.unwrap();
        assert_eq!(
            record.calendar,
            "Failed to create event: Calendar error: insufficient permissions"
        );
        assert!(!record.calendar.contains("Schedule a demo"));
    }

    #[tokio::test]
    async fn test_model_failure_propagates() {
        let pipeline = pipeline(
            vec![Err(CallBriefError::OpenAI("connection reset".to_string()))],
            Arc::new(RecordingCalendar::default()),
        );

        let err = pipeline.process(DEMO_TRANSCRIPT).await.unwrap_err();
        assert!(err.is_total_failure());
        assert!(err.to_string().contains("connection reset"));
    }

    #[tokio::test]
    async fn test_empty_transcript_rejected() {
        let pipeline = pipeline(vec![], Arc::new(RecordingCalendar::default()));
        assert!(matches!(
            pipeline.process("   ").await,
            Err(CallBriefError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_from_settings_without_calendar_token() {
        let mut settings = Settings::default();
        settings.openai.api_key = Some("sk-test".to_string());
        settings.calendar.token_path = "/nonexistent/token.json".to_string();
        assert!(Pipeline::from_settings(&settings).is_ok());
    }

    #[tokio::test]
    async fn test_missing_token_reports_failure_in_calendar_field() {
        let mut settings = Settings::default();
        settings.calendar.token_path = "/nonexistent/token.json".to_string();
        let scheduler = build_scheduler(&settings).unwrap();

        let agent = Agent::new(
            Arc::new(ScriptedModel::new(vec![Ok(ModelReply::text(
                "Executive Summary: Prospect wants a demo.
                 Calendar: Schedule a demo for 2025-07-02T15:00:00",
            ))])),
            ToolContext::new(None, Some(scheduler.clone())),
            Prompts::default(),
        );
        let pipeline = Pipeline::with_components(
            Arc::new(StaticTranscriber(DEMO_TRANSCRIPT)),
            agent,
            Some(scheduler),
        );

        let record = pipeline.process(DEMO_TRANSCRIPT).await.unwrap();
        assert!(record
            .calendar
            .starts_with("Failed to create event: Calendar error: Could not read calendar token"));
        assert!(!record.calendar.contains("Schedule a demo"));
    }

    #[test]
    fn test_calendar_tool_offered_without_token() {
        let mut settings = Settings::default();
        settings.calendar.token_path = "/nonexistent/token.json".to_string();
        let tools = ToolContext::new(None, Some(build_scheduler(&settings).unwrap()));
        let names: Vec<&str> = tools.definitions().iter().map(|spec| spec.name).collect();
        assert_eq!(names, vec!["calendar"]);
    }

    #[test]
    fn test_call_report_json_is_flat() {
        let report = CallReport {
            transcript: TranscriptionResult::new("hello").unwrap(),
            record: AgentOutputRecord {
                summary: "s".to_string(),
                ..Default::default()
            },
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["transcript"], "hello");
        assert_eq!(value["summary"], "s");
        assert_eq!(value["action_items"], serde_json::json!([]));
    }
}
