// klaxon-engine/src/pipeline.rs

/*!
# Alert Pipeline

Read location → compose messages → write voice document → dispatch.

The stages are strictly ordered. A call request can only be built from a
[`PersistedAlert`], which exists only after the voice document was written
successfully, so the provider never receives a callback URL for a document
that is not on disk. Once persisted, the SMS and the call are issued
concurrently and their outcomes are reported independently.
*/

use std::path::PathBuf;
use std::time::Instant;

use opentelemetry::KeyValue;
use tracing::{error, info, instrument};

use klaxon_config::KlaxonConfig;
use klaxon_core::location::{read_location, Location};
use klaxon_core::message::{compose, AlertMessages};
use klaxon_core::request::{CallRequest, Channel, SmsRequest};
use klaxon_core::voice::VoiceDocument;
use klaxon_core::AlertError;
use klaxon_dispatch::{Notifier, ProviderError, ProviderReceipt};
use klaxon_telemetry::{EventLogger, MetricsRecorder};

/// Everything the pipeline needs from configuration.
#[derive(Debug, Clone)]
pub struct AlertSettings {
    pub location_path: PathBuf,
    pub trim_newline: bool,
    pub document_path: PathBuf,
    pub callback_url: String,
    pub voice: String,
    pub from: String,
    pub sms_to: String,
    pub call_to: String,
}

impl From<&KlaxonConfig> for AlertSettings {
    fn from(config: &KlaxonConfig) -> Self {
        Self {
            location_path: config.location.path.clone(),
            trim_newline: config.location.trim_newline,
            document_path: config.voice.document_path.clone(),
            callback_url: config.voice.callback_url.clone(),
            voice: config.voice.voice.clone(),
            from: config.recipients.from.clone(),
            sms_to: config.recipients.sms_to.clone(),
            call_to: config.recipients.call_to.clone(),
        }
    }
}

/// Alert content built from the location file, not yet written anywhere.
#[derive(Debug, Clone)]
pub struct PreparedAlert {
    pub location: Location,
    pub messages: AlertMessages,
    pub document: VoiceDocument,
}

/// Reads the location and builds both messages and the voice document.
#[instrument(
    level = "info",
    name = "prepare_alert",
    skip(settings),
    fields(location_path = %settings.location_path.display())
)]
pub fn prepare_alert(settings: &AlertSettings) -> Result<PreparedAlert, AlertError> {
    let location = read_location(&settings.location_path, settings.trim_newline)?;
    let messages = compose(&location);
    let document = VoiceDocument::new(&messages.law_enforcement, settings.voice.as_str());
    info!(bytes = location.as_str().len(), "alert content prepared");
    Ok(PreparedAlert {
        location,
        messages,
        document,
    })
}

impl PreparedAlert {
    /// Writes the voice document; the only way to obtain a [`PersistedAlert`].
    pub fn persist(self, settings: &AlertSettings) -> Result<PersistedAlert, AlertError> {
        self.document.write_to(&settings.document_path)?;
        Ok(PersistedAlert {
            alert: self,
            callback_url: settings.callback_url.clone(),
        })
    }

    pub fn sms_request(&self, settings: &AlertSettings) -> SmsRequest {
        SmsRequest {
            to: settings.sms_to.clone(),
            from: settings.from.clone(),
            body: self.messages.public.text.clone(),
        }
    }
}

/// An alert whose voice document is on disk.
#[derive(Debug, Clone)]
pub struct PersistedAlert {
    alert: PreparedAlert,
    callback_url: String,
}

impl PersistedAlert {
    pub fn alert(&self) -> &PreparedAlert {
        &self.alert
    }

    pub fn call_request(&self, settings: &AlertSettings) -> CallRequest {
        CallRequest {
            to: settings.call_to.clone(),
            from: settings.from.clone(),
            callback_url: self.callback_url.clone(),
        }
    }
}

pub type ChannelOutcome = Result<ProviderReceipt, ProviderError>;

/// Independent outcomes of the two notifications.
#[derive(Debug)]
pub struct DispatchReport {
    pub sms: ChannelOutcome,
    pub call: ChannelOutcome,
}

/// Receipts of a fully delivered alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivered {
    pub sms: ProviderReceipt,
    pub call: ProviderReceipt,
}

impl DispatchReport {
    pub fn is_delivered(&self) -> bool {
        self.sms.is_ok() && self.call.is_ok()
    }

    pub fn failures(&self) -> Vec<(Channel, &ProviderError)> {
        let mut failures = Vec::new();
        if let Err(e) = &self.sms {
            failures.push((Channel::Sms, e));
        }
        if let Err(e) = &self.call {
            failures.push((Channel::Voice, e));
        }
        failures
    }

    /// Collapses the report into the first failure, SMS before voice.
    pub fn into_result(self) -> Result<Delivered, AlertError> {
        let failed = |channel, e: ProviderError| AlertError::DispatchFailed {
            channel,
            source: Box::new(e),
        };
        let sms = self.sms.map_err(|e| failed(Channel::Sms, e))?;
        let call = self.call.map_err(|e| failed(Channel::Voice, e))?;
        Ok(Delivered { sms, call })
    }
}

pub struct AlertPipeline<N> {
    settings: AlertSettings,
    notifier: N,
    metrics: MetricsRecorder,
}

impl<N: Notifier> AlertPipeline<N> {
    pub fn new(settings: AlertSettings, notifier: N, metrics: MetricsRecorder) -> Self {
        Self {
            settings,
            notifier,
            metrics,
        }
    }

    pub fn metrics(&self) -> &MetricsRecorder {
        &self.metrics
    }

    /// Runs every stage. Pre-dispatch failures abort with no provider
    /// request issued; dispatch failures are returned inside the report.
    #[instrument(level = "info", name = "run_alert", skip(self))]
    pub async fn run(&self) -> Result<DispatchReport, AlertError> {
        let prepared = prepare_alert(&self.settings)?;
        let persisted = prepared.persist(&self.settings)?;
        EventLogger::log_event(
            "document_written",
            vec![
                KeyValue::new("path", self.settings.document_path.display().to_string()),
                KeyValue::new("callback_url", self.settings.callback_url.clone()),
            ],
        )
        .await;
        Ok(self.dispatch(&persisted).await)
    }

    /// Issues the SMS and the call concurrently.
    #[instrument(level = "info", name = "dispatch", skip(self, persisted))]
    pub async fn dispatch(&self, persisted: &PersistedAlert) -> DispatchReport {
        let sms = persisted.alert().sms_request(&self.settings);
        let call = persisted.call_request(&self.settings);

        let (sms, call) = tokio::join!(
            self.timed(Channel::Sms, self.notifier.send_sms(&sms)),
            self.timed(Channel::Voice, self.notifier.place_call(&call)),
        );
        DispatchReport { sms, call }
    }

    async fn timed<F>(&self, channel: Channel, request: F) -> ChannelOutcome
    where
        F: std::future::Future<Output = ChannelOutcome>,
    {
        let started = Instant::now();
        let outcome = request.await;
        let elapsed = started.elapsed().as_secs_f64();

        match &outcome {
            Ok(receipt) => {
                self.metrics.record_sent(elapsed);
                info!(%channel, sid = %receipt.sid, elapsed, "notification accepted");
                EventLogger::log_event(
                    "notification_sent",
                    vec![
                        KeyValue::new("channel", channel.to_string()),
                        KeyValue::new("sid", receipt.sid.clone()),
                    ],
                )
                .await;
            }
            Err(e) => {
                self.metrics.record_failure(elapsed);
                error!(%channel, error = %e, elapsed, "notification failed");
                EventLogger::log_event(
                    "notification_failed",
                    vec![
                        KeyValue::new("channel", channel.to_string()),
                        KeyValue::new("error", e.to_string()),
                    ],
                )
                .await;
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use klaxon_core::request::DispatchRequest;
    use std::path::Path;
    use std::sync::Mutex;
    use tracing_test::traced_test;

    const CALLBACK: &str = "http://131.215.159.127/twilio.xml";

    /// What the notifier saw, plus whether the document was on disk at the time.
    #[derive(Debug, Clone)]
    struct Recorded {
        request: DispatchRequest,
        document_on_disk: Option<String>,
    }

    struct RecordingNotifier {
        document_path: PathBuf,
        fail_sms: bool,
        fail_call: bool,
        seen: Mutex<Vec<Recorded>>,
    }

    impl RecordingNotifier {
        fn new(document_path: &Path) -> Self {
            Self {
                document_path: document_path.to_path_buf(),
                fail_sms: false,
                fail_call: false,
                seen: Mutex::new(Vec::new()),
            }
        }

        fn record(&self, request: DispatchRequest) {
            let document_on_disk = std::fs::read_to_string(&self.document_path).ok();
            self.seen.lock().unwrap().push(Recorded {
                request,
                document_on_disk,
            });
        }

        fn seen(&self) -> Vec<Recorded> {
            self.seen.lock().unwrap().clone()
        }

        fn outcome(&self, fail: bool, sid: &str) -> ChannelOutcome {
            if fail {
                Err(ProviderError::Rejected {
                    status: 400,
                    code: Some(21211),
                    message: "Invalid 'To' Phone Number".into(),
                })
            } else {
                Ok(ProviderReceipt {
                    sid: sid.into(),
                    status: Some("queued".into()),
                })
            }
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send_sms(&self, request: &SmsRequest) -> ChannelOutcome {
            self.record(request.clone().into());
            self.outcome(self.fail_sms, "SM1")
        }

        async fn place_call(&self, request: &CallRequest) -> ChannelOutcome {
            self.record(request.clone().into());
            self.outcome(self.fail_call, "CA1")
        }
    }

    fn settings(dir: &Path) -> AlertSettings {
        AlertSettings {
            location_path: dir.join("log.txt"),
            trim_newline: true,
            document_path: dir.join("twilio.xml"),
            callback_url: CALLBACK.into(),
            voice: "alice".into(),
            from: "+12673146105".into(),
            sms_to: "+19253099700".into(),
            call_to: "+16692379199".into(),
        }
    }

    fn pipeline(
        settings: AlertSettings,
        notifier: RecordingNotifier,
    ) -> AlertPipeline<RecordingNotifier> {
        AlertPipeline::new(settings, notifier, MetricsRecorder::new().unwrap())
    }

    #[tokio::test]
    async fn end_to_end_alert() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(dir.path());
        std::fs::write(&settings.location_path, "37.7749,-122.4194\n").unwrap();

        let pipeline = pipeline(settings.clone(), RecordingNotifier::new(&settings.document_path));
        let report = pipeline.run().await.unwrap();
        assert!(report.is_delivered());

        let expected_document = "<?xml version=\"1.0\"?>\n<Response><Say voice=\"alice\">\
ALERT to all active units: Active shooting attempt at 37.7749,-122.4194.\
</Say></Response>\n";
        assert_eq!(
            std::fs::read_to_string(&settings.document_path).unwrap(),
            expected_document
        );

        let seen = pipeline.notifier.seen();
        let channels: Vec<Channel> = seen.iter().map(|r| r.request.channel()).collect();
        assert_eq!(channels.len(), 2);
        assert!(channels.contains(&Channel::Sms));
        assert!(channels.contains(&Channel::Voice));
        for recorded in &seen {
            match &recorded.request {
                DispatchRequest::Sms(sms) => {
                    assert_eq!(sms.to, "+19253099700");
                    assert_eq!(sms.from, "+12673146105");
                    assert!(sms.body.contains("37.7749,-122.4194"));
                    assert!(sms.body.starts_with("The following is a message"));
                }
                DispatchRequest::Voice(call) => {
                    assert_eq!(call.to, "+16692379199");
                    assert_eq!(call.callback_url, CALLBACK);
                    assert_eq!(recorded.document_on_disk.as_deref(), Some(expected_document));
                }
            }
        }

        let delivered = report.into_result().unwrap();
        assert_eq!(delivered.sms.sid, "SM1");
        assert_eq!(delivered.call.sid, "CA1");
        assert_eq!(pipeline.metrics().notifications_sent.get(), 2.0);
    }

    #[tokio::test]
    async fn missing_location_sends_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(dir.path());

        let pipeline = pipeline(settings.clone(), RecordingNotifier::new(&settings.document_path));
        let err = pipeline.run().await.unwrap_err();

        assert!(matches!(err, AlertError::FileNotReadable { .. }));
        assert!(pipeline.notifier.seen().is_empty());
        assert!(!settings.document_path.exists());
    }

    #[tokio::test]
    async fn unwritable_document_sends_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = settings(dir.path());
        std::fs::write(&settings.location_path, "Caltech").unwrap();
        settings.document_path = dir.path().join("no-such-dir").join("twilio.xml");

        let pipeline = pipeline(settings.clone(), RecordingNotifier::new(&settings.document_path));
        let err = pipeline.run().await.unwrap_err();

        assert!(matches!(err, AlertError::DocumentWriteFailed { .. }));
        assert!(pipeline.notifier.seen().is_empty());
    }

    #[tokio::test]
    async fn channel_failures_are_independent() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(dir.path());
        std::fs::write(&settings.location_path, "Caltech").unwrap();

        let mut notifier = RecordingNotifier::new(&settings.document_path);
        notifier.fail_sms = true;
        let pipeline = pipeline(settings, notifier);
        let report = pipeline.run().await.unwrap();

        assert!(!report.is_delivered());
        assert!(report.call.is_ok());
        let failures = report.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, Channel::Sms);
        assert_eq!(pipeline.notifier.seen().len(), 2);
        assert_eq!(pipeline.metrics().dispatch_failures.get(), 1.0);
        assert_eq!(pipeline.metrics().notifications_sent.get(), 1.0);

        match report.into_result() {
            Err(AlertError::DispatchFailed { channel, .. }) => assert_eq!(channel, Channel::Sms),
            other => panic!("expected DispatchFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn both_failures_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(dir.path());
        std::fs::write(&settings.location_path, "Caltech").unwrap();

        let mut notifier = RecordingNotifier::new(&settings.document_path);
        notifier.fail_sms = true;
        notifier.fail_call = true;
        let report = pipeline(settings, notifier).run().await.unwrap();

        let channels: Vec<Channel> = report.failures().into_iter().map(|(c, _)| c).collect();
        assert_eq!(channels, vec![Channel::Sms, Channel::Voice]);
    }

    #[test]
    fn default_config_keeps_whole_location_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = AlertSettings::from(&KlaxonConfig::default());
        settings.location_path = dir.path().join("log.txt");
        settings.document_path = dir.path().join("twilio.xml");
        std::fs::write(&settings.location_path, "Caltech\n").unwrap();

        let prepared = prepare_alert(&settings).unwrap();
        assert_eq!(prepared.location.as_str(), "Caltech\n");
        assert!(prepared.messages.law_enforcement.text.ends_with(" at Caltech\n."));
        assert!(prepared.messages.public.text.contains(" at Caltech\n."));
        let sms = prepared.sms_request(&settings);
        assert!(sms.body.contains("Caltech\n"));
    }

    #[test]
    fn prepare_does_not_write() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(dir.path());
        std::fs::write(&settings.location_path, "Pasadena").unwrap();

        let prepared = prepare_alert(&settings).unwrap();
        assert_eq!(prepared.location.as_str(), "Pasadena");
        assert_eq!(prepared.document.voice(), "alice");
        assert_eq!(prepared.document.text(), prepared.messages.law_enforcement.text);
        assert!(!settings.document_path.exists());
    }

    #[tokio::test]
    #[traced_test]
    async fn stages_are_logged() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(dir.path());
        std::fs::write(&settings.location_path, "Caltech").unwrap();

        let pipeline = pipeline(settings.clone(), RecordingNotifier::new(&settings.document_path));
        pipeline.run().await.unwrap();

        assert!(logs_contain("alert content prepared"));
        assert!(logs_contain("notification accepted"));
        assert!(logs_contain("SM1"));
    }
}
