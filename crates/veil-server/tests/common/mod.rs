#![allow(dead_code)]

use std::collections::VecDeque;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use image::{ImageFormat, RgbImage};

use veil_core::capability::{ImageRedactor, PiiDetector, ProviderError};
use veil_core::models::detection::PiiDetection;
use veil_core::models::image::{ImageData, ImageMime};
use veil_core::policy::IdPrefixPolicy;
use veil_core::prompts::{DetectionPrompt, RedactionPrompt};
use veil_server::config::VeilConfig;
use veil_server::pipeline::{Pipeline, PipelineSettings};
use veil_server::retry::RetryPolicy;
use veil_server::state::AppState;

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    RgbImage::new(width, height)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("encode png");
    bytes
}

pub fn png_uri(width: u32, height: u32) -> String {
    ImageData::new(ImageMime::Png, png_bytes(width, height)).to_data_uri()
}

/// Replays scripted responses in order; the last one repeats.
pub struct Script<T> {
    responses: Mutex<VecDeque<Result<T, ProviderError>>>,
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl<T: Clone> Script<T> {
    fn new(responses: Vec<Result<T, ProviderError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: AtomicUsize::new(0),
            delay: None,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn next(&self) -> Result<T, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let mut responses = self.responses.lock().unwrap();
        if responses.len() > 1 {
            responses.pop_front().unwrap()
        } else {
            responses.front().cloned().expect("script has no responses")
        }
    }
}

pub struct StubDetector(pub Script<Vec<PiiDetection>>);

impl StubDetector {
    pub fn returning(detections: Vec<PiiDetection>) -> Arc<Self> {
        Self::sequence(vec![Ok(detections)])
    }

    pub fn failing(error: ProviderError) -> Arc<Self> {
        Self::sequence(vec![Err(error)])
    }

    pub fn sequence(responses: Vec<Result<Vec<PiiDetection>, ProviderError>>) -> Arc<Self> {
        Arc::new(Self(Script::new(responses)))
    }

    pub fn slow(delay: Duration) -> Arc<Self> {
        let mut script = Script::new(vec![Ok(Vec::new())]);
        script.delay = Some(delay);
        Arc::new(Self(script))
    }

    pub fn calls(&self) -> usize {
        self.0.calls()
    }
}

#[async_trait]
impl PiiDetector for StubDetector {
    async fn detect(
        &self,
        _image: &ImageData,
        _prompt: &DetectionPrompt,
    ) -> Result<Vec<PiiDetection>, ProviderError> {
        self.0.next().await
    }

    fn provider_name(&self) -> &str {
        "stub-detector"
    }

    fn model_id(&self) -> &str {
        "stub-detect-1"
    }
}

pub struct StubRedactor {
    script: Script<ImageData>,
    prompts: Mutex<Vec<String>>,
}

impl StubRedactor {
    pub fn returning(image: ImageData) -> Arc<Self> {
        Self::sequence(vec![Ok(image)])
    }

    pub fn failing(error: ProviderError) -> Arc<Self> {
        Self::sequence(vec![Err(error)])
    }

    pub fn sequence(responses: Vec<Result<ImageData, ProviderError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Script::new(responses),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.script.calls()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageRedactor for StubRedactor {
    async fn redact(
        &self,
        _image: &ImageData,
        prompt: &RedactionPrompt,
    ) -> Result<ImageData, ProviderError> {
        self.prompts.lock().unwrap().push(prompt.text.clone());
        self.script.next().await
    }

    fn provider_name(&self) -> &str {
        "stub-redactor"
    }

    fn model_id(&self) -> &str {
        "stub-image-1"
    }
}

pub fn settings(retry: RetryPolicy) -> PipelineSettings {
    PipelineSettings {
        id_policy: IdPrefixPolicy::default(),
        retry,
        call_timeout: Duration::from_secs(5),
        max_upload_bytes: 10 * 1024 * 1024,
    }
}

pub fn pipeline(detector: Arc<StubDetector>, redactor: Arc<StubRedactor>) -> Pipeline {
    Pipeline::new(detector, redactor, settings(RetryPolicy::none()))
}

pub fn app_state(detector: Arc<StubDetector>, redactor: Arc<StubRedactor>) -> AppState {
    let config = VeilConfig::from_lookup(|_| None).expect("default config");
    AppState::new(pipeline(detector, redactor), config)
}
