//! Process-wide application state.
//!
//! `CoreState` is built once at start-up and shared by every handler
//! through `Arc`. It owns the store handle and the clients for each
//! external collaborator, all behind traits so tests can swap in mocks.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::Store;
use crate::enrichment::llm::{ChatModel, MockChatModel, OpenAiClient};
use crate::enrichment::ocr::{MockOcrEngine, OcrEngine, OcrSpaceClient};
use crate::enrichment::storage::{CloudinaryStorage, MemoryStorage, ObjectStorage};
use crate::enrichment::Enricher;
use crate::identity::{GoogleUserInfoClient, MockUserInfoProvider, UserInfoProvider};
use crate::meet::MeetingTokenSigner;
use crate::payment::{MockPaymentProvider, PaymentProvider, StripeClient};

/// External collaborator clients, before assembly into `CoreState`.
pub struct Collaborators {
    pub identity: Arc<dyn UserInfoProvider>,
    pub storage: Arc<dyn ObjectStorage>,
    pub ocr: Arc<dyn OcrEngine>,
    pub chat: Arc<dyn ChatModel>,
    pub payments: Arc<dyn PaymentProvider>,
    pub meet: MeetingTokenSigner,
}

impl Collaborators {
    /// Real HTTP clients configured from the environment.
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            identity: Arc::new(GoogleUserInfoClient::new(&config.google_userinfo_url)),
            storage: Arc::new(CloudinaryStorage::new(
                &config.cloudinary_base_url,
                &config.cloudinary_cloud_name,
                &config.cloudinary_api_key,
                &config.cloudinary_api_secret,
            )),
            ocr: Arc::new(OcrSpaceClient::new(&config.ocr_endpoint, &config.ocr_api_key)),
            chat: Arc::new(OpenAiClient::new(&config.openai_base_url, &config.openai_api_key)),
            payments: Arc::new(StripeClient::new(
                &config.stripe_base_url,
                &config.stripe_secret_key,
            )),
            meet: MeetingTokenSigner::new(&config.videosdk_api_key, &config.videosdk_secret_key),
        }
    }

    /// In-process mocks with no network access.
    pub fn mock() -> Self {
        Self {
            identity: Arc::new(MockUserInfoProvider::new()),
            storage: Arc::new(MemoryStorage::new()),
            ocr: Arc::new(MockOcrEngine::new("mock ocr text")),
            chat: Arc::new(MockChatModel::new("<p>mock summary</p>")),
            payments: Arc::new(MockPaymentProvider::new()),
            meet: MeetingTokenSigner::new("mock-api-key", "mock-secret"),
        }
    }
}

pub struct CoreState {
    pub store: Store,
    pub identity: Arc<dyn UserInfoProvider>,
    pub enricher: Enricher,
    /// Chat model shared by summaries and the `/gpt` passthrough.
    pub chat: Arc<dyn ChatModel>,
    pub payments: Arc<dyn PaymentProvider>,
    pub meet: MeetingTokenSigner,
}

impl CoreState {
    pub fn new(store: Store, collaborators: Collaborators) -> Self {
        let Collaborators {
            identity,
            storage,
            ocr,
            chat,
            payments,
            meet,
        } = collaborators;
        Self {
            store,
            identity,
            enricher: Enricher::new(storage, ocr, Arc::clone(&chat)),
            chat,
            payments,
            meet,
        }
    }
}
