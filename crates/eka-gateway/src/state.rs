use eka_core::{
    AnswerGenerator, AnswerPipeline, AuthService, ChatCompletionsGenerator, ChatHistory, EkaError,
    GatewayConfig, Notifier, PipelineSettings, Records, Store,
};
use std::sync::Arc;

/// Shared handles for every handler. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub store: Store,
    pub auth: Arc<AuthService>,
    pub pipeline: Arc<AnswerPipeline>,
    pub history: Arc<ChatHistory>,
    pub records: Records,
    pub notifier: Notifier,
}

impl AppState {
    /// Open the sled store at `storage_path` and wire the chat-completions generator.
    pub fn open(config: GatewayConfig) -> Result<Self, EkaError> {
        let store = Store::open(Some(&config.storage_path))?;
        let generator = Arc::new(ChatCompletionsGenerator::from_config(&config));
        Self::with_generator(config, store, generator)
    }

    pub fn with_generator(
        config: GatewayConfig,
        store: Store,
        generator: Arc<dyn AnswerGenerator>,
    ) -> Result<Self, EkaError> {
        let auth = Arc::new(AuthService::from_config(&store, &config)?);
        let history = Arc::new(ChatHistory::new(&store)?);
        let records = Records::new(&store)?;
        let notifier = Notifier::new();
        let pipeline = Arc::new(AnswerPipeline::new(
            generator,
            history.clone(),
            notifier.clone(),
            PipelineSettings::from_config(&config),
        ));
        Ok(Self {
            config: Arc::new(config),
            store,
            auth,
            pipeline,
            history,
            records,
            notifier,
        })
    }
}
