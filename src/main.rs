use std::sync::Arc;

use delivery_bot::{
    assistant::{knowledge::KnowledgeBase, Assistant},
    config::Settings,
    fulfilment::{DeliveryEstimator, DeliveryRegistry, FacilityRegistry},
    services::{
        generative::{GeminiClient, GenerativeTextClient},
        geocoding::{GeocodingService, GoogleMapsService},
        routing::OpenRouteService,
    },
    GenericError,
};
use log::*;
use serenity::{
    async_trait,
    framework::StandardFramework,
    http::Http,
    model::prelude::{Ready, UserId},
    prelude::{Client, Context, EventHandler, GatewayIntents, TypeMapKey},
};

mod commands;

/// Long-lived services shared by every command.
pub struct Services {
    pub settings: Settings,
    pub estimator: DeliveryEstimator,
    pub geocoder: Option<GoogleMapsService>,
    pub assistant: Assistant,
}

struct ServicesContainer;

impl TypeMapKey for ServicesContainer {
    type Value = Arc<Services>;
}

struct SessionStore;

impl TypeMapKey for SessionStore {
    type Value = Arc<DeliveryRegistry<UserId>>;
}

struct Handler;

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _: Context, ready: Ready) {
        info!("{} is connected!", ready.user.name);
    }
}

#[tokio::main]
async fn main() -> Result<(), GenericError> {
    let settings = Settings::from_env()?;
    env_logger::builder()
        .filter_module("delivery_bot", settings.log_level)
        .init();
    trace!("Logger init with level {}.", settings.log_level);

    let routing = Arc::new(OpenRouteService::new(&settings.routing)?);
    let estimator = DeliveryEstimator::new(
        FacilityRegistry::new(settings.facilities.clone()),
        settings.fee,
        routing,
        settings.retry,
    );

    let geocoder: Result<GoogleMapsService, GenericError> = GeocodingService::new(&settings);
    let geocoder = match geocoder {
        Ok(geocoder) => Some(geocoder),
        Err(why) => {
            info!("Address lookup disabled: {}", why);
            None
        }
    };

    let generator: Option<Arc<dyn GenerativeTextClient>> = match &settings.generative {
        Some(generative) => Some(Arc::new(GeminiClient::new(generative)?)),
        None => {
            info!("GEMINI_API_KEY not set, assistant answers from its knowledge base only.");
            None
        }
    };
    let assistant = Assistant::new(KnowledgeBase::builtin()?, generator);

    let http = Http::new(&settings.discord_token);
    let bot_id = http.get_current_user().await?.id;

    let framework = StandardFramework::new()
        .configure(|c| {
            c.with_whitespace(true)
                .on_mention(Some(bot_id))
                .prefix(settings.command_prefix.as_str())
        })
        .after(commands::after)
        .help(&commands::HELP)
        .group(&commands::GENERAL_GROUP);

    let intents = GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;
    let token = settings.discord_token.clone();
    let services = Services {
        settings,
        estimator,
        geocoder,
        assistant,
    };
    let mut client = Client::builder(&token, intents)
        .event_handler(Handler)
        .framework(framework)
        .type_map_insert::<ServicesContainer>(Arc::new(services))
        .type_map_insert::<SessionStore>(Arc::default())
        .await?;

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutting down.");
            shard_manager.lock().await.shutdown_all().await;
        }
    });

    if let Err(why) = client.start().await {
        error!("Client error: {:?}", why);
    }

    Ok(())
}
