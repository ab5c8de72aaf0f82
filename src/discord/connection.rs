// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::commands::{command_definitions, route_command};
use super::events::{forget_channel, recover_tickets};
use super::incoming_messages::handle_message;
use super::interactions::route_interaction;
use super::state::BotState;
use crate::config::ConfigData;
use miette::IntoDiagnostic;
use std::sync::Arc;
use tokio::sync::RwLock;
use twilight_cache_inmemory::{DefaultInMemoryCache, ResourceType};
use twilight_gateway::{EventTypeFlags, Intents, Shard, ShardId, StreamExt};
use twilight_http::client::Client;
use twilight_model::application::interaction::InteractionData;
use twilight_model::gateway::event::Event;
use twilight_model::id::Id;
use twilight_model::id::marker::ApplicationMarker;

pub fn set_up_client(config: &ConfigData) -> Arc<Client> {
	Arc::new(Client::new(config.discord.bot_token.clone()))
}

pub async fn run_bot(config: Arc<ConfigData>, http_client: Arc<Client>) -> miette::Result<()> {
	let intents = Intents::GUILDS | Intents::GUILD_MESSAGES | Intents::MESSAGE_CONTENT;

	let mut shard = Shard::new(ShardId::ONE, config.discord.bot_token.clone(), intents);

	let cache = Arc::new(
		DefaultInMemoryCache::builder()
			.resource_types(ResourceType::CHANNEL | ResourceType::GUILD)
			.build(),
	);

	let application_id = {
		let application_response = http_client.current_user_application().await.into_diagnostic()?;
		application_response.model().await.into_diagnostic()?.id
	};

	if let Err(error) = register_commands(&http_client, application_id, &config).await {
		tracing::error!(source = ?error, "failed to register application commands");
	}

	let bot_state = Arc::new(RwLock::new(BotState::new(&config.tickets)));

	while let Some(event) = shard.next_event(EventTypeFlags::all()).await {
		let event = match event {
			Ok(event) => event,
			Err(error) => {
				tracing::warn!(source = ?error, "error receiving event");
				continue;
			}
		};
		cache.update(&event);

		tokio::spawn(handle_event(
			event,
			Arc::clone(&http_client),
			application_id,
			Arc::clone(&config),
			Arc::clone(&cache),
			Arc::clone(&bot_state),
		));
	}

	Ok(())
}

async fn register_commands(
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	config: &ConfigData,
) -> miette::Result<()> {
	let interaction_client = http_client.interaction(application_id);
	let commands = command_definitions();
	match config.discord.command_guild {
		Some(guild_id) => {
			interaction_client
				.set_guild_commands(guild_id, &commands)
				.await
				.into_diagnostic()?;
			tracing::info!(%guild_id, count = commands.len(), "registered guild commands");
		}
		None => {
			interaction_client
				.set_global_commands(&commands)
				.await
				.into_diagnostic()?;
			tracing::info!(count = commands.len(), "registered global commands");
		}
	}
	Ok(())
}

async fn handle_event(
	event: Event,
	http_client: Arc<Client>,
	application_id: Id<ApplicationMarker>,
	config: Arc<ConfigData>,
	cache: Arc<DefaultInMemoryCache>,
	bot_state: Arc<RwLock<BotState>>,
) {
	let event_result = handle_event_route(event, &http_client, application_id, &config, &cache, bot_state).await;
	if let Err(error) = event_result {
		tracing::error!(source = ?error, "An error occurred handling a gateway event");
	}
}

async fn handle_event_route(
	event: Event,
	http_client: &Arc<Client>,
	application_id: Id<ApplicationMarker>,
	config: &Arc<ConfigData>,
	cache: &DefaultInMemoryCache,
	bot_state: Arc<RwLock<BotState>>,
) -> miette::Result<()> {
	tracing::debug!("Incoming gateway message: {:?}", event);
	let guild_id = event.guild_id();
	match event {
		Event::InteractionCreate(interaction) => match &interaction.data {
			Some(InteractionData::ApplicationCommand(command_data)) => {
				route_command(
					&interaction,
					command_data,
					http_client,
					application_id,
					config,
					bot_state,
				)
				.await?;
			}
			Some(InteractionData::MessageComponent(interaction_data)) => {
				route_interaction(
					&interaction,
					interaction_data,
					http_client,
					application_id,
					config,
					bot_state,
				)
				.await?;
			}
			_ => (),
		},
		Event::MessageCreate(message) => handle_message(&message, http_client, config, &bot_state).await?,
		Event::GuildCreate(_) => {
			if let Some(guild_id) = guild_id {
				recover_tickets(guild_id, cache, &bot_state).await;
			}
		}
		Event::ChannelDelete(channel) => forget_channel(channel.id, &bot_state).await,
		Event::Ready(ready) => {
			tracing::info!(user = %ready.user.name, "Discord gateway is ready");
		}
		_ => (),
	}
	Ok(())
}
