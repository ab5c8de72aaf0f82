// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::state::BotState;
use super::state::tickets::{TicketCountdown, TicketKind};
use super::utils::outbound::TicketChannelOps;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::{Duration, Instant, interval_at, sleep};
use twilight_model::channel::message::Embed;
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, MessageMarker};

pub const TICK: Duration = Duration::from_secs(1);

/// Time between a purchase ticket being claimed and the done countdown appearing
pub const CLAIM_SETTLE_DELAY: Duration = Duration::from_secs(5);
pub const DONE_COUNTDOWN_SECONDS: u32 = 60;
pub const CLOSED_NOTICE_DELAY: Duration = Duration::from_secs(1);
pub const CHANNEL_DELETE_DELAY: Duration = Duration::from_secs(1);

pub const CLOSE_COUNTDOWN_SECONDS: u32 = 3;
pub const FAQ_SESSION_SECONDS: u32 = 300;

/// Formats a number of seconds as `00:MM:SS`
pub fn format_clock(seconds: u32) -> String {
	format!("00:{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Calls `render` once per tick with the seconds remaining, from `seconds - 1` down to zero. The first call happens one
/// tick after this is called.
pub async fn count_down<F, Fut>(seconds: u32, mut render: F)
where
	F: FnMut(u32) -> Fut,
	Fut: Future<Output = ()>,
{
	let mut ticker = interval_at(Instant::now() + TICK, TICK);
	let mut remaining = seconds;
	while remaining > 0 {
		ticker.tick().await;
		remaining -= 1;
		render(remaining).await;
	}
}

async fn edit_quietly<O>(ops: &O, channel_id: Id<ChannelMarker>, message_id: Id<MessageMarker>, embed: Embed)
where
	O: TicketChannelOps + ?Sized,
{
	if let Err(error) = ops.edit_embed(channel_id, message_id, embed).await {
		tracing::debug!(source = ?error, %channel_id, "failed to update countdown message");
	}
}

async fn delete_quietly<O>(ops: &O, channel_id: Id<ChannelMarker>) -> bool
where
	O: TicketChannelOps + ?Sized,
{
	match ops.remove_channel(channel_id).await {
		Ok(()) => true,
		Err(error) => {
			tracing::debug!(source = ?error, %channel_id, "failed to delete ticket channel");
			false
		}
	}
}

/// Runs the close sequence of a claimed purchase ticket: a settle delay, a done message counting down, a closed
/// notice, and the channel deletion. Returns whether the channel was deleted.
pub async fn run_purchase_auto_close<O, D>(
	ops: &O,
	channel_id: Id<ChannelMarker>,
	done_embed: D,
	closed_embed: Embed,
) -> bool
where
	O: TicketChannelOps + ?Sized,
	D: Fn(u32) -> Embed + Send + Sync,
{
	sleep(CLAIM_SETTLE_DELAY).await;

	let message_id = match ops.send_embed(channel_id, done_embed(DONE_COUNTDOWN_SECONDS)).await {
		Ok(message_id) => message_id,
		Err(error) => {
			tracing::debug!(source = ?error, %channel_id, "failed to post ticket done message");
			return false;
		}
	};

	let done_embed = &done_embed;
	count_down(DONE_COUNTDOWN_SECONDS, move |remaining| {
		let embed = done_embed(remaining);
		edit_quietly(ops, channel_id, message_id, embed)
	})
	.await;

	sleep(CLOSED_NOTICE_DELAY).await;
	if let Err(error) = ops.send_embed(channel_id, closed_embed).await {
		tracing::debug!(source = ?error, %channel_id, "failed to post ticket closed message");
	}

	sleep(CHANNEL_DELETE_DELAY).await;
	delete_quietly(ops, channel_id).await
}

/// Counts down an already-posted closing message and deletes the channel when it reaches zero. Returns whether the
/// channel was deleted.
pub async fn run_closing_countdown<O, D>(
	ops: &O,
	channel_id: Id<ChannelMarker>,
	message_id: Id<MessageMarker>,
	closing_embed: D,
) -> bool
where
	O: TicketChannelOps + ?Sized,
	D: Fn(u32) -> Embed + Send + Sync,
{
	let closing_embed = &closing_embed;
	count_down(CLOSE_COUNTDOWN_SECONDS, move |remaining| {
		let embed = (remaining > 0).then(|| closing_embed(remaining));
		async move {
			if let Some(embed) = embed {
				edit_quietly(ops, channel_id, message_id, embed).await;
			}
		}
	})
	.await;

	delete_quietly(ops, channel_id).await
}

/// Counts down an already-posted FAQ answer until the session ends.
pub async fn run_faq_session<O, D>(ops: &O, channel_id: Id<ChannelMarker>, message_id: Id<MessageMarker>, answer_embed: D)
where
	O: TicketChannelOps + ?Sized,
	D: Fn(u32) -> Embed + Send + Sync,
{
	let answer_embed = &answer_embed;
	count_down(FAQ_SESSION_SECONDS, move |remaining| {
		let embed = answer_embed(remaining);
		edit_quietly(ops, channel_id, message_id, embed)
	})
	.await;
}

/// Spawns a countdown that ends by deleting a ticket channel and attaches it to the ticket, so that the countdown is
/// cancelled if the ticket goes away first. The ticket is forgotten once its channel is deleted.
async fn spawn_ticket_countdown<F>(
	bot_state: Arc<RwLock<BotState>>,
	channel_id: Id<ChannelMarker>,
	kind: TicketCountdown,
	countdown: F,
) where
	F: Future<Output = bool> + Send + 'static,
{
	let task_state = Arc::clone(&bot_state);
	let task = tokio::spawn(async move {
		if countdown.await {
			task_state.write().await.tickets.remove(channel_id);
		}
	});
	bot_state
		.write()
		.await
		.tickets
		.set_countdown(channel_id, kind, task.abort_handle());
}

/// Starts what follows a claim. Purchase tickets close on their own; support tickets stay open. Returns whether a
/// countdown was started.
pub async fn start_claim_countdown<O, D>(
	bot_state: Arc<RwLock<BotState>>,
	ops: Arc<O>,
	channel_id: Id<ChannelMarker>,
	kind: TicketKind,
	done_embed: D,
	closed_embed: Embed,
) -> bool
where
	O: TicketChannelOps + ?Sized + 'static,
	D: Fn(u32) -> Embed + Send + Sync + 'static,
{
	if kind != TicketKind::Purchase {
		return false;
	}
	let auto_close = async move { run_purchase_auto_close(&*ops, channel_id, done_embed, closed_embed).await };
	spawn_ticket_countdown(bot_state, channel_id, TicketCountdown::AutoClose, auto_close).await;
	true
}

/// Counts down the posted closing message, replacing any automatic close, and puts the ticket back out of the claimed
/// state once the countdown is running.
pub async fn start_closing_countdown<O, D>(
	bot_state: Arc<RwLock<BotState>>,
	ops: Arc<O>,
	channel_id: Id<ChannelMarker>,
	message_id: Id<MessageMarker>,
	closing_embed: D,
) where
	O: TicketChannelOps + ?Sized + 'static,
	D: Fn(u32) -> Embed + Send + Sync + 'static,
{
	let closing = async move { run_closing_countdown(&*ops, channel_id, message_id, closing_embed).await };
	spawn_ticket_countdown(Arc::clone(&bot_state), channel_id, TicketCountdown::Closing, closing).await;
	bot_state.write().await.tickets.release(channel_id);
}

/// Starts the FAQ answer countdown for a channel, replacing the channel's previous session.
pub async fn start_faq_session<O, D>(
	bot_state: Arc<RwLock<BotState>>,
	ops: Arc<O>,
	channel_id: Id<ChannelMarker>,
	message_id: Id<MessageMarker>,
	answer_embed: D,
) where
	O: TicketChannelOps + ?Sized + 'static,
	D: Fn(u32) -> Embed + Send + Sync + 'static,
{
	let mut state = bot_state.write().await;
	let session_id = state.faq_sessions.next_session_id();
	let task_state = Arc::clone(&bot_state);
	let task = tokio::spawn(async move {
		run_faq_session(&*ops, channel_id, message_id, answer_embed).await;
		task_state.write().await.faq_sessions.finish(channel_id, session_id);
	});
	state.faq_sessions.start(channel_id, session_id, task.abort_handle());
}
