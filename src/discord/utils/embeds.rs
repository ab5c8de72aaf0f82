// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::config::{AppearanceConfig, PurchaseConfig};
use crate::discord::countdown::format_clock;
use crate::discord::state::faq::FaqItem;
use crate::discord::state::tickets::{QueuePosition, TicketKind};
use twilight_mention::fmt::Mention;
use twilight_model::channel::message::embed::Embed;
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, UserMarker};
use twilight_model::util::datetime::Timestamp;
use twilight_util::builder::embed::{EmbedAuthorBuilder, EmbedBuilder, EmbedFieldBuilder, EmbedFooterBuilder, ImageSource};
use twilight_validate::embed::{DESCRIPTION_LENGTH, EmbedValidationError};

/// Mention text used for a ticket owner who can't be looked up
pub const UNKNOWN_OWNER: &str = "customer";

/// Longest FAQ question shown in an embed
const FAQ_QUESTION_LENGTH: usize = 256;

/// Cuts text down to `max` characters, ending in an ellipsis when anything was cut.
fn truncate_text(text: &str, max: usize) -> String {
	if text.chars().count() <= max {
		return text.to_string();
	}
	let mut truncated: String = text.chars().take(max.saturating_sub(1)).collect();
	truncated.push('…');
	truncated
}

fn themed(appearance: &AppearanceConfig, timestamp: Option<Timestamp>) -> EmbedBuilder {
	let builder = EmbedBuilder::new().color(appearance.color);
	match timestamp {
		Some(timestamp) => builder.timestamp(timestamp),
		None => builder,
	}
}

fn footer(appearance: &AppearanceConfig, section: &str) -> EmbedFooterBuilder {
	EmbedFooterBuilder::new(format!("{} • {}", appearance.name, section))
}

fn premium_panel_mention(purchase: &PurchaseConfig) -> String {
	match purchase.premium_panel_channel {
		Some(channel) => channel.mention().to_string(),
		None => String::from("`#premium-panel`"),
	}
}

pub fn panel_embed(appearance: &AppearanceConfig, timestamp: Option<Timestamp>) -> Embed {
	let description = [
		"Press the button below to open a new ticket.",
		"",
		"Please only use tickets for **purchases** and **support** with our services.",
	]
	.join("\n");
	themed(appearance, timestamp)
		.title(format!("🎟️ {} Ticket Panel", appearance.name))
		.description(description)
		.footer(footer(appearance, "Ticket System"))
		.build()
}

pub fn purchase_intro_embed(
	appearance: &AppearanceConfig,
	purchase: &PurchaseConfig,
	number: u64,
	owner: Id<UserMarker>,
	handler_mention: &str,
	timestamp: Option<Timestamp>,
) -> Embed {
	let mut lines = vec![
		format!(
			"Hello {}, thank you for opening a ticket with **{}**.",
			owner.mention(),
			appearance.name
		),
		String::new(),
	];
	if let Some(price) = &purchase.price {
		lines.push(format!("💵 **Price:** {}", price));
		lines.push(String::new());
	}
	if !purchase.payment_methods.is_empty() {
		lines.push(String::from("Please pay using one of the following methods:"));
		lines.push(String::new());
		for method in purchase.payment_methods.iter() {
			lines.push(format!("🔗 **{}:** [Click here]({})", method.name, method.url));
		}
		lines.push(String::new());
	}
	lines.push(String::from(
		"⚠️ After paying, you **must** upload your proof of payment (a screenshot).",
	));
	lines.push(format!(
		"{} will process your ticket once the proof is received.",
		handler_mention
	));

	themed(appearance, timestamp)
		.title(format!("🎟️ Ticket #{} | {}", number, owner.mention()))
		.description(lines.join("\n"))
		.footer(footer(appearance, "Purchase"))
		.build()
}

pub fn support_intro_embed(
	appearance: &AppearanceConfig,
	number: u64,
	owner: Id<UserMarker>,
	timestamp: Option<Timestamp>,
) -> Embed {
	let description = [
		format!(
			"Hello {}, thank you for opening a **{}** support ticket.",
			owner.mention(),
			appearance.name
		),
		String::new(),
		String::from("Before the team answers directly, please pick one of the questions below."),
		String::from("Many common problems are already answered in the FAQ."),
	]
	.join("\n");
	themed(appearance, timestamp)
		.title(format!("❓ Support Ticket #{} | {}", number, owner.mention()))
		.description(description)
		.footer(footer(appearance, "Support"))
		.build()
}

pub fn faq_menu_embed(appearance: &AppearanceConfig, has_items: bool) -> Embed {
	let description = if has_items {
		String::from("Pick the question that best matches your problem:")
	} else {
		String::from("No FAQ has been set up yet. Pick **Other options** to call the team.")
	};
	themed(appearance, None)
		.title("📚 Support FAQ")
		.description(description)
		.build()
}

pub fn ticket_created_embed(
	appearance: &AppearanceConfig,
	channel_id: Id<ChannelMarker>,
	timestamp: Option<Timestamp>,
) -> Embed {
	let description = [
		format!("Your ticket has been created: {}", channel_id.mention()),
		String::new(),
		String::from("Press the button below to go to your ticket."),
	]
	.join("\n");
	themed(appearance, timestamp)
		.title("✅ Ticket created")
		.description(description)
		.footer(footer(appearance, "Ticket System"))
		.build()
}

pub fn claimed_embed(
	appearance: &AppearanceConfig,
	kind: TicketKind,
	claimed_by: Id<UserMarker>,
	owner_mention: &str,
	timestamp: Option<Timestamp>,
) -> Embed {
	let title = match kind {
		TicketKind::Purchase => "🛠️ Ticket Processing",
		TicketKind::Support => "✅ Question resolved",
	};
	let description = [
		format!("This ticket has been handled by {}.", claimed_by.mention()),
		String::new(),
		format!(
			"Hello {}, all of your questions have been answered. Please leave a review of {} based on your experience!",
			owner_mention, appearance.name
		),
	]
	.join("\n");
	themed(appearance, timestamp)
		.title(title)
		.description(description)
		.build()
}

pub fn done_countdown_embed(
	appearance: &AppearanceConfig,
	purchase: &PurchaseConfig,
	owner_mention: &str,
	seconds_remaining: u32,
	timestamp: Option<Timestamp>,
) -> Embed {
	let description = [
		format!("Hello {}, your ticket is done.", owner_mention),
		String::new(),
		format!("Please continue in {}.", premium_panel_mention(purchase)),
		String::new(),
		String::from("Press **Get Script** to collect your script!"),
		String::new(),
		format!(
			"This ticket closes automatically in **{}**.",
			format_clock(seconds_remaining)
		),
	]
	.join("\n");
	themed(appearance, timestamp)
		.title("✅ Ticket Done")
		.description(description)
		.build()
}

pub fn closed_embed(appearance: &AppearanceConfig, timestamp: Option<Timestamp>) -> Embed {
	themed(appearance, timestamp)
		.title("🔒 Ticket Closed")
		.description(format!(
			"This ticket has been closed. Thank you for using {}.",
			appearance.name
		))
		.build()
}

pub fn closing_embed(appearance: &AppearanceConfig, seconds_remaining: u32, timestamp: Option<Timestamp>) -> Embed {
	let unit = if seconds_remaining == 1 { "second" } else { "seconds" };
	themed(appearance, timestamp)
		.title("🔒 Closing Ticket")
		.description(format!(
			"This ticket will be closed in **{} {}**.",
			seconds_remaining, unit
		))
		.build()
}

/// Builds the displayed answer of an FAQ session. Question and answer are entered by staff, so they're cut to fit the
/// description, keeping the session clock.
pub fn faq_answer_embed(
	appearance: &AppearanceConfig,
	item: &FaqItem,
	seconds_remaining: u32,
	timestamp: Option<Timestamp>,
) -> Result<Embed, EmbedValidationError> {
	let question = format!("**Q: {}**", truncate_text(&item.question, FAQ_QUESTION_LENGTH));
	let session_line = format!("This FAQ session ends in **{}**.", format_clock(seconds_remaining));
	let fixed_length = question.chars().count() + session_line.chars().count() + "**A: **".len() + 4;
	let answer = truncate_text(&item.answer, DESCRIPTION_LENGTH.saturating_sub(fixed_length));
	let description = [
		question,
		String::new(),
		format!("**A: {}**", answer),
		String::new(),
		session_line,
	]
	.join("\n");
	Ok(themed(appearance, timestamp)
		.title("💡 FAQ Answer")
		.description(description)
		.validate()?
		.build())
}

/// Lists the FAQ questions. Entries that don't fit are counted in a last line instead.
pub fn faq_list_embed(
	appearance: &AppearanceConfig,
	items: &[FaqItem],
	timestamp: Option<Timestamp>,
) -> Result<Embed, EmbedValidationError> {
	let mut description = String::new();
	let mut length = 0;
	for (index, item) in items.iter().enumerate() {
		let line = format!("`#{}` **{}**", item.id, truncate_text(&item.question, FAQ_QUESTION_LENGTH));
		let line_length = line.chars().count() + 1;
		if length + line_length > DESCRIPTION_LENGTH - 32 {
			description.push_str(&format!("\n…and {} more", items.len() - index));
			break;
		}
		if !description.is_empty() {
			description.push('\n');
		}
		description.push_str(&line);
		length += line_length;
	}
	Ok(themed(appearance, timestamp)
		.title("📚 FAQ List")
		.description(description)
		.validate()?
		.build())
}

pub fn done_tutorial_embed(appearance: &AppearanceConfig, purchase: &PurchaseConfig, timestamp: Option<Timestamp>) -> Embed {
	let description = [
		String::from("__Script purchased successfully 🛒__"),
		String::new(),
		format!(
			"• The next step is to collect your script in {}.",
			premium_panel_mention(purchase)
		),
		String::from("• Press **\"Get Script\"** to get the script."),
		String::from("• Copy your script and trim anything that isn't part of the script."),
		String::from("• Follow the example in the image."),
		String::from("• Done, you have collected your script correctly!"),
		String::new(),
		String::from(
			"If you run into problems executing the script, make sure you did it the same way as the example image below.",
		),
	]
	.join("\n");
	let mut builder = themed(appearance, timestamp)
		.author(EmbedAuthorBuilder::new("Ticket Staff"))
		.title("Done!")
		.description(description)
		.footer(footer(appearance, "Purchase"));
	if let Some(image_url) = &purchase.tutorial_image {
		match ImageSource::url(image_url) {
			Ok(image) => builder = builder.image(image),
			Err(error) => tracing::warn!(source = ?error, "configured tutorial image isn't a valid image URL"),
		}
	}
	builder.build()
}

pub fn queue_embed(
	appearance: &AppearanceConfig,
	requester: Id<UserMarker>,
	queue_position: &QueuePosition,
	timestamp: Option<Timestamp>,
) -> Embed {
	let position = format!(
		"```yaml\n🚀 POSITION: #{} of {}\n```",
		queue_position.position, queue_position.total
	);
	themed(appearance, timestamp)
		.title("📊 QUEUE STATUS")
		.description(format!(
			"Hello {}, your proof of payment has been received ✅",
			requester.mention()
		))
		.field(EmbedFieldBuilder::new("__YOUR QUEUE POSITION__", position))
		.field(EmbedFieldBuilder::new("✨", "Your ticket will be processed shortly!"))
		.footer(footer(appearance, "Ticket System"))
		.build()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn purchase_intro_lists_price_and_payment_methods() {
		let appearance = AppearanceConfig::default();
		let purchase = PurchaseConfig {
			price: Some(String::from("Rp 40.000")),
			payment_methods: vec![crate::config::PaymentMethod {
				name: String::from("PayPal"),
				url: String::from("https://paypal.me/example"),
			}],
			..PurchaseConfig::default()
		};
		let embed = purchase_intro_embed(&appearance, &purchase, 8829, Id::new(5), "Staff", None);
		let description = embed.description.unwrap();
		assert!(description.contains("Rp 40.000"));
		assert!(description.contains("[Click here](https://paypal.me/example)"));
		assert!(description.contains("Staff will process"));
		assert_eq!(embed.title.unwrap(), "🎟️ Ticket #8829 | <@5>");
		assert_eq!(embed.color, Some(0x00cf91));
	}

	#[test]
	fn done_countdown_shows_clock_and_panel_fallback() {
		let embed = done_countdown_embed(
			&AppearanceConfig::default(),
			&PurchaseConfig::default(),
			UNKNOWN_OWNER,
			59,
			None,
		);
		let description = embed.description.unwrap();
		assert!(description.contains("**00:00:59**"));
		assert!(description.contains("`#premium-panel`"));
		assert!(description.contains("Hello customer"));
	}

	#[test]
	fn queue_embed_reports_position_and_total() {
		let position = QueuePosition { position: 2, total: 5 };
		let embed = queue_embed(&AppearanceConfig::default(), Id::new(9), &position, None);
		assert!(embed.fields[0].value.contains("#2 of 5"));
	}

	#[test]
	fn long_faq_answer_is_cut_to_fit() {
		let item = FaqItem {
			id: String::from("1"),
			question: "q".repeat(300),
			answer: "a".repeat(4100),
		};
		let embed = faq_answer_embed(&AppearanceConfig::default(), &item, 300, None).unwrap();
		let description = embed.description.unwrap();
		assert!(description.chars().count() <= DESCRIPTION_LENGTH);
		assert!(description.contains("a…**"));
		assert!(description.contains(&format!("**Q: {}…**", "q".repeat(FAQ_QUESTION_LENGTH - 1))));
		assert!(description.ends_with("This FAQ session ends in **00:05:00**."));
	}

	#[test]
	fn short_faq_answer_is_shown_whole() {
		let item = FaqItem {
			id: String::from("2"),
			question: String::from("How do I pay?"),
			answer: String::from("Use one of the listed methods."),
		};
		let embed = faq_answer_embed(&AppearanceConfig::default(), &item, 59, None).unwrap();
		assert_eq!(
			embed.description.unwrap(),
			"**Q: How do I pay?**\n\n**A: Use one of the listed methods.**\n\nThis FAQ session ends in **00:00:59**."
		);
	}

	#[test]
	fn long_faq_list_counts_what_does_not_fit() {
		let items: Vec<FaqItem> = (1..=45)
			.map(|id| FaqItem {
				id: id.to_string(),
				question: "q".repeat(100),
				answer: String::from("a"),
			})
			.collect();
		let embed = faq_list_embed(&AppearanceConfig::default(), &items, None).unwrap();
		let description = embed.description.unwrap();
		assert!(description.chars().count() <= DESCRIPTION_LENGTH);
		assert!(description.starts_with("`#1` **"));
		assert!(description.ends_with(" more"));
		assert!(description.contains("\n…and "));
	}
}
