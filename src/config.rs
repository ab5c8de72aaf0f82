// © 2024 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use kdl::{KdlDocument, KdlNode, KdlValue};
use miette::{IntoDiagnostic, Result, bail, miette};
use tokio::fs::read_to_string;
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, GuildMarker, RoleMarker};

pub const DEFAULT_PURCHASE_START: u64 = 8828;
pub const DEFAULT_SUPPORT_START: u64 = 0;
pub const DEFAULT_THEME_COLOR: u32 = 0x00cf91;
pub const DEFAULT_BRAND_NAME: &str = "Ticket Desk";

pub async fn parse_config(config_path: &str) -> Result<ConfigData> {
	let config_file_contents = read_to_string(config_path).await.into_diagnostic()?;
	parse_config_str(&config_file_contents)
}

pub fn parse_config_str(config_file_contents: &str) -> Result<ConfigData> {
	let document: KdlDocument = config_file_contents.parse()?;

	let Some(discord) = document.get("discord").and_then(|node| node.children()) else {
		bail!("Configuration is missing the `discord` block");
	};
	let Some(bot_token) = discord.get_arg("bot_token").and_then(|value| value.as_string()) else {
		bail!("Configuration is missing `discord.bot_token`");
	};
	let discord = DiscordConfig {
		bot_token: bot_token.to_string(),
		command_guild: optional_id(discord, "command_guild")?,
	};

	let roles = match block(&document, "roles") {
		Some(roles) => RoleConfig {
			purchase_handler: optional_id(roles, "purchase_handler")?,
			support_handler: optional_id(roles, "support_handler")?,
			premium: optional_id(roles, "premium")?,
		},
		None => RoleConfig::default(),
	};

	let tickets = match block(&document, "tickets") {
		Some(tickets) => TicketConfig {
			category: optional_id(tickets, "category")?,
			purchase_start: optional_u64(tickets, "purchase_start")?.unwrap_or(DEFAULT_PURCHASE_START),
			support_start: optional_u64(tickets, "support_start")?.unwrap_or(DEFAULT_SUPPORT_START),
		},
		None => TicketConfig::default(),
	};

	let purchase = match block(&document, "purchase") {
		Some(purchase) => PurchaseConfig {
			price: optional_string(purchase, "price")?,
			payment_methods: payment_methods(purchase)?,
			premium_panel_channel: optional_id(purchase, "premium_panel_channel")?,
			tutorial_image: optional_string(purchase, "tutorial_image")?,
		},
		None => PurchaseConfig::default(),
	};

	let appearance = match block(&document, "appearance") {
		Some(appearance) => {
			let color = match optional_u64(appearance, "color")? {
				Some(color) => u32::try_from(color)
					.ok()
					.filter(|color| *color <= 0xffffff)
					.ok_or_else(|| miette!("`appearance.color` must be an RGB value"))?,
				None => DEFAULT_THEME_COLOR,
			};
			AppearanceConfig {
				name: optional_string(appearance, "name")?.unwrap_or_else(|| String::from(DEFAULT_BRAND_NAME)),
				color,
			}
		}
		None => AppearanceConfig::default(),
	};

	Ok(ConfigData {
		discord,
		roles,
		tickets,
		purchase,
		appearance,
	})
}

fn block<'a>(document: &'a KdlDocument, name: &str) -> Option<&'a KdlDocument> {
	document.get(name).and_then(KdlNode::children)
}

fn optional_u64(document: &KdlDocument, name: &str) -> Result<Option<u64>> {
	let Some(value) = document.get_arg(name) else {
		return Ok(None);
	};
	match value {
		KdlValue::Integer(value) => match u64::try_from(*value) {
			Ok(value) => Ok(Some(value)),
			Err(_) => bail!("`{}` must be a non-negative integer", name),
		},
		KdlValue::Null => Ok(None),
		_ => bail!("`{}` must be an integer", name),
	}
}

fn optional_id<T>(document: &KdlDocument, name: &str) -> Result<Option<Id<T>>> {
	match optional_u64(document, name)? {
		Some(value) => match Id::new_checked(value) {
			Some(id) => Ok(Some(id)),
			None => bail!("`{}` must be a Discord ID (non-zero)", name),
		},
		None => Ok(None),
	}
}

fn optional_string(document: &KdlDocument, name: &str) -> Result<Option<String>> {
	match document.get_arg(name) {
		Some(KdlValue::String(value)) => Ok(Some(value.clone())),
		Some(KdlValue::Null) | None => Ok(None),
		Some(_) => bail!("`{}` must be a string", name),
	}
}

fn payment_methods(document: &KdlDocument) -> Result<Vec<PaymentMethod>> {
	let mut methods = Vec::new();
	for node in document.nodes().iter().filter(|node| node.name().value() == "payment_method") {
		let mut arguments = node
			.entries()
			.iter()
			.filter(|entry| entry.name().is_none())
			.map(|entry| entry.value().as_string());
		let (Some(Some(name)), Some(Some(url))) = (arguments.next(), arguments.next()) else {
			bail!("`payment_method` takes two string arguments: a name and a URL");
		};
		methods.push(PaymentMethod {
			name: name.to_string(),
			url: url.to_string(),
		});
	}
	Ok(methods)
}

#[derive(Debug)]
pub struct ConfigData {
	pub discord: DiscordConfig,
	pub roles: RoleConfig,
	pub tickets: TicketConfig,
	pub purchase: PurchaseConfig,
	pub appearance: AppearanceConfig,
}

#[derive(Debug)]
pub struct DiscordConfig {
	pub bot_token: String,
	/// When set, commands are registered for this guild only, which takes effect immediately.
	pub command_guild: Option<Id<GuildMarker>>,
}

#[derive(Debug, Default)]
pub struct RoleConfig {
	pub purchase_handler: Option<Id<RoleMarker>>,
	pub support_handler: Option<Id<RoleMarker>>,
	pub premium: Option<Id<RoleMarker>>,
}

#[derive(Debug)]
pub struct TicketConfig {
	pub category: Option<Id<ChannelMarker>>,
	pub purchase_start: u64,
	pub support_start: u64,
}

impl Default for TicketConfig {
	fn default() -> Self {
		Self {
			category: None,
			purchase_start: DEFAULT_PURCHASE_START,
			support_start: DEFAULT_SUPPORT_START,
		}
	}
}

#[derive(Debug, Default)]
pub struct PurchaseConfig {
	pub price: Option<String>,
	pub payment_methods: Vec<PaymentMethod>,
	pub premium_panel_channel: Option<Id<ChannelMarker>>,
	pub tutorial_image: Option<String>,
}

#[derive(Debug)]
pub struct PaymentMethod {
	pub name: String,
	pub url: String,
}

#[derive(Debug)]
pub struct AppearanceConfig {
	pub name: String,
	pub color: u32,
}

impl Default for AppearanceConfig {
	fn default() -> Self {
		Self {
			name: String::from(DEFAULT_BRAND_NAME),
			color: DEFAULT_THEME_COLOR,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn minimal_config_uses_defaults() {
		let config = parse_config_str("discord {\n\tbot_token \"abc\"\n}\n").unwrap();
		assert_eq!(config.discord.bot_token, "abc");
		assert!(config.discord.command_guild.is_none());
		assert!(config.roles.premium.is_none());
		assert_eq!(config.tickets.purchase_start, 8828);
		assert_eq!(config.tickets.support_start, 0);
		assert_eq!(config.appearance.color, 0x00cf91);
		assert!(config.purchase.payment_methods.is_empty());
	}

	#[test]
	fn full_config_is_read() {
		let contents = r#"
discord {
	bot_token "token"
	command_guild 42
}
roles {
	purchase_handler 10
	support_handler 11
	premium 12
}
tickets {
	category 20
	purchase_start 100
	support_start 5
}
purchase {
	price "Rp 40.000"
	payment_method "QRIS" "https://example.com/qris.png"
	payment_method "PayPal" "https://paypal.me/example"
	premium_panel_channel 30
	tutorial_image "https://example.com/tutorial.png"
}
appearance {
	name "LimeHub"
	color 255
}
"#;
		let config = parse_config_str(contents).unwrap();
		assert_eq!(config.discord.command_guild, Some(Id::new(42)));
		assert_eq!(config.roles.purchase_handler, Some(Id::new(10)));
		assert_eq!(config.roles.support_handler, Some(Id::new(11)));
		assert_eq!(config.roles.premium, Some(Id::new(12)));
		assert_eq!(config.tickets.category, Some(Id::new(20)));
		assert_eq!(config.tickets.purchase_start, 100);
		assert_eq!(config.tickets.support_start, 5);
		assert_eq!(config.purchase.price.as_deref(), Some("Rp 40.000"));
		assert_eq!(config.purchase.payment_methods.len(), 2);
		assert_eq!(config.purchase.payment_methods[1].name, "PayPal");
		assert_eq!(config.purchase.premium_panel_channel, Some(Id::new(30)));
		assert_eq!(config.appearance.name, "LimeHub");
		assert_eq!(config.appearance.color, 255);
	}

	#[test]
	fn missing_token_is_rejected() {
		assert!(parse_config_str("roles {\n\tpremium 1\n}\n").is_err());
	}

	#[test]
	fn zero_id_is_rejected() {
		let contents = "discord {\n\tbot_token \"abc\"\n}\nroles {\n\tpremium 0\n}\n";
		assert!(parse_config_str(contents).is_err());
	}

	#[test]
	fn incomplete_payment_method_is_rejected() {
		let contents = "discord {\n\tbot_token \"abc\"\n}\npurchase {\n\tpayment_method \"QRIS\"\n}\n";
		assert!(parse_config_str(contents).is_err());
	}
}
