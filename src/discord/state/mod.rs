// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::config::TicketConfig;
use faq::{FaqRegistry, FaqSessions};
use tickets::TicketRegistry;

pub mod faq;
pub mod tickets;

/// All in-memory bot state. Shared between event tasks as `Arc<RwLock<BotState>>`; the lock must not be held across
/// requests to Discord.
#[derive(Debug)]
pub struct BotState {
	pub tickets: TicketRegistry,
	pub faq: FaqRegistry,
	pub faq_sessions: FaqSessions,
}

impl BotState {
	pub fn new(ticket_config: &TicketConfig) -> Self {
		Self {
			tickets: TicketRegistry::new(ticket_config.purchase_start, ticket_config.support_start),
			faq: FaqRegistry::default(),
			faq_sessions: FaqSessions::default(),
		}
	}
}
