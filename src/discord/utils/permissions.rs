// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::config::RoleConfig;
use crate::discord::state::tickets::TicketKind;
use twilight_mention::fmt::Mention;
use twilight_model::guild::Permissions;
use twilight_model::channel::permission_overwrite::{PermissionOverwrite, PermissionOverwriteType};
use twilight_model::id::Id;
use twilight_model::id::marker::{GuildMarker, RoleMarker, UserMarker};

/// The permissions the requester and the handler role both get in a ticket channel
pub fn ticket_participant_permissions() -> Permissions {
	Permissions::VIEW_CHANNEL | Permissions::SEND_MESSAGES | Permissions::READ_MESSAGE_HISTORY
}

/// Builds the overwrites hiding a ticket channel from everyone except its requester and the handler role.
pub fn ticket_channel_overwrites(
	guild_id: Id<GuildMarker>,
	requester: Id<UserMarker>,
	handler_role: Option<Id<RoleMarker>>,
) -> Vec<PermissionOverwrite> {
	let everyone_role_id: Id<RoleMarker> = guild_id.cast();
	let mut overwrites = vec![
		PermissionOverwrite {
			allow: Permissions::empty(),
			deny: Permissions::VIEW_CHANNEL,
			id: everyone_role_id.cast(),
			kind: PermissionOverwriteType::Role,
		},
		PermissionOverwrite {
			allow: ticket_participant_permissions(),
			deny: Permissions::empty(),
			id: requester.cast(),
			kind: PermissionOverwriteType::Member,
		},
	];
	if let Some(handler_role) = handler_role {
		overwrites.push(PermissionOverwrite {
			allow: ticket_participant_permissions(),
			deny: Permissions::empty(),
			id: handler_role.cast(),
			kind: PermissionOverwriteType::Role,
		});
	}
	overwrites
}

/// The role allowed to claim and close tickets of a kind
pub fn handler_role(roles: &RoleConfig, kind: TicketKind) -> Option<Id<RoleMarker>> {
	match kind {
		TicketKind::Purchase => roles.purchase_handler,
		TicketKind::Support => roles.support_handler,
	}
}

/// Whether a member with the given roles may claim or close tickets of a kind. Nobody may when the role isn't configured.
pub fn can_handle(roles: &RoleConfig, kind: TicketKind, member_roles: &[Id<RoleMarker>]) -> bool {
	handler_role(roles, kind).is_some_and(|role| member_roles.contains(&role))
}

/// Whether a member may use `.done`: either handler role qualifies, and anyone may when neither role is configured.
pub fn can_mark_done(roles: &RoleConfig, member_roles: &[Id<RoleMarker>]) -> bool {
	let handler_roles: Vec<Id<RoleMarker>> = [roles.purchase_handler, roles.support_handler]
		.into_iter()
		.flatten()
		.collect();
	handler_roles.is_empty() || handler_roles.iter().any(|role| member_roles.contains(role))
}

pub fn is_premium(roles: &RoleConfig, member_roles: &[Id<RoleMarker>]) -> bool {
	roles.premium.is_some_and(|role| member_roles.contains(&role))
}

pub fn handler_mention(roles: &RoleConfig, kind: TicketKind) -> String {
	match handler_role(roles, kind) {
		Some(role) => role.mention().to_string(),
		None => String::from("Staff"),
	}
}

/// Whether the member using an interaction has the administrator permission in the interaction's guild
pub fn is_administrator(member_permissions: Option<Permissions>) -> bool {
	member_permissions.is_some_and(|permissions| permissions.contains(Permissions::ADMINISTRATOR))
}

/// The role called when a support requester picks "Other options", falling back to the purchase handlers.
pub fn follow_up_role(roles: &RoleConfig) -> Option<Id<RoleMarker>> {
	roles.support_handler.or(roles.purchase_handler)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn roles() -> RoleConfig {
		RoleConfig {
			purchase_handler: Some(Id::new(10)),
			support_handler: Some(Id::new(11)),
			premium: Some(Id::new(12)),
		}
	}

	#[test]
	fn overwrites_hide_channel_from_everyone_else() {
		let overwrites = ticket_channel_overwrites(Id::new(1), Id::new(2), Some(Id::new(10)));
		assert_eq!(overwrites.len(), 3);
		assert_eq!(overwrites[0].id, Id::new(1));
		assert_eq!(overwrites[0].deny, Permissions::VIEW_CHANNEL);
		assert_eq!(overwrites[0].allow, Permissions::empty());
		assert_eq!(overwrites[1].id, Id::new(2));
		assert_eq!(overwrites[1].kind, PermissionOverwriteType::Member);
		assert_eq!(overwrites[2].id, Id::new(10));
		assert_eq!(overwrites[1].deny, Permissions::empty());
		assert_eq!(overwrites[2].allow, ticket_participant_permissions());
		assert_eq!(overwrites[2].kind, PermissionOverwriteType::Role);

		let without_role = ticket_channel_overwrites(Id::new(1), Id::new(2), None);
		assert_eq!(without_role.len(), 2);
	}

	#[test]
	fn each_kind_has_its_own_handler_role() {
		let roles = roles();
		assert!(can_handle(&roles, TicketKind::Purchase, &[Id::new(10)]));
		assert!(!can_handle(&roles, TicketKind::Support, &[Id::new(10)]));
		assert!(can_handle(&roles, TicketKind::Support, &[Id::new(3), Id::new(11)]));
		assert!(!can_handle(&RoleConfig::default(), TicketKind::Purchase, &[Id::new(10)]));
	}

	#[test]
	fn done_is_open_to_both_handler_roles() {
		let roles = roles();
		assert!(can_mark_done(&roles, &[Id::new(10)]));
		assert!(can_mark_done(&roles, &[Id::new(11)]));
		assert!(!can_mark_done(&roles, &[Id::new(12)]));
		assert!(can_mark_done(&RoleConfig::default(), &[]));
	}

	#[test]
	fn follow_up_falls_back_to_purchase_handlers() {
		let mut roles = roles();
		assert_eq!(follow_up_role(&roles), Some(Id::new(11)));
		roles.support_handler = None;
		assert_eq!(follow_up_role(&roles), Some(Id::new(10)));
		assert_eq!(handler_mention(&RoleConfig::default(), TicketKind::Support), "Staff");
		assert_eq!(handler_mention(&roles, TicketKind::Purchase), "<@&10>");
	}

	#[test]
	fn administrator_check_needs_the_permission() {
		assert!(is_administrator(Some(Permissions::ADMINISTRATOR | Permissions::VIEW_CHANNEL)));
		assert!(!is_administrator(Some(Permissions::MANAGE_GUILD)));
		assert!(!is_administrator(None));
	}
}
