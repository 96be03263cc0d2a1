//! Slash command definitions, interaction parsing, and reply rendering.

use serenity::all::{
    Command as GlobalCommand, CommandInteraction, CommandOptionType, CreateCommand,
    CreateCommandOption, Http, Permissions, ResolvedOption, ResolvedValue,
};

use {
    tempvox_commands::{Command, Reply},
    tempvox_platform::{Principal, RoleId, SetupOutcome},
    tempvox_registry::{ChannelId, GuildId, UserId},
};

fn sub(name: &str, description: &str) -> CreateCommandOption {
    CreateCommandOption::new(CommandOptionType::SubCommand, name, description)
}

/// The slash command set registered on ready.
pub fn definitions() -> Vec<CreateCommand> {
    vec![
        CreateCommand::new("setup")
            .description("Create the join-to-create voice system")
            .default_member_permissions(Permissions::ADMINISTRATOR)
            .dm_permission(false),
        CreateCommand::new("vc")
            .description("Voice channel controls")
            .dm_permission(false)
            .add_option(sub("lock", "Lock your voice channel"))
            .add_option(
                sub("permit", "Allow a user or role to join your channel").add_sub_option(
                    CreateCommandOption::new(
                        CommandOptionType::Mentionable,
                        "target",
                        "User or role to allow",
                    )
                    .required(true),
                ),
            )
            .add_option(
                sub("reject", "Block a user or role from your channel").add_sub_option(
                    CreateCommandOption::new(
                        CommandOptionType::Mentionable,
                        "target",
                        "User or role to block",
                    )
                    .required(true),
                ),
            )
            .add_option(
                sub("rename", "Rename your voice channel").add_sub_option(
                    CreateCommandOption::new(
                        CommandOptionType::String,
                        "name",
                        "New name for the channel",
                    )
                    .required(true),
                ),
            )
            .add_option(
                sub("expire", "Auto-delete your channel after a delay").add_sub_option(
                    CreateCommandOption::new(
                        CommandOptionType::Integer,
                        "minutes",
                        "Minutes until the channel deletes itself",
                    )
                    .min_int_value(1)
                    .max_int_value(1440)
                    .required(true),
                ),
            )
            .add_option(
                sub("transfer", "Transfer ownership of your channel").add_sub_option(
                    CreateCommandOption::new(
                        CommandOptionType::User,
                        "new_owner",
                        "The member to transfer ownership to",
                    )
                    .required(true),
                ),
            ),
        CreateCommand::new("purge")
            .description("Delete a number of messages from the current channel")
            .default_member_permissions(Permissions::MANAGE_MESSAGES)
            .dm_permission(false)
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::Integer,
                    "amount",
                    "The number of messages to delete (1-100)",
                )
                .min_int_value(1)
                .max_int_value(100)
                .required(true),
            ),
    ]
}

/// Register the global command set, returning how many were installed.
pub async fn register_global(http: &Http) -> serenity::Result<usize> {
    let installed = GlobalCommand::set_global_commands(http, definitions()).await?;
    Ok(installed.len())
}

/// Map an interaction onto the recognized command surface.
///
/// Returns `None` for anything malformed or unknown; the caller just drops
/// those.
pub fn parse(interaction: &CommandInteraction) -> Option<Command> {
    let options = interaction.data.options();
    match interaction.data.name.as_str() {
        "setup" => {
            let g = interaction.guild_id?;
            Some(Command::Setup {
                guild: GuildId(g.get()),
            })
        },
        "purge" => {
            let amount = int_arg(&options, "amount")?;
            Some(Command::Purge {
                channel: ChannelId(interaction.channel_id.get()),
                amount,
            })
        },
        "vc" => match options.first()? {
            ResolvedOption {
                name,
                value: ResolvedValue::SubCommand(args),
                ..
            } => parse_vc(name, args),
            _ => None,
        },
        _ => None,
    }
}

fn parse_vc(name: &str, args: &[ResolvedOption<'_>]) -> Option<Command> {
    match name {
        "lock" => Some(Command::Lock),
        "permit" => {
            let target = principal_arg(args, "target")?;
            Some(Command::Permit { target })
        },
        "reject" => {
            let target = principal_arg(args, "target")?;
            Some(Command::Reject { target })
        },
        "rename" => {
            let new_name = string_arg(args, "name")?;
            Some(Command::Rename { name: new_name })
        },
        "expire" => {
            let minutes = int_arg(args, "minutes")?;
            Some(Command::Expire { minutes })
        },
        "transfer" => args.iter().find_map(|opt| match opt {
            ResolvedOption {
                name: "new_owner",
                value: ResolvedValue::User(member, _),
                ..
            } => Some(Command::Transfer {
                new_owner: UserId(member.id.get()),
            }),
            _ => None,
        }),
        _ => None,
    }
}

fn int_arg(args: &[ResolvedOption<'_>], wanted: &str) -> Option<i64> {
    args.iter().find_map(|opt| match opt {
        ResolvedOption {
            name,
            value: ResolvedValue::Integer(n),
            ..
        } if *name == wanted => Some(*n),
        _ => None,
    })
}

fn string_arg(args: &[ResolvedOption<'_>], wanted: &str) -> Option<String> {
    args.iter().find_map(|opt| match opt {
        ResolvedOption {
            name,
            value: ResolvedValue::String(s),
            ..
        } if *name == wanted => Some((*s).to_string()),
        _ => None,
    })
}

/// A mentionable option resolves to either a member or a role.
fn principal_arg(args: &[ResolvedOption<'_>], wanted: &str) -> Option<Principal> {
    args.iter().find_map(|opt| {
        if opt.name != wanted {
            return None;
        }
        match &opt.value {
            ResolvedValue::User(member, _) => Some(Principal::Member(UserId(member.id.get()))),
            ResolvedValue::Role(role) => Some(Principal::Role(RoleId(role.id.get()))),
            _ => None,
        }
    })
}

/// Render a successful reply for the invoking user.
pub fn render_reply(reply: &Reply) -> String {
    match reply {
        Reply::SetupComplete(SetupOutcome::Created) => "Setup complete!".into(),
        Reply::SetupComplete(SetupOutcome::AlreadyExists) => {
            "The join-to-create channel already exists.".into()
        },
        Reply::Locked => "Channel locked.".into(),
        Reply::ConnectChanged {
            target,
            allow: true,
        } => format!("{} is now permitted.", mention(target)),
        Reply::ConnectChanged {
            target,
            allow: false,
        } => format!("{} is now blocked.", mention(target)),
        Reply::Renamed { name } => format!("Channel renamed to **{name}**"),
        Reply::ExpirySet { minutes } => format!("Channel will delete in {minutes} minutes."),
        Reply::Transferred { new_owner } => format!("Ownership transferred to <@{new_owner}>"),
        Reply::Purged { count } => format!("Deleted {count} messages."),
    }
}

fn mention(target: &Principal) -> String {
    match target {
        Principal::Member(member) => format!("<@{member}>"),
        Principal::Role(role) => format!("<@&{role}>"),
        Principal::Everyone => "@everyone".into(),
    }
}
