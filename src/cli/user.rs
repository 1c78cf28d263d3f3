use serde::Serialize;

use crate::auth::Argon2Verifier;
use crate::error::Error;
use crate::store::Store;
use crate::types::Role;
use crate::validation::{validate_password, validate_username};

use super::init_store;
use super::pickers::{
    confirm_action, get_or_pick_user, password_or_prompt, pick_role, text_or_prompt,
};

pub fn run_user_add(
    data_dir: String,
    username: Option<String>,
    password: Option<String>,
    role: Option<String>,
    non_interactive: bool,
) -> anyhow::Result<()> {
    let (_config, store) = init_store(&data_dir)?;

    let username = text_or_prompt(username, "Username:", "--username", None, non_interactive)?;
    validate_username(&username)?;

    if store.get_user_by_username(&username)?.is_some() {
        anyhow::bail!("User '{}' already exists", username);
    }

    let role = match role {
        Some(r) => r.parse::<Role>()?,
        None if non_interactive => anyhow::bail!("--role is required in non-interactive mode"),
        None => match pick_role()? {
            Some(r) => r,
            None => {
                println!("Cancelled.");
                return Ok(());
            }
        },
    };

    let password = password_or_prompt(password, non_interactive)?;
    validate_password(&password)?;

    let hash = Argon2Verifier::new().hash(&password)?;
    let user = match store.create_user(&username, &hash, role) {
        Ok(user) => user,
        Err(Error::AlreadyExists) => anyhow::bail!("User '{}' already exists", username),
        Err(e) => return Err(e.into()),
    };

    tracing::info!("Created user '{}' ({})", user.username, role.as_str());

    println!();
    println!(
        "Created {} \"{}\" with id {}",
        role.as_str(),
        user.username,
        user.id
    );
    println!();

    Ok(())
}

pub fn run_user_remove(
    data_dir: String,
    user_id: Option<i64>,
    non_interactive: bool,
    yes: bool,
) -> anyhow::Result<()> {
    let (_config, store) = init_store(&data_dir)?;

    let user = match get_or_pick_user(&store, user_id, non_interactive)? {
        Some(user) => user,
        None => return Ok(()),
    };

    if user.role == Role::Admin {
        let admins = store
            .list_users()?
            .into_iter()
            .filter(|u| u.role == Role::Admin)
            .count();
        if admins <= 1 {
            anyhow::bail!("Cannot remove the last administrator");
        }
    }

    let confirmed = confirm_action(
        &format!(
            "Delete user '{}'? This will also delete their grades.",
            user.username
        ),
        yes,
        non_interactive,
    )?;

    if !confirmed {
        println!("Cancelled.");
        return Ok(());
    }

    store.delete_user(user.id)?;
    tracing::info!("Deleted user '{}'", user.username);

    println!();
    println!("Deleted user '{}'", user.username);
    println!();

    Ok(())
}

#[derive(Serialize)]
struct UserOutput {
    id: i64,
    username: String,
    role: Role,
    hashed: bool,
}

pub fn run_user_list(data_dir: String, json: bool) -> anyhow::Result<()> {
    let (_config, store) = init_store(&data_dir)?;

    let users: Vec<UserOutput> = store
        .list_users()?
        .into_iter()
        .map(|u| UserOutput {
            hashed: Argon2Verifier::is_hashed(&u.password),
            id: u.id,
            username: u.username,
            role: u.role,
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&users)?);
        return Ok(());
    }

    if users.is_empty() {
        println!("No users found.");
        return Ok(());
    }

    println!();
    for u in &users {
        let note = if u.hashed { "" } else { "  (plaintext password)" };
        println!("  {:<4} {:<24} {}{}", u.id, u.username, u.role.as_str(), note);
    }
    println!();

    Ok(())
}
