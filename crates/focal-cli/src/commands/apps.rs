/// Unproductive-list command handlers
use anyhow::Result;

use focal_core::config::{default_list_path, UnproductiveList};
use focal_core::ipc::{IpcRequest, IpcResponse};

use crate::AppsAction;

use super::helpers;

pub async fn handle_apps_command(action: AppsAction) -> Result<()> {
    match action {
        AppsAction::Add { name } => add_app(&name).await,
        AppsAction::Remove { name } => remove_app(&name).await,
        AppsAction::List => list_apps().await,
    }
}

/// Route a mutation through the daemon when one is running (so the live
/// classifier sees it immediately), otherwise edit the persisted file.
async fn add_app(name: &str) -> Result<()> {
    let changed = match send(IpcRequest::AddApp(name.to_string())).await {
        Some(changed) => changed,
        None => {
            let path = default_list_path()?;
            let mut list = UnproductiveList::load(&path)?;
            let changed = list.add(name);
            if changed {
                list.save(&path)?;
            }
            changed
        }
    };

    if changed {
        println!("Added '{}' to the unproductive list.", name.trim().to_lowercase());
    } else {
        println!("'{name}' is already on the unproductive list.");
    }
    Ok(())
}

async fn remove_app(name: &str) -> Result<()> {
    let changed = match send(IpcRequest::RemoveApp(name.to_string())).await {
        Some(changed) => changed,
        None => {
            let path = default_list_path()?;
            let mut list = UnproductiveList::load(&path)?;
            let changed = list.remove(name);
            if changed {
                list.save(&path)?;
            }
            changed
        }
    };

    if changed {
        println!("Removed '{}' from the unproductive list.", name.trim().to_lowercase());
    } else {
        println!("'{name}' is not on the unproductive list.");
    }
    Ok(())
}

async fn list_apps() -> Result<()> {
    let apps = match helpers::client() {
        Ok(client) => match client.send_command(IpcRequest::ListApps).await {
            Ok(IpcResponse::Apps(apps)) => apps,
            _ => UnproductiveList::load(&default_list_path()?)?.apps(),
        },
        Err(_) => UnproductiveList::load(&default_list_path()?)?.apps(),
    };

    if apps.is_empty() {
        println!("The unproductive list is empty.");
        return Ok(());
    }

    println!("Unproductive applications:");
    for app in apps {
        println!("  {app}");
    }
    Ok(())
}

/// `Some(changed)` when the daemon handled the mutation, `None` when it is
/// not reachable.
async fn send(request: IpcRequest) -> Option<bool> {
    let client = helpers::client().ok()?;
    match client.send_command(request).await {
        Ok(IpcResponse::Updated { changed }) => Some(changed),
        _ => None,
    }
}
