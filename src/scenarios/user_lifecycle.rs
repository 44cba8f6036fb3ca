use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::metrics::{Operation, SampleStore};
use crate::probe::ProbeClient;

// ─── Domain types ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Synthetic users are deterministic and monotonically numbered so
/// re-runs hit the same ids.
fn synthetic_user(n: usize) -> UserRecord {
    UserRecord {
        id: (n + 1).to_string(),
        name: format!("Test User {}", n + 1),
        email: format!("user{}@example.com", n + 1),
    }
}

// ─── Scenario driver ─────────────────────────────────────────────

/// Create users against the backend, list them back through the proxy,
/// then delete them by id. Request failures are recorded and logged,
/// never fatal; the run continues to the next step.
pub async fn run(client: &ProbeClient, cfg: &Config, store: &mut SampleStore) -> Vec<UserRecord> {
    let created = create_users(client, cfg, store).await;
    list_users(client, cfg, store).await;
    delete_users(client, cfg, store, &created).await;
    created
}

/// POST each synthetic user to the backend. Only a 201 with a parseable
/// body counts as a successful creation; every attempt records a sample.
pub async fn create_users(
    client: &ProbeClient,
    cfg: &Config,
    store: &mut SampleStore,
) -> Vec<UserRecord> {
    println!();
    println!("Creating {} test users...", cfg.num_users);

    let url = format!("{}/users", cfg.server_url);
    let mut created = Vec::with_capacity(cfg.num_users);

    for i in 0..cfg.num_users {
        let user = synthetic_user(i);
        let outcome = client.post_json(&url, &user, cfg.request_timeout()).await;
        store.record(Operation::CreateUser, outcome.elapsed, outcome.status(), false);

        match &outcome.result {
            Ok(resp) if resp.status == 201 => match resp.json::<UserRecord>() {
                Ok(echoed) => {
                    println!("   ✓ created user {}", echoed.id);
                    created.push(echoed);
                }
                Err(err) => {
                    println!("   ✗ user {} created but response was not valid JSON", i + 1);
                    tracing::warn!(%err, "malformed create-user response body");
                }
            },
            Ok(resp) => {
                println!("   ✗ create user {} returned status {}", i + 1, resp.status);
            }
            Err(err) => {
                println!("   ✗ create user {} failed: {err}", i + 1);
            }
        }
    }

    created
}

/// One GET through the proxy for the full user list.
pub async fn list_users(
    client: &ProbeClient,
    cfg: &Config,
    store: &mut SampleStore,
) -> Vec<UserRecord> {
    println!();
    println!("Retrieving users through proxy...");

    let url = format!("{}/users", cfg.proxy_url);
    let outcome = client
        .get(&url, Some(&cfg.host_header()), cfg.request_timeout())
        .await;
    store.record(Operation::GetUsers, outcome.elapsed, outcome.status(), false);

    match &outcome.result {
        Ok(resp) if resp.status == 200 => match resp.json::<Vec<UserRecord>>() {
            Ok(users) => {
                println!("   ✓ retrieved {} users", users.len());
                users
            }
            Err(err) => {
                println!("   ✗ user list body was not valid JSON");
                tracing::warn!(%err, "malformed user list body");
                Vec::new()
            }
        },
        Ok(resp) => {
            println!("   ✗ failed to retrieve users (status {})", resp.status);
            Vec::new()
        }
        Err(err) => {
            println!("   ✗ failed to retrieve users: {err}");
            Vec::new()
        }
    }
}

/// DELETE each created user by id. Non-2xx answers are logged failures.
pub async fn delete_users(
    client: &ProbeClient,
    cfg: &Config,
    store: &mut SampleStore,
    users: &[UserRecord],
) {
    if users.is_empty() {
        return;
    }

    println!();
    println!("Deleting {} users...", users.len());

    for user in users {
        let url = format!("{}/users/{}", cfg.server_url, user.id);
        let outcome = client.delete(&url, cfg.request_timeout()).await;
        store.record(Operation::DeleteUser, outcome.elapsed, outcome.status(), false);

        match &outcome.result {
            Ok(resp) if (200..300).contains(&resp.status) => {
                println!("   ✓ deleted user {}", user.id);
            }
            Ok(resp) => {
                println!("   ✗ delete of user {} returned status {}", user.id, resp.status);
                tracing::warn!(id = %user.id, status = resp.status, "delete rejected");
            }
            Err(err) => {
                println!("   ✗ delete of user {} failed: {err}", user.id);
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_users_are_monotonically_numbered() {
        let first = synthetic_user(0);
        assert_eq!(first.id, "1");
        assert_eq!(first.name, "Test User 1");
        assert_eq!(first.email, "user1@example.com");

        let fifth = synthetic_user(4);
        assert_eq!(fifth.id, "5");
        assert_eq!(fifth.email, "user5@example.com");
    }
}
