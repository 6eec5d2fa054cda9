//! # load_users
//!
//! Builds a user list from mixed DTOs: some carry a user id and are loaded
//! from the user store, some carry a third-party handle and are loaded from
//! the partner API, and the rest become guest users on the spot. Each backend
//! is called once, and the users come back in DTO order.
//!
//! Run with:
//! ```sh
//! cargo run --bin load_users
//!
//! # With funnel internals logged:
//! FUNNEL_LOG_CONFIG='{"components":{"funnel-core":"trace"}}' cargo run --bin load_users
//! ```

use std::cell::Cell;
use std::collections::HashMap;

use anyhow::Result;
use funnel_core::Funnel;
use funnel_observability::{init_tracing, LogConfig};
use tracing::info;

#[derive(Debug, Clone)]
struct User {
    name: String,
    source: &'static str,
}

enum UserDto {
    Stored(u64),
    ThirdParty(String),
    Anonymous { nickname: String },
}

/// Stand-in for a database that serves many ids per query.
struct UserStore {
    rows: HashMap<u64, String>,
    queries: Cell<usize>,
}

impl UserStore {
    fn load_users(&self, ids: &[u64]) -> Vec<User> {
        self.queries.set(self.queries.get() + 1);
        info!("user store: one query for {} ids", ids.len());
        ids.iter()
            .map(|id| User {
                name: self
                    .rows
                    .get(id)
                    .cloned()
                    .unwrap_or_else(|| format!("deleted-{id}")),
                source: "store",
            })
            .collect()
    }
}

/// Stand-in for a partner API with a batch endpoint.
struct ThirdPartyClient {
    requests: Cell<usize>,
}

impl ThirdPartyClient {
    fn load_users(&self, handles: &[String]) -> Result<Vec<User>> {
        self.requests.set(self.requests.get() + 1);
        info!("third party: one request for {} handles", handles.len());
        Ok(handles
            .iter()
            .map(|handle| User {
                name: handle.trim_start_matches('@').to_string(),
                source: "partner",
            })
            .collect())
    }
}

fn guest(nickname: &str) -> User {
    User {
        name: format!("guest:{nickname}"),
        source: "local",
    }
}

fn main() -> Result<()> {
    init_tracing(&LogConfig::from_env("FUNNEL_LOG_CONFIG")?)?;

    let store = UserStore {
        rows: HashMap::from([
            (1, "ada".to_string()),
            (2, "grace".to_string()),
            (3, "linus".to_string()),
        ]),
        queries: Cell::new(0),
    };
    let partner = ThirdPartyClient {
        requests: Cell::new(0),
    };

    let dtos = vec![
        UserDto::Stored(2),
        UserDto::ThirdParty("@margaret".into()),
        UserDto::Anonymous {
            nickname: "visitor".into(),
        },
        UserDto::Stored(1),
        UserDto::Stored(42),
        UserDto::ThirdParty("@barbara".into()),
        UserDto::Stored(3),
    ];

    let funnel = Funnel::new();
    let from_store = funnel.through(|ids: &[u64]| store.load_users(ids));
    let from_partner = funnel.try_through(|handles: &[String]| partner.load_users(handles));
    for dto in dtos {
        match dto {
            UserDto::Stored(id) => from_store.accept(id),
            UserDto::ThirdParty(handle) => from_partner.accept(handle),
            UserDto::Anonymous { nickname } => funnel.add(guest(&nickname)),
        }
    }
    info!(
        "queued {} users ({} from store, {} from partner)",
        funnel.len(),
        from_store.len(),
        from_partner.len()
    );

    let users = funnel.run()?;

    println!("✓ Loaded {} users in DTO order", users.len());
    for (i, user) in users.iter().enumerate() {
        println!("  [{i}] {:<16} ({})", user.name, user.source);
    }
    println!(
        "✓ Backend calls: store={}, partner={}",
        store.queries.get(),
        partner.requests.get()
    );
    Ok(())
}
