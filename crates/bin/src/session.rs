//! One CLI invocation's view of the forum.
//!
//! Opens the ledger over the persisted store, resolves usernames, and writes
//! the store back after commands that change it.

use std::{path::PathBuf, sync::Arc};

use quorum::{
    Ledger, NodeId, UserId,
    store::{EntityStore, InMemory},
};

use crate::{
    backend::{load_settings, open_store, save_store},
    cli::StoreArgs,
};

pub struct Session {
    pub ledger: Ledger,
    data_file: PathBuf,
}

impl Session {
    pub fn open(args: &StoreArgs) -> Result<Self, Box<dyn std::error::Error>> {
        let settings = load_settings(args)?;
        let store: Arc<dyn EntityStore> = open_store(args)?;
        let ledger = Ledger::open(store, settings)?;
        Ok(Self {
            ledger,
            data_file: args.data_file.clone(),
        })
    }

    /// Persist every change made through this session.
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let store = self
            .ledger
            .store()
            .as_any()
            .downcast_ref::<InMemory>()
            .ok_or("Ledger is not backed by an in-memory store")?;
        save_store(store, &self.data_file)
    }

    /// Resolve the acting user; `None` acts anonymously.
    pub fn actor(&self, username: Option<&str>) -> Result<Option<UserId>, Box<dyn std::error::Error>> {
        username.map(|name| self.user_id(name)).transpose()
    }

    pub fn user_id(&self, username: &str) -> Result<UserId, Box<dyn std::error::Error>> {
        match self.ledger.find_user(username)? {
            Some(user) => Ok(user.id),
            None => Err(format!("No such user: {username}").into()),
        }
    }
}

/// Parse a node id given on the command line.
pub fn node_id(raw: &str) -> NodeId {
    NodeId::from(raw.trim())
}
