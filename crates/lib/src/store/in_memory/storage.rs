//! Core record operations for the in-memory store

use super::Tables;
use crate::{
    Result,
    store::{Changeset, Record, RecordKey, StoreError, Write},
};

pub(crate) fn get(tables: &Tables, key: &RecordKey) -> Option<Record> {
    match key {
        RecordKey::User(id) => tables.users.get(id).cloned().map(Record::User),
        RecordKey::Node(id) => tables.nodes.get(id).cloned().map(Record::Node),
        RecordKey::Revision(id) => tables.revisions.get(id).cloned().map(Record::Revision),
        RecordKey::Action(id) => tables.actions.get(id).cloned().map(Record::Action),
        RecordKey::Repute(id) => tables.reputes.get(id).cloned().map(Record::Repute),
        RecordKey::Tag(name) => tables.tags.get(name).cloned().map(Record::Tag),
    }
}

fn stored_version(tables: &Tables, key: &RecordKey) -> Option<u64> {
    match key {
        RecordKey::User(id) => tables.users.get(id).map(|r| r.version),
        RecordKey::Node(id) => tables.nodes.get(id).map(|r| r.version),
        RecordKey::Revision(id) => tables.revisions.get(id).map(|r| r.version),
        RecordKey::Action(id) => tables.actions.get(id).map(|r| r.version),
        RecordKey::Repute(id) => tables.reputes.get(id).map(|r| r.version),
        RecordKey::Tag(name) => tables.tags.get(name).map(|r| r.version),
    }
}

fn check(tables: &Tables, write: &Write) -> Result<()> {
    let (key, expected) = match write {
        Write::Put(record) => (record.key(), record.version()),
        Write::Delete { key, version } => (key.clone(), *version),
    };
    let found = stored_version(tables, &key);
    let ok = match (write, found) {
        (Write::Put(_), None) => expected == 0,
        (_, Some(current)) => expected == current,
        (Write::Delete { .. }, None) => false,
    };
    if ok {
        Ok(())
    } else {
        Err(StoreError::VersionConflict {
            key,
            expected,
            found,
        }
        .into())
    }
}

fn insert(tables: &mut Tables, record: Record) {
    match record {
        Record::User(r) => {
            tables.users.insert(r.id.clone(), r);
        }
        Record::Node(r) => {
            tables.nodes.insert(r.id.clone(), r);
        }
        Record::Revision(r) => {
            tables.revisions.insert(r.id.clone(), r);
        }
        Record::Action(r) => {
            tables.actions.insert(r.id.clone(), r);
        }
        Record::Repute(r) => {
            tables.reputes.insert(r.id.clone(), r);
        }
        Record::Tag(r) => {
            tables.tags.insert(r.name.clone(), r);
        }
    }
}

fn remove(tables: &mut Tables, key: &RecordKey) {
    match key {
        RecordKey::User(id) => {
            tables.users.remove(id);
        }
        RecordKey::Node(id) => {
            tables.nodes.remove(id);
        }
        RecordKey::Revision(id) => {
            tables.revisions.remove(id);
        }
        RecordKey::Action(id) => {
            tables.actions.remove(id);
        }
        RecordKey::Repute(id) => {
            tables.reputes.remove(id);
        }
        RecordKey::Tag(name) => {
            tables.tags.remove(name);
        }
    }
}

/// Validates every write against the stored versions, then applies them all.
///
/// Nothing is written unless every check passes.
pub(crate) fn apply(tables: &mut Tables, changeset: Changeset) -> Result<()> {
    for write in &changeset.writes {
        check(tables, write)?;
    }
    for write in changeset.writes {
        match write {
            Write::Put(mut record) => {
                record.set_version(record.version() + 1);
                insert(tables, record);
            }
            Write::Delete { key, .. } => remove(tables, &key),
        }
    }
    Ok(())
}
