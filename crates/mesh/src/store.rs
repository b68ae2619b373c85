//! Mesh database schema and operations
//!
//! Tables:
//! - hubs: VPN concentrator endpoints
//! - peers: clients attached to a hub
//!
//! Address uniqueness among a hub's active peers is backed by a partial
//! unique index so a deactivated peer's address can be re-allocated.

use crate::model::{HubRecord, HubStatus, PeerLinkState, PeerRecord, SshTarget};
use rusqlite::{params, OptionalExtension};
use std::collections::HashSet;
use std::net::IpAddr;
use tracing::info;
use uuid::Uuid;
use wgmesh_common::{Database, Error, Result};

/// Mesh database wrapper
#[derive(Clone)]
pub struct MeshStore {
    db: Database,
}

impl MeshStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Initialize mesh schema
    pub fn init_schema(&self) -> Result<()> {
        let conn = self.db.connection();
        let conn = conn.lock();
        conn.execute_batch(
            r#"
            -- Hubs
            CREATE TABLE IF NOT EXISTS hubs (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                description TEXT,
                cidr TEXT NOT NULL,
                address TEXT NOT NULL,
                listen_port INTEGER NOT NULL,
                public_key TEXT NOT NULL,
                private_key_sealed BLOB NOT NULL,
                endpoint TEXT NOT NULL,
                ssh_target TEXT,
                status TEXT NOT NULL DEFAULT 'draft',
                last_error TEXT,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_hubs_name ON hubs(name);

            -- Peers
            CREATE TABLE IF NOT EXISTS peers (
                id TEXT PRIMARY KEY,
                hub_id TEXT NOT NULL,
                name TEXT NOT NULL,
                address TEXT NOT NULL,
                allowed_ips TEXT NOT NULL,
                public_key TEXT NOT NULL,
                private_key_sealed BLOB NOT NULL,
                is_active INTEGER NOT NULL DEFAULT 1,
                link_state TEXT NOT NULL DEFAULT 'disconnected',
                last_handshake_at INTEGER,
                created_at INTEGER NOT NULL,
                FOREIGN KEY(hub_id) REFERENCES hubs(id) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_peers_hub ON peers(hub_id);
            CREATE UNIQUE INDEX IF NOT EXISTS idx_peers_hub_addr_active
                ON peers(hub_id, address) WHERE is_active = 1;
            "#,
        )?;

        info!("Mesh database schema initialized");
        Ok(())
    }

    // ========================================================================
    // Hub operations
    // ========================================================================

    pub fn insert_hub(&self, hub: &HubRecord) -> Result<()> {
        let ssh_json = match &hub.ssh {
            Some(target) => Some(serde_json::to_string(target)?),
            None => None,
        };
        let conn = self.db.connection();
        let conn = conn.lock();
        conn.execute(
            "INSERT INTO hubs (id, name, description, cidr, address, listen_port, public_key, private_key_sealed, endpoint, ssh_target, status, last_error, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                hub.id.to_string(),
                hub.name,
                hub.description,
                hub.cidr,
                hub.address,
                hub.listen_port,
                hub.public_key,
                hub.private_key_sealed,
                hub.endpoint,
                ssh_json,
                hub.status.to_string(),
                hub.last_error,
                hub.created_at,
                hub.updated_at,
            ],
        )
        .map_err(|e| constraint_to_exists(e, "hub", &hub.name))?;
        Ok(())
    }

    pub fn get_hub(&self, id: Uuid) -> Result<Option<HubRecord>> {
        let conn = self.db.connection();
        let conn = conn.lock();
        conn.query_row(
            &format!("SELECT {} FROM hubs WHERE id = ?1", HUB_COLUMNS),
            params![id.to_string()],
            hub_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    pub fn get_hub_by_name(&self, name: &str) -> Result<Option<HubRecord>> {
        let conn = self.db.connection();
        let conn = conn.lock();
        conn.query_row(
            &format!("SELECT {} FROM hubs WHERE name = ?1", HUB_COLUMNS),
            params![name],
            hub_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    pub fn list_hubs(&self) -> Result<Vec<HubRecord>> {
        let conn = self.db.connection();
        let conn = conn.lock();
        let mut stmt = conn.prepare(&format!("SELECT {} FROM hubs ORDER BY rowid", HUB_COLUMNS))?;
        let rows = stmt.query_map([], hub_from_row)?;

        let mut hubs = Vec::new();
        for row in rows {
            hubs.push(row?);
        }
        Ok(hubs)
    }

    pub fn update_hub_status(
        &self,
        id: Uuid,
        status: HubStatus,
        last_error: Option<&str>,
    ) -> Result<()> {
        let now = now_epoch_secs();
        let conn = self.db.connection();
        let conn = conn.lock();
        conn.execute(
            "UPDATE hubs SET status = ?1, last_error = ?2, updated_at = ?3 WHERE id = ?4",
            params![status.to_string(), last_error, now, id.to_string()],
        )?;
        Ok(())
    }

    pub fn update_hub_ssh(&self, id: Uuid, ssh: Option<&SshTarget>) -> Result<()> {
        let ssh_json = match ssh {
            Some(target) => Some(serde_json::to_string(target)?),
            None => None,
        };
        let now = now_epoch_secs();
        let conn = self.db.connection();
        let conn = conn.lock();
        conn.execute(
            "UPDATE hubs SET ssh_target = ?1, updated_at = ?2 WHERE id = ?3",
            params![ssh_json, now, id.to_string()],
        )?;
        Ok(())
    }

    pub fn delete_hub(&self, id: Uuid) -> Result<()> {
        let conn = self.db.connection();
        let conn = conn.lock();
        conn.execute("DELETE FROM hubs WHERE id = ?1", params![id.to_string()])?;
        Ok(())
    }

    // ========================================================================
    // Peer operations
    // ========================================================================

    pub fn insert_peer(&self, peer: &PeerRecord) -> Result<()> {
        let conn = self.db.connection();
        let conn = conn.lock();
        conn.execute(
            "INSERT INTO peers (id, hub_id, name, address, allowed_ips, public_key, private_key_sealed, is_active, link_state, last_handshake_at, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                peer.id.to_string(),
                peer.hub_id.to_string(),
                peer.name,
                peer.address,
                peer.allowed_ips,
                peer.public_key,
                peer.private_key_sealed,
                peer.is_active,
                peer.link_state.to_string(),
                peer.last_handshake_at,
                peer.created_at,
            ],
        )
        .map_err(|e| constraint_to_exists(e, "peer", &peer.address))?;
        Ok(())
    }

    pub fn get_peer(&self, id: Uuid) -> Result<Option<PeerRecord>> {
        let conn = self.db.connection();
        let conn = conn.lock();
        conn.query_row(
            &format!("SELECT {} FROM peers WHERE id = ?1", PEER_COLUMNS),
            params![id.to_string()],
            peer_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    pub fn get_peer_by_name(&self, hub_id: Uuid, name: &str) -> Result<Option<PeerRecord>> {
        let conn = self.db.connection();
        let conn = conn.lock();
        conn.query_row(
            &format!(
                "SELECT {} FROM peers WHERE hub_id = ?1 AND name = ?2 ORDER BY rowid LIMIT 1",
                PEER_COLUMNS
            ),
            params![hub_id.to_string(), name],
            peer_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    /// All peers of a hub, in insertion order (render stability)
    pub fn list_peers(&self, hub_id: Uuid) -> Result<Vec<PeerRecord>> {
        self.query_peers(
            &format!(
                "SELECT {} FROM peers WHERE hub_id = ?1 ORDER BY rowid",
                PEER_COLUMNS
            ),
            hub_id,
        )
    }

    /// Active peers of a hub, in insertion order
    pub fn list_active_peers(&self, hub_id: Uuid) -> Result<Vec<PeerRecord>> {
        self.query_peers(
            &format!(
                "SELECT {} FROM peers WHERE hub_id = ?1 AND is_active = 1 ORDER BY rowid",
                PEER_COLUMNS
            ),
            hub_id,
        )
    }

    fn query_peers(&self, sql: &str, hub_id: Uuid) -> Result<Vec<PeerRecord>> {
        let conn = self.db.connection();
        let conn = conn.lock();
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params![hub_id.to_string()], peer_from_row)?;

        let mut peers = Vec::new();
        for row in rows {
            peers.push(row?);
        }
        Ok(peers)
    }

    /// Addresses currently held by a hub's active peers
    pub fn used_addresses(&self, hub_id: Uuid) -> Result<HashSet<IpAddr>> {
        let conn = self.db.connection();
        let conn = conn.lock();
        let mut stmt = conn
            .prepare("SELECT address FROM peers WHERE hub_id = ?1 AND is_active = 1")?;
        let rows = stmt.query_map(params![hub_id.to_string()], |row| row.get::<_, String>(0))?;

        let mut used = HashSet::new();
        for row in rows {
            let address = row?;
            let ip = address
                .parse()
                .map_err(|_| Error::InvalidAddress(format!("bad stored address '{}'", address)))?;
            used.insert(ip);
        }
        Ok(used)
    }

    pub fn set_peer_active(&self, id: Uuid, active: bool) -> Result<()> {
        let conn = self.db.connection();
        let conn = conn.lock();
        conn.execute(
            "UPDATE peers SET is_active = ?1 WHERE id = ?2",
            params![active, id.to_string()],
        )
        .map_err(|e| constraint_to_exists(e, "peer", &id.to_string()))?;
        Ok(())
    }

    /// Update link state, and the handshake timestamp when one was observed
    pub fn update_peer_link(
        &self,
        id: Uuid,
        state: PeerLinkState,
        last_handshake_at: Option<i64>,
    ) -> Result<()> {
        let conn = self.db.connection();
        let conn = conn.lock();
        match last_handshake_at {
            Some(at) => {
                conn.execute(
                    "UPDATE peers SET link_state = ?1, last_handshake_at = ?2 WHERE id = ?3",
                    params![state.to_string(), at, id.to_string()],
                )?;
            }
            None => {
                conn.execute(
                    "UPDATE peers SET link_state = ?1 WHERE id = ?2",
                    params![state.to_string(), id.to_string()],
                )?;
            }
        }
        Ok(())
    }

    pub fn delete_peer(&self, id: Uuid) -> Result<()> {
        let conn = self.db.connection();
        let conn = conn.lock();
        conn.execute("DELETE FROM peers WHERE id = ?1", params![id.to_string()])?;
        Ok(())
    }
}

const HUB_COLUMNS: &str = "id, name, description, cidr, address, listen_port, public_key, private_key_sealed, endpoint, ssh_target, status, last_error, created_at, updated_at";

const PEER_COLUMNS: &str = "id, hub_id, name, address, allowed_ips, public_key, private_key_sealed, is_active, link_state, last_handshake_at, created_at";

fn hub_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<HubRecord> {
    let ssh_json: Option<String> = row.get(9)?;
    Ok(HubRecord {
        id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap(),
        name: row.get(1)?,
        description: row.get(2)?,
        cidr: row.get(3)?,
        address: row.get(4)?,
        listen_port: row.get(5)?,
        public_key: row.get(6)?,
        private_key_sealed: row.get(7)?,
        endpoint: row.get(8)?,
        ssh: ssh_json.and_then(|s| serde_json::from_str(&s).ok()),
        status: row.get::<_, String>(10)?.parse().unwrap_or_default(),
        last_error: row.get(11)?,
        created_at: row.get(12)?,
        updated_at: row.get(13)?,
    })
}

fn peer_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PeerRecord> {
    Ok(PeerRecord {
        id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap(),
        hub_id: Uuid::parse_str(&row.get::<_, String>(1)?).unwrap(),
        name: row.get(2)?,
        address: row.get(3)?,
        allowed_ips: row.get(4)?,
        public_key: row.get(5)?,
        private_key_sealed: row.get(6)?,
        is_active: row.get(7)?,
        link_state: row.get::<_, String>(8)?.parse().unwrap_or_default(),
        last_handshake_at: row.get(9)?,
        created_at: row.get(10)?,
    })
}

fn constraint_to_exists(e: rusqlite::Error, kind: &str, id: &str) -> Error {
    match &e {
        rusqlite::Error::SqliteFailure(inner, _)
            if inner.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Error::AlreadyExists {
                kind: kind.to_string(),
                id: id.to_string(),
            }
        }
        _ => Error::Database(e),
    }
}

pub(crate) fn now_epoch_secs() -> i64 {
    chrono::Utc::now().timestamp()
}
