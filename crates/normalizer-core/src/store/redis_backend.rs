//! Redis-backed `MultiStore` implementation, supporting both a standalone
//! (possibly multi-db) Redis instance and a Redis Cluster per logical
//! store, as described by the store-config file of spec.md §6.

use std::collections::HashMap;

use async_trait::async_trait;
use redis::AsyncCommands;
use serde::Deserialize;

use super::{batched, unavailable, MultiStore, StoreName, DEFAULT_BATCH_SIZE, DEFAULT_WRITE_BLOCK_SIZE};
use crate::error::Result;

/// A single `host:port` pair, as it appears in a cluster descriptor's
/// `hosts` list.
#[derive(Debug, Clone, Deserialize)]
pub struct HostPort {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    6379
}

/// One entry of the store-config YAML document: either a non-cluster
/// descriptor (host, port, db, password, ssl) or a cluster descriptor (a
/// list of host/port pairs, password, ssl).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StoreDescriptor {
    Cluster {
        hosts: Vec<HostPort>,
        #[serde(default)]
        password: Option<String>,
        #[serde(default)]
        ssl: bool,
    },
    Standalone {
        host: String,
        #[serde(default = "default_port")]
        port: u16,
        #[serde(default)]
        db: i64,
        #[serde(default)]
        password: Option<String>,
        #[serde(default)]
        ssl: bool,
    },
}

/// The full store-config document: logical store name -> backend
/// descriptor. Unknown store names are a `ConfigurationError` at
/// construction time (spec.md §7).
pub type StoreBackendConfig = HashMap<String, StoreDescriptor>;

enum Connection {
    Standalone(redis::aio::ConnectionManager),
    Cluster(redis::cluster_async::ClusterConnection),
}

impl Clone for Connection {
    fn clone(&self) -> Self {
        match self {
            Connection::Standalone(c) => Connection::Standalone(c.clone()),
            Connection::Cluster(c) => Connection::Cluster(c.clone()),
        }
    }
}

pub struct RedisMultiStore {
    connections: HashMap<StoreName, Connection>,
    batch_size: usize,
    write_block_size: usize,
}

impl RedisMultiStore {
    /// Connects to every store named in `config`. Each store name must be
    /// one of [`StoreName::all`]; an unrecognized name is a
    /// `ConfigurationError` and prevents the service from starting, per
    /// spec.md §7.
    pub async fn connect(config: &StoreBackendConfig, batch_size: usize) -> Result<Self> {
        let mut connections = HashMap::with_capacity(config.len());
        for (name, descriptor) in config {
            let store_name = StoreName::from_str(name).ok_or_else(|| {
                crate::error::NormalizerError::ConfigurationError(name.clone())
            })?;
            let conn = connect_one(descriptor).await?;
            connections.insert(store_name, conn);
        }
        Ok(RedisMultiStore {
            connections,
            batch_size: if batch_size == 0 { DEFAULT_BATCH_SIZE } else { batch_size },
            write_block_size: DEFAULT_WRITE_BLOCK_SIZE,
        })
    }

    fn conn(&self, store: StoreName) -> Result<Connection> {
        self.connections
            .get(&store)
            .cloned()
            .ok_or_else(|| unavailable(format!("no connection configured for store {:?}", store)))
    }
}

async fn connect_one(descriptor: &StoreDescriptor) -> Result<Connection> {
    match descriptor {
        StoreDescriptor::Standalone { host, port, db, password, ssl } => {
            let scheme = if *ssl { "rediss" } else { "redis" };
            let auth = password
                .as_ref()
                .map(|p| format!(":{p}@"))
                .unwrap_or_default();
            let url = format!("{scheme}://{auth}{host}:{port}/{db}");
            let client = redis::Client::open(url).map_err(unavailable)?;
            let manager = client.get_connection_manager().await.map_err(unavailable)?;
            Ok(Connection::Standalone(manager))
        }
        StoreDescriptor::Cluster { hosts, password, ssl } => {
            let scheme = if *ssl { "rediss" } else { "redis" };
            let urls: Vec<String> = hosts
                .iter()
                .map(|h| format!("{scheme}://{}:{}", h.host, h.port))
                .collect();
            let mut builder = redis::cluster::ClusterClientBuilder::new(urls);
            if let Some(p) = password {
                builder = builder.password(p.clone());
            }
            let client = builder.build().map_err(unavailable)?;
            let conn = client.get_async_connection().await.map_err(unavailable)?;
            Ok(Connection::Cluster(conn))
        }
    }
}

#[async_trait]
impl MultiStore for RedisMultiStore {
    async fn multi_get(&self, store: StoreName, keys: &[String]) -> Result<Vec<Option<String>>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.conn(store)?;
        batched(keys, self.batch_size, |chunk| {
            let mut conn = conn.clone();
            async move {
                match &mut conn {
                    Connection::Standalone(c) => {
                        c.mget(chunk).await.map_err(unavailable)
                    }
                    Connection::Cluster(c) => {
                        c.mget(chunk).await.map_err(unavailable)
                    }
                }
            }
        })
        .await
    }

    async fn lrange(&self, store: StoreName, key: &str, start: isize, stop: isize) -> Result<Vec<String>> {
        let mut conn = self.conn(store)?;
        match &mut conn {
            Connection::Standalone(c) => c.lrange(key, start as isize, stop as isize).await.map_err(unavailable),
            Connection::Cluster(c) => c.lrange(key, start as isize, stop as isize).await.map_err(unavailable),
        }
    }

    async fn keys(&self, store: StoreName, pattern: &str) -> Result<Vec<String>> {
        let mut conn = self.conn(store)?;
        match &mut conn {
            Connection::Standalone(c) => c.keys(pattern).await.map_err(unavailable),
            Connection::Cluster(c) => c.keys(pattern).await.map_err(unavailable),
        }
    }

    async fn pipelined_set(&self, store: StoreName, entries: &[(String, String)]) -> Result<()> {
        let conn = self.conn(store)?;
        for block in entries.chunks(self.write_block_size.max(1)) {
            let mut pipe = redis::pipe();
            for (k, v) in block {
                pipe.set(k, v).ignore();
            }
            let mut conn = conn.clone();
            match &mut conn {
                Connection::Standalone(c) => pipe.query_async(c).await.map_err(unavailable)?,
                Connection::Cluster(c) => pipe.query_async(c).await.map_err(unavailable)?,
            }
        }
        Ok(())
    }

    async fn key_count(&self, store: StoreName) -> Result<u64> {
        let mut conn = self.conn(store)?;
        match &mut conn {
            Connection::Standalone(c) => redis::cmd("DBSIZE").query_async(c).await.map_err(unavailable),
            Connection::Cluster(c) => redis::cmd("DBSIZE").query_async(c).await.map_err(unavailable),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standalone_descriptor_deserializes() {
        let yaml = "host: localhost\nport: 6379\ndb: 0\n";
        let d: StoreDescriptor = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(d, StoreDescriptor::Standalone { .. }));
    }

    #[test]
    fn cluster_descriptor_deserializes() {
        let yaml = "hosts:\n  - host: a\n    port: 6379\n  - host: b\n    port: 6380\npassword: secret\nssl: true\n";
        let d: StoreDescriptor = serde_yaml::from_str(yaml).unwrap();
        match d {
            StoreDescriptor::Cluster { hosts, ssl, .. } => {
                assert_eq!(hosts.len(), 2);
                assert!(ssl);
            }
            _ => panic!("expected cluster descriptor"),
        }
    }
}
