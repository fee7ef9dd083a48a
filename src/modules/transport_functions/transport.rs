//! ## Transport Module
//! How an actor reaches the semaphore set and the shared region: by access key.
//!
//! ## The functions includes:
//! - 'Transport::connect'   attaches to the resources created under a key.
//! - 'LocalTransport::create'   creates a fresh semaphore set and region under a key.
//! - 'LocalTransport::destroy'  removes the semaphore set (waking every blocked actor with an error)
//!                              and forgets the key.
//!
//! `LocalTransport` keeps everything in this process, so actors are threads that share a registry
//! handle the way forked processes would share a SysV key.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use log::{debug, info};

use crate::modules::error::{RestaurantError, Result};
use crate::modules::semaphore_functions::semaphore_set::SemaphoreSet;
use crate::modules::state_object::shared_region::SharedRegion;

#[derive(Clone, Debug)]
pub struct Connection {
    pub semaphores: Arc<SemaphoreSet>,
    pub region: Arc<SharedRegion>,
}

pub trait Transport: Send + Sync {
    fn connect(&self, key: u32) -> Result<Connection>;
}

#[derive(Clone, Debug, Default)]
pub struct LocalTransport {
    registry: Arc<Mutex<HashMap<u32, Connection>>>,
}

impl LocalTransport {
    pub fn new() -> LocalTransport {
        LocalTransport::default()
    }

    fn registry(&self) -> std::sync::MutexGuard<'_, HashMap<u32, Connection>> {
        self.registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// create
    /// Creates the semaphore set and the shared region for one run.
    ///
    /// # Arguments:
    ///
    /// * `key` - u32 - access key the actors will connect with.
    /// * `table_size` - usize - number of clients, sizes the shared state.
    ///
    /// # Returns:
    ///
    /// Returns -Result<Connection>- the creator's own connection, or an error if the key is taken.
    ///
    pub fn create(&self, key: u32, table_size: usize) -> Result<Connection> {
        let mut registry = self.registry();
        if registry.contains_key(&key) {
            return Err(RestaurantError::Transport {
                key,
                reason: "resources already exist under this key".to_string(),
            });
        }
        let connection = Connection {
            semaphores: Arc::new(SemaphoreSet::new()),
            region: Arc::new(SharedRegion::new(table_size)),
        };
        registry.insert(key, connection.clone());
        info!("Created semaphore set and shared region under key {:#x}", key);
        Ok(connection)
    }

    /// Removes the resources under `key`. Returns false if there was nothing to remove.
    pub fn destroy(&self, key: u32) -> bool {
        match self.registry().remove(&key) {
            Some(connection) => {
                connection.semaphores.remove();
                debug!("Destroyed resources under key {:#x}", key);
                true
            }
            None => false,
        }
    }
}

impl Transport for LocalTransport {
    fn connect(&self, key: u32) -> Result<Connection> {
        self.registry()
            .get(&key)
            .cloned()
            .ok_or_else(|| RestaurantError::Transport {
                key,
                reason: "no semaphore set or shared region under this key".to_string(),
            })
    }
}

//----------------------------------TESTS-------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::semaphore_functions::semaphore_set::SemName;

    #[test]
    fn test_connect_shares_the_created_resources() {
        let transport = LocalTransport::new();
        let created = transport.create(0x1234, 3).unwrap();
        let connected = transport.connect(0x1234).unwrap();

        assert!(Arc::ptr_eq(&created.semaphores, &connected.semaphores));
        assert!(Arc::ptr_eq(&created.region, &connected.region));
        assert_eq!(connected.region.table_size().unwrap(), 3);
    }

    #[test]
    fn test_connect_to_unknown_key_fails() {
        let transport = LocalTransport::new();
        assert!(matches!(
            transport.connect(7),
            Err(RestaurantError::Transport { key: 7, .. })
        ));
    }

    #[test]
    fn test_create_twice_fails() {
        let transport = LocalTransport::new();
        transport.create(1, 2).unwrap();
        assert!(transport.create(1, 2).is_err());
    }

    #[test]
    fn test_destroy_removes_semaphores() {
        let transport = LocalTransport::new();
        let connection = transport.create(9, 1).unwrap();
        assert!(transport.destroy(9));
        assert!(connection.semaphores.acquire(SemName::Mutex).is_err());
        assert!(transport.connect(9).is_err());
        assert!(!transport.destroy(9));
    }
}
