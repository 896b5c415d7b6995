//! Module configuration.

use serde::{Deserialize, Serialize};

/// User-pool configuration.
///
/// Identifies one application's account registry at the hosted identity
/// provider. Constructed once and handed to the module factory; the
/// resulting pool handle lives as long as the module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Pool identifier assigned by the provider.
    pub pool_id: String,

    /// Client identifier of this application within the pool.
    pub client_id: String,
}

impl PoolConfig {
    /// Create a new pool configuration.
    #[must_use]
    pub fn new(pool_id: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            pool_id: pool_id.into(),
            client_id: client_id.into(),
        }
    }
}
