use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::info;
use uuid::Uuid;

use crate::config::RuleContext;
use crate::tables::table::Table;

/// Open tables by id. Each table sits behind its own mutex so mutations on
/// one table are serialized without blocking the others.
#[derive(Clone, Default)]
pub struct TableRegistry {
    tables: Arc<RwLock<HashMap<Uuid, Arc<Mutex<Table>>>>>,
}

impl TableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self, ctx: RuleContext) -> Uuid {
        let id = Uuid::new_v4();
        let table = Arc::new(Mutex::new(Table::new(id, ctx)));
        self.tables.write().await.insert(id, table);
        info!(table = %id, decks = ctx.decks, "table opened");
        id
    }

    pub async fn get(&self, id: Uuid) -> Option<Arc<Mutex<Table>>> {
        self.tables.read().await.get(&id).cloned()
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.tables.write().await.remove(&id).is_some();
        if removed {
            info!(table = %id, "table closed");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.tables.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
