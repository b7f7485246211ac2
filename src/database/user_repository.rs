use async_trait::async_trait;
use mongodb::{
    bson::doc,
    options::IndexOptions,
    Collection, Database, IndexModel,
};

use crate::errors::Result;
use crate::models::user::User;

pub const USERS_COLLECTION: &str = "users";

/// Persistent mapping from mobile number to account.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_mobile(&self, mobile_number: &str) -> Result<Option<User>>;

    /// Insert or replace the account stored under `user.mobile_number`.
    /// Concurrent writers for one number are last-write-wins.
    async fn upsert(&self, user: &User) -> Result<()>;

    /// Cheap reachability probe for health checks.
    async fn ping(&self) -> Result<()>;
}

#[derive(Clone)]
pub struct MongoUserRepository {
    db: Database,
    users: Collection<User>,
}

impl MongoUserRepository {
    pub fn new(db: Database) -> Self {
        let users = db.collection(USERS_COLLECTION);
        Self { db, users }
    }

    /// Unique index on `mobileNumber`; one account per number.
    pub async fn ensure_indexes(&self) -> Result<()> {
        let index = IndexModel::builder()
            .keys(doc! { "mobileNumber": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        self.users.create_index(index).await?;
        tracing::info!("📇 Ensured unique index on {}.mobileNumber", USERS_COLLECTION);
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn find_by_mobile(&self, mobile_number: &str) -> Result<Option<User>> {
        let user = self
            .users
            .find_one(doc! { "mobileNumber": mobile_number })
            .await?;
        Ok(user)
    }

    async fn upsert(&self, user: &User) -> Result<()> {
        let filter = doc! { "mobileNumber": &user.mobile_number };

        self.users.replace_one(filter, user).upsert(true).await?;

        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }
}
