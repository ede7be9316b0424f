use sea_orm::{ActiveModelTrait, ActiveValue, ConnectionTrait, DbErr, EntityTrait};

use crate::entities::{prelude::*, users};

/// Lookup of registered identities. The identity resolver consults this to
/// distinguish a valid registered reference from an unknown id; credential
/// handling lives entirely in the external auth service.
pub struct UserRepository;

impl UserRepository {
    pub async fn find_by_id(
        conn: &impl ConnectionTrait,
        id: &str,
    ) -> Result<Option<users::Model>, DbErr> {
        Users::find_by_id(id).one(conn).await
    }

    pub async fn create(
        conn: &impl ConnectionTrait,
        id: &str,
        display_name: &str,
    ) -> Result<users::Model, DbErr> {
        let model = users::ActiveModel {
            id: ActiveValue::Set(id.to_string()),
            display_name: ActiveValue::Set(display_name.to_string()),
            created_at: ActiveValue::Set(chrono::Utc::now().into()),
        };

        model.insert(conn).await
    }
}
