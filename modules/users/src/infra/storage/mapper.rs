use crate::contract::model::User;
use crate::infra::storage::entity::Model as UserEntity;

/// Convert a database entity to a contract model. The password hash stays behind.
pub fn entity_to_contract(entity: UserEntity) -> User {
    User {
        id: entity.id,
        first_name: entity.first_name,
        last_name: entity.last_name,
        nickname: entity.nickname,
        email: entity.email,
        country: entity.country,
        created_at: entity.created_at,
        updated_at: entity.updated_at,
    }
}

impl From<UserEntity> for User {
    fn from(entity: UserEntity) -> Self {
        entity_to_contract(entity)
    }
}
