use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::Rng;
use sea_orm::ConnectionTrait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use duel_persistence::repositories::UserRepository;
use duel_types::{PlayerRole, RoomError};

/// Guest ids carry this prefix so they can never collide with registered
/// user ids, which are plain UUIDs.
pub const GUEST_ID_PREFIX: &str = "guest-";

const GUEST_ADJECTIVES: &[&str] = &[
    "Swift", "Clever", "Quiet", "Bold", "Lucky", "Sly", "Brisk", "Keen",
];

const GUEST_ANIMALS: &[&str] = &[
    "Otter", "Falcon", "Lynx", "Badger", "Heron", "Viper", "Marten", "Raven",
];

/// Claims embedded in a signed guest token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuestClaims {
    pub sub: String,
    pub role: String,
    pub name: String,
    pub iat: i64,
    pub exp: i64,
}

/// The identity a join request resolved to: either a verified registered
/// user or a freshly minted guest with a signed token.
#[derive(Debug, Clone)]
pub struct ResolvedIdentity {
    pub player_id: String,
    pub display_name: String,
    pub role: PlayerRole,
    pub guest_token: Option<String>,
}

/// Resolves supplied player ids to identities. Registered ids are checked
/// against the users table; anything else gets a new guest identity with a
/// signed token the client can hold for the rest of its visit.
pub struct IdentityService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl: chrono::Duration,
}

impl IdentityService {
    pub fn new(secret: &str, token_ttl_minutes: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_ttl: chrono::Duration::minutes(token_ttl_minutes as i64),
        }
    }

    pub fn is_guest_id(player_id: &str) -> bool {
        player_id.starts_with(GUEST_ID_PREFIX)
    }

    /// Resolve a join request's optional player id. A non-guest id must
    /// reference a registered user; absence (or a stale guest id from a
    /// previous visit) mints a new guest.
    pub async fn resolve(
        &self,
        conn: &impl ConnectionTrait,
        supplied_id: Option<&str>,
    ) -> Result<ResolvedIdentity, RoomError> {
        match supplied_id {
            Some(id) if !id.is_empty() && !Self::is_guest_id(id) => {
                let user = UserRepository::find_by_id(conn, id)
                    .await
                    .map_err(|err| RoomError::internal(err.to_string()))?
                    .ok_or_else(|| RoomError::PlayerNotFound {
                        player_id: id.to_string(),
                    })?;

                Ok(ResolvedIdentity {
                    player_id: user.id,
                    display_name: user.display_name,
                    role: PlayerRole::User,
                    guest_token: None,
                })
            }
            _ => self.mint_guest(),
        }
    }

    /// Mint a fresh guest identity with a generated display name and a
    /// signed token asserting the guest role.
    pub fn mint_guest(&self) -> Result<ResolvedIdentity, RoomError> {
        let player_id = format!("{}{}", GUEST_ID_PREFIX, Uuid::new_v4());
        let display_name = Self::generate_display_name();

        let now = Utc::now();
        let claims = GuestClaims {
            sub: player_id.clone(),
            role: "guest".to_string(),
            name: display_name.clone(),
            iat: now.timestamp(),
            exp: (now + self.token_ttl).timestamp(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|err| RoomError::internal(format!("Failed to sign guest token: {err}")))?;

        Ok(ResolvedIdentity {
            player_id,
            display_name,
            role: PlayerRole::Guest,
            guest_token: Some(token),
        })
    }

    pub fn verify_guest_token(&self, token: &str) -> Result<GuestClaims, RoomError> {
        let data = decode::<GuestClaims>(token, &self.decoding_key, &Validation::default())
            .map_err(|_| RoomError::Unauthorized)?;

        if data.claims.role != "guest" {
            return Err(RoomError::Unauthorized);
        }

        Ok(data.claims)
    }

    fn generate_display_name() -> String {
        let mut rng = rand::thread_rng();
        let adjective = GUEST_ADJECTIVES[rng.gen_range(0..GUEST_ADJECTIVES.len())];
        let animal = GUEST_ANIMALS[rng.gen_range(0..GUEST_ANIMALS.len())];
        let number: u16 = rng.gen_range(10..100);
        format!("{adjective}{animal}{number}")
    }
}
