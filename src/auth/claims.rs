use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Session token payload. A token says "this bearer is user `sub` until
/// `exp`"; nothing is kept server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // user ID
    pub iat: usize, // issued at (unix timestamp)
    pub exp: usize, // expires at (unix timestamp)
}
