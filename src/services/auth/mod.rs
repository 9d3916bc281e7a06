pub mod codec;
pub mod jwt;
pub mod keys;

pub use codec::{TOKEN_CONTEXT, TokenCodec, TokenPayload};
pub use jwt::JwtCodec;
pub use keys::JwtKeys;
