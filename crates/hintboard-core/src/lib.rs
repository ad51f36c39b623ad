pub mod codec;
pub mod record;
pub mod san;
pub mod score;
