pub mod character;

pub use character::{CharacterEntity, EsiTokenEntity};
