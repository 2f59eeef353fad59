pub mod character;
pub mod token;

pub use character::CharacterRepository;
pub use token::EsiTokenRepository;
